//! Add-book flow: cover selection, record assembly and persistence.

use crate::cover::{self, PlaceholderOptions};
use crate::error::Result;
use crate::library::book::Book;
use crate::library::form::BookDraft;
use crate::library::store::BookStore;
use crate::storage::KeyValueStore;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use std::path::PathBuf;
use uuid::Uuid;

/// Where the cover of a new book comes from.
#[derive(Debug, Clone, Default)]
pub enum CoverInput {
    /// Uploaded bytes with the content type reported by the client.
    Upload {
        /// Raw file content.
        bytes: Vec<u8>,
        /// Content type, if the client sent one.
        content_type: Option<String>,
    },
    /// A file on disk.
    File(PathBuf),
    /// An image payload that is already encoded.
    Payload(String),
    /// No cover supplied; a placeholder is generated.
    #[default]
    None,
}

/// Resolve the cover payload for `draft`.
pub async fn resolve_cover<R: Rng + ?Sized>(
    draft: &BookDraft,
    cover: CoverInput,
    options: &PlaceholderOptions,
    rng: &mut R,
) -> Result<String> {
    match cover {
        CoverInput::Upload {
            bytes,
            content_type,
        } if !bytes.is_empty() => Ok(cover::bytes_to_image_payload(
            &bytes,
            content_type.as_deref(),
        )),
        CoverInput::File(path) => cover::file_to_image_payload(&path).await,
        CoverInput::Payload(payload) if !payload.trim().is_empty() => Ok(payload),
        _ => cover::generate_placeholder_with(&draft.title, &draft.author, options, rng),
    }
}

/// Build a complete record from `draft` and a resolved cover.
pub fn new_book(draft: BookDraft, cover_image: String) -> Book {
    let id = Uuid::new_v4().to_string();
    let date_added = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    draft.into_book(id, cover_image, date_added)
}

/// Run the whole add-book flow and return the stored record.
///
/// Subject to the single-writer precondition of [`BookStore::add`].
pub async fn add_book<S, R>(
    store: &BookStore<S>,
    draft: BookDraft,
    cover: CoverInput,
    options: &PlaceholderOptions,
    rng: &mut R,
) -> Result<Book>
where
    S: KeyValueStore,
    R: Rng + ?Sized,
{
    let cover_image = resolve_cover(&draft, cover, options, rng).await?;
    let book = new_book(draft, cover_image);
    store.add(book.clone())?;
    Ok(book)
}

//! Application state shared across handlers.

use crate::config::Config;
use crate::cover::PlaceholderOptions;
use crate::error::Result;
use crate::library::{self, Book, BookDraft, BookStore, CoverInput, MonthNeighbours};
use crate::storage::SharedStore;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Book collection.
    store: Arc<BookStore<SharedStore>>,
    /// Serialises writers so the store's load-append-save runs alone.
    writer: Arc<Mutex<()>>,
}

impl AppState {
    /// Create application state over a backend.
    pub fn new(config: Config, backend: SharedStore) -> Self {
        let store = BookStore::with_key(backend, config.storage.key.clone());
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Site title.
    pub fn title(&self) -> &str {
        &self.config.server.title
    }

    /// Placeholder options from the cover configuration.
    pub fn placeholder_options(&self) -> PlaceholderOptions {
        self.config.covers.placeholder_options()
    }

    /// Every stored book, in insertion order.
    pub fn all_books(&self) -> Vec<Book> {
        self.store.load_all()
    }

    /// Books read in `month`, oldest addition first.
    pub fn books_by_month(&self, month: &str) -> Vec<Book> {
        self.store.get_by_month(month)
    }

    /// Reading months, newest first.
    pub fn months(&self) -> Vec<String> {
        self.store.get_all_months()
    }

    /// Find a book by id.
    pub fn get_book(&self, id: &str) -> Option<Book> {
        self.store.find(id)
    }

    /// Position of a book within its month.
    pub fn neighbours(&self, id: &str) -> Option<MonthNeighbours> {
        self.store.neighbours(id)
    }

    /// Resolve the cover, build the record and append it.
    pub async fn add_book(&self, draft: BookDraft, cover: CoverInput) -> Result<Book> {
        let mut rng = StdRng::from_os_rng();
        let options = self.placeholder_options();
        let cover_image = library::add::resolve_cover(&draft, cover, &options, &mut rng).await?;
        let book = library::add::new_book(draft, cover_image);

        {
            let _writer = self.writer.lock();
            self.store.add(book.clone())?;
        }

        Ok(book)
    }
}

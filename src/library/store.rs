//! Book collection persisted as one JSON blob in a key-value backend.

use crate::error::{AppError, Result};
use crate::library::book::Book;
use crate::library::month::parse_month;
use crate::storage::KeyValueStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "leio-books";

/// Position of a book inside its month group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthNeighbours {
    /// Zero-based index within the month.
    pub index: usize,
    /// Number of books in the month.
    pub total: usize,
    /// Book added just before, if any.
    pub previous: Option<Book>,
    /// Book added just after, if any.
    pub next: Option<Book>,
}

/// Repository over the stored book collection.
///
/// # Single writer
///
/// [`BookStore::add`] reads the whole collection, appends and writes it back.
/// Two writers interleaving on the same backend lose one of the additions;
/// callers must ensure only one writer is active at a time.
pub struct BookStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> BookStore<S> {
    /// Create a store using [`DEFAULT_STORAGE_KEY`].
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    /// Create a store over a custom key.
    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Replace the stored collection with `books`.
    pub fn save_all(&self, books: &[Book]) -> Result<()> {
        let json = serde_json::to_string(books)?;
        self.backend.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, books = books.len(), "Saved book collection");
        Ok(())
    }

    /// Read the stored collection.
    ///
    /// Never fails: a missing value, a backend read error or a value that is
    /// not a JSON array all yield an empty collection. Individual records
    /// that do not deserialize are skipped.
    pub fn load_all(&self) -> Vec<Book> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Error loading books");
                return Vec::new();
            }
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Error loading books");
                return Vec::new();
            }
        };

        records
            .into_iter()
            .enumerate()
            .filter_map(|(position, record)| match serde_json::from_value::<Book>(record) {
                Ok(book) => Some(book),
                Err(e) => {
                    tracing::warn!(position, error = %e, "Skipping malformed book record");
                    None
                }
            })
            .collect()
    }

    /// Append `book` to the stored collection.
    ///
    /// Fails without writing when a book with the same id exists.
    pub fn add(&self, book: Book) -> Result<()> {
        let mut books = self.load_all();
        if books.iter().any(|b| b.id == book.id) {
            return Err(AppError::Duplicate(book.id));
        }

        tracing::info!(id = %book.id, title = %book.title, month = %book.month_year, "Adding book");
        books.push(book);
        self.save_all(&books)
    }

    /// Find a book by id.
    pub fn find(&self, id: &str) -> Option<Book> {
        self.load_all().into_iter().find(|b| b.id == id)
    }

    /// Books read in `month_year`, oldest addition first.
    pub fn get_by_month(&self, month_year: &str) -> Vec<Book> {
        let mut books: Vec<Book> = self
            .load_all()
            .into_iter()
            .filter(|b| b.month_year == month_year)
            .collect();
        books.sort_by(compare_date_added);
        books
    }

    /// Distinct reading months, most recent first.
    pub fn get_all_months(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut months: Vec<String> = self
            .load_all()
            .into_iter()
            .map(|b| b.month_year)
            .filter(|m| seen.insert(m.clone()))
            .collect();

        // Unparseable months sort as the oldest.
        months.sort_by_key(|m| parse_month(m));
        months.reverse();
        months
    }

    /// Where `id` sits inside its month group.
    pub fn neighbours(&self, id: &str) -> Option<MonthNeighbours> {
        let book = self.find(id)?;
        let group = self.get_by_month(&book.month_year);
        let index = group.iter().position(|b| b.id == id)?;

        Some(MonthNeighbours {
            index,
            total: group.len(),
            previous: index.checked_sub(1).and_then(|i| group.get(i).cloned()),
            next: group.get(index + 1).cloned(),
        })
    }
}

/// Order by parsed `date_added`; unparseable timestamps go last, by text.
fn compare_date_added(a: &Book, b: &Book) -> Ordering {
    match (a.added_at(), b.added_at()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.date_added.cmp(&b.date_added),
    }
}

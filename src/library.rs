//! Book records, month grouping, form validation and the book store.

pub mod add;
pub mod book;
pub mod form;
pub mod month;
pub mod store;

pub use add::{CoverInput, add_book};
pub use book::{Book, Rating};
pub use form::{BookDraft, BookForm, Field, ValidationErrors};
pub use store::{BookStore, DEFAULT_STORAGE_KEY, MonthNeighbours};

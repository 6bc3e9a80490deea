pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::model::{Book, BookId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("no stored book with id {0}")]
    UnknownId(BookId),
    #[error("isbn already stored: {0}")]
    IsbnTaken(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable keyed storage for book records.
///
/// `save` inserts when the book has no id and updates otherwise, returning the
/// stored value with its id populated. `save_all` applies a batch atomically:
/// either every book is written or none is.
pub trait RecordStore {
    fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>>;
    fn find_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>>;
    fn save(&mut self, book: Book) -> StoreResult<Book>;
    fn save_all(&mut self, books: Vec<Book>) -> StoreResult<Vec<Book>>;
    /// Deleting an id that is not stored is not an error.
    fn delete_by_id(&mut self, id: BookId) -> StoreResult<()>;
    fn find_all(&self) -> StoreResult<Vec<Book>>;
    fn count(&self) -> StoreResult<u64>;
}

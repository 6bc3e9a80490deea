use super::{RecordStore, StoreError, StoreResult};
use crate::model::{Book, BookId};
use std::collections::BTreeMap;

/// In-process record store. Scan order is id order, which is insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    books: BTreeMap<BookId, Book>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&mut self, mut book: Book) -> StoreResult<Book> {
        let clash = self
            .books
            .values()
            .any(|other| other.isbn == book.isbn && other.id != book.id);
        if clash {
            return Err(StoreError::IsbnTaken(book.isbn));
        }
        let id = match book.id {
            Some(id) if self.books.contains_key(&id) => id,
            Some(id) => return Err(StoreError::UnknownId(id)),
            None => {
                self.next_id += 1;
                BookId(self.next_id)
            }
        };
        book.id = Some(id);
        self.books.insert(id, book.clone());
        Ok(book)
    }
}

impl RecordStore for MemoryStore {
    fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        Ok(self.books.get(&id).cloned())
    }

    fn find_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>> {
        Ok(self.books.values().find(|b| b.isbn == isbn).cloned())
    }

    fn save(&mut self, book: Book) -> StoreResult<Book> {
        self.write(book)
    }

    fn save_all(&mut self, books: Vec<Book>) -> StoreResult<Vec<Book>> {
        let mut staged = self.clone();
        let saved = books
            .into_iter()
            .map(|book| staged.write(book))
            .collect::<StoreResult<Vec<Book>>>()?;
        *self = staged;
        Ok(saved)
    }

    fn delete_by_id(&mut self, id: BookId) -> StoreResult<()> {
        self.books.remove(&id);
        Ok(())
    }

    fn find_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.books.values().cloned().collect())
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.books.len() as u64)
    }
}

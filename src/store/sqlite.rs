use super::{RecordStore, StoreError, StoreResult};
use crate::model::{Book, BookId};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        authors TEXT NOT NULL,
        publication_date TEXT NOT NULL,
        isbn TEXT NOT NULL UNIQUE,
        publisher TEXT,
        related_titles TEXT,
        cover_image BLOB
    );";

const COLUMNS: &str =
    "id, title, authors, publication_date, isbn, publisher, related_titles, cover_image";

/// Record store backed by a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection, creating the `books` table if absent.
    pub fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: Some(BookId(row.get("id")?)),
        title: row.get("title")?,
        authors: row.get("authors")?,
        publication_date: row.get("publication_date")?,
        isbn: row.get("isbn")?,
        publisher: row.get("publisher")?,
        related_titles: row.get("related_titles")?,
        cover_image: row.get("cover_image")?,
    })
}

fn map_write_error(err: rusqlite::Error, isbn: &str) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::IsbnTaken(isbn.to_string())
        }
        _ => StoreError::Sqlite(err),
    }
}

fn write_book(conn: &Connection, mut book: Book) -> StoreResult<Book> {
    match book.id {
        None => {
            conn.execute(
                "INSERT INTO books (title, authors, publication_date, isbn, publisher, related_titles, cover_image)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    book.title,
                    book.authors,
                    book.publication_date,
                    book.isbn,
                    book.publisher,
                    book.related_titles,
                    book.cover_image,
                ],
            )
            .map_err(|e| map_write_error(e, &book.isbn))?;
            book.id = Some(BookId(conn.last_insert_rowid()));
        }
        Some(id) => {
            let changed = conn
                .execute(
                    "UPDATE books SET title = ?1, authors = ?2, publication_date = ?3, isbn = ?4,
                     publisher = ?5, related_titles = ?6, cover_image = ?7 WHERE id = ?8",
                    params![
                        book.title,
                        book.authors,
                        book.publication_date,
                        book.isbn,
                        book.publisher,
                        book.related_titles,
                        book.cover_image,
                        id.0,
                    ],
                )
                .map_err(|e| map_write_error(e, &book.isbn))?;
            if changed == 0 {
                return Err(StoreError::UnknownId(id));
            }
        }
    }
    Ok(book)
}

impl RecordStore for SqliteStore {
    fn find_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        let q = format!("SELECT {COLUMNS} FROM books WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&q, [id.0], book_from_row)
            .optional()?)
    }

    fn find_by_isbn(&self, isbn: &str) -> StoreResult<Option<Book>> {
        let q = format!("SELECT {COLUMNS} FROM books WHERE isbn = ?1");
        Ok(self
            .conn
            .query_row(&q, [isbn], book_from_row)
            .optional()?)
    }

    fn save(&mut self, book: Book) -> StoreResult<Book> {
        write_book(&self.conn, book)
    }

    fn save_all(&mut self, books: Vec<Book>) -> StoreResult<Vec<Book>> {
        let tx = self.conn.transaction()?;
        let mut saved = Vec::with_capacity(books.len());
        for book in books {
            // Dropping `tx` on the error path rolls the batch back.
            saved.push(write_book(&tx, book)?);
        }
        tx.commit()?;
        Ok(saved)
    }

    fn delete_by_id(&mut self, id: BookId) -> StoreResult<()> {
        self.conn.execute("DELETE FROM books WHERE id = ?1", [id.0])?;
        Ok(())
    }

    fn find_all(&self) -> StoreResult<Vec<Book>> {
        let q = format!("SELECT {COLUMNS} FROM books ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&q)?;
        let books: rusqlite::Result<Vec<Book>> = stmt.query_map([], book_from_row)?.collect();
        Ok(books?)
    }

    fn count(&self) -> StoreResult<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

//! Catalog service: the only writer of book records.
//!
//! Validation and ISBN uniqueness are enforced here, before the record store
//! is touched. Every call is synchronous; callers that need to stay
//! responsive run them on their own worker.

pub mod error;

pub use error::{CatalogError, CatalogResult, Lookup, ValidationError};

use crate::export::{self, ExportFormat};
use crate::import;
use crate::metadata::MetadataProvider;
use crate::model::{Book, BookId, Field, ImportReport, ISBN_MAX_CHARS, TITLE_MAX_CHARS};
use crate::search::{Search, SearchField};
use crate::statistics::{CatalogSummary, Statistics};
use crate::store::RecordStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Checks required fields (title, isbn, authors, publication date, in that
/// order) and then the length limits on title and ISBN.
pub fn validate(book: &Book) -> Result<(), ValidationError> {
    for (field, value) in book.required_fields() {
        if value.trim().is_empty() {
            warn!("Validation failed: {} is empty", field);
            return Err(ValidationError::Missing(field));
        }
    }
    for (field, value, max) in [
        (Field::Title, &book.title, TITLE_MAX_CHARS),
        (Field::Isbn, &book.isbn, ISBN_MAX_CHARS),
    ] {
        if value.chars().count() > max {
            warn!("Validation failed: {} longer than {} characters", field, max);
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(())
}

pub struct CatalogService<S, P> {
    store: S,
    provider: P,
}

impl<S: RecordStore, P: MetadataProvider> CatalogService<S, P> {
    pub fn new(store: S, provider: P) -> Self {
        Self { store, provider }
    }

    /// Inserts a new book or updates a stored one. Text fields are stored
    /// trimmed.
    pub fn save(&mut self, book: Book) -> CatalogResult<Book> {
        let book = book.normalized();
        info!("Saving book. Title: '{}', ISBN: '{}'", book.title, book.isbn);
        validate(&book)?;

        if let Some(existing) = self.store.find_by_isbn(&book.isbn)? {
            if book.id != existing.id {
                warn!("Duplicate ISBN rejected: {}", book.isbn);
                return Err(CatalogError::DuplicateIsbn(book.isbn));
            }
        }

        let saved = self.store.save(book).map_err(|e| {
            tracing::error!("Failed to persist book: {}", e);
            CatalogError::Storage(e)
        })?;
        info!("Book saved. ID: {:?}", saved.id);
        Ok(saved)
    }

    pub fn list_all(&self) -> CatalogResult<Vec<Book>> {
        debug!("Listing all books");
        Ok(self.store.find_all()?)
    }

    /// Deleting an unknown id is a no-op.
    pub fn delete_by_id(&mut self, id: BookId) -> CatalogResult<()> {
        info!("Deleting book ID {}", id);
        self.store.delete_by_id(id)?;
        Ok(())
    }

    pub fn get_by_id(&self, id: BookId) -> CatalogResult<Book> {
        self.store.find_by_id(id)?.ok_or_else(|| {
            warn!("Book not found for ID {}", id);
            CatalogError::NotFound(Lookup::Id(id))
        })
    }

    pub fn find_by_isbn(&self, isbn: &str) -> CatalogResult<Book> {
        let isbn = isbn.trim();
        self.store
            .find_by_isbn(isbn)?
            .ok_or_else(|| CatalogError::NotFound(Lookup::Isbn(isbn.to_string())))
    }

    pub fn count_all(&self) -> CatalogResult<u64> {
        Ok(self.store.count()?)
    }

    pub fn count_distinct_publishers(&self) -> CatalogResult<usize> {
        Ok(self.store.find_all()?.distinct_publishers())
    }

    /// Title of the last book in the store's scan order, `None` when empty.
    ///
    /// This is only the most recently added book if the store scans in
    /// insertion order, which both bundled stores do.
    pub fn most_recent_title(&self) -> CatalogResult<Option<String>> {
        let books = self.store.find_all()?;
        Ok(books.most_recent_title().map(str::to_string))
    }

    pub fn summary(&self) -> CatalogResult<CatalogSummary> {
        let books = self.store.find_all()?;
        Ok(CatalogSummary {
            total: self.store.count()?,
            distinct_publishers: books.distinct_publishers(),
            most_recent_title: books.most_recent_title().map(str::to_string),
        })
    }

    /// Books whose `field` contains `term`, ignoring case. A blank term
    /// lists the whole catalog.
    pub fn search(&self, term: &str, field: SearchField) -> CatalogResult<Vec<Book>> {
        debug!("Searching {} for '{}'", field, term);
        Ok(self.store.find_all()?.search(term, field))
    }

    /// Fetches a fresh record for `isbn` from the metadata provider.
    pub fn lookup_external(&self, isbn: &str) -> CatalogResult<Book> {
        info!("Starting external lookup for ISBN {}", isbn);
        match self.provider.lookup(isbn) {
            Ok(Some(book)) => {
                info!("External catalog returned '{}'", book.title);
                Ok(book)
            }
            Ok(None) => {
                warn!("External catalog has no data for ISBN {}", isbn);
                Err(CatalogError::NotFound(Lookup::External(isbn.to_string())))
            }
            Err(e) => {
                tracing::error!("External lookup failed: {}", e);
                Err(CatalogError::ExternalService(e))
            }
        }
    }

    /// Looks `isbn` up externally and, when a local book already holds that
    /// ISBN, returns the external data carrying the local identity so that
    /// saving it updates instead of clashing.
    pub fn enrich(&self, isbn: &str) -> CatalogResult<Book> {
        let fetched = self.lookup_external(isbn)?;
        Ok(match self.store.find_by_isbn(isbn)? {
            Some(local) => Book {
                id: local.id,
                related_titles: local.related_titles,
                cover_image: fetched.cover_image.or(local.cover_image),
                ..fetched
            },
            None => fetched,
        })
    }

    /// Never fails: a missing or unreadable cover is `None`.
    pub fn fetch_cover_image(&self, isbn: &str) -> Option<Vec<u8>> {
        debug!("Downloading cover for ISBN {}", isbn);
        self.provider.fetch_cover(isbn)
    }

    pub fn import_csv(&mut self, path: &Path) -> CatalogResult<ImportReport> {
        import::import_csv(&mut self.store, path)
    }

    pub fn import_from_reader<R: std::io::Read>(
        &mut self,
        reader: R,
    ) -> CatalogResult<ImportReport> {
        import::import_from_reader(&mut self.store, reader)
    }

    /// Writes the whole catalog as CSV, returning the path written.
    pub fn export_csv(&self, destination: &Path) -> CatalogResult<PathBuf> {
        self.export(destination, ExportFormat::Csv)
    }

    pub fn export(&self, destination: &Path, format: ExportFormat) -> CatalogResult<PathBuf> {
        let books = self.store.find_all()?;
        export::export_books(&books, format, destination).map_err(|e| {
            tracing::error!("Export failed: {}", e);
            CatalogError::Io(e.into_io())
        })
    }
}

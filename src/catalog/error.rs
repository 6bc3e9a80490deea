use crate::metadata::ProviderError;
use crate::model::{BookId, Field};
use crate::store::StoreError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(Field),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },
}

/// What a failed lookup was keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(BookId),
    Isbn(String),
    External(String),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "no book with id {id}"),
            Lookup::Isbn(isbn) => write!(f, "no book with ISBN {isbn}"),
            Lookup::External(isbn) => write!(f, "ISBN {isbn} not found in the external catalog"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("a book with ISBN {0} is already registered")]
    DuplicateIsbn(String),
    #[error("{0}")]
    NotFound(Lookup),
    #[error("CSV file is empty or malformed: {0}")]
    EmptyOrMalformed(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("external lookup failed: {0}")]
    ExternalService(#[from] ProviderError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl CatalogError {
    /// Technical faults may succeed on retry; the rest need different input.
    pub fn is_technical(&self) -> bool {
        matches!(
            self,
            CatalogError::Io(_) | CatalogError::ExternalService(_) | CatalogError::Storage(_)
        )
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let err = CatalogError::from(ValidationError::Missing(Field::PublicationDate));
        assert_eq!(err.to_string(), "validation failed: publication date is required");
        assert!(!err.is_technical());

        let err = CatalogError::DuplicateIsbn("978-1".to_string());
        assert!(err.to_string().contains("978-1"));

        let err = CatalogError::NotFound(Lookup::Id(BookId(3)));
        assert_eq!(err.to_string(), "no book with id 3");
    }

    #[test]
    fn test_storage_is_technical() {
        let err = CatalogError::from(StoreError::UnknownId(BookId(1)));
        assert!(err.is_technical());
        assert!(err.to_string().contains("no stored book with id 1"));
    }
}

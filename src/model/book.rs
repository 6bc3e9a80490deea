use serde::{Deserialize, Serialize};
use std::fmt;

pub const TITLE_MAX_CHARS: usize = 255;
pub const ISBN_MAX_CHARS: usize = 20;

/// Identifier assigned by the record store on first save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Isbn,
    Authors,
    PublicationDate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Isbn => "isbn",
            Field::Authors => "authors",
            Field::PublicationDate => "publication date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<BookId>,
    pub title: String,
    pub authors: String,
    pub publication_date: String,
    pub isbn: String,
    pub publisher: Option<String>,
    pub related_titles: Option<String>,
    #[serde(skip)]
    pub cover_image: Option<Vec<u8>>,
}

impl Book {
    pub fn new(title: String, authors: String, publication_date: String, isbn: String) -> Self {
        Self {
            id: None,
            title,
            authors,
            publication_date,
            isbn,
            publisher: None,
            related_titles: None,
            cover_image: None,
        }
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_related_titles(mut self, related: impl Into<String>) -> Self {
        self.related_titles = Some(related.into());
        self
    }

    pub fn with_cover(mut self, cover: Option<Vec<u8>>) -> Self {
        self.cover_image = cover;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn has_cover(&self) -> bool {
        self.cover_image.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Strips surrounding whitespace from the text fields. A blank publisher
    /// becomes absent.
    pub fn normalized(self) -> Book {
        let publisher = self
            .publisher
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        Book {
            title: self.title.trim().to_string(),
            authors: self.authors.trim().to_string(),
            publication_date: self.publication_date.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            publisher,
            ..self
        }
    }

    /// Required fields in the order they are checked.
    pub fn required_fields(&self) -> [(Field, &str); 4] {
        [
            (Field::Title, self.title.as_str()),
            (Field::Isbn, self.isbn.as_str()),
            (Field::Authors, self.authors.as_str()),
            (Field::PublicationDate, self.publication_date.as_str()),
        ]
    }

    /// Builds the value an import row produces for an already stored book.
    /// Identity, ISBN, related titles and cover are carried over untouched.
    pub fn merge_import_row(&self, row: &ImportRow) -> Book {
        Book {
            title: row.title.clone(),
            authors: row.authors.clone(),
            publisher: row.publisher(),
            publication_date: row.publication_date.clone(),
            ..self.clone()
        }
    }
}

/// One data row of an import file, already trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub isbn: String,
    pub title: String,
    pub authors: String,
    pub publisher: String,
    pub publication_date: String,
}

impl ImportRow {
    fn publisher(&self) -> Option<String> {
        if self.publisher.is_empty() {
            None
        } else {
            Some(self.publisher.clone())
        }
    }

    pub fn into_book(self) -> Book {
        let publisher = self.publisher();
        Book {
            publisher,
            ..Book::new(self.title, self.authors, self.publication_date, self.isbn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ImportRow {
        ImportRow {
            isbn: "978-1".to_string(),
            title: "New Title".to_string(),
            authors: "New Author".to_string(),
            publisher: "".to_string(),
            publication_date: "2024".to_string(),
        }
    }

    #[test]
    fn test_merge_keeps_identity_and_isbn() {
        let mut stored = Book::new(
            "Old".to_string(),
            "Old Author".to_string(),
            "1999".to_string(),
            "978-1".to_string(),
        )
        .with_publisher("Rocco")
        .with_related_titles("Sequel")
        .with_cover(Some(vec![1; 200]));
        stored.id = Some(BookId(7));

        let merged = stored.merge_import_row(&row());
        assert_eq!(merged.id, Some(BookId(7)));
        assert_eq!(merged.isbn, "978-1");
        assert_eq!(merged.title, "New Title");
        assert_eq!(merged.publisher, None);
        assert_eq!(merged.related_titles.as_deref(), Some("Sequel"));
        assert!(merged.has_cover());
        assert_eq!(stored.title, "Old");
    }

    #[test]
    fn test_row_into_book_is_unsaved() {
        let book = row().into_book();
        assert!(!book.is_persisted());
        assert_eq!(book.isbn, "978-1");
        assert_eq!(book.publication_date, "2024");
    }

    #[test]
    fn test_normalized_trims_text_fields() {
        let book = Book::new(
            " Dom Casmurro ".to_string(),
            "Machado de Assis\t".to_string(),
            " 1899".to_string(),
            "978-1 ".to_string(),
        )
        .with_publisher("  ")
        .with_related_titles(" Quincas Borba ")
        .normalized();
        assert_eq!(book.title, "Dom Casmurro");
        assert_eq!(book.authors, "Machado de Assis");
        assert_eq!(book.publication_date, "1899");
        assert_eq!(book.isbn, "978-1");
        assert_eq!(book.publisher, None);
        assert_eq!(book.related_titles.as_deref(), Some(" Quincas Borba "));
    }
}

use crate::model::Book;
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Which text a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    All,
    Title,
    Authors,
    Publisher,
    Isbn,
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchField::All => "all fields",
            SearchField::Title => "title",
            SearchField::Authors => "authors",
            SearchField::Publisher => "publisher",
            SearchField::Isbn => "ISBN",
        };
        f.write_str(name)
    }
}

impl SearchField {
    fn values(self, book: &Book) -> Vec<&str> {
        match self {
            SearchField::All => vec![
                book.title.as_str(),
                book.authors.as_str(),
                book.publisher().unwrap_or_default(),
                book.isbn.as_str(),
            ],
            SearchField::Title => vec![book.title.as_str()],
            SearchField::Authors => vec![book.authors.as_str()],
            SearchField::Publisher => book.publisher().into_iter().collect(),
            SearchField::Isbn => vec![book.isbn.as_str()],
        }
    }
}

/// Case-insensitive substring filter over a list of books.
pub trait Search {
    /// Books whose `field` contains `term`, in their original order.
    /// A blank term matches every book.
    fn search(&self, term: &str, field: SearchField) -> Vec<Book>;
}

fn term_pattern(term: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
}

impl Search for [Book] {
    fn search(&self, term: &str, field: SearchField) -> Vec<Book> {
        let term = term.trim();
        if term.is_empty() {
            return self.to_vec();
        }
        let Some(pattern) = term_pattern(term) else {
            return Vec::new();
        };
        self.iter()
            .filter(|b| field.values(b).iter().any(|v| pattern.is_match(v)))
            .cloned()
            .collect()
    }
}

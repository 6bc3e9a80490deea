use crate::model::Book;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Aggregates computed over a full catalog scan.
pub trait Statistics {
    fn distinct_publishers(&self) -> usize;
    /// Title of the last book in scan order.
    fn most_recent_title(&self) -> Option<&str>;
}

impl Statistics for [Book] {
    fn distinct_publishers(&self) -> usize {
        self.iter()
            .filter_map(Book::publisher)
            .filter(|p| !p.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }

    fn most_recent_title(&self) -> Option<&str> {
        self.last().map(|b| b.title.as_str())
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: u64,
    pub distinct_publishers: usize,
    pub most_recent_title: Option<String>,
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "books: {}", self.total)?;
        writeln!(f, "publishers: {}", self.distinct_publishers)?;
        write!(
            f,
            "most recent: {}",
            self.most_recent_title.as_deref().unwrap_or("none")
        )
    }
}

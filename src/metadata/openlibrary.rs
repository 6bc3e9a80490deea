use super::{HttpTransport, MetadataProvider, ProviderError, ReqwestTransport};
use crate::config::MetadataConfig;
use crate::model::Book;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const UNKNOWN_TITLE: &str = "Título Desconhecido";
pub const UNKNOWN_AUTHOR: &str = "Autor Desconhecido";
pub const UNKNOWN_PUBLISHER: &str = "Editora n/d";
pub const UNKNOWN_DATE: &str = "S/D";

#[derive(Deserialize)]
struct BookData {
    title: Option<String>,
    authors: Option<Vec<NamedEntry>>,
    publishers: Option<Vec<NamedEntry>>,
    publish_date: Option<String>,
}

#[derive(Deserialize)]
struct NamedEntry {
    name: String,
}

fn first_name(entries: Option<Vec<NamedEntry>>) -> Option<String> {
    entries.and_then(|e| e.into_iter().next()).map(|e| e.name)
}

fn year_pattern() -> Option<&'static Regex> {
    static YEAR: OnceLock<Option<Regex>> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\d{4}").ok()).as_ref()
}

/// Reduces a free-text publish date to its first four-digit run, if any.
pub fn extract_year(raw: &str) -> String {
    year_pattern()
        .and_then(|re| re.find(raw))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Parses a `jscmd=data` response keyed by `ISBN:<isbn>`.
///
/// An empty body, an empty object or a missing key all mean "not found".
/// The returned book carries no cover.
pub fn parse_response(isbn: &str, body: &str) -> Result<Option<Book>, ProviderError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let mut root: Map<String, Value> = serde_json::from_str(body)?;
    let Some(entry) = root.remove(&format!("ISBN:{isbn}")) else {
        return Ok(None);
    };
    let data: BookData = serde_json::from_value(entry)?;

    let title = data.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let authors = first_name(data.authors).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let publisher = first_name(data.publishers).unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string());
    let publication_date = data
        .publish_date
        .map(|raw| extract_year(&raw))
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());

    Ok(Some(
        Book::new(title, authors, publication_date, isbn.to_string()).with_publisher(publisher),
    ))
}

/// Open Library books API and covers service.
pub struct OpenLibraryProvider<T = ReqwestTransport> {
    transport: T,
    api_base: String,
    covers_base: String,
    min_cover_bytes: usize,
}

impl OpenLibraryProvider<ReqwestTransport> {
    pub fn from_config(config: &MetadataConfig) -> Result<Self, ProviderError> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: HttpTransport> OpenLibraryProvider<T> {
    pub fn with_transport(transport: T, config: &MetadataConfig) -> Self {
        Self {
            transport,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            covers_base: config.covers_base.trim_end_matches('/').to_string(),
            min_cover_bytes: config.min_cover_bytes,
        }
    }

    pub fn book_url(&self, isbn: &str) -> String {
        format!(
            "{}/api/books?bibkeys=ISBN:{}&jscmd=data&format=json",
            self.api_base, isbn
        )
    }

    pub fn cover_url(&self, isbn: &str) -> String {
        format!("{}/b/isbn/{}-M.jpg", self.covers_base, isbn)
    }
}

impl<T: HttpTransport> MetadataProvider for OpenLibraryProvider<T> {
    fn lookup(&self, isbn: &str) -> Result<Option<Book>, ProviderError> {
        info!("Querying Open Library for ISBN {}", isbn);
        let body = self.transport.get_text(&self.book_url(isbn))?;
        let Some(book) = parse_response(isbn, &body)? else {
            warn!("Open Library has no entry for ISBN {}", isbn);
            return Ok(None);
        };
        let cover = self.fetch_cover(isbn);
        Ok(Some(book.with_cover(cover)))
    }

    fn fetch_cover(&self, isbn: &str) -> Option<Vec<u8>> {
        match self.transport.get_bytes(&self.cover_url(isbn)) {
            // Undersized images are the provider's transparent placeholder.
            Ok(bytes) if bytes.is_empty() || bytes.len() < self.min_cover_bytes => {
                debug!(
                    "Cover for ISBN {} is only {} bytes, ignoring",
                    isbn,
                    bytes.len()
                );
                None
            }
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Could not download cover for ISBN {}: {}", isbn, e);
                None
            }
        }
    }
}

pub mod error;
pub mod openlibrary;
pub mod transport;

pub use error::ProviderError;
pub use openlibrary::{parse_response, OpenLibraryProvider};
pub use transport::{HttpTransport, ReqwestTransport};

use crate::model::Book;

/// External bibliographic lookup by ISBN.
pub trait MetadataProvider {
    /// `Ok(None)` means the provider answered but knows nothing about the ISBN.
    fn lookup(&self, isbn: &str) -> Result<Option<Book>, ProviderError>;

    /// Cover bytes for the ISBN. Failures are absorbed and reported as `None`.
    fn fetch_cover(&self, isbn: &str) -> Option<Vec<u8>>;
}

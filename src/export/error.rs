use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("serde_json::to_string error: {0}")]
    JsonToString(#[from] serde_json::Error),
}

impl ExportError {
    /// Collapses any export failure into the I/O error the caller reports.
    pub fn into_io(self) -> std::io::Error {
        match self {
            ExportError::Io(e) => e,
            ExportError::Csv(e) if e.is_io_error() => match e.into_kind() {
                csv::ErrorKind::Io(e) => e,
                other => std::io::Error::other(format!("{other:?}")),
            },
            other => std::io::Error::other(other.to_string()),
        }
    }
}

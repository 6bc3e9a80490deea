//! Bulk CSV import.
//!
//! Rows are merged into the store by ISBN: a row whose ISBN is already stored
//! rewrites that book's title, authors, publisher and date, any other row
//! creates a new book. Required fields are not re-validated here; a row with a
//! blank title is imported as-is.
//!
//! The whole file is read and merged before anything is written, and the
//! merged batch goes through [`RecordStore::save_all`], so an import either
//! lands completely or not at all.

use crate::catalog::{CatalogError, CatalogResult};
use crate::model::{Book, ImportReport, ImportRow};
use crate::store::RecordStore;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, info};

pub const ISBN_COLUMN: &str = "ISBN";
pub const TITLE_COLUMN: &str = "Titulo";
pub const AUTHORS_COLUMN: &str = "Autores";
pub const PUBLISHER_COLUMN: &str = "Editora";
pub const DATE_COLUMN: &str = "Data";

/// Header positions of the recognised columns. Only ISBN is mandatory.
struct Columns {
    isbn: usize,
    title: Option<usize>,
    authors: Option<usize>,
    publisher: Option<usize>,
    date: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> CatalogResult<Self> {
        if headers.iter().all(|h| h.is_empty()) {
            return Err(CatalogError::EmptyOrMalformed(
                "missing header row".to_string(),
            ));
        }
        let find = |name: &str| headers.iter().position(|h| h == name);
        let isbn = find(ISBN_COLUMN).ok_or_else(|| {
            error!("CSV header has no {} column", ISBN_COLUMN);
            CatalogError::EmptyOrMalformed(format!("column '{ISBN_COLUMN}' not found"))
        })?;
        Ok(Self {
            isbn,
            title: find(TITLE_COLUMN),
            authors: find(AUTHORS_COLUMN),
            publisher: find(PUBLISHER_COLUMN),
            date: find(DATE_COLUMN),
        })
    }

    fn read(&self, record: &StringRecord) -> ImportRow {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };
        ImportRow {
            isbn: get(Some(self.isbn)),
            title: get(self.title),
            authors: get(self.authors),
            publisher: get(self.publisher),
            publication_date: get(self.date),
        }
    }
}

fn csv_error(err: csv::Error) -> CatalogError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => CatalogError::Io(e),
        _ => CatalogError::EmptyOrMalformed(message),
    }
}

/// Imports the CSV file at `path`.
pub fn import_csv<S: RecordStore>(store: &mut S, path: &Path) -> CatalogResult<ImportReport> {
    info!("Starting CSV import from {}", path.display());
    if !path.exists() {
        error!("CSV file not found: {}", path.display());
        return Err(CatalogError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    import_from_reader(store, file)
}

/// Imports CSV text from any reader.
pub fn import_from_reader<S: RecordStore, R: Read>(
    store: &mut S,
    reader: R,
) -> CatalogResult<ImportReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::locate(rdr.headers().map_err(csv_error)?)?;

    let mut report = ImportReport::new();
    let mut pending: Vec<Book> = Vec::new();
    // ISBN -> index in `pending`, so a repeated ISBN updates the earlier row.
    let mut staged: HashMap<String, usize> = HashMap::new();

    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        let row = columns.read(&record);

        if let Some(&idx) = staged.get(&row.isbn) {
            debug!("Updating book staged earlier in this file. ISBN: {}", row.isbn);
            pending[idx] = pending[idx].merge_import_row(&row);
            report.record_updated();
            continue;
        }

        let isbn = row.isbn.clone();
        let book = match store.find_by_isbn(&isbn)? {
            Some(existing) => {
                debug!("Updating existing book. ISBN: {}", isbn);
                report.record_updated();
                existing.merge_import_row(&row)
            }
            None => {
                debug!("Creating new book. ISBN: {}", isbn);
                report.record_created();
                row.into_book()
            }
        };
        staged.insert(isbn, pending.len());
        pending.push(book);
    }

    store.save_all(pending)?;
    info!(
        "Import finished. Read: {}, created: {}, updated: {}",
        report.total_read, report.created, report.updated
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookId;
    use crate::store::{MemoryStore, SqliteStore};
    use std::fs;

    const HEADER: &str = "ISBN,Titulo,Autores,Editora,Data\n";

    #[test]
    fn test_import_creates_new_book() {
        let mut store = MemoryStore::new();
        let csv = format!("{HEADER}978-123,Livro Teste,Autor Teste,Editora Teste,2023");
        let report = import_from_reader(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(
            report,
            ImportReport {
                created: 1,
                updated: 0,
                total_read: 1
            }
        );
        let book = store.find_by_isbn("978-123").unwrap().unwrap();
        assert_eq!(book.title, "Livro Teste");
        assert_eq!(book.publisher(), Some("Editora Teste"));
        assert_eq!(book.publication_date, "2023");
    }

    #[test]
    fn test_import_updates_existing_in_place() {
        let mut store = MemoryStore::new();
        let existing = store
            .save(
                Book::new(
                    "Titulo Antigo".to_string(),
                    "Autor Antigo".to_string(),
                    "1990".to_string(),
                    "978-456".to_string(),
                )
                .with_related_titles("keep me"),
            )
            .unwrap();
        let csv = format!("{HEADER}978-456,Titulo Novo,Autor Novo,Ed Nova,2024\n");
        let report = import_from_reader(&mut store, csv.as_bytes()).unwrap();
        assert_eq!((report.created, report.updated), (0, 1));

        let book = store.find_by_isbn("978-456").unwrap().unwrap();
        assert_eq!(book.id, existing.id);
        assert_eq!(book.title, "Titulo Novo");
        assert_eq!(book.related_titles.as_deref(), Some("keep me"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_import_trims_and_tolerates_missing_optional_columns() {
        let mut store = MemoryStore::new();
        let csv = "Extra, ISBN ,Titulo\nx,  111  ,  Spaced Out  \n";
        let report = import_from_reader(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(report.created, 1);
        let book = store.find_by_isbn("111").unwrap().unwrap();
        assert_eq!(book.title, "Spaced Out");
        assert_eq!(book.authors, "");
        assert_eq!(book.publisher, None);
    }

    #[test]
    fn test_repeated_isbn_in_file_counts_as_update() {
        let mut store = MemoryStore::new();
        let csv = format!("{HEADER}1,First,A,P,2000\n1,Second,B,P,2001\n");
        let report = import_from_reader(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(
            report,
            ImportReport {
                created: 1,
                updated: 1,
                total_read: 2
            }
        );
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.find_by_id(BookId(1)).unwrap().unwrap().title, "Second");
    }

    #[test]
    fn test_missing_file() {
        let mut store = MemoryStore::new();
        let err = import_csv(&mut store, Path::new("path/that/does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound(_)));
    }

    #[test]
    fn test_missing_isbn_column() {
        let mut store = MemoryStore::new();
        let err = import_from_reader(&mut store, "Titulo,Autores\nLivro Sem ISBN,Autor X".as_bytes())
            .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyOrMalformed(_)));

        let err = import_from_reader(&mut store, "Isto não é um CSV válido @#$$%".as_bytes())
            .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyOrMalformed(_)));
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vazio.csv");
        fs::write(&path, "").unwrap();
        let mut store = MemoryStore::new();
        let err = import_csv(&mut store, &path).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyOrMalformed(_)));
    }

    #[test]
    fn test_malformed_row_aborts_whole_import() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let csv = format!("{HEADER}1,Ok,A,P,2000\n2,Too,Many,Fields,2000,extra\n");
        let err = import_from_reader(&mut store, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyOrMalformed(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_blank_required_fields_are_accepted() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let csv = format!("{HEADER}42,,,,\n");
        let report = import_from_reader(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(report.created, 1);
        let book = store.find_by_isbn("42").unwrap().unwrap();
        assert!(book.title.is_empty());
    }
}

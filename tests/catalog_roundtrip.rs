use book_catalog::metadata::{MetadataProvider, ProviderError};
use book_catalog::store::{MemoryStore, SqliteStore};
use book_catalog::{Book, CatalogError, CatalogService, ImportReport};
use std::fs;

struct NoProvider;

impl MetadataProvider for NoProvider {
    fn lookup(&self, _isbn: &str) -> Result<Option<Book>, ProviderError> {
        Ok(None)
    }

    fn fetch_cover(&self, _isbn: &str) -> Option<Vec<u8>> {
        None
    }
}

fn seed(isbn: &str, title: &str, publisher: &str) -> Book {
    Book::new(
        title.to_string(),
        "Autor, Com Vírgula".to_string(),
        "2001".to_string(),
        isbn.to_string(),
    )
    .with_publisher(publisher)
}

#[test]
fn export_then_import_into_same_catalog_updates_every_book() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");
    let mut catalog = CatalogService::new(SqliteStore::open(&db).unwrap(), NoProvider);
    catalog.save(seed("978-1", "Grande Sertão: Veredas", "Nova Fronteira")).unwrap();
    catalog.save(seed("978-2", "Quote \"this\"\nand a newline", "")).unwrap();
    catalog.save(seed("978-3", "百年の孤独", "Shinchosha")).unwrap();
    let before = catalog.list_all().unwrap();

    let exported = catalog.export_csv(&dir.path().join("backup")).unwrap();
    let report = catalog.import_csv(&exported).unwrap();

    assert_eq!(
        report,
        ImportReport {
            created: 0,
            updated: 3,
            total_read: 3
        }
    );
    let after = catalog.list_all().unwrap();
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.title, new.title);
        assert_eq!(old.authors, new.authors);
    }
}

#[test]
fn export_then_import_into_empty_catalog_recreates_books() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = CatalogService::new(MemoryStore::new(), NoProvider);
    source.save(seed("1", "Um", "Rocco")).unwrap();
    source.save(seed("2", "Dois", "Arqueiro")).unwrap();
    let exported = source.export_csv(&dir.path().join("out.csv")).unwrap();

    let mut target = CatalogService::new(MemoryStore::new(), NoProvider);
    let report = target.import_csv(&exported).unwrap();
    assert_eq!((report.created, report.updated), (2, 0));
    assert_eq!(target.count_distinct_publishers().unwrap(), 2);
    assert_eq!(target.find_by_isbn("2").unwrap().title, "Dois");
}

#[test]
fn header_only_file_without_isbn_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_isbn.csv");
    fs::write(&path, "Titulo,Autores,Editora,Data\n").unwrap();
    let mut catalog = CatalogService::new(MemoryStore::new(), NoProvider);
    let err = catalog.import_csv(&path).unwrap_err();
    assert!(matches!(err, CatalogError::EmptyOrMalformed(_)));
    assert!(!err.is_technical());
}

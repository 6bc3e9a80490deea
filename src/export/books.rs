use super::{Export, ExportError, ExportFormat};
use crate::model::Book;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: [&str; 6] = ["ID", "ISBN", "Titulo", "Autores", "Editora", "Data"];

#[derive(Serialize)]
struct BookExportRow<'a> {
    id: Option<i64>,
    isbn: &'a str,
    title: &'a str,
    authors: &'a str,
    publisher: Option<&'a str>,
    publication_date: &'a str,
    related_titles: Option<&'a str>,
    has_cover: bool,
}

fn to_export_row(book: &Book) -> BookExportRow<'_> {
    BookExportRow {
        id: book.id.map(|id| id.0),
        isbn: &book.isbn,
        title: &book.title,
        authors: &book.authors,
        publisher: book.publisher(),
        publication_date: &book.publication_date,
        related_titles: book.related_titles.as_deref(),
        has_cover: book.has_cover(),
    }
}

/// Writes the fixed six-column CSV, header first even when `books` is empty.
pub fn write_csv<W: Write>(books: &[Book], writer: W) -> Result<W, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for book in books {
        let id = book.id.map(|id| id.to_string()).unwrap_or_default();
        wtr.write_record([
            id.as_str(),
            book.isbn.as_str(),
            book.title.as_str(),
            book.authors.as_str(),
            book.publisher().unwrap_or_default(),
            book.publication_date.as_str(),
        ])?;
    }
    wtr.flush()?;
    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

fn md_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

impl Export for [Book] {
    fn to_csv(&self) -> Result<String, ExportError> {
        Ok(String::from_utf8(write_csv(self, vec![])?)?)
    }

    fn to_md(&self) -> Result<String, ExportError> {
        let mut buffer = Vec::new();

        writeln!(buffer, "| ID | ISBN | Title | Authors | Publisher | Date |")?;
        writeln!(buffer, "|----|------|-------|---------|-----------|------|")?;

        for book in self {
            let id = book
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            writeln!(
                buffer,
                "| {} | {} | {} | {} | {} | {} |",
                id,
                md_cell(&book.isbn),
                md_cell(&book.title),
                md_cell(&book.authors),
                md_cell(book.publisher().unwrap_or("N/A")),
                md_cell(&book.publication_date)
            )?;
        }
        Ok(String::from_utf8(buffer)?)
    }

    fn to_json(&self) -> Result<String, ExportError> {
        let rows: Vec<BookExportRow> = self.iter().map(to_export_row).collect();
        serde_json::to_string(&rows).map_err(ExportError::JsonToString)
    }
}

/// Appends the format's extension unless the name already ends with it.
pub fn with_extension(path: &Path, format: ExportFormat) -> PathBuf {
    let ext = format.extension();
    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if has_ext {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }
}

/// Writes `books` to `path` in `format`, replacing any existing file.
/// Returns the path actually written.
pub fn export_books(
    books: &[Book],
    format: ExportFormat,
    path: &Path,
) -> Result<PathBuf, ExportError> {
    let path = with_extension(path, format);
    info!(
        "Exporting {} books as {:?} to {}",
        books.len(),
        format,
        path.display()
    );
    let file = BufWriter::new(File::create(&path)?);
    match format {
        ExportFormat::Csv => {
            write_csv(books, file)?.flush()?;
        }
        ExportFormat::Markdown => write_all(file, books.to_md()?)?,
        ExportFormat::Json => write_all(file, books.to_json()?)?,
    }
    Ok(path)
}

fn write_all<W: Write>(mut writer: W, text: String) -> Result<(), ExportError> {
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookId;
    use std::fs;

    fn get_test_books() -> Vec<Book> {
        let mut first = Book::new(
            "Memórias Póstumas".to_string(),
            "Machado de Assis".to_string(),
            "1881".to_string(),
            "978-85".to_string(),
        )
        .with_publisher("Garnier");
        first.id = Some(BookId(1));
        let mut second = Book::new(
            "War, and Peace".to_string(),
            "Leo Tolstoy".to_string(),
            "1869".to_string(),
            "978-0".to_string(),
        )
        .with_cover(Some(vec![1; 200]));
        second.id = Some(BookId(2));
        vec![first, second]
    }

    #[test]
    fn test_books_to_csv() {
        let books = get_test_books();
        let expected = [
            "ID,ISBN,Titulo,Autores,Editora,Data",
            "1,978-85,Memórias Póstumas,Machado de Assis,Garnier,1881",
            "2,978-0,\"War, and Peace\",Leo Tolstoy,,1869",
            "",
        ]
        .join("\n");
        assert_eq!(books.to_csv().unwrap(), expected);
    }

    #[test]
    fn test_empty_catalog_csv_is_header_only() {
        let books: Vec<Book> = Vec::new();
        assert_eq!(books.to_csv().unwrap(), "ID,ISBN,Titulo,Autores,Editora,Data\n");
    }

    #[test]
    fn test_books_to_md() {
        let books = get_test_books();
        let expected = [
            "| ID | ISBN | Title | Authors | Publisher | Date |",
            "|----|------|-------|---------|-----------|------|",
            "| 1 | 978-85 | Memórias Póstumas | Machado de Assis | Garnier | 1881 |",
            "| 2 | 978-0 | War, and Peace | Leo Tolstoy | N/A | 1869 |",
            "",
        ]
        .join("\n");
        assert_eq!(books.to_md().unwrap(), expected);
    }

    #[test]
    fn test_books_to_json_hides_cover_bytes() {
        let books = get_test_books();
        let json = books.to_json().unwrap();
        assert!(json.contains("\"has_cover\":true"));
        assert!(json.contains("\"isbn\":\"978-85\""));
        assert!(!json.contains("cover_image"));
    }

    #[test]
    fn test_extension_rule() {
        assert_eq!(
            with_extension(Path::new("out"), ExportFormat::Csv),
            PathBuf::from("out.csv")
        );
        assert_eq!(
            with_extension(Path::new("out.CSV"), ExportFormat::Csv),
            PathBuf::from("out.CSV")
        );
        assert_eq!(
            with_extension(Path::new("out.csv"), ExportFormat::Json),
            PathBuf::from("out.csv.json")
        );
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("acervo.csv");
        fs::write(&target, "stale content that is longer than the header\n".repeat(10)).unwrap();

        let written = export_books(&[], ExportFormat::Csv, &dir.path().join("acervo")).unwrap();
        assert_eq!(written, target);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "ID,ISBN,Titulo,Autores,Editora,Data\n"
        );
    }
}

use book_catalog::export::Export;
use book_catalog::store::{RecordStore, SqliteStore};
use book_catalog::Statistics;
use std::env;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = env::args().nth(1).or_else(|| env::var("BOOK_CATALOG_DB").ok());
    let db_path = db_path.ok_or_else(|| {
        "Usage: cargo run --example inspect -- /path/to/catalog.sqlite3 (or set BOOK_CATALOG_DB)"
            .to_string()
    })?;

    let store = SqliteStore::open(&db_path)?;
    let books = store.find_all()?;

    println!("books: {}", store.count()?);
    println!("publishers: {}", books.distinct_publishers());
    match books.most_recent_title() {
        Some(title) => println!("most recent: {}", title),
        None => println!("most recent: none"),
    }
    println!(
        "with cover: {}",
        books.iter().filter(|b| b.has_cover()).count()
    );

    if !books.is_empty() {
        println!();
        print!("{}", books.to_md()?);
    }
    Ok(())
}

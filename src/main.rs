use book_catalog::config::Config;
use book_catalog::export::{Export, ExportFormat};
use book_catalog::metadata::OpenLibraryProvider;
use book_catalog::store::SqliteStore;
use book_catalog::{Book, BookId, CatalogError, CatalogService, SearchField};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

type Catalog = CatalogService<SqliteStore, OpenLibraryProvider>;

#[derive(Parser)]
#[command(name = "book-catalog", version, about = "Manage a personal book catalog")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database, overriding the config file
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new book
    Add(BookArgs),
    /// Edit a stored book; omitted fields keep their value
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// List every book, or those matching a search term
    List {
        #[arg(long, value_enum, default_value_t = FormatArg::Md)]
        format: FormatArg,
        /// Case-insensitive text to look for
        #[arg(long)]
        search: Option<String>,
        /// Field the search term is matched against
        #[arg(long, value_enum, default_value_t = FieldArg::All)]
        field: FieldArg,
    },
    /// Show one book by id or ISBN
    Show {
        #[arg(long, conflicts_with = "isbn", required_unless_present = "isbn")]
        id: Option<i64>,
        #[arg(long)]
        isbn: Option<String>,
    },
    /// Delete a book by id
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Merge a CSV file into the catalog
    Import { file: PathBuf },
    /// Write the catalog to a file
    Export {
        destination: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,
    },
    /// Fetch a book from Open Library
    Lookup {
        isbn: String,
        /// Store the result (updating a local book with the same ISBN)
        #[arg(long)]
        save: bool,
    },
    /// Download the cover image for an ISBN
    Cover {
        isbn: String,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Catalog counters
    Stats,
}

#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    authors: String,
    #[arg(long)]
    date: String,
    #[arg(long)]
    isbn: String,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    related: Option<String>,
    /// Image file to attach as the cover
    #[arg(long)]
    cover: Option<PathBuf>,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    authors: Option<String>,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    related: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Md,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    All,
    Title,
    Authors,
    Publisher,
    Isbn,
}

impl From<FieldArg> for SearchField {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::All => SearchField::All,
            FieldArg::Title => SearchField::Title,
            FieldArg::Authors => SearchField::Authors,
            FieldArg::Publisher => SearchField::Publisher,
            FieldArg::Isbn => SearchField::Isbn,
        }
    }
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Md => ExportFormat::Markdown,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

fn open_catalog(cli: &Cli) -> Result<Catalog, Box<dyn Error>> {
    let config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let database = cli.database.clone().unwrap_or(config.database_path);
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let store = SqliteStore::open(&database)?;
    let provider = OpenLibraryProvider::from_config(&config.metadata)?;
    Ok(CatalogService::new(store, provider))
}

fn print_books(books: &[Book], format: FormatArg) -> Result<(), Box<dyn Error>> {
    let text = match format {
        FormatArg::Csv => books.to_csv()?,
        FormatArg::Md => books.to_md()?,
        FormatArg::Json => books.to_json()?,
    };
    print!("{text}");
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut catalog = open_catalog(&cli)?;
    match cli.command {
        Command::Add(args) => {
            let cover = args.cover.map(fs::read).transpose()?;
            let mut book = Book::new(args.title, args.authors, args.date, args.isbn).with_cover(cover);
            book.publisher = args.publisher;
            book.related_titles = args.related;
            let saved = catalog.save(book)?;
            println!("saved book {}", saved.id.map(|id| id.to_string()).unwrap_or_default());
        }
        Command::Update { id, fields } => {
            let current = catalog.get_by_id(BookId(id))?;
            let book = Book {
                title: fields.title.unwrap_or(current.title),
                authors: fields.authors.unwrap_or(current.authors),
                publication_date: fields.date.unwrap_or(current.publication_date),
                isbn: fields.isbn.unwrap_or(current.isbn),
                publisher: fields.publisher.or(current.publisher),
                related_titles: fields.related.or(current.related_titles),
                ..current
            };
            catalog.save(book)?;
            println!("updated book {id}");
        }
        Command::List {
            format,
            search,
            field,
        } => {
            let books = match search {
                Some(term) => catalog.search(&term, field.into())?,
                None => catalog.list_all()?,
            };
            print_books(&books, format)?
        }
        Command::Show { id, isbn } => {
            let book = match id {
                Some(id) => catalog.get_by_id(BookId(id))?,
                None => catalog.find_by_isbn(&isbn.unwrap_or_default())?,
            };
            print_books(std::slice::from_ref(&book), FormatArg::Md)?;
            if let Some(related) = &book.related_titles {
                println!("\nRelated: {related}");
            }
        }
        Command::Delete { id } => {
            catalog.delete_by_id(BookId(id))?;
            println!("deleted book {id}");
        }
        Command::Import { file } => {
            let report = catalog.import_csv(&file)?;
            println!(
                "read {} rows: {} created, {} updated",
                report.total_read, report.created, report.updated
            );
        }
        Command::Export { destination, format } => {
            let path = catalog.export(&destination, format.into())?;
            println!("exported to {}", path.display());
        }
        Command::Lookup { isbn, save } => {
            let book = if save {
                catalog.enrich(&isbn)?
            } else {
                catalog.lookup_external(&isbn)?
            };
            print_books(std::slice::from_ref(&book), FormatArg::Md)?;
            if save {
                let saved = catalog.save(book)?;
                println!("saved book {}", saved.id.map(|id| id.to_string()).unwrap_or_default());
            }
        }
        Command::Cover { isbn, output } => match catalog.fetch_cover_image(&isbn) {
            Some(bytes) => {
                fs::write(&output, &bytes)?;
                println!("wrote {} bytes to {}", bytes.len(), output.display());
            }
            None => println!("no cover available for {isbn}"),
        },
        Command::Stats => println!("{}", catalog.summary()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            match e.downcast_ref::<CatalogError>() {
                Some(err) if err.is_technical() => eprintln!("error: {e} (you may retry)"),
                _ => eprintln!("error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}

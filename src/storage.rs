//! Storage backends for books and comments.
//!
//! Exactly one backend serves a running instance. It is picked in [`open`]
//! and never swapped afterwards.

mod file;

pub use file::{FileStore, read_json_array};

use crate::catalog::{Book, NewBook};
use crate::config::{Backend, Config};
use crate::db::{Comment, Database, NewComment};
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Persistence used by the HTTP handlers.
pub trait Storage: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> Backend;

    /// Book records as the listing endpoint returns them.
    fn list_records(&self, limit: usize) -> Result<Vec<Value>>;

    /// Typed books for the page and filters.
    fn list_books(&self, limit: usize) -> Result<Vec<Book>>;

    /// Total number of stored books.
    fn count_books(&self) -> Result<usize>;

    /// Store a new book and return its ID.
    fn create_book(&self, book: NewBook) -> Result<String>;

    /// Store a comment and return its ID.
    fn add_comment(&self, comment: NewComment) -> Result<i64>;

    /// Comments recorded for a book.
    fn list_comments(&self, book_id: &str) -> Result<Vec<Comment>>;

    /// Number of comments per book ID.
    fn comment_counts(&self) -> Result<HashMap<String, usize>>;
}

impl Storage for Database {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn list_records(&self, limit: usize) -> Result<Vec<Value>> {
        let books = Database::list_books(self, limit)?;
        Ok(books
            .into_iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<_>>()?)
    }

    fn list_books(&self, limit: usize) -> Result<Vec<Book>> {
        Database::list_books(self, limit)
    }

    fn count_books(&self) -> Result<usize> {
        Database::book_count(self)
    }

    fn create_book(&self, book: NewBook) -> Result<String> {
        Database::create_book(self, book)
    }

    fn add_comment(&self, comment: NewComment) -> Result<i64> {
        Database::add_comment(self, &comment)
    }

    fn list_comments(&self, book_id: &str) -> Result<Vec<Comment>> {
        Database::list_comments(self, book_id)
    }

    fn comment_counts(&self) -> Result<HashMap<String, usize>> {
        Database::comment_counts(self)
    }
}

impl Storage for FileStore {
    fn backend(&self) -> Backend {
        Backend::File
    }

    // The dataset is returned as stored: no ordering or limit.
    fn list_records(&self, _limit: usize) -> Result<Vec<Value>> {
        FileStore::records(self)
    }

    fn list_books(&self, _limit: usize) -> Result<Vec<Book>> {
        FileStore::list_books(self)
    }

    fn count_books(&self) -> Result<usize> {
        FileStore::count_books(self)
    }

    fn create_book(&self, book: NewBook) -> Result<String> {
        FileStore::create_book(self, book)
    }

    fn add_comment(&self, comment: NewComment) -> Result<i64> {
        FileStore::add_comment(self, comment)
    }

    fn list_comments(&self, book_id: &str) -> Result<Vec<Comment>> {
        FileStore::list_comments(self, book_id)
    }

    fn comment_counts(&self) -> Result<HashMap<String, usize>> {
        FileStore::comment_counts(self)
    }
}

/// Build the file backend from config.
pub fn file_store(config: &Config) -> FileStore {
    FileStore::new(
        &config.files.seed,
        &config.files.comments,
        &config.files.default_cover,
    )
}

/// Open the database and seed it from the dataset file if it has no books.
pub fn open_database(config: &Config) -> Result<Database> {
    let db =
        Database::open(&config.database.path)?.with_default_cover(&config.files.default_cover);

    if db.book_count()? == 0 {
        match read_json_array::<Value>(&config.files.seed) {
            Ok(records) if !records.is_empty() => {
                let imported = db.import_books(&Book::from_records(records))?;
                tracing::info!(
                    count = imported,
                    seed = %config.files.seed.display(),
                    "Seeded empty database"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(seed = %config.files.seed.display(), error = %e, "Could not read seed file");
            }
        }
    }

    Ok(db)
}

/// Select the storage backend for this run.
///
/// With `storage.fallback_to_file`, a database that cannot be opened makes
/// the whole run use the file backend.
pub fn open(config: &Config) -> Result<Arc<dyn Storage>> {
    match config.storage.backend {
        Backend::File => Ok(Arc::new(file_store(config))),
        Backend::Sqlite => match open_database(config) {
            Ok(db) => Ok(Arc::new(db)),
            Err(e) if config.storage.fallback_to_file => {
                tracing::warn!(
                    error = %e,
                    database = %config.database.path.display(),
                    seed = %config.files.seed.display(),
                    "Database unavailable, using file storage"
                );
                Ok(Arc::new(file_store(config)))
            }
            Err(e) => Err(e),
        },
    }
}

/// Outcome of [`import_files`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Books added to the database.
    pub books: usize,
    /// Comments added to the database.
    pub comments: usize,
}

/// Copy records written by the file backend into the database.
///
/// Records whose IDs already exist are skipped, so repeated runs are no-ops.
pub fn import_files(db: &Database, files: &FileStore) -> Result<ImportReport> {
    let books = db.import_books(&files.list_books()?)?;
    let comments = db.import_comments(&files.all_comments()?)?;
    Ok(ImportReport { books, comments })
}

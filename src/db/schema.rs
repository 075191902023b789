use crate::catalog::{Book, NewBook};
use crate::config;
use crate::db::*;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Database wrapper for thread-safe access.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    default_cover: Arc<str>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        Self::with_connection(conn)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            default_cover: config::default_cover().into(),
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Cover URL reported for books stored without one.
    pub fn with_default_cover(mut self, cover: &str) -> Self {
        self.default_cover = cover.into();
        self
    }

    /// Initialize database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            -- Books table
            CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                author TEXT NOT NULL DEFAULT '',
                year INTEGER,
                atmosphere TEXT NOT NULL DEFAULT '',
                pace TEXT NOT NULL DEFAULT '',
                hero TEXT NOT NULL DEFAULT '',
                style TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                cover_url TEXT,
                created_at INTEGER NOT NULL
            );

            -- Comments table (book_id deliberately has no foreign key)
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id TEXT NOT NULL,
                username TEXT,
                text TEXT,
                rating TEXT NOT NULL DEFAULT 'null',
                created_at TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_books_created ON books(created_at);
            CREATE INDEX IF NOT EXISTS idx_comments_book ON comments(book_id);
            "#,
        )
        .map_err(|e| AppError::Internal(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    // ========== BOOK OPERATIONS ==========

    /// Insert a new book with a generated ID.
    pub fn create_book(&self, book: NewBook) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert_book(&book.into_book(id.clone()), now_millis())?;
        Ok(id)
    }

    /// Insert a book, keeping its ID. Returns false if the ID already exists.
    pub fn insert_book(&self, book: &Book, created_at: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO books
                (id, title, author, year, atmosphere, pace, hero, style, description, cover_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                book.id,
                book.title,
                book.author,
                book.year,
                book.atmosphere,
                book.pace,
                book.hero,
                book.style,
                book.description,
                book.cover,
                created_at,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Import books that are not in the database yet.
    ///
    /// All imported rows share one timestamp and are inserted back to front,
    /// so the listing returns them in the order given.
    pub fn import_books(&self, books: &[Book]) -> Result<usize> {
        let created_at = now_millis();
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut imported = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO books
                    (id, title, author, year, atmosphere, pace, hero, style, description, cover_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;

            for book in books.iter().rev() {
                imported += stmt.execute(params![
                    book.id,
                    book.title,
                    book.author,
                    book.year,
                    book.atmosphere,
                    book.pace,
                    book.hero,
                    book.style,
                    book.description,
                    book.cover,
                    created_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(imported)
    }

    /// Most recently created books first.
    pub fn list_books(&self, limit: usize) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, author, year, atmosphere, pace, hero, style, description, cover_url
             FROM books ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let books = stmt
            .query_map(params![limit], |row| self.row_to_book(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(books)
    }

    /// Number of stored books.
    pub fn book_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_book(&self, row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
        let cover: Option<String> = row.get(9)?;
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            year: row.get(3)?,
            atmosphere: row.get(4)?,
            pace: row.get(5)?,
            hero: row.get(6)?,
            style: row.get(7)?,
            description: row.get(8)?,
            cover: Some(cover.unwrap_or_else(|| self.default_cover.to_string())),
        })
    }

    // ========== COMMENT OPERATIONS ==========

    /// Append a comment, returning its ID.
    pub fn add_comment(&self, comment: &NewComment) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO comments (book_id, username, text, rating, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.book_id,
                comment.user,
                comment.text,
                serde_json::to_string(&comment.rating)?,
                now_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Import comments keeping their IDs. Existing IDs are skipped.
    pub fn import_comments(&self, comments: &[Comment]) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut imported = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO comments (id, book_id, username, text, rating, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for comment in comments {
                imported += stmt.execute(params![
                    comment.id,
                    comment.book_id,
                    comment.user,
                    comment.text,
                    serde_json::to_string(&comment.rating)?,
                    comment.created_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(imported)
    }

    /// Number of comments per book ID.
    pub fn comment_counts(&self) -> Result<HashMap<String, usize>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT book_id, COUNT(*) FROM comments GROUP BY book_id")?;

        let counts = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, count as usize))
            })?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;

        Ok(counts)
    }

    /// Comments for a book, oldest first.
    pub fn list_comments(&self, book_id: &str) -> Result<Vec<Comment>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, book_id, username, text, rating, created_at
             FROM comments WHERE book_id = ?1 ORDER BY id",
        )?;

        let comments = stmt
            .query_map(params![book_id], |row| {
                let rating: String = row.get(4)?;
                Ok(Comment {
                    id: row.get(0)?,
                    book_id: row.get(1)?,
                    user: row.get(2)?,
                    text: row.get(3)?,
                    rating: serde_json::from_str(&rating)
                        .unwrap_or(serde_json::Value::String(rating)),
                    created_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(comments)
    }
}

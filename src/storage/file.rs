//! JSON-file backend: the seed dataset doubles as the book store and an
//! append-only comments file holds comments.

use crate::catalog::{Book, NewBook, record_id};
use crate::db::{Comment, NewComment, now_millis, now_rfc3339};
use crate::error::Result;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File-backed storage.
pub struct FileStore {
    seed: PathBuf,
    comments: PathBuf,
    default_cover: String,
    // Serialises read-modify-rewrite cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store over the given dataset and comments files.
    pub fn new(
        seed: impl Into<PathBuf>,
        comments: impl Into<PathBuf>,
        default_cover: impl Into<String>,
    ) -> Self {
        Self {
            seed: seed.into(),
            comments: comments.into(),
            default_cover: default_cover.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the book dataset.
    pub fn seed_path(&self) -> &Path {
        &self.seed
    }

    /// Path of the comments file.
    pub fn comments_path(&self) -> &Path {
        &self.comments
    }

    /// Dataset records exactly as stored.
    pub fn records(&self) -> Result<Vec<Value>> {
        read_json_array(&self.seed)
    }

    /// Typed view of the dataset. Malformed records are skipped.
    pub fn list_books(&self) -> Result<Vec<Book>> {
        Ok(Book::from_records(self.records()?))
    }

    /// Number of records in the dataset.
    pub fn count_books(&self) -> Result<usize> {
        Ok(self.records()?.len())
    }

    /// Prepend a book to the dataset under a random `b<n>` ID.
    ///
    /// Existing records are written back untouched.
    pub fn create_book(&self, mut book: NewBook) -> Result<String> {
        let _guard = self.write_lock.lock();
        let mut records = self.records()?;

        let id = loop {
            let candidate = format!("b{}", rand::random::<u32>() % 100_000);
            if !records
                .iter()
                .any(|r| record_id(r).as_deref() == Some(candidate.as_str()))
            {
                break candidate;
            }
        };

        if book.cover.is_none() {
            book.cover = Some(self.default_cover.clone());
        }
        records.insert(0, serde_json::to_value(book.into_book(id.clone()))?);
        write_json(&self.seed, &records)?;

        tracing::debug!(id = %id, path = %self.seed.display(), "Book written to dataset file");
        Ok(id)
    }

    /// Append a comment under a timestamp-derived ID.
    pub fn add_comment(&self, comment: NewComment) -> Result<i64> {
        let _guard = self.write_lock.lock();
        let mut comments: Vec<Comment> = read_json_array(&self.comments)?;

        // Keep IDs unique when two comments land in the same millisecond.
        let last = comments.iter().map(|c| c.id).max().unwrap_or(i64::MIN);
        let id = now_millis().max(last.saturating_add(1));

        comments.push(comment.into_comment(id, now_rfc3339()));
        write_json(&self.comments, &comments)?;
        Ok(id)
    }

    /// Every comment in the file.
    pub fn all_comments(&self) -> Result<Vec<Comment>> {
        read_json_array(&self.comments)
    }

    /// Comments for one book, in file order.
    pub fn list_comments(&self, book_id: &str) -> Result<Vec<Comment>> {
        Ok(self
            .all_comments()?
            .into_iter()
            .filter(|c| c.book_id == book_id)
            .collect())
    }

    /// Number of comments per book ID.
    pub fn comment_counts(&self) -> Result<HashMap<String, usize>> {
        let mut counts = HashMap::new();
        for comment in self.all_comments()? {
            *counts.entry(comment.book_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Read a JSON array file. A missing file is an empty array.
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

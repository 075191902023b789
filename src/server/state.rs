//! Application state shared across handlers.

use crate::catalog::{Book, NewBook};
use crate::config::{Backend, Config};
use crate::db::{Comment, NewComment, now_millis};
use crate::error::Result;
use crate::storage::Storage;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name used when an upload carries none.
const DEFAULT_COVER_NAME: &str = "cover.png";

/// Uploaded cover image.
#[derive(Debug, Clone)]
pub struct CoverUpload {
    /// Client-supplied file name.
    pub file_name: Option<String>,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Active storage backend.
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        Self {
            config: Arc::new(config),
            storage,
        }
    }

    /// Active backend.
    pub fn backend(&self) -> Backend {
        self.storage.backend()
    }

    /// Records for the listing endpoint.
    pub fn list_records(&self) -> Result<Vec<Value>> {
        self.storage.list_records(self.config.catalog.list_limit)
    }

    /// Books for the listing.
    pub fn list_books(&self) -> Result<Vec<Book>> {
        self.storage.list_books(self.config.catalog.list_limit)
    }

    /// Total number of stored books.
    pub fn count_books(&self) -> Result<usize> {
        self.storage.count_books()
    }

    /// Save an uploaded cover and return its public URL.
    pub fn save_cover(&self, upload: &CoverUpload) -> Result<String> {
        let uploads_dir = &self.config.files.uploads_dir;
        std::fs::create_dir_all(uploads_dir)?;

        let name = format!(
            "{}_{}",
            now_millis(),
            sanitize_file_name(upload.file_name.as_deref())
        );
        let path = uploads_dir.join(&name);
        std::fs::write(&path, &upload.data)?;

        tracing::debug!(path = %path.display(), bytes = upload.data.len(), "Saved cover upload");

        Ok(format!("/uploads/{}", urlencoding::encode(&name)))
    }

    /// Save the cover (if any) and store the book.
    pub fn create_book(&self, mut book: NewBook, cover: Option<CoverUpload>) -> Result<String> {
        if let Some(upload) = cover {
            book.cover = Some(self.save_cover(&upload)?);
        }

        let id = self.storage.create_book(book)?;
        tracing::info!(id = %id, backend = self.backend().as_str(), "Book created");
        Ok(id)
    }

    /// Store a comment.
    pub fn add_comment(&self, comment: NewComment) -> Result<i64> {
        let book_id = comment.book_id.clone();
        let id = self.storage.add_comment(comment)?;
        tracing::info!(id, book_id = %book_id, backend = self.backend().as_str(), "Comment added");
        Ok(id)
    }

    /// Comments for a book.
    pub fn list_comments(&self, book_id: &str) -> Result<Vec<Comment>> {
        self.storage.list_comments(book_id)
    }

    /// Number of comments per book ID.
    pub fn comment_counts(&self) -> Result<HashMap<String, usize>> {
        self.storage.comment_counts()
    }

    /// Directory served at `/uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.config.files.uploads_dir.clone()
    }

    /// Directory served at `/assets`.
    pub fn assets_dir(&self) -> PathBuf {
        self.config.files.assets_dir.clone()
    }
}

/// Keep only the last path component of a client file name.
fn sanitize_file_name(name: Option<&str>) -> String {
    name.and_then(|n| Path::new(n).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .unwrap_or(DEFAULT_COVER_NAME)
        .to_string()
}

//! HTTP request handlers.

use crate::catalog::{BrowseState, Filter, NewBook, parse_year};
use crate::db::{Comment, NewComment};
use crate::error::Result;
use crate::server::AppState;
use crate::server::page;
use crate::server::state::CoverUpload;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::Html,
};
use serde::{Deserialize, Serialize};

/// Response to a successful write.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Created<T> {
    /// Always true.
    pub ok: bool,
    /// ID of the new record.
    pub id: T,
}

impl<T> Created<T> {
    fn new(id: T) -> Self {
        Self { ok: true, id }
    }
}

// ============================================================================
// WEB PAGES
// ============================================================================

/// Catalog page, filtered by query parameters.
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<Filter>,
) -> Result<Html<String>> {
    let books = state.list_books()?;
    let comments = state.comment_counts()?;
    let browse = BrowseState::with_filter(filter);
    Ok(Html(page::render(
        &state.config.server.title,
        &browse,
        &books,
        &comments,
    )))
}

// ============================================================================
// BOOKS API
// ============================================================================

/// List books.
pub async fn api_books(State(state): State<AppState>) -> Result<Json<Vec<serde_json::Value>>> {
    Ok(Json(state.list_records()?))
}

/// Admin: create a book from a multipart form.
pub async fn admin_create_book(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Created<String>>> {
    let mut book = NewBook::default();
    let mut cover = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "cover" {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await?;
            // Browsers send an empty part when no file is chosen.
            if !data.is_empty() {
                cover = Some(CoverUpload {
                    file_name,
                    data: data.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "title" => book.title = value,
            "author" => book.author = value,
            "year" => book.year = parse_year(&value),
            "atmosphere" => book.atmosphere = value,
            "pace" => book.pace = value,
            "hero" => book.hero = value,
            "style" => book.style = value,
            "description" => book.description = value,
            _ => tracing::debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    let id = state.create_book(book, cover)?;
    Ok(Json(Created::new(id)))
}

// ============================================================================
// COMMENTS API
// ============================================================================

/// Comment request. Nothing is validated.
#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    /// Username.
    #[serde(default)]
    pub user: Option<String>,
    /// Comment body.
    #[serde(default)]
    pub text: Option<String>,
    /// Rating, recorded as sent.
    #[serde(default)]
    pub rating: serde_json::Value,
}

/// Add a comment to a book.
pub async fn add_comment(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Created<i64>>> {
    let id = state.add_comment(NewComment {
        book_id,
        user: req.user,
        text: req.text,
        rating: req.rating,
    })?;

    Ok(Json(Created::new(id)))
}

/// List comments for a book.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    Ok(Json(state.list_comments(&book_id)?))
}

// ============================================================================
// STATS API
// ============================================================================

/// Stats response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Active storage backend.
    pub backend: String,
    /// Number of stored books.
    pub total_books: usize,
}

/// API: storage backend and book count.
pub async fn api_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    Ok(Json(StatsResponse {
        backend: state.backend().as_str().to_string(),
        total_books: state.count_books()?,
    }))
}

//! Terminal client for the catalog API.

use crate::catalog::{Book, BrowseState};
use crate::error::Result;
use serde_json::Value;

/// Seed dataset compiled into the binary, used when the API is unreachable.
pub const BUNDLED_SEED: &str = include_str!("../frontend/db/seed.json");

/// Parse the bundled seed dataset.
pub fn bundled_seed() -> Result<Vec<Book>> {
    Ok(Book::from_records(serde_json::from_str(BUNDLED_SEED)?))
}

/// Fetch the book listing from the API.
pub async fn fetch_books(api_url: &str) -> Result<Vec<Book>> {
    let url = format!("{}/api/books", api_url.trim_end_matches('/'));
    let records = reqwest::get(&url)
        .await?
        .error_for_status()?
        .json::<Vec<Value>>()
        .await?;
    Ok(Book::from_records(records))
}

/// Fetch the listing, falling back to the bundled seed on any failure.
pub async fn load_books(api_url: &str) -> Vec<Book> {
    match fetch_books(api_url).await {
        Ok(books) => books,
        Err(e) => {
            tracing::warn!(api = api_url, error = %e, "API error, falling back to bundled seed");
            bundled_seed().unwrap_or_else(|e| {
                tracing::error!(error = %e, "Bundled seed is invalid");
                Vec::new()
            })
        }
    }
}

/// Render the visible books as text cards.
pub fn render(state: &BrowseState, books: &[Book]) -> String {
    let mut out = format!("Избранное: {}\n", state.favorites.len());

    let visible = state.visible(books);
    if visible.is_empty() {
        out.push_str("\nНичего не найдено\n");
        return out;
    }

    for book in visible {
        let heart = if state.favorites.contains(&book.id) {
            "❤"
        } else {
            " "
        };
        out.push_str(&format!("\n{} {}  [{}]\n", heart, book.title, book.id));
        out.push_str(&format!("  {}\n", book.byline()));
        if !book.description.is_empty() {
            out.push_str(&format!("  {}\n", book.excerpt()));
        }
        out.push_str(&format!(
            "  {} | {} | {} | {}\n",
            badge(&book.atmosphere),
            badge(&book.pace),
            badge(&book.hero),
            badge(&book.style)
        ));
    }

    out
}

fn badge(tag: &str) -> &str {
    if tag.is_empty() { "—" } else { tag }
}

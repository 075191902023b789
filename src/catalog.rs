//! Catalog model and the browsing logic shared by the web page and terminal client.

mod book;
mod favorites;
mod filter;

pub use book::{Book, EXCERPT_CHARS, NewBook, Year, parse_year, record_id};
pub use favorites::{FAVORITES_KEY, FavoriteSet, FavoriteStore};
pub use filter::{ATMOSPHERES, Filter, HEROES, PACES, STYLES};

use serde::{Deserialize, Serialize};

/// Everything that decides which cards are shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseState {
    /// Active filter.
    #[serde(default)]
    pub filter: Filter,
    /// Favorite book IDs.
    #[serde(default)]
    pub favorites: FavoriteSet,
    /// Restrict the listing to favorites.
    #[serde(default)]
    pub favorites_only: bool,
}

impl BrowseState {
    /// State with the given filter and no favorites.
    pub fn with_filter(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }

    /// Books to render, in listing order.
    pub fn visible<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        self.filter
            .apply(books)
            .into_iter()
            .filter(|b| !self.favorites_only || self.favorites.contains(&b.id))
            .collect()
    }

    /// Toggle a favorite. Returns true if it is now a favorite.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        self.favorites.toggle(id)
    }
}

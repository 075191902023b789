//! Client-side favorites kept in local storage.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage key for the favorites list (same key the web page uses in `localStorage`).
pub const FAVORITES_KEY: &str = "favs";

/// Ordered set of favorite book IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(Vec<String>);

impl FavoriteSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns true if it is now a favorite.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|f| f == id) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(id.to_string());
            true
        }
    }

    /// Check membership.
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|f| f == id)
    }

    /// Number of favorites.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no favorites.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = FavoriteSet::new();
        for id in iter {
            if !set.contains(&id) {
                set.0.push(id);
            }
        }
        set
    }
}

/// JSON-file key/value storage for the terminal client.
pub struct FavoriteStore {
    path: PathBuf,
}

impl FavoriteStore {
    /// Store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load favorites. A missing or unreadable file yields an empty set.
    pub fn load(&self) -> FavoriteSet {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return FavoriteSet::new(),
        };

        let mut entries: serde_json::Map<String, serde_json::Value> =
            match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt favorites file");
                    return FavoriteSet::new();
                }
            };

        entries
            .remove(FAVORITES_KEY)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Persist favorites, keeping any other keys in the file.
    pub fn save(&self, favorites: &FavoriteSet) -> Result<()> {
        let mut entries: serde_json::Map<String, serde_json::Value> =
            std::fs::read_to_string(&self.path)
                .ok()
                .and_then(|c| serde_json::from_str(&c).ok())
                .unwrap_or_default();

        entries.insert(FAVORITES_KEY.to_string(), serde_json::to_value(favorites)?);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

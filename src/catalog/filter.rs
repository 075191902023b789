//! Tag and text filtering over the loaded book list.

use super::Book;
use serde::{Deserialize, Serialize};

/// Atmosphere values offered by the filter form.
pub const ATMOSPHERES: &[&str] = &[
    "Уютная",
    "Мрачная",
    "Меланхоличная",
    "Надрывная",
    "Романтичная",
    "Постапокалипсис",
    "Ироничная",
];

/// Pace values offered by the filter form.
pub const PACES: &[&str] = &["Медленный", "Средний", "Быстрый"];

/// Hero archetypes offered by the filter form.
pub const HEROES: &[&str] = &["Антигерой", "Обычный человек", "Искатель", "Детектив"];

/// Style values offered by the filter form.
pub const STYLES: &[&str] = &["Лирический", "Ироничный", "Суровый", "Экспериментальный"];

/// Filter state. Empty fields match every book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Exact atmosphere.
    pub atmosphere: String,
    /// Exact pace.
    pub pace: String,
    /// Exact hero archetype.
    pub hero: String,
    /// Exact style.
    pub style: String,
    /// Case-insensitive substring of title, author or description.
    #[serde(alias = "q")]
    pub query: String,
}

impl Filter {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.atmosphere.is_empty()
            && self.pace.is_empty()
            && self.hero.is_empty()
            && self.style.is_empty()
            && self.query.is_empty()
    }

    /// Check a single book against every non-empty field.
    pub fn matches(&self, book: &Book) -> bool {
        if !tag_matches(&self.atmosphere, &book.atmosphere)
            || !tag_matches(&self.pace, &book.pace)
            || !tag_matches(&self.hero, &book.hero)
            || !tag_matches(&self.style, &book.style)
        {
            return false;
        }

        self.query.is_empty() || book.haystack().contains(&self.query.to_lowercase())
    }

    /// Books matching the filter, in their original order.
    pub fn apply<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        books.iter().filter(|b| self.matches(b)).collect()
    }
}

fn tag_matches(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

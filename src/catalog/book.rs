//! Book record as listed by the API and stored in the seed dataset.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Number of description characters shown on a card.
pub const EXCERPT_CHARS: usize = 140;

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Book title.
    #[serde(default)]
    pub title: String,

    /// Author name.
    #[serde(default)]
    pub author: String,

    /// Publication year.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_year"
    )]
    pub year: Option<Year>,

    /// Atmosphere tag (e.g. "Мрачная").
    #[serde(default)]
    pub atmosphere: String,

    /// Pace tag.
    #[serde(default)]
    pub pace: String,

    /// Hero archetype tag.
    #[serde(default)]
    pub hero: String,

    /// Writing style tag.
    #[serde(default)]
    pub style: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Cover URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

/// Publication year. Values that are not a plain number are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    /// Numeric year.
    Number(i64),
    /// Anything else, verbatim (e.g. "около 1850").
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(n) => write!(f, "{}", n),
            Year::Text(s) => f.write_str(s),
        }
    }
}

impl Book {
    /// Typed view of dataset records.
    ///
    /// Records that do not fit the book shape (e.g. a null id) are skipped
    /// with a warning; the dataset itself is left untouched.
    pub fn from_records(records: Vec<Value>) -> Vec<Book> {
        records
            .into_iter()
            .filter_map(|record| {
                let id = record_id(&record);
                match serde_json::from_value(record) {
                    Ok(book) => Some(book),
                    Err(e) => {
                        tracing::warn!(id = ?id, error = %e, "Skipping malformed book record");
                        None
                    }
                }
            })
            .collect()
    }

    /// Text searched by the free-text filter.
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.title, self.author, self.description).to_lowercase()
    }

    /// Description shortened for card display.
    pub fn excerpt(&self) -> String {
        if self.description.chars().count() > EXCERPT_CHARS {
            let short: String = self.description.chars().take(EXCERPT_CHARS).collect();
            format!("{}…", short)
        } else {
            self.description.clone()
        }
    }

    /// "Author · Year" line.
    pub fn byline(&self) -> String {
        match &self.year {
            Some(year) => format!("{} · {}", self.author, year),
            None => self.author.clone(),
        }
    }
}

/// Fields of a book submitted through the admin form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Publication year, numeric or as typed.
    pub year: Option<Year>,
    /// Atmosphere tag.
    pub atmosphere: String,
    /// Pace tag.
    pub pace: String,
    /// Hero archetype tag.
    pub hero: String,
    /// Writing style tag.
    pub style: String,
    /// Free-text description.
    pub description: String,
    /// Cover URL (set after the upload is saved).
    pub cover: Option<String>,
}

impl NewBook {
    /// Build the stored record for the given id.
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            year: self.year,
            atmosphere: self.atmosphere,
            pace: self.pace,
            hero: self.hero,
            style: self.style,
            description: self.description,
            cover: self.cover,
        }
    }
}

/// ID of a raw dataset record, if it has a string or numeric one.
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a year form value. Empty means unknown; non-numeric text is kept.
pub fn parse_year(value: &str) -> Option<Year> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(match trimmed.parse() {
            Ok(n) => Year::Number(n),
            Err(_) => Year::Text(value.to_string()),
        })
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

// Seed files written by hand carry years as numbers or strings.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<Year>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => Some(match n.as_i64() {
            Some(y) => Year::Number(y),
            None => Year::Text(n.to_string()),
        }),
        Value::String(s) => Some(Year::Text(s)),
        _ => None,
    })
}

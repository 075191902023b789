mod schema;

pub use schema::Database;

use crate::catalog::Year;
use chrono::{SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Reader comment on a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment ID.
    pub id: i64,
    /// Book ID the comment refers to (not checked against the catalog).
    #[serde(rename = "bookId")]
    pub book_id: String,
    /// Username.
    #[serde(default)]
    pub user: Option<String>,
    /// Comment body.
    #[serde(default)]
    pub text: Option<String>,
    /// Rating exactly as submitted.
    #[serde(default)]
    pub rating: serde_json::Value,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

/// Comment as submitted, before an ID is assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    /// Book ID.
    pub book_id: String,
    /// Username.
    pub user: Option<String>,
    /// Comment body.
    pub text: Option<String>,
    /// Rating exactly as submitted.
    pub rating: serde_json::Value,
}

impl NewComment {
    /// Build the stored record.
    pub fn into_comment(self, id: i64, created_at: String) -> Comment {
        Comment {
            id,
            book_id: self.book_id,
            user: self.user,
            text: self.text,
            rating: self.rating,
            created_at,
        }
    }
}

// Numeric years go in as integers, anything else as text.
impl ToSql for Year {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Year::Number(n) => ToSqlOutput::from(*n),
            Year::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl FromSql for Year {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(n) => Ok(Year::Number(n)),
            ValueRef::Real(f) => Ok(Year::Text(f.to_string())),
            ValueRef::Text(_) => value.as_str().map(|s| Year::Text(s.to_string())),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// Timestamp helper (milliseconds).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current time as RFC 3339 with millisecond precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

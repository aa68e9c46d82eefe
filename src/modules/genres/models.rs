use bookstore_http::{Validate, Violations};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MAX_NAME_CHARS: usize = 30;

/// A row of the `genres` table, also the wire shape `{id, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Case-folded form of a genre name; two names are the same genre when
/// their keys are equal.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Request body for creating or renaming a genre.
#[derive(Debug, Clone, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

impl Validate for GenreInput {
    fn validate(&self) -> Result<(), Vec<serde_json::Value>> {
        let mut violations = Violations::new();
        violations.text("name", &self.name, MAX_NAME_CHARS);
        violations.finish()
    }
}

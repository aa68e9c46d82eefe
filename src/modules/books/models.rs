use std::str::FromStr;

use bookstore_db::DbError;
use bookstore_http::{Validate, Violations};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_GENRE_CHARS: usize = 20;

/// A book joined with its genre's current name.
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i64,
    pub name: String,
    pub genre: String,
    /// Exact decimal text, e.g. `"20.11"`
    pub price: String,
    pub release_date: NaiveDate,
}

/// Wire representation of a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i64,
    pub name: String,
    pub genre: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub release_date: NaiveDate,
}

impl TryFrom<BookRow> for BookDto {
    type Error = DbError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let price = Decimal::from_str(&row.price)
            .map_err(|err| DbError::decode("price", format!("{:?}: {}", row.price, err)))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            genre: row.genre,
            price,
            release_date: row.release_date,
        })
    }
}

/// Request body for creating or replacing a book.
///
/// `genre` is a genre name, resolved case-insensitively on write.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub name: String,
    pub genre: String,
    pub price: Decimal,
    pub release_date: NaiveDate,
}

impl BookInput {
    /// Pair the input with the id of the genre it resolved to.
    pub fn resolve(self, genre_id: i64) -> NewBook {
        NewBook {
            name: self.name,
            genre_id,
            price: self.price,
            release_date: self.release_date,
        }
    }
}

impl Validate for BookInput {
    fn validate(&self) -> Result<(), Vec<serde_json::Value>> {
        let mut violations = Violations::new();
        violations.text("name", &self.name, MAX_NAME_CHARS);
        violations.text("genre", &self.genre, MAX_GENRE_CHARS);
        if self.price < Decimal::ONE || self.price > Decimal::ONE_HUNDRED {
            violations.add("price", "must be between 1 and 100");
        }
        violations.finish()
    }
}

/// Column values written to the `books` table.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub genre_id: i64,
    pub price: Decimal,
    pub release_date: NaiveDate,
}

impl NewBook {
    /// Price as stored: exact decimal text without trailing zeros.
    pub fn price_text(&self) -> String {
        self.price.normalize().to_string()
    }

    /// Response body for this book once persisted under `id`.
    pub fn into_dto(self, id: i64, genre: String) -> BookDto {
        BookDto {
            id,
            name: self.name,
            genre,
            price: self.price,
            release_date: self.release_date,
        }
    }
}

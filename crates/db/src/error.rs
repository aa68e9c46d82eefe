//! Error types for the persistence layer

use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to apply migration '{module}/{id}'")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A stored value could not be mapped back into its domain type.
    #[error("column '{column}' holds an unreadable value: {message}")]
    Decode {
        column: &'static str,
        message: String,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    pub fn decode(column: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            column,
            message: message.into(),
        }
    }
}

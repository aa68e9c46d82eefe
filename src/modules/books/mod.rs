pub mod models;
pub mod repository;
pub mod routes;

use std::str::FromStr;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Migration, Module};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;

use super::genres::repository as genres;
use models::NewBook;

/// Genre every default book is filed under
pub const DEFAULT_BOOK_GENRE: &str = "Non-Fiction";

/// (name, price, release date) of the books seeded into an empty table
pub const DEFAULT_BOOKS: [(&str, &str, &str); 3] = [
    ("Antifragile", "40", "2012-01-01"),
    ("Out of Control", "20.11", "1991-01-01"),
    ("The One Thing", "20", "2014-01-01"),
];

/// Books module: catalog entries, each filed under one genre
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(ctx.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = json!({ "$ref": "#/components/schemas/Book" });
        let error_ref = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);
        let input_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of books",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": book_ref }
                                    }
                                }
                            },
                            "500": { "description": "Internal server error", "content": error_ref }
                        }
                    },
                    "post": {
                        "summary": "Create book",
                        "tags": ["Books"],
                        "requestBody": input_body,
                        "responses": {
                            "201": {
                                "description": "Book created",
                                "content": { "application/json": { "schema": book_ref } }
                            },
                            "400": { "description": "Validation error or unknown genre", "content": error_ref }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get book by ID",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": { "application/json": { "schema": book_ref } }
                            },
                            "404": { "description": "Book not found", "content": error_ref }
                        }
                    },
                    "put": {
                        "summary": "Replace book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": input_body,
                        "responses": {
                            "204": { "description": "Book replaced" },
                            "400": { "description": "Validation error or unknown genre", "content": error_ref },
                            "404": { "description": "Book not found", "content": error_ref }
                        }
                    },
                    "delete": {
                        "summary": "Delete book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Book deleted" },
                            "404": { "description": "Book not found", "content": error_ref }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string" },
                            "genre": {
                                "type": "string",
                                "description": "Current name of the book's genre"
                            },
                            "price": { "type": "number" },
                            "releaseDate": { "type": "string", "format": "date" }
                        },
                        "required": ["id", "name", "genre", "price", "releaseDate"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "name": {
                                "type": "string",
                                "minLength": 1,
                                "maxLength": models::MAX_NAME_CHARS
                            },
                            "genre": {
                                "type": "string",
                                "description": "Genre name, matched ignoring case",
                                "minLength": 1,
                                "maxLength": models::MAX_GENRE_CHARS
                            },
                            "price": { "type": "number", "minimum": 1, "maximum": 100 },
                            "releaseDate": { "type": "string", "format": "date" }
                        },
                        "required": ["name", "genre", "price", "releaseDate"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    name         TEXT    NOT NULL,
                    genre_id     INTEGER NOT NULL REFERENCES genres (id) ON DELETE RESTRICT,
                    price        TEXT    NOT NULL,
                    release_date TEXT    NOT NULL
                );
                CREATE INDEX IF NOT EXISTS books_genre_id ON books (genre_id);
                "#,
        }]
    }

    async fn seed(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let pool = ctx.db.pool();
        if repository::count(pool).await? > 0 {
            tracing::debug!(module = self.name(), "books present; seeding skipped");
            return Ok(());
        }

        let Some(genre) = genres::find_by_name(pool, DEFAULT_BOOK_GENRE).await? else {
            tracing::warn!(
                module = self.name(),
                genre = DEFAULT_BOOK_GENRE,
                "default genre missing; books not seeded"
            );
            return Ok(());
        };

        for (name, price, release_date) in DEFAULT_BOOKS {
            let book = NewBook {
                name: name.to_string(),
                genre_id: genre.id,
                price: Decimal::from_str(price)?,
                release_date: NaiveDate::from_str(release_date)?,
            };
            repository::insert(pool, &book).await?;
        }

        tracing::info!(
            module = self.name(),
            count = DEFAULT_BOOKS.len(),
            genre = %genre.name,
            "default books seeded"
        );
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}

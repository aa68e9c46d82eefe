pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Migration, Module};
use serde_json::json;

/// Genres inserted into an empty `genres` table at startup
pub const DEFAULT_GENRES: [&str; 5] = [
    "Fiction",
    "Non-Fiction",
    "Science Fiction",
    "Fantasy",
    "Mystery",
];

/// Genres module: the named categories every book references
pub struct GenresModule;

impl GenresModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for GenresModule {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "genres module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(ctx.db.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let genre_ref = json!({ "$ref": "#/components/schemas/Genre" });
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
                    "schema": { "$ref": "#/components/schemas/GenreInput" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Get all genres",
                        "tags": ["Genres"],
                        "responses": {
                            "200": {
                                "description": "List of genres",
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": genre_ref }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create new genre",
                        "tags": ["Genres"],
                        "requestBody": input_body,
                        "responses": {
                            "201": {
                                "description": "Genre created",
                                "content": { "application/json": { "schema": genre_ref } }
                            },
                            "400": { "description": "Validation error", "content": error_ref },
                            "409": { "description": "Genre name already exists", "content": error_ref }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get genre by ID",
                        "tags": ["Genres"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "The genre",
                                "content": { "application/json": { "schema": genre_ref } }
                            },
                            "404": { "description": "Genre not found", "content": error_ref }
                        }
                    },
                    "put": {
                        "summary": "Update genre",
                        "tags": ["Genres"],
                        "parameters": id_param,
                        "requestBody": input_body,
                        "responses": {
                            "204": { "description": "Genre renamed" },
                            "400": { "description": "Validation error", "content": error_ref },
                            "404": { "description": "Genre not found", "content": error_ref },
                            "409": { "description": "Genre name already exists", "content": error_ref }
                        }
                    },
                    "delete": {
                        "summary": "Delete genre",
                        "description": "Only genres no book references can be removed",
                        "tags": ["Genres"],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Genre deleted" },
                            "400": { "description": "Genre is used by books", "content": error_ref },
                            "404": { "description": "Genre not found", "content": error_ref }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Genre": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string", "maxLength": models::MAX_NAME_CHARS }
                        },
                        "required": ["id", "name"]
                    },
                    "GenreInput": {
                        "type": "object",
                        "properties": {
                            "name": {
                                "type": "string",
                                "minLength": 1,
                                "maxLength": models::MAX_NAME_CHARS
                            }
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS genres (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    name     TEXT    NOT NULL,
                    name_key TEXT    NOT NULL
                );
                CREATE UNIQUE INDEX IF NOT EXISTS genres_name_key ON genres (name_key);
                "#,
        }]
    }

    async fn seed(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let pool = ctx.db.pool();
        if repository::count(pool).await? > 0 {
            tracing::debug!(module = self.name(), "genres present; seeding skipped");
            return Ok(());
        }

        for name in DEFAULT_GENRES {
            repository::insert(pool, name).await?;
        }

        tracing::info!(
            module = self.name(),
            count = DEFAULT_GENRES.len(),
            "default genres seeded"
        );
        Ok(())
    }
}

/// Create a new instance of the genres module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(GenresModule::new())
}

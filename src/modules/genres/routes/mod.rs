use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bookstore_db::Database;
use bookstore_http::{AppError, ValidatedJson};
use serde_json::json;

use super::models::{Genre, GenreInput};
use super::repository;
use crate::utils;

/// HTTP routes for the genres resource, mounted under `/genres`.
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/", get(list_genres).post(create_genre))
        .route(
            "/{id}",
            get(get_genre).put(update_genre).delete(delete_genre),
        )
        .with_state(db)
}

async fn list_genres(State(db): State<Database>) -> Result<Json<Vec<Genre>>, AppError> {
    Ok(Json(repository::list(db.pool()).await?))
}

async fn get_genre(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Genre>, AppError> {
    repository::find(db.pool(), id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn create_genre(
    State(db): State<Database>,
    ValidatedJson(input): ValidatedJson<GenreInput>,
) -> Result<impl IntoResponse, AppError> {
    if repository::name_taken(db.pool(), &input.name, None).await? {
        return Err(duplicate(&input.name));
    }

    let genre = repository::insert(db.pool(), &input.name).await?;
    tracing::info!(genre_id = genre.id, name = %genre.name, "genre created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, utils::location("genres", genre.id))],
        Json(genre),
    ))
}

async fn update_genre(
    State(db): State<Database>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<GenreInput>,
) -> Result<StatusCode, AppError> {
    if repository::find(db.pool(), id).await?.is_none() {
        return Err(not_found(id));
    }

    if repository::name_taken(db.pool(), &input.name, Some(id)).await? {
        return Err(duplicate(&input.name));
    }

    if !repository::rename(db.pool(), id, &input.name).await? {
        return Err(not_found(id));
    }
    tracing::info!(genre_id = id, name = %input.name, "genre renamed");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_genre(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if repository::find(db.pool(), id).await?.is_none() {
        return Err(not_found(id));
    }

    if repository::is_referenced(db.pool(), id).await? {
        return Err(AppError::bad_request(
            "Cannot delete genre that is being used by books",
        ));
    }

    if !repository::delete(db.pool(), id).await? {
        return Err(not_found(id));
    }
    tracing::info!(genre_id = id, "genre deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(format!("Genre {} was not found", id))
}

fn duplicate(name: &str) -> AppError {
    AppError::conflict(
        vec![json!({ "field": "name", "error": "already exists" })],
        format!("Genre '{}' already exists", name),
    )
}

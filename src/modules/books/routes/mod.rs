use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bookstore_db::Database;
use bookstore_http::{AppError, ValidatedJson};

use super::models::{BookDto, BookInput};
use super::repository;
use crate::modules::genres::{models::Genre, repository as genres};
use crate::utils;

/// HTTP routes for the books resource, mounted under `/books`.
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(db)
}

async fn list_books(State(db): State<Database>) -> Result<Json<Vec<BookDto>>, AppError> {
    Ok(Json(repository::list(db.pool()).await?))
}

async fn get_book(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<BookDto>, AppError> {
    repository::find(db.pool(), id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn create_book(
    State(db): State<Database>,
    ValidatedJson(input): ValidatedJson<BookInput>,
) -> Result<impl IntoResponse, AppError> {
    let genre = resolve_genre(&db, &input.genre).await?;

    let book = input.resolve(genre.id);
    let id = repository::insert(db.pool(), &book).await?;
    tracing::info!(book_id = id, genre_id = genre.id, "book created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, utils::location("books", id))],
        Json(book.into_dto(id, genre.name)),
    ))
}

async fn update_book(
    State(db): State<Database>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<BookInput>,
) -> Result<StatusCode, AppError> {
    if !repository::exists(db.pool(), id).await? {
        return Err(not_found(id));
    }

    let genre = resolve_genre(&db, &input.genre).await?;

    if !repository::replace(db.pool(), id, &input.resolve(genre.id)).await? {
        return Err(not_found(id));
    }
    tracing::info!(book_id = id, genre_id = genre.id, "book replaced");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !repository::delete(db.pool(), id).await? {
        return Err(not_found(id));
    }
    tracing::info!(book_id = id, "book deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Look the genre up by name; an unknown name is the caller's mistake.
async fn resolve_genre(db: &Database, name: &str) -> Result<Genre, AppError> {
    genres::find_by_name(db.pool(), name)
        .await?
        .ok_or_else(|| AppError::bad_request(format!("Genre '{}' does not exist", name)))
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(format!("Book {} was not found", id))
}

//! Queries against the `books` table.
//!
//! Reads always join `genres` so the genre name is never stored twice.

use bookstore_db::DbResult;
use sqlx::SqlitePool;

use super::models::{BookDto, BookRow, NewBook};

const SELECT_BOOKS: &str = "SELECT b.id, b.name, g.name AS genre, b.price, b.release_date \
     FROM books b JOIN genres g ON g.id = b.genre_id";

pub async fn list(pool: &SqlitePool) -> DbResult<Vec<BookDto>> {
    let rows = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOKS} ORDER BY b.id"))
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(BookDto::try_from).collect()
}

pub async fn find(pool: &SqlitePool, id: i64) -> DbResult<Option<BookDto>> {
    let row = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOKS} WHERE b.id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(BookDto::try_from).transpose()
}

pub async fn exists(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let (found,): (i64,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM books WHERE id = ?1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found != 0)
}

/// Insert a book and return its id.
pub async fn insert(pool: &SqlitePool, book: &NewBook) -> DbResult<i64> {
    let id = sqlx::query(
        "INSERT INTO books (name, genre_id, price, release_date) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&book.name)
    .bind(book.genre_id)
    .bind(book.price_text())
    .bind(book.release_date)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// Overwrite every mutable column. Returns false when no book has `id`.
pub async fn replace(pool: &SqlitePool, id: i64, book: &NewBook) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE books SET name = ?1, genre_id = ?2, price = ?3, release_date = ?4 WHERE id = ?5",
    )
    .bind(&book.name)
    .bind(book.genre_id)
    .bind(book.price_text())
    .bind(book.release_date)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns false when no book has `id`.
pub async fn delete(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

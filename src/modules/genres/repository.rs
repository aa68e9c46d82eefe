//! Queries against the `genres` table.
//!
//! Name comparisons go through the `name_key` column, folded in Rust by
//! [`name_key`]; SQLite's own `lower()` only folds ASCII.

use bookstore_db::DbResult;
use sqlx::SqlitePool;

use super::models::{name_key, Genre};

pub async fn list(pool: &SqlitePool) -> DbResult<Vec<Genre>> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(genres)
}

pub async fn find(pool: &SqlitePool, id: i64) -> DbResult<Option<Genre>> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(genre)
}

/// Case-insensitive lookup by name.
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> DbResult<Option<Genre>> {
    let genre = sqlx::query_as::<_, Genre>(
        "SELECT id, name FROM genres WHERE name_key = ?1 ORDER BY id LIMIT 1",
    )
    .bind(name_key(name))
    .fetch_optional(pool)
    .await?;
    Ok(genre)
}

/// Whether a genre other than `except` already uses `name`, ignoring case.
pub async fn name_taken(pool: &SqlitePool, name: &str, except: Option<i64>) -> DbResult<bool> {
    let (taken,): (i64,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM genres WHERE name_key = ?1 AND (?2 IS NULL OR id <> ?2))",
    )
    .bind(name_key(name))
    .bind(except)
    .fetch_one(pool)
    .await?;
    Ok(taken != 0)
}

pub async fn insert(pool: &SqlitePool, name: &str) -> DbResult<Genre> {
    let id = sqlx::query("INSERT INTO genres (name, name_key) VALUES (?1, ?2)")
        .bind(name)
        .bind(name_key(name))
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(Genre {
        id,
        name: name.to_string(),
    })
}

/// Returns false when no genre has `id`.
pub async fn rename(pool: &SqlitePool, id: i64, name: &str) -> DbResult<bool> {
    let result = sqlx::query("UPDATE genres SET name = ?1, name_key = ?2 WHERE id = ?3")
        .bind(name)
        .bind(name_key(name))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns false when no genre has `id`.
pub async fn delete(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM genres WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether any book still references the genre.
pub async fn is_referenced(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let (referenced,): (i64,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM books WHERE genre_id = ?1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(referenced != 0)
}

pub async fn count(pool: &SqlitePool) -> DbResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM genres")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

//! SQLite persistence plumbing for the bookstore service.
//!
//! Owns the connection pool and schema application. Resource modules keep
//! their own queries and hand their schema statements to [`Database::apply_migrations`].

pub mod error;
pub mod migration;
pub mod pool;

pub use error::{DbError, DbResult};
pub use migration::Migration;
pub use pool::{Database, PoolConfig};

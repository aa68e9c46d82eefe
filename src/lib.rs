//! Bookstore catalog service
//!
//! Resource modules (genres, books) plus the bootstrap that wires them into
//! the kernel registry, the database, and the HTTP server.

pub mod bootstrap;
pub mod modules;
pub mod utils;

pub use bootstrap::App;

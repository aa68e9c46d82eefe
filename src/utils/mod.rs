//! Project-specific utilities live here.

/// Path of a single resource, used for `Location` headers.
pub fn location(module: &str, id: i64) -> String {
    format!("/{module}/{id}")
}

pub mod books;
pub mod genres;

use bookstore_kernel::ModuleRegistry;

/// Register all resource modules with the registry.
///
/// Genres go first: books reference them and their seed resolves a genre by name.
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(genres::create_module());
    registry.register(books::create_module());
}

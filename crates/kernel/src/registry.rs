use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};
use bookstore_db::Migration;

/// Module registry driving the module lifecycle.
///
/// Modules run every hook in registration order (stop runs in reverse), so a
/// module whose rows reference another module's table is registered after it.
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// Get all registered modules in registration order
    pub fn modules(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.iter()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Initialize modules
    pub async fn init_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all migrations, keeping registration order and each module's own order
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations = Vec::new();

        for module in &self.modules {
            for migration in module.migrations() {
                migrations.push((module.name().to_string(), migration));
            }
        }

        migrations
    }

    /// Ensure every module's schema exists
    pub async fn apply_migrations(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let migrations = self.collect_migrations();
        ctx.db
            .apply_migrations(&migrations)
            .await
            .context("failed to apply module migrations")
    }

    /// Seed default data
    pub async fn seed_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in &self.modules {
            tracing::info!(module = module.name(), "seeding module");

            module
                .seed(ctx)
                .await
                .with_context(|| format!("failed to seed module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start modules
    pub async fn start_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop modules in reverse registration order
    pub async fn stop_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} modules", self.modules.len());

        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use bookstore_db::Database;
    use std::sync::Mutex;

    struct TestModule {
        name: &'static str,
        table: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl TestModule {
        fn record(&self, event: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, event));
        }
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![Migration {
                id: "001_init",
                up: self.table,
            }]
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("init");
            Ok(())
        }

        async fn seed(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("seed");
            Ok(())
        }

        async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("start");
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.record("stop");
            Ok(())
        }
    }

    fn registry(events: &Arc<Mutex<Vec<String>>>) -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule {
            name: "parents",
            table: "CREATE TABLE IF NOT EXISTS parents (id INTEGER PRIMARY KEY);",
            events: events.clone(),
        }));
        registry.register(Arc::new(TestModule {
            name: "children",
            table: "CREATE TABLE IF NOT EXISTS children (id INTEGER PRIMARY KEY);",
            events: events.clone(),
        }));
        registry
    }

    #[test]
    fn test_module_registry_creation() {
        let registry = ModuleRegistry::new();
        assert_eq!(registry.module_count(), 0);
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn test_migration_collection_keeps_registration_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&events);

        let modules: Vec<String> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, _)| module)
            .collect();
        assert_eq!(modules, vec!["parents", "children"]);
    }

    #[tokio::test]
    async fn test_module_lifecycle() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let registry = registry(&events);
        let settings = Settings::default();
        let db = Database::in_memory().await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };

        registry.init_modules(&ctx).await.unwrap();
        registry.apply_migrations(&ctx).await.unwrap();
        registry.seed_modules(&ctx).await.unwrap();
        registry.start_modules(&ctx).await.unwrap();
        registry.stop_modules().await.unwrap();

        let events = events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "parents:init",
                "children:init",
                "parents:seed",
                "children:seed",
                "parents:start",
                "children:start",
                "children:stop",
                "parents:stop",
            ]
        );

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('parents', 'children')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, 2);
    }
}

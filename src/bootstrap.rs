//! Startup and shutdown of the service.
//!
//! Startup order: open the pool, run every module's `init`, ensure the schema,
//! seed empty tables, then (when serving) start modules and the HTTP server.

use anyhow::Context;
use axum::Router;
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;

/// A bootstrapped service: schema ensured, defaults seeded, ready to serve.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Connect to the configured database and bootstrap against it.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database.url, &settings.database.pool_config())
            .await
            .with_context(|| format!("failed to open database '{}'", settings.database.url))?;

        Self::with_database(settings, db).await
    }

    /// Bootstrap against an already opened database.
    pub async fn with_database(settings: Settings, db: Database) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry);

        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        registry.init_modules(&ctx).await?;
        registry.apply_migrations(&ctx).await?;
        registry.seed_modules(&ctx).await?;

        tracing::info!(modules = registry.module_count(), "bootstrap complete");

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    fn ctx(&self) -> InitCtx<'_> {
        InitCtx {
            settings: &self.settings,
            db: &self.db,
        }
    }

    /// The full HTTP application, without binding a socket.
    pub fn router(&self) -> Router {
        bookstore_http::build_router(&self.registry, &self.ctx())
    }

    /// Start modules and serve HTTP until Ctrl-C, then stop everything.
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = self.ctx();
        self.registry.start_modules(&ctx).await?;

        let served = bookstore_http::start_server(&self.registry, &ctx, shutdown_signal()).await;

        self.registry.stop_modules().await?;
        self.db.close().await;
        served
    }

    /// Release the pool without serving.
    pub async fn close(self) {
        self.db.close().await;
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => tracing::error!(error = %err, "failed to listen for shutdown signal"),
    }
}

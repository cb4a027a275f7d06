//! Application wiring: store selection, module registry, migrations and the
//! serve loop.

use std::sync::Arc;

use anyhow::{bail, Context};
use bookshelf_kernel::{
    settings::{Settings, StoreBackend},
    InitCtx, ModuleRegistry,
};
use sqlx::PgPool;

use crate::modules::{
    self,
    books::store::{BookStore, InMemoryBookStore, PostgresBookStore},
};

/// The selected store plus the pool behind it, if any.
pub struct Backend {
    pub store: Arc<dyn BookStore>,
    pub pool: Option<PgPool>,
}

impl Backend {
    pub fn in_memory(seed: bool) -> Self {
        let store = if seed {
            InMemoryBookStore::seeded()
        } else {
            InMemoryBookStore::new()
        };
        Self {
            store: Arc::new(store),
            pool: None,
        }
    }

    /// Open the configured store. A database that cannot be reached is fatal.
    pub async fn open(settings: &Settings) -> anyhow::Result<Self> {
        match settings.database.backend {
            StoreBackend::Memory => {
                tracing::info!(seed = settings.database.seed, "using in-memory book store");
                Ok(Self::in_memory(settings.database.seed))
            }
            StoreBackend::Postgres => {
                let pool = bookshelf_db::connect(&settings.database).await?;
                tracing::info!("using PostgreSQL book store");
                Ok(Self {
                    store: Arc::new(PostgresBookStore::new(pool.clone())),
                    pool: Some(pool),
                })
            }
        }
    }

    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }
}

pub fn build_registry(store: Arc<dyn BookStore>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

async fn apply_migrations(pool: &PgPool, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let applied = bookshelf_db::run_migrations(pool, &migrations)
        .await
        .with_context(|| "schema synchronization failed")?;
    tracing::info!(applied, total = migrations.len(), "schema synchronized");
    Ok(applied)
}

/// Apply pending migrations and exit. Only meaningful for the PostgreSQL backend.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    if settings.database.backend != StoreBackend::Postgres {
        bail!("migrations require database.backend = \"postgres\"");
    }

    let backend = Backend::open(settings).await?;
    let registry = build_registry(backend.store.clone());
    let pool = backend
        .pool
        .as_ref()
        .context("PostgreSQL backend opened without a pool")?;
    let applied = apply_migrations(pool, &registry).await;

    backend.close().await;
    applied
}

/// Run the service until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "bookshelf bootstrap starting"
    );

    let backend = Backend::open(settings).await?;
    let registry = build_registry(backend.store.clone());

    if let Some(pool) = &backend.pool {
        apply_migrations(pool, &registry).await?;
    }

    let ctx = InitCtx::new(settings);
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookshelf bootstrap complete");

    let served =
        bookshelf_http::start_server(&registry, settings, bookshelf_http::shutdown_signal()).await;

    registry.stop_all().await?;
    backend.close().await;
    served
}

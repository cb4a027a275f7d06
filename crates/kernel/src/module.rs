use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Passed to [`Module::init`] and [`Module::start`]. Stores and pools are
/// injected when a module is constructed, so only settings travel here.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

impl<'a> InitCtx<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

/// Idempotent SQL applied once per `(module, id)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A resource served by bookshelf.
///
/// Lifecycle: `migrations` are applied first (PostgreSQL only), then `init`
/// and `start` in registration order. While serving, `/healthz` calls
/// `health` on every module. `stop` runs in reverse order on shutdown.
#[async_trait]
pub trait Module: Sync + Send {
    /// Name used in logs, migration records and health reports
    fn name(&self) -> &'static str;

    /// Routes with their full paths, merged into the application router
    fn routes(&self) -> Router;

    fn migrations(&self) -> Vec<Migration> {
        Vec::new()
    }

    /// `paths` and `components.schemas` to merge into the served document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Err when the module cannot currently serve requests, e.g. its
    /// database is unreachable
    async fn health(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

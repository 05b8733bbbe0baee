//! Shared application state for the claims server.

use std::sync::Arc;

use claimset_core::clock::{Clock, SystemClock};
use claimset_core::error::Result;
use claimset_core::Registry;

use crate::config::{self, ClaimsConfig};
use crate::context::ClaimsContext;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ClaimsConfig,
    ctx: ClaimsContext,
}

impl AppState {
    /// Build application state from config, loading the registry it names.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ClaimsConfig) -> Result<Self> {
        let loaded = config::load_registry(&cfg.registry)?;
        let registry = loaded.registry;
        tracing::info!(
            metrics = registry.len(),
            validated_at_regressions = loaded.regressions.len(),
            content = registry.content_blocks().count(),
            source = cfg.registry.path.as_deref().unwrap_or("builtin"),
            "claims registry loaded"
        );
        Ok(Self::from_parts(cfg, registry, Arc::new(SystemClock)))
    }

    pub fn from_parts(cfg: ClaimsConfig, registry: Registry, clock: Arc<dyn Clock>) -> Self {
        let ctx = ClaimsContext::new(Arc::new(registry), &cfg, clock);
        Self::from_context(cfg, ctx)
    }

    pub fn from_context(cfg: ClaimsConfig, ctx: ClaimsContext) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, ctx }),
        }
    }

    pub fn cfg(&self) -> &ClaimsConfig {
        &self.inner.cfg
    }

    pub fn claims(&self) -> &ClaimsContext {
        &self.inner.ctx
    }
}

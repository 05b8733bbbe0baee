//! Server config loader (strict parsing).

pub mod schema;

use std::fs;

use claimset_core::error::{ClaimsError, Result};
use claimset_core::Registry;

pub use schema::{AuditSection, CacheSection, ClaimsConfig, FreshnessSection, RegistrySection, ServerSection};

pub fn load_from_file(path: &str) -> Result<ClaimsConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ClaimsError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ClaimsConfig> {
    let cfg: ClaimsConfig = serde_yaml::from_str(s)
        .map_err(|e| ClaimsError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Registry plus the ids whose `validated_at` moved backwards versus the bundled snapshot.
#[derive(Debug)]
pub struct LoadedRegistry {
    pub registry: Registry,
    pub regressions: Vec<String>,
}

/// Load the registry named by `registry.path`, or the bundled one.
///
/// An external registry is compared against the bundled snapshot; ids whose
/// validation timestamp went backwards are logged and returned.
pub fn load_registry(section: &RegistrySection) -> Result<LoadedRegistry> {
    let Some(path) = &section.path else {
        return Ok(LoadedRegistry {
            registry: Registry::builtin()?,
            regressions: Vec::new(),
        });
    };

    let s = fs::read_to_string(path)
        .map_err(|e| ClaimsError::Internal(format!("read registry failed ({path}): {e}")))?;
    let registry = Registry::from_yaml_str(&s)?;

    let regressions = match Registry::builtin() {
        Ok(bundled) => registry.validated_at_regressions(&bundled),
        Err(e) => {
            tracing::warn!(error = %e, "bundled registry unavailable; skipping validated_at check");
            Vec::new()
        }
    };
    if !regressions.is_empty() {
        tracing::warn!(%path, ids = ?regressions, "registry file is older than the bundled snapshot");
    }

    Ok(LoadedRegistry { registry, regressions })
}

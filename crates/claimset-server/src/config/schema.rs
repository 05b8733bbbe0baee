use std::time::Duration;

use serde::Deserialize;
use claimset_core::error::{ClaimsError, Result};
use claimset_core::FreshnessPolicy;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimsConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub freshness: FreshnessSection,

    #[serde(default)]
    pub audit: AuditSection,
}

impl ClaimsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ClaimsError::UnsupportedVersion(self.version));
        }

        self.server.validate()?;
        self.cache.validate()?;
        self.freshness.validate()?;
        self.audit.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_max_template_bytes")]
    pub max_template_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_template_bytes: default_max_template_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if !(64..=1_048_576).contains(&self.max_template_bytes) {
            return Err(ClaimsError::BadRequest(
                "server.max_template_bytes must be between 64 and 1048576".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_template_bytes() -> usize {
    8192
}

/// `path: null` selects the registry bundled into the binary.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { ttl_ms: default_ttl_ms() }
    }
}

impl CacheSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=3_600_000).contains(&self.ttl_ms) {
            return Err(ClaimsError::BadRequest(
                "cache.ttl_ms must be between 1000 and 3600000".into(),
            ));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

fn default_ttl_ms() -> u64 {
    60_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreshnessSection {
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
}

impl Default for FreshnessSection {
    fn default() -> Self {
        Self { max_age_days: default_max_age_days() }
    }
}

impl FreshnessSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=3650).contains(&self.max_age_days) {
            return Err(ClaimsError::BadRequest(
                "freshness.max_age_days must be between 1 and 3650".into(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::from_days(self.max_age_days)
    }
}

fn default_max_age_days() -> i64 {
    claimset_core::freshness::DEFAULT_MAX_AGE_DAYS
}

/// Development usage auditor. Keep disabled in production.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,

    #[serde(default = "default_slow_lookup_micros")]
    pub slow_lookup_micros: u64,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            enabled: false,
            report_interval_ms: default_report_interval_ms(),
            slow_lookup_micros: default_slow_lookup_micros(),
        }
    }
}

impl AuditSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=3_600_000).contains(&self.report_interval_ms) {
            return Err(ClaimsError::BadRequest(
                "audit.report_interval_ms must be between 1000 and 3600000".into(),
            ));
        }
        if self.slow_lookup_micros == 0 {
            return Err(ClaimsError::BadRequest(
                "audit.slow_lookup_micros must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    pub fn slow_lookup(&self) -> Duration {
        Duration::from_micros(self.slow_lookup_micros)
    }
}

fn default_report_interval_ms() -> u64 {
    30_000
}
fn default_slow_lookup_micros() -> u64 {
    1_000
}

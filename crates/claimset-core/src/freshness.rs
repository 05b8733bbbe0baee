//! Freshness policy: a metric is fresh while its last validation is inside
//! the recency window.

use chrono::{DateTime, Duration, Utc};

use crate::model::MetricRecord;
use crate::registry::Registry;

/// Default recency window when config does not override it.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    pub max_age: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::from_days(DEFAULT_MAX_AGE_DAYS)
    }
}

impl FreshnessPolicy {
    /// Out-of-range day counts saturate to the largest representable window.
    pub fn from_days(days: i64) -> Self {
        Self {
            max_age: Duration::try_days(days).unwrap_or(Duration::MAX),
        }
    }

    /// Validation timestamps in the future count as fresh.
    pub fn is_fresh(&self, record: &MetricRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.validated_at) <= self.max_age
    }

    /// Unknown ids are never fresh.
    pub fn validate_metric_freshness(&self, registry: &Registry, id: &str, now: DateTime<Utc>) -> bool {
        registry
            .metric(id)
            .map(|m| self.is_fresh(m, now))
            .unwrap_or(false)
    }

    /// Every record failing the freshness check, in id order.
    pub fn stale_metrics<'a>(&self, registry: &'a Registry, now: DateTime<Utc>) -> Vec<&'a MetricRecord> {
        registry.metrics().filter(|m| !self.is_fresh(m, now)).collect()
    }
}

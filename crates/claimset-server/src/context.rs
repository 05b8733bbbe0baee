//! Claims access context shared by every consumer.
//!
//! Bundles the read-only registry with the per-process cache and usage
//! tracker. Construct once at startup and share via `Arc`; tests build their
//! own so state never leaks between them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use claimset_core::clock::Clock;
use claimset_core::format::{self, DisplayFormat, NOT_AVAILABLE};
use claimset_core::template::{self, Segment};
use claimset_core::{FreshnessPolicy, MetricRecord, Registry};

use crate::audit::UsageTracker;
use crate::cache::{formatted_key, FormattedCache};
use crate::config::ClaimsConfig;

/// Produces the friendly display string for a metric on cache miss.
pub trait DisplayFormatter: Send + Sync {
    fn format_display(&self, registry: &Registry, id: &str) -> String;
}

/// Registry's pre-computed friendly strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FriendlyFormatter;

impl DisplayFormatter for FriendlyFormatter {
    fn format_display(&self, registry: &Registry, id: &str) -> String {
        registry.formatted_metric(id)
    }
}

pub struct ClaimsContext {
    registry: Arc<Registry>,
    cache: FormattedCache,
    tracker: Arc<UsageTracker>,
    policy: FreshnessPolicy,
    clock: Arc<dyn Clock>,
    formatter: Arc<dyn DisplayFormatter>,
    slow_lookup: Duration,
}

impl ClaimsContext {
    pub fn new(registry: Arc<Registry>, cfg: &ClaimsConfig, clock: Arc<dyn Clock>) -> Self {
        let policy = cfg.freshness.policy();
        let tracker = Arc::new(UsageTracker::new(
            cfg.audit.enabled,
            Arc::clone(&registry),
            policy,
            Arc::clone(&clock),
        ));
        Self {
            cache: FormattedCache::new(cfg.cache.ttl(), Arc::clone(&clock)),
            registry,
            tracker,
            policy,
            clock,
            formatter: Arc::new(FriendlyFormatter),
            slow_lookup: cfg.audit.slow_lookup(),
        }
    }

    /// Replace the cache-miss formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn DisplayFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tracker(&self) -> Arc<UsageTracker> {
        Arc::clone(&self.tracker)
    }

    pub fn metric(&self, id: &str, location: &str) -> Option<&MetricRecord> {
        self.tracker.track_metric_usage(id, location);
        self.registry.metric(id)
    }

    /// Friendly string for `id`, served from the cache while fresh.
    pub fn display_metric(&self, id: &str, location: &str) -> String {
        self.tracker.track_metric_usage(id, location);
        if !self.registry.contains(id) {
            return NOT_AVAILABLE.to_string();
        }

        let key = formatted_key(id);
        if let Some(v) = self.cache.get(&key) {
            return v;
        }

        let started = Instant::now();
        let value = self.formatter.format_display(&self.registry, id);
        let elapsed = started.elapsed();
        tracing::debug!(metric = %id, micros = elapsed.as_micros() as u64, "formatted cache miss");
        if elapsed > self.slow_lookup {
            self.tracker.record_performance_issue(
                id,
                location,
                format!("formatting {id} took {}us", elapsed.as_micros()),
            );
        }

        self.cache.set(key, value.clone());
        value
    }

    pub fn formatted_value(&self, id: &str, fmt: DisplayFormat, location: &str) -> String {
        match fmt {
            DisplayFormat::Default => self.display_metric(id, location),
            other => {
                self.tracker.track_metric_usage(id, location);
                format::formatted_value(&self.registry, id, other)
            }
        }
    }

    /// Substitute `{{metricId}}` placeholders; literal copy is audited for
    /// numbers that duplicate registry values.
    pub fn interpolate(&self, text: &str, location: &str) -> String {
        if self.tracker.is_enabled() {
            for seg in template::tokenize(text) {
                if let Segment::Literal(lit) = seg {
                    self.tracker.scan_literal_text(lit, location);
                }
            }
        }
        template::interpolate(text, |id| self.display_metric(id, location)).into_owned()
    }

    /// Rendered content block. Unknown ids render as `""`.
    pub fn content(&self, id: &str, variant: Option<&str>, location: &str) -> String {
        if self.registry.content_block(id).is_none() {
            tracing::debug!(content = %id, %location, "unknown content block");
            return String::new();
        }
        self.interpolate(self.registry.content(id, variant), location)
    }

    pub fn is_fresh(&self, id: &str) -> bool {
        self.policy
            .validate_metric_freshness(&self.registry, id, self.clock.now())
    }

    pub fn stale_metrics(&self) -> Vec<&MetricRecord> {
        self.policy.stale_metrics(&self.registry, self.clock.now())
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

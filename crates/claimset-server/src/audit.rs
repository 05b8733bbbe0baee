//! Development usage auditor.
//!
//! Cross-checks registry definitions against what callers actually ask for:
//! unknown keys, stale metrics, metrics never displayed, and numbers that were
//! typed into copy instead of coming from the registry.
//!
//! The tracker is a passive side channel. It only records and logs; every
//! method is a no-op when disabled and none of them can fail or panic.
//! Findings are keyed by `(key, location)` and each kind holds at most
//! `MAX_ISSUES_PER_KIND` entries; the overflow is only counted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use regex::Regex;
use serde::Serialize;

use claimset_core::clock::Clock;
use claimset_core::{FreshnessPolicy, Registry};

/// Cap per finding kind, and per literal for hardcoded-number locations.
pub const MAX_ISSUES_PER_KIND: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditIssue {
    pub key: String,
    pub location: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationReport {
    pub total_metrics: usize,
    pub used_metrics: usize,
    /// Percentage in `0.0..=100.0`.
    pub usage_rate: f64,
    pub unused_metrics: Vec<String>,
    pub validation_errors: Vec<AuditIssue>,
    pub stale_warnings: Vec<AuditIssue>,
    pub performance_issues: Vec<AuditIssue>,
    /// Literal text -> every location it was seen at.
    pub hardcoded_numbers: BTreeMap<String, Vec<String>>,
    /// Findings not stored because a cap was reached.
    pub dropped_findings: u64,
    pub rtf_compliant: bool,
}

type IssueKey = (String, String);

/// Bounded `(key, location) -> issue` table.
#[derive(Default)]
struct IssueTable {
    map: DashMap<IssueKey, AuditIssue>,
}

impl IssueTable {
    /// True if the issue was newly stored. `dropped` counts cap overflow.
    fn record(&self, key: &str, location: &str, message: impl FnOnce() -> String, dropped: &AtomicU64) -> bool {
        let id = (key.to_string(), location.to_string());
        if self.map.contains_key(&id) {
            return false;
        }
        if self.map.len() >= MAX_ISSUES_PER_KIND {
            dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        match self.map.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(AuditIssue {
                    key: key.to_string(),
                    location: location.to_string(),
                    message: message(),
                });
                true
            }
        }
    }

    fn sorted(&self) -> Vec<AuditIssue> {
        let mut out: Vec<AuditIssue> = self.map.iter().map(|r| r.value().clone()).collect();
        out.sort_by(|a, b| (&a.key, &a.location).cmp(&(&b.key, &b.location)));
        out
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear();
    }
}

/// Alternation over every friendly string, longest first so `99.95%` wins over `99.9%`.
fn friendly_pattern(registry: &Registry) -> Option<Regex> {
    let mut values: Vec<&str> = registry
        .friendly_values()
        .map(|(_, v)| v)
        .filter(|v| !v.trim().is_empty())
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    values.dedup();
    let alternation = values.iter().map(|v| regex::escape(v)).collect::<Vec<_>>().join("|");
    match Regex::new(&alternation) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(error = %e, "hardcoded-number pattern failed to compile; literal scan disabled");
            None
        }
    }
}

/// Part of an adjacent word or number, so the match is not a standalone claim.
fn joins_match(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || c == ','
}

pub struct UsageTracker {
    enabled: bool,
    registry: Arc<Registry>,
    policy: FreshnessPolicy,
    clock: Arc<dyn Clock>,
    friendly: Option<Regex>,
    used: DashSet<String>,
    hardcoded: DashMap<String, Vec<String>>,
    validation_errors: IssueTable,
    stale_warnings: IssueTable,
    performance_issues: IssueTable,
    dropped: AtomicU64,
    reports_logged: AtomicU64,
}

impl UsageTracker {
    pub fn new(enabled: bool, registry: Arc<Registry>, policy: FreshnessPolicy, clock: Arc<dyn Clock>) -> Self {
        let friendly = if enabled { friendly_pattern(&registry) } else { None };
        Self {
            enabled,
            registry,
            policy,
            clock,
            friendly,
            used: DashSet::new(),
            hardcoded: DashMap::new(),
            validation_errors: IssueTable::default(),
            stale_warnings: IssueTable::default(),
            performance_issues: IssueTable::default(),
            dropped: AtomicU64::new(0),
            reports_logged: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record that `key` was read at `location`.
    pub fn track_metric_usage(&self, key: &str, location: &str) {
        if !self.enabled {
            return;
        }

        let Some(record) = self.registry.metric(key) else {
            let stored = self.validation_errors.record(
                key,
                location,
                || format!("metric key not found in registry: {key}"),
                &self.dropped,
            );
            if stored {
                tracing::warn!(metric = %key, %location, "unknown metric key");
            }
            return;
        };

        self.used.insert(key.to_string());

        if !self.policy.is_fresh(record, self.clock.now()) {
            let stored = self.stale_warnings.record(
                key,
                location,
                || format!("metric last validated at {}", record.validated_at.format("%Y-%m-%d")),
                &self.dropped,
            );
            if stored {
                tracing::warn!(metric = %key, %location, validated_at = %record.validated_at, "stale metric displayed");
            }
        }
    }

    /// Record a numeric literal that should have come from the registry.
    pub fn report_hardcoded_number(&self, literal: &str, location: &str) {
        if !self.enabled {
            return;
        }
        if !self.hardcoded.contains_key(literal) && self.hardcoded.len() >= MAX_ISSUES_PER_KIND {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let mut locations = self.hardcoded.entry(literal.to_string()).or_insert_with(Vec::new);
        if locations.iter().any(|l| l == location) {
            return;
        }
        if locations.len() >= MAX_ISSUES_PER_KIND {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        tracing::warn!(%literal, %location, "hardcoded number in copy");
        locations.push(location.to_string());
    }

    /// Report registry friendly strings that appear verbatim in literal copy.
    pub fn scan_literal_text(&self, text: &str, location: &str) {
        let Some(re) = &self.friendly else {
            return;
        };
        for m in re.find_iter(text) {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            if before.is_some_and(joins_match) || after.is_some_and(char::is_alphanumeric) {
                continue;
            }
            self.report_hardcoded_number(m.as_str(), location);
        }
    }

    /// Record a slow lookup of `key` at `location`. Only the first detail per pair is kept.
    pub fn record_performance_issue(&self, key: &str, location: &str, detail: impl Into<String>) {
        if !self.enabled {
            return;
        }
        let detail = detail.into();
        tracing::debug!(metric = %key, %location, %detail, "performance issue");
        self.performance_issues.record(key, location, || detail, &self.dropped);
    }

    /// Start a fresh session.
    pub fn reset(&self) {
        self.used.clear();
        self.hardcoded.clear();
        self.validation_errors.clear();
        self.stale_warnings.clear();
        self.performance_issues.clear();
        self.dropped.store(0, Ordering::Relaxed);
    }

    pub fn generate_integration_report(&self) -> IntegrationReport {
        let total_metrics = self.registry.len();
        let unused_metrics: Vec<String> = self
            .registry
            .metric_ids()
            .filter(|id| !self.used.contains(*id))
            .map(str::to_string)
            .collect();
        let used_metrics = total_metrics - unused_metrics.len();

        let usage_rate = if total_metrics == 0 {
            100.0
        } else {
            used_metrics as f64 * 100.0 / total_metrics as f64
        };

        let hardcoded_numbers: BTreeMap<String, Vec<String>> = self
            .hardcoded
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        let rtf_compliant = unused_metrics.is_empty()
            && self.validation_errors.is_empty()
            && hardcoded_numbers.is_empty();

        IntegrationReport {
            total_metrics,
            used_metrics,
            usage_rate,
            unused_metrics,
            validation_errors: self.validation_errors.sorted(),
            stale_warnings: self.stale_warnings.sorted(),
            performance_issues: self.performance_issues.sorted(),
            hardcoded_numbers,
            dropped_findings: self.dropped.load(Ordering::Relaxed),
            rtf_compliant,
        }
    }

    /// Emit the integration report through `tracing`.
    pub fn log_report(&self, reason: &str) {
        if !self.enabled {
            return;
        }
        let r = self.generate_integration_report();
        self.reports_logged.fetch_add(1, Ordering::Relaxed);

        if r.rtf_compliant {
            tracing::info!(%reason, usage_rate = r.usage_rate, stale = r.stale_warnings.len(), "claims integration report: compliant");
        } else {
            let hardcoded: Vec<&String> = r.hardcoded_numbers.keys().collect();
            tracing::warn!(
                %reason,
                usage_rate = r.usage_rate,
                unused = ?r.unused_metrics,
                validation_errors = r.validation_errors.len(),
                hardcoded = ?hardcoded,
                stale = r.stale_warnings.len(),
                dropped = r.dropped_findings,
                "claims integration report: drift detected"
            );
        }
    }

    pub fn reports_logged(&self) -> u64 {
        self.reports_logged.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use claimset_core::clock::ManualClock;

    fn tracker(enabled: bool) -> UsageTracker {
        let registry = Registry::from_yaml_str(
            r#"
version: 1
metrics:
  - { id: collectionLift, category: performance, value: 35, unit: "%", confidence: high, validated_at: "2025-01-15" }
  - { id: debtManaged, category: scale, value: 2, unit: B, display: "$2B+", confidence: high, validated_at: "2023-01-01" }
"#,
        )
        .unwrap();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));
        UsageTracker::new(enabled, Arc::new(registry), FreshnessPolicy::default(), clock)
    }

    #[test]
    fn unknown_and_stale_keys_are_recorded_once() {
        let t = tracker(true);
        t.track_metric_usage("nope", "home/hero");
        t.track_metric_usage("nope", "home/hero");
        t.track_metric_usage("debtManaged", "home/stats");

        let r = t.generate_integration_report();
        assert_eq!(r.validation_errors.len(), 1);
        assert_eq!(r.validation_errors[0].key, "nope");
        assert_eq!(r.validation_errors[0].location, "home/hero");
        assert_eq!(r.stale_warnings.len(), 1);
        assert_eq!(r.stale_warnings[0].key, "debtManaged");
        assert_eq!(r.used_metrics, 1);
        assert_eq!(r.unused_metrics, vec!["collectionLift".to_string()]);
        assert!((r.usage_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hardcoded_numbers_group_locations() {
        let t = tracker(true);
        t.report_hardcoded_number("35%", "home/hero");
        t.report_hardcoded_number("35%", "pricing");
        t.report_hardcoded_number("35%", "pricing");
        let r = t.generate_integration_report();
        assert_eq!(r.hardcoded_numbers["35%"], vec!["home/hero".to_string(), "pricing".to_string()]);
    }

    #[test]
    fn literal_scan_flags_registry_values_only() {
        let t = tracker(true);
        t.scan_literal_text("We manage $2B+ and lift 35% across 12 teams, 47% faster", "about");
        let r = t.generate_integration_report();
        let keys: Vec<&str> = r.hardcoded_numbers.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["$2B+", "35%"]);
    }

    #[test]
    fn disabled_tracker_records_nothing() {
        let t = tracker(false);
        t.track_metric_usage("nope", "x");
        t.report_hardcoded_number("35%", "x");
        t.record_performance_issue("collectionLift", "x", "slow");
        t.log_report("test");
        let r = t.generate_integration_report();
        assert!(r.validation_errors.is_empty());
        assert!(r.hardcoded_numbers.is_empty());
        assert!(r.performance_issues.is_empty());
        assert_eq!(t.reports_logged(), 0);
    }

    #[test]
    fn reset_starts_a_new_session() {
        let t = tracker(true);
        t.track_metric_usage("collectionLift", "a");
        t.track_metric_usage("nope", "a");
        t.reset();
        let r = t.generate_integration_report();
        assert_eq!(r.used_metrics, 0);
        assert!(r.validation_errors.is_empty());
    }

    #[test]
    fn literal_scan_covers_spaced_and_prefixed_claims() {
        let registry = Arc::new(Registry::builtin().unwrap());
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));
        let t = UsageTracker::new(true, registry, FreshnessPolicy::default(), clock);
        t.scan_literal_text("Go live in 2 weeks with <200ms replies, 35% lift", "home");
        let r = t.generate_integration_report();
        let keys: Vec<&str> = r.hardcoded_numbers.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2 weeks", "35%", "<200ms"]);
        assert!(!r.rtf_compliant);
    }

    #[test]
    fn literal_scan_respects_word_boundaries() {
        let t = tracker(true);
        t.scan_literal_text("135% growth, 2.35% fees, 35%ile", "about");
        assert!(t.generate_integration_report().hardcoded_numbers.is_empty());
    }

    #[test]
    fn unknown_keys_are_capped() {
        let t = tracker(true);
        for i in 0..MAX_ISSUES_PER_KIND + 500 {
            t.track_metric_usage(&format!("ghost{i}"), "api");
        }
        let r = t.generate_integration_report();
        assert_eq!(r.validation_errors.len(), MAX_ISSUES_PER_KIND);
        assert_eq!(r.dropped_findings, 500);
        assert!(!r.rtf_compliant);
    }

    #[test]
    fn repeated_slow_lookups_collapse_per_location() {
        let t = tracker(true);
        t.record_performance_issue("collectionLift", "home", "formatting took 1200us");
        t.record_performance_issue("collectionLift", "home", "formatting took 1800us");
        t.record_performance_issue("collectionLift", "home", "formatting took 2500us");
        t.record_performance_issue("collectionLift", "pricing", "formatting took 1100us");
        let r = t.generate_integration_report();
        assert_eq!(r.performance_issues.len(), 2);
        assert_eq!(r.performance_issues[0].message, "formatting took 1200us");
    }

    #[test]
    fn hardcoded_locations_are_capped_per_literal() {
        let t = tracker(true);
        for i in 0..MAX_ISSUES_PER_KIND + 3 {
            t.report_hardcoded_number("35%", &format!("page{i}"));
        }
        let r = t.generate_integration_report();
        assert_eq!(r.hardcoded_numbers["35%"].len(), MAX_ISSUES_PER_KIND);
        assert_eq!(r.dropped_findings, 3);
    }
}

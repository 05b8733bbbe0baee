//! Registry store: canonical `id -> MetricRecord` and `id -> ContentBlock`
//! tables plus the derived map of pre-formatted friendly strings.
//!
//! A `Registry` is built once (from the bundled document or a YAML file) and is
//! read-only afterwards. Share it via `Arc`.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::{ClaimsError, Result};
use crate::format::NOT_AVAILABLE;
use crate::model::{ContentBlock, MetricRecord};
use crate::template;

/// Registry document bundled into the binary at compile time.
pub const BUILTIN_REGISTRY_YAML: &str = include_str!("../data/claims.yaml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryDoc {
    version: u32,
    #[serde(default)]
    metrics: Vec<MetricRecord>,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// Placeholder in a content block that names no metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingPlaceholder {
    pub content_id: String,
    pub metric_id: String,
}

#[derive(Debug, Default)]
pub struct Registry {
    metrics: BTreeMap<String, MetricRecord>,
    friendly: HashMap<String, String>,
    content: BTreeMap<String, ContentBlock>,
    dangling: Vec<DanglingPlaceholder>,
}

impl Registry {
    /// Parse the bundled registry document.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_REGISTRY_YAML)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let doc: RegistryDoc = serde_yaml::from_str(s)
            .map_err(|e| ClaimsError::BadRequest(format!("invalid registry yaml: {e}")))?;
        if doc.version != 1 {
            return Err(ClaimsError::UnsupportedVersion(doc.version));
        }
        Self::from_parts(doc.metrics, doc.content)
    }

    /// Build from already-parsed records. Duplicate ids are rejected.
    pub fn from_parts(metrics: Vec<MetricRecord>, content: Vec<ContentBlock>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        let mut friendly = HashMap::with_capacity(metrics.len());
        for m in metrics {
            if by_id.contains_key(&m.id) {
                return Err(ClaimsError::DuplicateId { kind: "metric", id: m.id });
            }
            friendly.insert(m.id.clone(), m.friendly());
            by_id.insert(m.id.clone(), m);
        }

        let mut blocks = BTreeMap::new();
        let mut dangling = Vec::new();
        for block in content {
            if blocks.contains_key(&block.id) {
                return Err(ClaimsError::DuplicateId { kind: "content", id: block.id });
            }
            let texts = std::iter::once(&block.template).chain(block.variants.values());
            for text in texts {
                for id in template::placeholders(text) {
                    if !by_id.contains_key(id) {
                        tracing::warn!(content = %block.id, metric = %id, "content placeholder references unknown metric");
                        dangling.push(DanglingPlaceholder {
                            content_id: block.id.clone(),
                            metric_id: id.to_string(),
                        });
                    }
                }
            }
            blocks.insert(block.id.clone(), block);
        }

        tracing::debug!(metrics = by_id.len(), content = blocks.len(), "registry built");

        Ok(Self {
            metrics: by_id,
            friendly,
            content: blocks,
            dangling,
        })
    }

    /// Metric record by id. Absence is not an error.
    pub fn metric(&self, id: &str) -> Option<&MetricRecord> {
        self.metrics.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.metrics.contains_key(id)
    }

    /// Pre-computed friendly string, `"N/A"` for unknown ids.
    pub fn formatted_metric(&self, id: &str) -> String {
        self.friendly
            .get(id)
            .cloned()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Raw template for a content block, preferring `variant` when it exists.
    /// Unknown ids yield an empty string.
    pub fn content(&self, id: &str, variant: Option<&str>) -> &str {
        self.content.get(id).map(|b| b.select(variant)).unwrap_or("")
    }

    pub fn content_block(&self, id: &str) -> Option<&ContentBlock> {
        self.content.get(id)
    }

    /// Metric records in id order.
    pub fn metrics(&self) -> impl Iterator<Item = &MetricRecord> {
        self.metrics.values()
    }

    pub fn metric_ids(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    pub fn content_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.values()
    }

    /// Friendly strings of every metric, used to spot hardcoded copies.
    pub fn friendly_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.friendly.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn dangling_placeholders(&self) -> &[DanglingPlaceholder] {
        &self.dangling
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Ids whose `validated_at` moved backwards relative to `previous`.
    ///
    /// Validation timestamps only move forward; a regression usually means an
    /// old data file was deployed.
    pub fn validated_at_regressions(&self, previous: &Registry) -> Vec<String> {
        let mut out = Vec::new();
        for m in self.metrics.values() {
            if let Some(old) = previous.metric(&m.id) {
                if m.validated_at < old.validated_at {
                    tracing::warn!(metric = %m.id, old = %old.validated_at, new = %m.validated_at, "validated_at moved backwards");
                    out.push(m.id.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    const DOC: &str = r#"
version: 1
metrics:
  - id: collectionLift
    category: performance
    value: 35
    unit: "%"
    confidence: high
    validated_at: "2025-01-15"
content:
  - id: hero
    template: "Improve by {{collectionLift}}"
    variants:
      short: "{{collectionLift}} lift"
  - id: broken
    template: "We saved {{missingMetric}}"
"#;

    #[test]
    fn lookups_and_fallbacks() {
        let reg = Registry::from_yaml_str(DOC).unwrap();
        assert_eq!(reg.len(), 1);
        assert!(reg.metric("collectionLift").is_some());
        assert!(reg.metric("doesNotExist").is_none());
        assert_eq!(reg.formatted_metric("collectionLift"), "35%");
        assert_eq!(reg.formatted_metric("doesNotExist"), "N/A");
        assert_eq!(reg.content("hero", Some("short")), "{{collectionLift}} lift");
        assert_eq!(reg.content("hero", Some("long")), "Improve by {{collectionLift}}");
        assert_eq!(reg.content("nope", None), "");
    }

    #[test]
    fn dangling_placeholders_are_collected() {
        let reg = Registry::from_yaml_str(DOC).unwrap();
        assert_eq!(
            reg.dangling_placeholders(),
            &[DanglingPlaceholder {
                content_id: "broken".into(),
                metric_id: "missingMetric".into(),
            }]
        );
    }

    #[test]
    fn duplicate_metric_ids_rejected() {
        let doc = r#"
version: 1
metrics:
  - { id: a, category: scale, value: 1, confidence: low, validated_at: "2025-01-01" }
  - { id: a, category: scale, value: 2, confidence: low, validated_at: "2025-01-01" }
"#;
        let err = Registry::from_yaml_str(doc).expect_err("duplicate must fail");
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }

    #[test]
    fn unsupported_version_rejected() {
        let err = Registry::from_yaml_str("version: 2\n").expect_err("must fail");
        assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
    }

    #[test]
    fn builtin_registry_parses_cleanly() {
        let reg = Registry::builtin().expect("builtin registry must parse");
        assert!(!reg.is_empty());
        assert!(reg.dangling_placeholders().is_empty());
        assert_eq!(reg.formatted_metric("collectionLift"), "35%");
    }

    #[test]
    fn regressions_detected_against_previous_snapshot() {
        let old = Registry::from_yaml_str(DOC).unwrap();
        let newer = Registry::from_yaml_str(&DOC.replace("2025-01-15", "2024-06-01")).unwrap();
        assert_eq!(newer.validated_at_regressions(&old), vec!["collectionLift".to_string()]);
        assert!(old.validated_at_regressions(&newer).is_empty());
    }
}

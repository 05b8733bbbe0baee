//! Registry record types.
//!
//! Records are parsed once from the registry document and never mutated
//! afterwards.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Metric grouping used by pages to pick related claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCategory {
    Performance,
    Financial,
    Operational,
    Technical,
    Scale,
}

/// Advisory confidence attached by whoever vetted the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Raw metric magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// One vetted marketing fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricRecord {
    pub id: String,
    pub category: MetricCategory,
    pub value: MetricValue,
    #[serde(default)]
    pub unit: String,
    /// Pre-authored friendly string, e.g. `$2B+`.
    #[serde(default)]
    pub display: Option<String>,
    #[serde(rename = "confidence")]
    pub confidence_level: ConfidenceLevel,
    #[serde(deserialize_with = "deserialize_validated_at")]
    pub validated_at: DateTime<Utc>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub supporting_data: Option<serde_json::Value>,
}

impl MetricRecord {
    /// Friendly display string: the authored `display`, else value + unit.
    pub fn friendly(&self) -> String {
        match &self.display {
            Some(d) => d.clone(),
            None => format!("{}{}", self.value, self.unit),
        }
    }
}

/// Text template bound to a page/section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentBlock {
    pub id: String,
    #[serde(default)]
    pub context: String,
    pub template: String,
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
}

impl ContentBlock {
    /// Named variant if present, else the default template.
    pub fn select(&self, variant: Option<&str>) -> &str {
        variant
            .and_then(|v| self.variants.get(v))
            .map(String::as_str)
            .unwrap_or(&self.template)
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn deserialize_validated_at<'de, D>(de: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(de)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid validated_at: {raw} (expected RFC 3339 or YYYY-MM-DD)"))
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

//! Display formatting for metric values.

use crate::registry::Registry;

/// Sentinel rendered in place of anything the registry cannot supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Presentation requested by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayFormat {
    Currency,
    Percentage,
    Number,
    #[default]
    Default,
}

impl DisplayFormat {
    /// Lenient parse: unknown names fall back to `Default`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "currency" => DisplayFormat::Currency,
            "percentage" | "percent" => DisplayFormat::Percentage,
            "number" => DisplayFormat::Number,
            _ => DisplayFormat::Default,
        }
    }
}

/// Apply `format` to the raw value of metric `id`.
pub fn formatted_value(registry: &Registry, id: &str, format: DisplayFormat) -> String {
    let Some(record) = registry.metric(id) else {
        return NOT_AVAILABLE.to_string();
    };
    let raw = record.value.to_string();
    match format {
        DisplayFormat::Currency => format!("${raw}"),
        DisplayFormat::Percentage => format!("{raw}%"),
        DisplayFormat::Number => raw,
        DisplayFormat::Default => registry.formatted_metric(id),
    }
}

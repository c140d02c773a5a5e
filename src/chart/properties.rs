//! Chart property definitions with defaults from chart.json
//!
//! chart.json is embedded at compile time and lists every configurable property
//! with its kind, default value and (for enumerated properties) valid values.
//! Defaults are defined in ONE place; readers fall back to the registry when the
//! user did not set a value.

use super::error::{BumpChartError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// chart.json embedded at compile time
const CHART_JSON: &str = include_str!("../../chart.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "StringProperty")]
    String,
    #[serde(rename = "EnumeratedProperty")]
    Enumerated,
}

/// Property definition from chart.json
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(rename = "defaultValue", default)]
    pub default_value: String,
    #[serde(default)]
    pub description: String,
    /// For EnumeratedProperty, the valid values
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ChartManifest {
    properties: Vec<PropertyDef>,
}

/// Registry of all chart properties with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a chart manifest (the layout of chart.json)
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: ChartManifest = serde_json::from_str(json)
            .map_err(|e| BumpChartError::Config(format!("Failed to parse chart.json: {}", e)))?;

        let properties = manifest
            .properties
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

/// Global registry instance, parsed once from the embedded chart.json
static REGISTRY: std::sync::OnceLock<PropertyRegistry> = std::sync::OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(CHART_JSON).unwrap_or_else(|e| {
            warn!("{}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed chart property reader
///
/// User values take precedence; anything unset or empty falls back to the
/// chart.json default.
pub struct ChartPropertyReader {
    user_values: HashMap<String, String>,
}

impl ChartPropertyReader {
    /// Create from user-set values (None = all defaults)
    pub fn new(values: Option<&HashMap<String, String>>) -> Self {
        let user_values = values
            .map(|map| {
                map.iter()
                    .filter(|(_, v)| !v.is_empty()) // Empty = not set
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Self { user_values }
    }

    /// Build the user value map from a JSON object
    ///
    /// Strings, numbers and booleans are accepted; other JSON values are skipped.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut values = HashMap::new();
        for (key, value) in map {
            let value_str = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    warn!("Ignoring property '{}' with unsupported value {}", key, other);
                    continue;
                }
            };
            values.insert(key.clone(), value_str);
        }
        Self::new(Some(&values))
    }

    /// Get string property (user value or default from chart.json)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get optional string property (None if empty)
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Get enumerated property with validation
    ///
    /// Returns the user-set value if valid, otherwise logs a warning and
    /// returns the default.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value, name, valid_values, default
            );
        }

        default.to_string()
    }

    /// Get boolean property stored as "true"/"false"
    pub fn get_bool(&self, name: &str) -> bool {
        self.get_enum(name).eq_ignore_ascii_case("true")
    }

    /// Get f64 property; unparsable values fall back to the default
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        let value = self.get_string(name);
        if value.trim().is_empty() {
            return default;
        }

        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(
                    "Invalid numeric value '{}' for property '{}'. Using default: {}",
                    value, name, default
                );
                default
            }
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        if (min..=max).contains(&value) {
            return value;
        }

        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(min);
        warn!(
            "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
            value, name, min, max, default
        );
        default
    }

    /// Get a comma separated list property (empty items dropped)
    pub fn get_list(&self, name: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .get_string(name)
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }

    /// Parse a pair "w,h" of positive numbers
    pub fn get_size(&self, name: &str) -> Option<(f64, f64)> {
        let value = self.get_string(name);
        let parts: Vec<&str> = value.split(',').collect();
        if parts.len() != 2 {
            warn!(
                "Invalid size format '{}' for property '{}', expected 'w,h'",
                value, name
            );
            return None;
        }

        let w = parts[0].trim().parse::<f64>().ok()?;
        let h = parts[1].trim().parse::<f64>().ok()?;
        if w > 0.0 && h > 0.0 {
            Some((w, h))
        } else {
            warn!("Size '{}' for property '{}' must be positive", value, name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(pairs: &[(&str, &str)]) -> ChartPropertyReader {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ChartPropertyReader::new(Some(&map))
    }

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("tie.method").is_some());
        assert!(reg.get_property("labels.min.distance").is_some());
        assert_eq!(
            reg.get_property("labels.show").map(|p| p.kind),
            Some(PropertyKind::Enumerated)
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("tie.method"), Some("average"));
        assert_eq!(reg.get_default("labels.padding"), Some("0.3"));
        assert_eq!(reg.get_default("labels.min.distance"), Some("0.5"));
        assert_eq!(reg.get_default("smooth"), Some("false"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("labels.show", "left"));
        assert!(reg.is_valid_enum_value("labels.show", "BOTH"));
        assert!(!reg.is_valid_enum_value("labels.show", "top"));
        // String properties accept anything
        assert!(reg.is_valid_enum_value("palette", "anything"));
    }

    #[test]
    fn test_reader_defaults() {
        let reader = ChartPropertyReader::new(None);
        assert_eq!(reader.get_enum("labels.show"), "true");
        assert_eq!(reader.get_f64("labels.padding"), 0.3);
        assert!(!reader.get_bool("smooth"));
        assert!(reader.get_bool("points.show"));
        assert_eq!(reader.get_optional_string("highlight"), None);
        assert_eq!(reader.get_size("figure.size"), Some((10.0, 6.0)));
    }

    #[test]
    fn test_reader_user_values() {
        let reader = reader(&[
            ("labels.show", "Left"),
            ("labels.padding", "0.8"),
            ("highlight", "A, B ,,C"),
        ]);
        assert_eq!(reader.get_enum("labels.show"), "left");
        assert_eq!(reader.get_f64("labels.padding"), 0.8);
        assert_eq!(
            reader.get_list("highlight"),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
    }

    #[test]
    fn test_reader_invalid_values_fall_back() {
        let reader = reader(&[
            ("labels.show", "top"),
            ("labels.padding", "wide"),
            ("dim.alpha", "4.0"),
            ("figure.size", "10"),
        ]);
        assert_eq!(reader.get_enum("labels.show"), "true");
        assert_eq!(reader.get_f64("labels.padding"), 0.3);
        assert_eq!(reader.get_f64_in_range("dim.alpha", 0.0, 1.0), 0.3);
        assert_eq!(reader.get_size("figure.size"), None);
    }

    #[test]
    fn test_reader_from_json_map() {
        let json: serde_json::Value = serde_json::json!({
            "smooth": true,
            "labels.min.distance": 1.25,
            "palette": "#FF0000,#00FF00",
            "ignored": [1, 2]
        });
        let reader = ChartPropertyReader::from_json_map(json.as_object().unwrap());
        assert!(reader.get_bool("smooth"));
        assert_eq!(reader.get_f64("labels.min.distance"), 1.25);
        assert_eq!(reader.get_list("palette").map(|p| p.len()), Some(2));
        assert_eq!(reader.get_string("ignored"), "");
    }
}

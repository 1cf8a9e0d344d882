use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_DELIMITER: &str = "|";
pub const DEFAULT_WIDTH: f64 = 600.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;
pub const DEFAULT_PADDING_CIRCLES: f64 = 10.0;

/// Parse and layout settings shared by the builder, the layout and the renderer.
///
/// JSON keys are camelCase (`paddingCircles`); missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub delimiter: String,
    pub width: f64,
    pub height: f64,
    pub padding_circles: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            padding_circles: DEFAULT_PADDING_CIRCLES,
        }
    }
}

impl Config {
    /// Reads settings from a loosely typed JSON object.
    ///
    /// Numbers may be given as JSON numbers or numeric strings (environment-style values).
    /// Anything unreadable falls back to the default with a warning.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        Self {
            delimiter: read_setting(value, "delimiter", config_string)
                .filter(|d| !d.is_empty())
                .unwrap_or(defaults.delimiter),
            width: read_setting(value, "width", config_f64).unwrap_or(defaults.width),
            height: read_setting(value, "height", config_f64).unwrap_or(defaults.height),
            padding_circles: read_setting(value, "paddingCircles", config_f64)
                .unwrap_or(defaults.padding_circles),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("delimiter".to_string(), Value::String(self.delimiter.clone()));
        map.insert("width".to_string(), Value::from(self.width));
        map.insert("height".to_string(), Value::from(self.height));
        map.insert("paddingCircles".to_string(), Value::from(self.padding_circles));
        Value::Object(map)
    }

    /// Returns a copy with `overrides` merged over the current settings.
    pub fn merged(&self, overrides: &Value) -> Self {
        let mut base = self.to_value();
        deep_merge_value(&mut base, overrides);
        Self::from_value(&base)
    }
}

fn read_setting<T>(
    cfg: &Value,
    key: &'static str,
    read: impl Fn(&Value, &[&str]) -> Option<T>,
) -> Option<T> {
    let raw = cfg.get(key)?;
    let parsed = read(cfg, &[key]);
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "ignoring unreadable config value");
    }
    parsed
}

fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_i64().map(|n| n as f64))
        .or_else(|| v.as_u64().map(|n| n as f64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

fn config_f64(cfg: &Value, path: &[&str]) -> Option<f64> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    json_f64(cur)
}

fn config_string(cfg: &Value, path: &[&str]) -> Option<String> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_str().map(|s| s.to_string())
}

pub fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

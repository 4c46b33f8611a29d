//! Text encodings for tool output.

use serde_json::Value;
use std::str::FromStr;

/// How structured tool output is rendered into a text content block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// One `path: value` line per scalar leaf.
    Lines,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "lines" => Ok(OutputFormat::Lines),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl OutputFormat {
    pub fn encode(&self, value: &Value) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(value),
            OutputFormat::Lines => Ok(encode_lines(value)),
        }
    }
}

/// Flatten `value` into `path: value` lines.
///
/// Strings are written unquoted; empty objects and arrays appear as `{}` and `[]`.
pub fn encode_lines(value: &Value) -> String {
    let mut lines = Vec::new();
    walk("", value, &mut lines);
    lines.join("\n")
}

fn walk(path: &str, value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                walk(&child_path, child, lines);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (idx, child) in items.iter().enumerate() {
                walk(&format!("{}[{}]", path, idx), child, lines);
            }
        }
        leaf => {
            let text = match leaf {
                Value::String(s) => s.clone(),
                Value::Object(_) => "{}".to_string(),
                Value::Array(_) => "[]".to_string(),
                other => other.to_string(),
            };
            if path.is_empty() {
                lines.push(text);
            } else {
                lines.push(format!("{}: {}", path, text));
            }
        }
    }
}

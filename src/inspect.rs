//! Quick look at an upstream JSON dump before ingesting it.

use anyhow::{Context, Result};
use std::path::Path;

use crate::ingest::json_type_name;

/// Shape of a JSON document: top-level type, length, first entry, its keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub kind: &'static str,
    pub len: Option<usize>,
    pub sample: Option<serde_json::Value>,
    pub keys: Vec<String>,
}

pub fn inspect_value(value: &serde_json::Value) -> Inspection {
    let (len, sample) = match value {
        serde_json::Value::Array(items) => (Some(items.len()), items.first().cloned()),
        serde_json::Value::Object(map) => (Some(map.len()), None),
        _ => (None, None),
    };
    let keys = match sample.as_ref().unwrap_or(value) {
        serde_json::Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    Inspection {
        kind: json_type_name(value),
        len,
        sample,
        keys,
    }
}

pub fn run_inspect(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let info = inspect_value(&value);

    println!("---- INSPECT {} ----", path.display());
    println!("Type: {}", info.kind);
    if let Some(len) = info.len {
        println!("Length: {}", len);
    }
    if let Some(sample) = &info.sample {
        println!("Sample entry:");
        println!("{}", serde_json::to_string_pretty(sample)?);
    }
    println!("Keys: {}", info.keys.join(", "));
    Ok(())
}

//! Compact card descriptors for the draw report.
//!
//! Raw catalog metadata arrives in whatever shape the source used: plain
//! values, nested lists and maps, or lists and maps stored as JSON text.
//! [`normalize`] prunes empty values and collapses one-element lists;
//! [`simplify_weaknesses`] flattens weakness records to type names.

use crate::{Card, CardMetadata};
use serde_json::{Map, Value};

const DROPPED_KEY: &str = "convertedEnergyCost";
const WEAKNESSES: &str = "weaknesses";

/// Recursive prune-and-collapse. `None` means the value carries nothing.
pub fn normalize(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) => {
            if text.trim().is_empty() {
                None
            } else {
                Some(value.clone())
            }
        }
        Value::Bool(_) | Value::Number(_) => Some(value.clone()),
        Value::Array(items) => {
            let mut kept: Vec<Value> = items.iter().filter_map(normalize).collect();
            match kept.len() {
                0 => None,
                1 => kept.pop(),
                _ => Some(Value::Array(kept)),
            }
        }
        Value::Object(fields) => {
            let kept: Map<String, Value> = fields
                .iter()
                .filter(|(key, _)| key.as_str() != DROPPED_KEY)
                .filter_map(|(key, value)| normalize(value).map(|value| (key.clone(), value)))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
    }
}

/// Reduces weaknesses to one type name, or a list when several distinct
/// types appear.
pub fn simplify_weaknesses(value: &Value) -> Option<Value> {
    let mut names: Vec<String> = Vec::new();
    collect_weakness_types(value, &mut names);
    match names.len() {
        0 => None,
        1 => names.pop().map(Value::String),
        _ => Some(Value::Array(names.into_iter().map(Value::String).collect())),
    }
}

fn collect_weakness_types(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(text) => push_distinct(names, text),
        Value::Object(fields) => {
            if let Some(Value::String(kind)) = fields.get("type") {
                push_distinct(names, kind);
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(_) | Value::Object(_) => collect_weakness_types(item, names),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn push_distinct(names: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if name.is_empty() || names.iter().any(|existing| existing == name) {
        return;
    }
    names.push(name.to_string());
}

/// Catalog rows may hold lists and maps as JSON text. Text that looks like
/// JSON but does not parse yields `None` so the field is left out.
pub fn decode_field(value: &Value) -> Option<Value> {
    let Value::String(text) = value else {
        return Some(value.clone());
    };
    let trimmed = text.trim();
    let looks_structured = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));
    if !looks_structured {
        return Some(value.clone());
    }
    match serde_json::from_str(trimmed) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::debug!("dropping malformed metadata field: {err}");
            None
        }
    }
}

pub fn build_metadata_descriptor(metadata: &CardMetadata) -> Value {
    let mut descriptor = Map::new();
    for (name, raw) in metadata.fields() {
        let Some(decoded) = raw.and_then(decode_field) else {
            continue;
        };
        let normalized = if name == WEAKNESSES {
            simplify_weaknesses(&decoded)
        } else {
            normalize(&decoded)
        };
        if let Some(value) = normalized {
            descriptor.insert(name.to_string(), value);
        }
    }
    Value::Object(descriptor)
}

pub fn build_descriptor(card: &Card) -> Value {
    build_metadata_descriptor(&card.metadata)
}

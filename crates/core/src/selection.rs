use crate::{Pack, PackKey, SelectionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const SELECTION_VERSION: u32 = 1;

/// A pack picked for opening, as it travels in draw requests and exported
/// selections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedPack {
    #[serde(rename = "packName", default)]
    pub name: String,
    #[serde(rename = "packSeries", default)]
    pub series: String,
    #[serde(rename = "packCode", default)]
    pub code: String,
    #[serde(rename = "releaseDate", default)]
    pub release_date: String,
    #[serde(default)]
    pub quantity: u32,
}

impl SelectedPack {
    pub fn new(pack: &Pack, quantity: u32) -> Self {
        Self {
            name: pack.name.clone(),
            series: pack.series.clone(),
            code: pack.code.clone(),
            release_date: pack.release_date.clone(),
            quantity,
        }
    }

    pub fn key(&self) -> PackKey {
        PackKey {
            name: self.name.clone(),
            series: self.series.clone(),
            release_date: self.release_date.clone(),
            code: self.code.clone(),
        }
    }

    pub fn pack(&self) -> Pack {
        Pack {
            name: self.name.clone(),
            series: self.series.clone(),
            code: self.code.clone(),
            release_date: self.release_date.clone(),
            ..Pack::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionDocument {
    pub version: u32,
    pub packs: Vec<SelectedPack>,
}

pub fn export_selection(selected: &[SelectedPack]) -> String {
    let document = SelectionDocument {
        version: SELECTION_VERSION,
        packs: selected
            .iter()
            .filter(|entry| entry.quantity > 0)
            .cloned()
            .collect(),
    };
    // Plain strings and integers only; serialisation cannot fail.
    serde_json::to_string(&document).unwrap_or_default()
}

/// Parses an exported selection against the packs currently known.
///
/// Entries that are not objects, have no positive quantity, or name an
/// unknown pack are skipped. Later duplicates override earlier ones. The
/// result follows the order of `known`.
pub fn import_selection(raw: &str, known: &[Pack]) -> Result<Vec<SelectedPack>, SelectionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SelectionError::Empty);
    }
    let parsed: Value = serde_json::from_str(raw)?;
    if let Some(version) = parsed.get("version").and_then(Value::as_u64) {
        if version != SELECTION_VERSION as u64 {
            return Err(SelectionError::UnsupportedVersion {
                found: version as u32,
                expected: SELECTION_VERSION,
            });
        }
    }
    let entries = parsed
        .get("packs")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let valid: HashSet<PackKey> = known.iter().map(Pack::key).collect();
    let mut quantities: HashMap<PackKey, u32> = HashMap::new();
    for item in &entries {
        let Value::Object(fields) = item else {
            continue;
        };
        let entry = SelectedPack {
            name: text_field(fields.get("packName")),
            series: text_field(fields.get("packSeries")),
            code: text_field(fields.get("packCode")),
            release_date: text_field(fields.get("releaseDate")),
            quantity: parse_quantity(fields.get("quantity")),
        };
        if entry.quantity == 0 {
            continue;
        }
        let key = entry.key();
        if !valid.contains(&key) {
            continue;
        }
        quantities.insert(key, entry.quantity);
    }

    Ok(known
        .iter()
        .filter_map(|pack| {
            quantities
                .get(&pack.key())
                .map(|quantity| SelectedPack::new(pack, *quantity))
        })
        .collect())
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Leading-integer parse: `"3 packs"` is 3, negatives and junk are 0.
pub fn parse_quantity(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(number)) => {
            if let Some(value) = number.as_u64() {
                value.min(u32::MAX as u64) as u32
            } else {
                number
                    .as_f64()
                    .filter(|value| value.is_finite() && *value >= 1.0)
                    .map(|value| value.min(u32::MAX as f64) as u32)
                    .unwrap_or(0)
            }
        }
        Some(Value::String(text)) => {
            let digits: String = text
                .trim_start()
                .trim_start_matches('+')
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse::<u64>().map_or(0, |value| value.min(u32::MAX as u64) as u32)
        }
        _ => 0,
    }
}

use anyhow::{bail, Context};
use packsim_core::{SlotDefinition, SlotTable};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub const DEFAULT_LANGUAGE: &str = "en";

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

pub fn load_slot_table(path: &Path) -> anyhow::Result<SlotTable> {
    let slots: Vec<SlotDefinition> = load_json(path)?;
    if slots.is_empty() {
        bail!("{} defines no slots", path.display());
    }
    SlotTable::new(slots).with_context(|| format!("validate {}", path.display()))
}

/// Catalog directories are keyed by bare language codes: `en_US` and `EN`
/// both resolve to `en`.
pub fn normalize_language(language: Option<&str>) -> String {
    let raw = language.unwrap_or(DEFAULT_LANGUAGE).trim();
    let base = raw
        .split(|ch: char| ch == '_' || ch == '-')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if base.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        base
    }
}

/// `1999/01/09` and `1999-01-09` both become `1999-01-09`; anything that is
/// not a calendar date becomes empty.
pub fn normalize_release_date(raw: &str) -> String {
    let candidate = raw.trim().replace('/', "-");
    let parts: Vec<&str> = candidate.split('-').collect();
    let &[year, month, day] = parts.as_slice() else {
        return String::new();
    };
    let numeric = |part: &str, len: usize| {
        part.len() == len && part.chars().all(|ch| ch.is_ascii_digit())
    };
    if !(numeric(year, 4) && numeric(month, 2) && numeric(day, 2)) {
        return String::new();
    }
    let month: u32 = month.parse().unwrap_or(0);
    let day: u32 = day.parse().unwrap_or(0);
    let year: u32 = year.parse().unwrap_or(0);
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return String::new(),
    };
    if day == 0 || day > days_in_month {
        return String::new();
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn release_dates_normalise_to_iso() {
        assert_eq!(normalize_release_date("1999/01/09"), "1999-01-09");
        assert_eq!(normalize_release_date(" 2023-03-31 "), "2023-03-31");
        assert_eq!(normalize_release_date("2024/02/29"), "2024-02-29");
        assert_eq!(normalize_release_date("2023/02/29"), "");
        assert_eq!(normalize_release_date("1999/13/01"), "");
        assert_eq!(normalize_release_date("soon"), "");
        assert_eq!(normalize_release_date(""), "");
    }

    #[test]
    fn languages_reduce_to_base_code() {
        assert_eq!(normalize_language(None), "en");
        assert_eq!(normalize_language(Some("en_US")), "en");
        assert_eq!(normalize_language(Some("JA-jp")), "ja");
        assert_eq!(normalize_language(Some("  ")), "en");
    }

    #[test]
    fn slot_table_file_is_validated() {
        let file = unique_temp_file();
        std::fs::write(
            &file,
            r#"[
  {"slot": 2, "weights": [{"rarity": "Rare", "weight": 1.0}]},
  {"slot": 1, "weights": [{"rarity": "Common", "weight": 3.5}]}
]"#,
        )
        .expect("write");
        let table = load_slot_table(&file).expect("load");
        assert_eq!(table.slots()[0].slot, 1);
        assert_eq!(table.slots()[0].weights[0].weight, 3.5);

        std::fs::write(
            &file,
            r#"[{"slot": 12, "weights": []}]"#,
        )
        .expect("write");
        let err = load_slot_table(&file).expect_err("out of range");
        assert!(format!("{err:#}").contains("outside"));

        std::fs::write(&file, "[]").expect("write");
        assert!(load_slot_table(&file).is_err());
        let _ = std::fs::remove_file(file);
    }

    fn unique_temp_file() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "packsim_slots_test_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }
}

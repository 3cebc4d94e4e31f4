use crate::catalog::JsonCatalog;
use crate::load::{load_json, load_slot_table};
use packsim_core::SlotTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PACKSIM_CONFIG";
pub const DATA_ENV: &str = "PACKSIM_DATA";
pub const BIND_ENV: &str = "PACKSIM_BIND";
pub const SLOTS_ENV: &str = "PACKSIM_SLOTS";
pub const LANG_ENV: &str = "PACKSIM_LANG";
pub const MAX_QUANTITY_ENV: &str = "PACKSIM_MAX_QUANTITY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub language: String,
    pub bind: String,
    pub slots: Option<PathBuf>,
    pub workers: usize,
    /// Largest quantity accepted for one pack in a single batch.
    pub max_quantity: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("assets"),
            language: crate::DEFAULT_LANGUAGE.to_string(),
            bind: "0.0.0.0:7878".to_string(),
            slots: None,
            workers: 4,
            max_quantity: 1000,
        }
    }
}

impl AppConfig {
    /// File (explicit path, else `PACKSIM_CONFIG`), then environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let mut config = match path {
            Some(path) => load_json(&path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let set = |name: &str| var(name).filter(|value| !value.trim().is_empty());
        if let Some(value) = set(DATA_ENV) {
            self.data_dir = PathBuf::from(value);
        }
        if let Some(value) = set(BIND_ENV) {
            self.bind = value;
        }
        if let Some(value) = set(SLOTS_ENV) {
            self.slots = Some(PathBuf::from(value));
        }
        if let Some(value) = set(LANG_ENV) {
            self.language = value;
        }
        if let Some(value) = set(MAX_QUANTITY_ENV) {
            match value.trim().parse() {
                Ok(max) => self.max_quantity = max,
                Err(err) => log::warn!("ignoring {MAX_QUANTITY_ENV}={value}: {err}"),
            }
        }
    }

    pub fn slot_table(&self) -> anyhow::Result<SlotTable> {
        match &self.slots {
            Some(path) => load_slot_table(path),
            None => Ok(SlotTable::standard()),
        }
    }

    pub fn open_catalog(&self) -> anyhow::Result<JsonCatalog> {
        JsonCatalog::open(&self.data_dir, Some(&self.language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_config_file_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"bind":"127.0.0.1:9000"}"#).expect("parse");
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.data_dir, PathBuf::from("assets"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_quantity, 1000);
        assert!(config.slots.is_none());
    }

    #[test]
    fn env_overrides_non_blank_values() {
        let vars: HashMap<&str, &str> = [
            (DATA_ENV, "/srv/cards"),
            (SLOTS_ENV, "slots.json"),
            (BIND_ENV, "  "),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_env(|name| vars.get(name).map(|value| value.to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/srv/cards"));
        assert_eq!(config.slots, Some(PathBuf::from("slots.json")));
        assert_eq!(config.bind, "0.0.0.0:7878");
    }

    #[test]
    fn max_quantity_env_must_be_numeric() {
        let mut config = AppConfig::default();
        config.apply_env(|name| (name == MAX_QUANTITY_ENV).then(|| "25".to_string()));
        assert_eq!(config.max_quantity, 25);
        config.apply_env(|name| (name == MAX_QUANTITY_ENV).then(|| "lots".to_string()));
        assert_eq!(config.max_quantity, 25);
    }

    #[test]
    fn default_slot_table_is_standard() {
        let table = AppConfig::default().slot_table().expect("table");
        assert_eq!(table, SlotTable::standard());
    }
}

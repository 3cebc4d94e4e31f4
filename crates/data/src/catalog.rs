use crate::load::{load_json, normalize_language, normalize_release_date};
use anyhow::{bail, Context};
use packsim_core::{Card, Catalog, CatalogError, Pack, PackKey, RarityGroups};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSet {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    series: Option<String>,
    #[serde(default)]
    ptcgo_code: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    total: Option<u32>,
    #[serde(default)]
    printed_total: Option<u32>,
}

impl RawSet {
    fn into_pack(self) -> Pack {
        Pack {
            name: self.name.unwrap_or_default(),
            series: self.series.unwrap_or_default(),
            code: self.ptcgo_code.unwrap_or_default(),
            release_date: self
                .release_date
                .as_deref()
                .map(normalize_release_date)
                .unwrap_or_default(),
            card_count: self.total.or(self.printed_total).unwrap_or(0),
            id: self.id,
        }
    }
}

/// Set files sometimes nest arrays of sets; a lone object is one set.
fn flatten_sets(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Object(_) => out.push(value),
        Value::Array(items) => {
            for item in items {
                flatten_sets(item, out);
            }
        }
        _ => {}
    }
}

/// Catalog backed by a pokemon-tcg-data style directory:
/// `sets/<lang>.json` lists the packs and `cards/<lang>/<set id>.json` holds
/// each pack's cards. Card files are read on demand.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    root: PathBuf,
    language: String,
    packs: Vec<Pack>,
}

impl JsonCatalog {
    pub fn open(root: &Path, language: Option<&str>) -> anyhow::Result<Self> {
        let language = normalize_language(language);
        let sets_path = root.join("sets").join(format!("{language}.json"));
        let raw: Value = load_json(&sets_path)?;
        let mut entries = Vec::new();
        flatten_sets(raw, &mut entries);

        let mut packs = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<RawSet>(entry) {
                Ok(set) => packs.push(set.into_pack()),
                Err(err) => log::warn!("skipping set in {}: {err}", sets_path.display()),
            }
        }
        if packs.is_empty() {
            bail!("no packs found in {}", sets_path.display());
        }
        packs.sort_by(|a, b| {
            a.release_date
                .cmp(&b.release_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        log::info!("loaded {} packs from {}", packs.len(), sets_path.display());
        Ok(Self {
            root: root.to_path_buf(),
            language,
            packs,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn all_packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn pack_by_key(&self, key: &PackKey) -> Option<&Pack> {
        self.packs.iter().find(|pack| &pack.key() == key)
    }

    /// Resolves a user-typed pack reference: set id, then code, then name,
    /// all case-insensitive.
    pub fn find_pack(&self, query: &str) -> Option<&Pack> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.packs
            .iter()
            .find(|pack| pack.id.eq_ignore_ascii_case(query))
            .or_else(|| {
                self.packs
                    .iter()
                    .find(|pack| !pack.code.is_empty() && pack.code.eq_ignore_ascii_case(query))
            })
            .or_else(|| {
                let lowered = query.to_lowercase();
                self.packs
                    .iter()
                    .find(|pack| pack.name.to_lowercase() == lowered)
            })
    }

    pub fn cards_path(&self, set_id: &str) -> PathBuf {
        self.root
            .join("cards")
            .join(&self.language)
            .join(format!("{set_id}.json"))
    }

    pub fn load_cards(&self, set_id: &str) -> anyhow::Result<Vec<Card>> {
        let path = self.cards_path(set_id);
        let raw: Value = load_json(&path)?;
        let Value::Array(items) = raw else {
            bail!("{} is not a list of cards", path.display());
        };
        let mut cards = Vec::with_capacity(items.len());
        for item in items {
            if !item.is_object() {
                continue;
            }
            match serde_json::from_value::<Card>(item) {
                Ok(card) if card.rarity.is_none() => {
                    log::debug!("card {} has no rarity; not drawable", card.id);
                }
                Ok(card) => cards.push(card),
                Err(err) => log::warn!("skipping card in {}: {err}", path.display()),
            }
        }
        Ok(cards)
    }

    fn groups_for(&self, key: &PackKey) -> anyhow::Result<RarityGroups> {
        let pack = self
            .pack_by_key(key)
            .with_context(|| format!("unknown pack {key}"))?;
        let cards = self.load_cards(&pack.id)?;
        Ok(RarityGroups::from_cards(cards))
    }
}

impl Catalog for JsonCatalog {
    fn packs(&self) -> Result<Vec<Pack>, CatalogError> {
        Ok(self.packs.clone())
    }

    fn rarity_groups(&self, key: &PackKey) -> Result<RarityGroups, CatalogError> {
        if self.pack_by_key(key).is_none() {
            return Err(CatalogError::UnknownPack(key.clone()));
        }
        self.groups_for(key)
            .map_err(|err| CatalogError::Source(format!("{err:#}")))
    }
}

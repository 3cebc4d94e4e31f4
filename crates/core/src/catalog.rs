use crate::{Card, Pack, PackKey, RarityGroups};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("unknown pack: {0}")]
    UnknownPack(PackKey),
    #[error("catalog error: {0}")]
    Source(String),
}

/// Card source for the engine. Implementations may block on IO; the engine
/// only calls `rarity_groups` when a pack's groups are first built.
pub trait Catalog: Send + Sync {
    fn packs(&self) -> Result<Vec<Pack>, CatalogError>;
    fn rarity_groups(&self, key: &PackKey) -> Result<RarityGroups, CatalogError>;
}

/// Catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    packs: Vec<Pack>,
    cards: HashMap<PackKey, Vec<Card>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut pack: Pack, cards: Vec<Card>) {
        pack.card_count = cards.len() as u32;
        let key = pack.key();
        self.packs.retain(|existing| existing.key() != key);
        self.packs.push(pack);
        self.cards.insert(key, cards);
    }

    pub fn with_pack(mut self, pack: Pack, cards: Vec<Card>) -> Self {
        self.insert(pack, cards);
        self
    }
}

impl Catalog for MemoryCatalog {
    fn packs(&self) -> Result<Vec<Pack>, CatalogError> {
        Ok(self.packs.clone())
    }

    fn rarity_groups(&self, key: &PackKey) -> Result<RarityGroups, CatalogError> {
        self.cards
            .get(key)
            .map(|cards| RarityGroups::from_cards(cards.iter().cloned()))
            .ok_or_else(|| CatalogError::UnknownPack(key.clone()))
    }
}

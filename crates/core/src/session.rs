use crate::{
    compile_slots, format_report, random_seed, seed_from_str, simulate, Catalog, PackKey,
    PackResult, RarityGroupCache, RarityGroups, RngState, SelectedPack, SimulationError,
    SlotTable,
};
use rayon::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub text: String,
    pub pack_count: u64,
    pub card_count: u64,
    pub seed: u64,
    pub results: Vec<PackResult>,
}

impl BatchReport {
    pub fn status_line(&self) -> String {
        format!(
            "Opened {} packs and drew {} cards.",
            self.pack_count, self.card_count
        )
    }
}

/// Owns the catalog, the slot table and the per-pack group cache.
pub struct Session<C: Catalog> {
    catalog: C,
    slots: SlotTable,
    cache: RarityGroupCache,
    max_quantity: Option<u32>,
}

impl<C: Catalog> Session<C> {
    pub fn new(catalog: C, slots: SlotTable) -> Self {
        Self {
            catalog,
            slots,
            cache: RarityGroupCache::new(),
            max_quantity: None,
        }
    }

    /// Caps the quantity of any single selection entry.
    pub fn with_max_quantity(mut self, max: u32) -> Self {
        self.max_quantity = Some(max);
        self
    }

    pub fn max_quantity(&self) -> Option<u32> {
        self.max_quantity
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn cache(&self) -> &RarityGroupCache {
        &self.cache
    }

    pub fn groups(&self, key: &PackKey) -> Result<Arc<RarityGroups>, SimulationError> {
        Ok(self.cache.load(&self.catalog, key)?)
    }

    pub fn open_pack(
        &self,
        selected: &SelectedPack,
        rng: &mut RngState,
    ) -> Result<PackResult, SimulationError> {
        let groups = self.groups(&selected.key())?;
        let compiled = compile_slots(&self.slots, &groups);
        let draw = simulate(selected.quantity, &groups, &compiled, rng);
        Ok(PackResult {
            pack: selected.pack(),
            quantity: selected.quantity,
            draw,
        })
    }

    /// Opens every selected pack and renders the combined report.
    ///
    /// Packs run in parallel, each on its own stream forked from the batch
    /// seed by selection position, so a given seed and selection always
    /// render the same text.
    pub fn open(
        &self,
        selection: &[SelectedPack],
        seed: Option<&str>,
    ) -> Result<BatchReport, SimulationError> {
        validate_selection(selection, self.max_quantity)?;
        let seed = seed
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(seed_from_str)
            .unwrap_or_else(random_seed);
        let root = RngState::from_seed(seed);
        let results: Vec<PackResult> = selection
            .par_iter()
            .enumerate()
            .map(|(idx, selected)| {
                let mut rng = root.fork(idx as u64);
                self.open_pack(selected, &mut rng)
            })
            .collect::<Result<_, _>>()?;

        let pack_count = selection.iter().map(|entry| entry.quantity as u64).sum();
        let card_count = results.iter().map(|result| result.draw.total).sum();
        let distinct: usize = results.iter().map(|result| result.draw.distinct()).sum();
        log::info!(
            "opened {} packs across {} selections, {} cards drawn ({} distinct, seed {})",
            pack_count,
            selection.len(),
            card_count,
            distinct,
            seed
        );
        Ok(BatchReport {
            text: format_report(&results),
            pack_count,
            card_count,
            seed,
            results,
        })
    }
}

pub fn validate_selection(
    selection: &[SelectedPack],
    max_quantity: Option<u32>,
) -> Result<(), SimulationError> {
    if selection.is_empty() {
        return Err(SimulationError::NoSelection);
    }
    if let Some(entry) = selection.iter().find(|entry| entry.quantity == 0) {
        return Err(SimulationError::ZeroQuantity { pack: entry.key() });
    }
    if let Some(max) = max_quantity {
        if let Some(entry) = selection.iter().find(|entry| entry.quantity > max) {
            return Err(SimulationError::QuantityTooLarge {
                pack: entry.key(),
                quantity: entry.quantity,
                max,
            });
        }
    }
    Ok(())
}

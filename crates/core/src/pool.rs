use crate::{RarityGroups, SlotDefinition, SlotTable};

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedBin {
    pub rarity: String,
    pub ceiling: f64,
}

/// A slot restricted to the rarities one pack can actually supply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSlot {
    pub slot: u8,
    pub bins: Vec<WeightedBin>,
    pub total: f64,
}

impl CompiledSlot {
    pub fn is_inert(&self) -> bool {
        self.total <= 0.0 || self.bins.is_empty()
    }
}

pub fn compile_slot(definition: &SlotDefinition, groups: &RarityGroups) -> CompiledSlot {
    let mut total = 0.0;
    let mut bins = Vec::with_capacity(definition.weights.len());
    for entry in &definition.weights {
        if !(entry.weight.is_finite() && entry.weight > 0.0) {
            continue;
        }
        if groups.get(&entry.rarity).is_none() {
            continue;
        }
        total += entry.weight;
        bins.push(WeightedBin {
            rarity: entry.rarity.clone(),
            ceiling: total,
        });
    }
    CompiledSlot {
        slot: definition.slot,
        bins,
        total,
    }
}

pub fn compile_slots(table: &SlotTable, groups: &RarityGroups) -> Vec<CompiledSlot> {
    let compiled: Vec<CompiledSlot> = table
        .slots()
        .iter()
        .map(|definition| compile_slot(definition, groups))
        .collect();
    let inert = compiled.iter().filter(|slot| slot.is_inert()).count();
    if inert > 0 {
        log::debug!("{} of {} slots have no eligible rarity", inert, compiled.len());
    }
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Card;

    fn groups() -> RarityGroups {
        RarityGroups::from_cards(vec![
            Card::new("c1", "1", "Common"),
            Card::new("r1", "2", "Rare"),
        ])
    }

    #[test]
    fn bins_accumulate_in_entry_order() {
        let slot = SlotDefinition::new(
            1,
            &[("Rare", 30.0), ("Missing", 50.0), ("Common", 70.0)],
        );
        let compiled = compile_slot(&slot, &groups());
        assert_eq!(compiled.total, 100.0);
        assert_eq!(
            compiled.bins,
            vec![
                WeightedBin {
                    rarity: "Rare".to_string(),
                    ceiling: 30.0
                },
                WeightedBin {
                    rarity: "Common".to_string(),
                    ceiling: 100.0
                },
            ]
        );
    }

    #[test]
    fn non_positive_and_non_finite_weights_are_skipped() {
        let slot = SlotDefinition::new(
            2,
            &[("Common", 0.0), ("Rare", -4.0), ("Common", f64::NAN)],
        );
        let compiled = compile_slot(&slot, &groups());
        assert!(compiled.is_inert());
        assert_eq!(compiled.total, 0.0);
    }

    #[test]
    fn table_compiles_every_slot() {
        let compiled = compile_slots(&SlotTable::standard(), &groups());
        assert_eq!(compiled.len(), 10);
        // Only Common and Rare exist: slots 5-7 and the tail slot go inert.
        let live: Vec<u8> = compiled
            .iter()
            .filter(|slot| !slot.is_inert())
            .map(|slot| slot.slot)
            .collect();
        assert_eq!(live, vec![1, 2, 3, 4, 8, 9]);
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SLOT_COUNT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RarityWeight {
    pub rarity: String,
    pub weight: f64,
}

/// One draw position. Entry order is significant: it fixes bin order after
/// compilation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotDefinition {
    pub slot: u8,
    pub weights: Vec<RarityWeight>,
}

impl SlotDefinition {
    pub fn new(slot: u8, weights: &[(&str, f64)]) -> Self {
        Self {
            slot,
            weights: weights
                .iter()
                .map(|(rarity, weight)| RarityWeight {
                    rarity: rarity.to_string(),
                    weight: *weight,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SlotTableError {
    #[error("slot index {0} is outside 1..={SLOT_COUNT}")]
    OutOfRange(u8),
    #[error("slot {0} is defined more than once")]
    Duplicate(u8),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SlotTable {
    slots: Vec<SlotDefinition>,
}

const SLOT_TEN: &[(&str, f64)] = &[
    ("Rare Holo", 25.0),
    ("Rare Holo EX", 8.0),
    ("Rare Holo GX", 8.0),
    ("Rare Holo V", 8.0),
    ("Double Rare", 8.0),
    ("Rare Holo VMAX", 5.0),
    ("Rare Holo VSTAR", 5.0),
    ("Rare Ultra", 5.0),
    ("Ultra Rare", 5.0),
    ("Illustration Rare", 4.0),
    ("Rare BREAK", 3.0),
    ("Rare Prime", 3.0),
    ("Rare Holo LV.X", 3.0),
    ("Rare Prism Star", 2.5),
    ("Rare ACE", 2.0),
    ("ACE SPEC Rare", 2.0),
    ("Radiant Rare", 2.0),
    ("Amazing Rare", 2.0),
    ("Trainer Gallery Rare Holo", 2.0),
    ("Rare Holo Star", 1.5),
    ("LEGEND", 1.5),
    ("Rare Shining", 1.5),
    ("Rare Shiny", 1.5),
    ("Shiny Rare", 1.5),
    ("Special Illustration Rare", 1.0),
    ("Rare Secret", 1.0),
    ("Rare Rainbow", 1.0),
    ("Rare Shiny GX", 0.5),
    ("Shiny Ultra Rare", 0.5),
    ("Hyper Rare", 0.2),
];

impl SlotTable {
    /// Validates indices; slots are kept ordered by index.
    pub fn new(mut slots: Vec<SlotDefinition>) -> Result<Self, SlotTableError> {
        slots.sort_by_key(|slot| slot.slot);
        for pair in slots.windows(2) {
            if pair[0].slot == pair[1].slot {
                return Err(SlotTableError::Duplicate(pair[0].slot));
            }
        }
        if let Some(bad) = slots
            .iter()
            .find(|slot| slot.slot == 0 || slot.slot as usize > SLOT_COUNT)
        {
            return Err(SlotTableError::OutOfRange(bad.slot));
        }
        Ok(Self { slots })
    }

    /// Booster layout used when no table is configured.
    pub fn standard() -> Self {
        let mut slots = Vec::with_capacity(SLOT_COUNT);
        for slot in 1..=4 {
            slots.push(SlotDefinition::new(slot, &[("Common", 100.0)]));
        }
        for slot in 5..=7 {
            slots.push(SlotDefinition::new(slot, &[("Uncommon", 100.0)]));
        }
        slots.push(SlotDefinition::new(8, &[("Common", 60.0), ("Uncommon", 40.0)]));
        slots.push(SlotDefinition::new(9, &[("Rare", 80.0), ("Rare Holo", 20.0)]));
        slots.push(SlotDefinition::new(10, SLOT_TEN));
        Self { slots }
    }

    pub fn slots(&self) -> &[SlotDefinition] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_shape() {
        let table = SlotTable::standard();
        assert_eq!(table.len(), SLOT_COUNT);
        let indices: Vec<u8> = table.slots().iter().map(|slot| slot.slot).collect();
        assert_eq!(indices, (1..=10).collect::<Vec<u8>>());
        let tail = &table.slots()[9].weights;
        assert_eq!(tail.len(), 30);
        let max = tail.iter().map(|w| w.weight).fold(f64::MIN, f64::max);
        let min = tail.iter().map(|w| w.weight).fold(f64::MAX, f64::min);
        assert_eq!(max, 25.0);
        assert_eq!(min, 0.2);
    }

    #[test]
    fn rejects_duplicate_and_out_of_range_slots() {
        let dup = SlotTable::new(vec![
            SlotDefinition::new(2, &[("Common", 1.0)]),
            SlotDefinition::new(2, &[("Rare", 1.0)]),
        ]);
        assert_eq!(dup, Err(SlotTableError::Duplicate(2)));
        let range = SlotTable::new(vec![SlotDefinition::new(11, &[("Common", 1.0)])]);
        assert_eq!(range, Err(SlotTableError::OutOfRange(11)));
    }

    #[test]
    fn new_orders_slots_by_index() {
        let table = SlotTable::new(vec![
            SlotDefinition::new(3, &[("Rare", 1.0)]),
            SlotDefinition::new(1, &[("Common", 1.0)]),
        ])
        .expect("table");
        assert_eq!(table.slots()[0].slot, 1);
        assert_eq!(table.slots()[1].slot, 3);
    }
}

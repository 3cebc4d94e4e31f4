use crate::{choose_card, choose_rarity, Card, CompiledSlot, RarityGroups, RngState};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawResult {
    pub counts: HashMap<String, u64>,
    pub cards: HashMap<String, Card>,
    pub total: u64,
}

impl DrawResult {
    pub fn record(&mut self, card: &Card) {
        *self.counts.entry(card.id.clone()).or_insert(0) += 1;
        if !self.cards.contains_key(&card.id) {
            self.cards.insert(card.id.clone(), card.clone());
        }
        self.total += 1;
    }

    pub fn count(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}

/// Opens `quantity` packs, one draw per live slot per pack, consuming `rng`
/// in pack-then-slot order.
pub fn simulate(
    quantity: u32,
    groups: &RarityGroups,
    slots: &[CompiledSlot],
    rng: &mut RngState,
) -> DrawResult {
    let mut result = DrawResult::default();
    for _ in 0..quantity {
        for slot in slots {
            if slot.is_inert() {
                continue;
            }
            let Some(rarity) = choose_rarity(slot, rng) else {
                continue;
            };
            let Some(cards) = groups.get(rarity) else {
                continue;
            };
            if let Some(card) = choose_card(cards, rng) {
                result.record(card);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compile_slots, SlotDefinition, SlotTable};

    fn commons() -> RarityGroups {
        RarityGroups::from_cards(
            (1..=4).map(|idx| Card::new(format!("c{idx}"), idx.to_string(), "Common")),
        )
    }

    #[test]
    fn record_keeps_first_representative() {
        let mut result = DrawResult::default();
        let card = Card::new("c1", "1", "Common");
        result.record(&card);
        result.record(&card);
        assert_eq!(result.count("c1"), 2);
        assert_eq!(result.distinct(), 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.count("missing"), 0);
    }

    #[test]
    fn zero_quantity_draws_nothing() {
        let slots = compile_slots(&SlotTable::standard(), &commons());
        let result = simulate(0, &commons(), &slots, &mut RngState::from_seed(1));
        assert_eq!(result, DrawResult::default());
    }

    #[test]
    fn same_seed_same_result() {
        let table = SlotTable::new(vec![SlotDefinition::new(1, &[("Common", 1.0)])])
            .expect("table");
        let groups = commons();
        let slots = compile_slots(&table, &groups);
        let a = simulate(25, &groups, &slots, &mut RngState::from_seed(77));
        let b = simulate(25, &groups, &slots, &mut RngState::from_seed(77));
        assert_eq!(a, b);
        assert_eq!(a.total, 25);
    }
}

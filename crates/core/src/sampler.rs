use crate::{Card, CompiledSlot, RngState};

/// Roulette-wheel pick over the compiled bins. The scan is linear and keeps
/// first-match order; if rounding lets the roll reach the total, the last bin
/// wins rather than dropping the draw.
pub fn choose_rarity<'a>(slot: &'a CompiledSlot, rng: &mut RngState) -> Option<&'a str> {
    if slot.total <= 0.0 {
        return None;
    }
    let last = slot.bins.last()?;
    let roll = rng.next_f64(slot.total);
    slot.bins
        .iter()
        .find(|bin| bin.ceiling > roll)
        .or(Some(last))
        .map(|bin| bin.rarity.as_str())
}

pub fn choose_card<'a>(cards: &'a [Card], rng: &mut RngState) -> Option<&'a Card> {
    if cards.is_empty() {
        return None;
    }
    cards.get(rng.next_index(cards.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeightedBin;

    fn slot(bins: &[(&str, f64)]) -> CompiledSlot {
        let mut total = 0.0;
        let bins = bins
            .iter()
            .map(|(rarity, weight)| {
                total += weight;
                WeightedBin {
                    rarity: rarity.to_string(),
                    ceiling: total,
                }
            })
            .collect();
        CompiledSlot {
            slot: 1,
            bins,
            total,
        }
    }

    #[test]
    fn inert_slot_yields_nothing() {
        let mut rng = RngState::from_seed(1);
        assert_eq!(choose_rarity(&CompiledSlot::default(), &mut rng), None);
    }

    #[test]
    fn roll_past_every_ceiling_falls_back_to_last_bin() {
        // Ceilings that undershoot the total model accumulated rounding error.
        let slot = CompiledSlot {
            slot: 1,
            bins: vec![
                WeightedBin {
                    rarity: "Common".to_string(),
                    ceiling: 0.0,
                },
                WeightedBin {
                    rarity: "Rare".to_string(),
                    ceiling: 0.0,
                },
            ],
            total: 1.0,
        };
        let mut rng = RngState::from_seed(2);
        for _ in 0..32 {
            assert_eq!(choose_rarity(&slot, &mut rng), Some("Rare"));
        }
    }

    #[test]
    fn single_bin_always_wins() {
        let slot = slot(&[("Uncommon", 3.5)]);
        let mut rng = RngState::from_seed(3);
        for _ in 0..100 {
            assert_eq!(choose_rarity(&slot, &mut rng), Some("Uncommon"));
        }
    }

    #[test]
    fn card_choice_covers_whole_group() {
        let cards: Vec<Card> = (1..=4)
            .map(|idx| Card::new(format!("c{idx}"), idx.to_string(), "Common"))
            .collect();
        let mut rng = RngState::from_seed(4);
        let mut seen = [0usize; 4];
        for _ in 0..4000 {
            let card = choose_card(&cards, &mut rng).expect("card");
            let idx = cards.iter().position(|c| c.id == card.id).expect("pos");
            seen[idx] += 1;
        }
        for count in seen {
            assert!((800..1200).contains(&count), "count {count}");
        }
        assert!(choose_card(&[], &mut rng).is_none());
    }
}

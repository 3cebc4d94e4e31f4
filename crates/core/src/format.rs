use crate::{build_descriptor, natural_cmp, Card, DrawResult, Pack};
use std::cmp::Ordering;

pub const RESULT_END_MARKER: &str = "\n\n===\n";

/// One simulated pack ready for rendering.
#[derive(Debug, Clone)]
pub struct PackResult {
    pub pack: Pack,
    pub quantity: u32,
    pub draw: DrawResult,
}

pub fn card_order(a: &Card, b: &Card) -> Ordering {
    natural_cmp(&a.number, &b.number).then_with(|| a.id.cmp(&b.id))
}

pub fn format_header(pack: &Pack, quantity: u32) -> String {
    format!(
        "{} | {} | {} | opened {}",
        pack.name, pack.series, pack.release_date, quantity
    )
}

pub fn format_card_line(code: &str, card: &Card, count: u64) -> String {
    let descriptor = serde_json::to_string(&build_descriptor(card))
        .unwrap_or_else(|_| "{}".to_string());
    if card.number.is_empty() {
        format!("{count} {code} # {descriptor}")
    } else {
        format!("{count} {code} {} # {descriptor}", card.number)
    }
}

pub fn format_pack(result: &PackResult) -> String {
    let mut cards: Vec<&Card> = result.draw.cards.values().collect();
    cards.sort_by(|a, b| card_order(a, b));
    let mut lines = Vec::with_capacity(cards.len() + 1);
    lines.push(format_header(&result.pack, result.quantity));
    for card in cards {
        lines.push(format_card_line(
            &result.pack.code,
            card,
            result.draw.count(&card.id),
        ));
    }
    lines.join("\n")
}

pub fn format_report(results: &[PackResult]) -> String {
    results
        .iter()
        .map(format_pack)
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

pub fn with_result_end_marker(text: &str) -> String {
    if text.ends_with(RESULT_END_MARKER) {
        text.to_string()
    } else {
        format!("{text}{RESULT_END_MARKER}")
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw metadata carried through to the report descriptor. Values keep whatever
/// shape the catalog handed over.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardMetadata {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub supertype: Option<Value>,
    #[serde(default)]
    pub subtypes: Option<Value>,
    #[serde(default)]
    pub hp: Option<Value>,
    #[serde(default)]
    pub types: Option<Value>,
    #[serde(default)]
    pub evolves_from: Option<Value>,
    #[serde(default)]
    pub evolves_to: Option<Value>,
    #[serde(default)]
    pub rules: Option<Value>,
    #[serde(default)]
    pub abilities: Option<Value>,
    #[serde(default)]
    pub attacks: Option<Value>,
    #[serde(default)]
    pub weaknesses: Option<Value>,
    #[serde(default)]
    pub resistances: Option<Value>,
}

impl CardMetadata {
    pub const FIELDS: [&'static str; 12] = [
        "name",
        "supertype",
        "subtypes",
        "hp",
        "types",
        "evolvesFrom",
        "evolvesTo",
        "rules",
        "abilities",
        "attacks",
        "weaknesses",
        "resistances",
    ];

    /// Fields in descriptor order, paired with their wire names.
    pub fn fields(&self) -> [(&'static str, Option<&Value>); 12] {
        [
            (Self::FIELDS[0], self.name.as_ref()),
            (Self::FIELDS[1], self.supertype.as_ref()),
            (Self::FIELDS[2], self.subtypes.as_ref()),
            (Self::FIELDS[3], self.hp.as_ref()),
            (Self::FIELDS[4], self.types.as_ref()),
            (Self::FIELDS[5], self.evolves_from.as_ref()),
            (Self::FIELDS[6], self.evolves_to.as_ref()),
            (Self::FIELDS[7], self.rules.as_ref()),
            (Self::FIELDS[8], self.abilities.as_ref()),
            (Self::FIELDS[9], self.attacks.as_ref()),
            (Self::FIELDS[10], self.weaknesses.as_ref()),
            (Self::FIELDS[11], self.resistances.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: String,
    #[serde(default, deserialize_with = "printed_number")]
    pub number: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(flatten)]
    pub metadata: CardMetadata,
}

impl Card {
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
        rarity: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            rarity: Some(rarity.into()),
            metadata: CardMetadata::default(),
        }
    }
}

fn printed_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => value,
        Some(Value::Number(value)) => value.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pack {
    /// Catalog handle (set id). Not part of the pack's identity.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "packName", default)]
    pub name: String,
    #[serde(rename = "packSeries", default)]
    pub series: String,
    #[serde(rename = "packCode", default)]
    pub code: String,
    #[serde(rename = "releaseDate", default)]
    pub release_date: String,
    #[serde(rename = "cardCount", default)]
    pub card_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackKey {
    pub name: String,
    pub series: String,
    pub release_date: String,
    pub code: String,
}

impl std::fmt::Display for PackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.name, self.series, self.code, self.release_date
        )
    }
}

impl Pack {
    pub fn key(&self) -> PackKey {
        PackKey {
            name: self.name.clone(),
            series: self.series.clone(),
            release_date: self.release_date.clone(),
            code: self.code.clone(),
        }
    }

    /// Case-insensitive substring match over the listing columns.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.name, &self.series, &self.code, &self.release_date]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

pub fn filter_packs<'a>(packs: &'a [Pack], query: &str) -> Vec<&'a Pack> {
    packs.iter().filter(|pack| pack.matches(query)).collect()
}

/// Cards of one pack grouped by rarity. Every stored group is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RarityGroups {
    groups: BTreeMap<String, Vec<Card>>,
}

impl RarityGroups {
    /// Cards without a rarity cannot be drawn and are left out.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut groups: BTreeMap<String, Vec<Card>> = BTreeMap::new();
        for card in cards {
            let Some(rarity) = card.rarity.clone() else {
                continue;
            };
            if rarity.trim().is_empty() {
                continue;
            }
            groups.entry(rarity).or_default().push(card);
        }
        Self { groups }
    }

    pub fn get(&self, rarity: &str) -> Option<&[Card]> {
        self.groups
            .get(rarity)
            .map(Vec::as_slice)
            .filter(|cards| !cards.is_empty())
    }

    pub fn rarities(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn card_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pack() -> Pack {
        Pack {
            id: "base1".to_string(),
            name: "Base".to_string(),
            series: "Base".to_string(),
            code: "BS".to_string(),
            release_date: "1999-01-09".to_string(),
            card_count: 102,
        }
    }

    #[test]
    fn groups_skip_cards_without_rarity() {
        let mut loose = Card::new("x", "1", "Common");
        loose.rarity = None;
        let groups = RarityGroups::from_cards(vec![
            Card::new("a", "1", "Common"),
            loose,
            Card::new("b", "2", "Rare"),
            Card::new("c", "3", "Common"),
        ]);
        assert_eq!(groups.card_count(), 3);
        let commons: Vec<_> = groups
            .get("Common")
            .expect("commons")
            .iter()
            .map(|card| card.id.as_str())
            .collect();
        assert_eq!(commons, vec!["a", "c"]);
        assert!(groups.get("Uncommon").is_none());
    }

    #[test]
    fn pack_search_is_case_insensitive() {
        let pack = pack();
        assert!(pack.matches("  bs "));
        assert!(pack.matches("1999"));
        assert!(pack.matches(""));
        assert!(!pack.matches("jungle"));
    }

    #[test]
    fn card_parses_numeric_printed_number() {
        let card: Card = serde_json::from_value(json!({
            "id": "base1-4",
            "number": 4,
            "rarity": "Rare Holo",
            "name": "Charizard",
            "evolvesFrom": "Charmeleon"
        }))
        .expect("card");
        assert_eq!(card.number, "4");
        assert_eq!(card.metadata.evolves_from, Some(json!("Charmeleon")));
    }

    #[test]
    fn pack_key_ignores_catalog_id() {
        let mut other = pack();
        other.id = "different".to_string();
        assert_eq!(pack().key(), other.key());
    }
}

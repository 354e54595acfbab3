use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::card::{AbilityHint, Card, CardType, HintType, InkColor};
use crate::error::LoadError;

/// Raw card data in the LorcanaJSON layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "type")]
    card_type: Option<String>,
    #[serde(default)]
    cost: Option<u32>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    inkwell: Option<bool>,
    #[serde(default)]
    strength: Option<u32>,
    #[serde(default)]
    willpower: Option<u32>,
    #[serde(default)]
    lore: Option<u32>,
    #[serde(default)]
    move_cost: Option<u32>,
    #[serde(default)]
    subtypes: Option<Vec<String>>,
    #[serde(default)]
    full_text_sections: Option<Vec<String>>,
    #[serde(default)]
    effects: Option<Vec<Value>>,
    #[serde(default)]
    full_text: Option<String>,
    #[serde(default)]
    abilities: Option<Vec<RawAbility>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAbility {
    #[serde(default, rename = "type")]
    ability_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default)]
    keyword_value: Option<String>,
    #[serde(default)]
    keyword_value_number: Option<i32>,
    #[serde(default)]
    reminder_text: Option<String>,
    #[serde(default)]
    effect: Option<String>,
    #[serde(default)]
    costs: Option<Vec<String>>,
    #[serde(default)]
    costs_text: Option<String>,
    #[serde(default)]
    full_text: Option<String>,
}

fn parse_ink_color(s: &str) -> Option<InkColor> {
    match s.trim().to_lowercase().as_str() {
        "amber" => Some(InkColor::Amber),
        "amethyst" => Some(InkColor::Amethyst),
        "emerald" => Some(InkColor::Emerald),
        "ruby" => Some(InkColor::Ruby),
        "sapphire" => Some(InkColor::Sapphire),
        "steel" => Some(InkColor::Steel),
        _ => None,
    }
}

fn parse_card_type(s: &str) -> CardType {
    match s.trim().to_lowercase().as_str() {
        "action" => CardType::Action,
        "item" => CardType::Item,
        "location" => CardType::Location,
        _ => CardType::Character,
    }
}

fn parse_hint_type(s: &str) -> Option<HintType> {
    match s.trim().to_lowercase().as_str() {
        "keyword" => Some(HintType::Keyword),
        "static" => Some(HintType::Static),
        "triggered" => Some(HintType::Triggered),
        "activated" => Some(HintType::Activated),
        _ => None,
    }
}

/// Ids arrive as numbers in some exports and as strings in others.
fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Action effects are either plain strings or objects carrying `fullText`/`effect`.
fn effect_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("fullText")
            .or_else(|| map.get("effect"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn convert_raw_ability(raw: RawAbility) -> AbilityHint {
    AbilityHint {
        hint_type: raw.ability_type.as_deref().and_then(parse_hint_type),
        name: raw.name.filter(|n| !n.trim().is_empty()),
        keyword: raw.keyword,
        keyword_value: raw.keyword_value,
        keyword_value_number: raw.keyword_value_number,
        reminder_text: raw.reminder_text,
        effect: raw.effect,
        costs: raw.costs.unwrap_or_default(),
        costs_text: raw.costs_text,
        full_text: raw.full_text.unwrap_or_default(),
    }
}

fn convert_raw_card(raw: RawCard) -> Card {
    Card {
        id: raw.id.as_ref().and_then(id_to_string).unwrap_or_default(),
        name: raw.name.unwrap_or_default(),
        version: raw.version,
        card_type: raw
            .card_type
            .as_deref()
            .map(parse_card_type)
            .unwrap_or(CardType::Character),
        cost: raw.cost.unwrap_or(0),
        color: raw.color.as_deref().and_then(parse_ink_color),
        inkwell: raw.inkwell.unwrap_or(false),
        strength: raw.strength,
        willpower: raw.willpower,
        lore: raw.lore,
        move_cost: raw.move_cost,
        subtypes: raw.subtypes.unwrap_or_default(),
        full_text_sections: raw.full_text_sections.unwrap_or_default(),
        effects: raw
            .effects
            .unwrap_or_default()
            .iter()
            .filter_map(effect_to_string)
            .collect(),
        full_text: raw.full_text,
        abilities: raw
            .abilities
            .unwrap_or_default()
            .into_iter()
            .map(convert_raw_ability)
            .collect(),
    }
}

/// Parse cards from a JSON string. Accepts either a bare array of cards or an
/// object with a `cards` array.
pub fn load_cards_from_str(data: &str) -> Result<Vec<Card>, LoadError> {
    let value: Value = serde_json::from_str(data)?;
    let cards = match value {
        Value::Object(mut map) => map.remove("cards").unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    let raw_cards: Vec<RawCard> = serde_json::from_value(cards)?;
    Ok(raw_cards.into_iter().map(convert_raw_card).collect())
}

/// Load all cards from a JSON file.
pub fn load_cards(path: &Path) -> Result<Vec<Card>, LoadError> {
    let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_cards_from_str(&data)
}

/// Load cards and build a lookup table.
pub fn load_card_database(path: &Path) -> Result<CardDatabase, LoadError> {
    let cards = load_cards(path)?;
    Ok(CardDatabase::new(cards))
}

/// A database of all cards, indexed for fast lookup.
pub struct CardDatabase {
    /// All cards, in order.
    pub cards: Vec<Card>,
    /// Index: full name -> list of card indices.
    pub by_name: HashMap<String, Vec<usize>>,
    /// Index: card id -> card index.
    pub by_id: HashMap<String, usize>,
}

impl CardDatabase {
    pub fn new(cards: Vec<Card>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for (i, card) in cards.iter().enumerate() {
            by_name.entry(card.full_name()).or_default().push(i);
            by_id.insert(card.id.clone(), i);
        }

        Self {
            cards,
            by_name,
            by_id,
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Card> {
        self.by_id.get(id).map(|&i| &self.cards[i])
    }

    /// Look up by [`Card::full_name`], "Name - Version" ("Ariel - On Human
    /// Legs"), or the bare name for cards printed without a version. The
    /// first card in load order wins when reprints share a full name.
    pub fn get_by_name(&self, name: &str) -> Option<&Card> {
        self.by_name
            .get(name)
            .and_then(|indices| indices.first())
            .map(|&i| &self.cards[i])
    }

    /// Cards with no rules text.
    pub fn vanilla_cards(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.is_vanilla()).collect()
    }
}

use serde::{Deserialize, Serialize};

/// Ink colours in Lorcana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkColor {
    Amber,
    Amethyst,
    Emerald,
    Ruby,
    Sapphire,
    Steel,
}

/// What type of card this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Character,
    Action,
    Item,
    Location,
}

/// How the upstream data source labelled an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintType {
    Keyword,
    Static,
    Triggered,
    Activated,
}

/// Pre-extracted ability metadata that some card sources ship next to the
/// raw text. Every populated field is authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityHint {
    /// Ability shape as labelled upstream.
    pub hint_type: Option<HintType>,
    /// Printed ability name ("LOYAL AND DEVOTED").
    pub name: Option<String>,
    /// Keyword name for keyword abilities ("Shift").
    pub keyword: Option<String>,
    /// Keyword value as printed ("+2", "5").
    pub keyword_value: Option<String>,
    /// Keyword value as a number.
    pub keyword_value_number: Option<i32>,
    /// Reminder text without the parentheses.
    pub reminder_text: Option<String>,
    /// Effect text without the name, costs or reminder text.
    pub effect: Option<String>,
    /// Individual cost tokens ("{E}", "1 {I}").
    pub costs: Vec<String>,
    /// Cost side as printed.
    pub costs_text: Option<String>,
    /// The full printed ability text.
    pub full_text: String,
}

/// A complete card record as delivered by the card-data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Unique identifier.
    pub id: String,
    /// Card name (e.g., "Ariel").
    pub name: String,
    /// Version subtitle (e.g., "On Human Legs").
    pub version: Option<String>,
    /// Type of card.
    pub card_type: CardType,
    /// Ink cost to play.
    pub cost: u32,
    /// Ink colour.
    pub color: Option<InkColor>,
    /// Whether the card can be put into the inkwell.
    pub inkwell: bool,

    // -- Character / location stats --
    pub strength: Option<u32>,
    pub willpower: Option<u32>,
    pub lore: Option<u32>,
    /// Move cost (locations only).
    pub move_cost: Option<u32>,
    /// Classifications ("Storyborn", "Hero", "Princess").
    pub subtypes: Vec<String>,

    // -- Rules text --
    /// Printed paragraphs of rules text, in print order.
    pub full_text_sections: Vec<String>,
    /// Effect paragraphs of action cards.
    pub effects: Vec<String>,
    /// Whole rules text when the source did not split it into sections.
    pub full_text: Option<String>,
    /// Structured hints, one per ability, in print order.
    pub abilities: Vec<AbilityHint>,
}

impl Card {
    /// "Name - Version", or just the name for cards without a version.
    pub fn full_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{} - {}", self.name, version),
            None => self.name.clone(),
        }
    }

    pub fn is_song(&self) -> bool {
        self.card_type == CardType::Action && self.subtypes.iter().any(|s| s == "Song")
    }

    /// A vanilla card has no rules text at all.
    pub fn is_vanilla(&self) -> bool {
        self.abilities.is_empty()
            && self.full_text_sections.iter().all(|s| s.trim().is_empty())
            && self.effects.iter().all(|s| s.trim().is_empty())
            && self.full_text.as_deref().map_or(true, |t| t.trim().is_empty())
    }
}

use std::collections::HashMap;

use tracing::warn;

use super::ability::AbilityDefinition;
use super::mechanics::EffectStep;
use crate::data::card::Card;
use crate::error::CardError;
use crate::parser::{self, Diagnostic, ParseOptions};

/// Registry mapping card ids to their compiled abilities.
pub struct AbilityRegistry {
    options: ParseOptions,
    /// Card ID -> abilities in print order.
    abilities: HashMap<String, Vec<AbilityDefinition>>,
    /// Per-ability problems across all registered cards.
    diagnostics: Vec<Diagnostic>,
    /// Cards refused as a whole.
    rejected: Vec<CardError>,
}

impl Default for AbilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        AbilityRegistry {
            options,
            abilities: HashMap::new(),
            diagnostics: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Get the abilities of a card. Unknown and vanilla cards have none.
    pub fn get_abilities(&self, card_id: &str) -> &[AbilityDefinition] {
        self.abilities
            .get(card_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Find one ability by its id.
    pub fn get_ability(&self, ability_id: &str) -> Option<&AbilityDefinition> {
        self.abilities
            .values()
            .flat_map(|abilities| abilities.iter())
            .find(|a| a.id == ability_id)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn rejected(&self) -> &[CardError] {
        &self.rejected
    }

    /// Ids of every registered card, sorted.
    pub fn card_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.abilities.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Auto-parse a bare effect clause into steps.
    pub fn parse_effect_text(text: &str) -> Vec<EffectStep> {
        parser::parse_effect_text(text)
    }

    /// Compile abilities for all cards. A rejected card is recorded and
    /// skipped; it never stops the batch.
    pub fn register_cards(&mut self, cards: &[Card]) {
        for card in cards {
            if let Err(err) = self.register_card(card) {
                warn!(card_id = card.id.as_str(), error = %err, "card rejected");
                self.rejected.push(err);
            }
        }
    }

    /// Compile and store one card, replacing any earlier entry.
    pub fn register_card(&mut self, card: &Card) -> Result<&[AbilityDefinition], CardError> {
        let parse = parser::parse_card_with(card, &self.options)?;
        self.diagnostics.retain(|d| d.card_id != card.id);
        self.diagnostics.extend(parse.diagnostics);
        let entry = self.abilities.entry(card.id.clone()).or_default();
        *entry = parse.abilities;
        Ok(entry.as_slice())
    }
}

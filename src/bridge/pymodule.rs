use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::Path;

use crate::data::card::CardType;
use crate::data::loader::{load_card_database, CardDatabase};
use crate::effects::registry::AbilityRegistry;
use crate::parser::{self, ParseOptions};

/// Python-facing parser over a loaded card database.
#[pyclass]
pub struct PyAbilityParser {
    db: CardDatabase,
    registry: AbilityRegistry,
    options: ParseOptions,
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn parse_card_type(name: &str) -> PyResult<CardType> {
    match name.to_lowercase().as_str() {
        "character" => Ok(CardType::Character),
        "action" => Ok(CardType::Action),
        "item" => Ok(CardType::Item),
        "location" => Ok(CardType::Location),
        other => Err(PyValueError::new_err(format!("Unknown card type: {}", other))),
    }
}

#[pymethods]
impl PyAbilityParser {
    /// Load the card database from a JSON file and compile every card.
    /// Strict mode follows `LORCANA_PARSER_STRICT` unless given explicitly.
    #[new]
    #[pyo3(signature = (cards_json_path, strict=None))]
    fn new(cards_json_path: &str, strict: Option<bool>) -> PyResult<Self> {
        let db = load_card_database(Path::new(cards_json_path))
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let mut options = ParseOptions::from_env();
        if let Some(strict) = strict {
            options.strict = strict;
        }
        let mut registry = AbilityRegistry::with_options(options.clone());
        registry.register_cards(&db.cards);
        Ok(PyAbilityParser {
            db,
            registry,
            options,
        })
    }

    /// Abilities of one card as a JSON array.
    fn abilities_json(&self, card_id: &str) -> PyResult<String> {
        if self.db.get_by_id(card_id).is_none() {
            return Err(PyValueError::new_err(format!("Unknown card id: {}", card_id)));
        }
        to_json(&self.registry.get_abilities(card_id))
    }

    /// Abilities of a card looked up by "Name - Version".
    fn abilities_by_name_json(&self, full_name: &str) -> PyResult<String> {
        let card = self
            .db
            .get_by_name(full_name)
            .ok_or_else(|| PyValueError::new_err(format!("Unknown card: {}", full_name)))?;
        to_json(&self.registry.get_abilities(&card.id))
    }

    /// Parse loose ability text, one ability per line. Returns
    /// `{"abilities": [...], "diagnostics": [...]}` as JSON.
    #[pyo3(signature = (text, card_type="character", card_id="adhoc"))]
    fn parse_text(&self, text: &str, card_type: &str, card_id: &str) -> PyResult<String> {
        let card_type = parse_card_type(card_type)?;
        to_json(&parser::parse_text(card_id, text, card_type, &self.options))
    }

    /// Decompose a bare effect clause into steps, as JSON.
    #[staticmethod]
    fn parse_effect(text: &str) -> PyResult<String> {
        to_json(&parser::parse_effect_text(text))
    }

    fn card_ids(&self) -> Vec<String> {
        self.registry.card_ids().into_iter().map(String::from).collect()
    }

    fn diagnostics_json(&self) -> PyResult<String> {
        to_json(&self.registry.diagnostics())
    }

    /// Messages for cards rejected as a whole.
    fn rejected(&self) -> Vec<String> {
        self.registry.rejected().iter().map(|e| e.to_string()).collect()
    }

    fn num_cards(&self) -> usize {
        self.db.cards.len()
    }
}

/// Register the PyO3 module.
#[pymodule]
pub fn lorcana_ability_parser(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyAbilityParser>()?;
    m.add("STRICT_ENV", parser::STRICT_ENV)?;
    Ok(())
}

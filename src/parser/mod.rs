pub mod assemble;
pub mod classify;
pub mod condition;
pub mod cost;
pub mod effect;
pub mod keyword;
pub mod segment;
pub mod target;
pub mod text;
pub mod trigger;

use serde::{Deserialize, Serialize};

use crate::data::card::{Card, CardType};
use crate::effects::ability::{
    AbilityDefinition, AbilityType, CostClause, TriggerDescriptor, TriggerEvent,
};
use crate::effects::mechanics::{EffectStep, Keyword, ObjectKind, TargetSelector};
use crate::error::CardError;
use classify::{classify, Shape};
use segment::{segment_card, Segment};

/// Environment variable that turns on strict mode.
pub const STRICT_ENV: &str = "LORCANA_PARSER_STRICT";

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Prefer upstream ability hints over re-deriving from text.
    pub use_hints: bool,
    /// No opaque fallback: unknown clauses produce no step.
    pub strict: bool,
    /// "When X and whenever Y" yields one ability per trigger.
    pub split_compound_triggers: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            use_hints: true,
            strict: false,
            split_compound_triggers: true,
        }
    }
}

impl ParseOptions {
    /// Defaults, with `strict` taken from `LORCANA_PARSER_STRICT`.
    pub fn from_env() -> Self {
        ParseOptions {
            strict: text::env_flag(STRICT_ENV),
            ..ParseOptions::default()
        }
    }
}

/// Per-card state shared by every stage.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// What "this" refers to on the card being parsed.
    pub card_kind: ObjectKind,
    pub options: ParseOptions,
}

impl ParseContext {
    pub fn new(card_kind: ObjectKind, options: ParseOptions) -> Self {
        ParseContext { card_kind, options }
    }
}

/// Object kind a card's self-references point at.
pub fn card_kind(card_type: CardType) -> ObjectKind {
    match card_type {
        CardType::Character => ObjectKind::Character,
        CardType::Action => ObjectKind::Action,
        CardType::Item => ObjectKind::Item,
        CardType::Location => ObjectKind::Location,
    }
}

/// An ability before it has an id and a card reference.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityUnit {
    pub ability_type: AbilityType,
    pub name: Option<String>,
    pub keyword: Option<Keyword>,
    pub raw_text: String,
    pub costs: Vec<CostClause>,
    pub trigger: Option<TriggerDescriptor>,
    pub effects: Vec<EffectStep>,
}

impl AbilityUnit {
    pub fn keyword(
        ability_type: AbilityType,
        keyword: Keyword,
        raw_text: &str,
        trigger: Option<TriggerDescriptor>,
        effects: Vec<EffectStep>,
    ) -> Self {
        AbilityUnit {
            ability_type,
            name: None,
            keyword: Some(keyword),
            raw_text: raw_text.to_string(),
            costs: Vec::new(),
            trigger,
            effects,
        }
    }

    fn plain(ability_type: AbilityType, name: Option<String>, raw_text: &str) -> Self {
        AbilityUnit {
            ability_type,
            name,
            keyword: None,
            raw_text: raw_text.to_string(),
            costs: Vec::new(),
            trigger: None,
            effects: Vec::new(),
        }
    }
}

/// Why a segment needs offline review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No effect step survived; the ability was dropped.
    NoEffects,
    /// Emitted, but at least one step is raw text.
    OpaqueFallback,
}

/// A per-ability problem. Never fatal for the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub card_id: String,
    pub segment_index: usize,
    pub raw_text: String,
    pub kind: DiagnosticKind,
}

/// Abilities of one card plus whatever needs review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardParse {
    pub abilities: Vec<AbilityDefinition>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a card with default options.
pub fn parse_card(card: &Card) -> Result<Vec<AbilityDefinition>, CardError> {
    parse_card_with(card, &ParseOptions::default()).map(|parse| parse.abilities)
}

/// Parse a card, returning abilities and diagnostics. Fails only when the
/// record itself is unusable.
///
/// Each segment is classified (keyword, activated, triggered, static), its
/// costs and triggers are extracted, its effect text is decomposed, and the
/// results are assembled with stable ids.
pub fn parse_card_with(card: &Card, options: &ParseOptions) -> Result<CardParse, CardError> {
    validate(card)?;
    let ctx = ParseContext::new(card_kind(card.card_type), options.clone());
    let segments = segment_card(card, options);
    Ok(compile_segments(&card.id, &segments, &ctx))
}

/// Parse loose ability text as if it were printed on a card of `card_type`.
/// Each line is one segment.
pub fn parse_text(card_id: &str, text: &str, card_type: CardType, options: &ParseOptions) -> CardParse {
    let ctx = ParseContext::new(card_kind(card_type), options.clone());
    let segments: Vec<Segment> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| Segment {
            index,
            raw: line.to_string(),
            text: text::normalize(line),
            hint: None,
        })
        .collect();
    compile_segments(card_id, &segments, &ctx)
}

/// Decompose a bare effect clause, e.g. for tooling and tests.
pub fn parse_effect_text(text: &str) -> Vec<EffectStep> {
    let ctx = ParseContext::new(ObjectKind::Character, ParseOptions::default());
    effect::decompose(&text::normalize(text), &ctx)
}

fn validate(card: &Card) -> Result<(), CardError> {
    if card.id.trim().is_empty() {
        return Err(CardError::MissingId {
            name: card.name.clone(),
        });
    }
    if card.name.trim().is_empty() {
        return Err(CardError::MissingName {
            id: card.id.clone(),
        });
    }
    Ok(())
}

fn compile_segments(card_id: &str, segments: &[Segment], ctx: &ParseContext) -> CardParse {
    let units = segments
        .iter()
        .map(|segment| (segment.index, compile_segment(segment, ctx)))
        .collect();
    assemble::assemble(card_id, units)
}

/// Turn one segment into zero or more ability units.
fn compile_segment(segment: &Segment, ctx: &ParseContext) -> Vec<AbilityUnit> {
    let classified = classify(segment, ctx);
    let raw_text = segment.raw.as_str();
    let name = classified.name;

    match classified.shape {
        Shape::Keyword(matches) => matches
            .iter()
            .map(|m| {
                let mut unit = keyword::compile(m, raw_text, ctx);
                unit.name = name.clone();
                unit
            })
            .collect(),
        Shape::Activated { costs, effect_text } => {
            let mut unit = AbilityUnit::plain(AbilityType::Activated, name, raw_text);
            unit.costs = costs;
            unit.effects = effects_or_fallback(&effect_text, &classified.body, ctx);
            vec![unit]
        }
        Shape::Triggered {
            trigger: Some(parse),
            effect_text,
        } => {
            let mut effects = effects_or_fallback(&effect_text, &classified.body, ctx);
            if let Some(condition) = &parse.effect_condition {
                for step in effects.iter_mut().filter(|s| s.condition.is_none()) {
                    step.condition = Some(condition.clone());
                }
            }
            // Compound triggers share one effect list.
            parse
                .triggers
                .into_iter()
                .map(|trigger| {
                    let mut unit = AbilityUnit::plain(AbilityType::Triggered, name.clone(), raw_text);
                    unit.trigger = Some(trigger);
                    unit.effects = effects.clone();
                    unit
                })
                .collect()
        }
        Shape::Triggered {
            trigger: None,
            effect_text,
        } => {
            let mut unit = AbilityUnit::plain(AbilityType::Triggered, name, raw_text);
            unit.trigger = Some(TriggerDescriptor {
                event: TriggerEvent::Other {
                    text: classified.body.clone(),
                },
                subject: TargetSelector::this(ctx.card_kind),
                guard: None,
                once_per_turn: false,
            });
            unit.effects = effects_or_fallback(&effect_text, &classified.body, ctx);
            vec![unit]
        }
        Shape::Static { effect_text } => {
            let mut unit = AbilityUnit::plain(AbilityType::Static, name, raw_text);
            unit.effects = effects_or_fallback(&effect_text, &classified.body, ctx);
            vec![unit]
        }
    }
}

/// Decompose the effect text; outside strict mode an empty result becomes a
/// single opaque step holding the clause.
fn effects_or_fallback(effect_text: &str, body: &str, ctx: &ParseContext) -> Vec<EffectStep> {
    let steps = effect::decompose(effect_text, ctx);
    if !steps.is_empty() || ctx.options.strict {
        return steps;
    }
    let clause = if effect_text.trim().is_empty() {
        body
    } else {
        effect_text
    };
    if clause.trim().is_empty() {
        return steps;
    }
    vec![EffectStep::opaque(clause.trim())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_and_partial_config() {
        let options = ParseOptions::default();
        assert!(options.use_hints);
        assert!(!options.strict);
        assert!(options.split_compound_triggers);

        let options: ParseOptions = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert!(options.strict);
        assert!(options.use_hints);
    }

    #[test]
    fn loose_text_is_one_segment_per_line() {
        let parse = parse_text(
            "test",
            "Evasive\nWhen you play this character, draw a card.",
            CardType::Character,
            &ParseOptions::default(),
        );
        assert_eq!(parse.abilities.len(), 2);
        assert_eq!(parse.abilities[0].id, "test-0");
        assert_eq!(parse.abilities[1].ability_type, AbilityType::Triggered);
    }
}

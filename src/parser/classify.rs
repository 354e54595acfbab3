use super::cost::{parse_cost_list, parse_costs, split_activated};
use super::keyword::{self, KeywordMatch};
use super::segment::Segment;
use super::text::{normalize, strip_name_label, strip_reminder};
use super::trigger::{self, TriggerParse};
use super::ParseContext;
use crate::data::card::HintType;
use crate::effects::ability::CostClause;

/// What a segment turned out to be.
#[derive(Debug, Clone)]
pub enum Shape {
    Keyword(Vec<KeywordMatch>),
    Activated {
        costs: Vec<CostClause>,
        effect_text: String,
    },
    /// `None` when a hint says "triggered" but no trigger phrase is found.
    Triggered {
        trigger: Option<TriggerParse>,
        effect_text: String,
    },
    Static {
        effect_text: String,
    },
}

/// A classified segment.
#[derive(Debug, Clone)]
pub struct Classified {
    /// Printed ability name, if any.
    pub name: Option<String>,
    /// Segment text with reminder text and name removed.
    pub body: String,
    pub shape: Shape,
}

pub fn classify(segment: &Segment, ctx: &ParseContext) -> Classified {
    if let Some(classified) = classify_from_hint(segment, ctx) {
        return classified;
    }

    if let Some(matches) = keyword::recognize(&segment.text) {
        return Classified {
            name: None,
            body: strip_reminder(&segment.text).0,
            shape: Shape::Keyword(matches),
        };
    }

    let (body, _) = strip_reminder(&segment.text);
    let (name, body) = strip_name_label(&body);
    let shape = shape_of(&body, ctx);
    Classified { name, body, shape }
}

/// Classify from raw text with the name label already removed.
fn shape_of(body: &str, ctx: &ParseContext) -> Shape {
    if let Some((cost_text, effect_text)) = split_activated(body, ctx.card_kind) {
        return Shape::Activated {
            costs: parse_costs(&cost_text, ctx.card_kind),
            effect_text,
        };
    }
    if let Some(parse) = trigger::extract(body, ctx) {
        let effect_text = parse.effect_text.clone();
        return Shape::Triggered {
            trigger: Some(parse),
            effect_text,
        };
    }
    Shape::Static {
        effect_text: body.to_string(),
    }
}

/// Use the segment's hint where it is authoritative. Returns `None` when
/// the hint does not settle the shape.
fn classify_from_hint(segment: &Segment, ctx: &ParseContext) -> Option<Classified> {
    let hint = segment.hint?;
    let printed = keyword::recognize(&segment.text);

    if let Some(mut m) = keyword::from_hint(hint) {
        // A hint without a value takes the printed one.
        if m.value.is_none() {
            if let Some(text_match) = printed.iter().flatten().find(|p| p.keyword == m.keyword) {
                m.value = text_match.value;
                m.value_text = m.value_text.or_else(|| text_match.value_text.clone());
            }
        }
        return Some(Classified {
            name: hint.name.clone(),
            body: strip_reminder(&segment.text).0,
            shape: Shape::Keyword(vec![m]),
        });
    }

    // Keyword lines keep priority even when the hint does not name them.
    if let Some(matches) = printed {
        return Some(Classified {
            name: hint.name.clone(),
            body: strip_reminder(&segment.text).0,
            shape: Shape::Keyword(matches),
        });
    }

    let effect = hint.effect.as_deref().map(normalize);
    let name = hint.name.clone();

    // The printed text minus the hinted name.
    let body = {
        let (body, _) = strip_reminder(&segment.text);
        match &name {
            Some(n) => body
                .strip_prefix(n.as_str())
                .map(|rest| rest.trim().to_string())
                .unwrap_or(body),
            None => strip_name_label(&body).1,
        }
    };

    let shape = match (hint.hint_type, effect) {
        (Some(HintType::Activated), Some(effect_text)) if !hint.costs.is_empty() => {
            Shape::Activated {
                costs: parse_cost_list(
                    &hint.costs.iter().map(|c| normalize(c)).collect::<Vec<_>>(),
                    ctx.card_kind,
                ),
                effect_text,
            }
        }
        (Some(HintType::Activated), Some(effect_text)) => match &hint.costs_text {
            Some(costs_text) => Shape::Activated {
                costs: parse_costs(&normalize(costs_text), ctx.card_kind),
                effect_text,
            },
            None => shape_of(&body, ctx),
        },
        (Some(HintType::Triggered), Some(effect_text)) => match trigger::extract(&effect_text, ctx) {
            Some(parse) => {
                let effect_text = parse.effect_text.clone();
                Shape::Triggered {
                    trigger: Some(parse),
                    effect_text,
                }
            }
            None => match trigger::extract(&body, ctx) {
                Some(parse) => {
                    let effect_text = parse.effect_text.clone();
                    Shape::Triggered {
                        trigger: Some(parse),
                        effect_text,
                    }
                }
                None => Shape::Triggered {
                    trigger: None,
                    effect_text,
                },
            },
        },
        (Some(HintType::Static), Some(effect_text)) => Shape::Static { effect_text },
        _ => shape_of(&body, ctx),
    };

    Some(Classified { name, body, shape })
}

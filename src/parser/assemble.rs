use tracing::{debug, warn};

use super::{AbilityUnit, CardParse, Diagnostic, DiagnosticKind};
use crate::effects::ability::AbilityDefinition;

/// Id of the `n`th (0-based) unit of a segment. Segments that produce a
/// single unit use the bare segment index.
pub fn ability_id(card_id: &str, segment_index: usize, n: usize, units_in_segment: usize) -> String {
    if units_in_segment > 1 {
        format!("{card_id}-{segment_index}-{}", n + 1)
    } else {
        format!("{card_id}-{segment_index}")
    }
}

/// Emit the final ability list for one card. Units without effects are
/// dropped with a [`DiagnosticKind::NoEffects`] record.
pub fn assemble(card_id: &str, segments: Vec<(usize, Vec<AbilityUnit>)>) -> CardParse {
    let mut parse = CardParse::default();

    for (segment_index, units) in segments {
        let count = units.len();
        let mut flagged = false;

        for (n, unit) in units.into_iter().enumerate() {
            if unit.effects.is_empty() {
                warn!(card_id, segment_index, raw_text = unit.raw_text.as_str(), "ability dropped: no effects");
                parse.diagnostics.push(Diagnostic {
                    card_id: card_id.to_string(),
                    segment_index,
                    raw_text: unit.raw_text,
                    kind: DiagnosticKind::NoEffects,
                });
                continue;
            }

            let ability = AbilityDefinition {
                id: ability_id(card_id, segment_index, n, count),
                card_id: card_id.to_string(),
                ability_type: unit.ability_type,
                name: unit.name,
                keyword: unit.keyword,
                raw_text: unit.raw_text,
                costs: unit.costs,
                trigger: unit.trigger,
                effects: unit.effects,
            };

            // One review record per segment is enough.
            if ability.is_low_confidence() && !flagged {
                flagged = true;
                debug!(card_id, segment_index, "ability kept with opaque fallback");
                parse.diagnostics.push(Diagnostic {
                    card_id: card_id.to_string(),
                    segment_index,
                    raw_text: ability.raw_text.clone(),
                    kind: DiagnosticKind::OpaqueFallback,
                });
            }
            parse.abilities.push(ability);
        }
    }

    parse
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ability::AbilityType;
    use crate::effects::mechanics::{EffectKind, EffectStep, ObjectKind, TargetSelector};

    fn unit(effects: Vec<EffectStep>) -> AbilityUnit {
        AbilityUnit {
            ability_type: AbilityType::Static,
            name: None,
            keyword: None,
            raw_text: "text".to_string(),
            costs: Vec::new(),
            trigger: None,
            effects,
        }
    }

    fn banish() -> EffectStep {
        EffectStep::new(EffectKind::Banish, TargetSelector::chosen(ObjectKind::Character))
    }

    #[test]
    fn ids_are_per_segment() {
        let parse = assemble(
            "c1",
            vec![
                (0, vec![unit(vec![banish()])]),
                (1, vec![unit(vec![banish()]), unit(vec![banish()])]),
            ],
        );
        let ids: Vec<&str> = parse.abilities.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c1-0", "c1-1-1", "c1-1-2"]);
        assert!(parse.diagnostics.is_empty());
    }

    #[test]
    fn empty_units_are_dropped_with_diagnostic() {
        let parse = assemble("c1", vec![(0, vec![unit(Vec::new())]), (1, vec![unit(vec![banish()])])]);
        assert_eq!(parse.abilities.len(), 1);
        assert_eq!(parse.abilities[0].id, "c1-1");
        assert_eq!(parse.diagnostics.len(), 1);
        assert_eq!(parse.diagnostics[0].kind, DiagnosticKind::NoEffects);
        assert_eq!(parse.diagnostics[0].segment_index, 0);
    }

    #[test]
    fn opaque_abilities_are_flagged() {
        let parse = assemble("c1", vec![(0, vec![unit(vec![EffectStep::opaque("who knows")])])]);
        assert_eq!(parse.abilities.len(), 1);
        assert_eq!(parse.diagnostics[0].kind, DiagnosticKind::OpaqueFallback);
    }
}

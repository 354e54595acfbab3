use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

use super::condition::parse_condition;
use super::target::parse_target;
use super::ParseContext;
use crate::effects::ability::{ChallengeRole, TriggerDescriptor, TriggerEvent, TurnOwner};
use crate::effects::mechanics::{Condition, ObjectKind, Owner, Quantifier, TargetSelector};

/// Leading qualifiers that may precede the trigger word.
static PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(once per turn|once during your turn|during your turn|during an opponent's turn|during opponents' turns),\s*").unwrap()
});

static TRIGGER_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(whenever|when|at)\s+").unwrap());

static COMPOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i),?\s+(?:and|or)\s+(?:whenever|when)\s+").unwrap());

static LEADING_IF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^if ([^,]+),\s*(.+)$").unwrap());

static INNER_WHILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+?) while (.+)$").unwrap());

type EventBuilder = fn(&Captures, ObjectKind) -> (TriggerEvent, TargetSelector);

struct EventPattern {
    regex: Regex,
    build: EventBuilder,
}

fn pattern(re: &str, build: EventBuilder) -> EventPattern {
    EventPattern {
        regex: Regex::new(re).unwrap(),
        build,
    }
}

/// Trigger event table, first match wins.
static EVENT_PATTERNS: Lazy<Vec<EventPattern>> = Lazy::new(|| {
    vec![
        pattern(r"(?i)^you play (this (?:character|item|location|card))$", |c, k| {
            (TriggerEvent::Play, subject(&c[1], k))
        }),
        pattern(r"(?i)^you play (.+)$", |c, k| {
            (TriggerEvent::Play, subject(&c[1], k).with_owner(Owner::You))
        }),
        pattern(r"(?i)^(?:an |each )?opponents? plays? (.+)$", |c, k| {
            (TriggerEvent::Play, subject(&c[1], k).with_owner(Owner::Opponent))
        }),
        pattern(r"(?i)^(.+?) banish(?:es)? .+ in a challenge$", |c, k| {
            (TriggerEvent::BanishesInChallenge, subject(&c[1], k))
        }),
        pattern(r"(?i)^(.+?) (?:is|are) banished in a challenge$", |c, k| {
            (TriggerEvent::Banished { in_challenge: true }, subject(&c[1], k))
        }),
        pattern(r"(?i)^(.+?) (?:is|are) banished$", |c, k| {
            (TriggerEvent::Banished { in_challenge: false }, subject(&c[1], k))
        }),
        pattern(r"(?i)^(.+?) (?:is|are) challenged$", |c, k| {
            (
                TriggerEvent::Challenge {
                    role: ChallengeRole::Defender,
                },
                subject(&c[1], k),
            )
        }),
        pattern(r"(?i)^(.+?) challenges?(?: .+)?$", |c, k| {
            (
                TriggerEvent::Challenge {
                    role: ChallengeRole::Attacker,
                },
                subject(&c[1], k),
            )
        }),
        pattern(r"(?i)^(.+?) quests?$", |c, k| (TriggerEvent::Quest, subject(&c[1], k))),
        pattern(r"(?i)^you ready (.+)$", |c, k| (TriggerEvent::Ready, subject(&c[1], k))),
        pattern(r"(?i)^(.+?) (?:is|are|becomes?) readied$", |c, k| {
            (TriggerEvent::Ready, subject(&c[1], k))
        }),
        pattern(r"(?i)^(.+?) (?:is|are|becomes?) exerted$", |c, k| {
            (TriggerEvent::Exerted, subject(&c[1], k))
        }),
        pattern(r"(?i)^(.+?) sings? (?:a |another )?songs?$", |c, k| {
            (TriggerEvent::Sing, subject(&c[1], k))
        }),
        pattern(r"(?i)^you move (.+?) (?:here|to (?:a|this) location)$", |c, k| {
            (TriggerEvent::MoveToLocation, subject(&c[1], k))
        }),
        pattern(r"(?i)^(.+?) moves? to a location$", |c, k| {
            (TriggerEvent::MoveToLocation, subject(&c[1], k))
        }),
        pattern(r"(?i)^(.+?) (?:is|are) dealt damage$", |c, k| {
            (TriggerEvent::DealtDamage, subject(&c[1], k))
        }),
        pattern(r"(?i)^(you|an opponent|each opponent|a player) draws? (?:a |another )?cards?$", |c, k| {
            (TriggerEvent::DrawCard, subject(&c[1], k))
        }),
        pattern(r"(?i)^you put (.+?) into your inkwell$", |c, k| {
            (TriggerEvent::PutIntoInkwell, subject(&c[1], k))
        }),
        pattern(r"(?i)^(this card) is put into your inkwell$", |c, k| {
            (TriggerEvent::PutIntoInkwell, subject(&c[1], k))
        }),
        pattern(r"(?i)^(?:the )?(?:start|beginning) of (.+?) turns?$", |c, _| {
            (
                TriggerEvent::StartOfTurn {
                    whose: turn_owner(&c[1]),
                },
                turn_subject(&c[1]),
            )
        }),
        pattern(r"(?i)^(?:the )?end of (.+?) turns?$", |c, _| {
            (
                TriggerEvent::EndOfTurn {
                    whose: turn_owner(&c[1]),
                },
                turn_subject(&c[1]),
            )
        }),
    ]
});

/// Result of trigger extraction for one segment.
#[derive(Debug, Clone)]
pub struct TriggerParse {
    /// One descriptor per trigger event; compound triggers yield several.
    pub triggers: Vec<TriggerDescriptor>,
    /// Effect clause after the trigger.
    pub effect_text: String,
    /// Condition that could not become the guard because one was already set.
    pub effect_condition: Option<Condition>,
}

/// Whether the text begins like a triggered ability.
pub fn is_triggered(text: &str) -> bool {
    let rest = PREFIX
        .find(text)
        .map_or(text, |m| &text[m.end()..]);
    match TRIGGER_WORD.captures(rest) {
        Some(caps) if caps[1].eq_ignore_ascii_case("at") => {
            let after = rest[caps[0].len()..].to_lowercase();
            after.starts_with("the start of")
                || after.starts_with("the end of")
                || after.starts_with("the beginning of")
                || after.starts_with("start of")
                || after.starts_with("end of")
        }
        Some(_) => true,
        None => false,
    }
}

/// Extract the trigger(s) from a triggered ability. `None` if the text does
/// not start with a trigger phrase.
pub fn extract(text: &str, ctx: &ParseContext) -> Option<TriggerParse> {
    if !is_triggered(text) {
        return None;
    }

    let mut rest = text.trim();
    let mut guard: Option<Condition> = None;
    let mut once_per_turn = false;

    if let Some(caps) = PREFIX.captures(rest) {
        match caps[1].to_lowercase().as_str() {
            "once per turn" => once_per_turn = true,
            "once during your turn" => {
                once_per_turn = true;
                guard = Some(Condition::DuringYourTurn);
            }
            "during your turn" => guard = Some(Condition::DuringYourTurn),
            _ => guard = Some(Condition::DuringOpponentsTurn),
        }
        rest = &rest[caps[0].len()..];
    }

    let word = TRIGGER_WORD.find(rest)?;
    rest = &rest[word.end()..];

    // The trigger clause runs to the first comma.
    let (clause, effect) = match rest.split_once(',') {
        Some((clause, effect)) => (clause.trim(), effect.trim()),
        None => (rest.trim(), ""),
    };

    let mut effect_text = effect.to_string();
    let mut effect_condition = None;
    if let Some(caps) = LEADING_IF.captures(effect) {
        let condition = parse_condition(&caps[1]);
        if guard.is_none() {
            guard = Some(condition);
        } else {
            effect_condition = Some(condition);
        }
        effect_text = caps[2].to_string();
    }

    let parts: Vec<&str> = if ctx.options.split_compound_triggers {
        COMPOUND.split(clause).collect()
    } else {
        vec![clause]
    };

    let triggers = parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (part, inner_guard) = match INNER_WHILE.captures(part) {
                Some(caps) => (
                    caps.get(1).map_or(part, |m| m.as_str()),
                    Some(parse_condition(&caps[2])),
                ),
                None => (part, None),
            };
            let (event, subject) = parse_event(part, ctx.card_kind);
            TriggerDescriptor {
                event,
                subject,
                guard: guard.clone().or(inner_guard),
                once_per_turn,
            }
        })
        .collect();

    Some(TriggerParse {
        triggers,
        effect_text,
        effect_condition,
    })
}

/// Match a trigger clause (without its leading "when"/"whenever"/"at").
pub fn parse_event(clause: &str, card_kind: ObjectKind) -> (TriggerEvent, TargetSelector) {
    let clause = clause.trim().trim_end_matches(',');
    EVENT_PATTERNS
        .iter()
        .find_map(|p| p.regex.captures(clause).map(|caps| (p.build)(&caps, card_kind)))
        .unwrap_or_else(|| {
            (
                TriggerEvent::Other {
                    text: clause.to_string(),
                },
                TargetSelector::this(card_kind),
            )
        })
}

/// Trigger subjects: pronouns refer to the source, picks become "any one".
fn subject(text: &str, card_kind: ObjectKind) -> TargetSelector {
    let lower = text.trim().to_lowercase();
    match lower.as_str() {
        "she" | "he" | "it" | "they" | "this character" | "this item" | "this location"
        | "this card" => {
            let kind = match lower.as_str() {
                "this character" => ObjectKind::Character,
                "this item" => ObjectKind::Item,
                "this location" => ObjectKind::Location,
                _ => card_kind,
            };
            return TargetSelector::this(kind);
        }
        _ => {}
    }
    let mut selector = parse_target(text, card_kind, None);
    if matches!(selector.quantifier, Quantifier::Chosen(_)) {
        selector.quantifier = Quantifier::Each;
    }
    selector
}

fn turn_owner(whose: &str) -> TurnOwner {
    let whose = whose.to_lowercase();
    if whose == "your" {
        TurnOwner::You
    } else if whose.contains("opponent") {
        TurnOwner::Opponent
    } else {
        TurnOwner::Any
    }
}

fn turn_subject(whose: &str) -> TargetSelector {
    match turn_owner(whose) {
        TurnOwner::You => TargetSelector::you(),
        TurnOwner::Opponent => TargetSelector::each_opponent(),
        TurnOwner::Any => TargetSelector::player(Quantifier::Each, Owner::Any),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;

    fn ctx() -> ParseContext {
        ParseContext::new(ObjectKind::Character, ParseOptions::default())
    }

    #[test]
    fn play_trigger() {
        let parsed = extract("When you play this character, you may draw a card.", &ctx()).unwrap();
        assert_eq!(parsed.triggers.len(), 1);
        assert_eq!(parsed.triggers[0].event, TriggerEvent::Play);
        assert!(parsed.triggers[0].subject.is_this());
        assert_eq!(parsed.effect_text, "you may draw a card.");
    }

    #[test]
    fn compound_trigger_splits() {
        let parsed = extract(
            "When you play this character and whenever she quests, you may remove up to 2 damage from each of your characters.",
            &ctx(),
        )
        .unwrap();
        let events: Vec<_> = parsed.triggers.iter().map(|t| t.event.clone()).collect();
        assert_eq!(events, vec![TriggerEvent::Play, TriggerEvent::Quest]);
        assert!(parsed.triggers[1].subject.is_this());
    }

    #[test]
    fn guard_from_prefix_and_if() {
        let parsed = extract(
            "During your turn, whenever this character banishes another character in a challenge, gain 2 lore.",
            &ctx(),
        )
        .unwrap();
        assert_eq!(parsed.triggers[0].event, TriggerEvent::BanishesInChallenge);
        assert_eq!(parsed.triggers[0].guard, Some(Condition::DuringYourTurn));

        let parsed = extract(
            "At the start of your turn, if this character has no damage, gain 1 lore.",
            &ctx(),
        )
        .unwrap();
        assert_eq!(
            parsed.triggers[0].event,
            TriggerEvent::StartOfTurn {
                whose: TurnOwner::You
            }
        );
        assert_eq!(parsed.triggers[0].guard, Some(Condition::ThisHasNoDamage));
        assert_eq!(parsed.effect_text, "gain 1 lore.");
    }

    #[test]
    fn play_other_card_type() {
        let parsed = extract("Whenever you play a song, this character gets +1 {L} this turn.", &ctx()).unwrap();
        let trigger = &parsed.triggers[0];
        assert_eq!(trigger.event, TriggerEvent::Play);
        assert_eq!(trigger.subject.owner, Owner::You);
        assert_eq!(trigger.subject.traits, vec!["Song".to_string()]);
    }

    #[test]
    fn unknown_event_is_kept() {
        let parsed = extract("Whenever the moon is full, draw a card.", &ctx()).unwrap();
        assert!(matches!(parsed.triggers[0].event, TriggerEvent::Other { .. }));
    }

    #[test]
    fn non_triggers() {
        assert!(!is_triggered("At a location, this character gets +1 {S}."));
        assert!(!is_triggered("Your characters get +1 {S}."));
        assert!(is_triggered("Once per turn, when this character moves to a location, draw a card."));
    }
}

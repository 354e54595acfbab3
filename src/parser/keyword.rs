use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::text::{parse_signed, strip_reminder};
use super::{AbilityUnit, ParseContext};
use crate::data::card::AbilityHint;
use crate::effects::ability::{AbilityType, TriggerDescriptor, TriggerEvent};
use crate::effects::mechanics::{
    Amount, Duration, EffectKind, EffectStep, Keyword, ObjectKind, Stat, TargetSelector,
};

/// "Keyword [value] [{I}]", the whole body of a keyword line.
static KEYWORD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(alert|bodyguard|boost|challenger|evasive|reckless|resist|rush|shift|singer|sing together|support|vanish|ward)(?:\s+([+-]?\d+))?(?:\s*\{I\})?$",
    )
    .unwrap()
});

/// "Shift: Discard a song card" and similar non-ink shift costs.
static SHIFT_ALTERNATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^shift:?\s+(\D.*)$").unwrap());

/// A recognized keyword ability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub keyword: Keyword,
    /// Signed value ("+2" -> 2, "-1" -> -1).
    pub value: Option<i32>,
    /// Value as printed.
    pub value_text: Option<String>,
    pub reminder: Option<String>,
}

/// Match a whole segment. A comma-separated list of bare keywords yields one
/// match per keyword; anything else that is not a keyword line yields `None`.
pub fn recognize(text: &str) -> Option<Vec<KeywordMatch>> {
    let (body, reminders) = strip_reminder(text);
    let body = body.trim().trim_end_matches('.').trim();
    if body.is_empty() {
        return None;
    }

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let mut matches = Vec::with_capacity(parts.len());
    for part in &parts {
        matches.push(recognize_one(part)?);
    }

    if let Some(last) = matches.last_mut() {
        last.reminder = reminders.into_iter().next();
    }
    Some(matches)
}

fn recognize_one(part: &str) -> Option<KeywordMatch> {
    if let Some(caps) = KEYWORD_LINE.captures(part) {
        let keyword = Keyword::from_name(&caps[1])?;
        let value_text = caps.get(2).map(|m| m.as_str().to_string());
        if value_text.is_some() && !keyword.takes_value() {
            return None;
        }
        return Some(KeywordMatch {
            keyword,
            value: value_text.as_deref().and_then(parse_signed),
            value_text,
            reminder: None,
        });
    }

    SHIFT_ALTERNATIVE.captures(part).map(|caps| KeywordMatch {
        keyword: Keyword::Shift,
        value: None,
        value_text: Some(caps[1].trim().to_string()),
        reminder: None,
    })
}

/// Build a match from upstream metadata. Hint values win over printed text.
pub fn from_hint(hint: &AbilityHint) -> Option<KeywordMatch> {
    let keyword = Keyword::from_name(hint.keyword.as_deref()?)?;
    let value = hint
        .keyword_value_number
        .or_else(|| hint.keyword_value.as_deref().and_then(parse_signed));
    let value_text = hint
        .keyword_value
        .clone()
        .or_else(|| hint.keyword_value_number.map(|n| n.to_string()));
    Some(KeywordMatch {
        keyword,
        value,
        value_text,
        reminder: hint.reminder_text.clone(),
    })
}

/// Compile a keyword into its ability shape and effect.
pub fn compile(m: &KeywordMatch, raw_text: &str, ctx: &ParseContext) -> AbilityUnit {
    let this = TargetSelector::this(ctx.card_kind);

    match m.keyword {
        Keyword::Shift => {
            let mut step = EffectStep::new(EffectKind::ShiftPlay, this);
            match m.value {
                Some(ink) => step.amount = Some(Amount::Exact(ink)),
                None => step.note = m.value_text.clone(),
            }
            AbilityUnit::keyword(AbilityType::Static, m.keyword, raw_text, None, vec![step])
        }
        Keyword::Support => {
            let trigger = TriggerDescriptor {
                event: TriggerEvent::Quest,
                subject: this,
                guard: None,
                once_per_turn: false,
            };
            let mut step = EffectStep::new(
                EffectKind::ModifyStat {
                    stat: Stat::Strength,
                },
                TargetSelector::chosen(ObjectKind::Character).excluding_self(),
            )
            .with_amount(Amount::Variable("this character's strength".to_string()))
            .with_duration(Duration::ThisTurn);
            step.optional = true;
            AbilityUnit::keyword(
                AbilityType::Triggered,
                m.keyword,
                raw_text,
                Some(trigger),
                vec![step],
            )
        }
        keyword => {
            let mut step = EffectStep::new(
                EffectKind::GrantKeyword {
                    keyword,
                    value: m.value,
                },
                this,
            );
            step.amount = m.value.map(Amount::Exact);
            AbilityUnit::keyword(AbilityType::Static, keyword, raw_text, None, vec![step])
        }
    }
}

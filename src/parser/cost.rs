use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::debug;

use super::target::parse_target;
use super::text::{parse_count, ASCII_SEPARATOR, SEPARATOR};
use crate::effects::ability::CostClause;
use crate::effects::mechanics::ObjectKind;

static INK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:pay )?(\d+) \{I\}$").unwrap());

static BANISH_SELF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^banish this (?:character|item|location|card)$").unwrap());

static DISCARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:choose and )?discard (a|an|one|two|three|\d+) (?:(.+?) )?cards?$").unwrap()
});

static EXERT_OTHER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^exert (.+)$").unwrap());

static BANISH_OTHER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^banish (.+)$").unwrap());

/// Split an activated ability into (cost side, effect side). Returns `None`
/// unless the text before the separator starts with a known cost token.
/// A spaced ASCII hyphen counts as the separator when no dash is printed.
pub fn split_activated(text: &str, card_kind: ObjectKind) -> Option<(String, String)> {
    text.split_once(SEPARATOR)
        .and_then(|(left, right)| split_at_cost(left, right, card_kind))
        .or_else(|| {
            let (left, right) = text.split_once(ASCII_SEPARATOR)?;
            split_at_cost(left, right, card_kind)
        })
}

fn split_at_cost(left: &str, right: &str, card_kind: ObjectKind) -> Option<(String, String)> {
    let left = left.trim();
    let right = right.trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    let first = left.split(',').next()?.trim();
    if !is_known_cost(first, card_kind) {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}

/// Classify each comma-separated cost token. Unknown tokens become
/// [`CostClause::Other`]; none are dropped.
pub fn parse_costs(cost_text: &str, card_kind: ObjectKind) -> Vec<CostClause> {
    cost_text
        .split(',')
        .flat_map(|token| token.split(" and "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| parse_cost_token(token, card_kind))
        .collect()
}

/// Classify upstream cost tokens ("{E}", "2 {I}").
pub fn parse_cost_list(tokens: &[String], card_kind: ObjectKind) -> Vec<CostClause> {
    tokens
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(|token| parse_cost_token(token, card_kind))
        .collect()
}

fn is_known_cost(token: &str, card_kind: ObjectKind) -> bool {
    !matches!(parse_cost_token(token, card_kind), CostClause::Other { .. })
}

pub fn parse_cost_token(token: &str, card_kind: ObjectKind) -> CostClause {
    let token = token.trim().trim_end_matches('.');

    if token.eq_ignore_ascii_case("{E}") {
        return CostClause::ExertSelf;
    }
    if let Some(caps) = INK.captures(token) {
        if let Ok(amount) = caps[1].parse() {
            return CostClause::PayInk { amount };
        }
    }
    if BANISH_SELF.is_match(token) {
        return CostClause::BanishSelf;
    }
    if let Some(caps) = DISCARD.captures(token) {
        return CostClause::DiscardCard {
            count: parse_count(&caps[1]).unwrap_or(1),
            filter: caps.get(2).map(|m| m.as_str().to_string()),
        };
    }
    if let Some(caps) = EXERT_OTHER.captures(token) {
        return CostClause::ExertOther {
            target: parse_target(&caps[1], card_kind, None),
        };
    }
    if let Some(caps) = BANISH_OTHER.captures(token) {
        return CostClause::BanishOther {
            target: parse_target(&caps[1], card_kind, None),
        };
    }

    debug!(token, "unrecognised cost token");
    CostClause::Other {
        text: token.to_string(),
    }
}

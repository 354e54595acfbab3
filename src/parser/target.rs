use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::text::{is_elliptical_amount, parse_count};
use crate::effects::mechanics::{
    Attribute, Bound, Comparison, ObjectKind, Owner, Quantifier, TargetSelector, Zone,
};

static COST_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bwith (?:a )?cost (?:of )?(\d+)(?: or (less|lower|more|greater|higher))?").unwrap()
});

static STAT_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bwith (\d+) \{(S|W|L)\}(?: or (less|lower|more|greater|higher))?").unwrap()
});

static DAMAGE_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bwith (\d+) (?:or more )?damage(?: or more)?").unwrap()
});

static ZONE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:from|in|into) (your|their|an opponent's|chosen player's|a player's|each player's|its owner's) (discard|hand|deck|inkwell)\b").unwrap()
});

static NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bnamed ([^,]+?)(?:\s+(?:with|in|at|from|of yours)\b|$)").unwrap()
});

/// Trailing qualifiers kept verbatim rather than read as filters.
const QUALIFIER_PHRASES: &[&str] = &[
    "at a location",
    "at this location",
    "while here",
    "here",
    "in a challenge",
    "this turn",
];

/// Words with no selector meaning of their own.
const FILLER: &[&str] = &[
    "the", "of", "in", "play", "to", "their", "its", "or", "and", "that", "is", "are", "who",
    "which", "have", "has", "from", "card", "cards",
];

/// Words that are vocabulary, never trait names, even when capitalised.
const VOCABULARY: &[&str] = &[
    "chosen", "each", "all", "up", "to", "your", "yours", "opposing", "another", "other", "a",
    "an", "one", "this", "that", "those", "these", "of", "with", "damaged", "undamaged",
    "exerted", "ready", "character", "characters", "item", "items", "location", "locations",
    "action", "actions", "song", "songs", "card", "cards", "player", "players", "opponent",
    "opponents", "opponent's", "in", "play", "the", "and", "or", "named", "their", "it", "them",
    "they", "you", "here",
];

/// Resolve a target phrase.
///
/// `card_kind` is the kind of the source card ("itself"); `previous` is the
/// target of the preceding step, used for pronouns.
pub fn parse_target(
    phrase: &str,
    card_kind: ObjectKind,
    previous: Option<&TargetSelector>,
) -> TargetSelector {
    let phrase = phrase.trim().trim_end_matches(['.', ',']).trim();
    let lower = phrase.to_lowercase();

    if let Some(selector) = fixed_phrase(&lower, card_kind, previous) {
        return selector;
    }

    let mut selector = TargetSelector::new(Quantifier::Chosen(1));
    let mut quantifier: Option<Quantifier> = None;
    let mut plural = false;
    let mut working = phrase.to_string();

    if let Some(caps) = COST_BOUND.captures(&working) {
        selector.bound = Some(Bound {
            attribute: Attribute::Cost,
            comparison: comparison(caps.get(2).map(|m| m.as_str())),
            value: caps[1].parse().unwrap_or(0),
        });
        working = COST_BOUND.replace(&working, "").to_string();
    } else if let Some(caps) = STAT_BOUND.captures(&working) {
        let attribute = match &caps[2] {
            "S" | "s" => Attribute::Strength,
            "W" | "w" => Attribute::Willpower,
            _ => Attribute::Lore,
        };
        selector.bound = Some(Bound {
            attribute,
            comparison: comparison(caps.get(3).map(|m| m.as_str())),
            value: caps[1].parse().unwrap_or(0),
        });
        working = STAT_BOUND.replace(&working, "").to_string();
    } else if let Some(caps) = DAMAGE_BOUND.captures(&working) {
        selector.bound = Some(Bound {
            attribute: Attribute::Damage,
            comparison: Comparison::AtLeast,
            value: caps[1].parse().unwrap_or(0),
        });
        working = DAMAGE_BOUND.replace(&working, "").to_string();
    }

    if let Some(caps) = ZONE_PHRASE.captures(&working) {
        selector.zone = Some(match caps[2].to_lowercase().as_str() {
            "discard" => Zone::Discard,
            "hand" => Zone::Hand,
            "deck" => Zone::Deck,
            _ => Zone::Inkwell,
        });
        match caps[1].to_lowercase().as_str() {
            "your" => selector.owner = Owner::You,
            "an opponent's" => selector.owner = Owner::Opponent,
            _ => {}
        }
        working = ZONE_PHRASE.replace(&working, "").to_string();
    }

    if let Some(caps) = NAMED.captures(&working) {
        selector.name = Some(caps[1].trim().to_string());
        let whole = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
        let tail = whole
            .strip_prefix(&format!("named {}", &caps[1]))
            .unwrap_or("")
            .to_string();
        working = working.replacen(&whole, &tail, 1);
    }

    let mut leftovers: Vec<String> = Vec::new();
    for qualifier in QUALIFIER_PHRASES {
        let working_lower = working.to_ascii_lowercase();
        if let Some(pos) = find_phrase(&working_lower, qualifier) {
            leftovers.push(working[pos..pos + qualifier.len()].to_string());
            working.replace_range(pos..pos + qualifier.len(), "");
        }
    }

    let tokens: Vec<&str> = working
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | '"')))
        .filter(|w| !w.is_empty())
        .collect();

    let mut trait_run: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let word = token.to_lowercase();
        let next = tokens.get(i + 1).map(|t| t.to_lowercase());

        if !VOCABULARY.contains(&word.as_str()) && is_capitalised(token) {
            trait_run.push(token);
            i += 1;
            continue;
        }
        flush_trait(&mut trait_run, &mut selector.traits);

        match word.as_str() {
            "up" if next.as_deref() == Some("to") => {
                if let Some(n) = tokens.get(i + 2).and_then(|t| parse_count(t)) {
                    quantifier = Some(Quantifier::UpTo(n));
                    i += 3;
                    continue;
                }
                leftovers.push(token.to_string());
            }
            "chosen" => {
                if !matches!(quantifier, Some(Quantifier::UpTo(_)) | Some(Quantifier::Chosen(_))) {
                    quantifier = Some(Quantifier::Chosen(1));
                }
            }
            "each" => quantifier = Some(Quantifier::Each),
            "all" => quantifier = Some(Quantifier::All),
            "another" => {
                selector.exclude_self = true;
                quantifier.get_or_insert(Quantifier::Chosen(1));
            }
            "other" => selector.exclude_self = true,
            "your" | "yours" => selector.owner = Owner::You,
            "opposing" | "opponent's" | "opponents'" => selector.owner = Owner::Opponent,
            "a" | "an" | "one" => {
                quantifier.get_or_insert(Quantifier::Chosen(1));
            }
            "damaged" => selector.damaged = Some(true),
            "undamaged" => selector.damaged = Some(false),
            "exerted" => selector.exerted = Some(true),
            "ready" => selector.exerted = Some(false),
            "character" | "characters" => {
                plural |= word.ends_with('s');
                selector = selector.with_kind(ObjectKind::Character);
            }
            "item" | "items" => {
                plural |= word.ends_with('s');
                selector = selector.with_kind(ObjectKind::Item);
            }
            "location" | "locations" => {
                plural |= word.ends_with('s');
                selector = selector.with_kind(ObjectKind::Location);
            }
            "action" | "actions" => {
                plural |= word.ends_with('s');
                selector = selector.with_kind(ObjectKind::Action);
            }
            "song" | "songs" => {
                plural |= word.ends_with('s');
                selector = selector.with_kind(ObjectKind::Action);
                push_trait(&mut selector.traits, "Song");
            }
            "card" | "cards" => {
                plural |= word.ends_with('s');
                if selector.kinds.is_empty() && next.as_deref() != Some("named") {
                    selector = selector.with_kind(ObjectKind::Card);
                }
            }
            "of" if next.as_deref() == Some("yours") || next.as_deref() == Some("your") => {
                selector.owner = Owner::You;
                i += 2;
                continue;
            }
            w => {
                if let Some(n) = w.parse::<u32>().ok().filter(|_| quantifier.is_none()) {
                    quantifier = Some(Quantifier::Chosen(n));
                } else if !FILLER.contains(&w) {
                    leftovers.push(token.to_string());
                }
            }
        }
        i += 1;
    }
    flush_trait(&mut trait_run, &mut selector.traits);

    // "Card" only narrows when nothing more specific was named.
    if selector.kinds.len() > 1 {
        selector.kinds.retain(|k| *k != ObjectKind::Card);
    }

    selector.quantifier = match quantifier {
        Some(q) => q,
        None if plural || selector.owner != Owner::Any => Quantifier::All,
        None => Quantifier::Chosen(1),
    };
    // "one of your characters" names a single pick even though the noun is plural.
    if lower.starts_with("one of") {
        selector.quantifier = Quantifier::Chosen(1);
    }

    if !leftovers.is_empty() {
        selector.qualifier = Some(leftovers.join(" "));
    }
    selector
}

/// Phrases that resolve without token walking.
fn fixed_phrase(
    lower: &str,
    card_kind: ObjectKind,
    previous: Option<&TargetSelector>,
) -> Option<TargetSelector> {
    let selector = match lower {
        "this character" => TargetSelector::this(ObjectKind::Character),
        "this item" => TargetSelector::this(ObjectKind::Item),
        "this location" => TargetSelector::this(ObjectKind::Location),
        "this card" | "itself" | "himself" | "herself" | "themselves" => {
            TargetSelector::this(card_kind)
        }
        "they" | "them" | "it" | "he" | "she" | "him" | "her" | "that character"
        | "those characters" | "that card" | "that item" | "that location" | "the chosen character" => {
            // With nothing before it, a pronoun means the source card.
            previous.map_or_else(|| TargetSelector::this(card_kind), TargetSelector::as_previous)
        }
        "you" => TargetSelector::you(),
        "each opponent" | "each of your opponents" | "your opponents" | "opponents"
        | "your opponent" | "all opponents" => TargetSelector::each_opponent(),
        "each player" | "all players" | "players" => {
            TargetSelector::player(Quantifier::Each, Owner::Any)
        }
        "chosen opponent" | "an opponent" | "target opponent" => {
            TargetSelector::player(Quantifier::Chosen(1), Owner::Opponent)
        }
        "chosen player" | "a player" => TargetSelector::player(Quantifier::Chosen(1), Owner::Any),
        _ => return None,
    };
    Some(selector)
}

/// Split "chosen character and chosen item" into its parts. A phrase whose
/// "and" joins bare nouns ("characters and locations") stays whole.
pub fn split_compound(phrase: &str) -> Vec<String> {
    let lower = phrase.to_ascii_lowercase();
    let Some(pos) = lower.find(" and ") else {
        return vec![phrase.trim().to_string()];
    };
    let left = phrase[..pos].trim();
    let right = phrase[pos + 5..].trim();
    let right_lower = right.to_lowercase();
    let starts_selector = ["chosen", "up to", "each", "all", "your", "another", "one ", "a ", "an ", "this"]
        .iter()
        .any(|p| right_lower.starts_with(p))
        || right_lower.chars().next().is_some_and(|c| c.is_ascii_digit());
    if left.is_empty()
        || right.is_empty()
        || !starts_selector
        || is_elliptical_amount(right)
        || !mentions_object(left)
    {
        return vec![phrase.trim().to_string()];
    }
    let mut parts = vec![left.to_string()];
    parts.extend(split_compound(right));
    parts
}

/// Byte offset of `phrase` in `haystack` at word boundaries.
fn find_phrase(haystack: &str, phrase: &str) -> Option<usize> {
    haystack.match_indices(phrase).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + phrase.len()..].chars().next();
        before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
    })
}

fn mentions_object(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["character", "item", "location", "card", "song", "action", "player", "opponent"]
        .iter()
        .any(|noun| lower.contains(noun))
}

fn comparison(word: Option<&str>) -> Comparison {
    match word.map(|w| w.to_lowercase()) {
        Some(w) if w == "less" || w == "lower" => Comparison::AtMost,
        Some(_) => Comparison::AtLeast,
        None => Comparison::Exactly,
    }
}

fn is_capitalised(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_uppercase())
}

fn flush_trait(run: &mut Vec<&str>, traits: &mut Vec<String>) {
    if !run.is_empty() {
        push_trait(traits, &run.join(" "));
        run.clear();
    }
}

fn push_trait(traits: &mut Vec<String>, name: &str) {
    let name = name.trim_end_matches("'s").to_string();
    if !traits.contains(&name) {
        traits.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(phrase: &str) -> TargetSelector {
        parse_target(phrase, ObjectKind::Character, None)
    }

    #[test]
    fn chosen_character() {
        let t = parse("chosen character");
        assert_eq!(t.quantifier, Quantifier::Chosen(1));
        assert_eq!(t.kinds, vec![ObjectKind::Character]);
        assert_eq!(t.owner, Owner::Any);
    }

    #[test]
    fn opposing_with_stat_bound() {
        let t = parse("chosen opposing character with 3 {S} or less");
        assert_eq!(t.owner, Owner::Opponent);
        assert_eq!(
            t.bound,
            Some(Bound {
                attribute: Attribute::Strength,
                comparison: Comparison::AtMost,
                value: 3
            })
        );
        assert!(t.qualifier.is_none());
    }

    #[test]
    fn your_other_trait_characters() {
        let t = parse("your other Hero characters");
        assert_eq!(t.quantifier, Quantifier::All);
        assert_eq!(t.owner, Owner::You);
        assert!(t.exclude_self);
        assert_eq!(t.traits, vec!["Hero".to_string()]);
    }

    #[test]
    fn up_to_n() {
        let t = parse("up to 2 chosen characters");
        assert_eq!(t.quantifier, Quantifier::UpTo(2));
    }

    #[test]
    fn each_of_your_characters() {
        let t = parse("each of your characters");
        assert_eq!(t.quantifier, Quantifier::Each);
        assert_eq!(t.owner, Owner::You);
    }

    #[test]
    fn card_from_discard() {
        let t = parse("a character card from your discard");
        assert_eq!(t.zone, Some(Zone::Discard));
        assert_eq!(t.owner, Owner::You);
        assert_eq!(t.kinds, vec![ObjectKind::Character]);
    }

    #[test]
    fn named_filter() {
        let t = parse("your characters named Gaston");
        assert_eq!(t.name.as_deref(), Some("Gaston"));
        assert!(t.traits.is_empty());
    }

    #[test]
    fn pronoun_copies_previous() {
        let previous = parse("chosen opposing character");
        let t = parse_target("they", ObjectKind::Character, Some(&previous));
        assert_eq!(t.quantifier, Quantifier::Previous);
        assert_eq!(t.owner, Owner::Opponent);
    }

    #[test]
    fn compound_targets() {
        assert_eq!(
            split_compound("chosen character and chosen item"),
            vec!["chosen character".to_string(), "chosen item".to_string()]
        );
        assert_eq!(split_compound("your characters and locations").len(), 1);
    }
}

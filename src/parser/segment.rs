use super::text::{normalize, strip_reminder};
use super::ParseOptions;
use crate::data::card::{AbilityHint, Card};

/// One ability unit of a card's rules text.
#[derive(Debug, Clone)]
pub struct Segment<'a> {
    /// Position in print order; part of the ability id.
    pub index: usize,
    /// Text as delivered by the card source.
    pub raw: String,
    /// Normalised text, reminder text included.
    pub text: String,
    /// Upstream metadata for this segment, if it came from a hint.
    pub hint: Option<&'a AbilityHint>,
}

/// Split a card into ability segments.
///
/// Source precedence: upstream hints (when enabled) followed by action
/// effects, else printed sections, else action effects, else the flat text
/// split on line breaks. Sections that hold nothing but reminder text (a
/// song's singing rule) are skipped. A vanilla card yields no segments.
pub fn segment_card<'a>(card: &'a Card, options: &ParseOptions) -> Vec<Segment<'a>> {
    let mut raw: Vec<(String, Option<&'a AbilityHint>)> = Vec::new();

    if options.use_hints && !card.abilities.is_empty() {
        raw.extend(card.abilities.iter().map(|hint| (hint_text(hint), Some(hint))));
        raw.extend(card.effects.iter().map(|e| (e.clone(), None)));
    } else if card.full_text_sections.iter().any(|s| !s.trim().is_empty()) {
        raw.extend(card.full_text_sections.iter().map(|s| (s.clone(), None)));
    } else if card.effects.iter().any(|e| !e.trim().is_empty()) {
        raw.extend(card.effects.iter().map(|e| (e.clone(), None)));
    } else if let Some(full_text) = &card.full_text {
        raw.extend(split_lines(full_text).into_iter().map(|line| (line, None)));
    }

    raw.into_iter()
        .map(|(raw, hint)| (normalize(&raw), raw, hint))
        .filter(|(text, _, hint)| hint.is_some() || has_body(text))
        .enumerate()
        .map(|(index, (text, raw, hint))| Segment {
            index,
            raw,
            text,
            hint,
        })
        .collect()
}

/// The printed text of a hint, rebuilt from its parts when the full text
/// is missing.
fn hint_text(hint: &AbilityHint) -> String {
    if !hint.full_text.trim().is_empty() {
        return hint.full_text.clone();
    }
    let mut parts: Vec<String> = Vec::new();
    if let Some(name) = &hint.name {
        parts.push(name.clone());
    }
    if let Some(keyword) = &hint.keyword {
        match &hint.keyword_value {
            Some(value) => parts.push(format!("{keyword} {value}")),
            None => parts.push(keyword.clone()),
        }
    }
    match (&hint.costs_text, hint.costs.is_empty()) {
        (Some(costs), _) => parts.push(format!("{costs} —")),
        (None, false) => parts.push(format!("{} —", hint.costs.join(", "))),
        _ => {}
    }
    if let Some(effect) = &hint.effect {
        parts.push(effect.clone());
    }
    parts.join(" ")
}

fn has_body(text: &str) -> bool {
    !strip_reminder(text).0.trim().is_empty()
}

/// Split flat rules text into paragraphs. A line that starts in lowercase,
/// or follows a line ending in ',' or the separator, continues the paragraph.
fn split_lines(text: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let continues = paragraphs.last().is_some_and(|prev| {
            prev.ends_with(',') || prev.ends_with('—') || prev.ends_with('-')
        }) || line.chars().next().is_some_and(char::is_lowercase);

        match paragraphs.last_mut() {
            Some(prev) if continues => {
                prev.push(' ');
                prev.push_str(line);
            }
            _ => paragraphs.push(line.to_string()),
        }
    }
    paragraphs
}

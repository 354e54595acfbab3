use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Canonical cost/effect separator.
pub const SEPARATOR: char = '—';

/// Plain-keyboard separator, only accepted with spaces on both sides.
pub const ASCII_SEPARATOR: &str = " - ";

/// An amount and its noun with the verb left out ("1 damage to ...").
static ELLIPTICAL_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:up to )?(?:\d+|a|an|one|two|three|four|five) damage\b").unwrap()
});

/// Rewrite card-font glyphs and typographic punctuation into the plain
/// forms the pattern tables expect, and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '⟳' => out.push_str("{E}"),
            '⬡' => out.push_str("{I}"),
            '¤' => out.push_str("{S}"),
            '⛉' => out.push_str("{W}"),
            '◊' => out.push_str("{L}"),
            '’' | '‘' => out.push('\''),
            '“' | '”' => out.push('"'),
            '−' => out.push('-'),
            '–' | '—' => out.push(SEPARATOR),
            c if c.is_whitespace() => out.push(' '),
            c => out.push(c),
        }
    }
    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    uppercase_symbols(&collapsed)
}

/// "{e}" -> "{E}" so symbol matching can stay case-sensitive.
fn uppercase_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_braces = false;
    for ch in text.chars() {
        match ch {
            '{' => {
                in_braces = true;
                out.push(ch);
            }
            '}' => {
                in_braces = false;
                out.push(ch);
            }
            c if in_braces => out.push(c.to_ascii_uppercase()),
            c => out.push(c),
        }
    }
    out
}

/// Remove every parenthesised clause. Returns the remaining text and the
/// reminder texts without their parentheses.
pub fn strip_reminder(text: &str) -> (String, Vec<String>) {
    let mut body = String::with_capacity(text.len());
    let mut reminders = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            '(' => {
                if depth > 0 {
                    current.push(ch);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let reminder = current.trim().to_string();
                    if !reminder.is_empty() {
                        reminders.push(reminder);
                    }
                    current.clear();
                } else {
                    current.push(ch);
                }
            }
            c if depth > 0 => current.push(c),
            c => body.push(c),
        }
    }

    // Unbalanced parenthesis: keep what followed it as body text.
    if depth > 0 {
        body.push_str(&current);
    }

    let body = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let body = body.replace(" .", ".").replace(" ,", ",");
    (body.trim().to_string(), reminders)
}

/// Split on sentence-ending periods outside quotes. The periods are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let chars: Vec<char> = text.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '.' | '!' if !in_quotes => {
                let at_boundary = chars.get(i + 1).map_or(true, |c| c.is_whitespace() || *c == '"');
                if at_boundary {
                    push_trimmed(&mut sentences, &current);
                    current.clear();
                } else {
                    current.push(ch);
                }
            }
            c => current.push(c),
        }
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Whether a clause repeats the previous verb's object with a new amount,
/// as in "deal 2 damage to X and 1 damage to Y".
pub fn is_elliptical_amount(text: &str) -> bool {
    ELLIPTICAL_AMOUNT.is_match(text.trim())
}

/// Number words used by card text.
pub fn parse_count(word: &str) -> Option<u32> {
    match word.to_lowercase().as_str() {
        "a" | "an" | "one" | "another" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        w => w.parse().ok(),
    }
}

/// Signed integer with an optional leading '+'.
pub fn parse_signed(text: &str) -> Option<i32> {
    let text = text.trim();
    text.strip_prefix('+').unwrap_or(text).parse().ok()
}

/// A word printed in the all-caps ability-name style.
fn is_label_word(word: &str) -> bool {
    if word.starts_with('{') || word.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty() && letters.iter().all(|c| c.is_uppercase())
}

/// Separate a leading "ABILITY NAME" label from the ability text.
///
/// The label is a run of all-caps words; it must contain at least one word
/// of two or more letters and must leave some text behind.
pub fn strip_name_label(text: &str) -> (Option<String>, String) {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut end = tokens.iter().take_while(|t| is_label_word(t)).count();

    // "NAME A character..." - a lone "A" or "I" belongs to the sentence.
    while end > 1 && matches!(tokens[end - 1], "A" | "I") {
        end -= 1;
    }

    let has_long_word = tokens[..end]
        .iter()
        .any(|t| t.chars().filter(|c| c.is_alphabetic()).count() >= 2);
    if end == 0 || end == tokens.len() || !has_long_word {
        return (None, text.trim().to_string());
    }

    let name = tokens[..end].join(" ");
    let rest = tokens[end..].join(" ");
    (Some(name), rest)
}

/// Environment flags accept "1", "true" and "yes".
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rewrites_glyphs_and_dashes() {
        assert_eq!(normalize("⟳, 2 ⬡ – Draw a card."), "{E}, 2 {I} — Draw a card.");
        assert_eq!(normalize("gets +2 ¤\nthis   turn"), "gets +2 {S} this turn");
        assert_eq!(normalize("they don’t"), "they don't");
        assert_eq!(normalize("{e} − 1"), "{E} - 1");
    }

    #[test]
    fn strip_reminder_returns_body_and_reminders() {
        let (body, reminders) =
            strip_reminder("Evasive (Only characters with Evasive can challenge this character.)");
        assert_eq!(body, "Evasive");
        assert_eq!(reminders, vec!["Only characters with Evasive can challenge this character."]);

        let (body, reminders) = strip_reminder("Shift 5 (You may pay 5 {I} (ink) to play this.)");
        assert_eq!(body, "Shift 5");
        assert_eq!(reminders.len(), 1);
    }

    #[test]
    fn sentences_split_on_periods_outside_quotes() {
        let sentences = split_sentences(
            "Ready chosen character. They can't quest for the rest of this turn.",
        );
        assert_eq!(
            sentences,
            vec!["Ready chosen character", "They can't quest for the rest of this turn"]
        );

        let quoted = split_sentences("Your characters gain \"{E} — Draw a card.\" this turn.");
        assert_eq!(quoted.len(), 1);
    }

    #[test]
    fn name_label_is_separated() {
        let (name, rest) = strip_name_label("LOYAL AND DEVOTED Your characters named Gaston gain Evasive.");
        assert_eq!(name.as_deref(), Some("LOYAL AND DEVOTED"));
        assert_eq!(rest, "Your characters named Gaston gain Evasive.");

        let (name, rest) = strip_name_label("WHAT HAVE WE HERE? A character with cost 2 or less can't quest.");
        assert_eq!(name.as_deref(), Some("WHAT HAVE WE HERE?"));
        assert_eq!(rest, "A character with cost 2 or less can't quest.");

        let (name, rest) = strip_name_label("{E}, 1 {I} — Draw a card.");
        assert!(name.is_none());
        assert_eq!(rest, "{E}, 1 {I} — Draw a card.");
    }

    #[test]
    fn counts_accept_articles_and_digits() {
        assert_eq!(parse_count("a"), Some(1));
        assert_eq!(parse_count("Two"), Some(2));
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("chosen"), None);
        assert_eq!(parse_signed("+2"), Some(2));
        assert_eq!(parse_signed("-1"), Some(-1));
    }
}

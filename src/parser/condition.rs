use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::effects::mechanics::Condition;

static CHARACTER_NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^you have a (?:character|card) named (.+?)(?: in play)?$").unwrap()
});

/// Map a condition phrase to a [`Condition`]. Unknown phrases are kept as text.
pub fn parse_condition(text: &str) -> Condition {
    let text = text.trim().trim_end_matches([',', '.']).trim();
    let lower = text.to_lowercase();

    match lower.as_str() {
        "during your turn" | "it's your turn" | "it is your turn" => {
            return Condition::DuringYourTurn
        }
        "during an opponent's turn" | "during opponents' turns" | "it's an opponent's turn" => {
            return Condition::DuringOpponentsTurn
        }
        "this character has no damage" | "this character has no damage on them"
        | "this character is undamaged" => return Condition::ThisHasNoDamage,
        "this character has damage" | "this character is damaged"
        | "this character has damage on them" => return Condition::ThisIsDamaged,
        "this character is exerted" => return Condition::ThisIsExerted,
        "this character is at a location" => return Condition::ThisAtLocation,
        "you have no cards in your hand" => return Condition::YourHandIsEmpty,
        "you do" => return Condition::IfYouDo,
        _ => {}
    }

    if let Some(caps) = CHARACTER_NAMED.captures(text) {
        return Condition::YouHaveCharacterNamed(caps[1].trim().to_string());
    }

    Condition::Text(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_conditions() {
        assert_eq!(parse_condition("this character has no damage"), Condition::ThisHasNoDamage);
        assert_eq!(parse_condition("During your turn"), Condition::DuringYourTurn);
        assert_eq!(parse_condition("you do"), Condition::IfYouDo);
        assert_eq!(
            parse_condition("you have a character named Maui in play"),
            Condition::YouHaveCharacterNamed("Maui".to_string())
        );
    }

    #[test]
    fn unknown_conditions_keep_text() {
        assert_eq!(
            parse_condition("an opponent has more cards in their hand than you"),
            Condition::Text("an opponent has more cards in their hand than you".to_string())
        );
    }
}

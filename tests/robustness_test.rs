use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lorcana_ability_parser::data::card::*;
use lorcana_ability_parser::effects::ability::AbilityType;
use lorcana_ability_parser::parser::{parse_card_with, DiagnosticKind, ParseOptions};

const FRAGMENTS: &[&str] = &[
    "When you play this character,",
    "Whenever",
    "At the start of your turn,",
    "During your turn,",
    "Once per turn,",
    "this character",
    "chosen opposing character",
    "each opponent",
    "you may",
    "and",
    "then",
    "gets +2 {S}",
    "gains Evasive",
    "can't quest",
    "deal 3 damage to",
    "draw a card",
    "banish",
    "ready",
    "exert",
    "—",
    "{E},",
    "2 {I}",
    "⟳",
    "⬡",
    "(",
    ")",
    "\"",
    ".",
    ",",
    "if",
    "for each",
    "up to",
    "this turn",
    "SHOUT",
    "Shift",
    "Challenger +1",
    "named",
    "İstanbul",
    "with cost 2 or less",
    "and chosen item",
];

fn make_card(id: usize, sections: Vec<String>) -> Card {
    Card {
        id: format!("fuzz-{id}"),
        name: "Fuzz".to_string(),
        version: None,
        card_type: if id % 3 == 0 { CardType::Action } else { CardType::Character },
        cost: 1,
        color: None,
        inkwell: false,
        strength: None,
        willpower: None,
        lore: None,
        move_cost: None,
        subtypes: vec![],
        full_text_sections: sections,
        effects: vec![],
        full_text: None,
        abilities: vec![],
    }
}

fn salad(rng: &mut StdRng) -> String {
    let len = rng.gen_range(1..12);
    (0..len)
        .map(|_| FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_random_text_never_breaks_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let strict = ParseOptions {
        strict: true,
        ..ParseOptions::default()
    };

    for id in 0..500 {
        let sections: Vec<String> = (0..rng.gen_range(0..4)).map(|_| salad(&mut rng)).collect();
        let card = make_card(id, sections);

        for options in [ParseOptions::default(), strict.clone()] {
            let parse = parse_card_with(&card, &options).unwrap();
            for ability in &parse.abilities {
                assert!(!ability.effects.is_empty(), "empty effects for {:?}", card.full_text_sections);
                assert_eq!(ability.card_id, card.id);
                if !ability.costs.is_empty() {
                    assert_eq!(ability.ability_type, AbilityType::Activated);
                }
                assert_eq!(ability.trigger.is_some(), ability.ability_type == AbilityType::Triggered);
            }

            let mut ids: Vec<&str> = parse.abilities.iter().map(|a| a.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), parse.abilities.len(), "duplicate ids for {:?}", card.full_text_sections);
        }
    }
}

#[test]
fn test_default_mode_never_drops_an_ability() {
    let mut rng = StdRng::seed_from_u64(7);
    for id in 0..200 {
        let text = salad(&mut rng);
        let card = make_card(id, vec![text.clone()]);
        let parse = parse_card_with(&card, &ParseOptions::default()).unwrap();
        assert!(
            parse.diagnostics.iter().all(|d| d.kind != DiagnosticKind::NoEffects),
            "ability dropped for {text:?}"
        );
    }
}

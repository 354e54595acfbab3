use lorcana_ability_parser::data::card::*;
use lorcana_ability_parser::effects::ability::*;
use lorcana_ability_parser::effects::mechanics::*;
use lorcana_ability_parser::parser::{
    parse_card, parse_card_with, parse_effect_text, DiagnosticKind, ParseOptions,
};
use lorcana_ability_parser::CardError;

fn make_card(id: &str, name: &str, card_type: CardType, sections: Vec<&str>) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        version: Some("Test Version".to_string()),
        card_type,
        cost: 3,
        color: Some(InkColor::Amber),
        inkwell: true,
        strength: if card_type == CardType::Character { Some(2) } else { None },
        willpower: if card_type == CardType::Character { Some(3) } else { None },
        lore: if card_type == CardType::Character { Some(1) } else { None },
        move_cost: None,
        subtypes: vec![],
        full_text_sections: sections.into_iter().map(String::from).collect(),
        effects: vec![],
        full_text: None,
        abilities: vec![],
    }
}

fn make_character(id: &str, sections: Vec<&str>) -> Card {
    make_card(id, "Tester", CardType::Character, sections)
}

fn make_action(id: &str, text: &str) -> Card {
    let mut card = make_card(id, "Test Action", CardType::Action, vec![]);
    card.effects = vec![text.to_string()];
    card
}

fn keyword_hint(keyword: &str, value: Option<i32>, full_text: &str) -> AbilityHint {
    AbilityHint {
        hint_type: Some(HintType::Keyword),
        keyword: Some(keyword.to_string()),
        keyword_value: value.map(|v| v.to_string()),
        keyword_value_number: value,
        full_text: full_text.to_string(),
        ..AbilityHint::default()
    }
}

fn assert_invariants(abilities: &[AbilityDefinition]) {
    for ability in abilities {
        assert!(!ability.effects.is_empty(), "{} has no effects", ability.id);
        if !ability.costs.is_empty() {
            assert_eq!(ability.ability_type, AbilityType::Activated, "{}", ability.id);
        }
        assert_eq!(
            ability.trigger.is_some(),
            ability.ability_type == AbilityType::Triggered,
            "{}",
            ability.id
        );
    }
}

// ---- Sample scenarios ----

#[test]
fn test_ready_then_restriction() {
    let card = make_action("a1", "Ready chosen character. They can't quest for the rest of this turn.");
    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    assert_eq!(abilities.len(), 1);

    let ability = &abilities[0];
    assert_eq!(ability.ability_type, AbilityType::Static);
    assert!(ability.trigger.is_none());
    assert_eq!(ability.effects.len(), 2);

    let ready = &ability.effects[0];
    assert_eq!(ready.kind, EffectKind::Ready);
    assert_eq!(ready.target.quantifier, Quantifier::Chosen(1));
    assert_eq!(ready.target.kinds, vec![ObjectKind::Character]);

    let restriction = &ability.effects[1];
    assert_eq!(
        restriction.kind,
        EffectKind::Restriction {
            action: GameAction::Quest,
            mode: RestrictionMode::Cannot
        }
    );
    assert_eq!(restriction.target.quantifier, Quantifier::Previous);
    assert_eq!(restriction.target.kinds, vec![ObjectKind::Character]);
    assert_eq!(restriction.duration, Duration::ThisTurn);
}

#[test]
fn test_banish_chosen_character() {
    let card = make_action("a2", "Banish chosen character.");
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities.len(), 1);
    assert_eq!(abilities[0].effects.len(), 1);
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::Banish);
    assert_eq!(step.target.quantifier, Quantifier::Chosen(1));
    assert_eq!(step.target.kinds, vec![ObjectKind::Character]);
    assert!(!step.optional);
}

#[test]
fn test_shift_hint_value() {
    let mut card = make_character("c3", vec![]);
    card.abilities = vec![keyword_hint(
        "Shift",
        Some(3),
        "Shift 3 (You may pay 3 ⬡ to play this on top of one of your characters named Tester.)",
    )];
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities.len(), 1);
    assert_eq!(abilities[0].keyword, Some(Keyword::Shift));
    assert_eq!(abilities[0].ability_type, AbilityType::Static);
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::ShiftPlay);
    assert_eq!(step.amount, Some(Amount::Exact(3)));
}

#[test]
fn test_each_opponent_loses_lore() {
    let card = make_action("a4", "Each opponent loses 1 lore.");
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities.len(), 1);
    assert_eq!(abilities[0].effects.len(), 1);
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::LoreChange);
    assert_eq!(step.amount, Some(Amount::Exact(-1)));
    assert_eq!(step.target, TargetSelector::each_opponent());
}

#[test]
fn test_vanilla_card_has_no_abilities() {
    let card = make_character("c5", vec![]);
    assert!(card.is_vanilla());
    let abilities = parse_card(&card).unwrap();
    assert!(abilities.is_empty());
}

// ---- Keyword priority ----

#[test]
fn test_evasive_is_keyword_grant() {
    let card = make_character(
        "c6",
        vec!["Evasive (Only characters with Evasive can challenge this character.)"],
    );
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities.len(), 1);
    let ability = &abilities[0];
    assert_eq!(ability.ability_type, AbilityType::Static);
    assert_eq!(ability.keyword, Some(Keyword::Evasive));
    assert_eq!(ability.effects.len(), 1);
    assert_eq!(
        ability.effects[0].kind,
        EffectKind::GrantKeyword {
            keyword: Keyword::Evasive,
            value: None
        }
    );
    assert!(ability.effects[0].target.is_this());
}

#[test]
fn test_challenger_keeps_sign() {
    let card = make_character(
        "c7",
        vec!["Challenger +2 (While challenging, this character gets +2 ¤.)"],
    );
    let abilities = parse_card(&card).unwrap();
    assert_eq!(
        abilities[0].effects[0].kind,
        EffectKind::GrantKeyword {
            keyword: Keyword::Challenger,
            value: Some(2)
        }
    );
}

#[test]
fn test_support_is_triggered() {
    let card = make_character(
        "c8",
        vec!["Support (Whenever this character quests, you may add their ¤ to another chosen character's ¤ this turn.)"],
    );
    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    assert_eq!(abilities.len(), 1);
    assert_eq!(abilities[0].ability_type, AbilityType::Triggered);
    let trigger = abilities[0].trigger.as_ref().unwrap();
    assert_eq!(trigger.event, TriggerEvent::Quest);
    assert!(abilities[0].effects[0].optional);
}

#[test]
fn test_keyword_list_yields_one_ability_each() {
    let card = make_character("c9", vec!["Evasive, Ward"]);
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities.len(), 2);
    assert_eq!(abilities[0].id, "c9-0-1");
    assert_eq!(abilities[1].id, "c9-0-2");
    assert_eq!(abilities[1].keyword, Some(Keyword::Ward));
}

// ---- Triggers ----

#[test]
fn test_compound_trigger_split() {
    let card = make_character(
        "c10",
        vec!["HEALING TOUCH When you play this character and whenever she quests, you may remove up to 2 damage from each of your characters."],
    );
    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    assert!(abilities.len() >= 2);
    assert!(abilities.iter().all(|a| a.ability_type == AbilityType::Triggered));
    assert_eq!(abilities[0].trigger.as_ref().unwrap().event, TriggerEvent::Play);
    assert_eq!(abilities[1].trigger.as_ref().unwrap().event, TriggerEvent::Quest);
    assert_eq!(abilities[0].effects, abilities[1].effects);
    assert_eq!(abilities[0].name.as_deref(), Some("HEALING TOUCH"));

    let heal = &abilities[0].effects[0];
    assert_eq!(heal.kind, EffectKind::Heal);
    assert!(heal.optional);
    assert_eq!(heal.amount, Some(Amount::UpTo(2)));
    assert_eq!(heal.target.quantifier, Quantifier::Each);
    assert_eq!(heal.target.owner, Owner::You);
}

#[test]
fn test_compound_split_can_be_disabled() {
    let card = make_character(
        "c11",
        vec!["When you play this character and whenever she quests, draw a card."],
    );
    let options = ParseOptions {
        split_compound_triggers: false,
        ..ParseOptions::default()
    };
    let parse = parse_card_with(&card, &options).unwrap();
    assert_eq!(parse.abilities.len(), 1);
}

#[test]
fn test_trigger_guard_is_structured() {
    let card = make_character(
        "c12",
        vec!["During your turn, whenever this character banishes another character in a challenge, you may draw a card."],
    );
    let abilities = parse_card(&card).unwrap();
    let trigger = abilities[0].trigger.as_ref().unwrap();
    assert_eq!(trigger.event, TriggerEvent::BanishesInChallenge);
    assert_eq!(trigger.guard, Some(Condition::DuringYourTurn));
    assert_eq!(abilities[0].effects[0].kind, EffectKind::DrawCards);
}

#[test]
fn test_if_condition_survives_turn_guard() {
    let card = make_character(
        "c12b",
        vec!["During your turn, whenever this character quests, if you have a character named Elsa in play, gain 1 lore."],
    );
    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    let trigger = abilities[0].trigger.as_ref().unwrap();
    assert_eq!(trigger.event, TriggerEvent::Quest);
    assert_eq!(trigger.guard, Some(Condition::DuringYourTurn));
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::LoreChange);
    assert_eq!(
        step.condition,
        Some(Condition::YouHaveCharacterNamed("Elsa".to_string()))
    );
}

// ---- Activated ----

#[test]
fn test_activated_costs() {
    let card = make_card(
        "i13",
        "Magic Mirror",
        CardType::Item,
        vec!["SPEAK! {E}, 4 {I} — Draw a card."],
    );
    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    let ability = &abilities[0];
    assert_eq!(ability.ability_type, AbilityType::Activated);
    assert_eq!(ability.name.as_deref(), Some("SPEAK!"));
    assert_eq!(
        ability.costs,
        vec![CostClause::ExertSelf, CostClause::PayInk { amount: 4 }]
    );
    assert_eq!(ability.effects[0].kind, EffectKind::DrawCards);
    assert_eq!(ability.effects[0].amount, Some(Amount::Exact(1)));
    assert_eq!(ability.effects[0].target, TargetSelector::you());
}

#[test]
fn test_unknown_cost_token_is_kept() {
    let card = make_card(
        "i14",
        "Odd Item",
        CardType::Item,
        vec!["{E}, Sing a little song — Gain 1 lore."],
    );
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities[0].costs.len(), 2);
    assert!(matches!(abilities[0].costs[1], CostClause::Other { .. }));
}

#[test]
fn test_spaced_hyphen_separates_costs() {
    let card = make_card("i15", "Plain Item", CardType::Item, vec!["{E}, 1 {I} - Draw a card."]);
    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    assert_eq!(abilities.len(), 1);
    assert_eq!(abilities[0].ability_type, AbilityType::Activated);
    assert_eq!(
        abilities[0].costs,
        vec![CostClause::ExertSelf, CostClause::PayInk { amount: 1 }]
    );
    assert_eq!(abilities[0].effects[0].kind, EffectKind::DrawCards);
}

// ---- Effects ----

#[test]
fn test_stat_modifiers_and_duration() {
    let card = make_action("a15", "Chosen character gets +3 {S} this turn.");
    let abilities = parse_card(&card).unwrap();
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::ModifyStat { stat: Stat::Strength });
    assert_eq!(step.amount, Some(Amount::Exact(3)));
    assert_eq!(step.duration, Duration::ThisTurn);
}

#[test]
fn test_compound_target_is_one_step() {
    let card = make_action("a16", "Banish chosen character and chosen item.");
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities[0].effects.len(), 1);
    let step = &abilities[0].effects[0];
    assert_eq!(step.target.kinds, vec![ObjectKind::Character]);
    assert_eq!(step.additional_targets.len(), 1);
    assert_eq!(step.additional_targets[0].kinds, vec![ObjectKind::Item]);
}

#[test]
fn test_static_with_condition() {
    let card = make_character(
        "c17",
        vec!["While this character has no damage, she gets +2 {L}."],
    );
    let abilities = parse_card(&card).unwrap();
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::ModifyStat { stat: Stat::Lore });
    assert_eq!(step.condition, Some(Condition::ThisHasNoDamage));
}

#[test]
fn test_return_to_hand() {
    let card = make_action("a18", "Return chosen character with cost 3 or less to their player's hand.");
    let abilities = parse_card(&card).unwrap();
    let step = &abilities[0].effects[0];
    assert!(matches!(step.kind, EffectKind::MoveCard { to: Zone::Hand, .. }));
    assert_eq!(
        step.target.bound,
        Some(Bound {
            attribute: Attribute::Cost,
            comparison: Comparison::AtMost,
            value: 3
        })
    );
}

#[test]
fn test_deal_damage() {
    let card = make_action("a19", "Deal 2 damage to chosen character.");
    let abilities = parse_card(&card).unwrap();
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::Damage);
    assert_eq!(step.amount, Some(Amount::Exact(2)));
}

#[test]
fn test_second_damage_amount_is_its_own_step() {
    let steps = parse_effect_text("Deal 2 damage to chosen character and 1 damage to another chosen character.");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].kind, EffectKind::Damage);
    assert_eq!(steps[0].amount, Some(Amount::Exact(2)));
    assert!(steps[0].additional_targets.is_empty());
    assert_eq!(steps[1].kind, EffectKind::Damage);
    assert_eq!(steps[1].amount, Some(Amount::Exact(1)));
    assert_eq!(steps[1].target.quantifier, Quantifier::Chosen(1));
}

#[test]
fn test_lose_up_to_lore_keeps_direction() {
    let card = make_action("a20", "Each opponent loses up to 2 lore.");
    let abilities = parse_card(&card).unwrap();
    let step = &abilities[0].effects[0];
    assert_eq!(step.kind, EffectKind::LoreChange);
    assert!(step.amount.as_ref().is_some_and(Amount::is_up_to));
    assert_eq!(step.amount, Some(Amount::UpTo(-2)));
    assert_eq!(step.target, TargetSelector::each_opponent());
}

// ---- Fallback and strict mode ----

#[test]
fn test_unknown_text_falls_back_to_opaque() {
    let card = make_character("c20", vec!["The moon sings to the sea of stars."]);
    let parse = parse_card_with(&card, &ParseOptions::default()).unwrap();
    assert_eq!(parse.abilities.len(), 1);
    assert!(parse.abilities[0].is_low_confidence());
    assert_eq!(parse.diagnostics[0].kind, DiagnosticKind::OpaqueFallback);
}

#[test]
fn test_strict_mode_drops_with_diagnostic() {
    let card = make_character("c21", vec!["The moon sings to the sea of stars."]);
    let options = ParseOptions {
        strict: true,
        ..ParseOptions::default()
    };
    let parse = parse_card_with(&card, &options).unwrap();
    assert!(parse.abilities.is_empty());
    assert_eq!(parse.diagnostics.len(), 1);
    assert_eq!(parse.diagnostics[0].kind, DiagnosticKind::NoEffects);
    assert_eq!(parse.diagnostics[0].segment_index, 0);
    assert_eq!(parse.diagnostics[0].card_id, "c21");
}

// ---- Hints and card validation ----

#[test]
fn test_hints_are_preferred() {
    let mut card = make_character("c22", vec!["This text would be opaque if it were read."]);
    card.abilities = vec![AbilityHint {
        hint_type: Some(HintType::Triggered),
        name: Some("LOOK AROUND".to_string()),
        effect: Some("When you play this character, draw a card.".to_string()),
        full_text: "LOOK AROUND When you play this character, draw a card.".to_string(),
        ..AbilityHint::default()
    }];
    let abilities = parse_card(&card).unwrap();
    assert_eq!(abilities.len(), 1);
    assert_eq!(abilities[0].name.as_deref(), Some("LOOK AROUND"));
    assert_eq!(abilities[0].trigger.as_ref().unwrap().event, TriggerEvent::Play);

    let options = ParseOptions {
        use_hints: false,
        ..ParseOptions::default()
    };
    let parse = parse_card_with(&card, &options).unwrap();
    assert!(parse.abilities[0].is_low_confidence());
}

#[test]
fn test_partial_hints_keep_keyword_priority() {
    let mut card = make_character("c23", vec![]);
    card.abilities = vec![
        AbilityHint {
            full_text: "Evasive (Only characters with Evasive can challenge this character.)".to_string(),
            ..AbilityHint::default()
        },
        AbilityHint {
            hint_type: Some(HintType::Keyword),
            full_text: "Ward (Opponents can't choose this character except to challenge.)".to_string(),
            ..AbilityHint::default()
        },
        keyword_hint("Shift", None, "Shift 5 (You may pay 5 {I} to play this on top of one of your characters named Tester.)"),
    ];
    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    assert_eq!(abilities.len(), 3);

    assert_eq!(abilities[0].keyword, Some(Keyword::Evasive));
    assert_eq!(
        abilities[0].effects[0].kind,
        EffectKind::GrantKeyword {
            keyword: Keyword::Evasive,
            value: None
        }
    );
    assert_eq!(abilities[1].keyword, Some(Keyword::Ward));
    assert!(abilities.iter().all(|a| !a.is_low_confidence()));

    // The printed value fills in for a hint without one.
    assert_eq!(abilities[2].effects[0].kind, EffectKind::ShiftPlay);
    assert_eq!(abilities[2].effects[0].amount, Some(Amount::Exact(5)));
}

#[test]
fn test_missing_id_rejects_card() {
    let card = make_character("", vec!["Evasive"]);
    assert_eq!(
        parse_card(&card),
        Err(CardError::MissingId {
            name: "Tester".to_string()
        })
    );
}

// ---- Idempotence ----

#[test]
fn test_parsing_is_idempotent() {
    let card = make_character(
        "c24",
        vec![
            "Bodyguard",
            "ROYAL DECREE When you play this character, each opponent chooses and exerts one of their ready characters.",
            "FAST FRIENDS {E} — Chosen character gains Rush this turn.",
            "Your other characters get +1 {W}.",
        ],
    );
    let first = serde_json::to_string(&parse_card(&card).unwrap()).unwrap();
    let second = serde_json::to_string(&parse_card(&card).unwrap()).unwrap();
    assert_eq!(first, second);

    let abilities = parse_card(&card).unwrap();
    assert_invariants(&abilities);
    let ids: Vec<&str> = abilities.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["c24-0", "c24-1", "c24-2", "c24-3"]);
}

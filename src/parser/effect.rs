use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use tracing::debug;

use super::condition::parse_condition;
use super::target::{parse_target, split_compound};
use super::text::{
    is_elliptical_amount, parse_count, parse_signed, split_sentences, strip_reminder,
};
use super::ParseContext;
use crate::effects::mechanics::{
    Amount, Condition, DeckPosition, Duration, EffectKind, EffectStep, GameAction, Keyword,
    ObjectKind, Owner, RestrictionMode, Stat, TargetSelector, Zone,
};

/// Verbs that can open an imperative clause.
const IMPERATIVE_VERBS: &[&str] = &[
    "draw", "deal", "remove", "banish", "exert", "ready", "gain", "lose", "return", "put",
    "shuffle", "discard", "look", "reveal", "play", "move", "choose", "pay", "search", "give",
];

/// Verb forms that make a subject-led clause complete.
const CLAUSE_VERBS: &[&str] = &[
    "get", "gets", "gain", "gains", "lose", "loses", "can't", "cannot", "can", "must", "draw",
    "draws", "discard", "discards", "deal", "deals", "has", "have", "return", "returns", "choose",
    "chooses", "put", "puts", "reveal", "reveals", "banish", "banishes", "exert", "exerts", "ready",
    "readies", "pay", "pays", "remove", "removes", "look", "looks", "play", "plays", "move",
    "moves", "shuffle", "shuffles", "cost", "costs", "may", "search", "take", "takes",
];

/// Conjugated verbs that continue the previous clause's subject.
const CONTINUATION_VERBS: &[&str] = &[
    "gets", "gains", "loses", "can't", "cannot", "must", "draws", "deals", "returns",
];

/// Words that may open a subject noun phrase.
const SUBJECT_STARTS: &[&str] = &[
    "they", "he", "she", "it", "you", "each", "chosen", "your", "that", "this", "all", "opponents",
    "opposing", "another", "up", "one", "a", "an", "characters", "players", "their",
];

/// Template groups that hold free text rather than template words.
const FREE_GROUPS: &[&str] = &["t", "t2", "v", "f", "a"];

static SENTENCE_IF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^if ([^,]+),\s*").unwrap());
static SENTENCE_WHILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^while ([^,]+),\s*").unwrap());
static SENTENCE_DURING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(during your turn|during an opponent's turn|during opponents' turns),\s*").unwrap()
});
static SENTENCE_THIS_TURN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:for the rest of this turn|this turn),\s*").unwrap());
static SENTENCE_NEXT_TURN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^until the start of your next turn,\s*").unwrap());
static SENTENCE_THEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^then,?\s+").unwrap());
static SENTENCE_DELAYED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(once per turn|at the end of (?:the|your|this) turn),\s*").unwrap()
});

static DURATION_THIS_TURN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i),?\s+(?:for the rest of this turn|during this turn|until the end of (?:the|this) turn|this turn)$").unwrap()
});
static DURATION_NEXT_TURN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i),?\s+until the start of your next turn$").unwrap());
static DURATION_THEIR_TURN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i),?\s+(?:during|at the start of|until the end of) their next turn$").unwrap()
});
static DURATION_UNTIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i),?\s+(until (?:the end of|the start of) .+)$").unwrap()
});

static CLAUSE_MAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:(.+?)\s+)?may\s+(.+)$").unwrap());
static CLAUSE_IF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+?),?\s+if (.+)$").unwrap());
static CLAUSE_FOR_EACH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)\s+for each (.+)$").unwrap());

type StepBuilder = fn(&Captures, &ClauseCtx) -> Vec<EffectStep>;

struct EffectPattern {
    name: &'static str,
    regex: Regex,
    build: StepBuilder,
}

fn pattern(name: &'static str, re: &str, build: StepBuilder) -> EffectPattern {
    EffectPattern {
        name,
        regex: Regex::new(re).unwrap(),
        build,
    }
}

/// Effect verb table. Patterns are anchored at the start only; whatever a
/// match leaves unconsumed becomes the step's note.
static EFFECT_PATTERNS: Lazy<Vec<EffectPattern>> = Lazy::new(|| {
    vec![
        // ---- stats ----
        pattern(
            "modify_stat",
            r"(?i)^(?:(?P<t>.+?) )?(?:gets?|has|have) (?P<d>[+-]\d+) \{(?P<s>[SWL])\}(?: and (?P<d2>[+-]\d+) \{(?P<s2>[SWL])\})?",
            build_modify_stat,
        ),
        pattern(
            "lose_stat",
            r"(?i)^(?:(?P<t>.+?) )?loses? (?P<n>\d+) \{(?P<s>[SWL])\}",
            |c, ctx| {
                let stat = stat_symbol(group(c, "s").unwrap_or("S"));
                let n = group(c, "n").and_then(parse_signed).unwrap_or(0);
                vec![ctx
                    .step(EffectKind::ModifyStat { stat }, group(c, "t"))
                    .with_amount(Amount::Exact(-n))]
            },
        ),
        // ---- damage ----
        pattern(
            "deal_damage",
            r"(?i)^deal (?P<n>up to \d+|\d+|a|an|one|two|three|four|five) damage to (?P<t>.+)$",
            |c, ctx| {
                let mut step = ctx.step(EffectKind::Damage, group(c, "t"));
                step.amount = group(c, "n").and_then(parse_amount);
                vec![step]
            },
        ),
        pattern(
            "deal_damage_equal",
            r"(?i)^deal damage to (?P<t>.+?) equal to (?P<v>.+)$",
            |c, ctx| {
                vec![ctx
                    .step(EffectKind::Damage, group(c, "t"))
                    .with_amount(Amount::Variable(group(c, "v").unwrap_or_default().to_string()))]
            },
        ),
        pattern(
            "source_deals_damage",
            r"(?i)^(?P<f>.+?) deals? (?P<n>\d+) damage to (?P<t>.+)$",
            |c, ctx| {
                let mut step = ctx.step(EffectKind::Damage, group(c, "t"));
                step.amount = group(c, "n").and_then(parse_amount);
                step.note = group(c, "f").map(|f| format!("dealt by {f}"));
                vec![step]
            },
        ),
        pattern(
            "put_damage",
            r"(?i)^put (?P<n>a|an|one|two|three|\d+) damage (?:counters? )?on (?P<t>.+)$",
            |c, ctx| {
                let mut step = ctx.step(EffectKind::Damage, group(c, "t"));
                step.amount = group(c, "n").and_then(parse_amount);
                vec![step]
            },
        ),
        pattern(
            "remove_damage",
            r"(?i)^remove (?P<n>up to \d+|\d+|all) damage (?:counters? )?from (?P<t>.+)$",
            |c, ctx| {
                let mut step = ctx.step(EffectKind::Heal, group(c, "t"));
                step.amount = group(c, "n").and_then(parse_amount);
                vec![step]
            },
        ),
        pattern(
            "move_damage",
            r"(?i)^move (?P<n>up to \d+|\d+|all|a|an|one) damage (?:counters? )?from (?P<t>.+?) to (?P<t2>.+)$",
            |c, ctx| {
                let (to, _) = ctx.object(group(c, "t2"));
                let mut step = ctx.step(EffectKind::MoveDamage { to }, group(c, "t"));
                step.amount = group(c, "n").and_then(parse_amount);
                vec![step]
            },
        ),
        // ---- lore ----
        pattern(
            "lore_change",
            r"(?i)^(?:(?P<t>.+?) )?(?P<verb>gains?|loses?) (?P<n>up to \d+|\d+) lore",
            |c, ctx| {
                let n = group(c, "n").and_then(parse_amount).unwrap_or(Amount::Exact(0));
                let lose = group(c, "verb").is_some_and(|v| v.to_lowercase().starts_with("lose"));
                let amount = match (n, lose) {
                    (Amount::Exact(n), true) => Amount::Exact(-n),
                    (Amount::UpTo(n), true) => Amount::UpTo(-n),
                    (other, _) => other,
                };
                vec![EffectStep::new(EffectKind::LoreChange, ctx.player(group(c, "t")))
                    .with_amount(ctx.scaled(amount))]
            },
        ),
        pattern(
            "lore_equal",
            r"(?i)^(?:(?P<t>.+?) )?(?:gains?) lore equal to (?P<v>.+)$",
            |c, ctx| {
                vec![EffectStep::new(EffectKind::LoreChange, ctx.player(group(c, "t")))
                    .with_amount(Amount::Variable(group(c, "v").unwrap_or_default().to_string()))]
            },
        ),
        // ---- cards ----
        pattern(
            "draw",
            r"(?i)^(?:(?P<t>.+?) )?draws? (?P<n>up to \d+|a|an|one|two|three|four|five|\d+) cards?",
            |c, ctx| {
                let amount = group(c, "n").and_then(parse_amount).unwrap_or(Amount::Exact(1));
                vec![EffectStep::new(EffectKind::DrawCards, ctx.player(group(c, "t")))
                    .with_amount(ctx.scaled(amount))]
            },
        ),
        pattern(
            "draw_until",
            r"(?i)^(?:(?P<t>.+?) )?draws? cards until (?P<v>.+)$",
            |c, ctx| {
                vec![EffectStep::new(EffectKind::DrawCards, ctx.player(group(c, "t")))
                    .with_amount(Amount::Variable(format!("until {}", group(c, "v").unwrap_or_default())))]
            },
        ),
        pattern(
            "discard",
            r"(?i)^(?:(?P<t>.+?) )??(?:chooses? and )?discards? (?P<n>up to \d+|a|an|one|two|three|\d+) (?:(?P<f>.+?) )?cards?(?P<r> at random)?",
            |c, ctx| {
                let mut step = EffectStep::new(
                    EffectKind::Discard {
                        random: group(c, "r").is_some(),
                    },
                    ctx.player(group(c, "t")),
                );
                step.amount = group(c, "n").and_then(parse_amount);
                step.note = group(c, "f").map(|f| format!("{f} card"));
                vec![step]
            },
        ),
        pattern(
            "discard_hand",
            r"(?i)^(?:(?P<t>.+?) )?discards? (?:your|their|his|her) hand",
            |c, ctx| {
                vec![EffectStep::new(EffectKind::Discard { random: false }, ctx.player(group(c, "t")))
                    .with_amount(Amount::All)]
            },
        ),
        pattern(
            "return_to_hand",
            r"(?i)^return (?P<t>.+?) to (?:their|your|its|his|her) (?:owner's |owners' |player's |players' )?hands?",
            |c, ctx| vec![move_card(c, ctx, Zone::Hand, None)],
        ),
        pattern(
            "put_into_hand",
            r"(?i)^put (?P<t>.+?) into (?:your|their|its owner's|his|her) hand",
            |c, ctx| vec![move_card(c, ctx, Zone::Hand, None)],
        ),
        pattern(
            "put_into_inkwell",
            r"(?i)^put (?P<t>.+?) into (?:your|their|its|his|her) (?:owner's |player's )?inkwell(?P<fd> facedown)?(?P<ex> and exerted)?",
            |c, ctx| {
                let mut step = move_card(c, ctx, Zone::Inkwell, None);
                if let EffectKind::MoveCard { exerted, .. } = &mut step.kind {
                    *exerted = group(c, "ex").is_some();
                }
                vec![step]
            },
        ),
        pattern(
            "shuffle_into_deck",
            r"(?i)^shuffle (?P<t>.+?) into (?:your|their|its|his|her) (?:owner's |player's )?deck",
            |c, ctx| vec![move_card(c, ctx, Zone::Deck, Some(DeckPosition::Shuffled))],
        ),
        pattern(
            "put_on_deck",
            r"(?i)^put (?P<t>.+?) on the (?P<p>top|bottom) of (?:your|their|its|his|her) (?:owner's |player's )?deck",
            |c, ctx| {
                let position = match group(c, "p").map(|p| p.to_lowercase()) {
                    Some(p) if p == "top" => DeckPosition::Top,
                    _ => DeckPosition::Bottom,
                };
                vec![move_card(c, ctx, Zone::Deck, Some(position))]
            },
        ),
        pattern(
            "put_into_discard",
            r"(?i)^put (?P<t>.+?) into (?:your|their|its|his|her) (?:owner's |player's )?discard",
            |c, ctx| vec![move_card(c, ctx, Zone::Discard, None)],
        ),
        pattern(
            "play_free",
            r"(?i)^play (?P<t>.+?) for free",
            |c, ctx| vec![ctx.step(EffectKind::PlayCard { free: true }, group(c, "t"))],
        ),
        pattern(
            "play",
            r"(?i)^play (?P<t>.+)$",
            |c, ctx| vec![ctx.step(EffectKind::PlayCard { free: false }, group(c, "t"))],
        ),
        pattern(
            "look_at_top",
            r"(?i)^look at the top (?P<n>a|one|two|three|four|five|six|seven|\d+) cards? of (?P<t>your|their|chosen player's|each opponent's) deck",
            |c, ctx| {
                let owner = group(c, "t").map(|t| t.to_lowercase());
                let target = match owner.as_deref() {
                    Some("your") | None => TargetSelector::you(),
                    Some("each opponent's") => TargetSelector::each_opponent(),
                    Some(_) => ctx.player(group(c, "t").map(|t| t.trim_end_matches("'s"))),
                };
                let mut step = EffectStep::new(EffectKind::LookAtCards, target);
                step.amount = group(c, "n").and_then(parse_amount);
                vec![step]
            },
        ),
        pattern(
            "look_at_hand",
            r"(?i)^look at (?P<t>.+?)(?:'s)? hands?$",
            |c, ctx| {
                vec![EffectStep::new(EffectKind::LookAtCards, ctx.player(group(c, "t")))
                    .with_amount(Amount::All)]
            },
        ),
        pattern(
            "reveal_hand",
            r"(?i)^(?P<t>.+?) reveals? (?:their|his|her|your) hand",
            |c, ctx| {
                vec![EffectStep::new(EffectKind::Reveal, ctx.player(group(c, "t")))
                    .with_amount(Amount::All)]
            },
        ),
        pattern(
            "reveal",
            r"(?i)^reveal (?P<t>.+)$",
            |c, ctx| vec![ctx.step(EffectKind::Reveal, group(c, "t"))],
        ),
        pattern(
            "search_deck",
            r"(?i)^search (?:your|their) deck for (?P<t>.+)$",
            |c, ctx| {
                let mut step = ctx.step(EffectKind::Reveal, group(c, "t"));
                step.target.zone = Some(Zone::Deck);
                vec![step]
            },
        ),
        // ---- board state ----
        pattern(
            "banish",
            r"(?i)^banish (?P<t>.+)$",
            |c, ctx| vec![ctx.step(EffectKind::Banish, group(c, "t"))],
        ),
        pattern(
            "exert",
            r"(?i)^exert (?P<t>.+)$",
            |c, ctx| vec![ctx.step(EffectKind::Exert, group(c, "t"))],
        ),
        pattern(
            "ready",
            r"(?i)^ready (?P<t>.+)$",
            |c, ctx| vec![ctx.step(EffectKind::Ready, group(c, "t"))],
        ),
        pattern(
            "chooses_and_acts",
            r"(?i)^(?P<f>each opponent|each player|chosen opponent|an opponent) chooses (?:and )?(?P<verb>banishes|exerts|readies|returns) (?P<t>.+?)(?: to (?:their|his|her) hand)?$",
            build_chooser,
        ),
        pattern(
            "grant_keyword",
            r"(?i)^(?:(?P<t>.+?) )?(?:gains?|has|have|gets?) (?P<k>alert|bodyguard|boost \d+|challenger [+-]\d+|evasive|reckless|resist [+-]\d+|rush|singer \d+|sing together \d+|support|vanish|ward)\b",
            build_grant_keyword,
        ),
        pattern(
            "grant_ability",
            r#"(?i)^(?:(?P<t>.+?) )?(?:gains?|has|have) "(?P<v>[^"]+)""#,
            |c, ctx| {
                let text = group(c, "v").unwrap_or_default().to_string();
                vec![ctx.step(EffectKind::GrantAbility { text }, group(c, "t"))]
            },
        ),
        pattern(
            "restriction",
            r"(?i)^(?:(?P<t>.+?) )?(?P<m>can't|cannot|must|can) (?P<act>challenge ready characters|be challenged|sing songs|quest|challenge|ready|move to locations|move)\b",
            build_restriction,
        ),
        pattern(
            "restriction_other",
            r"(?i)^(?:(?P<t>.+?) )?(?P<m>can't|cannot|must) (?P<a>.+)$",
            build_restriction,
        ),
        // ---- costs ----
        pattern(
            "pay_less",
            r"(?i)^(?:you )?pays? (?P<n>\d+) \{I\} less (?:to play|for) (?P<t>.+?)$",
            |c, ctx| {
                let n = group(c, "n").and_then(parse_signed).unwrap_or(0);
                vec![ctx
                    .step(EffectKind::CostReduction, group(c, "t"))
                    .with_amount(ctx.scaled(Amount::Exact(n)))]
            },
        ),
        pattern(
            "costs_less",
            r"(?i)^(?P<t>.+?) costs? (?P<n>\d+) \{I\} less",
            |c, ctx| {
                let n = group(c, "n").and_then(parse_signed).unwrap_or(0);
                vec![ctx
                    .step(EffectKind::CostReduction, group(c, "t"))
                    .with_amount(ctx.scaled(Amount::Exact(n)))]
            },
        ),
    ]
});

/// Per-clause resolution context.
struct ClauseCtx<'a> {
    card_kind: ObjectKind,
    previous: Option<&'a TargetSelector>,
    /// "for each X" multiplier stripped from the clause.
    per_each: Option<String>,
}

impl ClauseCtx<'_> {
    /// Object target and any further compound targets. No phrase means the
    /// previous step's objects, or the source card.
    fn object(&self, phrase: Option<&str>) -> (TargetSelector, Vec<TargetSelector>) {
        let Some(phrase) = phrase.filter(|p| !p.trim().is_empty()) else {
            let target = self
                .previous
                .map_or_else(|| TargetSelector::this(self.card_kind), TargetSelector::as_previous);
            return (target, Vec::new());
        };
        let mut parts = split_compound(phrase)
            .into_iter()
            .map(|part| parse_target(&part, self.card_kind, self.previous));
        let first = parts
            .next()
            .unwrap_or_else(|| TargetSelector::this(self.card_kind));
        (first, parts.collect())
    }

    /// Player target; no phrase means the controller.
    fn player(&self, phrase: Option<&str>) -> TargetSelector {
        match phrase.filter(|p| !p.trim().is_empty()) {
            Some(phrase) => parse_target(phrase, self.card_kind, self.previous),
            None => TargetSelector::you(),
        }
    }

    fn step(&self, kind: EffectKind, phrase: Option<&str>) -> EffectStep {
        let (target, additional) = self.object(phrase);
        let mut step = EffectStep::new(kind, target);
        step.additional_targets = additional;
        step
    }

    /// Apply a stripped "for each" multiplier to a literal amount.
    fn scaled(&self, amount: Amount) -> Amount {
        match (&self.per_each, amount) {
            (Some(counted), Amount::Exact(per)) => Amount::PerEach {
                per,
                counted: counted.clone(),
            },
            (_, amount) => amount,
        }
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// "up to 2" / "all" / "a" / "3" / "X".
pub fn parse_amount(text: &str) -> Option<Amount> {
    let text = text.trim().to_lowercase();
    if let Some(rest) = text.strip_prefix("up to ") {
        return parse_count(rest.trim())
            .and_then(|n| i32::try_from(n).ok())
            .map(Amount::UpTo);
    }
    match text.as_str() {
        "all" => Some(Amount::All),
        "x" => Some(Amount::Variable("X".to_string())),
        t => parse_signed(t)
            .or_else(|| parse_count(t).and_then(|n| i32::try_from(n).ok()))
            .map(Amount::Exact),
    }
}

fn stat_symbol(symbol: &str) -> Stat {
    match symbol.to_ascii_uppercase().as_str() {
        "W" => Stat::Willpower,
        "L" => Stat::Lore,
        _ => Stat::Strength,
    }
}

fn build_modify_stat(c: &Captures, ctx: &ClauseCtx) -> Vec<EffectStep> {
    [("d", "s"), ("d2", "s2")]
        .iter()
        .filter_map(|(d, s)| {
            let delta = group(c, d).and_then(parse_signed)?;
            let stat = stat_symbol(group(c, s)?);
            Some(
                ctx.step(EffectKind::ModifyStat { stat }, group(c, "t"))
                    .with_amount(ctx.scaled(Amount::Exact(delta))),
            )
        })
        .collect()
}

fn build_grant_keyword(c: &Captures, ctx: &ClauseCtx) -> Vec<EffectStep> {
    let Some(text) = group(c, "k") else {
        return Vec::new();
    };
    let (name, value) = match text.rsplit_once(' ') {
        Some((name, value)) if parse_signed(value).is_some() => (name, parse_signed(value)),
        _ => (text, None),
    };
    let Some(keyword) = Keyword::from_name(name) else {
        return Vec::new();
    };
    let mut step = ctx.step(EffectKind::GrantKeyword { keyword, value }, group(c, "t"));
    step.amount = value.map(Amount::Exact);
    vec![step]
}

fn build_restriction(c: &Captures, ctx: &ClauseCtx) -> Vec<EffectStep> {
    let mode = match group(c, "m").map(|m| m.to_lowercase()).as_deref() {
        Some("must") => RestrictionMode::Must,
        Some("can") => RestrictionMode::Can,
        _ => RestrictionMode::Cannot,
    };
    let action = match group(c, "act").map(|a| a.to_lowercase()).as_deref() {
        Some("quest") => GameAction::Quest,
        Some("challenge") => GameAction::Challenge,
        Some("be challenged") => GameAction::BeChallenged,
        Some("ready") => GameAction::Ready,
        Some("sing songs") => GameAction::SingSongs,
        Some("move") | Some("move to locations") => GameAction::Move,
        Some("challenge ready characters") => GameAction::ChallengeReadyCharacters,
        _ => GameAction::Other(group(c, "a").unwrap_or_default().to_string()),
    };
    vec![ctx.step(EffectKind::Restriction { action, mode }, group(c, "t"))]
}

fn build_chooser(c: &Captures, ctx: &ClauseCtx) -> Vec<EffectStep> {
    let chooser = group(c, "f").unwrap_or_default().to_lowercase();
    let verb = group(c, "verb").unwrap_or_default().to_lowercase();
    let kind = match verb.as_str() {
        "banishes" => EffectKind::Banish,
        "exerts" => EffectKind::Exert,
        "readies" => EffectKind::Ready,
        _ => EffectKind::MoveCard {
            from: Some(Zone::Play),
            to: Zone::Hand,
            position: None,
            exerted: false,
        },
    };
    let mut step = ctx.step(kind, group(c, "t"));
    if chooser.contains("opponent") {
        step.target.owner = Owner::Opponent;
    }
    step.note = Some(format!("chosen by {chooser}"));
    vec![step]
}

fn move_card(c: &Captures, ctx: &ClauseCtx, to: Zone, position: Option<DeckPosition>) -> EffectStep {
    let (target, additional) = ctx.object(group(c, "t"));
    let from = target.zone.or(Some(Zone::Play)).filter(|from| *from != to);
    let mut step = EffectStep::new(
        EffectKind::MoveCard {
            from,
            to,
            position,
            exerted: false,
        },
        target,
    );
    step.additional_targets = additional;
    step
}

/// Sentence-level modifiers stripped from the front of a sentence.
#[derive(Debug, Default)]
struct SentenceMods {
    condition: Option<Condition>,
    duration: Option<Duration>,
}

/// Length of a leading match and its first capture.
fn leading(re: &Regex, text: &str) -> Option<(usize, String)> {
    let caps = re.captures(text)?;
    let consumed = caps.get(0)?.end();
    let inner = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    Some((consumed, inner))
}

fn strip_sentence_prefixes(sentence: &str) -> (SentenceMods, String) {
    let mut mods = SentenceMods::default();
    let mut rest = sentence.trim().to_string();

    loop {
        let consumed = if let Some((n, _)) = leading(&SENTENCE_THEN, &rest) {
            n
        } else if let Some((n, inner)) = leading(&SENTENCE_IF, &rest)
            .or_else(|| leading(&SENTENCE_WHILE, &rest))
            .or_else(|| leading(&SENTENCE_DURING, &rest))
        {
            mods.condition.get_or_insert(parse_condition(&inner));
            n
        } else if let Some((n, _)) = leading(&SENTENCE_THIS_TURN, &rest) {
            mods.duration = Some(Duration::ThisTurn);
            n
        } else if let Some((n, _)) = leading(&SENTENCE_NEXT_TURN, &rest) {
            mods.duration = Some(Duration::UntilStartOfYourNextTurn);
            n
        } else if let Some((n, inner)) = leading(&SENTENCE_DELAYED, &rest) {
            mods.condition.get_or_insert(Condition::Text(inner));
            n
        } else {
            break;
        };
        rest = rest[consumed..].trim_start().to_string();
    }
    (mods, rest)
}

/// Split a sentence where what follows "and"/"then" is an action of its own
/// and what precedes it already has a verb. "and 1 damage to ..." also
/// starts a clause; [`decompose`] lends it the previous verb. Quoted text is
/// never split.
pub fn split_clauses(sentence: &str) -> Vec<String> {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let mut clauses = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        let quote_count = token.matches('"').count();
        if in_quotes {
            if quote_count % 2 == 1 {
                in_quotes = false;
            }
            i += 1;
            continue;
        }
        if quote_count % 2 == 1 {
            in_quotes = true;
            i += 1;
            continue;
        }

        let word = token.to_lowercase();
        if (word == "and" || word == "then") && i > start {
            let mut right_start = i + 1;
            if word == "and" && tokens.get(right_start).map(|t| t.to_lowercase()).as_deref() == Some("then") {
                right_start += 1;
            }
            let left = &tokens[start..i];
            let right = &tokens[right_start.min(tokens.len())..];
            let elliptical = is_elliptical_amount(&right.join(" "));
            if left.len() > 1 && has_verb(left) && (starts_action(right) || elliptical) {
                clauses.push(join_clause(left));
                start = right_start;
                i = right_start;
                continue;
            }
        }
        i += 1;
    }
    if start < tokens.len() {
        clauses.push(join_clause(&tokens[start..]));
    }
    clauses.retain(|c| !c.is_empty());
    clauses
}

fn join_clause(tokens: &[&str]) -> String {
    tokens.join(" ").trim().trim_end_matches(',').trim().to_string()
}

fn bare(word: &str) -> String {
    word.trim_matches(|c: char| matches!(c, ',' | '.' | ';' | '"'))
        .to_lowercase()
}

/// The imperative verb a clause opens with, if any.
fn leading_verb(core: &str) -> Option<String> {
    let first = bare(core.split_whitespace().next()?);
    IMPERATIVE_VERBS.contains(&first.as_str()).then_some(first)
}

fn has_verb(tokens: &[&str]) -> bool {
    tokens.iter().any(|t| {
        let w = bare(t);
        IMPERATIVE_VERBS.contains(&w.as_str()) || CLAUSE_VERBS.contains(&w.as_str())
    })
}

/// Whether the words form a complete action: an imperative verb, or a
/// subject phrase followed by a verb of its own.
fn starts_action(tokens: &[&str]) -> bool {
    let words: Vec<String> = tokens.iter().map(|t| bare(t)).collect();
    let mut words: &[String] = &words;
    if words.first().map(String::as_str) == Some("you") && words.get(1).map(String::as_str) == Some("may") {
        words = &words[2..];
    }
    let Some(first) = words.first() else {
        return false;
    };
    if IMPERATIVE_VERBS.contains(&first.as_str()) || CONTINUATION_VERBS.contains(&first.as_str()) {
        return true;
    }
    SUBJECT_STARTS.contains(&first.as_str())
        && words
            .iter()
            .skip(1)
            .take_while(|w| w.as_str() != "and")
            .any(|w| CLAUSE_VERBS.contains(&w.as_str()))
}

/// Clause-level modifiers: optionality, duration, condition, "for each".
struct ClauseMods {
    optional: bool,
    duration: Option<Duration>,
    condition: Option<Condition>,
    per_each: Option<String>,
}

fn strip_clause_modifiers(clause: &str) -> (ClauseMods, String) {
    let mut core = clause.trim().trim_end_matches(['.', ',']).trim().to_string();
    let mut mods = ClauseMods {
        optional: false,
        duration: None,
        condition: None,
        per_each: None,
    };
    // Granted abilities carry their own "may"/"if" wording.
    let quoted = core.contains('"');

    let may = CLAUSE_MAY.captures(&core).filter(|_| !quoted).map(|caps| {
        (
            caps.get(1).map(|m| m.as_str().trim().to_string()),
            caps[2].to_string(),
        )
    });
    if let Some((subject, rest)) = may {
        // Keep the subject unless it is just the controller.
        core = match subject {
            Some(s) if !s.eq_ignore_ascii_case("you") => format!("{s} {rest}"),
            _ => rest,
        };
        mods.optional = true;
    }

    if let Some(m) = DURATION_THIS_TURN.find(&core) {
        mods.duration = Some(Duration::ThisTurn);
        core.truncate(m.start());
    } else if let Some(m) = DURATION_NEXT_TURN.find(&core) {
        mods.duration = Some(Duration::UntilStartOfYourNextTurn);
        core.truncate(m.start());
    } else if let Some(m) = DURATION_THEIR_TURN.find(&core) {
        mods.duration = Some(Duration::TheirNextTurn);
        core.truncate(m.start());
    } else if let Some((start, until)) = DURATION_UNTIL
        .captures(&core)
        .and_then(|caps| Some((caps.get(0)?.start(), caps.get(1)?.as_str().to_string())))
    {
        mods.duration = Some(Duration::Until(until));
        core.truncate(start);
    }

    if let Some((head, tail)) = split_two(&CLAUSE_IF, &core).filter(|_| !quoted) {
        mods.condition = Some(parse_condition(&tail));
        core = head;
    }

    if let Some((head, tail)) = split_two(&CLAUSE_FOR_EACH, &core).filter(|_| !quoted) {
        mods.per_each = Some(tail.trim().to_string());
        core = head;
    }

    (mods, core.trim().to_string())
}

fn split_two(re: &Regex, text: &str) -> Option<(String, String)> {
    let caps = re.captures(text)?;
    Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
}

/// Match one clause against the pattern table. The winner has the most
/// template text outside free-text captures, then the longest match, then
/// the earliest table entry.
fn match_clause(core: &str, ctx: &ClauseCtx) -> Option<Vec<EffectStep>> {
    let mut best: Option<(usize, usize, usize)> = None; // (specificity, length, index)
    for (index, p) in EFFECT_PATTERNS.iter().enumerate() {
        let Some(caps) = p.regex.captures(core) else {
            continue;
        };
        let length = caps.get(0).map_or(0, |m| m.end());
        let free: usize = FREE_GROUPS
            .iter()
            .filter_map(|name| caps.name(name))
            .map(|m| m.as_str().len())
            .sum();
        let specificity = length.saturating_sub(free);
        let better = match best {
            None => true,
            Some((s, l, _)) => specificity > s || (specificity == s && length > l),
        };
        if better {
            best = Some((specificity, length, index));
        }
    }

    let (_, length, index) = best?;
    let p = &EFFECT_PATTERNS[index];
    let caps = p.regex.captures(core)?;
    debug!(pattern = p.name, clause = core, "effect pattern matched");
    let mut steps = (p.build)(&caps, ctx);
    if steps.is_empty() {
        return None;
    }

    let remainder = core[length..].trim().trim_matches(|c: char| matches!(c, ',' | '.')).trim();
    if !remainder.is_empty() {
        if let Some(last) = steps.last_mut() {
            last.note = Some(match last.note.take() {
                Some(note) => format!("{note}; {remainder}"),
                None => remainder.to_string(),
            });
        }
    }
    Some(steps)
}

/// Effects that last over time and can share a trailing duration.
fn is_continuous(kind: &EffectKind) -> bool {
    matches!(
        kind,
        EffectKind::ModifyStat { .. }
            | EffectKind::GrantKeyword { .. }
            | EffectKind::GrantAbility { .. }
            | EffectKind::Restriction { .. }
            | EffectKind::CostReduction
    )
}

/// Decompose an effect clause into ordered effect steps.
///
/// With the opaque fallback enabled an unrecognised clause becomes an
/// [`EffectKind::Opaque`] step; in strict mode it is skipped.
pub fn decompose(text: &str, ctx: &ParseContext) -> Vec<EffectStep> {
    let (body, _) = strip_reminder(text);
    let mut steps: Vec<EffectStep> = Vec::new();
    let mut previous: Option<TargetSelector> = None;

    for sentence in split_sentences(&body) {
        let (sentence_mods, sentence) = strip_sentence_prefixes(&sentence);
        let sentence_start = steps.len();
        let mut optional = false;
        let mut last_verb: Option<String> = None;

        for clause in split_clauses(&sentence) {
            let (mods, core) = strip_clause_modifiers(&clause);
            let core = match &last_verb {
                Some(verb) if is_elliptical_amount(&core) => format!("{verb} {core}"),
                _ => core,
            };
            if let Some(verb) = leading_verb(&core) {
                last_verb = Some(verb);
            }
            let clause_ctx = ClauseCtx {
                card_kind: ctx.card_kind,
                previous: previous.as_ref(),
                per_each: mods.per_each.clone(),
            };

            let parsed = if core.is_empty() {
                None
            } else {
                match_clause(&core, &clause_ctx)
            };
            let mut clause_steps = match parsed {
                Some(clause_steps) => clause_steps,
                None if ctx.options.strict => {
                    debug!(clause = clause.as_str(), "unrecognised clause skipped");
                    continue;
                }
                None => {
                    debug!(clause = clause.as_str(), "unrecognised clause kept as opaque");
                    vec![EffectStep::opaque(&clause)]
                }
            };

            optional |= mods.optional;
            for step in &mut clause_steps {
                step.optional = optional;
                if let Some(duration) = &mods.duration {
                    step.duration = duration.clone();
                }
                if mods.condition.is_some() {
                    step.condition = mods.condition.clone();
                }
            }

            if let Some(last) = clause_steps
                .iter()
                .rev()
                .find(|s| !s.is_opaque() && !s.target.is_player())
            {
                previous = Some(last.target.clone());
            }
            steps.extend(clause_steps);
        }

        let sentence_steps = &mut steps[sentence_start..];

        // A trailing duration covers earlier continuous clauses of the sentence.
        if let Some(duration) = sentence_steps
            .iter()
            .rev()
            .map(|s| s.duration.clone())
            .find(|d| *d != Duration::Permanent)
        {
            for step in sentence_steps.iter_mut() {
                if step.duration == Duration::Permanent && is_continuous(&step.kind) {
                    step.duration = duration.clone();
                }
            }
        }

        for step in sentence_steps.iter_mut() {
            if let Some(duration) = &sentence_mods.duration {
                step.duration = duration.clone();
            }
            if step.condition.is_none() {
                step.condition = sentence_mods.condition.clone();
            }
        }
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::mechanics::Quantifier;
    use crate::parser::ParseOptions;

    fn ctx() -> ParseContext {
        ParseContext::new(ObjectKind::Character, ParseOptions::default())
    }

    #[test]
    fn splits_independent_actions_only() {
        assert_eq!(
            split_clauses("Exert chosen character and they can't ready at the start of their next turn"),
            vec!["Exert chosen character", "they can't ready at the start of their next turn"]
        );
        assert_eq!(
            split_clauses("Banish chosen character and chosen item"),
            vec!["Banish chosen character and chosen item"]
        );
        assert_eq!(
            split_clauses("Draw a card, then choose and discard a card"),
            vec!["Draw a card", "choose and discard a card"]
        );
        assert_eq!(
            split_clauses("Chosen character gets +2 {S} and gains Evasive this turn"),
            vec!["Chosen character gets +2 {S}", "gains Evasive this turn"]
        );
        assert_eq!(
            split_clauses("Deal 2 damage to chosen character and 1 damage to another chosen character"),
            vec!["Deal 2 damage to chosen character", "1 damage to another chosen character"]
        );
    }

    #[test]
    fn elliptical_clause_reuses_previous_verb() {
        let steps = decompose(
            "Deal 2 damage to chosen character and 1 damage to another chosen character.",
            &ctx(),
        );
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.kind == EffectKind::Damage));
        assert!(steps.iter().all(|s| s.additional_targets.is_empty()));
        assert_eq!(steps[0].amount, Some(Amount::Exact(2)));
        assert_eq!(steps[1].amount, Some(Amount::Exact(1)));
    }

    #[test]
    fn lore_loss_keeps_sign_for_up_to() {
        let steps = decompose("Each opponent loses up to 2 lore.", &ctx());
        assert_eq!(steps[0].kind, EffectKind::LoreChange);
        assert_eq!(steps[0].amount, Some(Amount::UpTo(-2)));
        let steps = decompose("You gain up to 2 lore.", &ctx());
        assert_eq!(steps[0].amount, Some(Amount::UpTo(2)));
    }

    #[test]
    fn amounts() {
        assert_eq!(parse_amount("up to 2"), Some(Amount::UpTo(2)));
        assert_eq!(parse_amount("a"), Some(Amount::Exact(1)));
        assert_eq!(parse_amount("-1"), Some(Amount::Exact(-1)));
        assert_eq!(parse_amount("all"), Some(Amount::All));
    }

    #[test]
    fn shared_trailing_duration() {
        let steps = decompose("Chosen character gets +2 {S} and gains Evasive this turn.", &ctx());
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.duration == Duration::ThisTurn));
        assert_eq!(steps[1].target.quantifier, Quantifier::Previous);
    }

    #[test]
    fn most_specific_pattern_wins() {
        let steps = decompose("Chosen character can't quest unless you pay 2 {I}.", &ctx());
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            steps[0].kind,
            EffectKind::Restriction {
                action: GameAction::Quest,
                mode: RestrictionMode::Cannot
            }
        ));
        assert_eq!(steps[0].note.as_deref(), Some("unless you pay 2 {I}"));
    }

    #[test]
    fn strict_mode_skips_unknown_clauses() {
        let strict = ParseContext::new(
            ObjectKind::Character,
            ParseOptions {
                strict: true,
                ..ParseOptions::default()
            },
        );
        assert!(decompose("Sing a sea shanty loudly.", &strict).is_empty());
        let steps = decompose("Sing a sea shanty loudly.", &ctx());
        assert_eq!(steps.len(), 1);
        assert!(steps[0].is_opaque());
    }
}

use serde::{Deserialize, Serialize};

/// A printed stat on a character or location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Willpower,
    Lore,
}

/// Zones a card can sit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Play,
    Hand,
    Deck,
    Discard,
    Inkwell,
}

/// Where in the deck a card is put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckPosition {
    Top,
    Bottom,
    Shuffled,
}

/// The kind of game object a selector picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Character,
    Item,
    Location,
    Action,
    /// Any card, typically in a hidden zone.
    Card,
    Player,
}

/// Whose objects a selector may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    You,
    Opponent,
    #[default]
    Any,
}

/// How many of the matching objects are affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    /// The source card itself.
    This,
    /// Exactly N chosen objects.
    Chosen(u32),
    /// Between 0 and N chosen objects.
    UpTo(u32),
    /// Each matching object, one at a time.
    Each,
    /// All matching objects at once.
    All,
    /// Whatever an earlier step of the same ability picked ("they", "that character").
    Previous,
}

/// Attribute used by a numeric filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Cost,
    Strength,
    Willpower,
    Lore,
    Damage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtMost,
    AtLeast,
    Exactly,
}

/// Numeric filter such as "with cost 3 or less".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bound {
    pub attribute: Attribute,
    pub comparison: Comparison,
    pub value: u32,
}

/// Which objects an effect step applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSelector {
    pub quantifier: Quantifier,
    pub owner: Owner,
    /// Allowed object kinds. Empty means any.
    pub kinds: Vec<ObjectKind>,
    /// Classification filters ("Hero", "Song").
    pub traits: Vec<String>,
    /// "named X" filter.
    pub name: Option<String>,
    /// "other"/"another": never the source itself.
    pub exclude_self: bool,
    pub bound: Option<Bound>,
    pub damaged: Option<bool>,
    pub exerted: Option<bool>,
    /// Zone the objects are picked from when it is not the play area.
    pub zone: Option<Zone>,
    /// Qualifier text the selector parser could not interpret.
    pub qualifier: Option<String>,
}

impl TargetSelector {
    pub fn new(quantifier: Quantifier) -> Self {
        TargetSelector {
            quantifier,
            owner: Owner::Any,
            kinds: Vec::new(),
            traits: Vec::new(),
            name: None,
            exclude_self: false,
            bound: None,
            damaged: None,
            exerted: None,
            zone: None,
            qualifier: None,
        }
    }

    /// The source card.
    pub fn this(kind: ObjectKind) -> Self {
        Self::new(Quantifier::This).with_kind(kind)
    }

    /// One chosen object of the given kind.
    pub fn chosen(kind: ObjectKind) -> Self {
        Self::new(Quantifier::Chosen(1)).with_kind(kind)
    }


    /// The controller of the ability.
    pub fn you() -> Self {
        Self::player(Quantifier::Each, Owner::You)
    }

    pub fn each_opponent() -> Self {
        Self::player(Quantifier::Each, Owner::Opponent)
    }

    pub fn player(quantifier: Quantifier, owner: Owner) -> Self {
        let mut selector = Self::new(quantifier).with_kind(ObjectKind::Player);
        selector.owner = owner;
        selector
    }

    pub fn with_kind(mut self, kind: ObjectKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    pub fn excluding_self(mut self) -> Self {
        self.exclude_self = true;
        self
    }

    pub fn is_player(&self) -> bool {
        self.kinds == [ObjectKind::Player]
    }

    pub fn is_this(&self) -> bool {
        self.quantifier == Quantifier::This
    }

    /// A back-reference to the objects this selector picked.
    pub fn as_previous(&self) -> Self {
        let mut selector = self.clone();
        selector.quantifier = Quantifier::Previous;
        selector
    }
}

/// Size of an effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Amount {
    /// A literal amount; signed for stat and lore changes.
    Exact(i32),
    /// Any amount from 0 to N, controller's choice. Negative for losses
    /// ("loses up to 2 lore" is `UpTo(-2)`).
    UpTo(i32),
    All,
    /// `per` for each counted thing ("+1 {S} for each other character").
    PerEach { per: i32, counted: String },
    /// An amount computed at resolution ("equal to their {S}").
    Variable(String),
}

impl Amount {
    pub fn is_up_to(&self) -> bool {
        matches!(self, Amount::UpTo(_))
    }
}

/// How long an effect lasts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    /// Until the affected object changes zone, or forever for one-shot effects.
    #[default]
    Permanent,
    ThisTurn,
    UntilStartOfYourNextTurn,
    /// During the affected player's next turn.
    TheirNextTurn,
    /// Any other explicit end condition, as printed.
    Until(String),
}

/// A guard that gates a trigger or an effect at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    DuringYourTurn,
    DuringOpponentsTurn,
    ThisHasNoDamage,
    ThisIsDamaged,
    ThisIsExerted,
    ThisAtLocation,
    YouHaveCharacterNamed(String),
    YourHandIsEmpty,
    /// The previous optional step was performed.
    IfYouDo,
    /// Condition kept as printed.
    Text(String),
}

/// Keyword abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Alert,
    Bodyguard,
    Boost,
    Challenger,
    Evasive,
    Reckless,
    Resist,
    Rush,
    Shift,
    Singer,
    SingTogether,
    Support,
    Vanish,
    Ward,
}

impl Keyword {
    pub const ALL: [Keyword; 14] = [
        Keyword::Alert,
        Keyword::Bodyguard,
        Keyword::Boost,
        Keyword::Challenger,
        Keyword::Evasive,
        Keyword::Reckless,
        Keyword::Resist,
        Keyword::Rush,
        Keyword::Shift,
        Keyword::Singer,
        Keyword::SingTogether,
        Keyword::Support,
        Keyword::Vanish,
        Keyword::Ward,
    ];

    /// Printed name.
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Alert => "Alert",
            Keyword::Bodyguard => "Bodyguard",
            Keyword::Boost => "Boost",
            Keyword::Challenger => "Challenger",
            Keyword::Evasive => "Evasive",
            Keyword::Reckless => "Reckless",
            Keyword::Resist => "Resist",
            Keyword::Rush => "Rush",
            Keyword::Shift => "Shift",
            Keyword::Singer => "Singer",
            Keyword::SingTogether => "Sing Together",
            Keyword::Support => "Support",
            Keyword::Vanish => "Vanish",
            Keyword::Ward => "Ward",
        }
    }

    /// Case-insensitive lookup by printed name.
    pub fn from_name(name: &str) -> Option<Keyword> {
        let name = name.trim();
        Keyword::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Whether the keyword is printed with a number.
    pub fn takes_value(&self) -> bool {
        matches!(
            self,
            Keyword::Boost
                | Keyword::Challenger
                | Keyword::Resist
                | Keyword::Shift
                | Keyword::Singer
                | Keyword::SingTogether
        )
    }
}

/// Game actions a restriction can forbid, require or permit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameAction {
    Quest,
    Challenge,
    BeChallenged,
    Ready,
    SingSongs,
    Move,
    ChallengeReadyCharacters,
    /// Anything else, as printed.
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionMode {
    /// "can't"
    Cannot,
    /// "must"
    Must,
    /// "can", a permission beyond the normal rules.
    Can,
}

/// Structured representation of one atomic game action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    // ================================================================
    // STATS, DAMAGE AND LORE
    // ================================================================
    /// Signed change to a stat; the delta is the step amount.
    ModifyStat { stat: Stat },
    /// Deal damage.
    Damage,
    /// Remove damage.
    Heal,
    /// Move damage counters from the target onto `to`.
    MoveDamage { to: TargetSelector },
    /// Signed lore change for the target players.
    LoreChange,

    // ================================================================
    // CARD FLOW
    // ================================================================
    DrawCards,
    Discard { random: bool },
    /// Move cards between zones.
    MoveCard {
        from: Option<Zone>,
        to: Zone,
        position: Option<DeckPosition>,
        /// Inkwell cards enter exerted when printed so.
        exerted: bool,
    },
    LookAtCards,
    Reveal,
    /// Play a card outside the normal rules.
    PlayCard { free: bool },

    // ================================================================
    // BOARD STATE
    // ================================================================
    Banish,
    Exert,
    Ready,
    GrantKeyword { keyword: Keyword, value: Option<i32> },
    /// Grant a quoted ability.
    GrantAbility { text: String },
    Restriction { action: GameAction, mode: RestrictionMode },

    // ================================================================
    // COSTS
    // ================================================================
    /// Pay less ink for matching cards; the reduction is the step amount.
    CostReduction,
    /// Shift: play this card onto a same-named character for the step amount.
    ShiftPlay,

    // ================================================================
    // FALLBACK
    // ================================================================
    /// Text the decomposer could not interpret, kept verbatim.
    Opaque { text: String },
}

/// One atomic, typed game-state instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectStep {
    #[serde(flatten)]
    pub kind: EffectKind,
    pub target: TargetSelector,
    /// Further targets of the same step ("chosen character and chosen item").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_targets: Vec<TargetSelector>,
    pub amount: Option<Amount>,
    pub duration: Duration,
    /// "may": the controller can decline.
    pub optional: bool,
    pub condition: Option<Condition>,
    /// Unrecognised remainder of the clause.
    pub note: Option<String>,
}

impl EffectStep {
    pub fn new(kind: EffectKind, target: TargetSelector) -> Self {
        EffectStep {
            kind,
            target,
            additional_targets: Vec::new(),
            amount: None,
            duration: Duration::Permanent,
            optional: false,
            condition: None,
            note: None,
        }
    }

    /// Low-confidence step carrying raw text.
    pub fn opaque(text: &str) -> Self {
        EffectStep::new(
            EffectKind::Opaque {
                text: text.trim().to_string(),
            },
            TargetSelector::new(Quantifier::This),
        )
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.kind, EffectKind::Opaque { .. })
    }
}

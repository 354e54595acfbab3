use serde::{Deserialize, Serialize};

use super::mechanics::{Condition, EffectStep, Keyword, TargetSelector};

/// Ability shape as seen by the rules engine. Keywords compile into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityType {
    Static,
    Triggered,
    Activated,
}

/// One item of an activated ability's cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cost", rename_all = "snake_case")]
pub enum CostClause {
    /// The exert symbol.
    ExertSelf,
    PayInk { amount: u32 },
    BanishSelf,
    DiscardCard {
        count: u32,
        /// Restriction on the discarded card ("a song card").
        filter: Option<String>,
    },
    ExertOther { target: TargetSelector },
    BanishOther { target: TargetSelector },
    /// Cost token outside the known vocabulary, kept verbatim.
    Other { text: String },
}

/// Which side of a challenge the trigger watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeRole {
    Attacker,
    Defender,
}

/// Whose turn a turn-boundary trigger watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOwner {
    You,
    Opponent,
    Any,
}

/// The game event that fires a triggered ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TriggerEvent {
    Play,
    Quest,
    Challenge { role: ChallengeRole },
    Banished { in_challenge: bool },
    /// The subject banishes another character in a challenge.
    BanishesInChallenge,
    Ready,
    Exerted,
    Sing,
    MoveToLocation,
    DealtDamage,
    DrawCard,
    PutIntoInkwell,
    StartOfTurn { whose: TurnOwner },
    EndOfTurn { whose: TurnOwner },
    /// Trigger phrase outside the known vocabulary, kept verbatim.
    Other { text: String },
}

/// Trigger of a triggered ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    pub event: TriggerEvent,
    /// Who or what has to perform or undergo the event.
    pub subject: TargetSelector,
    /// Independent gate checked when the trigger resolves.
    pub guard: Option<Condition>,
    pub once_per_turn: bool,
}

/// The parser's unit of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Unique within the card, stable across re-parses.
    pub id: String,
    pub card_id: String,
    #[serde(rename = "type")]
    pub ability_type: AbilityType,
    /// Printed ability name, provenance only.
    pub name: Option<String>,
    /// Source keyword, provenance only.
    pub keyword: Option<Keyword>,
    pub raw_text: String,
    pub costs: Vec<CostClause>,
    pub trigger: Option<TriggerDescriptor>,
    pub effects: Vec<EffectStep>,
}

impl AbilityDefinition {
    /// True when any step fell back to raw text.
    pub fn is_low_confidence(&self) -> bool {
        self.effects.iter().any(EffectStep::is_opaque)
    }
}

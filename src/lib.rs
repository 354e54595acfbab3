pub mod data;
pub mod effects;
pub mod error;
pub mod parser;
pub mod bridge;

pub use effects::ability::AbilityDefinition;
pub use error::{CardError, LoadError};
pub use parser::{parse_card, parse_card_with, CardParse, ParseOptions};

#[cfg(feature = "python")]
pub use bridge::pymodule::lorcana_ability_parser;

pub mod card;
pub mod loader;

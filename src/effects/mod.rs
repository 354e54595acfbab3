pub mod ability;
pub mod mechanics;
pub mod registry;

//! Catalog entities

mod character;
mod journey_event;

pub use character::{
    Character, CharacterKind, CharacterVisual, Faction, DEFAULT_POWER, MAX_RANK,
};
pub use journey_event::{EventKind, JourneyEvent};

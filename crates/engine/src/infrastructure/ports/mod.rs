//! Port traits for infrastructure boundaries.
//!
//! Storage and time are the only abstractions in the engine; everything
//! else is concrete.

mod error;
mod repos;

pub use error::RepoError;
pub use repos::{CharacterRepo, ClockPort, EventRepo};

#[cfg(test)]
pub use repos::{MockCharacterRepo, MockClockPort, MockEventRepo};

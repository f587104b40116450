//! Infrastructure - port definitions and their adapters.

pub mod cache;
pub mod clock;
pub mod ports;
pub mod sqlite;

//! Starmap Engine library.
//!
//! The content service behind the star map: SQLite catalog storage, cached
//! catalog queries and the HTTP API.
//!
//! ## Structure
//!
//! - `infrastructure/` - port traits and their adapters (SQLite, clock, cache)
//! - `use_cases/` - catalog and layout orchestration
//! - `api/` - HTTP entry points
//! - `app` - application composition
//! - `config` - environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
pub use config::EngineConfig;

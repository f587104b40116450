//! Starmap domain: catalog entities, layout generators, scene graph,
//! navigation and performance state.
//!
//! Nothing in this crate performs I/O. Storage and HTTP live in
//! `starmap-engine`; rendering is reached through [`scene::RenderBackend`].

pub mod catalog;
pub mod entities;
pub mod error;
pub mod ids;
pub mod layout;
pub mod navigation;
pub mod performance;
pub mod scene;
pub mod session;
pub mod value_objects;

pub use catalog::{Catalog, CatalogState, CatalogStats, CharacterQuery, PowerDistribution};
pub use entities::{Character, CharacterKind, CharacterVisual, EventKind, Faction, JourneyEvent};
pub use error::DomainError;
pub use ids::{CharacterId, EventIndex, SessionId};
pub use layout::{GeneratedPoint, LayoutSeed, PointSource};
pub use navigation::{NavigationConfig, NavigationState, Page, RelevanceTicket, View};
pub use performance::{DeviceCapabilities, PerformanceConfig, PerformanceMonitor, PerformanceSample};
pub use scene::{RenderBackend, SceneBuilder, SceneGraph, SceneParams};
pub use session::{SessionConfig, ViewerSession};
pub use value_objects::{
    CelestialBody, QualityProfile, QualityTier, Relationship, RelationshipKind, Rgb, TierThresholds,
    Vec3,
};

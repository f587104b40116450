//! Value objects shared by the catalog, generators and scene graph.

mod celestial;
mod color;
mod palette;
mod quality;
mod relationship;
mod vector;

pub use celestial::CelestialBody;
pub use color::Rgb;
pub use palette::{network_palettes, theme_count, themes, Palette};
pub use quality::{QualityProfile, QualityTier, TierThresholds};
pub use relationship::{Relationship, RelationshipKind};
pub use vector::Vec3;

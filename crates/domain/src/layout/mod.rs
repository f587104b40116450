//! Procedural layout generators
//!
//! Every generator is a pure function of an explicit config struct and a
//! [`LayoutSeed`]. Identical inputs always yield identical output, which is
//! what lets the scene cache and the tests compare layouts directly.
//! Out-of-range config values are clamped (`clamped()`), never rejected.

mod event_cast;
mod formation;
mod galaxy;
mod journey;
mod network;
mod spiral;
mod starfield;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, EventIndex};
use crate::value_objects::{Rgb, Vec3};

pub use event_cast::{
    event_character_nodes, EventCastNode, EVENT_CAST_HEIGHT, EVENT_CAST_RADIUS,
    UNRESOLVED_COLOR, UNRESOLVED_EMISSIVE, UNRESOLVED_SIZE,
};
pub use formation::{
    faction_group, formation_nodes, CharacterNode, FormationConfig, FormationKind,
    FACTION_CENTERS,
};
pub use galaxy::{fog_particles, generate_galaxy, GalaxyConfig, Planet};
pub use journey::{journey_color, journey_path, JourneyConfig, JourneyPoint};
pub use network::{
    generate_network, NetworkConnection, NetworkFormation, NetworkGraph, NetworkNode, NodeRole,
};
pub use spiral::{SpiralArmConfig, SpiralArms};
pub use starfield::{
    generate_star_field, twinkle_offset, Star, StarFieldConfig, StarFieldShape,
};

/// Explicit seed threaded through every randomized generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutSeed(pub u64);

impl LayoutSeed {
    pub fn rng(self) -> StdRng {
        StdRng::seed_from_u64(self.0)
    }

    /// Independent stream for a sub-generator, so adding one layer does not
    /// shift the random sequence of another.
    pub fn derive(self, salt: u64) -> LayoutSeed {
        // splitmix64 finalizer
        let mut z = self.0 ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        LayoutSeed(z ^ (z >> 31))
    }
}

/// Back-reference from a point to the record it represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum PointSource {
    Character(CharacterId),
    Event(EventIndex),
}

/// One renderable point produced by a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPoint {
    pub position: Vec3,
    pub color: Rgb,
    pub size: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PointSource>,
}

impl GeneratedPoint {
    pub fn new(position: Vec3, color: Rgb, size: f32) -> Self {
        Self {
            position,
            color,
            size,
            source: None,
        }
    }

    pub fn with_source(mut self, source: PointSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// Uniform sample in `[-half, half)`.
pub(crate) fn spread(rng: &mut impl rand::Rng, half: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * half
}

//! Character formations: catalog characters placed as glowing nodes.

use std::f32::consts::{PI, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GeneratedPoint, LayoutSeed, PointSource};
use crate::entities::{Character, CharacterKind};
use crate::ids::CharacterId;
use crate::value_objects::{CelestialBody, Palette, Vec3};

/// Cluster centres for the factions formation, by [`faction_group`].
pub const FACTION_CENTERS: [Vec3; 4] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(20.0, 10.0, 0.0),
    Vec3::new(0.0, -10.0, 0.0),
    Vec3::new(0.0, 10.0, 20.0),
];

const HEAVEN_LAYERS: usize = 9;
const HEAVEN_LAYER_HEIGHT: f32 = 8.0;
const JOURNEY_LENGTH: f32 = 60.0;
const JOURNEY_RADIUS: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormationKind {
    #[default]
    Galaxy,
    NineHeavens,
    Journey,
    Factions,
}

impl FormationKind {
    pub const ALL: [FormationKind; 4] = [
        Self::Galaxy,
        Self::NineHeavens,
        Self::Journey,
        Self::Factions,
    ];

    /// Wraps out-of-range indices.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Galaxy => "银河系螺旋",
            Self::NineHeavens => "九重天分层",
            Self::Journey => "取经路线",
            Self::Factions => "势力阵营",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormationConfig {
    /// Fraction of the cast to show, `(0, 1]`
    pub density: f32,
    pub base_size: f32,
    pub size_per_importance: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            base_size: 0.8,
            size_per_importance: 1.2,
        }
    }
}

impl FormationConfig {
    pub fn clamped(&self) -> Self {
        Self {
            density: self.density.clamp(0.0, 1.0),
            base_size: self.base_size.max(0.0),
            size_per_importance: self.size_per_importance.max(0.0),
        }
    }

    pub fn node_count(&self, characters: usize) -> usize {
        (characters as f32 * self.clamped().density).floor() as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterNode {
    pub id: CharacterId,
    pub point: GeneratedPoint,
    pub importance: f32,
}

/// Coarse four-way grouping shared by palettes and faction clusters.
pub fn faction_group(kind: CharacterKind) -> usize {
    match kind {
        CharacterKind::Protagonist => 0,
        CharacterKind::Deity
        | CharacterKind::Celestial
        | CharacterKind::Buddhist
        | CharacterKind::Immortal => 1,
        CharacterKind::Demon | CharacterKind::Antagonist => 2,
        _ => 3,
    }
}

fn default_orbit(kind: CharacterKind) -> CelestialBody {
    match kind {
        CharacterKind::Protagonist => CelestialBody::Earth,
        CharacterKind::Buddhist => CelestialBody::Mercury,
        CharacterKind::Deity | CharacterKind::Celestial => CelestialBody::Saturn,
        CharacterKind::Immortal => CelestialBody::Uranus,
        CharacterKind::Demon | CharacterKind::Antagonist => CelestialBody::Mars,
        _ => CelestialBody::Neptune,
    }
}

/// Place the first `floor(len * density)` characters in `kind`'s shape.
pub fn formation_nodes(
    kind: FormationKind,
    characters: &[Character],
    config: &FormationConfig,
    palette: &Palette,
    seed: LayoutSeed,
) -> Vec<CharacterNode> {
    let c = config.clamped();
    let count = c.node_count(characters.len());
    let mut rng = seed.rng();
    let n = count as f32;
    let per_layer = count.div_ceil(HEAVEN_LAYERS).max(1);

    characters
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, character)| {
            let importance = character.importance();
            let fi = i as f32;
            let position = match kind {
                FormationKind::Galaxy => {
                    let orbit = character
                        .celestial
                        .unwrap_or_else(|| default_orbit(character.kind))
                        .orbit_radius();
                    let radius = orbit + (1.0 - importance) * 3.0;
                    let angle = (i % 4) as f32 * PI * 0.5 + fi / n * PI * 6.0;
                    Vec3::new(angle.cos() * radius, (fi * 0.1).sin() * 2.0, angle.sin() * radius)
                }
                FormationKind::NineHeavens => {
                    let layer = (((1.0 - importance) * HEAVEN_LAYERS as f32).floor() as usize)
                        .min(HEAVEN_LAYERS - 1);
                    let angle = (i % per_layer) as f32 / per_layer as f32 * TAU;
                    let radius = 5.0 + layer as f32 * 3.0;
                    let height = (HEAVEN_LAYERS - layer - 1) as f32 * HEAVEN_LAYER_HEIGHT
                        - HEAVEN_LAYERS as f32 * HEAVEN_LAYER_HEIGHT / 2.0;
                    Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
                }
                FormationKind::Journey => {
                    let t = if count > 1 { fi / (n - 1.0) } else { 0.0 };
                    let angle = t * PI * 4.0;
                    let radius = JOURNEY_RADIUS * (1.0 - t * 0.3);
                    Vec3::new(
                        angle.cos() * radius,
                        angle.sin() * radius,
                        (t - 0.5) * JOURNEY_LENGTH,
                    )
                }
                FormationKind::Factions => {
                    let center = FACTION_CENTERS[faction_group(character.kind)];
                    let angle = fi / n * TAU;
                    let radius = 3.0 + rng.gen::<f32>() * 5.0;
                    center
                        + Vec3::new(
                            angle.cos() * radius,
                            (rng.gen::<f32>() - 0.5) * 4.0,
                            angle.sin() * radius,
                        )
                }
            };

            let color = palette.color(faction_group(character.kind));
            let size = c.base_size + importance * c.size_per_importance;
            CharacterNode {
                id: character.id.clone(),
                point: GeneratedPoint::new(position, color, size)
                    .with_source(PointSource::Character(character.id.clone())),
                importance,
            }
        })
        .collect()
}

//! Background stars: a cube of distant points or a spherical shell.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{spread, GeneratedPoint, LayoutSeed};
use crate::value_objects::{QualityTier, Rgb, Vec3};

const BLUE_TINT: Rgb = Rgb::new(0.8, 0.8, 1.0);
const YELLOW_TINT: Rgb = Rgb::new(1.0, 1.0, 0.7);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum StarFieldShape {
    /// Uniform in a cube of side `spread` centred on the origin
    Cube { spread: f32 },
    /// Uniform over directions, radius uniform in `[min_radius, max_radius]`
    #[serde(rename_all = "camelCase")]
    Shell { min_radius: f32, max_radius: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StarFieldConfig {
    pub count: usize,
    pub shape: StarFieldShape,
    pub size: f32,
    pub opacity: f32,
    /// Vertical twinkle excursion in scene units
    pub twinkle_amplitude: f32,
    /// Twinkle phase advance per millisecond
    pub twinkle_speed: f32,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            shape: StarFieldShape::Cube { spread: 2000.0 },
            size: 0.7,
            opacity: 0.8,
            twinkle_amplitude: 2.0,
            twinkle_speed: 0.001,
        }
    }
}

impl StarFieldConfig {
    pub const MAX_STARS: usize = 100_000;

    /// Close shell used behind the network formations.
    pub fn shell() -> Self {
        Self {
            count: 5000,
            shape: StarFieldShape::Shell {
                min_radius: 40.0,
                max_radius: 120.0,
            },
            size: 0.15,
            twinkle_amplitude: 0.0,
            ..Self::default()
        }
    }

    pub fn for_tier(tier: QualityTier) -> Self {
        Self {
            count: tier.profile().star_count,
            ..Self::default()
        }
    }

    pub fn clamped(&self) -> Self {
        let shape = match self.shape {
            StarFieldShape::Cube { spread } => StarFieldShape::Cube {
                spread: spread.max(0.0),
            },
            StarFieldShape::Shell {
                min_radius,
                max_radius,
            } => {
                let min_radius = min_radius.max(0.0);
                StarFieldShape::Shell {
                    min_radius,
                    max_radius: max_radius.max(min_radius),
                }
            }
        };
        Self {
            count: self.count.min(Self::MAX_STARS),
            shape,
            size: self.size.max(0.0),
            opacity: self.opacity.clamp(0.0, 1.0),
            twinkle_amplitude: self.twinkle_amplitude.max(0.0),
            twinkle_speed: self.twinkle_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Star {
    pub position: Vec3,
    pub color: Rgb,
    /// Phase offset so neighbouring stars do not twinkle in lockstep
    pub twinkle_phase: f32,
}

impl Star {
    pub fn to_point(&self, size: f32) -> GeneratedPoint {
        GeneratedPoint::new(self.position, self.color, size)
    }
}

/// Vertical displacement of star `index` at `time_ms`.
pub fn twinkle_offset(config: &StarFieldConfig, time_ms: f64, index: usize, phase: f32) -> f32 {
    let t = (time_ms * f64::from(config.twinkle_speed)) as f32;
    (t + index as f32 * 0.01 + phase).sin() * config.twinkle_amplitude
}

pub fn generate_star_field(config: &StarFieldConfig, seed: LayoutSeed) -> Vec<Star> {
    let c = config.clamped();
    let mut rng = seed.rng();

    (0..c.count)
        .map(|_| {
            let position = match c.shape {
                StarFieldShape::Cube { spread: side } => Vec3::new(
                    spread(&mut rng, side / 2.0),
                    spread(&mut rng, side / 2.0),
                    spread(&mut rng, side / 2.0),
                ),
                StarFieldShape::Shell {
                    min_radius,
                    max_radius,
                } => {
                    let r = min_radius + rng.gen::<f32>() * (max_radius - min_radius);
                    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
                    let theta = TAU * rng.gen::<f32>();
                    Vec3::new(
                        r * phi.sin() * theta.cos(),
                        r * phi.sin() * theta.sin(),
                        r * phi.cos(),
                    )
                }
            };
            let roll: f32 = rng.gen();
            let color = if roll < 0.1 {
                BLUE_TINT
            } else if roll < 0.2 {
                YELLOW_TINT
            } else {
                Rgb::WHITE
            };
            Star {
                position,
                color,
                twinkle_phase: rng.gen::<f32>() * 100.0,
            }
        })
        .collect()
}

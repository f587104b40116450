//! Planet galaxy: power-law radial density on logarithmic spiral arms.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{spread, GeneratedPoint, LayoutSeed};
use crate::value_objects::{QualityTier, Rgb, Vec3};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalaxyConfig {
    pub planet_count: usize,
    pub galaxy_radius: f32,
    pub arm_count: usize,
    pub arm_tightness: f32,
    pub arm_width: f32,
    pub wave_amplitude: f32,
    pub wave_frequency: f32,
    pub max_emissive: f32,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            planet_count: 8000,
            galaxy_radius: 50.0,
            arm_count: 3,
            arm_tightness: 8.0,
            arm_width: 1.2,
            wave_amplitude: 1.8,
            wave_frequency: 0.4,
            max_emissive: 0.2,
        }
    }
}

impl GalaxyConfig {
    pub const MAX_PLANETS: usize = 50_000;

    /// Default shape with the planet budget of `tier`.
    pub fn for_tier(tier: QualityTier) -> Self {
        Self {
            planet_count: tier.profile().planet_count,
            ..Self::default()
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            planet_count: self.planet_count.min(Self::MAX_PLANETS),
            galaxy_radius: self.galaxy_radius.max(1.0),
            arm_count: self.arm_count.max(1),
            arm_width: self.arm_width.max(0.0),
            max_emissive: self.max_emissive.clamp(0.0, 1.0),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub position: Vec3,
    pub color: Rgb,
    /// Sphere radius of the planet itself
    pub radius: f32,
    pub emissive: f32,
    pub distance_from_center: f32,
    pub angle: f32,
    pub arm: usize,
    wave_amplitude: f32,
    wave_frequency: f32,
}

impl Planet {
    fn place(r: f32, angle: f32, amplitude: f32, frequency: f32) -> Vec3 {
        Vec3::new(
            r * angle.cos(),
            amplitude * (frequency * r + angle).sin(),
            r * angle.sin(),
        )
    }

    /// Angular speed falls off with distance from the core.
    pub fn orbit_speed(&self) -> f32 {
        0.5 / (self.distance_from_center + 1.0)
    }

    /// Advance the orbit by `delta` seconds.
    pub fn orbit_step(&mut self, delta: f32) {
        self.angle += self.orbit_speed() * delta * 0.02;
        self.position = Self::place(
            self.distance_from_center,
            self.angle,
            self.wave_amplitude,
            self.wave_frequency,
        );
    }

    pub fn to_point(&self) -> GeneratedPoint {
        GeneratedPoint::new(self.position, self.color, self.radius)
    }
}

pub fn generate_galaxy(config: &GalaxyConfig, seed: LayoutSeed) -> Vec<Planet> {
    let c = config.clamped();
    let mut rng = seed.rng();

    (0..c.planet_count)
        .map(|_| {
            let r = rng.gen::<f32>().powi(2) * c.galaxy_radius;
            let arm = rng.gen_range(0..c.arm_count);
            let scatter = (rng.gen::<f32>() - 0.5) * c.arm_width / (r * 0.1 + 1.0);
            let angle =
                (r + 1.0).ln() * c.arm_tightness + arm as f32 * TAU / c.arm_count as f32 + scatter;
            let emissive = c.max_emissive * (1.0 - r / c.galaxy_radius).powi(2);
            let color = Rgb::new(rng.gen(), rng.gen(), rng.gen());
            let radius = rng.gen::<f32>() * 0.12 + 0.05;

            Planet {
                position: Planet::place(r, angle, c.wave_amplitude, c.wave_frequency),
                color,
                radius,
                emissive,
                distance_from_center: r,
                angle,
                arm,
                wave_amplitude: c.wave_amplitude,
                wave_frequency: c.wave_frequency,
            }
        })
        .collect()
}

/// One haze particle per planet, jittered within a 3-unit cube.
pub fn fog_particles(planets: &[Planet], seed: LayoutSeed) -> Vec<Vec3> {
    let mut rng = seed.rng();
    planets
        .iter()
        .map(|p| {
            p.position
                + Vec3::new(
                    spread(&mut rng, 1.5),
                    spread(&mut rng, 1.5),
                    spread(&mut rng, 1.5),
                )
        })
        .collect()
}

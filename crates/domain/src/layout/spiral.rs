use std::f32::consts::TAU;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{spread, GeneratedPoint, LayoutSeed};
use crate::value_objects::{Rgb, Vec3};

/// Logarithmic-looking spiral arms made of evenly indexed particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpiralArmConfig {
    /// 1..=32
    pub arm_count: usize,
    /// Capped at 100 000
    pub particles_per_arm: usize,
    /// Radius of the first particle of each arm (also the core size)
    pub base_radius: f32,
    /// Radius added per particle index
    pub radial_step: f32,
    /// Angle added per particle index (radians)
    pub angular_step: f32,
    /// Frequency of the sinusoidal angle perturbation, per index
    pub wobble_frequency: f32,
    /// Amplitude of the angle perturbation (radians), at most 1
    pub wobble_amplitude: f32,
    /// Elevation as a fraction of radius; 0 flattens the disc
    pub vertical_squash: f32,
    /// Random positional jitter; 0 keeps the layout fully analytic
    pub jitter: f32,
    pub point_size: f32,
    pub start_color: Rgb,
    pub end_color: Rgb,
    /// Radians per second applied by the scene's spin animation
    pub rotation_speed: f32,
}

impl Default for SpiralArmConfig {
    fn default() -> Self {
        Self {
            arm_count: 4,
            particles_per_arm: 1500,
            base_radius: 30.0,
            radial_step: 0.1,
            angular_step: 0.02,
            wobble_frequency: 0.05,
            wobble_amplitude: 0.5,
            vertical_squash: 0.2,
            jitter: 0.0,
            point_size: 0.7,
            start_color: Rgb::new(1.0, 0.8, 0.2),
            end_color: Rgb::new(0.4, 0.6, 1.0),
            rotation_speed: 0.1,
        }
    }
}

impl SpiralArmConfig {
    pub const MAX_ARMS: usize = 32;
    pub const MAX_PARTICLES_PER_ARM: usize = 100_000;

    pub fn clamped(&self) -> Self {
        Self {
            arm_count: self.arm_count.clamp(1, Self::MAX_ARMS),
            particles_per_arm: self.particles_per_arm.min(Self::MAX_PARTICLES_PER_ARM),
            base_radius: self.base_radius.max(0.0),
            radial_step: self.radial_step.max(0.0),
            wobble_amplitude: self.wobble_amplitude.clamp(0.0, 1.0),
            vertical_squash: self.vertical_squash.clamp(0.0, 1.0),
            jitter: self.jitter.max(0.0),
            point_size: self.point_size.max(0.0),
            ..self.clone()
        }
    }

    pub fn total(&self) -> usize {
        let c = self.clamped();
        c.arm_count * c.particles_per_arm
    }

    /// Lazy sequence of exactly `arm_count * particles_per_arm` points.
    pub fn points(&self, seed: LayoutSeed) -> SpiralArms {
        SpiralArms::new(self.clamped(), seed)
    }

    /// Color of particle `index` within an arm.
    pub fn color_at(&self, index: usize) -> Rgb {
        let n = self.particles_per_arm.max(1);
        self.start_color
            .lerp(self.end_color, index as f32 / n as f32)
    }

    fn point_at(&self, arm: usize, index: usize, rng: Option<&mut StdRng>) -> GeneratedPoint {
        let i = index as f32;
        let arm_offset = arm as f32 * TAU / self.arm_count as f32;
        let angle = arm_offset
            + i * self.angular_step
            + (i * self.wobble_frequency).sin() * self.wobble_amplitude;
        let radius = self.base_radius + i * self.radial_step;

        let mut position = Vec3::new(
            angle.cos() * radius,
            angle.sin() * radius * self.vertical_squash,
            angle.sin() * radius,
        );
        if let Some(rng) = rng {
            position = position
                + Vec3::new(
                    spread(rng, self.jitter),
                    spread(rng, self.jitter),
                    spread(rng, self.jitter),
                );
        }

        GeneratedPoint::new(position, self.color_at(index), self.point_size)
    }
}

/// Iterator over spiral-arm particles, arm by arm.
///
/// Cloning before iteration, or calling [`SpiralArms::restart`], yields the
/// identical sequence again.
#[derive(Debug, Clone)]
pub struct SpiralArms {
    config: SpiralArmConfig,
    seed: LayoutSeed,
    rng: Option<StdRng>,
    next: usize,
    total: usize,
}

impl SpiralArms {
    fn new(config: SpiralArmConfig, seed: LayoutSeed) -> Self {
        let total = config.arm_count * config.particles_per_arm;
        let rng = (config.jitter > 0.0).then(|| seed.rng());
        Self {
            config,
            seed,
            rng,
            next: 0,
            total,
        }
    }

    pub fn restart(&self) -> SpiralArms {
        SpiralArms::new(self.config.clone(), self.seed)
    }

    pub fn config(&self) -> &SpiralArmConfig {
        &self.config
    }
}

impl Iterator for SpiralArms {
    type Item = GeneratedPoint;

    fn next(&mut self) -> Option<GeneratedPoint> {
        if self.next >= self.total {
            return None;
        }
        let per_arm = self.config.particles_per_arm;
        let (arm, index) = (self.next / per_arm, self.next % per_arm);
        self.next += 1;
        Some(self.config.point_at(arm, index, self.rng.as_mut()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpiralArms {}

//! Expanding-ring pulses emitted from clicked points
//!
//! A fixed number of slots feed a shader uniform array. Idle slots are
//! parked far outside the scene with a start time in the distant past so
//! the shader never lights them.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Rgb, Vec3};

pub const IDLE_POSITION: Vec3 = Vec3::new(1000.0, 1000.0, 1000.0);
pub const IDLE_TIME: f32 = -1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PulseConfig {
    pub slots: usize,
    /// Ring growth in scene units per second
    pub speed: f32,
    /// Seconds
    pub lifetime: f32,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            slots: 3,
            speed: 15.0,
            lifetime: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pulse {
    pub origin: Vec3,
    pub color: Rgb,
    pub started_at: f32,
}

impl Pulse {
    const IDLE: Pulse = Pulse {
        origin: IDLE_POSITION,
        color: Rgb::WHITE,
        started_at: IDLE_TIME,
    };

    fn is_idle(&self) -> bool {
        self.started_at == IDLE_TIME
    }
}

#[derive(Debug, Clone)]
pub struct PulseField {
    config: PulseConfig,
    slots: Vec<Pulse>,
    /// Slot the next emission overwrites
    cursor: usize,
}

impl Default for PulseField {
    fn default() -> Self {
        Self::new(PulseConfig::default())
    }
}

impl PulseField {
    pub fn new(config: PulseConfig) -> Self {
        let config = PulseConfig {
            slots: config.slots.max(1),
            speed: config.speed.max(0.0),
            lifetime: config.lifetime.max(0.0),
        };
        Self {
            slots: vec![Pulse::IDLE; config.slots],
            cursor: 0,
            config,
        }
    }

    pub fn slots(&self) -> &[Pulse] {
        &self.slots
    }

    /// Starts a pulse at `now` (seconds). A free slot is used if one exists,
    /// otherwise the oldest pulse is replaced.
    pub fn emit(&mut self, origin: Vec3, now: f32, color: Rgb) -> usize {
        let slot = self
            .slots
            .iter()
            .position(Pulse::is_idle)
            .unwrap_or_else(|| self.oldest());
        self.slots[slot] = Pulse {
            origin,
            color,
            started_at: now,
        };
        self.cursor = (slot + 1) % self.slots.len();
        slot
    }

    fn oldest(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.started_at.total_cmp(&b.started_at))
            .map_or(self.cursor, |(i, _)| i)
    }

    fn is_live(&self, pulse: &Pulse, now: f32) -> bool {
        !pulse.is_idle() && now - pulse.started_at <= self.config.lifetime
    }

    /// Parks expired pulses.
    pub fn update(&mut self, now: f32) {
        let lifetime = self.config.lifetime;
        for pulse in &mut self.slots {
            if !pulse.is_idle() && now - pulse.started_at > lifetime {
                *pulse = Pulse::IDLE;
            }
        }
    }

    pub fn active_count(&self, now: f32) -> usize {
        self.slots.iter().filter(|p| self.is_live(p, now)).count()
    }

    pub fn radius(&self, pulse: &Pulse, now: f32) -> f32 {
        (now - pulse.started_at).max(0.0) * self.config.speed
    }

    /// Whether any live ring currently passes within `tolerance` of
    /// `position`.
    pub fn hits(&self, position: Vec3, now: f32, tolerance: f32) -> bool {
        self.slots.iter().filter(|p| self.is_live(p, now)).any(|p| {
            (p.origin.distance(position) - self.radius(p, now)).abs() <= tolerance
        })
    }

    /// Origins and start times in slot order, ready for a uniform upload.
    pub fn uniforms(&self) -> (Vec<[f32; 3]>, Vec<f32>) {
        self.slots
            .iter()
            .map(|p| (p.origin.to_array(), p.started_at))
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let field = PulseField::default();
        assert_eq!(field.slots().len(), 3);
        assert_eq!(field.active_count(0.0), 0);
        let (origins, times) = field.uniforms();
        assert!(origins.iter().all(|o| *o == [1000.0, 1000.0, 1000.0]));
        assert!(times.iter().all(|t| *t == IDLE_TIME));
    }

    #[test]
    fn fourth_pulse_replaces_the_oldest() {
        let mut field = PulseField::default();
        assert_eq!(field.emit(Vec3::ZERO, 1.0, Rgb::WHITE), 0);
        assert_eq!(field.emit(Vec3::ZERO, 1.5, Rgb::WHITE), 1);
        assert_eq!(field.emit(Vec3::ZERO, 2.0, Rgb::WHITE), 2);
        assert_eq!(field.emit(Vec3::new(5.0, 0.0, 0.0), 2.5, Rgb::WHITE), 0);
        assert_eq!(field.slots()[0].started_at, 2.5);
        assert_eq!(field.active_count(2.5), 3);
    }

    #[test]
    fn pulses_expire_after_lifetime() {
        let mut field = PulseField::default();
        field.emit(Vec3::ZERO, 0.0, Rgb::WHITE);
        field.update(2.9);
        assert_eq!(field.active_count(2.9), 1);
        field.update(3.5);
        assert_eq!(field.active_count(3.5), 0);
        assert_eq!(field.slots()[0].origin, IDLE_POSITION);
    }

    #[test]
    fn ring_hits_points_at_its_radius() {
        let mut field = PulseField::default();
        field.emit(Vec3::ZERO, 0.0, Rgb::WHITE);
        // 1 s at 15 units/s
        assert!(field.hits(Vec3::new(15.0, 0.0, 0.0), 1.0, 0.5));
        assert!(!field.hits(Vec3::new(5.0, 0.0, 0.0), 1.0, 0.5));
    }
}

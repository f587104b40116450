//! The pilgrimage path: one point per difficulty, spiralling inward.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::{GeneratedPoint, PointSource};
use crate::entities::{EventKind, JourneyEvent};
use crate::ids::EventIndex;
use crate::value_objects::{Rgb, Vec3};

const START_COLOR: u32 = 0x1E40AF;
const MID_COLOR: u32 = 0x7C3AED;
const END_COLOR: u32 = 0xF59E0B;
const DEEP_MEANING_BRIGHTEN: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JourneyConfig {
    /// 2..=81; one per difficulty
    pub point_count: usize,
    pub max_radius: f32,
    pub min_radius: f32,
    pub arm_tightness: f32,
    /// Which of four arms the path follows, 0..=3
    pub arm_index: usize,
    pub wave_height: f32,
    pub wave_frequency: f32,
    pub point_size: f32,
    pub emissive: f32,
    pub size_variation: f32,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            point_count: 81,
            max_radius: 50.0,
            min_radius: 3.0,
            arm_tightness: 8.0,
            arm_index: 0,
            wave_height: 0.0,
            wave_frequency: 0.8,
            point_size: 0.3,
            emissive: 0.5,
            size_variation: 0.3,
        }
    }
}

impl JourneyConfig {
    pub fn clamped(&self) -> Self {
        let min_radius = self.min_radius.max(0.0);
        Self {
            point_count: self.point_count.clamp(2, usize::from(EventIndex::LAST)),
            min_radius,
            max_radius: self.max_radius.max(min_radius),
            arm_index: self.arm_index % 4,
            point_size: self.point_size.max(0.0),
            emissive: self.emissive.clamp(0.0, 1.0),
            size_variation: self.size_variation.clamp(0.0, 1.0),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyPoint {
    pub point: GeneratedPoint,
    pub index: EventIndex,
    /// 0 at the start of the journey, 1 at the end
    pub progress: f32,
    pub emissive: f32,
    pub label: String,
    pub kind: EventKind,
    pub has_event: bool,
}

/// Three-stop gradient blue, purple, gold.
pub fn journey_color(progress: f32) -> Rgb {
    let (start, mid, end) = (
        Rgb::from_u32(START_COLOR),
        Rgb::from_u32(MID_COLOR),
        Rgb::from_u32(END_COLOR),
    );
    if progress < 0.5 {
        start.lerp(mid, progress * 2.0)
    } else {
        mid.lerp(end, (progress - 0.5) * 2.0)
    }
}

/// Lay out the journey; `events` may be empty, partial or unordered.
pub fn journey_path(config: &JourneyConfig, events: &[JourneyEvent]) -> Vec<JourneyPoint> {
    let c = config.clamped();
    let last = (c.point_count - 1) as f32;

    (0..c.point_count)
        .filter_map(|i| {
            let index = EventIndex::new(u8::try_from(i + 1).ok()?).ok()?;
            let progress = i as f32 / last;
            let radius = c.max_radius - progress * (c.max_radius - c.min_radius);
            let angle = (radius + 1.0).ln() * c.arm_tightness + c.arm_index as f32 * TAU / 4.0;
            let position = Vec3::new(
                radius * angle.cos(),
                c.wave_height * (c.wave_frequency * angle).sin(),
                radius * angle.sin(),
            );

            let event = events.iter().find(|e| e.index == index);
            let mut color = journey_color(progress);
            if event.is_some_and(JourneyEvent::has_deep_meaning) {
                color = color.scale(DEEP_MEANING_BRIGHTEN);
            }

            let base = c.point_size * (0.8 + 0.4 * (progress * PI).sin());
            let wobble = (progress * PI * 4.0).sin() * 0.3 + (progress * PI * 6.0).cos() * 0.2;
            let size = base * (1.0 + wobble * c.size_variation);

            Some(JourneyPoint {
                point: GeneratedPoint::new(position, color, size)
                    .with_source(PointSource::Event(index)),
                index,
                progress,
                emissive: c.emissive * (0.3 + 0.7 * progress),
                label: event
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| format!("第{}难", index.get())),
                kind: event.map_or_else(|| EventKind::placeholder(i), JourneyEvent::kind),
                has_event: event.is_some(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(n: u8) -> JourneyEvent {
        JourneyEvent::new(i64::from(n), EventIndex::new(n).expect("valid"), format!("难{n}"))
    }

    #[test]
    fn eighty_one_points_spiral_inward() {
        let points = journey_path(&JourneyConfig::default(), &[]);
        assert_eq!(points.len(), 81);
        assert_eq!(points[0].index.get(), 1);
        assert_eq!(points[80].index.get(), 81);
        assert!((points[0].point.position.length() - 50.0).abs() < 1e-3);
        assert!((points[80].point.position.length() - 3.0).abs() < 1e-3);
        assert_eq!(points[0].label, "第1难");
        assert!(!points[0].has_event);
    }

    #[test]
    fn gradient_endpoints() {
        assert_eq!(journey_color(0.0), Rgb::from_u32(START_COLOR));
        assert_eq!(journey_color(0.5), Rgb::from_u32(MID_COLOR));
        assert!(journey_color(1.0).max_channel_delta(Rgb::from_u32(END_COLOR)) < 1e-6);
    }

    #[test]
    fn emissive_ramps_up() {
        let points = journey_path(&JourneyConfig::default(), &[]);
        assert!((points[0].emissive - 0.15).abs() < 1e-6);
        assert!((points[80].emissive - 0.5).abs() < 1e-6);
        assert!(points.windows(2).all(|w| w[1].emissive >= w[0].emissive));
    }

    #[test]
    fn events_attach_by_index_and_brighten() {
        let deep = event(2).with_commentary("", "象征修行路上的重重考验与磨砺");
        let plain = event(3).with_description("妖怪拦路");
        let points = journey_path(&JourneyConfig::default(), &[plain, deep]);

        assert_eq!(points[1].label, "难2");
        assert!(points[1].has_event);
        let expected = journey_color(points[1].progress).scale(DEEP_MEANING_BRIGHTEN);
        assert_eq!(points[1].point.color, expected);

        assert_eq!(points[2].kind, EventKind::Demon);
        assert_eq!(points[2].point.color, journey_color(points[2].progress));
        assert_eq!(
            points[2].point.source,
            Some(PointSource::Event(EventIndex::new(3).expect("valid")))
        );
    }

    #[test]
    fn degenerate_counts_are_clamped() {
        let config = JourneyConfig {
            point_count: 500,
            ..JourneyConfig::default()
        };
        assert_eq!(journey_path(&config, &[]).len(), 81);
        let config = JourneyConfig {
            point_count: 0,
            ..JourneyConfig::default()
        };
        assert_eq!(journey_path(&config, &[]).len(), 2);
    }
}

//! Characters taking part in one journey event, placed on a ring.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GeneratedPoint, LayoutSeed, PointSource};
use crate::catalog::Catalog;
use crate::entities::JourneyEvent;
use crate::ids::CharacterId;
use crate::value_objects::{Rgb, Vec3};

pub const EVENT_CAST_RADIUS: f32 = 8.0;
/// Total vertical jitter; nodes sit within half of it above and below the ring.
pub const EVENT_CAST_HEIGHT: f32 = 2.0;

/// #CCCCCC
pub const UNRESOLVED_COLOR: Rgb = Rgb::new(0.8, 0.8, 0.8);
pub const UNRESOLVED_SIZE: f32 = 1.0;
pub const UNRESOLVED_EMISSIVE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCastNode {
    /// Catalog id, or `temp-{i}` when the name matched nobody.
    pub id: CharacterId,
    pub name: String,
    pub resolved: bool,
    pub emissive_intensity: f32,
    pub point: GeneratedPoint,
}

/// One node per name in `event.characters()`, in listed order. Names the
/// catalog cannot resolve still get a neutral placeholder node.
pub fn event_character_nodes(
    event: &JourneyEvent,
    catalog: &Catalog,
    seed: LayoutSeed,
) -> Vec<EventCastNode> {
    let names = event.characters();
    let count = names.len() as f32;
    let mut rng = seed.rng();

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let angle = i as f32 / count * TAU;
            let position = Vec3::new(
                angle.cos() * EVENT_CAST_RADIUS,
                (rng.gen::<f32>() - 0.5) * EVENT_CAST_HEIGHT,
                angle.sin() * EVENT_CAST_RADIUS,
            );
            match catalog.find_character_by_name(name) {
                Some(character) => EventCastNode {
                    id: character.id.clone(),
                    name: character.name.clone(),
                    resolved: true,
                    emissive_intensity: character.visual.emissive_intensity,
                    point: GeneratedPoint::new(
                        position,
                        character.visual.color,
                        character.visual.size,
                    )
                    .with_source(PointSource::Character(character.id.clone())),
                },
                None => EventCastNode {
                    id: CharacterId::new(format!("temp-{i}")),
                    name: name.to_string(),
                    resolved: false,
                    emissive_intensity: UNRESOLVED_EMISSIVE,
                    point: GeneratedPoint::new(position, UNRESOLVED_COLOR, UNRESOLVED_SIZE),
                },
            }
        })
        .collect()
}

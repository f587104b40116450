//! Hover state and tooltip placement

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, EventIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum HoverTarget {
    Character(CharacterId),
    Event(EventIndex),
}

/// Screen-space pointer position in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverState {
    pub target: Option<HoverTarget>,
    pub pointer: ScreenPoint,
}

/// Info-card geometry. Cards open below-right of the pointer and flip to
/// stay on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipLayout {
    pub width: f32,
    pub height: f32,
    pub offset: f32,
}

impl TooltipLayout {
    pub const CHARACTER_CARD: TooltipLayout = TooltipLayout {
        width: 320.0,
        height: 280.0,
        offset: 15.0,
    };

    pub const EVENT_CARD: TooltipLayout = TooltipLayout {
        width: 360.0,
        height: 320.0,
        offset: 15.0,
    };

    pub fn for_target(target: &HoverTarget) -> Self {
        match target {
            HoverTarget::Character(_) => Self::CHARACTER_CARD,
            HoverTarget::Event(_) => Self::EVENT_CARD,
        }
    }

    /// Top-left corner of the card for a pointer inside a `viewport` of
    /// (width, height).
    pub fn place(&self, pointer: ScreenPoint, viewport: (f32, f32)) -> ScreenPoint {
        let (vw, vh) = viewport;
        let mut left = pointer.x + self.offset;
        let mut top = pointer.y + self.offset;

        if left + self.width > vw {
            left = pointer.x - self.width - self.offset;
        }
        if top + self.height > vh {
            top = pointer.y - self.height - self.offset;
        }
        if left < 0.0 {
            left = self.offset;
        }
        if top < 0.0 {
            top = self.offset;
        }

        ScreenPoint::new(left, top)
    }
}

impl Default for TooltipLayout {
    fn default() -> Self {
        Self::CHARACTER_CARD
    }
}

use serde::{Deserialize, Serialize};

/// Orbit a character occupies in the galaxy formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialBody {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl CelestialBody {
    pub fn orbit_radius(&self) -> f32 {
        match self {
            Self::Sun => 0.0,
            Self::Mercury => 8.0,
            Self::Venus => 12.0,
            Self::Earth => 16.0,
            Self::Mars => 20.0,
            Self::Jupiter => 24.0,
            Self::Saturn => 28.0,
            Self::Uranus => 32.0,
            Self::Neptune => 36.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sun => "太阳中心",
            Self::Mercury => "水星-佛界",
            Self::Venus => "金星-观音净土",
            Self::Earth => "地球-取经团队",
            Self::Mars => "火星-妖魔世界",
            Self::Jupiter => "木星-妖王联盟",
            Self::Saturn => "土星-天庭众神",
            Self::Uranus => "天王星-道教仙人",
            Self::Neptune => "海王星-其他角色",
        }
    }
}

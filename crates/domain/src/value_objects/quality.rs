//! Rendering quality tiers and the per-tier budgets generators read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Discrete rendering-detail level. Ordered from cheapest to richest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
    Ultra,
}

/// Ordered fps boundaries. An average below `medium` is Low, below `high` is
/// Medium, below `ultra` is High, anything else Ultra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub medium: f32,
    pub high: f32,
    pub ultra: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium: 30.0,
            high: 45.0,
            ultra: 55.0,
        }
    }
}

impl TierThresholds {
    /// Sorts the boundaries so the mapping stays monotonic whatever the input.
    pub fn normalized(self) -> Self {
        let mut bounds = [self.medium, self.high, self.ultra];
        bounds.sort_by(f32::total_cmp);
        Self {
            medium: bounds[0],
            high: bounds[1],
            ultra: bounds[2],
        }
    }
}

/// Particle budgets and feature toggles for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityProfile {
    pub planet_count: usize,
    pub star_count: usize,
    pub fog: bool,
    pub bloom: bool,
    pub lod: bool,
    pub max_distance: f32,
    pub geometry_detail: u32,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [Self::Low, Self::Medium, Self::High, Self::Ultra];

    /// Map an average fps through the threshold table.
    pub fn from_fps(fps: f32, thresholds: &TierThresholds) -> Self {
        if fps < thresholds.medium {
            Self::Low
        } else if fps < thresholds.high {
            Self::Medium
        } else if fps < thresholds.ultra {
            Self::High
        } else {
            Self::Ultra
        }
    }

    pub fn profile(&self) -> QualityProfile {
        match self {
            Self::Low => QualityProfile {
                planet_count: 2000,
                star_count: 2000,
                fog: false,
                bloom: false,
                lod: true,
                max_distance: 100.0,
                geometry_detail: 8,
            },
            Self::Medium => QualityProfile {
                planet_count: 4000,
                star_count: 5000,
                fog: true,
                bloom: false,
                lod: true,
                max_distance: 150.0,
                geometry_detail: 12,
            },
            Self::High => QualityProfile {
                planet_count: 8000,
                star_count: 10000,
                fog: true,
                bloom: true,
                lod: true,
                max_distance: 200.0,
                geometry_detail: 16,
            },
            Self::Ultra => QualityProfile {
                planet_count: 15000,
                star_count: 15000,
                fog: true,
                bloom: true,
                lod: false,
                max_distance: 300.0,
                geometry_detail: 20,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            _ => Err(DomainError::parse(format!("Unknown quality tier: {s}"))),
        }
    }
}

//! Typed edges between catalog characters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::ids::CharacterId;

/// A directed relationship from the owning character to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub target: CharacterId,
    pub kind: RelationshipKind,
    /// Strength in `[0, 1]`
    pub strength: f32,
}

impl Relationship {
    pub fn new(target: CharacterId, kind: RelationshipKind, strength: f32) -> Self {
        Self {
            target,
            kind,
            strength: strength.clamp(0.0, 1.0),
        }
    }
}

/// Closed set of relationship kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    MasterDisciple,
    FellowDisciple,
    Family,
    Friend,
    Enemy,
    Colleague,
    Superior,
    Alliance,
    Buddhist,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 9] = [
        Self::MasterDisciple,
        Self::FellowDisciple,
        Self::Family,
        Self::Friend,
        Self::Enemy,
        Self::Colleague,
        Self::Superior,
        Self::Alliance,
        Self::Buddhist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MasterDisciple => "master_disciple",
            Self::FellowDisciple => "fellow_disciple",
            Self::Family => "family",
            Self::Friend => "friend",
            Self::Enemy => "enemy",
            Self::Colleague => "colleague",
            Self::Superior => "superior",
            Self::Alliance => "alliance",
            Self::Buddhist => "buddhist",
        }
    }

    /// Hostile edges are drawn in a warning color by clients.
    pub fn is_hostile(&self) -> bool {
        matches!(self, Self::Enemy)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "master_disciple" | "师徒" => Ok(Self::MasterDisciple),
            "fellow_disciple" | "师兄弟" => Ok(Self::FellowDisciple),
            "family" | "亲属" => Ok(Self::Family),
            "friend" | "朋友" => Ok(Self::Friend),
            "enemy" | "rival" | "敌对" => Ok(Self::Enemy),
            "colleague" | "同僚" => Ok(Self::Colleague),
            "superior" | "上下级" => Ok(Self::Superior),
            "alliance" | "ally" | "联盟" => Ok(Self::Alliance),
            "buddhist" | "佛门" => Ok(Self::Buddhist),
            _ => Err(DomainError::parse(format!("Unknown relationship kind: {s}"))),
        }
    }
}

//! Response payloads
//!
//! Records are flattened into the shapes browser clients already consume:
//! colors as `#rrggbb` strings, event fields under their storage names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use starmap_domain::layout::{EventCastNode, JourneyPoint, NetworkFormation, NetworkGraph, Planet};
use starmap_domain::{
    CatalogStats, Character, CharacterKind, EventIndex, Faction, JourneyEvent, QualityProfile,
    QualityTier, Vec3,
};

use crate::envelope::SOURCE_SQLITE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    pub verified: bool,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self {
            source: SOURCE_SQLITE.to_string(),
            last_modified: None,
            verified: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualDto {
    pub color: String,
    pub size: f32,
    pub emissive_intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDto {
    pub id: String,
    pub name: String,
    pub pinyin: Option<String>,
    pub aliases: Vec<String>,
    #[serde(rename = "type")]
    pub kind: CharacterKind,
    pub category: String,
    pub faction: Faction,
    pub rank: u32,
    pub power: u8,
    pub influence: u8,
    pub morality: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub chapters: Vec<u32>,
    pub first_appearance: Option<u32>,
    pub is_alias: bool,
    pub alias_of: Option<String>,
    pub visual: VisualDto,
    pub metadata: RecordMetadata,
}

impl From<&Character> for CharacterDto {
    fn from(c: &Character) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            pinyin: c.pinyin.clone(),
            aliases: c.aliases.clone(),
            kind: c.kind,
            category: c.category.clone(),
            faction: c.faction,
            rank: c.rank,
            power: c.power,
            influence: c.influence,
            morality: c.morality.clone(),
            description: c.description.clone(),
            tags: c.tags.clone(),
            chapters: c.chapters.clone(),
            first_appearance: c.first_appearance,
            is_alias: c.is_alias,
            alias_of: c.alias_of.as_ref().map(ToString::to_string),
            visual: VisualDto {
                color: c.visual.color.to_string(),
                size: c.visual.size,
                emissive_intensity: c.visual.emissive_intensity,
            },
            metadata: RecordMetadata::default(),
        }
    }
}

/// A difficulty as served to clients. Field names follow the event table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDto {
    pub id: i64,
    #[serde(rename = "nanci")]
    pub index: u8,
    #[serde(rename = "nanming")]
    pub name: String,
    #[serde(rename = "zhuyaorenwu")]
    pub main_characters: String,
    #[serde(rename = "didian")]
    pub location: String,
    #[serde(rename = "shijianmiaoshu")]
    pub description: String,
    #[serde(rename = "xiangzhengyi")]
    pub symbolism: String,
    #[serde(rename = "wenhuaneihan")]
    pub cultural_meaning: String,
    pub metadata: RecordMetadata,
}

impl From<&JourneyEvent> for EventDto {
    fn from(e: &JourneyEvent) -> Self {
        Self {
            id: e.id,
            index: e.index.get(),
            name: e.name.clone(),
            main_characters: e.main_characters.clone(),
            location: e.location.clone(),
            description: e.description.clone(),
            symbolism: e.symbolism.clone(),
            cultural_meaning: e.cultural_meaning.clone(),
            metadata: RecordMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    #[serde(flatten)]
    pub stats: CatalogStats,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteData {
    pub characters: Vec<CharacterDto>,
    pub aliases: Vec<CharacterDto>,
    pub stats: StatsDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub characters: u64,
    pub events: u64,
    pub uptime_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyLayout {
    pub points: Vec<JourneyPoint>,
    /// How many of the points have a stored event behind them
    pub populated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalaxyLayout {
    pub seed: u64,
    pub tier: QualityTier,
    pub profile: QualityProfile,
    pub planets: Vec<Planet>,
    /// Haze around the planets; empty when the tier has fog off.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fog: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLayout {
    pub seed: u64,
    pub formation: NetworkFormation,
    pub label: String,
    pub density: f32,
    pub graph: NetworkGraph,
}

/// Ring of characters for one difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCastLayout {
    pub nanci: EventIndex,
    pub nanming: String,
    pub nodes: Vec<EventCastNode>,
    pub resolved: usize,
}

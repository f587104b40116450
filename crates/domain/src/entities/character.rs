//! Character entity - a named figure in the catalog
//!
//! Characters are created by the data load (or the built-in sample set) and
//! never mutated afterwards. Kind, faction and visual parameters are derived
//! from the raw category tag at construction time so every consumer sees the
//! same mapping.

use serde::{Deserialize, Serialize};

use crate::ids::CharacterId;
use crate::value_objects::{CelestialBody, Relationship, Rgb};

/// Power used when the source record has none.
pub const DEFAULT_POWER: u8 = 50;
/// Rank at which a character reaches the minimum node size.
pub const MAX_RANK: u32 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub pinyin: Option<String>,
    pub aliases: Vec<String>,
    #[serde(rename = "type")]
    pub kind: CharacterKind,
    /// Raw category tag as stored
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
    pub alias_of: Option<CharacterId>,
    pub celestial: Option<CelestialBody>,
    pub relationships: Vec<Relationship>,
    pub visual: CharacterVisual,
}

impl Character {
    pub fn new(id: impl Into<CharacterId>, name: impl Into<String>, category: &str) -> Self {
        let mut character = Self {
            id: id.into(),
            name: name.into(),
            pinyin: None,
            aliases: Vec::new(),
            kind: CharacterKind::from_category(category),
            category: category.to_string(),
            faction: Faction::from_category(category, None),
            rank: 0,
            power: DEFAULT_POWER,
            influence: 0,
            morality: None,
            description: None,
            tags: Vec::new(),
            chapters: Vec::new(),
            first_appearance: None,
            is_alias: false,
            alias_of: None,
            celestial: None,
            relationships: Vec::new(),
            visual: CharacterVisual::default(),
        };
        character.refresh_visual();
        character
    }

    pub fn with_pinyin(mut self, pinyin: impl Into<String>) -> Self {
        self.pinyin = Some(pinyin.into());
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = rank;
        self.refresh_visual();
        self
    }

    /// Power is clamped to `0..=100`.
    pub fn with_power(mut self, power: i64) -> Self {
        self.power = power.clamp(0, 100) as u8;
        self.refresh_visual();
        self
    }

    pub fn with_influence(mut self, influence: i64) -> Self {
        self.influence = influence.clamp(0, 100) as u8;
        self
    }

    pub fn with_morality(mut self, morality: impl Into<String>) -> Self {
        self.morality = Some(morality.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_chapters(mut self, chapters: Vec<u32>) -> Self {
        self.chapters = chapters;
        self
    }

    pub fn with_first_appearance(mut self, chapter: u32) -> Self {
        self.first_appearance = Some(chapter);
        self
    }

    pub fn with_celestial(mut self, body: CelestialBody) -> Self {
        self.celestial = Some(body);
        self
    }

    /// Re-derive the faction using the secondary `level.category` attribute.
    pub fn with_level_category(mut self, level_category: Option<&str>) -> Self {
        self.faction = Faction::from_category(&self.category, level_category);
        self
    }

    pub fn as_alias_of(mut self, canonical: CharacterId) -> Self {
        self.is_alias = true;
        self.alias_of = Some(canonical);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Importance in `[0, 1]`, used by formations.
    pub fn importance(&self) -> f32 {
        f32::from(self.power) / 100.0
    }

    /// Case-insensitive match on name, pinyin or description.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        let hit = |field: &str| field.to_lowercase().contains(&needle);
        hit(&self.name)
            || self.pinyin.as_deref().is_some_and(hit)
            || self.description.as_deref().is_some_and(hit)
    }

    fn refresh_visual(&mut self) {
        self.visual = CharacterVisual::derive(&self.category, self.rank, self.power);
    }
}

/// Broad character type derived from the category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CharacterKind {
    Protagonist,
    Deity,
    Demon,
    Human,
    Dragon,
    Celestial,
    Buddhist,
    Underworld,
    Immortal,
    Antagonist,
    Alias,
}

impl CharacterKind {
    /// Unknown categories are treated as human.
    pub fn from_category(category: &str) -> Self {
        match category.trim() {
            "主角" | "protagonist" => Self::Protagonist,
            "神仙" | "deity" => Self::Deity,
            "妖魔" | "demon" => Self::Demon,
            "人类" | "human" => Self::Human,
            "龙族" | "dragon" => Self::Dragon,
            "天庭" | "celestial" => Self::Celestial,
            "佛教" | "buddhist" => Self::Buddhist,
            "地府" | "underworld" => Self::Underworld,
            "仙人" | "immortal" => Self::Immortal,
            "反派" | "antagonist" => Self::Antagonist,
            "别名" | "alias" => Self::Alias,
            _ => Self::Human,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protagonist => "PROTAGONIST",
            Self::Deity => "DEITY",
            Self::Demon => "DEMON",
            Self::Human => "HUMAN",
            Self::Dragon => "DRAGON",
            Self::Celestial => "CELESTIAL",
            Self::Buddhist => "BUDDHIST",
            Self::Underworld => "UNDERWORLD",
            Self::Immortal => "IMMORTAL",
            Self::Antagonist => "ANTAGONIST",
            Self::Alias => "ALIAS",
        }
    }

    /// Stable small integer used to pick palette entries.
    pub fn palette_slot(&self) -> usize {
        *self as usize
    }
}

/// Allegiance shown in the UI and used by the faction formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    #[serde(rename = "取经团队")]
    Pilgrims,
    #[serde(rename = "佛教")]
    Buddhist,
    #[serde(rename = "天庭")]
    Heaven,
    #[serde(rename = "妖魔")]
    Demons,
    #[serde(rename = "龙族")]
    Dragons,
    #[serde(rename = "地府")]
    Underworld,
    #[serde(rename = "凡间")]
    Mortals,
    #[serde(rename = "反派势力")]
    Antagonists,
    #[serde(rename = "其他")]
    Other,
}

impl Faction {
    pub fn from_category(category: &str, level_category: Option<&str>) -> Self {
        match category.trim() {
            "主角" | "protagonist" => return Self::Pilgrims,
            "佛教" | "buddhist" => return Self::Buddhist,
            "天庭" | "celestial" | "神仙" | "deity" | "仙人" | "immortal" => return Self::Heaven,
            "妖魔" | "demon" => return Self::Demons,
            "龙族" | "dragon" => return Self::Dragons,
            "地府" | "underworld" => return Self::Underworld,
            "人类" | "human" => return Self::Mortals,
            "反派" | "antagonist" => return Self::Antagonists,
            _ => {}
        }
        match level_category.map(str::trim) {
            Some("buddhist" | "佛教") => Self::Buddhist,
            Some("immortal" | "仙人") => Self::Heaven,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pilgrims => "取经团队",
            Self::Buddhist => "佛教",
            Self::Heaven => "天庭",
            Self::Demons => "妖魔",
            Self::Dragons => "龙族",
            Self::Underworld => "地府",
            Self::Mortals => "凡间",
            Self::Antagonists => "反派势力",
            Self::Other => "其他",
        }
    }
}

/// Node appearance derived from category, rank and power
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterVisual {
    pub color: Rgb,
    pub size: f32,
    pub emissive_intensity: f32,
}

impl Default for CharacterVisual {
    fn default() -> Self {
        Self::derive("", 0, DEFAULT_POWER)
    }
}

impl CharacterVisual {
    /// A power of 0 is treated as unrated and glows like [`DEFAULT_POWER`].
    pub fn derive(category: &str, rank: u32, power: u8) -> Self {
        let size = (2.0 - (rank as f32 / MAX_RANK as f32) * 1.5).max(0.5);
        let power = if power == 0 { DEFAULT_POWER } else { power };
        let emissive_intensity = (f32::from(power) / 100.0 * 0.8).clamp(0.1, 1.0);
        Self {
            color: Rgb::from_u32(category_color(category)),
            size,
            emissive_intensity,
        }
    }
}

fn category_color(category: &str) -> u32 {
    match category.trim() {
        "主角" | "protagonist" => 0xFFD700,
        "神仙" | "deity" => 0x87CEEB,
        "妖魔" | "demon" => 0xFF6347,
        "龙族" | "dragon" => 0x00CED1,
        "佛教" | "buddhist" => 0xDDA0DD,
        "天庭" | "celestial" => 0xF0E68C,
        "地府" | "underworld" => 0x696969,
        "人类" | "human" => 0xFFA500,
        "仙人" | "immortal" => 0x98FB98,
        "反派" | "antagonist" => 0xDC143C,
        "别名" | "alias" => 0xC0C0C0,
        _ => 0xFFFFFF,
    }
}

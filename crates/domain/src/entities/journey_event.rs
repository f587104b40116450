//! Narrative events ("difficulties") along the pilgrimage

use serde::{Deserialize, Serialize};

use crate::ids::EventIndex;

/// Text longer than this many characters counts as substantive commentary.
const DEEP_MEANING_CHARS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyEvent {
    /// Storage row id
    pub id: i64,
    pub index: EventIndex,
    pub name: String,
    /// Raw main-character list, `、` separated
    pub main_characters: String,
    pub location: String,
    pub description: String,
    pub symbolism: String,
    pub cultural_meaning: String,
}

impl JourneyEvent {
    pub fn new(id: i64, index: EventIndex, name: impl Into<String>) -> Self {
        Self {
            id,
            index,
            name: name.into(),
            main_characters: String::new(),
            location: String::new(),
            description: String::new(),
            symbolism: String::new(),
            cultural_meaning: String::new(),
        }
    }

    pub fn with_characters(mut self, characters: impl Into<String>) -> Self {
        self.main_characters = characters.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_commentary(
        mut self,
        symbolism: impl Into<String>,
        cultural_meaning: impl Into<String>,
    ) -> Self {
        self.symbolism = symbolism.into();
        self.cultural_meaning = cultural_meaning.into();
        self
    }

    /// Names listed in `main_characters`; full-width, ASCII and ideographic
    /// commas all separate entries.
    pub fn characters(&self) -> Vec<&str> {
        self.main_characters
            .split(['、', '，', ','])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    pub fn kind(&self) -> EventKind {
        EventKind::classify(&self.description, &self.main_characters)
    }

    pub fn has_deep_meaning(&self) -> bool {
        self.symbolism.chars().count() > DEEP_MEANING_CHARS
            || self.cultural_meaning.chars().count() > DEEP_MEANING_CHARS
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        [
            &self.name,
            &self.main_characters,
            &self.location,
            &self.description,
        ]
        .iter()
        .any(|field| field.contains(keyword))
    }
}

/// Coarse classification used for icons and colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Demon,
    Natural,
    Divine,
    Human,
}

impl EventKind {
    /// Keyword classification; demon wins over divine, divine over natural.
    pub fn classify(description: &str, characters: &str) -> Self {
        let any = |text: &str, needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if any(description, &["妖", "怪", "精", "魔"]) || any(characters, &["妖", "怪"]) {
            Self::Demon
        } else if any(description, &["佛", "神", "仙", "菩萨"])
            || any(characters, &["佛", "观音", "如来"])
        {
            Self::Divine
        } else if any(description, &["山", "河", "水", "风", "雨", "火"]) {
            Self::Natural
        } else {
            Self::Human
        }
    }

    /// Placeholder kind for path points with no loaded event.
    pub fn placeholder(offset: usize) -> Self {
        match offset % 4 {
            0 => Self::Demon,
            1 => Self::Natural,
            2 => Self::Divine,
            _ => Self::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(n: u8) -> EventIndex {
        EventIndex::new(n).expect("valid index")
    }

    #[test]
    fn characters_split_on_ideographic_comma() {
        let e = JourneyEvent::new(1, idx(1), "金蝉遭贬").with_characters("唐僧、 孙悟空、、猪八戒");
        assert_eq!(e.characters(), vec!["唐僧", "孙悟空", "猪八戒"]);
    }

    #[test]
    fn characters_split_on_mixed_commas() {
        let e = JourneyEvent::new(1, idx(1), "四圣试禅心").with_characters("孙悟空，唐僧,猪八戒、沙僧");
        assert_eq!(e.characters(), vec!["孙悟空", "唐僧", "猪八戒", "沙僧"]);
    }

    #[test]
    fn classification_precedence() {
        assert_eq!(EventKind::classify("妖精设计捉唐僧", ""), EventKind::Demon);
        assert_eq!(EventKind::classify("菩萨显圣", ""), EventKind::Divine);
        assert_eq!(EventKind::classify("渡河", "观音"), EventKind::Divine);
        assert_eq!(EventKind::classify("火焰山酷热", ""), EventKind::Natural);
        assert_eq!(EventKind::classify("出城", "唐僧"), EventKind::Human);
    }

    #[test]
    fn deep_meaning_counts_characters_not_bytes() {
        let short = JourneyEvent::new(1, idx(1), "a").with_commentary("修心之难", "");
        assert!(!short.has_deep_meaning());
        let long = JourneyEvent::new(2, idx(2), "b").with_commentary("", "象征修行路上的重重考验与磨砺");
        assert!(long.has_deep_meaning());
    }
}

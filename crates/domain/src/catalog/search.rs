use serde::{Deserialize, Serialize};

use crate::entities::Character;

/// Filters for a character search. Every present filter must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_power: Option<u8>,
    pub max_power: Option<u8>,
}

impl CharacterQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    /// Blank strings are treated as absent filters.
    pub fn normalized(self) -> Self {
        let non_blank = |s: Option<String>| {
            s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        Self {
            keyword: non_blank(self.keyword),
            category: non_blank(self.category),
            min_power: self.min_power,
            max_power: self.max_power,
        }
    }

    pub fn matches(&self, character: &Character) -> bool {
        if let Some(keyword) = self.keyword.as_deref() {
            if !character.matches_keyword(keyword) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            if character.category != category {
                return false;
            }
        }
        if self.min_power.is_some_and(|min| character.power < min) {
            return false;
        }
        if self.max_power.is_some_and(|max| character.power > max) {
            return false;
        }
        true
    }
}

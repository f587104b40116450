//! Query-string contracts
//!
//! Numeric parameters arrive as raw strings so that a malformed value can be
//! reported inside the normal JSON envelope instead of as a bare extractor
//! rejection.

use serde::{Deserialize, Serialize};
use starmap_domain::layout::NetworkFormation;
use starmap_domain::{CharacterQuery, QualityTier};

/// `GET /api/characters/search?q&category&minPower&maxPower`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_power: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_power: Option<String>,
}

impl CharacterSearchQuery {
    pub fn to_query(&self) -> Result<CharacterQuery, String> {
        Ok(CharacterQuery {
            keyword: self.q.clone(),
            category: self.category.clone(),
            min_power: parse_power("minPower", self.min_power.as_deref())?,
            max_power: parse_power("maxPower", self.max_power.as_deref())?,
        }
        .normalized())
    }
}

/// Blank means absent; anything else must be an integer. Values beyond the
/// 0..=100 scale are clamped.
fn parse_power(name: &str, raw: Option<&str>) -> Result<Option<u8>, String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<i64>()
        .map(|v| Some(v.clamp(0, 100) as u8))
        .map_err(|_| format!("{name} must be an integer, got '{raw}'"))
}

/// `GET /api/events/search?q`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl EventSearchQuery {
    pub fn keyword(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// `GET /api/layout/*?seed&tier`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutQuery {
    pub seed: Option<u64>,
    pub tier: Option<QualityTier>,
}

/// `GET /api/layout/network?seed&formation&density`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkQuery {
    pub seed: Option<u64>,
    pub formation: Option<NetworkFormation>,
    pub density: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        let query = CharacterSearchQuery {
            q: Some("  ".into()),
            category: Some("妖魔".into()),
            min_power: Some("".into()),
            max_power: None,
        }
        .to_query()
        .expect("valid query");
        assert_eq!(query.keyword, None);
        assert_eq!(query.category.as_deref(), Some("妖魔"));
        assert_eq!(query.min_power, None);
    }

    #[test]
    fn power_bounds_are_parsed_and_clamped() {
        let query = CharacterSearchQuery {
            min_power: Some("80".into()),
            max_power: Some("250".into()),
            ..Default::default()
        }
        .to_query()
        .expect("valid query");
        assert_eq!(query.min_power, Some(80));
        assert_eq!(query.max_power, Some(100));
    }

    #[test]
    fn non_numeric_power_is_rejected() {
        let err = CharacterSearchQuery {
            min_power: Some("strong".into()),
            ..Default::default()
        }
        .to_query()
        .expect_err("should reject");
        assert!(err.contains("minPower"));
    }

    #[test]
    fn event_keyword_is_trimmed() {
        let query = EventSearchQuery { q: Some(" 火焰山 ".into()) };
        assert_eq!(query.keyword(), Some("火焰山"));
        assert_eq!(EventSearchQuery::default().keyword(), None);
    }
}

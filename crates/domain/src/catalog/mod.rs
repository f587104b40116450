//! Content catalog - the read-only set of characters, aliases and events
//!
//! A `Catalog` is built once per data load and shared as `Arc<Catalog>`.
//! Relationship endpoints are checked at construction: edges pointing at
//! unknown characters, or at their own source, are dropped and logged so a
//! bad row never takes the scene down.

mod sample;
mod search;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entities::{Character, CharacterKind, Faction, JourneyEvent};
use crate::error::DomainError;
use crate::ids::{CharacterId, EventIndex};

pub use search::CharacterQuery;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    characters: Vec<Character>,
    aliases: Vec<Character>,
    events: Vec<JourneyEvent>,
    by_id: HashMap<CharacterId, usize>,
}

impl Catalog {
    pub fn new(
        characters: Vec<Character>,
        aliases: Vec<Character>,
        mut events: Vec<JourneyEvent>,
    ) -> Self {
        // Relationship targets must resolve through `character()`, so only
        // canonical ids count, for alias records too.
        let known: HashSet<CharacterId> = characters.iter().map(|c| c.id.clone()).collect();
        let characters: Vec<Character> = characters
            .into_iter()
            .map(|c| prune_relationships(c, &known))
            .collect();
        let aliases: Vec<Character> = aliases
            .into_iter()
            .map(|c| prune_relationships(c, &known))
            .collect();

        events.sort_by_key(|e| e.index);
        events.dedup_by_key(|e| e.index);

        let by_id = characters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        Self {
            characters,
            aliases,
            events,
            by_id,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Strict check used by import tooling: reports the first relationship
    /// whose endpoint is missing or equal to its source.
    pub fn validate(characters: &[Character]) -> Result<(), DomainError> {
        let known: HashSet<&CharacterId> = characters.iter().map(|c| &c.id).collect();
        for character in characters {
            for rel in &character.relationships {
                if rel.target == character.id {
                    return Err(DomainError::constraint(format!(
                        "{} has a relationship to itself",
                        character.id
                    )));
                }
                if !known.contains(&rel.target) {
                    return Err(DomainError::constraint(format!(
                        "{} references unknown character {}",
                        character.id, rel.target
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn aliases(&self) -> &[Character] {
        &self.aliases
    }

    /// Events ordered by index
    pub fn events(&self) -> &[JourneyEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.events.is_empty()
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.by_id.get(id).map(|&i| &self.characters[i])
    }

    /// Resolves a name as written in an event's cast list. Tries an exact
    /// name, then an alias, then containment in either direction.
    pub fn find_character_by_name(&self, name: &str) -> Option<&Character> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.characters
            .iter()
            .find(|c| c.name == name)
            .or_else(|| {
                self.characters
                    .iter()
                    .find(|c| c.aliases.iter().any(|alias| alias == name))
            })
            .or_else(|| {
                self.characters.iter().find(|c| {
                    !c.name.is_empty() && (c.name.contains(name) || name.contains(c.name.as_str()))
                })
            })
    }

    pub fn event(&self, index: EventIndex) -> Option<&JourneyEvent> {
        self.events
            .binary_search_by_key(&index, |e| e.index)
            .ok()
            .map(|i| &self.events[i])
    }

    /// Characters matching every filter in `query`, ordered by rank.
    /// No match is an empty vector, not an error.
    pub fn search_characters(&self, query: &CharacterQuery) -> Vec<&Character> {
        let mut hits: Vec<&Character> = self
            .characters
            .iter()
            .filter(|c| query.matches(c))
            .collect();
        hits.sort_by_key(|c| c.rank);
        hits
    }

    pub fn search_events(&self, keyword: &str) -> Vec<&JourneyEvent> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Vec::new();
        }
        self.events
            .iter()
            .filter(|e| e.matches_keyword(keyword))
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_characters(&self.characters, self.aliases.len(), self.events.len())
    }
}

fn prune_relationships(mut character: Character, known: &HashSet<CharacterId>) -> Character {
    let before = character.relationships.len();
    let source = character.id.clone();
    character
        .relationships
        .retain(|rel| rel.target != source && known.contains(&rel.target));
    let dropped = before - character.relationships.len();
    if dropped > 0 {
        tracing::warn!(
            character = %source,
            dropped,
            "Dropped relationships with missing or self endpoints"
        );
    }
    character
}

/// Power buckets: high >= 80, medium >= 50, low below
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_characters: usize,
    pub total_aliases: usize,
    pub total_events: usize,
    pub characters_by_type: BTreeMap<CharacterKind, usize>,
    pub characters_by_faction: BTreeMap<Faction, usize>,
    pub characters_by_category: BTreeMap<String, usize>,
    pub power_distribution: PowerDistribution,
}

impl CatalogStats {
    pub fn from_characters(characters: &[Character], aliases: usize, events: usize) -> Self {
        let mut stats = Self {
            total_characters: characters.len(),
            total_aliases: aliases,
            total_events: events,
            ..Self::default()
        };
        for c in characters {
            *stats.characters_by_type.entry(c.kind).or_default() += 1;
            *stats.characters_by_faction.entry(c.faction).or_default() += 1;
            *stats
                .characters_by_category
                .entry(c.category.clone())
                .or_default() += 1;
            match c.power {
                80.. => stats.power_distribution.high += 1,
                50..=79 => stats.power_distribution.medium += 1,
                _ => stats.power_distribution.low += 1,
            }
        }
        stats
    }
}

/// What consumers see while the catalog load is in flight.
#[derive(Debug, Clone, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Ready(Arc<Catalog>),
}

impl CatalogState {
    pub fn ready(catalog: Catalog) -> Self {
        Self::Ready(Arc::new(catalog))
    }

    pub fn catalog(&self) -> Option<&Arc<Catalog>> {
        match self {
            Self::Loading => None,
            Self::Ready(catalog) => Some(catalog),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

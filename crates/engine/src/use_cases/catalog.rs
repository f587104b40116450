//! Catalog use cases.
//!
//! Read-mostly access to the character and event stores with TTL caching.
//! Search results are never cached; whole lists and the assembled
//! [`Catalog`] are.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use starmap_domain::{Catalog, CatalogStats, Character, CharacterQuery, EventIndex, JourneyEvent};
use starmap_shared::HealthStatus;

use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::{CharacterRepo, ClockPort, EventRepo, RepoError};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    /// Message is shown to the caller as-is.
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
}

/// A value plus whether it was served from the cache.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: T,
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub stats: CatalogStats,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CompleteSnapshot {
    pub catalog: Arc<Catalog>,
    pub stats: StatsSnapshot,
}

pub struct CatalogService {
    characters: Arc<dyn CharacterRepo>,
    events: Arc<dyn EventRepo>,
    clock: Arc<dyn ClockPort>,
    started_at: DateTime<Utc>,
    /// Keyed by "alias records?"
    character_cache: TtlCache<bool, Arc<Vec<Character>>>,
    event_cache: TtlCache<(), Arc<Vec<JourneyEvent>>>,
    catalog_cache: TtlCache<(), Arc<Catalog>>,
}

impl CatalogService {
    pub fn new(
        characters: Arc<dyn CharacterRepo>,
        events: Arc<dyn EventRepo>,
        clock: Arc<dyn ClockPort>,
        ttl: Duration,
    ) -> Self {
        let started_at = clock.now();
        Self {
            characters,
            events,
            clock,
            started_at,
            character_cache: TtlCache::new(ttl),
            event_cache: TtlCache::new(ttl),
            catalog_cache: TtlCache::new(ttl),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn characters(&self) -> Result<Cached<Arc<Vec<Character>>>, CatalogError> {
        self.character_list(false).await
    }

    pub async fn aliases(&self) -> Result<Cached<Arc<Vec<Character>>>, CatalogError> {
        self.character_list(true).await
    }

    async fn character_list(&self, aliases: bool) -> Result<Cached<Arc<Vec<Character>>>, CatalogError> {
        let (value, cached) = self
            .character_cache
            .get_or_try_load(aliases, move || async move {
                let list = self.characters.list(aliases).await?;
                tracing::debug!(count = list.len(), aliases, "Loaded characters from storage");
                Ok::<_, RepoError>(Arc::new(list))
            })
            .await?;
        Ok(Cached { value, cached })
    }

    pub async fn events(&self) -> Result<Cached<Arc<Vec<JourneyEvent>>>, CatalogError> {
        let (value, cached) = self
            .event_cache
            .get_or_try_load((), move || async move {
                let list = self.events.list().await?;
                tracing::debug!(count = list.len(), "Loaded events from storage");
                Ok::<_, RepoError>(Arc::new(list))
            })
            .await?;
        Ok(Cached { value, cached })
    }

    /// Characters, aliases and events assembled into one validated catalog.
    pub async fn load_catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        if let Some(catalog) = self.catalog_cache.get(&()).await {
            return Ok(catalog);
        }
        let characters = self.characters().await?.value;
        let aliases = self.aliases().await?.value;
        let events = self.events().await?.value;

        let catalog = Arc::new(Catalog::new(
            characters.as_ref().clone(),
            aliases.as_ref().clone(),
            events.as_ref().clone(),
        ));
        self.catalog_cache.insert((), Arc::clone(&catalog)).await;
        Ok(catalog)
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, CatalogError> {
        let catalog = self.load_catalog().await?;
        Ok(StatsSnapshot {
            stats: catalog.stats(),
            last_updated: self.clock.now(),
        })
    }

    pub async fn complete(&self) -> Result<CompleteSnapshot, CatalogError> {
        let catalog = self.load_catalog().await?;
        let stats = StatsSnapshot {
            stats: catalog.stats(),
            last_updated: self.clock.now(),
        };
        Ok(CompleteSnapshot { catalog, stats })
    }

    /// Zero matches is a successful, empty result.
    pub async fn search_characters(
        &self,
        query: &CharacterQuery,
    ) -> Result<Vec<Character>, CatalogError> {
        let query = query.clone().normalized();
        if let (Some(min), Some(max)) = (query.min_power, query.max_power) {
            if min > max {
                return Ok(Vec::new());
            }
        }
        Ok(self.characters.search(&query).await?)
    }

    /// `raw` is the path segment as typed by the caller.
    pub async fn event(&self, raw: &str) -> Result<JourneyEvent, CatalogError> {
        let index = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| EventIndex::from_i64(n).ok())
            .ok_or_else(|| CatalogError::InvalidInput("难次必须是1-81之间的数字".to_string()))?;

        self.events
            .get(index)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("未找到第{}难的数据", index.get())))
    }

    pub async fn search_events(&self, keyword: Option<&str>) -> Result<Vec<JourneyEvent>, CatalogError> {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CatalogError::InvalidInput("请提供搜索关键词".to_string()))?;
        Ok(self.events.search(keyword).await?)
    }

    /// Drops every cached list; returns how many entries were held.
    pub async fn refresh(&self) -> usize {
        let cleared = self.character_cache.clear().await
            + self.event_cache.clear().await
            + self.catalog_cache.clear().await;
        tracing::info!(cleared, "Catalog cache cleared");
        cleared
    }

    /// Never fails: storage problems turn the status to `degraded`.
    pub async fn health(&self) -> HealthStatus {
        let characters = self.characters.count().await;
        let events = self.events.count().await;
        let status = match (&characters, &events) {
            (Ok(_), Ok(_)) => "ok",
            _ => {
                if let Err(e) = &characters {
                    tracing::warn!(error = %e, "Character store unavailable");
                }
                if let Err(e) = &events {
                    tracing::warn!(error = %e, "Event store unavailable");
                }
                "degraded"
            }
        };

        HealthStatus {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            characters: characters.unwrap_or(0),
            events: events.unwrap_or(0),
            uptime_seconds: (self.clock.now() - self.started_at).num_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::ports::{MockCharacterRepo, MockClockPort, MockEventRepo};
    use chrono::TimeZone;

    fn fixed_clock() -> Arc<MockClockPort> {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).single().expect("time"));
        Arc::new(clock)
    }

    fn service(characters: MockCharacterRepo, events: MockEventRepo) -> CatalogService {
        CatalogService::new(
            Arc::new(characters),
            Arc::new(events),
            fixed_clock(),
            DEFAULT_CACHE_TTL,
        )
    }

    fn wukong() -> Character {
        Character::new("c-1", "孙悟空", "主角").with_rank(1).with_power(95)
    }

    fn difficulty(n: u8) -> JourneyEvent {
        JourneyEvent::new(i64::from(n), EventIndex::new(n).expect("index"), format!("难{n}"))
    }

    #[tokio::test]
    async fn character_list_is_cached_until_refresh() {
        let mut characters = MockCharacterRepo::new();
        characters
            .expect_list()
            .withf(|aliases| !*aliases)
            .times(2)
            .returning(|_| Ok(vec![wukong()]));
        let svc = service(characters, MockEventRepo::new());

        let first = svc.characters().await.expect("first");
        assert!(!first.cached);
        let second = svc.characters().await.expect("second");
        assert!(second.cached);
        assert_eq!(second.value.len(), 1);

        assert_eq!(svc.refresh().await, 1);
        let third = svc.characters().await.expect("third");
        assert!(!third.cached);
    }

    #[tokio::test]
    async fn failed_load_is_not_cached() {
        let mut characters = MockCharacterRepo::new();
        let mut calls = 0;
        characters.expect_list().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(RepoError::database("list_characters", "locked"))
            } else {
                Ok(vec![wukong()])
            }
        });
        let svc = service(characters, MockEventRepo::new());

        assert!(matches!(svc.characters().await, Err(CatalogError::Repo(_))));
        let retry = svc.characters().await.expect("retry");
        assert!(!retry.cached);
    }

    #[tokio::test]
    async fn search_with_no_matches_is_empty_success() {
        let mut characters = MockCharacterRepo::new();
        characters.expect_search().returning(|_| Ok(vec![]));
        let svc = service(characters, MockEventRepo::new());

        let hits = svc
            .search_characters(&CharacterQuery::keyword("不存在"))
            .await
            .expect("search");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn inverted_power_range_skips_storage() {
        let mut characters = MockCharacterRepo::new();
        characters.expect_search().never();
        let svc = service(characters, MockEventRepo::new());

        let query = CharacterQuery {
            min_power: Some(90),
            max_power: Some(10),
            ..CharacterQuery::default()
        };
        assert!(svc.search_characters(&query).await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn event_lookup_validates_then_reports_missing() {
        let mut events = MockEventRepo::new();
        events
            .expect_get()
            .returning(|index| Ok((index.get() == 5).then(|| difficulty(5))));
        let svc = service(MockCharacterRepo::new(), events);

        for raw in ["0", "82", "abc", ""] {
            match svc.event(raw).await {
                Err(CatalogError::InvalidInput(msg)) => assert_eq!(msg, "难次必须是1-81之间的数字"),
                other => panic!("expected invalid input for {raw:?}, got {other:?}"),
            }
        }

        assert_eq!(svc.event("5").await.expect("found").index.get(), 5);
        match svc.event("80").await {
            Err(CatalogError::NotFound(msg)) => assert_eq!(msg, "未找到第80难的数据"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn event_search_requires_keyword() {
        let mut events = MockEventRepo::new();
        events
            .expect_search()
            .withf(|k| k.to_string() == "黄风")
            .returning(|_| Ok(vec![difficulty(21)]));
        let svc = service(MockCharacterRepo::new(), events);

        assert!(matches!(
            svc.search_events(None).await,
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.search_events(Some("   ")).await,
            Err(CatalogError::InvalidInput(_))
        ));
        assert_eq!(svc.search_events(Some(" 黄风 ")).await.expect("hits").len(), 1);
    }

    #[tokio::test]
    async fn stats_come_from_assembled_catalog() {
        let mut characters = MockCharacterRepo::new();
        characters.expect_list().returning(|aliases| {
            if aliases {
                Ok(vec![Character::new("a-1", "美猴王", "主角")
                    .as_alias_of(starmap_domain::CharacterId::new("c-1"))])
            } else {
                Ok(vec![wukong()])
            }
        });
        let mut events = MockEventRepo::new();
        events
            .expect_list()
            .times(1)
            .returning(|| Ok(vec![difficulty(1), difficulty(2)]));
        let svc = service(characters, events);

        let snapshot = svc.stats().await.expect("stats");
        assert_eq!(snapshot.stats.total_characters, 1);
        assert_eq!(snapshot.stats.total_aliases, 1);
        assert_eq!(snapshot.stats.total_events, 2);
        assert_eq!(snapshot.stats.power_distribution.high, 1);

        let complete = svc.complete().await.expect("complete");
        assert_eq!(complete.catalog.characters().len(), 1);
    }

    #[tokio::test]
    async fn health_degrades_instead_of_failing() {
        let mut characters = MockCharacterRepo::new();
        characters.expect_count().returning(|| Ok(3));
        let mut events = MockEventRepo::new();
        events
            .expect_count()
            .returning(|| Err(RepoError::database("count_events", "unable to open")));
        let svc = service(characters, events);

        let health = svc.health().await;
        assert_eq!(health.status, "degraded");
        assert_eq!(health.characters, 3);
        assert_eq!(health.events, 0);
        assert_eq!(health.uptime_seconds, 0);
    }

    #[tokio::test]
    async fn uptime_counts_from_construction() {
        let mut characters = MockCharacterRepo::new();
        characters.expect_count().returning(|| Ok(0));
        let mut events = MockEventRepo::new();
        events.expect_count().returning(|| Ok(0));
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).single().expect("time"),
        ));
        let svc = CatalogService::new(
            Arc::new(characters),
            Arc::new(events),
            Arc::clone(&clock) as Arc<dyn ClockPort>,
            DEFAULT_CACHE_TTL,
        );

        clock.advance(chrono::Duration::seconds(90));
        let health = svc.health().await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.uptime_seconds, 90);
    }
}

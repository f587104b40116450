use async_trait::async_trait;
use chrono::{DateTime, Utc};
use starmap_domain::{Character, CharacterQuery, EventIndex, JourneyEvent};

use super::RepoError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    /// Canonical characters when `aliases` is false, alias records otherwise.
    /// Ordered by rank.
    async fn list(&self, aliases: bool) -> Result<Vec<Character>, RepoError>;

    /// All records (aliases included) matching every present filter, by rank.
    async fn search(&self, query: &CharacterQuery) -> Result<Vec<Character>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    /// Every difficulty in order.
    async fn list(&self) -> Result<Vec<JourneyEvent>, RepoError>;

    async fn get(&self, index: EventIndex) -> Result<Option<JourneyEvent>, RepoError>;

    /// Matches name, main characters, location or description.
    async fn search(&self, keyword: &str) -> Result<Vec<JourneyEvent>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

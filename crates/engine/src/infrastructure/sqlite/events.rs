use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use starmap_domain::{EventIndex, JourneyEvent};

use super::like_pattern;
use crate::infrastructure::ports::{EventRepo, RepoError};

const SELECT_EVENTS: &str = r#"
    SELECT id, nanci, nanming, zhuyaorenwu, didian, shijianmiaoshu, xiangzhengyi, wenhuaneihan
    FROM event
"#;

/// The 81 difficulties, keyed by `nanci`.
pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn text(row: &SqliteRow, name: &str) -> Result<String, RepoError> {
    row.try_get::<Option<String>, _>(name)
        .map(Option::unwrap_or_default)
        .map_err(|e| RepoError::database("decode_event", e))
}

fn row_to_event(row: &SqliteRow) -> Result<JourneyEvent, RepoError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| RepoError::database("decode_event", e))?;
    let nanci: Option<i64> = row
        .try_get("nanci")
        .map_err(|e| RepoError::database("decode_event", e))?;
    let index = nanci
        .ok_or_else(|| RepoError::constraint(format!("event {id} has no difficulty number")))
        .and_then(|n| EventIndex::from_i64(n).map_err(RepoError::constraint))?;

    Ok(JourneyEvent::new(id, index, text(row, "nanming")?)
        .with_characters(text(row, "zhuyaorenwu")?)
        .with_location(text(row, "didian")?)
        .with_description(text(row, "shijianmiaoshu")?)
        .with_commentary(text(row, "xiangzhengyi")?, text(row, "wenhuaneihan")?))
}

fn decode_all(rows: &[SqliteRow]) -> Vec<JourneyEvent> {
    rows.iter()
        .filter_map(|row| match row_to_event(row) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable event row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl EventRepo for SqliteEventRepo {
    async fn list(&self) -> Result<Vec<JourneyEvent>, RepoError> {
        let rows = sqlx::query(&format!("{SELECT_EVENTS} ORDER BY nanci"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_events", e))?;
        Ok(decode_all(&rows))
    }

    async fn get(&self, index: EventIndex) -> Result<Option<JourneyEvent>, RepoError> {
        let row = sqlx::query(&format!("{SELECT_EVENTS} WHERE nanci = ? LIMIT 1"))
            .bind(i64::from(index.get()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_event", e))?;
        row.as_ref().map(row_to_event).transpose()
    }

    async fn search(&self, keyword: &str) -> Result<Vec<JourneyEvent>, RepoError> {
        let pattern = like_pattern(keyword.trim());
        let rows = sqlx::query(&format!(
            "{SELECT_EVENTS} WHERE nanming LIKE ?1 ESCAPE '\\' \
             OR zhuyaorenwu LIKE ?1 ESCAPE '\\' \
             OR didian LIKE ?1 ESCAPE '\\' \
             OR shijianmiaoshu LIKE ?1 ESCAPE '\\' \
             ORDER BY nanci"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("search_events", e))?;
        Ok(decode_all(&rows))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count_events", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

pub async fn insert_event(pool: &SqlitePool, event: &JourneyEvent) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO event
            (id, nanci, nanming, zhuyaorenwu, didian, shijianmiaoshu, xiangzhengyi, wenhuaneihan)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(event.id)
    .bind(i64::from(event.index.get()))
    .bind(&event.name)
    .bind(&event.main_characters)
    .bind(&event.location)
    .bind(&event.description)
    .bind(&event.symbolism)
    .bind(&event.cultural_meaning)
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("insert_event", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::{ensure_event_schema, memory_pool};

    fn difficulty(n: u8, name: &str) -> JourneyEvent {
        JourneyEvent::new(i64::from(n), EventIndex::new(n).expect("index"), name)
    }

    async fn seeded() -> SqliteEventRepo {
        let pool = memory_pool().await;
        ensure_event_schema(&pool).await.expect("schema");
        let events = [
            difficulty(3, "满月抛江").with_location("江州"),
            difficulty(1, "金蝉遭贬")
                .with_characters("唐僧、如来")
                .with_description("金蝉子轻慢佛法"),
            difficulty(21, "黄风怪阻")
                .with_characters("孙悟空、黄风怪")
                .with_location("黄风岭"),
        ];
        for event in &events {
            insert_event(&pool, event).await.expect("insert");
        }
        SqliteEventRepo::new(pool)
    }

    #[tokio::test]
    async fn list_is_ordered_by_difficulty() {
        let repo = seeded().await;
        let indices: Vec<u8> = repo
            .list()
            .await
            .expect("list")
            .iter()
            .map(|e| e.index.get())
            .collect();
        assert_eq!(indices, vec![1, 3, 21]);
    }

    #[tokio::test]
    async fn get_returns_none_for_missing_difficulty() {
        let repo = seeded().await;
        let found = repo.get(EventIndex::new(21).expect("index")).await.expect("get");
        assert_eq!(found.map(|e| e.name), Some("黄风怪阻".to_string()));

        let missing = repo.get(EventIndex::new(80).expect("index")).await.expect("get");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn search_covers_characters_and_location() {
        let repo = seeded().await;
        assert_eq!(repo.search("黄风").await.expect("search").len(), 1);
        assert_eq!(repo.search("唐僧").await.expect("search").len(), 1);
        assert_eq!(repo.search("江州").await.expect("search").len(), 1);
        assert!(repo.search("火焰山").await.expect("search").is_empty());
    }

    #[tokio::test]
    async fn out_of_range_rows_are_skipped() {
        let repo = seeded().await;
        sqlx::query("INSERT INTO event (id, nanci, nanming) VALUES (99, 99, '多出来的一难')")
            .execute(repo.pool())
            .await
            .expect("insert");
        sqlx::query("INSERT INTO event (id, nanci, nanming) VALUES (100, NULL, NULL)")
            .execute(repo.pool())
            .await
            .expect("insert");

        assert_eq!(repo.list().await.expect("list").len(), 3);
        assert_eq!(repo.count().await.expect("count"), 5);
    }

    #[tokio::test]
    async fn null_text_columns_read_as_empty() {
        let repo = seeded().await;
        let event = repo
            .get(EventIndex::new(3).expect("index"))
            .await
            .expect("get")
            .expect("present");
        assert_eq!(event.main_characters, "");
        assert_eq!(event.location, "江州");
    }
}

//! SQLite-backed character catalog.

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use starmap_domain::{
    CelestialBody, Character, CharacterId, CharacterQuery, Relationship, RelationshipKind,
};

use super::like_pattern;
use crate::infrastructure::ports::{CharacterRepo, RepoError};

const SELECT_CHARACTERS: &str = r#"
    SELECT c.unid, c.name, c.pinyin, c.category, c.rank, c.power, c.influence,
           c.morality, c.first_appearance, c.is_alias, c.alias_of,
           m.aliases, m.tags, m.source_chapters, m.attributes, m.description
    FROM characters c
    LEFT JOIN character_metadata m ON c.unid = m.unid
"#;

pub struct SqliteCharacterRepo {
    pool: SqlitePool,
}

impl SqliteCharacterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch(
        &self,
        mut query: QueryBuilder<'_, Sqlite>,
        operation: &'static str,
    ) -> Result<Vec<Character>, RepoError> {
        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database(operation, e))?;

        Ok(rows
            .iter()
            .filter_map(|row| match row_to_character(row) {
                Ok(character) => Some(character),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable character row");
                    None
                }
            })
            .collect())
    }
}

/// The subset of the `attributes` JSON column the catalog reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredAttributes {
    level: Option<StoredLevel>,
    celestial: Option<CelestialBody>,
    relationships: Vec<StoredRelationship>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredLevel {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRelationship {
    #[serde(alias = "targetId")]
    target: String,
    #[serde(rename = "type", alias = "kind")]
    kind: String,
    #[serde(default = "default_strength")]
    strength: f32,
}

fn default_strength() -> f32 {
    0.5
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepoError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepoError::database("decode_character", e))
}

/// Decodes an optional JSON column; NULL and blank text mean "empty".
fn json_column<T>(raw: Option<String>, name: &str) -> Result<T, RepoError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(text) => serde_json::from_str(text)
            .map_err(|e| RepoError::serialization(format!("{name}: {e}"))),
    }
}

fn row_to_character(row: &SqliteRow) -> Result<Character, RepoError> {
    let id: String = column(row, "unid")?;
    let name: String = column(row, "name")?;
    let category: String = column(row, "category")?;

    let aliases: Vec<String> = json_column(column(row, "aliases")?, "aliases")?;
    let tags: Vec<String> = json_column(column(row, "tags")?, "tags")?;
    let chapters: Vec<serde_json::Value> =
        json_column(column(row, "source_chapters")?, "source_chapters")?;
    let attributes: StoredAttributes = json_column(column(row, "attributes")?, "attributes")?;

    let mut character = Character::new(id.as_str(), name, &category)
        .with_aliases(aliases)
        .with_tags(tags)
        .with_chapters(
            chapters
                .iter()
                .filter_map(|v| {
                    v.as_u64()
                        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
                })
                .filter_map(|n| u32::try_from(n).ok())
                .collect(),
        )
        .with_level_category(
            attributes
                .level
                .as_ref()
                .and_then(|level| level.category.as_deref()),
        );

    if let Some(pinyin) = column::<Option<String>>(row, "pinyin")?.filter(|p| !p.is_empty()) {
        character = character.with_pinyin(pinyin);
    }
    if let Some(rank) = column::<Option<i64>>(row, "rank")? {
        character = character.with_rank(u32::try_from(rank.max(0)).unwrap_or(u32::MAX));
    }
    if let Some(power) = column::<Option<i64>>(row, "power")? {
        character = character.with_power(power);
    }
    if let Some(influence) = column::<Option<i64>>(row, "influence")? {
        character = character.with_influence(influence);
    }
    if let Some(morality) = column::<Option<String>>(row, "morality")? {
        character = character.with_morality(morality);
    }
    if let Some(description) = column::<Option<String>>(row, "description")?
        .filter(|d| !d.trim().is_empty())
    {
        character = character.with_description(description);
    }
    if let Some(chapter) = column::<Option<i64>>(row, "first_appearance")?
        .and_then(|c| u32::try_from(c).ok())
        .filter(|c| *c > 0)
    {
        character = character.with_first_appearance(chapter);
    }
    if let Some(body) = attributes.celestial {
        character = character.with_celestial(body);
    }
    if column::<Option<bool>>(row, "is_alias")?.unwrap_or(false) {
        let canonical: Option<String> = column(row, "alias_of")?;
        character = character.as_alias_of(CharacterId::new(canonical.unwrap_or_default()));
    }

    for stored in attributes.relationships {
        match stored.kind.parse::<RelationshipKind>() {
            Ok(kind) => {
                character = character.with_relationship(Relationship::new(
                    CharacterId::new(stored.target),
                    kind,
                    stored.strength,
                ));
            }
            Err(e) => tracing::debug!(character = %id, error = %e, "Ignoring relationship"),
        }
    }

    Ok(character)
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn list(&self, aliases: bool) -> Result<Vec<Character>, RepoError> {
        let mut query = QueryBuilder::new(SELECT_CHARACTERS);
        query
            .push(" WHERE c.is_alias = ")
            .push_bind(aliases)
            .push(" ORDER BY c.rank, c.unid");
        self.fetch(query, "list_characters").await
    }

    async fn search(&self, query: &CharacterQuery) -> Result<Vec<Character>, RepoError> {
        let filter = query.clone().normalized();
        let mut sql = QueryBuilder::new(SELECT_CHARACTERS);
        sql.push(" WHERE 1=1");

        if let Some(keyword) = filter.keyword.as_deref() {
            let pattern = like_pattern(keyword);
            sql.push(" AND (c.name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR c.pinyin LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR m.description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(category) = filter.category {
            sql.push(" AND c.category = ").push_bind(category);
        }
        if let Some(min) = filter.min_power {
            sql.push(" AND c.power >= ").push_bind(i64::from(min));
        }
        if let Some(max) = filter.max_power {
            sql.push(" AND c.power <= ").push_bind(i64::from(max));
        }
        sql.push(" ORDER BY c.rank, c.unid");

        self.fetch(sql, "search_characters").await
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM characters WHERE is_alias = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count_characters", e))?;
        let count: i64 = row
            .try_get("count")
            .map_err(|e| RepoError::database("count_characters", e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepoError> {
    serde_json::to_string(value).map_err(RepoError::serialization)
}

/// Writes one character and its metadata row, replacing any previous copy.
pub async fn insert_character(pool: &SqlitePool, character: &Character) -> Result<(), RepoError> {
    let relationships: Vec<serde_json::Value> = character
        .relationships
        .iter()
        .map(|r| {
            serde_json::json!({
                "target": r.target.as_str(),
                "type": r.kind.as_str(),
                "strength": r.strength,
            })
        })
        .collect();
    let attributes = serde_json::json!({
        "rank": character.rank,
        "power": character.power,
        "influence": character.influence,
        "celestial": character.celestial,
        "relationships": relationships,
    });
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| RepoError::database("insert_character", e))?;

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO characters
            (unid, name, pinyin, type, category, rank, power, influence, morality,
             first_appearance, is_alias, alias_of)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(character.id.as_str())
    .bind(&character.name)
    .bind(character.pinyin.as_deref().unwrap_or_default())
    .bind(character.kind.as_str())
    .bind(&character.category)
    .bind(i64::from(character.rank))
    .bind(i64::from(character.power))
    .bind(i64::from(character.influence))
    .bind(character.morality.as_deref())
    .bind(character.first_appearance.map(i64::from))
    .bind(character.is_alias)
    .bind(character.alias_of.as_ref().map(CharacterId::as_str))
    .execute(&mut *tx)
    .await
    .map_err(|e| RepoError::database("insert_character", e))?;

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO character_metadata
            (unid, aliases, tags, source_chapters, attributes, description)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(character.id.as_str())
    .bind(to_json(&character.aliases)?)
    .bind(to_json(&character.tags)?)
    .bind(to_json(&character.chapters)?)
    .bind(to_json(&attributes)?)
    .bind(character.description.as_deref().unwrap_or_default())
    .execute(&mut *tx)
    .await
    .map_err(|e| RepoError::database("insert_character", e))?;

    tx.commit()
        .await
        .map_err(|e| RepoError::database("insert_character", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::{ensure_character_schema, memory_pool};

    async fn seeded() -> SqliteCharacterRepo {
        let pool = memory_pool().await;
        ensure_character_schema(&pool).await.expect("schema");

        let wukong = Character::new("c-wukong", "孙悟空", "主角")
            .with_pinyin("sun wukong")
            .with_rank(1)
            .with_power(95)
            .with_description("花果山水帘洞美猴王")
            .with_aliases(vec!["齐天大圣".into()])
            .with_celestial(CelestialBody::Earth)
            .with_relationship(Relationship::new(
                CharacterId::new("c-bajie"),
                RelationshipKind::FellowDisciple,
                0.7,
            ));
        let bajie = Character::new("c-bajie", "猪八戒", "主角")
            .with_pinyin("zhu bajie")
            .with_rank(3)
            .with_power(70);
        let baigu = Character::new("c-baigu", "白骨精", "妖魔")
            .with_pinyin("bai gu jing")
            .with_rank(2)
            .with_power(55);
        let alias = Character::new("a-dasheng", "齐天大圣", "主角")
            .with_rank(1)
            .as_alias_of(CharacterId::new("c-wukong"));

        for character in [&wukong, &bajie, &baigu, &alias] {
            insert_character(&pool, character).await.expect("insert");
        }
        SqliteCharacterRepo::new(pool)
    }

    #[tokio::test]
    async fn list_orders_by_rank_and_splits_aliases() {
        let repo = seeded().await;

        let characters = repo.list(false).await.expect("list");
        let names: Vec<&str> = characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["孙悟空", "白骨精", "猪八戒"]);

        let aliases = repo.list(true).await.expect("aliases");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases[0].alias_of, Some(CharacterId::new("c-wukong")));
    }

    #[tokio::test]
    async fn stored_metadata_is_restored() {
        let repo = seeded().await;
        let characters = repo.list(false).await.expect("list");
        let wukong = &characters[0];

        assert_eq!(wukong.pinyin.as_deref(), Some("sun wukong"));
        assert_eq!(wukong.power, 95);
        assert_eq!(wukong.aliases, vec!["齐天大圣".to_string()]);
        assert_eq!(wukong.celestial, Some(CelestialBody::Earth));
        assert_eq!(wukong.relationships.len(), 1);
        assert_eq!(wukong.relationships[0].kind, RelationshipKind::FellowDisciple);
    }

    #[tokio::test]
    async fn search_combines_filters() {
        let repo = seeded().await;

        let by_keyword = repo
            .search(&CharacterQuery::keyword("水帘洞"))
            .await
            .expect("keyword");
        assert_eq!(by_keyword.len(), 1);

        let query = CharacterQuery {
            category: Some("主角".into()),
            min_power: Some(60),
            max_power: Some(80),
            ..CharacterQuery::default()
        };
        let filtered = repo.search(&query).await.expect("filters");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "猪八戒");
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let repo = seeded().await;
        let hits = repo
            .search(&CharacterQuery::keyword("%"))
            .await
            .expect("search");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn count_excludes_aliases() {
        let repo = seeded().await;
        assert_eq!(repo.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let repo = seeded().await;
        sqlx::query(
            "INSERT INTO characters (unid, name, pinyin, type, category, rank, is_alias) \
             VALUES ('c-broken', '坏数据', '', 'other', '其他', 9, 0)",
        )
        .execute(repo.pool())
        .await
        .expect("insert broken");
        sqlx::query("INSERT INTO character_metadata (unid, tags) VALUES ('c-broken', '{not json')")
            .execute(repo.pool())
            .await
            .expect("insert metadata");

        let characters = repo.list(false).await.expect("list");
        assert_eq!(characters.len(), 3);
    }
}

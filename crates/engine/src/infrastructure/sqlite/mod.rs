//! SQLite catalog storage.
//!
//! Two files: one for characters (plus their JSON metadata), one for the
//! 81 difficulties. The service opens both read-only; schema creation and
//! inserts exist for development seeding and tests.

mod characters;
mod events;

use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use starmap_domain::Catalog;

use crate::infrastructure::ports::{CharacterRepo, RepoError};

pub use characters::{insert_character, SqliteCharacterRepo};
pub use events::{insert_event, SqliteEventRepo};

/// How a database file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    /// Read-write, creating the file if missing
    Create,
}

impl OpenMode {
    fn as_query(self) -> &'static str {
        match self {
            Self::ReadOnly => "ro",
            Self::Create => "rwc",
        }
    }
}

pub async fn open_pool(
    path: &str,
    mode: OpenMode,
    acquire_timeout: Duration,
) -> Result<SqlitePool, RepoError> {
    let url = format!("sqlite:{}?mode={}", path, mode.as_query());
    let options: SqliteConnectOptions = url
        .parse()
        .map_err(|e| RepoError::database("open", e))?;
    SqlitePoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("open", e))
}

/// Single-connection in-memory pool; each pool is its own database.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

pub async fn ensure_character_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS characters (
            unid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            pinyin TEXT NOT NULL,
            type TEXT NOT NULL,
            category TEXT NOT NULL,
            rank INTEGER,
            power INTEGER,
            influence INTEGER,
            morality TEXT,
            first_appearance INTEGER,
            is_alias BOOLEAN DEFAULT FALSE,
            alias_of TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("ensure_character_schema", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS character_metadata (
            unid TEXT PRIMARY KEY,
            aliases TEXT,
            tags TEXT,
            source_chapters TEXT,
            attributes TEXT,
            description TEXT,
            FOREIGN KEY (unid) REFERENCES characters(unid)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("ensure_character_schema", e))?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_characters_category ON characters(category)",
        "CREATE INDEX IF NOT EXISTS idx_characters_rank ON characters(rank)",
        "CREATE INDEX IF NOT EXISTS idx_characters_power ON characters(power)",
        "CREATE INDEX IF NOT EXISTS idx_characters_name ON characters(name)",
    ] {
        sqlx::query(index)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("ensure_character_schema", e))?;
    }
    Ok(())
}

pub async fn ensure_event_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event (
            id INTEGER PRIMARY KEY,
            nanci INTEGER,
            nanming TEXT,
            zhuyaorenwu TEXT,
            didian TEXT,
            shijianmiaoshu TEXT,
            xiangzhengyi TEXT,
            wenhuaneihan TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("ensure_event_schema", e))?;
    Ok(())
}

/// Fills an empty character store with the built-in sample cast.
/// Returns how many records were written; a populated store is left alone.
pub async fn seed_sample_characters(pool: &SqlitePool) -> Result<usize, RepoError> {
    ensure_character_schema(pool).await?;
    let repo = SqliteCharacterRepo::new(pool.clone());
    if repo.count().await? > 0 {
        return Ok(0);
    }
    let sample = Catalog::sample();
    for character in sample.characters() {
        insert_character(pool, character).await?;
    }
    tracing::info!(count = sample.characters().len(), "Seeded sample characters");
    Ok(sample.characters().len())
}

/// `%keyword%` with LIKE wildcards in the keyword escaped (`ESCAPE '\'`).
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

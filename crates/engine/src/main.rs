//! Starmap Engine - Main entry point.

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starmap_domain::LayoutSeed;
use starmap_engine::infrastructure::{
    clock::SystemClock,
    ports::ClockPort,
    sqlite::{
        ensure_event_schema, open_pool, seed_sample_characters, OpenMode, SqliteCharacterRepo,
        SqliteEventRepo,
    },
};
use starmap_engine::{api, App, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "starmap_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Starmap Engine");

    let config = EngineConfig::from_env()?;
    let mode = if config.seed_sample_data {
        for path in [&config.characters_db, &config.events_db] {
            if let Some(dir) = std::path::Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
        }
        OpenMode::Create
    } else {
        OpenMode::ReadOnly
    };

    tracing::info!(path = %config.characters_db, "Opening character catalog");
    let characters = open_pool(&config.characters_db, mode, config.acquire_timeout)
        .await
        .with_context(|| format!("opening {}", config.characters_db))?;
    tracing::info!(path = %config.events_db, "Opening event catalog");
    let events = open_pool(&config.events_db, mode, config.acquire_timeout)
        .await
        .with_context(|| format!("opening {}", config.events_db))?;

    if config.seed_sample_data {
        seed_sample_characters(&characters).await?;
        ensure_event_schema(&events).await?;
    }

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let app = Arc::new(App::new(
        Arc::new(SqliteCharacterRepo::new(characters)),
        Arc::new(SqliteEventRepo::new(events)),
        clock,
        config.cache_ttl,
        LayoutSeed(config.layout_seed),
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

/// Browsers on another origin only read the catalog, so GET and the cache
/// flush are all that needs allowing.
fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    if origins.is_empty() {
        return None;
    }
    Some(cors.allow_origin(origins))
}

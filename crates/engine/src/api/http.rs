//! HTTP routes.
//!
//! Every body, success or failure, is an [`ApiResponse`] envelope.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use starmap_domain::Character;
use starmap_shared::{
    ApiResponse, CharacterDto, CharacterSearchQuery, CompleteData, EventCastLayout, EventDto,
    EventSearchQuery, GalaxyLayout, HealthStatus, JourneyLayout, LayoutQuery, NetworkLayout,
    NetworkQuery, StatsDto, SOURCE_SQLITE,
};

use crate::app::App;
use crate::use_cases::catalog::{CatalogError, StatsSnapshot};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/characters", get(list_characters))
        .route("/api/characters/search", get(search_characters))
        .route("/api/aliases", get(list_aliases))
        .route("/api/data/complete", get(complete))
        .route("/api/stats", get(stats))
        .route("/api/events", get(list_events))
        .route("/api/events/search", get(search_events))
        .route("/api/events/{index}", get(get_event))
        .route("/api/events/{index}/characters", get(event_cast))
        .route("/api/cache/refresh", post(refresh_cache))
        .route("/api/layout/journey", get(journey_layout))
        .route("/api/layout/galaxy", get(galaxy_layout))
        .route("/api/layout/network", get(network_layout))
}

fn character_dtos(characters: &[Character]) -> Vec<CharacterDto> {
    characters.iter().map(CharacterDto::from).collect()
}

fn stats_dto(snapshot: StatsSnapshot) -> StatsDto {
    StatsDto {
        stats: snapshot.stats,
        last_updated: snapshot.last_updated,
    }
}

async fn health(State(app): State<Arc<App>>) -> Json<ApiResponse<HealthStatus>> {
    let status = app.catalog.health().await;
    Json(ApiResponse::ok(status, app.catalog.now()))
}

async fn list_characters(State(app): State<Arc<App>>) -> ApiResult<Vec<CharacterDto>> {
    let result = app.catalog.characters().await?;
    Ok(Json(
        ApiResponse::list(character_dtos(&result.value), app.catalog.now())
            .with_cached(result.cached)
            .with_source(SOURCE_SQLITE),
    ))
}

async fn list_aliases(State(app): State<Arc<App>>) -> ApiResult<Vec<CharacterDto>> {
    let result = app.catalog.aliases().await?;
    Ok(Json(
        ApiResponse::list(character_dtos(&result.value), app.catalog.now())
            .with_cached(result.cached)
            .with_source(SOURCE_SQLITE),
    ))
}

async fn complete(State(app): State<Arc<App>>) -> ApiResult<CompleteData> {
    let snapshot = app.catalog.complete().await?;
    let data = CompleteData {
        characters: character_dtos(snapshot.catalog.characters()),
        aliases: character_dtos(snapshot.catalog.aliases()),
        stats: stats_dto(snapshot.stats),
    };
    Ok(Json(
        ApiResponse::ok(data, app.catalog.now()).with_source(SOURCE_SQLITE),
    ))
}

async fn search_characters(
    State(app): State<Arc<App>>,
    params: Result<Query<CharacterSearchQuery>, QueryRejection>,
) -> ApiResult<Vec<CharacterDto>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = params.to_query().map_err(ApiError::BadRequest)?;
    let hits = app.catalog.search_characters(&query).await?;
    Ok(Json(
        ApiResponse::list(character_dtos(&hits), app.catalog.now()).with_query(&params),
    ))
}

async fn stats(State(app): State<Arc<App>>) -> ApiResult<StatsDto> {
    let snapshot = app.catalog.stats().await?;
    Ok(Json(ApiResponse::ok(stats_dto(snapshot), app.catalog.now())))
}

async fn list_events(State(app): State<Arc<App>>) -> ApiResult<Vec<EventDto>> {
    let result = app.catalog.events().await?;
    let events: Vec<EventDto> = result.value.iter().map(EventDto::from).collect();
    Ok(Json(
        ApiResponse::list(events, app.catalog.now())
            .with_cached(result.cached)
            .with_source(SOURCE_SQLITE),
    ))
}

async fn search_events(
    State(app): State<Arc<App>>,
    params: Result<Query<EventSearchQuery>, QueryRejection>,
) -> ApiResult<Vec<EventDto>> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let hits = app.catalog.search_events(params.keyword()).await?;
    let events: Vec<EventDto> = hits.iter().map(EventDto::from).collect();
    Ok(Json(
        ApiResponse::list(events, app.catalog.now()).with_query(&params),
    ))
}

async fn get_event(
    State(app): State<Arc<App>>,
    Path(index): Path<String>,
) -> ApiResult<EventDto> {
    let event = app.catalog.event(&index).await?;
    Ok(Json(ApiResponse::ok(
        EventDto::from(&event),
        app.catalog.now(),
    )))
}

async fn event_cast(
    State(app): State<Arc<App>>,
    Path(index): Path<String>,
) -> ApiResult<EventCastLayout> {
    let layout = app.layout.event_cast(&index).await?;
    let count = layout.nodes.len();
    Ok(Json(
        ApiResponse::ok(layout, app.catalog.now()).with_count(count),
    ))
}

async fn refresh_cache(State(app): State<Arc<App>>) -> Json<ApiResponse<()>> {
    app.catalog.refresh().await;
    Json(ApiResponse::message("缓存已清除", app.catalog.now()))
}

async fn journey_layout(State(app): State<Arc<App>>) -> ApiResult<JourneyLayout> {
    let layout = app.layout.journey().await?;
    let count = layout.points.len();
    Ok(Json(
        ApiResponse::ok(layout, app.catalog.now()).with_count(count),
    ))
}

async fn galaxy_layout(
    State(app): State<Arc<App>>,
    params: Result<Query<LayoutQuery>, QueryRejection>,
) -> ApiResult<GalaxyLayout> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let layout = app.layout.galaxy(params.seed, params.tier);
    let count = layout.planets.len();
    Ok(Json(
        ApiResponse::ok(layout, app.catalog.now()).with_count(count),
    ))
}

async fn network_layout(
    State(app): State<Arc<App>>,
    params: Result<Query<NetworkQuery>, QueryRejection>,
) -> ApiResult<NetworkLayout> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let layout = app.layout.network(params.seed, params.formation, params.density);
    let count = layout.graph.nodes.len();
    Ok(Json(
        ApiResponse::ok(layout, app.catalog.now()).with_count(count),
    ))
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ApiResponse::<()>::error(message, Utc::now()))).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::InvalidInput(msg) => ApiError::BadRequest(msg),
            CatalogError::NotFound(msg) => ApiError::NotFound(msg),
            CatalogError::Repo(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use starmap_domain::{CharacterId, EventIndex, JourneyEvent, LayoutSeed};
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::ports::{MockCharacterRepo, MockEventRepo, RepoError};
    use crate::infrastructure::sqlite::{
        ensure_character_schema, ensure_event_schema, insert_character, insert_event, memory_pool,
        SqliteCharacterRepo, SqliteEventRepo,
    };

    async fn seeded_app() -> Arc<App> {
        let characters = memory_pool().await;
        ensure_character_schema(&characters).await.expect("schema");
        for character in [
            Character::new("c-1", "孙悟空", "主角")
                .with_pinyin("sun wukong")
                .with_rank(1)
                .with_power(95),
            Character::new("c-2", "白骨精", "妖魔").with_rank(2).with_power(55),
            Character::new("a-1", "美猴王", "主角")
                .with_rank(1)
                .as_alias_of(CharacterId::new("c-1")),
        ] {
            insert_character(&characters, &character).await.expect("insert");
        }

        let events = memory_pool().await;
        ensure_event_schema(&events).await.expect("schema");
        for (n, name, cast) in [(1u8, "金蝉遭贬", "唐僧"), (21, "黄风怪阻", "孙悟空，美猴王,黄风怪")] {
            let event = JourneyEvent::new(i64::from(n), EventIndex::new(n).expect("index"), name)
                .with_characters(cast);
            insert_event(&events, &event).await.expect("insert");
        }

        Arc::new(App::new(
            Arc::new(SqliteCharacterRepo::new(characters)),
            Arc::new(SqliteEventRepo::new(events)),
            Arc::new(SystemClock),
            Duration::from_secs(300),
            LayoutSeed(1),
        ))
    }

    async fn call(app: &Arc<App>, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = routes()
            .with_state(Arc::clone(app))
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    async fn get_json(app: &Arc<App>, uri: &str) -> (StatusCode, Value) {
        call(app, "GET", uri).await
    }

    #[tokio::test]
    async fn character_list_reports_cache_state() {
        let app = seeded_app().await;

        let (status, body) = get_json(&app, "/api/characters").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        assert_eq!(body["cached"], false);
        assert_eq!(body["source"], "sqlite");
        assert_eq!(body["data"][0]["name"], "孙悟空");

        let (_, again) = get_json(&app, "/api/characters").await;
        assert_eq!(again["cached"], true);

        let (status, refreshed) = call(&app, "POST", "/api/cache/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(refreshed["message"], "缓存已清除");

        let (_, after) = get_json(&app, "/api/characters").await;
        assert_eq!(after["cached"], false);
    }

    #[tokio::test]
    async fn aliases_and_complete_data() {
        let app = seeded_app().await;

        let (_, aliases) = get_json(&app, "/api/aliases").await;
        assert_eq!(aliases["count"], 1);
        assert_eq!(aliases["data"][0]["aliasOf"], "c-1");

        let (status, complete) = get_json(&app, "/api/data/complete").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(complete["data"]["characters"].as_array().map(Vec::len), Some(2));
        assert_eq!(complete["data"]["stats"]["totalEvents"], 2);
        assert!(complete["data"]["stats"]["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn character_search_filters_and_echoes_query() {
        let app = seeded_app().await;

        let (status, body) = get_json(&app, "/api/characters/search?minPower=80").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["query"]["minPower"], "80");

        let (status, none) = get_json(&app, "/api/characters/search?q=%E5%94%90%E5%83%A7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(none["count"], 0);
    }

    #[tokio::test]
    async fn malformed_power_is_a_bad_request() {
        let app = seeded_app().await;
        let (status, body) = get_json(&app, "/api/characters/search?maxPower=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("maxPower")));
    }

    #[tokio::test]
    async fn event_lookup_status_codes() {
        let app = seeded_app().await;

        let (status, body) = get_json(&app, "/api/events/21").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nanming"], "黄风怪阻");

        let (status, body) = get_json(&app, "/api/events/82").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "难次必须是1-81之间的数字");

        let (status, body) = get_json(&app, "/api/events/2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "未找到第2难的数据");
    }

    #[tokio::test]
    async fn event_search_requires_keyword() {
        let app = seeded_app().await;

        let (status, body) = get_json(&app, "/api/events/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "请提供搜索关键词");

        let (status, body) = get_json(&app, "/api/events/search?q=%E9%BB%84%E9%A3%8E").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["query"]["q"], "黄风");
    }

    #[tokio::test]
    async fn events_are_listed_in_order() {
        let app = seeded_app().await;
        let (_, body) = get_json(&app, "/api/events").await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["nanci"], 1);
        assert_eq!(body["data"][1]["nanci"], 21);
    }

    #[tokio::test]
    async fn stats_and_health() {
        let app = seeded_app().await;

        let (_, stats) = get_json(&app, "/api/stats").await;
        assert_eq!(stats["data"]["totalCharacters"], 2);
        assert_eq!(stats["data"]["totalAliases"], 1);

        let (status, health) = get_json(&app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["data"]["status"], "ok");
        assert_eq!(health["data"]["characters"], 2);
        assert_eq!(health["data"]["events"], 2);
    }

    #[tokio::test]
    async fn layout_endpoints() {
        let app = seeded_app().await;

        let (status, journey) = get_json(&app, "/api/layout/journey").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(journey["count"], 81);
        assert_eq!(journey["data"]["populated"], 2);

        let (status, galaxy) = get_json(&app, "/api/layout/galaxy?seed=9&tier=low").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(galaxy["data"]["seed"], 9);
        assert_eq!(galaxy["count"], 2000);

        let (status, body) = get_json(&app, "/api/layout/galaxy?tier=cinematic").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, network) =
            get_json(&app, "/api/layout/network?seed=3&formation=synapticCloud&density=0.5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(network["data"]["formation"], "synapticCloud");
        assert_eq!(network["data"]["label"], "突触云");
        assert!(network["count"].as_u64().is_some_and(|n| n > 0));

        let (status, _) = get_json(&app, "/api/layout/network?density=thick").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn event_cast_endpoint() {
        let app = seeded_app().await;

        let (status, body) = get_json(&app, "/api/events/21/characters").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        assert_eq!(body["data"]["nanci"], 21);
        assert_eq!(body["data"]["resolved"], 1);
        assert_eq!(body["data"]["nodes"][0]["id"], "c-1");
        assert_eq!(body["data"]["nodes"][0]["resolved"], true);
        // alias records are not matched, only the alias lists of canonical characters
        assert_eq!(body["data"]["nodes"][1]["id"], "temp-1");
        assert_eq!(body["data"]["nodes"][2]["id"], "temp-2");
        assert_eq!(body["data"]["nodes"][2]["resolved"], false);

        let (status, _) = get_json(&app, "/api/events/abc/characters").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = get_json(&app, "/api/events/40/characters").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "未找到第40难的数据");
    }

    #[tokio::test]
    async fn storage_failures_hide_details() {
        let mut characters = MockCharacterRepo::new();
        characters
            .expect_list()
            .returning(|_| Err(RepoError::database("list_characters", "disk I/O error at /secret")));
        let app = Arc::new(App::new(
            Arc::new(characters),
            Arc::new(MockEventRepo::new()),
            Arc::new(SystemClock),
            Duration::from_secs(300),
            LayoutSeed(1),
        ));

        let (status, body) = get_json(&app, "/api/characters").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
        assert!(body["timestamp"].is_string());
    }
}

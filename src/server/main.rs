//! HTTP facade for the region resolution engine.
//!
//! Loads the gazetteer snapshot once at startup, then serves resolution,
//! autocomplete, and listing endpoints over the shared immutable index.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bolge::api::{CoordinateApi, Health, RegionListEntry, ResolveResponse};
use bolge::config::Config;
use bolge::error::{ErrorBody, ResolveError};
use bolge::index::Suggestion;
use bolge::loader::load_regions;
use bolge::models::RegionKind;
use bolge::resolve::RegionKindHint;
use bolge::store::RegionStore;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Region resolution server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Config file with dataset paths and resolver tuning
    #[arg(short, long, default_value = "bolge.toml")]
    config: PathBuf,
}

struct AppState {
    api: CoordinateApi,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load_from_file(&args.config)?;

    let started = Instant::now();
    let regions = load_regions(&config.data.provinces, &config.data.districts)?;
    let store = Arc::new(RegionStore::new(regions)?);
    let api = CoordinateApi::new(store, config.resolver);
    info!("Gazetteer and index ready in {:.2?}", started.elapsed());

    let state = Arc::new(AppState { api });

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/resolve", get(resolve_handler))
        .route("/v1/autocomplete", get(autocomplete_handler))
        .route("/v1/regions", get(regions_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(state.api.health())
}

#[derive(Deserialize)]
struct ResolveParams {
    /// Free-text query: one or more place names
    text: String,
    /// Region kind hint: "province", "district", or "auto"
    #[serde(default)]
    hint: RegionKindHint,
}

async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<ResolveResponse>, (StatusCode, Json<ErrorBody>)> {
    state
        .api
        .resolve_and_aggregate(&params.text, params.hint)
        .map(Json)
        .map_err(|err| {
            tracing::debug!("Resolution failed: {err}");
            (error_status(&err), Json(ErrorBody::from(&err)))
        })
}

fn error_status(err: &ResolveError) -> StatusCode {
    match err {
        ResolveError::EmptyQuery | ResolveError::TooManyMatches { .. } => StatusCode::BAD_REQUEST,
        ResolveError::NoRegionFound { .. } => StatusCode::NOT_FOUND,
        ResolveError::Aggregate(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

#[derive(Deserialize)]
struct AutocompleteParams {
    /// Name fragment
    text: String,
    /// Maximum number of suggestions
    limit: Option<usize>,
}

async fn autocomplete_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteParams>,
) -> Json<Vec<Suggestion>> {
    let limit = params.limit.unwrap_or(10).min(40);
    Json(state.api.suggest(&params.text, limit))
}

#[derive(Deserialize)]
struct RegionsParams {
    /// Region kind: "province" or "district"
    kind: RegionKind,
    /// Preferred name locale (canonical Turkish names are the fallback)
    lang: Option<String>,
}

async fn regions_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RegionsParams>,
) -> Json<Vec<RegionListEntry>> {
    let lang = params.lang.as_deref().unwrap_or("tr");
    Json(state.api.list_regions(params.kind, lang))
}

mod auth;
mod catalog;
mod config;
mod dashboard;
mod db;
mod errors;
mod models;
mod profiles;
mod quiz;
mod rate_limit;
mod routes;
mod state;
mod users;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, HistoryBackend};
use crate::db::{create_pool, run_migrations};
use crate::quiz::bank::QuestionBank;
use crate::quiz::history::{InMemoryResultLog, PgResultLog, ResultLog};
use crate::quiz::recommend::DegreeCatalog;
use crate::quiz::store::SessionStore;
use crate::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; startup fails on missing required env vars
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lumen API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    let question_bank = QuestionBank::load(config.question_bank_path.as_deref())?;
    info!("Question bank loaded: {} subjects", question_bank.subjects().len());

    let degree_catalog = DegreeCatalog::load(config.degree_programs_path.as_deref())?;
    let orphans = degree_catalog.orphaned_subjects(&question_bank);
    if !orphans.is_empty() {
        warn!("Degree programs for unknown subjects will never be recommended: {orphans:?}");
    }

    let results: Arc<dyn ResultLog> = match config.history_backend {
        HistoryBackend::Postgres => Arc::new(PgResultLog::new(db.clone())),
        HistoryBackend::Memory => {
            warn!("Quiz history is kept in memory and will be lost on restart");
            Arc::new(InMemoryResultLog::new())
        }
    };

    let state = AppState {
        db,
        config: config.clone(),
        question_bank: Arc::new(question_bank),
        degree_catalog: Arc::new(degree_catalog),
        quiz_sessions: Arc::new(SessionStore::new()),
        results,
        rate_limiter: Arc::new(RateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window,
        )),
    };

    match &config.frontend_url {
        Some(origin) => info!("CORS enabled for {origin:?}"),
        None => warn!("FRONTEND_URL is not set; CORS allows any origin"),
    }
    info!(
        "Rate limiting: {} requests per {:?} per IP",
        config.rate_limit_max, config.rate_limit_window
    );

    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

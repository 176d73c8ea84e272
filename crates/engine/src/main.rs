//! Skirmish Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_engine::api;
use skirmish_engine::app::App;
use skirmish_engine::infrastructure::{
    clock::SystemClock,
    config::{EngineConfig, NarrationProvider},
    narration::{DisabledNarrator, LlmNarrator, TemplateNarrator},
    ollama::OllamaClient,
    persistence::{connect, SqliteBattleLog, SqliteCombatantRepo},
    ports::{ClockPort, NarrationPort},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skirmish_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Skirmish Engine");

    let config = EngineConfig::from_env();

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);

    // One SQLite file for the catalog and the battle log
    tracing::info!(path = %config.battle_db, "Opening battle database");
    let pool = connect(&config.battle_db).await?;
    let catalog = Arc::new(SqliteCombatantRepo::new(pool.clone()));
    if config.seed_demo_catalog {
        catalog.seed_demo().await?;
    }
    let battle_log = Arc::new(SqliteBattleLog::new(pool, clock.clone()));

    let narrator: Arc<dyn NarrationPort> = match config.narration_provider {
        NarrationProvider::Llm => {
            let client = OllamaClient::new(&config.llm_base_url, &config.llm_model)
                .with_api_key(config.llm_api_key.clone());
            tracing::info!(
                base_url = %config.llm_base_url,
                model = client.model(),
                timeout_ms = config.battle.narration_timeout.as_millis() as u64,
                "Narration via LLM"
            );
            Arc::new(LlmNarrator::new(Arc::new(client)))
        }
        NarrationProvider::Template => {
            tracing::info!("Narration via templates");
            Arc::new(TemplateNarrator)
        }
        NarrationProvider::Disabled => {
            tracing::info!("Narration disabled, every turn gets the fallback caption");
            Arc::new(DisabledNarrator)
        }
    };

    let app = Arc::new(App::new(
        catalog,
        battle_log,
        narrator,
        config.battle.clone(),
    ));

    // Spawn registry sweeper
    let sweep_app = app.clone();
    let sweep_interval = config.registry_sweep_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            sweep_app.sweep_registry();
        }
    });

    let mut router = api::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
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

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}

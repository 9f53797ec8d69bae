mod auth;
mod config;
mod errors;
mod llm_client;
mod models;
mod ranking;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::TokenSigner;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{
    seed::load_seed_file, KvStore, MemoryStore, RedisStore, ACCOUNT_NAMESPACE, AREA_NAMESPACE,
    CONTACT_NAMESPACE,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ecosystem API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize key-value stores
    let (accounts, areas, contacts) = build_stores(&config).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone(), &config.openai_base_url)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let tokens = TokenSigner::new(&config.jwt_secret, config.token_ttl_secs);

    // Build app state
    let state = AppState::new(accounts, areas, contacts, Arc::new(llm), tokens);

    if let Some(seed_file) = &config.seed_file {
        load_seed_file(seed_file, &state.areas, &state.contacts).await?;
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type Stores = (Arc<dyn KvStore>, Arc<dyn KvStore>, Arc<dyn KvStore>);

/// Account, area and contact stores: Redis when configured, otherwise in-memory.
async fn build_stores(config: &Config) -> Result<Stores> {
    match &config.redis_url {
        Some(url) => {
            let accounts = RedisStore::connect(url, ACCOUNT_NAMESPACE).await?;
            let conn = accounts.connection();
            Ok((
                Arc::new(accounts),
                Arc::new(RedisStore::with_connection(conn.clone(), AREA_NAMESPACE)),
                Arc::new(RedisStore::with_connection(conn, CONTACT_NAMESPACE)),
            ))
        }
        None => {
            warn!("REDIS_URL not set; using in-memory store (data is lost on restart)");
            Ok((
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryStore::new()),
                Arc::new(MemoryStore::new()),
            ))
        }
    }
}

//! Hearthage World Server
//!
//! Authoritative simulation server: one world, stepped on proposals and a
//! passive timer, broadcast to every WebSocket client.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use hearthage_core::{generate_world, load_rules, RulesSource, SimRng};
use hearthage_server::{build_router, spawn_session, AppState, ExternalPlanner, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("hearthage_server=info")
        .init();

    let config = ServerConfig::from_env();

    let rules = match load_rules(RulesSource::Embedded) {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!("Failed to load rules: {e}");
            std::process::exit(1);
        }
    };

    let seed = config.world_seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    let world = generate_world(&rules, seed);
    let rng = SimRng::seed_from_u64(seed);

    let session = spawn_session(rules, world, rng, config.tick_interval);
    let planner = ExternalPlanner::from_config(&config.planner).map(Arc::new);
    let state = Arc::new(AppState { session, planner });

    info!("Hearthage Server v{}", env!("CARGO_PKG_VERSION"));
    info!("World seed: {seed}");
    info!("Listening on {}", config.bind_address);

    let listener = match tokio::net::TcpListener::bind(config.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", config.bind_address);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, build_router(state)).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

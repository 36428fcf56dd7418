use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::file::wrestler_store::WrestlerStore;
use service::roster::store::RosterStore;

use crate::routes::{self, ServerState};

fn init_logging() {
    common::logging::init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(5000);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Load the backing file path from configs or env, with a fixed fallback
fn load_store_path() -> String {
    match configs::load_default() {
        Ok(cfg) => cfg.store.path,
        Err(_) => env::var("STORE_PATH").unwrap_or_else(|_| "data/wrestlers.json".to_string()),
    }
}

/// Public entry: load the roster and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // An unreadable or malformed backing file is fatal at startup.
    let store_path = load_store_path();
    let roster = WrestlerStore::open(&store_path).await?;
    let loaded = roster.list().await.len();
    info!(%store_path, wrestlers = loaded, "roster loaded");

    let state = ServerState {
        roster: roster as Arc<dyn RosterStore>,
    };

    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    let addr = load_bind_addr()?;
    info!(%addr, "starting wrestler api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

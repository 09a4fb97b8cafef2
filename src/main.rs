//! Skillforge · Quiz Game Backend
//!
//! - Axum HTTP + WebSocket API over the level scoring & placement engine
//! - JSON level catalog loaded once at startup (built-in seeds otherwise)
//! - Static game frontends served from ./static
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   CATALOG_PATH      : path to a JSON level catalog (startup fails if broken)
//!   GAME_CONFIG_PATH  : path to TOML config (scoring weights, catalog path)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod placement;
mod scoring;
mod hints;
mod session;
mod catalog;
mod seeds;
mod config;
mod state;
mod protocol;
mod logic;
mod routes;

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (level catalog, weights, session store).
  // Catalog problems are fatal here; no partial sessions.
  let state = AppState::new()?;

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "skillforge_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}

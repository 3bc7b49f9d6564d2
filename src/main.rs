//! Cognitive Console · browser-facing host for the coding workspace
//!
//! - Axum HTTP + WebSocket API; one socket drives one problem or topic workspace
//! - Problem catalog, judge and Socratic tutor reached over HTTP at one backend URL
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   BACKEND_BASE_URL    : default "http://localhost:8000"; overrides the config file
//!   CONSOLE_CONFIG_PATH : path to TOML config (backend, tutor texts, context window, topics)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod wire;
mod config;
mod gateway;
mod backend;
mod buffer;
mod pipeline;
mod conversation;
mod report;
mod session;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Config + one HTTP client shared by the catalog, judge and tutor gateways.
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "console_host", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}

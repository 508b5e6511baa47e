//! quizbench · AI quiz and guess-the-prompt backend
//!
//! - Axum JSON API with per-session quiz progress (signed cookie)
//! - Optional OpenAI integration for grading, help and similarity judgement
//! - Static files fallback (./static)
//!
//! Important env variables:
//!   PORT                 : u16 (default 5000)
//!   SESSION_SECRET       : key for signing the session cookie
//!   SESSION_IDLE_MINUTES : idle sessions are evicted after this (default 120)
//!   OPENAI_API_KEY       : enables the AI endpoints if present (503 otherwise)
//!   OPENAI_BASE_URL      : default "https://api.openai.com/v1"
//!   OPENAI_QUIZ_MODEL    : default "gpt-4o-mini"
//!   OPENAI_GAME_MODEL    : default "gpt-4o"
//!   QUIZ_CONFIG_PATH     : path to TOML config (prompts + questions + game content)
//!   STATIC_DIR           : default "./static"
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod quiz;
mod session;
mod state;
mod protocol;
mod grading;
mod guess;
mod logic;
mod openai;
mod routes;
#[cfg(test)]
mod testing;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{LogSettings, Settings};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing(&LogSettings::from_env());

  let settings = Settings::from_env();

  // Shared application state (content, session store, generators, prompts).
  let state = Arc::new(AppState::new(&settings));

  let app = build_router(state, &settings.static_dir);

  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "quizbench", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "quizbench", error = %e, "Failed to listen for shutdown signal");
  }
  info!(target: "quizbench", "Shutdown signal received");
}

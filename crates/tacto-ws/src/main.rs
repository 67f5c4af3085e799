//! `tacto-bridge`: runs a Tacto engine behind the WebSocket bridge.
//!
//! Environment:
//! - `TACTO_WS_PORT` (default 3030)
//! - `TACTO_PIXEL_RATIO` (default 1.0)
//! - `TACTO_SCREEN_WIDTH`, `TACTO_SCREEN_HEIGHT` in dp (default 400x800)
//! - `RUST_LOG` (default `info`)

use std::str::FromStr;

use tacto::Engine;
use tacto_ws::{start_server, WebSocketState, DEFAULT_WS_PORT};

fn env_or<T: FromStr>(key: &str, default: T) -> T {
  match std::env::var(key) {
    Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
      log::warn!("Ignoring invalid {key}={raw:?}");
      default
    }),
    Err(_) => default,
  }
}

#[tokio::main]
async fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let defaults = tacto::EngineConfig::default();
  let engine = Engine::builder()
    .screen_size(
      env_or("TACTO_SCREEN_WIDTH", defaults.screen_width),
      env_or("TACTO_SCREEN_HEIGHT", defaults.screen_height),
    )
    .pixel_ratio(env_or("TACTO_PIXEL_RATIO", defaults.pixel_ratio))
    .build();

  let engine = match engine {
    Ok(engine) => engine,
    Err(e) => {
      log::error!("Failed to start engine: {e}");
      std::process::exit(1);
    }
  };
  log::info!("Engine ready: {:?}", engine.config());

  let port = env_or("TACTO_WS_PORT", DEFAULT_WS_PORT);
  if let Err(e) = start_server(WebSocketState::with_port(engine, port)).await {
    log::error!("WebSocket server failed on port {port}: {e}");
    std::process::exit(1);
  }
}

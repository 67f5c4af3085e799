/*!
WebSocket bridge.

Every client receives a `sync:init` snapshot on connect, then the engine's
event stream. Text frames are JSON-RPC requests of the form
`{"id", "method", "args"}`; the reply echoes `id`. Events raised while a
request is handled are written before its reply.
*/

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
  extract::{
    ws::{Message, WebSocket, WebSocketUpgrade},
    State,
  },
  response::Response,
  routing::get,
  Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tacto::{Engine, Event};
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::cors::{Any, CorsLayer};

/// Default WebSocket server port.
pub const DEFAULT_WS_PORT: u16 = 3030;
/// Serialized events buffered per client before it counts as lagging.
const EVENT_BUFFER: usize = 1000;
/// Flush interval for debounced registrations (~60fps).
const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Handler for app-specific RPC methods. Returning `None` falls through to
/// the built-in methods.
pub type CustomRpcHandler = Arc<dyn Fn(&str, &Value) -> Option<Value> + Send + Sync>;

/// Shared state of the bridge: the engine plus the serialized event feed.
#[derive(Clone)]
pub struct WebSocketState {
  engine: Engine,
  events: Arc<broadcast::Sender<String>>,
  custom_handler: Option<CustomRpcHandler>,
  port: u16,
}

impl std::fmt::Debug for WebSocketState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WebSocketState")
      .field("port", &self.port)
      .field("clients", &self.events.receiver_count())
      .finish_non_exhaustive()
  }
}

/// Request envelope. Missing fields default so a bad method name is
/// reported by the dispatcher rather than as a parse failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Envelope {
  id: Value,
  method: String,
  args: Value,
}

impl WebSocketState {
  /// Bridge on [`DEFAULT_WS_PORT`].
  pub fn new(engine: Engine) -> Self {
    Self::with_port(engine, DEFAULT_WS_PORT)
  }

  /// Bridge on `port`.
  pub fn with_port(engine: Engine, port: u16) -> Self {
    let (events, _) = broadcast::channel::<String>(EVENT_BUFFER);
    Self {
      engine,
      events: Arc::new(events),
      custom_handler: None,
      port,
    }
  }

  /// Consult `handler` before the built-in methods.
  #[must_use]
  pub fn with_custom_handler(mut self, handler: CustomRpcHandler) -> Self {
    self.custom_handler = Some(handler);
    self
  }

  pub fn engine(&self) -> &Engine {
    &self.engine
  }

  /// Answer one raw request message.
  pub fn handle_request(&self, request: &str) -> String {
    let envelope: Envelope = match serde_json::from_str(request) {
      Ok(envelope) => envelope,
      Err(e) => return json!({ "error": format!("Invalid JSON: {e}") }).to_string(),
    };
    let Envelope { id, method, args } = envelope;

    let custom = self
      .custom_handler
      .as_ref()
      .and_then(|handler| handler(&method, &args));
    let mut reply =
      custom.unwrap_or_else(|| crate::rpc::dispatch_json(&self.engine, &method, &args));

    if let Value::Object(fields) = &mut reply {
      fields.insert("id".into(), id);
    }
    reply.to_string()
  }

  /// The `sync:init` message a new client starts from.
  fn sync_message(&self) -> Option<String> {
    let event = Event::SyncInit(Box::new(self.engine.snapshot()));
    match serde_json::to_string(&event) {
      Ok(message) => Some(message),
      Err(e) => {
        log::error!("Cannot serialize snapshot: {e}");
        None
      }
    }
  }
}

/// Serve the bridge until the listener fails.
pub async fn start_server(state: WebSocketState) -> std::io::Result<()> {
  tokio::spawn(forward_events(state.engine.clone(), state.events.clone()));
  tokio::spawn(flush_registrations(state.engine.clone()));

  let addr = format!("127.0.0.1:{}", state.port);
  let listener = tokio::net::TcpListener::bind(&addr).await?;
  log::info!("Bridge listening on ws://{addr}/ws");

  axum::serve(listener, router(state)).await
}

fn router(state: WebSocketState) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  Router::new()
    .route("/ws", get(upgrade))
    .layer(cors)
    .with_state(state)
}

/// Serialize engine events once and hand them to every client.
async fn forward_events(engine: Engine, events: Arc<broadcast::Sender<String>>) {
  let mut rx = engine.subscribe();
  while let Ok(event) = rx.recv().await {
    match serde_json::to_string(&event) {
      // No connected clients is not an error.
      Ok(message) => drop(events.send(message)),
      Err(e) => log::error!("Cannot serialize event: {e}"),
    }
  }
  log::debug!("Engine event stream closed");
}

async fn flush_registrations(engine: Engine) {
  let mut interval = tokio::time::interval(TICK_INTERVAL);
  loop {
    interval.tick().await;
    let registered = engine.tick(Instant::now());
    if registered > 0 {
      log::trace!("Registered {registered} debounced element(s)");
    }
  }
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
  ws.on_upgrade(|socket| serve_client(socket, state))
}

async fn serve_client(mut socket: WebSocket, state: WebSocketState) {
  // Subscribe before the snapshot so nothing falls between the two.
  let mut events = state.events.subscribe();
  let Some(sync) = state.sync_message() else {
    return;
  };
  if socket.send(Message::Text(sync)).await.is_err() {
    return;
  }
  log::info!("Bridge client attached");

  loop {
    tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(request))) => {
          let reply = state.handle_request(&request);
          while let Ok(event) = events.try_recv() {
            if socket.send(Message::Text(event)).await.is_err() {
              return;
            }
          }
          if socket.send(Message::Text(reply)).await.is_err() {
            break;
          }
        }
        // Pings are answered by axum; binary frames carry no requests.
        Some(Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_))) => {}
        Some(Ok(Message::Close(_))) | None => break,
        Some(Err(e)) => {
          log::debug!("Bridge client read failed: {e}");
          break;
        }
      },

      outgoing = events.recv() => match outgoing {
        Ok(event) => {
          if socket.send(Message::Text(event)).await.is_err() {
            break;
          }
        }
        Err(RecvError::Lagged(missed)) => {
          log::warn!("Bridge client missed {missed} events, resending sync:init");
          let Some(sync) = state.sync_message() else {
            break;
          };
          if socket.send(Message::Text(sync)).await.is_err() {
            break;
          }
        }
        Err(RecvError::Closed) => break,
      },
    }
  }
  log::info!("Bridge client detached");
}

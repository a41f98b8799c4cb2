pub mod appresult;
pub mod config;
pub mod conversations;
pub mod directory;
pub mod error;
pub mod events;
pub mod health;
pub mod relay;
pub mod sessions;
pub mod store;
pub mod transport;

use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::get};
use serde_json::Value;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;

pub use appresult::{AppError, AppResult};
pub use relay::Relay;
pub use transport::{ConnectionHub, ConnectionId, Transport};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub hub: Arc<ConnectionHub>,
}

impl AppState {
    /// Wires a relay to a fresh WebSocket hub.
    pub async fn load(store: Arc<dyn store::DocumentStore>) -> Self {
        let hub = Arc::new(ConnectionHub::new());
        let relay = Arc::new(Relay::load(store, hub.clone()).await);
        Self { relay, hub }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ws", get(transport::ws::connect))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

pub trait GetField {
    fn str_field(&self, field: &str) -> Option<&str>;
}

impl GetField for Value {
    fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field)?.as_str().filter(|s| !s.is_empty())
    }
}

/// Wall clock in unix milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

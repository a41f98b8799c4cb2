use std::sync::Arc;

use axum::{Json, debug_handler, extract::State};
use serde::Serialize;

use crate::{AppResult, AppState, ConnectionHub, Relay};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub connections: usize,
    pub online: usize,
}

#[debug_handler(state = AppState)]
pub async fn health(
    State(relay): State<Arc<Relay>>,
    State(hub): State<Arc<ConnectionHub>>,
) -> AppResult<Json<Health>> {
    relay.store().ping().await?;

    Ok(Json(Health {
        status: "ok",
        connections: hub.len(),
        online: relay.sessions().online_user_ids().len(),
    }))
}

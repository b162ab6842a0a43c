use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let backend = match state.client.ping().await {
        Ok(()) => json!({ "url": state.config.api_url, "reachable": true }),
        Err(e) => json!({ "url": state.config.api_url, "reachable": false, "error": e.to_string() }),
    };

    Json(json!({
        "status": "healthy",
        "service": "queryx-studio",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": backend,
    }))
}

use axum::{extract::State, response::Html, routing::get, Router};

use crate::state::AppState;
use crate::views::{dashboard, Banner};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(show_dashboard))
}

async fn show_dashboard(State(state): State<AppState>) -> Html<String> {
    match state.client.summary().await {
        Ok(summary) => dashboard::render(Some(&summary), None),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load dashboard stats");
            dashboard::render(None, Some(&Banner::error(format!("Failed to load stats: {e}"))))
        }
    }
}

//! QueryX Studio - Browser console for QueryX databases
//!
//! This crate serves a small web application in front of a QueryX API
//! server:
//! - Dashboard with table and column totals
//! - Table browser with create, edit and delete
//! - SQL and natural-language query execution
//! - Row insertion driven by table schemas
//!
//! Pages are rendered on the server and all forms work without JavaScript.

pub mod config;
pub mod error;
pub mod form;
pub mod routes;
pub mod state;
pub mod views;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .merge(routes::health::routes())
        // Views
        .merge(routes::dashboard::routes())
        .merge(routes::tables::routes())
        .merge(routes::query::routes())
        .merge(routes::data::routes())
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

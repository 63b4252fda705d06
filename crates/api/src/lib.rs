//! HTTP surface: one POST route per engine plus `/chat`, `/health` and
//! `/stats`, all behind permissive CORS.

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

use axum::{
    Router,
    http::{HeaderName, Method},
    routing::{get, post},
};
use engines::{ChannelFinder, FundingScout, Recommend, UseCase};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Headers browsers may send with cross-origin calls.
const ALLOWED_HEADERS: [&str; 8] = [
    "authorization",
    "x-client-info",
    "apikey",
    "content-type",
    "x-supabase-client-platform",
    "x-supabase-client-platform-version",
    "x-supabase-client-runtime",
    "x-supabase-client-runtime-version",
];

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static));

    Router::new()
        .route(&path::<Recommend>(), post(routes::run_use_case::<Recommend>))
        .route(&path::<ChannelFinder>(), post(routes::run_use_case::<ChannelFinder>))
        .route(&path::<FundingScout>(), post(routes::run_use_case::<FundingScout>))
        .route("/chat", post(routes::chat))
        .route("/health", get(routes::health))
        .route("/stats", get(routes::stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn path<U: UseCase>() -> String {
    format!("/{}", U::NAME)
}

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::application::TradingEngine;

/// Application state shared across handlers
pub struct AppState {
    pub engine: Arc<TradingEngine>,
}

impl AppState {
    pub fn new(engine: Arc<TradingEngine>) -> Self {
        AppState { engine }
    }
}

/// Create the RPC router. Every trading route answers `200 OK` with a
/// `TradeResult`; only undecodable requests get a 4xx.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Administration
        .route("/shares", post(handlers::add_share))
        .route("/shares/{share_type}", get(handlers::list_share_availability))
        .route(
            "/shares/{share_type}/{share_id}",
            delete(handlers::remove_share),
        )
        .route(
            "/markets/shares/{share_type}",
            get(handlers::list_all_markets_availability),
        )
        // Trading
        .route("/trades/purchase", post(handlers::purchase_share))
        .route("/trades/sell", post(handlers::sell_share))
        .route("/trades/purchase-remote", post(handlers::purchase_remote_share))
        .route("/trades/sell-remote", post(handlers::sell_remote_share))
        .route("/trades/swap", post(handlers::swap_shares))
        .route("/buyers/{buyer_id}/shares", get(handlers::get_shares))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use bourse_core::{
    AddShareRequest, HealthResponse, RemoteTradeRequest, SwapRequest, TradeRequest, TradeResult,
};
use std::sync::Arc;

use super::{ApiError, AppState};

type Body<T> = Result<Json<T>, JsonRejection>;

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        market: state.engine.market().to_string(),
    })
}

/// POST /shares
pub async fn add_share(
    State(state): State<Arc<AppState>>,
    body: Body<AddShareRequest>,
) -> Result<Json<TradeResult>, ApiError> {
    let Json(req) = body?;
    Ok(Json(
        state
            .engine
            .add_share(&req.share_id, &req.share_type, req.capacity),
    ))
}

/// DELETE /shares/{share_type}/{share_id}
pub async fn remove_share(
    State(state): State<Arc<AppState>>,
    Path((share_type, share_id)): Path<(String, String)>,
) -> Json<TradeResult> {
    Json(state.engine.remove_share(&share_id, &share_type))
}

/// GET /shares/{share_type}
pub async fn list_share_availability(
    State(state): State<Arc<AppState>>,
    Path(share_type): Path<String>,
) -> Json<TradeResult> {
    Json(state.engine.list_share_availability(&share_type))
}

/// GET /markets/shares/{share_type}
pub async fn list_all_markets_availability(
    State(state): State<Arc<AppState>>,
    Path(share_type): Path<String>,
) -> Json<TradeResult> {
    Json(state.engine.list_all_markets_availability(&share_type).await)
}

/// POST /trades/purchase
pub async fn purchase_share(
    State(state): State<Arc<AppState>>,
    body: Body<TradeRequest>,
) -> Result<Json<TradeResult>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.engine.purchase_share(
        &req.buyer_id,
        &req.share_id,
        &req.share_type,
        req.quantity,
    )))
}

/// POST /trades/sell
pub async fn sell_share(
    State(state): State<Arc<AppState>>,
    body: Body<TradeRequest>,
) -> Result<Json<TradeResult>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.engine.sell_share(
        &req.buyer_id,
        &req.share_id,
        &req.share_type,
        req.quantity,
    )))
}

/// GET /buyers/{buyer_id}/shares
pub async fn get_shares(
    State(state): State<Arc<AppState>>,
    Path(buyer_id): Path<String>,
) -> Json<TradeResult> {
    Json(state.engine.get_shares(&buyer_id))
}

/// POST /trades/purchase-remote
pub async fn purchase_remote_share(
    State(state): State<Arc<AppState>>,
    body: Body<RemoteTradeRequest>,
) -> Result<Json<TradeResult>, ApiError> {
    let Json(req) = body?;
    let result = state
        .engine
        .purchase_remote_share(
            &req.buyer_id,
            &req.share_id,
            &req.share_type,
            req.quantity,
            &req.target_market,
        )
        .await;
    Ok(Json(result))
}

/// POST /trades/sell-remote
pub async fn sell_remote_share(
    State(state): State<Arc<AppState>>,
    body: Body<RemoteTradeRequest>,
) -> Result<Json<TradeResult>, ApiError> {
    let Json(req) = body?;
    let result = state
        .engine
        .sell_remote_share(
            &req.buyer_id,
            &req.share_id,
            &req.share_type,
            req.quantity,
            &req.target_market,
        )
        .await;
    Ok(Json(result))
}

/// POST /trades/swap
pub async fn swap_shares(
    State(state): State<Arc<AppState>>,
    body: Body<SwapRequest>,
) -> Result<Json<TradeResult>, ApiError> {
    let Json(req) = body?;
    let result = state
        .engine
        .swap_shares(
            &req.buyer_id,
            &req.old_share_id,
            &req.old_share_type,
            &req.new_share_id,
            &req.new_share_type,
        )
        .await;
    Ok(Json(result))
}

//! JSON bodies of the node RPC surface, shared by the server and its clients.
//!
//! Identifiers and share types travel as plain strings; the receiving node
//! validates them and answers with a [`TradeResult`](crate::TradeResult).

use crate::values::Quantity;
use serde::{Deserialize, Serialize};

/// `POST /shares`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddShareRequest {
    pub share_id: String,
    pub share_type: String,
    pub capacity: Quantity,
}

/// `POST /trades/purchase`, `POST /trades/sell`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub buyer_id: String,
    pub share_id: String,
    pub share_type: String,
    pub quantity: Quantity,
}

/// `POST /trades/purchase-remote`, `POST /trades/sell-remote`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTradeRequest {
    pub buyer_id: String,
    pub share_id: String,
    pub share_type: String,
    pub quantity: Quantity,
    pub target_market: String,
}

/// `POST /trades/swap`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub buyer_id: String,
    pub old_share_id: String,
    pub old_share_type: String,
    pub new_share_id: String,
    pub new_share_type: String,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub market: String,
}

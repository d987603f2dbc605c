use async_trait::async_trait;
use bourse_core::{Quantity, TradeResult};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("peer answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("timed out waiting for peer")]
    Timeout,

    #[error("undecodable response: {0}")]
    Decode(String),
}

/// A peer node's trading operations, invoked as if issued locally at that node
#[async_trait]
pub trait RemoteMarket: Send + Sync {
    async fn purchase_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, RemoteError>;

    async fn sell_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, RemoteError>;
}

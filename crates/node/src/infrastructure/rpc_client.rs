use crate::application::ports::{RemoteError, RemoteMarket};
use async_trait::async_trait;
use bourse_core::{Quantity, TradeRequest, TradeResult};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Http(err.to_string())
        }
    }
}

/// RPC client for one peer node
///
/// Holds a long-lived `reqwest::Client`; the per-request timeout covers the
/// whole exchange including the response body.
#[derive(Debug, Clone)]
pub struct HttpMarketClient {
    client: Client,
    base_url: String,
}

impl HttpMarketClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_trade(&self, path: &str, body: &TradeRequest) -> Result<TradeResult, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, buyer = %body.buyer_id, share = %body.share_id, "peer RPC");
        let resp = self.client.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<TradeResult>()
            .await
            .map_err(|e| match RemoteError::from(e) {
                RemoteError::Http(msg) => RemoteError::Decode(msg),
                other => other,
            })
    }
}

fn trade(buyer_id: &str, share_id: &str, share_type: &str, quantity: Quantity) -> TradeRequest {
    TradeRequest {
        buyer_id: buyer_id.to_string(),
        share_id: share_id.to_string(),
        share_type: share_type.to_string(),
        quantity,
    }
}

#[async_trait]
impl RemoteMarket for HttpMarketClient {
    async fn purchase_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, RemoteError> {
        self.post_trade(
            "/trades/purchase",
            &trade(buyer_id, share_id, share_type, quantity),
        )
        .await
    }

    async fn sell_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, RemoteError> {
        self.post_trade("/trades/sell", &trade(buyer_id, share_id, share_type, quantity))
            .await
    }
}

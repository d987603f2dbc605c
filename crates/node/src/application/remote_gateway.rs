//! Outbound side of cross-market operations.
//!
//! Delegates purchase/sell to a peer's RPC endpoint and runs the command
//! sub-protocol (swap probe, swap execute, listing) against peers. Every
//! call is a single attempt; failures are returned, never retried.

use crate::application::peer_directory::{PeerDirectory, PeerHandle};
use crate::application::ports::{RemoteError, TransportError};
use bourse_core::{CommandReply, CommandRequest, Quantity, ShareKey, TradeResult};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("unknown market: {0}")]
    UnknownMarket(String),

    #[error("{source}")]
    Remote {
        market: String,
        #[source]
        source: RemoteError,
    },

    #[error("{source}")]
    Transport {
        market: String,
        #[source]
        source: TransportError,
    },
}

#[derive(Clone, Debug)]
pub struct RemoteGateway {
    peers: Arc<PeerDirectory>,
}

impl RemoteGateway {
    pub fn new(peers: Arc<PeerDirectory>) -> Self {
        Self { peers }
    }

    /// A gateway with no peers; every remote lookup fails with `UnknownMarket`
    pub fn isolated() -> Self {
        Self::new(Arc::new(PeerDirectory::new()))
    }

    pub fn peers(&self) -> &PeerDirectory {
        &self.peers
    }

    fn resolve(&self, market: &str) -> Result<&PeerHandle, GatewayError> {
        self.peers
            .get(market)
            .ok_or_else(|| GatewayError::UnknownMarket(market.to_string()))
    }

    pub async fn purchase_share(
        &self,
        market: &str,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, GatewayError> {
        let peer = self.resolve(market)?;
        debug!(market = %peer.market, buyer = buyer_id, share = share_id, "delegating purchase");
        peer.rpc
            .purchase_share(buyer_id, share_id, share_type, quantity)
            .await
            .map_err(|source| GatewayError::Remote {
                market: peer.market.clone(),
                source,
            })
    }

    pub async fn sell_share(
        &self,
        market: &str,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, GatewayError> {
        let peer = self.resolve(market)?;
        debug!(market = %peer.market, buyer = buyer_id, share = share_id, "delegating sell");
        peer.rpc
            .sell_share(buyer_id, share_id, share_type, quantity)
            .await
            .map_err(|source| GatewayError::Remote {
                market: peer.market.clone(),
                source,
            })
    }

    async fn exchange(
        &self,
        peer: &PeerHandle,
        request: &CommandRequest,
    ) -> Result<CommandReply, GatewayError> {
        peer.commands
            .send(request)
            .await
            .map_err(|source| GatewayError::Transport {
                market: peer.market.clone(),
                source,
            })
    }

    /// Probe peers in registration order; the first one reporting
    /// availability wins and later peers are not contacted.
    pub async fn find_swap_peer(&self, share: &ShareKey, count: Quantity) -> Option<PeerHandle> {
        let probe = CommandRequest::CheckSwapAvailability {
            share_id: share.share_id.to_string(),
            share_type: share.share_type.to_string(),
            required: count,
        };

        for peer in self.peers.iter() {
            match self.exchange(peer, &probe).await {
                Ok(reply) if reply.is_available() => {
                    debug!(market = %peer.market, share = %share, count, "swap capacity confirmed");
                    return Some(peer.clone());
                }
                Ok(reply) => {
                    debug!(market = %peer.market, share = %share, reply = %reply, "swap capacity refused");
                }
                Err(e) => {
                    warn!(market = %peer.market, error = %e, "swap availability probe failed");
                }
            }
        }
        None
    }

    pub async fn execute_swap(
        &self,
        peer: &PeerHandle,
        request: &CommandRequest,
    ) -> Result<CommandReply, GatewayError> {
        self.exchange(peer, request).await
    }

    /// `LIST_AVAILABILITY` against every peer, in registration order
    pub async fn list_availability(
        &self,
        share_type: &str,
    ) -> Vec<(String, Result<CommandReply, GatewayError>)> {
        let request = CommandRequest::ListAvailability {
            share_type: share_type.to_string(),
        };
        let mut replies = Vec::with_capacity(self.peers.len());
        for peer in self.peers.iter() {
            let reply = self.exchange(peer, &request).await;
            replies.push((peer.market.clone(), reply));
        }
        replies
    }
}

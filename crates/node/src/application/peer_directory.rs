//! Static peer directory
//!
//! Built once at node startup from configuration and shared read-only
//! afterwards. Iteration order is registration order, which is the order
//! the swap protocol probes peers in.

use crate::application::ports::{CommandChannel, RemoteMarket};
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// Long-lived client handles for one peer market
#[derive(Clone)]
pub struct PeerHandle {
    pub market: String,
    pub rpc: Arc<dyn RemoteMarket>,
    pub commands: Arc<dyn CommandChannel>,
}

impl std::fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerHandle")
            .field("market", &self.market)
            .finish_non_exhaustive()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("peer already registered: {0}")]
pub struct DuplicatePeer(pub String);

/// Market name → peer handles. Lookups ignore ASCII case.
#[derive(Clone, Default, Debug)]
pub struct PeerDirectory {
    peers: IndexMap<String, PeerHandle>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        market: impl Into<String>,
        rpc: Arc<dyn RemoteMarket>,
        commands: Arc<dyn CommandChannel>,
    ) -> Result<(), DuplicatePeer> {
        let market = market.into();
        let key = market.to_ascii_lowercase();
        if self.peers.contains_key(&key) {
            return Err(DuplicatePeer(market));
        }
        self.peers.insert(
            key,
            PeerHandle {
                market,
                rpc,
                commands,
            },
        );
        Ok(())
    }

    pub fn get(&self, market: &str) -> Option<&PeerHandle> {
        self.peers.get(&market.to_ascii_lowercase())
    }

    /// Peers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PeerHandle> {
        self.peers.values()
    }

    pub fn markets(&self) -> Vec<&str> {
        self.peers.values().map(|p| p.market.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

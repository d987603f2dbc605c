//! Bourse market node
//!
//! One node per city. Each node owns an in-memory registry of the shares it
//! issued plus the holdings of buyers who traded through it, and cooperates
//! with its peers so a buyer at one market can trade shares issued by
//! another.
//!
//! # Architecture
//!
//! - **Domain**: share registry and holdings ledger, plain data without locking
//! - **Application**: the trading engine (the node's single lock), the remote
//!   gateway and the port traits it talks through
//! - **Infrastructure**: UDP command transport, HTTP peer client, audit sinks,
//!   configuration
//! - **Presentation**: the HTTP/JSON RPC facade used by clients and peers
//!
//! # Example
//!
//! ```ignore
//! use bourse_node::{MarketNode, NodeConfig};
//! use bourse_core::MarketCode;
//!
//! #[tokio::main]
//! async fn main() {
//!     let node = MarketNode::from_config(NodeConfig::preset(MarketCode::London)).unwrap();
//!     node.run().await.unwrap();
//! }
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

pub use application::ports::{
    AuditEntry, AuditError, AuditSink, CommandChannel, RemoteError, RemoteMarket, TransportError,
};
pub use application::{GatewayError, PeerDirectory, PeerHandle, RemoteGateway, TradingEngine};
pub use error::NodeError;
pub use infrastructure::{
    CommandTransportServer, FileAuditSink, HttpMarketClient, InMemoryAuditSink, NodeConfig,
    NoopAuditSink, UdpCommandClient,
};
pub use presentation::rest::{AppState, create_router};

use axum::Router;
use std::sync::Arc;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{info, warn};

/// A configured market node: engine plus its two listeners
pub struct MarketNode {
    pub config: NodeConfig,
    engine: Arc<TradingEngine>,
}

impl MarketNode {
    /// Validate the configuration, build long-lived peer clients and the
    /// audit sink, and create the seed shares.
    pub fn from_config(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;

        let mut peers = PeerDirectory::new();
        for peer in &config.peers {
            let rpc = HttpMarketClient::new(&peer.rpc_url, config.timeouts.rpc()).map_err(
                |source| NodeError::PeerClient {
                    market: peer.market.clone(),
                    source,
                },
            )?;
            let commands = UdpCommandClient::new(&peer.command_address, config.timeouts.command());
            peers.register(&peer.market, Arc::new(rpc), Arc::new(commands))?;
        }

        let audit: Arc<dyn AuditSink> = if config.audit.enabled {
            let sink = FileAuditSink::open(&config.audit.directory, &config.market)?;
            info!(path = %sink.path().display(), "audit log opened");
            Arc::new(sink)
        } else {
            Arc::new(NoopAuditSink)
        };

        Ok(Self::with_parts(
            config,
            RemoteGateway::new(Arc::new(peers)),
            audit,
        ))
    }

    /// Assemble a node from prebuilt collaborators. Peers and audit settings
    /// in `config` are not consulted.
    pub fn with_parts(config: NodeConfig, gateway: RemoteGateway, audit: Arc<dyn AuditSink>) -> Self {
        let engine = Arc::new(TradingEngine::new(config.market.clone(), gateway, audit));

        for seed in &config.seed_shares {
            let result = engine.add_share(&seed.share_id, &seed.share_type, seed.capacity);
            if !result.is_success() {
                warn!(market = %config.market, share = %seed.share_id, reason = %result, "seed share skipped");
            }
        }

        Self { config, engine }
    }

    pub fn engine(&self) -> &Arc<TradingEngine> {
        &self.engine
    }

    /// Create the RPC router
    pub fn rest_router(&self) -> Router {
        create_router(Arc::new(AppState::new(Arc::clone(&self.engine))))
    }

    /// Bind both listeners from configuration and serve
    pub async fn run(self) -> Result<(), NodeError> {
        let listener = TcpListener::bind(self.config.server.rpc_addr()).await?;
        let socket = UdpSocket::bind(self.config.server.command_addr()).await?;
        self.serve(listener, socket).await
    }

    /// Serve RPC on `listener` and the command transport on `socket` until
    /// the RPC server stops.
    pub async fn serve(self, listener: TcpListener, socket: UdpSocket) -> Result<(), NodeError> {
        let router = self.rest_router();
        let commands = CommandTransportServer::new(socket, Arc::clone(&self.engine));
        let command_addr = commands.local_addr()?;
        let command_task = tokio::spawn(commands.run());

        info!(
            market = %self.config.market,
            rpc = %listener.local_addr()?,
            commands = %command_addr,
            peers = ?self.engine.gateway().peers().markets(),
            "market node started"
        );

        let served = axum::serve(listener, router).await;
        command_task.abort();
        served.map_err(NodeError::Io)
    }
}

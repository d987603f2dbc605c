pub mod audit;
pub mod command_transport;
pub mod config;
pub mod rpc_client;

pub use audit::{FileAuditSink, InMemoryAuditSink, NoopAuditSink};
pub use command_transport::{CommandTransportServer, UdpCommandClient};
pub use config::{ConfigError, NodeConfig, PeerConfig, SeedShareConfig};
pub use rpc_client::HttpMarketClient;

pub mod engine;
pub mod peer_directory;
pub mod ports;
pub mod remote_gateway;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::TradingEngine;
pub use peer_directory::{DuplicatePeer, PeerDirectory, PeerHandle};
pub use remote_gateway::{GatewayError, RemoteGateway};

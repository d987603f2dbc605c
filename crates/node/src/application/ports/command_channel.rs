use async_trait::async_trait;
use bourse_core::{CommandReply, CommandRequest};
use std::time::Duration;
use thiserror::Error;

/// Command transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("address resolution failed: {0}")]
    Resolve(String),

    #[error("socket bind failed: {0}")]
    Bind(std::io::Error),

    #[error("send failed: {0}")]
    Send(std::io::Error),

    #[error("receive failed: {0}")]
    Receive(std::io::Error),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("reply is not valid UTF-8")]
    Decode,

    #[error("reply exceeds {0} bytes")]
    Oversized(usize),
}

/// Request/response exchange with a peer's command transport server
///
/// One request, one reply, no retransmission.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn send(&self, request: &CommandRequest) -> Result<CommandReply, TransportError>;
}

use crate::application::DuplicatePeer;
use crate::application::ports::{AuditError, RemoteError};
use crate::infrastructure::ConfigError;
use thiserror::Error;

/// Node startup and serving errors
#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("audit log unavailable: {0}")]
    Audit(#[from] AuditError),

    #[error(transparent)]
    DuplicatePeer(#[from] DuplicatePeer),

    #[error("client for peer {market} could not be built: {source}")]
    PeerClient {
        market: String,
        #[source]
        source: RemoteError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

mod audit_sink;
mod command_channel;
mod remote_market;

pub use audit_sink::{AuditEntry, AuditError, AuditSink};
pub use command_channel::{CommandChannel, TransportError};
pub use remote_market::{RemoteError, RemoteMarket};

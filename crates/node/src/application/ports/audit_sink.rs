use chrono::{DateTime, Utc};
use thiserror::Error;

/// One audited operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Buyer or admin identity, or the market name for node-level actions
    pub actor: String,
    pub action: String,
    pub params: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable record of trading operations
///
/// Failures are reported to the caller but never change the outcome of the
/// operation being audited.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

//! Structured operation results.
//!
//! Every node operation answers with a [`TradeResult`]: an explicit outcome
//! plus the human-readable message clients print verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeOutcome {
    Success,
    /// Malformed identifier or quantity
    InvalidInput,
    InvalidShareType,
    AlreadyExists,
    NotFound,
    /// Listing produced no records
    NoneFound,
    NoHoldings,
    InsufficientCapacity,
    InsufficientHolding,
    NotOwned,
    SwapUnavailable,
    UnknownMarket,
    /// Transport, timeout or decoding failure talking to a peer
    RemoteCallFailed,
    InternalError,
}

impl TradeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TradeOutcome::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeResult {
    pub outcome: TradeOutcome,
    pub message: String,
}

impl TradeResult {
    pub fn new(outcome: TradeOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(TradeOutcome::Success, message)
    }

    pub fn failure(outcome: TradeOutcome, message: impl Into<String>) -> Self {
        Self::new(outcome, message)
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Keep the outcome, prepend context to the message
    pub fn prefixed(self, prefix: &str) -> Self {
        Self {
            outcome: self.outcome,
            message: format!("{}{}", prefix, self.message),
        }
    }
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

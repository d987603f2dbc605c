//! Domain errors for share and identifier handling

use crate::values::Quantity;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Invalid share type: {0}")]
    InvalidShareType(String),

    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    #[error("Not enough shares available. Required: {required}, Available: {available}")]
    InsufficientCapacity {
        required: Quantity,
        available: Quantity,
    },
}

use crate::entities::ShareType;
use crate::values::{Quantity, ShareId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one share issue: (type, id). Ids are only unique per type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShareKey {
    pub share_type: ShareType,
    pub share_id: ShareId,
}

impl ShareKey {
    pub fn new(share_type: ShareType, share_id: ShareId) -> Self {
        Self {
            share_type,
            share_id,
        }
    }
}

impl fmt::Display for ShareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.share_type, self.share_id)
    }
}

/// Snapshot of a single holding, as returned by listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub share_id: ShareId,
    pub share_type: ShareType,
    pub quantity: Quantity,
}

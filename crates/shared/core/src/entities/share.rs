use crate::entities::ShareKey;
use crate::error::ShareError;
use crate::values::{Quantity, ShareId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Share category. The set is fixed network-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShareType {
    Equity,
    Bonus,
    Dividend,
}

impl ShareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareType::Equity => "Equity",
            ShareType::Bonus => "Bonus",
            ShareType::Dividend => "Dividend",
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareType {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equity" => Ok(ShareType::Equity),
            "bonus" => Ok(ShareType::Bonus),
            "dividend" => Ok(ShareType::Dividend),
            _ => Err(ShareError::InvalidShareType(s.to_string())),
        }
    }
}

impl TryFrom<&str> for ShareType {
    type Error = ShareError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A tradable share issue owned by its origin market's registry
///
/// `available` only moves between 0 and `total`; `total` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub id: ShareId,
    pub share_type: ShareType,
    total: Quantity,
    available: Quantity,
    pub origin_market: String,
}

impl ShareRecord {
    pub fn new(
        id: ShareId,
        share_type: ShareType,
        capacity: Quantity,
        origin_market: impl Into<String>,
    ) -> Self {
        Self {
            id,
            share_type,
            total: capacity,
            available: capacity,
            origin_market: origin_market.into(),
        }
    }

    pub fn total_capacity(&self) -> Quantity {
        self.total
    }

    pub fn available_capacity(&self) -> Quantity {
        self.available
    }

    pub fn can_fill(&self, quantity: Quantity) -> bool {
        quantity <= self.available
    }

    /// Take `quantity` out of the available pool
    pub fn reserve(&mut self, quantity: Quantity) -> Result<(), ShareError> {
        if !self.can_fill(quantity) {
            return Err(ShareError::InsufficientCapacity {
                required: quantity,
                available: self.available,
            });
        }
        self.available -= quantity;
        Ok(())
    }

    /// Return `quantity` to the available pool, never beyond the total.
    /// Returns the amount actually released.
    pub fn release(&mut self, quantity: Quantity) -> Quantity {
        let room = self.total - self.available;
        let released = quantity.min(room);
        self.available += released;
        released
    }

    /// Registry and holdings key; displays as `<type>-<id>`
    pub fn key(&self) -> ShareKey {
        ShareKey::new(self.share_type, self.id.clone())
    }
}

//! Identifier value objects.
//!
//! Identifiers travel inside space-separated transport commands, so every
//! identifier is restricted to a short run of ASCII alphanumerics.

use crate::error::ShareError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum identifier length accepted anywhere in the network
pub const MAX_IDENTIFIER_LEN: usize = 32;

/// Quantity of shares (capacities, holdings, trade sizes)
pub type Quantity = u32;

fn validate(kind: &'static str, value: &str) -> Result<(), ShareError> {
    if value.is_empty() {
        return Err(ShareError::InvalidIdentifier {
            kind,
            value: value.to_string(),
            reason: "must not be empty",
        });
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ShareError::InvalidIdentifier {
            kind,
            value: value.to_string(),
            reason: "too long (max 32 chars)",
        });
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ShareError::InvalidIdentifier {
            kind,
            value: value.to_string(),
            reason: "must be ASCII alphanumeric",
        });
    }
    Ok(())
}

/// Share identifier, e.g. `NYKM100325` (market code, session letter, DDMMYY)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareId(String);

impl ShareId {
    pub fn new(value: impl Into<String>) -> Result<Self, ShareError> {
        let s: String = value.into();
        validate("share id", &s)?;
        Ok(ShareId(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Buyer (or admin) identity, e.g. `NYKB1234`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuyerId(String);

impl BuyerId {
    pub fn new(value: impl Into<String>) -> Result<Self, ShareError> {
        let s: String = value.into();
        validate("buyer id", &s)?;
        Ok(BuyerId(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_conversions {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = ShareError;
            fn try_from(value: &str) -> Result<Self, Self::Error> {
                $ty::new(value)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ShareError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                $ty::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> String {
                value.0
            }
        }
    };
}

string_conversions!(ShareId);
string_conversions!(BuyerId);

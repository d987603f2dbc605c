//! Bourse Core Domain
//!
//! Pure domain types shared by market nodes and their clients: share
//! records, holdings, identifiers, structured results and the inter-node
//! command protocol. No async, no I/O.

pub mod entities;
pub mod error;
pub mod outcome;
pub mod protocol;
pub mod rpc;
pub mod values;

pub use entities::{Holding, MarketCode, ShareKey, ShareRecord, ShareType};
pub use error::ShareError;
pub use outcome::{TradeOutcome, TradeResult};
pub use protocol::{CommandParseError, CommandReply, CommandRequest, MAX_DATAGRAM_LEN};
pub use rpc::{AddShareRequest, HealthResponse, RemoteTradeRequest, SwapRequest, TradeRequest};
pub use values::{BuyerId, MAX_IDENTIFIER_LEN, Quantity, ShareId};

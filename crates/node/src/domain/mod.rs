pub mod ledger;
pub mod registry;

pub use ledger::{HoldingsLedger, InsufficientHolding};
pub use registry::ShareRegistry;

/// Everything a node's engine guards behind its single lock
#[derive(Debug, Default)]
pub struct MarketState {
    pub registry: ShareRegistry,
    pub ledger: HoldingsLedger,
}

impl MarketState {
    pub fn new() -> Self {
        Self::default()
    }
}

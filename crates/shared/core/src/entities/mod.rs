mod holding;
mod market;
mod share;

pub use holding::{Holding, ShareKey};
pub use market::MarketCode;
pub use share::{ShareRecord, ShareType};

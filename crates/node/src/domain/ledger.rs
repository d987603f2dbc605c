use bourse_core::{BuyerId, Holding, Quantity, ShareKey};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Not enough shares to sell: held {held}, requested {requested}")]
pub struct InsufficientHolding {
    pub held: Quantity,
    pub requested: Quantity,
}

/// Buyer holdings recorded at one market node
///
/// Entries are strictly positive; an entry that reaches zero is removed,
/// and a buyer with no entries is removed as well.
#[derive(Debug, Default)]
pub struct HoldingsLedger {
    holdings: HashMap<BuyerId, BTreeMap<ShareKey, Quantity>>,
}

impl HoldingsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity held, zero if there is no entry
    pub fn quantity(&self, buyer: &BuyerId, key: &ShareKey) -> Quantity {
        self.holdings
            .get(buyer)
            .and_then(|entries| entries.get(key))
            .copied()
            .unwrap_or(0)
    }

    pub fn credit(&mut self, buyer: &BuyerId, key: &ShareKey, quantity: Quantity) {
        if quantity == 0 {
            return;
        }
        let held = self
            .holdings
            .entry(buyer.clone())
            .or_default()
            .entry(key.clone())
            .or_insert(0);
        *held = held.saturating_add(quantity);
    }

    /// Remove `quantity` from an entry, returning what is left
    pub fn debit(
        &mut self,
        buyer: &BuyerId,
        key: &ShareKey,
        quantity: Quantity,
    ) -> Result<Quantity, InsufficientHolding> {
        let held = self.quantity(buyer, key);
        if held < quantity {
            return Err(InsufficientHolding {
                held,
                requested: quantity,
            });
        }
        let remaining = held - quantity;
        self.set(buyer, key, remaining);
        Ok(remaining)
    }

    /// Drop an entry entirely, returning the quantity it held
    pub fn remove(&mut self, buyer: &BuyerId, key: &ShareKey) -> Quantity {
        let held = self.quantity(buyer, key);
        self.set(buyer, key, 0);
        held
    }

    /// Snapshot of a buyer's holdings, ordered by (type, id)
    pub fn holdings(&self, buyer: &BuyerId) -> Vec<Holding> {
        self.holdings
            .get(buyer)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, quantity)| Holding {
                        share_id: key.share_id.clone(),
                        share_type: key.share_type,
                        quantity: *quantity,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set(&mut self, buyer: &BuyerId, key: &ShareKey, quantity: Quantity) {
        if quantity > 0 {
            self.holdings
                .entry(buyer.clone())
                .or_default()
                .insert(key.clone(), quantity);
            return;
        }
        if let Some(entries) = self.holdings.get_mut(buyer) {
            entries.remove(key);
            if entries.is_empty() {
                self.holdings.remove(buyer);
            }
        }
    }
}

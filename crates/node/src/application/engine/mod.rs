//! Per-node trading engine.
//!
//! The engine is the node's synchronization boundary: registry and ledger
//! live together behind one `parking_lot::Mutex`, and every operation runs
//! its whole local critical section under that lock. The lock is never held
//! across an `.await`; cross-market operations release it before talking to
//! a peer and re-acquire it to apply the local side afterwards.

mod commands;
mod remote;
mod swap;

use crate::application::ports::{AuditEntry, AuditSink};
use crate::application::remote_gateway::RemoteGateway;
use crate::domain::MarketState;
use bourse_core::{
    BuyerId, MarketCode, Quantity, ShareId, ShareKey, ShareRecord, ShareType,
    TradeOutcome, TradeResult,
};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Either a finished result or an early rejection; both are answers.
type Attempt = Result<TradeResult, TradeResult>;

fn settle(attempt: Attempt) -> TradeResult {
    attempt.unwrap_or_else(|rejected| rejected)
}

fn invalid_input(e: impl std::fmt::Display) -> TradeResult {
    TradeResult::failure(TradeOutcome::InvalidInput, format!("Invalid input: {}", e))
}

fn invalid_share_type(share_type: &str) -> TradeResult {
    TradeResult::failure(
        TradeOutcome::InvalidShareType,
        format!(
            "Invalid share type: {}. Share type must be Equity, Bonus or Dividend",
            share_type
        ),
    )
}

fn parse_buyer(buyer_id: &str) -> Result<BuyerId, TradeResult> {
    BuyerId::new(buyer_id).map_err(invalid_input)
}

fn parse_share_key(share_id: &str, share_type: &str) -> Result<ShareKey, TradeResult> {
    let share_type: ShareType = share_type
        .parse()
        .map_err(|_| invalid_share_type(share_type))?;
    let share_id = ShareId::new(share_id).map_err(invalid_input)?;
    Ok(ShareKey::new(share_type, share_id))
}

fn require_positive(what: &str, quantity: Quantity) -> Result<Quantity, TradeResult> {
    if quantity == 0 {
        return Err(invalid_input(format!("{} must be at least 1", what)));
    }
    Ok(quantity)
}

pub struct TradingEngine {
    market: String,
    state: Mutex<MarketState>,
    gateway: RemoteGateway,
    audit: Arc<dyn AuditSink>,
}

impl TradingEngine {
    pub fn new(market: impl Into<String>, gateway: RemoteGateway, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            market: market.into(),
            state: Mutex::new(MarketState::new()),
            gateway,
            audit,
        }
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn gateway(&self) -> &RemoteGateway {
        &self.gateway
    }

    fn is_self(&self, market: &str) -> bool {
        self.market.eq_ignore_ascii_case(market)
    }

    /// Report a mutating operation to the audit sink. Sink failures are
    /// logged and otherwise ignored.
    fn audit(&self, actor: &str, action: &str, params: String, result: &TradeResult) {
        let entry = AuditEntry {
            actor: actor.to_string(),
            action: action.to_string(),
            params,
            success: result.is_success(),
            timestamp: Utc::now(),
        };
        if let Err(e) = self.audit.record(&entry) {
            warn!(market = %self.market, action, error = %e, "audit write failed");
        }
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    pub fn add_share(&self, share_id: &str, share_type: &str, capacity: Quantity) -> TradeResult {
        let result = settle(self.try_add_share(share_id, share_type, capacity));
        self.audit(
            &self.market,
            "Add Share",
            format!(
                "ShareID: {}, ShareType: {}, Capacity: {}",
                share_id, share_type, capacity
            ),
            &result,
        );
        result
    }

    fn try_add_share(&self, share_id: &str, share_type: &str, capacity: Quantity) -> Attempt {
        let share_type: ShareType = share_type.parse().map_err(|_| {
            TradeResult::failure(
                TradeOutcome::InvalidShareType,
                format!(
                    "Share not added: {}-{}. Share type must be Equity, Bonus or Dividend",
                    share_type, share_id
                ),
            )
        })?;
        let share_id = ShareId::new(share_id).map_err(invalid_input)?;
        let capacity = require_positive("capacity", capacity)?;

        if let Some(home) = MarketCode::from_identifier(share_id.as_str()) {
            if !home.name().eq_ignore_ascii_case(&self.market) {
                warn!(
                    market = %self.market,
                    share = %share_id,
                    home = %home,
                    "share id carries another market's code"
                );
            }
        }

        let record = ShareRecord::new(share_id, share_type, capacity, self.market.clone());
        let key = record.key();
        let mut state = self.state.lock();
        if state.registry.insert(record).is_err() {
            return Err(TradeResult::failure(
                TradeOutcome::AlreadyExists,
                format!(
                    "Share already exists with ID {} and Type {}",
                    key.share_id, key.share_type
                ),
            ));
        }
        drop(state);

        info!(market = %self.market, share = %key, capacity, "share added");
        Ok(TradeResult::success(format!("Share added successfully: {}", key)))
    }

    pub fn remove_share(&self, share_id: &str, share_type: &str) -> TradeResult {
        let result = settle(self.try_remove_share(share_id, share_type));
        self.audit(
            &self.market,
            "Remove Share",
            format!("ShareID: {}, ShareType: {}", share_id, share_type),
            &result,
        );
        result
    }

    fn try_remove_share(&self, share_id: &str, share_type: &str) -> Attempt {
        let key = parse_share_key(share_id, share_type)?;
        // Outstanding holdings against the share are left in place
        let removed = self.state.lock().registry.remove(&key);
        match removed {
            Some(_) => {
                info!(market = %self.market, share = %key, "share removed");
                Ok(TradeResult::success(format!(
                    "Share removed successfully: {}",
                    key
                )))
            }
            None => Err(TradeResult::failure(
                TradeOutcome::NotFound,
                format!("Share not available: {}", key),
            )),
        }
    }

    /// Snapshot of every share of one type at this node, ordered by id
    pub fn list_share_availability(&self, share_type: &str) -> TradeResult {
        self.listing(share_type, true)
    }

    fn listing(&self, share_type: &str, with_origin: bool) -> TradeResult {
        let none_found = || {
            TradeResult::failure(
                TradeOutcome::NoneFound,
                format!("No shares of type {} found.", share_type),
            )
        };
        let Ok(parsed) = share_type.parse::<ShareType>() else {
            return none_found();
        };

        let records = self.state.lock().registry.list(parsed);
        if records.is_empty() {
            return none_found();
        }

        let lines: Vec<String> = records
            .iter()
            .map(|r| {
                let line = format!(
                    "Share: {}, Type: {}, Available: {}",
                    r.id,
                    r.share_type,
                    r.available_capacity()
                );
                if with_origin {
                    format!("{}, Origin Market: {}", line, r.origin_market)
                } else {
                    line
                }
            })
            .collect();
        TradeResult::success(lines.join("\n"))
    }

    // ------------------------------------------------------------------
    // Local trading
    // ------------------------------------------------------------------

    pub fn purchase_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> TradeResult {
        let result = settle(self.try_purchase(buyer_id, share_id, share_type, quantity));
        self.audit(
            buyer_id,
            "Purchase Share",
            format!(
                "ShareID: {}, ShareType: {}, Quantity: {}",
                share_id, share_type, quantity
            ),
            &result,
        );
        result
    }

    fn try_purchase(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Attempt {
        let buyer = parse_buyer(buyer_id)?;
        let key = parse_share_key(share_id, share_type)?;
        let quantity = require_positive("quantity", quantity)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let record = state.registry.get_mut(&key).ok_or_else(|| {
            TradeResult::failure(
                TradeOutcome::NotFound,
                format!("Share not available: {}", key),
            )
        })?;
        record.reserve(quantity).map_err(|_| {
            TradeResult::failure(
                TradeOutcome::InsufficientCapacity,
                format!("Not enough shares available for {}", key),
            )
        })?;
        state.ledger.credit(&buyer, &key, quantity);
        drop(guard);

        debug!(market = %self.market, buyer = %buyer, share = %key, quantity, "purchase recorded");
        Ok(TradeResult::success(format!(
            "{} successfully purchased {} shares of {}",
            buyer, quantity, key
        )))
    }

    pub fn sell_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> TradeResult {
        let result = settle(self.try_sell(buyer_id, share_id, share_type, quantity));
        self.audit(
            buyer_id,
            "Sell Share",
            format!(
                "ShareID: {}, ShareType: {}, Quantity: {}",
                share_id, share_type, quantity
            ),
            &result,
        );
        result
    }

    fn try_sell(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Attempt {
        let buyer = parse_buyer(buyer_id)?;
        let key = parse_share_key(share_id, share_type)?;
        let quantity = require_positive("quantity", quantity)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let record = state.registry.get_mut(&key).ok_or_else(|| {
            TradeResult::failure(
                TradeOutcome::NotFound,
                format!("Share not found: {}", key.share_id),
            )
        })?;
        state.ledger.debit(&buyer, &key, quantity).map_err(|_| {
            TradeResult::failure(TradeOutcome::InsufficientHolding, "Not enough shares to sell")
        })?;
        let released = record.release(quantity);
        drop(guard);

        if released < quantity {
            // Holdings recorded against a re-added share can exceed its capacity
            warn!(
                market = %self.market,
                share = %key,
                quantity,
                released,
                "capacity already full, sell only partially restored it"
            );
        }
        debug!(market = %self.market, buyer = %buyer, share = %key, quantity, "sell recorded");
        Ok(TradeResult::success(format!(
            "{} successfully sold {} shares of {}",
            buyer, quantity, key.share_id
        )))
    }

    /// The buyer's holdings recorded at this node
    pub fn get_shares(&self, buyer_id: &str) -> TradeResult {
        let buyer = match parse_buyer(buyer_id) {
            Ok(buyer) => buyer,
            Err(rejected) => return rejected,
        };
        let holdings = self.state.lock().ledger.holdings(&buyer);
        if holdings.is_empty() {
            return TradeResult::failure(TradeOutcome::NoHoldings, "No shares found.");
        }
        let lines: Vec<String> = holdings
            .iter()
            .map(|h| {
                format!(
                    "Share: {}, Type: {}, Available: {}",
                    h.share_id, h.share_type, h.quantity
                )
            })
            .collect();
        TradeResult::success(lines.join("\n"))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Current record for a share, if it exists at this node
    pub fn share(&self, share_id: &str, share_type: &str) -> Option<ShareRecord> {
        let key = parse_share_key(share_id, share_type).ok()?;
        self.state.lock().registry.get(&key).cloned()
    }

    /// Quantity the buyer holds at this node; zero for unknown inputs
    pub fn holding(&self, buyer_id: &str, share_id: &str, share_type: &str) -> Quantity {
        let (Ok(buyer), Ok(key)) = (
            BuyerId::new(buyer_id),
            parse_share_key(share_id, share_type),
        ) else {
            return 0;
        };
        self.state.lock().ledger.quantity(&buyer, &key)
    }
}

impl std::fmt::Debug for TradingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingEngine")
            .field("market", &self.market)
            .field("peers", &self.gateway.peers().markets())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::BrokenAuditSink;
    use crate::infrastructure::audit::InMemoryAuditSink;

    fn engine() -> (TradingEngine, Arc<InMemoryAuditSink>) {
        let audit = Arc::new(InMemoryAuditSink::new());
        let engine = TradingEngine::new("NewYork", RemoteGateway::isolated(), audit.clone());
        (engine, audit)
    }

    #[test]
    fn test_add_share() {
        let (engine, _) = engine();
        let result = engine.add_share("NYKM100325", "Equity", 10);
        assert_eq!(result.outcome, TradeOutcome::Success);
        assert_eq!(result.message, "Share added successfully: Equity-NYKM100325");

        let record = engine.share("NYKM100325", "equity").unwrap();
        assert_eq!(record.total_capacity(), 10);
        assert_eq!(record.available_capacity(), 10);
        assert_eq!(record.origin_market, "NewYork");
    }

    #[test]
    fn test_add_share_rejects_unknown_type() {
        let (engine, _) = engine();
        let result = engine.add_share("X0000000AA", "Crypto", 10);
        assert_eq!(result.outcome, TradeOutcome::InvalidShareType);
        assert_eq!(
            result.message,
            "Share not added: Crypto-X0000000AA. Share type must be Equity, Bonus or Dividend"
        );
    }

    #[test]
    fn test_add_share_rejects_duplicate() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 10);
        let result = engine.add_share("NYKM100325", "EQUITY", 3);
        assert_eq!(result.outcome, TradeOutcome::AlreadyExists);
        assert_eq!(engine.share("NYKM100325", "Equity").unwrap().total_capacity(), 10);

        // Ids are scoped per type
        assert!(engine.add_share("NYKM100325", "Bonus", 3).is_success());
    }

    #[test]
    fn test_add_share_rejects_bad_input() {
        let (engine, _) = engine();
        assert_eq!(
            engine.add_share("NYK M1", "Equity", 1).outcome,
            TradeOutcome::InvalidInput
        );
        assert_eq!(
            engine.add_share("NYKM100325", "Equity", 0).outcome,
            TradeOutcome::InvalidInput
        );
    }

    #[test]
    fn test_foreign_market_code_is_still_accepted() {
        let (engine, _) = engine();
        assert!(engine.add_share("TOKM100325", "Equity", 1).is_success());
    }

    #[test]
    fn test_remove_share() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 10);

        let result = engine.remove_share("NYKM100325", "Equity");
        assert_eq!(result.message, "Share removed successfully: Equity-NYKM100325");
        assert!(engine.share("NYKM100325", "Equity").is_none());

        let again = engine.remove_share("NYKM100325", "Equity");
        assert_eq!(again.outcome, TradeOutcome::NotFound);
        assert_eq!(again.message, "Share not available: Equity-NYKM100325");
    }

    #[test]
    fn test_list_share_availability() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 10);
        engine.add_share("NYKA100325", "Equity", 4);
        engine.add_share("NYKE100325", "Bonus", 4);

        let result = engine.list_share_availability("Equity");
        assert!(result.is_success());
        assert_eq!(
            result.message,
            "Share: NYKA100325, Type: Equity, Available: 4, Origin Market: NewYork\n\
             Share: NYKM100325, Type: Equity, Available: 10, Origin Market: NewYork"
        );

        let empty = engine.list_share_availability("Dividend");
        assert_eq!(empty.outcome, TradeOutcome::NoneFound);
        assert_eq!(empty.message, "No shares of type Dividend found.");

        let unknown = engine.list_share_availability("Crypto");
        assert_eq!(unknown.outcome, TradeOutcome::NoneFound);
    }

    #[test]
    fn test_purchase_and_sell_round_trip() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 10);

        let bought = engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 4);
        assert_eq!(
            bought.message,
            "NYKB0001 successfully purchased 4 shares of Equity-NYKM100325"
        );
        assert_eq!(engine.share("NYKM100325", "Equity").unwrap().available_capacity(), 6);
        assert_eq!(engine.holding("NYKB0001", "NYKM100325", "Equity"), 4);

        let sold = engine.sell_share("NYKB0001", "NYKM100325", "Equity", 4);
        assert_eq!(sold.message, "NYKB0001 successfully sold 4 shares of NYKM100325");
        assert_eq!(engine.share("NYKM100325", "Equity").unwrap().available_capacity(), 10);
        assert_eq!(engine.holding("NYKB0001", "NYKM100325", "Equity"), 0);
        assert_eq!(engine.get_shares("NYKB0001").outcome, TradeOutcome::NoHoldings);
    }

    #[test]
    fn test_purchase_beyond_capacity_changes_nothing() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 5);

        let result = engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 6);
        assert_eq!(result.outcome, TradeOutcome::InsufficientCapacity);
        assert_eq!(result.message, "Not enough shares available for Equity-NYKM100325");
        assert_eq!(engine.share("NYKM100325", "Equity").unwrap().available_capacity(), 5);
        assert_eq!(engine.holding("NYKB0001", "NYKM100325", "Equity"), 0);
    }

    #[test]
    fn test_purchase_unknown_share() {
        let (engine, _) = engine();
        let result = engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 1);
        assert_eq!(result.outcome, TradeOutcome::NotFound);
        assert_eq!(result.message, "Share not available: Equity-NYKM100325");
    }

    #[test]
    fn test_purchase_rejects_zero_quantity() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 5);
        let result = engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 0);
        assert_eq!(result.outcome, TradeOutcome::InvalidInput);
    }

    #[test]
    fn test_sell_more_than_held() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 10);
        engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 2);

        let result = engine.sell_share("NYKB0001", "NYKM100325", "Equity", 3);
        assert_eq!(result.outcome, TradeOutcome::InsufficientHolding);
        assert_eq!(result.message, "Not enough shares to sell");
        assert_eq!(engine.holding("NYKB0001", "NYKM100325", "Equity"), 2);
        assert_eq!(engine.share("NYKM100325", "Equity").unwrap().available_capacity(), 8);
    }

    #[test]
    fn test_sell_unknown_share() {
        let (engine, _) = engine();
        let result = engine.sell_share("NYKB0001", "NYKM100325", "Equity", 1);
        assert_eq!(result.outcome, TradeOutcome::NotFound);
        assert_eq!(result.message, "Share not found: NYKM100325");
    }

    #[test]
    fn test_get_shares_lists_holdings() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Equity", 10);
        engine.add_share("NYKA100325", "Bonus", 10);
        engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 2);
        engine.purchase_share("NYKB0001", "NYKA100325", "Bonus", 3);

        let result = engine.get_shares("NYKB0001");
        assert!(result.is_success());
        assert_eq!(
            result.message,
            "Share: NYKM100325, Type: Equity, Available: 2\n\
             Share: NYKA100325, Type: Bonus, Available: 3"
        );
    }

    #[test]
    fn test_capacity_stays_within_bounds_across_trades() {
        let (engine, _) = engine();
        engine.add_share("NYKM100325", "Dividend", 7);

        for (buyer, q) in [("NYKB0001", 3), ("NYKB0002", 4), ("NYKB0003", 1)] {
            engine.purchase_share(buyer, "NYKM100325", "Dividend", q);
            let available = engine.share("NYKM100325", "Dividend").unwrap().available_capacity();
            assert!(available <= 7);
        }
        assert_eq!(engine.holding("NYKB0003", "NYKM100325", "Dividend"), 0);

        engine.sell_share("NYKB0001", "NYKM100325", "Dividend", 3);
        engine.sell_share("NYKB0002", "NYKM100325", "Dividend", 4);
        assert_eq!(engine.share("NYKM100325", "Dividend").unwrap().available_capacity(), 7);
    }

    #[test]
    fn test_mutations_are_audited() {
        let (engine, audit) = engine();
        engine.add_share("NYKM100325", "Equity", 10);
        engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 20);
        engine.list_share_availability("Equity");

        let entries = audit.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "Add Share");
        assert_eq!(entries[0].actor, "NewYork");
        assert!(entries[0].success);
        assert_eq!(entries[1].action, "Purchase Share");
        assert_eq!(entries[1].actor, "NYKB0001");
        assert_eq!(entries[1].params, "ShareID: NYKM100325, ShareType: Equity, Quantity: 20");
        assert!(!entries[1].success);
    }

    #[test]
    fn test_audit_failure_does_not_change_result() {
        let engine = TradingEngine::new("NewYork", RemoteGateway::isolated(), Arc::new(BrokenAuditSink));
        let result = engine.add_share("NYKM100325", "Equity", 10);
        assert!(result.is_success());
        assert!(engine.purchase_share("NYKB0001", "NYKM100325", "Equity", 1).is_success());
    }
}

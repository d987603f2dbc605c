//! Two-phase share swap.
//!
//! Ownership and the local probe run in one critical section; if the new
//! share can be covered here the whole swap completes in that same section.
//! Otherwise the lock is released, peers are probed in registration order
//! with `CHECK_SWAP_AVAILABILITY`, and the first one that confirms gets the
//! `EXECUTE_SWAP`. Another buyer can consume the peer's capacity between
//! probe and execute; the peer re-validates and answers `FAILED` then.
//!
//! While a swap is out at a peer the old holding is held in escrow: it is
//! taken off the ledger before the lock is released and only put back if
//! the swap does not complete. A second swap or a sale of the same holding
//! meanwhile sees nothing to spend.

use super::{TradingEngine, parse_buyer, parse_share_key};
use bourse_core::{
    BuyerId, CommandReply, CommandRequest, Quantity, ShareKey, TradeOutcome, TradeResult,
};
use tracing::{debug, info, warn};

/// A swap the local node could not settle on its own
struct RemoteSwap {
    buyer: BuyerId,
    old: ShareKey,
    new: ShareKey,
    count: Quantity,
}

enum SwapPlan {
    Done(TradeResult),
    Remote(RemoteSwap),
}

impl TradingEngine {
    pub async fn swap_shares(
        &self,
        buyer_id: &str,
        old_share_id: &str,
        old_share_type: &str,
        new_share_id: &str,
        new_share_type: &str,
    ) -> TradeResult {
        let result = match self.plan_swap(
            buyer_id,
            old_share_id,
            old_share_type,
            new_share_id,
            new_share_type,
        ) {
            Ok(SwapPlan::Done(result)) => result,
            Ok(SwapPlan::Remote(swap)) => self.swap_remote(swap).await,
            Err(rejected) => rejected,
        };

        self.audit(
            buyer_id,
            "Swap Shares",
            format!(
                "Old ShareID: {}, Old ShareType: {}, New ShareID: {}, New ShareType: {}",
                old_share_id, old_share_type, new_share_id, new_share_type
            ),
            &result,
        );
        result
    }

    fn plan_swap(
        &self,
        buyer_id: &str,
        old_share_id: &str,
        old_share_type: &str,
        new_share_id: &str,
        new_share_type: &str,
    ) -> Result<SwapPlan, TradeResult> {
        let buyer = parse_buyer(buyer_id)?;
        let old = parse_share_key(old_share_id, old_share_type)?;
        let new = parse_share_key(new_share_id, new_share_type)?;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let count = state.ledger.quantity(&buyer, &old);
        if count == 0 {
            return Err(TradeResult::failure(
                TradeOutcome::NotOwned,
                "Buyer does not own the share to be swapped",
            ));
        }

        let covered_locally = state
            .registry
            .get(&new)
            .is_some_and(|record| record.can_fill(count));
        if !covered_locally {
            state.ledger.remove(&buyer, &old);
            debug!(market = %self.market, buyer = %buyer, share = %old, count, "holding escrowed for remote swap");
            return Ok(SwapPlan::Remote(RemoteSwap {
                buyer,
                old,
                new,
                count,
            }));
        }

        let Some(new_record) = state.registry.get_mut(&new) else {
            return Err(internal_error());
        };
        if new_record.reserve(count).is_err() {
            return Err(internal_error());
        }
        let restored = state
            .registry
            .get_mut(&old)
            .map(|old_record| old_record.release(count));
        state.ledger.remove(&buyer, &old);
        state.ledger.credit(&buyer, &new, count);
        drop(guard);

        match restored {
            Some(released) if released < count => warn!(
                market = %self.market,
                share = %old,
                count,
                released,
                "old share capacity only partially restored"
            ),
            None => debug!(market = %self.market, share = %old, "old share no longer listed, capacity not restored"),
            _ => {}
        }
        info!(market = %self.market, buyer = %buyer, old = %old, new = %new, count, "local swap completed");

        Ok(SwapPlan::Done(TradeResult::success(format!(
            "Swapped {} shares of {} for {}",
            count, old, new
        ))))
    }

    async fn swap_remote(&self, swap: RemoteSwap) -> TradeResult {
        let Some(peer) = self.gateway.find_swap_peer(&swap.new, swap.count).await else {
            self.restore_escrow(&swap);
            return TradeResult::failure(
                TradeOutcome::SwapUnavailable,
                "Unable to swap shares. New share not available in any market.",
            );
        };

        let request = CommandRequest::ExecuteSwap {
            buyer_id: swap.buyer.to_string(),
            old_share_id: swap.old.share_id.to_string(),
            old_share_type: swap.old.share_type.to_string(),
            new_share_id: swap.new.share_id.to_string(),
            new_share_type: swap.new.share_type.to_string(),
            count: swap.count,
        };

        match self.gateway.execute_swap(&peer, &request).await {
            Ok(CommandReply::Success(_)) => {
                self.settle_remote_swap(&swap);
                info!(
                    market = %self.market,
                    peer = %peer.market,
                    buyer = %swap.buyer,
                    old = %swap.old,
                    new = %swap.new,
                    count = swap.count,
                    "remote swap completed"
                );
                TradeResult::success(format!(
                    "Successfully swapped {} shares of {} for {} in {}",
                    swap.count, swap.old, swap.new, peer.market
                ))
            }
            Ok(reply) => {
                debug!(market = %self.market, peer = %peer.market, reply = %reply, "remote swap refused");
                self.restore_escrow(&swap);
                TradeResult::failure(
                    TradeOutcome::SwapUnavailable,
                    format!("Unable to swap shares. {}", reply.detail()),
                )
            }
            Err(e) => {
                warn!(market = %self.market, peer = %peer.market, error = %e, "remote swap execution failed");
                self.restore_escrow(&swap);
                TradeResult::failure(
                    TradeOutcome::RemoteCallFailed,
                    format!("Cross-server swap failed: {}", e),
                )
            }
        }
    }

    /// Local side of a swap the peer already executed: the escrowed old
    /// holding is spent, the new one is recorded. Old share capacity is
    /// left as is.
    fn settle_remote_swap(&self, swap: &RemoteSwap) {
        self.state
            .lock()
            .ledger
            .credit(&swap.buyer, &swap.new, swap.count);
    }

    /// Give the escrowed old holding back after a swap that did not complete
    fn restore_escrow(&self, swap: &RemoteSwap) {
        self.state
            .lock()
            .ledger
            .credit(&swap.buyer, &swap.old, swap.count);
        debug!(market = %self.market, buyer = %swap.buyer, share = %swap.old, count = swap.count, "escrowed holding restored");
    }
}

fn internal_error() -> TradeResult {
    TradeResult::failure(TradeOutcome::InternalError, "Internal server error")
}


#[cfg(test)]
mod tests {
    use crate::application::engine::TradingEngine;
    use crate::application::peer_directory::PeerDirectory;
    use crate::application::remote_gateway::RemoteGateway;
    use crate::application::testing::{ScriptedChannel, StaticMarket};
    use crate::infrastructure::audit::InMemoryAuditSink;
    use bourse_core::{CommandReply, CommandRequest, TradeOutcome};
    use std::sync::Arc;

    const BUYER: &str = "NYKB0001";

    fn engine_with(peers: Vec<(&str, Arc<ScriptedChannel>)>) -> TradingEngine {
        let mut directory = PeerDirectory::new();
        for (market, commands) in peers {
            directory
                .register(market, Arc::new(StaticMarket::default()), commands)
                .unwrap();
        }
        let engine = TradingEngine::new(
            "NewYork",
            RemoteGateway::new(Arc::new(directory)),
            Arc::new(InMemoryAuditSink::new()),
        );
        engine.add_share("NYKM100325", "Equity", 10);
        engine.purchase_share(BUYER, "NYKM100325", "Equity", 4);
        engine
    }

    #[tokio::test]
    async fn test_local_swap_moves_capacity_and_holding() {
        let engine = engine_with(vec![]);
        engine.add_share("NYKA100325", "Bonus", 6);

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "NYKA100325", "Bonus")
            .await;
        assert!(result.is_success());
        assert_eq!(
            result.message,
            "Swapped 4 shares of Equity-NYKM100325 for Bonus-NYKA100325"
        );
        assert_eq!(engine.holding(BUYER, "NYKM100325", "Equity"), 0);
        assert_eq!(engine.holding(BUYER, "NYKA100325", "Bonus"), 4);
        assert_eq!(engine.share("NYKM100325", "Equity").unwrap().available_capacity(), 10);
        assert_eq!(engine.share("NYKA100325", "Bonus").unwrap().available_capacity(), 2);
    }

    #[tokio::test]
    async fn test_swap_requires_ownership() {
        let engine = engine_with(vec![]);
        engine.add_share("NYKA100325", "Bonus", 6);

        let result = engine
            .swap_shares("NYKB0002", "NYKM100325", "Equity", "NYKA100325", "Bonus")
            .await;
        assert_eq!(result.outcome, TradeOutcome::NotOwned);
        assert_eq!(result.message, "Buyer does not own the share to be swapped");
        assert_eq!(engine.share("NYKA100325", "Bonus").unwrap().available_capacity(), 6);
    }

    #[tokio::test]
    async fn test_swap_with_old_share_removed_still_completes() {
        let engine = engine_with(vec![]);
        engine.add_share("NYKA100325", "Bonus", 6);
        engine.remove_share("NYKM100325", "Equity");

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "NYKA100325", "Bonus")
            .await;
        assert!(result.is_success());
        assert_eq!(engine.holding(BUYER, "NYKA100325", "Bonus"), 4);
    }

    #[tokio::test]
    async fn test_insufficient_local_capacity_falls_back_to_peer() {
        let london = Arc::new(ScriptedChannel::accepting_swaps());
        let engine = engine_with(vec![("London", Arc::clone(&london))]);
        // Too small to cover the four held shares
        engine.add_share("NYKA100325", "Bonus", 3);

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "NYKA100325", "Bonus")
            .await;
        assert!(result.is_success());
        assert_eq!(
            result.message,
            "Successfully swapped 4 shares of Equity-NYKM100325 for Bonus-NYKA100325 in London"
        );
        assert_eq!(engine.share("NYKA100325", "Bonus").unwrap().available_capacity(), 3);
        assert_eq!(london.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_remote_swap_settles_locally() {
        let london = Arc::new(ScriptedChannel::accepting_swaps());
        let engine = engine_with(vec![("London", Arc::clone(&london))]);

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "LONM100325", "Dividend")
            .await;
        assert!(result.is_success());
        assert_eq!(engine.holding(BUYER, "NYKM100325", "Equity"), 0);
        assert_eq!(engine.holding(BUYER, "LONM100325", "Dividend"), 4);
        // Old share capacity is not restored on the remote path
        assert_eq!(engine.share("NYKM100325", "Equity").unwrap().available_capacity(), 6);

        assert_eq!(
            london.requests()[1],
            CommandRequest::ExecuteSwap {
                buyer_id: BUYER.into(),
                old_share_id: "NYKM100325".into(),
                old_share_type: "Equity".into(),
                new_share_id: "LONM100325".into(),
                new_share_type: "Dividend".into(),
                count: 4,
            }
        );
    }

    #[tokio::test]
    async fn test_execute_only_goes_to_the_confirming_peer() {
        let london = Arc::new(ScriptedChannel::replying(CommandReply::NotAvailable(
            "Share not found".into(),
        )));
        let tokyo = Arc::new(ScriptedChannel::accepting_swaps());
        let engine = engine_with(vec![
            ("London", Arc::clone(&london)),
            ("Tokyo", Arc::clone(&tokyo)),
        ]);

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "TOKM100325", "Bonus")
            .await;
        assert!(result.message.ends_with("in Tokyo"));
        assert_eq!(london.requests().len(), 1);
        assert!(matches!(
            tokyo.requests()[1],
            CommandRequest::ExecuteSwap { .. }
        ));
    }

    #[tokio::test]
    async fn test_no_market_has_the_share() {
        let london = Arc::new(ScriptedChannel::replying(CommandReply::NotAvailable(
            "Share not found".into(),
        )));
        let engine = engine_with(vec![("London", london)]);

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "LONM100325", "Bonus")
            .await;
        assert_eq!(result.outcome, TradeOutcome::SwapUnavailable);
        assert_eq!(
            result.message,
            "Unable to swap shares. New share not available in any market."
        );
        assert_eq!(engine.holding(BUYER, "NYKM100325", "Equity"), 4);
    }

    #[tokio::test]
    async fn test_peer_refusing_execute_leaves_holding() {
        let london = Arc::new(
            ScriptedChannel::accepting_swaps()
                .on_execute(CommandReply::Failed("Not enough new shares available".into())),
        );
        let engine = engine_with(vec![("London", london)]);

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "LONM100325", "Bonus")
            .await;
        assert_eq!(result.outcome, TradeOutcome::SwapUnavailable);
        assert_eq!(
            result.message,
            "Unable to swap shares. Not enough new shares available"
        );
        assert_eq!(engine.holding(BUYER, "NYKM100325", "Equity"), 4);
        assert_eq!(engine.holding(BUYER, "LONM100325", "Bonus"), 0);
    }

    #[tokio::test]
    async fn test_execute_timeout_is_remote_call_failed() {
        let london = Arc::new(ScriptedChannel::accepting_swaps().execute_times_out());
        let engine = engine_with(vec![("London", london)]);

        let result = engine
            .swap_shares(BUYER, "NYKM100325", "Equity", "LONM100325", "Bonus")
            .await;
        assert_eq!(result.outcome, TradeOutcome::RemoteCallFailed);
        assert_eq!(engine.holding(BUYER, "NYKM100325", "Equity"), 4);
    }
}

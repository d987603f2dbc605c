//! Cross-market purchase, sell and listing.
//!
//! The target node is the single source of truth: its result is relayed
//! as-is with a context prefix, and nothing is mutated locally.

use super::{TradingEngine, settle};
use crate::application::remote_gateway::GatewayError;
use bourse_core::{Quantity, TradeOutcome, TradeResult};
use tracing::{debug, warn};

const PURCHASE_PREFIX: &str = "Cross-server purchase: ";
const SELL_PREFIX: &str = "Cross-server sell: ";

#[derive(Clone, Copy)]
enum Direction {
    Purchase,
    Sell,
}

impl Direction {
    fn prefix(self) -> &'static str {
        match self {
            Direction::Purchase => PURCHASE_PREFIX,
            Direction::Sell => SELL_PREFIX,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Direction::Purchase => "purchase",
            Direction::Sell => "sell",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Direction::Purchase => "Purchase",
            Direction::Sell => "Sell",
        }
    }

    fn action(self) -> &'static str {
        match self {
            Direction::Purchase => "Purchase Remote Share",
            Direction::Sell => "Sell Remote Share",
        }
    }
}

fn gateway_failure(direction: Direction, error: GatewayError) -> TradeResult {
    match error {
        GatewayError::UnknownMarket(_) => TradeResult::failure(
            TradeOutcome::UnknownMarket,
            format!("{} failed. Invalid target market.", direction.title()),
        ),
        other => TradeResult::failure(
            TradeOutcome::RemoteCallFailed,
            format!("Cross-server {} failed: {}", direction.verb(), other),
        ),
    }
}

impl TradingEngine {
    pub async fn purchase_remote_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
        target_market: &str,
    ) -> TradeResult {
        self.delegate(
            Direction::Purchase,
            buyer_id,
            share_id,
            share_type,
            quantity,
            target_market,
        )
        .await
    }

    pub async fn sell_remote_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
        target_market: &str,
    ) -> TradeResult {
        self.delegate(
            Direction::Sell,
            buyer_id,
            share_id,
            share_type,
            quantity,
            target_market,
        )
        .await
    }

    async fn delegate(
        &self,
        direction: Direction,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
        target_market: &str,
    ) -> TradeResult {
        let result = if self.is_self(target_market) {
            let local = match direction {
                Direction::Purchase => self.try_purchase(buyer_id, share_id, share_type, quantity),
                Direction::Sell => self.try_sell(buyer_id, share_id, share_type, quantity),
            };
            settle(local).prefixed(direction.prefix())
        } else {
            let remote = match direction {
                Direction::Purchase => {
                    self.gateway
                        .purchase_share(target_market, buyer_id, share_id, share_type, quantity)
                        .await
                }
                Direction::Sell => {
                    self.gateway
                        .sell_share(target_market, buyer_id, share_id, share_type, quantity)
                        .await
                }
            };
            match remote {
                Ok(result) => result.prefixed(direction.prefix()),
                Err(e) => {
                    warn!(
                        market = %self.market,
                        target = target_market,
                        buyer = buyer_id,
                        error = %e,
                        "cross-market {} failed",
                        direction.verb()
                    );
                    gateway_failure(direction, e)
                }
            }
        };

        debug!(market = %self.market, target = target_market, outcome = ?result.outcome, "cross-market {} answered", direction.verb());
        self.audit(
            buyer_id,
            direction.action(),
            format!(
                "ShareID: {}, ShareType: {}, Quantity: {}, Target Market: {}",
                share_id, share_type, quantity, target_market
            ),
            &result,
        );
        result
    }

    /// This node's listing followed by every peer's, one section per market
    /// in registration order. Unreachable peers are reported inline.
    pub async fn list_all_markets_availability(&self, share_type: &str) -> TradeResult {
        let local = self.list_share_availability(share_type);
        let mut sections = vec![format!("{}:\n{}", self.market, local.message)];

        for (market, reply) in self.gateway.list_availability(share_type).await {
            match reply {
                Ok(reply) => sections.push(format!("{}:\n{}", market, reply.detail())),
                Err(e) => {
                    warn!(market = %self.market, peer = %market, error = %e, "peer listing failed");
                    sections.push(format!("{}: unavailable ({})", market, e));
                }
            }
        }

        TradeResult::success(sections.join("\n"))
    }
}

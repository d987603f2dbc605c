//! Inbound side of the command protocol.

use super::{TradingEngine, parse_share_key};
use bourse_core::{
    BuyerId, CommandReply, CommandRequest, Quantity, ShareError, TradeOutcome, TradeResult,
};
use tracing::{debug, info};

const SHARE_NOT_FOUND: &str = "Share not found";
const NEW_SHARE_NOT_FOUND: &str = "New share not found";
const COUNT_TOO_SMALL: &str = "Share count must be at least 1";

impl TradingEngine {
    /// Answer one decoded command from a peer. Each command is a single critical section.
    pub fn handle_command(&self, request: CommandRequest) -> CommandReply {
        debug!(market = %self.market, request = %request, "command received");
        match request {
            CommandRequest::ListAvailability { share_type } => {
                CommandReply::bounded_listing(self.listing(&share_type, false).message)
            }
            CommandRequest::CheckSwapAvailability {
                share_id,
                share_type,
                required,
            } => self.check_swap_availability(&share_id, &share_type, required),
            CommandRequest::ExecuteSwap {
                buyer_id,
                old_share_id,
                old_share_type,
                new_share_id,
                new_share_type,
                count,
            } => {
                let reply = self.execute_swap(&buyer_id, &new_share_id, &new_share_type, count);
                let outcome = if reply.is_success() {
                    TradeOutcome::Success
                } else {
                    TradeOutcome::SwapUnavailable
                };
                let result = TradeResult::new(outcome, reply.detail());
                self.audit(
                    &buyer_id,
                    "Execute Swap",
                    format!(
                        "Old ShareID: {}, Old ShareType: {}, New ShareID: {}, New ShareType: {}, Count: {}",
                        old_share_id, old_share_type, new_share_id, new_share_type, count
                    ),
                    &result,
                );
                reply
            }
        }
    }

    fn check_swap_availability(
        &self,
        share_id: &str,
        share_type: &str,
        required: Quantity,
    ) -> CommandReply {
        let Ok(key) = parse_share_key(share_id, share_type) else {
            return CommandReply::NotAvailable(SHARE_NOT_FOUND.into());
        };
        if required == 0 {
            return CommandReply::NotAvailable(COUNT_TOO_SMALL.into());
        }

        let state = self.state.lock();
        let Some(record) = state.registry.get(&key) else {
            return CommandReply::NotAvailable(SHARE_NOT_FOUND.into());
        };
        if !record.can_fill(required) {
            let shortfall = ShareError::InsufficientCapacity {
                required,
                available: record.available_capacity(),
            };
            return CommandReply::NotAvailable(shortfall.to_string());
        }
        CommandReply::Available("Share available for swap".into())
    }

    /// Re-validate and consume capacity for a swap a peer negotiated. The
    /// buyer's new holding is recorded at this node.
    fn execute_swap(
        &self,
        buyer_id: &str,
        new_share_id: &str,
        new_share_type: &str,
        count: Quantity,
    ) -> CommandReply {
        let Ok(buyer) = BuyerId::new(buyer_id) else {
            return CommandReply::Failed("Invalid buyer id".into());
        };
        let Ok(key) = parse_share_key(new_share_id, new_share_type) else {
            return CommandReply::Failed(NEW_SHARE_NOT_FOUND.into());
        };
        if count == 0 {
            return CommandReply::Failed(COUNT_TOO_SMALL.into());
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(record) = state.registry.get_mut(&key) else {
            return CommandReply::Failed(NEW_SHARE_NOT_FOUND.into());
        };
        if !record.can_fill(count) {
            return CommandReply::Failed("Not enough new shares available".into());
        }
        if record.reserve(count).is_err() {
            return CommandReply::Failed("Internal server error".into());
        }
        state.ledger.credit(&buyer, &key, count);
        drop(guard);

        info!(market = %self.market, buyer = %buyer, share = %key, count, "swap executed for peer");
        CommandReply::Success(format!("Swapped {} shares of {}", count, key))
    }
}

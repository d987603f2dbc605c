//! Test doubles for the application ports

use crate::application::ports::{
    AuditEntry, AuditError, AuditSink, CommandChannel, RemoteError, RemoteMarket, TransportError,
};
use async_trait::async_trait;
use bourse_core::{CommandReply, CommandRequest, Quantity, TradeResult};
use parking_lot::Mutex;
use std::time::Duration;

/// Answers every RPC with the same result; `None` simulates an unreachable peer
pub struct StaticMarket {
    result: Option<TradeResult>,
    calls: Mutex<Vec<(String, String, String, Quantity)>>,
}

impl StaticMarket {
    pub fn answering(result: TradeResult) -> Self {
        Self {
            result: Some(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            result: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String, String, Quantity)> {
        self.calls.lock().clone()
    }

    fn answer(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, RemoteError> {
        self.calls.lock().push((
            buyer_id.to_string(),
            share_id.to_string(),
            share_type.to_string(),
            quantity,
        ));
        self.result.clone().ok_or(RemoteError::Timeout)
    }
}

impl Default for StaticMarket {
    fn default() -> Self {
        Self::answering(TradeResult::success("ok"))
    }
}

#[async_trait]
impl RemoteMarket for StaticMarket {
    async fn purchase_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, RemoteError> {
        self.answer(buyer_id, share_id, share_type, quantity)
    }

    async fn sell_share(
        &self,
        buyer_id: &str,
        share_id: &str,
        share_type: &str,
        quantity: Quantity,
    ) -> Result<TradeResult, RemoteError> {
        self.answer(buyer_id, share_id, share_type, quantity)
    }
}

/// Command channel with a canned reply per verb; `None` times out
pub struct ScriptedChannel {
    list: Option<CommandReply>,
    check: Option<CommandReply>,
    execute: Option<CommandReply>,
    requests: Mutex<Vec<CommandRequest>>,
}

impl ScriptedChannel {
    pub fn replying(reply: CommandReply) -> Self {
        Self {
            list: Some(reply.clone()),
            check: Some(reply.clone()),
            execute: Some(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            list: None,
            check: None,
            execute: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Confirms availability and then accepts the swap
    pub fn accepting_swaps() -> Self {
        Self::replying(CommandReply::Available("Share available for swap".into()))
            .on_execute(CommandReply::Success("Swapped".into()))
    }

    pub fn on_execute(mut self, reply: CommandReply) -> Self {
        self.execute = Some(reply);
        self
    }

    pub fn on_list(mut self, reply: CommandReply) -> Self {
        self.list = Some(reply);
        self
    }

    pub fn execute_times_out(mut self) -> Self {
        self.execute = None;
        self
    }

    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().clone()
    }
}

impl Default for ScriptedChannel {
    fn default() -> Self {
        Self::replying(CommandReply::InvalidRequest)
    }
}

#[async_trait]
impl CommandChannel for ScriptedChannel {
    async fn send(&self, request: &CommandRequest) -> Result<CommandReply, TransportError> {
        self.requests.lock().push(request.clone());
        let reply = match request {
            CommandRequest::ListAvailability { .. } => &self.list,
            CommandRequest::CheckSwapAvailability { .. } => &self.check,
            CommandRequest::ExecuteSwap { .. } => &self.execute,
        };
        reply
            .clone()
            .ok_or(TransportError::Timeout(Duration::from_millis(10)))
    }
}

/// Audit sink whose every write fails
pub struct BrokenAuditSink;

impl AuditSink for BrokenAuditSink {
    fn record(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::Io(std::io::Error::other("disk full")))
    }
}

use crate::application::TradingEngine;
use bourse_core::{CommandReply, CommandRequest, MAX_DATAGRAM_LEN};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{debug, error, info};

/// Decode one datagram and answer it against the engine. Never fails:
/// malformed input becomes `INVALID_REQUEST` or `INVALID_REQUEST_FORMAT`.
pub fn respond(engine: &TradingEngine, datagram: &[u8]) -> CommandReply {
    let Ok(text) = std::str::from_utf8(datagram) else {
        return CommandReply::InvalidRequest;
    };
    match CommandRequest::parse(text) {
        Ok(request) => engine.handle_command(request),
        Err(e) => {
            debug!(market = %engine.market(), error = %e, "rejected command");
            e.reply()
        }
    }
}

/// Inbound UDP listener dispatching peer commands into the local engine
pub struct CommandTransportServer {
    socket: UdpSocket,
    engine: Arc<TradingEngine>,
}

impl CommandTransportServer {
    pub async fn bind(
        addr: impl ToSocketAddrs,
        engine: Arc<TradingEngine>,
    ) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::new(socket, engine))
    }

    pub fn new(socket: UdpSocket, engine: Arc<TradingEngine>) -> Self {
        Self { socket, engine }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serve until the task is dropped. I/O errors on a single datagram are
    /// logged and the loop carries on.
    pub async fn run(self) {
        let market = self.engine.market().to_string();
        match self.socket.local_addr() {
            Ok(addr) => info!(market = %market, addr = %addr, "command transport listening"),
            Err(e) => error!(market = %market, error = %e, "command transport has no local address"),
        }

        let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
        loop {
            let (n, from) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    error!(market = %market, error = %e, "command receive failed");
                    continue;
                }
            };

            let reply = respond(&self.engine, &buf[..n]);
            debug!(market = %market, peer = %from, reply = %reply, "command answered");

            if let Err(e) = self.socket.send_to(reply.to_string().as_bytes(), from).await {
                error!(market = %market, peer = %from, error = %e, "command reply failed");
            }
        }
    }
}

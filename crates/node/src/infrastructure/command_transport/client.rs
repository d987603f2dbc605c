use crate::application::ports::{CommandChannel, TransportError};
use async_trait::async_trait;
use bourse_core::{CommandReply, CommandRequest, MAX_DATAGRAM_LEN};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::timeout;
use tracing::debug;

/// Client handle for one peer's command transport server
///
/// Each exchange uses a fresh ephemeral socket connected to the peer, so
/// only the peer's datagrams are accepted as the reply.
#[derive(Debug, Clone)]
pub struct UdpCommandClient {
    address: String,
    timeout: Duration,
}

impl UdpCommandClient {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    async fn resolve(&self) -> Result<SocketAddr, TransportError> {
        lookup_host(self.address.as_str())
            .await
            .map_err(|e| TransportError::Resolve(format!("{}: {}", self.address, e)))?
            .next()
            .ok_or_else(|| TransportError::Resolve(format!("{}: no addresses", self.address)))
    }
}

#[async_trait]
impl CommandChannel for UdpCommandClient {
    async fn send(&self, request: &CommandRequest) -> Result<CommandReply, TransportError> {
        let peer = self.resolve().await?;
        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await.map_err(TransportError::Bind)?;
        socket.connect(peer).await.map_err(TransportError::Send)?;

        let payload = request.to_string();
        debug!(peer = %peer, request = %payload, "sending command");
        socket
            .send(payload.as_bytes())
            .await
            .map_err(TransportError::Send)?;

        // One spare byte tells an oversized reply apart from a full one
        let mut buf = vec![0u8; MAX_DATAGRAM_LEN + 1];
        let n = match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(TransportError::Receive(e)),
            Err(_elapsed) => return Err(TransportError::Timeout(self.timeout)),
        };
        if n > MAX_DATAGRAM_LEN {
            return Err(TransportError::Oversized(MAX_DATAGRAM_LEN));
        }

        let text = std::str::from_utf8(&buf[..n]).map_err(|_| TransportError::Decode)?;
        Ok(CommandReply::parse(text))
    }
}

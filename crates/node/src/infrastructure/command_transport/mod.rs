//! UDP command transport between market nodes.
//!
//! One request per datagram, one reply per request, no retransmission.

mod client;
mod server;

pub use client::UdpCommandClient;
pub use server::{CommandTransportServer, respond};

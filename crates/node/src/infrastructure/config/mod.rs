//! Configuration loading for a market node
//!
//! Supports JSON configuration files for:
//! - The node's market name and listen addresses
//! - Peer markets (RPC base URL and command transport address)
//! - Outbound call timeouts
//! - Audit log location
//! - Seed shares created at startup
//!
//! Built-in presets reproduce the standard three-market deployment.

use bourse_core::{MarketCode, Quantity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Root configuration for a market node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Market this node serves
    #[serde(default = "default_market")]
    pub market: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    /// Peer markets, in the order swaps probe them
    #[serde(default)]
    pub peers: Vec<PeerConfig>,

    /// Shares created when the node starts
    #[serde(default)]
    pub seed_shares: Vec<SeedShareConfig>,
}

fn default_market() -> String {
    MarketCode::NewYork.name().to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            market: default_market(),
            server: ServerConfig::default(),
            timeouts: TimeoutConfig::default(),
            audit: AuditConfig::default(),
            peers: Vec::new(),
            seed_shares: Vec::new(),
        }
    }
}

const PRESET_RPC_BASE_PORT: u16 = 8080;
const PRESET_COMMAND_BASE_PORT: u16 = 5000;
const PRESET_PEER_HOST: &str = "127.0.0.1";

fn preset_ports(market: MarketCode) -> (u16, u16) {
    let offset = match market {
        MarketCode::NewYork => 0,
        MarketCode::London => 1,
        MarketCode::Tokyo => 2,
    };
    (PRESET_RPC_BASE_PORT + offset, PRESET_COMMAND_BASE_PORT + offset)
}

impl NodeConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Standard wiring for one of the three markets: RPC on 8080/8081/8082,
    /// commands on 5000/5001/5002, every other market as a peer on localhost.
    pub fn preset(market: MarketCode) -> Self {
        let (rpc_port, command_port) = preset_ports(market);
        let peers = MarketCode::ALL
            .into_iter()
            .filter(|m| *m != market)
            .map(|peer| {
                let (rpc, command) = preset_ports(peer);
                PeerConfig {
                    market: peer.name().to_string(),
                    rpc_url: format!("http://{}:{}", PRESET_PEER_HOST, rpc),
                    command_address: format!("{}:{}", PRESET_PEER_HOST, command),
                }
            })
            .collect();

        Self {
            market: market.name().to_string(),
            server: ServerConfig {
                rpc_port,
                command_port,
                ..Default::default()
            },
            peers,
            ..Default::default()
        }
    }

    /// Apply `HOST`, `RPC_PORT` and `COMMAND_PORT` overrides
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RPC_PORT") {
            self.server.rpc_port = parse_port("RPC_PORT", &port)?;
        }
        if let Some(port) = lookup("COMMAND_PORT") {
            self.server.command_port = parse_port("COMMAND_PORT", &port)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.market.trim().is_empty() {
            return Err(ConfigError::InvalidMarket("market name is empty".into()));
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.peers.len());
        for peer in &self.peers {
            let key = peer.market.to_ascii_lowercase();
            if key.is_empty() {
                return Err(ConfigError::InvalidPeer("peer market name is empty".into()));
            }
            if key == self.market.to_ascii_lowercase() {
                return Err(ConfigError::InvalidPeer(format!(
                    "{} is this node's own market",
                    peer.market
                )));
            }
            if seen.contains(&key) {
                return Err(ConfigError::InvalidPeer(format!(
                    "{} listed twice",
                    peer.market
                )));
            }
            if !(peer.rpc_url.starts_with("http://") || peer.rpc_url.starts_with("https://")) {
                return Err(ConfigError::InvalidPeer(format!(
                    "{}: rpc_url must be an http(s) URL, got '{}'",
                    peer.market, peer.rpc_url
                )));
            }
            if peer.command_address.trim().is_empty() {
                return Err(ConfigError::InvalidPeer(format!(
                    "{}: command_address is empty",
                    peer.market
                )));
            }
            seen.push(key);
        }

        if self.timeouts.rpc_ms == 0 || self.timeouts.command_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

fn parse_port(var: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Listen addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    #[serde(default = "default_command_port")]
    pub command_port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rpc_port() -> u16 {
    PRESET_RPC_BASE_PORT
}

fn default_command_port() -> u16 {
    PRESET_COMMAND_BASE_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            rpc_port: default_rpc_port(),
            command_port: default_command_port(),
        }
    }
}

impl ServerConfig {
    pub fn rpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.rpc_port)
    }

    pub fn command_addr(&self) -> String {
        format!("{}:{}", self.host, self.command_port)
    }
}

/// Outbound call timeouts, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_ms: u64,
    #[serde(default = "default_command_timeout_ms")]
    pub command_ms: u64,
}

fn default_rpc_timeout_ms() -> u64 {
    5_000
}

fn default_command_timeout_ms() -> u64 {
    2_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            rpc_ms: default_rpc_timeout_ms(),
            command_ms: default_command_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn rpc(&self) -> Duration {
        Duration::from_millis(self.rpc_ms)
    }

    pub fn command(&self) -> Duration {
        Duration::from_millis(self.command_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_audit_directory")]
    pub directory: PathBuf,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_directory() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            directory: default_audit_directory(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerConfig {
    pub market: String,
    /// Base URL of the peer's RPC endpoint, e.g. `http://127.0.0.1:8081`
    pub rpc_url: String,
    /// `host:port` of the peer's command transport
    pub command_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedShareConfig {
    pub share_id: String,
    pub share_type: String,
    pub capacity: Quantity,
}

/// Configuration errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid market config: {0}")]
    InvalidMarket(String),

    #[error("Invalid peer config: {0}")]
    InvalidPeer(String),

    #[error("Timeouts must be at least 1 ms")]
    InvalidTimeout,

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The cities that host a market node.
///
/// User and share identifiers are conventionally prefixed with the
/// three-letter code of their home market (`NYKB0001`, `LONM100325`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCode {
    NewYork,
    London,
    Tokyo,
}

impl MarketCode {
    pub const ALL: [MarketCode; 3] = [MarketCode::NewYork, MarketCode::London, MarketCode::Tokyo];

    /// Three-letter identifier prefix
    pub fn code(&self) -> &'static str {
        match self {
            MarketCode::NewYork => "NYK",
            MarketCode::London => "LON",
            MarketCode::Tokyo => "TOK",
        }
    }

    /// Market name used in configuration and peer lookups
    pub fn name(&self) -> &'static str {
        match self {
            MarketCode::NewYork => "NewYork",
            MarketCode::London => "London",
            MarketCode::Tokyo => "Tokyo",
        }
    }

    /// Resolve the home market encoded in an identifier's prefix
    pub fn from_identifier(id: &str) -> Option<MarketCode> {
        let prefix = id.get(..3)?;
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(prefix))
    }
}

impl fmt::Display for MarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarketCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s) || m.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown market: {}", s))
    }
}

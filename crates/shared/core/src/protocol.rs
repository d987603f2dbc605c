//! Inter-node command protocol.
//!
//! One request per datagram, one reply per request. Requests are
//! space-separated ASCII tokens:
//!
//! ```text
//! LIST_AVAILABILITY <shareType>
//! CHECK_SWAP_AVAILABILITY <shareID> <shareType> <requiredCount>
//! EXECUTE_SWAP <buyerID> <oldShareID> <oldShareType> <newShareID> <newShareType> <shareCount>
//! ```
//!
//! Identifiers and share types are carried as raw tokens; the receiving
//! node decides whether they name anything. Counts must be unsigned integers.

use crate::values::Quantity;
use std::fmt;
use thiserror::Error;

pub const LIST_AVAILABILITY: &str = "LIST_AVAILABILITY";
pub const CHECK_SWAP_AVAILABILITY: &str = "CHECK_SWAP_AVAILABILITY";
pub const EXECUTE_SWAP: &str = "EXECUTE_SWAP";

/// Largest datagram either side will send or accept
pub const MAX_DATAGRAM_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRequest {
    ListAvailability {
        share_type: String,
    },
    CheckSwapAvailability {
        share_id: String,
        share_type: String,
        required: Quantity,
    },
    ExecuteSwap {
        buyer_id: String,
        old_share_id: String,
        old_share_type: String,
        new_share_id: String,
        new_share_type: String,
        count: Quantity,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty request")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownVerb(String),

    #[error("{verb} expects {expected} arguments, got {got}")]
    MissingArguments {
        verb: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid count: {0}")]
    InvalidCount(String),
}

impl CommandParseError {
    /// Reply sent back to the peer that sent the malformed request
    pub fn reply(&self) -> CommandReply {
        match self {
            CommandParseError::Empty | CommandParseError::UnknownVerb(_) => {
                CommandReply::InvalidRequest
            }
            CommandParseError::MissingArguments { .. } | CommandParseError::InvalidCount(_) => {
                CommandReply::InvalidRequestFormat
            }
        }
    }
}

fn parse_count(token: &str) -> Result<Quantity, CommandParseError> {
    token
        .parse::<Quantity>()
        .map_err(|_| CommandParseError::InvalidCount(token.to_string()))
}

fn require(
    verb: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), CommandParseError> {
    // Trailing extra tokens are tolerated
    if args.len() < expected {
        return Err(CommandParseError::MissingArguments {
            verb,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

impl CommandRequest {
    pub fn parse(input: &str) -> Result<Self, CommandParseError> {
        let mut tokens = input.split_whitespace();
        let verb = tokens.next().ok_or(CommandParseError::Empty)?;
        let args: Vec<&str> = tokens.collect();

        match verb {
            LIST_AVAILABILITY => {
                require(LIST_AVAILABILITY, &args, 1)?;
                Ok(CommandRequest::ListAvailability {
                    share_type: args[0].to_string(),
                })
            }
            CHECK_SWAP_AVAILABILITY => {
                require(CHECK_SWAP_AVAILABILITY, &args, 3)?;
                Ok(CommandRequest::CheckSwapAvailability {
                    share_id: args[0].to_string(),
                    share_type: args[1].to_string(),
                    required: parse_count(args[2])?,
                })
            }
            EXECUTE_SWAP => {
                require(EXECUTE_SWAP, &args, 6)?;
                Ok(CommandRequest::ExecuteSwap {
                    buyer_id: args[0].to_string(),
                    old_share_id: args[1].to_string(),
                    old_share_type: args[2].to_string(),
                    new_share_id: args[3].to_string(),
                    new_share_type: args[4].to_string(),
                    count: parse_count(args[5])?,
                })
            }
            other => Err(CommandParseError::UnknownVerb(other.to_string())),
        }
    }
}

impl fmt::Display for CommandRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandRequest::ListAvailability { share_type } => {
                write!(f, "{} {}", LIST_AVAILABILITY, share_type)
            }
            CommandRequest::CheckSwapAvailability {
                share_id,
                share_type,
                required,
            } => write!(
                f,
                "{} {} {} {}",
                CHECK_SWAP_AVAILABILITY, share_id, share_type, required
            ),
            CommandRequest::ExecuteSwap {
                buyer_id,
                old_share_id,
                old_share_type,
                new_share_id,
                new_share_type,
                count,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                EXECUTE_SWAP,
                buyer_id,
                old_share_id,
                old_share_type,
                new_share_id,
                new_share_type,
                count
            ),
        }
    }
}

/// Reply to a [`CommandRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// Free-text availability listing
    Listing(String),
    Available(String),
    NotAvailable(String),
    Success(String),
    Failed(String),
    InvalidRequest,
    InvalidRequestFormat,
}

const AVAILABLE_PREFIX: &str = "AVAILABLE:";
const NOT_AVAILABLE_PREFIX: &str = "NOT_AVAILABLE:";
const SUCCESS_PREFIX: &str = "SUCCESS:";
const FAILED_PREFIX: &str = "FAILED:";
const INVALID_REQUEST: &str = "INVALID_REQUEST";
const INVALID_REQUEST_FORMAT: &str = "INVALID_REQUEST_FORMAT";

impl CommandReply {
    /// Listing reply that fits in one datagram. Whole lines are kept while
    /// they fit; the dropped ones are counted on a closing line.
    pub fn bounded_listing(text: String) -> Self {
        if text.len() <= MAX_DATAGRAM_LEN {
            return CommandReply::Listing(text);
        }

        let lines: Vec<&str> = text.lines().collect();
        let mut kept = 0;
        let mut used = 0;
        for line in &lines {
            let dropped = lines.len() - kept - 1;
            let needed = used + line.len() + 1 + truncation_note(dropped).len();
            if needed > MAX_DATAGRAM_LEN {
                break;
            }
            used += line.len() + 1;
            kept += 1;
        }

        let mut bounded = lines[..kept].join("\n");
        if kept > 0 {
            bounded.push('\n');
        }
        bounded.push_str(&truncation_note(lines.len() - kept));
        CommandReply::Listing(bounded)
    }

    /// Decode a reply. Anything without a status prefix is a listing.
    pub fn parse(input: &str) -> Self {
        let text = input.trim();
        if text == INVALID_REQUEST_FORMAT {
            return CommandReply::InvalidRequestFormat;
        }
        if text == INVALID_REQUEST {
            return CommandReply::InvalidRequest;
        }
        if let Some(rest) = text.strip_prefix(NOT_AVAILABLE_PREFIX) {
            return CommandReply::NotAvailable(rest.to_string());
        }
        if let Some(rest) = text.strip_prefix(AVAILABLE_PREFIX) {
            return CommandReply::Available(rest.to_string());
        }
        if let Some(rest) = text.strip_prefix(SUCCESS_PREFIX) {
            return CommandReply::Success(rest.to_string());
        }
        if let Some(rest) = text.strip_prefix(FAILED_PREFIX) {
            return CommandReply::Failed(rest.to_string());
        }
        CommandReply::Listing(text.to_string())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, CommandReply::Available(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandReply::Success(_))
    }

    /// Human-readable detail carried by the reply
    pub fn detail(&self) -> &str {
        match self {
            CommandReply::Listing(s)
            | CommandReply::Available(s)
            | CommandReply::NotAvailable(s)
            | CommandReply::Success(s)
            | CommandReply::Failed(s) => s,
            CommandReply::InvalidRequest => INVALID_REQUEST,
            CommandReply::InvalidRequestFormat => INVALID_REQUEST_FORMAT,
        }
    }
}

fn truncation_note(dropped: usize) -> String {
    format!("... {} more not shown", dropped)
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandReply::Listing(s) => f.write_str(s),
            CommandReply::Available(s) => write!(f, "{}{}", AVAILABLE_PREFIX, s),
            CommandReply::NotAvailable(s) => write!(f, "{}{}", NOT_AVAILABLE_PREFIX, s),
            CommandReply::Success(s) => write!(f, "{}{}", SUCCESS_PREFIX, s),
            CommandReply::Failed(s) => write!(f, "{}{}", FAILED_PREFIX, s),
            CommandReply::InvalidRequest => f.write_str(INVALID_REQUEST),
            CommandReply::InvalidRequestFormat => f.write_str(INVALID_REQUEST_FORMAT),
        }
    }
}

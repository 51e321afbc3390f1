//! Synchronization protocol between the two peers.
//!
//! Three messages travel over the link as JSON objects tagged by `"type"`:
//!
//! ```text
//! {"type":"move","column":3,"color":"red"}
//! {"type":"restart"}
//! {"type":"welcome","text":"Hello from room 4821"}
//! ```
//!
//! A received move is replayed through the same board mutation as a local
//! one. With in-order delivery both boards stay identical after every message.
//! Unknown tags decode to `None` and are ignored.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::game::Player;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireMessage {
    Move { column: usize, color: Player },
    Restart,
    Welcome { text: String },
}

/// Only the tag, so unknown kinds can be told apart from malformed known ones.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
}

const KNOWN_KINDS: [&str; 3] = ["move", "restart", "welcome"];

impl WireMessage {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one frame.
    ///
    /// `Ok(None)` means a well-formed message of a kind this build does not
    /// know about.
    pub fn decode(payload: &str) -> Result<Option<WireMessage>, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(payload)?;
        let kind = envelope.kind.ok_or(ProtocolError::MissingTag)?;
        if !KNOWN_KINDS.contains(&kind.as_str()) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(payload)?))
    }
}

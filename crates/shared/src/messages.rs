//! Frames pushed over the battle stream WebSocket.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Unknown variants deserialize to `Unknown`

use serde::{Deserialize, Serialize};

use crate::responses::{OutcomeData, TurnView};

/// Server to client stream frame. An `intro` announcing the opponent, one
/// `turn` per resolved turn, then one `result` before the server closes the
/// socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Turn(TurnView),
    Result {
        outcome: OutcomeData,
        message: String,
    },
    Intro {
        message: String,
    },
    /// Unknown frame type for forward compatibility
    #[serde(other)]
    Unknown,
}

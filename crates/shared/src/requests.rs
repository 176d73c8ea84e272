//! Request bodies accepted by the engine's HTTP API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Start an autonomous battle against a monster from the chosen map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePveBattleRequest {
    pub character_id: Uuid,
    pub map_id: Uuid,
    /// Caption tone: `comic`, `epic` or `grim`. Server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_style: Option<String>,
}

/// Start an interactive battle against another player's character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePvpBattleRequest {
    pub character_id: Uuid,
    pub opponent_character_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration_style: Option<String>,
}

/// One command for an interactive battle.
///
/// Accepted tokens: `attack`, `defend` (or `defense`), `evade`, `ultimate`,
/// in any case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCommandRequest {
    pub command: String,
}

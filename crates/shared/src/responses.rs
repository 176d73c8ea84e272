//! Response bodies returned by the engine's HTTP API.
//!
//! These mirror the engine's domain types but carry only wire data; the
//! conversions live in the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Vocabulary
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleKindData {
    Autonomous,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleStatusData {
    Created,
    Running,
    Won,
    Lost,
    Abandoned,
}

/// Final result from the requesting player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeData {
    Win,
    Lose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideData {
    Player,
    Opponent,
}

// =============================================================================
// Views
// =============================================================================

/// A combatant as it stands in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantView {
    pub id: Uuid,
    /// `character` or `monster`
    pub source: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub crit_chance: u8,
}

/// One resolved turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnView {
    pub turn: u32,
    pub actor: SideData,
    pub actor_name: String,
    pub target_name: String,
    /// Damage dealt by the actor
    pub damage: u32,
    pub damage_to_player: u32,
    pub damage_to_opponent: u32,
    pub critical: bool,
    /// Interactive battles only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_command: Option<String>,
    /// Interactive battles only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_command: Option<String>,
    pub narration: String,
    pub player_hp: u32,
    pub opponent_hp: u32,
}

/// Full snapshot of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleView {
    pub id: Uuid,
    pub kind: BattleKindData,
    pub status: BattleStatusData,
    /// Next turn to be resolved
    pub turn: u32,
    pub terminal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeData>,
    pub player: CombatantView,
    pub opponent: CombatantView,
    /// Command the opponent picked on the latest exchange, cleared once the
    /// battle is over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_command: Option<String>,
    pub intro: String,
    /// Rendered line per turn, oldest first
    pub log: Vec<String>,
    pub turns: Vec<TurnView>,
}

/// Result of running an autonomous battle to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub battle_id: Uuid,
    pub outcome: OutcomeData,
    pub intro: String,
    pub summary: String,
    pub turns: Vec<TurnView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_uses_upper_case_tokens() {
        assert_eq!(serde_json::to_value(OutcomeData::Win).unwrap(), "WIN");
        assert_eq!(serde_json::to_value(OutcomeData::Lose).unwrap(), "LOSE");
    }

    #[test]
    fn turn_view_omits_commands_for_strikes() {
        let view = TurnView {
            turn: 1,
            actor: SideData::Player,
            actor_name: "Hero".into(),
            target_name: "Slime".into(),
            damage: 5,
            damage_to_player: 0,
            damage_to_opponent: 5,
            critical: false,
            player_command: None,
            opponent_command: None,
            narration: "Bonk.".into(),
            player_hp: 10,
            opponent_hp: 5,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("player_command").is_none());
        assert_eq!(json["actor"], "player");
    }
}

//! Combat-related domain events
//!
//! These enums communicate what happened when a blow lands or a battle ends,
//! allowing callers to react appropriately.

use serde::{Deserialize, Serialize};

/// Outcome of applying damage to a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Combatant was already down, no effect
    AlreadyDefeated,
    /// Combatant took damage but is still standing
    Wounded { damage_dealt: u32, remaining_hp: u32 },
    /// Combatant was knocked out by this damage
    Defeated { damage_dealt: u32 },
}

/// Final result of a battle from the requesting player's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleOutcome {
    Win,
    Lose,
}

impl BattleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            BattleOutcome::Win => "WIN",
            BattleOutcome::Lose => "LOSE",
        }
    }

    pub fn is_win(self) -> bool {
        matches!(self, BattleOutcome::Win)
    }
}

//! Combatant snapshot - a fighter's stats frozen at battle start.
//!
//! The snapshot is owned by exactly one battle. Hit points drop as the fight
//! goes on; nothing here is ever written back to the catalog the stats came
//! from.

use serde::{Deserialize, Serialize};

use crate::events::DamageOutcome;
use crate::value_objects::{CombatStats, CombatantName, CritChance};
use crate::{CharacterId, MonsterId};

/// Where a combatant came from in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum CombatantId {
    Character(CharacterId),
    Monster(MonsterId),
}

impl CombatantId {
    pub fn as_character(self) -> Option<CharacterId> {
        match self {
            CombatantId::Character(id) => Some(id),
            CombatantId::Monster(_) => None,
        }
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CombatantId::Character(id) => write!(f, "character:{id}"),
            CombatantId::Monster(id) => write!(f, "monster:{id}"),
        }
    }
}

/// The two sides of a battle. The player is always the requesting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Opponent => "opponent",
        }
    }
}

/// A fighter as seen by one battle.
///
/// # Invariants
///
/// - `hp` never exceeds the snapshot's starting hit points
/// - `hp` never goes below zero; damage past zero is clamped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatantSnapshot {
    id: CombatantId,
    name: CombatantName,
    portrait: Option<String>,
    stats: CombatStats,
    hp: u32,
}

impl CombatantSnapshot {
    pub fn new(id: CombatantId, name: CombatantName, stats: CombatStats) -> Self {
        Self {
            id,
            name,
            portrait: None,
            hp: stats.hp,
            stats,
        }
    }

    pub fn with_portrait(mut self, portrait: impl Into<String>) -> Self {
        self.portrait = Some(portrait.into());
        self
    }

    #[inline]
    pub fn id(&self) -> CombatantId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &CombatantName {
        &self.name
    }

    #[inline]
    pub fn portrait(&self) -> Option<&str> {
        self.portrait.as_deref()
    }

    /// Stats as they were when the snapshot was taken.
    #[inline]
    pub fn stats(&self) -> &CombatStats {
        &self.stats
    }

    #[inline]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    #[inline]
    pub fn max_hp(&self) -> u32 {
        self.stats.hp
    }

    #[inline]
    pub fn attack(&self) -> u32 {
        self.stats.attack
    }

    #[inline]
    pub fn defense(&self) -> u32 {
        self.stats.defense
    }

    #[inline]
    pub fn speed(&self) -> u32 {
        self.stats.speed
    }

    #[inline]
    pub fn crit_chance(&self) -> CritChance {
        self.stats.crit_chance
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Apply damage, clamping hit points at zero.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.is_defeated() {
            return DamageOutcome::AlreadyDefeated;
        }

        self.hp = self.hp.saturating_sub(amount);

        if self.hp == 0 {
            DamageOutcome::Defeated {
                damage_dealt: amount,
            }
        } else {
            DamageOutcome::Wounded {
                damage_dealt: amount,
                remaining_hp: self.hp,
            }
        }
    }

    /// Hit points this combatant would have after taking `amount`.
    pub(crate) fn hp_after(&self, amount: u32) -> u32 {
        self.hp.saturating_sub(amount)
    }
}

//! Combat stat block and critical chance.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Critical-hit chance as a whole percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CritChance(u8);

impl CritChance {
    pub const NEVER: Self = Self(0);
    pub const ALWAYS: Self = Self(100);

    pub fn new(percent: u8) -> Result<Self, DomainError> {
        if percent > 100 {
            return Err(DomainError::validation(format!(
                "Critical chance must be within 0..=100, got {percent}"
            )));
        }
        Ok(Self(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// A roll in `0..100` is critical when it falls below the chance.
    pub fn is_critical(self, roll: u8) -> bool {
        roll < self.0
    }
}

impl TryFrom<u8> for CritChance {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CritChance> for u8 {
    fn from(value: CritChance) -> Self {
        value.0
    }
}

/// Stats a fighter brings into a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub crit_chance: CritChance,
}

impl CombatStats {
    pub fn new(hp: u32, attack: u32, defense: u32, speed: u32, crit_chance: CritChance) -> Self {
        Self {
            hp,
            attack,
            defense,
            speed,
            crit_chance,
        }
    }
}

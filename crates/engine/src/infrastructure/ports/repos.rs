//! Repository port traits for database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skirmish_domain::{
    BattleId, BattleKind, BattleOutcome, CharacterId, CombatantId, CombatantSnapshot, MapId,
};

use super::error::RepoError;

// =============================================================================
// Combatant catalog
// =============================================================================

/// Which pool an encounter draws its monster from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncounterType {
    Normal,
    Boss,
}

impl EncounterType {
    pub fn as_str(self) -> &'static str {
        match self {
            EncounterType::Normal => "NORMAL",
            EncounterType::Boss => "BOSS",
        }
    }
}

/// Encounter rates for a map. Whatever is not a normal encounter is a boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterRates {
    /// Percentage of normal encounters, `0..=100`
    pub normal: u8,
}

impl Default for EncounterRates {
    fn default() -> Self {
        Self { normal: 98 }
    }
}

impl EncounterRates {
    pub fn boss(&self) -> u8 {
        100u8.saturating_sub(self.normal)
    }

    /// Pick the encounter type for a roll in `0..100`.
    pub fn encounter_for(&self, roll: u8) -> EncounterType {
        if roll < self.boss() {
            EncounterType::Boss
        } else {
            EncounterType::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapInfo {
    pub id: MapId,
    pub name: String,
    pub rates: EncounterRates,
}

/// Character and monster stats. Owned by the surrounding product; the engine
/// only reads snapshots and reports stage clears.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CombatantRepo: Send + Sync {
    async fn get_character(&self, id: CharacterId)
        -> Result<Option<CombatantSnapshot>, RepoError>;
    async fn get_map(&self, id: MapId) -> Result<Option<MapInfo>, RepoError>;
    async fn list_monsters(
        &self,
        map_id: MapId,
        encounter: EncounterType,
    ) -> Result<Vec<CombatantSnapshot>, RepoError>;
    async fn record_stage_clear(&self, id: CharacterId) -> Result<(), RepoError>;
}

// =============================================================================
// Battle log
// =============================================================================

/// Header row written when a battle is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleHeader {
    pub kind: BattleKind,
    pub player: CombatantId,
    pub opponent: CombatantId,
    pub started_at: DateTime<Utc>,
}

/// Durable battle log. Write-only from the engine's point of view.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BattleLogRepo: Send + Sync {
    /// Insert a header row and hand back the new battle's id.
    async fn create_header(&self, header: &BattleHeader) -> Result<BattleId, RepoError>;
    async fn append_turn(&self, id: BattleId, turn: u32, line: &str) -> Result<(), RepoError>;
    async fn finalize(
        &self,
        id: BattleId,
        outcome: BattleOutcome,
        turn_count: u32,
    ) -> Result<(), RepoError>;
}

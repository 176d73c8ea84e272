//! Builders and fakes shared by the battle use case tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use skirmish_domain::{
    Battle, BattleId, BattleKind, BattleOutcome, CharacterId, CombatStats, CombatantId,
    CombatantName, CombatantSnapshot, CritChance, MonsterId,
};

use super::BattleEngine;
use crate::infrastructure::clock::FixedRandom;
use crate::infrastructure::ports::{
    BattleHeader, BattleLogRepo, MockCombatantRepo, NarrationPort, RepoError,
};

/// 10 HP, 5 ATK, no defense: two clean hits finish a fight.
pub fn even_stats() -> CombatStats {
    CombatStats::new(10, 5, 0, 5, CritChance::NEVER)
}

pub fn hero(stats: CombatStats) -> CombatantSnapshot {
    CombatantSnapshot::new(
        CombatantId::Character(CharacterId::new()),
        CombatantName::new("Hero").unwrap(),
        stats,
    )
}

pub fn slime(stats: CombatStats) -> CombatantSnapshot {
    CombatantSnapshot::new(
        CombatantId::Monster(MonsterId::new()),
        CombatantName::new("Slime").unwrap(),
        stats,
    )
}

pub fn rival(stats: CombatStats) -> CombatantSnapshot {
    CombatantSnapshot::new(
        CombatantId::Character(CharacterId::new()),
        CombatantName::new("Rival").unwrap(),
        stats,
    )
}

pub fn autonomous_battle(player: CombatStats, opponent: CombatStats) -> Battle {
    Battle::new(
        BattleId::new(),
        BattleKind::Autonomous,
        hero(player),
        slime(opponent),
    )
    .unwrap()
}

pub fn interactive_battle(player: CombatStats, opponent: CombatStats) -> Battle {
    Battle::new(
        BattleId::new(),
        BattleKind::Interactive,
        hero(player),
        rival(opponent),
    )
    .unwrap()
}

/// Engine with no crits and a catalog that accepts any stage clear.
pub fn engine(narrator: Arc<dyn NarrationPort>, log: Arc<RecordingLog>) -> BattleEngine {
    let mut catalog = MockCombatantRepo::new();
    catalog.expect_record_stage_clear().returning(|_| Ok(()));

    BattleEngine::new(
        narrator,
        log,
        Arc::new(catalog),
        Arc::new(FixedRandom(99)),
        Duration::from_secs(1),
    )
}

/// In-memory battle log that remembers every call.
#[derive(Default)]
pub struct RecordingLog {
    fail_appends: bool,
    headers: Mutex<Vec<(BattleId, BattleHeader)>>,
    lines: Mutex<Vec<(BattleId, u32, String)>>,
    finalized: Mutex<Vec<(BattleId, BattleOutcome, u32)>>,
}

impl RecordingLog {
    /// A log whose turn appends always fail.
    pub fn failing() -> Self {
        Self {
            fail_appends: true,
            ..Self::default()
        }
    }

    pub fn headers(&self) -> Vec<(BattleId, BattleHeader)> {
        self.headers.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<(BattleId, u32, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn finalized(&self) -> Vec<(BattleId, BattleOutcome, u32)> {
        self.finalized.lock().unwrap().clone()
    }
}

#[async_trait]
impl BattleLogRepo for RecordingLog {
    async fn create_header(&self, header: &BattleHeader) -> Result<BattleId, RepoError> {
        let id = BattleId::new();
        self.headers.lock().unwrap().push((id, header.clone()));
        Ok(id)
    }

    async fn append_turn(&self, id: BattleId, turn: u32, line: &str) -> Result<(), RepoError> {
        if self.fail_appends {
            return Err(RepoError::database("append_turn", "disk full"));
        }
        self.lines.lock().unwrap().push((id, turn, line.to_string()));
        Ok(())
    }

    async fn finalize(
        &self,
        id: BattleId,
        outcome: BattleOutcome,
        turn_count: u32,
    ) -> Result<(), RepoError> {
        self.finalized
            .lock()
            .unwrap()
            .push((id, outcome, turn_count));
        Ok(())
    }
}

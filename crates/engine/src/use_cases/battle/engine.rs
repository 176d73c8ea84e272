//! Single-turn resolution shared by every driver.

use std::sync::Arc;
use std::time::Duration;

use skirmish_domain::{Battle, BattleKind, PreparedTurn, TurnInput, TurnRecord};

use super::BattleError;
use crate::infrastructure::ports::{
    BattleLogRepo, CombatantRepo, NarrationError, NarrationPort, NarrationRequest, RandomPort,
};

/// Caption used whenever narration fails or times out.
pub const FALLBACK_CAPTION: &str = "The clash is too fast to follow, but the blow lands.";

pub struct BattleEngine {
    narrator: Arc<dyn NarrationPort>,
    battle_log: Arc<dyn BattleLogRepo>,
    catalog: Arc<dyn CombatantRepo>,
    random: Arc<dyn RandomPort>,
    narration_timeout: Duration,
}

impl BattleEngine {
    pub fn new(
        narrator: Arc<dyn NarrationPort>,
        battle_log: Arc<dyn BattleLogRepo>,
        catalog: Arc<dyn CombatantRepo>,
        random: Arc<dyn RandomPort>,
        narration_timeout: Duration,
    ) -> Self {
        Self {
            narrator,
            battle_log,
            catalog,
            random,
            narration_timeout,
        }
    }

    /// Input for the next autonomous turn, with a fresh crit roll.
    pub fn strike_input(&self) -> TurnInput {
        let roll = self.random.gen_range(0, 99).clamp(0, 99) as u8;
        TurnInput::Strike { crit_roll: roll }
    }

    /// Resolve the battle's next turn: compute it, caption it, commit it, and
    /// log it.
    ///
    /// Returns `Ok(None)` without touching anything when the battle is over.
    /// Dropping the returned future before the caption arrives leaves the
    /// battle exactly as it was.
    pub async fn resolve_one_turn(
        &self,
        battle: &mut Battle,
        input: TurnInput,
    ) -> Result<Option<TurnRecord>, BattleError> {
        let Some(prepared) = battle.prepare_turn(input)? else {
            return Ok(None);
        };

        let caption = self.narrate(battle, &prepared).await;
        let record = battle.commit_turn(prepared, caption)?.clone();

        tracing::debug!(
            battle_id = %battle.id(),
            turn = record.turn(),
            actor = record.actor().as_str(),
            damage = record.damage(),
            critical = record.is_critical(),
            "Turn resolved"
        );

        self.log_turn(battle, &record).await;
        Ok(Some(record))
    }

    async fn narrate(&self, battle: &Battle, prepared: &PreparedTurn) -> String {
        let request = NarrationRequest {
            actor: battle.combatant(prepared.actor()).name().to_string(),
            target: battle.combatant(prepared.target()).name().to_string(),
            damage: prepared.damage(),
            critical: prepared.is_critical(),
            battle_over: prepared.ends_battle(),
            style: battle.narration_style(),
        };

        match tokio::time::timeout(self.narration_timeout, self.narrator.narrate(&request)).await
        {
            Ok(Ok(caption)) => caption,
            Ok(Err(NarrationError::Disabled)) => FALLBACK_CAPTION.to_string(),
            Ok(Err(e)) => {
                tracing::warn!(
                    battle_id = %battle.id(),
                    turn = prepared.turn(),
                    error = %e,
                    "Narration failed, using fallback caption"
                );
                FALLBACK_CAPTION.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    battle_id = %battle.id(),
                    turn = prepared.turn(),
                    timeout_ms = self.narration_timeout.as_millis() as u64,
                    "Narration timed out, using fallback caption"
                );
                FALLBACK_CAPTION.to_string()
            }
        }
    }

    async fn log_turn(&self, battle: &Battle, record: &TurnRecord) {
        let line = battle.render_turn(record);
        if let Err(e) = self
            .battle_log
            .append_turn(battle.id(), record.turn(), &line)
            .await
        {
            tracing::warn!(
                battle_id = %battle.id(),
                turn = record.turn(),
                error = %e,
                "Failed to persist turn log"
            );
        }
    }

    /// Write the final header and report a stage clear for a finished
    /// autonomous battle. Failures are logged, never returned.
    pub async fn conclude(&self, battle: &Battle) {
        if battle.kind() != BattleKind::Autonomous {
            return;
        }
        let Some(outcome) = battle.outcome() else {
            return;
        };

        let turn_count = battle.turns().len() as u32;
        if let Err(e) = self
            .battle_log
            .finalize(battle.id(), outcome, turn_count)
            .await
        {
            tracing::warn!(battle_id = %battle.id(), error = %e, "Failed to finalize battle");
        }

        if outcome.is_win() {
            if let Some(character) = battle.player().id().as_character() {
                if let Err(e) = self.catalog.record_stage_clear(character).await {
                    tracing::warn!(
                        battle_id = %battle.id(),
                        character_id = %character,
                        error = %e,
                        "Failed to record stage clear"
                    );
                }
            }
        }

        tracing::info!(
            battle_id = %battle.id(),
            outcome = outcome.as_str(),
            turns = turn_count,
            "Battle finished"
        );
    }
}

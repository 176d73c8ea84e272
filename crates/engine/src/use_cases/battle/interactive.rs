//! Command/response driver for interactive battles.

use std::sync::Arc;

use skirmish_domain::{Battle, BattleId, Command, TurnInput};

use super::{resident_interactive, BattleEngine, BattleError, OpponentStrategy};
use crate::stores::BattleRegistry;

/// Resolve one exchange of an interactive battle.
pub struct SubmitCommand {
    engine: Arc<BattleEngine>,
    registry: Arc<BattleRegistry>,
    opponent: Arc<dyn OpponentStrategy>,
}

impl SubmitCommand {
    pub fn new(
        engine: Arc<BattleEngine>,
        registry: Arc<BattleRegistry>,
        opponent: Arc<dyn OpponentStrategy>,
    ) -> Self {
        Self {
            engine,
            registry,
            opponent,
        }
    }

    /// Apply the player's command and return the updated battle.
    ///
    /// The per-battle lock is held across the whole turn, so concurrent
    /// submissions for one battle resolve one after the other. On a finished
    /// battle nothing is resolved and the opponent command display is reset.
    pub async fn execute(&self, id: BattleId, command: Command) -> Result<Battle, BattleError> {
        let entry = resident_interactive(&self.registry, id)?;
        let mut battle = entry.lock().await;

        if battle.is_terminal() {
            battle.clear_opponent_command();
            return Ok(battle.clone());
        }

        let opponent = self.opponent.choose(&battle);
        let input = TurnInput::Exchange {
            player: command,
            opponent,
        };
        self.engine.resolve_one_turn(&mut battle, input).await?;

        Ok(battle.clone())
    }
}

/// Read a resident interactive battle.
pub struct GetBattle {
    registry: Arc<BattleRegistry>,
}

impl GetBattle {
    pub fn new(registry: Arc<BattleRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, id: BattleId) -> Result<Battle, BattleError> {
        let entry = resident_interactive(&self.registry, id)?;
        let battle = entry.lock().await;
        Ok(battle.clone())
    }
}

/// Walk away from an interactive battle.
pub struct AbandonBattle {
    registry: Arc<BattleRegistry>,
}

impl AbandonBattle {
    pub fn new(registry: Arc<BattleRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, id: BattleId) -> Result<Battle, BattleError> {
        let entry = resident_interactive(&self.registry, id)?;
        let mut battle = entry.lock().await;
        battle.abandon()?;
        tracing::info!(battle_id = %id, turn = battle.turn_number(), "Battle abandoned");
        Ok(battle.clone())
    }
}

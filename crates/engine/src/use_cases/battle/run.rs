//! Batch driver: run an autonomous battle to completion in one call.

use std::sync::Arc;

use skirmish_domain::{Battle, BattleId};

use super::{take_autonomous, BattleEngine, BattleError};
use crate::stores::BattleRegistry;

pub struct RunBattle {
    engine: Arc<BattleEngine>,
    registry: Arc<BattleRegistry>,
}

impl RunBattle {
    pub fn new(engine: Arc<BattleEngine>, registry: Arc<BattleRegistry>) -> Self {
        Self { engine, registry }
    }

    /// Resolve every turn and return the finished battle.
    pub async fn execute(&self, id: BattleId) -> Result<Battle, BattleError> {
        let mut battle = take_autonomous(&self.registry, id).await?;

        while !battle.is_terminal() {
            let input = self.engine.strike_input();
            self.engine.resolve_one_turn(&mut battle, input).await?;
        }

        self.engine.conclude(&battle).await;
        Ok(battle)
    }
}

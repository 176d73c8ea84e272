//! Streaming driver: run an autonomous battle, pushing each turn to a sink as
//! soon as it resolves.
//!
//! The run is an ordinary future. Whoever drives it owns the battle, so
//! dropping the future (for example when the client disconnects) stops the
//! simulation on the spot; nothing keeps running in the background.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use skirmish_domain::{Battle, BattleId, TurnRecord};

use super::{take_autonomous, BattleEngine, BattleError};
use crate::stores::BattleRegistry;

/// The receiving side went away.
#[derive(Debug, thiserror::Error)]
#[error("stream closed: {0}")]
pub struct SinkClosed(pub String);

/// Where streamed turns go.
#[async_trait]
pub trait TurnSink: Send {
    /// Called once, before the first turn resolves.
    async fn started(&mut self, battle: &Battle) -> Result<(), SinkClosed>;
    async fn turn(&mut self, battle: &Battle, record: &TurnRecord) -> Result<(), SinkClosed>;
    /// Called once, after the last turn.
    async fn finished(&mut self, battle: &Battle) -> Result<(), SinkClosed>;
}

pub struct StreamBattle {
    engine: Arc<BattleEngine>,
    registry: Arc<BattleRegistry>,
    turn_delay: Duration,
}

impl StreamBattle {
    pub fn new(engine: Arc<BattleEngine>, registry: Arc<BattleRegistry>, turn_delay: Duration) -> Self {
        Self {
            engine,
            registry,
            turn_delay,
        }
    }

    /// Claim the battle for streaming. Fails without side effects when the id
    /// is unknown or not autonomous.
    pub async fn start(&self, id: BattleId) -> Result<Battle, BattleError> {
        take_autonomous(&self.registry, id).await
    }

    /// Drive a claimed battle to the end.
    ///
    /// A sink failure aborts the remaining turns. Turns already resolved stay
    /// logged; the header is not finalized.
    pub async fn run<S>(&self, mut battle: Battle, sink: &mut S) -> Result<Battle, BattleError>
    where
        S: TurnSink + ?Sized,
    {
        sink.started(&battle).await?;

        while !battle.is_terminal() {
            let input = self.engine.strike_input();
            let Some(record) = self.engine.resolve_one_turn(&mut battle, input).await? else {
                break;
            };

            if let Err(e) = sink.turn(&battle, &record).await {
                tracing::info!(
                    battle_id = %battle.id(),
                    turn = record.turn(),
                    error = %e,
                    "Stream receiver gone, aborting battle"
                );
                return Err(e.into());
            }

            if !battle.is_terminal() && !self.turn_delay.is_zero() {
                tokio::time::sleep(self.turn_delay).await;
            }
        }

        self.engine.conclude(&battle).await;
        sink.finished(&battle).await?;
        Ok(battle)
    }
}

//! Battle use cases.
//!
//! Three drivers share one [`BattleEngine`]:
//! 1. Batch - run an autonomous battle to the end in one request
//! 2. Stream - run an autonomous battle, pushing each turn as it resolves
//! 3. Command/response - resolve one interactive exchange per request
//!
//! Autonomous battles sit in the registry until a driver takes them; each
//! battle can therefore be run exactly once.

use std::sync::Arc;

use skirmish_domain::{Battle, BattleId, BattleKind, CharacterId, DomainError, MapId};

mod create;
mod engine;
mod interactive;
mod opponent;
mod run;
mod stream;

#[cfg(test)]
mod test_support;

pub use create::{CreatePveBattle, CreatePvpBattle};
pub use engine::{BattleEngine, FALLBACK_CAPTION};
pub use interactive::{AbandonBattle, GetBattle, SubmitCommand};
pub use opponent::{OpponentStrategy, RandomOpponent};
pub use run::RunBattle;
pub use stream::{SinkClosed, StreamBattle, TurnSink};

use crate::infrastructure::ports::RepoError;
use crate::stores::{BattleRegistry, ResidentBattle};

/// Container for battle use cases.
pub struct BattleUseCases {
    pub create_pve: Arc<CreatePveBattle>,
    pub create_pvp: Arc<CreatePvpBattle>,
    pub run: Arc<RunBattle>,
    pub stream: Arc<StreamBattle>,
    pub submit: Arc<SubmitCommand>,
    pub get: Arc<GetBattle>,
    pub abandon: Arc<AbandonBattle>,
}

#[derive(Debug, thiserror::Error)]
pub enum BattleError {
    #[error("Battle not found: {0}")]
    NotFound(BattleId),
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),
    #[error("Map not found: {0}")]
    MapNotFound(MapId),
    #[error("No monsters available on map {0}")]
    NoMonsters(MapId),
    #[error("Battle {id} is {}, expected {}", .actual.as_str(), .expected.as_str())]
    WrongKind {
        id: BattleId,
        expected: BattleKind,
        actual: BattleKind,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Stream closed: {0}")]
    StreamClosed(String),
}

impl From<SinkClosed> for BattleError {
    fn from(e: SinkClosed) -> Self {
        BattleError::StreamClosed(e.0)
    }
}

/// Remove an autonomous battle from the registry so exactly one driver owns it.
async fn take_autonomous(registry: &BattleRegistry, id: BattleId) -> Result<Battle, BattleError> {
    match registry.take(id, BattleKind::Autonomous) {
        Some(entry) => Ok(entry.lock().await.clone()),
        None => Err(missing_or_wrong_kind(registry, id, BattleKind::Autonomous)),
    }
}

/// Find a resident interactive battle.
fn resident_interactive(
    registry: &BattleRegistry,
    id: BattleId,
) -> Result<Arc<ResidentBattle>, BattleError> {
    match registry.get(id) {
        Some(entry) if entry.kind() == BattleKind::Interactive => Ok(entry),
        Some(entry) => Err(BattleError::WrongKind {
            id,
            expected: BattleKind::Interactive,
            actual: entry.kind(),
        }),
        None => Err(BattleError::NotFound(id)),
    }
}

fn missing_or_wrong_kind(registry: &BattleRegistry, id: BattleId, expected: BattleKind) -> BattleError {
    match registry.get(id) {
        Some(entry) => BattleError::WrongKind {
            id,
            expected,
            actual: entry.kind(),
        },
        None => BattleError::NotFound(id),
    }
}

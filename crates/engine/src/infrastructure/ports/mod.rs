//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (combatant catalog, battle log)
//! - LLM calls and the caption capability built on them
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{LlmError, NarrationError, RepoError};

pub use external::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole, NarrationPort,
    NarrationRequest,
};

pub use repos::{
    BattleHeader, BattleLogRepo, CombatantRepo, EncounterRates, EncounterType, MapInfo,
};

pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use external::{MockLlmPort, MockNarrationPort};
#[cfg(test)]
pub use repos::{MockBattleLogRepo, MockCombatantRepo};

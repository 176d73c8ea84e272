//! Skirmish domain: combatants, battles, and the rules that resolve turns.
//!
//! Everything here is synchronous and free of I/O. Randomness enters as plain
//! roll values chosen by the caller.

pub mod aggregates;
pub mod error;
pub mod events;
pub mod ids;
pub mod rules;
pub mod value_objects;

pub use aggregates::{
    Battle, BattleKind, BattleStatus, CombatantId, CombatantSnapshot, PreparedTurn, Side,
    TurnAction, TurnInput, TurnRecord,
};
pub use error::DomainError;
pub use events::{BattleOutcome, DamageOutcome};
pub use ids::{BattleId, CharacterId, MapId, MonsterId};
pub use value_objects::{CombatStats, CombatantName, Command, CritChance, NarrationStyle};

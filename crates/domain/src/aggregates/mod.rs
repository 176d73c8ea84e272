//! Aggregate roots - domain objects that own their related data.
//!
//! Each aggregate exposes behavior through methods rather than public fields,
//! and mutations report what happened through return values.

pub mod battle;
pub mod combatant;

pub use battle::{
    Battle, BattleKind, BattleStatus, PreparedTurn, TurnAction, TurnInput, TurnRecord,
};
pub use combatant::{CombatantId, CombatantSnapshot, Side};

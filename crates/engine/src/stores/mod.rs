//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `BattleRegistry` - battles resident between requests

pub mod battle_registry;

pub use battle_registry::{BattleRegistry, ResidentBattle, SweepReport};

//! SQLite persistence adapters.
//!
//! One database file holds both the combatant catalog and the battle log.

mod battle_log;
mod catalog;
mod connection;

pub use battle_log::SqliteBattleLog;
pub use catalog::{demo, SqliteCombatantRepo};
pub use connection::connect;

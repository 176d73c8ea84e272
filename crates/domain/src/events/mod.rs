//! Domain events returned from aggregate mutations.

mod combat_events;

pub use combat_events::{BattleOutcome, DamageOutcome};

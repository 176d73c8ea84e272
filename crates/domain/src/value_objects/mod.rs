//! Value objects: validated, immutable building blocks for the aggregates.

mod command;
mod names;
mod narration_style;
mod stats;

pub use command::Command;
pub use names::CombatantName;
pub use narration_style::NarrationStyle;
pub use stats::{CombatStats, CritChance};

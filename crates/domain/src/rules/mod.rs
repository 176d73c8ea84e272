//! Combat rules shared by every battle kind.

pub mod damage;
pub mod initiative;

pub use damage::{exchange_damage, strike_damage, Exchange};
pub use initiative::acting_side;

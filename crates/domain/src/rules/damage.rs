//! Damage formulas for both battle kinds. Pure functions, no RNG.

use crate::value_objects::{CombatStats, Command};

/// Damage for an autonomous strike.
///
/// `max(1, (critical ? attack * 2 : attack) - defense)`. The floor of one
/// guarantees every autonomous battle ends.
pub fn strike_damage(attack: u32, defense: u32, critical: bool) -> u32 {
    let attack = if critical {
        attack.saturating_mul(2)
    } else {
        attack
    };
    attack.saturating_sub(defense).max(1)
}

/// Damage both sides take from one interactive exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Exchange {
    pub to_player: u32,
    pub to_opponent: u32,
}

/// Resolve one interactive exchange.
///
/// The actor that reads the other side correctly punishes it. The reads are
/// checked with the player as actor first, then the opponent; mirrored
/// ATTACK or ULTIMATE trades blows; everything else whiffs.
pub fn exchange_damage(
    player: &CombatStats,
    opponent: &CombatStats,
    player_command: Command,
    opponent_command: Command,
) -> Exchange {
    if let Some(damage) = punish(player, player_command, opponent, opponent_command) {
        return Exchange {
            to_player: 0,
            to_opponent: damage,
        };
    }

    if let Some(damage) = punish(opponent, opponent_command, player, player_command) {
        return Exchange {
            to_player: damage,
            to_opponent: 0,
        };
    }

    match (player_command, opponent_command) {
        (Command::Attack, Command::Attack) | (Command::Ultimate, Command::Ultimate) => Exchange {
            to_player: opponent.attack,
            to_opponent: player.attack,
        },
        _ => Exchange::default(),
    }
}

/// Damage the actor deals to the target when its command beats the target's.
///
/// DEFEND and EVADE turn the target's own defense against it.
fn punish(
    actor: &CombatStats,
    actor_command: Command,
    target: &CombatStats,
    target_command: Command,
) -> Option<u32> {
    match (actor_command, target_command) {
        (Command::Attack, Command::Evade) => Some(actor.attack),
        (Command::Defend, Command::Attack) => Some(target.defense.saturating_mul(2)),
        (Command::Evade, Command::Ultimate) => Some(target.defense.saturating_mul(3)),
        (Command::Ultimate, Command::Attack | Command::Defend) => {
            Some(actor.attack.saturating_mul(2))
        }
        _ => None,
    }
}

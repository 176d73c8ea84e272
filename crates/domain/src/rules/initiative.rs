//! Turn order for autonomous battles.

use crate::aggregates::Side;

/// Which side swings on `turn` (1-based).
///
/// The faster side opens every round of two actions; ties favor the player.
pub fn acting_side(turn: u32, player_speed: u32, opponent_speed: u32) -> Side {
    let player_is_faster = player_speed >= opponent_speed;
    let player_acts = if turn % 2 == 1 {
        player_is_faster
    } else {
        !player_is_faster
    };

    if player_acts {
        Side::Player
    } else {
        Side::Opponent
    }
}

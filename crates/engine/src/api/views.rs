//! Domain to wire conversions.

use skirmish_domain::{
    Battle, BattleKind, BattleOutcome, BattleStatus, CombatantId, CombatantSnapshot, Side,
    TurnAction, TurnRecord,
};
use skirmish_shared::{
    BatchResult, BattleKindData, BattleStatusData, BattleView, CombatantView, OutcomeData,
    SideData, StreamMessage, TurnView,
};

pub fn outcome_data(outcome: BattleOutcome) -> OutcomeData {
    match outcome {
        BattleOutcome::Win => OutcomeData::Win,
        BattleOutcome::Lose => OutcomeData::Lose,
    }
}

fn kind_data(kind: BattleKind) -> BattleKindData {
    match kind {
        BattleKind::Autonomous => BattleKindData::Autonomous,
        BattleKind::Interactive => BattleKindData::Interactive,
    }
}

fn status_data(status: BattleStatus) -> BattleStatusData {
    match status {
        BattleStatus::Created => BattleStatusData::Created,
        BattleStatus::Running => BattleStatusData::Running,
        BattleStatus::Won => BattleStatusData::Won,
        BattleStatus::Lost => BattleStatusData::Lost,
        BattleStatus::Abandoned => BattleStatusData::Abandoned,
    }
}

fn side_data(side: Side) -> SideData {
    match side {
        Side::Player => SideData::Player,
        Side::Opponent => SideData::Opponent,
    }
}

pub fn combatant_view(combatant: &CombatantSnapshot) -> CombatantView {
    let (id, source) = match combatant.id() {
        CombatantId::Character(id) => (id.to_uuid(), "character"),
        CombatantId::Monster(id) => (id.to_uuid(), "monster"),
    };
    CombatantView {
        id,
        source: source.to_string(),
        name: combatant.name().as_str().to_string(),
        portrait: combatant.portrait().map(str::to_string),
        hp: combatant.hp(),
        max_hp: combatant.max_hp(),
        attack: combatant.attack(),
        defense: combatant.defense(),
        speed: combatant.speed(),
        crit_chance: combatant.crit_chance().percent(),
    }
}

pub fn turn_view(battle: &Battle, record: &TurnRecord) -> TurnView {
    let actor = record.actor();
    let (player_command, opponent_command) = match record.action() {
        TurnAction::Strike => (None, None),
        TurnAction::Exchange { player, opponent } => (
            Some(player.as_str().to_string()),
            Some(opponent.as_str().to_string()),
        ),
    };

    TurnView {
        turn: record.turn(),
        actor: side_data(actor),
        actor_name: battle.combatant(actor).name().as_str().to_string(),
        target_name: battle.combatant(actor.other()).name().as_str().to_string(),
        damage: record.damage(),
        damage_to_player: record.damage_to_player(),
        damage_to_opponent: record.damage_to_opponent(),
        critical: record.is_critical(),
        player_command,
        opponent_command,
        narration: record.narration().to_string(),
        player_hp: record.player_hp(),
        opponent_hp: record.opponent_hp(),
    }
}

pub fn battle_view(battle: &Battle) -> BattleView {
    BattleView {
        id: battle.id().to_uuid(),
        kind: kind_data(battle.kind()),
        status: status_data(battle.status()),
        turn: battle.turn_number(),
        terminal: battle.is_terminal(),
        outcome: battle.outcome().map(outcome_data),
        player: combatant_view(battle.player()),
        opponent: combatant_view(battle.opponent()),
        opponent_command: battle
            .last_opponent_command()
            .map(|c| c.as_str().to_string()),
        intro: battle.intro_line(),
        log: battle
            .turns()
            .iter()
            .map(|record| battle.render_turn(record))
            .collect(),
        turns: battle
            .turns()
            .iter()
            .map(|record| turn_view(battle, record))
            .collect(),
    }
}

/// Batch result for a finished battle. `None` while it is still running.
pub fn batch_result(battle: &Battle) -> Option<BatchResult> {
    let outcome = battle.outcome()?;
    Some(BatchResult {
        battle_id: battle.id().to_uuid(),
        outcome: outcome_data(outcome),
        intro: battle.intro_line(),
        summary: battle.summary(),
        turns: battle
            .turns()
            .iter()
            .map(|record| turn_view(battle, record))
            .collect(),
    })
}

pub fn intro_message(battle: &Battle) -> StreamMessage {
    StreamMessage::Intro {
        message: battle.intro_line(),
    }
}

pub fn turn_message(battle: &Battle, record: &TurnRecord) -> StreamMessage {
    StreamMessage::Turn(turn_view(battle, record))
}

/// Final stream frame. `None` while the battle is still running.
pub fn result_message(battle: &Battle) -> Option<StreamMessage> {
    let outcome = battle.outcome()?;
    Some(StreamMessage::Result {
        outcome: outcome_data(outcome),
        message: battle.summary(),
    })
}

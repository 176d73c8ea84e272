//! Battle aggregate - one fight's lifecycle and turn log.
//!
//! # Lifecycle
//!
//! ```text
//! Created -> Running -> Won | Lost            (autonomous)
//! Created -> Running -> Won | Lost | Abandoned (interactive)
//! ```
//!
//! A turn is resolved in two steps so the caption (produced asynchronously
//! by the engine) can be embedded in the record:
//!
//! 1. [`Battle::prepare_turn`] computes damage and post-turn hit points
//!    without touching the battle.
//! 2. [`Battle::commit_turn`] applies the prepared turn with its caption.
//!    A prepared turn is only valid for the turn number it was prepared for,
//!    so a turn can never be committed twice.
//!
//! Once the battle is terminal, preparing a turn yields `None` and the battle
//! stays exactly as it is.

use serde::{Deserialize, Serialize};

use super::combatant::{CombatantSnapshot, Side};
use crate::error::DomainError;
use crate::events::BattleOutcome;
use crate::rules::{acting_side, exchange_damage, strike_damage};
use crate::value_objects::{Command, NarrationStyle};
use crate::BattleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleKind {
    /// Both sides are driven by the engine (PvE)
    Autonomous,
    /// The player picks a command every turn (PvP)
    Interactive,
}

impl BattleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BattleKind::Autonomous => "AUTONOMOUS",
            BattleKind::Interactive => "INTERACTIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleStatus {
    Created,
    Running,
    Won,
    Lost,
    Abandoned,
}

impl BattleStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BattleStatus::Won | BattleStatus::Lost | BattleStatus::Abandoned
        )
    }

    pub fn outcome(self) -> Option<BattleOutcome> {
        match self {
            BattleStatus::Won => Some(BattleOutcome::Win),
            BattleStatus::Lost => Some(BattleOutcome::Lose),
            _ => None,
        }
    }
}

/// What a driver feeds into one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnInput {
    /// Autonomous turn; `crit_roll` is a roll in `0..100` for the acting side.
    Strike { crit_roll: u8 },
    /// Interactive turn; both sides' commands for this exchange.
    Exchange { player: Command, opponent: Command },
}

/// What happened on a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnAction {
    /// Implicit attack by the acting side
    Strike,
    Exchange { player: Command, opponent: Command },
}

/// A turn whose numbers are settled but which has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTurn {
    turn: u32,
    actor: Side,
    action: TurnAction,
    damage_to_player: u32,
    damage_to_opponent: u32,
    critical: bool,
    player_hp: u32,
    opponent_hp: u32,
}

impl PreparedTurn {
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn actor(&self) -> Side {
        self.actor
    }

    pub fn target(&self) -> Side {
        self.actor.other()
    }

    pub fn action(&self) -> TurnAction {
        self.action
    }

    /// Damage dealt by the acting side.
    pub fn damage(&self) -> u32 {
        dealt_by(self.actor, self.damage_to_player, self.damage_to_opponent)
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Whether committing this turn ends the battle.
    pub fn ends_battle(&self) -> bool {
        self.player_hp == 0 || self.opponent_hp == 0
    }
}

/// One resolved turn. Records are append-only and never change once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    turn: u32,
    actor: Side,
    action: TurnAction,
    damage_to_player: u32,
    damage_to_opponent: u32,
    critical: bool,
    narration: String,
    player_hp: u32,
    opponent_hp: u32,
}

impl TurnRecord {
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn actor(&self) -> Side {
        self.actor
    }

    pub fn action(&self) -> TurnAction {
        self.action
    }

    /// Damage dealt by the acting side.
    pub fn damage(&self) -> u32 {
        dealt_by(self.actor, self.damage_to_player, self.damage_to_opponent)
    }

    pub fn damage_to_player(&self) -> u32 {
        self.damage_to_player
    }

    pub fn damage_to_opponent(&self) -> u32 {
        self.damage_to_opponent
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn narration(&self) -> &str {
        &self.narration
    }

    pub fn player_hp(&self) -> u32 {
        self.player_hp
    }

    pub fn opponent_hp(&self) -> u32 {
        self.opponent_hp
    }
}

fn dealt_by(actor: Side, to_player: u32, to_opponent: u32) -> u32 {
    match actor {
        Side::Player => to_opponent,
        Side::Opponent => to_player,
    }
}

/// One battle between the requesting player and an opponent.
///
/// # Invariants
///
/// - `turn` starts at 1 and grows by exactly one per committed turn
/// - `turns[i].turn() == i + 1`
/// - a terminal battle never changes again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Battle {
    id: BattleId,
    kind: BattleKind,
    player: CombatantSnapshot,
    opponent: CombatantSnapshot,
    turn: u32,
    status: BattleStatus,
    turns: Vec<TurnRecord>,
    narration_style: NarrationStyle,
    last_opponent_command: Option<Command>,
}

impl Battle {
    pub fn new(
        id: BattleId,
        kind: BattleKind,
        player: CombatantSnapshot,
        opponent: CombatantSnapshot,
    ) -> Result<Self, DomainError> {
        Self::check_entrants(&player, &opponent)?;

        Ok(Self {
            id,
            kind,
            player,
            opponent,
            turn: 1,
            status: BattleStatus::Created,
            turns: Vec::new(),
            narration_style: NarrationStyle::default(),
            last_opponent_command: None,
        })
    }

    /// Both fighters must be standing. Callers that reserve resources before
    /// building the battle check this first.
    pub fn check_entrants(
        player: &CombatantSnapshot,
        opponent: &CombatantSnapshot,
    ) -> Result<(), DomainError> {
        match [player, opponent].into_iter().find(|c| c.is_defeated()) {
            Some(down) => Err(DomainError::validation(format!(
                "{} cannot enter a battle with 0 HP",
                down.name()
            ))),
            None => Ok(()),
        }
    }

    pub fn with_narration_style(mut self, style: NarrationStyle) -> Self {
        self.narration_style = style;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> BattleId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> BattleKind {
        self.kind
    }

    #[inline]
    pub fn player(&self) -> &CombatantSnapshot {
        &self.player
    }

    #[inline]
    pub fn opponent(&self) -> &CombatantSnapshot {
        &self.opponent
    }

    pub fn combatant(&self, side: Side) -> &CombatantSnapshot {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    /// Number of the next turn to resolve.
    #[inline]
    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    #[inline]
    pub fn status(&self) -> BattleStatus {
        self.status
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.status.outcome()
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.turns.last()
    }

    #[inline]
    pub fn narration_style(&self) -> NarrationStyle {
        self.narration_style
    }

    /// Command the opponent picked on the most recent exchange.
    #[inline]
    pub fn last_opponent_command(&self) -> Option<Command> {
        self.last_opponent_command
    }

    // =========================================================================
    // Turn resolution
    // =========================================================================

    /// Work out the next turn without applying it.
    ///
    /// Returns `Ok(None)` when the battle is already over.
    pub fn prepare_turn(&self, input: TurnInput) -> Result<Option<PreparedTurn>, DomainError> {
        if self.is_terminal() {
            return Ok(None);
        }

        let prepared = match (self.kind, input) {
            (BattleKind::Autonomous, TurnInput::Strike { crit_roll }) => {
                self.prepare_strike(crit_roll)
            }
            (BattleKind::Interactive, TurnInput::Exchange { player, opponent }) => {
                self.prepare_exchange(player, opponent)
            }
            (kind, input) => {
                return Err(DomainError::invalid_state_transition(format!(
                    "{} battle cannot resolve {input:?}",
                    kind.as_str()
                )))
            }
        };

        Ok(Some(prepared))
    }

    fn prepare_strike(&self, crit_roll: u8) -> PreparedTurn {
        let actor = acting_side(self.turn, self.player.speed(), self.opponent.speed());
        let attacker = self.combatant(actor);
        let defender = self.combatant(actor.other());

        let critical = attacker.crit_chance().is_critical(crit_roll);
        let damage = strike_damage(attacker.attack(), defender.defense(), critical);

        let (damage_to_player, damage_to_opponent) = match actor {
            Side::Player => (0, damage),
            Side::Opponent => (damage, 0),
        };

        PreparedTurn {
            turn: self.turn,
            actor,
            action: TurnAction::Strike,
            damage_to_player,
            damage_to_opponent,
            critical,
            player_hp: self.player.hp_after(damage_to_player),
            opponent_hp: self.opponent.hp_after(damage_to_opponent),
        }
    }

    fn prepare_exchange(&self, player_command: Command, opponent_command: Command) -> PreparedTurn {
        let exchange = exchange_damage(
            self.player.stats(),
            self.opponent.stats(),
            player_command,
            opponent_command,
        );

        let player_hp = self.player.hp_after(exchange.to_player);
        let opponent_hp = self.opponent.hp_after(exchange.to_opponent);

        // A knockout decides the credit; otherwise whoever landed the only blow
        let actor = if opponent_hp == 0 {
            Side::Player
        } else if player_hp == 0 || (exchange.to_player > 0 && exchange.to_opponent == 0) {
            Side::Opponent
        } else {
            Side::Player
        };

        PreparedTurn {
            turn: self.turn,
            actor,
            action: TurnAction::Exchange {
                player: player_command,
                opponent: opponent_command,
            },
            damage_to_player: exchange.to_player,
            damage_to_opponent: exchange.to_opponent,
            critical: false,
            player_hp,
            opponent_hp,
        }
    }

    /// Apply a prepared turn and append its record.
    pub fn commit_turn(
        &mut self,
        prepared: PreparedTurn,
        narration: impl Into<String>,
    ) -> Result<&TurnRecord, DomainError> {
        if prepared.turn != self.turn || self.is_terminal() {
            return Err(DomainError::StaleTurn {
                prepared: prepared.turn,
                current: self.turn,
            });
        }

        self.player.apply_damage(prepared.damage_to_player);
        self.opponent.apply_damage(prepared.damage_to_opponent);

        if let TurnAction::Exchange { opponent, .. } = prepared.action {
            self.last_opponent_command = Some(opponent);
        }

        self.turns.push(TurnRecord {
            turn: prepared.turn,
            actor: prepared.actor,
            action: prepared.action,
            damage_to_player: prepared.damage_to_player,
            damage_to_opponent: prepared.damage_to_opponent,
            critical: prepared.critical,
            narration: narration.into(),
            player_hp: self.player.hp(),
            opponent_hp: self.opponent.hp(),
        });
        self.turn += 1;

        // Opponent going down first means a double knockout counts as a win
        self.status = if self.opponent.is_defeated() {
            BattleStatus::Won
        } else if self.player.is_defeated() {
            BattleStatus::Lost
        } else {
            BattleStatus::Running
        };

        self.turns
            .last()
            .ok_or_else(|| DomainError::invalid_state_transition("turn log is empty after commit"))
    }

    /// Prepare and commit in one go, with a synchronous caption.
    pub fn resolve_turn<F>(
        &mut self,
        input: TurnInput,
        narrate: F,
    ) -> Result<Option<&TurnRecord>, DomainError>
    where
        F: FnOnce(&Self, &PreparedTurn) -> String,
    {
        let Some(prepared) = self.prepare_turn(input)? else {
            return Ok(None);
        };
        let narration = narrate(self, &prepared);
        self.commit_turn(prepared, narration).map(Some)
    }

    /// Walk away from an interactive battle.
    pub fn abandon(&mut self) -> Result<(), DomainError> {
        if self.kind != BattleKind::Interactive {
            return Err(DomainError::invalid_state_transition(
                "only interactive battles can be abandoned",
            ));
        }
        if self.is_terminal() {
            return Err(DomainError::invalid_state_transition(
                "battle is already over",
            ));
        }
        self.status = BattleStatus::Abandoned;
        Ok(())
    }

    /// Reset the opponent command display after the battle has ended.
    pub fn clear_opponent_command(&mut self) {
        self.last_opponent_command = None;
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Line announcing the opponent's stats.
    pub fn intro_line(&self) -> String {
        let o = &self.opponent;
        format!(
            "{} appeared! (HP: {}, ATK: {}, DEF: {}, SPD: {}, CRIT: {}%)",
            o.name(),
            o.max_hp(),
            o.attack(),
            o.defense(),
            o.speed(),
            o.crit_chance().percent()
        )
    }

    /// Single-line rendering of a turn, used for the persisted turn log.
    pub fn render_turn(&self, record: &TurnRecord) -> String {
        let player = self.player.name();
        let opponent = self.opponent.name();
        let body = match record.action() {
            TurnAction::Strike => {
                let actor = self.combatant(record.actor()).name();
                let target = self.combatant(record.actor().other()).name();
                format!(
                    "{actor} hits {target} for {} damage{}",
                    record.damage(),
                    if record.is_critical() {
                        " (critical hit!)"
                    } else {
                        ""
                    }
                )
            }
            TurnAction::Exchange {
                player: player_command,
                opponent: opponent_command,
            } => format!(
                "{player} used {player_command}, {opponent} used {opponent_command}. \
                 Damage taken: {player}={}, {opponent}={}",
                record.damage_to_player(),
                record.damage_to_opponent()
            ),
        };

        format!(
            "Turn {}: {body}. {} ({player} HP: {}, {opponent} HP: {})",
            record.turn(),
            record.narration(),
            record.player_hp(),
            record.opponent_hp()
        )
    }

    /// Closing message for a finished battle.
    pub fn summary(&self) -> String {
        let turns = self.turns.len();
        match self.status {
            BattleStatus::Won => format!(
                "Victory! {} defeated {} in {turns} turns.",
                self.player.name(),
                self.opponent.name()
            ),
            BattleStatus::Lost => format!(
                "Defeat... {} was too strong. Try again next time!",
                self.opponent.name()
            ),
            BattleStatus::Abandoned => format!("Battle abandoned after {turns} turns."),
            BattleStatus::Created | BattleStatus::Running => {
                format!("Battle in progress, turn {}.", self.turn)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::CombatantId;
    use crate::value_objects::{CombatStats, CombatantName, CritChance};
    use crate::{CharacterId, MonsterId};

    fn hero(stats: CombatStats) -> CombatantSnapshot {
        CombatantSnapshot::new(
            CombatantId::Character(CharacterId::new()),
            CombatantName::new("Hero").unwrap(),
            stats,
        )
    }

    fn slime(stats: CombatStats) -> CombatantSnapshot {
        CombatantSnapshot::new(
            CombatantId::Monster(MonsterId::new()),
            CombatantName::new("Slime").unwrap(),
            stats,
        )
    }

    fn even_stats() -> CombatStats {
        CombatStats::new(10, 5, 0, 5, CritChance::NEVER)
    }

    fn pve(player: CombatStats, opponent: CombatStats) -> Battle {
        Battle::new(
            BattleId::new(),
            BattleKind::Autonomous,
            hero(player),
            slime(opponent),
        )
        .unwrap()
    }

    fn pvp(player: CombatStats, opponent: CombatStats) -> Battle {
        Battle::new(
            BattleId::new(),
            BattleKind::Interactive,
            hero(player),
            slime(opponent),
        )
        .unwrap()
    }

    fn caption(_: &Battle, _: &PreparedTurn) -> String {
        "caption".to_string()
    }

    const STRIKE: TurnInput = TurnInput::Strike { crit_roll: 99 };

    fn run_to_end(battle: &mut Battle, input: TurnInput) {
        while !battle.is_terminal() {
            battle.resolve_turn(input, caption).unwrap();
            assert!(battle.turns().len() < 10_000, "battle never ended");
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn new_battle_starts_at_turn_one() {
            let battle = pve(even_stats(), even_stats());
            assert_eq!(battle.turn_number(), 1);
            assert_eq!(battle.status(), BattleStatus::Created);
            assert!(battle.turns().is_empty());
        }

        #[test]
        fn rejects_knocked_out_combatant() {
            let mut down = even_stats();
            down.hp = 0;
            let result = Battle::new(
                BattleId::new(),
                BattleKind::Autonomous,
                hero(even_stats()),
                slime(down),
            );
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        #[test]
        fn first_turn_moves_to_running() {
            let mut battle = pve(even_stats(), CombatStats::new(100, 5, 0, 5, CritChance::NEVER));
            battle.resolve_turn(STRIKE, caption).unwrap();
            assert_eq!(battle.status(), BattleStatus::Running);
        }

        #[test]
        fn turn_numbers_have_no_gaps() {
            let mut battle = pve(
                CombatStats::new(40, 3, 1, 5, CritChance::NEVER),
                CombatStats::new(40, 4, 1, 6, CritChance::NEVER),
            );
            run_to_end(&mut battle, STRIKE);
            for (index, record) in battle.turns().iter().enumerate() {
                assert_eq!(record.turn() as usize, index + 1);
            }
            assert_eq!(battle.turn_number() as usize, battle.turns().len() + 1);
        }

        #[test]
        fn terminal_battle_is_left_untouched() {
            let mut battle = pve(even_stats(), even_stats());
            run_to_end(&mut battle, STRIKE);
            let before = battle.clone();

            let resolved = battle.resolve_turn(STRIKE, caption).unwrap();
            assert!(resolved.is_none());
            assert_eq!(battle, before);
            assert!(battle.prepare_turn(STRIKE).unwrap().is_none());
        }

        #[test]
        fn stale_prepared_turn_is_rejected() {
            let mut battle = pve(even_stats(), CombatStats::new(100, 5, 0, 5, CritChance::NEVER));
            let first = battle.prepare_turn(STRIKE).unwrap().unwrap();
            battle.commit_turn(first.clone(), "once").unwrap();

            let err = battle.commit_turn(first, "twice").unwrap_err();
            assert_eq!(
                err,
                DomainError::StaleTurn {
                    prepared: 1,
                    current: 2
                }
            );
            assert_eq!(battle.turns().len(), 1);
        }

        #[test]
        fn prepare_does_not_mutate() {
            let battle = pve(even_stats(), even_stats());
            let before = battle.clone();
            let _ = battle.prepare_turn(STRIKE).unwrap();
            assert_eq!(battle, before);
        }

        #[test]
        fn wrong_input_kind_is_rejected() {
            let battle = pve(even_stats(), even_stats());
            let result = battle.prepare_turn(TurnInput::Exchange {
                player: Command::Attack,
                opponent: Command::Attack,
            });
            assert!(matches!(
                result,
                Err(DomainError::InvalidStateTransition(_))
            ));

            let battle = pvp(even_stats(), even_stats());
            assert!(battle.prepare_turn(STRIKE).is_err());
        }
    }

    mod autonomous {
        use super::*;

        #[test]
        fn equal_fighters_without_crits_end_on_turn_three() {
            // Player opens (tie), deals 5; slime answers for 5; player finishes.
            let mut battle = pve(even_stats(), even_stats());
            run_to_end(&mut battle, STRIKE);

            let turns = battle.turns();
            assert_eq!(turns.len(), 3);
            assert_eq!(turns[0].actor(), Side::Player);
            assert_eq!(turns[0].damage(), 5);
            assert_eq!(turns[0].opponent_hp(), 5);
            assert_eq!(turns[1].actor(), Side::Opponent);
            assert_eq!(turns[1].player_hp(), 5);
            assert_eq!(turns[2].opponent_hp(), 0);
            assert_eq!(battle.outcome(), Some(BattleOutcome::Win));
        }

        #[test]
        fn critical_first_strike_ends_in_one_turn() {
            let mut crit = even_stats();
            crit.crit_chance = CritChance::ALWAYS;
            let mut battle = pve(crit, even_stats());

            let record = battle
                .resolve_turn(TurnInput::Strike { crit_roll: 0 }, caption)
                .unwrap()
                .unwrap();
            assert!(record.is_critical());
            assert_eq!(record.damage(), 10);
            assert_eq!(battle.status(), BattleStatus::Won);
            assert_eq!(battle.turns().len(), 1);
        }

        #[test]
        fn faster_monster_swings_first() {
            let mut battle = pve(
                CombatStats::new(30, 5, 0, 5, CritChance::NEVER),
                CombatStats::new(30, 5, 0, 10, CritChance::NEVER),
            );
            let record = battle.resolve_turn(STRIKE, caption).unwrap().unwrap();
            assert_eq!(record.actor(), Side::Opponent);
            assert_eq!(record.player_hp(), 25);
        }

        #[test]
        fn impenetrable_defense_still_takes_one() {
            let mut battle = pve(
                CombatStats::new(3, 1, 0, 10, CritChance::NEVER),
                CombatStats::new(3, 1, 999, 1, CritChance::NEVER),
            );
            let record = battle.resolve_turn(STRIKE, caption).unwrap().unwrap();
            assert_eq!(record.damage(), 1);
        }

        #[test]
        fn losing_battle_reports_lose() {
            let mut battle = pve(
                CombatStats::new(5, 1, 0, 1, CritChance::NEVER),
                CombatStats::new(50, 10, 0, 10, CritChance::NEVER),
            );
            run_to_end(&mut battle, STRIKE);
            assert_eq!(battle.outcome(), Some(BattleOutcome::Lose));
            assert_eq!(battle.player().hp(), 0);
        }

        #[test]
        fn abandon_is_interactive_only() {
            let mut battle = pve(even_stats(), even_stats());
            assert!(battle.abandon().is_err());
        }
    }

    mod interactive {
        use super::*;

        fn exchange(player: Command, opponent: Command) -> TurnInput {
            TurnInput::Exchange { player, opponent }
        }

        #[test]
        fn attack_into_evade_credits_player() {
            let mut battle = pvp(
                CombatStats::new(30, 8, 2, 5, CritChance::NEVER),
                CombatStats::new(30, 6, 3, 5, CritChance::NEVER),
            );
            let record = battle
                .resolve_turn(exchange(Command::Attack, Command::Evade), caption)
                .unwrap()
                .unwrap();
            assert_eq!(record.actor(), Side::Player);
            assert_eq!(record.damage_to_opponent(), 8);
            assert_eq!(record.damage_to_player(), 0);
            assert_eq!(battle.last_opponent_command(), Some(Command::Evade));
        }

        #[test]
        fn opponent_read_credits_opponent() {
            let mut battle = pvp(
                CombatStats::new(30, 8, 2, 5, CritChance::NEVER),
                CombatStats::new(30, 6, 3, 5, CritChance::NEVER),
            );
            let record = battle
                .resolve_turn(exchange(Command::Evade, Command::Attack), caption)
                .unwrap()
                .unwrap();
            assert_eq!(record.actor(), Side::Opponent);
            assert_eq!(record.damage(), 6);
            assert_eq!(battle.player().hp(), 24);
        }

        #[test]
        fn whiff_changes_nothing_but_the_turn() {
            let mut battle = pvp(even_stats(), even_stats());
            battle
                .resolve_turn(exchange(Command::Defend, Command::Evade), caption)
                .unwrap();
            assert_eq!(battle.player().hp(), 10);
            assert_eq!(battle.opponent().hp(), 10);
            assert_eq!(battle.turn_number(), 2);
        }

        #[test]
        fn double_knockout_counts_as_win() {
            let mut battle = pvp(even_stats(), CombatStats::new(5, 10, 0, 5, CritChance::NEVER));
            battle
                .resolve_turn(exchange(Command::Attack, Command::Attack), caption)
                .unwrap();
            assert_eq!(battle.player().hp(), 0);
            assert_eq!(battle.opponent().hp(), 0);
            assert_eq!(battle.status(), BattleStatus::Won);
        }

        #[test]
        fn mirrored_exchange_that_drops_only_the_player_credits_opponent() {
            let mut battle = pvp(
                CombatStats::new(5, 5, 0, 5, CritChance::NEVER),
                CombatStats::new(100, 10, 0, 5, CritChance::NEVER),
            );
            let record = battle
                .resolve_turn(exchange(Command::Attack, Command::Attack), caption)
                .unwrap()
                .unwrap()
                .clone();
            assert_eq!(record.actor(), Side::Opponent);
            assert_eq!(record.damage(), 10);
            assert_eq!(record.player_hp(), 0);
            assert_eq!(record.opponent_hp(), 95);
            assert_eq!(battle.status(), BattleStatus::Lost);
        }

        #[test]
        fn double_knockout_credits_player() {
            let mut battle = pvp(even_stats(), CombatStats::new(5, 10, 0, 5, CritChance::NEVER));
            let record = battle
                .resolve_turn(exchange(Command::Ultimate, Command::Ultimate), caption)
                .unwrap()
                .unwrap();
            assert_eq!(record.actor(), Side::Player);
        }

        #[test]
        fn hp_is_clamped_at_zero() {
            let mut battle = pvp(
                CombatStats::new(30, 50, 2, 5, CritChance::NEVER),
                CombatStats::new(4, 6, 3, 5, CritChance::NEVER),
            );
            let record = battle
                .resolve_turn(exchange(Command::Ultimate, Command::Defend), caption)
                .unwrap()
                .unwrap();
            assert_eq!(record.damage_to_opponent(), 100);
            assert_eq!(record.opponent_hp(), 0);
        }

        #[test]
        fn abandon_is_terminal() {
            let mut battle = pvp(even_stats(), even_stats());
            battle.abandon().unwrap();
            assert_eq!(battle.status(), BattleStatus::Abandoned);
            assert!(battle.outcome().is_none());
            assert!(battle
                .resolve_turn(exchange(Command::Attack, Command::Evade), caption)
                .unwrap()
                .is_none());
            assert!(battle.abandon().is_err());
        }

        #[test]
        fn clearing_opponent_command() {
            let mut battle = pvp(even_stats(), even_stats());
            battle
                .resolve_turn(exchange(Command::Defend, Command::Evade), caption)
                .unwrap();
            battle.clear_opponent_command();
            assert!(battle.last_opponent_command().is_none());
        }
    }

    mod text {
        use super::*;

        #[test]
        fn renders_strike_line() {
            let mut battle = pve(even_stats(), even_stats());
            let record = battle.resolve_turn(STRIKE, caption).unwrap().unwrap().clone();
            assert_eq!(
                battle.render_turn(&record),
                "Turn 1: Hero hits Slime for 5 damage. caption (Hero HP: 10, Slime HP: 5)"
            );
        }

        #[test]
        fn renders_exchange_line() {
            let mut battle = pvp(even_stats(), even_stats());
            let record = battle
                .resolve_turn(
                    TurnInput::Exchange {
                        player: Command::Attack,
                        opponent: Command::Evade,
                    },
                    caption,
                )
                .unwrap()
                .unwrap()
                .clone();
            let line = battle.render_turn(&record);
            assert!(line.starts_with("Turn 1: Hero used ATTACK, Slime used EVADE."));
            assert!(line.contains("Slime=5"));
        }

        #[test]
        fn intro_lists_opponent_stats() {
            let battle = pve(even_stats(), even_stats());
            assert_eq!(
                battle.intro_line(),
                "Slime appeared! (HP: 10, ATK: 5, DEF: 0, SPD: 5, CRIT: 0%)"
            );
        }

        #[test]
        fn summary_names_the_winner() {
            let mut battle = pve(even_stats(), even_stats());
            run_to_end(&mut battle, STRIKE);
            assert_eq!(battle.summary(), "Victory! Hero defeated Slime in 3 turns.");
        }
    }
}

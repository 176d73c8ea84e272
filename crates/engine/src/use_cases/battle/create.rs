//! Battle creation.
//!
//! Both flows look the fighters up in the catalog, write the battle header
//! (which hands out the battle id) and leave the new battle resident in the
//! registry for a driver to pick up.

use std::sync::Arc;

use skirmish_domain::{
    Battle, BattleKind, CharacterId, CombatantSnapshot, MapId, NarrationStyle,
};

use super::BattleError;
use crate::infrastructure::ports::{
    BattleHeader, BattleLogRepo, ClockPort, CombatantRepo, EncounterType, RandomPort,
};
use crate::stores::BattleRegistry;

/// Start an autonomous battle against a monster drawn from a map.
pub struct CreatePveBattle {
    catalog: Arc<dyn CombatantRepo>,
    battle_log: Arc<dyn BattleLogRepo>,
    registry: Arc<BattleRegistry>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    default_style: NarrationStyle,
}

impl CreatePveBattle {
    pub fn new(
        catalog: Arc<dyn CombatantRepo>,
        battle_log: Arc<dyn BattleLogRepo>,
        registry: Arc<BattleRegistry>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        default_style: NarrationStyle,
    ) -> Self {
        Self {
            catalog,
            battle_log,
            registry,
            random,
            clock,
            default_style,
        }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        map_id: MapId,
        style: Option<NarrationStyle>,
    ) -> Result<Battle, BattleError> {
        let player = self
            .catalog
            .get_character(character_id)
            .await?
            .ok_or(BattleError::CharacterNotFound(character_id))?;
        let map = self
            .catalog
            .get_map(map_id)
            .await?
            .ok_or(BattleError::MapNotFound(map_id))?;

        let roll = self.random.gen_range(0, 99).clamp(0, 99) as u8;
        let encounter = map.rates.encounter_for(roll);
        let monster = self.pick_monster(map_id, encounter).await?;
        Battle::check_entrants(&player, &monster)?;

        let header = BattleHeader {
            kind: BattleKind::Autonomous,
            player: player.id(),
            opponent: monster.id(),
            started_at: self.clock.now(),
        };
        let id = self.battle_log.create_header(&header).await?;

        let battle = Battle::new(id, BattleKind::Autonomous, player, monster)?
            .with_narration_style(style.unwrap_or(self.default_style));

        tracing::info!(
            battle_id = %id,
            character_id = %character_id,
            map = %map.name,
            encounter = encounter.as_str(),
            opponent = %battle.opponent().name(),
            "Autonomous battle created"
        );

        self.registry.insert(battle.clone());
        Ok(battle)
    }

    /// Random monster from the rolled pool. A map without bosses falls back
    /// to its normal monsters.
    async fn pick_monster(
        &self,
        map_id: MapId,
        encounter: EncounterType,
    ) -> Result<CombatantSnapshot, BattleError> {
        let mut pool = self.catalog.list_monsters(map_id, encounter).await?;
        if pool.is_empty() && encounter == EncounterType::Boss {
            tracing::debug!(map_id = %map_id, "No boss on map, drawing a normal monster");
            pool = self
                .catalog
                .list_monsters(map_id, EncounterType::Normal)
                .await?;
        }
        if pool.is_empty() {
            return Err(BattleError::NoMonsters(map_id));
        }

        let last = pool.len() as i32 - 1;
        let index = self.random.gen_range(0, last).clamp(0, last) as usize;
        Ok(pool.swap_remove(index))
    }
}

/// Start an interactive battle between two characters.
pub struct CreatePvpBattle {
    catalog: Arc<dyn CombatantRepo>,
    battle_log: Arc<dyn BattleLogRepo>,
    registry: Arc<BattleRegistry>,
    clock: Arc<dyn ClockPort>,
    default_style: NarrationStyle,
}

impl CreatePvpBattle {
    pub fn new(
        catalog: Arc<dyn CombatantRepo>,
        battle_log: Arc<dyn BattleLogRepo>,
        registry: Arc<BattleRegistry>,
        clock: Arc<dyn ClockPort>,
        default_style: NarrationStyle,
    ) -> Self {
        Self {
            catalog,
            battle_log,
            registry,
            clock,
            default_style,
        }
    }

    pub async fn execute(
        &self,
        character_id: CharacterId,
        opponent_id: CharacterId,
        style: Option<NarrationStyle>,
    ) -> Result<Battle, BattleError> {
        if character_id == opponent_id {
            return Err(BattleError::InvalidRequest(
                "a character cannot battle itself".into(),
            ));
        }

        let player = self
            .catalog
            .get_character(character_id)
            .await?
            .ok_or(BattleError::CharacterNotFound(character_id))?;
        let opponent = self
            .catalog
            .get_character(opponent_id)
            .await?
            .ok_or(BattleError::CharacterNotFound(opponent_id))?;
        Battle::check_entrants(&player, &opponent)?;

        let header = BattleHeader {
            kind: BattleKind::Interactive,
            player: player.id(),
            opponent: opponent.id(),
            started_at: self.clock.now(),
        };
        let id = self.battle_log.create_header(&header).await?;

        let battle = Battle::new(id, BattleKind::Interactive, player, opponent)?
            .with_narration_style(style.unwrap_or(self.default_style));

        tracing::info!(
            battle_id = %id,
            character_id = %character_id,
            opponent_id = %opponent_id,
            "Interactive battle created"
        );

        self.registry.insert(battle.clone());
        Ok(battle)
    }
}

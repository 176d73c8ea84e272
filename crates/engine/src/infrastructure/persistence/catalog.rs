//! SQLite-backed combatant catalog.

use async_trait::async_trait;
use skirmish_domain::{
    CharacterId, CombatStats, CombatantId, CombatantName, CombatantSnapshot, CritChance, MapId,
    MonsterId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::infrastructure::ports::{
    CombatantRepo, EncounterRates, EncounterType, MapInfo, RepoError,
};

/// Fixed ids of the demo catalog.
pub mod demo {
    use skirmish_domain::{CharacterId, MapId};
    use uuid::Uuid;

    pub const KNIGHT: Uuid = Uuid::from_u128(0x5c1a_0000_0000_4000_8000_0000_0000_0001);
    pub const ROGUE: Uuid = Uuid::from_u128(0x5c1a_0000_0000_4000_8000_0000_0000_0002);
    pub const MEADOW: Uuid = Uuid::from_u128(0x5c1a_0000_0000_4000_8000_0000_0000_0100);

    pub fn knight() -> CharacterId {
        CharacterId::from_uuid(KNIGHT)
    }

    pub fn rogue() -> CharacterId {
        CharacterId::from_uuid(ROGUE)
    }

    pub fn meadow() -> MapId {
        MapId::from_uuid(MEADOW)
    }
}

pub struct SqliteCombatantRepo {
    pool: SqlitePool,
}

impl SqliteCombatantRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a small demo catalog. Existing rows are left alone.
    pub async fn seed_demo(&self) -> Result<(), RepoError> {
        let characters = [
            (demo::KNIGHT, "Sir Brambleton", 120, 14, 6, 8, 10),
            (demo::ROGUE, "Quill the Quick", 90, 12, 3, 15, 25),
        ];
        for (id, name, hp, attack, defense, speed, crit) in characters {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO characters
                    (id, name, hp, attack, defense, speed, crit_chance)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id.to_string())
            .bind(name)
            .bind(hp)
            .bind(attack)
            .bind(defense)
            .bind(speed)
            .bind(crit)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("seed_characters", e))?;
        }

        sqlx::query("INSERT OR IGNORE INTO maps (id, name, normal_rate) VALUES (?, ?, 98)")
            .bind(demo::MEADOW.to_string())
            .bind("Whispering Meadow")
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("seed_maps", e))?;

        let monsters = [
            (0x5c1a_0000_0000_4000_8000_0000_0000_0201_u128, EncounterType::Normal, "Puddle Slime", 60, 9, 2, 5, 5),
            (0x5c1a_0000_0000_4000_8000_0000_0000_0202_u128, EncounterType::Normal, "Grumpy Boar", 80, 11, 4, 7, 5),
            (0x5c1a_0000_0000_4000_8000_0000_0000_0203_u128, EncounterType::Boss, "Meadow Wyrm", 200, 18, 8, 9, 15),
        ];
        for (id, encounter, name, hp, attack, defense, speed, crit) in monsters {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO monsters
                    (id, map_id, encounter_type, name, hp, attack, defense, speed, crit_chance)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::from_u128(id).to_string())
            .bind(demo::MEADOW.to_string())
            .bind(encounter.as_str())
            .bind(name)
            .bind(hp)
            .bind(attack)
            .bind(defense)
            .bind(speed)
            .bind(crit)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("seed_monsters", e))?;
        }

        tracing::info!("Demo catalog seeded");
        Ok(())
    }
}

#[async_trait]
impl CombatantRepo for SqliteCombatantRepo {
    async fn get_character(
        &self,
        id: CharacterId,
    ) -> Result<Option<CombatantSnapshot>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, portrait, hp, attack, defense, speed, crit_chance
            FROM characters WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_character", e))?;

        row.map(|row| snapshot_from_row(&row, CombatantId::Character(id)))
            .transpose()
    }

    async fn get_map(&self, id: MapId) -> Result<Option<MapInfo>, RepoError> {
        let row = sqlx::query("SELECT name, normal_rate FROM maps WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_map", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(MapInfo {
            id,
            name: row.get("name"),
            rates: EncounterRates {
                normal: percent(row.get("normal_rate"))?,
            },
        }))
    }

    async fn list_monsters(
        &self,
        map_id: MapId,
        encounter: EncounterType,
    ) -> Result<Vec<CombatantSnapshot>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, portrait, hp, attack, defense, speed, crit_chance
            FROM monsters
            WHERE map_id = ? AND encounter_type = ?
            ORDER BY name
            "#,
        )
        .bind(map_id.to_string())
        .bind(encounter.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_monsters", e))?;

        rows.iter()
            .map(|row| {
                let raw: String = row.get("id");
                let id = Uuid::parse_str(&raw).map_err(RepoError::serialization)?;
                snapshot_from_row(row, CombatantId::Monster(MonsterId::from_uuid(id)))
            })
            .collect()
    }

    async fn record_stage_clear(&self, id: CharacterId) -> Result<(), RepoError> {
        let result =
            sqlx::query("UPDATE characters SET stage_clears = stage_clears + 1 WHERE id = ?")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::database("record_stage_clear", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }
        Ok(())
    }
}

fn snapshot_from_row(row: &SqliteRow, id: CombatantId) -> Result<CombatantSnapshot, RepoError> {
    let name = CombatantName::new(row.get::<String, _>("name"))
        .map_err(RepoError::serialization)?;
    let crit = CritChance::new(percent(row.get("crit_chance"))?)
        .map_err(RepoError::serialization)?;
    let stats = CombatStats::new(
        stat(row.get("hp"))?,
        stat(row.get("attack"))?,
        stat(row.get("defense"))?,
        stat(row.get("speed"))?,
        crit,
    );

    let snapshot = CombatantSnapshot::new(id, name, stats);
    Ok(match row.get::<Option<String>, _>("portrait") {
        Some(portrait) => snapshot.with_portrait(portrait),
        None => snapshot,
    })
}

fn stat(value: i64) -> Result<u32, RepoError> {
    u32::try_from(value).map_err(|_| RepoError::serialization(format!("stat out of range: {value}")))
}

fn percent(value: i64) -> Result<u8, RepoError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| RepoError::serialization(format!("percentage out of range: {value}")))
}

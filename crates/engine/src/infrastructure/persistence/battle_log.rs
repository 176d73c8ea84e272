//! SQLite-backed battle log.

use std::sync::Arc;

use async_trait::async_trait;
use skirmish_domain::{BattleId, BattleOutcome};
use sqlx::SqlitePool;

use crate::infrastructure::ports::{BattleHeader, BattleLogRepo, ClockPort, RepoError};

/// Battle headers plus one row per resolved turn.
pub struct SqliteBattleLog {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteBattleLog {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl BattleLogRepo for SqliteBattleLog {
    async fn create_header(&self, header: &BattleHeader) -> Result<BattleId, RepoError> {
        let id = BattleId::new();

        sqlx::query(
            r#"
            INSERT INTO battles (id, kind, player_id, opponent_id, started_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(header.kind.as_str())
        .bind(header.player.to_string())
        .bind(header.opponent.to_string())
        .bind(header.started_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("create_header", e))?;

        Ok(id)
    }

    async fn append_turn(&self, id: BattleId, turn: u32, line: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO battle_turns (battle_id, turn, line, logged_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(i64::from(turn))
        .bind(line)
        .bind(self.clock.now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("append_turn", e))?;

        Ok(())
    }

    async fn finalize(
        &self,
        id: BattleId,
        outcome: BattleOutcome,
        turn_count: u32,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE battles
            SET outcome = ?, turn_count = ?, finished_at = ?
            WHERE id = ?
            "#,
        )
        .bind(outcome.as_str())
        .bind(i64::from(turn_count))
        .bind(self.clock.now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("finalize", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Battle", id));
        }
        Ok(())
    }
}

//! SQLite pool setup and schema.

use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        portrait TEXT,
        hp INTEGER NOT NULL,
        attack INTEGER NOT NULL,
        defense INTEGER NOT NULL,
        speed INTEGER NOT NULL,
        crit_chance INTEGER NOT NULL,
        stage_clears INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS maps (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        normal_rate INTEGER NOT NULL DEFAULT 98
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS monsters (
        id TEXT PRIMARY KEY,
        map_id TEXT NOT NULL REFERENCES maps(id),
        encounter_type TEXT NOT NULL,
        name TEXT NOT NULL,
        portrait TEXT,
        hp INTEGER NOT NULL,
        attack INTEGER NOT NULL,
        defense INTEGER NOT NULL,
        speed INTEGER NOT NULL,
        crit_chance INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS battles (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        player_id TEXT NOT NULL,
        opponent_id TEXT NOT NULL,
        started_at TEXT NOT NULL,
        outcome TEXT,
        turn_count INTEGER,
        finished_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS battle_turns (
        battle_id TEXT NOT NULL REFERENCES battles(id),
        turn INTEGER NOT NULL,
        line TEXT NOT NULL,
        logged_at TEXT NOT NULL,
        PRIMARY KEY (battle_id, turn)
    )
    "#,
];

/// Open (creating if needed) the database at `db_path` and make sure every
/// table exists.
pub async fn connect(db_path: &str) -> Result<SqlitePool, RepoError> {
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await
        .map_err(|e| RepoError::database("connect", e))?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .map_err(|e| RepoError::database("schema", e))?;
    }

    tracing::info!(db_path, "Battle database ready");
    Ok(pool)
}

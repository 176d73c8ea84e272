//! A fully wired app over a throwaway SQLite database.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::app::App;
use crate::infrastructure::clock::{FixedRandom, SystemClock};
use crate::infrastructure::config::BattleSettings;
use crate::infrastructure::narration::TemplateNarrator;
use crate::infrastructure::persistence::{connect, SqliteBattleLog, SqliteCombatantRepo};

pub struct TestApp {
    pub app: Arc<App>,
    pub pool: SqlitePool,
    _dir: tempfile::TempDir,
}

/// Demo catalog, template captions, no stream pacing.
///
/// Every roll answers 50: the meadow serves a Puddle Slime, nobody crits and
/// the interactive opponent always goes ULTIMATE.
pub async fn test_app() -> TestApp {
    test_app_with_delay(Duration::ZERO).await
}

pub async fn test_app_with_delay(stream_turn_delay: Duration) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("skirmish.db");
    let pool = connect(path.to_str().unwrap()).await.unwrap();

    let catalog = SqliteCombatantRepo::new(pool.clone());
    catalog.seed_demo().await.unwrap();
    let clock = Arc::new(SystemClock);
    let battle_log = SqliteBattleLog::new(pool.clone(), clock.clone());

    let settings = BattleSettings {
        stream_turn_delay,
        ..BattleSettings::default()
    };
    let app = App::with_ports(
        Arc::new(catalog),
        Arc::new(battle_log),
        Arc::new(TemplateNarrator),
        clock,
        Arc::new(FixedRandom(50)),
        settings,
    );

    TestApp {
        app: Arc::new(app),
        pool,
        _dir: dir,
    }
}

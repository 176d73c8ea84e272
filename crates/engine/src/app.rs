//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::BattleSettings,
    ports::{BattleLogRepo, ClockPort, CombatantRepo, NarrationPort, RandomPort},
};
use crate::stores::BattleRegistry;
use crate::use_cases::battle::{
    AbandonBattle, BattleEngine, CreatePveBattle, CreatePvpBattle, GetBattle, RandomOpponent,
    RunBattle, StreamBattle, SubmitCommand,
};
use crate::use_cases::BattleUseCases;

/// Main application state.
///
/// Passed to HTTP and WebSocket handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub registry: Arc<BattleRegistry>,
    pub settings: BattleSettings,
}

/// Container for all use cases.
pub struct UseCases {
    pub battles: BattleUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        catalog: Arc<dyn CombatantRepo>,
        battle_log: Arc<dyn BattleLogRepo>,
        narrator: Arc<dyn NarrationPort>,
        settings: BattleSettings,
    ) -> Self {
        Self::with_ports(
            catalog,
            battle_log,
            narrator,
            Arc::new(SystemClock),
            Arc::new(SystemRandom),
            settings,
        )
    }

    /// Same as [`App::new`] with explicit time and randomness.
    pub fn with_ports(
        catalog: Arc<dyn CombatantRepo>,
        battle_log: Arc<dyn BattleLogRepo>,
        narrator: Arc<dyn NarrationPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        settings: BattleSettings,
    ) -> Self {
        let registry = Arc::new(BattleRegistry::new());

        let engine = Arc::new(BattleEngine::new(
            narrator,
            battle_log.clone(),
            catalog.clone(),
            random.clone(),
            settings.narration_timeout,
        ));

        let battles = BattleUseCases {
            create_pve: Arc::new(CreatePveBattle::new(
                catalog.clone(),
                battle_log.clone(),
                registry.clone(),
                random.clone(),
                clock.clone(),
                settings.default_style,
            )),
            create_pvp: Arc::new(CreatePvpBattle::new(
                catalog,
                battle_log,
                registry.clone(),
                clock,
                settings.default_style,
            )),
            run: Arc::new(RunBattle::new(engine.clone(), registry.clone())),
            stream: Arc::new(StreamBattle::new(
                engine.clone(),
                registry.clone(),
                settings.stream_turn_delay,
            )),
            submit: Arc::new(SubmitCommand::new(
                engine,
                registry.clone(),
                Arc::new(RandomOpponent::new(random)),
            )),
            get: Arc::new(GetBattle::new(registry.clone())),
            abandon: Arc::new(AbandonBattle::new(registry.clone())),
        };

        Self {
            use_cases: UseCases { battles },
            registry,
            settings,
        }
    }

    /// Evict idle and long-finished battles from the registry.
    pub fn sweep_registry(&self) {
        let report = self.registry.sweep(
            std::time::Instant::now(),
            self.settings.idle_ttl,
            self.settings.terminal_ttl,
        );
        if report.idle + report.terminal > 0 {
            tracing::info!(
                idle = report.idle,
                terminal = report.terminal,
                resident = self.registry.len(),
                "Swept battle registry"
            );
        }
    }
}

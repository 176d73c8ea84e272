//! Engine configuration, read from environment variables.

use std::str::FromStr;
use std::time::Duration;

use skirmish_domain::NarrationStyle;

use super::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};

/// Which caption provider to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationProvider {
    Llm,
    Template,
    Disabled,
}

impl FromStr for NarrationProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" | "ollama" => Ok(Self::Llm),
            "template" => Ok(Self::Template),
            "disabled" | "off" | "none" => Ok(Self::Disabled),
            other => Err(format!("unknown narration provider: {other}")),
        }
    }
}

/// Tuning knobs for the battle use cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleSettings {
    pub narration_timeout: Duration,
    pub default_style: NarrationStyle,
    pub stream_turn_delay: Duration,
    pub idle_ttl: Duration,
    pub terminal_ttl: Duration,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            narration_timeout: Duration::from_millis(8000),
            default_style: NarrationStyle::Comic,
            stream_turn_delay: Duration::from_millis(1000),
            idle_ttl: Duration::from_secs(1800),
            terminal_ttl: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub battle_db: String,
    pub narration_provider: NarrationProvider,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub registry_sweep_interval: Duration,
    pub seed_demo_catalog: bool,
    /// Comma-separated origins, or `*`. No CORS layer when unset.
    pub cors_allowed_origins: Option<String>,
    pub battle: BattleSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            battle_db: "battles.db".into(),
            narration_provider: NarrationProvider::Llm,
            llm_base_url: DEFAULT_OLLAMA_BASE_URL.into(),
            llm_model: DEFAULT_OLLAMA_MODEL.into(),
            llm_api_key: None,
            registry_sweep_interval: Duration::from_secs(60),
            seed_demo_catalog: false,
            cors_allowed_origins: None,
            battle: BattleSettings::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset or invalid values fall back
    /// to defaults; invalid ones are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let millis = |key: &str, default: Duration| {
            Duration::from_millis(parsed(key, get(key), default.as_millis() as u64))
        };
        let secs = |key: &str, default: Duration| {
            Duration::from_secs(parsed(key, get(key), default.as_secs()))
        };

        Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parsed(
                "SERVER_PORT",
                get("SERVER_PORT").or_else(|| get("PORT")),
                defaults.server_port,
            ),
            battle_db: get("BATTLE_DB").unwrap_or(defaults.battle_db),
            narration_provider: parsed(
                "NARRATION_PROVIDER",
                get("NARRATION_PROVIDER"),
                defaults.narration_provider,
            ),
            llm_base_url: get("LLM_BASE_URL")
                .or_else(|| get("OLLAMA_BASE_URL"))
                .unwrap_or(defaults.llm_base_url),
            llm_model: get("LLM_MODEL")
                .or_else(|| get("OLLAMA_MODEL"))
                .unwrap_or(defaults.llm_model),
            llm_api_key: get("LLM_API_KEY"),
            registry_sweep_interval: secs("REGISTRY_SWEEP_SECS", defaults.registry_sweep_interval),
            seed_demo_catalog: parsed(
                "SEED_DEMO_CATALOG",
                get("SEED_DEMO_CATALOG"),
                defaults.seed_demo_catalog,
            ),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
            battle: BattleSettings {
                narration_timeout: millis(
                    "NARRATION_TIMEOUT_MS",
                    defaults.battle.narration_timeout,
                ),
                default_style: parsed(
                    "NARRATION_STYLE",
                    get("NARRATION_STYLE"),
                    defaults.battle.default_style,
                ),
                stream_turn_delay: millis(
                    "STREAM_TURN_DELAY_MS",
                    defaults.battle.stream_turn_delay,
                ),
                idle_ttl: secs("BATTLE_IDLE_TTL_SECS", defaults.battle.idle_ttl),
                terminal_ttl: secs("BATTLE_TERMINAL_TTL_SECS", defaults.battle.terminal_ttl),
            },
        }
    }
}

fn parsed<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Invalid config value, using default");
            default
        }
    }
}

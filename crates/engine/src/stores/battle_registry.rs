//! Process-wide registry of resident battles, keyed by battle id.
//!
//! Autonomous battles wait here between creation and their run; the driver
//! takes them out before simulating. Interactive battles stay resident for
//! the whole fight and are mutated in place under a per-battle lock, so turns
//! for one battle are strictly sequential while different battles proceed
//! independently.
//!
//! # Eviction
//!
//! [`BattleRegistry::sweep`] drops a battle once it has not been touched for
//! `idle_ttl` (still in progress) or `terminal_ttl` (finished). Finished
//! battles linger for the shorter window so that a late resubmission still
//! finds them and gets the unchanged result. Battles whose lock is held are
//! never evicted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use skirmish_domain::{Battle, BattleId, BattleKind};
use tokio::sync::{Mutex, MutexGuard};

/// One battle held by the registry.
pub struct ResidentBattle {
    kind: BattleKind,
    battle: Mutex<Battle>,
    /// Milliseconds since the registry epoch
    touched_ms: AtomicU64,
}

impl ResidentBattle {
    #[inline]
    pub fn kind(&self) -> BattleKind {
        self.kind
    }

    /// Exclusive access to the battle. Held for the whole of one turn.
    pub async fn lock(&self) -> MutexGuard<'_, Battle> {
        self.battle.lock().await
    }
}

/// What one sweep removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub idle: usize,
    pub terminal: usize,
}

pub struct BattleRegistry {
    battles: DashMap<BattleId, Arc<ResidentBattle>>,
    epoch: Instant,
}

impl Default for BattleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleRegistry {
    pub fn new() -> Self {
        Self {
            battles: DashMap::new(),
            epoch: Instant::now(),
        }
    }

    fn millis_at(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.epoch).as_millis() as u64
    }

    fn touch(&self, entry: &ResidentBattle) {
        entry
            .touched_ms
            .store(self.millis_at(Instant::now()), Ordering::Relaxed);
    }

    pub fn insert(&self, battle: Battle) -> Arc<ResidentBattle> {
        let id = battle.id();
        let entry = Arc::new(ResidentBattle {
            kind: battle.kind(),
            battle: Mutex::new(battle),
            touched_ms: AtomicU64::new(self.millis_at(Instant::now())),
        });
        self.battles.insert(id, entry.clone());
        entry
    }

    /// Look a battle up, refreshing its idle timer.
    pub fn get(&self, id: BattleId) -> Option<Arc<ResidentBattle>> {
        let entry = self.battles.get(&id).map(|e| e.value().clone())?;
        self.touch(&entry);
        Some(entry)
    }

    /// Remove and return a battle, but only if it is of `kind`.
    pub fn take(&self, id: BattleId, kind: BattleKind) -> Option<Arc<ResidentBattle>> {
        self.battles
            .remove_if(&id, |_, entry| entry.kind == kind)
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.battles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }

    /// Evict idle and expired battles as of `now`.
    pub fn sweep(&self, now: Instant, idle_ttl: Duration, terminal_ttl: Duration) -> SweepReport {
        let now_ms = self.millis_at(now);
        let idle_ms = idle_ttl.as_millis() as u64;
        let terminal_ms = terminal_ttl.as_millis() as u64;
        let mut report = SweepReport::default();

        self.battles.retain(|id, entry| {
            let age = now_ms.saturating_sub(entry.touched_ms.load(Ordering::Relaxed));
            if age < idle_ms.min(terminal_ms) {
                return true;
            }

            // A held lock means a turn is in flight
            let Ok(battle) = entry.battle.try_lock() else {
                return true;
            };

            if battle.is_terminal() {
                if age >= terminal_ms {
                    tracing::debug!(battle_id = %id, "Evicting finished battle");
                    report.terminal += 1;
                    return false;
                }
            } else if age >= idle_ms {
                tracing::debug!(battle_id = %id, "Evicting idle battle");
                report.idle += 1;
                return false;
            }
            true
        });

        report
    }
}

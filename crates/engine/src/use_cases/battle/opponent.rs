//! How the opponent picks its command in an interactive battle.

use std::sync::Arc;

use skirmish_domain::{Battle, Command};

use crate::infrastructure::ports::RandomPort;

#[cfg_attr(test, mockall::automock)]
pub trait OpponentStrategy: Send + Sync {
    fn choose(&self, battle: &Battle) -> Command;
}

/// Uniform pick among the four commands.
pub struct RandomOpponent {
    random: Arc<dyn RandomPort>,
}

impl RandomOpponent {
    pub fn new(random: Arc<dyn RandomPort>) -> Self {
        Self { random }
    }
}

impl OpponentStrategy for RandomOpponent {
    fn choose(&self, _battle: &Battle) -> Command {
        let last = Command::ALL.len() as i32 - 1;
        let index = self.random.gen_range(0, last).clamp(0, last) as usize;
        Command::ALL[index]
    }
}

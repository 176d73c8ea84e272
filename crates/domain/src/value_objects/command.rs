//! Interactive battle commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the four moves a side can pick in an interactive turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Command {
    Attack,
    Defend,
    Evade,
    Ultimate,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Attack,
        Command::Defend,
        Command::Evade,
        Command::Ultimate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Attack => "ATTACK",
            Command::Defend => "DEFEND",
            Command::Evade => "EVADE",
            Command::Ultimate => "ULTIMATE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(Command::Attack),
            "defend" | "defense" => Ok(Command::Defend),
            "evade" => Ok(Command::Evade),
            "ultimate" => Ok(Command::Ultimate),
            other => Err(DomainError::parse(format!("Unknown command: {other}"))),
        }
    }
}

impl TryFrom<String> for Command {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Command> for String {
    fn from(value: Command) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Attack".parse::<Command>().unwrap(), Command::Attack);
        assert_eq!("ULTIMATE".parse::<Command>().unwrap(), Command::Ultimate);
        assert_eq!(" evade ".parse::<Command>().unwrap(), Command::Evade);
    }

    #[test]
    fn accepts_defense_alias() {
        assert_eq!("defense".parse::<Command>().unwrap(), Command::Defend);
    }

    #[test]
    fn rejects_unknown_token() {
        assert!(matches!(
            "heal".parse::<Command>(),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn serializes_as_upper_token() {
        let json = serde_json::to_string(&Command::Defend).unwrap();
        assert_eq!(json, "\"DEFEND\"");
        let parsed: Command = serde_json::from_str("\"defend\"").unwrap();
        assert_eq!(parsed, Command::Defend);
    }
}

//! Validated name newtype for combatants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MAX_NAME_LEN: usize = 100;

/// Display name of a combatant.
///
/// Always non-empty after trimming and at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CombatantName(String);

impl CombatantName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Combatant name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "Combatant name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CombatantName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CombatantName> for String {
    fn from(value: CombatantName) -> Self {
        value.0
    }
}

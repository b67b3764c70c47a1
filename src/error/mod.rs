//! Engine error type. Only caller bugs and configuration problems end up here;
//! routine refusals (locked weapon, max rank, cooldown) are plain `bool`s.

use crate::model::{Archetype, WeaponId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Weapon id is not part of the archetype's catalog at all.
    #[error("weapon {weapon} is not in the {archetype} catalog")]
    UnknownWeapon {
        archetype: Archetype,
        weapon: WeaponId,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}

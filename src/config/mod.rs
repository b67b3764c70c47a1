//! Rule constants and squad configuration loading.

use crate::error::EngineError;
use crate::model::{Archetype, IntervalMode, WeaponId};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Attack interval multiplier granted by the haste rank.
pub const RANK_HASTE_MULTIPLIER: f64 = 0.83;

/// Intervals at or below this (seconds) are not compressed further by rank haste.
pub const HASTE_INTERVAL_FLOOR_SECS: f64 = 0.2;

/// Rank at which rank-gated haste kicks in.
pub const HASTE_RANK: u8 = 3;

/// Minimum realized damage of a single mitigated hit.
pub const PER_HIT_FLOOR: f64 = 0.5;

/// Minimum realized damage of an averaged hit (damage-range weapons).
pub const AVERAGE_HIT_FLOOR: f64 = 1.0;

/// Target tag used when none is given.
pub const DEFAULT_TARGET_TAG: &str = "普通";

/// Armor values swept by default when comparing squads.
pub const DEFAULT_ARMOR_SWEEP: [f64; 9] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

/// Maximum size of a squad config file.
pub const MAX_CONFIG_FILE_BYTES: u64 = 256 * 1024;

/// Squad analysis loaded from TOML.
///
/// ```toml
/// name = "fission-storm"
/// target_type = "重甲"
/// armor_values = [0, 2, 4, 6]
///
/// [[groups]]
/// archetype = "ghost"
/// weapon = "fission_rifle"
/// rank = 3
/// count = 5
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SquadConfig {
    pub name: String,
    #[serde(default = "default_target_type")]
    pub target_type: String,
    #[serde(default = "default_armor_values")]
    pub armor_values: Vec<f64>,
    #[serde(default)]
    pub interval_mode: IntervalMode,
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub archetype: Archetype,
    pub weapon: WeaponId,
    #[serde(default = "default_rank")]
    pub rank: u8,
    pub count: u32,
}

fn default_target_type() -> String {
    DEFAULT_TARGET_TAG.to_string()
}

fn default_armor_values() -> Vec<f64> {
    DEFAULT_ARMOR_SWEEP.to_vec()
}

fn default_rank() -> u8 {
    1
}

impl SquadConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        let cfg: SquadConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let size = fs::metadata(path)?.len();
        if size > MAX_CONFIG_FILE_BYTES {
            return Err(EngineError::invalid_config(format!(
                "config file too large: {} bytes (max {})",
                size, MAX_CONFIG_FILE_BYTES
            )));
        }
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Rank within the archetype's range, weapon in its catalog and unlocked at that rank, count > 0.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.groups.is_empty() {
            return Err(EngineError::invalid_config("squad has no groups"));
        }
        for g in &self.groups {
            let spec = g.archetype.spec();
            if g.rank < 1 || g.rank > spec.max_rank {
                return Err(EngineError::invalid_config(format!(
                    "{} rank {} outside 1..={}",
                    g.archetype, g.rank, spec.max_rank
                )));
            }
            if !spec.catalog.contains(g.weapon) {
                return Err(EngineError::UnknownWeapon {
                    archetype: g.archetype,
                    weapon: g.weapon,
                });
            }
            if !spec.gates.is_unlocked(g.rank, g.weapon) {
                return Err(EngineError::invalid_config(format!(
                    "{} is locked for {} at rank {}",
                    g.weapon, g.archetype, g.rank
                )));
            }
            if g.count == 0 {
                return Err(EngineError::invalid_config(format!(
                    "{} group with {} has zero count",
                    g.archetype, g.weapon
                )));
            }
        }
        Ok(())
    }
}

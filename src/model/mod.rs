//! Combat model: target tags, target descriptor, weapons, archetypes, rank gates.

mod archetype;
mod rank;
mod weapon;

pub use archetype::{Archetype, ArchetypeSpec};
pub use rank::{effective_interval, IntervalMode, RankGates};
pub use weapon::{DamageKind, WeaponCatalog, WeaponId, WeaponStat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognized target-type tags. Bonus damage tables are keyed by these.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Normal,
    Light,
    Heavy,
    Biological,
    Heroic,
    Mechanical,
}

impl TargetType {
    pub const ALL: [TargetType; 6] = [
        TargetType::Normal,
        TargetType::Light,
        TargetType::Heavy,
        TargetType::Biological,
        TargetType::Heroic,
        TargetType::Mechanical,
    ];

    /// In-game tag as used by the unit data.
    pub fn tag(self) -> &'static str {
        match self {
            TargetType::Normal => "普通",
            TargetType::Light => "轻甲",
            TargetType::Heavy => "重甲",
            TargetType::Biological => "生物",
            TargetType::Heroic => "英雄",
            TargetType::Mechanical => "机械",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TargetType::Normal => "normal",
            TargetType::Light => "light",
            TargetType::Heavy => "heavy",
            TargetType::Biological => "biological",
            TargetType::Heroic => "heroic",
            TargetType::Mechanical => "mechanical",
        }
    }

    /// Accepts the in-game tag or the English name (any case). Unknown tags yield `None`,
    /// which the damage rules treat as "no bonus".
    pub fn from_tag(tag: &str) -> Option<Self> {
        let key = crate::util::normalize_id(tag);
        TargetType::ALL
            .into_iter()
            .find(|t| t.tag() == key || t.name() == key)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Per-call description of what is being shot at. Armor may be negative (exposed target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub target_type: Option<TargetType>,
    pub armor: f64,
}

impl TargetDescriptor {
    /// Build from a raw tag; an unrecognized tag is kept as "no type".
    pub fn new(tag: &str, armor: f64) -> Self {
        Self {
            target_type: TargetType::from_tag(tag),
            armor,
        }
    }

    pub fn of(target_type: TargetType, armor: f64) -> Self {
        Self {
            target_type: Some(target_type),
            armor,
        }
    }

    pub fn with_armor(&self, armor: f64) -> Self {
        Self {
            target_type: self.target_type,
            armor,
        }
    }
}

impl Default for TargetDescriptor {
    fn default() -> Self {
        Self::of(TargetType::Normal, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_both_spellings() {
        assert_eq!(TargetType::from_tag("重甲"), Some(TargetType::Heavy));
        assert_eq!(TargetType::from_tag("  Heavy "), Some(TargetType::Heavy));
        assert_eq!(TargetType::from_tag("机械"), Some(TargetType::Mechanical));
        assert_eq!(TargetType::from_tag("building"), None);
    }

    #[test]
    fn descriptor_keeps_unknown_tag_as_untyped() {
        let t = TargetDescriptor::new("建筑", -2.0);
        assert_eq!(t.target_type, None);
        assert!((t.armor + 2.0).abs() < 1e-9);
    }
}

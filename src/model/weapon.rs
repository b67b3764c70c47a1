//! Weapon ids, weapon stat records, and the per-archetype catalog.

use super::TargetType;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every weapon known to the rank-gated archetypes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WeaponId {
    // Ghost
    TacticalRifle,
    Shotgun,
    AlphaRifle,
    FissionRifle,
    Deathwatch,
    Hellfire,
    // Marine
    AssaultRifle,
    MissileRifle,
    StormRifle,
    Flamethrower,
    Punisher,
    HeavyLaser,
}

impl WeaponId {
    pub const ALL: [WeaponId; 12] = [
        WeaponId::TacticalRifle,
        WeaponId::Shotgun,
        WeaponId::AlphaRifle,
        WeaponId::FissionRifle,
        WeaponId::Deathwatch,
        WeaponId::Hellfire,
        WeaponId::AssaultRifle,
        WeaponId::MissileRifle,
        WeaponId::StormRifle,
        WeaponId::Flamethrower,
        WeaponId::Punisher,
        WeaponId::HeavyLaser,
    ];

    /// Stable identifier used in configs and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            WeaponId::TacticalRifle => "tactical_rifle",
            WeaponId::Shotgun => "shotgun",
            WeaponId::AlphaRifle => "alpha_rifle",
            WeaponId::FissionRifle => "fission_rifle",
            WeaponId::Deathwatch => "deathwatch",
            WeaponId::Hellfire => "hellfire",
            WeaponId::AssaultRifle => "assault_rifle",
            WeaponId::MissileRifle => "missile_rifle",
            WeaponId::StormRifle => "storm_rifle",
            WeaponId::Flamethrower => "flamethrower",
            WeaponId::Punisher => "punisher",
            WeaponId::HeavyLaser => "heavy_laser",
        }
    }

    /// In-game display name.
    pub fn display_name(self) -> &'static str {
        match self {
            WeaponId::TacticalRifle => "战术步枪",
            WeaponId::Shotgun => "霰弹枪",
            WeaponId::AlphaRifle => "阿尔法狙击枪",
            WeaponId::FissionRifle => "裂解步枪",
            WeaponId::Deathwatch => "死亡守望",
            WeaponId::Hellfire => "炼狱火",
            WeaponId::AssaultRifle => "突击步枪",
            WeaponId::MissileRifle => "导弹突击步枪",
            WeaponId::StormRifle => "风暴突击步枪",
            WeaponId::Flamethrower => "喷火器",
            WeaponId::Punisher => "火神震击炮",
            WeaponId::HeavyLaser => "重型激光炮",
        }
    }
}

impl fmt::Display for WeaponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for WeaponId {
    type Err = String;

    /// Accepts the snake-case id (hyphens allowed) or the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = crate::util::normalize_id(s).replace('-', "_");
        WeaponId::ALL
            .into_iter()
            .find(|w| w.id() == key || w.display_name() == key)
            .ok_or_else(|| format!("unknown weapon: {}", s))
    }
}

/// Whether target armor mitigates the hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    #[default]
    Mitigated,
    /// Spell-like damage; armor is ignored entirely.
    Fixed,
}

/// Immutable weapon record. `range`, air/ground and splash fields are descriptive only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStat {
    pub base_damage: f64,
    /// Full override of `base_damage` when the target type matches; never added to it.
    pub bonus_damage: BTreeMap<TargetType, f64>,
    /// Seconds between attacks. Always > 0.
    pub attack_interval: f64,
    pub range: f64,
    pub can_attack_air: bool,
    pub can_attack_ground: bool,
    pub is_splash: bool,
    pub splash_radius: f64,
    /// Flat reduction this weapon imposes on the target's armor.
    pub armor_reduction: f64,
    pub shots_per_attack: u32,
    pub damage_kind: DamageKind,
}

impl WeaponStat {
    /// For the built-in tables. Data from outside the crate goes through [`Self::try_new`].
    pub fn new(base_damage: f64, attack_interval: f64, range: f64) -> Self {
        debug_assert!(attack_interval > 0.0, "attack_interval must be positive");
        WeaponStat {
            base_damage,
            bonus_damage: BTreeMap::new(),
            attack_interval,
            range,
            can_attack_air: true,
            can_attack_ground: true,
            is_splash: false,
            splash_radius: 0.0,
            armor_reduction: 0.0,
            shots_per_attack: 1,
            damage_kind: DamageKind::Mitigated,
        }
    }

    pub fn try_new(
        base_damage: f64,
        attack_interval: f64,
        range: f64,
    ) -> Result<Self, EngineError> {
        if !(attack_interval > 0.0 && attack_interval.is_finite()) {
            return Err(EngineError::invalid_config(format!(
                "attack interval must be positive, got {}",
                attack_interval
            )));
        }
        if base_damage < 0.0 || range < 0.0 {
            return Err(EngineError::invalid_config(
                "base damage and range must not be negative",
            ));
        }
        Ok(Self::new(base_damage, attack_interval, range))
    }

    pub fn with_bonus(mut self, target: TargetType, damage: f64) -> Self {
        self.bonus_damage.insert(target, damage);
        self
    }

    pub fn with_splash(mut self, radius: f64) -> Self {
        self.is_splash = true;
        self.splash_radius = radius;
        self
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots_per_attack = shots.max(1);
        self
    }

    pub fn with_armor_reduction(mut self, reduction: f64) -> Self {
        self.armor_reduction = reduction.max(0.0);
        self
    }

    pub fn fixed_damage(mut self) -> Self {
        self.damage_kind = DamageKind::Fixed;
        self
    }

    pub fn ground_only(mut self) -> Self {
        self.can_attack_air = false;
        self
    }

    /// Per-shot damage before multi-shot and mitigation: the bonus entry if one matches, else base.
    pub fn nominal_damage(&self, target: Option<TargetType>) -> f64 {
        target
            .and_then(|t| self.bonus_damage.get(&t).copied())
            .unwrap_or(self.base_damage)
    }

    pub fn is_fixed(&self) -> bool {
        self.damage_kind == DamageKind::Fixed
    }
}

/// Fixed mapping weapon id -> stats for one archetype, set at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponCatalog {
    weapons: BTreeMap<WeaponId, WeaponStat>,
}

impl WeaponCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: WeaponId, stat: WeaponStat) -> Self {
        self.weapons.insert(id, stat);
        self
    }

    pub fn get(&self, id: WeaponId) -> Option<&WeaponStat> {
        self.weapons.get(&id)
    }

    pub fn contains(&self, id: WeaponId) -> bool {
        self.weapons.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = WeaponId> + '_ {
        self.weapons.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_bad_interval() {
        assert!(matches!(
            WeaponStat::try_new(10.0, 0.0, 5.0),
            Err(EngineError::InvalidConfig(_))
        ));
        assert!(WeaponStat::try_new(10.0, -1.0, 5.0).is_err());
        assert!(WeaponStat::try_new(10.0, f64::NAN, 5.0).is_err());
        assert!(WeaponStat::try_new(-1.0, 1.0, 5.0).is_err());
        let w = WeaponStat::try_new(10.0, 0.8, 5.0).unwrap();
        assert_eq!(w, WeaponStat::new(10.0, 0.8, 5.0));
    }

    #[test]
    fn bonus_overrides_base() {
        let w = WeaponStat::new(20.0, 1.4, 10.0).with_bonus(TargetType::Heavy, 45.0);
        assert!((w.nominal_damage(Some(TargetType::Heavy)) - 45.0).abs() < 1e-9);
        assert!((w.nominal_damage(Some(TargetType::Light)) - 20.0).abs() < 1e-9);
        assert!((w.nominal_damage(None) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn weapon_id_parses_ids_and_names() {
        assert_eq!("fission_rifle".parse::<WeaponId>(), Ok(WeaponId::FissionRifle));
        assert_eq!("Heavy-Laser".parse::<WeaponId>(), Ok(WeaponId::HeavyLaser));
        assert_eq!("风暴突击步枪".parse::<WeaponId>(), Ok(WeaponId::StormRifle));
        assert!("railgun".parse::<WeaponId>().is_err());
    }

    #[test]
    #[should_panic]
    fn zero_interval_rejected() {
        let _ = WeaponStat::new(10.0, 0.0, 5.0);
    }
}

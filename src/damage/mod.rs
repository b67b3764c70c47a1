//! Damage resolution: nominal damage selection, multi-shot, armor mitigation, DPS.
//!
//! Mitigation is sign dependent. Non-negative effective armor subtracts from the hit down to a
//! small floor; negative effective armor adds its magnitude to the hit. Fixed-damage weapons skip
//! mitigation entirely and only contribute armor shred.

use crate::config::{AVERAGE_HIT_FLOOR, PER_HIT_FLOOR};
use crate::model::{TargetDescriptor, WeaponId, WeaponStat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum damage a mitigated hit always deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationFloor {
    /// Individual hit.
    #[default]
    PerHit,
    /// Hit already averaged over a damage range.
    AverageHit,
}

impl MitigationFloor {
    pub fn value(self) -> f64 {
        match self {
            MitigationFloor::PerHit => PER_HIT_FLOOR,
            MitigationFloor::AverageHit => AVERAGE_HIT_FLOOR,
        }
    }
}

/// Apply effective armor to a nominal hit.
pub fn mitigate(nominal: f64, effective_armor: f64, floor: f64) -> f64 {
    if effective_armor >= 0.0 {
        (nominal - effective_armor).max(floor)
    } else {
        nominal + effective_armor.abs()
    }
}

/// Armor shred on one target. A named source applies once, at the highest value it was offered;
/// distinct sources add up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmorShred {
    sources: BTreeMap<String, f64>,
}

impl ArmorShred {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&mut self, source: impl Into<String>, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        let slot = self.sources.entry(source.into()).or_insert(0.0);
        if amount > *slot {
            *slot = amount;
        }
    }

    pub fn with(mut self, source: impl Into<String>, amount: f64) -> Self {
        self.offer(source, amount);
        self
    }

    pub fn total(&self) -> f64 {
        self.sources.values().sum()
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, f64)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Modifiers in effect for a single hit, summed by the caller from active effects and squad shred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitContext {
    /// Flat damage added to every shot before multi-shot.
    pub bonus_damage: f64,
    pub shred: ArmorShred,
}

impl HitContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bonus_damage(mut self, bonus: f64) -> Self {
        self.bonus_damage = bonus;
        self
    }

    pub fn with_shred(mut self, shred: ArmorShred) -> Self {
        self.shred = shred;
        self
    }
}

/// Outcome of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResolution {
    /// Damage of the whole attack (all shots) before mitigation.
    pub nominal: f64,
    /// Armor actually applied; `None` for fixed-damage weapons.
    pub effective_armor: Option<f64>,
    pub realized: f64,
}

/// Resolve one attack of `weapon` against `target` with the per-hit floor.
pub fn resolve_hit(
    id: WeaponId,
    weapon: &WeaponStat,
    target: &TargetDescriptor,
    ctx: &HitContext,
) -> HitResolution {
    resolve_hit_with_floor(id, weapon, target, ctx, MitigationFloor::PerHit)
}

pub fn resolve_hit_with_floor(
    id: WeaponId,
    weapon: &WeaponStat,
    target: &TargetDescriptor,
    ctx: &HitContext,
    floor: MitigationFloor,
) -> HitResolution {
    let per_shot = weapon.nominal_damage(target.target_type) + ctx.bonus_damage;
    let nominal = per_shot * f64::from(weapon.shots_per_attack.max(1));
    if weapon.is_fixed() {
        return HitResolution {
            nominal,
            effective_armor: None,
            realized: nominal,
        };
    }
    let mut shred = ctx.shred.clone();
    shred.offer(id.id(), weapon.armor_reduction);
    let effective_armor = target.armor - shred.total();
    HitResolution {
        nominal,
        effective_armor: Some(effective_armor),
        realized: mitigate(nominal, effective_armor, floor.value()),
    }
}

/// DPS of a resolved attack at the given interval (seconds per attack).
pub fn dps(realized: f64, interval: f64) -> f64 {
    if interval <= 0.0 {
        return 0.0;
    }
    realized / interval
}

/// Resolved attack plus the interval it is divided by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponDps {
    pub weapon: WeaponId,
    pub hit: HitResolution,
    pub interval: f64,
    pub dps: f64,
}

/// Resolve one attack and turn it into DPS at `interval`.
pub fn weapon_dps(
    id: WeaponId,
    weapon: &WeaponStat,
    target: &TargetDescriptor,
    ctx: &HitContext,
    interval: f64,
) -> WeaponDps {
    let hit = resolve_hit(id, weapon, target, ctx);
    WeaponDps {
        weapon: id,
        hit,
        interval,
        dps: dps(hit.realized, interval),
    }
}

//! Unit profile: mutable state of one rank-gated unit plus its read-only summaries.

use crate::config::DEFAULT_TARGET_TAG;
use crate::damage::{self, HitContext, WeaponDps};
use crate::effect::{EffectHost, EffectLedger};
use crate::error::EngineError;
use crate::model::{
    Archetype, ArchetypeSpec, DamageKind, IntervalMode, RankGates, TargetDescriptor, TargetType,
    WeaponCatalog, WeaponId, WeaponStat,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// One unit of a rank-gated archetype. `current_weapon` is always unlocked at `rank`.
#[derive(Debug, Clone)]
pub struct UnitProfile {
    pub archetype: Archetype,
    pub hp: f64,
    pub max_hp: f64,
    pub armor: f64,
    pub armor_type: TargetType,
    pub movement_speed: f64,
    rank: u8,
    max_rank: u8,
    catalog: WeaponCatalog,
    gates: RankGates,
    current_weapon: WeaponId,
    interval_mode: IntervalMode,
    ledger: EffectLedger,
}

impl UnitProfile {
    pub fn new(archetype: Archetype) -> Self {
        Self::from_spec(archetype.spec())
    }

    pub fn from_spec(spec: ArchetypeSpec) -> Self {
        Self {
            archetype: spec.archetype,
            hp: spec.hp,
            max_hp: spec.hp,
            armor: spec.armor,
            armor_type: spec.armor_type,
            movement_speed: spec.movement_speed,
            rank: 1,
            max_rank: spec.max_rank,
            catalog: spec.catalog,
            gates: spec.gates,
            current_weapon: spec.base_weapon,
            interval_mode: IntervalMode::default(),
            ledger: EffectLedger::new(),
        }
    }

    /// Fresh unit ranked up to `rank` (clamped to the archetype's max).
    pub fn at_rank(archetype: Archetype, rank: u8) -> Self {
        let mut unit = Self::new(archetype);
        while unit.rank < rank && unit.rank_up() {}
        unit
    }

    pub fn with_interval_mode(mut self, mode: IntervalMode) -> Self {
        self.interval_mode = mode;
        self
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn max_rank(&self) -> u8 {
        self.max_rank
    }

    pub fn current_weapon(&self) -> WeaponId {
        self.current_weapon
    }

    pub fn interval_mode(&self) -> IntervalMode {
        self.interval_mode
    }

    pub fn catalog(&self) -> &WeaponCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &EffectLedger {
        &self.ledger
    }

    /// +1 rank unless already at max. Ranks never go down.
    pub fn rank_up(&mut self) -> bool {
        if self.rank >= self.max_rank {
            tracing::debug!(archetype = %self.archetype, rank = self.rank, "rank up refused: at max rank");
            return false;
        }
        self.rank += 1;
        true
    }

    /// Weapons unlocked at the current rank, base weapon first.
    pub fn available_weapons(&self) -> Vec<WeaponId> {
        self.gates.unlocked(self.rank)
    }

    /// Equip `weapon` if unlocked at the current rank; otherwise leave state as is.
    pub fn switch_weapon(&mut self, weapon: WeaponId) -> bool {
        if !self.gates.is_unlocked(self.rank, weapon) {
            tracing::debug!(
                archetype = %self.archetype,
                weapon = %weapon,
                rank = self.rank,
                "switch refused: weapon locked"
            );
            return false;
        }
        self.current_weapon = weapon;
        true
    }

    /// Catalog lookup. A weapon outside this archetype's catalog is a caller bug.
    pub fn weapon(&self, id: WeaponId) -> Result<&WeaponStat, EngineError> {
        self.catalog.get(id).ok_or(EngineError::UnknownWeapon {
            archetype: self.archetype,
            weapon: id,
        })
    }

    /// Permissive name lookup: anything that is not a weapon of this archetype means the current weapon.
    pub fn weapon_named(&self, name: &str) -> WeaponId {
        match name.parse::<WeaponId>() {
            Ok(id) if self.catalog.contains(id) => id,
            _ => {
                tracing::debug!(name, fallback = %self.current_weapon, "unknown weapon name");
                self.current_weapon
            }
        }
    }

    /// Attack interval of `weapon` under the unit's interval mode and current rank.
    pub fn attack_interval(&self, weapon: WeaponId) -> Result<f64, EngineError> {
        let stat = self.weapon(weapon)?;
        Ok(self.interval_mode.interval(stat.attack_interval, self.rank))
    }

    /// DPS against an unarmored target. Defaults: current weapon, "普通" target.
    pub fn get_weapon_dps(
        &self,
        weapon: Option<WeaponId>,
        target_type: Option<&str>,
    ) -> Result<f64, EngineError> {
        let target = TargetDescriptor::new(target_type.unwrap_or(DEFAULT_TARGET_TAG), 0.0);
        let weapon = weapon.unwrap_or(self.current_weapon);
        Ok(self.dps_against(weapon, &target, &HitContext::new())?.dps)
    }

    /// Full resolution against an arbitrary target with caller-supplied modifiers.
    pub fn dps_against(
        &self,
        weapon: WeaponId,
        target: &TargetDescriptor,
        ctx: &HitContext,
    ) -> Result<WeaponDps, EngineError> {
        let stat = self.weapon(weapon)?;
        let interval = self.interval_mode.interval(stat.attack_interval, self.rank);
        Ok(damage::weapon_dps(weapon, stat, target, ctx, interval))
    }

    /// Damage bonus from this unit's live effects, ready to pass to [`Self::dps_against`].
    pub fn hit_context(&self, now: f64) -> HitContext {
        HitContext::new().with_bonus_damage(self.ledger.bonuses(now).damage)
    }

    /// This unit as a target: own armor plus armor granted by live effects.
    pub fn as_target(&self, now: f64) -> TargetDescriptor {
        TargetDescriptor::of(self.armor_type, self.armor + self.ledger.bonuses(now).armor)
    }

    /// Expire effects and apply per-tick healing.
    pub fn tick(&mut self, now: f64) {
        self.ledger.tick(now, &mut self.hp, self.max_hp);
    }

    pub fn status(&self) -> Result<UnitStatus, EngineError> {
        Ok(UnitStatus {
            archetype: self.archetype,
            hp: self.hp,
            max_hp: self.max_hp,
            rank: self.rank,
            max_rank: self.max_rank,
            weapon: self.describe(self.current_weapon)?,
        })
    }

    /// One record per weapon available at the current rank.
    pub fn weapon_info(&self) -> Result<Vec<WeaponInfo>, EngineError> {
        self.available_weapons()
            .into_iter()
            .map(|w| self.describe(w))
            .collect()
    }

    fn describe(&self, id: WeaponId) -> Result<WeaponInfo, EngineError> {
        let stat = self.weapon(id)?;
        Ok(WeaponInfo {
            id,
            name: id.display_name(),
            base_damage: stat.base_damage,
            bonus_damage: stat.bonus_damage.clone(),
            shots_per_attack: stat.shots_per_attack,
            attack_interval: self.interval_mode.interval(stat.attack_interval, self.rank),
            range: stat.range,
            is_splash: stat.is_splash,
            splash_radius: stat.splash_radius,
            armor_reduction: stat.armor_reduction,
            damage_kind: stat.damage_kind,
            dps: self.get_weapon_dps(Some(id), None)?,
        })
    }
}

impl EffectHost for UnitProfile {
    fn ledger_mut(&mut self) -> &mut EffectLedger {
        &mut self.ledger
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitStatus {
    pub archetype: Archetype,
    pub hp: f64,
    pub max_hp: f64,
    pub rank: u8,
    pub max_rank: u8,
    pub weapon: WeaponInfo,
}

/// Derived weapon summary; formatting is left to the report layer.
#[derive(Debug, Clone, Serialize)]
pub struct WeaponInfo {
    pub id: WeaponId,
    pub name: &'static str,
    pub base_damage: f64,
    pub bonus_damage: BTreeMap<TargetType, f64>,
    pub shots_per_attack: u32,
    /// Interval actually used, after the unit's interval mode.
    pub attack_interval: f64,
    pub range: f64,
    pub is_splash: bool,
    pub splash_radius: f64,
    pub armor_reduction: f64,
    pub damage_kind: DamageKind,
    /// Against an unarmored "普通" target.
    pub dps: f64,
}

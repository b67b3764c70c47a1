//! Squad aggregation: per-group DPS against one shared target, with squad-wide armor shred.

use crate::config::SquadConfig;
use crate::damage::{ArmorShred, HitContext, WeaponDps};
use crate::error::EngineError;
use crate::model::{Archetype, IntervalMode, TargetDescriptor, WeaponId};
use crate::unit::UnitProfile;
use serde::Serialize;

/// Names accepted by [`Composition::preset`].
pub const PRESET_NAMES: [&str; 3] = ["fission-storm", "heavy-laser", "hellfire"];

/// `count` identical units of one archetype, weapon and rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadGroup {
    pub archetype: Archetype,
    pub weapon: WeaponId,
    pub rank: u8,
    pub count: u32,
}

impl SquadGroup {
    pub fn new(archetype: Archetype, weapon: WeaponId, rank: u8, count: u32) -> Self {
        Self {
            archetype,
            weapon,
            rank,
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub name: String,
    pub groups: Vec<SquadGroup>,
    pub interval_mode: IntervalMode,
}

impl Composition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            interval_mode: IntervalMode::default(),
        }
    }

    pub fn with_group(mut self, group: SquadGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_interval_mode(mut self, mode: IntervalMode) -> Self {
        self.interval_mode = mode;
        self
    }

    pub fn from_config(cfg: &SquadConfig) -> Self {
        cfg.groups.iter().fold(
            Composition::new(cfg.name.clone()).with_interval_mode(cfg.interval_mode),
            |c, g| c.with_group(SquadGroup::new(g.archetype, g.weapon, g.rank, g.count)),
        )
    }

    /// 5 fission-rifle ghosts shredding for 30 storm-rifle marines.
    pub fn fission_storm() -> Self {
        Composition::new("fission-storm")
            .with_group(SquadGroup::new(Archetype::Ghost, WeaponId::FissionRifle, 3, 5))
            .with_group(SquadGroup::new(Archetype::Marine, WeaponId::StormRifle, 3, 30))
    }

    pub fn heavy_laser() -> Self {
        Composition::new("heavy-laser")
            .with_group(SquadGroup::new(Archetype::Marine, WeaponId::HeavyLaser, 3, 35))
    }

    pub fn hellfire() -> Self {
        Composition::new("hellfire")
            .with_group(SquadGroup::new(Archetype::Ghost, WeaponId::Hellfire, 3, 35))
    }

    pub fn preset(name: &str) -> Option<Self> {
        match crate::util::normalize_id(name).replace('_', "-").as_str() {
            "fission-storm" => Some(Self::fission_storm()),
            "heavy-laser" => Some(Self::heavy_laser()),
            "hellfire" => Some(Self::hellfire()),
            _ => None,
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::fission_storm(), Self::heavy_laser(), Self::hellfire()]
    }

    pub fn unit_count(&self) -> u32 {
        self.groups.iter().map(|g| g.count).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupDps {
    pub archetype: Archetype,
    /// Weapon actually fired; the unit's current weapon if the requested one was locked.
    pub weapon: WeaponId,
    pub rank: u8,
    pub count: u32,
    pub per_unit: WeaponDps,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SquadDps {
    pub name: String,
    pub target: TargetDescriptor,
    pub shred: ArmorShred,
    pub total: f64,
    pub groups: Vec<GroupDps>,
}

/// Squad DPS against a target given by armor and raw type tag.
pub fn squad_dps(
    composition: &Composition,
    target_armor: f64,
    target_type: &str,
) -> Result<SquadDps, EngineError> {
    squad_dps_against(composition, &TargetDescriptor::new(target_type, target_armor))
}

/// One representative unit per group, resolved once and multiplied by the group count.
/// Every shred source in the squad is applied once to every mitigated group.
pub fn squad_dps_against(
    composition: &Composition,
    target: &TargetDescriptor,
) -> Result<SquadDps, EngineError> {
    let mut members = Vec::with_capacity(composition.groups.len());
    let mut shred = ArmorShred::new();
    for group in &composition.groups {
        let unit = representative(group, composition.interval_mode)?;
        let weapon = unit.current_weapon();
        let reduction = unit.weapon(weapon)?.armor_reduction;
        if group.count > 0 {
            shred.offer(weapon.id(), reduction);
        }
        members.push((group, unit));
    }

    let ctx = HitContext::new().with_shred(shred.clone());
    let mut groups = Vec::with_capacity(members.len());
    for (group, unit) in &members {
        let per_unit = unit.dps_against(unit.current_weapon(), target, &ctx)?;
        groups.push(GroupDps {
            archetype: group.archetype,
            weapon: per_unit.weapon,
            rank: unit.rank(),
            count: group.count,
            total: per_unit.dps * f64::from(group.count),
            per_unit,
        });
    }
    let total = groups.iter().map(|g| g.total).sum();
    tracing::debug!(
        squad = %composition.name,
        armor = target.armor,
        shred = shred.total(),
        total,
        "squad resolved"
    );
    Ok(SquadDps {
        name: composition.name.clone(),
        target: target.clone(),
        shred,
        total,
        groups,
    })
}

fn representative(group: &SquadGroup, mode: IntervalMode) -> Result<UnitProfile, EngineError> {
    let mut unit = UnitProfile::at_rank(group.archetype, group.rank).with_interval_mode(mode);
    unit.weapon(group.weapon)?;
    if !unit.switch_weapon(group.weapon) {
        tracing::debug!(
            archetype = %group.archetype,
            weapon = %group.weapon,
            rank = group.rank,
            "group weapon locked; using current weapon"
        );
    }
    Ok(unit)
}

/// One squad result per armor value, same target type throughout.
pub fn armor_sweep(
    composition: &Composition,
    target_type: &str,
    armor_values: &[f64],
) -> Result<Vec<SquadDps>, EngineError> {
    armor_values
        .iter()
        .map(|armor| squad_dps(composition, *armor, target_type))
        .collect()
}

/// Each value as a percentage of the largest one. All zeros stay zero.
pub fn relative_to_peak(values: &[f64]) -> Vec<f64> {
    let peak = values.iter().copied().fold(0.0f64, f64::max);
    if peak <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / peak * 100.0).collect()
}

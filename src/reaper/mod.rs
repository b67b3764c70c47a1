//! Reaper: damage-range weapons, attack upgrades, uranium override, spider mines, and the
//! fully-buffed average DPS used for squad comparisons.

mod analysis;

pub use analysis::{
    dps_by_supply, raven_model_dps, reaper_fleet_dps, reaper_fleet_sweep, supply_cap_point,
    supply_equivalent_dps, supply_marks, upgrade_benefits, upgrade_cost, upgrade_efficiency,
    ArmorClassDps, FleetDps, ReaperAnalysis, SupplyPoint, UpgradeBenefit, UpgradeBenefits,
    UpgradeCost, UpgradeEfficiency, GAS_MINERAL_RATIO, REAPER_FLEET_SIZE, SUPPLY_STEP,
};

use crate::damage::{mitigate, MitigationFloor};
use crate::effect::EnergyPool;
use crate::model::{TargetDescriptor, TargetType};
use serde::Serialize;
use std::fmt;

/// Highest attack upgrade level.
pub const MAX_ATTACK_UPGRADE: u8 = 3;

/// Reapers carried per transport.
pub const TRANSPORT_CAPACITY: u32 = 8;

const REAPER_MINERALS: u64 = 50;
const REAPER_GAS: u64 = 50;
const REAPER_SUPPLY: u64 = 1;
const TRANSPORT_MINERALS: u64 = 150;
const TRANSPORT_GAS: u64 = 100;
const TRANSPORT_SUPPLY: u64 = 2;

const BUFFED_INTERVAL_SECS: f64 = 1.1;
const BUFFED_SHOTS: f64 = 2.0;
const BUFFED_DAMAGE_PER_UPGRADE: f64 = 2.0;
const COMMANDER_MULTIPLIER: f64 = 1.2;
const LIGHT_TARGET_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaperWeapon {
    P55Scythe,
    D9Charge,
}

impl ReaperWeapon {
    pub fn display_name(self) -> &'static str {
        match self {
            ReaperWeapon::P55Scythe => "P55镰刀电磁枪",
            ReaperWeapon::D9Charge => "D9炸药",
        }
    }

    pub fn stat(self) -> ReaperWeaponStat {
        match self {
            ReaperWeapon::P55Scythe => ReaperWeaponStat {
                damage: DamageRange::new(8.0, 18.0),
                uranium_damage: DamageRange::new(10.0, 30.0),
                attacks_per_sec: 1.1,
                range: 6.0,
                splash_radius: None,
            },
            ReaperWeapon::D9Charge => ReaperWeaponStat {
                damage: DamageRange::new(20.0, 40.0),
                uranium_damage: DamageRange::new(25.0, 45.0),
                attacks_per_sec: 0.8,
                range: 2.0,
                splash_radius: Some(1.5),
            },
        }
    }
}

impl fmt::Display for ReaperWeapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageRange {
    pub min: f64,
    pub max: f64,
}

impl DamageRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn mean(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    fn shifted(self, by: f64) -> Self {
        Self::new(self.min + by, self.max + by)
    }

    fn scaled(self, by: f64) -> Self {
        Self::new(self.min * by, self.max * by)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReaperWeaponStat {
    pub damage: DamageRange,
    /// Replaces `damage` outright once uranium is researched.
    pub uranium_damage: DamageRange,
    /// Attacks per second, not seconds per attack.
    pub attacks_per_sec: f64,
    pub range: f64,
    pub splash_radius: Option<f64>,
}

/// Spider mine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpiderMine {
    pub damage: f64,
    pub splash_radius: f64,
    pub arm_time: f64,
    pub detection_radius: f64,
    pub movement_speed: f64,
    pub hp: f64,
    pub energy_cost: f64,
    pub max_count: u32,
}

impl Default for SpiderMine {
    fn default() -> Self {
        Self {
            damage: 125.0,
            splash_radius: 1.5,
            arm_time: 3.0,
            detection_radius: 6.0,
            movement_speed: 2.5,
            hp: 15.0,
            energy_cost: 15.0,
            max_count: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reaper {
    pub hp: f64,
    pub max_hp: f64,
    pub armor: f64,
    pub armor_type: TargetType,
    pub movement_speed: f64,
    pub energy: EnergyPool,
    pub spider_mine: SpiderMine,
    pub deployed_mines: u32,
    pub has_uranium: bool,
    pub defense_upgrade: u8,
    pub is_cloaked: bool,
    attack_upgrade: u8,
    current_weapon: ReaperWeapon,
}

impl Reaper {
    pub fn new(now: f64) -> Self {
        Self {
            hp: 150.0,
            max_hp: 150.0,
            armor: 1.0,
            armor_type: TargetType::Light,
            movement_speed: 2.25,
            energy: EnergyPool::new(50.0, 200.0, 0.5625, now),
            spider_mine: SpiderMine::default(),
            deployed_mines: 0,
            has_uranium: false,
            defense_upgrade: 0,
            is_cloaked: false,
            attack_upgrade: 0,
            current_weapon: ReaperWeapon::P55Scythe,
        }
    }

    pub fn update(&mut self, now: f64) {
        self.energy.advance(now);
    }

    pub fn current_weapon(&self) -> ReaperWeapon {
        self.current_weapon
    }

    /// Toggle between the scythe and the charge.
    pub fn switch_weapon(&mut self) -> ReaperWeapon {
        self.current_weapon = match self.current_weapon {
            ReaperWeapon::P55Scythe => ReaperWeapon::D9Charge,
            ReaperWeapon::D9Charge => ReaperWeapon::P55Scythe,
        };
        self.current_weapon
    }

    pub fn attack_upgrade(&self) -> u8 {
        self.attack_upgrade
    }

    pub fn set_attack_upgrade(&mut self, level: u8) -> bool {
        if level > MAX_ATTACK_UPGRADE {
            return false;
        }
        self.attack_upgrade = level;
        true
    }

    /// Needs energy for one mine and a free mine slot.
    pub fn deploy_spider_mine(&mut self, now: f64) -> bool {
        self.energy.advance(now);
        if self.deployed_mines >= self.spider_mine.max_count {
            tracing::debug!(deployed = self.deployed_mines, "mine refused: limit reached");
            return false;
        }
        if !self.energy.try_spend(self.spider_mine.energy_cost) {
            tracing::debug!(energy = self.energy.current, "mine refused: not enough energy");
            return false;
        }
        self.deployed_mines += 1;
        true
    }

    /// +1 per upgrade level on both ends; uranium replaces the range entirely.
    pub fn weapon_damage(&self, weapon: Option<ReaperWeapon>) -> DamageRange {
        let stat = weapon.unwrap_or(self.current_weapon).stat();
        if self.has_uranium {
            return stat.uranium_damage;
        }
        stat.damage.shifted(f64::from(self.attack_upgrade))
    }

    pub fn weapon_dps(&self, weapon: Option<ReaperWeapon>) -> f64 {
        let weapon = weapon.unwrap_or(self.current_weapon);
        self.weapon_damage(Some(weapon)).mean() * weapon.stat().attacks_per_sec
    }

    pub fn status(&self) -> ReaperStatus {
        ReaperStatus {
            hp: self.hp,
            max_hp: self.max_hp,
            energy: self.energy.current,
            max_energy: self.energy.max,
            current_weapon: self.current_weapon,
            damage: self.weapon_damage(None),
            dps: self.weapon_dps(None),
            attack_upgrade: self.attack_upgrade,
            has_uranium: self.has_uranium,
            deployed_mines: self.deployed_mines,
            max_mines: self.spider_mine.max_count,
            is_cloaked: self.is_cloaked,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaperStatus {
    pub hp: f64,
    pub max_hp: f64,
    pub energy: f64,
    pub max_energy: f64,
    pub current_weapon: ReaperWeapon,
    pub damage: DamageRange,
    pub dps: f64,
    pub attack_upgrade: u8,
    pub has_uranium: bool,
    pub deployed_mines: u32,
    pub max_mines: u32,
    pub is_cloaked: bool,
}

/// Buffs stacked on a scythe reaper for the squad comparison formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReaperLoadout {
    pub attack_upgrade: u8,
    pub commander_bonus: bool,
    pub safety_field_stacks: u32,
}

impl Default for ReaperLoadout {
    /// Fully upgraded, commander bonus, five safety field stacks.
    fn default() -> Self {
        Self {
            attack_upgrade: MAX_ATTACK_UPGRADE,
            commander_bonus: true,
            safety_field_stacks: 5,
        }
    }
}

/// Average scythe DPS with upgrades, commander bonus, safety field stacks and the light-target
/// bonus, two shots per attack, mitigated with the average-hit floor.
pub fn buffed_average_dps(loadout: &ReaperLoadout, target: &TargetDescriptor) -> f64 {
    let mut range = ReaperWeapon::P55Scythe
        .stat()
        .damage
        .shifted(f64::from(loadout.attack_upgrade) * BUFFED_DAMAGE_PER_UPGRADE);
    if loadout.commander_bonus {
        range = range.scaled(COMMANDER_MULTIPLIER);
    }
    range = range.shifted(f64::from(loadout.safety_field_stacks));
    if target.target_type == Some(TargetType::Light) {
        range = range.scaled(LIGHT_TARGET_MULTIPLIER);
    }
    let average = range.scaled(BUFFED_SHOTS).mean();
    let realized = mitigate(average, target.armor, MitigationFloor::AverageHit.value());
    realized / BUFFED_INTERVAL_SECS
}

/// Resources for `reapers` plus the transports carrying them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SquadCost {
    pub reapers: u32,
    pub transports: u32,
    pub minerals: u64,
    pub gas: u64,
    pub supply: u64,
}

/// Totals are `u64` so any `u32` head count fits.
pub fn squad_cost(reapers: u32) -> SquadCost {
    let transports = reapers.div_ceil(TRANSPORT_CAPACITY);
    let (r, t) = (u64::from(reapers), u64::from(transports));
    SquadCost {
        reapers,
        transports,
        minerals: r * REAPER_MINERALS + t * TRANSPORT_MINERALS,
        gas: r * REAPER_GAS + t * TRANSPORT_GAS,
        supply: r * REAPER_SUPPLY + t * TRANSPORT_SUPPLY,
    }
}

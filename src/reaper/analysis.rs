//! Fleet-level reaper analysis: the light/heavy DPS model with an optional Raven safety field,
//! DPS under a supply cap, attack upgrade pricing, and the 128-reaper comparison line.

use super::{
    buffed_average_dps, squad_cost, ReaperLoadout, ReaperWeapon, BUFFED_DAMAGE_PER_UPGRADE,
    BUFFED_SHOTS, COMMANDER_MULTIPLIER, MAX_ATTACK_UPGRADE,
};
use crate::model::{TargetDescriptor, TargetType};
use serde::Serialize;

/// Gas is valued at this many minerals when pricing upgrades.
pub const GAS_MINERAL_RATIO: u64 = 3;

/// Reapers in the fleet line of the preset comparison.
pub const REAPER_FLEET_SIZE: u32 = 128;

/// Supply levels reported by the reaper command, up to the cap.
pub const SUPPLY_STEP: u32 = 40;

/// Five safety field stacks, counted on both shots.
const RAVEN_FIELD_BONUS: f64 = 10.0;
const HEAVY_TARGET_MULTIPLIER: f64 = 0.5;
/// One transport's supply slot per this much supply in the equal-supply estimate.
const SUPPLY_PER_TRANSPORT_SLOT: u64 = 16;

const UPGRADE_COSTS: [UpgradeCost; 3] = [
    UpgradeCost {
        minerals: 100,
        gas: 100,
        research_secs: 120,
    },
    UpgradeCost {
        minerals: 150,
        gas: 150,
        research_secs: 160,
    },
    UpgradeCost {
        minerals: 200,
        gas: 200,
        research_secs: 200,
    },
];

/// DPS split by target armor class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ArmorClassDps {
    pub light: f64,
    pub heavy: f64,
}

impl ArmorClassDps {
    pub fn times(self, n: u32) -> Self {
        let n = f64::from(n);
        Self {
            light: self.light * n,
            heavy: self.heavy * n,
        }
    }

    /// Percentage gain of `self` over `base`, per armor class. Zero base gives zero.
    pub fn gain_pct_over(&self, base: &ArmorClassDps) -> Self {
        let pct = |v: f64, b: f64| if b > 0.0 { (v - b) / b * 100.0 } else { 0.0 };
        Self {
            light: pct(self.light, base.light),
            heavy: pct(self.heavy, base.heavy),
        }
    }
}

/// Per-reaper DPS in the light/heavy model. The doubled scythe range gets two damage per
/// upgrade level, then the commander bonus, then the safety field. Heavy targets take half.
/// Levels above the maximum count as the maximum.
pub fn raven_model_dps(attack_upgrade: u8, raven_buff: bool) -> ArmorClassDps {
    let weapon = ReaperWeapon::P55Scythe.stat();
    let level = f64::from(attack_upgrade.min(MAX_ATTACK_UPGRADE));
    let mut range = weapon
        .damage
        .scaled(BUFFED_SHOTS)
        .shifted(level * BUFFED_DAMAGE_PER_UPGRADE)
        .scaled(COMMANDER_MULTIPLIER);
    if raven_buff {
        range = range.shifted(RAVEN_FIELD_BONUS);
    }
    let light = range.mean() * weapon.attacks_per_sec;
    ArmorClassDps {
        light,
        heavy: light * HEAVY_TARGET_MULTIPLIER,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeCost {
    pub minerals: u64,
    pub gas: u64,
    pub research_secs: u32,
}

impl UpgradeCost {
    pub fn mineral_equivalent(&self) -> u64 {
        self.minerals + self.gas * GAS_MINERAL_RATIO
    }
}

/// Research cost of one attack upgrade level (1..=3).
pub fn upgrade_cost(level: u8) -> Option<UpgradeCost> {
    match level {
        1..=MAX_ATTACK_UPGRADE => UPGRADE_COSTS.get(usize::from(level - 1)).copied(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpgradeEfficiency {
    pub level: u8,
    pub cost: UpgradeCost,
    pub mineral_equivalent: u64,
    /// Light-target DPS gained by the whole squad over no upgrades.
    pub dps_gain: f64,
    pub dps_per_100_minerals: f64,
}

/// DPS gain per mineral-equivalent spent, for each upgrade level against an unupgraded squad.
/// Each level is priced on its own research cost.
pub fn upgrade_efficiency(reapers: u32) -> Vec<UpgradeEfficiency> {
    let base = raven_model_dps(0, false).times(reapers);
    (1..=MAX_ATTACK_UPGRADE)
        .filter_map(|level| {
            let cost = upgrade_cost(level)?;
            let dps_gain = raven_model_dps(level, false).times(reapers).light - base.light;
            let mineral_equivalent = cost.mineral_equivalent();
            Some(UpgradeEfficiency {
                level,
                cost,
                mineral_equivalent,
                dps_gain,
                dps_per_100_minerals: dps_gain / mineral_equivalent as f64 * 100.0,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpgradeBenefit {
    pub attack_upgrade: u8,
    pub raven_buff: bool,
    pub gain_pct: ArmorClassDps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeBenefits {
    pub reapers: u32,
    pub baseline: ArmorClassDps,
    pub rows: Vec<UpgradeBenefit>,
}

/// Squad DPS gain over no upgrades and no buff, for each upgrade level,
/// the safety field alone, and everything together.
pub fn upgrade_benefits(reapers: u32) -> UpgradeBenefits {
    let baseline = raven_model_dps(0, false).times(reapers);
    let rows = (1..=MAX_ATTACK_UPGRADE)
        .map(|level| (level, false))
        .chain([(0, true), (MAX_ATTACK_UPGRADE, true)])
        .map(|(attack_upgrade, raven_buff)| UpgradeBenefit {
            attack_upgrade,
            raven_buff,
            gain_pct: raven_model_dps(attack_upgrade, raven_buff)
                .times(reapers)
                .gain_pct_over(&baseline),
        })
        .collect();
    UpgradeBenefits {
        reapers,
        baseline,
        rows,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupplyPoint {
    pub supply: u64,
    pub reapers: u32,
    pub transports: u32,
    pub dps: ArmorClassDps,
}

/// Every reaper count whose squad, transports included, fits under `max_supply`.
pub fn dps_by_supply(max_supply: u32, attack_upgrade: u8, raven_buff: bool) -> Vec<SupplyPoint> {
    let per_reaper = raven_model_dps(attack_upgrade, raven_buff);
    (1..max_supply)
        .map(squad_cost)
        .take_while(|cost| cost.supply <= u64::from(max_supply))
        .map(|cost| SupplyPoint {
            supply: cost.supply,
            reapers: cost.reapers,
            transports: cost.transports,
            dps: per_reaper.times(cost.reapers),
        })
        .collect()
}

/// Largest reaper squad whose supply, transports included, fits under `max_supply`.
/// Same answer as the last entry of [`dps_by_supply`] without walking every count.
pub fn supply_cap_point(
    max_supply: u32,
    attack_upgrade: u8,
    raven_buff: bool,
) -> Option<SupplyPoint> {
    let cap = u64::from(max_supply);
    let fits = |r: u32| squad_cost(r).supply <= cap;
    // a full transport carries 8 reapers for 10 supply
    let mut reapers = u32::try_from(cap * 8 / 10).unwrap_or(u32::MAX);
    while reapers > 0 && !fits(reapers) {
        reapers -= 1;
    }
    while reapers < max_supply && fits(reapers + 1) {
        reapers += 1;
    }
    if reapers == 0 {
        return None;
    }
    let cost = squad_cost(reapers);
    Some(SupplyPoint {
        supply: cost.supply,
        reapers,
        transports: cost.transports,
        dps: raven_model_dps(attack_upgrade, raven_buff).times(reapers),
    })
}

/// Quick estimate at exactly `supply`: one transport per sixteen supply (rounded),
/// the rest spent on reapers.
pub fn supply_equivalent_dps(supply: u32, attack_upgrade: u8, raven_buff: bool) -> SupplyPoint {
    let total = u64::from(supply);
    let transports = (total + 7) / SUPPLY_PER_TRANSPORT_SLOT;
    let reapers = total.saturating_sub(transports * 2);
    // both are bounded by `supply`
    let reapers = u32::try_from(reapers).unwrap_or(supply);
    let transports = u32::try_from(transports).unwrap_or(0);
    SupplyPoint {
        supply: total,
        reapers,
        transports,
        dps: raven_model_dps(attack_upgrade, raven_buff).times(reapers),
    }
}

/// Supply marks at every [`SUPPLY_STEP`] up to and including `max_supply`.
pub fn supply_marks(max_supply: u32) -> Vec<u32> {
    (1..=max_supply / SUPPLY_STEP).map(|i| i * SUPPLY_STEP).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FleetDps {
    pub armor: f64,
    pub reapers: u32,
    pub normal: f64,
    pub light: f64,
}

/// Fully buffed fleet DPS against normal and light targets at one armor value.
pub fn reaper_fleet_dps(reapers: u32, armor: f64) -> FleetDps {
    let loadout = ReaperLoadout::default();
    let n = f64::from(reapers);
    FleetDps {
        armor,
        reapers,
        normal: buffed_average_dps(&loadout, &TargetDescriptor::of(TargetType::Normal, armor)) * n,
        light: buffed_average_dps(&loadout, &TargetDescriptor::of(TargetType::Light, armor)) * n,
    }
}

/// The [`REAPER_FLEET_SIZE`] fleet across `armor_values`.
pub fn reaper_fleet_sweep(armor_values: &[f64]) -> Vec<FleetDps> {
    armor_values
        .iter()
        .map(|&armor| reaper_fleet_dps(REAPER_FLEET_SIZE, armor))
        .collect()
}

/// Everything the reaper command reports beyond the single unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReaperAnalysis {
    pub attack_upgrade: u8,
    pub without_buff: ArmorClassDps,
    pub with_buff: ArmorClassDps,
    pub max_supply: u32,
    pub supply: Vec<SupplyPoint>,
    /// Largest reaper squad that fits the cap with its transports.
    pub supply_cap: Option<SupplyPoint>,
    pub upgrades: Vec<UpgradeEfficiency>,
    pub benefits: UpgradeBenefits,
}

impl ReaperAnalysis {
    pub fn new(attack_upgrade: u8, raven_buff: bool, max_supply: u32, reapers: u32) -> Self {
        let supply = supply_marks(max_supply)
            .into_iter()
            .map(|s| supply_equivalent_dps(s, attack_upgrade, raven_buff))
            .collect();
        let supply_cap = supply_cap_point(max_supply, attack_upgrade, raven_buff);
        Self {
            attack_upgrade,
            without_buff: raven_model_dps(attack_upgrade, false),
            with_buff: raven_model_dps(attack_upgrade, true),
            max_supply,
            supply,
            supply_cap,
            upgrades: upgrade_efficiency(reapers),
            benefits: upgrade_benefits(reapers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn raven_model_light_heavy_split() {
        // (16, 36) x1.2 -> mean 31.2, x1.1
        let bare = raven_model_dps(0, false);
        assert!((bare.light - 34.32).abs() < EPS);
        assert!((bare.heavy - 17.16).abs() < EPS);
        // (22, 42) x1.2 + 10 -> mean 48.4
        let full = raven_model_dps(3, true);
        assert!((full.light - 48.4 * 1.1).abs() < EPS);
        assert!((full.heavy - full.light * 0.5).abs() < EPS);
        assert_eq!(raven_model_dps(9, true), full);
    }

    #[test]
    fn upgrade_costs_by_level() {
        assert_eq!(upgrade_cost(0), None);
        assert_eq!(upgrade_cost(4), None);
        let l2 = upgrade_cost(2).unwrap();
        assert_eq!((l2.minerals, l2.gas, l2.research_secs), (150, 150, 160));
        assert_eq!(l2.mineral_equivalent(), 600);
        assert_eq!(upgrade_cost(3).unwrap().research_secs, 200);
    }

    #[test]
    fn efficiency_for_thirty_reapers() {
        let rows = upgrade_efficiency(30);
        assert_eq!(rows.len(), 3);
        // each level raises the mean by 2.4, times 1.1 attacks per second
        assert!((rows[0].dps_gain - 2.4 * 1.1 * 30.0).abs() < 1e-6);
        assert_eq!(rows[0].mineral_equivalent, 400);
        assert!((rows[0].dps_per_100_minerals - 79.2 / 4.0).abs() < 1e-6);
        assert!((rows[2].dps_gain - 3.0 * 2.4 * 1.1 * 30.0).abs() < 1e-6);
        assert_eq!(rows[2].mineral_equivalent, 800);
    }

    #[test]
    fn benefits_are_same_percent_for_both_classes() {
        let b = upgrade_benefits(30);
        assert!((b.baseline.light - 34.32 * 30.0).abs() < 1e-6);
        assert_eq!(b.rows.len(), 5);
        let raven_only = b.rows[3];
        assert!(raven_only.raven_buff && raven_only.attack_upgrade == 0);
        assert!((raven_only.gain_pct.light - 10.0 / 31.2 * 100.0).abs() < 1e-6);
        for row in &b.rows {
            assert!((row.gain_pct.light - row.gain_pct.heavy).abs() < 1e-9);
            assert!(row.gain_pct.light > 0.0);
        }
        assert!(b.rows[4].gain_pct.light > b.rows[2].gain_pct.light);
    }

    #[test]
    fn supply_cap_charges_transports() {
        let points = dps_by_supply(160, 3, true);
        let last = points.last().unwrap();
        assert!(last.supply <= 160);
        // 128 reapers + 16 transports = 160 supply
        assert_eq!((last.reapers, last.transports, last.supply), (128, 16, 160));
        assert!(points.windows(2).all(|w| w[0].dps.light < w[1].dps.light));
        assert!(dps_by_supply(2, 0, false).is_empty());
        assert_eq!(dps_by_supply(3, 0, false).len(), 1);
    }

    #[test]
    fn cap_point_agrees_with_full_walk() {
        for cap in [0, 2, 3, 9, 10, 11, 57, 160, 333] {
            assert_eq!(
                supply_cap_point(cap, 2, false),
                dps_by_supply(cap, 2, false).last().copied(),
                "cap {}",
                cap
            );
        }
        let big = supply_cap_point(u32::MAX, 0, false).unwrap();
        assert!(big.supply <= u64::from(u32::MAX));
    }

    #[test]
    fn equal_supply_estimate() {
        let p = supply_equivalent_dps(160, 0, false);
        assert_eq!((p.transports, p.reapers), (10, 140));
        assert!((p.dps.light - 34.32 * 140.0).abs() < 1e-6);
        assert_eq!(supply_equivalent_dps(0, 0, false).reapers, 0);
        assert_eq!(supply_equivalent_dps(0, 0, false).dps, ArmorClassDps::default());
        let huge = supply_equivalent_dps(u32::MAX, 3, true);
        assert!(huge.reapers < u32::MAX && huge.dps.light.is_finite());
    }

    #[test]
    fn supply_marks_stop_at_cap() {
        assert_eq!(supply_marks(160), vec![40, 80, 120, 160]);
        assert_eq!(supply_marks(100), vec![40, 80]);
        assert!(supply_marks(39).is_empty());
    }

    #[test]
    fn fleet_matches_buffed_average() {
        let f = reaper_fleet_dps(REAPER_FLEET_SIZE, 0.0);
        assert!((f.normal - 55.6 / 1.1 * 128.0).abs() < 1e-6);
        assert!((f.light - 55.6 * 1.5 / 1.1 * 128.0).abs() < 1e-6);
        let sweep = reaper_fleet_sweep(&[0.0, 4.0, 8.0]);
        assert_eq!(sweep.len(), 3);
        assert!(sweep[0].normal > sweep[2].normal);
    }

    #[test]
    fn analysis_bundles_everything() {
        let a = ReaperAnalysis::new(3, true, 160, 30);
        assert_eq!(a.supply.len(), 4);
        assert_eq!(a.supply_cap.map(|p| p.reapers), Some(128));
        assert_eq!(a.upgrades.len(), 3);
        assert!(a.with_buff.light > a.without_buff.light);
    }
}

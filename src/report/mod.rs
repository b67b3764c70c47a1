//! Text and JSON report generation. All formatting lives here; the engine returns plain records.

use crate::reaper::{FleetDps, ReaperAnalysis, ReaperStatus, SquadCost};
use crate::squad::{relative_to_peak, SquadDps};
use crate::unit::{UnitStatus, WeaponInfo};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn write_json_report<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::write(path, json).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn render_unit(status: &UnitStatus, weapons: &[WeaponInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Unit: {} ({})",
        status.archetype,
        status.archetype.display_name()
    );
    let _ = writeln!(out, "HP: {}/{}", status.hp, status.max_hp);
    let _ = writeln!(out, "Rank: {}/{}", status.rank, status.max_rank);
    let _ = writeln!(
        out,
        "Current weapon: {} ({})",
        status.weapon.id, status.weapon.name
    );
    let _ = writeln!(out, "\nAvailable weapons:");
    for w in weapons {
        out.push_str(&render_weapon(w));
    }
    out
}

fn render_weapon(w: &WeaponInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n  {} ({})", w.id, w.name);
    let _ = writeln!(out, "  - base damage: {}", w.base_damage);
    for (target, dmg) in &w.bonus_damage {
        let _ = writeln!(out, "  - vs {}: {}", target, dmg);
    }
    if w.shots_per_attack > 1 {
        let _ = writeln!(out, "  - shots per attack: {}", w.shots_per_attack);
    }
    let _ = writeln!(out, "  - attack interval: {:.2}s", w.attack_interval);
    let _ = writeln!(out, "  - range: {}", w.range);
    if w.is_splash {
        let _ = writeln!(out, "  - splash radius: {}", w.splash_radius);
    }
    if w.armor_reduction > 0.0 {
        let _ = writeln!(out, "  - armor reduction: {}", w.armor_reduction);
    }
    let _ = writeln!(out, "  - damage: {:?}", w.damage_kind);
    let _ = writeln!(out, "  - DPS: {:.1}", w.dps);
    out
}

/// One row per armor value with the squad total and each group's share.
pub fn render_squad(rows: &[SquadDps]) -> String {
    let mut out = String::new();
    let Some(first) = rows.first() else {
        return "No results.\n".to_string();
    };
    let tag = first
        .target
        .target_type
        .map(|t| t.tag())
        .unwrap_or("(untyped)");
    let _ = writeln!(out, "Squad: {}  target: {}", first.name, tag);
    if !first.shred.is_empty() {
        let sources: Vec<String> = first
            .shred
            .sources()
            .map(|(s, v)| format!("{} -{}", s, v))
            .collect();
        let _ = writeln!(out, "Armor shred: {}", sources.join(", "));
    }
    for row in rows {
        let _ = writeln!(out, "\narmor {:>5.1}  total DPS {:>9.1}", row.target.armor, row.total);
        for g in &row.groups {
            let armor = g
                .per_unit
                .hit
                .effective_armor
                .map(|a| format!("{:.1}", a))
                .unwrap_or_else(|| "fixed".to_string());
            let _ = writeln!(
                out,
                "  {:>3} x {}/{} r{}  eff.armor {:>5}  per unit {:>7.2}  group {:>9.1}",
                g.count, g.archetype, g.weapon, g.rank, armor, g.per_unit.dps, g.total
            );
        }
    }
    out
}

/// Squads side by side across the same armor values, with each squad's percentage of its own peak.
/// The reaper fleet, when given, adds one row per target class.
pub fn render_comparison(sweeps: &[Vec<SquadDps>], fleet: &[FleetDps]) -> String {
    let mut out = String::new();
    let Some(armors) = sweeps
        .first()
        .map(|rows| rows.iter().map(|r| r.target.armor).collect::<Vec<_>>())
    else {
        return "No results.\n".to_string();
    };
    let _ = write!(out, "{:<16}", "armor");
    for a in &armors {
        let _ = write!(out, "{:>14.1}", a);
    }
    out.push('\n');
    for rows in sweeps {
        let name = rows.first().map(|r| r.name.as_str()).unwrap_or("");
        let totals: Vec<f64> = rows.iter().map(|r| r.total).collect();
        comparison_row(&mut out, name, &totals);
    }
    if let Some(first) = fleet.first() {
        let normal: Vec<f64> = fleet.iter().map(|f| f.normal).collect();
        let light: Vec<f64> = fleet.iter().map(|f| f.light).collect();
        comparison_row(&mut out, &format!("reapers x{}", first.reapers), &normal);
        comparison_row(&mut out, "  vs light", &light);
    }
    out
}

fn comparison_row(out: &mut String, name: &str, totals: &[f64]) {
    let rel = relative_to_peak(totals);
    let _ = write!(out, "{:<16}", name);
    for (t, p) in totals.iter().zip(rel.iter()) {
        let _ = write!(out, "{:>8.1} ({:>3.0}%)", t, p);
    }
    out.push('\n');
}

pub fn render_reaper(status: &ReaperStatus, buffed: &[(f64, f64, f64)], cost: &SquadCost) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "HP: {}/{}", status.hp, status.max_hp);
    let _ = writeln!(out, "Energy: {:.1}/{}", status.energy, status.max_energy);
    let _ = writeln!(out, "Weapon: {}", status.current_weapon);
    let _ = writeln!(
        out,
        "Damage: {}-{}  DPS: {:.1}",
        status.damage.min, status.damage.max, status.dps
    );
    let _ = writeln!(
        out,
        "Attack upgrade: {}  Uranium: {}",
        status.attack_upgrade,
        if status.has_uranium { "yes" } else { "no" }
    );
    let _ = writeln!(
        out,
        "Spider mines: {}/{}",
        status.deployed_mines, status.max_mines
    );
    if !buffed.is_empty() {
        let _ = writeln!(out, "\nBuffed average DPS per reaper:");
        let _ = writeln!(out, "{:>8} {:>10} {:>10}", "armor", "normal", "light");
        for (armor, normal, light) in buffed {
            let _ = writeln!(out, "{:>8.1} {:>10.1} {:>10.1}", armor, normal, light);
        }
    }
    let _ = writeln!(
        out,
        "\n{} reapers: {} transports, {} minerals, {} gas, {} supply",
        cost.reapers, cost.transports, cost.minerals, cost.gas, cost.supply
    );
    out
}

pub fn render_reaper_analysis(a: &ReaperAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Per reaper, attack upgrade {} (light / heavy):",
        a.attack_upgrade
    );
    let _ = writeln!(
        out,
        "  no buff     {:>8.2} / {:>8.2}",
        a.without_buff.light, a.without_buff.heavy
    );
    let _ = writeln!(
        out,
        "  safety field{:>8.2} / {:>8.2}",
        a.with_buff.light, a.with_buff.heavy
    );

    let _ = writeln!(out, "\nSupply (max {}):", a.max_supply);
    let _ = writeln!(
        out,
        "{:>8} {:>8} {:>10} {:>10} {:>10}",
        "supply", "reapers", "transports", "light", "heavy"
    );
    for p in &a.supply {
        let _ = writeln!(
            out,
            "{:>8} {:>8} {:>10} {:>10.1} {:>10.1}",
            p.supply, p.reapers, p.transports, p.dps.light, p.dps.heavy
        );
    }
    match &a.supply_cap {
        Some(p) => {
            let _ = writeln!(
                out,
                "Largest squad under cap: {} reapers + {} transports = {} supply, {:.1} / {:.1} DPS",
                p.reapers, p.transports, p.supply, p.dps.light, p.dps.heavy
            );
        }
        None => {
            let _ = writeln!(out, "No reaper squad fits under the cap.");
        }
    }

    let b = &a.benefits;
    let _ = writeln!(
        out,
        "\nUpgrade benefits for {} reapers (baseline {:.1} / {:.1}):",
        b.reapers, b.baseline.light, b.baseline.heavy
    );
    for row in &b.rows {
        let label = match (row.attack_upgrade, row.raven_buff) {
            (0, true) => "safety field only".to_string(),
            (level, true) => format!("attack {} + safety field", level),
            (level, false) => format!("attack {}", level),
        };
        let _ = writeln!(
            out,
            "  {:<26} +{:.1}% light, +{:.1}% heavy",
            label, row.gain_pct.light, row.gain_pct.heavy
        );
    }

    let _ = writeln!(out, "\nUpgrade efficiency:");
    for e in &a.upgrades {
        let _ = writeln!(
            out,
            "  attack {}: {} minerals {} gas ({} mineral eq.), {}s, +{:.1} DPS, {:.2} DPS per 100",
            e.level,
            e.cost.minerals,
            e.cost.gas,
            e.mineral_equivalent,
            e.cost.research_secs,
            e.dps_gain,
            e.dps_per_100_minerals
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Archetype;
    use crate::reaper::reaper_fleet_sweep;
    use crate::squad::{armor_sweep, squad_dps, Composition};
    use crate::unit::UnitProfile;

    #[test]
    fn unit_report_lists_weapons() {
        let unit = UnitProfile::at_rank(Archetype::Marine, 2);
        let text = render_unit(&unit.status().unwrap(), &unit.weapon_info().unwrap());
        assert!(text.contains("Rank: 2/3"));
        assert!(text.contains("storm_rifle"));
        assert!(text.contains("shots per attack: 2"));
        assert!(!text.contains("heavy_laser"));
    }

    #[test]
    fn squad_report_shows_shred_and_groups() {
        let row = squad_dps(&Composition::fission_storm(), 6.0, "普通").unwrap();
        let text = render_squad(&[row]);
        assert!(text.contains("fission_rifle -4"));
        assert!(text.contains("fixed"));
        assert!(text.contains("storm_rifle"));
        assert_eq!(render_squad(&[]), "No results.\n");
    }

    #[test]
    fn comparison_has_row_per_squad() {
        let sweeps: Vec<_> = Composition::presets()
            .iter()
            .map(|c| armor_sweep(c, "普通", &[0.0, 4.0]).unwrap())
            .collect();
        let text = render_comparison(&sweeps, &[]);
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("hellfire"));
        assert!(text.contains("(100%)"));

        let fleet = reaper_fleet_sweep(&[0.0, 4.0]);
        let text = render_comparison(&sweeps, &fleet);
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("reapers x128"));
        assert!(text.contains("vs light"));
    }

    #[test]
    fn reaper_analysis_report() {
        let text = render_reaper_analysis(&ReaperAnalysis::new(3, true, 160, 30));
        assert!(text.contains("Supply (max 160)"));
        assert!(text.contains("128 reapers + 16 transports = 160 supply"));
        assert!(text.contains("safety field only"));
        assert!(text.contains("attack 3: 200 minerals 200 gas (800 mineral eq.), 200s"));

        let none = render_reaper_analysis(&ReaperAnalysis::new(0, false, 2, 1));
        assert!(none.contains("No reaper squad fits"));
    }

    #[test]
    fn json_report_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("squad.json");
        let row = squad_dps(&Composition::heavy_laser(), 0.0, "重甲").unwrap();
        write_json_report(&[row], &path).unwrap();
        let s = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v[0]["name"], "heavy-laser");
        assert_eq!(v[0]["groups"][0]["weapon"], "heavy_laser");
    }
}

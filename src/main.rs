//! Gestalt DPS: CLI for the custom-unit combat engine.

use clap::{Parser, Subcommand};
use gestalt_dps::config::{SquadConfig, DEFAULT_ARMOR_SWEEP, DEFAULT_TARGET_TAG};
use gestalt_dps::damage::HitContext;
use gestalt_dps::model::{Archetype, TargetDescriptor, TargetType};
use gestalt_dps::reaper::{
    buffed_average_dps, reaper_fleet_sweep, squad_cost, FleetDps, Reaper, ReaperAnalysis,
    ReaperLoadout, ReaperStatus, SquadCost,
};
use gestalt_dps::report::{
    render_comparison, render_reaper, render_reaper_analysis, render_squad, render_unit,
    write_json_report,
};
use gestalt_dps::squad::{armor_sweep, Composition, SquadDps, PRESET_NAMES};
use gestalt_dps::unit::UnitProfile;
use gestalt_dps::util::init_logging;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gestalt-dps")]
#[command(about = "Combat DPS engine for custom RTS units (ghost, marine, reaper)")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print status and weapon info for one unit at a given rank.
    Unit {
        #[arg(long, value_name = "ghost|marine")]
        archetype: Archetype,
        #[arg(long, default_value_t = 1)]
        rank: u8,
        #[arg(long, value_name = "ID", help = "Weapon to equip; unknown or locked keeps the current one")]
        weapon: Option<String>,
        #[arg(long, value_name = "TAG", default_value = DEFAULT_TARGET_TAG)]
        target_type: String,
        #[arg(long, value_name = "N", default_value_t = 0.0)]
        target_armor: f64,
    },
    /// Squad DPS across armor values, from a TOML file or a built-in preset.
    Squad {
        #[arg(long, value_name = "TOML", conflicts_with = "preset", required_unless_present = "preset")]
        config: Option<PathBuf>,
        #[arg(long, value_name = "NAME", help = "fission-storm, heavy-laser or hellfire")]
        preset: Option<String>,
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
    /// Sweep every built-in preset and the reaper fleet across the default armor range.
    Compare {
        #[arg(long, value_name = "TAG", default_value = DEFAULT_TARGET_TAG)]
        target_type: String,
        #[arg(long, help = "Leave out the 128-reaper fleet line")]
        no_reapers: bool,
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
    /// Reaper damage, DPS, buffed average DPS, squad cost, supply and upgrade analysis.
    Reaper {
        #[arg(long, default_value_t = 0)]
        attack_upgrade: u8,
        #[arg(long)]
        uranium: bool,
        #[arg(long, help = "Include five safety field stacks in the buffed average")]
        safety_field: bool,
        #[arg(long, value_name = "N")]
        target_armor: Option<f64>,
        #[arg(long, default_value_t = 16, help = "Reapers in the costed squad and upgrade analysis")]
        count: u32,
        #[arg(
            long,
            value_name = "N",
            default_value_t = 160,
            value_parser = clap::value_parser!(u32).range(1..=MAX_SUPPLY_ARG)
        )]
        max_supply: u32,
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },
}

/// Upper bound for `--max-supply`; the supply table has one row per 40.
const MAX_SUPPLY_ARG: i64 = 10_000;

#[derive(Serialize)]
struct ComparisonReport<'a> {
    squads: &'a [Vec<SquadDps>],
    reaper_fleet: &'a [FleetDps],
}

#[derive(Serialize)]
struct ReaperReport<'a> {
    status: &'a ReaperStatus,
    cost: &'a SquadCost,
    analysis: &'a ReaperAnalysis,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Unit {
            archetype,
            rank,
            weapon,
            target_type,
            target_armor,
        } => run_unit(archetype, rank, weapon, &target_type, target_armor),
        Commands::Squad {
            config,
            preset,
            json,
        } => run_squad(config, preset, json),
        Commands::Compare {
            target_type,
            no_reapers,
            json,
        } => run_compare(&target_type, !no_reapers, json),
        Commands::Reaper {
            attack_upgrade,
            uranium,
            safety_field,
            target_armor,
            count,
            max_supply,
            json,
        } => run_reaper(
            ReaperArgs {
                attack_upgrade,
                uranium,
                safety_field,
                target_armor,
                count,
                max_supply,
            },
            json,
        ),
    }
}

fn run_unit(
    archetype: Archetype,
    rank: u8,
    weapon: Option<String>,
    target_type: &str,
    target_armor: f64,
) -> Result<(), String> {
    let mut unit = UnitProfile::at_rank(archetype, rank);
    if unit.rank() != rank {
        tracing::warn!("rank {} clamped to {}", rank, unit.rank());
    }
    if let Some(name) = weapon {
        let id = unit.weapon_named(&name);
        if !unit.switch_weapon(id) {
            tracing::warn!("{} is locked at rank {}; keeping {}", id, unit.rank(), unit.current_weapon());
        }
    }
    let status = unit.status().map_err(|e| e.to_string())?;
    let weapons = unit.weapon_info().map_err(|e| e.to_string())?;
    print!("{}", render_unit(&status, &weapons));

    let target = TargetDescriptor::new(target_type, target_armor);
    let hit = unit
        .dps_against(unit.current_weapon(), &target, &HitContext::new())
        .map_err(|e| e.to_string())?;
    println!(
        "\nvs {} armor {}: {:.2} per attack, {:.1} DPS",
        target_type, target_armor, hit.hit.realized, hit.dps
    );
    Ok(())
}

fn run_squad(
    config: Option<PathBuf>,
    preset: Option<String>,
    json: Option<PathBuf>,
) -> Result<(), String> {
    let (composition, target_type, armor_values) = match (config, preset) {
        (Some(path), _) => {
            let cfg = SquadConfig::load(&path).map_err(|e| e.to_string())?;
            tracing::info!("loaded squad '{}' from {}", cfg.name, path.display());
            (
                Composition::from_config(&cfg),
                cfg.target_type,
                cfg.armor_values,
            )
        }
        (None, Some(name)) => {
            let composition = Composition::preset(&name).ok_or_else(|| {
                format!(
                    "unknown preset: {} (expected one of {})",
                    name,
                    PRESET_NAMES.join(", ")
                )
            })?;
            (
                composition,
                DEFAULT_TARGET_TAG.to_string(),
                DEFAULT_ARMOR_SWEEP.to_vec(),
            )
        }
        (None, None) => return Err("provide --config or --preset".to_string()),
    };

    let rows = armor_sweep(&composition, &target_type, &armor_values).map_err(|e| e.to_string())?;
    print!("{}", render_squad(&rows));
    if let Some(path) = json {
        write_json_report(&rows, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_compare(
    target_type: &str,
    with_reapers: bool,
    json: Option<PathBuf>,
) -> Result<(), String> {
    if TargetType::from_tag(target_type).is_none() {
        tracing::warn!("unrecognized target type '{}'; no bonus damage applies", target_type);
    }
    let sweeps = Composition::presets()
        .iter()
        .map(|c| armor_sweep(c, target_type, &DEFAULT_ARMOR_SWEEP))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    let fleet = if with_reapers {
        reaper_fleet_sweep(&DEFAULT_ARMOR_SWEEP)
    } else {
        Vec::new()
    };
    print!("{}", render_comparison(&sweeps, &fleet));
    if let Some(path) = json {
        let report = ComparisonReport {
            squads: &sweeps,
            reaper_fleet: &fleet,
        };
        write_json_report(&report, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

struct ReaperArgs {
    attack_upgrade: u8,
    uranium: bool,
    safety_field: bool,
    target_armor: Option<f64>,
    count: u32,
    max_supply: u32,
}

fn run_reaper(args: ReaperArgs, json: Option<PathBuf>) -> Result<(), String> {
    let mut reaper = Reaper::new(0.0);
    if !reaper.set_attack_upgrade(args.attack_upgrade) {
        return Err(format!(
            "attack upgrade {} is out of range",
            args.attack_upgrade
        ));
    }
    reaper.has_uranium = args.uranium;

    let loadout = ReaperLoadout {
        attack_upgrade: args.attack_upgrade,
        safety_field_stacks: if args.safety_field {
            ReaperLoadout::default().safety_field_stacks
        } else {
            0
        },
        ..ReaperLoadout::default()
    };
    let armors: Vec<f64> = match args.target_armor {
        Some(a) => vec![a],
        None => DEFAULT_ARMOR_SWEEP.to_vec(),
    };
    let buffed: Vec<(f64, f64, f64)> = armors
        .iter()
        .map(|&armor| {
            (
                armor,
                buffed_average_dps(&loadout, &TargetDescriptor::of(TargetType::Normal, armor)),
                buffed_average_dps(&loadout, &TargetDescriptor::of(TargetType::Light, armor)),
            )
        })
        .collect();
    let status = reaper.status();
    let cost = squad_cost(args.count);
    let analysis = ReaperAnalysis::new(
        args.attack_upgrade,
        args.safety_field,
        args.max_supply,
        args.count,
    );
    print!("{}", render_reaper(&status, &buffed, &cost));
    print!("\n{}", render_reaper_analysis(&analysis));
    if let Some(path) = json {
        let report = ReaperReport {
            status: &status,
            cost: &cost,
            analysis: &analysis,
        };
        write_json_report(&report, &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

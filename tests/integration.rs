//! CLI integration tests.

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gestalt-dps"))
        .args(args)
        .output()
        .expect("run gestalt-dps")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn unit_command_lists_unlocked_weapons() {
    let out = run(&["unit", "--archetype", "marine", "--rank", "2"]);
    assert!(out.status.success(), "unit should succeed");
    let text = stdout(&out);
    assert!(text.contains("Unit: marine"), "stdout: {}", text);
    assert!(text.contains("Rank: 2/3"));
    assert!(text.contains("storm_rifle"));
    assert!(!text.contains("heavy_laser"), "heavy laser unlocks at rank 3");
}

#[test]
fn unit_command_switches_weapon_and_reports_target_dps() {
    let out = run(&[
        "unit",
        "--archetype",
        "ghost",
        "--rank",
        "3",
        "--weapon",
        "hellfire",
        "--target-type",
        "机械",
        "--target-armor",
        "2",
    ]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Current weapon: hellfire"), "stdout: {}", text);
    assert!(text.contains("vs 机械 armor 2"));
}

#[test]
fn unknown_archetype_rejected() {
    let out = run(&["unit", "--archetype", "zealot"]);
    assert!(!out.status.success());
}

#[test]
fn squad_preset_prints_shred_and_totals() {
    let out = run(&["squad", "--preset", "fission-storm"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Squad: fission-storm"), "stdout: {}", text);
    assert!(text.contains("Armor shred: fission_rifle -4"));
    assert_eq!(text.matches("total DPS").count(), 9);
}

#[test]
fn squad_config_file_with_json_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = dir.path().join("squad.toml");
    std::fs::write(
        &cfg,
        r#"
name = "mixed"
target_type = "重甲"
armor_values = [0, 6]

[[groups]]
archetype = "ghost"
weapon = "fission_rifle"
rank = 3
count = 5

[[groups]]
archetype = "marine"
weapon = "storm_rifle"
rank = 3
count = 30
"#,
    )
    .expect("write config");
    let json = dir.path().join("out").join("mixed.json");
    let out = run(&[
        "squad",
        "--config",
        cfg.to_str().unwrap(),
        "--json",
        json.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("Squad: mixed  target: 重甲"));

    let s = std::fs::read_to_string(&json).expect("json written");
    let v: serde_json::Value = serde_json::from_str(&s).expect("valid json");
    let rows = v.as_array().expect("array of rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["target"]["armor"], 6.0);
    assert_eq!(rows[1]["groups"][1]["per_unit"]["hit"]["effective_armor"], 2.0);
}

#[test]
fn squad_config_with_locked_weapon_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = dir.path().join("bad.toml");
    std::fs::write(
        &cfg,
        r#"
name = "too-early"

[[groups]]
archetype = "marine"
weapon = "heavy_laser"
rank = 1
count = 10
"#,
    )
    .expect("write config");
    let out = run(&["squad", "--config", cfg.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("locked"));
}

#[test]
fn squad_unknown_preset_fails() {
    let out = run(&["squad", "--preset", "zerg-rush"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown preset"));
}

#[test]
fn compare_writes_all_presets_and_reaper_fleet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let json = dir.path().join("compare.json");
    let out = run(&["compare", "--json", json.to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    for name in ["fission-storm", "heavy-laser", "hellfire", "reapers x128"] {
        assert!(text.contains(name), "missing {} in {}", name, text);
    }
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).expect("json written")).unwrap();
    assert_eq!(v["squads"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(v["squads"][0].as_array().map(|a| a.len()), Some(9));
    assert_eq!(v["reaper_fleet"].as_array().map(|a| a.len()), Some(9));
    assert_eq!(v["reaper_fleet"][0]["reapers"], 128);

    let bare = stdout(&run(&["compare", "--no-reapers"]));
    assert!(!bare.contains("reapers x128"));
}

#[test]
fn reaper_reports_damage_and_cost() {
    let out = run(&["reaper", "--attack-upgrade", "2", "--target-armor", "1"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Damage: 10-20"), "stdout: {}", text);
    assert!(text.contains("16 reapers: 2 transports, 1100 minerals, 1000 gas, 20 supply"));

    let uranium = stdout(&run(&["reaper", "--uranium"]));
    assert!(uranium.contains("Damage: 10-30"), "stdout: {}", uranium);
}

#[test]
fn reaper_huge_count_is_costed() {
    let out = run(&["reaper", "--count", "4294967295"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("4294967295 reapers: 536870912 transports"));
}

#[test]
fn reaper_supply_and_upgrade_analysis() {
    let dir = tempfile::tempdir().expect("tempdir");
    let json = dir.path().join("reaper.json");
    let out = run(&[
        "reaper",
        "--attack-upgrade",
        "3",
        "--safety-field",
        "--count",
        "30",
        "--json",
        json.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Supply (max 160)"), "stdout: {}", text);
    assert!(text.contains("128 reapers + 16 transports = 160 supply"));
    assert!(text.contains("Upgrade benefits for 30 reapers"));
    assert!(text.contains("attack 1: 100 minerals 100 gas (400 mineral eq.), 120s"));

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).expect("json written")).unwrap();
    assert_eq!(v["analysis"]["supply"].as_array().map(|a| a.len()), Some(4));
    assert_eq!(v["analysis"]["supply_cap"]["reapers"], 128);
    assert_eq!(v["cost"]["reapers"], 30);

    assert!(!run(&["reaper", "--max-supply", "0"]).status.success());
}

#[test]
fn reaper_upgrade_out_of_range_fails() {
    let out = run(&["reaper", "--attack-upgrade", "4"]);
    assert!(!out.status.success());
}

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use colonia_core::file_io::{write_saved_game, write_scenario};
use colonia_core::{GameState, SAVE_GAME_CURRENT_VERSION, SavegameData, ScenarioData};
use serde_json::Value;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_colonia-save"))
        .args(args)
        .output()
        .expect("failed to run colonia-save CLI")
}

fn temp_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.sav", std::process::id(), nanos))
}

fn write_fixture_save(path: &PathBuf) -> GameState {
    let mut game = GameState::new();
    game.settings.player_name[..5].copy_from_slice(b"Livia");
    game.settings.scenario_name[..8].copy_from_slice(b"Brundisi");
    game.settings.campaign_mission = 2;
    game.figures.records = vec![0; 160 * 5];
    game.buildings.records = vec![0; 160 * 3];
    game.buildings.records[0] = 1;
    game.time.year = 27;
    game.time.month = 9;
    game.map.rebuild_images();
    game.buildings.recalculate_highest_ids();

    let mut data = SavegameData::for_version(SAVE_GAME_CURRENT_VERSION)
        .expect("current version should be supported");
    write_saved_game(path, &mut data, &game).expect("failed to write fixture save");
    game
}

#[test]
fn default_summary_json_reports_decoded_state() {
    let path = temp_path("colonia_cli_summary");
    write_fixture_save(&path);

    let output = run_cli(&["--json", path.to_str().expect("path is utf-8")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["file_version"], u64::from(SAVE_GAME_CURRENT_VERSION));
    assert_eq!(json["player_name"], "Livia");
    assert_eq!(json["scenario_name"], "Brundisi");
    assert_eq!(json["figures"], 5);
    assert_eq!(json["buildings"], 3);
    assert_eq!(json["game_time"]["year"], 27);
    assert_eq!(json["game_time"]["month"], 9);

    fs::remove_file(&path).ok();
}

#[test]
fn file_version_flag_prints_only_the_version() {
    let path = temp_path("colonia_cli_version");
    write_fixture_save(&path);

    let output = run_cli(&["--file-version", path.to_str().expect("path is utf-8")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("{SAVE_GAME_CURRENT_VERSION:#x}"));

    fs::remove_file(&path).ok();
}

#[test]
fn pieces_json_lists_the_registry() {
    let path = temp_path("colonia_cli_pieces");
    write_fixture_save(&path);

    let output = run_cli(&["--pieces", "--json", path.to_str().expect("path is utf-8")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    let pieces = json["pieces"].as_array().expect("pieces should be an array");
    assert_eq!(pieces.len(), 83);
    assert_eq!(pieces[0]["name"], "scenario_campaign_mission");
    let last = pieces.last().expect("pieces should not be empty");
    assert_eq!(last["name"], "deliveries");
    assert_eq!(last["dynamic"], true);

    fs::remove_file(&path).ok();
}

#[test]
fn unsupported_version_exits_with_code_two() {
    let path = temp_path("colonia_cli_future");
    let mut bytes = vec![0u8; 4];
    bytes.extend((SAVE_GAME_CURRENT_VERSION + 1).to_le_bytes());
    bytes.extend(vec![0u8; 32]);
    fs::write(&path, &bytes).expect("failed to write file");

    let output = run_cli(&["--summary", path.to_str().expect("path is utf-8")]);
    assert_eq!(output.status.code(), Some(2));

    fs::remove_file(&path).ok();
}

#[test]
fn missing_file_exits_with_code_one() {
    let path = temp_path("colonia_cli_missing");
    let output = run_cli(&[path.to_str().expect("path is utf-8")]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn resave_produces_a_loadable_file() {
    let path = temp_path("colonia_cli_resave_in");
    let out_path = temp_path("colonia_cli_resave_out");
    write_fixture_save(&path);

    let output = run_cli(&[
        "--resave",
        out_path.to_str().expect("path is utf-8"),
        path.to_str().expect("path is utf-8"),
    ]);
    assert!(output.status.success());

    let check = run_cli(&["--file-version", out_path.to_str().expect("path is utf-8")]);
    assert!(check.status.success());
    let stdout = String::from_utf8_lossy(&check.stdout);
    assert_eq!(stdout.trim(), format!("{SAVE_GAME_CURRENT_VERSION:#x}"));

    fs::remove_file(&path).ok();
    fs::remove_file(&out_path).ok();
}

#[test]
fn scenario_mode_reads_scenario_files() {
    let path = temp_path("colonia_cli_scenario");
    let mut game = GameState::new();
    game.map.terrain[100] = 0x0002;
    game.map.rebuild_images();
    let mut data = ScenarioData::new();
    write_scenario(&path, &mut data, &game).expect("failed to write fixture scenario");

    let output = run_cli(&["--scenario", "--json", path.to_str().expect("path is utf-8")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["file_version"], Value::Null);

    fs::remove_file(&path).ok();
}

#[test]
fn save_only_flags_are_rejected_in_scenario_mode() {
    let path = temp_path("colonia_cli_scenario_flags");
    let output = run_cli(&[
        "--scenario",
        "--delete",
        path.to_str().expect("path is utf-8"),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

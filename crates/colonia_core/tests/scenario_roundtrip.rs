use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use colonia_core::error::SaveError;
use colonia_core::file_io::{read_scenario, write_scenario};
use colonia_core::{GameState, ScenarioData};

fn temp_scenario_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.map", std::process::id(), nanos))
}

/// Sum of the ten fixed scenario piece sizes.
const SCENARIO_FILE_SIZE: usize = 52488 + 26244 + 52488 + 26244 + 26244 + 26244 + 8 + 8 + 1720 + 4;

#[test]
fn write_then_read_round_trips_scenario_state() {
    let path = temp_scenario_path("colonia_scenario");

    let mut game = GameState::new();
    game.map.terrain[3000] = 0x0011;
    game.map.random[3000] = 9;
    game.map.edge[3000] = 0x40;
    game.map.elevation[64] = 3;
    game.scenario.data[16] = 0x2A;
    game.view.camera_x = 60;
    game.view.camera_y = 30;
    game.random.iv = [12, 34];
    game.map.rebuild_images();

    let mut data = ScenarioData::new();
    write_scenario(&path, &mut data, &game).expect("failed to write scenario");

    let written = fs::read(&path).expect("failed to read back file");
    assert_eq!(written.len(), SCENARIO_FILE_SIZE);

    let mut reloaded = GameState::new();
    let mut data = ScenarioData::new();
    read_scenario(&path, &mut data, &mut reloaded).expect("failed to read scenario");

    assert_eq!(reloaded.map.terrain, game.map.terrain);
    assert_eq!(reloaded.map.edge, game.map.edge);
    assert_eq!(reloaded.map.elevation, game.map.elevation);
    assert_eq!(reloaded.map.image_ids, game.map.image_ids);
    assert_eq!(reloaded.scenario, game.scenario);
    assert_eq!(reloaded.view.camera_x, game.view.camera_x);
    assert_eq!(reloaded.view.camera_y, game.view.camera_y);
    assert_eq!(reloaded.random, game.random);

    fs::remove_file(&path).ok();
}

#[test]
fn any_truncation_is_an_error() {
    let path = temp_scenario_path("colonia_scenario_short");

    let game = GameState::new();
    let mut data = ScenarioData::new();
    write_scenario(&path, &mut data, &game).expect("failed to write scenario");

    // Even one missing byte fails: scenarios have no tolerated short reads.
    let mut bytes = fs::read(&path).expect("failed to read back file");
    bytes.truncate(bytes.len() - 1);
    fs::write(&path, &bytes).expect("failed to rewrite file");

    let mut reloaded = GameState::new();
    let mut data = ScenarioData::new();
    let err = read_scenario(&path, &mut data, &mut reloaded).unwrap_err();
    assert!(matches!(err, SaveError::Read(_)));

    fs::remove_file(&path).ok();
}

#[test]
fn missing_file_is_an_error() {
    let path = temp_scenario_path("colonia_scenario_missing");
    let mut data = ScenarioData::new();
    let mut game = GameState::new();
    assert!(matches!(
        read_scenario(&path, &mut data, &mut game),
        Err(SaveError::Read(_))
    ));
}

use std::path::PathBuf;
use std::process;

use clap::Parser;
use colonia_core::error::SaveError;
use colonia_core::file_io::{
    delete_saved_game, read_saved_game, read_savegame_version, read_scenario, write_saved_game,
};
use colonia_core::piece::PieceDescriptor;
use colonia_core::{GameState, SAVE_GAME_CURRENT_VERSION, SavegameData, ScenarioData};
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "FILE")]
    path: PathBuf,
    /// Treat the file as a scenario instead of a saved game.
    #[arg(long)]
    scenario: bool,
    /// Byte offset of a save embedded in a container file.
    #[arg(long, default_value_t = 0)]
    offset: u64,
    /// Print only the file's format version.
    #[arg(long = "file-version")]
    file_version: bool,
    /// List every piece with its size and flags.
    #[arg(long)]
    pieces: bool,
    /// Print the decoded summary (the default when no flag is given).
    #[arg(long)]
    summary: bool,
    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Load the file and rewrite it at the current format version.
    #[arg(long, value_name = "OUT")]
    resave: Option<PathBuf>,
    /// Delete the saved game and exit.
    #[arg(long)]
    delete: bool,
}

fn exit_code(err: &SaveError) -> i32 {
    match err {
        SaveError::UnsupportedVersion(_) => 2,
        _ => 1,
    }
}

fn fail(context: &str, err: SaveError) -> ! {
    eprintln!("{context}: {err}");
    process::exit(exit_code(&err));
}

/// Fixed-size name fields are NUL-padded.
fn decode_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn pieces_to_json(descriptors: &[PieceDescriptor]) -> JsonValue {
    JsonValue::Array(
        descriptors
            .iter()
            .map(|d| serde_json::to_value(d).expect("descriptor serializes"))
            .collect(),
    )
}

fn print_pieces(descriptors: &[PieceDescriptor]) {
    println!("{:<32} {:>10}  flags", "piece", "size");
    for d in descriptors {
        let mut flags = String::new();
        if d.compressed {
            flags.push_str("compressed");
        }
        if d.dynamic {
            if !flags.is_empty() {
                flags.push(' ');
            }
            flags.push_str("dynamic");
        }
        println!("{:<32} {:>10}  {}", d.name, d.size, flags);
    }
}

fn summary_json(version: Option<u32>, game: &GameState) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    match version {
        Some(version) => out.insert("file_version".to_string(), JsonValue::from(version)),
        None => out.insert("file_version".to_string(), JsonValue::Null),
    };
    out.insert(
        "player_name".to_string(),
        JsonValue::String(decode_name(&game.settings.player_name)),
    );
    out.insert(
        "scenario_name".to_string(),
        JsonValue::String(decode_name(&game.settings.scenario_name)),
    );
    out.insert(
        "campaign_mission".to_string(),
        JsonValue::from(game.settings.campaign_mission),
    );
    out.insert("is_custom".to_string(), JsonValue::from(game.settings.is_custom));

    let mut time = JsonMap::new();
    time.insert("year".to_string(), JsonValue::from(game.time.year));
    time.insert("month".to_string(), JsonValue::from(game.time.month));
    time.insert("day".to_string(), JsonValue::from(game.time.day));
    out.insert("game_time".to_string(), JsonValue::Object(time));

    out.insert("figures".to_string(), JsonValue::from(game.figures.count()));
    out.insert("buildings".to_string(), JsonValue::from(game.buildings.count()));
    out.insert("legions".to_string(), JsonValue::from(game.formations.num_legions));
    out.insert(
        "monument_deliveries".to_string(),
        JsonValue::from(game.buildings.deliveries.len()),
    );
    out.insert(
        "map_orientation".to_string(),
        JsonValue::from(game.view.orientation),
    );
    out
}

fn print_summary(version: Option<u32>, game: &GameState) {
    if let Some(version) = version {
        println!("file version:        {version:#x}");
    }
    println!("player name:         {}", decode_name(&game.settings.player_name));
    println!("scenario name:       {}", decode_name(&game.settings.scenario_name));
    println!("campaign mission:    {}", game.settings.campaign_mission);
    println!("custom scenario:     {}", game.settings.is_custom);
    println!(
        "game time:           year {} month {} day {}",
        game.time.year, game.time.month, game.time.day
    );
    println!("figures:             {}", game.figures.count());
    println!("buildings:           {}", game.buildings.count());
    println!("legions:             {}", game.formations.num_legions);
    println!("monument deliveries: {}", game.buildings.deliveries.len());
    println!("map orientation:     {}", game.view.orientation);
}

fn run_savegame(cli: &Cli) {
    if cli.delete {
        if let Err(err) = delete_saved_game(&cli.path) {
            fail("error deleting save", err);
        }
        println!("Deleted {}", cli.path.display());
        return;
    }

    if cli.file_version && !cli.pieces && !cli.summary && cli.resave.is_none() {
        // Version-only peek avoids decoding the whole file.
        let version = read_savegame_version(&cli.path, cli.offset)
            .unwrap_or_else(|err| fail("error reading version", err));
        if cli.json {
            println!("{}", JsonValue::from(version));
        } else {
            println!("{version:#x}");
        }
        return;
    }

    let mut data = SavegameData::for_version(SAVE_GAME_CURRENT_VERSION)
        .expect("current version is supported");
    let mut game = GameState::new();
    if let Err(err) = read_saved_game(&cli.path, cli.offset, &mut data, &mut game) {
        fail("error reading save", err);
    }
    let version = data.version();

    if let Some(out_path) = &cli.resave {
        if let Err(err) = write_saved_game(out_path, &mut data, &game) {
            fail("error writing save", err);
        }
        if !cli.json {
            println!("Wrote {} at version {SAVE_GAME_CURRENT_VERSION:#x}", out_path.display());
        }
    }

    if cli.json {
        let mut out = JsonMap::new();
        if cli.file_version {
            out.insert("file_version".to_string(), JsonValue::from(version));
        }
        if cli.pieces {
            out.insert("pieces".to_string(), pieces_to_json(&data.descriptors()));
        }
        if cli.summary || (!cli.file_version && !cli.pieces) {
            out.extend(summary_json(Some(version), &game));
        }
        let rendered = serde_json::to_string_pretty(&JsonValue::Object(out))
            .expect("JSON output renders");
        println!("{rendered}");
        return;
    }

    if cli.file_version {
        println!("file_version={version:#x}");
    }
    if cli.pieces {
        print_pieces(&data.descriptors());
    }
    if cli.summary || (!cli.file_version && !cli.pieces && cli.resave.is_none()) {
        print_summary(Some(version), &game);
    }
}

fn run_scenario(cli: &Cli) {
    let mut data = ScenarioData::new();
    let mut game = GameState::new();
    if let Err(err) = read_scenario(&cli.path, &mut data, &mut game) {
        fail("error reading scenario", err);
    }

    if cli.json {
        let mut out = JsonMap::new();
        if cli.pieces {
            out.insert("pieces".to_string(), pieces_to_json(&data.descriptors()));
        }
        if cli.summary || !cli.pieces {
            out.extend(summary_json(None, &game));
        }
        let rendered = serde_json::to_string_pretty(&JsonValue::Object(out))
            .expect("JSON output renders");
        println!("{rendered}");
        return;
    }

    if cli.pieces {
        print_pieces(&data.descriptors());
    }
    if cli.summary || !cli.pieces {
        print_summary(None, &game);
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.scenario {
        if cli.delete || cli.resave.is_some() || cli.file_version || cli.offset != 0 {
            eprintln!("--delete, --resave, --file-version and --offset apply to saved games only");
            process::exit(2);
        }
        run_scenario(&cli);
    } else {
        run_savegame(&cli);
    }
}

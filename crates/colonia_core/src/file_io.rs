//! File transport: streams registries to and from disk.
//!
//! Savegames carry a version header and per-piece compression; scenarios are
//! a raw concatenation of fixed pieces. All multi-byte values on disk are
//! little-endian.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{error, info, warn};

use crate::buffer::Buffer;
use crate::compress::{
    read_compressed_chunk, read_u32_le, write_compressed_chunk, write_u32_le, CompressBuffer,
    COMPRESS_BUFFER_SIZE,
};
use crate::error::SaveError;
use crate::savegame::SavegameData;
use crate::scenario::ScenarioData;
use crate::state::GameState;
use crate::version::SAVE_GAME_CURRENT_VERSION;

/// Reads the format version out of a savegame header without consuming it:
/// the version is the second 4-byte field, after the campaign mission id.
fn peek_version(file: &mut File) -> io::Result<u32> {
    file.seek(SeekFrom::Current(4))?;
    let version = read_u32_le(file)?;
    file.seek(SeekFrom::Current(-8))?;
    Ok(version)
}

/// Reads just the version of the savegame at `path`. `offset` points at the
/// start of a save embedded in a larger container file.
pub fn read_savegame_version(path: &Path, offset: u64) -> Result<u32, SaveError> {
    let mut file = File::open(path).map_err(SaveError::Read)?;
    if offset != 0 {
        file.seek(SeekFrom::Start(offset)).map_err(SaveError::Read)?;
    }
    peek_version(&mut file).map_err(SaveError::Read)
}

fn read_savegame_pieces(file: &mut File, data: &mut SavegameData) -> io::Result<()> {
    let mut scratch = CompressBuffer::new();
    let mut pieces = data.pieces_mut();
    let last = pieces.len() - 1;
    for (index, piece) in pieces.iter_mut().enumerate() {
        if piece.dynamic {
            // A missing or zero length just means the piece is absent.
            let size = read_u32_le(file).unwrap_or(0) as usize;
            if size == 0 {
                continue;
            }
            if size > COMPRESS_BUFFER_SIZE {
                error!("dynamic piece {} declares {size} bytes, over the ceiling", index + 1);
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("dynamic piece of {size} bytes exceeds the compression ceiling"),
                ));
            }
            piece.buf = Buffer::new(size);
        } else {
            piece.buf.reset();
        }
        let result = if piece.compressed {
            read_compressed_chunk(file, piece.buf.data_mut(), &mut scratch)
        } else {
            file.read_exact(piece.buf.data_mut())
        };
        if let Err(err) = result {
            // The last piece may legitimately be shorter than declared.
            if index != last {
                error!(
                    "failed reading piece {} of {} ({} bytes): {err}",
                    index + 1,
                    last + 1,
                    piece.buf.len()
                );
                return Err(err);
            }
            warn!("short read on final piece ({} bytes declared)", piece.buf.len());
        }
    }
    Ok(())
}

fn write_savegame_pieces(file: &mut File, data: &mut SavegameData) -> io::Result<()> {
    let mut scratch = CompressBuffer::new();
    for piece in data.pieces_mut() {
        if piece.dynamic {
            write_u32_le(file, piece.buf.len() as u32)?;
            if piece.buf.is_empty() {
                continue;
            }
        }
        if piece.compressed {
            write_compressed_chunk(file, piece.buf.data(), &mut scratch)?;
        } else {
            file.write_all(piece.buf.data())?;
        }
    }
    Ok(())
}

/// Loads the savegame at `path` into `game`, rebuilding `data`'s registry
/// for whatever version the file declares.
pub fn read_saved_game(
    path: &Path,
    offset: u64,
    data: &mut SavegameData,
    game: &mut GameState,
) -> Result<(), SaveError> {
    info!("loading saved game {}", path.display());
    let mut file = File::open(path).map_err(SaveError::Read)?;
    if offset != 0 {
        file.seek(SeekFrom::Start(offset)).map_err(SaveError::Read)?;
    }
    let version = peek_version(&mut file).map_err(SaveError::Read)?;
    if version > SAVE_GAME_CURRENT_VERSION {
        error!("savegame version {version:#x} is newer than supported");
        return Err(SaveError::UnsupportedVersion(version));
    }
    info!("savegame version {version:#x}");
    data.reinit(version)?;
    read_savegame_pieces(&mut file, data).map_err(SaveError::Read)?;
    data.load_into(game).map_err(SaveError::Read)?;
    Ok(())
}

/// Writes `game` to `path` at the current format version. An I/O failure
/// partway through can leave a truncated file behind.
pub fn write_saved_game(
    path: &Path,
    data: &mut SavegameData,
    game: &GameState,
) -> Result<(), SaveError> {
    info!("saving game {}", path.display());
    data.reinit(SAVE_GAME_CURRENT_VERSION)?;
    data.save_from(game).map_err(SaveError::Write)?;
    let mut file = File::create(path).map_err(SaveError::Write)?;
    write_savegame_pieces(&mut file, data).map_err(SaveError::Write)?;
    Ok(())
}

/// Loads the scenario at `path` into `game`. Scenarios have no version
/// header; every piece must be present in full.
pub fn read_scenario(
    path: &Path,
    data: &mut ScenarioData,
    game: &mut GameState,
) -> Result<(), SaveError> {
    info!("loading scenario {}", path.display());
    let mut file = File::open(path).map_err(SaveError::Read)?;
    for piece in data.pieces_mut() {
        piece.buf.reset();
        if let Err(err) = file.read_exact(piece.buf.data_mut()) {
            error!("unable to load scenario {}: {err}", path.display());
            return Err(SaveError::Read(err));
        }
    }
    data.load_into(game).map_err(SaveError::Read)?;
    Ok(())
}

pub fn write_scenario(
    path: &Path,
    data: &mut ScenarioData,
    game: &GameState,
) -> Result<(), SaveError> {
    info!("saving scenario {}", path.display());
    data.save_from(game).map_err(SaveError::Write)?;
    let mut file = File::create(path).map_err(SaveError::Write)?;
    for piece in data.pieces_mut() {
        file.write_all(piece.buf.data()).map_err(SaveError::Write)?;
    }
    Ok(())
}

pub fn delete_saved_game(path: &Path) -> Result<(), SaveError> {
    info!("deleting saved game {}", path.display());
    fs::remove_file(path).map_err(|err| {
        error!("unable to delete {}: {err}", path.display());
        SaveError::Write(err)
    })
}

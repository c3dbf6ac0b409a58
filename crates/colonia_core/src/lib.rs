//! Save and scenario serialization engine for the Colonia city builder.
//!
//! A save file is a fixed sequence of binary regions ("pieces"), each raw or
//! zlib-compressed, whose sizes depend on the file's format version. This
//! crate owns the piece registries, the version policy that sizes them, the
//! codecs that move piece bytes in and out of subsystem state, and the file
//! transport that streams pieces to and from disk.

pub mod buffer;
pub mod compress;
pub mod error;
pub mod file_io;
pub mod piece;
pub mod savegame;
pub mod scenario;
pub mod state;
pub mod version;

pub use buffer::Buffer;
pub use error::SaveError;
pub use savegame::SavegameData;
pub use scenario::ScenarioData;
pub use state::GameState;
pub use version::{SAVE_GAME_CURRENT_VERSION, SavegameLayout};

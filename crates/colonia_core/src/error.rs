use std::error::Error;
use std::fmt;
use std::io;

/// Failure modes of a load or save operation.
///
/// `UnsupportedVersion` is deliberately separate from `Read`: the remedy for
/// the former is updating the program, not checking the file for corruption.
#[derive(Debug)]
pub enum SaveError {
    /// The file was written by a newer build than this one supports.
    UnsupportedVersion(u32),
    /// Open failure, short read, or a compressed chunk that would not expand
    /// to its declared size.
    Read(io::Error),
    /// Open-for-write or disk write failure.
    Write(io::Error),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::UnsupportedVersion(version) => write!(
                f,
                "save version {version:#x} is newer than this build supports; please update"
            ),
            SaveError::Read(err) => write!(f, "unable to read save data: {err}"),
            SaveError::Write(err) => write!(f, "unable to write save data: {err}"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SaveError::UnsupportedVersion(_) => None,
            SaveError::Read(err) | SaveError::Write(err) => Some(err),
        }
    }
}

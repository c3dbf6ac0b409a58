use serde::Serialize;

use crate::buffer::Buffer;
use crate::version::PieceSize;

/// One named, contiguous region of a save or scenario file.
///
/// Fixed pieces own a buffer of exactly their declared length. Dynamic
/// pieces start empty; the transport allocates them to the stored length on
/// read, and the owning subsystem sizes them before writing on save.
#[derive(Debug)]
pub struct FilePiece {
    pub buf: Buffer,
    pub compressed: bool,
    pub dynamic: bool,
}

impl FilePiece {
    pub fn new(size: PieceSize, compressed: bool) -> Self {
        match size {
            PieceSize::Fixed(len) => Self {
                buf: Buffer::new(len),
                compressed,
                dynamic: false,
            },
            PieceSize::Dynamic => Self {
                buf: Buffer::new(0),
                compressed,
                dynamic: true,
            },
        }
    }

    pub fn fixed(len: usize, compressed: bool) -> Self {
        Self::new(PieceSize::Fixed(len), compressed)
    }

    pub fn descriptor(&self, name: &'static str) -> PieceDescriptor {
        PieceDescriptor {
            name,
            size: self.buf.len(),
            compressed: self.compressed,
            dynamic: self.dynamic,
        }
    }
}

/// Piece metadata for inspection tools and layout tests. For dynamic pieces
/// `size` is the currently allocated length, which is 0 until a read or
/// save fills it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PieceDescriptor {
    pub name: &'static str,
    pub size: usize,
    pub compressed: bool,
    pub dynamic: bool,
}

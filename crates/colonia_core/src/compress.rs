use std::io::{self, ErrorKind, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Upper bound on a single piece, compressed or not. Bounds worst-case
/// memory for the scratch buffer and rejects absurd stored lengths.
pub const COMPRESS_BUFFER_SIZE: usize = 3_000_000;

/// Stored-length sentinel meaning "the chunk is raw, not compressed". Larger
/// than any real region size, so it is unambiguous as a marker.
pub const UNCOMPRESSED: u32 = 0x8000_0000;

/// Reusable scratch space for compressing and decompressing pieces.
///
/// One instance is shared serially across every piece of a load or save
/// call; it is not meant to be used from more than one operation at a time.
#[derive(Debug, Default)]
pub struct CompressBuffer {
    scratch: Vec<u8>,
}

impl CompressBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compresses `src` into the scratch buffer. `None` means the data did
    /// not shrink (or the encoder failed) and the caller should store it raw.
    fn compress(&mut self, src: &[u8]) -> Option<&[u8]> {
        self.scratch.clear();
        let mut encoder = ZlibEncoder::new(&mut self.scratch, Compression::default());
        if encoder.write_all(src).is_err() {
            return None;
        }
        if encoder.finish().is_err() {
            return None;
        }
        if self.scratch.is_empty()
            || self.scratch.len() >= src.len()
            || self.scratch.len() >= COMPRESS_BUFFER_SIZE
        {
            return None;
        }
        Some(&self.scratch)
    }
}

pub(crate) fn read_u32_le(reader: &mut impl Read) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

pub(crate) fn write_u32_le(writer: &mut impl Write, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Reads one compressed chunk and expands it into `dst`.
///
/// Chunk format: a 4-byte little-endian stored length, then either raw bytes
/// (when the length is the `UNCOMPRESSED` sentinel, count = `dst.len()`) or
/// a zlib payload of that length. A payload that does not expand to exactly
/// `dst.len()` bytes is a hard read error.
pub fn read_compressed_chunk(
    reader: &mut impl Read,
    dst: &mut [u8],
    scratch: &mut CompressBuffer,
) -> io::Result<()> {
    if dst.len() > COMPRESS_BUFFER_SIZE {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("piece of {} bytes exceeds the compression ceiling", dst.len()),
        ));
    }
    let stored_size = read_u32_le(reader)?;
    if stored_size == UNCOMPRESSED {
        reader.read_exact(dst)?;
        return Ok(());
    }
    let stored_size = stored_size as usize;
    if stored_size > COMPRESS_BUFFER_SIZE {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("compressed chunk of {stored_size} bytes exceeds the compression ceiling"),
        ));
    }
    scratch.scratch.resize(stored_size, 0);
    reader.read_exact(&mut scratch.scratch)?;

    let mut decoder = ZlibDecoder::new(scratch.scratch.as_slice());
    let mut expanded = Vec::with_capacity(dst.len());
    decoder.read_to_end(&mut expanded)?;
    if expanded.len() != dst.len() {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!(
                "compressed chunk expanded to {} bytes, expected {}",
                expanded.len(),
                dst.len()
            ),
        ));
    }
    dst.copy_from_slice(&expanded);
    Ok(())
}

/// Writes `src` as one compressed chunk, falling back to the `UNCOMPRESSED`
/// sentinel plus raw bytes when compression fails or does not pay off.
pub fn write_compressed_chunk(
    writer: &mut impl Write,
    src: &[u8],
    scratch: &mut CompressBuffer,
) -> io::Result<()> {
    if src.len() > COMPRESS_BUFFER_SIZE {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("piece of {} bytes exceeds the compression ceiling", src.len()),
        ));
    }
    match scratch.compress(src) {
        Some(compressed) => {
            let size = compressed.len() as u32;
            write_u32_le(writer, size)?;
            writer.write_all(compressed)?;
        }
        None => {
            write_u32_le(writer, UNCOMPRESSED)?;
            writer.write_all(src)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        COMPRESS_BUFFER_SIZE, CompressBuffer, UNCOMPRESSED, read_compressed_chunk,
        write_compressed_chunk,
    };

    /// Deterministic high-entropy bytes that zlib cannot shrink.
    fn noise(len: usize) -> Vec<u8> {
        let mut state = 0x2545F491_4F6CDD1Du64;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 32) as u8
            })
            .collect()
    }

    #[test]
    fn compressible_data_round_trips() {
        let src = vec![7u8; 4096];
        let mut scratch = CompressBuffer::new();
        let mut stream = Vec::new();
        write_compressed_chunk(&mut stream, &src, &mut scratch).unwrap();
        assert!(stream.len() < src.len());

        let stored = u32::from_le_bytes(stream[0..4].try_into().unwrap());
        assert_ne!(stored, UNCOMPRESSED);

        let mut dst = vec![0u8; src.len()];
        read_compressed_chunk(&mut stream.as_slice(), &mut dst, &mut scratch).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn incompressible_data_falls_back_to_raw() {
        let src = noise(512);
        let mut scratch = CompressBuffer::new();
        let mut stream = Vec::new();
        write_compressed_chunk(&mut stream, &src, &mut scratch).unwrap();

        let stored = u32::from_le_bytes(stream[0..4].try_into().unwrap());
        assert_eq!(stored, UNCOMPRESSED);
        assert_eq!(&stream[4..], src.as_slice());

        let mut dst = vec![0u8; src.len()];
        read_compressed_chunk(&mut stream.as_slice(), &mut dst, &mut scratch).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn oversized_piece_is_rejected_on_write() {
        let src = vec![0u8; COMPRESS_BUFFER_SIZE + 1];
        let mut scratch = CompressBuffer::new();
        let mut stream = Vec::new();
        assert!(write_compressed_chunk(&mut stream, &src, &mut scratch).is_err());
        assert!(stream.is_empty());
    }

    #[test]
    fn oversized_piece_is_rejected_on_read() {
        let stream = UNCOMPRESSED.to_le_bytes().to_vec();
        let mut dst = vec![0u8; COMPRESS_BUFFER_SIZE + 1];
        let mut scratch = CompressBuffer::new();
        assert!(read_compressed_chunk(&mut stream.as_slice(), &mut dst, &mut scratch).is_err());
    }

    #[test]
    fn oversized_stored_length_is_rejected() {
        let mut stream = Vec::new();
        stream.extend(((COMPRESS_BUFFER_SIZE + 1) as u32).to_le_bytes());
        let mut dst = vec![0u8; 16];
        let mut scratch = CompressBuffer::new();
        assert!(read_compressed_chunk(&mut stream.as_slice(), &mut dst, &mut scratch).is_err());
    }

    #[test]
    fn wrong_expanded_size_is_a_read_error() {
        let src = vec![7u8; 4096];
        let mut scratch = CompressBuffer::new();
        let mut stream = Vec::new();
        write_compressed_chunk(&mut stream, &src, &mut scratch).unwrap();

        // Declare a destination one byte short of what the payload expands to.
        let mut dst = vec![0u8; src.len() - 1];
        assert!(read_compressed_chunk(&mut stream.as_slice(), &mut dst, &mut scratch).is_err());
    }
}

use std::io::{self, ErrorKind};

/// Fixed-capacity byte region with a read/write cursor.
///
/// All scalar access is little-endian, matching the legacy save format.
/// Reads and writes past the declared length fail with `UnexpectedEof`;
/// `skip` clamps at the end instead, because the savegame end marker is
/// consumed with a skip that intentionally overshoots its piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Vec<u8>,
    index: usize,
}

impl Buffer {
    /// A zero-filled buffer of exactly `size` bytes, cursor at 0.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
            index: 0,
        }
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Rewinds the cursor without touching the contents.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn require(&self, count: usize) -> io::Result<()> {
        if self.remaining() < count {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "buffer access of {count} bytes at offset {} exceeds length {}",
                    self.index,
                    self.data.len()
                ),
            ));
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.require(1)?;
        let value = self.data[self.index];
        self.index += 1;
        Ok(value)
    }

    pub fn read_i8(&mut self) -> io::Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        self.require(2)?;
        let bytes = [self.data[self.index], self.data[self.index + 1]];
        self.index += 2;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn read_i16(&mut self) -> io::Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        self.require(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.index..self.index + 4]);
        self.index += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_raw(&mut self, out: &mut [u8]) -> io::Result<()> {
        self.require(out.len())?;
        out.copy_from_slice(&self.data[self.index..self.index + out.len()]);
        self.index += out.len();
        Ok(())
    }

    pub fn read_bytes(&mut self, count: usize) -> io::Result<&[u8]> {
        self.require(count)?;
        let slice = &self.data[self.index..self.index + count];
        self.index += count;
        Ok(slice)
    }

    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.require(1)?;
        self.data[self.index] = value;
        self.index += 1;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> io::Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.require(2)?;
        self.data[self.index..self.index + 2].copy_from_slice(&value.to_le_bytes());
        self.index += 2;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> io::Result<()> {
        self.write_u16(value as u16)
    }

    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.require(4)?;
        self.data[self.index..self.index + 4].copy_from_slice(&value.to_le_bytes());
        self.index += 4;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_u32(value as u32)
    }

    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.require(bytes.len())?;
        self.data[self.index..self.index + bytes.len()].copy_from_slice(bytes);
        self.index += bytes.len();
        Ok(())
    }

    /// Advances the cursor by `count` bytes, clamping at the end.
    pub fn skip(&mut self, count: usize) {
        self.index = (self.index + count).min(self.data.len());
    }

    pub fn at_end(&self) -> bool {
        self.index == self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Buffer;
    use std::io::ErrorKind;

    #[test]
    fn scalars_are_little_endian() {
        let mut buf = Buffer::new(8);
        buf.write_u16(0x1234).unwrap();
        buf.write_u32(0xAABBCCDD).unwrap();
        assert_eq!(buf.data(), &[0x34, 0x12, 0xDD, 0xCC, 0xBB, 0xAA, 0, 0]);

        buf.reset();
        assert_eq!(buf.read_u16().unwrap(), 0x1234);
        assert_eq!(buf.read_u32().unwrap(), 0xAABBCCDD);
    }

    #[test]
    fn signed_round_trip() {
        let mut buf = Buffer::new(7);
        buf.write_i8(-5).unwrap();
        buf.write_i16(-300).unwrap();
        buf.write_i32(-70000).unwrap();
        buf.reset();
        assert_eq!(buf.read_i8().unwrap(), -5);
        assert_eq!(buf.read_i16().unwrap(), -300);
        assert_eq!(buf.read_i32().unwrap(), -70000);
    }

    #[test]
    fn read_past_end_fails_without_advancing() {
        let mut buf = Buffer::new(3);
        let err = buf.read_u32().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.read_u16().unwrap(), 0);
    }

    #[test]
    fn write_past_end_fails() {
        let mut buf = Buffer::new(2);
        assert!(buf.write_u32(1).is_err());
        assert!(buf.write_u16(1).is_ok());
        assert!(buf.write_u8(1).is_err());
    }

    #[test]
    fn skip_clamps_at_end() {
        let mut buf = Buffer::new(10);
        buf.skip(4);
        assert_eq!(buf.position(), 4);
        buf.skip(100);
        assert_eq!(buf.position(), 10);
        assert!(buf.at_end());
    }

    #[test]
    fn reset_rewinds_without_reallocating() {
        let mut buf = Buffer::new(4);
        buf.write_u32(99).unwrap();
        assert!(buf.at_end());
        buf.reset();
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.read_u32().unwrap(), 99);
    }

    #[test]
    fn raw_read_write() {
        let mut buf = Buffer::new(4);
        buf.write_raw(&[1, 2, 3, 4]).unwrap();
        buf.reset();
        let mut out = [0u8; 4];
        buf.read_raw(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
        assert!(buf.read_bytes(1).is_err());
    }
}

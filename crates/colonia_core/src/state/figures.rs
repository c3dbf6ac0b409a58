use std::io;

use crate::buffer::Buffer;

/// Per-figure record width in the classic fixed-array encoding.
pub const FIGURE_RECORD_SIZE: usize = 128;
/// Record width after the dynamic-format switch.
pub const FIGURE_RECORD_SIZE_EXTENDED: usize = 160;

pub const FIGURE_NAME_SEED_COUNT: usize = 21;
const TRADER_DATA_SIZE: usize = 4800;

/// Figures, their routing data, traders and name seeds.
///
/// Records are kept as opaque bytes; the record width is the only part of
/// their encoding the serialization engine needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureState {
    pub records: Vec<u8>,
    pub record_size: usize,
    pub sequence: u32,
    pub route_figure_ids: Vec<u8>,
    pub route_paths: Vec<u8>,
    pub name_seeds: [i32; FIGURE_NAME_SEED_COUNT],
    pub next_trader_id: i32,
    pub traders: Vec<u8>,
}

impl Default for FigureState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            record_size: FIGURE_RECORD_SIZE_EXTENDED,
            sequence: 0,
            route_figure_ids: Vec::new(),
            route_paths: Vec::new(),
            name_seeds: [0; FIGURE_NAME_SEED_COUNT],
            next_trader_id: 0,
            traders: vec![0; TRADER_DATA_SIZE],
        }
    }
}

impl FigureState {
    pub fn count(&self) -> usize {
        if self.record_size == 0 {
            return 0;
        }
        self.records.len() / self.record_size
    }

    pub fn load_state(
        &mut self,
        figures: &mut Buffer,
        sequence: &mut Buffer,
        extended: bool,
    ) -> io::Result<()> {
        self.record_size = if extended {
            FIGURE_RECORD_SIZE_EXTENDED
        } else {
            FIGURE_RECORD_SIZE
        };
        self.records = figures.read_bytes(figures.remaining())?.to_vec();
        self.sequence = sequence.read_u32()?;
        Ok(())
    }

    pub fn save_state(&self, figures: &mut Buffer, sequence: &mut Buffer) -> io::Result<()> {
        *figures = Buffer::new(self.records.len());
        figures.write_raw(&self.records)?;
        sequence.write_u32(self.sequence)
    }

    pub fn load_route_state(
        &mut self,
        route_figures: &mut Buffer,
        route_paths: &mut Buffer,
    ) -> io::Result<()> {
        self.route_figure_ids = route_figures.read_bytes(route_figures.remaining())?.to_vec();
        self.route_paths = route_paths.read_bytes(route_paths.remaining())?.to_vec();
        Ok(())
    }

    pub fn save_route_state(
        &self,
        route_figures: &mut Buffer,
        route_paths: &mut Buffer,
    ) -> io::Result<()> {
        *route_figures = Buffer::new(self.route_figure_ids.len());
        route_figures.write_raw(&self.route_figure_ids)?;
        *route_paths = Buffer::new(self.route_paths.len());
        route_paths.write_raw(&self.route_paths)
    }

    pub fn load_name_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for seed in &mut self.name_seeds {
            *seed = buf.read_i32()?;
        }
        Ok(())
    }

    pub fn save_name_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for &seed in &self.name_seeds {
            buf.write_i32(seed)?;
        }
        Ok(())
    }

    pub fn load_trader_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.next_trader_id = buf.read_i32()?;
        buf.read_raw(&mut self.traders)
    }

    pub fn save_trader_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.next_trader_id)?;
        buf.write_raw(&self.traders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_width_follows_the_extended_flag() {
        let mut classic = Buffer::from_vec(vec![1; FIGURE_RECORD_SIZE * 3]);
        let mut sequence = Buffer::from_vec(9u32.to_le_bytes().to_vec());
        let mut state = FigureState::default();
        state.load_state(&mut classic, &mut sequence, false).unwrap();
        assert_eq!(state.record_size, FIGURE_RECORD_SIZE);
        assert_eq!(state.count(), 3);
        assert_eq!(state.sequence, 9);

        let mut extended = Buffer::from_vec(vec![2; FIGURE_RECORD_SIZE_EXTENDED * 2]);
        let mut sequence = Buffer::from_vec(4u32.to_le_bytes().to_vec());
        state.load_state(&mut extended, &mut sequence, true).unwrap();
        assert_eq!(state.count(), 2);
    }

    #[test]
    fn save_sizes_the_dynamic_buffers() {
        let mut state = FigureState::default();
        state.records = vec![5; FIGURE_RECORD_SIZE_EXTENDED];
        state.route_figure_ids = vec![1, 2, 3, 4];
        state.route_paths = vec![9; 500];

        let mut figures = Buffer::new(0);
        let mut sequence = Buffer::new(4);
        state.save_state(&mut figures, &mut sequence).unwrap();
        assert_eq!(figures.len(), FIGURE_RECORD_SIZE_EXTENDED);

        let mut route_figures = Buffer::new(0);
        let mut route_paths = Buffer::new(0);
        state
            .save_route_state(&mut route_figures, &mut route_paths)
            .unwrap();
        assert_eq!(route_figures.len(), 4);
        assert_eq!(route_paths.len(), 500);
    }
}

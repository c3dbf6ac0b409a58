use std::io;

use crate::buffer::Buffer;

/// Declared size of the city snapshot blob.
pub const CITY_DATA_SIZE: usize = 36136;

const CULTURE_COVERAGE_COUNT: usize = 15;
const MESSAGE_DATA_SIZE: usize = 16000;
const POPULATION_MESSAGE_SIZE: usize = 10;
const MESSAGE_CATEGORY_COUNT: usize = 20;
const CITY_SOUND_DATA_SIZE: usize = 8960;

/// In-game message log and its bookkeeping counters.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageState {
    pub data: Vec<u8>,
    pub next_message_sequence: i32,
    pub total_messages: i32,
    pub current_message_id: i32,
    pub population_shown: Vec<u8>,
    pub counts: [i32; MESSAGE_CATEGORY_COUNT],
    pub delays: [i32; MESSAGE_CATEGORY_COUNT],
}

impl Default for MessageState {
    fn default() -> Self {
        Self {
            data: vec![0; MESSAGE_DATA_SIZE],
            next_message_sequence: 0,
            total_messages: 0,
            current_message_id: 0,
            population_shown: vec![0; POPULATION_MESSAGE_SIZE],
            counts: [0; MESSAGE_CATEGORY_COUNT],
            delays: [0; MESSAGE_CATEGORY_COUNT],
        }
    }
}

/// The city-wide economic and demographic snapshot, plus the small faction
/// and entry/exit pieces that travel with it.
#[derive(Debug, Clone, PartialEq)]
pub struct CityState {
    pub data: Vec<u8>,
    /// Whether the snapshot encodes import and export limits separately.
    pub separate_import_export: bool,
    pub faction_id: i32,
    pub faction_reserved: u16,
    pub graph_order: [i32; 2],
    pub entry_exit_xy: [i32; 4],
    pub entry_exit_grid_offset: [i32; 2],
    pub culture_coverage: [i32; CULTURE_COVERAGE_COUNT],
    pub messages: MessageState,
    pub sounds: Vec<u8>,
}

impl Default for CityState {
    fn default() -> Self {
        Self {
            data: vec![0; CITY_DATA_SIZE],
            separate_import_export: true,
            faction_id: 0,
            faction_reserved: 0,
            graph_order: [0; 2],
            entry_exit_xy: [0; 4],
            entry_exit_grid_offset: [0; 2],
            culture_coverage: [0; CULTURE_COVERAGE_COUNT],
            messages: MessageState::default(),
            sounds: vec![0; CITY_SOUND_DATA_SIZE],
        }
    }
}

impl CityState {
    pub fn load_state(
        &mut self,
        data: &mut Buffer,
        faction: &mut Buffer,
        faction_unknown: &mut Buffer,
        graph_order: &mut Buffer,
        entry_exit_xy: &mut Buffer,
        entry_exit_grid_offset: &mut Buffer,
        separate_import_export: bool,
    ) -> io::Result<()> {
        data.read_raw(&mut self.data)?;
        self.separate_import_export = separate_import_export;
        self.faction_id = faction.read_i32()?;
        self.faction_reserved = faction_unknown.read_u16()?;
        for value in &mut self.graph_order {
            *value = graph_order.read_i32()?;
        }
        for value in &mut self.entry_exit_xy {
            *value = entry_exit_xy.read_i32()?;
        }
        for value in &mut self.entry_exit_grid_offset {
            *value = entry_exit_grid_offset.read_i32()?;
        }
        Ok(())
    }

    pub fn save_state(
        &self,
        data: &mut Buffer,
        faction: &mut Buffer,
        faction_unknown: &mut Buffer,
        graph_order: &mut Buffer,
        entry_exit_xy: &mut Buffer,
        entry_exit_grid_offset: &mut Buffer,
    ) -> io::Result<()> {
        data.write_raw(&self.data)?;
        faction.write_i32(self.faction_id)?;
        faction_unknown.write_u16(self.faction_reserved)?;
        for &value in &self.graph_order {
            graph_order.write_i32(value)?;
        }
        for &value in &self.entry_exit_xy {
            entry_exit_xy.write_i32(value)?;
        }
        for &value in &self.entry_exit_grid_offset {
            entry_exit_grid_offset.write_i32(value)?;
        }
        Ok(())
    }

    pub fn load_culture_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for value in &mut self.culture_coverage {
            *value = buf.read_i32()?;
        }
        Ok(())
    }

    pub fn save_culture_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for &value in &self.culture_coverage {
            buf.write_i32(value)?;
        }
        Ok(())
    }

    pub fn load_message_state(
        &mut self,
        messages: &mut Buffer,
        extra: &mut Buffer,
        counts: &mut Buffer,
        delays: &mut Buffer,
        population: &mut Buffer,
    ) -> io::Result<()> {
        messages.read_raw(&mut self.messages.data)?;
        self.messages.next_message_sequence = extra.read_i32()?;
        self.messages.total_messages = extra.read_i32()?;
        self.messages.current_message_id = extra.read_i32()?;
        for value in &mut self.messages.counts {
            *value = counts.read_i32()?;
        }
        for value in &mut self.messages.delays {
            *value = delays.read_i32()?;
        }
        population.read_raw(&mut self.messages.population_shown)?;
        Ok(())
    }

    pub fn save_message_state(
        &self,
        messages: &mut Buffer,
        extra: &mut Buffer,
        counts: &mut Buffer,
        delays: &mut Buffer,
        population: &mut Buffer,
    ) -> io::Result<()> {
        messages.write_raw(&self.messages.data)?;
        extra.write_i32(self.messages.next_message_sequence)?;
        extra.write_i32(self.messages.total_messages)?;
        extra.write_i32(self.messages.current_message_id)?;
        for &value in &self.messages.counts {
            counts.write_i32(value)?;
        }
        for &value in &self.messages.delays {
            delays.write_i32(value)?;
        }
        population.write_raw(&self.messages.population_shown)
    }

    pub fn load_sound_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        buf.read_raw(&mut self.sounds)
    }

    pub fn save_sound_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_raw(&self.sounds)
    }
}

/// Camera position and map orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CityView {
    pub orientation: i32,
    pub camera_x: i32,
    pub camera_y: i32,
}

impl CityView {
    pub fn load_state(&mut self, orientation: &mut Buffer, camera: &mut Buffer) -> io::Result<()> {
        self.orientation = orientation.read_i32()?;
        self.load_scenario_state(camera)
    }

    pub fn save_state(&self, orientation: &mut Buffer, camera: &mut Buffer) -> io::Result<()> {
        orientation.write_i32(self.orientation)?;
        self.save_scenario_state(camera)
    }

    /// Scenario files carry only the camera position.
    pub fn load_scenario_state(&mut self, camera: &mut Buffer) -> io::Result<()> {
        self.camera_x = camera.read_i32()?;
        self.camera_y = camera.read_i32()?;
        Ok(())
    }

    pub fn save_scenario_state(&self, camera: &mut Buffer) -> io::Result<()> {
        camera.write_i32(self.camera_x)?;
        camera.write_i32(self.camera_y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameTime {
    pub tick: i32,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub total_days: i32,
}

impl GameTime {
    pub fn load_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.tick = buf.read_i32()?;
        self.day = buf.read_i32()?;
        self.month = buf.read_i32()?;
        self.year = buf.read_i32()?;
        self.total_days = buf.read_i32()?;
        Ok(())
    }

    pub fn save_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.tick)?;
        buf.write_i32(self.day)?;
        buf.write_i32(self.month)?;
        buf.write_i32(self.year)?;
        buf.write_i32(self.total_days)
    }
}

/// Global RNG state, stored as two 4-byte seeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomState {
    pub iv: [u32; 2],
}

impl RandomState {
    pub fn load_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.iv[0] = buf.read_u32()?;
        self.iv[1] = buf.read_u32()?;
        Ok(())
    }

    pub fn save_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_u32(self.iv[0])?;
        buf.write_u32(self.iv[1])
    }
}

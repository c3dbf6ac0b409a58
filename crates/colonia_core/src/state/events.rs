use std::io;

use crate::buffer::Buffer;

/// Encoded size of the scenario rules blob.
pub const SCENARIO_RULES_SIZE: usize = 1720;

pub const PLAYER_NAME_SIZE: usize = 64;
pub const SCENARIO_NAME_SIZE: usize = 65;

const EARTHQUAKE_DATA_SIZE: usize = 60;
const INVASION_WARNING_DATA_SIZE: usize = 3232;
const TUTORIAL_PART1_SIZE: usize = 32;
const TUTORIAL_PART2_SIZE: usize = 4;
const TUTORIAL_PART3_SIZE: usize = 4;

/// Player-facing scenario metadata and campaign progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSettings {
    pub campaign_mission: i32,
    pub starting_favor: i32,
    pub personal_savings: i32,
    pub campaign_rank: i32,
    pub is_custom: bool,
    pub player_name: Vec<u8>,
    pub scenario_name: Vec<u8>,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            campaign_mission: 0,
            starting_favor: 0,
            personal_savings: 0,
            campaign_rank: 0,
            is_custom: false,
            player_name: vec![0; PLAYER_NAME_SIZE],
            scenario_name: vec![0; SCENARIO_NAME_SIZE],
        }
    }
}

impl ScenarioSettings {
    pub fn load_mission_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.campaign_mission = buf.read_i32()?;
        Ok(())
    }

    pub fn save_mission_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.campaign_mission)
    }

    pub fn load_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.starting_favor = buf.read_i32()?;
        self.personal_savings = buf.read_i32()?;
        self.campaign_rank = buf.read_i32()?;
        Ok(())
    }

    pub fn save_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.starting_favor)?;
        buf.write_i32(self.personal_savings)?;
        buf.write_i32(self.campaign_rank)
    }

    pub fn load_is_custom_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.is_custom = buf.read_i32()? != 0;
        Ok(())
    }

    pub fn save_is_custom_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.is_custom as i32)
    }

    pub fn load_player_name_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        buf.read_raw(&mut self.player_name)
    }

    pub fn save_player_name_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_raw(&self.player_name)
    }

    pub fn load_scenario_name_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        buf.read_raw(&mut self.scenario_name)
    }

    pub fn save_scenario_name_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_raw(&self.scenario_name)
    }
}

/// Map, win-condition and event rules defined by the scenario. The blob is
/// kept opaque; the engine only moves it between files and memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRules {
    pub data: Vec<u8>,
}

impl Default for ScenarioRules {
    fn default() -> Self {
        Self { data: vec![0; SCENARIO_RULES_SIZE] }
    }
}

impl ScenarioRules {
    pub fn load_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        buf.read_raw(&mut self.data)
    }

    pub fn save_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_raw(&self.data)
    }
}

/// Scripted and random events: invasions, earthquakes, emperor changes,
/// gladiator revolts and the tutorial gates.
#[derive(Debug, Clone, PartialEq)]
pub struct EventState {
    pub max_game_year: i32,
    pub earthquake: Vec<u8>,
    pub emperor_change_year: i32,
    pub emperor_change_month: i32,
    pub emperor_change_state: i32,
    pub gladiator_revolt: [i32; 4],
    pub last_invasion_id: u16,
    pub invasion_warnings: Vec<u8>,
    pub tutorial_part1: Vec<u8>,
    pub tutorial_part2: Vec<u8>,
    pub tutorial_part3: Vec<u8>,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            max_game_year: 0,
            earthquake: vec![0; EARTHQUAKE_DATA_SIZE],
            emperor_change_year: 0,
            emperor_change_month: 0,
            emperor_change_state: 0,
            gladiator_revolt: [0; 4],
            last_invasion_id: 0,
            invasion_warnings: vec![0; INVASION_WARNING_DATA_SIZE],
            tutorial_part1: vec![0; TUTORIAL_PART1_SIZE],
            tutorial_part2: vec![0; TUTORIAL_PART2_SIZE],
            tutorial_part3: vec![0; TUTORIAL_PART3_SIZE],
        }
    }
}

impl EventState {
    pub fn load_max_year_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.max_game_year = buf.read_i32()?;
        Ok(())
    }

    pub fn save_max_year_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.max_game_year)
    }

    pub fn load_earthquake_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        buf.read_raw(&mut self.earthquake)
    }

    pub fn save_earthquake_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_raw(&self.earthquake)
    }

    pub fn load_emperor_change_state(
        &mut self,
        time: &mut Buffer,
        state: &mut Buffer,
    ) -> io::Result<()> {
        self.emperor_change_year = time.read_i32()?;
        self.emperor_change_month = time.read_i32()?;
        self.emperor_change_state = state.read_i32()?;
        Ok(())
    }

    pub fn save_emperor_change_state(
        &self,
        time: &mut Buffer,
        state: &mut Buffer,
    ) -> io::Result<()> {
        time.write_i32(self.emperor_change_year)?;
        time.write_i32(self.emperor_change_month)?;
        state.write_i32(self.emperor_change_state)
    }

    pub fn load_gladiator_revolt_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for value in &mut self.gladiator_revolt {
            *value = buf.read_i32()?;
        }
        Ok(())
    }

    pub fn save_gladiator_revolt_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for &value in &self.gladiator_revolt {
            buf.write_i32(value)?;
        }
        Ok(())
    }

    pub fn load_invasion_state(
        &mut self,
        warnings: &mut Buffer,
        last_invasion_id: &mut Buffer,
    ) -> io::Result<()> {
        warnings.read_raw(&mut self.invasion_warnings)?;
        self.last_invasion_id = last_invasion_id.read_u16()?;
        Ok(())
    }

    pub fn save_invasion_state(
        &self,
        warnings: &mut Buffer,
        last_invasion_id: &mut Buffer,
    ) -> io::Result<()> {
        warnings.write_raw(&self.invasion_warnings)?;
        last_invasion_id.write_u16(self.last_invasion_id)
    }

    pub fn load_tutorial_state(
        &mut self,
        part1: &mut Buffer,
        part2: &mut Buffer,
        part3: &mut Buffer,
    ) -> io::Result<()> {
        part1.read_raw(&mut self.tutorial_part1)?;
        part2.read_raw(&mut self.tutorial_part2)?;
        part3.read_raw(&mut self.tutorial_part3)
    }

    pub fn save_tutorial_state(
        &self,
        part1: &mut Buffer,
        part2: &mut Buffer,
        part3: &mut Buffer,
    ) -> io::Result<()> {
        part1.write_raw(&self.tutorial_part1)?;
        part2.write_raw(&self.tutorial_part2)?;
        part3.write_raw(&self.tutorial_part3)
    }
}

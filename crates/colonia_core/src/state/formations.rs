use std::io;

use crate::buffer::Buffer;

/// Per-formation record width in the classic fixed-array encoding.
pub const FORMATION_RECORD_SIZE: usize = 128;
/// Record width after the dynamic-format switch.
pub const FORMATION_RECORD_SIZE_EXTENDED: usize = 160;

const ENEMY_ARMY_DATA_SIZE: usize = 900;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnemyArmyTotals {
    pub num_armies: i32,
    pub num_soldiers: i32,
    pub total_strength: i32,
    pub current_attack_priority: i32,
    pub days_since_last_attack: i32,
}

/// Military formations and the invading armies attached to them.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationState {
    pub records: Vec<u8>,
    pub record_size: usize,
    pub id_last_in_use: i32,
    pub id_last_legion: i32,
    pub num_legions: i32,
    pub enemy_armies: Vec<u8>,
    pub enemy_totals: EnemyArmyTotals,
}

impl Default for FormationState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            record_size: FORMATION_RECORD_SIZE_EXTENDED,
            id_last_in_use: 0,
            id_last_legion: 0,
            num_legions: 0,
            enemy_armies: vec![0; ENEMY_ARMY_DATA_SIZE],
            enemy_totals: EnemyArmyTotals::default(),
        }
    }
}

impl FormationState {
    pub fn count(&self) -> usize {
        if self.record_size == 0 {
            return 0;
        }
        self.records.len() / self.record_size
    }

    pub fn load_state(
        &mut self,
        formations: &mut Buffer,
        totals: &mut Buffer,
        extended: bool,
    ) -> io::Result<()> {
        self.record_size = if extended {
            FORMATION_RECORD_SIZE_EXTENDED
        } else {
            FORMATION_RECORD_SIZE
        };
        self.records = formations.read_bytes(formations.remaining())?.to_vec();
        self.id_last_in_use = totals.read_i32()?;
        self.id_last_legion = totals.read_i32()?;
        self.num_legions = totals.read_i32()?;
        Ok(())
    }

    pub fn save_state(&self, formations: &mut Buffer, totals: &mut Buffer) -> io::Result<()> {
        *formations = Buffer::new(self.records.len());
        formations.write_raw(&self.records)?;
        totals.write_i32(self.id_last_in_use)?;
        totals.write_i32(self.id_last_legion)?;
        totals.write_i32(self.num_legions)
    }

    pub fn load_enemy_army_state(
        &mut self,
        armies: &mut Buffer,
        totals: &mut Buffer,
    ) -> io::Result<()> {
        armies.read_raw(&mut self.enemy_armies)?;
        self.enemy_totals.num_armies = totals.read_i32()?;
        self.enemy_totals.num_soldiers = totals.read_i32()?;
        self.enemy_totals.total_strength = totals.read_i32()?;
        self.enemy_totals.current_attack_priority = totals.read_i32()?;
        self.enemy_totals.days_since_last_attack = totals.read_i32()?;
        Ok(())
    }

    pub fn save_enemy_army_state(&self, armies: &mut Buffer, totals: &mut Buffer) -> io::Result<()> {
        armies.write_raw(&self.enemy_armies)?;
        totals.write_i32(self.enemy_totals.num_armies)?;
        totals.write_i32(self.enemy_totals.num_soldiers)?;
        totals.write_i32(self.enemy_totals.total_strength)?;
        totals.write_i32(self.enemy_totals.current_attack_priority)?;
        totals.write_i32(self.enemy_totals.days_since_last_attack)
    }
}

use std::io;

use crate::buffer::Buffer;

/// Per-building record width in the classic fixed-array encoding.
pub const BUILDING_RECORD_SIZE: usize = 128;
/// Record width after the dynamic-format switch.
pub const BUILDING_RECORD_SIZE_EXTENDED: usize = 160;

/// Encoded size of one monument delivery order.
pub const MONUMENT_DELIVERY_SIZE: usize = 16;

pub const GRANARY_CAPACITY_ORIGINAL: u32 = 2400;
pub const GRANARY_CAPACITY_CURRENT: u32 = 3200;

pub const BUILDING_TYPE_GRANARY: u16 = 61;

const BUILDING_STATE_UNUSED: u8 = 0;

// Offsets into a building record shared by both record widths.
const RECORD_OFFSET_STATE: usize = 0;
const RECORD_OFFSET_TYPE: usize = 2;
const RECORD_OFFSET_CAPACITY: usize = 8;

const COUNT_CULTURE1: usize = 33;
const COUNT_INDUSTRY: usize = 32;
const COUNT_CULTURE2: usize = 8;
const COUNT_CULTURE3: usize = 10;
const COUNT_MILITARY: usize = 4;
const COUNT_SUPPORT: usize = 6;

/// Cached per-category building tallies. Older files stored these in six
/// fixed-size pieces; newer files size each piece by its length prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingCounts {
    pub culture1: Vec<i32>,
    pub industry: Vec<i32>,
    pub culture2: Vec<i32>,
    pub culture3: Vec<i32>,
    pub military: Vec<i32>,
    pub support: Vec<i32>,
}

impl Default for BuildingCounts {
    fn default() -> Self {
        Self {
            culture1: vec![0; COUNT_CULTURE1],
            industry: vec![0; COUNT_INDUSTRY],
            culture2: vec![0; COUNT_CULTURE2],
            culture3: vec![0; COUNT_CULTURE3],
            military: vec![0; COUNT_MILITARY],
            support: vec![0; COUNT_SUPPORT],
        }
    }
}

fn read_counts(buf: &mut Buffer, dynamic: bool, fixed_len: usize) -> io::Result<Vec<i32>> {
    let len = if dynamic { buf.len() / 4 } else { fixed_len };
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(buf.read_i32()?);
    }
    Ok(values)
}

fn write_counts(buf: &mut Buffer, values: &[i32]) -> io::Result<()> {
    *buf = Buffer::new(values.len() * 4);
    for &value in values {
        buf.write_i32(value)?;
    }
    Ok(())
}

impl BuildingCounts {
    pub fn load_state(
        &mut self,
        culture1: &mut Buffer,
        industry: &mut Buffer,
        culture2: &mut Buffer,
        culture3: &mut Buffer,
        military: &mut Buffer,
        support: &mut Buffer,
        dynamic: bool,
    ) -> io::Result<()> {
        self.culture1 = read_counts(culture1, dynamic, COUNT_CULTURE1)?;
        self.industry = read_counts(industry, dynamic, COUNT_INDUSTRY)?;
        self.culture2 = read_counts(culture2, dynamic, COUNT_CULTURE2)?;
        self.culture3 = read_counts(culture3, dynamic, COUNT_CULTURE3)?;
        self.military = read_counts(military, dynamic, COUNT_MILITARY)?;
        self.support = read_counts(support, dynamic, COUNT_SUPPORT)?;
        Ok(())
    }

    pub fn save_state(
        &self,
        culture1: &mut Buffer,
        industry: &mut Buffer,
        culture2: &mut Buffer,
        culture3: &mut Buffer,
        military: &mut Buffer,
        support: &mut Buffer,
    ) -> io::Result<()> {
        write_counts(culture1, &self.culture1)?;
        write_counts(industry, &self.industry)?;
        write_counts(culture2, &self.culture2)?;
        write_counts(culture3, &self.culture3)?;
        write_counts(military, &self.military)?;
        write_counts(support, &self.support)
    }
}

/// Burning, small and large building work lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingLists {
    pub burning: Vec<u16>,
    pub small: Vec<u16>,
    pub large: Vec<u16>,
    pub burning_total: i32,
}

fn read_id_list(buf: &mut Buffer) -> io::Result<Vec<u16>> {
    let mut ids = Vec::with_capacity(buf.len() / 2);
    while buf.remaining() >= 2 {
        ids.push(buf.read_u16()?);
    }
    Ok(ids)
}

fn write_id_list(buf: &mut Buffer, ids: &[u16]) -> io::Result<()> {
    *buf = Buffer::new(ids.len() * 2);
    for &id in ids {
        buf.write_u16(id)?;
    }
    Ok(())
}

impl BuildingLists {
    pub fn load_state(
        &mut self,
        burning: &mut Buffer,
        small: &mut Buffer,
        large: &mut Buffer,
        totals: &mut Buffer,
        legacy_totals: bool,
    ) -> io::Result<()> {
        self.burning = read_id_list(burning)?;
        self.small = read_id_list(small)?;
        self.large = read_id_list(large)?;
        self.burning_total = totals.read_i32()?;
        if legacy_totals {
            // The old piece carried the list capacity after the total.
            totals.skip(4);
        }
        Ok(())
    }

    pub fn save_state(
        &self,
        burning: &mut Buffer,
        small: &mut Buffer,
        large: &mut Buffer,
        totals: &mut Buffer,
    ) -> io::Result<()> {
        write_id_list(burning, &self.burning)?;
        write_id_list(small, &self.small)?;
        write_id_list(large, &self.large)?;
        totals.write_i32(self.burning_total)
    }
}

/// One outstanding delivery of construction material to a monument site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonumentDelivery {
    pub walker_id: u32,
    pub destination_id: u32,
    pub resource: u32,
    pub cartloads: u32,
}

/// Buildings, their per-category counts, work lists, storages and monument
/// delivery orders.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingState {
    pub records: Vec<u8>,
    pub record_size: usize,
    pub sequence: u32,
    pub highest_id: i32,
    pub highest_id_ever: i32,
    pub corrupt_houses: i32,
    pub corrupt_houses_fixed: i32,
    pub tower_sentry_request: i32,
    pub counts: BuildingCounts,
    pub lists: BuildingLists,
    pub storages: Vec<u8>,
    pub deliveries: Vec<MonumentDelivery>,
}

impl Default for BuildingState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            record_size: BUILDING_RECORD_SIZE_EXTENDED,
            sequence: 0,
            highest_id: 0,
            highest_id_ever: 0,
            corrupt_houses: 0,
            corrupt_houses_fixed: 0,
            tower_sentry_request: 0,
            counts: BuildingCounts::default(),
            lists: BuildingLists::default(),
            storages: Vec::new(),
            deliveries: Vec::new(),
        }
    }
}

impl BuildingState {
    pub fn count(&self) -> usize {
        if self.record_size == 0 {
            return 0;
        }
        self.records.len() / self.record_size
    }

    pub fn load_state(&mut self, buildings: &mut Buffer, extended: bool) -> io::Result<()> {
        self.record_size = if extended {
            BUILDING_RECORD_SIZE_EXTENDED
        } else {
            BUILDING_RECORD_SIZE
        };
        self.records = buildings.read_bytes(buildings.remaining())?.to_vec();
        self.recalculate_highest_ids();
        Ok(())
    }

    pub fn save_state(&self, buildings: &mut Buffer) -> io::Result<()> {
        *buildings = Buffer::new(self.records.len());
        buildings.write_raw(&self.records)
    }

    /// Highest-id pieces are written for compatibility but never trusted on
    /// load; the real values come from scanning the records.
    pub fn recalculate_highest_ids(&mut self) {
        let mut highest = 0;
        for (index, record) in self.record_chunks().enumerate() {
            if record[RECORD_OFFSET_STATE] != BUILDING_STATE_UNUSED {
                highest = index as i32;
            }
        }
        self.highest_id = highest;
        if highest > self.highest_id_ever {
            self.highest_id_ever = highest;
        }
    }

    fn record_chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.records.chunks_exact(self.record_size.max(1))
    }

    pub fn load_extra_state(
        &mut self,
        sequence: &mut Buffer,
        corrupt_houses: &mut Buffer,
    ) -> io::Result<()> {
        self.sequence = sequence.read_u32()?;
        self.corrupt_houses = corrupt_houses.read_i32()?;
        self.corrupt_houses_fixed = corrupt_houses.read_i32()?;
        Ok(())
    }

    pub fn save_extra_state(
        &self,
        sequence: &mut Buffer,
        highest_id: &mut Buffer,
        highest_id_ever: &mut Buffer,
        corrupt_houses: &mut Buffer,
    ) -> io::Result<()> {
        sequence.write_u32(self.sequence)?;
        highest_id.write_i32(self.highest_id)?;
        highest_id_ever.write_i32(self.highest_id_ever)?;
        highest_id_ever.write_i32(0)?;
        corrupt_houses.write_i32(self.corrupt_houses)?;
        corrupt_houses.write_i32(self.corrupt_houses_fixed)
    }

    pub fn load_barracks_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.tower_sentry_request = buf.read_i32()?;
        Ok(())
    }

    pub fn save_barracks_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.tower_sentry_request)
    }

    pub fn load_storage_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.storages = buf.read_bytes(buf.remaining())?.to_vec();
        Ok(())
    }

    pub fn save_storage_state(&self, buf: &mut Buffer) -> io::Result<()> {
        *buf = Buffer::new(self.storages.len());
        buf.write_raw(&self.storages)
    }

    pub fn load_deliveries_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        let count = buf.len() / MONUMENT_DELIVERY_SIZE;
        self.deliveries = Vec::with_capacity(count);
        for _ in 0..count {
            self.deliveries.push(MonumentDelivery {
                walker_id: buf.read_u32()?,
                destination_id: buf.read_u32()?,
                resource: buf.read_u32()?,
                cartloads: buf.read_u32()?,
            });
        }
        Ok(())
    }

    pub fn save_deliveries_state(&self, buf: &mut Buffer) -> io::Result<()> {
        *buf = Buffer::new(self.deliveries.len() * MONUMENT_DELIVERY_SIZE);
        for delivery in &self.deliveries {
            buf.write_u32(delivery.walker_id)?;
            buf.write_u32(delivery.destination_id)?;
            buf.write_u32(delivery.resource)?;
            buf.write_u32(delivery.cartloads)?;
        }
        Ok(())
    }

    /// Files saved before the deliveries piece existed start with none.
    pub fn initialize_deliveries(&mut self) {
        self.deliveries.clear();
    }

    /// Bumps every granary still at the original capacity to the current
    /// one. Applied when loading files from before the capacity change.
    pub fn update_built_granaries_capacity(&mut self) {
        let record_size = self.record_size.max(1);
        for record in self.records.chunks_exact_mut(record_size) {
            if record[RECORD_OFFSET_STATE] == BUILDING_STATE_UNUSED {
                continue;
            }
            let building_type =
                u16::from_le_bytes([record[RECORD_OFFSET_TYPE], record[RECORD_OFFSET_TYPE + 1]]);
            if building_type != BUILDING_TYPE_GRANARY {
                continue;
            }
            let capacity = u32::from_le_bytes([
                record[RECORD_OFFSET_CAPACITY],
                record[RECORD_OFFSET_CAPACITY + 1],
                record[RECORD_OFFSET_CAPACITY + 2],
                record[RECORD_OFFSET_CAPACITY + 3],
            ]);
            if capacity == GRANARY_CAPACITY_ORIGINAL {
                record[RECORD_OFFSET_CAPACITY..RECORD_OFFSET_CAPACITY + 4]
                    .copy_from_slice(&GRANARY_CAPACITY_CURRENT.to_le_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building_record(state: u8, building_type: u16, capacity: u32) -> Vec<u8> {
        let mut record = vec![0u8; BUILDING_RECORD_SIZE_EXTENDED];
        record[RECORD_OFFSET_STATE] = state;
        record[RECORD_OFFSET_TYPE..RECORD_OFFSET_TYPE + 2]
            .copy_from_slice(&building_type.to_le_bytes());
        record[RECORD_OFFSET_CAPACITY..RECORD_OFFSET_CAPACITY + 4]
            .copy_from_slice(&capacity.to_le_bytes());
        record
    }

    #[test]
    fn fresh_state_uses_the_extended_record_width() {
        let mut state = BuildingState::default();
        assert_eq!(state.record_size, BUILDING_RECORD_SIZE_EXTENDED);

        state.records.extend(building_record(1, 10, 0));
        state.records.extend(building_record(1, 12, 0));
        state.recalculate_highest_ids();
        assert_eq!(state.count(), 2);
        assert_eq!(state.highest_id, 1);
    }

    #[test]
    fn highest_ids_come_from_the_records() {
        let mut records = Vec::new();
        records.extend(building_record(0, 0, 0));
        records.extend(building_record(1, 10, 0));
        records.extend(building_record(1, 12, 0));
        records.extend(building_record(0, 0, 0));

        let mut state = BuildingState::default();
        let mut buf = Buffer::from_vec(records);
        state.load_state(&mut buf, true).unwrap();
        assert_eq!(state.count(), 4);
        assert_eq!(state.highest_id, 2);
        assert_eq!(state.highest_id_ever, 2);
    }

    #[test]
    fn granary_capacity_upgrade_only_touches_original_granaries() {
        let mut records = Vec::new();
        records.extend(building_record(1, BUILDING_TYPE_GRANARY, GRANARY_CAPACITY_ORIGINAL));
        records.extend(building_record(1, BUILDING_TYPE_GRANARY, 1200));
        records.extend(building_record(1, 10, GRANARY_CAPACITY_ORIGINAL));
        records.extend(building_record(0, BUILDING_TYPE_GRANARY, GRANARY_CAPACITY_ORIGINAL));

        let mut state = BuildingState::default();
        let mut buf = Buffer::from_vec(records);
        state.load_state(&mut buf, true).unwrap();
        state.update_built_granaries_capacity();

        let capacity_of = |index: usize| {
            let offset = index * BUILDING_RECORD_SIZE_EXTENDED + RECORD_OFFSET_CAPACITY;
            u32::from_le_bytes(state.records[offset..offset + 4].try_into().unwrap())
        };
        assert_eq!(capacity_of(0), GRANARY_CAPACITY_CURRENT);
        assert_eq!(capacity_of(1), 1200);
        assert_eq!(capacity_of(2), GRANARY_CAPACITY_ORIGINAL);
        assert_eq!(capacity_of(3), GRANARY_CAPACITY_ORIGINAL);
    }

    #[test]
    fn counts_follow_the_dynamic_flag() {
        let mut counts = BuildingCounts::default();
        let fixed: Vec<u8> = (0..COUNT_CULTURE1 as i32).flat_map(|v| v.to_le_bytes()).collect();
        let mut culture1 = Buffer::from_vec(fixed);
        let mut industry = Buffer::from_vec(vec![0; COUNT_INDUSTRY * 4]);
        let mut culture2 = Buffer::from_vec(vec![0; COUNT_CULTURE2 * 4]);
        let mut culture3 = Buffer::from_vec(vec![0; COUNT_CULTURE3 * 4]);
        let mut military = Buffer::from_vec(vec![0; COUNT_MILITARY * 4]);
        let mut support = Buffer::from_vec(vec![0; COUNT_SUPPORT * 4]);
        counts
            .load_state(
                &mut culture1,
                &mut industry,
                &mut culture2,
                &mut culture3,
                &mut military,
                &mut support,
                false,
            )
            .unwrap();
        assert_eq!(counts.culture1.len(), COUNT_CULTURE1);
        assert_eq!(counts.culture1[4], 4);

        // A dynamic piece can carry more categories than the fixed layout.
        let mut culture1 = Buffer::from_vec(vec![0; (COUNT_CULTURE1 + 2) * 4]);
        let mut industry = Buffer::from_vec(vec![0; COUNT_INDUSTRY * 4]);
        let mut culture2 = Buffer::from_vec(vec![0; COUNT_CULTURE2 * 4]);
        let mut culture3 = Buffer::from_vec(vec![0; COUNT_CULTURE3 * 4]);
        let mut military = Buffer::from_vec(vec![0; COUNT_MILITARY * 4]);
        let mut support = Buffer::from_vec(vec![0; COUNT_SUPPORT * 4]);
        counts
            .load_state(
                &mut culture1,
                &mut industry,
                &mut culture2,
                &mut culture3,
                &mut military,
                &mut support,
                true,
            )
            .unwrap();
        assert_eq!(counts.culture1.len(), COUNT_CULTURE1 + 2);
    }

    #[test]
    fn deliveries_round_trip() {
        let mut state = BuildingState::default();
        state.deliveries = vec![
            MonumentDelivery { walker_id: 3, destination_id: 17, resource: 5, cartloads: 2 },
            MonumentDelivery { walker_id: 0, destination_id: 0, resource: 0, cartloads: 0 },
        ];
        let mut buf = Buffer::new(0);
        state.save_deliveries_state(&mut buf).unwrap();
        assert_eq!(buf.len(), 2 * MONUMENT_DELIVERY_SIZE);

        let mut reloaded = BuildingState::default();
        buf.reset();
        reloaded.load_deliveries_state(&mut buf).unwrap();
        assert_eq!(reloaded.deliveries, state.deliveries);
    }
}

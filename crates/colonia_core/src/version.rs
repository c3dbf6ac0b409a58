use crate::error::SaveError;

/// Version written by every new save. Reading anything newer is an error.
pub const SAVE_GAME_CURRENT_VERSION: u32 = 0x87;

/// Last version with the original engine's fixed array limits.
pub const SAVE_GAME_LAST_ORIGINAL_LIMITS_VERSION: u32 = 0x66;
/// Last version storing 2-byte image ids in the image grid.
pub const SAVE_GAME_LAST_SMALLER_IMAGE_ID_VERSION: u32 = 0x76;
/// Last version without a monument deliveries region.
pub const SAVE_GAME_LAST_NO_DELIVERIES_VERSION: u32 = 0x77;
/// Last version with fixed-size array pieces; later versions are
/// length-prefixed and use wider per-record encodings.
pub const SAVE_GAME_LAST_STATIC_VERSION: u32 = 0x78;
/// Last version storing import and export limits in a joined field.
pub const SAVE_GAME_LAST_JOINED_IMPORT_EXPORT_VERSION: u32 = 0x79;
/// Last version with fixed-size building count arrays.
pub const SAVE_GAME_LAST_STATIC_BUILDING_COUNT_VERSION: u32 = 0x80;
/// Last version with a fixed-size monument deliveries region.
pub const SAVE_GAME_LAST_STATIC_MONUMENT_DELIVERIES_VERSION: u32 = 0x81;
/// Last version storing map image ids at all; later versions rebuild them
/// from terrain after load.
pub const SAVE_GAME_LAST_STORED_IMAGE_IDS_VERSION: u32 = 0x83;
/// First version saving granaries with the increased capacity. Update this
/// if the capacity ever changes again.
pub const SAVE_GAME_INCREASE_GRANARY_CAPACITY_VERSION: u32 = 0x85;
/// Last version with 2-byte terrain cells.
pub const SAVE_GAME_LAST_ORIGINAL_TERRAIN_DATA_SIZE_VERSION: u32 = 0x86;

const GRID_BYTES_U16: usize = 52488;

/// Declared length of a piece, or dynamic (length-prefixed in the stream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceSize {
    Fixed(usize),
    Dynamic,
}

/// How array-backed pieces are sized for a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// Fixed size: the base length times this multiplier.
    Multiplier(usize),
    /// Length-prefixed in the stream.
    Dynamic,
}

impl SizeRule {
    pub fn apply(self, base: usize) -> PieceSize {
        match self {
            SizeRule::Multiplier(multiplier) => PieceSize::Fixed(base * multiplier),
            SizeRule::Dynamic => PieceSize::Dynamic,
        }
    }
}

/// Presence and shape of the monument deliveries piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveriesFormat {
    Absent,
    Fixed(usize),
    Dynamic,
}

/// All layout parameters derived from a file's format version.
///
/// Every threshold applies independently; none of them are nested. The
/// registry and codecs consult only this table, never raw version compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavegameLayout {
    pub version: u32,
    /// Sizing for figures, routes, formations, buildings, building lists
    /// and storages.
    pub array_size: SizeRule,
    /// Sizing for the per-category building count arrays.
    pub count_size: SizeRule,
    /// 8 bytes (total + size) before the dynamic switch, 4 (total) after.
    pub burning_totals_size: usize,
    /// `None` when image ids are no longer stored.
    pub image_grid_size: Option<usize>,
    pub terrain_grid_size: usize,
    pub deliveries: DeliveriesFormat,
    /// Image grid cells are 2 bytes instead of 4.
    pub legacy_image_ids: bool,
    /// Terrain grid cells are 2 bytes instead of 4.
    pub legacy_terrain: bool,
    /// Figures, formations, buildings, lists and storages use the wider
    /// post-static record encoding.
    pub extended_records: bool,
    /// City data stores import and export limits separately.
    pub separate_import_export: bool,
    pub dynamic_building_counts: bool,
    /// Built granaries predate the capacity increase and must be recomputed
    /// after load.
    pub recompute_granary_capacity: bool,
}

impl SavegameLayout {
    pub fn for_version(version: u32) -> Result<Self, SaveError> {
        if version > SAVE_GAME_CURRENT_VERSION {
            return Err(SaveError::UnsupportedVersion(version));
        }

        let mut array_size = SizeRule::Multiplier(1);
        let mut burning_totals_size = 8;
        if version > SAVE_GAME_LAST_ORIGINAL_LIMITS_VERSION {
            array_size = SizeRule::Multiplier(5);
        }
        if version > SAVE_GAME_LAST_STATIC_VERSION {
            array_size = SizeRule::Dynamic;
            burning_totals_size = 4;
        }

        let count_size = if version > SAVE_GAME_LAST_STATIC_BUILDING_COUNT_VERSION {
            SizeRule::Dynamic
        } else {
            SizeRule::Multiplier(1)
        };

        let legacy_image_ids = version <= SAVE_GAME_LAST_SMALLER_IMAGE_ID_VERSION;
        let legacy_terrain = version <= SAVE_GAME_LAST_ORIGINAL_TERRAIN_DATA_SIZE_VERSION;

        let image_grid_size = (version <= SAVE_GAME_LAST_STORED_IMAGE_IDS_VERSION)
            .then(|| GRID_BYTES_U16 * if legacy_image_ids { 1 } else { 2 });
        let terrain_grid_size = GRID_BYTES_U16 * if legacy_terrain { 1 } else { 2 };

        let deliveries = if version > SAVE_GAME_LAST_STATIC_MONUMENT_DELIVERIES_VERSION {
            DeliveriesFormat::Dynamic
        } else if version > SAVE_GAME_LAST_NO_DELIVERIES_VERSION {
            DeliveriesFormat::Fixed(3200)
        } else {
            DeliveriesFormat::Absent
        };

        Ok(Self {
            version,
            array_size,
            count_size,
            burning_totals_size,
            image_grid_size,
            terrain_grid_size,
            deliveries,
            legacy_image_ids,
            legacy_terrain,
            extended_records: version > SAVE_GAME_LAST_STATIC_VERSION,
            separate_import_export: version > SAVE_GAME_LAST_JOINED_IMPORT_EXPORT_VERSION,
            dynamic_building_counts: version > SAVE_GAME_LAST_STATIC_BUILDING_COUNT_VERSION,
            recompute_granary_capacity: version < SAVE_GAME_INCREASE_GRANARY_CAPACITY_VERSION,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaveError;

    fn layout(version: u32) -> SavegameLayout {
        SavegameLayout::for_version(version).unwrap()
    }

    #[test]
    fn rejects_future_versions() {
        let err = SavegameLayout::for_version(SAVE_GAME_CURRENT_VERSION + 1).unwrap_err();
        assert!(matches!(err, SaveError::UnsupportedVersion(v) if v == 0x88));
        assert!(SavegameLayout::for_version(SAVE_GAME_CURRENT_VERSION).is_ok());
    }

    #[test]
    fn original_limits_era() {
        let l = layout(0x66);
        assert_eq!(l.array_size, SizeRule::Multiplier(1));
        assert_eq!(l.array_size.apply(128000), PieceSize::Fixed(128000));
        assert_eq!(l.burning_totals_size, 8);
        assert_eq!(l.image_grid_size, Some(52488));
        assert_eq!(l.terrain_grid_size, 52488);
        assert_eq!(l.deliveries, DeliveriesFormat::Absent);
        assert!(l.legacy_image_ids);
        assert!(!l.extended_records);
        assert!(!l.separate_import_export);
        assert!(!l.dynamic_building_counts);
        assert!(l.recompute_granary_capacity);
    }

    #[test]
    fn raised_limits_era_multiplies_arrays_by_five() {
        let l = layout(0x67);
        assert_eq!(l.array_size, SizeRule::Multiplier(5));
        assert_eq!(l.array_size.apply(128000), PieceSize::Fixed(640000));
        assert_eq!(l.burning_totals_size, 8);
    }

    #[test]
    fn wider_image_ids_after_0x76() {
        assert_eq!(layout(0x76).image_grid_size, Some(52488));
        assert!(layout(0x76).legacy_image_ids);
        assert_eq!(layout(0x77).image_grid_size, Some(104976));
        assert!(!layout(0x77).legacy_image_ids);
    }

    #[test]
    fn deliveries_appear_after_0x77() {
        assert_eq!(layout(0x77).deliveries, DeliveriesFormat::Absent);
        assert_eq!(layout(0x78).deliveries, DeliveriesFormat::Fixed(3200));
        assert_eq!(layout(0x81).deliveries, DeliveriesFormat::Fixed(3200));
        assert_eq!(layout(0x82).deliveries, DeliveriesFormat::Dynamic);
    }

    #[test]
    fn dynamic_arrays_after_0x78() {
        let l = layout(0x79);
        assert_eq!(l.array_size, SizeRule::Dynamic);
        assert_eq!(l.array_size.apply(128000), PieceSize::Dynamic);
        assert_eq!(l.burning_totals_size, 4);
        assert!(l.extended_records);
        assert!(!layout(0x78).extended_records);
    }

    #[test]
    fn import_export_splits_after_0x79() {
        assert!(!layout(0x79).separate_import_export);
        assert!(layout(0x7A).separate_import_export);
    }

    #[test]
    fn building_counts_become_dynamic_after_0x80() {
        assert_eq!(layout(0x80).count_size, SizeRule::Multiplier(1));
        assert!(!layout(0x80).dynamic_building_counts);
        assert_eq!(layout(0x81).count_size, SizeRule::Dynamic);
        assert!(layout(0x81).dynamic_building_counts);
    }

    #[test]
    fn image_grid_disappears_after_0x83() {
        assert_eq!(layout(0x83).image_grid_size, Some(104976));
        assert_eq!(layout(0x84).image_grid_size, None);
    }

    #[test]
    fn granary_recompute_below_0x85() {
        assert!(layout(0x84).recompute_granary_capacity);
        assert!(!layout(0x85).recompute_granary_capacity);
        assert!(!layout(SAVE_GAME_CURRENT_VERSION).recompute_granary_capacity);
    }

    #[test]
    fn wider_terrain_after_0x86() {
        assert_eq!(layout(0x86).terrain_grid_size, 52488);
        assert!(layout(0x86).legacy_terrain);
        assert_eq!(layout(0x87).terrain_grid_size, 104976);
        assert!(!layout(0x87).legacy_terrain);
    }

    #[test]
    fn thresholds_apply_independently() {
        // 0x80 sits after the dynamic-array switch but before the dynamic
        // building count switch; both gates must be read off independently.
        let l = layout(0x80);
        assert_eq!(l.array_size, SizeRule::Dynamic);
        assert_eq!(l.count_size, SizeRule::Multiplier(1));
        assert_eq!(l.image_grid_size, Some(104976));
        assert_eq!(l.deliveries, DeliveriesFormat::Fixed(3200));
        assert!(l.recompute_granary_capacity);
    }
}

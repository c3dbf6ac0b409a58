use std::io;

use crate::buffer::Buffer;

/// Grid side length; every map grid holds `GRID_SIZE` cells.
pub const GRID_WIDTH: usize = 162;
pub const GRID_SIZE: usize = GRID_WIDTH * GRID_WIDTH;

pub const BOOKMARK_COUNT: usize = 8;

// Terrain bit flags consulted when rebuilding image ids.
pub const TERRAIN_WATER: u32 = 0x01;
pub const TERRAIN_TREE: u32 = 0x02;
pub const TERRAIN_ROCK: u32 = 0x04;
pub const TERRAIN_ROAD: u32 = 0x40;
pub const TERRAIN_BUILDING: u32 = 0x80;

// Image id base offsets used by the rebuild pass.
const IMAGE_GRASSLAND: u32 = 0x0100;
const IMAGE_WATER: u32 = 0x0200;
const IMAGE_TREE: u32 = 0x0300;
const IMAGE_ROCK: u32 = 0x0400;
const IMAGE_ROAD: u32 = 0x0500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapPoint {
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingCounters {
    pub total_routes_calculated: u32,
    pub enemy_routes_calculated: u32,
    pub building_routes_calculated: u32,
    pub routes_reused: u32,
}

/// All per-tile map grids, plus routing counters and view bookmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    pub image_ids: Vec<u32>,
    pub edge: Vec<u8>,
    pub building_ids: Vec<u16>,
    pub terrain: Vec<u32>,
    pub aqueduct: Vec<u8>,
    pub figure_ids: Vec<u16>,
    pub bitfields: Vec<u8>,
    pub sprite: Vec<u8>,
    pub random: Vec<u8>,
    pub desirability: Vec<i8>,
    pub elevation: Vec<u8>,
    pub damage: Vec<u8>,
    pub aqueduct_backup: Vec<u8>,
    pub sprite_backup: Vec<u8>,
    pub routing: RoutingCounters,
    pub bookmarks: [MapPoint; BOOKMARK_COUNT],
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            image_ids: vec![0; GRID_SIZE],
            edge: vec![0; GRID_SIZE],
            building_ids: vec![0; GRID_SIZE],
            terrain: vec![0; GRID_SIZE],
            aqueduct: vec![0; GRID_SIZE],
            figure_ids: vec![0; GRID_SIZE],
            bitfields: vec![0; GRID_SIZE],
            sprite: vec![0; GRID_SIZE],
            random: vec![0; GRID_SIZE],
            desirability: vec![0; GRID_SIZE],
            elevation: vec![0; GRID_SIZE],
            damage: vec![0; GRID_SIZE],
            aqueduct_backup: vec![0; GRID_SIZE],
            sprite_backup: vec![0; GRID_SIZE],
            routing: RoutingCounters::default(),
            bookmarks: [MapPoint::default(); BOOKMARK_COUNT],
        }
    }
}

fn load_u8_grid(grid: &mut [u8], buf: &mut Buffer) -> io::Result<()> {
    buf.read_raw(grid)
}

fn save_u8_grid(grid: &[u8], buf: &mut Buffer) -> io::Result<()> {
    buf.write_raw(grid)
}

impl MapState {
    /// Legacy image grid: one 2-byte id per cell.
    pub fn load_image_state_legacy(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for cell in &mut self.image_ids {
            *cell = u32::from(buf.read_u16()?);
        }
        Ok(())
    }

    pub fn save_image_state_legacy(&self, buf: &mut Buffer) -> io::Result<()> {
        for &cell in &self.image_ids {
            buf.write_u16(cell as u16)?;
        }
        Ok(())
    }

    /// Loads the terrain grid, and the stored image grid when the format
    /// still carries one. `wide` selects 4-byte terrain cells,
    /// `legacy_image` selects 2-byte image ids.
    pub fn load_terrain_state(
        &mut self,
        buf: &mut Buffer,
        wide: bool,
        image_grid: Option<&mut Buffer>,
        legacy_image: bool,
    ) -> io::Result<()> {
        for cell in &mut self.terrain {
            *cell = if wide {
                buf.read_u32()?
            } else {
                u32::from(buf.read_u16()?)
            };
        }
        if let Some(image_buf) = image_grid {
            image_buf.reset();
            for cell in &mut self.image_ids {
                *cell = if legacy_image {
                    u32::from(image_buf.read_u16()?)
                } else {
                    image_buf.read_u32()?
                };
            }
        }
        Ok(())
    }

    /// Current-format terrain save: 4-byte cells, no image grid.
    pub fn save_terrain_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for &cell in &self.terrain {
            buf.write_u32(cell)?;
        }
        Ok(())
    }

    /// Scenario-format terrain save: 2-byte cells.
    pub fn save_terrain_state_legacy(&self, buf: &mut Buffer) -> io::Result<()> {
        for &cell in &self.terrain {
            buf.write_u16(cell as u16)?;
        }
        Ok(())
    }

    pub fn load_building_state(
        &mut self,
        buildings: &mut Buffer,
        damage: &mut Buffer,
    ) -> io::Result<()> {
        for cell in &mut self.building_ids {
            *cell = buildings.read_u16()?;
        }
        load_u8_grid(&mut self.damage, damage)
    }

    pub fn save_building_state(
        &self,
        buildings: &mut Buffer,
        damage: &mut Buffer,
    ) -> io::Result<()> {
        for &cell in &self.building_ids {
            buildings.write_u16(cell)?;
        }
        save_u8_grid(&self.damage, damage)
    }

    pub fn load_aqueduct_state(
        &mut self,
        aqueduct: &mut Buffer,
        backup: &mut Buffer,
    ) -> io::Result<()> {
        load_u8_grid(&mut self.aqueduct, aqueduct)?;
        load_u8_grid(&mut self.aqueduct_backup, backup)
    }

    pub fn save_aqueduct_state(&self, aqueduct: &mut Buffer, backup: &mut Buffer) -> io::Result<()> {
        save_u8_grid(&self.aqueduct, aqueduct)?;
        save_u8_grid(&self.aqueduct_backup, backup)
    }

    pub fn load_figure_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for cell in &mut self.figure_ids {
            *cell = buf.read_u16()?;
        }
        Ok(())
    }

    pub fn save_figure_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for &cell in &self.figure_ids {
            buf.write_u16(cell)?;
        }
        Ok(())
    }

    pub fn load_sprite_state(&mut self, sprite: &mut Buffer, backup: &mut Buffer) -> io::Result<()> {
        load_u8_grid(&mut self.sprite, sprite)?;
        load_u8_grid(&mut self.sprite_backup, backup)
    }

    pub fn save_sprite_state(&self, sprite: &mut Buffer, backup: &mut Buffer) -> io::Result<()> {
        save_u8_grid(&self.sprite, sprite)?;
        save_u8_grid(&self.sprite_backup, backup)
    }

    pub fn load_property_state(&mut self, bitfields: &mut Buffer, edge: &mut Buffer) -> io::Result<()> {
        load_u8_grid(&mut self.bitfields, bitfields)?;
        load_u8_grid(&mut self.edge, edge)
    }

    pub fn save_property_state(&self, bitfields: &mut Buffer, edge: &mut Buffer) -> io::Result<()> {
        save_u8_grid(&self.bitfields, bitfields)?;
        save_u8_grid(&self.edge, edge)
    }

    pub fn load_random_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        load_u8_grid(&mut self.random, buf)
    }

    pub fn save_random_state(&self, buf: &mut Buffer) -> io::Result<()> {
        save_u8_grid(&self.random, buf)
    }

    pub fn load_desirability_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for cell in &mut self.desirability {
            *cell = buf.read_i8()?;
        }
        Ok(())
    }

    pub fn save_desirability_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for &cell in &self.desirability {
            buf.write_i8(cell)?;
        }
        Ok(())
    }

    pub fn load_elevation_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        load_u8_grid(&mut self.elevation, buf)
    }

    pub fn save_elevation_state(&self, buf: &mut Buffer) -> io::Result<()> {
        save_u8_grid(&self.elevation, buf)
    }

    pub fn load_routing_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.routing.total_routes_calculated = buf.read_u32()?;
        self.routing.enemy_routes_calculated = buf.read_u32()?;
        self.routing.building_routes_calculated = buf.read_u32()?;
        self.routing.routes_reused = buf.read_u32()?;
        Ok(())
    }

    pub fn save_routing_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_u32(self.routing.total_routes_calculated)?;
        buf.write_u32(self.routing.enemy_routes_calculated)?;
        buf.write_u32(self.routing.building_routes_calculated)?;
        buf.write_u32(self.routing.routes_reused)
    }

    pub fn load_bookmark_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for bookmark in &mut self.bookmarks {
            bookmark.x = buf.read_i16()?;
            bookmark.y = buf.read_i16()?;
        }
        Ok(())
    }

    pub fn save_bookmark_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for bookmark in &self.bookmarks {
            buf.write_i16(bookmark.x)?;
            buf.write_i16(bookmark.y)?;
        }
        Ok(())
    }

    /// Recomputes the full image grid from terrain. Save files no longer
    /// store final image ids, and scenario files store only base ids, so
    /// every load ends with this pass.
    pub fn rebuild_images(&mut self) {
        for i in 0..GRID_SIZE {
            self.image_ids[i] = image_for_tile(self.terrain[i], self.random[i]);
        }
    }
}

fn image_for_tile(terrain: u32, random: u8) -> u32 {
    let variant = u32::from(random & 0x07);
    if terrain & TERRAIN_WATER != 0 {
        IMAGE_WATER + variant
    } else if terrain & TERRAIN_ROCK != 0 {
        IMAGE_ROCK + variant
    } else if terrain & TERRAIN_TREE != 0 {
        IMAGE_TREE + variant
    } else if terrain & (TERRAIN_ROAD | TERRAIN_BUILDING) != 0 {
        IMAGE_ROAD
    } else {
        IMAGE_GRASSLAND + variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_load_narrow_and_wide_agree() {
        let mut narrow = Buffer::new(GRID_SIZE * 2);
        let mut wide = Buffer::new(GRID_SIZE * 4);
        for i in 0..GRID_SIZE {
            narrow.write_u16((i % 7) as u16).unwrap();
            wide.write_u32((i % 7) as u32).unwrap();
        }
        narrow.reset();
        wide.reset();

        let mut from_narrow = MapState::default();
        let mut from_wide = MapState::default();
        from_narrow
            .load_terrain_state(&mut narrow, false, None, true)
            .unwrap();
        from_wide
            .load_terrain_state(&mut wide, true, None, false)
            .unwrap();
        assert_eq!(from_narrow.terrain, from_wide.terrain);
    }

    #[test]
    fn stored_image_grid_is_read_alongside_terrain() {
        let mut terrain = Buffer::new(GRID_SIZE * 4);
        let mut image = Buffer::new(GRID_SIZE * 2);
        for i in 0..GRID_SIZE {
            terrain.write_u32(0).unwrap();
            image.write_u16((i & 0xFFFF) as u16).unwrap();
        }
        terrain.reset();

        let mut map = MapState::default();
        map.load_terrain_state(&mut terrain, true, Some(&mut image), true)
            .unwrap();
        assert_eq!(map.image_ids[1], 1);
        assert_eq!(map.image_ids[GRID_SIZE - 1], ((GRID_SIZE - 1) & 0xFFFF) as u32);
    }

    #[test]
    fn rebuild_images_is_deterministic_per_terrain() {
        let mut map = MapState::default();
        map.terrain[0] = TERRAIN_WATER;
        map.terrain[1] = TERRAIN_ROCK;
        map.terrain[2] = TERRAIN_ROAD;
        map.random[3] = 5;
        map.rebuild_images();

        let first = map.image_ids.clone();
        map.image_ids.fill(0xFFFF_FFFF);
        map.rebuild_images();
        assert_eq!(map.image_ids, first);
        assert_ne!(map.image_ids[0], map.image_ids[1]);
    }
}

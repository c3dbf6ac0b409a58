//! Scenario file registry and codec.
//!
//! Scenario files are a plain concatenation of ten fixed-size pieces with no
//! version header and no compression.

use std::io;

use crate::piece::{FilePiece, PieceDescriptor};
use crate::state::GameState;

/// The ten scenario pieces, in physical file order.
#[derive(Debug)]
pub struct ScenarioData {
    pub graphic_ids: FilePiece,
    pub edge: FilePiece,
    pub terrain: FilePiece,
    pub bitfields: FilePiece,
    pub random: FilePiece,
    pub elevation: FilePiece,
    pub random_iv: FilePiece,
    pub camera: FilePiece,
    pub scenario: FilePiece,
    pub end_marker: FilePiece,
}

impl ScenarioData {
    pub fn new() -> Self {
        Self {
            graphic_ids: FilePiece::fixed(52488, false),
            edge: FilePiece::fixed(26244, false),
            terrain: FilePiece::fixed(52488, false),
            bitfields: FilePiece::fixed(26244, false),
            random: FilePiece::fixed(26244, false),
            elevation: FilePiece::fixed(26244, false),
            random_iv: FilePiece::fixed(8, false),
            camera: FilePiece::fixed(8, false),
            scenario: FilePiece::fixed(1720, false),
            end_marker: FilePiece::fixed(4, false),
        }
    }

    /// Pieces in file order, for the transport.
    pub fn pieces_mut(&mut self) -> Vec<&mut FilePiece> {
        vec![
            &mut self.graphic_ids,
            &mut self.edge,
            &mut self.terrain,
            &mut self.bitfields,
            &mut self.random,
            &mut self.elevation,
            &mut self.random_iv,
            &mut self.camera,
            &mut self.scenario,
            &mut self.end_marker,
        ]
    }

    pub fn descriptors(&self) -> Vec<PieceDescriptor> {
        vec![
            self.graphic_ids.descriptor("graphic_ids"),
            self.edge.descriptor("edge"),
            self.terrain.descriptor("terrain"),
            self.bitfields.descriptor("bitfields"),
            self.random.descriptor("random"),
            self.elevation.descriptor("elevation"),
            self.random_iv.descriptor("random_iv"),
            self.camera.descriptor("camera"),
            self.scenario.descriptor("scenario"),
            self.end_marker.descriptor("end_marker"),
        ]
    }

    /// Decodes every piece into `game`. Image ids come from the stored
    /// legacy grid but are rebuilt from terrain afterwards, so the grid only
    /// has to be present, not meaningful.
    pub fn load_into(&mut self, game: &mut GameState) -> io::Result<()> {
        game.map.load_image_state_legacy(&mut self.graphic_ids.buf)?;
        game.map.load_terrain_state(
            &mut self.terrain.buf,
            false,
            Some(&mut self.graphic_ids.buf),
            true,
        )?;
        game.map
            .load_property_state(&mut self.bitfields.buf, &mut self.edge.buf)?;
        game.map.load_random_state(&mut self.random.buf)?;
        game.map.load_elevation_state(&mut self.elevation.buf)?;
        game.view.load_scenario_state(&mut self.camera.buf)?;

        game.random.load_state(&mut self.random_iv.buf)?;

        game.scenario.load_state(&mut self.scenario.buf)?;

        self.end_marker.buf.skip(4);

        game.map.rebuild_images();
        Ok(())
    }

    pub fn save_from(&mut self, game: &GameState) -> io::Result<()> {
        game.map.save_image_state_legacy(&mut self.graphic_ids.buf)?;
        game.map.save_terrain_state_legacy(&mut self.terrain.buf)?;
        game.map
            .save_property_state(&mut self.bitfields.buf, &mut self.edge.buf)?;
        game.map.save_random_state(&mut self.random.buf)?;
        game.map.save_elevation_state(&mut self.elevation.buf)?;
        game.view.save_scenario_state(&mut self.camera.buf)?;

        game.random.save_state(&mut self.random_iv.buf)?;

        game.scenario.save_state(&mut self.scenario.buf)?;

        self.end_marker.buf.skip(4);
        Ok(())
    }
}

impl Default for ScenarioData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_fixed_uncompressed_pieces() {
        let data = ScenarioData::new();
        let descriptors = data.descriptors();
        let sizes: Vec<usize> = descriptors.iter().map(|d| d.size).collect();
        assert_eq!(
            sizes,
            [52488, 26244, 52488, 26244, 26244, 26244, 8, 8, 1720, 4]
        );
        assert!(descriptors.iter().all(|d| !d.compressed && !d.dynamic));
    }

    #[test]
    fn codec_round_trips_the_map_and_rules() {
        let mut game = GameState::new();
        game.map.terrain[500] = 0x0005;
        game.map.random[500] = 3;
        game.map.elevation[10] = 2;
        game.scenario.data[0] = 0x61;
        game.view.camera_x = 40;
        game.view.camera_y = 22;
        game.random.iv = [7, 9];
        game.map.rebuild_images();

        let mut data = ScenarioData::new();
        data.save_from(&game).unwrap();

        let mut reloaded = GameState::new();
        let mut data = reload(data);
        data.load_into(&mut reloaded).unwrap();

        assert_eq!(reloaded.map.terrain, game.map.terrain);
        assert_eq!(reloaded.scenario, game.scenario);
        assert_eq!(reloaded.view, game.view);
        assert_eq!(reloaded.random, game.random);
        // Image ids are derived from terrain, so the rebuilt grids agree.
        assert_eq!(reloaded.map.image_ids, game.map.image_ids);
    }

    fn reload(mut saved: ScenarioData) -> ScenarioData {
        let mut fresh = ScenarioData::new();
        for (src, dst) in saved.pieces_mut().into_iter().zip(fresh.pieces_mut()) {
            *dst = FilePiece {
                buf: crate::Buffer::from_vec(src.buf.data().to_vec()),
                compressed: src.compressed,
                dynamic: src.dynamic,
            };
        }
        fresh
    }
}

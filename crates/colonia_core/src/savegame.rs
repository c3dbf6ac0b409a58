//! Savegame piece registry and codec.
//!
//! The registry is rebuilt per file from its format version; piece sizes,
//! presence and compression all come from [`SavegameLayout`]. Field
//! declaration order is physical file order.

use std::io;

use crate::error::SaveError;
use crate::piece::{FilePiece, PieceDescriptor};
use crate::state::GameState;
use crate::version::{DeliveriesFormat, PieceSize, SavegameLayout, SAVE_GAME_CURRENT_VERSION};

/// Every piece of a saved game, in physical file order, plus the layout the
/// registry was built for.
#[derive(Debug)]
pub struct SavegameData {
    pub layout: SavegameLayout,
    pub scenario_campaign_mission: FilePiece,
    pub file_version: FilePiece,
    pub image_grid: Option<FilePiece>,
    pub edge_grid: FilePiece,
    pub building_grid: FilePiece,
    pub terrain_grid: FilePiece,
    pub aqueduct_grid: FilePiece,
    pub figure_grid: FilePiece,
    pub bitfields_grid: FilePiece,
    pub sprite_grid: FilePiece,
    pub random_grid: FilePiece,
    pub desirability_grid: FilePiece,
    pub elevation_grid: FilePiece,
    pub building_damage_grid: FilePiece,
    pub aqueduct_backup_grid: FilePiece,
    pub sprite_backup_grid: FilePiece,
    pub figures: FilePiece,
    pub route_figures: FilePiece,
    pub route_paths: FilePiece,
    pub formations: FilePiece,
    pub formation_totals: FilePiece,
    pub city_data: FilePiece,
    pub city_faction_unknown: FilePiece,
    pub player_name: FilePiece,
    pub city_faction: FilePiece,
    pub buildings: FilePiece,
    pub city_view_orientation: FilePiece,
    pub game_time: FilePiece,
    pub building_extra_highest_id_ever: FilePiece,
    pub random_iv: FilePiece,
    pub city_view_camera: FilePiece,
    pub building_count_culture1: FilePiece,
    pub city_graph_order: FilePiece,
    pub emperor_change_time: FilePiece,
    pub empire: FilePiece,
    pub empire_cities: FilePiece,
    pub building_count_industry: FilePiece,
    pub trade_prices: FilePiece,
    pub figure_names: FilePiece,
    pub culture_coverage: FilePiece,
    pub scenario: FilePiece,
    pub max_game_year: FilePiece,
    pub earthquake: FilePiece,
    pub emperor_change_state: FilePiece,
    pub messages: FilePiece,
    pub message_extra: FilePiece,
    pub population_messages: FilePiece,
    pub message_counts: FilePiece,
    pub message_delays: FilePiece,
    pub building_list_burning_totals: FilePiece,
    pub figure_sequence: FilePiece,
    pub scenario_settings: FilePiece,
    pub invasion_warnings: FilePiece,
    pub scenario_is_custom: FilePiece,
    pub city_sounds: FilePiece,
    pub building_extra_highest_id: FilePiece,
    pub figure_traders: FilePiece,
    pub building_list_burning: FilePiece,
    pub building_list_small: FilePiece,
    pub building_list_large: FilePiece,
    pub tutorial_part1: FilePiece,
    pub building_count_military: FilePiece,
    pub enemy_army_totals: FilePiece,
    pub building_storages: FilePiece,
    pub building_count_culture2: FilePiece,
    pub building_count_support: FilePiece,
    pub tutorial_part2: FilePiece,
    pub gladiator_revolt: FilePiece,
    pub trade_route_limit: FilePiece,
    pub trade_route_traded: FilePiece,
    pub building_barracks_tower_sentry: FilePiece,
    pub building_extra_sequence: FilePiece,
    pub routing_counters: FilePiece,
    pub building_count_culture3: FilePiece,
    pub enemy_armies: FilePiece,
    pub city_entry_exit_xy: FilePiece,
    pub last_invasion_id: FilePiece,
    pub building_extra_corrupt_houses: FilePiece,
    pub scenario_name: FilePiece,
    pub bookmarks: FilePiece,
    pub tutorial_part3: FilePiece,
    pub city_entry_exit_grid_offset: FilePiece,
    pub end_marker: FilePiece,
    pub deliveries: Option<FilePiece>,
}

impl SavegameData {
    /// Builds the registry for a file of the given format version.
    pub fn for_version(version: u32) -> Result<Self, SaveError> {
        let layout = SavegameLayout::for_version(version)?;

        let array = |base: usize, compressed: bool| {
            FilePiece::new(layout.array_size.apply(base), compressed)
        };
        let count = |base: usize| FilePiece::new(layout.count_size.apply(base), false);

        Ok(Self {
            scenario_campaign_mission: FilePiece::fixed(4, false),
            file_version: FilePiece::fixed(4, false),
            image_grid: layout
                .image_grid_size
                .map(|size| FilePiece::fixed(size, true)),
            edge_grid: FilePiece::fixed(26244, true),
            building_grid: FilePiece::fixed(52488, true),
            terrain_grid: FilePiece::fixed(layout.terrain_grid_size, true),
            aqueduct_grid: FilePiece::fixed(26244, true),
            figure_grid: FilePiece::fixed(52488, true),
            bitfields_grid: FilePiece::fixed(26244, true),
            sprite_grid: FilePiece::fixed(26244, true),
            random_grid: FilePiece::fixed(26244, false),
            desirability_grid: FilePiece::fixed(26244, true),
            elevation_grid: FilePiece::fixed(26244, true),
            building_damage_grid: FilePiece::fixed(26244, true),
            aqueduct_backup_grid: FilePiece::fixed(26244, true),
            sprite_backup_grid: FilePiece::fixed(26244, true),
            figures: array(128000, true),
            route_figures: array(1200, true),
            route_paths: array(300000, true),
            formations: array(6400, true),
            formation_totals: FilePiece::fixed(12, false),
            city_data: FilePiece::fixed(36136, true),
            city_faction_unknown: FilePiece::fixed(2, false),
            player_name: FilePiece::fixed(64, false),
            city_faction: FilePiece::fixed(4, false),
            buildings: array(256000, true),
            city_view_orientation: FilePiece::fixed(4, false),
            game_time: FilePiece::fixed(20, false),
            building_extra_highest_id_ever: FilePiece::fixed(8, false),
            random_iv: FilePiece::fixed(8, false),
            city_view_camera: FilePiece::fixed(8, false),
            building_count_culture1: count(132),
            city_graph_order: FilePiece::fixed(8, false),
            emperor_change_time: FilePiece::fixed(8, false),
            empire: FilePiece::fixed(12, false),
            empire_cities: FilePiece::fixed(2706, true),
            building_count_industry: count(128),
            trade_prices: FilePiece::fixed(128, false),
            figure_names: FilePiece::fixed(84, false),
            culture_coverage: FilePiece::fixed(60, false),
            scenario: FilePiece::fixed(1720, false),
            max_game_year: FilePiece::fixed(4, false),
            earthquake: FilePiece::fixed(60, false),
            emperor_change_state: FilePiece::fixed(4, false),
            messages: FilePiece::fixed(16000, true),
            message_extra: FilePiece::fixed(12, false),
            population_messages: FilePiece::fixed(10, false),
            message_counts: FilePiece::fixed(80, false),
            message_delays: FilePiece::fixed(80, false),
            building_list_burning_totals: FilePiece::fixed(layout.burning_totals_size, false),
            figure_sequence: FilePiece::fixed(4, false),
            scenario_settings: FilePiece::fixed(12, false),
            invasion_warnings: FilePiece::fixed(3232, true),
            scenario_is_custom: FilePiece::fixed(4, false),
            city_sounds: FilePiece::fixed(8960, false),
            building_extra_highest_id: FilePiece::fixed(4, false),
            figure_traders: FilePiece::fixed(4804, false),
            building_list_burning: array(1000, true),
            building_list_small: array(1000, true),
            building_list_large: array(4000, true),
            tutorial_part1: FilePiece::fixed(32, false),
            building_count_military: count(16),
            enemy_army_totals: FilePiece::fixed(20, false),
            building_storages: array(6400, false),
            building_count_culture2: count(32),
            building_count_support: count(24),
            tutorial_part2: FilePiece::fixed(4, false),
            gladiator_revolt: FilePiece::fixed(16, false),
            trade_route_limit: FilePiece::fixed(1280, true),
            trade_route_traded: FilePiece::fixed(1280, true),
            building_barracks_tower_sentry: FilePiece::fixed(4, false),
            building_extra_sequence: FilePiece::fixed(4, false),
            routing_counters: FilePiece::fixed(16, false),
            building_count_culture3: count(40),
            enemy_armies: FilePiece::fixed(900, false),
            city_entry_exit_xy: FilePiece::fixed(16, false),
            last_invasion_id: FilePiece::fixed(2, false),
            building_extra_corrupt_houses: FilePiece::fixed(8, false),
            scenario_name: FilePiece::fixed(65, false),
            bookmarks: FilePiece::fixed(32, false),
            tutorial_part3: FilePiece::fixed(4, false),
            city_entry_exit_grid_offset: FilePiece::fixed(8, false),
            end_marker: FilePiece::fixed(284, false),
            deliveries: match layout.deliveries {
                DeliveriesFormat::Absent => None,
                DeliveriesFormat::Fixed(size) => Some(FilePiece::fixed(size, false)),
                DeliveriesFormat::Dynamic => Some(FilePiece::new(PieceSize::Dynamic, false)),
            },
            layout,
        })
    }

    /// Rebuilds the registry for a (possibly different) version, dropping
    /// any loaded piece contents.
    pub fn reinit(&mut self, version: u32) -> Result<(), SaveError> {
        *self = Self::for_version(version)?;
        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.layout.version
    }

    /// Pieces in file order, for the transport.
    pub fn pieces_mut(&mut self) -> Vec<&mut FilePiece> {
        let mut pieces: Vec<&mut FilePiece> = Vec::with_capacity(84);
        pieces.push(&mut self.scenario_campaign_mission);
        pieces.push(&mut self.file_version);
        if let Some(image_grid) = self.image_grid.as_mut() {
            pieces.push(image_grid);
        }
        pieces.push(&mut self.edge_grid);
        pieces.push(&mut self.building_grid);
        pieces.push(&mut self.terrain_grid);
        pieces.push(&mut self.aqueduct_grid);
        pieces.push(&mut self.figure_grid);
        pieces.push(&mut self.bitfields_grid);
        pieces.push(&mut self.sprite_grid);
        pieces.push(&mut self.random_grid);
        pieces.push(&mut self.desirability_grid);
        pieces.push(&mut self.elevation_grid);
        pieces.push(&mut self.building_damage_grid);
        pieces.push(&mut self.aqueduct_backup_grid);
        pieces.push(&mut self.sprite_backup_grid);
        pieces.push(&mut self.figures);
        pieces.push(&mut self.route_figures);
        pieces.push(&mut self.route_paths);
        pieces.push(&mut self.formations);
        pieces.push(&mut self.formation_totals);
        pieces.push(&mut self.city_data);
        pieces.push(&mut self.city_faction_unknown);
        pieces.push(&mut self.player_name);
        pieces.push(&mut self.city_faction);
        pieces.push(&mut self.buildings);
        pieces.push(&mut self.city_view_orientation);
        pieces.push(&mut self.game_time);
        pieces.push(&mut self.building_extra_highest_id_ever);
        pieces.push(&mut self.random_iv);
        pieces.push(&mut self.city_view_camera);
        pieces.push(&mut self.building_count_culture1);
        pieces.push(&mut self.city_graph_order);
        pieces.push(&mut self.emperor_change_time);
        pieces.push(&mut self.empire);
        pieces.push(&mut self.empire_cities);
        pieces.push(&mut self.building_count_industry);
        pieces.push(&mut self.trade_prices);
        pieces.push(&mut self.figure_names);
        pieces.push(&mut self.culture_coverage);
        pieces.push(&mut self.scenario);
        pieces.push(&mut self.max_game_year);
        pieces.push(&mut self.earthquake);
        pieces.push(&mut self.emperor_change_state);
        pieces.push(&mut self.messages);
        pieces.push(&mut self.message_extra);
        pieces.push(&mut self.population_messages);
        pieces.push(&mut self.message_counts);
        pieces.push(&mut self.message_delays);
        pieces.push(&mut self.building_list_burning_totals);
        pieces.push(&mut self.figure_sequence);
        pieces.push(&mut self.scenario_settings);
        pieces.push(&mut self.invasion_warnings);
        pieces.push(&mut self.scenario_is_custom);
        pieces.push(&mut self.city_sounds);
        pieces.push(&mut self.building_extra_highest_id);
        pieces.push(&mut self.figure_traders);
        pieces.push(&mut self.building_list_burning);
        pieces.push(&mut self.building_list_small);
        pieces.push(&mut self.building_list_large);
        pieces.push(&mut self.tutorial_part1);
        pieces.push(&mut self.building_count_military);
        pieces.push(&mut self.enemy_army_totals);
        pieces.push(&mut self.building_storages);
        pieces.push(&mut self.building_count_culture2);
        pieces.push(&mut self.building_count_support);
        pieces.push(&mut self.tutorial_part2);
        pieces.push(&mut self.gladiator_revolt);
        pieces.push(&mut self.trade_route_limit);
        pieces.push(&mut self.trade_route_traded);
        pieces.push(&mut self.building_barracks_tower_sentry);
        pieces.push(&mut self.building_extra_sequence);
        pieces.push(&mut self.routing_counters);
        pieces.push(&mut self.building_count_culture3);
        pieces.push(&mut self.enemy_armies);
        pieces.push(&mut self.city_entry_exit_xy);
        pieces.push(&mut self.last_invasion_id);
        pieces.push(&mut self.building_extra_corrupt_houses);
        pieces.push(&mut self.scenario_name);
        pieces.push(&mut self.bookmarks);
        pieces.push(&mut self.tutorial_part3);
        pieces.push(&mut self.city_entry_exit_grid_offset);
        pieces.push(&mut self.end_marker);
        if let Some(deliveries) = self.deliveries.as_mut() {
            pieces.push(deliveries);
        }
        pieces
    }

    pub fn descriptors(&self) -> Vec<PieceDescriptor> {
        let mut descriptors = Vec::with_capacity(84);
        descriptors.push(self.scenario_campaign_mission.descriptor("scenario_campaign_mission"));
        descriptors.push(self.file_version.descriptor("file_version"));
        if let Some(image_grid) = self.image_grid.as_ref() {
            descriptors.push(image_grid.descriptor("image_grid"));
        }
        descriptors.push(self.edge_grid.descriptor("edge_grid"));
        descriptors.push(self.building_grid.descriptor("building_grid"));
        descriptors.push(self.terrain_grid.descriptor("terrain_grid"));
        descriptors.push(self.aqueduct_grid.descriptor("aqueduct_grid"));
        descriptors.push(self.figure_grid.descriptor("figure_grid"));
        descriptors.push(self.bitfields_grid.descriptor("bitfields_grid"));
        descriptors.push(self.sprite_grid.descriptor("sprite_grid"));
        descriptors.push(self.random_grid.descriptor("random_grid"));
        descriptors.push(self.desirability_grid.descriptor("desirability_grid"));
        descriptors.push(self.elevation_grid.descriptor("elevation_grid"));
        descriptors.push(self.building_damage_grid.descriptor("building_damage_grid"));
        descriptors.push(self.aqueduct_backup_grid.descriptor("aqueduct_backup_grid"));
        descriptors.push(self.sprite_backup_grid.descriptor("sprite_backup_grid"));
        descriptors.push(self.figures.descriptor("figures"));
        descriptors.push(self.route_figures.descriptor("route_figures"));
        descriptors.push(self.route_paths.descriptor("route_paths"));
        descriptors.push(self.formations.descriptor("formations"));
        descriptors.push(self.formation_totals.descriptor("formation_totals"));
        descriptors.push(self.city_data.descriptor("city_data"));
        descriptors.push(self.city_faction_unknown.descriptor("city_faction_unknown"));
        descriptors.push(self.player_name.descriptor("player_name"));
        descriptors.push(self.city_faction.descriptor("city_faction"));
        descriptors.push(self.buildings.descriptor("buildings"));
        descriptors.push(self.city_view_orientation.descriptor("city_view_orientation"));
        descriptors.push(self.game_time.descriptor("game_time"));
        descriptors
            .push(self.building_extra_highest_id_ever.descriptor("building_extra_highest_id_ever"));
        descriptors.push(self.random_iv.descriptor("random_iv"));
        descriptors.push(self.city_view_camera.descriptor("city_view_camera"));
        descriptors.push(self.building_count_culture1.descriptor("building_count_culture1"));
        descriptors.push(self.city_graph_order.descriptor("city_graph_order"));
        descriptors.push(self.emperor_change_time.descriptor("emperor_change_time"));
        descriptors.push(self.empire.descriptor("empire"));
        descriptors.push(self.empire_cities.descriptor("empire_cities"));
        descriptors.push(self.building_count_industry.descriptor("building_count_industry"));
        descriptors.push(self.trade_prices.descriptor("trade_prices"));
        descriptors.push(self.figure_names.descriptor("figure_names"));
        descriptors.push(self.culture_coverage.descriptor("culture_coverage"));
        descriptors.push(self.scenario.descriptor("scenario"));
        descriptors.push(self.max_game_year.descriptor("max_game_year"));
        descriptors.push(self.earthquake.descriptor("earthquake"));
        descriptors.push(self.emperor_change_state.descriptor("emperor_change_state"));
        descriptors.push(self.messages.descriptor("messages"));
        descriptors.push(self.message_extra.descriptor("message_extra"));
        descriptors.push(self.population_messages.descriptor("population_messages"));
        descriptors.push(self.message_counts.descriptor("message_counts"));
        descriptors.push(self.message_delays.descriptor("message_delays"));
        descriptors
            .push(self.building_list_burning_totals.descriptor("building_list_burning_totals"));
        descriptors.push(self.figure_sequence.descriptor("figure_sequence"));
        descriptors.push(self.scenario_settings.descriptor("scenario_settings"));
        descriptors.push(self.invasion_warnings.descriptor("invasion_warnings"));
        descriptors.push(self.scenario_is_custom.descriptor("scenario_is_custom"));
        descriptors.push(self.city_sounds.descriptor("city_sounds"));
        descriptors.push(self.building_extra_highest_id.descriptor("building_extra_highest_id"));
        descriptors.push(self.figure_traders.descriptor("figure_traders"));
        descriptors.push(self.building_list_burning.descriptor("building_list_burning"));
        descriptors.push(self.building_list_small.descriptor("building_list_small"));
        descriptors.push(self.building_list_large.descriptor("building_list_large"));
        descriptors.push(self.tutorial_part1.descriptor("tutorial_part1"));
        descriptors.push(self.building_count_military.descriptor("building_count_military"));
        descriptors.push(self.enemy_army_totals.descriptor("enemy_army_totals"));
        descriptors.push(self.building_storages.descriptor("building_storages"));
        descriptors.push(self.building_count_culture2.descriptor("building_count_culture2"));
        descriptors.push(self.building_count_support.descriptor("building_count_support"));
        descriptors.push(self.tutorial_part2.descriptor("tutorial_part2"));
        descriptors.push(self.gladiator_revolt.descriptor("gladiator_revolt"));
        descriptors.push(self.trade_route_limit.descriptor("trade_route_limit"));
        descriptors.push(self.trade_route_traded.descriptor("trade_route_traded"));
        descriptors
            .push(self.building_barracks_tower_sentry.descriptor("building_barracks_tower_sentry"));
        descriptors.push(self.building_extra_sequence.descriptor("building_extra_sequence"));
        descriptors.push(self.routing_counters.descriptor("routing_counters"));
        descriptors.push(self.building_count_culture3.descriptor("building_count_culture3"));
        descriptors.push(self.enemy_armies.descriptor("enemy_armies"));
        descriptors.push(self.city_entry_exit_xy.descriptor("city_entry_exit_xy"));
        descriptors.push(self.last_invasion_id.descriptor("last_invasion_id"));
        descriptors
            .push(self.building_extra_corrupt_houses.descriptor("building_extra_corrupt_houses"));
        descriptors.push(self.scenario_name.descriptor("scenario_name"));
        descriptors.push(self.bookmarks.descriptor("bookmarks"));
        descriptors.push(self.tutorial_part3.descriptor("tutorial_part3"));
        descriptors
            .push(self.city_entry_exit_grid_offset.descriptor("city_entry_exit_grid_offset"));
        descriptors.push(self.end_marker.descriptor("end_marker"));
        if let Some(deliveries) = self.deliveries.as_ref() {
            descriptors.push(deliveries.descriptor("deliveries"));
        }
        descriptors
    }

    /// Decodes every piece into `game`, honoring the registry's layout.
    pub fn load_into(&mut self, game: &mut GameState) -> io::Result<()> {
        let layout = self.layout;

        game.settings
            .load_mission_state(&mut self.scenario_campaign_mission.buf)?;
        game.settings.load_state(&mut self.scenario_settings.buf)?;
        game.settings
            .load_is_custom_state(&mut self.scenario_is_custom.buf)?;
        game.settings
            .load_player_name_state(&mut self.player_name.buf)?;
        game.settings
            .load_scenario_name_state(&mut self.scenario_name.buf)?;

        game.scenario.load_state(&mut self.scenario.buf)?;

        game.map
            .load_building_state(&mut self.building_grid.buf, &mut self.building_damage_grid.buf)?;
        game.map.load_terrain_state(
            &mut self.terrain_grid.buf,
            !layout.legacy_terrain,
            self.image_grid.as_mut().map(|piece| &mut piece.buf),
            layout.legacy_image_ids,
        )?;
        game.map
            .load_aqueduct_state(&mut self.aqueduct_grid.buf, &mut self.aqueduct_backup_grid.buf)?;
        game.map.load_figure_state(&mut self.figure_grid.buf)?;
        game.map
            .load_sprite_state(&mut self.sprite_grid.buf, &mut self.sprite_backup_grid.buf)?;
        game.map
            .load_property_state(&mut self.bitfields_grid.buf, &mut self.edge_grid.buf)?;
        game.map.load_random_state(&mut self.random_grid.buf)?;
        game.map
            .load_desirability_state(&mut self.desirability_grid.buf)?;
        game.map.load_elevation_state(&mut self.elevation_grid.buf)?;
        game.figures.load_state(
            &mut self.figures.buf,
            &mut self.figure_sequence.buf,
            layout.extended_records,
        )?;
        game.figures
            .load_route_state(&mut self.route_figures.buf, &mut self.route_paths.buf)?;
        game.formations.load_state(
            &mut self.formations.buf,
            &mut self.formation_totals.buf,
            layout.extended_records,
        )?;

        game.city.load_state(
            &mut self.city_data.buf,
            &mut self.city_faction.buf,
            &mut self.city_faction_unknown.buf,
            &mut self.city_graph_order.buf,
            &mut self.city_entry_exit_xy.buf,
            &mut self.city_entry_exit_grid_offset.buf,
            layout.separate_import_export,
        )?;

        game.buildings
            .load_state(&mut self.buildings.buf, layout.extended_records)?;
        game.buildings.load_extra_state(
            &mut self.building_extra_sequence.buf,
            &mut self.building_extra_corrupt_houses.buf,
        )?;
        game.buildings
            .load_barracks_state(&mut self.building_barracks_tower_sentry.buf)?;
        game.view.load_state(
            &mut self.city_view_orientation.buf,
            &mut self.city_view_camera.buf,
        )?;
        game.time.load_state(&mut self.game_time.buf)?;
        game.random.load_state(&mut self.random_iv.buf)?;
        game.buildings.counts.load_state(
            &mut self.building_count_culture1.buf,
            &mut self.building_count_industry.buf,
            &mut self.building_count_culture2.buf,
            &mut self.building_count_culture3.buf,
            &mut self.building_count_military.buf,
            &mut self.building_count_support.buf,
            layout.dynamic_building_counts,
        )?;
        if layout.recompute_granary_capacity {
            game.buildings.update_built_granaries_capacity();
        }

        game.events.load_emperor_change_state(
            &mut self.emperor_change_time.buf,
            &mut self.emperor_change_state.buf,
        )?;
        game.empire.load_state(&mut self.empire.buf)?;
        game.empire.load_city_state(&mut self.empire_cities.buf)?;
        game.empire
            .load_trade_price_state(&mut self.trade_prices.buf)?;
        game.figures.load_name_state(&mut self.figure_names.buf)?;
        game.city.load_culture_state(&mut self.culture_coverage.buf)?;

        game.events.load_max_year_state(&mut self.max_game_year.buf)?;
        game.events.load_earthquake_state(&mut self.earthquake.buf)?;
        game.city.load_message_state(
            &mut self.messages.buf,
            &mut self.message_extra.buf,
            &mut self.message_counts.buf,
            &mut self.message_delays.buf,
            &mut self.population_messages.buf,
        )?;
        game.city.load_sound_state(&mut self.city_sounds.buf)?;
        game.figures.load_trader_state(&mut self.figure_traders.buf)?;

        game.buildings.lists.load_state(
            &mut self.building_list_burning.buf,
            &mut self.building_list_small.buf,
            &mut self.building_list_large.buf,
            &mut self.building_list_burning_totals.buf,
            !layout.extended_records,
        )?;

        game.events.load_tutorial_state(
            &mut self.tutorial_part1.buf,
            &mut self.tutorial_part2.buf,
            &mut self.tutorial_part3.buf,
        )?;

        game.buildings
            .load_storage_state(&mut self.building_storages.buf)?;
        game.events
            .load_gladiator_revolt_state(&mut self.gladiator_revolt.buf)?;
        game.empire.load_trade_route_state(
            &mut self.trade_route_limit.buf,
            &mut self.trade_route_traded.buf,
        )?;
        game.map.load_routing_state(&mut self.routing_counters.buf)?;
        game.formations.load_enemy_army_state(
            &mut self.enemy_armies.buf,
            &mut self.enemy_army_totals.buf,
        )?;
        game.events.load_invasion_state(
            &mut self.invasion_warnings.buf,
            &mut self.last_invasion_id.buf,
        )?;
        game.map.load_bookmark_state(&mut self.bookmarks.buf)?;

        // The end marker is consumed in two skips, matching the historical
        // reader. The second skip runs off the end and clamps.
        self.end_marker.buf.skip(284);
        self.end_marker.buf.skip(8);

        match self.deliveries.as_mut() {
            None => game.buildings.initialize_deliveries(),
            Some(deliveries) => game.buildings.load_deliveries_state(&mut deliveries.buf)?,
        }

        // Image ids are derived data; rebuild rather than trust the file.
        game.map.rebuild_images();
        Ok(())
    }

    /// Encodes `game` into the pieces. The registry must have been built at
    /// [`SAVE_GAME_CURRENT_VERSION`]; saves never downgrade.
    pub fn save_from(&mut self, game: &GameState) -> io::Result<()> {
        self.file_version
            .buf
            .write_i32(SAVE_GAME_CURRENT_VERSION as i32)?;

        game.settings
            .save_mission_state(&mut self.scenario_campaign_mission.buf)?;
        game.settings.save_state(&mut self.scenario_settings.buf)?;
        game.settings
            .save_is_custom_state(&mut self.scenario_is_custom.buf)?;
        game.settings
            .save_player_name_state(&mut self.player_name.buf)?;
        game.settings
            .save_scenario_name_state(&mut self.scenario_name.buf)?;

        game.map
            .save_building_state(&mut self.building_grid.buf, &mut self.building_damage_grid.buf)?;
        game.map.save_terrain_state(&mut self.terrain_grid.buf)?;
        game.map
            .save_aqueduct_state(&mut self.aqueduct_grid.buf, &mut self.aqueduct_backup_grid.buf)?;
        game.map.save_figure_state(&mut self.figure_grid.buf)?;
        game.map
            .save_sprite_state(&mut self.sprite_grid.buf, &mut self.sprite_backup_grid.buf)?;
        game.map
            .save_property_state(&mut self.bitfields_grid.buf, &mut self.edge_grid.buf)?;
        game.map.save_random_state(&mut self.random_grid.buf)?;
        game.map
            .save_desirability_state(&mut self.desirability_grid.buf)?;
        game.map.save_elevation_state(&mut self.elevation_grid.buf)?;

        game.figures
            .save_state(&mut self.figures.buf, &mut self.figure_sequence.buf)?;
        game.figures
            .save_route_state(&mut self.route_figures.buf, &mut self.route_paths.buf)?;
        game.formations
            .save_state(&mut self.formations.buf, &mut self.formation_totals.buf)?;

        game.city.save_state(
            &mut self.city_data.buf,
            &mut self.city_faction.buf,
            &mut self.city_faction_unknown.buf,
            &mut self.city_graph_order.buf,
            &mut self.city_entry_exit_xy.buf,
            &mut self.city_entry_exit_grid_offset.buf,
        )?;

        game.buildings.save_state(&mut self.buildings.buf)?;
        game.buildings.save_extra_state(
            &mut self.building_extra_sequence.buf,
            &mut self.building_extra_highest_id.buf,
            &mut self.building_extra_highest_id_ever.buf,
            &mut self.building_extra_corrupt_houses.buf,
        )?;
        game.buildings
            .save_barracks_state(&mut self.building_barracks_tower_sentry.buf)?;
        game.view.save_state(
            &mut self.city_view_orientation.buf,
            &mut self.city_view_camera.buf,
        )?;
        game.time.save_state(&mut self.game_time.buf)?;
        game.random.save_state(&mut self.random_iv.buf)?;
        game.buildings.counts.save_state(
            &mut self.building_count_culture1.buf,
            &mut self.building_count_industry.buf,
            &mut self.building_count_culture2.buf,
            &mut self.building_count_culture3.buf,
            &mut self.building_count_military.buf,
            &mut self.building_count_support.buf,
        )?;

        game.events.save_emperor_change_state(
            &mut self.emperor_change_time.buf,
            &mut self.emperor_change_state.buf,
        )?;
        game.empire.save_state(&mut self.empire.buf)?;
        game.empire.save_city_state(&mut self.empire_cities.buf)?;
        game.empire
            .save_trade_price_state(&mut self.trade_prices.buf)?;
        game.figures.save_name_state(&mut self.figure_names.buf)?;
        game.city.save_culture_state(&mut self.culture_coverage.buf)?;

        game.scenario.save_state(&mut self.scenario.buf)?;

        game.events.save_max_year_state(&mut self.max_game_year.buf)?;
        game.events.save_earthquake_state(&mut self.earthquake.buf)?;
        game.city.save_message_state(
            &mut self.messages.buf,
            &mut self.message_extra.buf,
            &mut self.message_counts.buf,
            &mut self.message_delays.buf,
            &mut self.population_messages.buf,
        )?;
        game.city.save_sound_state(&mut self.city_sounds.buf)?;
        game.figures.save_trader_state(&mut self.figure_traders.buf)?;

        game.buildings.lists.save_state(
            &mut self.building_list_burning.buf,
            &mut self.building_list_small.buf,
            &mut self.building_list_large.buf,
            &mut self.building_list_burning_totals.buf,
        )?;

        game.events.save_tutorial_state(
            &mut self.tutorial_part1.buf,
            &mut self.tutorial_part2.buf,
            &mut self.tutorial_part3.buf,
        )?;

        game.buildings
            .save_storage_state(&mut self.building_storages.buf)?;
        game.events
            .save_gladiator_revolt_state(&mut self.gladiator_revolt.buf)?;
        game.empire.save_trade_route_state(
            &mut self.trade_route_limit.buf,
            &mut self.trade_route_traded.buf,
        )?;
        game.map.save_routing_state(&mut self.routing_counters.buf)?;
        game.formations.save_enemy_army_state(
            &mut self.enemy_armies.buf,
            &mut self.enemy_army_totals.buf,
        )?;
        game.events.save_invasion_state(
            &mut self.invasion_warnings.buf,
            &mut self.last_invasion_id.buf,
        )?;
        game.map.save_bookmark_state(&mut self.bookmarks.buf)?;

        self.end_marker.buf.skip(284);

        if let Some(deliveries) = self.deliveries.as_mut() {
            game.buildings.save_deliveries_state(&mut deliveries.buf)?;
        }
        Ok(())
    }
}

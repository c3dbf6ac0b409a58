//! Owners of the decoded simulation state.
//!
//! Each type exposes `load_state`/`save_state`-style functions that fully
//! consume or produce the piece buffers handed to them by the codecs; the
//! codecs themselves never interpret a subsystem's bytes.

pub mod buildings;
pub mod city;
pub mod empire;
pub mod events;
pub mod figures;
pub mod formations;
pub mod map;

pub use buildings::BuildingState;
pub use city::{CityState, CityView, GameTime, RandomState};
pub use empire::EmpireState;
pub use events::{EventState, ScenarioRules, ScenarioSettings};
pub use figures::FigureState;
pub use formations::FormationState;
pub use map::MapState;

/// The full simulation state the serialization engine moves to and from
/// disk. Construction gives an empty city at current-format defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameState {
    pub settings: ScenarioSettings,
    pub scenario: ScenarioRules,
    pub map: MapState,
    pub figures: FigureState,
    pub formations: FormationState,
    pub city: CityState,
    pub buildings: BuildingState,
    pub view: CityView,
    pub time: GameTime,
    pub random: RandomState,
    pub empire: EmpireState,
    pub events: EventState,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }
}

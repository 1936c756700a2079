mod events;
mod params;
mod results;

pub use events::{LifeEvent, LifeEventKind};
pub use params::{DEFAULT_START_CALENDAR_YEAR, SimulationParams};
pub use results::{PercentileBands, SimulationProgress, SimulationResult};

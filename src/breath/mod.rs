pub mod engine;
pub mod state;

pub use engine::{BreathCycleEngine, EngineEvent};
pub use state::{EngineState, Phase, PhaseDurations, PHASE_COUNT};

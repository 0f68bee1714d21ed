pub mod positioner;
pub mod size;

pub use positioner::{DotPosition, DotPositioner, Surface, CENTER, MAX_R_PCT, PADDING_PCT};
pub use size::{DotSize, MIN_TRANSITION_SECS};

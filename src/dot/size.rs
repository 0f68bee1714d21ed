use serde::Serialize;

use crate::breath::Phase;
use crate::settings::Configuration;

/// Shortest animation handed to the view, so a zero-length phase still gets a
/// (near-instant) transition.
pub const MIN_TRANSITION_SECS: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DotSize {
    /// Size at the start of the phase.
    pub from: f32,
    /// Size the dot animates towards during the phase.
    pub target: f32,
    pub transition_secs: f32,
}

impl DotSize {
    pub fn for_phase(phase: Phase, config: &Configuration) -> Self {
        let (from, target) = match phase {
            Phase::Inhale => (config.dot_min, config.dot_max),
            Phase::Hold1 => (config.dot_max, config.dot_max),
            Phase::Exhale => (config.dot_max, config.dot_min),
            Phase::Hold2 => (config.dot_min, config.dot_min),
        };
        let duration = config.durations().of(phase);
        Self {
            from,
            target,
            transition_secs: (duration as f32).max(MIN_TRANSITION_SECS),
        }
    }

    /// Linear interpolation for views that draw frames themselves instead of
    /// running a transition.
    pub fn at_remaining(&self, remaining_secs: u32) -> f32 {
        let elapsed = (self.transition_secs - remaining_secs as f32).max(0.0);
        let t = (elapsed / self.transition_secs).clamp(0.0, 1.0);
        self.from + (self.target - self.from) * t
    }
}

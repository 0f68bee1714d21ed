use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PHASE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Inhale,
    Hold1,
    Exhale,
    Hold2,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Inhale
    }
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::Inhale => Phase::Hold1,
            Phase::Hold1 => Phase::Exhale,
            Phase::Exhale => Phase::Hold2,
            Phase::Hold2 => Phase::Inhale,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::Hold1 | Phase::Hold2 => "Hold",
            Phase::Exhale => "Exhale",
        }
    }
}

/// Per-phase durations in whole seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    pub inhale: u32,
    pub hold1: u32,
    pub exhale: u32,
    pub hold2: u32,
}

impl PhaseDurations {
    pub fn of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::Hold1 => self.hold1,
            Phase::Exhale => self.exhale,
            Phase::Hold2 => self.hold2,
        }
    }

    pub fn cycle_seconds(&self) -> u64 {
        [self.inhale, self.hold1, self.exhale, self.hold2]
            .iter()
            .map(|secs| u64::from(*secs))
            .sum()
    }

    pub fn all_zero(&self) -> bool {
        self.cycle_seconds() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub running: bool,
    pub current_phase: Phase,
    pub phase_remaining_seconds: u32,
    pub cycles_completed: u64,
    pub session_elapsed_seconds: u64,
    /// First activation of the session; pause/resume leave it alone.
    pub session_started_at: Option<DateTime<Utc>>,
}

impl EngineState {
    pub fn new(durations: &PhaseDurations) -> Self {
        Self {
            running: false,
            current_phase: Phase::default(),
            phase_remaining_seconds: durations.of(Phase::default()),
            cycles_completed: 0,
            session_elapsed_seconds: 0,
            session_started_at: None,
        }
    }
}

use chrono::Utc;

use super::{EngineState, Phase, PhaseDurations, PHASE_COUNT};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    PhaseChanged { phase: Phase },
    CycleCompleted { cycles_completed: u64 },
    RecenterRequested,
}

/// The breathing phase clock. Advances only through [`BreathCycleEngine::tick`]
/// and the start/pause/reset controls; never fails.
#[derive(Debug, Clone)]
pub struct BreathCycleEngine {
    state: EngineState,
    durations: PhaseDurations,
    holding_degenerate: bool,
}

impl BreathCycleEngine {
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            state: EngineState::new(&durations),
            durations,
            holding_degenerate: false,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// New durations apply from the next phase boundary; the active countdown
    /// is left as it is. Zeroing the active phase ends it on the next tick.
    pub fn set_durations(&mut self, durations: PhaseDurations) {
        self.durations = durations;
    }

    /// Returns the events of skipping a zero-length opening phase, which is
    /// over before the first tick.
    pub fn start(&mut self) -> Vec<EngineEvent> {
        if self.state.running {
            return Vec::new();
        }
        self.state.running = true;
        if self.state.session_started_at.is_none() {
            self.state.session_started_at = Some(Utc::now());
        }

        if self.state.phase_remaining_seconds == 0 && !self.durations.all_zero() {
            return self.cross_boundary();
        }
        Vec::new()
    }

    pub fn pause(&mut self) {
        self.state.running = false;
    }

    pub fn reset(&mut self) -> Vec<EngineEvent> {
        self.state = EngineState::new(&self.durations);
        self.holding_degenerate = false;
        vec![EngineEvent::RecenterRequested]
    }

    /// One fixed period of the clock. Returns the events emitted while
    /// advancing, in order.
    pub fn tick(&mut self) -> Vec<EngineEvent> {
        if !self.state.running {
            return Vec::new();
        }

        self.state.session_elapsed_seconds += 1;

        if self.durations.of(self.state.current_phase) == 0 {
            return self.cross_boundary();
        }

        if self.state.phase_remaining_seconds > 1 {
            self.state.phase_remaining_seconds -= 1;
            return Vec::new();
        }

        self.cross_boundary()
    }

    fn cross_boundary(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();

        if self.durations.all_zero() {
            if !self.holding_degenerate {
                log_warn!("all phase durations are zero; holding at inhale");
                self.holding_degenerate = true;
            }
            self.state.current_phase = Phase::Inhale;
            self.state.phase_remaining_seconds = 1;
            return events;
        }
        self.holding_degenerate = false;

        // A non-degenerate cycle reaches a non-empty phase within one lap.
        for _ in 0..PHASE_COUNT {
            let completed_exhale = self.state.current_phase == Phase::Exhale;
            let phase = self.state.current_phase.next();
            self.state.current_phase = phase;
            events.push(EngineEvent::PhaseChanged { phase });

            if completed_exhale {
                self.state.cycles_completed += 1;
                events.push(EngineEvent::CycleCompleted {
                    cycles_completed: self.state.cycles_completed,
                });
            }

            self.state.phase_remaining_seconds = self.durations.of(phase);
            if self.state.phase_remaining_seconds > 0 {
                break;
            }
            log_debug!("skipping zero-length {:?}", phase);
        }

        events
    }
}

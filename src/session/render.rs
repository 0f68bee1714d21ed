use serde::Serialize;

use crate::breath::{EngineState, Phase};
use crate::dot::{DotPosition, DotSize};
use crate::settings::Configuration;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DotRender {
    pub position: DotPosition,
    pub target_size: f32,
    pub current_size: f32,
    pub transition_secs: f32,
}

/// Everything the view needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub running: bool,
    pub sound_enabled: bool,
    pub phase: Phase,
    pub phase_label: &'static str,
    /// `None` while the active phase is configured as zero seconds.
    pub phase_remaining_seconds: Option<u32>,
    pub cycles_completed: u64,
    pub cycles_goal: u32,
    pub elapsed: String,
    pub progress_percent: u8,
    pub dot: DotRender,
}

impl RenderModel {
    pub fn build(
        state: &EngineState,
        config: &Configuration,
        position: DotPosition,
        sound_enabled: bool,
    ) -> Self {
        let phase = state.current_phase;
        let size = DotSize::for_phase(phase, config);
        let phase_remaining_seconds = if config.durations().of(phase) == 0 {
            None
        } else {
            Some(state.phase_remaining_seconds)
        };

        Self {
            running: state.running,
            sound_enabled,
            phase,
            phase_label: phase.label(),
            phase_remaining_seconds,
            cycles_completed: state.cycles_completed,
            cycles_goal: config.cycles_goal,
            elapsed: format_elapsed(state.session_elapsed_seconds),
            progress_percent: progress_percent(state.cycles_completed, config.cycles_goal),
            dot: DotRender {
                position,
                target_size: size.target,
                current_size: size.at_remaining(state.phase_remaining_seconds),
                transition_secs: size.transition_secs,
            },
        }
    }
}

pub fn progress_percent(cycles_completed: u64, cycles_goal: u32) -> u8 {
    let goal = u64::from(cycles_goal.max(1));
    let percent = (100.0 * cycles_completed as f64 / goal as f64).round();
    percent.min(100.0) as u8
}

/// `mm:ss`; minutes keep counting past an hour.
pub fn format_elapsed(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

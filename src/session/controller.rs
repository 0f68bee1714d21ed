use std::time::Instant;

use crate::audio::{ChimePlayer, CYCLE_COMPLETE_CUE, PHASE_CHANGE_CUE};
use crate::breath::{BreathCycleEngine, EngineEvent, EngineState};
use crate::dot::{DotPosition, DotPositioner, Surface};
use crate::settings::{ConfigEdit, Configuration};

use super::input::{ControlInput, ToggleDebouncer};
use super::render::RenderModel;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Synchronous session core: owns the configuration and wires engine events
/// to the chime and the dot positioner.
pub struct SessionController {
    config: Configuration,
    engine: BreathCycleEngine,
    positioner: DotPositioner,
    chime: Box<dyn ChimePlayer>,
    sound_enabled: bool,
    debouncer: ToggleDebouncer,
}

impl SessionController {
    pub fn new(config: Configuration, chime: Box<dyn ChimePlayer>) -> Self {
        Self::with_positioner(config, chime, DotPositioner::new())
    }

    pub fn with_positioner(
        config: Configuration,
        chime: Box<dyn ChimePlayer>,
        positioner: DotPositioner,
    ) -> Self {
        let config = config.sanitized();
        Self {
            engine: BreathCycleEngine::new(config.durations()),
            config,
            positioner,
            chime,
            sound_enabled: true,
            debouncer: ToggleDebouncer::default(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn engine_state(&self) -> &EngineState {
        self.engine.state()
    }

    pub fn dot_position(&self) -> DotPosition {
        self.positioner.position()
    }

    pub fn dot_moves(&self) -> u64 {
        self.positioner.moves()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn set_surface(&mut self, surface: Option<Surface>) {
        self.positioner.set_surface(surface);
    }

    pub fn apply_edit(&mut self, edit: ConfigEdit) {
        self.config.apply(edit);
        self.engine.set_durations(self.config.durations());
        log_debug!("config edit {:?} -> {:?}", edit, self.config);
    }

    pub fn start(&mut self) {
        let events = self.engine.start();
        self.dispatch(&events);
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    /// Starts or pauses; returns the new running state.
    pub fn toggle_running(&mut self) -> bool {
        if self.engine.is_running() {
            self.engine.pause();
        } else {
            self.start();
        }
        self.engine.is_running()
    }

    /// Debounced toggle for UI and keyboard input. Returns whether the press
    /// changed anything.
    pub fn press(&mut self, input: &ControlInput, now: Instant) -> bool {
        if !self.debouncer.admit(input, now) {
            return false;
        }
        self.toggle_running();
        true
    }

    pub fn reset(&mut self) {
        let state = self.engine.state();
        if state.session_elapsed_seconds > 0 {
            log_info!(
                "session reset after {}s with {} cycle(s) completed",
                state.session_elapsed_seconds,
                state.cycles_completed
            );
        }
        let events = self.engine.reset();
        self.dispatch(&events);
    }

    pub fn tick(&mut self) -> Vec<EngineEvent> {
        let events = self.engine.tick();
        self.dispatch(&events);
        events
    }

    pub fn render_model(&self) -> RenderModel {
        RenderModel::build(
            self.engine.state(),
            &self.config,
            self.positioner.position(),
            self.sound_enabled,
        )
    }

    fn dispatch(&mut self, events: &[EngineEvent]) {
        for event in events {
            match *event {
                EngineEvent::PhaseChanged { phase } => {
                    log_debug!("phase -> {:?}", phase);
                    if self.config.chime_on_phase_change && self.sound_enabled {
                        self.chime.play_cue(self.config.volume, PHASE_CHANGE_CUE);
                    }
                }
                EngineEvent::CycleCompleted { cycles_completed } => {
                    log_info!(
                        "cycle {}/{} completed",
                        cycles_completed,
                        self.config.cycles_goal
                    );
                    self.positioner.move_random();
                    if self.config.chime_on_cycle && self.sound_enabled {
                        self.chime.play_cue(self.config.volume, CYCLE_COMPLETE_CUE);
                    }
                }
                EngineEvent::RecenterRequested => self.positioner.recenter(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::Phase;
    use crate::dot::CENTER;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct RecordingChime {
        played: Arc<Mutex<Vec<(f32, f32, f32)>>>,
    }

    impl ChimePlayer for RecordingChime {
        fn play(&self, volume: f32, frequency_hz: f32, duration_secs: f32) {
            self.played
                .lock()
                .unwrap()
                .push((volume, frequency_hz, duration_secs));
        }
    }

    impl RecordingChime {
        fn frequencies(&self) -> Vec<f32> {
            self.played.lock().unwrap().iter().map(|p| p.1).collect()
        }
    }

    fn controller(config: Configuration) -> (SessionController, RecordingChime) {
        let chime = RecordingChime::default();
        let mut positioner = DotPositioner::with_seed(42);
        positioner.set_surface(Some(Surface {
            width: 1024.0,
            height: 768.0,
        }));
        let controller =
            SessionController::with_positioner(config, Box::new(chime.clone()), positioner);
        (controller, chime)
    }

    #[test]
    fn default_session_moves_dot_once_per_cycle() {
        let (mut session, chime) = controller(Configuration::default());
        session.start();

        let mut cycle_events = 0;
        for _ in 0..14 {
            cycle_events += session
                .tick()
                .iter()
                .filter(|event| matches!(event, EngineEvent::CycleCompleted { .. }))
                .count();
        }

        assert_eq!(cycle_events, 1);
        assert_eq!(session.dot_moves(), 1);
        assert_ne!(session.dot_position(), CENTER);
        // Four phase changes plus the cycle cue.
        assert_eq!(
            chime.frequencies(),
            vec![
                PHASE_CHANGE_CUE.frequency_hz,
                PHASE_CHANGE_CUE.frequency_hz,
                PHASE_CHANGE_CUE.frequency_hz,
                CYCLE_COMPLETE_CUE.frequency_hz,
                PHASE_CHANGE_CUE.frequency_hz,
            ]
        );
    }

    #[test]
    fn chimes_follow_flags_and_sound_toggle() {
        let config = Configuration {
            chime_on_phase_change: false,
            ..Configuration::default()
        };
        let (mut session, chime) = controller(config);
        session.start();
        for _ in 0..14 {
            session.tick();
        }
        assert_eq!(chime.frequencies(), vec![CYCLE_COMPLETE_CUE.frequency_hz]);

        session.set_sound_enabled(false);
        for _ in 0..14 {
            session.tick();
        }
        assert_eq!(chime.frequencies().len(), 1);
        assert_eq!(session.dot_moves(), 2);
    }

    #[test]
    fn chime_uses_configured_volume() {
        let (mut session, chime) = controller(Configuration::default());
        session.apply_edit(ConfigEdit::Volume(0.25));
        session.start();
        for _ in 0..4 {
            session.tick();
        }
        let played = chime.played.lock().unwrap().clone();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].0, 0.25);
    }

    #[test]
    fn reset_recenters_dot_and_clears_counters() {
        let (mut session, _chime) = controller(Configuration::default());
        session.start();
        for _ in 0..30 {
            session.tick();
        }
        assert_ne!(session.dot_position(), CENTER);

        session.reset();
        let state = session.engine_state();
        assert!(!state.running);
        assert_eq!(state.current_phase, Phase::Inhale);
        assert_eq!(state.phase_remaining_seconds, 4);
        assert_eq!(state.cycles_completed, 0);
        assert_eq!(state.session_elapsed_seconds, 0);
        assert!(state.session_started_at.is_none());
        assert_eq!(session.dot_position(), CENTER);
    }

    #[test]
    fn toggle_keeps_first_start_instant() {
        let (mut session, _chime) = controller(Configuration::default());
        assert!(session.toggle_running());
        let started = session.engine_state().session_started_at;
        assert!(!session.toggle_running());
        assert!(session.toggle_running());
        assert_eq!(session.engine_state().session_started_at, started);
    }

    #[test]
    fn debounced_press_toggles_once() {
        let (mut session, _chime) = controller(Configuration::default());
        let t0 = Instant::now();
        assert!(session.press(&ControlInput::key(" ", false), t0));
        assert!(!session.press(
            &ControlInput::key(" ", true),
            t0 + Duration::from_millis(30)
        ));
        assert!(!session.press(
            &ControlInput::Button,
            t0 + Duration::from_millis(60)
        ));
        assert!(session.is_running());
    }

    #[test]
    fn render_model_reflects_progress() {
        let config = Configuration {
            cycles_goal: 4,
            ..Configuration::default()
        };
        let (mut session, _chime) = controller(config);
        session.start();
        for _ in 0..15 {
            session.tick();
        }
        let model = session.render_model();
        assert!(model.running);
        assert_eq!(model.cycles_completed, 1);
        assert_eq!(model.cycles_goal, 4);
        assert_eq!(model.progress_percent, 25);
        assert_eq!(model.elapsed, "00:15");
        assert_eq!(model.phase, Phase::Inhale);
        assert_eq!(model.phase_remaining_seconds, Some(3));
    }

    #[test]
    fn edits_are_clamped_before_reaching_engine() {
        let (mut session, _chime) = controller(Configuration::default());
        session.apply_edit(ConfigEdit::Hold1(-5));
        session.apply_edit(ConfigEdit::Hold2(-5));
        assert_eq!(session.config().hold1, 0);
        session.start();
        for _ in 0..10 {
            session.tick();
            assert!(matches!(
                session.engine_state().current_phase,
                Phase::Inhale | Phase::Exhale
            ));
        }
        assert_eq!(session.engine_state().cycles_completed, 1);
    }
}

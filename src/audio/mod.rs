pub mod tone;

use anyhow::{anyhow, Context, Result};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use tone::ChimeTone;

const ENABLE_LOGS: bool = true;

#[cfg_attr(feature = "audio", allow(unused_imports))]
use crate::{log_debug, log_warn};

/// Parameters for one of the two audible cues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChimeCue {
    pub frequency_hz: f32,
    pub duration_secs: f32,
}

/// Short, high cue on every phase change.
pub const PHASE_CHANGE_CUE: ChimeCue = ChimeCue {
    frequency_hz: 880.0,
    duration_secs: 0.18,
};

/// Longer, lower cue when a full cycle finishes.
pub const CYCLE_COMPLETE_CUE: ChimeCue = ChimeCue {
    frequency_hz: 523.25,
    duration_secs: 0.6,
};

/// Anything that can sound a tone. Implementations must return promptly and
/// swallow their own failures.
pub trait ChimePlayer: Send {
    fn play(&self, volume: f32, frequency_hz: f32, duration_secs: f32);

    fn play_cue(&self, volume: f32, cue: ChimeCue) {
        self.play(volume, cue.frequency_hz, cue.duration_secs);
    }
}

struct ToneRequest {
    volume: f32,
    tone: ChimeTone,
}

/// Plays chimes on a dedicated audio thread. The output device is opened
/// for each tone and released once the tone has drained.
pub struct ChimeEmitter {
    tx: Arc<Mutex<Option<Sender<ToneRequest>>>>,
}

impl ChimeEmitter {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<ToneRequest>> {
        let mut slot = self
            .tx
            .lock()
            .map_err(|_| anyhow!("chime sender lock poisoned"))?;
        if let Some(tx) = slot.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<ToneRequest>();

        // Audio output handles are not Send, so they live and die on this thread.
        thread::Builder::new()
            .name("chime-audio".to_string())
            .spawn(move || {
                while let Ok(request) = rx.recv() {
                    if let Err(err) = play_tone(request) {
                        log_warn!("chime dropped: {err:#}");
                    }
                }
            })
            .context("failed to spawn chime audio thread")?;

        *slot = Some(tx.clone());
        Ok(tx)
    }

    fn forget_thread(&self) {
        if let Ok(mut slot) = self.tx.lock() {
            slot.take();
        }
    }
}

impl Default for ChimeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChimePlayer for ChimeEmitter {
    fn play(&self, volume: f32, frequency_hz: f32, duration_secs: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        if volume == 0.0 {
            return;
        }

        let tx = match self.ensure_thread() {
            Ok(tx) => tx,
            Err(err) => {
                log_warn!("chime unavailable: {err:#}");
                return;
            }
        };

        let request = ToneRequest {
            volume,
            tone: ChimeTone::new(frequency_hz, duration_secs),
        };
        if tx.send(request).is_err() {
            // Thread is gone; the next chime spawns a fresh one.
            log_warn!("chime audio thread exited; dropping tone");
            self.forget_thread();
        }
    }
}

#[cfg(feature = "audio")]
fn play_tone(request: ToneRequest) -> Result<()> {
    use rodio::{OutputStream, Sink};

    let (_stream, handle) =
        OutputStream::try_default().context("failed to open audio output stream")?;
    let sink = Sink::try_new(&handle).context("failed to create audio sink")?;
    sink.set_volume(request.volume);
    sink.append(request.tone);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(not(feature = "audio"))]
fn play_tone(request: ToneRequest) -> Result<()> {
    log_debug!(
        "audio output disabled; skipping {:?} tone at volume {}",
        request.tone.duration(),
        request.volume
    );
    Ok(())
}

/// Never makes a sound. For headless sessions and muted setups.
pub struct SilentChime;

impl ChimePlayer for SilentChime {
    fn play(&self, _volume: f32, _frequency_hz: f32, _duration_secs: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cues_are_distinct() {
        assert!(PHASE_CHANGE_CUE.frequency_hz > CYCLE_COMPLETE_CUE.frequency_hz);
        assert!(PHASE_CHANGE_CUE.duration_secs < CYCLE_COMPLETE_CUE.duration_secs);
    }

    #[test]
    fn emitter_never_blocks_or_panics() {
        let emitter = ChimeEmitter::new();
        emitter.play(0.8, 880.0, 0.01);
        emitter.play_cue(1.0, CYCLE_COMPLETE_CUE);
        emitter.play(f32::NAN, 440.0, 0.1);
        emitter.play(0.5, 440.0, -3.0);
    }

    #[test]
    fn tone_output_is_part_of_the_default_build() {
        let manifest = include_str!("../../Cargo.toml");
        assert!(manifest.contains("default = [\"audio\"]"));
    }

    #[test]
    fn muted_emitter_does_not_spawn_thread() {
        let emitter = ChimeEmitter::new();
        emitter.play(0.0, 440.0, 0.2);
        assert!(emitter.tx.lock().unwrap().is_none());
    }
}

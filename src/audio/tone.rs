use std::f32::consts::PI;
use std::time::Duration;

pub const SAMPLE_RATE: u32 = 44100;

/// Attack ramp that keeps the onset from clicking.
const ATTACK_SECS: f32 = 0.005;
/// Exponential decay rate across the tone; the linear tail pins the last
/// sample to silence.
const DECAY_RATE: f32 = 4.0;

/// Finite mono sine tone that fades to silence by the end of its duration.
pub struct ChimeTone {
    frequency_hz: f32,
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
}

impl ChimeTone {
    pub fn new(frequency_hz: f32, duration_secs: f32) -> Self {
        let duration_secs = if duration_secs.is_finite() {
            duration_secs.max(0.0)
        } else {
            0.0
        };
        Self {
            frequency_hz,
            sample_rate: SAMPLE_RATE,
            num_sample: 0,
            total_samples: (duration_secs * SAMPLE_RATE as f32).round() as usize,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f32(self.total_samples as f32 / self.sample_rate as f32)
    }

    fn envelope(&self, t: f32) -> f32 {
        let total = self.total_samples as f32 / self.sample_rate as f32;
        let attack = (t / ATTACK_SECS).min(1.0);
        let progress = (t / total).clamp(0.0, 1.0);
        attack * (-DECAY_RATE * progress).exp() * (1.0 - progress)
    }
}

impl Iterator for ChimeTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        let t = self.num_sample as f32 / self.sample_rate as f32;
        self.num_sample += 1;

        Some((2.0 * PI * self.frequency_hz * t).sin() * self.envelope(t))
    }
}

#[cfg(feature = "audio")]
impl rodio::Source for ChimeTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_is_finite() {
        let tone = ChimeTone::new(660.0, 0.25);
        assert_eq!(tone.count(), 11025);
    }

    #[test]
    fn tone_fades_to_silence() {
        let samples: Vec<f32> = ChimeTone::new(440.0, 0.5).collect();
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
        let tail_peak = samples[samples.len() - 100..]
            .iter()
            .fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(tail_peak < 0.01, "tail peak {tail_peak}");
        let body_peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
        assert!(body_peak > 0.5);
    }

    #[test]
    fn degenerate_duration_yields_nothing() {
        assert_eq!(ChimeTone::new(440.0, -1.0).count(), 0);
        assert_eq!(ChimeTone::new(440.0, f32::NAN).count(), 0);
    }
}

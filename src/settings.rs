use serde::{Deserialize, Deserializer, Serialize};

use crate::breath::PhaseDurations;

/// Smallest dot size accepted from the edit surface.
pub const MIN_DOT_SIZE: f32 = 1.0;
/// Required gap between `dot_min` and `dot_max`.
pub const DOT_SIZE_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BreathPattern {
    /// 4-2-6-2, the out-of-the-box rhythm.
    Default,
    /// 4-4-4-4 box breathing.
    Box,
    /// 4-7-8 relaxing breath, no trailing hold.
    Relaxing,
    /// 5-5 coherent breathing, no holds.
    Coherent,
}

impl BreathPattern {
    pub fn durations(self) -> PhaseDurations {
        let (inhale, hold1, exhale, hold2) = match self {
            BreathPattern::Default => (4, 2, 6, 2),
            BreathPattern::Box => (4, 4, 4, 4),
            BreathPattern::Relaxing => (4, 7, 8, 0),
            BreathPattern::Coherent => (5, 0, 5, 0),
        };
        PhaseDurations {
            inhale,
            hold1,
            exhale,
            hold2,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(BreathPattern::Default),
            "box" => Some(BreathPattern::Box),
            "relaxing" | "4-7-8" => Some(BreathPattern::Relaxing),
            "coherent" => Some(BreathPattern::Coherent),
            _ => None,
        }
    }
}

/// User-adjustable session configuration. Lives in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    #[serde(deserialize_with = "signed_seconds")]
    pub inhale: u32,
    #[serde(deserialize_with = "signed_seconds")]
    pub hold1: u32,
    #[serde(deserialize_with = "signed_seconds")]
    pub exhale: u32,
    #[serde(deserialize_with = "signed_seconds")]
    pub hold2: u32,
    pub dot_min: f32,
    pub dot_max: f32,
    #[serde(deserialize_with = "signed_goal")]
    pub cycles_goal: u32,
    pub chime_on_phase_change: bool,
    pub chime_on_cycle: bool,
    pub volume: f32,
}

impl Default for Configuration {
    fn default() -> Self {
        let durations = BreathPattern::Default.durations();
        Self {
            inhale: durations.inhale,
            hold1: durations.hold1,
            exhale: durations.exhale,
            hold2: durations.hold2,
            dot_min: 60.0,
            dot_max: 220.0,
            cycles_goal: 20,
            chime_on_phase_change: true,
            chime_on_cycle: true,
            volume: 0.5,
        }
    }
}

/// A single edit coming from the configuration surface. Values arrive
/// unvalidated and are clamped by [`Configuration::apply`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ConfigEdit {
    Inhale(i64),
    Hold1(i64),
    Exhale(i64),
    Hold2(i64),
    DotMin(f32),
    DotMax(f32),
    CyclesGoal(i64),
    ChimeOnPhaseChange(bool),
    ChimeOnCycle(bool),
    Volume(f32),
    Pattern(BreathPattern),
}

impl Configuration {
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations {
            inhale: self.inhale,
            hold1: self.hold1,
            exhale: self.exhale,
            hold2: self.hold2,
        }
    }

    pub fn apply(&mut self, edit: ConfigEdit) {
        match edit {
            ConfigEdit::Inhale(secs) => self.inhale = clamp_seconds(secs),
            ConfigEdit::Hold1(secs) => self.hold1 = clamp_seconds(secs),
            ConfigEdit::Exhale(secs) => self.exhale = clamp_seconds(secs),
            ConfigEdit::Hold2(secs) => self.hold2 = clamp_seconds(secs),
            ConfigEdit::DotMin(size) => self.set_dot_min(size),
            ConfigEdit::DotMax(size) => self.set_dot_max(size),
            ConfigEdit::CyclesGoal(goal) => self.cycles_goal = clamp_goal(goal),
            ConfigEdit::ChimeOnPhaseChange(enabled) => self.chime_on_phase_change = enabled,
            ConfigEdit::ChimeOnCycle(enabled) => self.chime_on_cycle = enabled,
            ConfigEdit::Volume(volume) => self.volume = clamp_volume(volume),
            ConfigEdit::Pattern(pattern) => {
                let durations = pattern.durations();
                self.inhale = durations.inhale;
                self.hold1 = durations.hold1;
                self.exhale = durations.exhale;
                self.hold2 = durations.hold2;
            }
        }
    }

    /// Re-establishes every invariant on a record that did not come through
    /// [`Configuration::apply`], e.g. one deserialized from JSON.
    pub fn sanitized(mut self) -> Self {
        self.cycles_goal = self.cycles_goal.max(1);
        self.volume = clamp_volume(self.volume);
        let dot_max = self.dot_max;
        self.set_dot_min(self.dot_min);
        self.set_dot_max(dot_max);
        self
    }

    /// Moving `dot_min` up pushes `dot_max` along with it.
    fn set_dot_min(&mut self, size: f32) {
        let size = if size.is_finite() {
            size.max(MIN_DOT_SIZE)
        } else {
            MIN_DOT_SIZE
        };
        self.dot_min = size;
        if self.dot_min + DOT_SIZE_GAP > self.dot_max {
            self.dot_max = self.dot_min + DOT_SIZE_GAP;
        }
    }

    /// Moving `dot_max` down pulls `dot_min` along with it, never below
    /// [`MIN_DOT_SIZE`].
    fn set_dot_max(&mut self, size: f32) {
        let floor = MIN_DOT_SIZE + DOT_SIZE_GAP;
        let size = if size.is_finite() {
            size.max(floor)
        } else {
            floor
        };
        self.dot_max = size;
        if self.dot_min + DOT_SIZE_GAP > self.dot_max {
            self.dot_min = self.dot_max - DOT_SIZE_GAP;
        }
    }
}

fn clamp_seconds(secs: i64) -> u32 {
    u32::try_from(secs.max(0)).unwrap_or(u32::MAX)
}

fn clamp_goal(goal: i64) -> u32 {
    u32::try_from(goal.max(1)).unwrap_or(u32::MAX)
}

/// Reads a duration the way the edit surface sends it, negatives included.
fn signed_seconds<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_seconds)
}

fn signed_goal<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_goal)
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Parses a JSON configuration, falling back to defaults when the payload is
/// malformed.
pub fn from_json_or_default(raw: &str) -> Configuration {
    serde_json::from_str::<Configuration>(raw)
        .unwrap_or_default()
        .sanitized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_durations_clamp_to_zero() {
        let mut config = Configuration::default();
        config.apply(ConfigEdit::Inhale(-3));
        config.apply(ConfigEdit::Hold2(-1));
        assert_eq!(config.inhale, 0);
        assert_eq!(config.hold2, 0);
    }

    #[test]
    fn raising_dot_min_pushes_dot_max() {
        let mut config = Configuration::default();
        config.apply(ConfigEdit::DotMin(215.0));
        assert_eq!(config.dot_min, 215.0);
        assert_eq!(config.dot_max, 225.0);
    }

    #[test]
    fn lowering_dot_max_pulls_dot_min() {
        let mut config = Configuration::default();
        config.apply(ConfigEdit::DotMax(65.0));
        assert_eq!(config.dot_max, 65.0);
        assert_eq!(config.dot_min, 55.0);

        config.apply(ConfigEdit::DotMax(2.0));
        assert_eq!(config.dot_max, MIN_DOT_SIZE + DOT_SIZE_GAP);
        assert_eq!(config.dot_min, MIN_DOT_SIZE);
    }

    #[test]
    fn goal_and_volume_are_bounded() {
        let mut config = Configuration::default();
        config.apply(ConfigEdit::CyclesGoal(0));
        config.apply(ConfigEdit::Volume(1.7));
        assert_eq!(config.cycles_goal, 1);
        assert_eq!(config.volume, 1.0);

        config.apply(ConfigEdit::Volume(f32::NAN));
        assert_eq!(config.volume, 0.0);
    }

    #[test]
    fn pattern_sets_all_durations() {
        let mut config = Configuration::default();
        config.apply(ConfigEdit::Pattern(BreathPattern::Relaxing));
        assert_eq!(
            (config.inhale, config.hold1, config.exhale, config.hold2),
            (4, 7, 8, 0)
        );
    }

    #[test]
    fn json_input_is_sanitized() {
        let config = from_json_or_default(r#"{"dotMin": 300, "dotMax": 100, "cyclesGoal": 0}"#);
        assert_eq!(config.dot_min, 90.0);
        assert_eq!(config.dot_max, 100.0);
        assert_eq!(config.cycles_goal, 1);
        assert_eq!(config.inhale, 4);

        assert_eq!(from_json_or_default("not json"), Configuration::default());
    }

    #[test]
    fn negative_json_values_clamp_without_losing_other_fields() {
        let config = from_json_or_default(r#"{"inhale":-3,"exhale":9,"cyclesGoal":7}"#);
        assert_eq!((config.inhale, config.exhale, config.cycles_goal), (0, 9, 7));
        assert_eq!(config.hold1, 2);

        let config = from_json_or_default(r#"{"hold2":-1,"cyclesGoal":-5,"volume":0.2}"#);
        assert_eq!(config.hold2, 0);
        assert_eq!(config.cycles_goal, 1);
        assert_eq!(config.volume, 0.2);
    }

    #[test]
    fn edits_deserialize_from_tagged_json() {
        let edit: ConfigEdit = serde_json::from_str(r#"{"field":"exhale","value":-2}"#).unwrap();
        assert_eq!(edit, ConfigEdit::Exhale(-2));
        let edit: ConfigEdit =
            serde_json::from_str(r#"{"field":"pattern","value":"box"}"#).unwrap();
        assert_eq!(edit, ConfigEdit::Pattern(BreathPattern::Box));
    }

    #[test]
    fn pattern_names_parse() {
        assert_eq!(BreathPattern::from_name(" Box "), Some(BreathPattern::Box));
        assert_eq!(BreathPattern::from_name("4-7-8"), Some(BreathPattern::Relaxing));
        assert_eq!(BreathPattern::from_name("square"), None);
    }
}

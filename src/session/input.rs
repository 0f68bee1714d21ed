use std::time::{Duration, Instant};

/// Presses closer together than this count as one logical press.
pub const TOGGLE_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlInput {
    /// The on-screen start/pause button.
    Button,
    /// A key, named the way the view reports it (`" "`, `"Space"`, ...).
    Key { key: String, repeat: bool },
}

impl ControlInput {
    pub fn key(key: impl Into<String>, repeat: bool) -> Self {
        ControlInput::Key {
            key: key.into(),
            repeat,
        }
    }

    /// Only the button and a fresh (non auto-repeat) space press toggle.
    fn is_toggle(&self) -> bool {
        match self {
            ControlInput::Button => true,
            ControlInput::Key { key, repeat } => {
                !*repeat && (key == " " || key.eq_ignore_ascii_case("space"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToggleDebouncer {
    window: Duration,
    last_admitted: Option<Instant>,
}

impl ToggleDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: None,
        }
    }

    /// True when `input` should flip the running state.
    pub fn admit(&mut self, input: &ControlInput, now: Instant) -> bool {
        if !input.is_toggle() {
            return false;
        }
        if let Some(last) = self.last_admitted {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last_admitted = Some(now);
        true
    }
}

impl Default for ToggleDebouncer {
    fn default() -> Self {
        Self::new(TOGGLE_DEBOUNCE)
    }
}

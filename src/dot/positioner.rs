use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Outer radius of the placement disk, in percent of the display area.
pub const MAX_R_PCT: f64 = 41.0;
/// Inner radius kept clear so every move lands away from the centre.
pub const PADDING_PCT: f64 = 6.0;

pub const CENTER: DotPosition = DotPosition { x: 50.0, y: 50.0 };

/// Point in normalized `[0, 100] x [0, 100]` display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DotPosition {
    pub x: f64,
    pub y: f64,
}

impl DotPosition {
    pub fn distance_from_center(&self) -> f64 {
        (self.x - CENTER.x).hypot(self.y - CENTER.y)
    }
}

impl Default for DotPosition {
    fn default() -> Self {
        CENTER
    }
}

/// Measured size of the rendering surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

pub struct DotPositioner {
    position: DotPosition,
    surface: Option<Surface>,
    rng: StdRng,
    moves: u64,
}

impl DotPositioner {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            position: CENTER,
            surface: None,
            rng,
            moves: 0,
        }
    }

    pub fn position(&self) -> DotPosition {
        self.position
    }

    /// How many times the dot actually moved this process.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn set_surface(&mut self, surface: Option<Surface>) {
        self.surface = surface;
    }

    /// Polar sample: radius uniform in `[PADDING_PCT, MAX_R_PCT)`, angle
    /// uniform in `[0, 2π)`. Leaves the dot where it is until a surface has
    /// been measured.
    pub fn move_random(&mut self) -> Option<DotPosition> {
        if !self.surface.is_some_and(|surface| surface.is_measured()) {
            log_debug!("no measured surface; dot stays at {:?}", self.position);
            return None;
        }

        let radius = self.rng.gen_range(PADDING_PCT..MAX_R_PCT);
        let angle = self.rng.gen_range(0.0..TAU);
        self.position = DotPosition {
            x: CENTER.x + radius * angle.cos(),
            y: CENTER.y + radius * angle.sin(),
        };
        self.moves += 1;
        Some(self.position)
    }

    pub fn recenter(&mut self) {
        self.position = CENTER;
    }
}

impl Default for DotPositioner {
    fn default() -> Self {
        Self::new()
    }
}

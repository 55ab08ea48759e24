//! Demo pilot
//!
//! Plays a stage with seeded random button presses. The same seed always
//! produces the same run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::input::{Button, raw_levels};

/// Frames a direction is held, inclusive range
const HOLD_FRAMES: (u32, u32) = (1, 40);
/// Frames with nothing held between presses
const REST_FRAMES: (u32, u32) = (0, 8);

/// Generates raw button levels for unattended play
#[derive(Debug, Clone)]
pub struct DemoPilot {
    rng: Pcg32,
    current: Option<Button>,
    remaining: u32,
}

impl DemoPilot {
    pub fn new(seed: u64) -> Self {
        log::info!("Demo pilot seeded with {}", seed);
        Self {
            rng: Pcg32::seed_from_u64(seed),
            current: None,
            remaining: 0,
        }
    }

    /// Raw levels for the next frame. Never presses Action.
    pub fn next_levels(&mut self) -> [bool; 5] {
        if self.remaining == 0 {
            // Alternate between holding a direction and resting so presses stay fresh
            if self.current.is_some() {
                self.current = None;
                self.remaining = self.rng.random_range(REST_FRAMES.0..=REST_FRAMES.1);
            } else {
                let (button, _) = Button::DIRECTIONS[self.rng.random_range(0..4)];
                self.current = Some(button);
                self.remaining = self.rng.random_range(HOLD_FRAMES.0..=HOLD_FRAMES.1);
            }
        }
        self.remaining = self.remaining.saturating_sub(1);

        match self.current {
            Some(button) => raw_levels(&[button]),
            None => raw_levels(&[]),
        }
    }
}

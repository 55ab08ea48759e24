//! Game settings and tuning
//!
//! Loaded from a JSON file next to the stages; anything missing falls back to
//! the defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::AnimationMode;

/// Simulation timing knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Ticks for a one-cell move
    pub move_ticks: i32,
    /// Completed player moves before a bomb detonates
    pub bomb_fuse: u8,
    pub disappear_ticks: i32,
    pub frozen_break_ticks: i32,
    pub lava_fill_ticks: i32,
    pub explosion_ticks: i32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            move_ticks: MOVE_TICKS,
            bomb_fuse: BOMB_FUSE,
            disappear_ticks: DISAPPEAR_TICKS,
            frozen_break_ticks: FROZEN_BREAK_TICKS,
            lava_fill_ticks: LAVA_FILL_TICKS,
            explosion_ticks: EXPLOSION_TICKS,
        }
    }
}

impl Tuning {
    /// Duration of an animation mode in ticks
    pub fn animation_ticks(&self, mode: AnimationMode) -> i32 {
        match mode {
            AnimationMode::None => 0,
            AnimationMode::TileDisappear => self.disappear_ticks,
            AnimationMode::FrozenBreak => self.frozen_break_ticks,
            AnimationMode::LavaFill => self.lava_fill_ticks,
            AnimationMode::Explosion => self.explosion_ticks,
        }
    }

    /// Clamp values that would stall or break the simulation
    fn sanitized(mut self) -> Self {
        if self.move_ticks < 1 {
            log::warn!("move_ticks {} too small, using 1", self.move_ticks);
            self.move_ticks = 1;
        }
        for ticks in [
            &mut self.disappear_ticks,
            &mut self.frozen_break_ticks,
            &mut self.lava_fill_ticks,
            &mut self.explosion_ticks,
        ] {
            *ticks = (*ticks).max(1);
        }
        self
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,

    // === Audio ===
    pub muted: bool,

    // === Frame pacing ===
    /// Simulation steps per logical frame
    pub frame_steps: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            muted: false,
            frame_steps: 1,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.tuning = settings.tuning.sanitized();
        settings.frame_steps = settings.frame_steps.max(1);
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fall_back() {
        let settings = Settings::from_json(r#"{"muted": true, "tuning": {"bomb_fuse": 5}}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.tuning.bomb_fuse, 5);
        assert_eq!(settings.tuning.move_ticks, MOVE_TICKS);
        assert_eq!(settings.frame_steps, 1);
    }

    #[test]
    fn test_degenerate_values_are_clamped() {
        let settings =
            Settings::from_json(r#"{"frame_steps": 0, "tuning": {"move_ticks": -4}}"#).unwrap();
        assert_eq!(settings.tuning.move_ticks, 1);
        assert_eq!(settings.frame_steps, 1);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(Path::new("/nonexistent/settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_animation_ticks() {
        let tuning = Tuning::default();
        assert_eq!(tuning.animation_ticks(AnimationMode::None), 0);
        assert_eq!(
            tuning.animation_ticks(AnimationMode::Explosion),
            EXPLOSION_TICKS
        );
    }
}

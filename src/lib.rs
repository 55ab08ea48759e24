//! Frost Vault - A tile-grid puzzle of boulders, bombs, ice and lava
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, movement, activation, detonation, animation)
//! - `input`: Button edge detection
//! - `audio`, `hud`, `renderer`: Collaborators fed by simulation events
//! - `session`: Per-frame glue between input, simulation and collaborators
//! - `settings`: Data-driven tuning

pub mod audio;
pub mod demo;
pub mod hud;
pub mod input;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::Session;
pub use settings::{Settings, Tuning};

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Ticks for a one-cell move to visually complete
    pub const MOVE_TICKS: i32 = 16;
    /// Completed player moves before a bomb goes off
    pub const BOMB_FUSE: u8 = 3;

    /// Animation durations (ticks)
    pub const DISAPPEAR_TICKS: i32 = 30;
    pub const FROZEN_BREAK_TICKS: i32 = 30;
    pub const LAVA_FILL_TICKS: i32 = 30;
    pub const EXPLOSION_TICKS: i32 = 40;

    /// Fixed-point precision of cosmetic timers
    pub const FIXED_PREC: u32 = 256;
    /// Lava scroll speed and its wraparound period (in FIXED_PREC units)
    pub const LAVA_SPEED: u32 = 12;
    pub const LAVA_PERIOD: u32 = 16;
    /// Lava glow speed and period
    pub const LAVA_GLOW_SPEED: u32 = 6;
    pub const LAVA_GLOW_PERIOD: u32 = 4;
    /// Black hole spin speed and period
    pub const BLACK_HOLE_SPEED: u32 = 8;
    pub const BLACK_HOLE_PERIOD: u32 = 8;

    /// Movables this close to the player's target are redrawn
    pub const REDRAW_RADIUS: i32 = 2;
}

/// Chebyshev (king-move) distance between two cells
#[inline]
pub fn chebyshev(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x.max(d.y)
}

/// The 8 cells surrounding `center`, row by row
pub fn neighbors8(center: IVec2) -> impl Iterator<Item = IVec2> {
    (-1..=1)
        .flat_map(|dy| (-1..=1).map(move |dx| IVec2::new(dx, dy)))
        .filter(|d| *d != IVec2::ZERO)
        .map(move |d| center + d)
}

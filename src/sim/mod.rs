//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Integer tick counts only
//! - Stable iteration order (by movable slot)
//! - No rendering or platform dependencies

pub mod activation;
pub mod animation;
pub mod detonation;
pub mod grid;
pub mod movement;
pub mod state;
pub mod tick;
pub mod tile;
pub mod tilemap;

pub use activation::{Activation, Refusal, activate};
pub use grid::TileGrid;
pub use movement::{MoveOutcome, begin_move};
pub use state::{
    AmbientTimers, AnimationMode, AnimationState, Direction, GameEvent, Inventory, Movable,
    MovableKind, MovablePool, Player, Stage,
};
pub use tick::tick;
pub use tile::{Item, Marker, SolidKind, Tile};
pub use tilemap::{LoadError, Tilemap, glyph_tile, tile_glyph};

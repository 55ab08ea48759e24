//! Animation sequencing
//!
//! Only one effect plays at a time. While it does, the stage is latched:
//! no movement or activation may touch the grid.

use super::state::{AnimationMode, AnimationState, GameEvent, MovableKind, Stage};
use super::tile::Tile;

/// Advance the active animation by `steps` ticks, finishing it on expiry
pub fn advance(stage: &mut Stage, steps: i32) {
    if !stage.animation.is_active() {
        return;
    }
    stage.animation.timer -= steps;
    if stage.animation.timer <= 0 {
        finish(stage);
    }
}

/// End the active animation and apply its final grid change
pub fn finish(stage: &mut Stage) {
    let AnimationState {
        mode,
        origin,
        spawns_boulder,
        ..
    } = stage.animation;
    stage.animation = AnimationState::default();

    match mode {
        AnimationMode::None => return,
        // Tiles were finalized at detonation; only the partial reveal needs wiping
        AnimationMode::Explosion => stage.push_event(GameEvent::RepaintArea {
            center: origin,
            radius: 1,
        }),
        AnimationMode::TileDisappear | AnimationMode::FrozenBreak | AnimationMode::LavaFill => {
            stage.grid.set_tile(origin, Tile::EMPTY);
            if spawns_boulder {
                stage.spawn_movable(MovableKind::Boulder, origin);
            }
            stage.repaint_cell(origin);
        }
    }
    log::debug!("{:?} finished at {}", mode, origin);
}

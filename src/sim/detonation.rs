//! Bomb detonation
//!
//! A bomb whose fuse has burnt down goes off once the player stands still.
//! The blast melts walls into lava, shatters ice and erases every movable
//! next to it, the bomb included.

use glam::IVec2;

use super::state::{AnimationMode, GameEvent, MovableKind, Stage};
use super::tile::{SolidKind, Tile};
use crate::audio::SoundCue;
use crate::{chebyshev, neighbors8};

/// Detonate the first resting bomb whose fuse ran out. Returns true if one went off.
pub fn fuse_out(stage: &mut Stage) -> bool {
    let origin = stage
        .movables
        .iter()
        .find(|(_, m)| !m.moving && matches!(m.kind, MovableKind::Bomb { fuse: 0 }))
        .map(|(_, m)| m.pos);
    match origin {
        Some(origin) => {
            detonate(stage, origin);
            true
        }
        None => false,
    }
}

/// Blow up the cell at `origin`
pub fn detonate(stage: &mut Stage, origin: IVec2) {
    stage.grid.set_solid(origin, SolidKind::Free);

    for cell in neighbors8(origin) {
        if !stage.grid.in_interior(cell) {
            continue;
        }
        match stage.grid.solid(cell) {
            SolidKind::Wall => {
                stage.grid.set_tile(cell, Tile::LAVA);
                stage.grid.set_solid(cell, SolidKind::Lava);
            }
            SolidKind::FrozenWall | SolidKind::FrozenBoulder => {
                stage.grid.set_tile(cell, Tile::EMPTY);
                stage.grid.set_solid(cell, SolidKind::Free);
            }
            _ => {}
        }
    }

    let doomed: Vec<usize> = stage
        .movables
        .iter()
        .filter(|(_, m)| chebyshev(m.pos, origin) <= 1)
        .map(|(slot, _)| slot)
        .collect();
    for slot in &doomed {
        stage.destroy_movable(*slot);
    }

    log::debug!(
        "Detonation at {} destroyed {} movables",
        origin,
        doomed.len()
    );
    stage.start_animation(AnimationMode::Explosion, origin);
    stage.play(SoundCue::Explosion);
    stage.push_event(GameEvent::RepaintArea {
        center: origin,
        radius: 1,
    });
}

//! Activation of interactive tiles
//!
//! Bumping a blocked-but-interactive cell with a fresh key press spends an
//! item (or flips a switch) instead of moving. A refused activation leaves the
//! stage untouched.

use glam::IVec2;

use super::state::{AnimationMode, GameEvent, MovableKind, Stage};
use super::tile::{Item, SolidKind, Tile};
use crate::audio::SoundCue;

/// What a successful activation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Switch toggled its palette
    Toggled,
    /// Lock opened with a key
    Unlocked,
    /// Ice or frozen boulder broken with the pickaxe
    Shattered,
    /// Lava filled with the shovel
    Filled,
    /// Bomb taken from a dispenser
    BombPlaced,
}

/// Why an activation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// An animation is playing
    Latched,
    /// Cell has nothing to activate
    NotInteractive,
    /// The player lacks the needed item
    Missing(Item),
}

/// Activate the cell at `cell`
pub fn activate(stage: &mut Stage, cell: IVec2) -> Result<Activation, Refusal> {
    if stage.is_latched() {
        return Err(Refusal::Latched);
    }
    if !stage.grid.in_interior(cell) {
        return Err(Refusal::NotInteractive);
    }

    let solid = stage.grid.solid(cell);
    let activation = match solid {
        SolidKind::Switch => {
            toggle_switch(stage, cell)?;
            stage.play(SoundCue::Switch);
            Activation::Toggled
        }
        SolidKind::Lock => {
            spend(stage, Item::Key)?;
            stage.grid.set_solid(cell, SolidKind::Free);
            stage.start_animation(AnimationMode::TileDisappear, cell);
            stage.play(SoundCue::Lock);
            Activation::Unlocked
        }
        SolidKind::FrozenWall | SolidKind::FrozenBoulder => {
            spend(stage, Item::Pickaxe)?;
            stage.grid.set_solid(cell, SolidKind::Free);
            stage.start_animation(AnimationMode::FrozenBreak, cell);
            stage.animation.spawns_boulder = solid == SolidKind::FrozenBoulder;
            stage.play(SoundCue::Break);
            Activation::Shattered
        }
        SolidKind::Lava => {
            spend(stage, Item::Shovel)?;
            stage.grid.set_solid(cell, SolidKind::Free);
            stage.start_animation(AnimationMode::LavaFill, cell);
            stage.play(SoundCue::LavaFill);
            Activation::Filled
        }
        SolidKind::Dispenser => {
            spend(stage, Item::Bomb)?;
            stage.grid.set_tile(cell, Tile::EMPTY);
            stage.repaint_cell(cell);
            let fuse = stage.tuning.bomb_fuse;
            stage.spawn_movable(MovableKind::Bomb { fuse }, cell);
            stage.play(SoundCue::BombPlace);
            Activation::BombPlaced
        }
        _ => return Err(Refusal::NotInteractive),
    };

    log::debug!("{:?} at {}", activation, cell);
    stage.notify_inventory();
    Ok(activation)
}

fn spend(stage: &mut Stage, item: Item) -> Result<(), Refusal> {
    if stage.player.inventory.take(item) {
        Ok(())
    } else {
        Err(Refusal::Missing(item))
    }
}

/// Flip every switch and color block sharing the switch's palette row
fn toggle_switch(stage: &mut Stage, cell: IVec2) -> Result<(), Refusal> {
    let palette = stage
        .grid
        .tile(cell)
        .palette()
        .ok_or(Refusal::NotInteractive)?;

    let grid = &mut stage.grid;
    for c in grid.interior() {
        let tile = grid.tile(c);
        if tile.palette() != Some(palette) {
            continue;
        }
        let solid = grid.solid(c);
        if tile.is_closed_block() && solid == SolidKind::Wall {
            grid.set_solid(c, SolidKind::Free);
        } else if tile.is_open_block() && solid == SolidKind::Free {
            grid.set_solid(c, SolidKind::Wall);
        }
        grid.set_tile(c, tile.toggled());
    }

    for (_, m) in stage.movables.iter_mut() {
        m.redraw = true;
    }
    stage.push_event(GameEvent::RepaintInterior);
    Ok(())
}

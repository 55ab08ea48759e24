//! Player and movable movement
//!
//! A move is one cell long and lasts `Tuning::move_ticks`. Movables never move
//! on their own: a push makes them follow the player, reading the player's
//! remaining timer each tick so both arrive on the same tick.

use glam::IVec2;

use super::state::{Direction, GameEvent, MovableKind, Stage};
use super::tile::{SolidKind, Tile};
use crate::audio::SoundCue;
use crate::consts::REDRAW_RADIUS;

/// Result of trying to start a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Player walks into a free cell
    Moved,
    /// Player walks and pushes the movable in this slot
    Pushed(usize),
    /// Destination cannot be entered; nothing changed except facing
    Blocked(IVec2),
    /// A push was attempted and undone
    RolledBack,
}

/// Try to start a player move one cell in `dir`
pub fn begin_move(stage: &mut Stage, dir: Direction) -> MoveOutcome {
    let player = &mut stage.player;
    player.direction = dir;
    match dir {
        Direction::Left => player.flip = true,
        Direction::Right => player.flip = false,
        _ => {}
    }
    player.redraw = true;

    let dest = player.pos + dir.delta();
    if !stage.grid.in_interior(dest) {
        return MoveOutcome::Blocked(dest);
    }

    let outcome = match stage.grid.solid(dest) {
        SolidKind::Free => {
            set_target(stage, dest);
            MoveOutcome::Moved
        }
        // Embedded in a closed color block until its switch opens it again
        SolidKind::Occupied if stage.grid.tile(dest).is_closed_block() => {
            return MoveOutcome::Blocked(dest);
        }
        SolidKind::Occupied => {
            set_target(stage, dest);
            match try_push(stage, dest, dir) {
                Some(slot) => MoveOutcome::Pushed(slot),
                None => {
                    rollback(stage);
                    return MoveOutcome::RolledBack;
                }
            }
        }
        _ => return MoveOutcome::Blocked(dest),
    };
    stage.play(SoundCue::Move);
    outcome
}

fn set_target(stage: &mut Stage, dest: IVec2) {
    let player = &mut stage.player;
    player.target = dest;
    player.move_timer = stage.tuning.move_ticks;
    player.moving = true;
}

/// Undo a started move: the player stays put and its timer is zeroed
fn rollback(stage: &mut Stage) {
    let player = &mut stage.player;
    player.target = player.pos;
    player.move_timer = 0;
    player.moving = false;
}

/// Push the movable on `cell` one step further. Returns its slot on success;
/// on failure its target is reverted and nothing else changes.
fn try_push(stage: &mut Stage, cell: IVec2, dir: Direction) -> Option<usize> {
    let slot = stage.movables.at(cell)?;
    let further = cell + dir.delta();
    let timer = stage.player.move_timer;
    let blocked_by_other = stage.movables.at(further).is_some();
    let grid = &mut stage.grid;
    let movable = stage.movables.get_mut(slot)?;

    movable.target = further;
    if !grid.in_interior(further) || blocked_by_other || !movable.kind.can_enter(grid.solid(further))
    {
        movable.target = movable.pos;
        return None;
    }

    movable.moving = true;
    movable.move_timer = timer;
    movable.redraw = true;
    grid.release(cell);
    Some(slot)
}

/// Advance an in-flight move by `steps` ticks, settling it when the timer runs out
pub fn advance(stage: &mut Stage, steps: i32) {
    if !stage.player.moving {
        return;
    }
    let timer = (stage.player.move_timer - steps).max(0);
    stage.player.move_timer = timer;
    stage.player.redraw = true;
    for (_, m) in stage.movables.iter_mut().filter(|(_, m)| m.moving) {
        m.move_timer = timer;
    }
    stage.mark_redraw_near(stage.player.target, REDRAW_RADIUS);

    if timer == 0 {
        settle(stage);
    }
}

/// Finish a move: snap everything to its target, burn bomb fuses, collect items
fn settle(stage: &mut Stage) {
    let player = &mut stage.player;
    player.pos = player.target;
    player.moving = false;

    let moved: Vec<usize> = stage
        .movables
        .iter()
        .filter(|(_, m)| m.moving)
        .map(|(slot, _)| slot)
        .collect();

    for (_, m) in stage.movables.iter_mut().filter(|(_, m)| !m.moving) {
        if let MovableKind::Bomb { fuse } = &mut m.kind {
            *fuse = fuse.saturating_sub(1);
            m.redraw = true;
        }
    }

    for slot in moved {
        settle_movable(stage, slot);
    }
    stage.mark_redraw_near(stage.player.pos, REDRAW_RADIUS);
    collect_item(stage);
}

fn settle_movable(stage: &mut Stage, slot: usize) {
    let Some(m) = stage.movables.get_mut(slot) else {
        return;
    };
    m.pos = m.target;
    m.moving = false;
    m.move_timer = 0;
    m.redraw = true;
    let (cell, kind) = (m.pos, m.kind);

    if kind.is_black_hole() {
        // Swallows whatever was there, no disappearance effect
        stage.grid.set_tile(cell, Tile::EMPTY);
        stage.grid.set_solid(cell, SolidKind::Occupied);
        stage.repaint_cell(cell);
    } else if stage.grid.solid(cell) == SolidKind::Lava {
        log::debug!("{:?} sank into lava at {}", kind, cell);
        stage.movables.destroy(slot);
        stage.set_tile(cell, Tile::EMPTY);
        stage.play(SoundCue::LavaFill);
    } else {
        stage.grid.set_solid(cell, SolidKind::Occupied);
    }
}

/// Pick up whatever lies on the player's cell
fn collect_item(stage: &mut Stage) {
    let cell = stage.player.pos;
    let tile = stage.grid.tile(cell);
    if let Some(item) = tile.item() {
        stage.player.inventory.add(item);
        stage.grid.set_tile(cell, Tile::EMPTY);
        stage.play(SoundCue::Item);
        stage.notify_inventory();
        stage.repaint_cell(cell);
    } else if tile == Tile::EXIT && !stage.player.victory {
        stage.player.victory = true;
        stage.play(SoundCue::Victory);
        stage.push_event(GameEvent::StageCleared);
        log::info!(
            "Stage cleared with {}/{} gems",
            stage.player.inventory.gems,
            stage.player.inventory.max_gems
        );
    }
}

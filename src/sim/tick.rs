//! Per-frame simulation step
//!
//! Core loop that advances a stage deterministically. Order within a step:
//! cosmetic timers, animation latch, in-flight move, bomb fuses, then
//! player control.

use super::activation::activate;
use super::movement::{MoveOutcome, begin_move};
use super::state::{MovableKind, Stage, advance_phase};
use super::{animation, detonation, movement};
use crate::consts::*;
use crate::input::InputSnapshot;

/// Advance the stage by `steps` ticks using this frame's input
pub fn tick(stage: &mut Stage, input: &InputSnapshot, steps: i32) {
    if steps <= 0 {
        return;
    }
    stage.player.acting = false;
    advance_cosmetics(stage, steps as u32);

    // Latched: only the animation runs
    if stage.is_latched() {
        animation::advance(stage, steps);
        return;
    }

    movement::advance(stage, steps);
    if stage.is_latched() || !stage.player.is_idle() {
        return;
    }

    if detonation::fuse_out(stage) {
        return;
    }

    if !stage.player.victory {
        control(stage, input);
    }
}

fn advance_cosmetics(stage: &mut Stage, steps: u32) {
    stage.timers.advance(steps);
    for (_, m) in stage.movables.iter_mut() {
        if let MovableKind::BlackHole { phase } = &mut m.kind {
            *phase = advance_phase(*phase, BLACK_HOLE_SPEED, steps, BLACK_HOLE_PERIOD);
        }
    }
}

/// Idle player: move in the held direction, or activate what blocks it
fn control(stage: &mut Stage, input: &InputSnapshot) {
    let Some((dir, fresh)) = input.direction() else {
        return;
    };
    let MoveOutcome::Blocked(dest) = begin_move(stage, dir) else {
        return;
    };
    if fresh && stage.grid.is_interactive(dest) && activate(stage, dest).is_ok() {
        stage.player.acting = true;
    }
}

impl Stage {
    /// Advance the whole simulation by one logical frame of `steps` ticks
    pub fn update(&mut self, input: &InputSnapshot, steps: i32) {
        tick(self, input, steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, ButtonState};
    use crate::sim::{AnimationMode, GameEvent, SolidKind, Tile, Tilemap};
    use glam::IVec2;

    fn stage(text: &str) -> Stage {
        Stage::load(&Tilemap::from_text(text).unwrap()).unwrap()
    }

    fn idle(stage: &mut Stage, frames: i32) {
        for _ in 0..frames {
            stage.update(&InputSnapshot::default(), 1);
        }
    }

    #[test]
    fn test_end_to_end_push() {
        let mut stage = stage(
            "0
#######
#PB...#
#.....#
#.....#
#.....#
#.....#
#######",
        );
        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        let slot = stage.movables.at(IVec2::new(2, 1)).unwrap();
        assert_eq!(stage.player.target, IVec2::new(2, 1));
        assert_eq!(stage.movables.get(slot).unwrap().target, IVec2::new(3, 1));

        idle(&mut stage, MOVE_TICKS);
        assert_eq!(stage.player.pos, IVec2::new(2, 1));
        assert_eq!(stage.movables.get(slot).unwrap().pos, IVec2::new(3, 1));
        assert_eq!(stage.grid.solid(IVec2::new(2, 1)), SolidKind::Free);
        assert_eq!(stage.grid.solid(IVec2::new(3, 1)), SolidKind::Occupied);
    }

    #[test]
    fn test_no_input_while_moving() {
        let mut stage = stage("0\n######\n#P...#\n#....#\n######\n");
        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        stage.update(&InputSnapshot::pressed(Button::Down), 1);
        assert_eq!(stage.player.target, IVec2::new(2, 1));

        idle(&mut stage, MOVE_TICKS);
        assert_eq!(stage.player.pos, IVec2::new(2, 1));
        assert!(stage.player.is_idle());
    }

    #[test]
    fn test_held_key_keeps_walking() {
        let mut stage = stage("0\n######\n#P...#\n######\n");
        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        for _ in 0..MOVE_TICKS {
            stage.update(&InputSnapshot::held(Button::Right), 1);
        }
        // Arrived at (2,1) and immediately set off again
        assert_eq!(stage.player.pos, IVec2::new(2, 1));
        assert_eq!(stage.player.target, IVec2::new(3, 1));
    }

    #[test]
    fn test_activation_needs_fresh_press() {
        let mut stage = stage("0\n#####\n#PL.#\n#####\n");
        stage.player.inventory.keys = 1;

        stage.update(&InputSnapshot::held(Button::Right), 1);
        assert_eq!(stage.player.inventory.keys, 1);
        assert!(!stage.player.acting);

        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        assert_eq!(stage.player.inventory.keys, 0);
        assert!(stage.player.acting);
        assert_eq!(stage.animation.mode, AnimationMode::TileDisappear);

        // Acting lasts a single frame; the latch holds the player in place
        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        assert!(!stage.player.acting);
        assert!(stage.player.is_idle());

        idle(&mut stage, DISAPPEAR_TICKS);
        assert!(!stage.is_latched());
        assert_eq!(stage.grid.tile(IVec2::new(2, 1)), Tile::EMPTY);

        stage.update(&InputSnapshot::held(Button::Right), 1);
        assert_eq!(stage.player.target, IVec2::new(2, 1));
    }

    #[test]
    fn test_bomb_goes_off_after_fuse() {
        let mut stage = stage("0\n########\n#P....O#\n#......#\n########\n");
        let bomb = IVec2::new(6, 1);
        stage.tuning.bomb_fuse = 2;
        stage.reset();

        let walk = |stage: &mut Stage, button| {
            stage.update(&InputSnapshot::pressed(button), 1);
            idle(stage, MOVE_TICKS);
        };

        walk(&mut stage, Button::Down);
        assert!(stage.movables.at(bomb).is_some());
        assert!(!stage.is_latched());

        // Second completed move burns the fuse down and the bomb goes off at once
        walk(&mut stage, Button::Up);
        assert!(stage.movables.at(bomb).is_none());
        assert_eq!(stage.grid.solid(bomb), SolidKind::Free);
        assert_eq!(stage.animation.mode, AnimationMode::Explosion);
        assert!(
            stage
                .drain_events()
                .contains(&GameEvent::Sound(crate::audio::SoundCue::Explosion))
        );
    }

    #[test]
    fn test_victory_stops_control() {
        let mut stage = stage("0\n######\n#PE..#\n######\n");
        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        idle(&mut stage, MOVE_TICKS);
        assert!(stage.player.victory);

        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        assert!(stage.player.is_idle());
        assert_eq!(stage.player.pos, IVec2::new(2, 1));
    }

    #[test]
    fn test_multi_step_frames() {
        let mut stage = stage("0\n######\n#P...#\n######\n");
        stage.update(&InputSnapshot::pressed(Button::Right), 1);
        stage.update(&InputSnapshot::default(), MOVE_TICKS * 3);
        assert_eq!(stage.player.pos, IVec2::new(2, 1));
        assert!(stage.player.is_idle());
    }

    #[test]
    fn test_cosmetic_timers_wrap() {
        let mut stage = stage("0\n#####\n#P@.#\n#####\n");
        for _ in 0..1000 {
            stage.update(&InputSnapshot::default(), 3);
        }
        assert!(stage.timers.lava < LAVA_PERIOD * FIXED_PREC);
        assert!(stage.timers.lava_glow < LAVA_GLOW_PERIOD * FIXED_PREC);
        let slot = stage.movables.at(IVec2::new(2, 1)).unwrap();
        match stage.movables.get(slot).unwrap().kind {
            MovableKind::BlackHole { phase } => assert!(phase < BLACK_HOLE_PERIOD * FIXED_PREC),
            _ => panic!("expected a black hole"),
        }
    }

    #[test]
    fn test_determinism() {
        let text = "2 1 1\n#########\n#P.B.k..#\n#.O.L.I.#\n#..~..D.#\n#########\n";
        let mut stage1 = stage(text);
        let mut stage2 = stage(text);

        let script = [
            Button::Right,
            Button::Down,
            Button::Right,
            Button::Right,
            Button::Up,
            Button::Left,
            Button::Down,
        ];
        for button in script {
            for frame in 0..(MOVE_TICKS + 2) {
                let state = if frame == 0 {
                    ButtonState::Pressed
                } else {
                    ButtonState::Down
                };
                let input = InputSnapshot::default().with(button, state);
                stage1.update(&input, 1);
                stage2.update(&input, 1);
            }
        }

        let a = serde_json::to_string(&stage1).unwrap();
        let b = serde_json::to_string(&stage2).unwrap();
        assert_eq!(a, b);
    }
}

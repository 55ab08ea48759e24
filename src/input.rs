//! Button edge detection
//!
//! Raw button levels are sampled once per frame and compared with the previous
//! sample to produce [`ButtonState`]s. The simulation only ever sees the
//! resulting [`InputSnapshot`].

use serde::{Deserialize, Serialize};

use crate::sim::Direction;

/// Buttons the game reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Action,
}

impl Button {
    pub const ALL: [Button; 5] = [
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Action,
    ];

    /// Directional buttons in the order they win when several are held
    pub const DIRECTIONS: [(Button, Direction); 4] = [
        (Button::Left, Direction::Left),
        (Button::Right, Direction::Right),
        (Button::Up, Direction::Up),
        (Button::Down, Direction::Down),
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-frame state of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ButtonState {
    #[default]
    Up,
    Down,
    /// Went down this frame
    Pressed,
    /// Went up this frame
    Released,
}

impl ButtonState {
    /// Down or freshly pressed
    pub fn is_held(self) -> bool {
        matches!(self, ButtonState::Down | ButtonState::Pressed)
    }
}

/// Button states for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    states: [ButtonState; 5],
}

impl InputSnapshot {
    pub fn get(&self, button: Button) -> ButtonState {
        self.states[button.index()]
    }

    pub fn with(mut self, button: Button, state: ButtonState) -> Self {
        self.states[button.index()] = state;
        self
    }

    /// Snapshot with a single button freshly pressed
    pub fn pressed(button: Button) -> Self {
        Self::default().with(button, ButtonState::Pressed)
    }

    /// Snapshot with a single button held from an earlier frame
    pub fn held(button: Button) -> Self {
        Self::default().with(button, ButtonState::Down)
    }

    /// First held direction in priority order, and whether it was pressed this frame
    pub fn direction(&self) -> Option<(Direction, bool)> {
        Button::DIRECTIONS.iter().find_map(|(button, dir)| {
            let state = self.get(*button);
            state
                .is_held()
                .then_some((*dir, state == ButtonState::Pressed))
        })
    }
}

/// Turns raw button levels into edge states
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: [bool; 5],
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the raw levels (indexed like [`Button::ALL`]) for this frame
    pub fn poll(&mut self, raw: [bool; 5]) -> InputSnapshot {
        let mut snapshot = InputSnapshot::default();
        for button in Button::ALL {
            let i = button.index();
            let state = match (self.previous[i], raw[i]) {
                (false, true) => ButtonState::Pressed,
                (true, true) => ButtonState::Down,
                (true, false) => ButtonState::Released,
                (false, false) => ButtonState::Up,
            };
            snapshot = snapshot.with(button, state);
        }
        self.previous = raw;
        snapshot
    }
}

/// Raw levels with only `buttons` down
pub fn raw_levels(buttons: &[Button]) -> [bool; 5] {
    let mut raw = [false; 5];
    for b in buttons {
        raw[b.index()] = true;
    }
    raw
}

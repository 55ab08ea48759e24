//! Sound cues
//!
//! The simulation only names the cue; playback belongs to whatever
//! [`SoundSystem`] the host plugs in.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player starts a move (with or without a push)
    Move,
    /// Ice or frozen boulder shattered
    Break,
    /// Lava filled in
    LavaFill,
    /// Lock opened
    Lock,
    /// Switch toggled
    Switch,
    /// Bomb taken from a dispenser
    BombPlace,
    /// Bomb went off
    Explosion,
    /// Item picked up
    Item,
    /// Exit reached
    Victory,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Move => "move",
            SoundCue::Break => "break",
            SoundCue::LavaFill => "lava-fill",
            SoundCue::Lock => "lock",
            SoundCue::Switch => "switch",
            SoundCue::BombPlace => "bomb-place",
            SoundCue::Explosion => "explosion",
            SoundCue::Item => "item",
            SoundCue::Victory => "victory",
        }
    }
}

/// Fire-and-forget cue playback
pub trait SoundSystem {
    fn play(&mut self, cue: SoundCue);
}

/// Sound system that only logs the cues it is asked to play
#[derive(Debug, Default)]
pub struct LogSound {
    muted: bool,
    played: usize,
}

impl LogSound {
    pub fn new(muted: bool) -> Self {
        Self { muted, played: 0 }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Cues played since creation (muted cues excluded)
    pub fn played(&self) -> usize {
        self.played
    }
}

impl SoundSystem for LogSound {
    fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        self.played += 1;
        log::debug!("♪ {}", cue.as_str());
    }
}

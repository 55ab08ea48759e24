//! Per-frame glue between the host, the simulation and its collaborators
//!
//! A [`Session`] samples raw button levels, steps the stage and forwards the
//! queued events to the sound system, the HUD and the renderer.

use crate::audio::{LogSound, SoundSystem};
use crate::hud::{Hud, TextHud};
use crate::input::{Button, ButtonState, InputTracker};
use crate::renderer::{Region, Renderer, TextRenderer};
use crate::settings::Settings;
use crate::sim::{GameEvent, LoadError, Stage, Tilemap};

/// A running stage with its collaborators
pub struct Session<S = LogSound, H = TextHud, R = TextRenderer> {
    stage: Stage,
    tracker: InputTracker,
    sound: S,
    hud: H,
    renderer: R,
    frame_steps: i32,
    frames: u64,
    cleared: bool,
}

impl Session {
    /// Session with the logging sound system and the text HUD and renderer
    pub fn text(map: &Tilemap, settings: &Settings) -> Result<Self, LoadError> {
        let stage = Stage::with_tuning(map, settings.tuning.clone())?;
        Ok(Self::new(
            stage,
            LogSound::new(settings.muted),
            TextHud::new(),
            TextRenderer::new(),
            settings.frame_steps,
        ))
    }
}

impl<S: SoundSystem, H: Hud, R: Renderer> Session<S, H, R> {
    pub fn new(mut stage: Stage, sound: S, hud: H, renderer: R, frame_steps: i32) -> Self {
        // Events queued during load describe the initial state
        let pending = stage.drain_events();
        let mut session = Self {
            stage,
            tracker: InputTracker::new(),
            sound,
            hud,
            renderer,
            frame_steps: frame_steps.max(1),
            frames: 0,
            cleared: false,
        };
        session.dispatch(pending);
        session.renderer.draw(&session.stage);
        session
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether the player has reached the exit
    pub fn cleared(&self) -> bool {
        self.cleared
    }

    /// Run one frame with the raw button levels (indexed like [`Button::ALL`])
    pub fn frame(&mut self, raw: [bool; 5]) {
        let input = self.tracker.poll(raw);

        if input.get(Button::Action) == ButtonState::Pressed {
            log::info!("Restarting stage");
            self.stage.reset();
            self.cleared = false;
        } else {
            self.stage.update(&input, self.frame_steps);
        }

        let events = self.stage.drain_events();
        self.dispatch(events);
        self.renderer.draw(&self.stage);
        self.stage.clear_redraw_flags();
        self.frames += 1;
    }

    fn dispatch(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::Sound(cue) => self.sound.play(cue),
                GameEvent::InventoryChanged(inventory) => self.hud.inventory_changed(&inventory),
                GameEvent::StageCleared => {
                    log::info!("Stage cleared after {} frames", self.frames);
                    self.cleared = true;
                }
                GameEvent::RepaintInterior | GameEvent::RepaintArea { .. } => {
                    if let Some(region) = Region::from_event(&event) {
                        self.renderer.invalidate(region);
                    }
                }
            }
        }
    }
}

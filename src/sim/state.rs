//! Stage state and core simulation types
//!
//! Everything the simulation mutates lives in [`Stage`]; collaborators only
//! read it and consume the queued [`GameEvent`]s.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use super::tile::{Item, Marker, SolidKind, Tile};
use super::tilemap::{LoadError, Tilemap};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::settings::Tuning;

/// Facing / movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    /// Unit step in grid space (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Right => IVec2::new(1, 0),
            Direction::Up => IVec2::new(0, -1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Down => IVec2::new(0, 1),
        }
    }
}

/// Items carried by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub pickaxe: u8,
    pub shovel: u8,
    pub bombs: u8,
    pub keys: u8,
    pub gems: u8,
    pub max_gems: u8,
}

impl Inventory {
    pub fn count(&self, item: Item) -> u8 {
        match item {
            Item::Key => self.keys,
            Item::Pickaxe => self.pickaxe,
            Item::Shovel => self.shovel,
            Item::Bomb => self.bombs,
            Item::Gem => self.gems,
        }
    }

    fn slot(&mut self, item: Item) -> &mut u8 {
        match item {
            Item::Key => &mut self.keys,
            Item::Pickaxe => &mut self.pickaxe,
            Item::Shovel => &mut self.shovel,
            Item::Bomb => &mut self.bombs,
            Item::Gem => &mut self.gems,
        }
    }

    pub fn add(&mut self, item: Item) {
        let slot = self.slot(item);
        *slot = slot.saturating_add(1);
    }

    /// Consume one of `item`; false (and no change) if none are held
    pub fn take(&mut self, item: Item) -> bool {
        let slot = self.slot(item);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: IVec2,
    pub target: IVec2,
    /// Ticks left in the current move (0 = idle)
    pub move_timer: i32,
    pub moving: bool,
    /// One-frame pose after a successful activation
    pub acting: bool,
    pub direction: Direction,
    /// Sprite is mirrored (facing left)
    pub flip: bool,
    pub inventory: Inventory,
    pub victory: bool,
    pub redraw: bool,
}

impl Player {
    pub fn new(pos: IVec2, inventory: Inventory) -> Self {
        Self {
            pos,
            target: pos,
            move_timer: 0,
            moving: false,
            acting: false,
            direction: Direction::default(),
            flip: false,
            inventory,
            victory: false,
            redraw: true,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.moving && self.move_timer == 0
    }

    /// Interpolated position in cell units
    pub fn render_pos(&self, move_ticks: i32) -> Vec2 {
        lerp_cells(self.pos, self.target, self.move_timer, move_ticks)
    }
}

/// Linear interpolation from `pos` toward `target`, proportional to the elapsed part of a move
fn lerp_cells(pos: IVec2, target: IVec2, timer: i32, move_ticks: i32) -> Vec2 {
    if move_ticks <= 0 || timer <= 0 {
        return pos.as_vec2();
    }
    let remaining = timer.min(move_ticks) as f32 / move_ticks as f32;
    target.as_vec2() + (pos - target).as_vec2() * remaining
}

/// Movable kinds with their kind-specific timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovableKind {
    Boulder,
    /// Completed player moves left before detonation
    Bomb { fuse: u8 },
    /// Fixed-point spin phase (cosmetic)
    BlackHole { phase: u32 },
}

impl MovableKind {
    pub fn is_black_hole(&self) -> bool {
        matches!(self, MovableKind::BlackHole { .. })
    }

    /// Whether a pushed movable of this kind may enter a cell of this category
    pub fn can_enter(&self, solid: SolidKind) -> bool {
        match self {
            MovableKind::BlackHole { .. } => {
                !matches!(solid, SolidKind::Wall | SolidKind::Occupied)
            }
            _ => matches!(solid, SolidKind::Free | SolidKind::Lava),
        }
    }
}

/// A pushable entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movable {
    pub kind: MovableKind,
    pub pos: IVec2,
    pub target: IVec2,
    /// Mirrors the player's timer while moving
    pub move_timer: i32,
    pub moving: bool,
    pub exists: bool,
    pub redraw: bool,
}

impl Movable {
    pub fn new(kind: MovableKind, pos: IVec2) -> Self {
        Self {
            kind,
            pos,
            target: pos,
            move_timer: 0,
            moving: false,
            exists: true,
            redraw: true,
        }
    }

    fn vacant() -> Self {
        Self {
            exists: false,
            redraw: false,
            ..Self::new(MovableKind::Boulder, IVec2::ZERO)
        }
    }

    pub fn render_pos(&self, move_ticks: i32) -> Vec2 {
        lerp_cells(self.pos, self.target, self.move_timer, move_ticks)
    }
}

/// Index-stable movable slots. A slot index never changes while the stage lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovablePool {
    slots: Vec<Movable>,
}

impl MovablePool {
    pub fn with_capacity(capacity: usize) -> Result<Self, LoadError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, Movable::vacant);
        Ok(Self { slots })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Vacate every slot without releasing them
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|m| *m = Movable::vacant());
    }

    /// Place a movable in the first vacant slot, appending one if all are taken
    pub fn spawn(&mut self, kind: MovableKind, pos: IVec2) -> usize {
        let movable = Movable::new(kind, pos);
        match self.slots.iter().position(|m| !m.exists) {
            Some(i) => {
                self.slots[i] = movable;
                i
            }
            None => {
                log::debug!("Movable pool full, growing to {}", self.slots.len() + 1);
                self.slots.push(movable);
                self.slots.len() - 1
            }
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Movable> {
        self.slots.get(slot).filter(|m| m.exists)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Movable> {
        self.slots.get_mut(slot).filter(|m| m.exists)
    }

    /// Slot of the existing movable standing on `cell`
    pub fn at(&self, cell: IVec2) -> Option<usize> {
        self.slots.iter().position(|m| m.exists && m.pos == cell)
    }

    pub fn destroy(&mut self, slot: usize) {
        if let Some(m) = self.slots.get_mut(slot) {
            m.exists = false;
            m.moving = false;
            m.move_timer = 0;
        }
    }

    /// Existing movables with their slot index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Movable)> {
        self.slots.iter().enumerate().filter(|(_, m)| m.exists)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Movable)> {
        self.slots.iter_mut().enumerate().filter(|(_, m)| m.exists)
    }

    pub fn live_count(&self) -> usize {
        self.iter().count()
    }
}

/// Timed visual effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnimationMode {
    #[default]
    None,
    TileDisappear,
    FrozenBreak,
    LavaFill,
    Explosion,
}

/// The single system-wide animation. While active it latches out grid mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimationState {
    pub mode: AnimationMode,
    /// Ticks remaining
    pub timer: i32,
    pub origin: IVec2,
    /// A boulder appears at the origin when the effect ends
    pub spawns_boulder: bool,
}

impl AnimationState {
    pub fn is_active(&self) -> bool {
        self.mode != AnimationMode::None
    }

    /// Progress through the effect in 0..=1
    pub fn progress(&self, tuning: &Tuning) -> f32 {
        let total = tuning.animation_ticks(self.mode);
        if total <= 0 {
            return 1.0;
        }
        1.0 - (self.timer.clamp(0, total) as f32 / total as f32)
    }
}

/// Notifications for collaborators, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    InventoryChanged(Inventory),
    /// Every interior cell must be repainted
    RepaintInterior,
    /// Cells within Chebyshev `radius` of `center` must be repainted
    RepaintArea { center: IVec2, radius: i32 },
    StageCleared,
}

/// Fixed-point cosmetic timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmbientTimers {
    pub lava: u32,
    pub lava_glow: u32,
}

/// Advance a fixed-point phase by `speed * steps`, wrapping at `period` whole units
pub fn advance_phase(phase: u32, speed: u32, steps: u32, period: u32) -> u32 {
    let period = period * FIXED_PREC;
    // Reduce first so huge step counts cannot overflow
    (phase % period + speed * (steps % period)) % period
}

impl AmbientTimers {
    pub fn advance(&mut self, steps: u32) {
        self.lava = advance_phase(self.lava, LAVA_SPEED, steps, LAVA_PERIOD);
        self.lava_glow = advance_phase(self.lava_glow, LAVA_GLOW_SPEED, steps, LAVA_GLOW_PERIOD);
    }

    /// Lava scroll offset in pixels of a 16px tile
    pub fn lava_frame(&self) -> u32 {
        self.lava / FIXED_PREC
    }
}

/// A loaded stage: the aggregate that owns the grid, the player and the movables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub grid: TileGrid,
    pub player: Player,
    pub movables: MovablePool,
    pub animation: AnimationState,
    pub timers: AmbientTimers,
    pub tuning: Tuning,
    /// Decoded tilemap the stage resets to
    layout: Vec<Tile>,
    start_inventory: Inventory,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl Stage {
    /// Build a stage from a tilemap with default tuning
    pub fn load(map: &Tilemap) -> Result<Self, LoadError> {
        Self::with_tuning(map, Tuning::default())
    }

    pub fn with_tuning(map: &Tilemap, tuning: Tuning) -> Result<Self, LoadError> {
        map.validate()?;
        let layout = map.decode_grid()?;
        let (width, height) = map.grid_size();
        let (pickaxe, shovel, bombs) = map.item_header();

        let markers = layout
            .iter()
            .filter(|t| matches!(t.marker(), Some(m) if m != Marker::Player))
            .count();
        let player_start = layout
            .iter()
            .position(|t| *t == Tile::PLAYER_MARKER)
            .ok_or(LoadError::MissingPlayer)?;

        let mut stage = Self {
            grid: TileGrid::new(width, height)?,
            player: Player::new(cell_of(player_start, width), Inventory::default()),
            movables: MovablePool::with_capacity(markers + 1)?,
            animation: AnimationState::default(),
            timers: AmbientTimers::default(),
            tuning,
            layout,
            start_inventory: Inventory {
                pickaxe,
                shovel,
                bombs,
                ..Default::default()
            },
            events: Vec::new(),
        };
        stage.reset();
        log::info!(
            "Stage loaded: {}x{}, {} movables, {} gems",
            width,
            height,
            stage.movables.live_count(),
            stage.player.inventory.max_gems
        );
        Ok(stage)
    }

    /// Restore the freshly loaded state without reallocating
    pub fn reset(&mut self) {
        let width = self.grid.width() as u16;
        self.grid.fill_from(&self.layout);
        self.movables.clear();
        self.animation = AnimationState::default();
        self.timers = AmbientTimers::default();
        self.events.clear();

        let mut inventory = self.start_inventory;
        let mut player_pos = None;
        for (i, tile) in self.layout.iter().enumerate() {
            let cell = cell_of(i, width);
            if *tile == Tile::GEM {
                inventory.max_gems = inventory.max_gems.saturating_add(1);
            }
            let kind = match tile.marker() {
                None => continue,
                Some(Marker::Player) => {
                    // Extra player markers are erased; the first one is the start
                    if player_pos.is_none() {
                        player_pos = Some(cell);
                    }
                    self.grid.set_tile(cell, Tile::EMPTY);
                    continue;
                }
                Some(Marker::Boulder) => MovableKind::Boulder,
                Some(Marker::Bomb) => MovableKind::Bomb {
                    fuse: self.tuning.bomb_fuse,
                },
                Some(Marker::BlackHole) => MovableKind::BlackHole { phase: 0 },
            };
            self.grid.set_tile(cell, Tile::EMPTY);
            self.movables.spawn(kind, cell);
        }
        self.player = Player::new(player_pos.unwrap_or(IVec2::ONE), inventory);
        self.push_event(GameEvent::RepaintInterior);
        self.push_event(GameEvent::InventoryChanged(inventory));
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Ask for a single cell of the static grid to be repainted
    pub fn repaint_cell(&mut self, cell: IVec2) {
        self.events.push(GameEvent::RepaintArea {
            center: cell,
            radius: 0,
        });
    }

    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    pub fn notify_inventory(&mut self) {
        self.events
            .push(GameEvent::InventoryChanged(self.player.inventory));
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Whether the animation latch currently blocks grid mutation
    pub fn is_latched(&self) -> bool {
        self.animation.is_active()
    }

    /// Write a visual tile. Clearing a lava cell goes through a LavaFill
    /// animation instead: the solid entry is freed now, the visual on expiry.
    pub fn set_tile(&mut self, cell: IVec2, tile: Tile) {
        if tile == Tile::EMPTY && self.grid.tile(cell) == Tile::LAVA && !self.is_latched() {
            self.grid.set_solid(cell, SolidKind::Free);
            self.start_animation(AnimationMode::LavaFill, cell);
            return;
        }
        self.grid.set_tile(cell, tile);
    }

    /// Start the system-wide animation at `origin`
    pub fn start_animation(&mut self, mode: AnimationMode, origin: IVec2) {
        self.animation = AnimationState {
            mode,
            timer: self.tuning.animation_ticks(mode),
            origin,
            spawns_boulder: false,
        };
    }

    /// Spawn a movable and mark its cell occupied
    pub fn spawn_movable(&mut self, kind: MovableKind, cell: IVec2) -> usize {
        self.grid.set_solid(cell, SolidKind::Occupied);
        let slot = self.movables.spawn(kind, cell);
        log::debug!("Spawned {:?} in slot {} at {}", kind, slot, cell);
        slot
    }

    /// Destroy a movable and free the cell it occupied
    pub fn destroy_movable(&mut self, slot: usize) {
        if let Some(m) = self.movables.get(slot) {
            let cell = m.pos;
            if self.grid.solid(cell) == SolidKind::Occupied {
                self.grid.release(cell);
            }
            self.movables.destroy(slot);
        }
    }

    /// Flag movables near `cell` for redraw
    pub fn mark_redraw_near(&mut self, cell: IVec2, radius: i32) {
        for (_, m) in self.movables.iter_mut() {
            if crate::chebyshev(m.pos, cell) <= radius || crate::chebyshev(m.target, cell) <= radius
            {
                m.redraw = true;
            }
        }
    }

    /// Renderer acknowledgement that every flagged entity was drawn
    pub fn clear_redraw_flags(&mut self) {
        self.player.redraw = false;
        for (_, m) in self.movables.iter_mut() {
            m.redraw = false;
        }
    }
}

fn cell_of(index: usize, width: u16) -> IVec2 {
    let width = width.max(1) as usize;
    IVec2::new((index % width) as i32, (index / width) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAGE: &str = "\
1 0 2
#######
#P.B.g#
#.O.@.#
#~..g.#
#######
";

    fn stage() -> Stage {
        Stage::load(&Tilemap::from_text(STAGE).unwrap()).unwrap()
    }

    #[test]
    fn test_load_parses_markers() {
        let stage = stage();
        assert_eq!(stage.player.pos, IVec2::new(1, 1));
        assert_eq!(stage.player.inventory.pickaxe, 1);
        assert_eq!(stage.player.inventory.bombs, 2);
        assert_eq!(stage.player.inventory.max_gems, 2);

        // Three markers plus one spare slot
        assert_eq!(stage.movables.capacity(), 4);
        assert_eq!(stage.movables.live_count(), 3);

        let boulder = IVec2::new(3, 1);
        assert_eq!(stage.grid.tile(boulder), Tile::EMPTY);
        assert_eq!(stage.grid.solid(boulder), SolidKind::Occupied);
        let slot = stage.movables.at(boulder).unwrap();
        assert_eq!(stage.movables.get(slot).unwrap().kind, MovableKind::Boulder);

        let bomb = stage.movables.at(IVec2::new(2, 2)).unwrap();
        assert!(matches!(
            stage.movables.get(bomb).unwrap().kind,
            MovableKind::Bomb { fuse: BOMB_FUSE }
        ));
        assert_eq!(stage.grid.tile(IVec2::new(1, 1)), Tile::EMPTY);
    }

    #[test]
    fn test_missing_player() {
        let map = Tilemap::from_text("0\n####\n#..#\n####\n").unwrap();
        assert!(matches!(Stage::load(&map), Err(LoadError::MissingPlayer)));
    }

    #[test]
    fn test_reset_idempotent() {
        let mut stage = stage();
        stage.grid.set_tile(IVec2::new(2, 1), Tile::WALL);
        stage.grid.set_solid(IVec2::new(2, 1), SolidKind::Wall);
        stage.player.inventory.keys = 4;

        stage.reset();
        let once = (stage.grid.clone(), stage.movables.live_count());
        stage.reset();
        assert_eq!(stage.grid, once.0);
        assert_eq!(stage.movables.live_count(), once.1);
        assert_eq!(stage.player.inventory.keys, 0);
        assert_eq!(stage.movables.capacity(), 4);
    }

    #[test]
    fn test_lava_clear_is_intercepted() {
        let mut stage = stage();
        let lava = IVec2::new(1, 3);
        stage.set_tile(lava, Tile::EMPTY);
        assert_eq!(stage.grid.tile(lava), Tile::LAVA);
        assert_eq!(stage.grid.solid(lava), SolidKind::Free);
        assert_eq!(stage.animation.mode, AnimationMode::LavaFill);
        assert_eq!(stage.animation.origin, lava);

        // Ordinary writes go straight through
        stage.set_tile(IVec2::new(2, 1), Tile::GEM);
        assert_eq!(stage.grid.tile(IVec2::new(2, 1)), Tile::GEM);
    }

    #[test]
    fn test_pool_slots_are_stable() {
        let mut pool = MovablePool::with_capacity(2).unwrap();
        let a = pool.spawn(MovableKind::Boulder, IVec2::new(1, 1));
        let b = pool.spawn(MovableKind::Boulder, IVec2::new(2, 1));
        pool.destroy(a);
        let c = pool.spawn(MovableKind::Bomb { fuse: 1 }, IVec2::new(3, 1));
        assert_eq!(c, a);
        let d = pool.spawn(MovableKind::Boulder, IVec2::new(4, 1));
        assert_eq!(d, 2);
        assert_eq!(pool.get(b).unwrap().pos, IVec2::new(2, 1));
    }

    #[test]
    fn test_render_interpolation() {
        let mut player = Player::new(IVec2::new(1, 1), Inventory::default());
        player.target = IVec2::new(2, 1);
        player.move_timer = 12;
        let pos = player.render_pos(16);
        assert!((pos.x - 1.25).abs() < 1e-5);
        assert!((pos.y - 1.0).abs() < 1e-5);

        player.move_timer = 0;
        assert_eq!(player.render_pos(16), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_huge_steps_wrap_without_overflow() {
        let period = LAVA_PERIOD * FIXED_PREC;
        let mut a = AmbientTimers::default();
        let mut b = AmbientTimers::default();
        a.advance(u32::MAX);
        b.advance(u32::MAX % period);
        assert_eq!(a, b);
        assert!(a.lava < period);
        assert!(a.lava_glow < LAVA_GLOW_PERIOD * FIXED_PREC);

        // A whole period brings the phase back
        let full = BLACK_HOLE_PERIOD * FIXED_PREC;
        assert_eq!(
            advance_phase(7, BLACK_HOLE_SPEED, full, BLACK_HOLE_PERIOD),
            7
        );
    }

    #[test]
    fn test_first_player_marker_wins() {
        let map = Tilemap::from_text("0\n######\n#.P.P#\n######\n").unwrap();
        let mut stage = Stage::load(&map).unwrap();
        assert_eq!(stage.player.pos, IVec2::new(2, 1));
        stage.reset();
        assert_eq!(stage.player.pos, IVec2::new(2, 1));
        assert_eq!(stage.grid.tile(IVec2::new(4, 1)), Tile::EMPTY);
    }

    #[test]
    fn test_inventory_take() {
        let mut inv = Inventory::default();
        assert!(!inv.take(Item::Key));
        inv.add(Item::Key);
        assert!(inv.take(Item::Key));
        assert_eq!(inv.keys, 0);
    }
}

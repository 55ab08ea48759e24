//! Stage rendering
//!
//! The simulation tells the renderer which parts of the static grid went
//! stale through repaint events; entities carry their own redraw flags.
//! [`TextRenderer`] keeps the last frame and touches only stale cells and
//! flagged entities on each draw.

use glam::IVec2;

use crate::sim::{AnimationMode, GameEvent, MovableKind, Stage, Tile, tile_glyph};

/// Part of the static grid that must be repainted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Every cell inside the border ring
    Interior,
    /// Cells within Chebyshev `radius` of `center`
    Area { center: IVec2, radius: i32 },
}

impl Region {
    /// Region carried by a repaint event, if any
    pub fn from_event(event: &GameEvent) -> Option<Region> {
        match *event {
            GameEvent::RepaintInterior => Some(Region::Interior),
            GameEvent::RepaintArea { center, radius } => Some(Region::Area { center, radius }),
            _ => None,
        }
    }
}

/// Something that can draw a stage
pub trait Renderer {
    /// Mark a region of the static grid as stale
    fn invalidate(&mut self, region: Region);
    /// Draw the stage: stale cells are repainted and entities whose redraw
    /// flag is set are drawn again
    fn draw(&mut self, stage: &Stage);
}

const BOULDER_GLYPH: char = 'B';
const BOMB_GLYPH: char = 'O';
const BLACK_HOLE_GLYPH: char = '@';
const PLAYER_GLYPH: char = 'P';
const BLAST_GLYPH: char = '*';

/// Character-cell renderer
#[derive(Debug, Default)]
pub struct TextRenderer {
    width: i32,
    height: i32,
    /// Painted static grid
    background: Vec<char>,
    /// Background with entities on top, kept between draws
    frame: Vec<char>,
    stale: Vec<Region>,
    /// Cell each movable slot was last drawn at
    drawn: Vec<Option<IVec2>>,
    player_drawn: Option<IVec2>,
    /// Cells repainted since creation
    painted: usize,
    /// Entity glyphs drawn since creation
    entity_draws: usize,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells repainted so far
    pub fn painted(&self) -> usize {
        self.painted
    }

    /// Entity glyphs drawn so far
    pub fn entity_draws(&self) -> usize {
        self.entity_draws
    }

    /// Last drawn frame as text, one line per grid row
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.frame.len() + self.height.max(0) as usize);
        for row in self.frame.chunks(self.width.max(1) as usize) {
            out.extend(row);
            out.push('\n');
        }
        out
    }

    /// Glyph at `cell` in the last drawn frame
    pub fn glyph(&self, cell: IVec2) -> Option<char> {
        self.index(cell).map(|i| self.frame[i])
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        let inside = cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height;
        inside.then(|| (cell.y * self.width + cell.x) as usize)
    }

    fn paint(&mut self, stage: &Stage, cell: IVec2) {
        if let Some(i) = self.index(cell) {
            self.background[i] = tile_glyph(stage.grid.tile(cell));
            self.painted += 1;
        }
    }

    fn resize(&mut self, stage: &Stage) {
        self.width = stage.grid.width();
        self.height = stage.grid.height();
        let len = (self.width * self.height).max(0) as usize;
        self.background = vec![' '; len];
        self.stale.clear();
        self.drawn.clear();
        self.player_drawn = None;
        for y in 0..self.height {
            for x in 0..self.width {
                self.paint(stage, IVec2::new(x, y));
            }
        }
        self.frame = self.background.clone();
        log::debug!("Text renderer sized to {}x{}", self.width, self.height);
    }

    /// Put the background back on `cell`
    fn restore(&mut self, cell: IVec2) {
        if let Some(i) = self.index(cell) {
            self.frame[i] = self.background[i];
        }
    }

    fn overlay(&mut self, cell: IVec2, glyph: char) {
        if let Some(i) = self.index(cell) {
            self.frame[i] = glyph;
        }
    }

    /// Repaint the stale regions and return every cell that was touched
    fn repaint_stale(&mut self, stage: &Stage) -> Vec<IVec2> {
        let mut dirty = Vec::new();
        for region in std::mem::take(&mut self.stale) {
            match region {
                Region::Interior => dirty.extend(stage.grid.interior()),
                Region::Area { center, radius } => {
                    for dy in -radius..=radius {
                        for dx in -radius..=radius {
                            dirty.push(center + IVec2::new(dx, dy));
                        }
                    }
                }
            }
        }
        for cell in &dirty {
            self.paint(stage, *cell);
        }
        dirty
    }
}

fn movable_glyph(kind: MovableKind) -> char {
    match kind {
        MovableKind::Boulder => BOULDER_GLYPH,
        MovableKind::Bomb { .. } => BOMB_GLYPH,
        MovableKind::BlackHole { .. } => BLACK_HOLE_GLYPH,
    }
}

impl Renderer for TextRenderer {
    fn invalidate(&mut self, region: Region) {
        self.stale.push(region);
    }

    fn draw(&mut self, stage: &Stage) {
        if self.width != stage.grid.width() || self.height != stage.grid.height() {
            self.resize(stage);
        }
        let move_ticks = stage.tuning.move_ticks;
        let mut dirty = self.repaint_stale(stage);

        // Cells under a running effect change every frame
        let anim = stage.animation;
        match anim.mode {
            AnimationMode::None => {}
            AnimationMode::Explosion => {
                dirty.extend(crate::neighbors8(anim.origin).chain([anim.origin]));
            }
            _ => dirty.push(anim.origin),
        }

        // Flagged or vanished entities leave their old cell
        for (slot, prev) in self.drawn.iter().enumerate() {
            let Some(prev) = prev else {
                continue;
            };
            if stage.movables.get(slot).is_none_or(|m| m.redraw) {
                dirty.push(*prev);
            }
        }
        if stage.player.redraw {
            dirty.extend(self.player_drawn);
        }

        for cell in &dirty {
            self.restore(*cell);
        }

        match anim.mode {
            AnimationMode::None => {}
            AnimationMode::Explosion => {
                for cell in crate::neighbors8(anim.origin).chain([anim.origin]) {
                    self.overlay(cell, BLAST_GLYPH);
                }
            }
            // Partial reveal: the cleared cell shows through halfway in
            _ if anim.progress(&stage.tuning) >= 0.5 => {
                self.overlay(anim.origin, tile_glyph(Tile::EMPTY));
            }
            _ => {}
        }

        let mut drawn = vec![None; stage.movables.capacity()];
        for (slot, m) in stage.movables.iter() {
            let cell = m.render_pos(move_ticks).round().as_ivec2();
            let prev = self.drawn.get(slot).copied().flatten();
            if m.redraw || prev.is_none() || dirty.contains(&cell) {
                self.overlay(cell, movable_glyph(m.kind));
                self.entity_draws += 1;
                drawn[slot] = Some(cell);
            } else {
                drawn[slot] = prev;
            }
        }
        self.drawn = drawn;

        let cell = stage.player.render_pos(move_ticks).round().as_ivec2();
        if stage.player.redraw || self.player_drawn.is_none() || dirty.contains(&cell) {
            self.overlay(cell, PLAYER_GLYPH);
            self.entity_draws += 1;
            self.player_drawn = Some(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Tilemap;

    const FIELD: &str = "0\n######\n#PB.g#\n#..~.#\n######\n";

    fn stage() -> Stage {
        Stage::load(&Tilemap::from_text(FIELD).unwrap()).unwrap()
    }

    #[test]
    fn test_first_draw_paints_everything() {
        let stage = stage();
        let mut renderer = TextRenderer::new();
        renderer.draw(&stage);
        assert_eq!(renderer.text(), "######\n#PB.g#\n#..~.#\n######\n");
        assert_eq!(renderer.painted(), 24);
    }

    #[test]
    fn test_only_stale_cells_repaint() {
        let mut stage = stage();
        let mut renderer = TextRenderer::new();
        renderer.draw(&stage);

        let gem = IVec2::new(4, 1);
        stage.grid.set_tile(gem, Tile::EMPTY);
        renderer.draw(&stage);
        // Nothing invalidated, the old gem is still painted
        assert_eq!(renderer.glyph(gem), Some('g'));

        renderer.invalidate(Region::Area {
            center: gem,
            radius: 0,
        });
        renderer.draw(&stage);
        assert_eq!(renderer.glyph(gem), Some('.'));
        assert_eq!(renderer.painted(), 25);
    }

    #[test]
    fn test_region_from_event() {
        assert_eq!(
            Region::from_event(&GameEvent::RepaintInterior),
            Some(Region::Interior)
        );
        assert_eq!(Region::from_event(&GameEvent::StageCleared), None);
    }

    #[test]
    fn test_entities_follow_redraw_flags() {
        let mut stage = stage();
        let mut renderer = TextRenderer::new();
        renderer.draw(&stage);
        assert_eq!(renderer.entity_draws(), 2);

        stage.clear_redraw_flags();
        renderer.draw(&stage);
        assert_eq!(renderer.entity_draws(), 2);

        // Moved without its flag: the old glyph stays on screen
        let (old, new) = (IVec2::new(2, 1), IVec2::new(3, 1));
        let slot = stage.movables.at(old).unwrap();
        let boulder = stage.movables.get_mut(slot).unwrap();
        boulder.pos = new;
        boulder.target = new;
        renderer.draw(&stage);
        assert_eq!(renderer.glyph(old), Some('B'));
        assert_eq!(renderer.glyph(new), Some('.'));

        // Flagged: the old cell is restored and the new one drawn
        stage.movables.get_mut(slot).unwrap().redraw = true;
        renderer.draw(&stage);
        assert_eq!(renderer.glyph(old), Some('.'));
        assert_eq!(renderer.glyph(new), Some('B'));
        assert_eq!(renderer.entity_draws(), 3);
    }

    #[test]
    fn test_destroyed_movable_is_erased() {
        let mut stage = stage();
        let mut renderer = TextRenderer::new();
        renderer.draw(&stage);
        stage.clear_redraw_flags();

        let cell = IVec2::new(2, 1);
        let slot = stage.movables.at(cell).unwrap();
        stage.destroy_movable(slot);
        renderer.draw(&stage);
        assert_eq!(renderer.glyph(cell), Some('.'));
        assert_eq!(renderer.glyph(IVec2::new(1, 1)), Some('P'));
    }

    #[test]
    fn test_explosion_overlay() {
        let mut stage = stage();
        let mut renderer = TextRenderer::new();
        stage.start_animation(AnimationMode::Explosion, IVec2::new(3, 2));
        renderer.draw(&stage);
        assert_eq!(renderer.glyph(IVec2::new(3, 2)), Some('*'));
        assert_eq!(renderer.glyph(IVec2::new(4, 1)), Some('*'));
        // Entities stay on top
        assert_eq!(renderer.glyph(IVec2::new(2, 1)), Some('B'));
    }
}

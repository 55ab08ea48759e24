//! Two-layer tile grid
//!
//! `visual` holds what is drawn, `solid` what blocks. The solid layer is
//! derived from the visual one only when a stage is (re)loaded; afterwards the
//! two are mutated independently by gameplay events.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::tile::{SolidKind, Tile};
use super::tilemap::LoadError;

/// Visual and collision layers of a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    visual: Vec<Tile>,
    solid: Vec<SolidKind>,
}

impl TileGrid {
    /// Allocate an empty grid
    pub fn new(width: u16, height: u16) -> Result<Self, LoadError> {
        let len = width as usize * height as usize;
        let mut visual = Vec::new();
        visual.try_reserve_exact(len)?;
        visual.resize(len, Tile::EMPTY);
        let mut solid = Vec::new();
        solid.try_reserve_exact(len)?;
        solid.resize(len, SolidKind::Free);
        Ok(Self {
            width: width as i32,
            height: height as i32,
            visual,
            solid,
        })
    }

    /// Overwrite both layers from a decoded layout, deriving the solid layer
    pub fn fill_from(&mut self, layout: &[Tile]) {
        for ((visual, solid), tile) in self
            .visual
            .iter_mut()
            .zip(self.solid.iter_mut())
            .zip(layout)
        {
            *visual = *tile;
            *solid = tile.solid();
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        if self.in_bounds(cell) {
            Some((cell.y * self.width + cell.x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Inside the border ring, which is an implicit wall
    pub fn in_interior(&self, cell: IVec2) -> bool {
        cell.x >= 1 && cell.y >= 1 && cell.x < self.width - 1 && cell.y < self.height - 1
    }

    /// Visual tile; out-of-range cells read as wall
    pub fn tile(&self, cell: IVec2) -> Tile {
        self.index(cell).map_or(Tile::WALL, |i| self.visual[i])
    }

    /// Write a visual tile; out-of-range writes are ignored
    pub fn set_tile(&mut self, cell: IVec2, tile: Tile) {
        if let Some(i) = self.index(cell) {
            self.visual[i] = tile;
        }
    }

    /// Collision category; out-of-range cells read as wall
    pub fn solid(&self, cell: IVec2) -> SolidKind {
        self.index(cell).map_or(SolidKind::Wall, |i| self.solid[i])
    }

    pub fn set_solid(&mut self, cell: IVec2, solid: SolidKind) {
        if let Some(i) = self.index(cell) {
            self.solid[i] = solid;
        }
    }

    /// Free a cell a movable just left. A closed color block toggled shut
    /// underneath the movable becomes a wall again.
    pub fn release(&mut self, cell: IVec2) {
        let solid = if self.tile(cell).is_closed_block() {
            SolidKind::Wall
        } else {
            SolidKind::Free
        };
        self.set_solid(cell, solid);
    }

    pub fn is_free(&self, cell: IVec2) -> bool {
        self.solid(cell).is_free()
    }

    /// Anything but a free cell blocks the player
    pub fn is_blocking(&self, cell: IVec2) -> bool {
        !self.is_free(cell)
    }

    pub fn is_interactive(&self, cell: IVec2) -> bool {
        self.solid(cell).is_interactive()
    }

    /// Every interior cell, row by row
    pub fn interior(&self) -> impl Iterator<Item = IVec2> + use<> {
        let (w, h) = (self.width, self.height);
        (1..h - 1).flat_map(move |y| (1..w - 1).map(move |x| IVec2::new(x, y)))
    }

    pub fn visual(&self) -> &[Tile] {
        &self.visual
    }

    pub fn solids(&self) -> &[SolidKind] {
        &self.solid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid() -> TileGrid {
        let mut grid = TileGrid::new(4, 3).unwrap();
        let mut layout = vec![Tile::WALL; 12];
        layout[5] = Tile::LAVA;
        layout[6] = Tile::EMPTY;
        grid.fill_from(&layout);
        grid
    }

    #[test]
    fn test_fill_derives_solids() {
        let grid = grid();
        assert_eq!(grid.tile(IVec2::new(1, 1)), Tile::LAVA);
        assert_eq!(grid.solid(IVec2::new(1, 1)), SolidKind::Lava);
        assert_eq!(grid.solid(IVec2::new(2, 1)), SolidKind::Free);
        assert_eq!(grid.solid(IVec2::new(0, 0)), SolidKind::Wall);
    }

    #[test]
    fn test_interior() {
        let grid = grid();
        let cells: Vec<_> = grid.interior().collect();
        assert_eq!(cells, vec![IVec2::new(1, 1), IVec2::new(2, 1)]);
        assert!(!grid.in_interior(IVec2::new(0, 1)));
        assert!(!grid.in_interior(IVec2::new(3, 1)));
        assert!(grid.in_bounds(IVec2::new(3, 2)));
    }

    #[test]
    fn test_out_of_range_is_wall() {
        let mut grid = grid();
        assert_eq!(grid.tile(IVec2::new(-1, 0)), Tile::WALL);
        assert_eq!(grid.solid(IVec2::new(4, 0)), SolidKind::Wall);
        assert_eq!(grid.solid(IVec2::new(0, -1)), SolidKind::Wall);
        assert!(grid.is_blocking(IVec2::new(0, -1)));
        assert!(!grid.is_blocking(IVec2::new(2, 1)));

        let before = grid.clone();
        grid.set_tile(IVec2::new(9, 9), Tile::EMPTY);
        grid.set_solid(IVec2::new(-3, 1), SolidKind::Free);
        assert_eq!(grid, before);
    }

    proptest! {
        #[test]
        fn test_any_access_is_safe(x in -100i32..100, y in -100i32..100) {
            let mut grid = grid();
            let cell = IVec2::new(x, y);
            let solid = grid.solid(cell);
            if !grid.in_bounds(cell) {
                prop_assert_eq!(solid, SolidKind::Wall);
                prop_assert_eq!(grid.tile(cell), Tile::WALL);
            }
            grid.set_solid(cell, SolidKind::Free);
            grid.set_tile(cell, Tile::EMPTY);
        }
    }
}

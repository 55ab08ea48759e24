//! Tile ids and collision categories
//!
//! Tile ids are the tilemap's raw ids minus [`RAW_TILE_OFFSET`]. The first tileset
//! row holds the fixed tiles below; every further row is a color palette whose
//! columns hold switches and switchable blocks.

use serde::{Deserialize, Serialize};

/// Offset between raw tilemap ids and tile ids
pub const RAW_TILE_OFFSET: u16 = 16;

/// Tiles per tileset row
pub const PALETTE_WIDTH: u8 = 16;

// Columns within a palette row
const SWITCH_A: u8 = 0;
const SWITCH_B: u8 = 1;
/// Column 3 starts solid and opens on a toggle; column 6 starts passable and closes
const BLOCK_CLOSED: u8 = 3;
const BLOCK_OPEN: u8 = 6;
/// Column step between a closed block and its open variant
const BLOCK_STEP: u8 = BLOCK_OPEN - BLOCK_CLOSED;

/// Visual content of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tile(pub u8);

impl Tile {
    pub const EMPTY: Tile = Tile(0);
    pub const WALL: Tile = Tile(1);
    pub const BOULDER_MARKER: Tile = Tile(2);
    pub const ICE: Tile = Tile(3);
    pub const LAVA: Tile = Tile(4);
    pub const FROZEN_BOULDER: Tile = Tile(5);
    pub const LOCK: Tile = Tile(6);
    pub const DISPENSER: Tile = Tile(7);
    pub const KEY: Tile = Tile(8);
    pub const PICKAXE: Tile = Tile(9);
    pub const SHOVEL: Tile = Tile(10);
    pub const BOMB_ITEM: Tile = Tile(11);
    pub const GEM: Tile = Tile(12);
    pub const EXIT: Tile = Tile(13);
    pub const BOMB_MARKER: Tile = Tile(14);
    pub const BLACK_HOLE_MARKER: Tile = Tile(15);
    pub const PLAYER_MARKER: Tile = Tile(16);

    /// Decode a raw tilemap id. Raw 0 is an empty cell; ids below the offset are corrupt.
    pub fn from_raw(raw: u16) -> Option<Tile> {
        match raw {
            0 => Some(Tile::EMPTY),
            r if r < RAW_TILE_OFFSET => None,
            r => u8::try_from(r - RAW_TILE_OFFSET).ok().map(Tile),
        }
    }

    /// Encode back into a raw tilemap id
    pub fn to_raw(self) -> u16 {
        self.0 as u16 + RAW_TILE_OFFSET
    }

    fn in_palette(palette: u8, column: u8) -> Option<Tile> {
        if palette == 0 || column >= PALETTE_WIDTH {
            return None;
        }
        palette
            .checked_mul(PALETTE_WIDTH)
            .and_then(|base| base.checked_add(1 + column))
            .map(Tile)
    }

    /// Switch of the given palette row (variant A)
    pub fn switch(palette: u8) -> Option<Tile> {
        Self::in_palette(palette, SWITCH_A)
    }

    /// Closed (solid) color block of the given palette row
    pub fn closed_block(palette: u8) -> Option<Tile> {
        Self::in_palette(palette, BLOCK_CLOSED)
    }

    /// Open (passable) color block of the given palette row
    pub fn open_block(palette: u8) -> Option<Tile> {
        Self::in_palette(palette, BLOCK_OPEN)
    }

    /// Palette row of a color tile; `None` for the fixed tiles of row 0
    pub fn palette(self) -> Option<u8> {
        if self.0 > PALETTE_WIDTH {
            Some((self.0 - 1) / PALETTE_WIDTH)
        } else {
            None
        }
    }

    fn column(self) -> Option<u8> {
        self.palette().map(|_| (self.0 - 1) % PALETTE_WIDTH)
    }

    pub fn is_switch(self) -> bool {
        matches!(self.column(), Some(SWITCH_A | SWITCH_B))
    }

    pub fn is_closed_block(self) -> bool {
        self.column() == Some(BLOCK_CLOSED)
    }

    pub fn is_open_block(self) -> bool {
        self.column() == Some(BLOCK_OPEN)
    }

    /// Variant this tile turns into when a switch of its palette is toggled
    pub fn toggled(self) -> Tile {
        match self.column() {
            Some(SWITCH_A) => Tile(self.0 + 1),
            Some(SWITCH_B) => Tile(self.0 - 1),
            Some(BLOCK_CLOSED) => Tile(self.0 + BLOCK_STEP),
            Some(BLOCK_OPEN) => Tile(self.0 - BLOCK_STEP),
            _ => self,
        }
    }

    /// Collision category a freshly loaded cell with this tile gets
    pub fn solid(self) -> SolidKind {
        match self {
            Tile::WALL => SolidKind::Wall,
            Tile::BOULDER_MARKER | Tile::BOMB_MARKER | Tile::BLACK_HOLE_MARKER => {
                SolidKind::Occupied
            }
            Tile::ICE => SolidKind::FrozenWall,
            Tile::LAVA => SolidKind::Lava,
            Tile::FROZEN_BOULDER => SolidKind::FrozenBoulder,
            Tile::LOCK => SolidKind::Lock,
            Tile::DISPENSER => SolidKind::Dispenser,
            t if t.is_switch() => SolidKind::Switch,
            t if t.is_closed_block() => SolidKind::Wall,
            _ => SolidKind::Free,
        }
    }

    /// Item picked up by walking onto this tile
    pub fn item(self) -> Option<Item> {
        match self {
            Tile::KEY => Some(Item::Key),
            Tile::PICKAXE => Some(Item::Pickaxe),
            Tile::SHOVEL => Some(Item::Shovel),
            Tile::BOMB_ITEM => Some(Item::Bomb),
            Tile::GEM => Some(Item::Gem),
            _ => None,
        }
    }

    /// Placement marker parsed out of the visual layer at load/reset
    pub fn marker(self) -> Option<Marker> {
        match self {
            Tile::BOULDER_MARKER => Some(Marker::Boulder),
            Tile::BOMB_MARKER => Some(Marker::Bomb),
            Tile::BLACK_HOLE_MARKER => Some(Marker::BlackHole),
            Tile::PLAYER_MARKER => Some(Marker::Player),
            _ => None,
        }
    }
}

/// Gameplay collision category of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum SolidKind {
    #[default]
    Free = 0,
    Wall = 1,
    /// Occupied by a boulder, bomb or black hole
    Occupied = 2,
    /// Shovel-breakable
    Lava = 3,
    Switch = 4,
    /// Pickaxe-breakable
    FrozenWall = 5,
    /// Key-openable
    Lock = 6,
    /// Pickaxe-breakable, leaves a boulder behind
    FrozenBoulder = 7,
    /// Hands out a bomb when the player holds one
    Dispenser = 8,
}

impl SolidKind {
    pub fn is_free(self) -> bool {
        self == SolidKind::Free
    }

    /// Whether bumping into this cell can trigger an activation
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            SolidKind::Lava
                | SolidKind::Switch
                | SolidKind::FrozenWall
                | SolidKind::Lock
                | SolidKind::FrozenBoulder
                | SolidKind::Dispenser
        )
    }
}

/// Inventory items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Key,
    Pickaxe,
    Shovel,
    Bomb,
    Gem,
}

/// Entity placement markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Boulder,
    Bomb,
    BlackHole,
    Player,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_decoding() {
        assert_eq!(Tile::from_raw(0), Some(Tile::EMPTY));
        assert_eq!(Tile::from_raw(17), Some(Tile::WALL));
        assert_eq!(Tile::from_raw(20), Some(Tile::LAVA));
        assert_eq!(Tile::from_raw(5), None);
        assert_eq!(Tile::from_raw(16 + 300), None);
        assert_eq!(Tile::LAVA.to_raw(), 20);
    }

    #[test]
    fn test_palette_layout() {
        let switch = Tile::switch(2).unwrap();
        assert_eq!(switch.palette(), Some(2));
        assert!(switch.is_switch());
        assert!(switch.toggled().is_switch());
        assert_ne!(switch.toggled(), switch);

        let closed = Tile::closed_block(2).unwrap();
        let open = Tile::open_block(2).unwrap();
        assert_eq!(closed.toggled(), open);
        assert_eq!(open.toggled(), closed);
        assert_eq!(closed.solid(), SolidKind::Wall);
        assert_eq!(open.solid(), SolidKind::Free);

        // Row 0 has no palette
        assert_eq!(Tile::PLAYER_MARKER.palette(), None);
        assert_eq!(Tile::WALL.toggled(), Tile::WALL);
        assert_eq!(Tile::switch(0), None);
        assert_eq!(Tile::switch(16), None);
    }

    #[test]
    fn test_derived_solids() {
        assert_eq!(Tile::EMPTY.solid(), SolidKind::Free);
        assert_eq!(Tile::BOMB_MARKER.solid(), SolidKind::Occupied);
        assert_eq!(Tile::PLAYER_MARKER.solid(), SolidKind::Free);
        assert_eq!(Tile::GEM.solid(), SolidKind::Free);
        assert_eq!(Tile::DISPENSER.solid(), SolidKind::Dispenser);
        assert!(SolidKind::Lock.is_interactive());
        assert!(!SolidKind::Wall.is_interactive());
        assert!(!SolidKind::Occupied.is_interactive());
    }
}

//! Tilemap assets
//!
//! A stage is authored as a layered grid of raw tile ids. Row 0 of the first
//! layer is a header carrying the starting item counts; the rows below it are
//! the playable grid. Two formats are accepted: JSON (`{"width", "height",
//! "layers"}`) and a plain-text glyph grid whose first line holds the counts.

use std::collections::TryReserveError;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tile::Tile;

/// Fatal stage-initialization failures
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read tilemap {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tilemap JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tilemap has no layers")]
    NoLayers,
    #[error("layer {layer} holds {found} tiles, expected {expected}")]
    LayerSize {
        layer: usize,
        found: usize,
        expected: usize,
    },
    #[error("tilemap is {width}x{height}, too small for a stage")]
    TooSmall { width: u16, height: u16 },
    #[error("unknown raw tile id {raw} at ({x}, {y})")]
    UnknownTile { raw: u16, x: u16, y: u16 },
    #[error("unrecognised glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
    #[error("bad item header {0:?}")]
    Header(String),
    #[error("stage has no player start")]
    MissingPlayer,
    #[error("out of memory allocating stage buffers: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Smallest playable grid: a single interior cell inside the border ring
pub const MIN_GRID_SIDE: u16 = 3;

/// Glyphs of the plain-text stage format
pub const GLYPHS: &[(char, Tile)] = &[
    ('.', Tile::EMPTY),
    ('#', Tile::WALL),
    ('B', Tile::BOULDER_MARKER),
    ('I', Tile::ICE),
    ('~', Tile::LAVA),
    ('F', Tile::FROZEN_BOULDER),
    ('L', Tile::LOCK),
    ('D', Tile::DISPENSER),
    ('k', Tile::KEY),
    ('p', Tile::PICKAXE),
    ('s', Tile::SHOVEL),
    ('b', Tile::BOMB_ITEM),
    ('g', Tile::GEM),
    ('E', Tile::EXIT),
    ('O', Tile::BOMB_MARKER),
    ('@', Tile::BLACK_HOLE_MARKER),
    ('P', Tile::PLAYER_MARKER),
    // Palette 1
    ('1', Tile(17)),
    ('!', Tile(18)),
    ('X', Tile(20)),
    ('x', Tile(23)),
    // Palette 2
    ('2', Tile(33)),
    ('%', Tile(34)),
    ('Y', Tile(36)),
    ('y', Tile(39)),
];

/// Tile for a text glyph
pub fn glyph_tile(glyph: char) -> Option<Tile> {
    GLYPHS.iter().find(|(g, _)| *g == glyph).map(|(_, t)| *t)
}

/// Text glyph for a tile, `?` if it has none
pub fn tile_glyph(tile: Tile) -> char {
    GLYPHS
        .iter()
        .find(|(_, t)| *t == tile)
        .map(|(g, _)| *g)
        .unwrap_or('?')
}

/// A loaded tilemap asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tilemap {
    pub width: u16,
    pub height: u16,
    /// Row-major raw ids, one `width * height` vector per layer
    pub layers: Vec<Vec<u16>>,
}

impl Tilemap {
    /// Build and validate a tilemap from raw layers
    pub fn new(width: u16, height: u16, layers: Vec<Vec<u16>>) -> Result<Self, LoadError> {
        let map = Self {
            width,
            height,
            layers,
        };
        map.validate()?;
        Ok(map)
    }

    /// Load from a file, picking the format by extension (`.json` or text)
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents)?,
            _ => Self::from_text(&contents)?,
        };
        log::info!(
            "Loaded tilemap {} ({}x{})",
            path.display(),
            map.width,
            map.height
        );
        Ok(map)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let map: Tilemap = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Parse the plain-text format. Short rows are padded with empty cells.
    pub fn from_text(text: &str) -> Result<Self, LoadError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().ok_or(LoadError::NoLayers)?;
        let counts = header
            .split_whitespace()
            .map(|n| n.parse::<u16>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| LoadError::Header(header.to_string()))?;
        if counts.len() > 3 {
            return Err(LoadError::Header(header.to_string()));
        }

        let rows: Vec<Vec<char>> = lines.map(|l| l.trim_end().chars().collect()).collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let width = u16::try_from(width).map_err(|_| LoadError::Header(header.to_string()))?;
        let height = u16::try_from(rows.len() + 1).map_err(|_| LoadError::NoLayers)?;

        let mut layer = vec![0u16; width as usize * height as usize];
        for (i, count) in counts.iter().enumerate() {
            if let Some(slot) = layer.get_mut(i) {
                *slot = *count;
            }
        }
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.iter().enumerate() {
                let tile = glyph_tile(*glyph).ok_or(LoadError::UnknownGlyph {
                    glyph: *glyph,
                    x,
                    y,
                })?;
                let raw = if tile == Tile::EMPTY { 0 } else { tile.to_raw() };
                layer[(y + 1) * width as usize + x] = raw;
            }
        }

        Self::new(width, height, vec![layer])
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.layers.is_empty() {
            return Err(LoadError::NoLayers);
        }
        if self.width < MIN_GRID_SIDE || self.height < MIN_GRID_SIDE + 1 {
            return Err(LoadError::TooSmall {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize;
        for (layer, data) in self.layers.iter().enumerate() {
            if data.len() != expected {
                return Err(LoadError::LayerSize {
                    layer,
                    found: data.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Raw id at (x, y) of a layer, 0 when out of range
    pub fn get(&self, layer: usize, x: u16, y: u16) -> u16 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.layers
            .get(layer)
            .and_then(|l| l.get(y as usize * self.width as usize + x as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Starting (pickaxe, shovel, bomb) counts from the header row
    pub fn item_header(&self) -> (u8, u8, u8) {
        let count = |x| self.get(0, x, 0).min(u8::MAX as u16) as u8;
        (count(0), count(1), count(2))
    }

    /// Grid dimensions below the header row
    pub fn grid_size(&self) -> (u16, u16) {
        (self.width, self.height - 1)
    }

    /// Decode the playable grid into tiles, row-major
    pub fn decode_grid(&self) -> Result<Vec<Tile>, LoadError> {
        let (width, height) = self.grid_size();
        let mut tiles = Vec::new();
        tiles.try_reserve_exact(width as usize * height as usize)?;
        for y in 0..height {
            for x in 0..width {
                let raw = self.get(0, x, y + 1);
                let tile = Tile::from_raw(raw).ok_or(LoadError::UnknownTile { raw, x, y })?;
                tiles.push(tile);
            }
        }
        Ok(tiles)
    }
}

/// Tile identifiers, tile grids and tilesets.
///
/// Tile ids are "global": each tileset owns the range
/// `first_gid .. first_gid + tile_count`, and ranges never overlap.
/// Id 0 means an empty cell.

use std::path::PathBuf;

use super::geometry::Rect;

pub type TileId = u32;

pub const EMPTY_TILE: TileId = 0;

/// Fixed-size grid of tile ids in a single row-major buffer (`y * width + x`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileId>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        TileGrid { width, height, cells: vec![EMPTY_TILE; width * height] }
    }

    /// Build from row-major cells. Returns None if the length does not match.
    pub fn from_cells(width: usize, height: usize, cells: Vec<TileId>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        Some(TileGrid { width, height, cells })
    }

    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    /// Tile at (x, y), or None outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<TileId> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, id: TileId) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = id;
        }
    }

    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.cells.iter().copied()
    }
}

/// One source image cut into equally sized tiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Tileset {
    pub name: String,
    #[allow(dead_code)]
    pub image: Option<PathBuf>,
    pub first_gid: TileId,
    /// Source image size in pixels.
    pub image_width: i32,
    pub image_height: i32,
    pub tile_width: i32,
    pub tile_height: i32,
    /// Colour key treated as transparent by image renderers.
    #[allow(dead_code)]
    pub alpha: u32,
}

impl Tileset {
    /// Tiles per image row.
    #[inline]
    pub fn columns(&self) -> u32 {
        (self.image_width / self.tile_width).max(0) as u32
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        (self.image_height / self.tile_height).max(0) as u32
    }

    /// Saturates on absurd image sizes; the loader rejects those ranges.
    pub fn tile_count(&self) -> u32 {
        self.columns().saturating_mul(self.rows())
    }

    /// Does this tileset's id range contain `gid`?
    pub fn contains(&self, gid: TileId) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tile_count()
    }

    /// (column, row) of `gid` within the source image.
    pub fn tile_coords(&self, gid: TileId) -> (u32, u32) {
        let columns = self.columns().max(1);
        let local = gid - self.first_gid;
        (local % columns, local / columns)
    }

    /// Source-image pixel rectangle of `gid`.
    pub fn source_rect(&self, gid: TileId) -> Rect {
        let (col, row) = self.tile_coords(gid);
        Rect::new(
            col as i32 * self.tile_width,
            row as i32 * self.tile_height,
            self.tile_width,
            self.tile_height,
        )
    }

    /// Clip for the `index`-th cell counted from the top-left.
    /// Used for character sheets, where indices are not global ids.
    pub fn clip(&self, index: u32) -> Rect {
        self.source_rect(self.first_gid + index)
    }
}

/// The tile world of one level: four layers, the tileset registry and the
/// solid-id set.
///
/// Layers, back to front:
///   background, background2:  terrain; solidity is read from these
///   (entities)
///   overlay, overlay2:        drawn over entities, never solid
///
/// A Level is built once by the loader and replaced wholesale on level
/// change. Nothing patches it in place during play.

use std::collections::HashSet;
use std::path::PathBuf;

use super::geometry::Rect;
use super::tile::{TileGrid, TileId, Tileset, EMPTY_TILE};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Layer {
    Background,
    Background2,
    Overlay,
    Overlay2,
}

impl Layer {
    /// Key used for this layer in level files.
    pub fn name(self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::Background2 => "background2",
            Layer::Overlay => "overlay",
            Layer::Overlay2 => "overlay2",
        }
    }
}

/// Inclusive rectangle of tile indices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileRect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl TileRect {
    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.y0..=self.y1
    }
}

#[derive(Clone, Debug)]
pub struct Level {
    pub name: String,
    /// Grid size in tiles.
    pub width: usize,
    pub height: usize,
    /// Tile size in pixels.
    pub tile_width: i32,
    pub tile_height: i32,
    background: TileGrid,
    background2: TileGrid,
    overlay: TileGrid,
    overlay2: TileGrid,
    /// Sorted by `first_gid`.
    tilesets: Vec<Tileset>,
    solid: HashSet<TileId>,
    pub parallax: Option<PathBuf>,
}

impl Level {
    /// Empty level; every layer is all-empty.
    pub fn new(name: &str, width: usize, height: usize, tile_width: i32, tile_height: i32) -> Self {
        Level {
            name: name.to_string(),
            width,
            height,
            tile_width,
            tile_height,
            background: TileGrid::new(width, height),
            background2: TileGrid::new(width, height),
            overlay: TileGrid::new(width, height),
            overlay2: TileGrid::new(width, height),
            tilesets: vec![],
            solid: HashSet::new(),
            parallax: None,
        }
    }

    /// Level size in pixels.
    pub fn pixel_size(&self) -> (i32, i32) {
        (self.width as i32 * self.tile_width, self.height as i32 * self.tile_height)
    }

    // ── Layers ──

    pub fn layer(&self, layer: Layer) -> &TileGrid {
        match layer {
            Layer::Background => &self.background,
            Layer::Background2 => &self.background2,
            Layer::Overlay => &self.overlay,
            Layer::Overlay2 => &self.overlay2,
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut TileGrid {
        match layer {
            Layer::Background => &mut self.background,
            Layer::Background2 => &mut self.background2,
            Layer::Overlay => &mut self.overlay,
            Layer::Overlay2 => &mut self.overlay2,
        }
    }

    /// Replace a whole layer. Returns false (and keeps the old one) on a shape mismatch.
    pub fn set_layer(&mut self, layer: Layer, grid: TileGrid) -> bool {
        if grid.width() != self.width || grid.height() != self.height {
            return false;
        }
        *self.layer_mut(layer) = grid;
        true
    }

    // ── Tilesets ──

    pub fn add_tileset(&mut self, tileset: Tileset) {
        self.tilesets.push(tileset);
        self.tilesets.sort_by_key(|t| t.first_gid);
    }

    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// The tileset whose id range contains `gid`.
    pub fn tileset_for(&self, gid: TileId) -> Option<&Tileset> {
        if gid == EMPTY_TILE {
            return None;
        }
        self.tilesets.iter().find(|t| t.contains(gid))
    }

    // ── Solidity ──

    pub fn mark_solid(&mut self, gid: TileId) {
        self.solid.insert(gid);
    }

    /// Raw id membership, independent of layer or tileset.
    #[inline]
    pub fn is_solid_id(&self, gid: TileId) -> bool {
        self.solid.contains(&gid)
    }

    /// Is the cell solid in either background layer? Off-map cells are not.
    pub fn is_solid_cell(&self, x: usize, y: usize) -> bool {
        let solid_in = |grid: &TileGrid| grid.get(x, y).map_or(false, |id| self.is_solid_id(id));
        solid_in(&self.background) || solid_in(&self.background2)
    }

    /// Pixel rectangle of a run of `span` tiles starting at (x, y).
    pub fn tile_rect(&self, x: usize, y: usize, span: usize) -> Rect {
        Rect::new(
            x as i32 * self.tile_width,
            y as i32 * self.tile_height,
            span as i32 * self.tile_width,
            self.tile_height,
        )
    }

    /// Tiles a pixel rectangle can touch, with one tile of slack on the far
    /// edges, clamped to the grid.
    pub fn tile_range_overlap(&self, rect: &Rect) -> TileRect {
        let max_x = self.width.saturating_sub(1) as i32;
        let max_y = self.height.saturating_sub(1) as i32;
        let clamp_x = |v: i32| v.clamp(0, max_x) as usize;
        let clamp_y = |v: i32| v.clamp(0, max_y) as usize;

        TileRect {
            x0: clamp_x(rect.left().div_euclid(self.tile_width)),
            y0: clamp_y(rect.top().div_euclid(self.tile_height)),
            x1: clamp_x(rect.right().div_euclid(self.tile_width) + 1),
            y1: clamp_y(rect.bottom().div_euclid(self.tile_height) + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(w: usize, h: usize) -> Level {
        let mut lv = Level::new("test", w, h, 32, 32);
        lv.add_tileset(Tileset {
            name: "terrain".into(),
            image: None,
            first_gid: 1,
            image_width: 128,
            image_height: 128,
            tile_width: 32,
            tile_height: 32,
            alpha: 0,
        });
        lv.add_tileset(Tileset {
            name: "props".into(),
            image: None,
            first_gid: 17,
            image_width: 64,
            image_height: 32,
            tile_width: 32,
            tile_height: 32,
            alpha: 0,
        });
        lv
    }

    // ── tile_range_overlap ──

    #[test]
    fn range_adds_far_slack() {
        let lv = level(10, 10);
        let r = lv.tile_range_overlap(&Rect::new(40, 70, 20, 20));
        assert_eq!(r, TileRect { x0: 1, y0: 2, x1: 2, y1: 3 });
    }

    #[test]
    fn range_clamps_to_grid() {
        let lv = level(4, 3);
        let r = lv.tile_range_overlap(&Rect::new(-50, -50, 500, 500));
        assert_eq!(r, TileRect { x0: 0, y0: 0, x1: 3, y1: 2 });
    }

    #[test]
    fn range_always_inside_grid() {
        let lv = level(5, 4);
        for x in (-100..300).step_by(17) {
            for y in (-100..300).step_by(23) {
                for (w, h) in [(1, 1), (26, 26), (32, 32), (70, 10)] {
                    let r = lv.tile_range_overlap(&Rect::new(x, y, w, h));
                    assert!(r.x0 <= r.x1 && r.x1 < lv.width, "{x},{y} -> {r:?}");
                    assert!(r.y0 <= r.y1 && r.y1 < lv.height, "{x},{y} -> {r:?}");
                }
            }
        }
    }

    // ── solidity ──

    #[test]
    fn solidity_reads_both_background_layers() {
        let mut lv = level(3, 1);
        lv.mark_solid(2);
        lv.layer_mut(Layer::Background).set(0, 0, 2);
        lv.layer_mut(Layer::Background).set(1, 0, 1);
        lv.layer_mut(Layer::Background2).set(1, 0, 2);
        lv.layer_mut(Layer::Overlay).set(2, 0, 2);
        assert!(lv.is_solid_cell(0, 0));
        assert!(lv.is_solid_cell(1, 0));
        // Overlay layers never block
        assert!(!lv.is_solid_cell(2, 0));
        assert!(!lv.is_solid_cell(3, 0));
    }

    #[test]
    fn solid_id_is_layer_independent() {
        let mut lv = level(2, 1);
        lv.mark_solid(18);
        assert!(lv.is_solid_id(18));
        assert!(!lv.is_solid_id(2));
    }

    // ── tilesets ──

    #[test]
    fn tileset_lookup_by_range() {
        let lv = level(1, 1);
        assert_eq!(lv.tileset_for(0), None);
        assert_eq!(lv.tileset_for(1).map(|t| t.name.as_str()), Some("terrain"));
        assert_eq!(lv.tileset_for(16).map(|t| t.name.as_str()), Some("terrain"));
        assert_eq!(lv.tileset_for(17).map(|t| t.name.as_str()), Some("props"));
        assert_eq!(lv.tileset_for(19), None);
    }

    #[test]
    fn set_layer_checks_shape() {
        let mut lv = level(2, 2);
        assert!(!lv.set_layer(Layer::Overlay, TileGrid::new(3, 2)));
        assert!(lv.set_layer(Layer::Overlay, TileGrid::from_cells(2, 2, vec![1, 0, 0, 1]).unwrap()));
        assert_eq!(lv.layer(Layer::Overlay).get(1, 1), Some(1));
    }

    #[test]
    fn pixel_size() {
        assert_eq!(level(20, 15).pixel_size(), (640, 480));
    }
}

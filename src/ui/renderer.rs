/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The camera viewport is sampled at one terminal cell per 8x16 world
/// pixels. Back to front: parallax pattern, background, background2,
/// entities in draw order, overlay, overlay2, debug boxes.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Entity, Facing};
use crate::domain::geometry::Rect;
use crate::domain::map::Layer;
use crate::domain::tile::{TileId, EMPTY_TILE};
use crate::sim::world::{Phase, World};

/// World pixels covered by one terminal cell.
const PX_PER_COL: i32 = 8;
const PX_PER_ROW: i32 = 16;

/// Vertical layout
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background; never the terminal default.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &World) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        compose(&mut self.front, world);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Compose: build front buffer content
// ══════════════════════════════════════════════════════════════

const HUD_FG: Color = Color::Rgb { r: 230, g: 220, b: 160 };
const DIM_FG: Color = Color::Rgb { r: 110, g: 110, b: 140 };
const GROUND_BG: Color = Color::Rgb { r: 24, g: 44, b: 28 };
const BOX_BG: Color = Color::Rgb { r: 130, g: 30, b: 30 };
const EXIT_BG: Color = Color::Rgb { r: 30, g: 50, b: 130 };

fn compose(buf: &mut FrameBuffer, w: &World) {
    buf.clear();

    let cols = ((w.camera.view.w / PX_PER_COL).max(0) as usize).min(buf.width);
    let rows = ((w.camera.view.h / PX_PER_ROW).max(0) as usize)
        .min(buf.height.saturating_sub(MAP_ROW + 2));

    compose_hud(buf, w);
    for row in 0..rows {
        for col in 0..cols {
            buf.set(col, MAP_ROW + row, compose_cell(w, col, row));
        }
    }

    let msg_row = MAP_ROW + rows;
    if !w.message.is_empty() {
        buf.put_str(1, msg_row, &w.message, HUD_FG, Cell::BASE_BG);
    }
    buf.put_str(
        1,
        msg_row + 1,
        "arrows/WASD move  Space pause  Enter respawn  c boxes  Esc quit",
        DIM_FG,
        Cell::BASE_BG,
    );

    if w.phase == Phase::Paused {
        compose_pause_overlay(buf, cols, rows);
    }
}

fn compose_hud(buf: &mut FrameBuffer, w: &World) {
    let mut hud = match w.player() {
        Some(p) => format!(
            " {}   x:{:>6.1} y:{:>6.1}   tick {}",
            w.level.name,
            p.pos().x,
            p.pos().y,
            w.tick
        ),
        None => format!(" {}   tick {}", w.level.name, w.tick),
    };
    if w.show_collision_boxes {
        if let Some(p) = w.player() {
            let clip = p.sprite_clip(w.characters.tile_width, w.characters.tile_height);
            let b = p.collision_box();
            hud.push_str(&format!(
                "   box {},{} {}x{}   clip {},{}",
                b.x, b.y, b.w, b.h, clip.x, clip.y
            ));
        }
    }
    buf.put_str(0, HUD_ROW, &hud, HUD_FG, Cell::BASE_BG);
}

fn compose_pause_overlay(buf: &mut FrameBuffer, cols: usize, rows: usize) {
    let text = "  PAUSED  ";
    let x = cols.saturating_sub(text.len()) / 2;
    let y = MAP_ROW + rows / 2;
    buf.put_str(x, y, text, Color::Black, HUD_FG);
}

/// One viewport cell, sampled at the centre of its pixel block.
fn compose_cell(w: &World, col: usize, row: usize) -> Cell {
    let vx = col as i32 * PX_PER_COL + PX_PER_COL / 2;
    let vy = row as i32 * PX_PER_ROW + PX_PER_ROW / 2;
    let (wx, wy) = (w.camera.view.x + vx, w.camera.view.y + vy);

    let (lw, lh) = w.level.pixel_size();
    let inside = wx >= 0 && wy >= 0 && wx < lw && wy < lh;
    let tile = if inside {
        Some(((wx / w.level.tile_width) as usize, (wy / w.level.tile_height) as usize))
    } else {
        None
    };

    let mut cell = tile
        .and_then(|(tx, ty)| terrain_cell(w, tx, ty))
        .unwrap_or_else(|| parallax_cell(w, vx, vy));

    for &i in &w.draw_order {
        if let Some(ch) = w.entities.get(i).and_then(|e| entity_glyph(e, wx, wy)) {
            cell.ch = ch;
            cell.fg = if w.entities[i].is_controlled() { Color::Yellow } else { Color::Cyan };
        }
    }

    if let Some((tx, ty)) = tile {
        for layer in [Layer::Overlay, Layer::Overlay2] {
            if let Some(id) = w.level.layer(layer).get(tx, ty).filter(|&id| id != EMPTY_TILE) {
                cell.ch = '%';
                cell.fg = foliage(tile_variant(w, id).1);
            }
        }
    }

    if w.show_collision_boxes {
        if w.entities.iter().any(|e| contains(&e.collision_box(), wx, wy)) {
            cell.bg = BOX_BG;
        } else if w.exit.map_or(false, |r| contains(&r, wx, wy)) {
            cell.bg = EXIT_BG;
        }
    }

    cell
}

/// Column and row of `id` on its tileset image. Ids no tileset owns
/// (hand-built levels) map to column `id` of row 0.
fn tile_variant(w: &World, id: TileId) -> (u32, u32) {
    match w.level.tileset_for(id) {
        Some(tileset) => tileset.tile_coords(id),
        None => (id, 0),
    }
}

/// Topmost non-empty background tile, if any. The glyph follows the
/// tile's column on its tileset and the tint follows its row.
fn terrain_cell(w: &World, tx: usize, ty: usize) -> Option<Cell> {
    const SOLID: [char; 3] = ['█', '▓', '▒'];
    const GROUND: [char; 4] = ['.', ',', '\'', '`'];

    let id = [Layer::Background2, Layer::Background]
        .into_iter()
        .filter_map(|l| w.level.layer(l).get(tx, ty))
        .find(|&id| id != EMPTY_TILE)?;
    let (col, row) = tile_variant(w, id);

    if w.level.is_solid_cell(tx, ty) {
        let ch = SOLID[col as usize % SOLID.len()];
        Some(Cell::new(ch, stone(row), Cell::BASE_BG))
    } else {
        // Scatter by position so large fields of one tile don't stripe
        let ch = GROUND[(col as usize + tx * 7 + ty * 3) % GROUND.len()];
        Some(Cell::new(ch, foliage(row), GROUND_BG))
    }
}

/// Background pattern scrolling at half camera speed.
fn parallax_cell(w: &World, vx: i32, vy: i32) -> Cell {
    let off = w.camera.parallax_offset();
    let bx = (vx - off.x as i32).div_euclid(PX_PER_COL);
    let by = (vy - off.y as i32).div_euclid(PX_PER_ROW);
    if (bx * 5 + by * 11).rem_euclid(23) == 0 {
        Cell::new('·', DIM_FG, Cell::BASE_BG)
    } else {
        Cell::BLANK
    }
}

/// Glyph for the part of `e`'s sprite covering (wx, wy): head on the
/// upper half, facing on the lower half.
fn entity_glyph(e: &Entity, wx: i32, wy: i32) -> Option<char> {
    let pos = e.pos();
    let sprite = Rect::new(pos.x.floor() as i32, pos.y.floor() as i32, e.sprite.w, e.sprite.h);
    if !contains(&sprite, wx, wy) {
        return None;
    }
    if wy < sprite.y + sprite.h / 2 {
        return Some(if e.is_controlled() { '@' } else { 'o' });
    }
    let ch = match e.anim.facing {
        Facing::Down => 'v',
        Facing::Up => '^',
        Facing::Left => '<',
        Facing::Right => '>',
        Facing::UpLeft | Facing::DownRight => '\\',
        Facing::UpRight | Facing::DownLeft => '/',
    };
    // Mid-stride frames show legs apart
    Some(if e.anim.display_frame() == 1 { ch } else { 'A' })
}

#[inline]
fn contains(r: &Rect, x: i32, y: i32) -> bool {
    x >= r.left() && x < r.right() && y >= r.top() && y < r.bottom()
}

/// Grey for a tileset row.
fn stone(row: u32) -> Color {
    let v = 120 + (row.wrapping_mul(37) % 60) as u8;
    Color::Rgb { r: v, g: v - 10, b: v - 25 }
}

fn foliage(row: u32) -> Color {
    let g = 140 + (row.wrapping_mul(53) % 80) as u8;
    Color::Rgb { r: 60, g, b: 70 }
}

/// Level loader: TOML level files → `Level` plus spawn data.
///
/// ## File layout
///   ```toml
///   name = "Meadow"
///   width = 30                    # tiles
///   height = 20
///   tile_width = 32               # pixels
///   tile_height = 32
///   spawn = { x = 64.0, y = 64.0 }
///   parallax = "sky.png"          # optional, metadata only
///   next = "grove.toml"           # optional, relative to this file
///   exit = { x = 928, y = 64, w = 32, h = 64 }
///
///   [[tileset]]
///   name = "terrain"
///   image = "terrain.png"         # optional; must exist when given
///   first_gid = 1
///   image_width = 256
///   image_height = 256
///   tile_width = 32
///   tile_height = 32
///   solid = [0, 3]                # ids relative to first_gid
///
///   [player]                      # optional
///   hitbox = { x = 0, y = 27, w = 26, h = 26 }
///
///   [[actor]]                     # scenery, any number
///   x = 300.0
///   y = 220.0
///   sprite = 1
///
///   [layers]
///   background = ["1 1 1 ...", ...]   # required, one string per row
///   background2 = [...]               # optional layers default to empty
///   overlay = [...]
///   overlay2 = [...]
///   ```
///
/// Row tokens are global tile ids separated by commas and/or whitespace.
/// Loading is all-or-nothing: any problem is a `LevelError`.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::entity::Hitbox;
use crate::domain::geometry::Rect;
use crate::domain::map::{Layer, Level};
use crate::domain::tile::{TileGrid, TileId, Tileset, EMPTY_TILE};

/// Collision box used when a level file does not give one.
pub const DEFAULT_HITBOX: Hitbox = Hitbox::new(0, 27, 26, 26);

/// Sheet slot used for `[[actor]]` entries without a `sprite`.
const DEFAULT_ACTOR_SPRITE: u32 = 1;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read level {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("level must be non-empty ({width}x{height} tiles of {tile_width}x{tile_height} px)")]
    Dimensions {
        width: usize,
        height: usize,
        tile_width: i32,
        tile_height: i32,
    },
    #[error("layer `{layer}` has {found} rows, expected {expected}")]
    RowCount {
        layer: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("layer `{layer}` row {row} has {found} tiles, expected {expected}")]
    RowLength {
        layer: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("layer `{layer}` row {row}: `{token}` is not a tile id")]
    BadToken {
        layer: &'static str,
        row: usize,
        token: String,
    },
    #[error("layer `{layer}` at ({x}, {y}): tile id {gid} belongs to no tileset")]
    UnknownTile {
        layer: &'static str,
        x: usize,
        y: usize,
        gid: TileId,
    },
    #[error("tileset `{name}`: {reason}")]
    BadTileset { name: String, reason: &'static str },
    #[error("tilesets `{first}` and `{second}` share tile ids")]
    OverlappingTilesets { first: String, second: String },
    #[error("tileset `{tileset}` image not found: {}", .path.display())]
    MissingImage { tileset: String, path: PathBuf },
    #[error("tileset `{tileset}` marks tile {id} solid but has only {count} tiles")]
    SolidOutOfRange { tileset: String, id: u32, count: u32 },
}

/// An entity placement read from the level file.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSpawn {
    pub pos: Vec2,
    /// Character sheet slot.
    pub sprite: u32,
    pub hitbox: Hitbox,
}

/// Everything needed to (re)build the world for one level.
#[derive(Clone, Debug)]
pub struct LevelData {
    pub level: Level,
    pub spawn: Vec2,
    /// Sheet slot override for the controlled entity.
    pub player_sprite: Option<u32>,
    pub player_hitbox: Hitbox,
    pub actors: Vec<ActorSpawn>,
    pub exit: Option<Rect>,
    pub next: Option<PathBuf>,
}

impl LevelData {
    /// Level with a spawn point and nothing else.
    pub fn new(level: Level, spawn: Vec2) -> Self {
        LevelData {
            level,
            spawn,
            player_sprite: None,
            player_hitbox: DEFAULT_HITBOX,
            actors: vec![],
            exit: None,
            next: None,
        }
    }
}

// ── TOML schema ──

#[derive(Deserialize, Debug)]
struct LevelFile {
    #[serde(default)]
    name: String,
    width: usize,
    height: usize,
    tile_width: i32,
    tile_height: i32,
    spawn: PointDef,
    #[serde(default)]
    parallax: Option<String>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    exit: Option<RectDef>,
    #[serde(default, rename = "tileset")]
    tilesets: Vec<TilesetDef>,
    #[serde(default)]
    player: PlayerDef,
    #[serde(default, rename = "actor")]
    actors: Vec<ActorDef>,
    layers: LayersDef,
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct PointDef {
    x: f32,
    y: f32,
}

#[derive(Deserialize, Debug, Clone, Copy)]
struct RectDef {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl From<RectDef> for Rect {
    fn from(r: RectDef) -> Self {
        Rect::new(r.x, r.y, r.w, r.h)
    }
}

impl From<RectDef> for Hitbox {
    fn from(r: RectDef) -> Self {
        Hitbox::new(r.x, r.y, r.w, r.h)
    }
}

#[derive(Deserialize, Debug)]
struct TilesetDef {
    name: String,
    #[serde(default)]
    image: Option<String>,
    first_gid: TileId,
    image_width: i32,
    image_height: i32,
    tile_width: i32,
    tile_height: i32,
    #[serde(default)]
    alpha: u32,
    #[serde(default)]
    solid: Vec<u32>,
}

#[derive(Deserialize, Debug, Default)]
struct PlayerDef {
    #[serde(default)]
    sprite: Option<u32>,
    #[serde(default)]
    hitbox: Option<RectDef>,
}

#[derive(Deserialize, Debug)]
struct ActorDef {
    x: f32,
    y: f32,
    #[serde(default = "default_actor_sprite")]
    sprite: u32,
    #[serde(default)]
    hitbox: Option<RectDef>,
}

fn default_actor_sprite() -> u32 { DEFAULT_ACTOR_SPRITE }

#[derive(Deserialize, Debug)]
struct LayersDef {
    #[serde(default)]
    background: Vec<String>,
    #[serde(default)]
    background2: Vec<String>,
    #[serde(default)]
    overlay: Vec<String>,
    #[serde(default)]
    overlay2: Vec<String>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read and build the level at `path`.
pub fn load_level(path: &Path) -> Result<LevelData, LevelError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
    let data = parse_level(&text, path)?;
    log::info!(
        "loaded level `{}` ({}x{} tiles, {} actors) from {}",
        data.level.name,
        data.level.width,
        data.level.height,
        data.actors.len(),
        path.display()
    );
    Ok(data)
}

/// Build a level from file contents. `path` names the file for error
/// messages and anchors relative image and `next` paths.
pub fn parse_level(text: &str, path: &Path) -> Result<LevelData, LevelError> {
    let file: LevelFile = toml::from_str(text)
        .map_err(|source| LevelError::Parse { path: path.to_path_buf(), source })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    build(file, base)
}

// ══════════════════════════════════════════════════════════════
// Building
// ══════════════════════════════════════════════════════════════

fn build(file: LevelFile, base: &Path) -> Result<LevelData, LevelError> {
    let LevelFile {
        name, width, height, tile_width, tile_height, spawn,
        parallax, next, exit, tilesets, player, actors, layers,
    } = file;

    let dimensions = LevelError::Dimensions { width, height, tile_width, tile_height };
    if width == 0 || height == 0 || tile_width <= 0 || tile_height <= 0 {
        return Err(dimensions);
    }
    // Pixel extents must fit the i32 rect space
    let fits = |tiles: usize, px: i32| {
        i32::try_from(tiles).ok().and_then(|t| t.checked_mul(px)).is_some()
    };
    if width.checked_mul(height).is_none() || !fits(width, tile_width) || !fits(height, tile_height) {
        return Err(dimensions);
    }

    let rows = [
        (Layer::Background, layers.background),
        (Layer::Background2, layers.background2),
        (Layer::Overlay, layers.overlay),
        (Layer::Overlay2, layers.overlay2),
    ];
    // Shapes first: grids are only allocated once the text backs every cell
    for (layer, rows) in &rows {
        if !rows.is_empty() || *layer == Layer::Background {
            check_shape(*layer, rows, width, height)?;
        }
    }

    let name = if name.is_empty() { "untitled".to_string() } else { name };
    let mut level = Level::new(&name, width, height, tile_width, tile_height);
    level.parallax = parallax.map(|p| base.join(p));

    for def in tilesets {
        let (tileset, solid) = build_tileset(def, base)?;
        for id in solid {
            level.mark_solid(id);
        }
        level.add_tileset(tileset);
    }
    check_overlaps(level.tilesets())?;

    for (layer, rows) in rows {
        if rows.is_empty() && layer != Layer::Background {
            continue;
        }
        let grid = parse_layer(layer, &rows, &level)?;
        let installed = level.set_layer(layer, grid);
        debug_assert!(installed);
    }

    let player_hitbox = player.hitbox.map(Hitbox::from).unwrap_or(DEFAULT_HITBOX);
    check_hitbox(&level, "player", player_hitbox);

    let actors = actors
        .into_iter()
        .enumerate()
        .map(|(i, a)| {
            let hitbox = a.hitbox.map(Hitbox::from).unwrap_or(DEFAULT_HITBOX);
            check_hitbox(&level, &format!("actor {i}"), hitbox);
            ActorSpawn { pos: Vec2::new(a.x, a.y), sprite: a.sprite, hitbox }
        })
        .collect();

    let next = next.map(|n| base.join(n));
    if exit.is_some() && next.is_none() {
        log::warn!("level `{name}` has an exit but no next level; the exit is inert");
    }

    Ok(LevelData {
        level,
        spawn: Vec2::new(spawn.x, spawn.y),
        player_sprite: player.sprite,
        player_hitbox,
        actors,
        exit: exit.map(Rect::from),
        next,
    })
}

/// Validated tileset plus its solid ids converted to global ids.
fn build_tileset(def: TilesetDef, base: &Path) -> Result<(Tileset, Vec<TileId>), LevelError> {
    let bad = |reason| LevelError::BadTileset { name: def.name.clone(), reason };
    if def.tile_width <= 0 || def.tile_height <= 0 {
        return Err(bad("tile size must be non-zero"));
    }
    if def.first_gid == EMPTY_TILE {
        return Err(bad("first_gid must be at least 1"));
    }

    let image = match &def.image {
        Some(rel) => {
            let path = base.join(rel);
            if !path.is_file() {
                return Err(LevelError::MissingImage { tileset: def.name.clone(), path });
            }
            Some(path)
        }
        None => None,
    };

    let tileset = Tileset {
        name: def.name.clone(),
        image,
        first_gid: def.first_gid,
        image_width: def.image_width,
        image_height: def.image_height,
        tile_width: def.tile_width,
        tile_height: def.tile_height,
        alpha: def.alpha,
    };

    let count = tileset.tile_count();
    if tileset.first_gid.checked_add(count).is_none() {
        return Err(LevelError::BadTileset { name: def.name, reason: "id range exceeds u32" });
    }
    let mut solid = Vec::with_capacity(def.solid.len());
    for id in def.solid {
        if id >= count {
            return Err(LevelError::SolidOutOfRange { tileset: def.name, id, count });
        }
        solid.push(tileset.first_gid + id);
    }
    Ok((tileset, solid))
}

/// `tilesets` is sorted by `first_gid`, so neighbours are enough.
fn check_overlaps(tilesets: &[Tileset]) -> Result<(), LevelError> {
    for pair in tilesets.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.first_gid + a.tile_count() > b.first_gid {
            return Err(LevelError::OverlappingTilesets {
                first: a.name.clone(),
                second: b.name.clone(),
            });
        }
    }
    Ok(())
}

fn tokens(row: &str) -> impl Iterator<Item = &str> {
    row.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty())
}

/// Row count and row lengths, checked without allocating a grid.
fn check_shape(layer: Layer, rows: &[String], width: usize, height: usize) -> Result<(), LevelError> {
    let name = layer.name();
    if rows.len() != height {
        return Err(LevelError::RowCount { layer: name, expected: height, found: rows.len() });
    }
    for (y, row) in rows.iter().enumerate() {
        let found = tokens(row).count();
        if found != width {
            return Err(LevelError::RowLength { layer: name, row: y, expected: width, found });
        }
    }
    Ok(())
}

fn parse_layer(layer: Layer, rows: &[String], level: &Level) -> Result<TileGrid, LevelError> {
    let name = layer.name();
    check_shape(layer, rows, level.width, level.height)?;

    let mut cells = Vec::with_capacity(level.width * level.height);
    for (y, row) in rows.iter().enumerate() {
        let start = cells.len();
        for token in tokens(row) {
            let gid: TileId = token.parse().map_err(|_| LevelError::BadToken {
                layer: name,
                row: y,
                token: token.to_string(),
            })?;
            if gid != EMPTY_TILE && level.tileset_for(gid).is_none() {
                return Err(LevelError::UnknownTile { layer: name, x: cells.len() - start, y, gid });
            }
            cells.push(gid);
        }
    }

    TileGrid::from_cells(level.width, level.height, cells).ok_or(LevelError::RowCount {
        layer: name,
        expected: level.height,
        found: rows.len(),
    })
}

/// The tile scan only looks two columns wide.
fn check_hitbox(level: &Level, who: &str, hitbox: Hitbox) {
    if hitbox.w > level.tile_width {
        log::warn!(
            "{who} collision box is {} px wide, wider than a {} px tile; tile collisions may be missed",
            hitbox.w,
            level.tile_width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI: &str = r#"
name = "mini"
width = 4
height = 3
tile_width = 32
tile_height = 32
spawn = { x = 40.0, y = 8.0 }

[[tileset]]
name = "terrain"
first_gid = 1
image_width = 128
image_height = 64
tile_width = 32
tile_height = 32
solid = [1]

[layers]
background = [
    "2 2 2 2",
    "2,1,1,2",
    "2 2 2 2",
]
overlay = ["0 0 0 0", "0 0 8 0", "0 0 0 0"]
"#;

    fn parse(text: &str) -> Result<LevelData, LevelError> {
        parse_level(text, Path::new("levels/mini.toml"))
    }

    #[test]
    fn parses_minimal_level() {
        let data = parse(MINI).unwrap();
        let lv = &data.level;
        assert_eq!(lv.name, "mini");
        assert_eq!((lv.width, lv.height), (4, 3));
        assert_eq!(lv.pixel_size(), (128, 96));
        assert_eq!(data.spawn, Vec2::new(40.0, 8.0));
        assert_eq!(data.player_hitbox, DEFAULT_HITBOX);
        assert!(data.actors.is_empty());
        assert_eq!(data.exit, None);
        assert_eq!(data.next, None);
    }

    #[test]
    fn solid_ids_become_global() {
        let lv = parse(MINI).unwrap().level;
        assert!(lv.is_solid_id(2));
        assert!(!lv.is_solid_id(1));
        assert!(lv.is_solid_cell(0, 0));
        assert!(!lv.is_solid_cell(1, 1));
    }

    #[test]
    fn missing_layers_are_empty() {
        let lv = parse(MINI).unwrap().level;
        assert_eq!(lv.layer(Layer::Overlay).get(2, 1), Some(8));
        assert!(lv.layer(Layer::Background2).iter().all(|id| id == EMPTY_TILE));
        assert!(lv.layer(Layer::Overlay2).iter().all(|id| id == EMPTY_TILE));
    }

    #[test]
    fn exit_and_next_resolve_next_to_file() {
        let text = format!("next = \"grove.toml\"\nexit = {{ x = 96, y = 32, w = 32, h = 32 }}\n{MINI}");
        let data = parse(&text).unwrap();
        assert_eq!(data.next, Some(PathBuf::from("levels/grove.toml")));
        assert_eq!(data.exit, Some(Rect::new(96, 32, 32, 32)));
    }

    #[test]
    fn player_and_actors() {
        let text = format!(
            "{MINI}\n[player]\nsprite = 2\nhitbox = {{ x = 2, y = 30, w = 20, h = 20 }}\n\n\
             [[actor]]\nx = 64.0\ny = 0.0\n\n[[actor]]\nx = 10.0\ny = 20.0\nsprite = 3\n"
        );
        let data = parse(&text).unwrap();
        assert_eq!(data.player_sprite, Some(2));
        assert_eq!(data.player_hitbox, Hitbox::new(2, 30, 20, 20));
        assert_eq!(data.actors.len(), 2);
        assert_eq!(data.actors[0].sprite, DEFAULT_ACTOR_SPRITE);
        assert_eq!(data.actors[0].hitbox, DEFAULT_HITBOX);
        assert_eq!(data.actors[1].pos, Vec2::new(10.0, 20.0));
        assert_eq!(data.actors[1].sprite, 3);
    }

    // ── errors ──

    #[test]
    fn syntax_error() {
        assert!(matches!(parse("width = "), Err(LevelError::Parse { .. })));
    }

    #[test]
    fn missing_spawn_is_a_schema_error() {
        let text = MINI.replace("spawn = { x = 40.0, y = 8.0 }\n", "");
        assert!(matches!(parse(&text), Err(LevelError::Parse { .. })));
    }

    #[test]
    fn zero_dimensions() {
        let text = MINI.replace("\nwidth = 4\n", "\nwidth = 0\n");
        assert!(matches!(parse(&text), Err(LevelError::Dimensions { width: 0, .. })));
    }

    #[test]
    fn short_row() {
        let text = MINI.replace("\"2,1,1,2\"", "\"2,1,1\"");
        match parse(&text) {
            Err(LevelError::RowLength { layer, row, expected, found }) => {
                assert_eq!((layer, row, expected, found), ("background", 1, 4, 3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_row() {
        let text = MINI.replace("overlay = [\"0 0 0 0\", \"0 0 8 0\", \"0 0 0 0\"]", "overlay = [\"0 0 0 0\"]");
        assert!(matches!(
            parse(&text),
            Err(LevelError::RowCount { layer: "overlay", expected: 3, found: 1 })
        ));
    }

    #[test]
    fn background_is_required() {
        let text = MINI.replace("background = [", "background2 = [");
        assert!(matches!(
            parse(&text),
            Err(LevelError::RowCount { layer: "background", found: 0, .. })
        ));
    }

    #[test]
    fn non_numeric_token() {
        let text = MINI.replace("\"2,1,1,2\"", "\"2,x,1,2\"");
        assert!(matches!(parse(&text), Err(LevelError::BadToken { row: 1, .. })));
    }

    #[test]
    fn id_outside_every_tileset() {
        let text = MINI.replace("\"0 0 8 0\"", "\"0 0 99 0\"");
        assert!(matches!(
            parse(&text),
            Err(LevelError::UnknownTile { layer: "overlay", x: 2, y: 1, gid: 99 })
        ));
    }

    #[test]
    fn overlapping_tilesets() {
        let text = format!(
            "{MINI}\n[[tileset]]\nname = \"props\"\nfirst_gid = 5\nimage_width = 64\n\
             image_height = 32\ntile_width = 32\ntile_height = 32\n"
        );
        assert!(matches!(parse(&text), Err(LevelError::OverlappingTilesets { .. })));
    }

    #[test]
    fn adjacent_tilesets_are_fine() {
        let text = format!(
            "{MINI}\n[[tileset]]\nname = \"props\"\nfirst_gid = 9\nimage_width = 64\n\
             image_height = 32\ntile_width = 32\ntile_height = 32\nsolid = [1]\n"
        );
        let lv = parse(&text).unwrap().level;
        assert_eq!(lv.tileset_for(10).map(|t| t.name.as_str()), Some("props"));
        assert!(lv.is_solid_id(10));
    }

    #[test]
    fn solid_id_beyond_tileset() {
        let text = MINI.replace("solid = [1]", "solid = [8]");
        assert!(matches!(
            parse(&text),
            Err(LevelError::SolidOutOfRange { id: 8, count: 8, .. })
        ));
    }

    #[test]
    fn zero_tile_size_tileset() {
        let text = MINI.replace("image_height = 64\ntile_width = 32", "image_height = 64\ntile_width = 0");
        assert!(matches!(parse(&text), Err(LevelError::BadTileset { .. })));
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        let text = MINI
            .replace("\nwidth = 4\n", "\nwidth = 4294967296\n")
            .replace("\nheight = 3\n", "\nheight = 4294967296\n");
        assert!(matches!(parse(&text), Err(LevelError::Dimensions { .. })));

        let text = MINI.replace("\nwidth = 4\n", "\nwidth = 100000000\n");
        assert!(matches!(parse(&text), Err(LevelError::Dimensions { .. })));
    }

    #[test]
    fn huge_grid_without_rows_is_a_shape_error() {
        let text = MINI
            .replace("\nwidth = 4\n", "\nwidth = 100000\n")
            .replace("\nheight = 3\n", "\nheight = 100000\n");
        assert!(matches!(
            parse(&text),
            Err(LevelError::RowCount { layer: "background", expected: 100000, found: 3 })
        ));
    }

    #[test]
    fn short_optional_layer_fails_before_building() {
        let text = MINI.replace("\"0 0 8 0\"", "\"0 0 8\"");
        assert!(matches!(
            parse(&text),
            Err(LevelError::RowLength { layer: "overlay", row: 1, expected: 4, found: 3 })
        ));
    }

    #[test]
    fn id_range_past_u32_is_rejected() {
        let text = MINI.replace("first_gid = 1\n", "first_gid = 4294967295\n");
        match parse(&text) {
            Err(LevelError::BadTileset { name, reason }) => {
                assert_eq!(name, "terrain");
                assert_eq!(reason, "id range exceeds u32");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn saturated_tile_count_is_rejected() {
        let text = MINI
            .replace("image_width = 128\n", "image_width = 2147483647\n")
            .replace("image_height = 64\n", "image_height = 2147483647\n")
            .replace("tile_width = 32\ntile_height = 32\nsolid", "tile_width = 1\ntile_height = 1\nsolid");
        assert!(matches!(parse(&text), Err(LevelError::BadTileset { .. })));
    }

    // ── files ──

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_level(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn image_is_resolved_next_to_level() {
        let dir = tempfile::tempdir().unwrap();
        let text = MINI.replace("name = \"terrain\"\n", "name = \"terrain\"\nimage = \"terrain.png\"\n");
        let path = dir.path().join("mini.toml");
        std::fs::write(&path, &text).unwrap();

        let err = load_level(&path).unwrap_err();
        assert!(matches!(err, LevelError::MissingImage { .. }));

        std::fs::write(dir.path().join("terrain.png"), b"").unwrap();
        let data = load_level(&path).unwrap();
        assert_eq!(data.level.tilesets()[0].image, Some(dir.path().join("terrain.png")));
    }

    #[test]
    fn shipped_levels_load_and_link() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("levels");
        let meadow = load_level(&dir.join("meadow.toml")).unwrap();
        let grove = load_level(&dir.join("grove.toml")).unwrap();
        assert_eq!(meadow.next, Some(dir.join("grove.toml")));
        assert_eq!(grove.next, Some(dir.join("meadow.toml")));
        for data in [&meadow, &grove] {
            let (w, h) = data.level.pixel_size();
            let exit = data.exit.unwrap();
            assert!(exit.left() >= 0 && exit.right() <= w && exit.bottom() <= h);
        }
    }
}

/// Settings loader for `config.toml`.
///
/// The first file found in the search directories wins. Missing keys take
/// their defaults, and out-of-range values are replaced with a warning.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::collision::MIN_SLIDE;
use crate::domain::entity::MAX_SPEED;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Level file to open at start-up.
    pub level: PathBuf,
    /// Target frame period of the front end.
    pub frame_ms: u64,
    pub motion: MotionConfig,
    pub camera: CameraConfig,
    pub characters: CharacterConfig,
    pub debug: DebugConfig,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Per-axis speed bound, px/s.
    pub max_speed: f32,
    /// Cross-axis overlap (px) below which a resolved entity slides around a corner.
    pub slide_threshold: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraConfig {
    pub viewport_width: i32,
    pub viewport_height: i32,
}

/// Character sheet layout: every character is 3 walk frames wide and
/// 8 facing rows tall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterConfig {
    pub tile_width: i32,
    pub tile_height: i32,
    pub sheet_width: i32,
    pub sheet_height: i32,
    /// Sheet slot used for the controlled entity.
    pub player: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugConfig {
    pub collision_boxes: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    motion: TomlMotion,
    #[serde(default)]
    camera: TomlCamera,
    #[serde(default)]
    characters: TomlCharacters,
    #[serde(default)]
    debug: TomlDebug,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_level")]
    level: String,
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlMotion {
    #[serde(default = "default_max_speed")]
    max_speed: f32,
    #[serde(default = "default_slide_threshold")]
    slide_threshold: i32,
}

#[derive(Deserialize, Debug)]
struct TomlCamera {
    #[serde(default = "default_viewport_width")]
    viewport_width: i32,
    #[serde(default = "default_viewport_height")]
    viewport_height: i32,
}

#[derive(Deserialize, Debug)]
struct TomlCharacters {
    #[serde(default = "default_char_tile_width")]
    tile_width: i32,
    #[serde(default = "default_char_tile_height")]
    tile_height: i32,
    #[serde(default = "default_sheet_width")]
    sheet_width: i32,
    #[serde(default = "default_sheet_height")]
    sheet_height: i32,
    #[serde(default)]
    player: u32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlDebug {
    #[serde(default)]
    collision_boxes: bool,
}

// ── Defaults ──

fn default_level() -> String { "levels/meadow.toml".into() }
fn default_frame_ms() -> u64 { 16 }
fn default_max_speed() -> f32 { MAX_SPEED }
fn default_slide_threshold() -> i32 { MIN_SLIDE }
fn default_viewport_width() -> i32 { 640 }  // 1280x720 screen at scale 2
fn default_viewport_height() -> i32 { 360 }
fn default_char_tile_width() -> i32 { 26 }
fn default_char_tile_height() -> i32 { 53 }
fn default_sheet_width() -> i32 { 312 }     // four characters side by side
fn default_sheet_height() -> i32 { 424 }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { level: default_level(), frame_ms: default_frame_ms() }
    }
}

impl Default for TomlMotion {
    fn default() -> Self {
        TomlMotion {
            max_speed: default_max_speed(),
            slide_threshold: default_slide_threshold(),
        }
    }
}

impl Default for TomlCamera {
    fn default() -> Self {
        TomlCamera {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

impl Default for TomlCharacters {
    fn default() -> Self {
        TomlCharacters {
            tile_width: default_char_tile_width(),
            tile_height: default_char_tile_height(),
            sheet_width: default_sheet_width(),
            sheet_height: default_sheet_height(),
            player: 0,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory, then the
    /// user and system data directories.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document directly. Relative level paths are kept as-is.
    #[cfg(test)]
    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        Ok(GameConfig::from_toml(toml::from_str(text)?, &[]))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let mut motion = MotionConfig {
            max_speed: cfg.motion.max_speed,
            slide_threshold: cfg.motion.slide_threshold,
        };
        if !(motion.max_speed > 0.0) {
            log::warn!("motion.max_speed must be positive; using {MAX_SPEED}");
            motion.max_speed = MAX_SPEED;
        }
        if motion.slide_threshold < 0 {
            log::warn!("motion.slide_threshold must not be negative; using {MIN_SLIDE}");
            motion.slide_threshold = MIN_SLIDE;
        }

        let mut camera = CameraConfig {
            viewport_width: cfg.camera.viewport_width,
            viewport_height: cfg.camera.viewport_height,
        };
        if camera.viewport_width <= 0 || camera.viewport_height <= 0 {
            log::warn!("camera viewport must be non-empty; using 640x360");
            camera.viewport_width = default_viewport_width();
            camera.viewport_height = default_viewport_height();
        }

        let c = cfg.characters;
        let characters = if c.tile_width > 0 && c.tile_height > 0 {
            CharacterConfig {
                tile_width: c.tile_width,
                tile_height: c.tile_height,
                sheet_width: c.sheet_width,
                sheet_height: c.sheet_height,
                player: c.player,
            }
        } else {
            log::warn!("characters tile size must be non-zero; using defaults");
            let d = TomlCharacters::default();
            CharacterConfig {
                tile_width: d.tile_width,
                tile_height: d.tile_height,
                sheet_width: d.sheet_width,
                sheet_height: d.sheet_height,
                player: c.player,
            }
        };

        GameConfig {
            level: resolve_level(&cfg.general.level, search_dirs),
            frame_ms: cfg.general.frame_ms.max(1),
            motion,
            camera,
            characters,
            debug: DebugConfig { collision_boxes: cfg.debug.collision_boxes },
        }
    }
}

/// Absolute paths are used as given; relative ones are looked up in the
/// candidate directories, falling back to the CWD.
fn resolve_level(level: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(level);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.is_file())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/tilefield)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/tilefield");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/tilefield");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    log::info!("loaded settings from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    log::warn!("{} parse error: {e}; using default settings", path.display());
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg.level, PathBuf::from("levels/meadow.toml"));
        assert_eq!(cfg.frame_ms, 16);
        assert_eq!(cfg.motion, MotionConfig { max_speed: 65.0, slide_threshold: 10 });
        assert_eq!(cfg.camera, CameraConfig { viewport_width: 640, viewport_height: 360 });
        assert_eq!(cfg.characters.tile_width, 26);
        assert_eq!(cfg.characters.tile_height, 53);
        assert!(!cfg.debug.collision_boxes);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[motion]\nmax_speed = 120.0\n\n[debug]\ncollision_boxes = true\n",
        )
        .unwrap();
        assert_eq!(cfg.motion.max_speed, 120.0);
        assert_eq!(cfg.motion.slide_threshold, 10);
        assert!(cfg.debug.collision_boxes);
        assert_eq!(cfg.camera.viewport_width, 640);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = GameConfig::parse(
            "[motion]\nmax_speed = -3.0\nslide_threshold = -1\n[camera]\nviewport_width = 0\n",
        )
        .unwrap();
        assert_eq!(cfg.motion.max_speed, MAX_SPEED);
        assert_eq!(cfg.motion.slide_threshold, MIN_SLIDE);
        assert_eq!(cfg.camera, CameraConfig { viewport_width: 640, viewport_height: 360 });
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        assert!(GameConfig::parse("[motion]\nmax_speed = \"fast\"\n").is_err());
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[general\nlevel = ").unwrap();
        let cfg = load_toml(&[dir.path().to_path_buf()]);
        assert_eq!(cfg.general.level, default_level());
    }

    #[test]
    fn relative_level_found_in_search_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("levels")).unwrap();
        std::fs::write(dir.path().join("levels/a.toml"), "").unwrap();
        std::fs::write(dir.path().join("config.toml"), "[general]\nlevel = \"levels/a.toml\"\n").unwrap();

        let dirs = [dir.path().to_path_buf()];
        let cfg = GameConfig::from_toml(load_toml(&dirs), &dirs);
        assert_eq!(cfg.level, dir.path().join("levels/a.toml"));
    }
}

/// World: everything a running level owns.
///
/// ## Ownership
///
/// The world owns the tile level, the entity list and the camera, and
/// exposes them to the orchestrator (`step`) and the renderer directly.
/// A level change replaces all three wholesale via `open_level`; nothing
/// carries over except configuration and the debug overlay flag.
///
/// ## Entity order
///
/// `entities` is in spawn order, which is also update order. The
/// controlled entity is spawned first. `draw_order` holds indices into
/// `entities` sorted by ascending y for back-to-front drawing.

use std::path::PathBuf;

use glam::Vec2;

use crate::config::{CharacterConfig, GameConfig, MotionConfig};
use crate::domain::entity::{Entity, EntityKind, Hitbox};
use crate::domain::geometry::Rect;
use crate::domain::map::Level;
use crate::domain::tile::Tileset;
use crate::sim::camera::Camera;
use crate::sim::level::LevelData;

/// Walk frames per character on the sheet.
const SHEET_FRAMES: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Simulation running.
    Field,
    /// Frozen; only unpause and quit are accepted.
    Paused,
}

pub struct World {
    // ── Level ──
    pub level: Level,
    pub spawn: Vec2,
    pub exit: Option<Rect>,
    pub next_level: Option<PathBuf>,
    /// Set when the exit is touched; loaded at the start of the next tick.
    pub pending_level: Option<PathBuf>,

    // ── Entities ──
    pub entities: Vec<Entity>,
    /// Index of the controlled entity in `entities`.
    pub player: Option<usize>,
    pub draw_order: Vec<usize>,
    next_id: usize,

    // ── Camera ──
    pub camera: Camera,

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,
    pub motion: MotionConfig,
    pub characters: Tileset,
    /// Sheet slot for the controlled entity unless the level overrides it.
    player_slot: u32,
    pub show_collision_boxes: bool,

    // ── UI ──
    pub message: String,
    pub message_timer_ms: f32,
}

// ── Construction ──

impl World {
    pub fn new(data: LevelData, config: &GameConfig) -> Self {
        let mut world = World {
            level: Level::new("", 1, 1, 1, 1),
            spawn: Vec2::ZERO,
            exit: None,
            next_level: None,
            pending_level: None,
            entities: vec![],
            player: None,
            draw_order: vec![],
            next_id: 0,
            camera: Camera::new(config.camera.viewport_width, config.camera.viewport_height),
            phase: Phase::Field,
            tick: 0,
            motion: config.motion,
            characters: character_sheet(&config.characters),
            player_slot: config.characters.player,
            show_collision_boxes: config.debug.collision_boxes,
            message: String::new(),
            message_timer_ms: 0.0,
        };
        world.open_level(data);
        world
    }

    /// Replace level, entities and camera state with a freshly loaded level.
    pub fn open_level(&mut self, data: LevelData) {
        self.level = data.level;
        self.spawn = data.spawn;
        self.exit = data.exit;
        self.next_level = data.next;
        self.pending_level = None;

        self.entities.clear();
        self.player = None;
        self.draw_order.clear();
        self.next_id = 0;
        self.camera.view.x = 0;
        self.camera.view.y = 0;
        self.camera.vel = Vec2::ZERO;
        self.phase = Phase::Field;

        let slot = data.player_sprite.unwrap_or(self.player_slot);
        self.spawn_player(data.spawn, slot, data.player_hitbox);
        for actor in data.actors {
            self.spawn_actor(actor.pos, actor.sprite, actor.hitbox);
        }

        self.sort_draw_order();
        self.follow_player();
        let name = self.level.name.clone();
        self.set_message(&name, 2000.0);
    }

    // ── Spawning ──

    /// Add the controlled entity. A second call replaces the camera target
    /// but keeps the earlier entity in the list.
    pub fn spawn_player(&mut self, pos: Vec2, slot: u32, hitbox: Hitbox) -> usize {
        let idx = self.push_entity(EntityKind::Controlled, pos, slot, hitbox);
        self.player = Some(idx);
        idx
    }

    pub fn spawn_actor(&mut self, pos: Vec2, slot: u32, hitbox: Hitbox) -> usize {
        self.push_entity(EntityKind::Scenery, pos, slot, hitbox)
    }

    fn push_entity(&mut self, kind: EntityKind, pos: Vec2, slot: u32, hitbox: Hitbox) -> usize {
        let sprite = self.character_sprite(slot);
        let entity = Entity::new(self.next_id, kind, pos, sprite, hitbox);
        self.next_id += 1;
        self.entities.push(entity);
        self.draw_order.push(self.entities.len() - 1);
        self.entities.len() - 1
    }

    /// Origin clip of a character slot: the top-left cell of its
    /// 3-frame by 8-facing block.
    pub fn character_sprite(&self, slot: u32) -> Rect {
        let columns = self.characters.columns().max(SHEET_FRAMES);
        let per_row = columns / SHEET_FRAMES;
        let (col, band) = (slot % per_row, slot / per_row);
        // Bands of characters stack in blocks of 8 facing rows
        let clip = self.characters.clip(col * SHEET_FRAMES);
        Rect::new(clip.x, clip.y + band as i32 * 8 * clip.h, clip.w, clip.h)
    }

    // ── Queries ──

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|i| self.entities.get(i))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        match self.player {
            Some(i) => self.entities.get_mut(i),
            None => None,
        }
    }

    // ── Per-tick helpers ──

    /// Re-sort `draw_order` by ascending y. Stable, so equal y keeps spawn order.
    pub fn sort_draw_order(&mut self) {
        let entities = &self.entities;
        self.draw_order.retain(|&i| i < entities.len());
        self.draw_order.sort_by(|&a, &b| entities[a].pos().y.total_cmp(&entities[b].pos().y));
    }

    /// Point the camera at the controlled entity, if there is one.
    pub fn follow_player(&mut self) {
        if let Some(player) = self.player.and_then(|i| self.entities.get(i)) {
            let (w, h) = self.level.pixel_size();
            self.camera.follow(player, w, h);
        }
    }

    pub fn set_message(&mut self, msg: &str, duration_ms: f32) {
        self.message = msg.to_string();
        self.message_timer_ms = duration_ms;
    }

    /// Count down the status message; clears it when the time is up.
    pub fn tick_message(&mut self, elapsed_ms: f32) {
        if self.message_timer_ms > 0.0 {
            self.message_timer_ms -= elapsed_ms;
            if self.message_timer_ms <= 0.0 {
                self.message.clear();
                self.message_timer_ms = 0.0;
            }
        }
    }
}

/// Character sheet as a tileset; indices are sheet cells, not tile ids.
fn character_sheet(cfg: &CharacterConfig) -> Tileset {
    Tileset {
        name: "characters".into(),
        image: None,
        first_gid: 0,
        image_width: cfg.sheet_width,
        image_height: cfg.sheet_height,
        tile_width: cfg.tile_width,
        tile_height: cfg.tile_height,
        alpha: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{ActorSpawn, DEFAULT_HITBOX};

    fn empty_level(w: usize, h: usize) -> LevelData {
        LevelData::new(Level::new("field", w, h, 32, 32), Vec2::new(64.0, 64.0))
    }

    #[test]
    fn new_world_spawns_player_first() {
        let mut data = empty_level(40, 30);
        data.actors.push(ActorSpawn { pos: Vec2::new(300.0, 10.0), sprite: 1, hitbox: DEFAULT_HITBOX });
        let world = World::new(data, &GameConfig::default());

        assert_eq!(world.entities.len(), 2);
        assert_eq!(world.player, Some(0));
        assert!(world.entities[0].is_controlled());
        assert_eq!(world.entities[0].pos(), Vec2::new(64.0, 64.0));
        assert_eq!(world.entities[1].kind, EntityKind::Scenery);
        assert_eq!(world.phase, Phase::Field);
    }

    #[test]
    fn draw_order_sorts_by_y_and_is_stable() {
        let mut world = World::new(empty_level(40, 30), &GameConfig::default());
        world.spawn_actor(Vec2::new(0.0, 10.0), 1, DEFAULT_HITBOX);
        world.spawn_actor(Vec2::new(100.0, 64.0), 1, DEFAULT_HITBOX);
        world.spawn_actor(Vec2::new(200.0, 200.0), 1, DEFAULT_HITBOX);
        world.sort_draw_order();
        // Player (y = 64) was spawned before actor 2 (y = 64)
        assert_eq!(world.draw_order, vec![1, 0, 2, 3]);
    }

    #[test]
    fn open_level_replaces_everything() {
        let mut world = World::new(empty_level(40, 30), &GameConfig::default());
        world.spawn_actor(Vec2::new(0.0, 0.0), 1, DEFAULT_HITBOX);
        world.pending_level = Some(PathBuf::from("x.toml"));
        world.phase = Phase::Paused;

        let mut next = LevelData::new(Level::new("grove", 10, 10, 32, 32), Vec2::new(32.0, 32.0));
        next.next = Some(PathBuf::from("meadow.toml"));
        world.open_level(next);

        assert_eq!(world.level.name, "grove");
        assert_eq!(world.entities.len(), 1);
        assert_eq!(world.player().map(|p| p.pos()), Some(Vec2::new(32.0, 32.0)));
        assert_eq!(world.pending_level, None);
        assert_eq!(world.next_level, Some(PathBuf::from("meadow.toml")));
        assert_eq!(world.phase, Phase::Field);
        assert_eq!(world.draw_order, vec![0]);
    }

    #[test]
    fn camera_follows_player_on_open() {
        let mut data = empty_level(100, 100);
        data.spawn = Vec2::new(1600.0, 1600.0);
        let world = World::new(data, &GameConfig::default());
        // Centre (1613, 1626) minus half of 640x360
        assert_eq!((world.camera.view.x, world.camera.view.y), (1293, 1446));
    }

    #[test]
    fn character_slots_step_by_three_columns() {
        let world = World::new(empty_level(4, 4), &GameConfig::default());
        // Default sheet is 312 px wide: four 78 px characters per band
        assert_eq!(world.character_sprite(0), Rect::new(0, 0, 26, 53));
        assert_eq!(world.character_sprite(1), Rect::new(78, 0, 26, 53));
        assert_eq!(world.character_sprite(3), Rect::new(234, 0, 26, 53));
        assert_eq!(world.character_sprite(4), Rect::new(0, 424, 26, 53));
    }

    #[test]
    fn message_expires() {
        let mut world = World::new(empty_level(4, 4), &GameConfig::default());
        world.set_message("hello", 100.0);
        world.tick_message(60.0);
        assert_eq!(world.message, "hello");
        world.tick_message(60.0);
        assert!(world.message.is_empty());
    }
}

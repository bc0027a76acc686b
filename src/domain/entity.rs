/// Entities: one flat record for everything that moves through the tile world.
///
/// The controlled entity and scenery actors share the same fields; the
/// `EntityKind` tag decides which per-tick logic runs (`run_logic`).
///
/// ## Collision box invariant
///
/// The collision box is never written directly. Every position change goes
/// through `advance`, `retract` or `set_position`, each of which resyncs the
/// box to `floor(position) + hitbox offset`.

use glam::Vec2;

use super::geometry::Rect;

/// Default speed bound, in pixels per second.
pub const MAX_SPEED: f32 = 65.0;

/// Milliseconds between walk-cycle frames.
const WALK_FRAME_MS: f32 = 180.0;
const WALK_FRAMES: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    /// Input-driven; the camera follows it.
    Controlled,
    /// No logic of its own. Still collides and can be pushed.
    Scenery,
}

/// Axis selector for `retract`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    X,
    Y,
    #[allow(dead_code)]
    Both,
}

/// Eight-way facing. Discriminants are character-sheet rows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Down = 0,
    Left = 1,
    Right = 2,
    Up = 3,
    UpLeft = 4,
    DownLeft = 5,
    UpRight = 6,
    DownRight = 7,
}

impl Facing {
    /// Facing implied by a velocity, or None when standing still.
    pub fn from_velocity(vel: Vec2) -> Option<Facing> {
        let (vx, vy) = (vel.x, vel.y);
        if vx > 0.0 && vy == 0.0 { Some(Facing::Right) }
        else if vx < 0.0 && vy == 0.0 { Some(Facing::Left) }
        else if vx == 0.0 && vy < 0.0 { Some(Facing::Up) }
        else if vx == 0.0 && vy > 0.0 { Some(Facing::Down) }
        else if vx > 0.0 && vy > 0.0 { Some(Facing::DownRight) }
        else if vx < 0.0 && vy > 0.0 { Some(Facing::DownLeft) }
        else if vx < 0.0 && vy < 0.0 { Some(Facing::UpLeft) }
        else if vx > 0.0 && vy < 0.0 { Some(Facing::UpRight) }
        else { None }
    }

    #[inline]
    pub fn row(self) -> i32 {
        self as i32
    }
}

/// Collision box placement relative to the entity position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hitbox {
    pub offset_x: i32,
    pub offset_y: i32,
    pub w: i32,
    pub h: i32,
}

impl Hitbox {
    pub const fn new(offset_x: i32, offset_y: i32, w: i32, h: i32) -> Self {
        Hitbox { offset_x, offset_y, w, h }
    }
}

/// Held-direction intent written by the input layer each frame.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Return to the level spawn point.
    pub respawn: bool,
}

/// Walk-cycle state. Frames run 0,1,2,3 and frame 3 displays as frame 1.
#[derive(Clone, Debug)]
pub struct Animation {
    pub facing: Facing,
    pub frame: u8,
    elapsed_ms: f32,
    was_still: bool,
}

impl Animation {
    pub fn new() -> Self {
        Animation { facing: Facing::Down, frame: 1, elapsed_ms: 0.0, was_still: true }
    }

    /// Sheet column to draw for the current frame.
    pub fn display_frame(&self) -> u8 {
        if self.frame == 3 { 1 } else { self.frame }
    }

    /// Advance the cycle by `elapsed_ms` given the entity's current velocity.
    pub fn update(&mut self, vel: Vec2, elapsed_ms: f32) {
        let facing = Facing::from_velocity(vel);
        if let Some(f) = facing {
            self.facing = f;
        }

        // Starting to walk shows a stride immediately
        if facing.is_some() && self.was_still {
            self.frame = 2;
            self.elapsed_ms = 0.0;
            self.was_still = false;
        }

        self.elapsed_ms += elapsed_ms;
        if self.elapsed_ms > WALK_FRAME_MS {
            self.elapsed_ms = 0.0;
            if facing.is_some() {
                self.frame += 1;
            }
        }

        if facing.is_none() {
            self.frame = 1;
            self.was_still = true;
        }

        self.frame %= WALK_FRAMES;
    }
}

impl Default for Animation {
    fn default() -> Self {
        Animation::new()
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: usize,
    pub kind: EntityKind,
    pos: Vec2,
    pub vel: Vec2,
    /// Source clip on the character sheet; its size is the drawn size.
    pub sprite: Rect,
    hitbox: Hitbox,
    collision_box: Rect,
    pub anim: Animation,
}

impl Entity {
    pub fn new(id: usize, kind: EntityKind, pos: Vec2, sprite: Rect, hitbox: Hitbox) -> Self {
        let mut e = Entity {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            sprite,
            hitbox,
            collision_box: Rect::new(0, 0, hitbox.w, hitbox.h),
            anim: Animation::new(),
        };
        e.sync_box();
        e
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn collision_box(&self) -> Rect {
        self.collision_box
    }

    #[inline]
    #[allow(dead_code)]
    pub fn hitbox(&self) -> Hitbox {
        self.hitbox
    }

    #[inline]
    pub fn is_controlled(&self) -> bool {
        self.kind == EntityKind::Controlled
    }

    /// Teleport. Used for spawning and respawn only.
    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
        self.sync_box();
    }

    /// Clamp velocity to `max_speed` per axis, then integrate over `elapsed_ms`.
    pub fn advance(&mut self, elapsed_ms: f32, max_speed: f32) {
        self.vel = self.vel.clamp(Vec2::splat(-max_speed), Vec2::splat(max_speed));
        self.pos += self.vel * elapsed_ms / 1000.0;
        self.sync_box();
    }

    /// Undo part of a displacement: position -= `amount` on `axis`.
    ///
    /// No bounds checks. Only the collision engine calls this, and only
    /// to reverse movement that was just applied.
    pub fn retract(&mut self, axis: Axis, amount: f32) {
        if matches!(axis, Axis::X | Axis::Both) {
            self.pos.x -= amount;
        }
        if matches!(axis, Axis::Y | Axis::Both) {
            self.pos.y -= amount;
        }
        self.sync_box();
    }

    /// Source rectangle for the current animation frame on a sheet
    /// made of `tile_w` x `tile_h` cells.
    pub fn sprite_clip(&self, tile_w: i32, tile_h: i32) -> Rect {
        Rect::new(
            self.sprite.x + self.anim.display_frame() as i32 * tile_w,
            self.sprite.y + self.anim.facing.row() * tile_h,
            tile_w,
            tile_h,
        )
    }

    fn sync_box(&mut self) {
        self.collision_box = Rect::new(
            self.pos.x.floor() as i32 + self.hitbox.offset_x,
            self.pos.y.floor() as i32 + self.hitbox.offset_y,
            self.hitbox.w,
            self.hitbox.h,
        );
    }
}

// ══════════════════════════════════════════════════════════════
// Per-kind logic
// ══════════════════════════════════════════════════════════════

/// Run the kind-specific logic that precedes `advance`.
pub fn run_logic(entity: &mut Entity, intent: &MoveIntent, max_speed: f32, spawn: Vec2) {
    match entity.kind {
        EntityKind::Controlled => apply_intent(entity, intent, max_speed, spawn),
        EntityKind::Scenery => {}
    }
}

/// Held keys set full speed; released keys bring the axis back to rest.
fn apply_intent(entity: &mut Entity, intent: &MoveIntent, max_speed: f32, spawn: Vec2) {
    let vel = &mut entity.vel;

    if intent.up {
        vel.y = -max_speed;
    } else if vel.y < 0.0 {
        vel.y = (vel.y + max_speed).min(0.0);
    }

    if intent.down {
        vel.y = max_speed;
    } else if vel.y > 0.0 {
        vel.y = (vel.y - max_speed).max(0.0);
    }

    if intent.right {
        vel.x = max_speed;
    } else if vel.x > 0.0 {
        vel.x = (vel.x - max_speed).max(0.0);
    }

    if intent.left {
        vel.x = -max_speed;
    } else if vel.x < 0.0 {
        vel.x = (vel.x + max_speed).min(0.0);
    }

    if intent.up && intent.down { vel.y = 0.0; }
    if intent.left && intent.right { vel.x = 0.0; }

    if intent.respawn {
        entity.vel = Vec2::ZERO;
        entity.set_position(spawn);
    }
}

/// Camera: a fixed-size viewport into the level, in world pixels.
///
/// The camera centres on the controlled entity and is clamped per axis:
///   - level at least as large as the viewport → keep the view inside the level
///   - level smaller than the viewport → centre the level, ignore the entity
///
/// `vel` echoes the followed entity's velocity for parallax effects and is
/// zeroed on any axis where the view is pinned.

use glam::Vec2;

use crate::domain::entity::Entity;
use crate::domain::geometry::Rect;

#[derive(Clone, Debug)]
pub struct Camera {
    pub view: Rect,
    pub vel: Vec2,
}

impl Camera {
    pub fn new(view_w: i32, view_h: i32) -> Self {
        Camera { view: Rect::new(0, 0, view_w, view_h), vel: Vec2::ZERO }
    }

    /// Centre on `target`, then clamp to a level of `level_w` x `level_h` pixels.
    pub fn follow(&mut self, target: &Entity, level_w: i32, level_h: i32) {
        let pos = target.pos();
        let (x, vx) = follow_axis(
            pos.x.floor() as i32 + target.sprite.w / 2,
            target.vel.x,
            self.view.w,
            level_w,
        );
        let (y, vy) = follow_axis(
            pos.y.floor() as i32 + target.sprite.h / 2,
            target.vel.y,
            self.view.h,
            level_h,
        );
        self.view.x = x;
        self.view.y = y;
        self.vel = Vec2::new(vx, vy);
    }

    /// Background offset for a layer scrolling at half camera speed.
    pub fn parallax_offset(&self) -> Vec2 {
        Vec2::new(
            -0.5 * self.view.x.abs() as f32,
            -0.5 * self.view.y.abs() as f32,
        )
    }
}

/// One axis of `follow`: returns (view origin, reported velocity).
fn follow_axis(center: i32, vel: f32, view: i32, level: i32) -> (i32, f32) {
    if level < view {
        return (level / 2 - view / 2, 0.0);
    }

    let origin = center - view / 2;
    let max = level - view;
    if origin < 0 {
        (0, 0.0)
    } else if origin > max {
        (max, 0.0)
    } else {
        (origin, vel)
    }
}

/// Collision correction: push an entity out of whatever it overlaps after it moved.
///
/// ## Resolution rule
///
/// For one overlap the four edge differences become two candidates per
/// axis. The smaller-magnitude candidate on each axis is that axis's
/// penetration; the smaller of the two axes is retracted. Ties go to the
/// first argument at every level: top over bottom, left over right, and
/// vertical over horizontal. The vertical bias at exact corners is kept
/// deliberately; see `corner_tie_resolves_vertically`.
///
/// After retracting, a still-overlapping obstacle means the retraction was
/// wrong and it is undone. Otherwise, if the entity is at rest on the other
/// axis and that axis's penetration is under the slide threshold, the
/// entity is nudged flush along it too.
///
/// ## Tiles
///
/// A collision box is assumed to be at most one tile wide, so each row of
/// the swept range is checked in two columns only. Two solid neighbours are
/// merged into one double-width rectangle; resolving them separately would
/// catch the entity on the seam between them.
///
/// ## Known limitation
///
/// Overlap is sampled once per tick. A displacement large enough to carry
/// the box clean across an obstacle is not detected.

use super::entity::{Axis, Entity};
use super::geometry::{delta_min, detect_overlap, first_wins, Delta, Edges, Rect};
use super::map::Level;

/// Default slide allowance in pixels.
pub const MIN_SLIDE: i32 = 10;

/// What `correct_overlap` did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Correction {
    /// Retracted along `axis`; `slid` if the other axis was nudged as well.
    Retracted { axis: Axis, slid: bool },
    /// Retraction along `axis` did not clear the obstacle and was undone.
    Reverted { axis: Axis },
}

/// Resolve one known overlap between `entity` and `obstacle`.
/// `edges` must come from `detect_overlap(entity box, obstacle)`.
pub fn correct_overlap(entity: &mut Entity, edges: Edges, obstacle: &Rect, slide_threshold: i32) -> Correction {
    let min_y = delta_min(Delta::new(edges.top), Delta::new(edges.bottom));
    let min_x = delta_min(Delta::new(edges.left), Delta::new(edges.right));

    let (axis, primary, other_axis, other) = if first_wins(&min_y, &min_x) {
        (Axis::Y, min_y, Axis::X, min_x)
    } else {
        (Axis::X, min_x, Axis::Y, min_y)
    };

    entity.retract(axis, primary.value as f32);

    if detect_overlap(&entity.collision_box(), obstacle).0 {
        entity.retract(axis, -primary.value as f32);
        return Correction::Reverted { axis };
    }

    let at_rest = match other_axis {
        Axis::X => entity.vel.x == 0.0,
        _ => entity.vel.y == 0.0,
    };
    let slid = other.magnitude < slide_threshold && at_rest;
    if slid {
        entity.retract(other_axis, other.value as f32);
    }

    Correction::Retracted { axis, slid }
}

/// Correct entity `idx` against every other entity, then against solid tiles.
///
/// Entities are read at their current positions: anything earlier in the
/// list has already been corrected this tick.
pub fn correct_collision(entities: &mut [Entity], idx: usize, level: &Level, slide_threshold: i32) {
    for j in 0..entities.len() {
        if j == idx {
            continue;
        }
        let other = entities[j].collision_box();
        let (hit, edges) = detect_overlap(&entities[idx].collision_box(), &other);
        if hit {
            correct_overlap(&mut entities[idx], edges, &other, slide_threshold);
        }
    }

    let entity = &mut entities[idx];
    let range = level.tile_range_overlap(&entity.collision_box());
    let x = range.x0;

    for y in range.rows() {
        let left = level.is_solid_cell(x, y);
        let right = level.is_solid_cell(x + 1, y);

        let tile = match (left, right) {
            (true, true) => level.tile_rect(x, y, 2),
            (true, false) => level.tile_rect(x, y, 1),
            (false, true) => level.tile_rect(x + 1, y, 1),
            (false, false) => continue,
        };

        let (hit, edges) = detect_overlap(&entity.collision_box(), &tile);
        if hit {
            correct_overlap(entity, edges, &tile, slide_threshold);
        }
    }
}

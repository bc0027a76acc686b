/// Axis-aligned rectangle primitives shared by motion, collision and camera.
///
/// ## Overlap descriptor
///
/// `detect_overlap(a, b)` always reports four signed edge differences:
///
///   top    = a.top    - b.bottom
///   bottom = a.bottom - b.top
///   left   = a.left   - b.right
///   right  = a.right  - b.left
///
/// When the rectangles intersect, the candidate with the smallest magnitude
/// on each axis is the penetration depth along that axis, and its sign is
/// the direction to retract in.

/// Integer pixel rectangle. `(x, y)` is the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> i32 { self.x }

    #[inline]
    pub fn right(&self) -> i32 { self.x + self.w }

    #[inline]
    pub fn top(&self) -> i32 { self.y }

    #[inline]
    pub fn bottom(&self) -> i32 { self.y + self.h }
}

/// Signed edge differences between two rectangles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Edges {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

/// Do `a` and `b` intersect with non-zero area? Touching edges are not an overlap.
/// The edge differences are returned either way.
pub fn detect_overlap(a: &Rect, b: &Rect) -> (bool, Edges) {
    let edges = Edges {
        top: a.top() - b.bottom(),
        bottom: a.bottom() - b.top(),
        left: a.left() - b.right(),
        right: a.right() - b.left(),
    };

    let hit = !(a.bottom() <= b.top()
        || a.top() >= b.bottom()
        || a.left() >= b.right()
        || a.right() <= b.left());

    (hit, edges)
}

/// A signed penetration candidate paired with its magnitude.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Delta {
    pub value: i32,
    pub magnitude: i32,
}

impl Delta {
    pub fn new(value: i32) -> Self {
        Delta { value, magnitude: value.abs() }
    }
}

/// Does `first` win against `second`? Ties go to `first`.
#[inline]
pub fn first_wins(first: &Delta, second: &Delta) -> bool {
    first.magnitude <= second.magnitude
}

/// The candidate with the smaller magnitude; `a` on an exact tie.
#[inline]
pub fn delta_min(a: Delta, b: Delta) -> Delta {
    if first_wins(&a, &b) { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rects() -> Vec<Rect> {
        vec![
            Rect::new(0, 0, 32, 32),
            Rect::new(10, 10, 5, 5),
            Rect::new(31, 0, 10, 32),
            Rect::new(32, 0, 10, 32),
            Rect::new(-20, -20, 25, 25),
            Rect::new(0, 32, 32, 32),
            Rect::new(100, 100, 1, 1),
        ]
    }

    #[test]
    fn overlapping_rects_report_hit() {
        let (hit, e) = detect_overlap(&Rect::new(0, 0, 10, 10), &Rect::new(5, 8, 10, 10));
        assert!(hit);
        assert_eq!(e, Edges { top: -18, bottom: 2, left: -15, right: 5 });
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0, 0, 32, 32);
        assert!(!detect_overlap(&a, &Rect::new(32, 0, 32, 32)).0);
        assert!(!detect_overlap(&a, &Rect::new(0, 32, 32, 32)).0);
        assert!(!detect_overlap(&a, &Rect::new(-32, 0, 32, 32)).0);
        assert!(!detect_overlap(&a, &Rect::new(0, -32, 32, 32)).0);
    }

    #[test]
    fn edges_populated_without_overlap() {
        let (hit, e) = detect_overlap(&Rect::new(0, 0, 10, 10), &Rect::new(50, 0, 10, 10));
        assert!(!hit);
        assert_eq!(e.left, -60);
        assert_eq!(e.right, -40);
    }

    #[test]
    fn overlap_is_symmetric() {
        let rects = sample_rects();
        for a in &rects {
            for b in &rects {
                let (ab, e1) = detect_overlap(a, b);
                let (ba, e2) = detect_overlap(b, a);
                assert_eq!(ab, ba, "{a:?} vs {b:?}");
                // Swapping operands swaps top/bottom and left/right, negated
                assert_eq!(e1.top, -e2.bottom);
                assert_eq!(e1.bottom, -e2.top);
                assert_eq!(e1.left, -e2.right);
                assert_eq!(e1.right, -e2.left);
            }
        }
    }

    // ── Tie-break ──

    #[test]
    fn delta_min_picks_smaller_magnitude() {
        assert_eq!(delta_min(Delta::new(-3), Delta::new(5)).value, -3);
        assert_eq!(delta_min(Delta::new(7), Delta::new(-2)).value, -2);
    }

    #[test]
    fn delta_min_tie_keeps_first_argument() {
        assert_eq!(delta_min(Delta::new(4), Delta::new(-4)).value, 4);
        assert_eq!(delta_min(Delta::new(-4), Delta::new(4)).value, -4);
        assert!(first_wins(&Delta::new(0), &Delta::new(0)));
    }
}

use serde::Deserialize;
use serde::Serialize;

/// Screen-space rectangle in physical pixels, matching the platform's
/// `left/top/right/bottom` convention. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Center point, rounded toward the origin the way the platform rounds
    /// gesture coordinates.
    pub fn center(&self) -> (i32, i32) {
        (
            self.left + self.width() / 2,
            self.top + self.height() / 2,
        )
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Intersection-over-Union against `other`. Empty rectangles and
    /// disjoint pairs yield 0.0; identical non-empty rectangles yield 1.0.
    pub fn iou(&self, other: &Rect) -> f64 {
        let ix = (self.right.min(other.right) - self.left.max(other.left)).max(0) as i64;
        let iy = (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0) as i64;
        let inter = ix * iy;
        let union = self.area() + other.area() - inter;
        if union <= 0 {
            0.0
        } else {
            inter as f64 / union as f64
        }
    }

    /// Euclidean distance between the centers of `self` and `other`.
    pub fn center_distance(&self, other: &Rect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        let dx = (ax - bx) as f64;
        let dy = (ay - by) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_width_height_clamp_to_zero() {
        let inverted = Rect::new(10, 10, 5, 5);
        assert_eq!(inverted.width(), 0);
        assert_eq!(inverted.height(), 0);
        assert!(inverted.is_empty());
        assert_eq!(inverted.area(), 0);
    }

    #[test]
    fn test_center() {
        let r = Rect::new(100, 200, 300, 400);
        assert_eq!(r.center(), (200, 300));
    }

    #[test]
    fn test_contains_point_is_half_open() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(0, 0));
        assert!(r.contains_point(9, 9));
        assert!(!r.contains_point(10, 9));
        assert!(!r.contains_point(9, 10));
        assert!(!r.contains_point(-1, 5));
    }

    #[test]
    fn test_iou_identical() {
        let r = Rect::new(0, 0, 100, 50);
        assert!((r.iou(&r) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_iou_disjoint() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 30, 30);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_half_overlap() {
        // Two 10x10 boxes sharing a 5x10 strip: inter 50, union 150.
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 0, 15, 10);
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_iou_empty_rect_is_zero() {
        let empty = Rect::new(5, 5, 5, 5);
        let full = Rect::new(0, 0, 10, 10);
        assert_eq!(empty.iou(&full), 0.0);
        assert_eq!(full.iou(&empty), 0.0);
    }

    #[test]
    fn test_center_distance() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(3, 4, 13, 14);
        assert!((a.center_distance(&b) - 5.0).abs() < 1e-9);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (0..2000i32, 0..2000i32, 1..500i32, 1..500i32)
            .prop_map(|(l, t, w, h)| Rect::new(l, t, l + w, t + h))
    }

    proptest! {
        #[test]
        fn prop_iou_in_unit_range(a in arb_rect(), b in arb_rect()) {
            let v = a.iou(&b);
            prop_assert!((0.0..=1.0).contains(&v));
        }

        #[test]
        fn prop_iou_symmetric(a in arb_rect(), b in arb_rect()) {
            prop_assert!((a.iou(&b) - b.iou(&a)).abs() < 1e-12);
        }

        #[test]
        fn prop_self_iou_is_one(a in arb_rect()) {
            prop_assert!((a.iou(&a) - 1.0).abs() < 1e-12);
        }
    }
}

use crate::geometry::{Point, Region};

pub type TargetId = u64;

/// A clickable target. `(x, y)` is the top-left of its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// Letter shown on the target in letter modes.
    pub label: Option<char>,
    /// Transient "hit" state while a deferred removal is pending.
    pub hit: bool,
}

impl Target {
    pub fn new(id: TargetId, x: f64, y: f64, size: f64) -> Self {
        Self {
            id,
            x,
            y,
            size,
            label: None,
            hit: false,
        }
    }

    pub fn center(&self) -> Point {
        let r = self.size / 2.0;
        Point::new(self.x + r, self.y + r)
    }

    pub fn bounds(&self) -> Region {
        Region::new(self.x, self.y, self.size, self.size)
    }

    /// Round hit-test against the target's circle.
    pub fn contains(&self, p: Point) -> bool {
        self.center().distance(p) <= self.size / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_bounds() {
        let t = Target::new(3, 10.0, 20.0, 8.0);
        assert_eq!(t.center(), Point::new(14.0, 24.0));
        assert_eq!(t.bounds(), Region::new(10.0, 20.0, 8.0, 8.0));
        assert!(t.contains(Point::new(14.0, 24.0)));
        assert!(!t.contains(Point::new(10.0, 20.0)));
    }
}

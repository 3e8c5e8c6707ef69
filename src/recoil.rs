use crate::geometry::{Point, Viewport};

pub const PATTERN_LEN: usize = 30;

/// Fixed spray pattern: offsets from the viewport center, one per shot.
///
/// The shape pulls straight down for the first shots, drifts right while still
/// climbing, then swings back left for the tail of the magazine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoilPattern {
    center: Point,
    offsets: Vec<Point>,
}

impl RecoilPattern {
    pub fn generate(viewport: Viewport) -> Self {
        let offsets = (0..PATTERN_LEN).map(shot_offset).collect();
        Self {
            center: viewport.center(),
            offsets,
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn offset(&self, index: usize) -> Option<Point> {
        self.offsets.get(index).copied()
    }

    /// Absolute viewport position of shot `index`.
    pub fn point(&self, index: usize) -> Option<Point> {
        self.offset(index)
            .map(|o| Point::new(self.center.x + o.x, self.center.y + o.y))
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).filter_map(|i| self.point(i))
    }
}

fn shot_offset(i: usize) -> Point {
    let i = i as f64;
    let (x, y) = if i < 5.0 {
        (0.0, i * 8.0)
    } else if i < 12.0 {
        ((i - 5.0) * 4.0, 40.0 + (i - 5.0) * 6.0)
    } else if i < 20.0 {
        (28.0 + (i - 12.0) * 5.0, 82.0 + (i - 12.0) * 3.0)
    } else {
        (68.0 - (i - 20.0) * 4.0, 106.0 + (i - 20.0) * 2.0)
    };
    Point::new(x, y)
}

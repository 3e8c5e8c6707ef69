use crate::mode::Mode;
use itertools::iproduct;

/// Side of the fixed square that grid mode partitions into cells.
pub const GRID_SQUARE_PX: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A viewport that has not been measured yet (or collapsed to nothing).
    pub fn is_unmeasured(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle in viewport pixels, `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of `width` x `height` centered in the viewport.
    pub fn centered(viewport: Viewport, width: f64, height: f64) -> Self {
        Self {
            x: (viewport.width - width) / 2.0,
            y: (viewport.height - height) / 2.0,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the right and bottom edges belong to the neighbour.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersects(&self, other: &Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Percentage of the viewport a mode spawns in. Some modes pin it.
pub fn effective_area_percent(mode: Mode, area_percent: u8) -> f64 {
    match mode {
        Mode::Intensive => 5.0,
        Mode::Reaction => 10.0,
        Mode::Grid => 15.0,
        _ => f64::from(area_percent),
    }
}

/// Spawn rectangle for `mode`, centered in the viewport.
///
/// An unmeasured viewport yields a zero-area region, which every caller treats as
/// "no spawn possible".
pub fn spawn_region(viewport: Viewport, mode: Mode, area_percent: u8) -> Region {
    if viewport.is_unmeasured() {
        return Region::default();
    }

    let percent = effective_area_percent(mode, area_percent);
    let width = viewport.width * percent / 100.0;
    let height = viewport.height * percent / 100.0;

    Region::centered(viewport, width, height)
}

/// The fixed grid square, centered in the viewport.
pub fn grid_square(viewport: Viewport) -> Region {
    if viewport.is_unmeasured() {
        return Region::default();
    }
    Region::centered(viewport, GRID_SQUARE_PX, GRID_SQUARE_PX)
}

/// Partition the grid square into `n x n` equal cells, row-major.
pub fn grid_cells(viewport: Viewport, n: usize) -> Vec<Region> {
    let square = grid_square(viewport);
    if square.is_degenerate() || n == 0 {
        return Vec::new();
    }

    let side = GRID_SQUARE_PX / n as f64;
    iproduct!(0..n, 0..n)
        .map(|(row, col)| {
            Region::new(
                square.x + col as f64 * side,
                square.y + row as f64 * side,
                side,
                side,
            )
        })
        .collect()
}

use flick::geometry::{Point, Region, Viewport};
use flick::mode::Mode;
use flick::target::Target;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

use crate::App;

pub const CELL_WIDTH_PX: f64 = 10.0;
pub const CELL_HEIGHT_PX: f64 = 20.0;

/// Pixel size of one terminal cell. The play field is measured in these pixels so the
/// engine's pixel rules apply unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: CELL_WIDTH_PX,
            cell_height: CELL_HEIGHT_PX,
        }
    }
}

impl CellMetrics {
    pub fn viewport(&self, field: Rect) -> Viewport {
        Viewport::new(
            f64::from(field.width) * self.cell_width,
            f64::from(field.height) * self.cell_height,
        )
    }

    /// Pixel box covered by a field-local cell.
    pub fn cell_region(&self, col: u16, row: u16) -> Region {
        Region::new(
            f64::from(col) * self.cell_width,
            f64::from(row) * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }

    pub fn cell_center(&self, col: u16, row: u16) -> Point {
        self.cell_region(col, row).center()
    }

    pub fn cell_at(&self, p: Point) -> (u16, u16) {
        (
            (p.x / self.cell_width).max(0.0) as u16,
            (p.y / self.cell_height).max(0.0) as u16,
        )
    }

    /// Field-local cells touched by `region` as `(col0, row0, col1, row1)`, ends
    /// exclusive. Never empty, so a sub-cell target still occupies one cell.
    pub fn cell_span(&self, region: Region) -> (u16, u16, u16, u16) {
        let col0 = (region.x / self.cell_width).floor().max(0.0) as u16;
        let row0 = (region.y / self.cell_height).floor().max(0.0) as u16;
        let col1 = ((region.right() / self.cell_width).ceil().max(0.0) as u16).max(col0 + 1);
        let row1 = ((region.bottom() / self.cell_height).ceil().max(0.0) as u16).max(row0 + 1);
        (col0, row0, col1, row1)
    }
}

const TRAIL_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::LightCyan,
    Color::Magenta,
    Color::LightMagenta,
    Color::Yellow,
    Color::LightBlue,
];

/// Draw the play field: spawn outline, grid, spray guide, targets and trail.
pub fn render_field(app: &App, field: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let dim = Style::default().add_modifier(Modifier::DIM);

    outline(app, field, session.spawn_region(), dim, buf);
    for cell in session.grid_cells() {
        outline(app, field, cell, dim.fg(Color::DarkGray), buf);
    }

    if session.mode() == Some(Mode::Spray) {
        render_spray(app, field, buf);
    } else {
        for target in session.targets() {
            render_target(app, field, target, buf);
        }
    }

    if session.config().cursor_trail {
        for p in &app.trail.particles {
            let (x, y) = (p.x as u16, p.y as u16);
            if !inside(field, x, y) {
                continue;
            }
            let color = TRAIL_COLORS[p.color_index % TRAIL_COLORS.len()];
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(p.symbol());
                cell.set_style(Style::default().fg(color));
            }
        }
    }
}

fn render_target(app: &App, field: Rect, target: &Target, buf: &mut Buffer) {
    let (col0, row0, col1, row1) = app.metrics.cell_span(target.bounds());
    let color = if target.hit { Color::Green } else { Color::Red };
    let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    let single = col1 - col0 == 1 && row1 - row0 == 1;

    for row in row0..row1 {
        for col in col0..col1 {
            let symbol = if single { '●' } else { '█' };
            put(field, col, row, symbol, style, buf);
        }
    }

    if let Some(label) = target.label {
        let (col, row) = app.metrics.cell_at(target.center());
        let label_style = Style::default()
            .fg(Color::White)
            .bg(color)
            .add_modifier(Modifier::BOLD);
        put(field, col, row, label, label_style, buf);
    }
}

/// Shots already fired are dimmed, the active shot stands out, the rest show the path.
fn render_spray(app: &App, field: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let Some(active) = session.spray_index() else {
        return;
    };
    for (i, target) in session.targets().iter().enumerate() {
        let (col, row) = app.metrics.cell_at(target.center());
        let (symbol, style) = if i == active {
            (
                '◉',
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else if i < active {
            ('∘', Style::default().fg(Color::DarkGray))
        } else {
            ('·', Style::default().fg(Color::Yellow))
        };
        // the active shot always wins a shared cell
        if i != active && app.metrics.cell_at(session.targets()[active].center()) == (col, row) {
            continue;
        }
        put(field, col, row, symbol, style, buf);
    }
}

fn outline(app: &App, field: Rect, region: Region, style: Style, buf: &mut Buffer) {
    if region.is_degenerate() {
        return;
    }
    let (col0, row0, col1, row1) = app.metrics.cell_span(region);
    let (last_col, last_row) = (col1 - 1, row1 - 1);
    for col in col0..col1 {
        put(field, col, row0, '─', style, buf);
        put(field, col, last_row, '─', style, buf);
    }
    for row in row0..row1 {
        put(field, col0, row, '│', style, buf);
        put(field, last_col, row, '│', style, buf);
    }
    put(field, col0, row0, '┌', style, buf);
    put(field, last_col, row0, '┐', style, buf);
    put(field, col0, last_row, '└', style, buf);
    put(field, last_col, last_row, '┘', style, buf);
}

fn inside(field: Rect, x: u16, y: u16) -> bool {
    x >= field.x && x < field.right() && y >= field.y && y < field.bottom()
}

/// Write one field-local cell, clipped to the field.
fn put(field: Rect, col: u16, row: u16, symbol: char, style: Style, buf: &mut Buffer) {
    let (x, y) = (field.x.saturating_add(col), field.y.saturating_add(row));
    if !inside(field, x, y) {
        return;
    }
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(symbol);
        cell.set_style(style);
    }
}

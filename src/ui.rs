pub mod canvas;
pub mod dashboard;
pub mod screen;

use flick::mode::Mode;
use flick::scoring::{format_accuracy, format_clock};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::{App, AppState};

/// Title row, stats row, readout row and the bottom border.
pub const HUD_HEIGHT: u16 = 4;

/// Split the terminal into the HUD and the play field below it.
pub fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HUD_HEIGHT), Constraint::Min(0)])
        .split(area);
    (chunks[0], chunks[1])
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Dashboard => dashboard::render_dashboard(self, area, buf),
            AppState::Playing => {
                let (hud, _) = split(area);
                render_hud(self, hud, buf);
                canvas::render_field(self, self.field, buf);
            }
        }
    }
}

fn render_hud(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let title = session.mode().map(|m| m.title()).unwrap_or_default();
    let stats = Line::from(vec![
        Span::styled(format_clock(session.elapsed_secs()), bold.fg(Color::Cyan)),
        Span::raw("  score "),
        Span::styled(session.score().to_string(), bold),
        Span::raw("  hits "),
        Span::styled(session.hits().to_string(), bold.fg(Color::Green)),
        Span::raw("  misses "),
        Span::styled(session.misses().to_string(), bold.fg(Color::Red)),
        Span::raw("  acc "),
        Span::styled(format!("{}%", format_accuracy(session.accuracy())), bold),
    ]);
    let readout = Line::from(vec![
        Span::styled(mode_readout(app), Style::default().fg(Color::Yellow)),
        Span::styled("   (esc) back  (q) quit", dim),
    ]);

    Paragraph::new(vec![stats, readout])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(Span::styled(format!(" {title} "), bold)),
        )
        .render(area, buf);
}

/// Mode-specific HUD text.
pub fn mode_readout(app: &App) -> String {
    let session = &app.session;
    let config = session.config();
    match session.mode() {
        Some(Mode::Spray) => match (session.spray_index(), session.recoil_pattern()) {
            (Some(i), Some(p)) => format!("shot {}/{}", i + 1, p.len()),
            _ => "measuring…".to_string(),
        },
        Some(Mode::Reaction) => match session.reaction_samples() {
            Some(s) if !s.is_empty() => format!(
                "last {}ms  best {}ms  avg {:.0}ms  σ {:.0}ms  ({} samples)",
                s.last().unwrap_or_default(),
                s.best().unwrap_or_default(),
                s.average().unwrap_or_default(),
                s.std_dev().unwrap_or_default(),
                s.len()
            ),
            _ if session.targets().is_empty() => "wait for it…".to_string(),
            _ => "click!".to_string(),
        },
        Some(Mode::Grid) => format!(
            "grid {0}×{0}  targets {1}/{2}",
            config.grid_size,
            session.targets().len(),
            session.max_concurrent()
        ),
        Some(Mode::Letter) | Some(Mode::LetterFugitive) => format!(
            "{} letters  targets {}",
            config.target_cap,
            session.targets().len()
        ),
        Some(Mode::FreeAim) | Some(Mode::Intensive) => format!(
            "area {}%  size {}  targets {}/{}",
            flick::geometry::effective_area_percent(
                session.mode().unwrap_or(Mode::FreeAim),
                config.area_percent
            ),
            config.target_size,
            session.targets().len(),
            session.max_concurrent()
        ),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use flick::config::FileConfigStore;
    use flick::runtime::ManualClock;
    use ratatui::{backend::TestBackend, Terminal};

    fn app(args: &[&str]) -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let mut argv = vec!["flick", "--seed", "7"];
        argv.extend_from_slice(args);
        let cli = Cli::parse_from(argv);
        let mut app = App::new(&cli, Box::new(store), Box::new(ManualClock::new(0)));
        app.resize(Rect::new(0, 0, 120, 48));
        (app, dir)
    }

    fn rendered(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_split_reserves_hud() {
        let (hud, field) = split(Rect::new(0, 0, 80, 24));
        assert_eq!(hud, Rect::new(0, 0, 80, HUD_HEIGHT));
        assert_eq!(field, Rect::new(0, HUD_HEIGHT, 80, 24 - HUD_HEIGHT));
    }

    #[test]
    fn test_dashboard_lists_every_mode() {
        let (app, _dir) = app(&[]);
        let text = rendered(&app, 120, 48);
        for mode in Mode::ALL {
            assert!(text.contains(mode.title()), "missing {}", mode.title());
        }
        assert!(text.contains("no matches yet"));
    }

    #[test]
    fn test_hud_shows_zeroed_stats() {
        let (app, _dir) = app(&["--mode", "free-aim"]);
        let text = rendered(&app, 120, 48);
        assert!(text.contains("00:00"));
        assert!(text.contains("acc 0.0%"));
        assert!(text.contains("area 100%"));
    }

    #[test]
    fn test_spray_readout() {
        let (app, _dir) = app(&["--mode", "spray"]);
        assert_eq!(mode_readout(&app), "shot 1/30");
        let text = rendered(&app, 120, 48);
        assert!(text.contains('◉'));
    }

    #[test]
    fn test_hud_draws_the_readout_row() {
        let (app, _dir) = app(&["--mode", "spray"]);
        let area = Rect::new(0, 0, 120, 48);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        let row = |y: u16| -> String { (0..120).map(|x| buffer[(x, y)].symbol()).collect() };

        assert!(row(0).contains("Recoil Spray"));
        assert!(row(1).contains("score 0"));
        assert!(row(2).contains("shot 1/30"));
        assert!(row(3).contains('─'));
    }

    #[test]
    fn test_reaction_readout_after_hits() {
        let (mut app, _dir) = app(&["--mode", "reaction"]);
        for latency in [300, 200] {
            let due = app.session.timer_due(flick::scheduler::TimerSlot::Spawn).unwrap();
            app.session.advance(due);
            let t = app.session.targets()[0].clone();
            app.session.click(due + latency, t.center(), Some(t.id));
        }
        let readout = mode_readout(&app);
        assert!(readout.starts_with("last 200ms  best 200ms  avg 250ms"), "{readout}");
        assert!(readout.ends_with("(2 samples)"));
    }

    #[test]
    fn test_grid_readout() {
        let (app, _dir) = app(&["--mode", "grid", "--grid", "6"]);
        assert_eq!(mode_readout(&app), "grid 6×6  targets 1/1");
    }

    #[test]
    fn test_reaction_readout_before_first_target() {
        let (app, _dir) = app(&["--mode", "reaction"]);
        assert!(matches!(
            mode_readout(&app).as_str(),
            "wait for it…" | "click!"
        ));
    }

    #[test]
    fn test_renders_through_terminal_backend() {
        let (mut app, _dir) = app(&["--mode", "letter"]);
        let backend = TestBackend::new(120, 48);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| crate::ui(&mut app, f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Letters"));
        let label = app.session.targets()[0].label.unwrap();
        assert!(text.contains(label));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let (mut app, _dir) = app(&["--mode", "grid"]);
        app.resize(Rect::new(0, 0, 10, 4));
        let _ = rendered(&app, 10, 4);
        app.resize(Rect::new(0, 0, 0, 0));
        let _ = rendered(&app, 0, 0);
    }
}

use crossterm::event::{KeyCode, KeyEvent};
use flick::mode::Mode;
use ratatui::Frame;

use crate::{App, AppState};

/// A UI Screen boundary: responsible for rendering and optional key handling
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
    /// Optional per-screen key handling. Returns true if the key was handled.
    fn on_key(&mut self, _key: KeyEvent, _app: &mut App) -> bool {
        false
    }
}

/// Mode picker
pub struct DashboardScreen;

impl Screen for DashboardScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        let count = Mode::ALL.len();
        match key.code {
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                app.start(Mode::ALL[idx]);
            }
            KeyCode::Up => app.selected = (app.selected + count - 1) % count,
            KeyCode::Down => app.selected = (app.selected + 1) % count,
            KeyCode::Enter => app.start(Mode::ALL[app.selected]),
            _ => return false,
        }
        true
    }
}

/// Running session: HUD plus play field
pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => {
                app.back();
                true
            }
            _ => false,
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Dashboard => Box::new(DashboardScreen),
        AppState::Playing => Box::new(GameScreen),
    }
}

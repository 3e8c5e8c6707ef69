mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use flick::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, ModeConfig, SpawnSpeed, TargetCap},
    logging,
    mode::Mode,
    runtime::{AppEvent, Clock, CrosstermEventSource, FixedTicker, MonotonicClock, Runner},
    scheduler::Millis,
    session::Session,
    sizing::TargetSize,
    trail::CursorTrail,
};
use log::{info, warn, LevelFilter};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use ui::{canvas::CellMetrics, screen::current_screen};

const TICK_RATE_MS: u64 = 33;

/// aim-training tui: click targets with your mouse across seven drill modes
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An aim-training TUI. Targets spawn under mode-specific rules (free aim, intensive, recoil spray, reaction time, grid, letters) and every hit, miss and second is scored. Requires a terminal with mouse support."
)]
pub struct Cli {
    /// skip the dashboard and start in this mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// spawn area as a percentage of the play field
    #[clap(short = 'a', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    area: Option<u8>,

    /// target size category
    #[clap(short = 'z', long, value_enum)]
    size: Option<TargetSize>,

    /// how often new targets spawn
    #[clap(short = 's', long, value_enum)]
    speed: Option<SpawnSpeed>,

    /// grid dimension for grid mode (n x n)
    #[clap(short = 'g', long, value_parser = clap::value_parser!(u8).range(4..=8))]
    grid: Option<u8>,

    /// keep a single target on screen in the letter modes
    #[clap(long)]
    single: bool,

    /// draw a fading trail behind the mouse pointer
    #[clap(long)]
    trail: bool,

    /// seed every random choice for a reproducible session
    #[clap(long)]
    seed: Option<u64>,

    /// write debug logs to the default log file
    #[clap(long)]
    log: bool,

    /// write debug logs to this file
    #[clap(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Layer command line overrides on top of the stored preferences.
    fn apply(&self, mut config: ModeConfig) -> ModeConfig {
        if let Some(area) = self.area {
            config.area_percent = area;
        }
        if let Some(size) = self.size {
            config.target_size = size;
        }
        if let Some(speed) = self.speed {
            config.spawn_speed = speed;
        }
        if let Some(grid) = self.grid {
            config.grid_size = usize::from(grid);
        }
        if self.single {
            config.target_cap = TargetCap::Single;
        }
        if self.trail {
            config.cursor_trail = true;
        }
        config.sanitized()
    }

    fn log_path(&self) -> Option<PathBuf> {
        match (&self.log_file, self.log) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => AppDirs::log_path(),
            (None, false) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub session: Session,
    pub state: AppState,
    /// Highlighted dashboard entry
    pub selected: usize,
    pub metrics: CellMetrics,
    /// Play field in terminal cells
    pub field: Rect,
    pub trail: CursorTrail,
    clock: Box<dyn Clock>,
    store: Box<dyn ConfigStore>,
    last_tick: Millis,
}

impl App {
    pub fn new(cli: &Cli, store: Box<dyn ConfigStore>, clock: Box<dyn Clock>) -> Self {
        let config = cli.apply(store.load());
        let session = match cli.seed {
            Some(seed) => Session::with_seed(config, seed),
            None => Session::new(config),
        };
        let last_tick = clock.now_ms();

        let mut app = Self {
            session,
            state: AppState::Dashboard,
            selected: 0,
            metrics: CellMetrics::default(),
            field: Rect::default(),
            trail: CursorTrail::new(),
            clock,
            store,
            last_tick,
        };
        if let Some(mode) = cli.mode {
            app.start(mode);
        }
        app
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    /// Re-measure the play field after the terminal changed size.
    pub fn resize(&mut self, area: Rect) {
        let (_, field) = ui::split(area);
        self.field = field;
        let now = self.now();
        self.session.set_viewport(self.metrics.viewport(field), now);
    }

    pub fn start(&mut self, mode: Mode) {
        let now = self.now();
        self.session.start(mode, now);
        self.state = AppState::Playing;
        self.selected = Mode::ALL.iter().position(|m| *m == mode).unwrap_or(0);
        self.trail.clear();
    }

    /// Return to the dashboard.
    pub fn back(&mut self) {
        let now = self.now();
        self.session.stop(now);
        self.state = AppState::Dashboard;
        self.trail.clear();
    }

    pub fn on_tick(&mut self) {
        let now = self.now();
        self.session.advance(now);
        let dt = now.saturating_sub(self.last_tick) as f64 / 1000.0;
        self.last_tick = now;
        self.trail
            .update(dt, self.field.right(), self.field.bottom());
    }

    /// Field-local cell under an absolute terminal position.
    fn field_cell(&self, column: u16, row: u16) -> Option<(u16, u16)> {
        let f = self.field;
        if column < f.x || column >= f.right() || row < f.y || row >= f.bottom() {
            return None;
        }
        Some((column - f.x, row - f.y))
    }

    pub fn on_click(&mut self, column: u16, row: u16) {
        if self.state != AppState::Playing {
            return;
        }
        let Some((col, row_in_field)) = self.field_cell(column, row) else {
            return;
        };
        let point = self.metrics.cell_center(col, row_in_field);
        let target = self
            .session
            .target_within(self.metrics.cell_region(col, row_in_field));

        let now = self.now();
        let outcome = self.session.click(now, point, target);
        if outcome.is_hit() && self.session.config().cursor_trail {
            self.trail.burst(column, row);
        }
    }

    pub fn on_move(&mut self, column: u16, row: u16) {
        if self.state == AppState::Playing
            && self.session.config().cursor_trail
            && self.field_cell(column, row).is_some()
        {
            self.trail.pointer_moved(column, row);
        }
    }

    /// Change a setting for the running session and persist it.
    pub fn update_config(&mut self, change: impl FnOnce(&mut ModeConfig)) {
        let mut config = *self.session.config();
        change(&mut config);
        let now = self.now();
        self.session.set_config(config, now);

        if let Err(e) = self.store.save(self.session.config()) {
            warn!("could not save settings: {e}");
        }
        if !self.session.config().cursor_trail {
            self.trail.clear();
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }
        if key.code == KeyCode::Char('q') {
            return Flow::Quit;
        }

        let mut screen = current_screen(&self.state);
        if screen.on_key(key, self) {
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Char('a') => self.update_config(|c| c.area_percent = c.next_area()),
            KeyCode::Char('z') => self.update_config(|c| c.target_size = c.target_size.next()),
            KeyCode::Char('s') => self.update_config(|c| c.spawn_speed = c.spawn_speed.next()),
            KeyCode::Char('g') => self.update_config(|c| c.grid_size = c.next_grid()),
            KeyCode::Char('m') => self.update_config(|c| {
                c.target_cap = match c.target_cap {
                    TargetCap::Single => TargetCap::Multiple,
                    TargetCap::Multiple => TargetCap::Single,
                }
            }),
            KeyCode::Char('t') => self.update_config(|c| c.cursor_trail = !c.cursor_trail),
            _ => {}
        }
        Flow::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_path() {
        logging::init(&path, LevelFilter::Debug)?;
        info!("logging to {}", path.display());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(
        &cli,
        Box::new(FileConfigStore::new()),
        Box::new(MonotonicClock::new()),
    );
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {
                let size = terminal.size()?;
                app.resize(Rect::new(0, 0, size.width, size.height));
            }
            AppEvent::Click { column, row } => app.on_click(column, row),
            AppEvent::Move { column, row } => app.on_move(column, row),
            AppEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
        }
    }

    let now = app.now();
    app.session.stop(now);
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let screen = current_screen(&app.state);
    screen.render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use flick::runtime::ManualClock;
    use flick::scheduler::TimerSlot;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct Harness {
        app: App,
        clock: Rc<ManualClock>,
        store: FileConfigStore,
        _dir: TempDir,
    }

    fn harness(args: &[&str]) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let clock = Rc::new(ManualClock::new(0));
        let mut argv = vec!["flick", "--seed", "11"];
        argv.extend_from_slice(args);
        let cli = Cli::parse_from(argv);
        let mut app = App::new(&cli, Box::new(store.clone()), Box::new(clock.clone()));
        app.resize(Rect::new(0, 0, 120, 48));
        Harness {
            app,
            clock,
            store,
            _dir: dir,
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    /// Absolute terminal cell over a target's center.
    fn cell_of(app: &App, id: u64) -> (u16, u16) {
        let t = app.session.targets().iter().find(|t| t.id == id).unwrap();
        let (col, row) = app.metrics.cell_at(t.center());
        (app.field.x + col, app.field.y + row)
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["flick"]);
        assert_eq!(cli.mode, None);
        assert_eq!(cli.area, None);
        assert!(!cli.single);
        assert!(!cli.trail);
        assert_eq!(cli.log_path(), None);
        assert_eq!(cli.apply(ModeConfig::default()), ModeConfig::default());
    }

    #[test]
    fn test_cli_overrides_stored_config() {
        let cli = Cli::parse_from([
            "flick", "-a", "40", "-z", "tiny", "-s", "insane", "-g", "7", "--single", "--trail",
        ]);
        let config = cli.apply(ModeConfig::default());
        assert_eq!(config.area_percent, 40);
        assert_eq!(config.target_size, TargetSize::Tiny);
        assert_eq!(config.spawn_speed, SpawnSpeed::Insane);
        assert_eq!(config.grid_size, 7);
        assert_eq!(config.target_cap, TargetCap::Single);
        assert!(config.cursor_trail);
    }

    #[test]
    fn test_cli_rejects_out_of_range() {
        assert!(Cli::try_parse_from(["flick", "--grid", "3"]).is_err());
        assert!(Cli::try_parse_from(["flick", "--grid", "9"]).is_err());
        assert!(Cli::try_parse_from(["flick", "--area", "0"]).is_err());
        assert!(Cli::try_parse_from(["flick", "--mode", "sniper"]).is_err());
        assert!(Cli::try_parse_from(["flick", "--mode", "letter-fugitive"]).is_ok());
    }

    #[test]
    fn test_cli_log_path() {
        let cli = Cli::parse_from(["flick", "--log-file", "/tmp/flick-test.log"]);
        assert_eq!(cli.log_path(), Some(PathBuf::from("/tmp/flick-test.log")));
    }

    #[test]
    fn test_starts_on_dashboard() {
        let h = harness(&[]);
        assert_eq!(h.app.state, AppState::Dashboard);
        assert!(!h.app.session.is_running());
        assert_eq!(h.app.field, Rect::new(0, ui::HUD_HEIGHT, 120, 48 - ui::HUD_HEIGHT));
    }

    #[test]
    fn test_dashboard_keys_start_modes() {
        let mut h = harness(&[]);
        h.app.on_key(key('5'));
        assert_eq!(h.app.state, AppState::Playing);
        assert_eq!(h.app.session.mode(), Some(Mode::Grid));

        h.app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(h.app.state, AppState::Dashboard);
        assert_eq!(h.app.session.pending_timers(), 0);

        h.app.on_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        h.app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(h.app.session.mode(), Some(Mode::Letter));
    }

    #[test]
    fn test_arrow_selection_wraps() {
        let mut h = harness(&[]);
        h.app.on_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        assert_eq!(h.app.selected, Mode::ALL.len() - 1);
        h.app.on_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        assert_eq!(h.app.selected, 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut h = harness(&["--mode", "free-aim"]);
        assert_eq!(h.app.on_key(key('q')), Flow::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(h.app.on_key(ctrl_c), Flow::Quit);
        assert_eq!(h.app.on_key(key('x')), Flow::Continue);
    }

    #[test]
    fn test_click_on_target_scores() {
        let mut h = harness(&["--mode", "free-aim"]);
        let id = h.app.session.targets()[0].id;
        let (col, row) = cell_of(&h.app, id);
        h.clock.advance(200);
        h.app.on_click(col, row);
        assert_eq!(h.app.session.hits(), 1);
        assert_eq!(h.app.session.score(), 10);
    }

    #[test]
    fn test_click_on_hud_is_ignored() {
        let mut h = harness(&["--mode", "free-aim"]);
        h.app.on_click(5, 0);
        assert_eq!(h.app.session.tally(), Default::default());
    }

    #[test]
    fn test_click_on_empty_space_is_a_miss() {
        let mut h = harness(&["--mode", "intensive"]);
        // corner of the field is far outside the 5% spawn area
        h.app.on_click(0, ui::HUD_HEIGHT);
        assert_eq!(h.app.session.misses(), 1);
    }

    #[test]
    fn test_ticks_drive_the_session_clock() {
        let mut h = harness(&["--mode", "grid"]);
        for _ in 0..30 {
            h.clock.advance(100);
            h.app.on_tick();
        }
        assert_eq!(h.app.session.elapsed_secs(), 3);
        assert_eq!(h.app.session.max_concurrent(), 2);
    }

    #[test]
    fn test_setting_keys_persist() {
        let mut h = harness(&[]);
        h.app.on_key(key('a'));
        h.app.on_key(key('s'));
        h.app.on_key(key('g'));
        h.app.on_key(key('m'));
        h.app.on_key(key('t'));
        let saved = h.store.load();
        assert_eq!(saved.area_percent, 80);
        assert_eq!(saved.spawn_speed, SpawnSpeed::Fast);
        assert_eq!(saved.grid_size, 6);
        assert_eq!(saved.target_cap, TargetCap::Single);
        assert!(saved.cursor_trail);
        assert_eq!(*h.app.session.config(), saved);
    }

    #[test]
    fn test_speed_key_rearms_running_ticker() {
        let mut h = harness(&["--mode", "free-aim"]);
        h.clock.set(100);
        h.app.on_key(key('s'));
        assert_eq!(h.app.session.timer_due(TimerSlot::Spawn), Some(400));
    }

    #[test]
    fn test_trail_follows_pointer_only_when_enabled() {
        let mut h = harness(&["--mode", "free-aim"]);
        h.app.on_move(10, 10);
        assert!(!h.app.trail.is_active());

        h.app.on_key(key('t'));
        h.app.on_move(10, 10);
        h.app.on_move(11, 10);
        assert_eq!(h.app.trail.particles.len(), 2);

        h.app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!h.app.trail.is_active());
    }

    #[test]
    fn test_resize_remeasures_viewport() {
        let mut h = harness(&["--mode", "spray"]);
        assert_eq!(h.app.session.targets().len(), 30);
        h.app.resize(Rect::new(0, 0, 60, 20));
        assert_eq!(
            h.app.session.viewport(),
            flick::geometry::Viewport::new(600.0, 340.0)
        );
    }
}

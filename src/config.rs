use crate::app_dirs::AppDirs;
use crate::scheduler::Millis;
use crate::sizing::TargetSize;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const AREA_CHOICES: [u8; 5] = [100, 80, 60, 40, 20];
pub const MIN_GRID: usize = 4;
pub const MAX_GRID: usize = 8;

/// How often the spawn ticker fires.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SpawnSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
    Insane,
}

impl SpawnSpeed {
    pub fn interval_ms(&self) -> Millis {
        match self {
            SpawnSpeed::Slow => 800,
            SpawnSpeed::Normal => 500,
            SpawnSpeed::Fast => 300,
            SpawnSpeed::Insane => 150,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SpawnSpeed::Slow => SpawnSpeed::Normal,
            SpawnSpeed::Normal => SpawnSpeed::Fast,
            SpawnSpeed::Fast => SpawnSpeed::Insane,
            SpawnSpeed::Insane => SpawnSpeed::Slow,
        }
    }
}

/// Whether letter modes keep a single target on screen.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TargetCap {
    Single,
    #[default]
    Multiple,
}

/// User-adjustable options. Read by geometry, sizing and spawning; never written by
/// the scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModeConfig {
    /// Spawn area as a percentage of the viewport, for modes that do not pin it.
    pub area_percent: u8,
    pub target_size: TargetSize,
    pub spawn_speed: SpawnSpeed,
    /// Grid dimension `n` for an `n x n` grid.
    pub grid_size: usize,
    pub target_cap: TargetCap,
    pub cursor_trail: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            area_percent: 100,
            target_size: TargetSize::Large,
            spawn_speed: SpawnSpeed::Normal,
            grid_size: 5,
            target_cap: TargetCap::Multiple,
            cursor_trail: false,
        }
    }
}

impl ModeConfig {
    /// Clamp out-of-range values rather than rejecting them.
    pub fn sanitized(mut self) -> Self {
        self.area_percent = self.area_percent.clamp(1, 100);
        self.grid_size = self.grid_size.clamp(MIN_GRID, MAX_GRID);
        self
    }

    pub fn next_area(&self) -> u8 {
        let idx = AREA_CHOICES
            .iter()
            .position(|&a| a == self.area_percent)
            .map_or(0, |i| (i + 1) % AREA_CHOICES.len());
        AREA_CHOICES[idx]
    }

    pub fn next_grid(&self) -> usize {
        if self.grid_size >= MAX_GRID {
            MIN_GRID
        } else {
            self.grid_size + 1
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> ModeConfig;
    fn save(&self, cfg: &ModeConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("flick_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> ModeConfig {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return ModeConfig::default(),
        };
        match serde_json::from_slice::<ModeConfig>(&bytes) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                warn!(
                    "ignoring unreadable config at {}: {}",
                    self.path.display(),
                    e
                );
                ModeConfig::default()
            }
        }
    }

    fn save(&self, cfg: &ModeConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = ModeConfig::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("flick").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = ModeConfig {
            area_percent: 40,
            target_size: TargetSize::Micro,
            spawn_speed: SpawnSpeed::Insane,
            grid_size: 7,
            target_cap: TargetCap::Single,
            cursor_trail: true,
        };
        store.save(&cfg).unwrap();
        assert!(path.exists());
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), ModeConfig::default());
    }

    #[test]
    fn garbage_file_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), ModeConfig::default());
    }

    #[test]
    fn partial_file_fills_defaults_and_clamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "grid_size": 42, "spawn_speed": "fast" }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.grid_size, MAX_GRID);
        assert_eq!(cfg.spawn_speed, SpawnSpeed::Fast);
        assert_eq!(cfg.area_percent, 100);
    }

    #[test]
    fn cycles_wrap_around() {
        let cfg = ModeConfig::default();
        assert_eq!(cfg.next_area(), 80);
        let cfg = ModeConfig {
            area_percent: 20,
            grid_size: 8,
            ..cfg
        };
        assert_eq!(cfg.next_area(), 100);
        assert_eq!(cfg.next_grid(), 4);
        assert_eq!(SpawnSpeed::Insane.next(), SpawnSpeed::Slow);
        assert_eq!(SpawnSpeed::Fast.interval_ms(), 300);
    }
}

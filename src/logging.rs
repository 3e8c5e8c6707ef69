use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Open `path` for appending, creating its directory first.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// A logger writing plain records into `file`. The terminal belongs to the TUI, so
/// nothing goes to stdout or stderr.
pub fn file_builder(file: File, level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(file)));
    builder
}

/// Install the file logger globally.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let file = open_log_file(path)?;
    file_builder(file, level).try_init()?;
    Ok(())
}

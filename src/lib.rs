// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod geometry;
pub mod hit;
pub mod logging;
pub mod mode;
pub mod reaction;
pub mod recoil;
pub mod runtime;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod sizing;
pub mod spawner;
pub mod target;
pub mod trail;

pub use hit::ClickOutcome;
pub use session::Session;

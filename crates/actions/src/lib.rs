//! OS actions for Steward.
//!
//! The command router reaches the desktop through the `Launcher` and
//! `MediaControl` traits from `steward-core`; this crate supplies the
//! process-spawning implementations and the app-name table.

pub mod apps;
pub mod launcher;
pub mod media;

pub use apps::AppTable;
pub use launcher::ProcessLauncher;
pub use media::DesktopMedia;

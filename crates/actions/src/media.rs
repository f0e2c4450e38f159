//! Desktop media control — the fixed `play_music` / `stop_music` actions.
//!
//! "Play" opens the user's music folder in the default handler; "stop"
//! force-closes a known list of players. Neither waits on the player.

use async_trait::async_trait;
use std::path::PathBuf;
use steward_core::MediaControl;
use steward_core::error::ActionError;
use tokio::process::Command;
use tracing::{debug, info};
use crate::launcher::{opener, spawn_detached};

pub struct DesktopMedia {
    music_dir: PathBuf,
    players: Vec<String>,
}

impl DesktopMedia {
    pub fn new(music_dir: impl Into<PathBuf>, players: Vec<String>) -> Self {
        Self {
            music_dir: music_dir.into(),
            players,
        }
    }

    /// `~/Music` and the usual players for this platform.
    pub fn with_defaults() -> Self {
        Self::new(home_dir().join("Music"), default_players())
    }

    fn kill_command(player: &str) -> Command {
        if cfg!(target_os = "windows") {
            let mut cmd = Command::new("taskkill");
            cmd.args(["/im", player, "/f"]);
            cmd
        } else {
            let mut cmd = Command::new("pkill");
            cmd.args(["-x", player]);
            cmd
        }
    }
}

#[async_trait]
impl MediaControl for DesktopMedia {
    async fn play(&self) -> Result<(), ActionError> {
        if !self.music_dir.is_dir() {
            return Err(ActionError::NotFound(format!(
                "music folder {}",
                self.music_dir.display()
            )));
        }
        let dir = self.music_dir.to_string_lossy();
        spawn_detached(opener(&dir), &dir)
    }

    async fn stop(&self) -> Result<(), ActionError> {
        for player in &self.players {
            let status = Self::kill_command(player)
                .stdin(std::process::Stdio::null())
                .stdout(std::process::Stdio::null())
                .stderr(std::process::Stdio::null())
                .status()
                .await
                .map_err(|e| ActionError::SpawnFailed {
                    target: player.clone(),
                    reason: e.to_string(),
                })?;

            // A non-zero exit just means the player was not running
            if status.success() {
                info!(player = %player, "Stopped music player");
            } else {
                debug!(player = %player, "Player not running");
            }
        }
        Ok(())
    }
}

fn default_players() -> Vec<String> {
    let players: &[&str] = if cfg!(target_os = "windows") {
        &["wmplayer.exe", "vlc.exe"]
    } else if cfg!(target_os = "macos") {
        &["Music", "VLC"]
    } else {
        &["vlc", "rhythmbox"]
    };
    players.iter().map(|p| p.to_string()).collect()
}

fn home_dir() -> PathBuf {
    let var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

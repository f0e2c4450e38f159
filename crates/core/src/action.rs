//! OS actions — launching programs and controlling media playback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ActionError;

/// What an application name resolves to.
///
/// In TOML: `notepad = { program = "notepad.exe" }` or
/// `youtube = { url = "https://youtube.com" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchTarget {
    /// An executable name or path
    Program(String),
    /// A URL handed to the platform opener
    Url(String),
}

impl std::fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Program(p) => write!(f, "{p}"),
            Self::Url(u) => write!(f, "{u}"),
        }
    }
}

/// Starts programs without waiting for them.
///
/// Only an immediate spawn failure is reported; what the program does after
/// it starts is not observed.
pub trait Launcher: Send + Sync {
    fn launch(&self, target: &LaunchTarget) -> std::result::Result<(), ActionError>;
}

/// Fixed music actions.
#[async_trait]
pub trait MediaControl: Send + Sync {
    async fn play(&self) -> std::result::Result<(), ActionError>;

    async fn stop(&self) -> std::result::Result<(), ActionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_target_is_externally_tagged() {
        let target: LaunchTarget = serde_json::from_str(r#"{"program":"notepad.exe"}"#).unwrap();
        assert_eq!(target, LaunchTarget::Program("notepad.exe".into()));
        assert_eq!(target.to_string(), "notepad.exe");

        let url: LaunchTarget = serde_json::from_str(r#"{"url":"https://example.com"}"#).unwrap();
        assert!(matches!(url, LaunchTarget::Url(_)));
    }
}

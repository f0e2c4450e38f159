//! Speech collaborators — the boundary to speech-to-text and text-to-speech.
//!
//! Neither side is part of the decision layer. A [`Listener`] hands the core
//! one completed utterance at a time; a [`Speaker`] receives reply text and
//! nothing comes back.

use async_trait::async_trait;
use tokio::sync::mpsc;
use crate::error::{ChannelError, SpeechError};

/// Text-to-speech capability.
#[async_trait]
pub trait Speaker: Send + Sync {
    /// Human-readable engine name (e.g., "console", "espeak").
    fn name(&self) -> &str;

    /// Speak `text` to the user.
    async fn speak(&self, text: &str) -> std::result::Result<(), SpeechError>;
}

/// Speech-to-text source.
///
/// `listen` starts recognition and returns a receiver that yields one
/// string per completed utterance. The stream ends when the source closes;
/// it cannot be restarted.
#[async_trait]
pub trait Listener: Send + Sync {
    fn name(&self) -> &str;

    async fn listen(&self) -> std::result::Result<mpsc::Receiver<String>, ChannelError>;
}

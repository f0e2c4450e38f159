//! Text-to-speech outputs.
//!
//! - [`ConsoleSpeaker`] prints `<Name>: <text>` to stdout
//! - [`CommandSpeaker`] pipes text through a TTS command (`espeak-ng`, `say`)
//! - [`SpeakerChain`] tries several speakers in order; the first success wins

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use steward_config::SpeechConfig;
use steward_core::Speaker;
use steward_core::error::SpeechError;
use tokio::process::Command;
use tracing::{debug, warn};

/// Prints replies to the terminal.
pub struct ConsoleSpeaker {
    label: String,
}

impl ConsoleSpeaker {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn line(&self, text: &str) -> String {
        format!("{}: {text}", self.label)
    }
}

#[async_trait]
impl Speaker for ConsoleSpeaker {
    fn name(&self) -> &str {
        "console"
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        println!("{}", self.line(text));
        Ok(())
    }
}

/// Speaks through an external TTS program that takes the text as its last argument.
pub struct CommandSpeaker {
    program: String,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    fn name(&self) -> &str {
        &self.program
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let status = Command::new(&self.program)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::EngineNotFound(self.program.clone())
                } else {
                    SpeechError::Failed {
                        engine: self.program.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Failed {
                engine: self.program.clone(),
                reason: format!("exit code {}", status.code().unwrap_or(-1)),
            })
        }
    }
}

/// A prioritized list of speakers.
///
/// Markdown emphasis (`*`) is stripped before speaking. With a transcript
/// label set, every reply is also printed, whether or not an engine spoke it.
pub struct SpeakerChain {
    speakers: Vec<Arc<dyn Speaker>>,
    transcript: Option<ConsoleSpeaker>,
}

impl SpeakerChain {
    pub fn new(speakers: Vec<Arc<dyn Speaker>>) -> Self {
        Self {
            speakers,
            transcript: None,
        }
    }

    /// One [`CommandSpeaker`] per configured engine, in order.
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self::new(
            config
                .engines
                .iter()
                .map(|engine| Arc::new(CommandSpeaker::new(engine)) as Arc<dyn Speaker>)
                .collect(),
        )
    }

    pub fn with_transcript(mut self, label: impl Into<String>) -> Self {
        self.transcript = Some(ConsoleSpeaker::new(label));
        self
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}

#[async_trait]
impl Speaker for SpeakerChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let text = text.replace('*', "");
        if text.trim().is_empty() {
            return Ok(());
        }

        if let Some(ref transcript) = self.transcript {
            transcript.speak(&text).await?;
        }

        for speaker in &self.speakers {
            match speaker.speak(&text).await {
                Ok(()) => {
                    debug!(engine = speaker.name(), "Spoke reply");
                    return Ok(());
                }
                Err(e) => {
                    warn!(engine = speaker.name(), error = %e, "Speech engine failed, trying next");
                }
            }
        }

        Err(SpeechError::NoEngine)
    }
}

//! CLI listener — typed input stands in for speech recognition.
//!
//! Each non-empty line is one utterance. Used for `steward chat`.

use async_trait::async_trait;
use std::sync::Mutex;
use steward_core::Listener;
use steward_core::error::ChannelError;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

type LineSource = Box<dyn AsyncBufRead + Send + Unpin>;

/// Reads utterances line by line from stdin (or any buffered reader).
pub struct CliListener {
    source: Mutex<Option<LineSource>>,
}

impl CliListener {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(io::stdin()))
    }

    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        Self {
            source: Mutex::new(Some(Box::new(reader))),
        }
    }
}

impl Default for CliListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for CliListener {
    fn name(&self) -> &str {
        "cli"
    }

    async fn listen(&self) -> Result<mpsc::Receiver<String>, ChannelError> {
        let source = self
            .source
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .ok_or_else(|| ChannelError::ConnectionLost("input already consumed".into()))?;

        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut lines = source.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!("Input closed");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read input");
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }
}

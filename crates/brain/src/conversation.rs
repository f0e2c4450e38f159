//! The conversation loop: listen, answer, speak, until exit.
//!
//! Each turn runs on its own task. An interrupt during a turn discards that
//! turn's reply (the task itself runs to completion); an interrupt while
//! waiting for input ends the loop.

use std::sync::Arc;
use steward_core::error::ChannelError;
use steward_core::{Listener, Speaker};
use tokio::sync::mpsc;
use tracing::{info, warn};
use crate::assistant::Assistant;

const TURN_FAILED_REPLY: &str = "Something went wrong. Recovering.";

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// The user said exit
    Terminated,
    /// The listener closed
    InputClosed,
    /// Interrupted while idle
    Interrupted,
}

pub async fn run_loop(
    listener: &dyn Listener,
    speaker: &dyn Speaker,
    assistant: Arc<Assistant>,
    mut interrupts: mpsc::Receiver<()>,
) -> Result<LoopEnd, ChannelError> {
    let mut utterances = listener.listen().await?;
    info!(listener = listener.name(), "Listening");

    loop {
        let text = tokio::select! {
            text = utterances.recv() => match text {
                Some(text) => text,
                None => return Ok(LoopEnd::InputClosed),
            },
            Some(()) = interrupts.recv() => return Ok(LoopEnd::Interrupted),
        };

        let turn = {
            let assistant = assistant.clone();
            tokio::spawn(async move { assistant.handle_text(&text).await })
        };

        let outcome = tokio::select! {
            joined = turn => match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Turn failed");
                    speak(speaker, TURN_FAILED_REPLY).await;
                    continue;
                }
            },
            Some(()) = interrupts.recv() => {
                info!("Turn interrupted; reply discarded");
                continue;
            }
        };

        speak(speaker, outcome.text()).await;
        if outcome.is_terminate() {
            return Ok(LoopEnd::Terminated);
        }
    }
}

async fn speak(speaker: &dyn Speaker, text: &str) {
    if let Err(e) = speaker.speak(text).await {
        warn!(speaker = speaker.name(), error = %e, "Could not speak reply");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{DispatchSession, Dispatcher};
    use crate::router::{CommandRouter, SHUTDOWN_REPLY};
    use crate::templates::ResponseTemplates;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use steward_actions::{AppTable, DesktopMedia, ProcessLauncher};
    use steward_core::error::SpeechError;
    use steward_core::{FixedProbe, ModelTier, TierOutcome, TierSet};

    /// Yields a fixed list of utterances, then closes.
    struct ScriptedListener(Vec<&'static str>);

    #[async_trait]
    impl Listener for ScriptedListener {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn listen(&self) -> Result<mpsc::Receiver<String>, ChannelError> {
            let (tx, rx) = mpsc::channel(self.0.len().max(1));
            for line in &self.0 {
                let _ = tx.send(line.to_string()).await;
            }
            Ok(rx)
        }
    }

    /// Holds the input open without sending anything.
    struct SilentListener(Mutex<Option<mpsc::Sender<String>>>);

    #[async_trait]
    impl Listener for SilentListener {
        fn name(&self) -> &str {
            "silent"
        }

        async fn listen(&self) -> Result<mpsc::Receiver<String>, ChannelError> {
            let (tx, rx) = mpsc::channel(1);
            *self.0.lock().unwrap() = Some(tx);
            Ok(rx)
        }
    }

    #[derive(Default)]
    struct Transcript(Mutex<Vec<String>>);

    #[async_trait]
    impl Speaker for Transcript {
        fn name(&self) -> &str {
            "transcript"
        }

        async fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct SlowTier(Duration);

    #[async_trait]
    impl ModelTier for SlowTier {
        fn name(&self) -> &str {
            "slow"
        }

        async fn invoke(&self, prompt: &str) -> TierOutcome {
            tokio::time::sleep(self.0).await;
            TierOutcome::reply(format!("re: {prompt}"))
        }
    }

    fn assistant(delay: Duration) -> Arc<Assistant> {
        let tier = Arc::new(SlowTier(delay));
        let dispatcher = Dispatcher::new(
            TierSet::new(tier.clone(), tier.clone(), tier),
            Arc::new(FixedProbe(false)),
            DispatchSession::shared(),
            "prime",
        );
        Arc::new(Assistant::new(CommandRouter::new(
            Arc::new(dispatcher),
            Arc::new(ResponseTemplates::builtin()),
            AppTable::new(),
            Arc::new(ProcessLauncher::new()),
            Arc::new(DesktopMedia::new("/nonexistent", vec![])),
        )))
    }

    #[tokio::test]
    async fn exit_ends_the_loop() {
        let listener = ScriptedListener(vec!["hello", "exit", "never answered"]);
        let speaker = Transcript::default();
        let (_tx, rx) = mpsc::channel(1);

        let end = run_loop(&listener, &speaker, assistant(Duration::ZERO), rx)
            .await
            .unwrap();

        assert_eq!(end, LoopEnd::Terminated);
        assert_eq!(*speaker.0.lock().unwrap(), vec!["re: hello", SHUTDOWN_REPLY]);
    }

    #[tokio::test]
    async fn closed_input_ends_the_loop() {
        let listener = ScriptedListener(vec!["hi"]);
        let speaker = Transcript::default();
        let (_tx, rx) = mpsc::channel(1);

        let end = run_loop(&listener, &speaker, assistant(Duration::ZERO), rx)
            .await
            .unwrap();
        assert_eq!(end, LoopEnd::InputClosed);
        assert_eq!(speaker.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn interrupt_discards_in_flight_turn() {
        let listener = ScriptedListener(vec!["slow question", "bye"]);
        let speaker = Transcript::default();
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(()).await;
            // Keep the sender alive until the loop is done
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let end = run_loop(&listener, &speaker, assistant(Duration::from_millis(500)), rx)
            .await
            .unwrap();

        assert_eq!(end, LoopEnd::Terminated);
        assert_eq!(*speaker.0.lock().unwrap(), vec![SHUTDOWN_REPLY]);
    }

    #[tokio::test]
    async fn interrupt_while_idle_stops() {
        let listener = SilentListener(Mutex::new(None));
        let speaker = Transcript::default();
        let (tx, rx) = mpsc::channel(1);
        tx.send(()).await.unwrap();

        let end = run_loop(&listener, &speaker, assistant(Duration::ZERO), rx)
            .await
            .unwrap();
        assert_eq!(end, LoopEnd::Interrupted);
        assert!(speaker.0.lock().unwrap().is_empty());
    }
}

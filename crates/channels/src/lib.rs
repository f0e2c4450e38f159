//! Input and output channels for Steward.
//!
//! Channels sit at the edge of the decision layer: a `Listener` turns the
//! outside world into utterances and a `Speaker` turns replies back into
//! output. Available implementations:
//! - **CLI** — typed lines from stdin as utterances
//! - **Console** — replies printed to stdout
//! - **Command TTS** — replies spoken through `espeak-ng`, `espeak` or `say`

pub mod cli;
pub mod speech;

pub use cli::CliListener;
pub use speech::{CommandSpeaker, ConsoleSpeaker, SpeakerChain};

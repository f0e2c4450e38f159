//! The decision layer of Steward.
//!
//! Every utterance goes through the same pipeline:
//!
//! 1. **Classify** the text into an intent (rule-based, no I/O)
//! 2. **Route** the intent: deterministic intents run a handler
//! 3. **Dispatch** conversational intents to the language-model tiers,
//!    falling back Primary → Secondary → Offline
//! 4. **Reply** with text, or a terminate signal for `exit`

pub mod assistant;
pub mod classifier;
pub mod conversation;
pub mod dispatcher;
pub mod router;
pub mod templates;

pub use assistant::Assistant;
pub use classifier::classify;
pub use conversation::{LoopEnd, run_loop};
pub use dispatcher::{DispatchSession, Dispatcher, Reply, ReplySource};
pub use router::{CommandRouter, RouteOutcome};
pub use templates::ResponseTemplates;

//! # Steward Core
//!
//! Domain types, traits, and error definitions for the Steward assistant.
//! This crate has **no framework dependencies**: it defines the model that
//! every other crate implements against.
//!
//! ## Design
//!
//! Every external collaborator is a trait here and every implementation lives
//! in its own crate:
//! - [`ModelTier`] — one language-model backend (online or offline)
//! - [`ConnectivityProbe`] — the online/offline decision
//! - [`Speaker`] / [`Listener`] — text-to-speech and speech-to-text
//! - [`Launcher`] / [`MediaControl`] — OS-level actions
//!
//! This keeps the decision layer testable with scripted stand-ins.

pub mod action;
pub mod error;
pub mod intent;
pub mod probe;
pub mod speech;
pub mod tier;

// Re-export key types at crate root for ergonomics
pub use action::{LaunchTarget, Launcher, MediaControl};
pub use error::{ActionError, ChannelError, Error, Result, SpeechError, TierError};
pub use intent::{Intent, IntentKind};
pub use probe::{ConnectivityProbe, FixedProbe};
pub use speech::{Listener, Speaker};
pub use tier::{ModelTier, TierOutcome, TierSet};

//! Model tier and connectivity probe implementations for Steward.
//!
//! All tiers implement `steward_core::ModelTier`. [`build_from_config`]
//! assembles the three-tier set the dispatcher walks in preference order.

pub mod gemini;
pub mod ollama;
pub mod openrouter;
pub mod probe;
pub mod router;

pub use gemini::GeminiTier;
pub use ollama::OllamaTier;
pub use openrouter::OpenRouterTier;
pub use probe::TcpProbe;
pub use router::{build_from_config, build_probe};

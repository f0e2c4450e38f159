//! Intent — the structured meaning of one user utterance.
//!
//! An [`Intent`] is produced once per utterance by the classifier, consumed
//! by the command router and then dropped. It is never mutated after
//! construction; the builder methods consume `self`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known slot names.
pub mod slot {
    /// Application name extracted by `open_app`.
    pub const APP: &str = "app";
    /// The normalized utterance, carried by conversational intents.
    pub const TEXT: &str = "text";
    /// The subject of an `advice_time` question.
    pub const TOPIC: &str = "topic";
}

/// The closed set of intent kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Exit,
    AdviceTime,
    GetTime,
    GetDate,
    OpenApp,
    PlayMusic,
    StopMusic,
    Chat,
    Unknown,
}

impl IntentKind {
    /// Every kind, in classifier priority order.
    pub const ALL: [IntentKind; 9] = [
        IntentKind::Exit,
        IntentKind::AdviceTime,
        IntentKind::GetTime,
        IntentKind::GetDate,
        IntentKind::OpenApp,
        IntentKind::PlayMusic,
        IntentKind::StopMusic,
        IntentKind::Chat,
        IntentKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::AdviceTime => "advice_time",
            Self::GetTime => "get_time",
            Self::GetDate => "get_date",
            Self::OpenApp => "open_app",
            Self::PlayMusic => "play_music",
            Self::StopMusic => "stop_music",
            Self::Chat => "chat",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this kind is answered by a language model rather than a handler.
    pub fn is_conversational(&self) -> bool {
        matches!(self, Self::Chat | Self::AdviceTime | Self::Unknown)
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    kind: IntentKind,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    slots: BTreeMap<String, String>,

    /// Fixed per rule, in `[0, 1]`
    confidence: f32,
}

impl Intent {
    /// Create an intent with no slots. Confidence is clamped to `[0, 1]`.
    pub fn new(kind: IntentKind, confidence: f32) -> Self {
        Self {
            kind,
            slots: BTreeMap::new(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The intent for empty input.
    pub fn unknown() -> Self {
        Self::new(IntentKind::Unknown, 0.0)
    }

    /// Attach a slot value.
    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }

    pub fn kind(&self) -> IntentKind {
        self.kind
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }

    pub fn slots(&self) -> &BTreeMap<String, String> {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(IntentKind::AdviceTime.to_string(), "advice_time");
        assert_eq!(IntentKind::OpenApp.as_str(), "open_app");
        let json = serde_json::to_string(&IntentKind::StopMusic).unwrap();
        assert_eq!(json, "\"stop_music\"");
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Intent::new(IntentKind::Chat, 3.0).confidence(), 1.0);
        assert_eq!(Intent::new(IntentKind::Chat, -1.0).confidence(), 0.0);
    }

    #[test]
    fn slots_are_readable() {
        let intent = Intent::new(IntentKind::OpenApp, 0.9).with_slot(slot::APP, "notepad");
        assert_eq!(intent.slot(slot::APP), Some("notepad"));
        assert_eq!(intent.slot(slot::TEXT), None);
        assert_eq!(intent.slots().len(), 1);
    }

    #[test]
    fn conversational_kinds() {
        let conversational: Vec<_> = IntentKind::ALL
            .iter()
            .filter(|k| k.is_conversational())
            .collect();
        assert_eq!(
            conversational,
            vec![&IntentKind::AdviceTime, &IntentKind::Chat, &IntentKind::Unknown]
        );
    }

    #[test]
    fn unknown_has_zero_confidence() {
        let intent = Intent::unknown();
        assert_eq!(intent.kind(), IntentKind::Unknown);
        assert_eq!(intent.confidence(), 0.0);
        assert!(intent.slots().is_empty());
    }
}

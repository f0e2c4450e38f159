//! Intent classifier — rule-based, phrase-aware, first match wins.
//!
//! Matching is done on the trimmed, lower-cased utterance. Multi-word
//! phrases are checked before single keywords so that "best time to sleep"
//! is advice and not a clock query.

use regex_lite::Regex;
use std::sync::LazyLock;
use steward_core::intent::slot;
use steward_core::{Intent, IntentKind};

/// Words skipped when looking for the app name after "open".
const OPEN_STOP_WORDS: &[&str] = &[
    "app",
    "application",
    "named",
    "please",
    "for",
    "me",
    "the",
    "a",
    "an",
    "to",
];

struct Rule {
    kind: IntentKind,
    confidence: f32,
    pattern: Regex,
}

impl Rule {
    fn new(kind: IntentKind, confidence: f32, pattern: &str) -> Self {
        Self {
            kind,
            confidence,
            pattern: Regex::new(pattern).expect("classifier patterns are valid"),
        }
    }
}

static EXIT: LazyLock<Rule> =
    LazyLock::new(|| Rule::new(IntentKind::Exit, 1.0, r"^(exit|quit|shutdown|bye|goodbye)$"));

static ADVICE_TIME: LazyLock<Rule> = LazyLock::new(|| {
    Rule::new(IntentKind::AdviceTime, 0.85, r"\b(best|good|ideal)\s+time\b")
});

static GET_TIME: LazyLock<Rule> = LazyLock::new(|| {
    Rule::new(
        IntentKind::GetTime,
        0.95,
        r"\b(what\s+time\s+is\s+it|tell\s+me\s+the\s+time|current\s+time)\b",
    )
});

static GET_DATE: LazyLock<Rule> = LazyLock::new(|| {
    Rule::new(
        IntentKind::GetDate,
        0.95,
        r"\b(what\s+date\s+is\s+it|today'?s\s+date|current\s+date|today)\b",
    )
});

static OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bopen\b").expect("classifier patterns are valid"));

static PLAY_MUSIC: LazyLock<Rule> = LazyLock::new(|| {
    Rule::new(
        IntentKind::PlayMusic,
        0.90,
        r"\b(play\s+music|play\s+song|start\s+music)\b",
    )
});

static STOP_MUSIC: LazyLock<Rule> = LazyLock::new(|| {
    Rule::new(
        IntentKind::StopMusic,
        0.90,
        r"\b(stop\s+music|pause\s+music|stop\s+song)\b",
    )
});

const OPEN_APP_CONFIDENCE: f32 = 0.90;
const CHAT_CONFIDENCE: f32 = 0.40;

/// Classify one utterance. Pure and total: the same text always yields the
/// same intent, and every input yields one.
pub fn classify(text: &str) -> Intent {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return Intent::unknown();
    }

    if EXIT.pattern.is_match(&text) {
        return Intent::new(EXIT.kind, EXIT.confidence);
    }

    if ADVICE_TIME.pattern.is_match(&text) {
        return Intent::new(ADVICE_TIME.kind, ADVICE_TIME.confidence)
            .with_slot(slot::TOPIC, text.as_str())
            .with_slot(slot::TEXT, text.as_str());
    }

    for rule in [&*GET_TIME, &*GET_DATE] {
        if rule.pattern.is_match(&text) {
            return Intent::new(rule.kind, rule.confidence);
        }
    }

    if let Some(app) = app_after_open(&text) {
        return Intent::new(IntentKind::OpenApp, OPEN_APP_CONFIDENCE).with_slot(slot::APP, app);
    }

    for rule in [&*PLAY_MUSIC, &*STOP_MUSIC] {
        if rule.pattern.is_match(&text) {
            return Intent::new(rule.kind, rule.confidence);
        }
    }

    Intent::new(IntentKind::Chat, CHAT_CONFIDENCE).with_slot(slot::TEXT, text)
}

/// The first meaningful token after the first "open", if any.
fn app_after_open(text: &str) -> Option<&str> {
    let found = OPEN.find(text)?;
    text[found.end()..]
        .split_whitespace()
        .find(|word| !OPEN_STOP_WORDS.contains(word))
}

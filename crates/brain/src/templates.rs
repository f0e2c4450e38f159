//! Response templates for deterministic handlers.
//!
//! Each key holds one or more alternatives; one is picked at random and its
//! `{value}` placeholder is filled in. Unknown keys use `fallback`.

use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::path::Path;
use steward_core::error::{Error, Result};
use tracing::debug;

const BUILTIN: &str = include_str!("../data/responses.json");
const FALLBACK_KEY: &str = "fallback";
const PLACEHOLDER: &str = "{value}";

/// Read-only template store.
#[derive(Debug, Clone)]
pub struct ResponseTemplates {
    entries: HashMap<String, Vec<String>>,
}

impl Default for ResponseTemplates {
    fn default() -> Self {
        Self {
            entries: HashMap::from([(
                FALLBACK_KEY.to_string(),
                vec!["I'm not sure how to help with that.".to_string()],
            )]),
        }
    }
}

impl ResponseTemplates {
    /// The templates shipped with the binary.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN).unwrap_or_default()
    }

    /// The shipped JSON, for writing out an editable copy.
    pub fn builtin_json() -> &'static str {
        BUILTIN
    }

    /// Parse a `{ "key": ["alt", ...] }` document. A non-empty `fallback`
    /// list is required.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(json)?;
        let has_fallback = entries.get(FALLBACK_KEY).is_some_and(|alts| !alts.is_empty());
        if !has_fallback {
            return Err(Error::Templates(format!(
                "a non-empty \"{FALLBACK_KEY}\" entry is required"
            )));
        }
        Ok(Self { entries })
    }

    /// Built-in templates with the file's keys replacing matching built-in keys.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut entries: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;
        entries.retain(|_, alts| !alts.is_empty());

        let mut templates = Self::builtin();
        debug!(path = %path.display(), keys = entries.len(), "Loaded response templates");
        templates.entries.extend(entries);
        Ok(templates)
    }

    /// Load from an optional override file; built-ins otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The rendered text for `key`, with `{value}` replaced.
    pub fn render(&self, key: &str, value: &str) -> String {
        let alternatives = self
            .entries
            .get(key)
            .filter(|alts| !alts.is_empty())
            .or_else(|| self.entries.get(FALLBACK_KEY));

        match alternatives.and_then(|alts| alts.choose(&mut rand::rng())) {
            Some(template) => template.replace(PLACEHOLDER, value),
            None => value.to_string(),
        }
    }
}

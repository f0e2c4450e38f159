//! Application table — maps spoken app names to launch targets.

use std::collections::BTreeMap;
use steward_core::LaunchTarget;

/// Name → target lookup used by `open_app`.
///
/// Names are matched case-insensitively. The built-in table covers the
/// common desktop apps on each platform; configured entries are merged on
/// top and win on conflict.
#[derive(Debug, Clone, Default)]
pub struct AppTable {
    apps: BTreeMap<String, LaunchTarget>,
}

impl AppTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform's built-in table.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (name, program) in default_programs() {
            table.insert(name, LaunchTarget::Program(program.to_string()));
        }
        table
    }

    pub fn insert(&mut self, name: &str, target: LaunchTarget) {
        self.apps.insert(name.trim().to_lowercase(), target);
    }

    /// Merge extra entries over the current table.
    pub fn merge(mut self, extra: &BTreeMap<String, LaunchTarget>) -> Self {
        for (name, target) in extra {
            self.insert(name, target.clone());
        }
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&LaunchTarget> {
        self.apps.get(&name.trim().to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

#[cfg(target_os = "windows")]
fn default_programs() -> &'static [(&'static str, &'static str)] {
    &[
        ("notepad", "notepad.exe"),
        ("calculator", "calc.exe"),
        ("calc", "calc.exe"),
        ("chrome", "chrome"),
        ("edge", "msedge"),
    ]
}

#[cfg(target_os = "macos")]
fn default_programs() -> &'static [(&'static str, &'static str)] {
    &[
        ("notepad", "TextEdit"),
        ("calculator", "Calculator"),
        ("calc", "Calculator"),
        ("chrome", "Google Chrome"),
        ("edge", "Microsoft Edge"),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_programs() -> &'static [(&'static str, &'static str)] {
    &[
        ("notepad", "gedit"),
        ("calculator", "gnome-calculator"),
        ("calc", "gnome-calculator"),
        ("chrome", "google-chrome"),
        ("edge", "microsoft-edge"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_common_apps() {
        let table = AppTable::with_defaults();
        for name in ["notepad", "calculator", "calc", "chrome", "edge"] {
            assert!(table.resolve(name).is_some(), "missing {name}");
        }
        assert_eq!(table.resolve("calc"), table.resolve("calculator"));
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        let table = AppTable::with_defaults();
        assert_eq!(table.resolve(" Notepad "), table.resolve("notepad"));
        assert!(table.resolve("photoshop").is_none());
    }

    #[test]
    fn configured_entries_win() {
        let extra = BTreeMap::from([
            ("Notepad".to_string(), LaunchTarget::Program("kate".into())),
            ("docs".to_string(), LaunchTarget::Url("https://docs.rs".into())),
        ]);
        let table = AppTable::with_defaults().merge(&extra);

        assert_eq!(
            table.resolve("notepad"),
            Some(&LaunchTarget::Program("kate".into()))
        );
        assert!(matches!(table.resolve("docs"), Some(LaunchTarget::Url(_))));
        assert_eq!(table.len(), 6);
    }
}

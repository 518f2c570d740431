//! This file provides the user's settings snapshot and the sources it can
//! be fetched from.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::common::compilation::CompilableTo;
use crate::common::host::canonical_hostname;
use crate::common::pattern::{translate, PhraseSet};
use crate::common::retrieve::load_settings;
use crate::common::validation::{Issue, Validatable};

/// One complete snapshot of what the user configured. A scan never patches
/// a snapshot; a new one replaces the old wholesale.
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Settings {
    /// Master switch.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// The phrases to hide. Stored as a map whose values carry no meaning,
    /// so only the keys are kept.
    #[serde(default, deserialize_with = "phrase_keys")]
    pub blacklist: BTreeSet<String>,
    /// Canonical hostname to "hide matches entirely instead of blurring".
    #[serde(default)]
    pub hide_completely: BTreeMap<String, bool>,
    /// Canonical hostname to "do not scan this site at all".
    #[serde(default)]
    pub disable_site: BTreeMap<String, bool>,
}

/// Anything that can produce the current `Settings`, such as browser
/// storage or a file on disk. Fetching may fail; callers treat a failure as
/// `Settings::disabled()`.
pub trait SettingsSource {
    fn fetch(&self) -> Result<Settings, Issue>;
}

/// Reads settings from a RON file each time they are fetched.
pub struct SettingsFile {
    pub path: String,
}

fn enabled_by_default() -> bool {
    true
}

fn phrase_keys<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: BTreeMap<String, IgnoredAny> = BTreeMap::deserialize(deserializer)?;
    Ok(map.into_iter().map(|(phrase, _)| phrase).collect())
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            enabled: true,
            blacklist: BTreeSet::new(),
            hide_completely: BTreeMap::new(),
            disable_site: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// The snapshot used when the real one cannot be retrieved.
    pub fn disabled() -> Settings {
        Settings {
            enabled: false,
            ..Settings::default()
        }
    }

    pub fn with_phrase(mut self, phrase: &str) -> Settings {
        self.blacklist.insert(String::from(phrase));
        self
    }

    pub fn phrases(&self) -> PhraseSet {
        PhraseSet::from(self.blacklist.iter().cloned().collect::<Vec<String>>())
    }

    /// Whether matches on `host` are hidden entirely. An unknown host has no
    /// per-host flags.
    pub fn hides_completely_on(&self, host: Option<&str>) -> bool {
        flag_for(&self.hide_completely, host)
    }

    /// Whether scanning is switched off for `host`.
    pub fn is_disabled_on(&self, host: Option<&str>) -> bool {
        flag_for(&self.disable_site, host)
    }
}

fn flag_for(flags: &BTreeMap<String, bool>, host: Option<&str>) -> bool {
    match host {
        Some(host) => flags.get(host).cloned().unwrap_or(false),
        None => false,
    }
}

impl SettingsSource for Settings {
    fn fetch(&self) -> Result<Settings, Issue> {
        Ok(self.clone())
    }
}

impl SettingsSource for SettingsFile {
    fn fetch(&self) -> Result<Settings, Issue> {
        load_settings(&self.path)
    }
}

impl Validatable for Settings {
    fn validate(&self) -> Option<Vec<Issue>> {
        let mut issues: Vec<Issue> = Vec::new();

        for phrase in &self.blacklist {
            if phrase.is_empty() {
                issues.push(Issue::Warning(String::from(
                    "the empty phrase never matches anything",
                )));
                continue;
            }
            if phrase.trim().is_empty() {
                issues.push(Issue::Warning(format!(
                    "phrase `{:?}` is only whitespace",
                    phrase
                )));
            }
            match translate(phrase) {
                Some(ref translated) if translated.wildcard_only => {
                    issues.push(Issue::Warning(format!(
                        "phrase `{}` has no literal text and matches almost everything",
                        phrase
                    )))
                }
                _ => (),
            }
        }

        // A phrase that cannot compile is dropped at scan time; the rest
        // still apply.
        for phrase in &self.blacklist {
            if let Err(issue) = PhraseSet::from(vec![phrase.clone()]).compile() {
                issues.push(Issue::Error(format!(
                    "phrase `{}` will be ignored: {}",
                    phrase, issue
                )));
            }
        }

        for host in self.hide_completely.keys().chain(self.disable_site.keys()) {
            match canonical_hostname(host) {
                Ok(ref canonical) if canonical == host => (),
                Ok(canonical) => issues.push(Issue::Warning(format!(
                    "host `{}` will never apply; use `{}`",
                    host, canonical
                ))),
                Err(issue) => issues.push(issue),
            }
        }

        if issues.len() > 0 {
            Some(issues)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialization() {
        let settings: Settings = ron::de::from_str(
            "(enabled:true,blacklist:{\"spoiler\":true,\"finale\":false},hide_completely:{\"example.com\":true},disable_site:{})",
        )
        .unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.blacklist.len(), 2);
        assert!(settings.blacklist.contains("spoiler"));
        assert!(settings.blacklist.contains("finale"));
        assert!(settings.hides_completely_on(Some("example.com")));
        assert!(!settings.hides_completely_on(Some("other.com")));
        assert!(!settings.hides_completely_on(None));
    }

    #[test]
    fn test_missing_fields() {
        let settings: Settings = ron::de::from_str("()").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.enabled);
        assert!(!Settings::disabled().enabled);
    }

    #[test]
    fn test_validation() {
        assert_eq!(Settings::default().with_phrase("spoiler").validate(), None);

        let mut settings = Settings::default()
            .with_phrase("")
            .with_phrase("  ")
            .with_phrase("*");
        settings
            .disable_site
            .insert(String::from("www.Example.com"), true);
        let issues = settings.validate().unwrap();
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(|issue| !issue.is_error()));
    }

    #[test]
    fn test_uncompilable_phrase_is_reported_alone() {
        let settings = Settings::default()
            .with_phrase(&"?".repeat(20000))
            .with_phrase("spoiler");
        let issues = settings.validate().unwrap();
        assert_eq!(issues.iter().filter(|issue| issue.is_error()).count(), 1);
        assert!(settings.phrases().compile().unwrap().test("a spoiler"));
    }

    #[test]
    fn test_fetch_from_memory() {
        let settings = Settings::default().with_phrase("spoiler");
        assert_eq!(settings.fetch(), Ok(settings.clone()));
    }
}

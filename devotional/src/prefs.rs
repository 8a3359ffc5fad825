//! Flat key-value preferences, one JSON object file per namespace.
//!
//! Reads never fail: a missing or unreadable file is an empty namespace.
//! Writes go through an [Editor] and land together when it is committed.
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::DevotionalError;

/// Namespace holding the saved alarms.
pub const SAVED_ALARMS: &str = "saved_alarms";

/// Namespace holding app-wide settings.
pub const APP_PREFS: &str = "app_prefs";

/// Namespace holding the cached verse of the day.
pub const DAILY_VERSE: &str = "daily_verse";

const ONBOARDING_COMPLETE: &str = "onboarding_complete";

#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    values: Map<String, Value>,
}

impl Preferences {
    /// Loads the `namespace` preferences stored under `dir`.
    pub fn open(dir: &Path, namespace: &str) -> Self {
        let path = dir.join(format!("{namespace}.json"));
        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
                    Map::new()
                }
            },
            Err(_) => {
                debug!("No preferences at {} yet", path.display());
                Map::new()
            }
        };
        Preferences { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(Value::as_str).map(String::from)
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// Starts a batch of changes.
    pub fn edit(&mut self) -> Editor<'_> {
        Editor {
            prefs: self,
            changes: Vec::new(),
        }
    }

    fn write(&self, values: &Map<String, Value>) -> Result<(), DevotionalError> {
        let io_error = |path: &Path, e: std::io::Error| DevotionalError::Io {
            path: path.display().to_string(),
            cause: e.to_string(),
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }
        let raw = serde_json::to_string_pretty(values).map_err(|e| DevotionalError::Io {
            path: self.path.display().to_string(),
            cause: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

/// A batch of preference changes, applied by [commit](Editor::commit).
pub struct Editor<'a> {
    prefs: &'a mut Preferences,
    changes: Vec<(String, Option<Value>)>,
}

impl<'a> Editor<'a> {
    pub fn put_string(mut self, key: &str, value: &str) -> Self {
        self.changes.push((key.to_string(), Some(Value::from(value))));
        self
    }

    pub fn put_i64(mut self, key: &str, value: i64) -> Self {
        self.changes.push((key.to_string(), Some(Value::from(value))));
        self
    }

    pub fn put_bool(mut self, key: &str, value: bool) -> Self {
        self.changes.push((key.to_string(), Some(Value::from(value))));
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.changes.push((key.to_string(), None));
        self
    }

    /// Writes every change to disk at once. On failure nothing changes,
    /// in memory or on disk.
    pub fn commit(self) -> Result<(), DevotionalError> {
        let mut values = self.prefs.values.clone();
        for (key, value) in self.changes {
            match value {
                Some(value) => values.insert(key, value),
                None => values.remove(&key),
            };
        }

        self.prefs.write(&values)?;
        self.prefs.values = values;
        Ok(())
    }
}

pub fn onboarding_complete(prefs: &Preferences) -> bool {
    prefs.bool_or(ONBOARDING_COMPLETE, false)
}

pub fn set_onboarding_complete(prefs: &mut Preferences) -> Result<(), DevotionalError> {
    prefs.edit().put_bool(ONBOARDING_COMPLETE, true).commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_persists_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::open(dir.path(), APP_PREFS);
        assert_eq!(prefs.get_string("selected_language"), None);

        prefs
            .edit()
            .put_string("selected_language", "te")
            .put_i64("current_verse_index", 3)
            .put_bool("onboarding_complete", true)
            .commit()
            .unwrap();

        let reopened = Preferences::open(dir.path(), APP_PREFS);
        assert_eq!(reopened.string_or("selected_language", "en"), "te");
        assert_eq!(reopened.get_i64("current_verse_index"), Some(3));
        assert!(onboarding_complete(&reopened));
        assert!(!dir.path().join("app_prefs.json.tmp").exists());
    }

    #[test]
    fn uncommitted_changes_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::open(dir.path(), APP_PREFS);
        let _ = prefs.edit().put_bool("flag", true);
        assert!(!prefs.contains("flag"));
        assert!(!prefs.path().exists());
    }

    #[test]
    fn remove_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut prefs = Preferences::open(dir.path(), SAVED_ALARMS);
        prefs.edit().put_i64("alarm_count", 1).commit().unwrap();
        prefs.edit().remove("alarm_count").commit().unwrap();
        assert_eq!(prefs.i64_or("alarm_count", 0), 0);
        assert!(prefs.bool_or("alarm_0_active", true));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app_prefs.json"), "{not json").unwrap();
        let mut prefs = Preferences::open(dir.path(), APP_PREFS);
        assert!(!onboarding_complete(&prefs));
        set_onboarding_complete(&mut prefs).unwrap();
        assert!(onboarding_complete(&Preferences::open(dir.path(), APP_PREFS)));
    }
}

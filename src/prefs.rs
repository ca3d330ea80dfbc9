//! Durable client preferences.
//!
//! A small TOML file holding the one preference the core reads:
//! the background refresh interval in minutes. A missing or empty file
//! yields the default; writes go through a temp-file-then-rename so the
//! file is never left half-written.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default refresh interval when no preference has been saved.
pub const DEFAULT_REFRESH_INTERVAL_MINUTES: u64 = 15;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("Failed to read preference file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in preference file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Refresh interval must be at least 1 minute")]
    IntervalOutOfRange,
}

// ============================================================================
// Preference File
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct PrefsFile {
    refresh_interval_minutes: u64,
}

impl Default for PrefsFile {
    fn default() -> Self {
        Self {
            refresh_interval_minutes: DEFAULT_REFRESH_INTERVAL_MINUTES,
        }
    }
}

/// Handle to the preference file.
///
/// Values are kept in memory after load; `set_*` writes through to disk and
/// updates the in-memory copy only when the write succeeds.
#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    file: PrefsFile,
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file is missing
    /// or empty. Invalid TOML is an error rather than a silent reset, so a
    /// typo cannot wipe a user's settings.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No preference file, using defaults");
                return Ok(Self {
                    path,
                    file: PrefsFile::default(),
                });
            }
            Err(e) => return Err(PrefsError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Self {
                path,
                file: PrefsFile::default(),
            });
        }

        let file: PrefsFile = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            refresh_interval_minutes = file.refresh_interval_minutes,
            "Loaded preferences"
        );
        Ok(Self { path, file })
    }

    /// Refresh interval in minutes.
    pub fn refresh_interval_minutes(&self) -> u64 {
        self.file.refresh_interval_minutes
    }

    /// Refresh interval as a `Duration`, for timer scheduling.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.file.refresh_interval_minutes * 60)
    }

    /// Persist a new refresh interval.
    pub fn set_refresh_interval_minutes(&mut self, minutes: u64) -> Result<(), PrefsError> {
        if minutes == 0 {
            return Err(PrefsError::IntervalOutOfRange);
        }
        let next = PrefsFile {
            refresh_interval_minutes: minutes,
        };
        write_atomic(&self.path, &next)?;
        self.file = next;
        Ok(())
    }
}

/// Serialize and write via a temp file in the same directory, then rename
/// over the destination. Rename on the same filesystem is atomic, so readers
/// see either the old or the new file, never a partial one.
fn write_atomic(path: &Path, file: &PrefsFile) -> Result<(), PrefsError> {
    let content = toml::to_string_pretty(file)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    let mut temp = std::fs::File::create(&temp_path)?;
    temp.write_all(content.as_bytes())?;
    temp.sync_all()?;
    drop(temp);

    std::fs::rename(&temp_path, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&temp_path);
    })?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_prefs_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eddy_prefs_test_{tag}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("prefs.toml")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_missing_file_uses_default() {
        let path = std::env::temp_dir().join("eddy_prefs_nonexistent").join("prefs.toml");
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(
            prefs.refresh_interval_minutes(),
            DEFAULT_REFRESH_INTERVAL_MINUTES
        );
    }

    #[test]
    fn test_empty_file_uses_default() {
        let path = temp_prefs_path("empty");
        std::fs::write(&path, "  \n").unwrap();

        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.refresh_interval_minutes(), 15);

        cleanup(&path);
    }

    #[test]
    fn test_set_persists_across_reload() {
        let path = temp_prefs_path("roundtrip");

        let mut prefs = Preferences::load(&path).unwrap();
        prefs.set_refresh_interval_minutes(30).unwrap();
        assert_eq!(prefs.refresh_interval_minutes(), 30);

        let reloaded = Preferences::load(&path).unwrap();
        assert_eq!(reloaded.refresh_interval_minutes(), 30);

        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let path = temp_prefs_path("invalid");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Preferences::load(&path);
        assert!(matches!(result, Err(PrefsError::Parse(_))));

        cleanup(&path);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let path = temp_prefs_path("zero");

        let mut prefs = Preferences::load(&path).unwrap();
        let result = prefs.set_refresh_interval_minutes(0);
        assert!(matches!(result, Err(PrefsError::IntervalOutOfRange)));
        // In-memory value untouched after a rejected write.
        assert_eq!(prefs.refresh_interval_minutes(), 15);

        cleanup(&path);
    }

    #[test]
    fn test_refresh_interval_as_duration() {
        let path = temp_prefs_path("duration");

        let mut prefs = Preferences::load(&path).unwrap();
        prefs.set_refresh_interval_minutes(5).unwrap();
        assert_eq!(prefs.refresh_interval(), Duration::from_secs(300));

        cleanup(&path);
    }
}

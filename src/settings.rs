use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::providers::windows::{default_windows, WindowInfo};

const SETTINGS_VERSION: u32 = 1;
const DEFAULT_MAX_TYPING_SPEED: u32 = 400;

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_max_typing_speed() -> u32 {
    DEFAULT_MAX_TYPING_SPEED
}

// ── App settings ─────────────────────────────────────────────────

/// Application-level settings stored in the OS config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct AppSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    /// `tracing` filter directive, e.g. `autotype=debug`.
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Fixed seed for every randomised provider. None = seeded from the clock.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Windows served by the built-in window provider.
    #[serde(default = "default_windows")]
    pub windows: Vec<WindowInfo>,
    /// Ceiling applied to `typing_speed`, in words per minute.
    #[serde(default = "default_max_typing_speed")]
    pub max_typing_speed: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            log_filter: None,
            rng_seed: None,
            windows: default_windows(),
            max_typing_speed: DEFAULT_MAX_TYPING_SPEED,
        }
    }
}

/// Load settings from the app config directory. A missing file gives the
/// defaults. An unreadable one is returned as an error so the caller can
/// report it once logging is installed.
pub fn load_settings(app_config_dir: &Path) -> Result<AppSettings, AppError> {
    let path = crate::paths::settings_path(app_config_dir);
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    read_json(&path)
}

/// Report a settings file that was replaced by the defaults.
pub fn warn_unreadable(app_config_dir: &Path, error: &AppError) {
    tracing::warn!(
        path = %crate::paths::settings_path(app_config_dir).display(),
        error = %error,
        "ignoring unreadable settings"
    );
}

/// Save settings to the app config directory.
pub fn save_settings(app_config_dir: &Path, settings: &AppSettings) -> Result<(), AppError> {
    fs::create_dir_all(app_config_dir)?;
    write_json(&crate::paths::settings_path(app_config_dir), settings)
}

// ── JSON files ───────────────────────────────────────────────────

/// Write to `<path>.tmp`, fsync, then rename over `path`.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AppError> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(&tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| AppError::Io {
        message: e.to_string(),
    })?;
    atomic_write(path, json.as_bytes())
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| AppError::Io {
        message: format!("{}: {e}", path.display()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{self, CapturedLogs};

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.windows.len(), 3);
        assert_eq!(settings.max_typing_speed, 400);
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings {
            log_filter: Some("autotype=debug".into()),
            rng_seed: Some(42),
            windows: vec![WindowInfo::new("9", "Terminal", "term")],
            ..AppSettings::default()
        };
        save_settings(dir.path(), &settings).unwrap();
        assert_eq!(load_settings(dir.path()).unwrap(), settings);
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            crate::paths::settings_path(dir.path()),
            r#"{"rng_seed": 7}"#,
        )
        .unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.rng_seed, Some(7));
        assert_eq!(settings.version, 1);
        assert_eq!(settings.windows, default_windows());
    }

    #[test]
    fn malformed_file_is_an_error_reported_at_warn() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(crate::paths::settings_path(dir.path()), "{not json").unwrap();
        let error = load_settings(dir.path()).unwrap_err();
        assert_eq!(error.code(), "Io");

        let logs = CapturedLogs::default();
        let filter = logging::resolve_filter(None, None, None);
        tracing::subscriber::with_default(logging::subscriber(filter, logs.clone()), || {
            warn_unreadable(dir.path(), &error);
        });
        let text = logs.contents();
        assert!(text.contains("WARN"));
        assert!(text.contains("ignoring unreadable settings"));
        assert!(text.contains("settings.json"));
    }

    #[test]
    fn save_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        save_settings(&nested, &AppSettings::default()).unwrap();
        assert!(crate::paths::settings_path(&nested).exists());
    }
}

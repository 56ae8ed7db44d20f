//! Centralized path definitions for configuration files.
//!
//! Functions accept `&Path` so callers can point them at any config
//! directory, including a `--config-dir` override or a test tempdir.

use std::path::{Path, PathBuf};

// ── Application identity ─────────────────────────────────────────

pub const APP_ID: &str = "com.autotype.app";

// ── Leaf filenames ───────────────────────────────────────────────

pub const SETTINGS_FILE: &str = "settings.json";

// ── Config-dir functions (take app_config_dir) ───────────────────

pub fn settings_path(app_config_dir: &Path) -> PathBuf {
    app_config_dir.join(SETTINGS_FILE)
}

/// `<os config dir>/com.autotype.app`. Falls back to the working
/// directory when the OS gives no usable base.
pub fn default_config_dir() -> PathBuf {
    config_base().unwrap_or_default().join(APP_ID)
}

fn config_base() -> Option<PathBuf> {
    let env_dir = |key: &str| {
        std::env::var_os(key)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    };
    if cfg!(target_os = "windows") {
        env_dir("APPDATA")
    } else if cfg!(target_os = "macos") {
        env_dir("HOME").map(|home| home.join("Library").join("Application Support"))
    } else {
        env_dir("XDG_CONFIG_HOME").or_else(|| env_dir("HOME").map(|home| home.join(".config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_live_in_the_config_dir() {
        let dir = Path::new("/tmp/cfg");
        assert_eq!(settings_path(dir), PathBuf::from("/tmp/cfg/settings.json"));
    }

    #[test]
    fn default_dir_ends_with_app_id() {
        assert!(default_config_dir().ends_with(APP_ID));
    }
}

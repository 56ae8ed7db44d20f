use std::path::PathBuf;
use std::sync::Arc;

use crate::providers::Providers;
use crate::session::SessionManager;
use crate::settings::AppSettings;
use crate::util::JitterSource;

// ── Application State ──────────────────────────────────────────────

/// State shared by every dispatch. Only `sessions` changes after startup.
pub struct AppState {
    pub settings: AppSettings,
    pub providers: Providers,
    pub sessions: Arc<SessionManager>,
    pub jitter: JitterSource,
    pub app_config_dir: PathBuf,
}

impl AppState {
    /// Built-in providers serving the configured window list.
    pub fn new(settings: AppSettings, app_config_dir: PathBuf) -> Self {
        let providers = Providers::builtin(settings.windows.clone());
        Self::with_providers(settings, providers, app_config_dir)
    }

    pub fn with_providers(
        settings: AppSettings,
        providers: Providers,
        app_config_dir: PathBuf,
    ) -> Self {
        Self {
            jitter: JitterSource::new(settings.rng_seed),
            settings,
            providers,
            sessions: Arc::new(SessionManager::new()),
            app_config_dir,
        }
    }

    pub fn max_typing_speed(&self) -> u32 {
        self.settings.max_typing_speed.max(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn seeded_settings_make_draws_reproducible() {
        let settings = AppSettings {
            rng_seed: Some(11),
            ..AppSettings::default()
        };
        let a = AppState::new(settings.clone(), PathBuf::new());
        let b = AppState::new(settings, PathBuf::new());
        assert_eq!(a.jitter.draw().next_u64(), b.jitter.draw().next_u64());
    }

    #[test]
    fn windows_come_from_settings() {
        let state = AppState::new(AppSettings::default(), PathBuf::new());
        assert_eq!(state.providers.windows.list(), state.settings.windows);
        assert!(!state.sessions.is_active());
    }
}

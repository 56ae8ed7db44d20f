use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct WindowInfo {
    pub id: String,
    pub title: String,
    pub process_name: String,
}

impl WindowInfo {
    pub fn new(id: &str, title: &str, process_name: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            process_name: process_name.to_string(),
        }
    }
}

/// Outcome of `select_window`. An unknown id is reported here, not as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct WindowSelection {
    pub id: String,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Window enumeration and targeting.
pub trait WindowManager: Send + Sync {
    fn list(&self) -> Vec<WindowInfo>;

    fn select(&self, id: &str) -> WindowSelection;

    /// Bring a window to the foreground before typing into it.
    fn focus(&self, id: &str) -> Result<WindowInfo, AppError>;
}

/// The three windows every fresh install reports.
pub fn default_windows() -> Vec<WindowInfo> {
    vec![
        WindowInfo::new("1", "Notepad", "notepad.exe"),
        WindowInfo::new("2", "Microsoft Word", "winword.exe"),
        WindowInfo::new("3", "Google Chrome", "chrome.exe"),
    ]
}

/// Serves a fixed, configured window list. Selection is a lookup only.
pub struct StaticWindows {
    windows: Vec<WindowInfo>,
}

impl StaticWindows {
    pub fn new(windows: Vec<WindowInfo>) -> Self {
        Self { windows }
    }

    fn find(&self, id: &str) -> Option<&WindowInfo> {
        self.windows.iter().find(|w| w.id == id)
    }
}

impl WindowManager for StaticWindows {
    fn list(&self) -> Vec<WindowInfo> {
        self.windows.clone()
    }

    fn select(&self, id: &str) -> WindowSelection {
        match self.find(id) {
            Some(window) => WindowSelection {
                id: id.to_string(),
                selected: true,
                title: Some(window.title.clone()),
                error: None,
            },
            None => WindowSelection {
                id: id.to_string(),
                selected: false,
                title: None,
                error: Some("Window not found".to_string()),
            },
        }
    }

    fn focus(&self, id: &str) -> Result<WindowInfo, AppError> {
        self.find(id).cloned().ok_or_else(|| AppError::NotFound {
            what: format!("Window '{id}'"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_window_is_selectable() {
        let wm = StaticWindows::new(default_windows());
        for w in wm.list() {
            let sel = wm.select(&w.id);
            assert!(sel.selected);
            assert_eq!(sel.title.as_deref(), Some(w.title.as_str()));
        }
    }

    #[test]
    fn unknown_window_is_not_selected() {
        let wm = StaticWindows::new(default_windows());
        let sel = wm.select("99");
        assert!(!sel.selected);
        assert_eq!(sel.error.as_deref(), Some("Window not found"));
    }

    #[test]
    fn selection_leaves_the_provider_unchanged() {
        let wm = StaticWindows::new(default_windows());
        let first = wm.select("2");
        assert_eq!(wm.select("2"), first);
        assert_eq!(wm.list(), default_windows());
        assert_eq!(wm.focus("1").unwrap().title, "Notepad");
        assert!(!wm.select("99").selected);
        assert_eq!(wm.select("2"), first);
    }

    #[test]
    fn focus_unknown_is_not_found() {
        let wm = StaticWindows::new(default_windows());
        assert!(wm.focus("2").is_ok());
        assert!(matches!(wm.focus("9"), Err(AppError::NotFound { .. })));
    }

    #[test]
    fn window_info_uses_process_name_key() {
        let json = serde_json::to_value(WindowInfo::new("1", "Notepad", "notepad.exe")).unwrap();
        assert_eq!(json["processName"], "notepad.exe");
    }
}

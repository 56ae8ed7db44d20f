use serde::Serialize;

/// Structured error type for the backend. Every failure the host can observe
/// is one of these; the wire only ever sees the `Display` text plus `code()`.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "code", content = "detail")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub enum AppError {
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },
    #[error("Missing required argument: {name}")]
    MissingArgument { name: String },
    #[error("Invalid value for argument '{name}': \"{value}\" ({reason})")]
    InvalidArgument {
        name: String,
        value: String,
        reason: String,
    },
    #[error("Command already registered: {name}")]
    DuplicateCommand { name: String },
    #[error("A typing session is already active")]
    SessionAlreadyActive,
    #[error("Tone preset '{id}' not found")]
    PresetNotFound { id: String },
    #[error("{what} not found")]
    NotFound { what: String },
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },
    #[error("{message}")]
    ProviderFailure { message: String },
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl AppError {
    /// Stable machine-readable code sent alongside the message on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownCommand { .. } => "UnknownCommand",
            AppError::MissingArgument { .. } => "MissingArgument",
            AppError::InvalidArgument { .. } => "InvalidArgument",
            AppError::DuplicateCommand { .. } => "DuplicateCommand",
            AppError::SessionAlreadyActive => "SessionAlreadyActive",
            AppError::PresetNotFound { .. } => "PresetNotFound",
            AppError::NotFound { .. } => "NotFound",
            AppError::MalformedRequest { .. } => "MalformedRequest",
            AppError::ProviderFailure { .. } => "ProviderFailure",
            AppError::Io { .. } => "Io",
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        AppError::ProviderFailure {
            message: message.into(),
        }
    }

    pub fn invalid(name: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            name: name.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::MalformedRequest {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_variant_names() {
        assert_eq!(AppError::UnknownCommand { name: "x".into() }.code(), "UnknownCommand");
        assert_eq!(AppError::SessionAlreadyActive.code(), "SessionAlreadyActive");
        assert_eq!(AppError::provider("boom").code(), "ProviderFailure");
        assert_eq!(AppError::provider("boom").to_string(), "boom");
    }

    #[test]
    fn messages_name_the_argument() {
        let e = AppError::invalid("typing_speed", "fast", "expected an integer");
        assert_eq!(
            e.to_string(),
            "Invalid value for argument 'typing_speed': \"fast\" (expected an integer)"
        );
        assert_eq!(e.code(), "InvalidArgument");
    }

    #[test]
    fn preset_not_found_is_distinct() {
        let e = AppError::PresetNotFound { id: "pirate".into() };
        assert_eq!(e.code(), "PresetNotFound");
        assert_eq!(e.to_string(), "Tone preset 'pirate' not found");
        assert_ne!(e.code(), AppError::NotFound { what: "x".into() }.code());
    }
}

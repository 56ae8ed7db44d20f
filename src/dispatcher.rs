//! Request parsing and the dispatch boundary.
//!
//! Every dispatch ends in exactly one terminal event (`result` or `error`),
//! preceded by whatever progress the handler emitted. Handler failures and
//! panics are caught here and never reach the caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::emitter::{EventScope, EventSink};
use crate::error::AppError;
use crate::events::Event;
use crate::progress::ProgressEmitter;
use crate::registry::validation;
use crate::registry::{CommandInfo, CommandRegistry};
use crate::state::AppState;

// ── Requests ────────────────────────────────────────────────────

/// A request before validation: a command name plus loose arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRequest {
    pub command: String,
    pub arguments: Map<String, Value>,
    /// Correlation id echoed on every event of this dispatch.
    pub id: Option<String>,
}

impl RawRequest {
    pub fn new(command: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            arguments,
            id: None,
        }
    }

    /// Parse `{"command": ..., "arguments": {...}, "id"?: ...}`.
    pub fn from_json(line: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(line)?;
        let Value::Object(mut object) = value else {
            return Err(malformed("request must be a JSON object"));
        };

        let command = match object.remove("command") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
            Some(Value::String(_)) | None | Some(Value::Null) => {
                return Err(malformed("missing command name"));
            }
            Some(_) => return Err(malformed("command must be a string")),
        };

        let arguments = match object.remove("arguments") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(arguments)) => arguments,
            Some(_) => return Err(malformed("arguments must be an object")),
        };

        let id = match object.remove("id") {
            None | Some(Value::Null) => None,
            Some(id) => Some(correlation_from(&id).ok_or_else(|| malformed("id must be a string or number"))?),
        };

        Ok(Self {
            command,
            arguments,
            id,
        })
    }

    /// Parse `<command> --key value --other=value ...`. Keys may use dashes
    /// or underscores. Values that begin with `--` need the `=` form.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Result<Self, AppError> {
        let Some((command, rest)) = argv.split_first() else {
            return Err(malformed("missing command name"));
        };
        let command = AsRef::<str>::as_ref(command).trim();
        if command.is_empty() || command.starts_with('-') {
            return Err(malformed("missing command name"));
        }

        let mut arguments = Map::new();
        let mut tokens = rest.iter().map(|s| AsRef::<str>::as_ref(s)).peekable();
        while let Some(token) = tokens.next() {
            let Some(flag) = token.strip_prefix("--") else {
                return Err(malformed(format!("unexpected positional argument '{token}'")));
            };
            let (key, value) = match flag.split_once('=') {
                Some((key, value)) => (key, value.to_string()),
                None => match tokens.next_if(|next| !next.starts_with("--")) {
                    Some(value) => (flag, value.to_string()),
                    None => return Err(malformed(format!("argument '--{flag}' has no value"))),
                },
            };
            let key = key.trim().replace('-', "_");
            if key.is_empty() {
                return Err(malformed(format!("empty argument name in '{token}'")));
            }
            if arguments.insert(key.clone(), Value::String(value)).is_some() {
                tracing::debug!(argument = %key, "repeated argument, keeping the last value");
            }
        }

        Ok(Self::new(command, arguments))
    }
}

/// Best-effort correlation id of a line that may not be a valid request.
pub fn correlation_of(line: &str) -> Option<String> {
    let value: Value = serde_json::from_str(line).ok()?;
    correlation_from(value.get("id")?)
}

fn correlation_from(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn malformed(message: impl Into<String>) -> AppError {
    AppError::MalformedRequest {
        message: message.into(),
    }
}

// ── Dispatcher ──────────────────────────────────────────────────

/// Resolves, validates and runs requests against one registry and state.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    state: Arc<AppState>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, state: Arc<AppState>) -> Self {
        Self { registry, state }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Run one request. Emits its events to `sink` and returns the terminal one.
    pub async fn dispatch(&self, request: RawRequest, sink: Arc<dyn EventSink>) -> Event {
        let scope = EventScope::new(sink, request.id.clone());
        let terminal = self.run(request, &scope).await;
        scope.emit(&terminal);
        terminal
    }

    /// Parse a JSON line and dispatch it. A malformed line still yields
    /// exactly one error event, tagged with its id when one can be read.
    pub async fn dispatch_json(&self, line: &str, sink: Arc<dyn EventSink>) -> Event {
        match RawRequest::from_json(line) {
            Ok(request) => self.dispatch(request, sink).await,
            Err(error) => reject(&error, EventScope::new(sink, correlation_of(line))),
        }
    }

    /// Parse an argv request (`<command> --key value ...`) and dispatch it.
    pub async fn dispatch_argv<S: AsRef<str>>(&self, argv: &[S], sink: Arc<dyn EventSink>) -> Event {
        match RawRequest::from_argv(argv) {
            Ok(request) => self.dispatch(request, sink).await,
            Err(error) => reject(&error, EventScope::new(sink, None)),
        }
    }

    async fn run(&self, request: RawRequest, scope: &EventScope) -> Event {
        let entry = match self.registry.resolve(&request.command) {
            Ok(entry) => entry,
            Err(error) => return request_error(&error),
        };
        let args = match validation::coerce(&entry.specs, &request.arguments) {
            Ok(args) => args,
            Err(error) => return request_error(&error),
        };

        let info = entry.info;
        let span = tracing::info_span!("dispatch", command = info.name, id = request.id.as_deref());
        let state = Arc::clone(&self.state);
        let progress = ProgressEmitter::new(scope.clone());
        // Calling the handler happens inside the guarded future too.
        let future = async move { entry.invoke(args, state, progress).await };
        let outcome = AssertUnwindSafe(future).catch_unwind().instrument(span).await;

        match outcome {
            Ok(Ok(output)) => match output.payload() {
                Ok(payload) => {
                    tracing::debug!(command = info.name, message = %output.message, "command succeeded");
                    Event::Result(payload)
                }
                Err(error) => handler_error(info, &error),
            },
            Ok(Err(error)) => handler_error(info, &error),
            Err(panic) => {
                tracing::error!(
                    command = info.name,
                    panic = panic_message(panic.as_ref()),
                    "handler panicked"
                );
                Event::Error {
                    message: format!("{} error: internal provider failure", info.domain),
                    code: "ProviderFailure",
                }
            }
        }
    }
}

/// Emit a parse-level error on its own.
fn reject(error: &AppError, scope: EventScope) -> Event {
    let terminal = request_error(error);
    scope.emit(&terminal);
    terminal
}

fn request_error(error: &AppError) -> Event {
    tracing::warn!(code = error.code(), "{error}");
    Event::Error {
        message: error.to_string(),
        code: error.code(),
    }
}

fn handler_error(info: CommandInfo, error: &AppError) -> Event {
    tracing::error!(command = info.name, detail = ?error, "command failed");
    Event::Error {
        message: format!("{} error: {error}", info.domain),
        code: error.code(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

//! Outbound event protocol. One JSON object per line:
//! `{"type": "progress" | "result" | "error", "data": ..., "code"?: ..., "id"?: ...}`.

use serde::Serialize;
use serde_json::Value;

pub const PROGRESS: &str = "progress";
pub const RESULT: &str = "result";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "bindings", derive(ts_rs::TS))]
#[cfg_attr(feature = "bindings", ts(export))]
pub struct ProgressPayload {
    pub percent_complete: u8,
    pub characters_typed: usize,
    pub total_characters: usize,
}

impl ProgressPayload {
    /// Build a payload, deriving the integer percentage. Typed counts above
    /// the total are clamped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn new(characters_typed: usize, total_characters: usize) -> Self {
        let typed = characters_typed.min(total_characters);
        let percent = if total_characters == 0 {
            100
        } else {
            ((typed as f64 / total_characters as f64) * 100.0).floor() as u8
        };
        Self {
            percent_complete: percent.min(100),
            characters_typed: typed,
            total_characters,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.characters_typed == self.total_characters && self.percent_complete == 100
    }
}

/// Result payload: `success` plus the command-specific `data`, when there is any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPayload {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A single event bound for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Progress(ProgressPayload),
    Result(ResultPayload),
    Error { message: String, code: &'static str },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Progress(_) => PROGRESS,
            Event::Result(_) => RESULT,
            Event::Error { .. } => ERROR,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Progress(_))
    }

    /// Serialize into the line-oriented wire shape.
    pub fn to_wire(&self, correlation: Option<&str>) -> Value {
        let (data, code) = match self {
            Event::Progress(p) => (serde_json::to_value(p).unwrap_or(Value::Null), None),
            Event::Result(r) => (serde_json::to_value(r).unwrap_or(Value::Null), None),
            Event::Error { message, code } => (Value::String(message.clone()), Some(*code)),
        };
        let wire = WireEvent {
            kind: self.kind(),
            data,
            code,
            id: correlation,
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }
}

#[derive(Serialize)]
struct WireEvent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

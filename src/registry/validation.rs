//! Argument schemas and raw-argument coercion.
//!
//! Hosts send every argument as a string (argv) or as loose JSON. Each
//! command declares an [`ArgumentSpec`] list; [`coerce`] turns the raw map
//! into a typed [`ArgumentSet`] before any handler runs.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Declared type of one argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArgType {
    String,
    Integer,
    Float,
    Boolean,
    /// A number in percent, delivered to the handler as a 0.0–1.0 fraction.
    Percentage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub required: bool,
    #[serde(flatten)]
    pub kind: ArgType,
    /// Raw default, coerced the same way as a supplied value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ArgumentSpec {
    pub fn required(name: &'static str, kind: ArgType, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            kind,
            default: None,
            description,
        }
    }

    pub fn optional(
        name: &'static str,
        kind: ArgType,
        default: impl Into<Value>,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            required: false,
            kind,
            default: Some(default.into()),
            description,
        }
    }

    /// Optional with no default: absent stays absent.
    pub fn maybe(name: &'static str, kind: ArgType, description: &'static str) -> Self {
        Self {
            name,
            required: false,
            kind,
            default: None,
            description,
        }
    }
}

/// Implemented by every params struct: the wire-level schema of its fields.
pub trait ArgumentSchema {
    fn specs() -> Vec<ArgumentSpec>;
}

/// Coerced arguments, keyed by argument name. Defaults are already filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet(Map<String, Value>);

impl ArgumentSet {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bind into a typed params struct.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| AppError::provider(format!("argument binding failed: {e}")))
    }
}

/// Coerce `raw` against `specs`. `null` counts as absent; unknown keys are
/// ignored with a warning.
pub fn coerce(specs: &[ArgumentSpec], raw: &Map<String, Value>) -> Result<ArgumentSet, AppError> {
    let mut out = Map::new();
    for spec in specs {
        match raw.get(spec.name).filter(|v| !v.is_null()) {
            Some(value) => {
                out.insert(spec.name.to_string(), coerce_value(spec, value)?);
            }
            None if spec.required => {
                return Err(AppError::MissingArgument {
                    name: spec.name.to_string(),
                });
            }
            None => {
                if let Some(default) = &spec.default {
                    out.insert(spec.name.to_string(), coerce_value(spec, default)?);
                }
            }
        }
    }
    for key in raw.keys() {
        if !specs.iter().any(|s| s.name == key) {
            tracing::warn!(argument = %key, "ignoring unknown argument");
        }
    }
    Ok(ArgumentSet(out))
}

fn coerce_value(spec: &ArgumentSpec, value: &Value) -> Result<Value, AppError> {
    let invalid = |reason: &str| AppError::invalid(spec.name, display_raw(value), reason);
    match &spec.kind {
        ArgType::String => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(invalid("expected a string")),
        },
        ArgType::Integer => parse_integer(value)
            .map(Value::from)
            .ok_or_else(|| invalid("expected an integer")),
        ArgType::Float => parse_float(value)
            .map(Value::from)
            .ok_or_else(|| invalid("expected a number")),
        ArgType::Percentage => parse_float(value)
            .map(|percent| Value::from(percent / 100.0))
            .ok_or_else(|| invalid("expected a percentage")),
        ArgType::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(invalid("expected true or false")),
        },
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().or_else(|| {
            // Accept whole floats such as 120.0.
            let f = n.as_f64()?;
            (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
        }),
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    let f = match value {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Clamping ─────────────────────────────────────────────────────
//
// Text transforms degrade gracefully: out-of-range numbers are clamped,
// never rejected.

/// 1–5 level scale used by the humanizer and tone controls.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_level(value: i64) -> u8 {
    value.clamp(1, 5) as u8
}

pub fn clamp_fraction(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Non-negative milliseconds.
#[allow(clippy::cast_sign_loss)]
pub fn clamp_millis(value: i64) -> Duration {
    Duration::from_millis(value.max(0) as u64)
}

/// Words per minute in `1..=max`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_speed(value: i64, max: u32) -> u32 {
    value.clamp(1, i64::from(max.max(1))) as u32
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn specs() -> Vec<ArgumentSpec> {
        vec![
            ArgumentSpec::required("text", ArgType::String, "text"),
            ArgumentSpec::optional("speed", ArgType::Integer, 120, "wpm"),
            ArgumentSpec::optional("rate", ArgType::Percentage, 0, "percent"),
            ArgumentSpec::optional("fillers", ArgType::Boolean, false, "flag"),
            ArgumentSpec::maybe("topic", ArgType::String, "topic"),
        ]
    }

    fn raw(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn strings_are_coerced_to_declared_types() {
        let set = coerce(
            &specs(),
            &raw(json!({"text": "hi", "speed": "80", "rate": "50", "fillers": "TRUE"})),
        )
        .unwrap();
        assert_eq!(set.get("speed"), Some(&json!(80)));
        assert_eq!(set.get("rate"), Some(&json!(0.5)));
        assert_eq!(set.get("fillers"), Some(&json!(true)));
        assert_eq!(set.get("topic"), None);
    }

    #[test]
    fn defaults_fill_missing_optionals() {
        let set = coerce(&specs(), &raw(json!({"text": "hi"}))).unwrap();
        assert_eq!(set.get("speed"), Some(&json!(120)));
        assert_eq!(set.get("rate"), Some(&json!(0.0)));
        assert_eq!(set.get("fillers"), Some(&json!(false)));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn missing_required_names_the_argument() {
        let err = coerce(&specs(), &raw(json!({"speed": "80"}))).unwrap_err();
        assert_eq!(err, AppError::MissingArgument { name: "text".into() });
    }

    #[test]
    fn null_counts_as_missing() {
        let err = coerce(&specs(), &raw(json!({"text": null}))).unwrap_err();
        assert!(matches!(err, AppError::MissingArgument { .. }));
    }

    #[test]
    fn non_numeric_integer_is_invalid() {
        let err = coerce(&specs(), &raw(json!({"text": "hi", "speed": "fast"}))).unwrap_err();
        assert_eq!(
            err,
            AppError::invalid("speed", "fast", "expected an integer")
        );
    }

    #[test]
    fn boolean_rejects_other_words() {
        let err = coerce(&specs(), &raw(json!({"text": "hi", "fillers": "yes"}))).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { ref name, .. } if name == "fillers"));
    }

    #[test]
    fn json_numbers_are_accepted() {
        let set = coerce(&specs(), &raw(json!({"text": 7, "speed": 90.0, "rate": 25}))).unwrap();
        assert_eq!(set.get("text"), Some(&json!("7")));
        assert_eq!(set.get("speed"), Some(&json!(90)));
        assert_eq!(set.get("rate"), Some(&json!(0.25)));
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        let set = coerce(&specs(), &raw(json!({"text": "hi", "colour": "red"}))).unwrap();
        assert!(set.get("colour").is_none());
    }

    #[test]
    fn non_finite_floats_are_invalid() {
        let err = coerce(&specs(), &raw(json!({"text": "hi", "rate": "NaN"}))).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[test]
    fn clamps() {
        assert_eq!(clamp_level(0), 1);
        assert_eq!(clamp_level(9), 5);
        assert_eq!(clamp_speed(1000, 400), 400);
        assert_eq!(clamp_speed(-3, 400), 1);
        assert_eq!(clamp_millis(-10), Duration::ZERO);
        assert!((clamp_fraction(1.5) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn spec_serializes_for_the_catalog() {
        let spec = ArgumentSpec::optional("rate", ArgType::Percentage, 0, "percent");
        let json = serde_json::to_value(spec).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["required"], false);
        assert_eq!(json["default"], 0);
    }
}

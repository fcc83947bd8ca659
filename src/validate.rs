//! Per-option value coercion and validity checks.
//!
//! Raw values arrive loosely typed: `"8983"` from a config file for an
//! integer option, a bare string for a list option. [`coerce`] brings a
//! value into the shape its [`ValueType`] stores, and [`check_valid`]
//! enforces a descriptor's validity set. Membership is literal and
//! case-sensitive.

use crate::error::ConfigError;
use crate::schema::{Descriptor, ValueType};
use crate::types::Value;

/// Coerce `value` into the stored shape for `descriptor`.
///
/// - `Flag`: booleans, or the strings `true`/`false` (any case).
/// - `Int`: integers, or decimal strings.
/// - `Str`: strings; integers are stringified.
/// - `OutFile`: strings (resolved to a stream later) or ready streams.
/// - `List`: a list whose elements coerce as `Str`, or a single such scalar.
pub fn coerce(descriptor: &Descriptor, value: Value) -> Result<Value, ConfigError> {
    match descriptor.value_type {
        ValueType::Flag => match value {
            Value::Bool(_) => Ok(value),
            Value::Str(ref s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::Str(ref s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            other => Err(invalid(descriptor, &other, "expected a boolean")),
        },
        ValueType::Int => match value {
            Value::Int(_) => Ok(value),
            Value::Str(ref s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid(descriptor, &value, "expected an integer")),
            other => Err(invalid(descriptor, &other, "expected an integer")),
        },
        ValueType::Str => scalar_string(descriptor, value),
        ValueType::OutFile => match value {
            Value::Str(_) | Value::Stream(_) => Ok(value),
            other => Err(invalid(
                descriptor,
                &other,
                "expected a filename, STDOUT, STDERR or NONE",
            )),
        },
        ValueType::List => match value {
            Value::List(items) => items
                .into_iter()
                .map(|item| scalar_string(descriptor, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            scalar => Ok(Value::List(vec![scalar_string(descriptor, scalar)?])),
        },
    }
}

fn scalar_string(descriptor: &Descriptor, value: Value) -> Result<Value, ConfigError> {
    match value {
        Value::Str(_) => Ok(value),
        Value::Int(i) => Ok(Value::Str(i.to_string())),
        other => Err(invalid(descriptor, &other, "expected a string")),
    }
}

/// Reject a string value outside the descriptor's validity set.
pub fn check_valid(descriptor: &Descriptor, value: &Value) -> Result<(), ConfigError> {
    let (Some(set), Some(s)) = (descriptor.valid_set, value.as_str()) else {
        return Ok(());
    };
    if set.contains(&s) {
        Ok(())
    } else {
        Err(invalid(
            descriptor,
            value,
            &format!("expected one of {}", set.join(", ")),
        ))
    }
}

fn invalid(descriptor: &Descriptor, value: &Value, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: descriptor.name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

//! Lenient typed lookups into a JSON parameter object.
//!
//! Every helper takes the object, a key, and a default. Missing keys and
//! values of the wrong JSON type fall back to the default, so configuration
//! structs can be built from partial objects. Range validation happens in
//! the constructors that consume these values, not here.

use std::str::FromStr;

use serde_json::Value;

use crate::error::VisError;

/// `params[name]` as `f64`; integers are widened.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

pub fn param_u64(params: &Value, name: &str, default: u64) -> u64 {
    params.get(name).and_then(Value::as_u64).unwrap_or(default)
}

pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// `params[name]` as a two-element numeric array `[a, b]`.
pub fn param_pair(params: &Value, name: &str, default: (f64, f64)) -> (f64, f64) {
    match params.get(name).and_then(Value::as_array).map(Vec::as_slice) {
        Some([a, b]) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => (a, b),
            _ => default,
        },
        _ => default,
    }
}

/// `params[name]` parsed as an enum choice.
///
/// Fails on a present but unrecognized string. A missing key or a
/// non-string value yields `default`.
pub fn param_choice<T: FromStr>(params: &Value, name: &str, default: T) -> Result<T, VisError> {
    match params.get(name).and_then(Value::as_str) {
        Some(s) => s
            .parse()
            .map_err(|_| VisError::invalid_param(name, format!("unrecognized value '{s}'"))),
        None => Ok(default),
    }
}

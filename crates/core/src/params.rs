// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hyperparameter splitting and `mlflow run` argument composition.
//!
//! SageMaker hands every estimator hyperparameter to the container in one
//! mapping. Keys carrying the run-control prefix configure `mlflow run`
//! itself (`--experiment-id 2`, `--no-conda`); everything else is forwarded
//! to the project entry point as `-P key=value`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered parameter mapping. Iteration order is the order keys were read.
pub type Params = IndexMap<String, ParamValue>;

/// A single parameter value.
///
/// `Flag` marks a parameter without a value (JSON `null`), which becomes a
/// bare `--key` switch among run options and `key=None` among project
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum ParamValue {
    Flag,
    Value(String),
}

impl ParamValue {
    pub fn value(s: impl Into<String>) -> Self {
        ParamValue::Value(s.into())
    }

    /// The string form, or `None` for a flag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Flag => None,
            ParamValue::Value(s) => Some(s),
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, ParamValue::Flag)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(PY_NONE))
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Flag,
            serde_json::Value::String(s) => ParamValue::Value(s),
            other => ParamValue::Value(py_str(&other)),
        }
    }
}

const PY_NONE: &str = "None";

/// Render a decoded JSON value the way Python's `str()` renders it after
/// `json.loads`: `True`, `None`, `1e-05`, `[1, 'a']`, `{'k': 2.0}`.
fn py_str(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => py_repr(other),
    }
}

fn py_repr(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => PY_NONE.to_string(),
        serde_json::Value::Bool(true) => "True".to_string(),
        serde_json::Value::Bool(false) => "False".to_string(),
        serde_json::Value::Number(n) => match (n.is_f64(), n.as_f64()) {
            (true, Some(f)) => py_float(f),
            _ => n.to_string(),
        },
        serde_json::Value::String(s) => py_quote(s),
        serde_json::Value::Array(items) => {
            let items: Vec<_> = items.iter().map(py_repr).collect();
            format!("[{}]", items.join(", "))
        }
        serde_json::Value::Object(map) => {
            let entries: Vec<_> = map.iter().map(|(k, v)| format!("{}: {}", py_quote(k), py_repr(v))).collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Shortest round-trip float, positional for exponents in `-4..16` and
/// scientific with a signed two-digit exponent otherwise.
fn py_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sci = format!("{f:e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if (-4..16).contains(&exp) {
        let mut s = format!("{f}");
        if !s.contains('.') {
            s.push_str(".0");
        }
        s
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

/// Python string repr: single quotes unless the text holds only `'`.
fn py_quote(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl From<ParamValue> for serde_json::Value {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Flag => serde_json::Value::Null,
            ParamValue::Value(s) => serde_json::Value::String(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Value(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Value(s)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Flag)
    }
}

/// Extract the entries whose key starts with `prefix`, with the prefix removed.
///
/// Keys without the prefix never appear in the result.
pub fn split_run_params(params: &Params, prefix: &str) -> Params {
    params
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(prefix).map(|param| (param.to_string(), value.clone()))
        })
        .collect()
}

/// Render run-control parameters as `mlflow run` options.
///
/// Each key becomes `--key`, followed by its value unless it is a flag.
pub fn run_param_args(params: &Params) -> Vec<String> {
    let mut args = Vec::with_capacity(params.len() * 2);
    for (key, value) in params {
        args.push(format!("--{key}"));
        if let Some(v) = value.as_str() {
            args.push(v.to_string());
        }
    }
    args
}

/// Render project parameters as `<flag> key=value` pairs. Flags render as
/// `key=None`.
pub fn hyper_param_args(params: &Params, flag: &str) -> Vec<String> {
    params
        .iter()
        .flat_map(|(key, value)| [flag.to_string(), format!("{key}={value}")])
        .collect()
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

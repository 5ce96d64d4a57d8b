use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// String-keyed, string-valued parameter record shared by every algorithm.
pub type ParameterMap = BTreeMap<String, String>;

/// A recognised parameter whose value could not be converted to its type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value '{value}' for parameter '{key}': {reason}")]
pub struct ParamError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Every parameter that failed to parse in one `set_params` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_errors(.0))]
pub struct ParamErrors(pub Vec<ParamError>);

impl ParamErrors {
    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.key.as_str()).collect()
    }
}

fn join_errors(errors: &[ParamError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Builds a [`ParameterMap`] from literal pairs.
pub fn param_map<K, V, I>(pairs: I) -> ParameterMap
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

pub fn format_bool(value: bool) -> String {
    let text = if value { "true" } else { "false" };
    text.to_string()
}

/// Six fractional digits, the fixed-point form used for every float parameter.
pub fn format_float(value: f64) -> String {
    format!("{value:.6}")
}

/// Reads typed values out of a [`ParameterMap`], collecting failures.
///
/// Targets are only written for keys that parse; callers apply the reader to
/// a scratch copy of their config and keep it only if [`finish`] succeeds.
///
/// [`finish`]: ParamReader::finish
pub struct ParamReader<'a> {
    params: &'a ParameterMap,
    errors: Vec<ParamError>,
}

impl<'a> ParamReader<'a> {
    pub fn new(params: &'a ParameterMap) -> Self {
        Self {
            params,
            errors: Vec::new(),
        }
    }

    /// Only the literal `"true"` is true; anything else is false.
    pub fn read_bool(&mut self, key: &str, target: &mut bool) {
        if let Some(value) = self.params.get(key) {
            *target = value == "true";
        }
    }

    pub fn read_int(&mut self, key: &str, target: &mut i32) {
        self.read_parsed(key, target);
    }

    pub fn read_float(&mut self, key: &str, target: &mut f64) {
        self.read_parsed(key, target);
    }

    fn read_parsed<T>(&mut self, key: &str, target: &mut T)
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(value) = self.params.get(key) else {
            return;
        };
        match value.trim().parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(e) => self.errors.push(ParamError {
                key: key.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn finish(self) -> Result<(), ParamErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ParamErrors(self.errors))
        }
    }
}

//! Environment configuration helpers
//!
//! [`EnvReader`] snapshots key/value pairs once, so configuration loading can
//! be exercised in tests without mutating the process environment.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// Required key is unset or blank
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    /// Value present but could not be parsed
    #[error("Invalid value for {key}: '{value}' ({detail})")]
    Invalid {
        key: String,
        value: String,
        detail: String,
    },
}

/// Read-only view over environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvReader {
    vars: HashMap<String, String>,
}

impl EnvReader {
    /// Snapshot the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are ignored.
    pub fn from_env() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Trimmed value, `None` when unset or blank
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value or `default`
    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Value, or [`EnvError::Missing`]
    pub fn required(&self, key: &str) -> Result<String, EnvError> {
        self.get(key)
            .map(str::to_string)
            .ok_or_else(|| EnvError::Missing(key.to_string()))
    }

    /// Parsed value, `default` when unset
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, EnvError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| EnvError::Invalid {
                key: key.to_string(),
                value: raw.to_string(),
                detail: e.to_string(),
            }),
        }
    }

    /// Comma-separated list, `default` when unset
    ///
    /// Entries are trimmed and blanks dropped.
    pub fn list_or(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.get(key) {
            Some(raw) => split_list(raw),
            None => default.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

//! Typed access to environment-style settings.
//!
//! Lookups go through an injected closure so tests can feed a plain map
//! instead of mutating the process environment.

use super::secret::SecretString;
use crate::error::ConfigError;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Reads and parses settings from a key/value lookup.
pub(crate) struct EnvReader<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> EnvReader<'a> {
    pub(crate) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    /// Trimmed value; an empty value counts as unset.
    pub(crate) fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    /// First key that is set, in order.
    pub(crate) fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.string(k))
    }

    pub(crate) fn secret(&self, key: &str) -> Option<SecretString> {
        self.string(key).map(SecretString::new)
    }

    pub(crate) fn parse_opt<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.string(key) {
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{}': {}", raw, e),
                }),
            None => Ok(None),
        }
    }

    pub(crate) fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse_opt(key)?.unwrap_or(default))
    }

    /// Human-friendly duration such as `4m` or `10s`.
    pub(crate) fn duration_or(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        match self.string(key) {
            Some(raw) => humantime::parse_duration(&raw).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{}': {}", raw, e),
            }),
            None => Ok(default),
        }
    }
}

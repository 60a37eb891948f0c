//! # Configuration Module
//!
//! Options accepted by [`Instance::new`](crate::Instance::new), the same
//! set whether built in code, loaded from YAML, or overridden from the
//! environment.
//!
//! ## Example Configuration
//!
//! ```yaml
//! prefix: /api
//! case_sensitive: true
//! ignore_trailing_slash: false
//! expose_head_routes: true
//! body_limit: 1048576
//! validate_requests: true
//! logger:
//!   level: info
//!   format: json
//! ```
//!
//! ## Environment Variables
//!
//! Applied by [`InstanceOptions::from_env`] on top of an existing value:
//!
//! - `ROUTESHAPE_PREFIX`
//! - `ROUTESHAPE_CASE_SENSITIVE` (`true`/`false`)
//! - `ROUTESHAPE_IGNORE_TRAILING_SLASH`
//! - `ROUTESHAPE_EXPOSE_HEAD_ROUTES`
//! - `ROUTESHAPE_BODY_LIMIT` (bytes, decimal or `0x` hex)
//! - `ROUTESHAPE_VALIDATE_REQUESTS`
//! - `ROUTESHAPE_LOG_LEVEL`, `ROUTESHAPE_LOG_FORMAT` (`json`/`pretty`)

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default request body limit: 1 MiB
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// Parse a format name; anything other than `pretty` means JSON.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logger settings used by [`init_logging`](crate::logging::init_logging)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// trace/debug/info/warn/error
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// Construction options for an [`Instance`](crate::Instance)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstanceOptions {
    /// Prefix prepended to every route template (e.g. `/api/v1`)
    pub prefix: String,
    /// Match static segments case-sensitively
    pub case_sensitive: bool,
    /// Treat `/a/` and `/a` as the same path
    pub ignore_trailing_slash: bool,
    /// Answer `HEAD` from the `GET` route when no `HEAD` route exists
    pub expose_head_routes: bool,
    /// Maximum accepted request body, in bytes
    pub body_limit: usize,
    /// Check requests against attached JSON Schema documents before decoding
    pub validate_requests: bool,
    pub logger: LoggerOptions,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            case_sensitive: true,
            ignore_trailing_slash: false,
            expose_head_routes: true,
            body_limit: DEFAULT_BODY_LIMIT,
            validate_requests: true,
            logger: LoggerOptions::default(),
        }
    }
}

impl InstanceOptions {
    /// Parse options from a YAML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails when the document is not valid YAML or a value has the wrong type.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse instance options")
    }

    /// Load options from a YAML file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Apply `ROUTESHAPE_*` environment overrides.
    ///
    /// Unparseable values are ignored with a warning and the current value kept.
    #[must_use]
    pub fn from_env(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    pub(crate) fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(prefix) = lookup("ROUTESHAPE_PREFIX") {
            self.prefix = prefix;
        }
        override_bool(&lookup, "ROUTESHAPE_CASE_SENSITIVE", &mut self.case_sensitive);
        override_bool(
            &lookup,
            "ROUTESHAPE_IGNORE_TRAILING_SLASH",
            &mut self.ignore_trailing_slash,
        );
        override_bool(&lookup, "ROUTESHAPE_EXPOSE_HEAD_ROUTES", &mut self.expose_head_routes);
        override_bool(&lookup, "ROUTESHAPE_VALIDATE_REQUESTS", &mut self.validate_requests);
        if let Some(val) = lookup("ROUTESHAPE_BODY_LIMIT") {
            let parsed = match val.strip_prefix("0x") {
                Some(hex) => usize::from_str_radix(hex, 16).ok(),
                None => val.parse().ok(),
            };
            match parsed {
                Some(limit) => self.body_limit = limit,
                None => tracing::warn!(value = %val, "Ignoring invalid ROUTESHAPE_BODY_LIMIT"),
            }
        }
        if let Some(level) = lookup("ROUTESHAPE_LOG_LEVEL") {
            self.logger.level = level;
        }
        if let Some(format) = lookup("ROUTESHAPE_LOG_FORMAT") {
            self.logger.format = LogFormat::parse(&format);
        }
        self
    }
}

fn override_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut bool) {
    let Some(val) = lookup(key) else {
        return;
    };
    match val.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => *target = true,
        "0" | "false" | "no" | "off" => *target = false,
        _ => tracing::warn!(key = key, value = %val, "Ignoring invalid boolean override"),
    }
}

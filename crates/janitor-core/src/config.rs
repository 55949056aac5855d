//! Configuration types and validation for janitor plugins
//!
//! Each plugin kind publishes a static [`ConfigSchema`]: an ordered list of
//! required keys with the message raised when one is absent, and a table of
//! optional keys with their defaults. [`validate`] is the single routine that
//! checks a [`PluginConfig`] against a schema.

use crate::error::{Error, Result};
use crate::plugins::PluginKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

/// Key holding the plugin's cleanup timeout in seconds
pub const CLEANUP_TIMEOUT: &str = "cleanup_timeout";

/// Default cleanup timeout, in seconds
pub const DEFAULT_CLEANUP_TIMEOUT_SECS: u64 = 60;

/// Environment variable signalling a local Pub/Sub emulator
pub const PUBSUB_EMULATOR_HOST_ENV: &str = "PUBSUB_EMULATOR_HOST";

/// Address used when the emulator signal is set but is not a `host:port`
pub const DEFAULT_EMULATOR_HOST: &str = "localhost:8085";

/// Raw configuration for a single plugin
///
/// Keys are strings; values are strings, numbers or paths. Once built the
/// mapping is never mutated in place, only consumed by the builder methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig {
    values: BTreeMap<String, Value>,
}

impl PluginConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `key` set to `value`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Return a copy with `key` removed
    pub fn without(mut self, key: &str) -> Self {
        self.values.remove(key);
        self
    }

    /// Raw value for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether `key` carries a usable value
    ///
    /// `null` and the empty string count as absent.
    pub fn contains(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(is_present)
    }

    /// Number of keys, usable or not
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the configuration has no keys at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PluginConfig
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A key a plugin kind cannot be built without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredKey {
    /// Configuration key
    pub key: &'static str,
    /// Message raised (and logged) when the key is absent
    pub message: &'static str,
}

/// Default applied to an optional key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// A duration in whole seconds
    Seconds(u64),
    /// A literal string
    Str(&'static str),
}

impl DefaultValue {
    fn to_value(self) -> Value {
        match self {
            DefaultValue::Seconds(secs) => Value::from(secs),
            DefaultValue::Str(s) => Value::from(s),
        }
    }
}

/// An optional key together with its default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalKey {
    /// Configuration key
    pub key: &'static str,
    /// Value used when the key is absent
    pub default: DefaultValue,
}

/// Static configuration schema for one plugin kind
#[derive(Debug, Clone, Copy)]
pub struct ConfigSchema {
    /// Plugin kind this schema belongs to
    pub kind: PluginKind,
    /// Required keys, checked in declaration order
    pub required: &'static [RequiredKey],
    /// Optional keys with defaults
    pub optional: &'static [OptionalKey],
}

/// Configuration that passed [`validate`], merged with schema defaults
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    kind: PluginKind,
    values: BTreeMap<String, Value>,
    required: BTreeMap<&'static str, String>,
    cleanup_timeout: Duration,
}

impl ValidatedConfig {
    /// Plugin kind the configuration was validated for
    pub fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Configured cleanup timeout, defaulting to 60 seconds
    pub fn cleanup_timeout(&self) -> Duration {
        self.cleanup_timeout
    }

    /// Text of a required key
    ///
    /// Empty for keys outside the schema's required list.
    pub fn required(&self, key: &str) -> &str {
        self.required.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Text of any key carrying a usable value (defaults included)
    pub fn text(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .filter(|v| is_present(v))
            .and_then(value_text)
    }

    /// Path to the service account keyfile
    pub fn keyfile(&self) -> PathBuf {
        PathBuf::from(self.required("keyfile"))
    }

    /// OAuth scopes, from a list or a space/comma separated string
    pub fn scopes(&self) -> Vec<String> {
        match self.values.get("scopes") {
            Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
            Some(Value::String(s)) => s
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Validate `config` against `schema`
///
/// Fails on the first absent required key, in declaration order, with that
/// key's message. A required key set to `null`, `false`, zero or `""` is
/// absent. Every failure is logged exactly once at error level; a
/// successful validation logs nothing.
pub fn validate(config: &PluginConfig, schema: &ConfigSchema) -> Result<ValidatedConfig> {
    let mut required = BTreeMap::new();
    for req in schema.required {
        match config.get(req.key).filter(|v| is_truthy(v)).and_then(value_text) {
            Some(text) => {
                required.insert(req.key, text);
            }
            None => return Err(fail(schema.kind, req.message.to_string())),
        }
    }

    let mut values = config.values.clone();
    for opt in schema.optional {
        if !config.contains(opt.key) {
            values.insert(opt.key.to_string(), opt.default.to_value());
        }
    }

    let cleanup_timeout = match values.get(CLEANUP_TIMEOUT).filter(|v| is_present(v)) {
        Some(value) => parse_seconds(value).ok_or_else(|| {
            fail(
                schema.kind,
                format!(
                    "The {} for the {} plugin must be a whole number of seconds, got {}.",
                    CLEANUP_TIMEOUT, schema.kind, value
                ),
            )
        })?,
        None => Duration::from_secs(DEFAULT_CLEANUP_TIMEOUT_SECS),
    };

    Ok(ValidatedConfig {
        kind: schema.kind,
        values,
        required,
        cleanup_timeout,
    })
}

fn fail(kind: PluginKind, msg: String) -> Error {
    error!(plugin = %kind, "{}", msg);
    Error::config(msg)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Required keys also reject `false` and zero
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        other => is_present(other),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_seconds(value: &Value) -> Option<Duration> {
    match value {
        Value::Number(n) => n.as_u64().map(Duration::from_secs),
        Value::String(s) => s.trim().parse::<u64>().ok().map(Duration::from_secs),
        _ => None,
    }
}

/// Options resolved once at process startup and handed to a client factory
///
/// Client factories never read the environment themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pubsub_emulator: Option<String>,
}

impl ClientOptions {
    /// Options targeting the live services
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve options from `PUBSUB_EMULATOR_HOST`
    pub fn from_env() -> Self {
        Self::from_emulator_signal(
            std::env::var_os(PUBSUB_EMULATOR_HOST_ENV).map(|v| v.to_string_lossy().into_owned()),
        )
    }

    /// Resolve options from a raw emulator signal
    ///
    /// Any non-empty value enables emulator mode.
    pub fn from_emulator_signal(signal: Option<String>) -> Self {
        Self {
            pubsub_emulator: signal.filter(|s| !s.is_empty()),
        }
    }

    /// Options targeting a Pub/Sub emulator at `host`
    pub fn with_pubsub_emulator(host: impl Into<String>) -> Self {
        Self::from_emulator_signal(Some(host.into()))
    }

    /// Whether Pub/Sub should target a local emulator
    pub fn is_emulated(&self) -> bool {
        self.pubsub_emulator.is_some()
    }

    /// `host:port` of the emulator, if emulator mode is on
    ///
    /// A signal that is merely truthy (e.g. `"1"` or `"True"`) resolves to
    /// [`DEFAULT_EMULATOR_HOST`].
    pub fn pubsub_emulator_host(&self) -> Option<&str> {
        let signal = self.pubsub_emulator.as_deref()?;
        let signal = signal.trim();
        let host = signal
            .strip_prefix("http://")
            .unwrap_or(signal)
            .trim_end_matches('/');
        let valid = host
            .rsplit_once(':')
            .is_some_and(|(name, port)| !name.is_empty() && port.parse::<u16>().is_ok());
        Some(if valid { host } else { DEFAULT_EMULATOR_HOST })
    }
}

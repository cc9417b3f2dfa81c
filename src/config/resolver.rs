//! Namespaced key/value configuration with source precedence.
//!
//! Every flag in the command tree registers a slot here while the tree is
//! assembled. At execution time a lookup walks the precedence chain:
//! explicit CLI flag > environment variable > configuration file > default.
//! Environment variables are read at lookup time so the value reflects the
//! actual invocation.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Result type for configuration lookups
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while resolving configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No source supplied a value for a key that requires one
    #[error("no value found for {key:?}")]
    MissingValue {
        /// The namespace key that was queried
        key: String,
    },

    /// A typed accessor was used on a value of a different type
    #[error("{key:?} is not a {expected}")]
    TypeMismatch {
        /// The namespace key that was queried
        key: String,
        /// The type the accessor expected
        expected: &'static str,
    },

    /// The configuration file could not be read or parsed
    #[error("configuration file error: {0}")]
    File(String),
}

/// A typed configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// String value
    Str(String),
    /// Integer value
    Int(i64),
    /// Boolean value
    Bool(bool),
    /// List of strings
    StrList(Vec<String>),
}

impl ConfigValue {
    /// True when the value carries no usable content (empty string or list)
    pub fn is_empty(&self) -> bool {
        match self {
            ConfigValue::Str(s) => s.is_empty(),
            ConfigValue::StrList(l) => l.is_empty(),
            ConfigValue::Int(_) | ConfigValue::Bool(_) => false,
        }
    }
}

/// Where a value came from; used only to order the precedence chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Explicitly supplied on the invoked command line
    Flag,
    /// Bound environment variable
    Env,
    /// Loaded configuration file entry
    File,
    /// Compiled-in default
    Default,
}

#[derive(Debug, Default)]
struct Slot {
    flag: Option<ConfigValue>,
    env_var: Option<String>,
    file: Option<ConfigValue>,
    default: Option<ConfigValue>,
}

/// Key/value store consulted by command handlers.
///
/// Binding happens once while the command tree is built; lookups happen only
/// at execution time. The executor freezes the resolver behind an `Arc`
/// before any handler runs, so concurrent reads need no locking.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    slots: HashMap<String, Slot>,
}

impl ConfigResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value for `key` at the given source level.
    ///
    /// `ValueSource::Env` slots carry a variable *name*, not a value; use
    /// [`bind_env`](Self::bind_env) for those.
    pub fn bind(&mut self, key: &str, source: ValueSource, value: ConfigValue) {
        let slot = self.slots.entry(key.to_string()).or_default();
        match source {
            ValueSource::Flag => slot.flag = Some(value),
            ValueSource::File => slot.file = Some(value),
            ValueSource::Default => slot.default = Some(value),
            ValueSource::Env => {
                if let ConfigValue::Str(var) = value {
                    slot.env_var = Some(var);
                }
            }
        }
    }

    /// Bind an environment variable name to `key`. The variable is read at
    /// lookup time.
    pub fn bind_env(&mut self, key: &str, var: &str) {
        self.slots.entry(key.to_string()).or_default().env_var = Some(var.to_string());
    }

    /// Resolve `key` through the precedence chain. Returns `None` when no
    /// source yields a value.
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let slot = self.slots.get(key)?;

        if let Some(v) = &slot.flag {
            return Some(v.clone());
        }
        if let Some(var) = &slot.env_var {
            if let Ok(v) = env::var(var) {
                return Some(ConfigValue::Str(v));
            }
        }
        if let Some(v) = &slot.file {
            return Some(v.clone());
        }
        slot.default.clone()
    }

    /// Resolve `key` consulting only explicit sources (flag, env, file).
    ///
    /// A compiled-in default never satisfies this; `Int(0)` or `Bool(false)`
    /// registered as a flag default would otherwise pass for a supplied
    /// value.
    pub fn get_explicit(&self, key: &str) -> Option<ConfigValue> {
        let slot = self.slots.get(key)?;

        if let Some(v) = &slot.flag {
            return Some(v.clone());
        }
        if let Some(var) = &slot.env_var {
            if let Ok(v) = env::var(var) {
                return Some(ConfigValue::Str(v));
            }
        }
        slot.file.clone()
    }

    /// Resolve `key`, failing with [`ConfigError::MissingValue`] unless an
    /// explicit source yields a non-empty value.
    pub fn get_required(&self, key: &str) -> ConfigResult<ConfigValue> {
        match self.get_explicit(key) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(ConfigError::MissingValue { key: key.to_string() }),
        }
    }

    /// String accessor. Missing keys resolve to an empty string; env and file
    /// entries are already strings.
    pub fn get_str(&self, key: &str) -> ConfigResult<String> {
        match self.get(key) {
            None => Ok(String::new()),
            Some(ConfigValue::Str(s)) => Ok(s),
            Some(_) => Err(ConfigError::TypeMismatch { key: key.to_string(), expected: "string" }),
        }
    }

    /// Integer accessor. String values from the environment or file are
    /// parsed; a parse failure is a type mismatch.
    pub fn get_int(&self, key: &str) -> ConfigResult<i64> {
        match self.get(key) {
            None => Ok(0),
            Some(ConfigValue::Int(i)) => Ok(i),
            Some(ConfigValue::Str(s)) => s
                .parse()
                .map_err(|_| ConfigError::TypeMismatch { key: key.to_string(), expected: "integer" }),
            Some(_) => Err(ConfigError::TypeMismatch { key: key.to_string(), expected: "integer" }),
        }
    }

    /// Boolean accessor with the same string coercion rules as integers.
    pub fn get_bool(&self, key: &str) -> ConfigResult<bool> {
        match self.get(key) {
            None => Ok(false),
            Some(ConfigValue::Bool(b)) => Ok(b),
            Some(ConfigValue::Str(s)) => match s.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                _ => Err(ConfigError::TypeMismatch { key: key.to_string(), expected: "boolean" }),
            },
            Some(_) => Err(ConfigError::TypeMismatch { key: key.to_string(), expected: "boolean" }),
        }
    }

    /// String-list accessor. A bare string splits on commas, matching how a
    /// list flag is written in the environment or config file.
    pub fn get_str_list(&self, key: &str) -> ConfigResult<Vec<String>> {
        match self.get(key) {
            None => Ok(vec![]),
            Some(ConfigValue::StrList(l)) => Ok(l),
            Some(ConfigValue::Str(s)) => {
                if s.is_empty() {
                    Ok(vec![])
                } else {
                    Ok(s.split(',').map(|p| p.trim().to_string()).collect())
                }
            }
            Some(_) => Err(ConfigError::TypeMismatch { key: key.to_string(), expected: "string list" }),
        }
    }

    /// True when `key` has a slot registered, regardless of whether any
    /// source currently yields a value.
    pub fn is_bound(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        let var = "NIMBUSCTL_TEST_PRECEDENCE_REGION";
        env::set_var(var, "env-region");

        let mut r = ConfigResolver::new();
        r.bind("nimbus.volume.list.region", ValueSource::Default, ConfigValue::Str("default-region".into()));
        r.bind("nimbus.volume.list.region", ValueSource::File, ConfigValue::Str("file-region".into()));
        r.bind_env("nimbus.volume.list.region", var);
        r.bind("nimbus.volume.list.region", ValueSource::Flag, ConfigValue::Str("flag-region".into()));

        // Flag wins over everything
        assert_eq!(r.get_str("nimbus.volume.list.region").unwrap(), "flag-region");

        // Remove the flag binding: env wins
        let mut r = ConfigResolver::new();
        r.bind("nimbus.volume.list.region", ValueSource::Default, ConfigValue::Str("default-region".into()));
        r.bind("nimbus.volume.list.region", ValueSource::File, ConfigValue::Str("file-region".into()));
        r.bind_env("nimbus.volume.list.region", var);
        assert_eq!(r.get_str("nimbus.volume.list.region").unwrap(), "env-region");

        // Remove env: file wins
        env::remove_var(var);
        assert_eq!(r.get_str("nimbus.volume.list.region").unwrap(), "file-region");

        // Remove file: default wins
        let mut r = ConfigResolver::new();
        r.bind("nimbus.volume.list.region", ValueSource::Default, ConfigValue::Str("default-region".into()));
        assert_eq!(r.get_str("nimbus.volume.list.region").unwrap(), "default-region");
    }

    #[test]
    fn test_get_required_missing() {
        let r = ConfigResolver::new();
        let err = r.get_required("nimbus.server.create.size").unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue { .. }));

        // An empty string counts as missing
        let mut r = ConfigResolver::new();
        r.bind("nimbus.server.create.size", ValueSource::Default, ConfigValue::Str(String::new()));
        assert!(r.get_required("nimbus.server.create.size").is_err());
    }

    #[test]
    fn test_get_required_ignores_defaults() {
        // A non-empty default still does not count as a supplied value,
        // even for types with no empty representation.
        let mut r = ConfigResolver::new();
        r.bind("volume.create.size", ValueSource::Default, ConfigValue::Int(0));
        r.bind("volume.create.region", ValueSource::Default, ConfigValue::Str("fra1".into()));

        assert!(r.get_explicit("volume.create.size").is_none());
        assert!(r.get_required("volume.create.size").is_err());
        assert!(r.get_required("volume.create.region").is_err());

        // Any explicit source satisfies it
        r.bind("volume.create.size", ValueSource::File, ConfigValue::Int(250));
        assert_eq!(r.get_required("volume.create.size").unwrap(), ConfigValue::Int(250));

        r.bind("volume.create.size", ValueSource::Flag, ConfigValue::Int(100));
        assert_eq!(r.get_explicit("volume.create.size").unwrap(), ConfigValue::Int(100));
    }

    #[test]
    fn test_typed_accessor_mismatch() {
        let mut r = ConfigResolver::new();
        r.bind("nimbus.volume.create.size", ValueSource::Flag, ConfigValue::Int(100));

        let err = r.get_str("nimbus.volume.create.size").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { expected: "string", .. }));
        assert_eq!(r.get_int("nimbus.volume.create.size").unwrap(), 100);
    }

    #[test]
    fn test_string_coercion() {
        let mut r = ConfigResolver::new();
        r.bind("a.b.count", ValueSource::File, ConfigValue::Str("42".into()));
        r.bind("a.b.wait", ValueSource::File, ConfigValue::Str("true".into()));
        r.bind("a.b.keys", ValueSource::File, ConfigValue::Str("k1, k2,k3".into()));

        assert_eq!(r.get_int("a.b.count").unwrap(), 42);
        assert!(r.get_bool("a.b.wait").unwrap());
        assert_eq!(r.get_str_list("a.b.keys").unwrap(), vec!["k1", "k2", "k3"]);

        r.bind("a.b.bad", ValueSource::File, ConfigValue::Str("nope".into()));
        assert!(r.get_int("a.b.bad").is_err());
        assert!(r.get_bool("a.b.bad").is_err());
    }

    #[test]
    fn test_unset_keys_resolve_to_zero_values() {
        let r = ConfigResolver::new();
        assert_eq!(r.get_str("missing").unwrap(), "");
        assert_eq!(r.get_int("missing").unwrap(), 0);
        assert!(!r.get_bool("missing").unwrap());
        assert!(r.get_str_list("missing").unwrap().is_empty());
        assert!(r.get("missing").is_none());
    }
}

//! Configuration file loading.
//!
//! The file is a TOML key/value document whose keys correspond to namespace
//! keys. Nested tables flatten into dotted keys, so
//!
//! ```toml
//! access-token = "..."
//!
//! [server.create]
//! region = "fra1"
//! ```
//!
//! binds `access-token` and `server.create.region` at `File` precedence.
//! The file is loaded once at startup, before flag binding.

use super::resolver::{ConfigError, ConfigResolver, ConfigResult, ConfigValue, ValueSource};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the configuration file, under the user config
/// directory. `None` when the platform has no config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nimbusctl").join("config.toml"))
}

/// Load a `.env` file before environment binding.
///
/// Only an explicitly supplied path is loaded; without one, repository or
/// system `.env` files would leak into unit tests that expect defaults.
pub fn load_env_file(path: Option<&Path>) {
    if let Some(p) = path {
        if p.exists() {
            if let Err(e) = dotenv::from_path(p) {
                eprintln!("Warning: failed to load env file: {}", e);
            }
        }
    }
}

/// Load the configuration file into `resolver` at `File` precedence.
///
/// An absent file at the default location is not an error; an explicitly
/// requested file that cannot be read is.
pub fn load_config_file(
    resolver: &mut ConfigResolver,
    path: Option<&Path>,
) -> ConfigResult<()> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(()),
        },
    };

    if !path.exists() {
        if explicit {
            return Err(ConfigError::File(format!(
                "can't open configuration file: {}",
                path.display()
            )));
        }
        return Ok(());
    }

    let raw = fs::read_to_string(&path)
        .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))?;
    let table: toml::Table = raw
        .parse()
        .map_err(|e| ConfigError::File(format!("{}: {}", path.display(), e)))?;

    bind_table(resolver, "", &table);
    Ok(())
}

fn bind_table(resolver: &mut ConfigResolver, prefix: &str, table: &toml::Table) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        match value {
            toml::Value::Table(t) => bind_table(resolver, &key, t),
            toml::Value::String(s) => {
                resolver.bind(&key, ValueSource::File, ConfigValue::Str(s.clone()))
            }
            toml::Value::Integer(i) => resolver.bind(&key, ValueSource::File, ConfigValue::Int(*i)),
            toml::Value::Boolean(b) => {
                resolver.bind(&key, ValueSource::File, ConfigValue::Bool(*b))
            }
            toml::Value::Array(items) => {
                let list: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect();
                resolver.bind(&key, ValueSource::File, ConfigValue::StrList(list));
            }
            // Floats and datetimes have no flag type to land in
            _ => {}
        }
    }
}

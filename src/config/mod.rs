//! Configuration resolution: flag, environment, file, and default sources
//! layered behind namespaced keys.

mod file;
mod resolver;

pub use file::{default_config_path, load_config_file, load_env_file};
pub use resolver::{ConfigError, ConfigResolver, ConfigResult, ConfigValue, ValueSource};

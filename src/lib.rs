//! nimbusctl — command-line client for the Nimbus cloud API.
//!
//! The crate is organized around a small command framework:
//!
//! - [`command`] — the descriptor tree, namespace keys, and the executor
//!   that parses, binds configuration, and dispatches async handlers.
//! - [`config`] — namespaced key/value resolution with flag > env > file >
//!   default precedence, plus TOML config-file loading.
//! - [`api`] — the HTTP client, cursor-following pagination, and the
//!   per-resource service traits.
//! - [`batch`] — concurrent fan-out for commands that map one invocation
//!   onto many remote calls.
//! - [`display`] — text-table and JSON rendering of command results.
//! - [`commands`] — the actual `server` / `volume` / `volume-action`
//!   surface built on all of the above.

pub mod api;
pub mod batch;
pub mod command;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod observability;

pub use command::context::{CmdContext, Services};
pub use command::{execute_from, CommandSpec, FlagDef};
pub use config::{ConfigResolver, ConfigValue, ValueSource};
pub use error::{CliError, CliResult};

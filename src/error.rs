//! Error types for command execution

use crate::api::ApiError;
use crate::config::ConfigError;
use thiserror::Error;

/// Result type for command operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur while resolving and running a command
#[derive(Debug, Error)]
pub enum CliError {
    /// Positional arguments absent or wrong count
    #[error("({ns}) command is missing required arguments")]
    MissingArguments {
        /// Namespace of the command that was invoked
        ns: String,
    },

    /// A required flag was not resolved by any configuration source
    #[error("({ns}) command requires a value for \"--{flag}\"")]
    MissingRequiredFlag {
        /// Namespace of the command that was invoked
        ns: String,
        /// Name of the unresolved flag
        flag: String,
    },

    /// A name matched more than one resource where exactly one was expected
    #[error("{count} {kind}s match the name {name:?}, refusing to guess")]
    AmbiguousName {
        /// Resource kind (server, volume, ...)
        kind: &'static str,
        /// The supplied name
        name: String,
        /// How many resources matched
        count: usize,
    },

    /// A name matched no resource at all
    #[error("unable to find {kind} named {name:?}")]
    NotFound {
        /// Resource kind (server, volume, ...)
        kind: &'static str,
        /// The supplied name
        name: String,
    },

    /// One or more jobs of a fanned-out batch failed
    #[error("{failed} of {total} requests failed: {detail}")]
    Batch {
        /// Number of failed jobs
        failed: usize,
        /// Total number of jobs
        total: usize,
        /// Joined per-job error messages
        detail: String,
    },

    /// Invalid argument value
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration resolution error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Remote API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Missing-arguments error for the given command namespace
    pub fn missing_args(ns: &str) -> Self {
        Self::MissingArguments { ns: ns.to_string() }
    }
}

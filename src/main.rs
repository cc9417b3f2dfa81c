//! nimbusctl binary: bootstrap, dispatch, top-level error reporting.

use anyhow::Result;
use colored::Colorize;
use nimbusctl::api::{ApiClient, DEFAULT_API_URL};
use nimbusctl::command::context::{stdout_output, Services};
use nimbusctl::command::execute_from;
use nimbusctl::commands;
use nimbusctl::config::{load_config_file, load_env_file, ConfigResolver};
use nimbusctl::observability::TraceLogger;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();

    load_env_file(Some(Path::new(".env")));

    // The config path and connection settings are needed before the full
    // parse binds flags, so they are pre-scanned from argv. The parse still
    // validates them afterwards.
    let config_path = flag_value(&argv, "--config", None).map(PathBuf::from);

    let mut resolver = ConfigResolver::new();
    commands::bind_environment(&mut resolver);
    load_config_file(&mut resolver, config_path.as_deref())?;

    let token = flag_value(&argv, "--access-token", Some("-t"))
        .or_else(|| {
            resolver
                .get_str(commands::ARG_ACCESS_TOKEN)
                .ok()
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_default();

    let mut client = ApiClient::new(DEFAULT_API_URL, &token);
    if flag_present(&argv, "--trace") {
        let logger = TraceLogger::new(None)?;
        if flag_present(&argv, "--verbose") || flag_present(&argv, "-v") {
            eprintln!("tracing API requests to {}", logger.path().display());
        }
        client = client.with_trace(logger);
    }

    let root = commands::root();
    execute_from(&root, resolver, Services::http(client), stdout_output(), argv).await?;
    Ok(())
}

fn flag_value(argv: &[String], long: &str, short: Option<&str>) -> Option<String> {
    let mut it = argv.iter();
    while let Some(arg) = it.next() {
        if arg == long || short.is_some_and(|s| arg == s) {
            return it.next().cloned();
        }
        if let Some(v) = arg.strip_prefix(long).and_then(|rest| rest.strip_prefix('=')) {
            return Some(v.to_string());
        }
    }
    None
}

fn flag_present(argv: &[String], name: &str) -> bool {
    argv.iter().any(|a| a == name)
}

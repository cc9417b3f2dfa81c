//! Execution context handed to command runners.

use crate::api::servers::ServerService;
use crate::api::volume_actions::VolumeActionService;
use crate::api::volumes::VolumeService;
use crate::api::ApiClient;
use crate::api::{
    servers::HttpServerService, volume_actions::HttpVolumeActionService, volumes::HttpVolumeService,
};
use crate::config::ConfigResolver;
use crate::display::{Displayable, Displayer};
use crate::error::CliResult;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared output writer; batch jobs render concurrently through it.
pub type SharedOutput = Arc<Mutex<Box<dyn Write + Send>>>;

/// A [`SharedOutput`] writing to stdout.
pub fn stdout_output() -> SharedOutput {
    let out: Box<dyn Write + Send> = Box::new(std::io::stdout());
    Arc::new(Mutex::new(out))
}

/// Service handles a command runner can call.
///
/// Handlers hold trait objects so tests can substitute recording mocks for
/// the HTTP implementations.
#[derive(Clone)]
pub struct Services {
    /// Server resource operations
    pub servers: Arc<dyn ServerService>,
    /// Volume resource operations
    pub volumes: Arc<dyn VolumeService>,
    /// Volume attach/detach operations
    pub volume_actions: Arc<dyn VolumeActionService>,
}

impl Services {
    /// Services backed by the real API.
    pub fn http(client: ApiClient) -> Self {
        Self {
            servers: Arc::new(HttpServerService::new(client.clone())),
            volumes: Arc::new(HttpVolumeService::new(client.clone())),
            volume_actions: Arc::new(HttpVolumeActionService::new(client)),
        }
    }
}

/// Everything a runner needs: its namespace, the frozen configuration, the
/// raw positional arguments, service handles, and where to write output.
#[derive(Clone)]
pub struct CmdContext {
    /// Namespace of the invoked command (`parent.command`)
    pub ns: String,
    /// Resolved configuration, read-only during execution
    pub config: Arc<ConfigResolver>,
    /// Positional arguments as supplied, unparsed
    pub args: Vec<String>,
    /// Remote service handles
    pub services: Services,
    out: SharedOutput,
}

impl CmdContext {
    /// Assemble a context. Called by the executor once per invocation.
    pub fn new(
        ns: String,
        config: Arc<ConfigResolver>,
        args: Vec<String>,
        services: Services,
        out: SharedOutput,
    ) -> Self {
        Self { ns, config, args, services, out }
    }

    /// Configuration key for one of this command's flags.
    pub fn flag_key(&self, flag: &str) -> String {
        super::namespace::flag_key(&self.ns, flag)
    }

    /// Render `item` through the display subsystem, honoring the resolved
    /// output format and this command's format/no-header flags.
    pub async fn display(&self, item: &dyn Displayable) -> CliResult<()> {
        let displayer = Displayer::new(&self.ns, &self.config);
        let mut out = self.out.lock().await;
        displayer.render(item, out.as_mut())
    }

    /// Write a plain status line (delete confirmations and the like).
    pub async fn write_line(&self, line: &str) -> CliResult<()> {
        let mut out = self.out.lock().await;
        writeln!(out, "{}", line)?;
        Ok(())
    }
}

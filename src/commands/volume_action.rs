//! `volume-action` commands: attach and detach.

use crate::command::context::CmdContext;
use crate::command::CommandSpec;
use crate::error::{CliError, CliResult};

/// The `volume-action` command and its subcommands.
pub fn commands() -> CommandSpec {
    CommandSpec::builder("volume-action", "volume attachment commands")
        .subcommand(
            CommandSpec::builder("attach", "attach a volume to a server")
                .run(run_attach)
                .build(),
        )
        .subcommand(
            CommandSpec::builder("detach", "detach a volume from its server")
                .run(run_detach)
                .build(),
        )
        .build()
}

async fn run_attach(ctx: CmdContext) -> CliResult<()> {
    // Exactly <volume-id> <server-id>; a wrong count is an error, not a no-op.
    if ctx.args.len() != 2 {
        return Err(CliError::missing_args(&ctx.ns));
    }
    let volume_id = &ctx.args[0];
    let server_id: i64 = ctx.args[1].parse().map_err(|_| {
        CliError::InvalidArgument(format!("server id {:?} is not numeric", ctx.args[1]))
    })?;

    ctx.services.volume_actions.attach(volume_id, server_id).await?;
    ctx.write_line(&format!("attached volume {} to server {}", volume_id, server_id))
        .await
}

async fn run_detach(ctx: CmdContext) -> CliResult<()> {
    if ctx.args.len() != 1 {
        return Err(CliError::missing_args(&ctx.ns));
    }
    let volume_id = &ctx.args[0];
    ctx.services.volume_actions.detach(volume_id).await?;
    ctx.write_line(&format!("detached volume {}", volume_id)).await
}

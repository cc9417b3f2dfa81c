//! `volume` commands: list, get, create, delete.

use super::{ARG_DESCRIPTION, ARG_REGION, ARG_SIZE, ARG_VOLUME_ID};
use crate::api::volumes::{Volume, VolumeCreateRequest};
use crate::command::context::CmdContext;
use crate::command::{CommandSpec, FlagDef};
use crate::display::Displayable;
use crate::error::{CliError, CliResult};

const COLS: &[&str] = &["ID", "Name", "Region", "Size", "Description", "Server"];

struct VolumeDisplay(Vec<Volume>);

impl Displayable for VolumeDisplay {
    fn cols(&self) -> &[&'static str] {
        COLS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|v| {
                vec![
                    v.id.clone(),
                    v.name.clone(),
                    v.region.clone(),
                    format!("{} GiB", v.size_gb),
                    v.description.clone(),
                    v.server_id.map(|id| id.to_string()).unwrap_or_default(),
                ]
            })
            .collect()
    }

    fn json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or(serde_json::Value::Null)
    }
}

/// The `volume` command and its subcommands.
pub fn commands() -> CommandSpec {
    CommandSpec::builder("volume", "block storage volume commands")
        .alias("v")
        .subcommand(
            CommandSpec::builder("list", "list volumes")
                .flag(FlagDef::string(ARG_REGION, "", "Show only volumes in this region"))
                .columns(COLS)
                .run(run_list)
                .build(),
        )
        .subcommand(
            CommandSpec::builder("get", "get a volume")
                .flag(FlagDef::string(ARG_VOLUME_ID, "", "Volume id to fetch").required())
                .columns(COLS)
                .run(run_get)
                .build(),
        )
        .subcommand(
            CommandSpec::builder("create", "create a volume")
                .flag(FlagDef::int(ARG_SIZE, 0, "Size in GiB").required())
                .flag(FlagDef::string(ARG_DESCRIPTION, "", "Volume description").required())
                .flag(FlagDef::string(ARG_REGION, "", "Region for the new volume").required())
                .columns(COLS)
                .run(run_create)
                .build(),
        )
        .subcommand(
            CommandSpec::builder("delete", "delete a volume")
                .run(run_delete)
                .build(),
        )
        .build()
}

async fn run_list(ctx: CmdContext) -> CliResult<()> {
    if !ctx.args.is_empty() {
        return Err(CliError::missing_args(&ctx.ns));
    }
    let region = ctx.config.get_str(&ctx.flag_key(ARG_REGION))?;
    let volumes = ctx.services.volumes.list(&region).await?;
    ctx.display(&VolumeDisplay(volumes)).await
}

async fn run_get(ctx: CmdContext) -> CliResult<()> {
    if !ctx.args.is_empty() {
        return Err(CliError::missing_args(&ctx.ns));
    }
    let id = ctx.config.get_str(&ctx.flag_key(ARG_VOLUME_ID))?;
    let volume = ctx.services.volumes.get(&id).await?;
    ctx.display(&VolumeDisplay(vec![volume])).await
}

async fn run_create(ctx: CmdContext) -> CliResult<()> {
    if ctx.args.len() != 1 {
        return Err(CliError::missing_args(&ctx.ns));
    }

    let req = VolumeCreateRequest {
        name: ctx.args[0].clone(),
        region: ctx.config.get_str(&ctx.flag_key(ARG_REGION))?,
        description: ctx.config.get_str(&ctx.flag_key(ARG_DESCRIPTION))?,
        size_gb: ctx.config.get_int(&ctx.flag_key(ARG_SIZE))?,
    };

    let volume = ctx.services.volumes.create(&req).await?;
    ctx.display(&VolumeDisplay(vec![volume])).await
}

async fn run_delete(ctx: CmdContext) -> CliResult<()> {
    if ctx.args.len() != 1 {
        return Err(CliError::missing_args(&ctx.ns));
    }
    let id = &ctx.args[0];
    ctx.services.volumes.delete(id).await?;
    ctx.write_line(&format!("deleted volume {}", id)).await
}

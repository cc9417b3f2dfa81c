//! `server` commands: list, get, create, delete.

use super::{
    ARG_BACKUPS, ARG_IMAGE, ARG_IPV6, ARG_PRIVATE_NETWORKING, ARG_REGION, ARG_SIZE, ARG_SSH_KEYS,
    ARG_USER_DATA, ARG_USER_DATA_FILE, ARG_VOLUMES, ARG_WAIT,
};
use crate::api::servers::{ImageRef, Server, ServerCreateRequest};
use crate::batch::run_batch;
use crate::command::context::CmdContext;
use crate::command::{CommandSpec, FlagDef};
use crate::display::Displayable;
use crate::error::{CliError, CliResult};

const COLS: &[&str] = &["ID", "Name", "Region", "Size", "Image", "Status", "Created"];

struct ServerDisplay(Vec<Server>);

impl Displayable for ServerDisplay {
    fn cols(&self) -> &[&'static str] {
        COLS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|s| {
                vec![
                    s.id.to_string(),
                    s.name.clone(),
                    s.region.clone(),
                    s.size.clone(),
                    s.image.clone(),
                    s.status.clone(),
                    s.created_at.to_rfc3339(),
                ]
            })
            .collect()
    }

    fn json(&self) -> serde_json::Value {
        serde_json::to_value(&self.0).unwrap_or(serde_json::Value::Null)
    }
}

/// The `server` command and its subcommands.
pub fn commands() -> CommandSpec {
    CommandSpec::builder("server", "server commands")
        .alias("s")
        .subcommand(
            CommandSpec::builder("list", "list servers, optionally matching a name glob")
                .flag(FlagDef::string(ARG_REGION, "", "Show only servers in this region"))
                .columns(COLS)
                .run(run_list)
                .build(),
        )
        .subcommand(
            CommandSpec::builder("get", "get a server by id")
                .columns(COLS)
                .run(run_get)
                .build(),
        )
        .subcommand(
            CommandSpec::builder("create", "create one server per given name")
                .flag(FlagDef::string(ARG_REGION, "", "Region for the new servers").required())
                .flag(FlagDef::string(ARG_SIZE, "", "Size slug for the new servers").required())
                .flag(FlagDef::string(ARG_IMAGE, "", "Image id or slug").required())
                .flag(FlagDef::string_list(ARG_SSH_KEYS, &[], "SSH key ids or fingerprints"))
                .flag(FlagDef::string(ARG_USER_DATA, "", "Cloud-init user data"))
                .flag(FlagDef::string(ARG_USER_DATA_FILE, "", "File containing cloud-init user data"))
                .flag(FlagDef::boolean(ARG_BACKUPS, false, "Enable automated backups"))
                .flag(FlagDef::boolean(ARG_IPV6, false, "Enable IPv6"))
                .flag(FlagDef::boolean(ARG_PRIVATE_NETWORKING, false, "Enable private networking"))
                .flag(FlagDef::string_list(ARG_VOLUMES, &[], "Volume ids to attach at boot"))
                .flag(FlagDef::boolean(ARG_WAIT, false, "Wait for the servers to become active"))
                .columns(COLS)
                .run(run_create)
                .build(),
        )
        .subcommand(
            CommandSpec::builder("delete", "delete servers by id or name")
                .run(run_delete)
                .build(),
        )
        .build()
}

// Shell-style matching for `*` and `?`, enough for name filters like
// `web-*`. Iterative with single-star backtracking.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

async fn run_list(ctx: CmdContext) -> CliResult<()> {
    if ctx.args.len() > 1 {
        return Err(CliError::missing_args(&ctx.ns));
    }
    let pattern = ctx.args.first().cloned().unwrap_or_default();
    let region = ctx.config.get_str(&ctx.flag_key(ARG_REGION))?;

    let mut servers = ctx.services.servers.list().await?;
    servers.retain(|s| {
        (pattern.is_empty() || glob_match(&pattern, &s.name))
            && (region.is_empty() || s.region == region)
    });

    ctx.display(&ServerDisplay(servers)).await
}

async fn run_get(ctx: CmdContext) -> CliResult<()> {
    if ctx.args.len() != 1 {
        return Err(CliError::missing_args(&ctx.ns));
    }
    let id: i64 = ctx.args[0]
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!("server id {:?} is not numeric", ctx.args[0])))?;

    let server = ctx.services.servers.get(id).await?;
    ctx.display(&ServerDisplay(vec![server])).await
}

async fn run_create(ctx: CmdContext) -> CliResult<()> {
    if ctx.args.is_empty() {
        return Err(CliError::missing_args(&ctx.ns));
    }

    let user_data = {
        let inline = ctx.config.get_str(&ctx.flag_key(ARG_USER_DATA))?;
        let path = ctx.config.get_str(&ctx.flag_key(ARG_USER_DATA_FILE))?;
        if !inline.is_empty() {
            Some(inline)
        } else if !path.is_empty() {
            Some(std::fs::read_to_string(&path)?)
        } else {
            None
        }
    };

    let template = ServerCreateRequest {
        name: String::new(),
        region: ctx.config.get_str(&ctx.flag_key(ARG_REGION))?,
        size: ctx.config.get_str(&ctx.flag_key(ARG_SIZE))?,
        image: ImageRef::parse(&ctx.config.get_str(&ctx.flag_key(ARG_IMAGE))?),
        ssh_keys: ctx.config.get_str_list(&ctx.flag_key(ARG_SSH_KEYS))?,
        backups: ctx.config.get_bool(&ctx.flag_key(ARG_BACKUPS))?,
        ipv6: ctx.config.get_bool(&ctx.flag_key(ARG_IPV6))?,
        private_networking: ctx.config.get_bool(&ctx.flag_key(ARG_PRIVATE_NETWORKING))?,
        user_data,
        volumes: ctx.config.get_str_list(&ctx.flag_key(ARG_VOLUMES))?,
        wait: ctx.config.get_bool(&ctx.flag_key(ARG_WAIT))?,
    };

    run_batch(ctx.args.clone(), |name| {
        let ctx = ctx.clone();
        let mut req = template.clone();
        async move {
            req.name = name;
            let server = ctx.services.servers.create(&req).await?;
            ctx.display(&ServerDisplay(vec![server])).await
        }
    })
    .await
    .into_result()
}

async fn run_delete(ctx: CmdContext) -> CliResult<()> {
    if ctx.args.is_empty() {
        return Err(CliError::missing_args(&ctx.ns));
    }

    // Name lookups share one roster fetch.
    let roster = if ctx.args.iter().any(|a| a.parse::<i64>().is_err()) {
        ctx.services.servers.list().await?
    } else {
        Vec::new()
    };

    let targets: Vec<CliResult<i64>> = ctx.args.iter().map(|arg| resolve(arg, &roster)).collect();

    run_batch(targets, |target| {
        let ctx = ctx.clone();
        async move {
            let id = target?;
            ctx.services.servers.delete(id).await?;
            ctx.write_line(&format!("deleted server {}", id)).await
        }
    })
    .await
    .into_result()
}

// A numeric argument is an id; anything else must name exactly one server.
fn resolve(arg: &str, roster: &[Server]) -> CliResult<i64> {
    if let Ok(id) = arg.parse::<i64>() {
        return Ok(id);
    }

    let matches: Vec<&Server> = roster.iter().filter(|s| s.name == arg).collect();
    match matches.len() {
        0 => Err(CliError::NotFound { kind: "server", name: arg.to_string() }),
        1 => Ok(matches[0].id),
        count => Err(CliError::AmbiguousName { kind: "server", name: arg.to_string(), count }),
    }
}

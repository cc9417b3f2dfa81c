//! Command tree construction and execution.
//!
//! Commands are described once as an immutable [`CommandSpec`] tree built
//! through [`CommandBuilder`]. The tree drives three things:
//!
//! - conversion into a `clap` command for parsing,
//! - default/flag binding into the [`ConfigResolver`] under namespace keys,
//! - required-flag enforcement before the matched runner is invoked.
//!
//! Flag values are bound into the resolver only for flags explicitly present
//! on the invoked command line, so resolution at execution time sees the
//! real invocation, never parser defaults.

pub mod context;
pub mod namespace;

use crate::config::{ConfigResolver, ConfigValue, ValueSource};
use crate::error::{CliError, CliResult};
use clap::parser::ValueSource as ClapSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use self::context::{CmdContext, Services, SharedOutput};
use self::namespace::{command_ns, flag_key, NS_ROOT};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Async handler attached to a runnable command.
pub type CmdRunner =
    Arc<dyn Fn(CmdContext) -> Pin<Box<dyn Future<Output = CliResult<()>> + Send>> + Send + Sync>;

/// Wrap an async fn as a [`CmdRunner`].
pub fn runner<F, Fut>(f: F) -> CmdRunner
where
    F: Fn(CmdContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CliResult<()>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Value type of a flag, mirroring the configuration value variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// String flag
    Str,
    /// Integer flag
    Int,
    /// Boolean flag (present = true)
    Bool,
    /// Repeatable string flag
    StrList,
}

/// One flag of a command: name, type, default, help, required marker.
#[derive(Debug, Clone)]
pub struct FlagDef {
    name: &'static str,
    short: Option<char>,
    help: String,
    kind: FlagKind,
    default: ConfigValue,
    required: bool,
}

impl FlagDef {
    fn new(name: &'static str, kind: FlagKind, default: ConfigValue, help: &str) -> Self {
        Self { name, short: None, help: help.to_string(), kind, default, required: false }
    }

    /// String flag with a default.
    pub fn string(name: &'static str, default: &str, help: &str) -> Self {
        Self::new(name, FlagKind::Str, ConfigValue::Str(default.to_string()), help)
    }

    /// Integer flag with a default.
    pub fn int(name: &'static str, default: i64, help: &str) -> Self {
        Self::new(name, FlagKind::Int, ConfigValue::Int(default), help)
    }

    /// Boolean flag with a default.
    pub fn boolean(name: &'static str, default: bool, help: &str) -> Self {
        Self::new(name, FlagKind::Bool, ConfigValue::Bool(default), help)
    }

    /// Repeatable string flag.
    pub fn string_list(name: &'static str, default: &[&str], help: &str) -> Self {
        let default = default.iter().map(|s| s.to_string()).collect();
        Self::new(name, FlagKind::StrList, ConfigValue::StrList(default), help)
    }

    /// Add a short form.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Mark the flag required. Records it in the owning command's required
    /// set and appends a visible marker to the help text. Enforcement
    /// happens in the executor, not in the parser.
    pub fn required(mut self) -> Self {
        self.required = true;
        self.help = format!("{} {}", self.help, "(required)".bold());
        self
    }

    /// Flag name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the flag was marked required.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// One node of the command tree. Immutable once built.
pub struct CommandSpec {
    name: &'static str,
    summary: String,
    aliases: Vec<&'static str>,
    flags: Vec<FlagDef>,
    children: Vec<CommandSpec>,
    runner: Option<CmdRunner>,
}

impl CommandSpec {
    /// Start building a command.
    pub fn builder(name: &'static str, summary: &str) -> CommandBuilder {
        CommandBuilder {
            spec: CommandSpec {
                name,
                summary: summary.to_string(),
                aliases: vec![],
                flags: vec![],
                children: vec![],
                runner: None,
            },
            columns: None,
        }
    }

    /// Command name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Flag definitions owned by this command.
    pub fn flags(&self) -> &[FlagDef] {
        &self.flags
    }

    /// Names of the flags this command requires.
    pub fn required_flags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.flags.iter().filter(|f| f.required).map(|f| f.name)
    }

    /// Child commands.
    pub fn children(&self) -> &[CommandSpec] {
        &self.children
    }
}

/// Builder producing an immutable [`CommandSpec`].
pub struct CommandBuilder {
    spec: CommandSpec,
    columns: Option<Vec<&'static str>>,
}

impl CommandBuilder {
    /// Add an alias.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.spec.aliases.push(alias);
        self
    }

    /// Add a flag.
    pub fn flag(mut self, flag: FlagDef) -> Self {
        self.spec.flags.push(flag);
        self
    }

    /// Declare display columns. Commands with columns automatically gain
    /// `--format` and `--no-header` flags.
    pub fn columns(mut self, cols: &[&'static str]) -> Self {
        self.columns = Some(cols.to_vec());
        self
    }

    /// Add a child command.
    pub fn subcommand(mut self, child: CommandSpec) -> Self {
        self.spec.children.push(child);
        self
    }

    /// Attach the async handler.
    pub fn run<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CmdContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CliResult<()>> + Send + 'static,
    {
        self.spec.runner = Some(runner(f));
        self
    }

    /// Finish the descriptor.
    pub fn build(mut self) -> CommandSpec {
        if let Some(cols) = &self.columns {
            self.spec.flags.push(FlagDef::string(
                "format",
                "",
                &format!(
                    "Columns for output in a comma separated list. Possible values: {}",
                    cols.join(",")
                ),
            ));
            self.spec.flags.push(FlagDef::boolean("no-header", false, "hide headers"));
        }
        self.spec
    }
}

// clap wants 'static strings; descriptors live for the whole process, so
// leaking the owned help text is fine.
fn leak(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

fn build_clap_arg(flag: &FlagDef, global: bool) -> Arg {
    let mut arg = Arg::new(flag.name).long(flag.name).help(leak(flag.help.clone()));

    if let Some(short) = flag.short {
        arg = arg.short(short);
    }
    if global {
        arg = arg.global(true);
    }

    match flag.kind {
        FlagKind::Bool => arg.action(ArgAction::SetTrue),
        FlagKind::Int => arg.action(ArgAction::Set).value_parser(clap::value_parser!(i64)),
        FlagKind::Str => arg.action(ArgAction::Set),
        FlagKind::StrList => arg.action(ArgAction::Append),
    }
}

/// Convert a descriptor tree into a `clap` command.
pub fn build_clap(spec: &CommandSpec, is_root: bool) -> Command {
    let mut cmd = Command::new(spec.name).about(leak(spec.summary.clone()));

    if is_root {
        cmd = cmd.version(env!("CARGO_PKG_VERSION"));
    }
    for alias in &spec.aliases {
        cmd = cmd.alias(*alias);
    }
    for flag in &spec.flags {
        cmd = cmd.arg(build_clap_arg(flag, is_root));
    }

    if spec.runner.is_some() {
        cmd = cmd.arg(Arg::new("args").action(ArgAction::Append).num_args(0..));
    } else {
        cmd = cmd.arg_required_else_help(true);
    }

    for child in &spec.children {
        cmd = cmd.subcommand(build_clap(child, false));
    }

    cmd
}

// Register every flag's compiled-in default. `ns` is None for the root
// command, whose flags bind under their bare names.
fn bind_defaults(resolver: &mut ConfigResolver, spec: &CommandSpec, ns: Option<&str>) {
    for flag in &spec.flags {
        let key = match ns {
            None => flag.name.to_string(),
            Some(ns) => flag_key(ns, flag.name),
        };
        resolver.bind(&key, ValueSource::Default, flag.default.clone());
    }

    let parent_token = match ns {
        None => NS_ROOT,
        Some(_) => spec.name,
    };
    for child in &spec.children {
        let child_ns = command_ns(parent_token, child.name);
        bind_defaults(resolver, child, Some(&child_ns));
    }
}

// Bind values for flags that were explicitly present on the command line.
fn bind_matches(
    resolver: &mut ConfigResolver,
    matches: &ArgMatches,
    flags: &[FlagDef],
    ns: Option<&str>,
) {
    for flag in flags {
        if matches.value_source(flag.name) != Some(ClapSource::CommandLine) {
            continue;
        }

        let value = match flag.kind {
            FlagKind::Str => ConfigValue::Str(
                matches.get_one::<String>(flag.name).cloned().unwrap_or_default(),
            ),
            FlagKind::Int => {
                ConfigValue::Int(matches.get_one::<i64>(flag.name).copied().unwrap_or_default())
            }
            FlagKind::Bool => ConfigValue::Bool(matches.get_flag(flag.name)),
            FlagKind::StrList => ConfigValue::StrList(
                matches
                    .get_many::<String>(flag.name)
                    .map(|vals| vals.cloned().collect())
                    .unwrap_or_default(),
            ),
        };

        let key = match ns {
            None => flag.name.to_string(),
            Some(ns) => flag_key(ns, flag.name),
        };
        resolver.bind(&key, ValueSource::Flag, value);
    }
}

/// Parse `argv` against the tree, bind flag values, enforce required flags,
/// and run the matched command.
///
/// The resolver arrives pre-seeded with environment and file bindings; this
/// function adds tree defaults and invocation flags, freezes it, and hands
/// it to the runner through [`CmdContext`].
pub async fn execute_from<I, T>(
    root: &CommandSpec,
    mut resolver: ConfigResolver,
    services: Services,
    out: SharedOutput,
    argv: I,
) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    bind_defaults(&mut resolver, root, None);

    let matches = match build_clap(root, true).try_get_matches_from(argv) {
        Ok(m) => m,
        Err(e)
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            e.print().map_err(CliError::Io)?;
            return Ok(());
        }
        Err(e) => return Err(CliError::InvalidArgument(e.to_string())),
    };

    bind_matches(&mut resolver, &matches, &root.flags, None);

    let mut spec = root;
    let mut current = &matches;
    let mut parent_token = NS_ROOT.to_string();
    let mut ns = NS_ROOT.to_string();

    while let Some((name, sub_matches)) = current.subcommand() {
        let child = spec
            .children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CliError::InvalidArgument(format!("unknown command {:?}", name)))?;

        ns = command_ns(&parent_token, child.name);
        bind_matches(&mut resolver, sub_matches, &child.flags, Some(&ns));

        parent_token = child.name.to_string();
        spec = child;
        current = sub_matches;
    }

    let run = match &spec.runner {
        Some(run) => run.clone(),
        None => {
            return Err(CliError::InvalidArgument(format!(
                "{} requires a subcommand",
                spec.name
            )))
        }
    };

    // Declarative required set, checked exactly once before the handler.
    for flag in spec.required_flags() {
        let key = flag_key(&ns, flag);
        if resolver.get_required(&key).is_err() {
            return Err(CliError::MissingRequiredFlag { ns, flag: flag.to_string() });
        }
    }

    let args: Vec<String> = current
        .get_many::<String>("args")
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default();

    let ctx = CmdContext::new(ns, Arc::new(resolver), args, services, out);
    run(ctx).await
}

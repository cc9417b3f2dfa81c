//! Command surface: the root tree and the resource subcommands.

pub mod server;
pub mod volume;
pub mod volume_action;

use crate::command::{CommandSpec, FlagDef};
use crate::config::ConfigResolver;

/// `--access-token` / NIMBUS_ACCESS_TOKEN
pub const ARG_ACCESS_TOKEN: &str = "access-token";
/// `--output`, text or json
pub const ARG_OUTPUT: &str = "output";
/// `--verbose`
pub const ARG_VERBOSE: &str = "verbose";
/// `--trace`
pub const ARG_TRACE: &str = "trace";
/// `--config`, path to the configuration file
pub const ARG_CONFIG: &str = "config";
/// `--region`
pub const ARG_REGION: &str = "region";
/// `--size`
pub const ARG_SIZE: &str = "size";
/// `--image`
pub const ARG_IMAGE: &str = "image";
/// `--ssh-keys`
pub const ARG_SSH_KEYS: &str = "ssh-keys";
/// `--user-data`
pub const ARG_USER_DATA: &str = "user-data";
/// `--user-data-file`
pub const ARG_USER_DATA_FILE: &str = "user-data-file";
/// `--backups`
pub const ARG_BACKUPS: &str = "backups";
/// `--ipv6`
pub const ARG_IPV6: &str = "ipv6";
/// `--private-networking`
pub const ARG_PRIVATE_NETWORKING: &str = "private-networking";
/// `--volumes`
pub const ARG_VOLUMES: &str = "volumes";
/// `--wait`
pub const ARG_WAIT: &str = "wait";
/// `--description`
pub const ARG_DESCRIPTION: &str = "description";
/// `--id` (volume lookup)
pub const ARG_VOLUME_ID: &str = "id";

/// Assemble the full command tree.
pub fn root() -> CommandSpec {
    CommandSpec::builder(
        "nimbusctl",
        "nimbusctl provides command-line access to the Nimbus cloud",
    )
    .flag(FlagDef::string(ARG_ACCESS_TOKEN, "", "API access token").short('t'))
    .flag(FlagDef::string(ARG_OUTPUT, "text", "Output format, text or json").short('o'))
    .flag(FlagDef::boolean(ARG_VERBOSE, false, "Verbose output").short('v'))
    .flag(FlagDef::boolean(ARG_TRACE, false, "Trace API requests to a log file"))
    .flag(FlagDef::string(ARG_CONFIG, "", "Path to the configuration file"))
    .subcommand(server::commands())
    .subcommand(volume::commands())
    .subcommand(volume_action::commands())
    .build()
}

/// Bind the environment variables the tool honors. Variables are read at
/// resolution time, so this only records the names.
pub fn bind_environment(resolver: &mut ConfigResolver) {
    resolver.bind_env(ARG_ACCESS_TOKEN, "NIMBUS_ACCESS_TOKEN");
    resolver.bind_env(ARG_OUTPUT, "NIMBUS_OUTPUT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::build_clap;

    #[test]
    fn test_tree_assembles() {
        let tree = root();
        let names: Vec<_> = tree.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["server", "volume", "volume-action"]);

        // The whole tree converts to a clap command without panicking.
        let cmd = build_clap(&tree, true);
        assert!(cmd.get_subcommands().any(|c| c.get_name() == "server"));
    }

    #[test]
    fn test_create_help_marks_required_flags() {
        let tree = root();
        let server = tree
            .children()
            .iter()
            .find(|c| c.name() == "server")
            .unwrap();
        let create = server
            .children()
            .iter()
            .find(|c| c.name() == "create")
            .unwrap();

        let required: Vec<_> = create.required_flags().collect();
        assert_eq!(required, vec![ARG_REGION, ARG_SIZE, ARG_IMAGE]);

        let help = build_clap(create, false).render_help().to_string();
        assert!(help.contains("(required)"));
    }
}

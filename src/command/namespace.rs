//! Namespace key derivation.
//!
//! Every (command path, flag name) pair maps to a stable configuration key.
//! A command's namespace is `{parentName}.{commandName}`; commands sitting
//! directly under the root use [`NS_ROOT`] as the parent token. Because the
//! command name is part of the key, sibling commands with identically named
//! flags never collide.

/// Root namespace token for commands without a named parent.
pub const NS_ROOT: &str = "nimbus";

/// Namespace for a command given its parent's name (or [`NS_ROOT`]).
pub fn command_ns(parent: &str, name: &str) -> String {
    format!("{}.{}", parent, name)
}

/// Configuration key for a flag inside a command namespace.
pub fn flag_key(ns: &str, flag: &str) -> String {
    format!("{}.{}", ns, flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_level_commands_use_root_token() {
        assert_eq!(command_ns(NS_ROOT, "server"), "nimbus.server");
    }

    #[test]
    fn test_sibling_commands_never_collide_on_flag_name() {
        let server_create = command_ns("server", "create");
        let volume_create = command_ns("volume", "create");

        let a = flag_key(&server_create, "region");
        let b = flag_key(&volume_create, "region");
        assert_ne!(a, b);
        assert_eq!(a, "server.create.region");
        assert_eq!(b, "volume.create.region");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            flag_key(&command_ns("server", "list"), "region"),
            flag_key(&command_ns("server", "list"), "region"),
        );
    }
}

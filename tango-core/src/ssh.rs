//! SSH targets
//!
//! The effective connection settings for one node after applying
//! per-node overrides on top of the global defaults.

use serde::Serialize;

/// Program invoked for remote execution
pub const SSH_PROGRAM: &str = "ssh";

/// Where and how to connect to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SshTarget {
    pub fqdn: String,
    pub username: String,
    pub key_path: String,
}

impl SshTarget {
    /// `username@fqdn`
    pub fn user_host(&self) -> String {
        format!("{}@{}", self.username, self.fqdn)
    }

    /// Arguments for `ssh` to run `command` on this target
    ///
    /// `IdentitiesOnly` keeps ssh from offering agent keys before the
    /// configured one.
    pub fn argv(&self, command: &str) -> Vec<String> {
        vec![
            "-o".to_string(),
            "IdentitiesOnly=yes".to_string(),
            "-i".to_string(),
            self.key_path.clone(),
            self.user_host(),
            command.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv() {
        let target = SshTarget {
            fqdn: "alpha.example.com".to_string(),
            username: "deploy".to_string(),
            key_path: "/keys/id".to_string(),
        };

        assert_eq!(target.user_host(), "deploy@alpha.example.com");
        assert_eq!(
            target.argv("docker pull myorg/web:latest"),
            vec![
                "-o",
                "IdentitiesOnly=yes",
                "-i",
                "/keys/id",
                "deploy@alpha.example.com",
                "docker pull myorg/web:latest",
            ]
        );
    }
}

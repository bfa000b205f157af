//! Remote execution over SSH
//!
//! Every remote command is a separate `ssh` invocation against a single
//! node. Nodes are handled one at a time by the caller.

use std::sync::Arc;
use tango_core::ssh::SSH_PROGRAM;
use tango_core::{ImageRef, SshTarget, remote};
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::process::{Invocation, ProcessOutput, ProcessRunner};

/// Runs commands on Tango nodes
pub struct RemoteExecutor {
    runner: Arc<dyn ProcessRunner>,
}

impl RemoteExecutor {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Runs a command on a node
    ///
    /// # Arguments
    /// * `target` - Node connection settings
    /// * `command` - Shell command executed by the remote login shell
    /// * `capture` - Collect output instead of streaming it
    pub async fn run(
        &self,
        target: &SshTarget,
        command: &str,
        capture: bool,
    ) -> Result<ProcessOutput> {
        debug!("Running on {}: {}", target.fqdn, command);

        let args = target.argv(command);
        let invocation = if capture {
            Invocation::captured(SSH_PROGRAM, args)
        } else {
            Invocation::streamed(SSH_PROGRAM, args)
        };

        let output = self.runner.run(&invocation).await?;
        if !output.success() {
            return Err(ClientError::RemoteFailed {
                fqdn: target.fqdn.clone(),
                command: command.to_string(),
                code: output.code,
            });
        }

        Ok(output)
    }

    /// Pulls an image onto a node and re-tags it without its organization
    ///
    /// The organization-qualified tag is removed afterwards so the node only
    /// keeps the short name.
    pub async fn deploy_image(&self, image: &ImageRef, target: &SshTarget) -> Result<()> {
        info!("Deploying image {} to {}", image, target.fqdn);

        for command in remote::deploy_steps(image) {
            self.run(target, &command, false).await?;
        }

        info!("Finished deploying image {} to {}", image, target.fqdn);
        Ok(())
    }

    /// Lists images installed on a node as `repository:tag`
    pub async fn list_images(&self, target: &SshTarget) -> Result<Vec<String>> {
        let output = self.run(target, &remote::list_images(), true).await?;
        Ok(lines(&output.stdout))
    }

    /// Lists the entries of a node's volumes directory
    pub async fn list_volumes(&self, target: &SshTarget, volumes_path: &str) -> Result<Vec<String>> {
        let output = self
            .run(target, &remote::list_volumes(volumes_path), true)
            .await?;
        Ok(lines(&output.stdout))
    }
}

fn lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::RecordingRunner;

    fn target() -> SshTarget {
        SshTarget {
            fqdn: "alpha.example.com".to_string(),
            username: "deploy".to_string(),
            key_path: "/keys/id".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deploy_image_runs_three_steps() {
        let runner = RecordingRunner::new();
        let executor = RemoteExecutor::new(Arc::new(runner.clone()));
        let image = ImageRef::parse("myorg/web:latest").unwrap();

        executor.deploy_image(&image, &target()).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.program == "ssh" && !c.capture));
        assert_eq!(
            calls[0].args,
            vec![
                "-o",
                "IdentitiesOnly=yes",
                "-i",
                "/keys/id",
                "deploy@alpha.example.com",
                "docker pull myorg/web:latest",
            ]
        );
        assert_eq!(calls[1].args[5], "docker tag myorg/web:latest web:latest");
        assert_eq!(calls[2].args[5], "docker image rm myorg/web:latest");
    }

    #[tokio::test]
    async fn test_deploy_stops_at_failed_step() {
        let runner = RecordingRunner::new();
        runner.respond("docker pull", ProcessOutput::failed(1));
        let executor = RemoteExecutor::new(Arc::new(runner.clone()));
        let image = ImageRef::parse("myorg/web:latest").unwrap();

        let err = executor.deploy_image(&image, &target()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Command failed on alpha.example.com: docker pull myorg/web:latest. Status code: 1"
        );
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_list_images_splits_lines() {
        let runner = RecordingRunner::new();
        runner.respond(
            "docker image ls",
            ProcessOutput::ok("web:latest\n\nredis:7\n"),
        );
        let executor = RemoteExecutor::new(Arc::new(runner.clone()));

        let images = executor.list_images(&target()).await.unwrap();

        assert_eq!(images, vec!["web:latest", "redis:7"]);
        assert!(runner.calls()[0].capture);
    }

    #[tokio::test]
    async fn test_list_volumes_quotes_path() {
        let runner = RecordingRunner::new();
        runner.respond("ls -1", ProcessOutput::ok("db\nuploads\n"));
        let executor = RemoteExecutor::new(Arc::new(runner.clone()));

        let volumes = executor
            .list_volumes(&target(), "/srv/my volumes")
            .await
            .unwrap();

        assert_eq!(volumes, vec!["db", "uploads"]);
        assert_eq!(runner.calls()[0].args[5], "ls -1 -- '/srv/my volumes'");
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let runner = RecordingRunner::new();
        runner.respond("ssh", ProcessOutput::failed(255));
        let executor = RemoteExecutor::new(Arc::new(runner.clone()));

        let err = executor.list_images(&target()).await.unwrap_err();
        assert!(err.is_connection_error());
    }
}

//! Local Docker invocation
//!
//! Builds, tags and pushes images with the local `docker` CLI:
//! - Checking docker availability
//! - Building with a datestamp tag and re-tagging as `latest`
//! - Pushing to Docker Hub

use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use tango_core::ImageRef;
use tango_core::image::datestamp_tag;
use tracing::info;

use crate::error::{ClientError, Result};
use crate::process::{Invocation, ProcessOutput, ProcessRunner};

/// Program invoked for local image operations
pub const DOCKER_PROGRAM: &str = "docker";

/// Tags produced by a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltImage {
    /// `org/name:YYYY.MM.DD.HHMMSS`
    pub timestamped: String,
    /// `org/name:latest`
    pub latest: String,
}

/// Drives the local docker CLI
pub struct DockerClient {
    runner: Arc<dyn ProcessRunner>,
}

impl DockerClient {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Checks that docker is installed and responding
    pub async fn check_available(&self) -> Result<()> {
        let invocation = Invocation::captured(DOCKER_PROGRAM, vec!["--version".to_string()]);
        let output = self.runner.run(&invocation).await?;
        expect_success(&invocation, output.clone())?;

        info!("Docker is available: {}", output.stdout.trim());
        Ok(())
    }

    /// Builds an image and tags it with the current datestamp and `latest`
    ///
    /// # Arguments
    /// * `dockerfile` - Local directory containing a Dockerfile, or a URL to one
    /// * `image` - Untagged `org/name` reference
    pub async fn build(&self, dockerfile: &str, image: &ImageRef) -> Result<BuiltImage> {
        let tag = datestamp_tag(&Local::now());
        self.build_with_tag(dockerfile, image, &tag).await
    }

    /// Builds an image with an explicit primary tag, then tags it `latest`
    pub async fn build_with_tag(
        &self,
        dockerfile: &str,
        image: &ImageRef,
        tag: &str,
    ) -> Result<BuiltImage> {
        let timestamped = image.with_tag(tag).to_string();
        let latest = image.latest().to_string();

        info!("Building {} from {}", timestamped, dockerfile);
        self.docker(vec![
            "build".to_string(),
            "-t".to_string(),
            timestamped.clone(),
            dockerfile.to_string(),
        ])
        .await?;

        info!("Tagging {} as {}", timestamped, latest);
        self.docker(vec!["tag".to_string(), timestamped.clone(), latest.clone()])
            .await?;

        Ok(BuiltImage {
            timestamped,
            latest,
        })
    }

    /// Pushes an image to Docker Hub
    pub async fn push(&self, image: &str) -> Result<()> {
        info!("Pushing {}", image);
        self.docker(vec!["push".to_string(), image.to_string()])
            .await
    }

    async fn docker(&self, args: Vec<String>) -> Result<()> {
        let invocation = Invocation::streamed(DOCKER_PROGRAM, args);
        let output = self.runner.run(&invocation).await?;
        expect_success(&invocation, output)
    }
}

fn expect_success(invocation: &Invocation, output: ProcessOutput) -> Result<()> {
    if output.success() {
        return Ok(());
    }

    Err(ClientError::CommandFailed {
        command: invocation.command_line(),
        code: output.code,
        stderr: output.stderr,
    })
}

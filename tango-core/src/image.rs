//! Image references
//!
//! Images handled by Tango always live under a single Docker Hub
//! organization: `org/name[:tag]`. Registry hosts and nested paths are
//! not supported.

use chrono::{DateTime, TimeZone};
use std::fmt;

use crate::error::{Result, TangoError};

/// Tag applied to the most recent build
pub const LATEST_TAG: &str = "latest";

/// Format of the datestamp tag applied to every build
pub const DATESTAMP_FORMAT: &str = "%Y.%m.%d.%H%M%S";

/// A Docker image reference of the form `org/name[:tag]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub org: String,
    pub name: String,
    pub tag: Option<String>,
}

impl ImageRef {
    /// Create an untagged reference from an organization and a bare image name
    ///
    /// The name must not carry an organization or a tag; the organization
    /// comes from configuration.
    pub fn new(org: &str, name: &str) -> Result<Self> {
        if name.contains('/') {
            return Err(TangoError::invalid_image(
                name,
                "must not include a slash (do not specify an org here, use --org instead)",
            ));
        }
        if name.contains(':') {
            return Err(TangoError::invalid_image(name, "must not include a tag"));
        }
        validate_component(name, name)?;
        validate_component(org, org)?;

        Ok(Self {
            org: org.to_string(),
            name: name.to_string(),
            tag: None,
        })
    }

    /// Parse a full reference such as `myorg/myimage:latest`
    pub fn parse(text: &str) -> Result<Self> {
        let (repository, tag) = match text.split_once(':') {
            Some((repository, tag)) => (repository, Some(tag)),
            None => (text, None),
        };

        let (org, name) = match repository.split_once('/') {
            Some((org, name)) if !name.contains('/') => (org, name),
            _ => {
                return Err(TangoError::invalid_image(
                    text,
                    "must include exactly one slash (org/name)",
                ));
            }
        };

        validate_component(text, org)?;
        validate_component(text, name)?;
        if let Some(tag) = tag {
            validate_tag(text, tag)?;
        }

        Ok(Self {
            org: org.to_string(),
            name: name.to_string(),
            tag: tag.map(str::to_string),
        })
    }

    /// Return a copy of this reference with the given tag
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..self.clone()
        }
    }

    /// Return a copy of this reference tagged `latest`
    pub fn latest(&self) -> Self {
        self.with_tag(LATEST_TAG)
    }

    /// `org/name` without any tag
    pub fn repository(&self) -> String {
        format!("{}/{}", self.org, self.name)
    }

    /// `name[:tag]`, the local name an image gets on a node after deployment
    pub fn without_org(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}:{}", self.name, tag),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}/{}:{}", self.org, self.name, tag),
            None => write!(f, "{}/{}", self.org, self.name),
        }
    }
}

/// Format a datestamp tag (`YYYY.MM.DD.HHMMSS`) for the given instant
pub fn datestamp_tag<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format(DATESTAMP_FORMAT).to_string()
}

/// Validate an organization or image name component
///
/// Docker repository components are lowercase alphanumerics separated by
/// `.`, `_` or `-`.
pub fn validate_component(full: &str, component: &str) -> Result<()> {
    if component.is_empty() {
        return Err(TangoError::invalid_image(full, "empty org or name"));
    }

    let valid_chars = component
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));
    if !valid_chars {
        return Err(TangoError::invalid_image(
            full,
            format!("'{}' may only contain [a-z0-9._-]", component),
        ));
    }

    if !component.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(TangoError::invalid_image(
            full,
            format!("'{}' must start with a letter or digit", component),
        ));
    }

    Ok(())
}

fn validate_tag(full: &str, tag: &str) -> Result<()> {
    if tag.is_empty() || tag.len() > 128 {
        return Err(TangoError::invalid_image(full, "tag must be 1-128 characters"));
    }
    if tag.starts_with(['.', '-']) {
        return Err(TangoError::invalid_image(
            full,
            "tag must not start with '.' or '-'",
        ));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(TangoError::invalid_image(
            full,
            "tag may only contain [A-Za-z0-9._-]",
        ));
    }
    Ok(())
}

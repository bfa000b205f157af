//! Tango Core
//!
//! Core types for the Tango deployment tool.
//!
//! This crate contains:
//! - Configuration: organization, SSH defaults and the node inventory
//! - Image references and datestamp tagging
//! - Node selection and SSH target resolution
//! - Composition of the commands run on remote nodes

pub mod config;
pub mod error;
pub mod image;
pub mod remote;
pub mod selector;
pub mod ssh;

pub use config::{Config, Overrides, TangoNode};
pub use error::{Result, TangoError};
pub use image::ImageRef;
pub use selector::NodeSelector;
pub use ssh::SshTarget;

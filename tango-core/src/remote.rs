//! Remote command composition
//!
//! Each function returns the single command string handed to `ssh`.
//! Image references are validated on construction, so they never need
//! quoting; filesystem paths are quoted for a POSIX shell.

use crate::image::ImageRef;

/// Go template used to list images as `repository:tag`
pub const IMAGE_LIST_FORMAT: &str = "{{.Repository}}:{{.Tag}}";

/// `docker pull <image>`
pub fn pull(image: &ImageRef) -> String {
    format!("docker pull {}", image)
}

/// `docker tag <image> <name[:tag]>`, dropping the organization
pub fn tag_without_org(image: &ImageRef) -> String {
    format!("docker tag {} {}", image, image.without_org())
}

/// `docker image rm <image>`
pub fn remove(image: &ImageRef) -> String {
    format!("docker image rm {}", image)
}

/// The three steps that install a pulled image under its short name
pub fn deploy_steps(image: &ImageRef) -> [String; 3] {
    [pull(image), tag_without_org(image), remove(image)]
}

/// List images installed on a node, one `repository:tag` per line
pub fn list_images() -> String {
    format!("docker image ls --format {}", shell_quote(IMAGE_LIST_FORMAT))
}

/// List the entries of a node's volumes directory, one per line
pub fn list_volumes(volumes_path: &str) -> String {
    format!("ls -1 -- {}", shell_quote(volumes_path))
}

/// Quote a string for a POSIX shell using single quotes
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

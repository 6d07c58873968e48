pub mod docker;

pub use docker::DockerCli;

use crate::error::Result;
use std::path::Path;

/// The container runtime as the extraction pipeline sees it: four blocking
/// operations whose pass/fail status is the only signal consumed. No output
/// parsing happens above this seam, which also keeps the pipeline testable
/// against a mock.
pub trait ContainerRuntime {
    /// Create a stopped container from `image` under the given name. Must
    /// fail if a container with that name already exists (a leftover from a
    /// crashed run must surface as an error, never be silently reused).
    fn create_container(&self, image: &str, name: &str) -> Result<()>;

    /// Copy `source` (a path inside the container) to `dest` on the host.
    fn copy_path(&self, container: &str, source: &str, dest: &Path) -> Result<()>;

    fn remove_container(&self, name: &str) -> Result<()>;

    fn remove_image(&self, image: &str) -> Result<()>;
}

use crate::error::{HarvestError, Result, RuntimeOp};
use crate::runtime::ContainerRuntime;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Docker-CLI-compatible runtime. Every operation is one blocking subprocess
/// invocation of the configured binary (`docker` by default, but anything
/// with the same argument surface works, e.g. `podman`).
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, operation: RuntimeOp, subject: &str, args: Vec<OsString>) -> Result<()> {
        let output = Command::new(&self.binary).args(&args).output().map_err(|e| {
            HarvestError::RuntimeUnavailable {
                binary: self.binary.display().to_string(),
                message: e.to_string(),
            }
        })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = match stderr.trim() {
            "" => format!("exited with {}", output.status),
            detail => detail.to_string(),
        };

        Err(HarvestError::Runtime {
            operation,
            subject: subject.to_string(),
            message,
        })
    }
}

impl ContainerRuntime for DockerCli {
    fn create_container(&self, image: &str, name: &str) -> Result<()> {
        // `create --name` errors on a name conflict, so a stale container
        // from a crashed run fails the entry instead of being reused.
        self.run(
            RuntimeOp::CreateContainer,
            image,
            vec![
                OsString::from("create"),
                OsString::from("--name"),
                OsString::from(name),
                OsString::from(image),
            ],
        )
    }

    fn copy_path(&self, container: &str, source: &str, dest: &Path) -> Result<()> {
        self.run(
            RuntimeOp::CopyPath,
            container,
            vec![
                OsString::from("cp"),
                OsString::from(format!("{}:{}", container, source)),
                OsString::from(dest),
            ],
        )
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        self.run(
            RuntimeOp::RemoveContainer,
            name,
            vec![OsString::from("rm"), OsString::from(name)],
        )
    }

    fn remove_image(&self, image: &str) -> Result<()> {
        self.run(
            RuntimeOp::RemoveImage,
            image,
            vec![OsString::from("rmi"), OsString::from(image)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_runtime_unavailable() {
        let runtime = DockerCli::new("/nonexistent/definitely-not-a-runtime");
        let result = runtime.remove_image("registry/x:latest");
        assert!(matches!(
            result,
            Err(HarvestError::RuntimeUnavailable { .. })
        ));
    }

    #[test]
    fn test_nonzero_exit_is_runtime_error() {
        // `false` accepts any arguments and always exits 1.
        let runtime = DockerCli::new("false");
        let result = runtime.create_container("registry/x:latest", "temp_x");
        match result {
            Err(HarvestError::Runtime {
                operation, subject, ..
            }) => {
                assert_eq!(operation, RuntimeOp::CreateContainer);
                assert_eq!(subject, "registry/x:latest");
            }
            other => panic!("expected Runtime error, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_exit_is_ok() {
        let runtime = DockerCli::new("true");
        assert!(runtime.remove_container("temp_x").is_ok());
    }
}

use crate::error::{HarvestError, Result};
use crate::keys::{KeyPattern, DEFAULT_KEY_PATTERN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub runtime: RuntimeConfig,
    pub output: OutputConfig,
    pub keys: KeyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Container runtime binary, invoked for every create/copy/remove call.
    pub binary: PathBuf,
    /// Prefix for temporary container names; the extraction key is appended.
    pub container_prefix: String,
    /// Path inside the container that gets copied out.
    pub workspace_path: String,
    /// Skip image deletion entirely (extraction without disk reclamation).
    pub keep_images: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Root directory receiving one subdirectory per extraction key.
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyConfig {
    /// Case-insensitive regex matched against each image reference.
    pub pattern: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("docker"),
            container_prefix: "temp_".to_string(),
            workspace_path: "/workspace".to_string(),
            keep_images: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("workspaces"),
        }
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_KEY_PATTERN.to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(HarvestError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HarvestError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| HarvestError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["wsharvest.toml", ".wsharvest.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref binary) = cli_args.runtime_bin {
            self.runtime.binary = binary.clone();
        }

        if let Some(ref prefix) = cli_args.container_prefix {
            self.runtime.container_prefix = prefix.clone();
        }

        if let Some(ref workspace_path) = cli_args.workspace_path {
            self.runtime.workspace_path = workspace_path.clone();
        }

        if cli_args.keep_images {
            self.runtime.keep_images = true;
        }

        if let Some(ref root) = cli_args.output_root {
            self.output.root = root.clone();
        }

        if let Some(ref pattern) = cli_args.key_pattern {
            self.keys.pattern = pattern.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| HarvestError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| HarvestError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        // Compiling here surfaces a bad pattern before any runtime call.
        self.key_pattern()?;

        if self.runtime.binary.as_os_str().is_empty() {
            return Err(HarvestError::Config {
                message: "Runtime binary must not be empty".to_string(),
            });
        }

        if self.runtime.container_prefix.is_empty() {
            return Err(HarvestError::Config {
                message: "Container name prefix must not be empty".to_string(),
            });
        }

        // Container names must satisfy the runtime's [a-zA-Z0-9][a-zA-Z0-9_.-]* rule;
        // the appended key is already lowercase alphanumerics and hyphens.
        let mut chars = self.runtime.container_prefix.chars();
        let leading_ok = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        if !leading_ok || !rest_ok {
            return Err(HarvestError::Config {
                message: format!(
                    "Container name prefix `{}` is not a valid container name start",
                    self.runtime.container_prefix
                ),
            });
        }

        if !self.runtime.workspace_path.starts_with('/') {
            return Err(HarvestError::Config {
                message: format!(
                    "Workspace path `{}` must be absolute inside the container",
                    self.runtime.workspace_path
                ),
            });
        }

        if self.output.root.as_os_str().is_empty() {
            return Err(HarvestError::Config {
                message: "Output root must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn key_pattern(&self) -> Result<KeyPattern> {
        KeyPattern::new(&self.keys.pattern)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub runtime_bin: Option<PathBuf>,
    pub container_prefix: Option<String>,
    pub workspace_path: Option<String>,
    pub keep_images: bool,
    pub output_root: Option<PathBuf>,
    pub key_pattern: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime_bin(mut self, binary: Option<PathBuf>) -> Self {
        self.runtime_bin = binary;
        self
    }

    pub fn with_container_prefix(mut self, prefix: Option<String>) -> Self {
        self.container_prefix = prefix;
        self
    }

    pub fn with_workspace_path(mut self, path: Option<String>) -> Self {
        self.workspace_path = path;
        self
    }

    pub fn with_keep_images(mut self, keep: bool) -> Self {
        self.keep_images = keep;
        self
    }

    pub fn with_output_root(mut self, root: Option<PathBuf>) -> Self {
        self.output_root = root;
        self
    }

    pub fn with_key_pattern(mut self, pattern: Option<String>) -> Self {
        self.key_pattern = pattern;
        self
    }
}

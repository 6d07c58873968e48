use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "wsharvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract workspace trees from container images")]
#[command(
    long_about = "wsharvest reads a list of container image references, extracts a fixed \
                  path (default /workspace) out of each identifiable image into a local \
                  directory named after its extraction key, then deletes the image to \
                  reclaim disk space."
)]
#[command(after_help = "EXAMPLES:\n  \
    wsharvest images.txt\n  \
    wsharvest images.txt --output ./workspaces --keep-images\n  \
    wsharvest images.txt --key-pattern 'bug-[0-9]+' --container-prefix extract_\n  \
    wsharvest images.txt --dry-run\n")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// File listing one image reference per line (blank lines ignored)
    pub image_list: PathBuf,

    /// Output root directory (one subdirectory per extraction key)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path inside the container to copy out
    #[arg(long, help = "Path copied out of each container (default: /workspace)")]
    pub workspace_path: Option<String>,

    /// Regex deriving the extraction key from an image reference
    #[arg(long, help = "Case-insensitive regex matched against each reference")]
    pub key_pattern: Option<String>,

    /// Prefix for temporary container names
    #[arg(long, help = "Temporary container name prefix (default: temp_)")]
    pub container_prefix: Option<String>,

    /// Container runtime binary
    #[arg(long, env = "WSHARVEST_RUNTIME", help = "Runtime binary (default: docker)")]
    pub runtime_bin: Option<PathBuf>,

    /// Do not delete source images after extraction
    #[arg(long, help = "Skip image deletion (no disk reclamation)")]
    pub keep_images: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress per-entry output; summary is still printed)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show the per-entry plan without touching the runtime)
    #[arg(long, help = "Show what would be extracted without doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_runtime_bin(self.runtime_bin.clone())
            .with_container_prefix(self.container_prefix.clone())
            .with_workspace_path(self.workspace_path.clone())
            .with_keep_images(self.keep_images)
            .with_output_root(self.output.clone())
            .with_key_pattern(self.key_pattern.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_asserts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_minimal_invocation() {
        let cli = parse(&["wsharvest", "images.txt"]);
        assert_eq!(cli.image_list, PathBuf::from("images.txt"));
        assert!(cli.output.is_none());
        assert!(!cli.keep_images);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_overrides_flow_into_config() {
        let cli = parse(&[
            "wsharvest",
            "images.txt",
            "--output",
            "out",
            "--key-pattern",
            "bug-[0-9]+",
            "--keep-images",
            "--runtime-bin",
            "podman",
        ]);

        let config = cli.load_config().unwrap();
        assert_eq!(config.output.root, PathBuf::from("out"));
        assert_eq!(config.keys.pattern, "bug-[0-9]+");
        assert!(config.runtime.keep_images);
        assert_eq!(config.runtime.binary, PathBuf::from("podman"));
    }

    #[test]
    fn test_invalid_key_pattern_rejected_at_load() {
        let cli = parse(&["wsharvest", "images.txt", "--key-pattern", "(unclosed"]);
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn test_quiet_zeroes_verbosity() {
        let cli = parse(&["wsharvest", "images.txt", "-q"]);
        assert_eq!(cli.verbosity_level(), 0);

        let cli = parse(&["wsharvest", "images.txt", "-vv"]);
        assert_eq!(cli.verbosity_level(), 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["wsharvest", "images.txt", "-q", "-v"]).is_err());
    }
}

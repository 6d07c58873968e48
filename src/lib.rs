pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod keys;
pub mod runtime;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, KeyConfig, OutputConfig, RuntimeConfig};
pub use error::{HarvestError, Result, RuntimeOp, UserFriendlyError};

// Core functionality re-exports
pub use extract::{read_image_list, EntryOutcome, EntryReport, RunSummary, WorkspaceExtractor};
pub use keys::{KeyPattern, DEFAULT_KEY_PATTERN};
pub use runtime::{ContainerRuntime, DockerCli};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::fs;
use std::path::{Path, PathBuf};

/// Main library interface: one instance drives one sequential extraction run.
pub struct Harvester {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

/// What a dry run would do for one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedAction {
    Extract { key: String, dest: PathBuf },
    AlreadyExtracted { key: String },
    Unidentifiable,
}

#[derive(Debug, Clone)]
pub struct PlannedEntry {
    pub image: String,
    pub action: PlannedAction,
}

impl Harvester {
    /// Create a new Harvester instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager =
            ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a Harvester instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(false);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create Harvester instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Run the extraction pipeline over every reference in the list file.
    ///
    /// Per-entry failures never abort the run; the returned summary (also
    /// printed) is the only failure signal.
    pub fn run(&self, list_path: &Path) -> Result<RunSummary> {
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .start_operation("Starting workspace extraction");

        let images = read_image_list(list_path)?;
        self.output_formatter.info(&format!(
            "Read {} image references from {}",
            images.len(),
            list_path.display()
        ));

        self.prepare_output_root()?;

        let runtime = DockerCli::new(&self.config.runtime.binary);
        let key_pattern = self.config.key_pattern()?;
        self.output_formatter.debug(&format!(
            "runtime: {}, key pattern: {}, container prefix: {}",
            runtime.binary().display(),
            key_pattern.as_str(),
            self.config.runtime.container_prefix
        ));

        let root = self.config.output.root.clone();
        let entry_bar = self
            .progress_manager
            .create_entry_progress(images.len() as u64);

        let formatter = &self.output_formatter;
        let progress = &self.progress_manager;
        let bar = entry_bar.clone();
        let root_for_entries = root.clone();

        let extractor = WorkspaceExtractor::new(&runtime, key_pattern, root.clone())
            .with_workspace_path(self.config.runtime.workspace_path.clone())
            .with_container_prefix(self.config.runtime.container_prefix.clone())
            .with_keep_images(self.config.runtime.keep_images)
            .with_entry_callback(Box::new(move |report| {
                progress.suspend(|| formatter.print_entry(report, &root_for_entries));
                bar.inc(1);
            }))
            .with_warning_callback(Box::new(move |message| {
                progress.suspend(|| formatter.warning(message));
            }));

        let summary = extractor.run(&images, &self.shutdown);

        entry_bar.finish_and_clear();
        self.progress_manager.clear();
        self.output_formatter.print_run_summary(&summary, &root);

        Ok(summary)
    }

    /// Compute the per-entry plan without touching the runtime or mutating
    /// the filesystem. Backs `--dry-run`.
    pub fn plan(&self, list_path: &Path) -> Result<Vec<PlannedEntry>> {
        let images = read_image_list(list_path)?;
        let key_pattern = self.config.key_pattern()?;

        Ok(images
            .into_iter()
            .map(|image| {
                let action = match key_pattern.derive(&image) {
                    None => PlannedAction::Unidentifiable,
                    Some(key) => {
                        let dest = self.config.output.root.join(&key);
                        if dest.exists() {
                            PlannedAction::AlreadyExtracted { key }
                        } else {
                            PlannedAction::Extract { key, dest }
                        }
                    }
                };
                PlannedEntry { image, action }
            })
            .collect())
    }

    fn prepare_output_root(&self) -> Result<()> {
        let root = &self.config.output.root;
        if !root.exists() {
            fs::create_dir_all(root).map_err(|e| HarvestError::Permission {
                path: format!("Cannot create output root {}: {}", root.display(), e),
            })?;
        }
        Ok(())
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        fs::write(output_path.as_ref(), sample_config).map_err(HarvestError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &HarvestError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn list_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_harvester_creation() {
        let config = Config::default();
        let harvester = Harvester::new_for_test(config, OutputMode::Plain, 0, true);
        assert!(harvester.is_running());
        assert_eq!(harvester.config().runtime.container_prefix, "temp_");
    }

    #[test]
    fn test_plan_classifies_entries() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("cve-2024-25620")).unwrap();

        let mut config = Config::default();
        config.output.root = root.path().to_path_buf();
        let harvester = Harvester::new_for_test(config, OutputMode::Plain, 0, true);

        let list = list_file(
            "registry/x:cve-2021-23376-build\nregistry/y:nightly\nregistry/z:cve-2024-25620\n",
        );
        let plan = harvester.plan(list.path()).unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan[0].action,
            PlannedAction::Extract {
                key: "cve-2021-23376".to_string(),
                dest: root.path().join("cve-2021-23376"),
            }
        );
        assert_eq!(plan[1].action, PlannedAction::Unidentifiable);
        assert_eq!(
            plan[2].action,
            PlannedAction::AlreadyExtracted {
                key: "cve-2024-25620".to_string(),
            }
        );
    }

    #[test]
    fn test_plan_has_no_side_effects() {
        let root = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.root = root.path().join("never-created");
        let harvester = Harvester::new_for_test(config, OutputMode::Plain, 0, true);

        let list = list_file("registry/x:cve-2021-23376\n");
        harvester.plan(list.path()).unwrap();

        assert!(!root.path().join("never-created").exists());
    }

    #[test]
    fn test_run_reads_list_errors() {
        let config = Config::default();
        let harvester = Harvester::new_for_test(config, OutputMode::Plain, 0, true);

        let result = harvester.run(Path::new("/nonexistent/images.txt"));
        assert!(matches!(result, Err(HarvestError::ImageList { .. })));
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        Harvester::generate_sample_config(&config_path).unwrap();
        assert!(config_path.exists());

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[runtime]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[keys]"));
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());
    }
}

use clap::Parser;
use std::process;
use wsharvest::{
    Cli, Harvester, HarvestError, OutputFormatter, OutputMode, PlannedAction, UserFriendlyError,
};

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create Harvester instance
    let harvester = match Harvester::from_cli(&cli) {
        Ok(harvester) => harvester,
        Err(e) => {
            print_startup_error(&e);
            return startup_exit_code(&e);
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&cli, &harvester);
    }

    // Execute main extraction workflow
    match harvester.run(&cli.image_list) {
        // Partial failure is reported only through the printed summary; a
        // completed run exits 0 either way.
        Ok(summary) => {
            if summary.interrupted {
                130
            } else {
                0
            }
        }
        Err(e) => {
            harvester.handle_error(&e);
            startup_exit_code(&e)
        }
    }
}

fn startup_exit_code(error: &HarvestError) -> i32 {
    match error {
        HarvestError::Cancelled => 130,
        HarvestError::Config { .. } | HarvestError::KeyPattern { .. } => 2,
        HarvestError::ImageList { .. } => 3,
        HarvestError::RuntimeUnavailable { .. } => 4,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "wsharvest.toml".to_string());

    match Harvester::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  wsharvest <image-list> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, harvester: &Harvester) -> i32 {
    let formatter = harvester.output_formatter();
    let config = harvester.config();

    formatter.info("DRY RUN MODE - No containers or images will be touched");
    formatter.print_separator();

    formatter.info("Configuration that would be used:");
    println!("  Runtime binary:   {}", config.runtime.binary.display());
    println!("  Workspace path:   {}", config.runtime.workspace_path);
    println!("  Container prefix: {}", config.runtime.container_prefix);
    println!("  Keep images:      {}", config.runtime.keep_images);
    println!("  Output root:      {}", config.output.root.display());
    println!("  Key pattern:      {}", config.keys.pattern);
    formatter.print_separator();

    let plan = match harvester.plan(&cli.image_list) {
        Ok(plan) => plan,
        Err(e) => {
            harvester.handle_error(&e);
            return startup_exit_code(&e);
        }
    };

    let total = plan.len();
    for (index, entry) in plan.iter().enumerate() {
        let prefix = format!("[{}/{}]", index + 1, total);
        match &entry.action {
            PlannedAction::Extract { key, dest } => {
                println!("{} Would extract {} -> {}", prefix, key, dest.display());
            }
            PlannedAction::AlreadyExtracted { key } => {
                println!("{} Already extracted {} (would only delete image)", prefix, key);
            }
            PlannedAction::Unidentifiable => {
                println!(
                    "{} Would skip {} - no extraction key found",
                    prefix, entry.image
                );
            }
        }
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform actual extraction");

    0
}

fn print_startup_error(error: &HarvestError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use wsharvest::OutputFormat;

    fn cli_with_config(config: Option<PathBuf>, generate: bool) -> Cli {
        Cli {
            image_list: PathBuf::from("images.txt"),
            output: None,
            workspace_path: None,
            key_pattern: None,
            container_prefix: None,
            runtime_bin: None,
            keep_images: false,
            config,
            output_format: OutputFormat::Plain,
            verbose: 0,
            quiet: true,
            dry_run: false,
            generate_config: generate,
        }
    }

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = cli_with_config(Some(config_path.clone()), true);
        let exit_code = handle_generate_config(&cli);

        assert_eq!(exit_code, 0);
        assert!(config_path.exists());

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[runtime]"));
    }

    #[test]
    fn test_startup_exit_codes() {
        assert_eq!(startup_exit_code(&HarvestError::Cancelled), 130);
        assert_eq!(
            startup_exit_code(&HarvestError::Config {
                message: "bad".to_string()
            }),
            2
        );
        assert_eq!(
            startup_exit_code(&HarvestError::ImageList {
                path: "x".to_string(),
                message: "missing".to_string()
            }),
            3
        );
        assert_eq!(
            startup_exit_code(&HarvestError::RuntimeUnavailable {
                binary: "docker".to_string(),
                message: "not found".to_string()
            }),
            4
        );
    }
}

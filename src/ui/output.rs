use crate::error::{HarvestError, UserFriendlyError};
use crate::extract::{EntryOutcome, EntryReport, RunSummary};
use console::{style, Emoji, Term};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Per-entry progress line: index/total and the entry's outcome.
    pub fn print_entry(&self, report: &EntryReport<'_>, output_root: &Path) {
        if !self.should_show_message(0) {
            return;
        }

        if self.mode == OutputMode::Json {
            self.print_json_object(&entry_json(report));
            return;
        }

        let prefix = format!("[{}/{}]", report.index, report.total);
        let line = match report.outcome {
            EntryOutcome::Extracted { key } => format!(
                "{} Extracted {} -> {}",
                prefix,
                key,
                output_root.join(key).display()
            ),
            EntryOutcome::AlreadyExtracted { key } => {
                format!("{} Skipping {} - already extracted", prefix, key)
            }
            EntryOutcome::Unidentifiable => format!(
                "{} Skipping {} - no extraction key found",
                prefix, report.image
            ),
            EntryOutcome::Failed { key, reason } => {
                format!("{} FAILED {}: {}", prefix, key, reason)
            }
        };

        match report.outcome {
            EntryOutcome::Failed { .. } => self.error(&line),
            EntryOutcome::Extracted { .. } => {
                if self.use_colors {
                    println!("{}", style(&line).green());
                } else {
                    println!("{}", line);
                }
            }
            _ => println!("{}", line),
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &HarvestError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Final summary: the run's only failure signal, printed even in quiet
    /// mode.
    pub fn print_run_summary(&self, summary: &RunSummary, output_root: &Path) {
        match self.mode {
            OutputMode::Human => self.print_human_summary(summary, output_root),
            OutputMode::Json => self.print_json_summary(summary, output_root),
            OutputMode::Plain => self.print_plain_summary(summary, output_root),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, summary: &RunSummary, output_root: &Path) {
        println!();
        self.print_separator();

        let headline = format!(
            "Done! Extracted {}/{} workspaces to {} in {}",
            summary.succeeded,
            summary.total,
            output_root.display(),
            format_duration(summary.duration)
        );
        if self.use_colors && summary.is_clean() {
            println!("{}{}", CHECKMARK, style(&headline).green().bold());
        } else {
            println!("{}", headline);
        }

        if summary.skipped > 0 {
            println!(
                "  Skipped {} entr{} with no recognizable key",
                summary.skipped,
                if summary.skipped == 1 { "y" } else { "ies" }
            );
        }

        if !summary.failed.is_empty() {
            let failed_line = format!("  Failed: {}", summary.failed.join(", "));
            if self.use_colors {
                println!("{}", style(&failed_line).red());
            } else {
                println!("{}", failed_line);
            }
        }

        if summary.interrupted {
            println!("  Interrupted before processing all entries");
        }

        self.print_separator();
    }

    fn print_json_summary(&self, summary: &RunSummary, output_root: &Path) {
        let json = serde_json::json!({
            "type": "summary",
            "output_root": output_root.display().to_string(),
            "summary": summary,
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, summary: &RunSummary, output_root: &Path) {
        println!("COMPLETED: workspace extraction");
        println!("Output root: {}", output_root.display());
        println!("Extracted: {}/{}", summary.succeeded, summary.total);
        println!("Skipped: {}", summary.skipped);
        if !summary.failed.is_empty() {
            println!("Failed: {}", summary.failed.join(", "));
        }
        if summary.interrupted {
            println!("Interrupted: yes");
        }
    }
}

fn entry_json(report: &EntryReport<'_>) -> serde_json::Value {
    let (outcome, key, reason) = match report.outcome {
        EntryOutcome::Extracted { key } => ("extracted", Some(key.as_str()), None),
        EntryOutcome::AlreadyExtracted { key } => ("already_extracted", Some(key.as_str()), None),
        EntryOutcome::Unidentifiable => ("unidentifiable", None, None),
        EntryOutcome::Failed { key, reason } => {
            ("failed", Some(key.as_str()), Some(reason.as_str()))
        }
    };

    serde_json::json!({
        "type": "entry",
        "index": report.index,
        "total": report.total,
        "image": report.image,
        "outcome": outcome,
        "key": key,
        "reason": reason,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert_eq!(formatter.mode, OutputMode::Human);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.quiet);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.should_show_message(0));
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_entry_json_shape() {
        let outcome = EntryOutcome::Failed {
            key: "cve-2021-23376".to_string(),
            reason: "copy failed".to_string(),
        };
        let report = EntryReport {
            index: 3,
            total: 7,
            image: "registry/x:cve-2021-23376",
            outcome: &outcome,
        };

        let json = entry_json(&report);
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["index"], 3);
        assert_eq!(json["key"], "cve-2021-23376");
        assert_eq!(json["reason"], "copy failed");
    }
}

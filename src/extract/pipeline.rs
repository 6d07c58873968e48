use crate::error::Result;
use crate::extract::summary::RunSummary;
use crate::keys::KeyPattern;
use crate::runtime::ContainerRuntime;
use crate::ui::GracefulShutdown;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What happened to a single image reference.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// Workspace copied into a fresh destination directory.
    Extracted { key: String },
    /// Destination already existed; only the image deletion was issued.
    AlreadyExtracted { key: String },
    /// No extraction key in the reference; nothing was touched.
    Unidentifiable,
    /// Container creation or copy failed; cleanup was still attempted.
    Failed { key: String, reason: String },
}

/// Per-entry report handed to the UI callback, in input order.
pub struct EntryReport<'a> {
    pub index: usize,
    pub total: usize,
    pub image: &'a str,
    pub outcome: &'a EntryOutcome,
}

pub type EntryCallback<'a> = Box<dyn Fn(&EntryReport<'_>) + 'a>;
pub type WarningCallback<'a> = Box<dyn Fn(&str) + 'a>;

/// The extraction loop: one image fully processed (created, copied, cleaned
/// up) before the next begins. No error aborts the run; everything an entry
/// leaves behind is either its destination directory or nothing.
pub struct WorkspaceExtractor<'a, R: ContainerRuntime> {
    runtime: &'a R,
    key_pattern: KeyPattern,
    output_root: PathBuf,
    workspace_path: String,
    container_prefix: String,
    keep_images: bool,
    on_entry: Option<EntryCallback<'a>>,
    on_warning: Option<WarningCallback<'a>>,
}

impl<'a, R: ContainerRuntime> WorkspaceExtractor<'a, R> {
    pub fn new(runtime: &'a R, key_pattern: KeyPattern, output_root: PathBuf) -> Self {
        Self {
            runtime,
            key_pattern,
            output_root,
            workspace_path: "/workspace".to_string(),
            container_prefix: "temp_".to_string(),
            keep_images: false,
            on_entry: None,
            on_warning: None,
        }
    }

    pub fn with_workspace_path<S: Into<String>>(mut self, path: S) -> Self {
        self.workspace_path = path.into();
        self
    }

    pub fn with_container_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.container_prefix = prefix.into();
        self
    }

    pub fn with_keep_images(mut self, keep: bool) -> Self {
        self.keep_images = keep;
        self
    }

    pub fn with_entry_callback(mut self, callback: EntryCallback<'a>) -> Self {
        self.on_entry = Some(callback);
        self
    }

    pub fn with_warning_callback(mut self, callback: WarningCallback<'a>) -> Self {
        self.on_warning = Some(callback);
        self
    }

    pub fn destination(&self, key: &str) -> PathBuf {
        self.output_root.join(key)
    }

    pub fn container_name(&self, key: &str) -> String {
        format!("{}{}", self.container_prefix, key)
    }

    /// Process every entry strictly in input order and return the summary.
    /// An interrupt stops the loop between entries; the current entry always
    /// finishes its cleanup first.
    pub fn run(&self, images: &[String], shutdown: &GracefulShutdown) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::new(images.len());

        for (index, image) in images.iter().enumerate() {
            if !shutdown.is_running() {
                summary.interrupted = true;
                break;
            }

            let outcome = self.process_entry(image);

            if let Some(ref callback) = self.on_entry {
                callback(&EntryReport {
                    index: index + 1,
                    total: images.len(),
                    image,
                    outcome: &outcome,
                });
            }

            summary.record(&outcome);
        }

        summary.duration = start.elapsed();
        summary.finished_at = chrono::Utc::now();
        summary
    }

    fn process_entry(&self, image: &str) -> EntryOutcome {
        let Some(key) = self.key_pattern.derive(image) else {
            // Routing decision, not an error: no side effects at all for
            // this entry, image deletion included.
            return EntryOutcome::Unidentifiable;
        };

        let dest = self.destination(&key);
        if dest.exists() {
            // Already extracted; the image still has to go.
            self.delete_image(image);
            return EntryOutcome::AlreadyExtracted { key };
        }

        let container = self.container_name(&key);
        let result = self.extract(image, &container, &dest);
        self.cleanup(&container, image);

        match result {
            Ok(()) => EntryOutcome::Extracted { key },
            Err(e) => EntryOutcome::Failed {
                key,
                reason: e.to_string(),
            },
        }
    }

    fn extract(&self, image: &str, container: &str, dest: &Path) -> Result<()> {
        self.runtime.create_container(image, container)?;

        if let Err(e) = self.runtime.copy_path(container, &self.workspace_path, dest) {
            // A partial destination would be mistaken for a finished key on
            // the next run's existence check.
            if dest.exists() {
                if let Err(remove_err) = fs::remove_dir_all(dest) {
                    self.warn(&format!(
                        "failed to remove partial destination {}: {}",
                        dest.display(),
                        remove_err
                    ));
                }
            }
            return Err(e);
        }

        Ok(())
    }

    /// Best-effort teardown after success or failure. Neither removal can
    /// change the entry's already-determined outcome.
    fn cleanup(&self, container: &str, image: &str) {
        if let Err(e) = self.runtime.remove_container(container) {
            self.warn(&format!("failed to remove container {}: {}", container, e));
        }
        self.delete_image(image);
    }

    fn delete_image(&self, image: &str) {
        if self.keep_images {
            return;
        }
        if let Err(e) = self.runtime.remove_image(image) {
            self.warn(&format!("failed to delete image {}: {}", image, e));
        }
    }

    fn warn(&self, message: &str) {
        if let Some(ref callback) = self.on_warning {
            callback(message);
        }
    }
}

use crate::error::{HarvestError, Result};
use std::fs;
use std::path::Path;

/// Read the image list: one reference per line, surrounding whitespace
/// trimmed, blank lines ignored. The file is read once at startup; its
/// existence is a deployment precondition, so any read failure is a startup
/// error rather than a per-entry one.
pub fn read_image_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| HarvestError::ImageList {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

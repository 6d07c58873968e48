use crate::error::{HarvestError, Result};
use regex::{Regex, RegexBuilder};

/// Default pattern for the extraction key: an alphabetic prefix followed by
/// one or more hyphen-separated digit groups, e.g. `cve-2021-23376`. A
/// trailing non-numeric segment (`-build`, `-py3`) is not part of the key.
pub const DEFAULT_KEY_PATTERN: &str = r"[a-z]+(?:-[0-9]+)+";

/// Derives extraction keys from image references by substring match.
///
/// The pattern is compiled case-insensitively regardless of how it is
/// written; matches are normalized to lowercase so the same image tagged
/// `CVE-2021-23376` and `cve-2021-23376` lands in one destination directory.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
}

impl KeyPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| HarvestError::KeyPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { regex })
    }

    /// First match in the reference, lowercased. `None` means the reference
    /// is unidentifiable and the caller must skip it without side effects.
    pub fn derive(&self, image: &str) -> Option<String> {
        self.regex.find(image).map(|m| m.as_str().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

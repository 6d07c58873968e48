use std::fmt;
use thiserror::Error;

/// The four container-runtime operations the tool issues. Carried inside
/// `HarvestError::Runtime` so failures name the call that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeOp {
    CreateContainer,
    CopyPath,
    RemoveContainer,
    RemoveImage,
}

impl fmt::Display for RuntimeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuntimeOp::CreateContainer => "create-container",
            RuntimeOp::CopyPath => "copy-path",
            RuntimeOp::RemoveContainer => "remove-container",
            RuntimeOp::RemoveImage => "remove-image",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read image list {path}: {message}")]
    ImageList { path: String, message: String },

    #[error("Invalid key pattern `{pattern}`: {message}")]
    KeyPattern { pattern: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Runtime operation {operation} failed for {subject}: {message}")]
    Runtime {
        operation: RuntimeOp,
        subject: String,
        message: String,
    },

    #[error("Container runtime `{binary}` could not be launched: {message}")]
    RuntimeUnavailable { binary: String, message: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for HarvestError {
    fn user_message(&self) -> String {
        match self {
            HarvestError::ImageList { path, message } => {
                format!("Cannot read image list {}: {}", path, message)
            }
            HarvestError::KeyPattern { pattern, message } => {
                format!("Key pattern `{}` is invalid: {}", pattern, message)
            }
            HarvestError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            HarvestError::Runtime {
                operation,
                subject,
                message,
            } => {
                format!("{} failed for {}: {}", operation, subject, message)
            }
            HarvestError::RuntimeUnavailable { binary, message } => {
                format!("Cannot launch container runtime `{}`: {}", binary, message)
            }
            HarvestError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            HarvestError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            HarvestError::ImageList { .. } => Some(
                "Check that the file exists and contains one image reference per line."
                    .to_string(),
            ),
            HarvestError::KeyPattern { .. } => Some(
                "The pattern must be a valid regular expression; it is matched \
                 case-insensitively against each image reference."
                    .to_string(),
            ),
            HarvestError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present."
                    .to_string(),
            ),
            HarvestError::RuntimeUnavailable { .. } => Some(
                "Ensure the container runtime is installed and on PATH, or point at it \
                 with --runtime-bin."
                    .to_string(),
            ),
            HarvestError::Permission { .. } => Some(
                "Ensure you have write permission for the output root directory.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for HarvestError {
    fn from(error: toml::de::Error) -> Self {
        HarvestError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = HarvestError::KeyPattern {
            pattern: "(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert!(error.user_message().contains("Key pattern"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_runtime_error_names_operation() {
        let error = HarvestError::Runtime {
            operation: RuntimeOp::CopyPath,
            subject: "temp_cve-2021-23376".to_string(),
            message: "no such file or directory".to_string(),
        };
        let message = error.user_message();
        assert!(message.contains("copy-path"));
        assert!(message.contains("temp_cve-2021-23376"));
    }

    #[test]
    fn test_runtime_op_display() {
        assert_eq!(RuntimeOp::CreateContainer.to_string(), "create-container");
        assert_eq!(RuntimeOp::RemoveImage.to_string(), "remove-image");
    }

    #[test]
    fn test_cancelled_has_no_suggestion() {
        assert!(HarvestError::Cancelled.suggestion().is_none());
    }
}

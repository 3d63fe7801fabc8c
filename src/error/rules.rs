use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("failed to read rules file '{}': {message}", path.display())]
    RulesFileReadError { path: PathBuf, message: String },

    #[error("failed to parse rules file '{}': {message}", path.display())]
    RulesParseError { path: PathBuf, message: String },

    #[error("unsupported rules format: {format} (expected json or yaml)")]
    UnsupportedFormat { format: String },

    #[error("rules directory not found: {}", path.display())]
    RulesDirNotFound { path: PathBuf },
}

impl RulesError {
    pub fn rules_file_read_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RulesFileReadError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn rules_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RulesParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn rules_dir_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RulesDirNotFound { path: path.into() }
    }
}

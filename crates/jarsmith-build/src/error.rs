/// Build system error types
use jarsmith_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Error during compile with {tool}: {message}")]
    Compile { tool: String, message: String },

    #[error("Failed to package {path}: {message}")]
    Packaging { path: PathBuf, message: String },

    #[error("Error during native-image: {message}")]
    NativeBuild { message: String },

    #[error("Interrupted while waiting for {tool}")]
    Interrupted { tool: String },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(String),

    #[error("Integration failed: {0}")]
    Integration(String),

    #[error("Invalid artifact {path}: {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    #[error("Invalid class file {path}: {reason}")]
    ClassFormat { path: PathBuf, reason: String },

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a compile error
    pub fn compile(tool: impl Into<String>, message: impl ToString) -> Self {
        Self::Compile {
            tool: tool.into(),
            message: message.to_string(),
        }
    }

    /// Create a packaging error
    pub fn packaging(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Packaging {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a native build error
    pub fn native_build(message: impl ToString) -> Self {
        Self::NativeBuild {
            message: message.to_string(),
        }
    }

    /// Create an invalid artifact error
    pub fn invalid_artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InvalidArtifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a class format error
    pub fn class_format(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ClassFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit status the caller should propagate
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Recoverable problems noticed during a build; logged and recorded, never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// The descriptor template is not available
    MissingDescriptorTemplate { template: String },
    /// The descriptor could not be produced
    DescriptorFailed { reason: String },
    /// Several entry points found, the first one was used
    AmbiguousEntryPoint {
        chosen: String,
        candidates: Vec<String>,
    },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDescriptorTemplate { template } => {
                write!(f, "Could not locate {} template", template)
            }
            Self::DescriptorFailed { reason } => {
                write!(f, "Could not generate package descriptor: {}", reason)
            }
            Self::AmbiguousEntryPoint { candidates, .. } => write!(
                f,
                "Could not locate unique main() method. Use -m to specify explicit main method. Falling back to use first found: {}",
                candidates.join(",")
            ),
        }
    }
}

// src/error.rs

//! Error types for the recipe lifecycle
//!
//! Each lifecycle stage has its own error type so a failure can always be
//! traced back to the stage that produced it:
//! - [`GenerationError`] for dependency resolution and descriptor writes
//! - [`BuildError`] for the external build system during configure/build
//! - [`PackageError`] for install, including ordering violations

use crate::recipe::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while generating toolchain and dependency descriptors
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The dependency resolver could not resolve a declared dependency
    #[error("failed to resolve dependency {dependency}: {reason}")]
    Resolution { dependency: String, reason: String },

    /// A descriptor could not be written to the generator folder
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generated-files manifest could not be read or written
    #[error("generated-files manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Failures reported by the external build system
#[derive(Error, Debug)]
pub enum BuildError {
    /// build() was requested before configure() succeeded
    #[error("build requested before configure completed")]
    NotConfigured,

    /// The build tool could not be located
    #[error("build tool not found: {0}")]
    ToolNotFound(String),

    /// The build tool could not be started
    #[error("failed to run {stage} phase: {source}")]
    Spawn {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The build tool ran and exited unsuccessfully
    #[error("{stage} phase failed with exit code {code:?}\nstderr: {stderr}")]
    Failed {
        stage: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    /// Exported sources could not be staged into the build folder
    #[error("failed to stage sources into {}: {reason}", path.display())]
    Staging { path: PathBuf, reason: String },
}

/// Failures while installing build outputs into the package tree
#[derive(Error, Debug)]
pub enum PackageError {
    /// install() was requested before build() succeeded
    #[error("build not completed: install requires a successful build first")]
    BuildNotCompleted,

    /// The build system's install step failed
    #[error("install failed: {0}")]
    Install(#[source] BuildError),

    /// The package folder could not be prepared
    #[error("failed to prepare package folder {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for recipe parsing and the cook lifecycle
#[derive(Error, Debug)]
pub enum Error {
    /// Recipe text could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Recipe parsed but is not usable
    #[error("Invalid recipe: {0}")]
    ValidationError(String),

    /// Filesystem failure outside a specific stage
    #[error("I/O error: {0}")]
    IoError(String),

    /// The build folder lock could not be taken
    #[error("Failed to lock build folder: {0}")]
    Lock(String),

    /// Generate stage failure
    #[error("generate stage failed: {0}")]
    Generation(#[from] GenerationError),

    /// Configure or build stage failure
    #[error("build stage failed: {0}")]
    Build(#[from] BuildError),

    /// Package stage failure
    #[error("package stage failed: {0}")]
    Package(#[from] PackageError),

    /// A stage was requested from a state that does not precede it
    #[error("cannot run {stage} while recipe is {current}")]
    OutOfOrder { stage: Stage, current: Stage },

    /// A previous stage failed; the cook accepts no further transitions
    #[error("cook halted after {stage} failed")]
    Halted { stage: Stage },
}

impl Error {
    /// Name of the lifecycle stage this error belongs to, if any
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Error::Generation(_) => Some("generate"),
            Error::Build(BuildError::Failed { stage, .. })
            | Error::Build(BuildError::Spawn { stage, .. }) => Some(*stage),
            Error::Build(_) => Some("build"),
            Error::Package(_) => Some("package"),
            Error::OutOfOrder { stage, .. } | Error::Halted { stage } => Some(stage.as_str()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

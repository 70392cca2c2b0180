//! Errors raised while reading, writing and checking patch files.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between a patch file and [`Patch`](crate::Patch).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A patch file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        /// File that was being read.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },

    /// A patch file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    WriteFile {
        /// File that was being written.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },

    /// A patch directory could not be created.
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },

    /// The text is not a valid patch document.
    #[error("invalid patch TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The patch could not be turned into TOML.
    #[error("cannot serialize patch: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Neither a factory patch nor a file matches the name.
    #[error("patch not found: {0}")]
    PatchNotFound(String),

    /// The patch parsed but holds values the synth would have to clamp.
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    /// [`ConfigError::ReadFile`] for `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadFile { path: path.into(), source }
    }

    /// [`ConfigError::WriteFile`] for `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFile { path: path.into(), source }
    }

    /// [`ConfigError::CreateDir`] for `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateDir { path: path.into(), source }
    }

    /// Path involved in a filesystem failure, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ReadFile { path, .. }
            | Self::WriteFile { path, .. }
            | Self::CreateDir { path, .. } => Some(path.as_path()),
            _ => None,
        }
    }
}

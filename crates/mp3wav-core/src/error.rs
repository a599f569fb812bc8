//! Unified error type for mp3wav.
//!
//! Every failure a conversion can hit is a variant of [`Error`]. Callers that
//! only care about the category use [`Error::kind`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Error category, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidOutputSpec,
    InputNotFound,
    StagingFailed,
    PermissionFailed,
    DecoderFailed,
    OutputStatFailed,
    EmptyOutput,
    Io,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidOutputSpec => "invalid_output_spec",
            ErrorKind::InputNotFound => "input_not_found",
            ErrorKind::StagingFailed => "staging_failed",
            ErrorKind::PermissionFailed => "permission_failed",
            ErrorKind::DecoderFailed => "decoder_failed",
            ErrorKind::OutputStatFailed => "output_stat_failed",
            ErrorKind::EmptyOutput => "empty_output",
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while staging the decoder or converting a file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither an output path nor an output postfix was given.
    #[error("Invalid output spec: {0}")]
    InvalidOutputSpec(String),

    /// The input file was not given or does not exist.
    #[error("Input not found: {}", path.display())]
    InputNotFound {
        /// The path that was checked (empty if none was given).
        path: PathBuf,
    },

    /// Copying the bundled decoder into the staging directory failed.
    #[error("Failed to stage decoder {} to {}: {source}", from.display(), to.display())]
    StagingFailed {
        /// Bundled decoder location.
        from: PathBuf,
        /// Staging destination.
        to: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Marking the staged decoder executable failed.
    #[error("Failed to set permissions on {}: {source}", path.display())]
    PermissionFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The decoder process could not be spawned or awaited.
    #[error("Decoder error [{tool}]: {message}")]
    Decoder {
        /// Executable name.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The decoder did not finish within the configured timeout.
    #[error("Decoder error [{tool}]: timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    /// The output file could not be stat'ed after decoding.
    #[error("Failed to stat output file {}: {source}", path.display())]
    OutputStatFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The decoder produced a zero-byte output file.
    #[error("Output file {} was empty. Check stdout and stderr for details", path.display())]
    EmptyOutput { path: PathBuf },

    /// Configuration could not be parsed or failed validation.
    #[error("Config error: {0}")]
    Config(String),

    /// Any other I/O failure.
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidOutputSpec(_) => ErrorKind::InvalidOutputSpec,
            Error::InputNotFound { .. } => ErrorKind::InputNotFound,
            Error::StagingFailed { .. } => ErrorKind::StagingFailed,
            Error::PermissionFailed { .. } => ErrorKind::PermissionFailed,
            Error::Decoder { .. } | Error::Timeout { .. } => ErrorKind::DecoderFailed,
            Error::OutputStatFailed { .. } => ErrorKind::OutputStatFailed,
            Error::EmptyOutput { .. } => ErrorKind::EmptyOutput,
            Error::Config(_) => ErrorKind::Config,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Convenience constructor for [`Error::InputNotFound`].
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Error::InputNotFound { path: path.into() }
    }

    /// Convenience constructor for [`Error::Decoder`].
    pub fn decoder(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decoder {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

//! Conversion request and report types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorKind};

/// A single MP3 to WAV conversion.
///
/// Deserializes from the nested event shape:
///
/// ```
/// use mp3wav_core::ConversionRequest;
///
/// let req: ConversionRequest = serde_json::from_str(
///     r#"{"input": {"path": "sample.mp3", "parameters": ["-m"]}, "output": {"postfix": ".wav"}}"#,
/// ).unwrap();
/// assert_eq!(req.input.parameters, vec!["-m"]);
/// assert!(req.output.path.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRequest {
    pub input: InputSpec,
    pub output: OutputSpec,
}

/// Input file plus extra decoder flags placed before it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSpec {
    pub path: PathBuf,
    pub parameters: Vec<String>,
}

/// Explicit output path, or a postfix for a generated one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postfix: Option<String>,
}

/// How the output location will be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget<'a> {
    /// Write to this path verbatim.
    Path(&'a Path),
    /// Generate a fresh temp file ending in this postfix.
    Generated(&'a str),
}

impl OutputSpec {
    /// Resolve which output target applies. An empty path counts as absent.
    pub fn target(&self) -> Option<OutputTarget<'_>> {
        match (&self.path, &self.postfix) {
            (Some(path), _) if !path.as_os_str().is_empty() => Some(OutputTarget::Path(path)),
            (_, Some(postfix)) => Some(OutputTarget::Generated(postfix)),
            _ => None,
        }
    }
}

impl ConversionRequest {
    /// Start a request for the given input file.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: InputSpec {
                path: input.into(),
                parameters: Vec::new(),
            },
            output: OutputSpec::default(),
        }
    }

    /// Append an extra decoder flag (placed before the input path).
    pub fn parameter(mut self, arg: impl Into<String>) -> Self {
        self.input.parameters.push(arg.into());
        self
    }

    /// Append multiple extra decoder flags.
    pub fn parameters(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.input.parameters.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Write to an explicit output path.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output.path = Some(path.into());
        self
    }

    /// Generate the output path with this postfix when no path is set.
    pub fn output_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.output.postfix = Some(postfix.into());
        self
    }
}

/// What a conversion produced, populated as far as the run got.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Output file path (empty if not yet resolved).
    pub output_file: PathBuf,
    /// Output size in bytes; 0 if decoding failed or produced nothing.
    pub size: u64,
    /// Decoder stdout, verbatim.
    pub stdout: String,
    /// Decoder stderr, verbatim.
    pub stderr: String,
    /// Shell-escaped rendition of the decoder invocation (empty if the decoder
    /// was never reached).
    pub command_line: String,
}

/// A failed conversion together with the partial report.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ConversionFailure {
    #[source]
    pub error: Error,
    pub report: ConversionReport,
}

impl ConversionFailure {
    pub fn new(error: Error, report: ConversionReport) -> Self {
        Self { error, report }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

/// Outcome of one conversion request.
pub type ConversionResult = std::result::Result<ConversionReport, ConversionFailure>;

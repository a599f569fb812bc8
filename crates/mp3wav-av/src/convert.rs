//! MP3 to WAV conversion through the staged decoder.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mp3wav_core::{
    Config, ConversionFailure, ConversionReport, ConversionRequest, ConversionResult, Error,
    Result,
};

use crate::command::ToolCommand;
use crate::locator::{provider_from_config, DecoderProvider};
use crate::output::OutputFile;

/// Flag that makes mpg123 write a WAV file to the following path.
const WAV_FLAG: &str = "-w";

/// Runtime settings for a [`Converter`].
#[derive(Debug, Clone)]
pub struct ConverterSettings {
    /// Directory generated output files are created in.
    pub output_dir: PathBuf,
    /// Decoder time limit; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
            timeout: None,
        }
    }
}

impl ConverterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output.dir(),
            timeout: config.decoder.timeout(),
        }
    }
}

/// Runs conversion requests against a [`DecoderProvider`].
///
/// The provider is shared, so several converters (or concurrent calls on one
/// converter) reuse the same staged decoder.
///
/// # Example
///
/// ```no_run
/// use mp3wav_av::{Converter, ConverterSettings, StagedDecoder};
/// use mp3wav_core::ConversionRequest;
/// use std::sync::Arc;
///
/// # async fn example() {
/// let decoder = Arc::new(StagedDecoder::new("/var/task/bin/mpg123", "/tmp"));
/// let converter = Converter::new(decoder, ConverterSettings::default());
///
/// let request = ConversionRequest::new("sample.mp3").output_postfix(".wav");
/// match converter.run(&request).await {
///     Ok(report) => println!("{} bytes at {}", report.size, report.output_file.display()),
///     Err(failure) => eprintln!("{failure}\n{}", failure.report.stderr),
/// }
/// converter.cleanup().await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct Converter {
    provider: Arc<dyn DecoderProvider>,
    settings: ConverterSettings,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Converter {
    pub fn new(provider: Arc<dyn DecoderProvider>, settings: ConverterSettings) -> Self {
        Self { provider, settings }
    }

    /// Build a converter with the provider and settings `config` selects.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::from(provider_from_config(&config.decoder)),
            ConverterSettings::from_config(config),
        )
    }

    pub fn provider(&self) -> &Arc<dyn DecoderProvider> {
        &self.provider
    }

    pub fn settings(&self) -> &ConverterSettings {
        &self.settings
    }

    /// Convert one file.
    ///
    /// On failure the returned [`ConversionFailure`] carries every report
    /// field populated before the failing step, including the decoder's
    /// stdout and stderr once it has run.
    pub async fn run(&self, request: &ConversionRequest) -> ConversionResult {
        let mut report = ConversionReport::default();

        match self.convert(request, &mut report).await {
            Ok(()) => {
                tracing::info!(
                    "Converted {} -> {} ({} bytes)",
                    request.input.path.display(),
                    report.output_file.display(),
                    report.size
                );
                Ok(report)
            }
            Err(error) => {
                tracing::warn!(
                    kind = %error.kind(),
                    "Conversion of {} failed: {error}",
                    request.input.path.display()
                );
                Err(ConversionFailure::new(error, report))
            }
        }
    }

    /// Convert one file and hand the result to `on_complete` exactly once
    /// before returning it.
    pub async fn run_with<F>(&self, request: &ConversionRequest, on_complete: F) -> ConversionResult
    where
        F: FnOnce(&ConversionResult),
    {
        let result = self.run(request).await;
        on_complete(&result);
        result
    }

    /// Delete the staged decoder, if any. Safe to call repeatedly.
    pub async fn cleanup(&self) -> Result<()> {
        self.provider.release().await
    }

    /// Keep the staged decoder on disk past this converter's lifetime.
    pub async fn keep_decoder(&self) -> Result<Option<PathBuf>> {
        self.provider.persist().await
    }

    async fn convert(&self, request: &ConversionRequest, report: &mut ConversionReport) -> Result<()> {
        let target = request.output.target().ok_or_else(|| {
            Error::InvalidOutputSpec("either output.path or output.postfix is required".into())
        })?;

        let input = &request.input.path;
        if input.as_os_str().is_empty() || !input.exists() {
            return Err(Error::input_not_found(input));
        }

        let output = OutputFile::create(target, &self.settings.output_dir)?;
        report.output_file = output.path().to_path_buf();

        let decoder = self.provider.ensure_available().await?;

        let mut cmd = ToolCommand::new(decoder);
        cmd.arg(WAV_FLAG)
            .arg(output.path())
            .args(&request.input.parameters)
            .arg(input)
            .timeout(self.settings.timeout);
        report.command_line = cmd.display();

        tracing::info!("Running {}", report.command_line);
        let tool_output = cmd.execute().await?;
        tracing::debug!(
            "Decoder exited with {} ({} bytes stdout, {} bytes stderr)",
            tool_output.status,
            tool_output.stdout.len(),
            tool_output.stderr.len()
        );
        report.stdout = tool_output.stdout;
        report.stderr = tool_output.stderr;

        let size = tokio::fs::metadata(output.path())
            .await
            .map_err(|source| Error::OutputStatFailed {
                path: output.path().to_path_buf(),
                source,
            })?
            .len();
        report.size = size;

        if size == 0 {
            return Err(Error::EmptyOutput {
                path: output.path().to_path_buf(),
            });
        }

        report.output_file = output.keep()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::StagedDecoder;
    use mp3wav_core::ErrorKind;

    fn converter_in(dir: &std::path::Path) -> Converter {
        let decoder = StagedDecoder::new(dir.join("missing-mpg123"), dir);
        let settings = ConverterSettings {
            output_dir: dir.to_path_buf(),
            timeout: None,
        };
        Converter::new(Arc::new(decoder), settings)
    }

    #[tokio::test]
    async fn missing_output_spec_fails_first() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter_in(dir.path());

        // Input is missing too, but the output spec is checked first.
        let request = ConversionRequest::new(dir.path().join("nope.mp3"));
        let failure = converter.run(&request).await.unwrap_err();

        assert_eq!(failure.kind(), ErrorKind::InvalidOutputSpec);
        assert_eq!(failure.report, ConversionReport::default());
    }

    #[tokio::test]
    async fn empty_input_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter_in(dir.path());

        let request = ConversionRequest::new("").output_postfix(".wav");
        let failure = converter.run(&request).await.unwrap_err();

        assert_eq!(failure.kind(), ErrorKind::InputNotFound);
        assert!(failure.report.command_line.is_empty());
        assert!(failure.report.output_file.as_os_str().is_empty());
    }

    #[tokio::test]
    async fn staging_failure_keeps_output_path_and_cleans_generated_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp3");
        std::fs::write(&input, b"ID3").unwrap();
        let converter = converter_in(dir.path());

        let request = ConversionRequest::new(&input).output_postfix(".wav");
        let failure = converter.run(&request).await.unwrap_err();

        assert_eq!(failure.kind(), ErrorKind::StagingFailed);
        assert!(failure.report.command_line.is_empty());
        assert!(failure.report.stdout.is_empty());
        assert!(failure.report.stderr.is_empty());
        assert!(failure.report.output_file.to_string_lossy().ends_with(".wav"));
        assert!(!failure.report.output_file.exists());
    }

    #[tokio::test]
    async fn run_with_calls_handler_once() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter_in(dir.path());

        let mut calls = 0;
        let request = ConversionRequest::new("x.mp3");
        let result = converter
            .run_with(&request, |r| {
                calls += 1;
                assert!(r.is_err());
            })
            .await;

        assert_eq!(calls, 1);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cleanup_twice_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let converter = converter_in(dir.path());
        converter.cleanup().await.unwrap();
        converter.cleanup().await.unwrap();
    }

    #[test]
    fn settings_follow_config() {
        let mut config = Config::default();
        config.output.dir = Some(PathBuf::from("/scratch/out"));
        config.decoder.timeout_secs = Some(30);

        let settings = ConverterSettings::from_config(&config);
        assert_eq!(settings.output_dir, PathBuf::from("/scratch/out"));
        assert_eq!(settings.timeout, Some(Duration::from_secs(30)));
    }
}

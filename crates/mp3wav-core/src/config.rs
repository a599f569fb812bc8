//! Configuration types.
//!
//! The top-level [`Config`] carries the decoder and output sections. Every
//! field defaults sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default postfix for generated output files.
pub const DEFAULT_POSTFIX: &str = ".wav";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref path) = self.decoder.bundled_path {
            if !path.exists() {
                warnings.push(format!(
                    "decoder.bundled_path {} does not exist; falling back to defaults",
                    path.display()
                ));
            }
        }

        if !self.output.postfix.is_empty() && !self.output.postfix.starts_with('.') {
            warnings.push(format!(
                "output.postfix '{}' has no leading dot; generated files will be named '...{}'",
                self.output.postfix, self.output.postfix
            ));
        }

        if !self.decoder.stage {
            warnings.push(
                "decoder.stage is false; the bundled decoder must already be executable".into(),
            );
        }

        warnings
    }
}

/// Where the decoder comes from and how it is run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Override for the bundled decoder location.
    pub bundled_path: Option<PathBuf>,
    /// Writable directory the decoder is copied into. Defaults to the system
    /// temp dir.
    pub staging_dir: Option<PathBuf>,
    /// Copy the decoder into `staging_dir` before running it.
    pub stage: bool,
    /// Kill the decoder after this many seconds. Unset means wait forever.
    pub timeout_secs: Option<u64>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            bundled_path: None,
            staging_dir: None,
            stage: true,
            timeout_secs: None,
        }
    }
}

impl DecoderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Output file generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Postfix used when no explicit output path is given.
    pub postfix: String,
    /// Directory generated output files are created in. Defaults to the
    /// system temp dir.
    pub dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            postfix: DEFAULT_POSTFIX.to_string(),
            dir: None,
        }
    }
}

impl OutputConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.decoder.stage);
        assert!(config.decoder.bundled_path.is_none());
        assert!(config.decoder.timeout().is_none());
        assert_eq!(config.output.postfix, ".wav");
    }

    #[test]
    fn timeout_from_secs() {
        let config: Config =
            serde_json::from_str(r#"{"decoder": {"timeout_secs": 90}}"#).unwrap();
        assert_eq!(config.decoder.timeout(), Some(Duration::from_secs(90)));
        // Unspecified fields in a partial section keep their defaults.
        assert!(config.decoder.stage);
    }

    #[test]
    fn staging_dir_falls_back_to_temp_dir() {
        let decoder = DecoderConfig::default();
        assert_eq!(decoder.staging_dir(), std::env::temp_dir());

        let decoder = DecoderConfig {
            staging_dir: Some(PathBuf::from("/scratch")),
            ..Default::default()
        };
        assert_eq!(decoder.staging_dir(), PathBuf::from("/scratch"));
    }

    #[test]
    fn validate_default_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_warns_on_odd_settings() {
        let mut config = Config::default();
        config.decoder.bundled_path = Some(PathBuf::from("/nonexistent/mpg123"));
        config.decoder.stage = false;
        config.output.postfix = "wav".into();

        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("bundled_path"));
        assert!(warnings[1].contains("leading dot"));
        assert!(warnings[2].contains("stage"));
    }
}

//! Decoder discovery and staging.
//!
//! The bundled mpg123 binary often lives somewhere it cannot be executed
//! from (a read-only deployment package). [`StagedDecoder`] copies it into a
//! writable directory once, marks it executable, and hands out that path
//! until [`DecoderProvider::release`] deletes it. [`SystemDecoder`] uses the
//! binary in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mp3wav_core::config::DecoderConfig;
use mp3wav_core::{Error, Result};
use tempfile::TempPath;
use tokio::sync::Mutex;

/// Executable name of the decoder.
pub const DECODER_NAME: &str = "mpg123";

/// Prefix of staged decoder copies.
const STAGED_PREFIX: &str = "mpg123-";

/// Source of an executable decoder path.
#[async_trait]
pub trait DecoderProvider: Send + Sync {
    /// Return a path the decoder can be executed from, staging it first if
    /// needed.
    async fn ensure_available(&self) -> Result<PathBuf>;

    /// Drop whatever [`ensure_available`](Self::ensure_available) set up.
    /// Calling this when nothing is staged is a no-op.
    async fn release(&self) -> Result<()>;

    /// Detach whatever is staged so it outlives the provider, returning its
    /// path. Providers that stage nothing return `None`.
    async fn persist(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Resolve the bundled decoder location.
///
/// A configured override wins if it exists, then `bin/mpg123` next to the
/// running executable, then `mpg123` on `PATH`. When nothing is found the
/// configured override (or the executable-relative default) is returned so
/// the eventual failure names a concrete path.
pub fn resolve_bundled(config: &DecoderConfig) -> PathBuf {
    let exe_relative = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("bin").join(DECODER_NAME)));

    if let Some(ref path) = config.bundled_path {
        if path.exists() {
            return path.clone();
        }
        tracing::debug!("Configured decoder {} does not exist", path.display());
    }

    if let Some(ref path) = exe_relative {
        if path.exists() {
            return path.clone();
        }
    }

    if let Ok(path) = which::which(DECODER_NAME) {
        tracing::debug!("Using {} from PATH", path.display());
        return path;
    }

    config
        .bundled_path
        .clone()
        .or(exe_relative)
        .unwrap_or_else(|| PathBuf::from("bin").join(DECODER_NAME))
}

/// Build the provider selected by `config.stage`.
pub fn provider_from_config(config: &DecoderConfig) -> Box<dyn DecoderProvider> {
    let bundled = resolve_bundled(config);
    if config.stage {
        Box::new(StagedDecoder::new(bundled, config.staging_dir()))
    } else {
        Box::new(SystemDecoder::new(bundled))
    }
}

/// Copies the bundled decoder into a writable directory on first use.
///
/// Staging is single-flight: concurrent callers wait on the same lock and all
/// receive the one staged path. Dropping the `StagedDecoder` deletes the
/// staged copy unless [`DecoderProvider::persist`] detached it first.
#[derive(Debug)]
pub struct StagedDecoder {
    bundled: PathBuf,
    staging_dir: PathBuf,
    staged: Mutex<Option<TempPath>>,
}

impl StagedDecoder {
    pub fn new(bundled: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            bundled: bundled.into(),
            staging_dir: staging_dir.into(),
            staged: Mutex::new(None),
        }
    }

    /// The bundled (source) decoder path.
    pub fn bundled(&self) -> &Path {
        &self.bundled
    }

    /// Currently staged path, if any.
    pub async fn staged_path(&self) -> Option<PathBuf> {
        self.staged.lock().await.as_ref().map(|p| p.to_path_buf())
    }

    async fn stage(&self) -> Result<TempPath> {
        let target = tempfile::Builder::new()
            .prefix(STAGED_PREFIX)
            .tempfile_in(&self.staging_dir)
            .map_err(|source| Error::StagingFailed {
                from: self.bundled.clone(),
                to: self.staging_dir.clone(),
                source,
            })?
            .into_temp_path();

        tracing::info!(
            "Staging decoder {} -> {}",
            self.bundled.display(),
            target.display()
        );

        tokio::fs::copy(&self.bundled, &target)
            .await
            .map_err(|source| Error::StagingFailed {
                from: self.bundled.clone(),
                to: target.to_path_buf(),
                source,
            })?;

        Ok(target)
    }
}

#[async_trait]
impl DecoderProvider for StagedDecoder {
    async fn ensure_available(&self) -> Result<PathBuf> {
        let mut staged = self.staged.lock().await;

        let path = match staged.as_ref() {
            Some(p) if p.exists() => p.to_path_buf(),
            _ => {
                if let Some(stale) = staged.take() {
                    tracing::warn!(
                        "Staged decoder {} disappeared; staging again",
                        stale.display()
                    );
                }
                let fresh = self.stage().await?;
                let path = fresh.to_path_buf();
                *staged = Some(fresh);
                path
            }
        };

        make_executable(&path).await?;
        Ok(path)
    }

    async fn release(&self) -> Result<()> {
        let Some(staged) = self.staged.lock().await.take() else {
            return Ok(());
        };

        if staged.exists() {
            tracing::info!("Removing staged decoder {}", staged.display());
            staged.close()?;
        }
        Ok(())
    }

    async fn persist(&self) -> Result<Option<PathBuf>> {
        let Some(staged) = self.staged.lock().await.take() else {
            return Ok(None);
        };

        let path = staged.keep().map_err(|e| Error::from(e.error))?;
        tracing::info!("Keeping staged decoder {}", path.display());
        Ok(Some(path))
    }
}

/// Runs the decoder from where it already is.
#[derive(Debug, Clone)]
pub struct SystemDecoder {
    path: PathBuf,
}

impl SystemDecoder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DecoderProvider for SystemDecoder {
    async fn ensure_available(&self) -> Result<PathBuf> {
        if !self.path.exists() {
            return Err(Error::decoder(
                DECODER_NAME,
                format!(
                    "{} not found; is it installed and in PATH?",
                    self.path.display()
                ),
            ));
        }
        Ok(self.path.clone())
    }

    async fn release(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))
        .await
        .map_err(|source| Error::PermissionFailed {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
async fn make_executable(path: &Path) -> Result<()> {
    tokio::fs::metadata(path)
        .await
        .map(|_| ())
        .map_err(|source| Error::PermissionFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Availability information for the decoder, as reported by `check-tools`.
#[derive(Debug, Clone)]
pub struct DecoderInfo {
    /// Resolved bundled path.
    pub path: PathBuf,
    /// Whether that path exists.
    pub available: bool,
    /// First line of `--version` output, if it ran.
    pub version: Option<String>,
}

/// Resolve the bundled decoder and try `--version` on it.
pub fn check_decoder(config: &DecoderConfig) -> DecoderInfo {
    let path = resolve_bundled(config);
    let available = path.exists();
    let version = if available {
        detect_version(&path)
    } else {
        None
    };

    DecoderInfo {
        path,
        available,
        version,
    }
}

/// Run `<decoder> --version` and return the first non-empty line of stdout
/// or stderr (mpg123 prints its banner to stderr).
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("--version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|s| s.to_string())
}

//! Output file handling for a single conversion.
//!
//! An [`OutputFile`] is either a caller-given path or a generated temp file.
//! A generated file is deleted if the handle is dropped without
//! [`OutputFile::keep`], so failed conversions do not leave empty files
//! behind.

use std::path::{Path, PathBuf};

use mp3wav_core::{Error, OutputTarget, Result};
use tempfile::TempPath;

#[derive(Debug)]
pub enum OutputFile {
    /// Caller-owned path; never deleted.
    Given(PathBuf),
    /// Generated temp file; deleted on drop unless kept.
    Generated(TempPath),
}

impl OutputFile {
    /// Resolve an [`OutputTarget`], creating the temp file for a postfix.
    pub fn create(target: OutputTarget<'_>, dir: &Path) -> Result<Self> {
        match target {
            OutputTarget::Path(path) => Ok(OutputFile::Given(path.to_path_buf())),
            OutputTarget::Generated(postfix) => {
                let temp = tempfile::Builder::new()
                    .prefix("tmp-")
                    .suffix(postfix)
                    .tempfile_in(dir)?
                    .into_temp_path();
                Ok(OutputFile::Generated(temp))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            OutputFile::Given(path) => path.as_path(),
            OutputFile::Generated(temp) => &**temp,
        }
    }

    /// Detach the file from this handle so it outlives it.
    pub fn keep(self) -> Result<PathBuf> {
        match self {
            OutputFile::Given(path) => Ok(path),
            OutputFile::Generated(temp) => temp.keep().map_err(|e| Error::from(e.error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn given_path_is_used_verbatim() {
        let target = OutputTarget::Path(Path::new("/data/out.wav"));
        let out = OutputFile::create(target, Path::new("/tmp")).unwrap();
        assert_eq!(out.path(), Path::new("/data/out.wav"));
        assert_eq!(out.keep().unwrap(), PathBuf::from("/data/out.wav"));
    }

    #[test]
    fn generated_file_has_postfix_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputFile::create(OutputTarget::Generated(".wav"), dir.path()).unwrap();

        let path = out.path().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert!(path.to_string_lossy().ends_with(".wav"));
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn generated_file_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputFile::create(OutputTarget::Generated(".wav"), dir.path()).unwrap();
        let path = out.path().to_path_buf();

        drop(out);
        assert!(!path.exists());
    }

    #[test]
    fn kept_file_survives() {
        let dir = tempfile::tempdir().unwrap();
        let out = OutputFile::create(OutputTarget::Generated(".wav"), dir.path()).unwrap();
        fs::write(out.path(), b"RIFF").unwrap();

        let path = out.keep().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"RIFF");
    }

    #[test]
    fn generated_in_missing_dir_fails() {
        let result = OutputFile::create(
            OutputTarget::Generated(".wav"),
            Path::new("/nonexistent/output/dir"),
        );
        assert_eq!(result.unwrap_err().kind(), mp3wav_core::ErrorKind::Io);
    }
}

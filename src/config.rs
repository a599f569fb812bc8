use anyhow::{Context, Result};
use std::path::Path;

pub use mp3wav_core::config::*;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mp3wav.toml",
        "~/.config/mp3wav/config.toml",
        "/etc/mp3wav/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.decoder.timeout_secs == Some(0) {
        anyhow::bail!("decoder.timeout_secs cannot be 0");
    }

    if let Some(ref dir) = config.decoder.staging_dir {
        if !dir.is_dir() {
            anyhow::bail!("decoder.staging_dir {:?} is not a directory", dir);
        }
    }

    if let Some(ref dir) = config.output.dir {
        if !dir.is_dir() {
            anyhow::bail!("output.dir {:?} is not a directory", dir);
        }
    }

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    Ok(())
}

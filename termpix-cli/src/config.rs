// ABOUTME: Configuration file loading, validation, and hierarchical merging for termpix
// ABOUTME: Supports TOML config files with XDG Base Directory specification compliance

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub compress: Option<bool>,
    #[serde(default, deserialize_with = "validate_quiet")]
    pub quiet: Option<u8>,
    #[serde(default, deserialize_with = "validate_pixels")]
    pub max_width: Option<u32>,
    #[serde(default, deserialize_with = "validate_pixels")]
    pub max_height: Option<u32>,
    #[serde(default)]
    pub upscale: Option<bool>,
    #[serde(default)]
    pub clear: Option<bool>,
}

impl Config {
    /// Load configuration from standard XDG-compliant locations
    pub fn load() -> Result<Self> {
        let paths = Self::get_config_paths();
        Self::load_from_paths(&paths)
    }

    /// Load configuration from file paths ordered lowest to highest precedence.
    /// Missing files are skipped; files that exist but fail to parse are errors.
    pub fn load_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                continue;
            }
            log::debug!("Loading config from {}", path.display());
            config = config.merge(Self::load_from_file(path)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Standard config file paths, lowest precedence first
    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. User config directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".config").join("termpix").join("config.toml"));
        }

        // 2. XDG config home
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home)
                .join("termpix")
                .join("config.toml");
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        // 3. Project-specific config (highest precedence)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("termpix.toml"));
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            compress: other.compress.or(self.compress),
            quiet: other.quiet.or(self.quiet),
            max_width: other.max_width.or(self.max_width),
            max_height: other.max_height.or(self.max_height),
            upscale: other.upscale.or(self.upscale),
            clear: other.clear.or(self.clear),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.quiet {
            if level > 2 {
                return Err(anyhow!("Invalid quiet level {}. Must be 0, 1, or 2", level));
            }
        }
        if self.max_width == Some(0) || self.max_height == Some(0) {
            return Err(anyhow!("max_width and max_height must be at least 1"));
        }
        Ok(())
    }
}

// Custom deserializer for kitty response suppression levels
fn validate_quiet<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<u8> = Option::deserialize(deserializer)?;
    match value {
        Some(level) if level > 2 => Err(D::Error::custom(format!(
            "Invalid quiet level {}. Must be 0, 1, or 2",
            level
        ))),
        _ => Ok(value),
    }
}

// Custom deserializer for pixel caps
fn validate_pixels<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<u32> = Option::deserialize(deserializer)?;
    if value == Some(0) {
        return Err(D::Error::custom(
            "Pixel limits must be at least 1".to_string(),
        ));
    }
    Ok(value)
}

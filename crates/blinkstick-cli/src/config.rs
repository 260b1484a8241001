//! Configuration management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound for gradient steps per morph.
pub const MAX_STEPS: u32 = 1000;

/// Defaults applied when the command line leaves a setting out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Serial of the device to target when neither `--serial` nor `--all`
    /// is given
    #[serde(default)]
    pub serial: Option<String>,

    /// Brightness limit in percent (0-100)
    #[serde(default)]
    pub limit: Option<u8>,

    /// Invert colours for common anode LEDs
    #[serde(default)]
    pub inverse: bool,

    /// Animation timing
    #[serde(default)]
    pub effects: EffectsConfig,
}

/// Animation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectsConfig {
    /// Number of blinks or pulses
    #[serde(default = "default_repeats")]
    pub repeats: u32,

    /// Blink on/off time in milliseconds
    #[serde(default = "default_delay")]
    pub delay: u64,

    /// Morph and pulse duration in milliseconds
    #[serde(default = "default_duration")]
    pub duration: u64,

    /// Gradient steps per morph
    #[serde(default = "default_steps")]
    pub steps: u32,
}

impl EffectsConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration)
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            repeats: default_repeats(),
            delay: default_delay(),
            duration: default_duration(),
            steps: default_steps(),
        }
    }
}

fn default_repeats() -> u32 {
    1
}

fn default_delay() -> u64 {
    500
}

fn default_duration() -> u64 {
    1000
}

fn default_steps() -> u32 {
    50
}

impl Config {
    /// Default location: `<config dir>/blinkstick/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blinkstick").join("config.toml"))
    }

    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration {}", path.display()))?;
        if let Some(limit) = config.limit {
            anyhow::ensure!(limit <= 100, "limit must be between 0 and 100, got {limit}");
        }
        let steps = config.effects.steps;
        anyhow::ensure!(
            steps <= MAX_STEPS,
            "effects.steps must be at most {MAX_STEPS}, got {steps}"
        );
        Ok(config)
    }

    /// Loads the explicitly given file, or the default file when it exists,
    /// or falls back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!("Loading configuration from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.serial, None);
        assert_eq!(config.limit, None);
        assert!(!config.inverse);
        assert_eq!(config.effects.repeats, 1);
        assert_eq!(config.effects.delay(), Duration::from_millis(500));
        assert_eq!(config.effects.duration(), Duration::from_secs(1));
        assert_eq!(config.effects.steps, 50);
    }

    #[test]
    fn test_load_full() {
        let file = write_config(
            r#"
serial = "BS000001-1.0"
limit = 40
inverse = true

[effects]
repeats = 3
delay = 100
duration = 2000
steps = 20
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.serial.as_deref(), Some("BS000001-1.0"));
        assert_eq!(config.limit, Some(40));
        assert!(config.inverse);
        assert_eq!(
            config.effects,
            EffectsConfig {
                repeats: 3,
                delay: 100,
                duration: 2000,
                steps: 20,
            }
        );
    }

    #[test]
    fn test_load_partial_uses_defaults() {
        let file = write_config("[effects]\nsteps = 10\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.serial, None);
        assert_eq!(config.effects.steps, 10);
        assert_eq!(config.effects.repeats, 1);
        assert_eq!(config.effects.delay, 500);
    }

    #[test]
    fn test_load_rejects_bad_limit() {
        let file = write_config("limit = 150\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_too_many_steps() {
        let file = write_config("[effects]\nsteps = 4294967295\n");
        assert!(Config::load(file.path()).is_err());
        let file = write_config("[effects]\nsteps = 1000\n");
        assert_eq!(Config::load(file.path()).unwrap().effects.steps, 1000);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let file = write_config("serial = [\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::resolve(Some(&dir.path().join("missing.toml"))).is_err());
    }
}

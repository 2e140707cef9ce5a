//! Configuration types for the reminder engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for the reminder engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutineConfig {
    /// Tick cadence settings.
    pub scheduler: SchedulerConfig,
    /// Alert chime settings.
    pub tone: ToneConfig,
}

/// Tick cadence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between evaluation passes. The first pass runs immediately
    /// at start-up so a task scheduled for the launch minute still fires.
    pub eval_interval_secs: u64,
    /// Seconds between display clock events (presentation only).
    pub display_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            eval_interval_secs: 60,
            display_interval_secs: 1,
        }
    }
}

/// Waveform used for the alert chime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Pure sine tone.
    #[default]
    Sine,
    /// Square wave.
    Square,
    /// Triangle wave.
    Triangle,
}

/// Alert chime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    /// Tone frequency in Hz.
    pub frequency_hz: f32,
    /// Oscillator waveform.
    pub waveform: Waveform,
    /// Linear gain in \[0, 1\]. Kept low; this is a nudge, not an alarm.
    pub gain: f32,
    /// Tone duration in milliseconds.
    pub duration_ms: u64,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Output device name (None = system default).
    pub output_device: Option<String>,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 800.0,
            waveform: Waveform::Sine,
            gain: 0.3,
            duration_ms: 1000,
            sample_rate: 24_000,
            output_device: None,
        }
    }
}

impl RoutineConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::RoutineError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot
    /// be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RoutineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default path, using defaults when no file exists.
    pub fn load() -> Self {
        let path = Self::default_config_path();
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(crate::error::RoutineError::Io(e))
                if e.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(e) => {
                tracing::warn!("cannot load config from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Returns the default config file path: `~/.config/routine/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("routine").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("routine")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/routine-config/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RoutineConfig::default();
        assert_eq!(config.scheduler.eval_interval_secs, 60);
        assert_eq!(config.scheduler.display_interval_secs, 1);
        assert!((config.tone.frequency_hz - 800.0).abs() < f32::EPSILON);
        assert_eq!(config.tone.waveform, Waveform::Sine);
        assert!(config.tone.gain > 0.0 && config.tone.gain <= 1.0);
        assert_eq!(config.tone.duration_ms, 1000);
        assert!(config.tone.sample_rate > 0);
        assert!(config.tone.output_device.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = RoutineConfig::default();
        config.scheduler.eval_interval_secs = 5;
        config.tone.frequency_hz = 440.0;
        config.tone.waveform = Waveform::Triangle;

        config.save_to_file(&path).unwrap();
        assert!(path.exists());

        let loaded = RoutineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.scheduler.eval_interval_secs, 5);
        assert!((loaded.tone.frequency_hz - 440.0).abs() < f32::EPSILON);
        assert_eq!(loaded.tone.waveform, Waveform::Triangle);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = RoutineConfig::from_file(std::path::Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(RoutineConfig::from_file(&path).is_err());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tone]\nfrequency_hz = 600.0\n").unwrap();

        let loaded = RoutineConfig::from_file(&path).unwrap();
        assert!((loaded.tone.frequency_hz - 600.0).abs() < f32::EPSILON);
        assert_eq!(loaded.tone.duration_ms, 1000);
        assert_eq!(loaded.scheduler.eval_interval_secs, 60);
    }
}

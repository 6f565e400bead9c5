//! Configuration types.
//!
//! Configuration lives in `motion.toml` under the platform config directory.
//! Every field has a default, so a missing file or a partial file is valid.
//! The preloader's delays and the menu sequences are fixed and not part of
//! the configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tween::MAX_SECS;

/// Runtime configuration loaded from `motion.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Preloader presentation
    #[serde(default)]
    pub preloader: PreloaderConfig,

    /// Content reveal after the preloader exits
    #[serde(default)]
    pub host: HostConfig,

    /// Smooth-scroll engine options
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// Custom cursor
    #[serde(default)]
    pub cursor: CursorConfig,
}

impl MotionConfig {
    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot drive an animation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        seconds("host.content_fade_secs", self.host.content_fade_secs)?;
        seconds("scroll.duration", self.scroll.duration)?;
        if self.scroll.duration == 0.0 && self.scroll.lerp == 0.0 {
            return Err(ConfigError::Invalid {
                field: "scroll.duration",
                reason: "must be positive when lerp is 0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.scroll.lerp) {
            return Err(ConfigError::Invalid {
                field: "scroll.lerp",
                reason: format!("{} is outside [0, 1]", self.scroll.lerp),
            });
        }
        finite("scroll.wheel_multiplier", self.scroll.wheel_multiplier)?;
        finite("scroll.touch_multiplier", self.scroll.touch_multiplier)?;
        finite("cursor.size_px", self.cursor.size_px)?;
        if self.cursor.size_px < 0.0 {
            return Err(ConfigError::Invalid {
                field: "cursor.size_px",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path().ok_or(ConfigError::NoConfigDir)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }
}

/// Preloader presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreloaderConfig {
    /// Render and animate the progress bar under the counter.
    #[serde(default = "default_true")]
    pub show_progress_bar: bool,

    /// Corner label text.
    #[serde(default = "default_label")]
    pub label: String,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            show_progress_bar: true,
            label: default_label(),
        }
    }
}

/// Content reveal timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Delay between the preloader's completion signal and its removal.
    #[serde(default = "default_step_ms")]
    pub hide_delay_ms: u64,

    /// Delay between preloader removal and content reveal.
    #[serde(default = "default_step_ms")]
    pub reveal_delay_ms: u64,

    /// Content fade-in length in seconds.
    #[serde(default = "default_content_fade")]
    pub content_fade_secs: f32,
}

impl HostConfig {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            hide_delay_ms: default_step_ms(),
            reveal_delay_ms: default_step_ms(),
            content_fade_secs: default_content_fade(),
        }
    }
}

/// Options handed to the smooth-scroll engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Interpolation factor per frame.
    pub lerp: f32,
    /// Scroll animation length in seconds.
    pub duration: f32,
    pub smooth_wheel: bool,
    pub wheel_multiplier: f32,
    pub touch_multiplier: f32,
    pub infinite: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            lerp: 0.1,
            duration: 1.2,
            smooth_wheel: true,
            wheel_multiplier: 1.0,
            touch_multiplier: 1.0,
            infinite: false,
        }
    }
}

/// Custom cursor options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub enabled: bool,
    /// Diameter of the resting cursor ring in pixels.
    pub size_px: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size_px: 32.0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_label() -> String {
    "Initializing".to_string()
}

fn default_step_ms() -> u64 {
    100
}

fn default_content_fade() -> f32 {
    1.2
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{} is not a number", value),
        })
    }
}

fn seconds(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if !(0.0..=MAX_SECS).contains(&value) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{} is outside [0, {}] seconds", value, MAX_SECS),
        });
    }
    Ok(())
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("folio"))
}

/// Get the path to motion.toml.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("motion.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MotionConfig::default();
        assert!(config.preloader.show_progress_bar);
        assert_eq!(config.preloader.label, "Initializing");
        assert_eq!(config.host.hide_delay(), Duration::from_millis(100));
        assert_eq!(config.scroll.lerp, 0.1);
        assert_eq!(config.cursor.size_px, 32.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[preloader]\nshow_progress_bar = false\n\n[scroll]\nlerp = 0.2").unwrap();

        let config = MotionConfig::load_from(file.path()).unwrap();
        assert!(!config.preloader.show_progress_bar);
        assert_eq!(config.preloader.label, "Initializing");
        assert_eq!(config.scroll.lerp, 0.2);
        assert_eq!(config.scroll.duration, 1.2);
        assert_eq!(config.host, HostConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = MotionConfig::load_from(file.path()).unwrap();
        assert_eq!(config, MotionConfig::default());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[host]\nhide_delay_ms = \"soon\"").unwrap();

        let err = MotionConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        for (text, field) in [
            ("[host]\ncontent_fade_secs = -1.0", "host.content_fade_secs"),
            ("[host]\ncontent_fade_secs = nan", "host.content_fade_secs"),
            ("[host]\ncontent_fade_secs = 1e30", "host.content_fade_secs"),
            ("[scroll]\nlerp = 1.5", "scroll.lerp"),
            ("[scroll]\nlerp = 0.0\nduration = 0.0", "scroll.duration"),
            ("[scroll]\nwheel_multiplier = inf", "scroll.wheel_multiplier"),
            ("[cursor]\nsize_px = -4.0", "cursor.size_px"),
        ] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "{}", text).unwrap();
            match MotionConfig::load_from(file.path()) {
                Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field, "{}", text),
                other => panic!("{}: unexpected {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MotionConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_config_path_ends_with_file_name() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("folio/motion.toml"));
        }
    }
}

//! Game settings
//!
//! Supplied once at startup and never changed by the simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// Immutable session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Play field ===
    /// Field width in pixels
    pub width: f64,
    /// Field height in pixels
    pub height: f64,

    // === Timing ===
    /// Target frame rate; the tick duration is derived from it
    pub fps: u32,

    // === Session ===
    /// RNG seed (same seed reproduces the same session)
    pub seed: u64,
    /// Fighters available before the game is lost
    pub max_lives: u32,
    /// Log gameplay events at info level instead of debug
    pub debug: bool,

    // === Audio (consumed by the host) ===
    pub main_audio_enabled: bool,
    pub sound_enabled: bool,
    pub music_enabled: bool,

    // === Spawning ===
    pub first_ufo_ms: i64,
    pub ufo_spawn_base_ms: i64,
    pub ufo_spawn_jitter_ms: i64,
    pub respawn_delay_ms: i64,

    // === Fighter control ===
    pub control_reaction_ms: i64,
    /// Pixels per second while a direction is held
    pub control_speed: f64,
    pub control_start_offset: f64,
    pub control_forward_range: f64,
    pub control_backward_range: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,

            fps: 60,

            seed: 62439,
            max_lives: 5,
            debug: true,

            // Audio
            main_audio_enabled: false,
            sound_enabled: true,
            music_enabled: true,

            first_ufo_ms: FIRST_UFO_TICK_MS,
            ufo_spawn_base_ms: UFO_SPAWN_BASE_MS,
            ufo_spawn_jitter_ms: UFO_SPAWN_JITTER_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,

            control_reaction_ms: CONTROL_REACTION_MS,
            control_speed: CONTROL_SPEED,
            control_start_offset: CONTROL_START_OFFSET,
            control_forward_range: CONTROL_FORWARD_RANGE,
            control_backward_range: CONTROL_BACKWARD_RANGE,
        }
    }
}

impl Settings {
    /// Default settings with a different seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Tick duration in milliseconds (60 fps -> 17 ms, 33 fps -> 30 ms)
    pub fn tick_ms(&self) -> i64 {
        (1000.0 / self.fps.max(1) as f64).round() as i64
    }

    /// Fighter displacement for one held tick
    pub fn control_speed_per_tick(&self) -> f64 {
        self.control_speed * self.tick_ms() as f64 / 1000.0
    }

    /// Effective sound effects switch
    pub fn effective_sound(&self) -> bool {
        self.main_audio_enabled && self.sound_enabled
    }

    /// Effective background music switch
    pub fn effective_music(&self) -> bool {
        self.main_audio_enabled && self.music_enabled
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(SimError::InvalidSettings(format!(
                "field must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(SimError::InvalidSettings("fps must be non-zero".into()));
        }
        if self.max_lives == 0 {
            return Err(SimError::InvalidSettings("max_lives must be non-zero".into()));
        }
        if self.ufo_spawn_base_ms < 0 || self.ufo_spawn_jitter_ms < 0 || self.respawn_delay_ms < 0 {
            return Err(SimError::InvalidSettings("delays must not be negative".into()));
        }
        if self.control_reaction_ms < 0 || self.control_speed < 0.0 {
            return Err(SimError::InvalidSettings(
                "control reaction and speed must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tick_ms(), 17);
    }

    #[test]
    fn test_tick_ms_from_fps() {
        let settings = Settings {
            fps: 33,
            ..Settings::default()
        };
        assert_eq!(settings.tick_ms(), 30);
        assert!((settings.control_speed_per_tick() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json_str(r#"{ "seed": 7, "width": 800.0 }"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.width, 800.0);
        assert_eq!(settings.height, 1200.0);
        assert_eq!(settings.max_lives, 5);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = Settings::from_json_str(r#"{ "fps": 0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidSettings(_)));

        let err = Settings::from_json_str(r#"{ "width": -1.0 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidSettings(_)));

        let err = Settings::from_json_str("not json").unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }

    #[test]
    fn test_audio_switches() {
        let mut settings = Settings::default();
        assert!(!settings.effective_sound());
        settings.main_audio_enabled = true;
        assert!(settings.effective_sound());
        assert!(settings.effective_music());
    }
}

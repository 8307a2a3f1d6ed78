//! Engine, HUD and model-rendering settings
//!
//! Defaults reproduce the stock game tuning; every struct is
//! `#[serde(default)]` so a config file only needs the keys it changes.

use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use std::time::Duration;

use super::{Config, ConfigError};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Asset roots searched in order; the first is the per-user base path
    pub search_paths: Vec<PathBuf>,
    /// HUD settings
    pub hud: HudConfig,
    /// 3D model rendering settings
    pub object: ObjectRenderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            search_paths: vec![PathBuf::from(".")],
            hud: HudConfig::default(),
            object: ObjectRenderConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_paths.is_empty() {
            return Err(ConfigError::Invalid("at least one search path is required".to_string()));
        }
        self.hud.validate()?;
        self.object.validate()
    }
}

/// Radar zoom limits, in world units per radar pixel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarResolutionConfig {
    /// Resolution on a fresh HUD
    pub default: f32,
    /// Most zoomed-in value
    pub min: f32,
    /// Most zoomed-out value
    pub max: f32,
    /// Change per zoom step
    pub step: f32,
}

impl Default for RadarResolutionConfig {
    fn default() -> Self {
        Self {
            default: 40.0,
            min: 10.0,
            max: 100.0,
            step: 10.0,
        }
    }
}

impl RadarResolutionConfig {
    /// Clamp a resolution into the configured range
    pub fn clamp(&self, resolution: f32) -> f32 {
        resolution.clamp(self.min, self.max)
    }
}

/// HUD configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// GUI descriptor file, relative to the asset roots
    pub gui_data: PathBuf,
    /// Directory holding `<gfx>.png`, `<gfx>_pilot.png`, `<gfx>_planet.png`
    pub gui_gfx_dir: PathBuf,
    /// Messages kept on screen at once
    pub message_capacity: usize,
    /// Lifetime of a message in milliseconds
    pub message_timeout_ms: u64,
    /// Bottom-left anchor of the message log
    pub message_anchor: [f32; 2],
    /// Radar zoom limits
    pub radar: RadarResolutionConfig,
    /// Size of a ship's target-panel graphic
    pub ship_target_size: [f32; 2],
    /// Fraction of a ship sprite the target marker hugs
    pub pilot_marker_scale: f32,
    /// Fastest relative speed at which boarding or landing is allowed
    pub max_docking_speed: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            gui_data: PathBuf::from("dat/gui.xml"),
            gui_gfx_dir: PathBuf::from("gfx/gui"),
            message_capacity: 5,
            message_timeout_ms: 3000,
            message_anchor: [20.0, 30.0],
            radar: RadarResolutionConfig::default(),
            ship_target_size: [128.0, 96.0],
            pilot_marker_scale: 0.8,
            max_docking_speed: 25.0,
        }
    }
}

impl HudConfig {
    /// Message lifetime as a duration
    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a zero message capacity or radar limits
    /// that are empty, not positive or exclude the default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message_capacity == 0 {
            return Err(ConfigError::Invalid("message_capacity must be at least 1".to_string()));
        }
        let radar = &self.radar;
        if radar.min <= 0.0 || radar.min > radar.max {
            return Err(ConfigError::Invalid(format!(
                "radar resolution range [{}, {}] is empty or not positive",
                radar.min, radar.max
            )));
        }
        if radar.step <= 0.0 {
            return Err(ConfigError::Invalid("radar step must be positive".to_string()));
        }
        if !(radar.min..=radar.max).contains(&radar.default) {
            return Err(ConfigError::Invalid(format!(
                "default radar resolution {} outside [{}, {}]",
                radar.default, radar.min, radar.max
            )));
        }
        Ok(())
    }
}

/// 3D model rendering configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectRenderConfig {
    /// Model-units to world-units scale, multiplied by the camera zoom
    pub scale: f32,
}

impl Default for ObjectRenderConfig {
    fn default() -> Self {
        Self { scale: 1.0 / 20.0 }
    }
}

impl ObjectRenderConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] unless the scale is finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale > 0.0 && self.scale.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!("object scale {} must be positive", self.scale)))
        }
    }
}

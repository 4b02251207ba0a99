//! Picking scene settings.
//!
//! Settings can be built in code with the fluent setters or read from TOML:
//!
//! ```toml
//! highlight_mode = "last_known_hit"
//! face_side = "front"
//! max_distance = 50.0
//!
//! [highlight_color]
//! r = 1.0
//! g = 0.8
//! b = 0.0
//! a = 1.0
//! ```
//!
//! Missing keys fall back to [`PickingConfig::default`].

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::color::Color;
use crate::picking::FaceSide;

/// Errors that can occur when loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// When the picked triangle outline is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
    /// Outline only while the cursor is over a triangle this frame.
    #[default]
    CurrentHit,
    /// Keep outlining the most recent hit after the cursor moves off.
    LastKnownHit,
}

/// Settings for [`PickingScene`](crate::PickingScene).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub highlight_mode: HighlightMode,
    pub face_side: FaceSide,
    /// Farthest pickable distance along the ray. `None` means unlimited.
    pub max_distance: Option<f32>,
    /// World point the ray-origin marker line runs to.
    pub marker_target: Vec3,
    /// Outline color of the picked triangle.
    pub highlight_color: Color,
    /// Color of the ray-origin marker line.
    pub marker_color: Color,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            highlight_mode: HighlightMode::CurrentHit,
            face_side: FaceSide::Double,
            max_distance: None,
            marker_target: Vec3::ZERO,
            highlight_color: Color::RED,
            marker_color: Color::RED,
        }
    }
}

impl PickingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight_color(mut self, color: Color) -> Self {
        self.highlight_color = color;
        self
    }

    pub fn marker_color(mut self, color: Color) -> Self {
        self.marker_color = color;
        self
    }

    pub fn marker_target(mut self, target: Vec3) -> Self {
        self.marker_target = target;
        self
    }

    pub fn highlight_mode(mut self, mode: HighlightMode) -> Self {
        self.highlight_mode = mode;
        self
    }

    pub fn face_side(mut self, side: FaceSide) -> Self {
        self.face_side = side;
        self
    }

    pub fn max_distance(mut self, distance: f32) -> Self {
        self.max_distance = Some(distance);
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "loaded picking config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PickingConfig::from_toml_str(
            r#"
            highlight_mode = "last_known_hit"
            face_side = "front"
            "#,
        )
        .unwrap();

        assert_eq!(config.highlight_mode, HighlightMode::LastKnownHit);
        assert_eq!(config.face_side, FaceSide::Front);
        assert_eq!(config.highlight_color, Color::RED);
        assert_eq!(config.max_distance, None);
    }

    #[test]
    fn toml_round_trip() {
        let config = PickingConfig::new()
            .highlight_color(Color::YELLOW)
            .marker_target(Vec3::new(0.0, 1.0, 0.0))
            .max_distance(42.0);

        let text = config.to_toml_string().unwrap();
        assert_eq!(PickingConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            PickingConfig::from_toml_str("highlight_mode = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            PickingConfig::load("/definitely/not/here/picking.toml"),
            Err(ConfigError::Io(..))
        ));
    }
}

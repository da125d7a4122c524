//! Shared configuration for the deformation editor
//!
//! This crate provides the single source of truth for brush size, blend
//! parameters and the region tints used when the mesh is rendered, so the
//! engine and any host application agree on the same values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default brush radius in world units
pub const DEFAULT_BRUSH_RADIUS: f32 = 0.02;

/// Default epsilon added to the blend weight denominator
pub const DEFAULT_WEIGHT_EPSILON: f32 = 1e-6;

/// Default vertex color (RGBA) for vertices outside any region
pub const DEFAULT_BASE_COLOR: [u8; 4] = [102, 102, 102, 255];

/// Default tint (RGBA) for fixed-region vertices
pub const DEFAULT_FIXED_COLOR: [u8; 4] = [255, 0, 0, 255];

/// Default tint (RGBA) for deformable-region vertices
pub const DEFAULT_DEFORMABLE_COLOR: [u8; 4] = [0, 0, 255, 255];

/// Environment variable overriding the brush radius
pub const BRUSH_RADIUS_ENV: &str = "DEFORM_BRUSH_RADIUS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Colors used to tint vertices by region membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionColors {
    /// Color for vertices in neither region
    pub base: [u8; 4],
    /// Tint for the fixed (rigid) region
    pub fixed: [u8; 4],
    /// Tint for the deformable region
    pub deformable: [u8; 4],
}

impl Default for RegionColors {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_COLOR,
            fixed: DEFAULT_FIXED_COLOR,
            deformable: DEFAULT_DEFORMABLE_COLOR,
        }
    }
}

/// Editor configuration shared by the engine and its host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Radius around a pick point inside which vertices are painted
    pub brush_radius: f32,
    /// Guard added to the blend weight denominator
    pub weight_epsilon: f32,
    /// Region tints
    pub colors: RegionColors,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            brush_radius: DEFAULT_BRUSH_RADIUS,
            weight_epsilon: DEFAULT_WEIGHT_EPSILON,
            colors: RegionColors::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Default config with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(BRUSH_RADIUS_ENV) {
            config.apply_brush_radius_override(&value);
        }
        config
    }

    /// Apply a textual brush radius override, ignoring unparsable values
    pub fn apply_brush_radius_override(&mut self, value: &str) {
        match value.trim().parse::<f32>() {
            Ok(radius) if radius.is_finite() => self.set_brush_radius(radius),
            _ => tracing::warn!("Ignoring invalid {}={:?}", BRUSH_RADIUS_ENV, value),
        }
    }

    /// Set the brush radius, clamping negative values to zero
    pub fn set_brush_radius(&mut self, radius: f32) {
        self.brush_radius = radius.max(0.0);
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if !self.brush_radius.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "brush_radius must be finite, got {}",
                self.brush_radius
            )));
        }
        if !(self.weight_epsilon.is_finite() && self.weight_epsilon > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "weight_epsilon must be positive, got {}",
                self.weight_epsilon
            )));
        }
        self.set_brush_radius(self.brush_radius);
        Ok(self)
    }
}

//! Renderer and ride settings
//!
//! Everything tunable lives here and can be loaded from a JSON file. Missing
//! fields fall back to the defaults, so a file only needs the values it
//! changes.

use std::path::Path;

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::renderer::{ScreenLayout, SpriteId, SweepSettings};
use crate::sim::{ControllerSettings, SpawnRule, TerrainField};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Farthest distance the terrain sweep samples
    pub fn far_clip(&self) -> f64 {
        match self {
            QualityPreset::Low => 80.0,
            QualityPreset::Medium => 120.0,
            QualityPreset::High => 160.0,
        }
    }

    /// Sweep step divisor K (`d += d / K`); higher is finer
    pub fn step_divisor(&self) -> f64 {
        match self {
            QualityPreset::Low => 100.0,
            QualityPreset::Medium => 150.0,
            QualityPreset::High => 200.0,
        }
    }
}

/// Opaque sprite handles the host registers with its renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSet {
    pub road: SpriteId,
    pub backdrop: SpriteId,
    pub tree: SpriteId,
    pub car: SpriteId,
    pub player: SpriteId,
    pub warning: SpriteId,
}

impl Default for SpriteSet {
    fn default() -> Self {
        Self {
            road: SpriteId(0),
            backdrop: SpriteId(1),
            tree: SpriteId(2),
            car: SpriteId(3),
            player: SpriteId(4),
            warning: SpriteId(5),
        }
    }
}

/// The rider's own vehicle, drawn in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSprite {
    pub origin: IVec2,
    pub size: IVec2,
    /// Vertical bob in pixels
    pub bob_amplitude: f64,
}

impl Default for PlayerSprite {
    fn default() -> Self {
        Self {
            origin: IVec2::new(120, 120),
            size: IVec2::new(80, 50),
            bob_amplitude: 1.0,
        }
    }
}

/// Distant scenery that pans with steering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backdrop {
    pub origin: DVec2,
    /// Horizontal pixels per radian of heading
    pub parallax: f64,
    pub size: IVec2,
}

impl Default for Backdrop {
    fn default() -> Self {
        Self {
            origin: DVec2::new(-65.0, 0.0),
            parallax: 82.0,
            size: IVec2::new(450, 180),
        }
    }
}

/// Slowdown applied when the rider leaves the road
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffTrackSettings {
    /// How far ahead the road centre is sampled
    pub lookahead: f64,
    /// Camera offset from the road centre when riding in lane
    pub center_bias: f64,
    /// Allowed lateral deviation before the penalty applies
    pub threshold: f64,
    /// Penalty only applies above this velocity
    pub min_velocity: f64,
    pub indicator_origin: IVec2,
    pub indicator_size: IVec2,
}

impl Default for OffTrackSettings {
    fn default() -> Self {
        Self {
            lookahead: 2.0,
            center_bias: 100.0,
            threshold: 280.0,
            min_velocity: 5.0,
            indicator_origin: IVec2::new(297, 167),
            indicator_size: IVec2::new(6, 6),
        }
    }
}

/// Settings load failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Complete configuration for a ride
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Draw distance and sweep density
    pub quality: QualityPreset,
    pub layout: ScreenLayout,
    pub sweep: SweepSettings,
    pub terrain: TerrainField,
    /// Depth test slack in world units
    pub depth_tolerance: f64,
    /// Entities closer than this are recycled
    pub recycle_margin: f64,
    /// Frame delta clamp (seconds)
    pub delta_min: f64,
    pub delta_max: f64,
    /// RNG seed for entity placement
    pub seed: u64,
    /// Camera starting lateral offset
    pub start_lateral: f64,
    pub props: SpawnRule,
    pub vehicles: SpawnRule,
    pub controller: ControllerSettings,
    pub off_track: OffTrackSettings,
    pub sprites: SpriteSet,
    pub player: PlayerSprite,
    pub backdrop: Backdrop,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            layout: ScreenLayout::default(),
            sweep: SweepSettings::default(),
            terrain: TerrainField::hills(),
            depth_tolerance: 10.0,
            recycle_margin: 1.0,
            delta_min: 1.0e-5,
            delta_max: 0.1,
            seed: 0x5eed,
            start_lateral: 300.0,
            props: SpawnRule::trees(),
            vehicles: SpawnRule::cars(),
            controller: ControllerSettings::default(),
            off_track: OffTrackSettings::default(),
            sprites: SpriteSet::default(),
            player: PlayerSprite::default(),
            backdrop: Backdrop::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::from_path(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Check values the frame loop relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: &str| Err(SettingsError::Invalid(msg.to_string()));
        if self.layout.width == 0 || self.layout.height == 0 {
            return invalid("screen must be at least one pixel in each direction");
        }
        if !(self.sweep.near_clip > 0.0) || self.sweep.near_clip >= self.quality.far_clip() {
            return invalid("near clip must be positive and closer than the far clip");
        }
        if self.sweep.texture_rows == 0 {
            return invalid("road texture must have at least one row");
        }
        if !(self.depth_tolerance >= 0.0) || !(self.recycle_margin >= 0.0) {
            return invalid("depth tolerance and recycle margin must be non-negative");
        }
        if !(self.delta_min > 0.0) || !(self.delta_max >= self.delta_min) {
            return invalid("delta clamp must be a positive, non-empty range");
        }
        for rule in [&self.props, &self.vehicles] {
            rule.validate().map_err(SettingsError::Invalid)?;
            if rule.min_gap() <= self.recycle_margin {
                return Err(SettingsError::Invalid(format!(
                    "{:?} gap must exceed the recycle margin",
                    rule.kind
                )));
            }
        }
        Ok(())
    }
}

//! Perspective projection shared by the terrain sweep and the sprite compositor

use serde::{Deserialize, Serialize};

use crate::consts::SCALE_EPSILON;

/// Screen geometry and perspective constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenLayout {
    /// Screen width in pixels
    pub width: u32,
    /// Screen height in pixels (one depth entry per row)
    pub height: u32,
    /// Row the road converges to at infinite distance
    pub baseline_row: f64,
    /// Vertical field-of-view factor (camera height above the road)
    pub fov: f64,
    /// Screen column of the camera's line of sight
    pub center_column: f64,
    /// Half of the road width in world units
    pub half_road_width: f64,
    /// Row around which steering shears the frame
    pub reference_row: f64,
}

impl Default for ScreenLayout {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            baseline_row: 60.0,
            fov: 160.0,
            center_column: 160.0,
            half_road_width: 160.0,
            reference_row: 150.0,
        }
    }
}

/// Screen placement of a world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub column: f64,
    pub row: i32,
    pub scale: f64,
}

impl ScreenLayout {
    /// Perspective scale for a longitudinal distance. Never infinite or negative.
    #[inline]
    pub fn scale(distance: f64) -> f64 {
        1.0 / distance.max(SCALE_EPSILON)
    }

    /// Screen row for a point `distance` ahead and `elevation_delta` off the camera height
    #[inline]
    pub fn row(&self, distance: f64, elevation_delta: f64) -> i32 {
        let scale = Self::scale(distance);
        (self.baseline_row + self.fov * scale + elevation_delta * scale).floor() as i32
    }

    /// Map a world point relative to the camera onto the screen.
    ///
    /// The heading term shears the frame horizontally in proportion to the
    /// distance from `reference_row`, which reads as camera yaw without
    /// reprojecting anything.
    pub fn project(
        &self,
        distance: f64,
        lateral: f64,
        elevation_delta: f64,
        heading: f64,
    ) -> Projected {
        let scale = Self::scale(distance);
        let row = self.row(distance, elevation_delta);
        let column = self.center_column - (self.half_road_width - lateral) * scale
            + heading * (row as f64 - self.reference_row);
        Projected { column, row, scale }
    }

    /// Whether `row` is a valid screen row
    #[inline]
    pub fn contains_row(&self, row: i32) -> bool {
        row >= 0 && (row as i64) < self.height as i64
    }
}

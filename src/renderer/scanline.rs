//! Adaptive-step terrain sweep
//!
//! Walks forward from the near clip with a geometric step (`d += d / K`),
//! so sampling is dense near the camera, where one world unit spans many
//! rows, and sparse near the horizon. Each accepted sample is the first one
//! to land on a row strictly above the previously drawn row. That gives one
//! terrain row per screen row without gaps or repeats.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::depth::DepthBuffer;
use super::projection::ScreenLayout;
use super::surface::{Renderer, Rgb, SpriteId, SpriteRef};
use crate::consts::SCALE_EPSILON;
use crate::sim::{CameraState, TerrainField};

/// Terrain sweep tuning that does not depend on the quality preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// First sampled distance
    pub near_clip: f64,
    /// Road texture width in world units (slice width = road_width * scale)
    pub road_width: f64,
    /// Texture rows advanced per world unit
    pub band_frequency: f64,
    /// Rows in the road texture
    pub texture_rows: u32,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            near_clip: 1.0,
            road_width: 500.0,
            band_frequency: 10.0,
            texture_rows: 360,
        }
    }
}

/// Summary of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SweepStats {
    /// Distance samples taken
    pub steps: u32,
    /// Screen rows drawn (and written to the depth buffer)
    pub rows_written: u32,
    /// Nearest (lowest on screen) row drawn
    pub first_row: Option<i32>,
    /// Farthest (highest on screen) row drawn
    pub last_row: Option<i32>,
}

/// Converts longitudinal distance into terrain rows
#[derive(Debug, Clone)]
pub struct ScanlineProjector {
    pub layout: ScreenLayout,
    pub sweep: SweepSettings,
    pub far_clip: f64,
    pub step_divisor: f64,
    pub road: SpriteId,
}

impl ScanlineProjector {
    pub fn new(
        layout: ScreenLayout,
        sweep: SweepSettings,
        far_clip: f64,
        step_divisor: f64,
        road: SpriteId,
    ) -> Self {
        Self {
            layout,
            sweep,
            far_clip,
            step_divisor,
            road,
        }
    }

    /// Draw the road for `camera` and record per-row distances in `depth`.
    ///
    /// `depth` is expected to be freshly reset. Rows the search skips keep
    /// the sentinel.
    pub fn sweep<R: Renderer + ?Sized>(
        &self,
        camera: &CameraState,
        terrain: &TerrainField,
        depth: &mut DepthBuffer,
        renderer: &mut R,
    ) -> SweepStats {
        let mut stats = SweepStats::default();
        let mut distance = self.sweep.near_clip.max(SCALE_EPSILON);
        let mut last_row = self.layout.height as i32;
        let width = self.layout.width as i32;

        while distance < self.far_clip {
            let mut x;
            let mut elevation_delta;
            let mut row;
            loop {
                distance += distance / self.step_divisor;
                stats.steps += 1;
                x = camera.x + distance;
                elevation_delta = terrain.elevation(x) - camera.z;
                row = self.layout.row(distance, elevation_delta);
                if row < last_row || distance >= self.far_clip {
                    break;
                }
            }

            if distance >= self.far_clip {
                break;
            }
            // Rows only move up the screen from here on
            if row < 0 {
                break;
            }

            depth.write(row, distance);

            let fog = Rgb::saturating(
                50.0 - distance / 3.0,
                130.0 - distance,
                50.0 - elevation_delta / 20.0 + 30.0 * x.sin(),
            );
            renderer.fill_row(row, fog, width);
            // The top row gets fog only
            if row >= 1 {
                self.draw_road_slice(camera, terrain, distance, x, elevation_delta, renderer);
            }

            log::trace!("row {row} at distance {distance:.3}");
            stats.rows_written += 1;
            stats.first_row.get_or_insert(row);
            stats.last_row = Some(row);
            last_row = row;
        }

        stats
    }

    fn draw_road_slice<R: Renderer + ?Sized>(
        &self,
        camera: &CameraState,
        terrain: &TerrainField,
        distance: f64,
        x: f64,
        elevation_delta: f64,
        renderer: &mut R,
    ) {
        let lateral = terrain.lateral_curve(x) - camera.y;
        let p = self
            .layout
            .project(distance, lateral, elevation_delta, camera.heading);
        let rows = self.sweep.texture_rows.max(1) as f64;
        let band = (self.sweep.band_frequency * x).rem_euclid(rows) as u32;
        let width = (self.sweep.road_width * p.scale) as i32;
        renderer.draw_scaled_sprite(
            SpriteRef::band(self.road, band),
            IVec2::new(p.column.floor() as i32, p.row),
            IVec2::new(width, 1),
        );
    }
}

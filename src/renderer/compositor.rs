//! Billboard placement with per-row depth testing

use glam::{DVec2, IVec2};

use super::depth::DepthBuffer;
use super::projection::{Projected, ScreenLayout};
use super::surface::{Renderer, SpriteId};
use crate::consts::SCALE_EPSILON;
use crate::sim::{CameraState, Entity, TerrainField};

/// Where a billboard would land on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub distance: f64,
    pub projected: Projected,
    /// Top-left corner of the sprite
    pub origin: IVec2,
    pub size: IVec2,
}

/// Projects entities and draws the ones not hidden behind terrain
#[derive(Debug, Clone)]
pub struct SpriteCompositor {
    pub layout: ScreenLayout,
    /// Slack when comparing against terrain depth
    pub tolerance: f64,
}

impl SpriteCompositor {
    pub fn new(layout: ScreenLayout, tolerance: f64) -> Self {
        Self { layout, tolerance }
    }

    /// Project `entity` as seen from `camera`. Entities at or behind the
    /// camera are clamped to a tiny positive distance.
    pub fn place(
        &self,
        entity: &Entity,
        base_size: DVec2,
        camera: &CameraState,
        terrain: &TerrainField,
    ) -> Placement {
        let distance = (entity.position - camera.x).max(SCALE_EPSILON);
        let lateral = terrain.lateral_curve(entity.position) - entity.lateral_offset - camera.y;
        let elevation_delta = terrain.elevation(entity.position) - camera.z;
        let projected = self
            .layout
            .project(distance, lateral, elevation_delta, camera.heading);
        let scaled = (base_size * projected.scale).max(DVec2::ZERO);
        let size = IVec2::new(scaled.x as i32, scaled.y as i32);
        // Sprites stand on their row
        let origin = IVec2::new(
            projected.column.floor() as i32,
            projected.row.saturating_sub(size.y).saturating_add(1),
        );
        Placement {
            distance,
            projected,
            origin,
            size,
        }
    }

    /// Whether a placement survives the depth test against the row above it
    pub fn visible(&self, placement: &Placement, depth: &DepthBuffer) -> bool {
        let row = placement.projected.row;
        row >= 1
            && self.layout.contains_row(row)
            && depth.test(row - 1, placement.distance, self.tolerance)
    }

    /// Draw `entity` if visible. Returns whether a draw was issued.
    #[allow(clippy::too_many_arguments)]
    pub fn composite<R: Renderer + ?Sized>(
        &self,
        entity: &Entity,
        sprite: SpriteId,
        base_size: DVec2,
        camera: &CameraState,
        terrain: &TerrainField,
        depth: &DepthBuffer,
        renderer: &mut R,
    ) -> bool {
        let placement = self.place(entity, base_size, camera, terrain);
        if !self.visible(&placement, depth) {
            return false;
        }
        renderer.draw_scaled_sprite(sprite.into(), placement.origin, placement.size);
        true
    }
}

//! One rendered frame per tick
//!
//! [`FrameLoop`] owns everything that persists between frames: the depth
//! buffer, the entity pools and the RNG. The host drives it by calling
//! [`FrameLoop::tick`] once per displayed frame. Returning from `tick` is the
//! only yield point; presentation, input polling and timing belong to the
//! caller.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::renderer::{DepthBuffer, Renderer, ScanlineProjector, SpriteCompositor, SweepStats};
use crate::settings::{Settings, SettingsError};
use crate::sim::{CameraState, EntityPool};

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Delta after clamping
    pub delta: f64,
    pub sweep: SweepStats,
    pub props_drawn: u32,
    pub vehicles_drawn: u32,
    /// Entities moved from the head to the tail of their pool
    pub recycled: u32,
    pub off_track: bool,
}

/// Per-frame orchestration of sweep, compositing and recycling
#[derive(Debug, Clone)]
pub struct FrameLoop {
    settings: Settings,
    projector: ScanlineProjector,
    compositor: SpriteCompositor,
    depth: DepthBuffer,
    props: EntityPool,
    vehicles: EntityPool,
    rng: Pcg32,
    total_time: f64,
    frames: u64,
}

impl FrameLoop {
    /// Build a loop with pools seeded ahead of `start_x`.
    ///
    /// Fails if `settings` does not pass [`Settings::validate`].
    pub fn new(settings: Settings, start_x: f64) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let props = EntityPool::new(settings.props, start_x, &mut rng);
        let vehicles = EntityPool::new(settings.vehicles, start_x, &mut rng);
        let projector = ScanlineProjector::new(
            settings.layout,
            settings.sweep,
            settings.quality.far_clip(),
            settings.quality.step_divisor(),
            settings.sprites.road,
        );
        let compositor = SpriteCompositor::new(settings.layout, settings.depth_tolerance);
        let depth = DepthBuffer::new(settings.layout.height as usize);

        log::info!(
            "Frame loop ready: {}x{}, {} quality, seed {}",
            settings.layout.width,
            settings.layout.height,
            settings.quality.as_str(),
            settings.seed
        );

        Ok(Self {
            settings,
            projector,
            compositor,
            depth,
            props,
            vehicles,
            rng,
            total_time: 0.0,
            frames: 0,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn props(&self) -> &EntityPool {
        &self.props
    }

    pub fn vehicles(&self) -> &EntityPool {
        &self.vehicles
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Clamp a wall-clock delta into the configured range. NaN maps to the
    /// lower bound.
    pub fn clamp_delta(&self, delta: f64) -> f64 {
        let lo = self.settings.delta_min;
        let hi = self.settings.delta_max.max(lo);
        if delta.is_nan() {
            return lo;
        }
        delta.max(lo).min(hi)
    }

    /// Render one frame for `camera` and advance the world by `delta` seconds.
    ///
    /// Only the off-track penalty writes to `camera`.
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        camera: &mut CameraState,
        delta: f64,
        renderer: &mut R,
    ) -> FrameReport {
        let delta = self.clamp_delta(delta);
        self.total_time += delta;
        self.frames += 1;

        let mut report = FrameReport {
            delta,
            ..FrameReport::default()
        };

        self.draw_backdrop(camera, renderer);

        self.depth.reset();
        report.sweep = self
            .projector
            .sweep(camera, &self.settings.terrain, &mut self.depth, renderer);

        report.props_drawn = self.composite_pool(PoolSlot::Props, camera, renderer);
        report.vehicles_drawn = self.composite_pool(PoolSlot::Vehicles, camera, renderer);
        self.vehicles.drift(delta);

        self.draw_player(camera, renderer);

        let margin = self.settings.recycle_margin;
        report.recycled = (self.props.recycle(camera.x, margin, &mut self.rng)
            + self.vehicles.recycle(camera.x, margin, &mut self.rng)) as u32;

        report.off_track = self.apply_off_track(camera, delta, renderer);

        log::debug!(
            "frame {}: {} rows, {} props, {} vehicles, {} recycled",
            self.frames,
            report.sweep.rows_written,
            report.props_drawn,
            report.vehicles_drawn,
            report.recycled
        );
        report
    }

    fn draw_backdrop<R: Renderer + ?Sized>(&self, camera: &CameraState, renderer: &mut R) {
        let b = &self.settings.backdrop;
        let origin = IVec2::new(
            (b.origin.x - camera.heading * b.parallax).floor() as i32,
            b.origin.y.floor() as i32,
        );
        renderer.draw_scaled_sprite(self.settings.sprites.backdrop.into(), origin, b.size);
    }

    /// Draw one pool farthest first so nearer sprites overdraw farther ones
    fn composite_pool<R: Renderer + ?Sized>(
        &self,
        slot: PoolSlot,
        camera: &CameraState,
        renderer: &mut R,
    ) -> u32 {
        let (pool, sprite) = match slot {
            PoolSlot::Props => (&self.props, self.settings.sprites.tree),
            PoolSlot::Vehicles => (&self.vehicles, self.settings.sprites.car),
        };
        let base_size = pool.rule().base_size;
        pool.iter()
            .rev()
            .filter(|entity| {
                self.compositor.composite(
                    entity,
                    sprite,
                    base_size,
                    camera,
                    &self.settings.terrain,
                    &self.depth,
                    renderer,
                )
            })
            .count() as u32
    }

    fn draw_player<R: Renderer + ?Sized>(&self, camera: &CameraState, renderer: &mut R) {
        let p = &self.settings.player;
        let bob = p.bob_amplitude * (self.total_time * camera.velocity).sin();
        let origin = IVec2::new(p.origin.x, p.origin.y + bob.round() as i32);
        renderer.draw_scaled_sprite(self.settings.sprites.player.into(), origin, p.size);
    }

    /// Slow the rider down while they are far off the road
    fn apply_off_track<R: Renderer + ?Sized>(
        &self,
        camera: &mut CameraState,
        delta: f64,
        renderer: &mut R,
    ) -> bool {
        let o = &self.settings.off_track;
        let centre = self.settings.terrain.lateral_curve(camera.x + o.lookahead);
        let deviation = (camera.y - centre - o.center_bias).abs();
        if deviation <= o.threshold || camera.velocity <= o.min_velocity {
            return false;
        }
        camera.velocity -= camera.velocity * delta;
        camera.acceleration -= camera.acceleration * delta;
        renderer.draw_scaled_sprite(
            self.settings.sprites.warning.into(),
            o.indicator_origin,
            o.indicator_size,
        );
        log::trace!("off track by {deviation:.1}");
        true
    }
}

#[derive(Debug, Clone, Copy)]
enum PoolSlot {
    Props,
    Vehicles,
}

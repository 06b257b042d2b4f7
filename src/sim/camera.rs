//! Camera state and its per-tick integration

use serde::{Deserialize, Serialize};

use super::speed::SpeedSignal;
use super::terrain::TerrainField;

/// Rider/camera snapshot consumed by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraState {
    /// Longitudinal position along the track
    pub x: f64,
    /// Lateral offset
    pub y: f64,
    /// Camera height, tracks `elevation(x)`
    pub z: f64,
    /// Steering angle (radians), bounded by the controller
    pub heading: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl CameraState {
    /// Camera resting on the road at `x`
    pub fn on_road(terrain: &TerrainField, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: terrain.elevation(x),
            ..Self::default()
        }
    }
}

/// Player intent for one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveInput {
    /// Force full speed
    pub throttle: bool,
    /// Force reverse
    pub brake: bool,
    /// Analog steering axis, -1 (left) to 1 (right)
    pub steer: f64,
}

/// Camera integration tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Speed signal value mapped to full game speed (km/h)
    pub max_signal_kmh: f64,
    /// Top forward speed in world units per second
    pub max_game_speed: f64,
    pub min_velocity: f64,
    pub max_velocity: f64,
    /// Acceleration decays by this fraction per second
    pub acceleration_decay: f64,
    /// How hard velocity chases its target
    pub response: f64,
    /// Heading change per second is `steer * velocity / steer_divisor`
    pub steer_divisor: f64,
    /// Steering inputs closer to zero than this are ignored
    pub steer_dead_zone: f64,
    pub heading_limit: f64,
    /// World units of sideways travel per unit of forward travel at full lock
    pub lateral_gain: f64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_signal_kmh: 30.0,
            max_game_speed: 20.0,
            min_velocity: -10.0,
            max_velocity: 20.0,
            acceleration_decay: 0.5,
            response: 2.0,
            steer_divisor: 10.0,
            steer_dead_zone: 0.05,
            heading_limit: 0.8,
            lateral_gain: 100.0,
        }
    }
}

/// Integrates [`CameraState`] from a speed signal and drive input
#[derive(Debug, Clone)]
pub struct Controller {
    pub settings: ControllerSettings,
    /// Last value read from the speed signal (km/h, 0 when unavailable)
    pub last_kmh: f64,
}

impl Controller {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            last_kmh: 0.0,
        }
    }

    /// Game velocity the rider is pedalling toward
    pub fn target_velocity(&self, kmh: f64) -> f64 {
        let s = &self.settings;
        if s.max_signal_kmh <= 0.0 {
            return 0.0;
        }
        (kmh / s.max_signal_kmh).clamp(0.0, 1.0) * s.max_game_speed
    }

    /// Advance `camera` by `dt` seconds
    pub fn update<S: SpeedSignal + ?Sized>(
        &mut self,
        camera: &mut CameraState,
        input: &DriveInput,
        signal: &mut S,
        terrain: &TerrainField,
        dt: f64,
    ) {
        let s = self.settings;

        camera.acceleration -= s.acceleration_decay * camera.acceleration * dt;

        self.last_kmh = signal.current_kmh().filter(|v| v.is_finite()).unwrap_or(0.0);
        let target = if input.throttle {
            s.max_game_speed
        } else if input.brake {
            -s.max_game_speed / 2.0
        } else {
            self.target_velocity(self.last_kmh)
        };
        camera.acceleration += (target - camera.velocity) * dt * s.response;

        let steer = input.steer.clamp(-1.0, 1.0);
        if steer.abs() > s.steer_dead_zone && s.steer_divisor > 0.0 {
            camera.heading += steer * dt * camera.velocity / s.steer_divisor;
        }

        camera.velocity =
            (camera.velocity + camera.acceleration * dt).clamp(s.min_velocity, s.max_velocity);
        camera.heading = camera.heading.clamp(-s.heading_limit, s.heading_limit);

        camera.x += camera.velocity * dt * camera.heading.cos();
        camera.y += camera.velocity * camera.heading.sin() * dt * s.lateral_gain;
        camera.z = terrain.elevation(camera.x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::speed::{ConstantSpeed, NoSignal};

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_target_velocity_is_normalized_and_capped() {
        let c = Controller::new(ControllerSettings::default());
        assert_eq!(c.target_velocity(0.0), 0.0);
        assert!((c.target_velocity(15.0) - 10.0).abs() < 1e-12);
        assert_eq!(c.target_velocity(90.0), 20.0);
        assert_eq!(c.target_velocity(-5.0), 0.0);
    }

    #[test]
    fn test_pedalling_accelerates_toward_target() {
        let terrain = TerrainField::hills();
        let mut c = Controller::new(ControllerSettings::default());
        let mut cam = CameraState::on_road(&terrain, 0.0, 300.0);
        let mut signal = ConstantSpeed(30.0);
        for _ in 0..600 {
            c.update(&mut cam, &DriveInput::default(), &mut signal, &terrain, DT);
        }
        assert!(cam.velocity > 10.0);
        assert!(cam.velocity <= 20.0);
        assert!(cam.x > 0.0);
        assert_eq!(cam.z, terrain.elevation(cam.x));
        assert_eq!(c.last_kmh, 30.0);
    }

    #[test]
    fn test_no_signal_coasts_to_stop() {
        let terrain = TerrainField::flat();
        let mut c = Controller::new(ControllerSettings::default());
        let mut cam = CameraState {
            velocity: 15.0,
            ..CameraState::default()
        };
        for _ in 0..6000 {
            c.update(&mut cam, &DriveInput::default(), &mut NoSignal, &terrain, DT);
        }
        assert!(cam.velocity.abs() < 0.5);
        assert_eq!(c.last_kmh, 0.0);
    }

    #[test]
    fn test_brake_reverses_within_limit() {
        let terrain = TerrainField::flat();
        let mut c = Controller::new(ControllerSettings::default());
        let mut cam = CameraState::default();
        let input = DriveInput {
            brake: true,
            ..DriveInput::default()
        };
        for _ in 0..1200 {
            c.update(&mut cam, &input, &mut NoSignal, &terrain, DT);
        }
        assert!(cam.velocity < 0.0);
        assert!(cam.velocity >= -10.0);
    }

    #[test]
    fn test_heading_is_bounded() {
        let terrain = TerrainField::flat();
        let mut c = Controller::new(ControllerSettings::default());
        let mut cam = CameraState::default();
        let input = DriveInput {
            throttle: true,
            steer: 1.0,
            ..DriveInput::default()
        };
        for _ in 0..2000 {
            c.update(&mut cam, &input, &mut NoSignal, &terrain, DT);
            assert!(cam.heading.abs() <= 0.8);
        }
        assert!((cam.heading - 0.8).abs() < 1e-12);
        assert!(cam.y > 0.0);
    }

    #[test]
    fn test_dead_zone_ignores_small_steer() {
        let terrain = TerrainField::flat();
        let mut c = Controller::new(ControllerSettings::default());
        let mut cam = CameraState {
            velocity: 10.0,
            ..CameraState::default()
        };
        let input = DriveInput {
            steer: 0.04,
            ..DriveInput::default()
        };
        c.update(&mut cam, &input, &mut NoSignal, &terrain, DT);
        assert_eq!(cam.heading, 0.0);
    }

    #[test]
    fn test_closure_signal() {
        let terrain = TerrainField::flat();
        let mut c = Controller::new(ControllerSettings::default());
        let mut cam = CameraState::default();
        let mut readings = vec![Some(12.0), None].into_iter();
        let mut signal = move || readings.next().flatten();
        c.update(&mut cam, &DriveInput::default(), &mut signal, &terrain, DT);
        assert_eq!(c.last_kmh, 12.0);
        c.update(&mut cam, &DriveInput::default(), &mut signal, &terrain, DT);
        assert_eq!(c.last_kmh, 0.0);
    }
}

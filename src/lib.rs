//! Pedal Road - a pseudo-3D scanline road renderer
//!
//! Core modules:
//! - `sim`: Terrain, camera integration and recycled entity pools
//! - `renderer`: Scanline projection, depth buffer and sprite compositing
//! - `frame`: Per-tick orchestration
//! - `settings`: Data-driven configuration

pub mod frame;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use frame::{FrameLoop, FrameReport};
pub use settings::{QualityPreset, Settings, SettingsError};

/// Shared numeric constants
pub mod consts {
    /// Smallest distance used for perspective division
    pub const SCALE_EPSILON: f64 = 1.0e-4;
}

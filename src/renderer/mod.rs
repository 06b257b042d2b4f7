//! Software scanline rendering
//!
//! Terrain is drawn row by row from a perspective sweep. Billboards are placed
//! with the same projection and depth-tested per row. All output goes through
//! the [`Renderer`] trait.

pub mod compositor;
pub mod depth;
pub mod framebuffer;
pub mod projection;
pub mod scanline;
pub mod surface;

pub use compositor::{Placement, SpriteCompositor};
pub use depth::DepthBuffer;
pub use framebuffer::{Framebuffer, SpriteImage};
pub use projection::{Projected, ScreenLayout};
pub use scanline::{ScanlineProjector, SweepSettings, SweepStats};
pub use surface::{CommandLog, DrawCommand, Renderer, Rgb, SpriteId, SpriteRef};

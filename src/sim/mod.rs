//! Deterministic world simulation
//!
//! Terrain, camera integration and the entity pools. Nothing here draws:
//! - Terrain is a pure function of position
//! - Randomness comes from a caller-owned, seeded RNG
//! - Pools never allocate after construction

pub mod camera;
pub mod pool;
pub mod speed;
pub mod terrain;

pub use camera::{CameraState, Controller, ControllerSettings, DriveInput};
pub use pool::{Entity, EntityKind, EntityPool, LateralPlacement, SpawnRule};
pub use speed::{ConstantSpeed, NoSignal, SpeedSignal};
pub use terrain::{SineTerm, TerrainField, Waveform};

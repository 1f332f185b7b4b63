/// Stardust Core Library - software transform-and-project pipeline
///
/// This library provides the frame-driven core: homogeneous transform
/// builders, an accumulating camera, the transform stack and projecting
/// renderer, the dust field and the flight controls that steer it.

pub mod camera;
pub mod controls;
pub mod dust;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod renderer;
pub mod transform;

// Re-export commonly used types
pub use camera::{Camera, CameraState, Delta};
pub use controls::{FlightCalibration, FlightControls};
pub use dust::{Dust, DustField, View};
pub use error::{TransformError, TransformResult};
pub use geometry::UnitCube;
pub use projection::Frustum;
pub use renderer::{Renderer, Rgb, Surface, TransformStack};
pub use transform::Transform;

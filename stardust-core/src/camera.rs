/// Camera placement and its cached view matrix
use log::{debug, warn};
use nalgebra::Matrix4;

use crate::error::{TransformError, TransformResult};
use crate::transform::Transform;

/// Roll, pitch and yaw in degrees plus a linear offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
}

impl CameraState {
    pub fn new(roll: f32, pitch: f32, yaw: f32, x_offset: f32, y_offset: f32, z_offset: f32) -> Self {
        Self {
            roll,
            pitch,
            yaw,
            x_offset,
            y_offset,
            z_offset,
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.roll == 0.0
            && self.pitch == 0.0
            && self.yaw == 0.0
            && self.x_offset == 0.0
            && self.y_offset == 0.0
            && self.z_offset == 0.0
    }

    /// `T * Yaw * Pitch * Roll` for this state
    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::rot_matrix(
            self.roll,
            self.pitch,
            self.yaw,
            self.x_offset,
            self.y_offset,
            self.z_offset,
        )
    }
}

impl Default for CameraState {
    /// Slightly raised and pitched down toward the scene
    fn default() -> Self {
        Self::new(0.0, 30.0, 0.0, 0.0, 3.0, 2.0)
    }
}

/// Pending control input for one frame.
///
/// Each non-zero component overwrites the pending value on that axis; zero
/// leaves it alone. Consumed by [`Camera::apply_control_delta`], then reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    pending: CameraState,
    changed: bool,
}

impl Delta {
    pub fn new() -> Self {
        Self {
            pending: CameraState::zero(),
            changed: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set(&mut self, r: f32, p: f32, y: f32, xo: f32, yo: f32, zo: f32) {
        let slots = [
            (r, &mut self.pending.roll),
            (p, &mut self.pending.pitch),
            (y, &mut self.pending.yaw),
            (xo, &mut self.pending.x_offset),
            (yo, &mut self.pending.y_offset),
            (zo, &mut self.pending.z_offset),
        ];
        for (value, slot) in slots {
            if value != 0.0 {
                *slot = value;
                self.changed = true;
            }
        }
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn state(&self) -> &CameraState {
        &self.pending
    }
}

impl Default for Delta {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulated camera-to-world matrix with its inverse kept alongside.
///
/// `view_matrix` is recomputed on every mutation and only there, so reads are
/// free and `camera_matrix * view_matrix == I` holds between mutations.
#[derive(Debug, Clone)]
pub struct Camera {
    camera_matrix: Matrix4<f32>,
    view_matrix: Matrix4<f32>,
    changed: bool,
}

impl Camera {
    /// Place the camera at `state`; the first delta is the camera matrix itself
    pub fn new(state: CameraState) -> TransformResult<Self> {
        let camera_matrix = state.matrix();
        let view_matrix = camera_matrix
            .try_inverse()
            .ok_or(TransformError::Degenerate)?;

        debug!("camera placed at {:?}", state);
        Ok(Self {
            camera_matrix,
            view_matrix,
            changed: true,
        })
    }

    /// Right-multiply an incremental transform: `camera' = camera * delta`.
    ///
    /// A delta that would make the camera non-invertible is rejected and the
    /// camera is left untouched.
    pub fn apply_delta(&mut self, delta: &Matrix4<f32>) -> TransformResult<()> {
        let camera_matrix = self.camera_matrix * delta;
        let Some(view_matrix) = camera_matrix.try_inverse() else {
            warn!("rejected degenerate camera delta");
            return Err(TransformError::Degenerate);
        };

        self.camera_matrix = camera_matrix;
        self.view_matrix = view_matrix;
        self.changed = true;
        Ok(())
    }

    /// Build the rotation+translation delta and apply it; all-zero is a no-op
    pub fn apply_control_delta(&mut self, delta: &CameraState) -> TransformResult<()> {
        if delta.is_zero() {
            return Ok(());
        }
        debug!("camera delta {:?}", delta);
        self.apply_delta(&delta.matrix())
    }

    /// Consume a frame's pending input, then clear it
    pub fn consume(&mut self, delta: &mut Delta) -> TransformResult<()> {
        if !delta.has_changed() {
            return Ok(());
        }
        let result = self.apply_control_delta(delta.state());
        delta.reset();
        result
    }

    /// Cached inverse of the camera matrix; clears the changed flag
    pub fn get_view_matrix(&mut self) -> Matrix4<f32> {
        self.changed = false;
        self.view_matrix
    }

    /// Whether the view matrix moved since the last `get_view_matrix`
    pub fn has_view_changed(&self) -> bool {
        self.changed
    }

    pub fn camera_matrix(&self) -> &Matrix4<f32> {
        &self.camera_matrix
    }

    /// Read the view matrix without touching the changed flag
    pub fn view_matrix(&self) -> &Matrix4<f32> {
        &self.view_matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_inverse_pair(camera: &Camera) {
        let product = camera.camera_matrix() * camera.view_matrix();
        assert!((product - Matrix4::identity()).norm() < 1e-4);
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(CameraState::default()).unwrap();
        assert!(camera.has_view_changed());
        assert_inverse_pair(&camera);
    }

    #[test]
    fn test_inverse_holds_after_every_delta() {
        let mut camera = Camera::new(CameraState::default()).unwrap();
        let deltas = [
            CameraState::new(5.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            CameraState::new(0.0, -5.0, 0.0, 0.1, 0.0, 0.0),
            CameraState::new(0.0, 0.0, 5.0, 0.0, 0.0, -0.1),
            CameraState::new(-5.0, 5.0, -5.0, 0.0, 0.1, 0.1),
        ];
        for _ in 0..20 {
            for delta in &deltas {
                camera.apply_control_delta(delta).unwrap();
                assert_inverse_pair(&camera);
            }
        }
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut camera = Camera::new(CameraState::default()).unwrap();
        camera.get_view_matrix();
        let before = *camera.camera_matrix();
        let view_before = *camera.view_matrix();

        camera.apply_control_delta(&CameraState::zero()).unwrap();

        assert_eq!(*camera.camera_matrix(), before);
        assert_eq!(*camera.view_matrix(), view_before);
        assert!(!camera.has_view_changed());
    }

    #[test]
    fn test_changed_flag_lifecycle() {
        let mut camera = Camera::new(CameraState::default()).unwrap();
        camera.get_view_matrix();
        assert!(!camera.has_view_changed());

        camera
            .apply_control_delta(&CameraState::new(0.0, 0.0, 0.0, 0.0, 0.1, 0.0))
            .unwrap();
        assert!(camera.has_view_changed());
        assert!(camera.has_view_changed());

        camera.get_view_matrix();
        assert!(!camera.has_view_changed());
    }

    #[test]
    fn test_delta_right_multiplies() {
        let mut camera = Camera::new(CameraState::default()).unwrap();
        let start = *camera.camera_matrix();
        let delta = Transform::rot_matrix(10.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        camera.apply_delta(&delta).unwrap();
        assert!((camera.camera_matrix() - start * delta).norm() < 1e-5);
    }

    #[test]
    fn test_degenerate_delta_rejected() {
        let mut camera = Camera::new(CameraState::default()).unwrap();
        camera.get_view_matrix();
        let before = *camera.camera_matrix();

        let result = camera.apply_delta(&Matrix4::zeros());

        assert_eq!(result, Err(TransformError::Degenerate));
        assert_eq!(*camera.camera_matrix(), before);
        assert!(!camera.has_view_changed());
    }

    #[test]
    fn test_delta_accumulator() {
        let mut delta = Delta::new();
        assert!(!delta.has_changed());

        delta.set(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(!delta.has_changed());

        delta.set(5.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        delta.set(0.0, 0.0, 0.0, 0.0, -0.1, 0.0);
        assert!(delta.has_changed());
        assert_eq!(delta.state().roll, 5.0);
        assert_eq!(delta.state().y_offset, -0.1);

        delta.set(-5.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(delta.state().roll, -5.0);

        delta.reset();
        assert!(!delta.has_changed());
        assert!(delta.state().is_zero());
    }

    #[test]
    fn test_consume_clears_delta() {
        let mut camera = Camera::new(CameraState::default()).unwrap();
        camera.get_view_matrix();
        let mut delta = Delta::new();
        delta.set(0.0, 0.0, 5.0, 0.0, 0.0, 0.0);

        camera.consume(&mut delta).unwrap();

        assert!(camera.has_view_changed());
        assert!(!delta.has_changed());
        assert_inverse_pair(&camera);
    }
}

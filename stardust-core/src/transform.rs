/// Homogeneous 4x4 transform builders
///
/// All matrices act on column vectors: `m * v`. Angles passed to the `rot_*`
/// builders are in degrees, the single-axis builders take radians.
use nalgebra::{Matrix4, Matrix4xX, Vector3};

/// Transform builder for rotation, translation and composite matrices
pub struct Transform;

impl Transform {
    /// Rotation about the forward (z) axis
    pub fn roll_matrix(r: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, 0.0, r))
    }

    /// Rotation about the lateral (x) axis
    pub fn pitch_matrix(p: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(p, 0.0, 0.0))
    }

    /// Rotation about the vertical (y) axis
    pub fn yaw_matrix(y: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, y, 0.0))
    }

    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Rotation followed by translation, built as `T * Yaw * Pitch * Roll`
    pub fn rot_matrix(r: f32, p: f32, y: f32, xo: f32, yo: f32, zo: f32) -> Matrix4<f32> {
        let roll = Self::roll_matrix(r.to_radians());
        let pitch = Self::pitch_matrix(p.to_radians());
        let yaw = Self::yaw_matrix(y.to_radians());

        Self::translation_matrix(xo, yo, zo) * yaw * pitch * roll
    }

    /// Same matrix as [`Transform::rot_matrix`], written out in closed form
    pub fn rot_matrix_short(r: f32, p: f32, y: f32, xo: f32, yo: f32, zo: f32) -> Matrix4<f32> {
        Self::composite_matrix(r.to_radians(), p.to_radians(), y.to_radians(), xo, yo, zo)
    }

    /// Closed form of `T * Yaw * Pitch * Roll` (angles in radians)
    pub fn composite_matrix(r: f32, p: f32, y: f32, xo: f32, yo: f32, zo: f32) -> Matrix4<f32> {
        let (s_r, c_r) = r.sin_cos();
        let (s_p, c_p) = p.sin_cos();
        let (s_y, c_y) = y.sin_cos();

        Matrix4::new(
            c_y * c_r + s_y * s_p * s_r,
            -c_y * s_r + s_y * s_p * c_r,
            s_y * c_p,
            xo,
            c_p * s_r,
            c_p * c_r,
            -s_p,
            yo,
            -s_y * c_r + c_y * s_p * s_r,
            s_y * s_r + c_y * s_p * c_r,
            c_y * c_p,
            zo,
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }

    /// Multiply a batch of homogeneous column vectors.
    ///
    /// Column `i` of the result is `m * vertices.column(i)`.
    pub fn transform_batch(m: &Matrix4<f32>, vertices: &Matrix4xX<f32>) -> Matrix4xX<f32> {
        m * vertices
    }
}

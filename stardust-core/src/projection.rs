/// Perspective frustum and the device (screen) mapping
use nalgebra::{Matrix4, Matrix4xX, Vector4};

use crate::transform::Transform;

/// Added to the clip `w` before perspective division
pub const W_EPSILON: f32 = 1.0e-6;

/// Perspective frustum; view space looks down +z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub near: f32,
    pub far: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
}

impl Frustum {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_aspect(width as f32 / height as f32)
    }

    pub fn with_aspect(aspect: f32) -> Self {
        Self {
            near: 1.0,
            far: 1000.0,
            fov_degrees: 60.0,
            aspect,
        }
    }

    /// Clip-space mapping with `w_clip = z_view`.
    ///
    /// View depth `near..=far` lands on `-1..=1` after division.
    pub fn perspective_matrix(&self) -> Matrix4<f32> {
        let (n, f) = (self.near, self.far);
        let e = 1.0 / (self.fov_degrees.to_radians() / 2.0).tan();

        Matrix4::new(
            e / self.aspect, 0.0, 0.0, 0.0,
            0.0, e, 0.0, 0.0,
            0.0, 0.0, (f + n) / (f - n), -2.0 * f * n / (f - n),
            0.0, 0.0, 1.0, 0.0,
        )
    }

    /// Whether a view-space depth lies between the clip planes
    pub fn contains_depth(&self, depth: f32) -> bool {
        depth >= self.near && depth <= self.far
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Map normalized device coordinates onto a surface whose centre is
/// `(origin_x, origin_y)`: +x right, +y up, +z into the screen.
pub fn device_matrix(origin_x: f32, origin_y: f32) -> Matrix4<f32> {
    let (w, h) = (origin_x, origin_y);
    let flip = Matrix4::new(
        -w, 0.0, 0.0, w,
        0.0, h, 0.0, h,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    flip * Transform::rot_matrix(180.0, 0.0, 0.0, 0.0, 0.0, 0.0)
}

/// Run vertices (columns) through `render_matrix`, divide by `w`, then map
/// with `device`.
///
/// Each returned row is `[screen_x, screen_y, ndc_z, depth]`, where `depth`
/// is the clip `w`, i.e. the view-space depth for [`Frustum::perspective_matrix`].
pub fn project_vertices(
    render_matrix: &Matrix4<f32>,
    device: &Matrix4<f32>,
    vertices: &Matrix4xX<f32>,
) -> Vec<Vector4<f32>> {
    let clip = Transform::transform_batch(render_matrix, vertices);

    clip.column_iter()
        .map(|c| {
            let w = c[3] + W_EPSILON;
            let ndc = Vector4::new(c[0] / w, c[1] / w, c[2] / w, 1.0);
            let screen = device * ndc;
            Vector4::new(screen.x, screen.y, screen.z, c[3])
        })
        .collect()
}

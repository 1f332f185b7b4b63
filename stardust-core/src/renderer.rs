/// Transform stack and the projecting renderer that feeds a draw surface
use log::{debug, trace};
use nalgebra::{Matrix4, Matrix4xX, Vector4};

use crate::camera::Camera;
use crate::error::{TransformError, TransformResult};
use crate::projection::{device_matrix, project_vertices, Frustum};

/// Perspective, view and model
pub const STACK_CAPACITY: usize = 3;

/// Radius used by [`Renderer::draw_point`]
pub const POINT_RADIUS: f32 = 2.0;

/// 24-bit colour handed through to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const OLIVE: Rgb = Rgb(90, 90, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
}

/// A raster target that can draw lines and filled circles in screen pixels
pub trait Surface {
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb);

    fn draw_circle(&mut self, centre: (i32, i32), radius: f32, color: Rgb);
}

/// Fixed-capacity stack of transforms whose product is the render matrix.
///
/// Entries compose outer to inner: `stack[0] * stack[1] * ...`, so the first
/// entry pushed is applied last to a column vector.
#[derive(Debug, Clone)]
pub struct TransformStack {
    stack: [Matrix4<f32>; STACK_CAPACITY],
    depth: usize,
    render_matrix: Matrix4<f32>,
    last_render: [Matrix4<f32>; STACK_CAPACITY],
}

impl TransformStack {
    /// Start with `base` as the permanent bottom entry
    pub fn new(base: Matrix4<f32>) -> Self {
        let mut stack = [Matrix4::identity(); STACK_CAPACITY];
        stack[0] = base;
        Self {
            stack,
            depth: 1,
            render_matrix: base,
            last_render: [Matrix4::identity(); STACK_CAPACITY],
        }
    }

    pub fn push_matrix(&mut self, matrix: Matrix4<f32>) -> TransformResult<()> {
        if self.depth == STACK_CAPACITY {
            return Err(TransformError::StackOverflow(STACK_CAPACITY));
        }
        self.last_render[self.depth - 1] = self.render_matrix;
        self.stack[self.depth] = matrix;
        self.depth += 1;
        self.render_matrix = self.stack[1..self.depth]
            .iter()
            .fold(self.stack[0], |acc, m| acc * m);
        trace!("push, depth {}", self.depth);
        Ok(())
    }

    /// Drop the top entry and restore the composite saved when it was pushed
    pub fn pop_matrix(&mut self) -> TransformResult<()> {
        if self.depth <= 1 {
            return Err(TransformError::StackUnderflow);
        }
        self.depth -= 1;
        self.render_matrix = self.last_render[self.depth - 1];
        trace!("pop, depth {}", self.depth);
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn top(&self) -> &Matrix4<f32> {
        &self.stack[self.depth - 1]
    }

    pub fn render_matrix(&self) -> &Matrix4<f32> {
        &self.render_matrix
    }
}

/// Owns the camera and the transform stack and turns vertices into surface
/// coordinates.
///
/// Stack depth goes 1 (perspective, pushed here and never popped), 2 (view,
/// pushed by [`Renderer::begin_draw`]) and 3 (one model at a time).
pub struct Renderer {
    camera: Camera,
    frustum: Frustum,
    device: Matrix4<f32>,
    stack: TransformStack,
}

impl Renderer {
    /// `origin_x`/`origin_y` are half the surface width/height
    pub fn new(origin_x: f32, origin_y: f32, camera: Camera) -> Self {
        Self::with_frustum(origin_x, origin_y, camera, Frustum::with_aspect(origin_x / origin_y))
    }

    pub fn with_frustum(origin_x: f32, origin_y: f32, camera: Camera, frustum: Frustum) -> Self {
        Self {
            camera,
            frustum,
            device: device_matrix(origin_x, origin_y),
            stack: TransformStack::new(frustum.perspective_matrix()),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn stack(&self) -> &TransformStack {
        &self.stack
    }

    pub fn render_matrix(&self) -> &Matrix4<f32> {
        self.stack.render_matrix()
    }

    pub fn push_matrix(&mut self, matrix: Matrix4<f32>) -> TransformResult<()> {
        self.stack.push_matrix(matrix)
    }

    pub fn pop_matrix(&mut self) -> TransformResult<()> {
        self.stack.pop_matrix()
    }

    /// Refresh the view entry, only if the camera moved since it was pushed
    pub fn begin_draw(&mut self) -> TransformResult<()> {
        if self.camera.has_view_changed() {
            if self.stack.depth() == 2 {
                self.stack.pop_matrix()?;
            }
            debug!("replacing view matrix");
            self.stack.push_matrix(self.camera.get_view_matrix())?;
        }
        Ok(())
    }

    /// The view entry stays on the stack for the next frame
    pub fn end_draw(&mut self) {}

    /// Project homogeneous column vectors to `[screen_x, screen_y, ndc_z, depth]` rows
    pub fn project(&self, vertices: &Matrix4xX<f32>) -> Vec<Vector4<f32>> {
        project_vertices(self.stack.render_matrix(), &self.device, vertices)
    }

    /// Draw a projected edge unless either end lies outside the clip depths.
    ///
    /// Returns whether the line reached the surface.
    pub fn draw_line<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        v1: &Vector4<f32>,
        v2: &Vector4<f32>,
        color: Rgb,
    ) -> bool {
        if !self.frustum.contains_depth(v1.w) || !self.frustum.contains_depth(v2.w) {
            return false;
        }
        surface.draw_line(pixel(v1.x, v1.y), pixel(v2.x, v2.y), color);
        true
    }

    /// Mark a point with the render matrix alone, without perspective division
    pub fn draw_point<S: Surface + ?Sized>(&self, surface: &mut S, point: &Vector4<f32>, color: Rgb) {
        let p = self.stack.render_matrix() * point;
        surface.draw_circle(pixel(p.x, p.y), POINT_RADIUS, color);
    }
}

/// Round half to even, like the screen rounding the dust field uses
pub(crate) fn pixel(x: f32, y: f32) -> (i32, i32) {
    (x.round_ties_even() as i32, y.round_ties_even() as i32)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::camera::CameraState;
    use crate::transform::Transform;

    /// Surface that records every primitive it is handed
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub lines: Vec<((i32, i32), (i32, i32), Rgb)>,
        pub circles: Vec<((i32, i32), f32, Rgb)>,
    }

    impl Surface for RecordingSurface {
        fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb) {
            self.lines.push((from, to, color));
        }

        fn draw_circle(&mut self, centre: (i32, i32), radius: f32, color: Rgb) {
            self.circles.push((centre, radius, color));
        }
    }

    fn renderer() -> Renderer {
        let camera = Camera::new(CameraState::default()).unwrap();
        Renderer::new(400.0, 300.0, camera)
    }

    #[test]
    fn test_stack_composes_in_order() {
        let p = Frustum::default().perspective_matrix();
        let v = Transform::rot_matrix(10.0, 20.0, 30.0, 1.0, 2.0, 3.0);
        let m = Transform::rot_matrix(-5.0, 0.0, 45.0, 0.0, 0.5, 4.0);

        let mut stack = TransformStack::new(p);
        stack.push_matrix(v).unwrap();
        stack.push_matrix(m).unwrap();

        assert_eq!(stack.depth(), 3);
        assert!((stack.render_matrix() - p * v * m).norm() < 1e-4);
        assert!((stack.render_matrix() - m * v * p).norm() > 1e-3);
    }

    #[test]
    fn test_pop_restores_prior_render_matrix() {
        let a = Transform::rot_matrix(0.0, 30.0, 0.0, 0.0, 3.0, 2.0);
        let b = Transform::rot_matrix(15.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let c = Transform::rot_matrix(0.0, 0.0, 60.0, 0.0, 0.0, -1.0);

        let mut stack = TransformStack::new(a);
        let level1 = *stack.render_matrix();
        stack.push_matrix(b).unwrap();
        let level2 = *stack.render_matrix();
        stack.push_matrix(c).unwrap();

        stack.pop_matrix().unwrap();
        assert_eq!(*stack.render_matrix(), level2);
        stack.pop_matrix().unwrap();
        assert_eq!(*stack.render_matrix(), level1);

        // Re-pushing after a pop composes from the restored state
        stack.push_matrix(c).unwrap();
        assert!((stack.render_matrix() - a * c).norm() < 1e-5);
        assert_eq!(*stack.top(), c);
    }

    #[test]
    fn test_stack_bounds() {
        let mut stack = TransformStack::new(Matrix4::identity());
        assert_eq!(stack.pop_matrix(), Err(TransformError::StackUnderflow));

        stack.push_matrix(Matrix4::identity()).unwrap();
        stack.push_matrix(Matrix4::identity()).unwrap();
        assert_eq!(
            stack.push_matrix(Matrix4::identity()),
            Err(TransformError::StackOverflow(STACK_CAPACITY))
        );
        assert_eq!(stack.depth(), STACK_CAPACITY);
    }

    #[test]
    fn test_begin_draw_pushes_view_once() {
        let mut renderer = renderer();
        assert_eq!(renderer.stack().depth(), 1);

        renderer.begin_draw().unwrap();
        assert_eq!(renderer.stack().depth(), 2);
        assert!(!renderer.camera().has_view_changed());
        let first = *renderer.render_matrix();

        renderer.end_draw();
        renderer.begin_draw().unwrap();
        assert_eq!(renderer.stack().depth(), 2);
        assert_eq!(*renderer.render_matrix(), first);
    }

    #[test]
    fn test_begin_draw_replaces_stale_view() {
        let mut renderer = renderer();
        renderer.begin_draw().unwrap();
        renderer.end_draw();

        renderer
            .camera_mut()
            .apply_control_delta(&CameraState::new(0.0, 0.0, 5.0, 0.0, 0.0, 0.0))
            .unwrap();
        renderer.begin_draw().unwrap();

        let expected = renderer.frustum().perspective_matrix() * renderer.camera().view_matrix();
        assert_eq!(renderer.stack().depth(), 2);
        assert!((renderer.render_matrix() - expected).norm() < 1e-4);
    }

    #[test]
    fn test_draw_line_clips_on_depth() {
        let renderer = renderer();
        let mut surface = RecordingSurface::default();

        let a = Vector4::new(10.4, 20.6, 0.0, 5.0);
        let b = Vector4::new(30.5, 40.5, 0.0, 999.0);
        let behind = Vector4::new(0.0, 0.0, 0.0, 0.5);
        let beyond = Vector4::new(0.0, 0.0, 0.0, 1500.0);

        assert!(renderer.draw_line(&mut surface, &a, &b, Rgb::RED));
        assert!(!renderer.draw_line(&mut surface, &a, &behind, Rgb::RED));
        assert!(!renderer.draw_line(&mut surface, &beyond, &b, Rgb::RED));

        assert_eq!(surface.lines, vec![((10, 21), (30, 40), Rgb::RED)]);
    }

    #[test]
    fn test_draw_point_skips_division() {
        let mut renderer = renderer();
        renderer.begin_draw().unwrap();
        let mut surface = RecordingSurface::default();
        let point = Vector4::new(0.5, 0.5, 3.0, 1.0);

        renderer.draw_point(&mut surface, &point, Rgb::WHITE);

        let p = renderer.render_matrix() * point;
        assert_eq!(surface.circles.len(), 1);
        assert_eq!(surface.circles[0].0, pixel(p.x, p.y));
        assert_eq!(surface.circles[0].1, POINT_RADIUS);
    }

    #[test]
    fn test_project_one_row_per_vertex() {
        let mut renderer = renderer();
        renderer.begin_draw().unwrap();
        let vertices = Matrix4xX::from_columns(&[
            Vector4::new(0.0, 0.5, 5.0, 1.0),
            Vector4::new(1.0, 0.5, 5.0, 1.0),
            Vector4::new(-1.0, 0.5, 5.0, 1.0),
            Vector4::new(0.0, 0.5, 9.0, 1.0),
        ]);
        let rows = renderer.project(&vertices);
        assert_eq!(rows.len(), 4);
        assert!(rows[1].x > rows[0].x);
        assert!(rows[2].x < rows[0].x);
    }
}

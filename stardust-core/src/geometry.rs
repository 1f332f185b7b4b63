/// Wireframe drawables fed through the renderer
use nalgebra::{Matrix4, Matrix4xX, Vector4};
use rand::Rng;

use crate::error::TransformResult;
use crate::renderer::{Renderer, Rgb, Surface};
use crate::transform::Transform;

/// Corners of a unit cube centred on the origin, near face first
const CUBE_VERTICES: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [0.5, -0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [0.5, -0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

/// Near face, connecting edges, far face
pub const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 2),
    (0, 3),
    (2, 1),
    (3, 1),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
    (4, 6),
    (4, 7),
    (6, 5),
    (7, 5),
];

/// A spinning unit cube drawn as 12 edges
#[derive(Debug, Clone)]
pub struct UnitCube {
    pub model_matrix: Matrix4<f32>,
    vertices: Matrix4xX<f32>,
}

impl UnitCube {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        let columns: Vec<Vector4<f32>> = CUBE_VERTICES
            .iter()
            .map(|[vx, vy, vz]| Vector4::new(*vx, *vy, *vz, 1.0))
            .collect();

        Self {
            model_matrix: Transform::translation_matrix(x, y, z),
            vertices: Matrix4xX::from_columns(&columns),
        }
    }

    /// Homogeneous corners as columns
    pub fn vertices(&self) -> &Matrix4xX<f32> {
        &self.vertices
    }

    /// Spin by the same random 1-5 degrees of roll and pitch
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        let deg = rng.gen_range(1.0..5.0);
        self.model_matrix *= Transform::rot_matrix(deg, deg, 0.0, 0.0, 0.0, 0.0);
    }

    /// Push the model matrix, draw every edge, pop. Returns the number of
    /// edges that survived clipping.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        renderer: &mut Renderer,
        surface: &mut S,
    ) -> TransformResult<usize> {
        renderer.push_matrix(self.model_matrix)?;
        let projected = renderer.project(&self.vertices);

        let mut drawn = 0;
        for (i, &(a, b)) in CUBE_EDGES.iter().enumerate() {
            if renderer.draw_line(surface, &projected[a], &projected[b], edge_color(i)) {
                drawn += 1;
            }
        }

        renderer.pop_matrix()?;
        Ok(drawn)
    }
}

/// Near face blue, sides olive, far face red
fn edge_color(edge: usize) -> Rgb {
    match edge {
        0..=3 => Rgb::BLUE,
        4..=7 => Rgb::OLIVE,
        _ => Rgb::RED,
    }
}

/// Floor of cubes: 10 columns across x, 11 rows receding along z
pub fn cube_grid() -> Vec<UnitCube> {
    let (left, front, step) = (-9.0, 1.5, 2.0);
    let mut cubes = Vec::with_capacity(110);
    for i in 0..10 {
        let x = i as f32 * step + left;
        for j in 0..11 {
            let z = j as f32 * step + front;
            cubes.push(UnitCube::new(x, 0.5, z));
        }
    }
    cubes
}

/// Procedural dust field conveying motion through depth-cued displacement.
///
/// Dust lives in integer screen-relative coordinates: `x` and `y` are offsets
/// from the screen centre, `z` runs from 1 (at the viewer) to `max_z`. The
/// motion model is a closed-form approximation of flying through the field,
/// not a projection of real 3D positions.
use std::fmt;
use std::str::FromStr;

use log::debug;
use nalgebra::Vector4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::renderer::{Rgb, Surface};

pub const MAX_DUST_Z: i32 = 500;
pub const NUM_DUSTS: usize = 15;
/// Radius of a dust grain sitting at `z = 0`
pub const MAX_DUST_SIZE: f32 = 5.0;

/// Keeps `x` and `z` off zero in the motion formulas
const EPSILON: f64 = 1e-10;
const ROLL_GAIN: f64 = 2.4;
const PITCH_GAIN: f64 = 1024.0;
const PITCH_COUPLING: f64 = 256.0;
const STRAFE_GAIN: f64 = 128.0;

/// Direction the viewer is looking relative to travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Front,
    Rear,
    Left,
    Right,
}

impl View {
    pub const ALL: [View; 4] = [View::Front, View::Rear, View::Left, View::Right];

    fn speed_sign(self) -> f64 {
        match self {
            View::Rear => -1.0,
            _ => 1.0,
        }
    }

    fn roll_sign(self) -> f64 {
        match self {
            View::Rear | View::Right => -1.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Front => "FRONT",
            View::Rear => "REAR",
            View::Left => "LEFT",
            View::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(View::Front),
            "rear" => Ok(View::Rear),
            "left" => Ok(View::Left),
            "right" => Ok(View::Right),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

/// One dust grain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dust {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Dust {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn homogeneous(&self) -> Vector4<i32> {
        Vector4::new(self.x, self.y, self.z, 1)
    }
}

/// Fixed-size pool of dust, respawned instead of destroyed
pub struct DustField {
    origin_x: i32,
    origin_y: i32,
    max_z: i32,
    view: View,
    dusts: Vec<Dust>,
    rng: StdRng,
}

impl DustField {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_rng(width, height, NUM_DUSTS, StdRng::from_entropy())
    }

    /// Deterministic field, for replays and tests
    pub fn with_seed(width: u32, height: u32, num_dusts: usize, seed: u64) -> Self {
        Self::with_rng(width, height, num_dusts, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(width: u32, height: u32, num_dusts: usize, rng: StdRng) -> Self {
        let half = |extent: u32| ((extent as f64 / 2.0).round_ties_even() as i32).max(1);
        let mut field = Self {
            origin_x: half(width),
            origin_y: half(height),
            max_z: MAX_DUST_Z,
            view: View::Front,
            dusts: Vec::with_capacity(num_dusts),
            rng,
        };
        for _ in 0..num_dusts {
            let dust = field.spawn_dust();
            field.dusts.push(dust);
        }
        field
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Switch view; every grain is resampled
    pub fn set_view(&mut self, view: View) {
        debug!("dust view {}", view);
        self.view = view;
        self.reset_dusts();
    }

    pub fn reset_dusts(&mut self) {
        for i in 0..self.dusts.len() {
            self.dusts[i] = self.spawn_dust();
        }
    }

    pub fn dusts(&self) -> &[Dust] {
        &self.dusts
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub fn max_z(&self) -> i32 {
        self.max_z
    }

    fn spawn_dust(&mut self) -> Dust {
        Dust::new(
            self.rng.gen_range(1 - self.origin_x..self.origin_x),
            self.rng.gen_range(1 - self.origin_y..self.origin_y),
            self.rng.gen_range(1..=self.max_z),
        )
    }

    /// Whether a grain is inside the viewport volume
    pub fn contains(&self, dust: &Dust) -> bool {
        dust.x > -self.origin_x
            && dust.x < self.origin_x
            && dust.y > -self.origin_y
            && dust.y < self.origin_y
            && dust.z >= 1
            && dust.z <= self.max_z
    }

    /// Advance one grain; a grain that leaves the volume is replaced by a
    /// freshly spawned one.
    pub fn move_dust(&mut self, dust: Dust, alpha: f32, beta: f32, speed: f32) -> Dust {
        let moved = self.step(dust, alpha as f64, beta as f64, speed as f64);
        if self.contains(&moved) {
            moved
        } else {
            self.spawn_dust()
        }
    }

    pub fn move_dusts(&mut self, alpha: f32, beta: f32, speed: f32) {
        for i in 0..self.dusts.len() {
            self.dusts[i] = self.move_dust(self.dusts[i], alpha, beta, speed);
        }
    }

    fn step(&self, dust: Dust, alpha: f64, beta: f64, speed: f64) -> Dust {
        let (x, y, z) = (dust.x as f64, dust.y as f64, dust.z as f64);
        let xe = x + EPSILON;
        let ze = z + EPSILON;
        let s = speed * self.view.speed_sign();
        let r_mod = self.view.roll_sign();

        let (nx, ny, nz) = match self.view {
            View::Front | View::Rear => {
                let x_roll = -alpha * y * ROLL_GAIN * r_mod;
                let y_roll = alpha * xe * ROLL_GAIN * r_mod;
                let x_pitch = 2.0 * (beta * y / PITCH_COUPLING).powi(2);
                let y_pitch = -beta * PITCH_GAIN * r_mod;
                let q = s / ze + 1.0;

                (q * x + x_roll + x_pitch, q * y + y_roll + y_pitch, z / q)
            }
            View::Left | View::Right => {
                let y_roll = -alpha * PITCH_GAIN * r_mod;
                let x_pitch = beta * y * r_mod;
                let y_pitch = -beta * xe * r_mod;
                let d = -STRAFE_GAIN * s / ze * r_mod;

                (x + d + x_pitch, y + y_roll + y_pitch, z)
            }
        };

        // Non-finite results saturate or become 0 and fail the bounds check
        Dust::new(
            nx.round_ties_even() as i32,
            ny.round_ties_even() as i32,
            nz.round_ties_even() as i32,
        )
    }

    /// Radius shrinking linearly from `MAX_DUST_SIZE` at `z = 0` to nothing at `max_z`
    pub fn dust_size(&self, dust: &Dust) -> f32 {
        MAX_DUST_SIZE / self.max_z as f32 * (self.max_z - dust.z) as f32
    }

    /// Grains in surface pixels (centre-relative offsets moved to the
    /// origin) with their radii
    pub fn screen_points(&self) -> impl Iterator<Item = ((i32, i32), f32)> + '_ {
        self.dusts
            .iter()
            .map(|d| ((d.x + self.origin_x, d.y + self.origin_y), self.dust_size(d)))
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, color: Rgb) {
        for (centre, radius) in self.screen_points() {
            surface.draw_circle(centre, radius, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(view: View) -> DustField {
        let mut field = DustField::with_seed(800, 600, NUM_DUSTS, 7);
        field.set_view(view);
        field
    }

    fn in_volume(field: &DustField, dust: &Dust) -> bool {
        let (ox, oy) = field.origin();
        (-ox..ox).contains(&dust.x)
            && (-oy..oy).contains(&dust.y)
            && (1..=field.max_z()).contains(&dust.z)
    }

    #[test]
    fn test_field_creation() {
        let field = DustField::with_seed(800, 600, 15, 1);
        assert_eq!(field.origin(), (400, 300));
        assert_eq!(field.dusts().len(), 15);
        assert_eq!(field.view(), View::Front);
        assert!(field.dusts().iter().all(|d| in_volume(&field, d)));
    }

    #[test]
    fn test_front_and_rear_scale_with_depth() {
        let mut front = field(View::Front);
        assert_eq!(front.move_dust(Dust::new(10, 20, 100), 0.0, 0.0, 10.0), Dust::new(11, 22, 91));

        let mut rear = field(View::Rear);
        assert_eq!(rear.move_dust(Dust::new(10, 20, 100), 0.0, 0.0, 10.0), Dust::new(9, 18, 111));
    }

    #[test]
    fn test_side_views_strafe() {
        let mut left = field(View::Left);
        assert_eq!(left.move_dust(Dust::new(10, 20, 100), 0.0, 0.0, 10.0), Dust::new(-3, 20, 100));

        let mut right = field(View::Right);
        assert_eq!(right.move_dust(Dust::new(10, 20, 100), 0.0, 0.0, 10.0), Dust::new(23, 20, 100));
    }

    #[test]
    fn test_front_roll_and_pitch() {
        let mut front = field(View::Front);
        assert_eq!(front.move_dust(Dust::new(10, 20, 100), 0.1, 0.0, 0.0), Dust::new(5, 22, 100));
        assert_eq!(front.move_dust(Dust::new(10, 20, 100), 0.0, 0.01, 0.0), Dust::new(10, 10, 100));

        // Rear flips the roll direction
        let mut rear = field(View::Rear);
        assert_eq!(rear.move_dust(Dust::new(10, 20, 100), 0.1, 0.0, 0.0), Dust::new(15, 18, 100));
    }

    #[test]
    fn test_side_roll_is_depth_independent() {
        let mut left = field(View::Left);
        let near = left.move_dust(Dust::new(0, 0, 10), 0.01, 0.0, 0.0);
        let far = left.move_dust(Dust::new(0, 0, 400), 0.01, 0.0, 0.0);
        assert_eq!(near.y, -10);
        assert_eq!(far.y, -10);
    }

    #[test]
    fn test_out_of_bounds_respawns() {
        let mut front = field(View::Front);
        // Pushed past the right edge
        let moved = front.move_dust(Dust::new(390, 0, 10), 0.0, 0.0, 10.0);
        assert!(in_volume(&front, &moved));
        assert_ne!(moved, Dust::new(780, 0, 5));
    }

    #[test]
    fn test_pool_stays_in_volume() {
        let controls = [
            (0.0, 0.0, 10.0),
            (0.0349, 0.0, 28.0),
            (-0.0349, 0.0174, 2.0),
            (0.0, -0.0174, 0.0),
            (0.02, 0.01, 500.0),
            (0.0, 0.0, -500.0),
        ];
        for view in View::ALL {
            let mut field = DustField::with_seed(800, 600, 50, 42);
            field.set_view(view);
            for (alpha, beta, speed) in controls {
                for _ in 0..200 {
                    field.move_dusts(alpha, beta, speed);
                    assert_eq!(field.dusts().len(), 50);
                    assert!(field.dusts().iter().all(|d| in_volume(&field, d)));
                }
            }
        }
    }

    #[test]
    fn test_set_view_resamples_pool() {
        let mut field = DustField::with_seed(800, 600, NUM_DUSTS, 3);
        let before = field.dusts().to_vec();
        field.set_view(View::Left);
        let first = field.dusts().to_vec();
        field.set_view(View::Left);
        let second = field.dusts().to_vec();

        assert_eq!(field.view(), View::Left);
        assert_ne!(before, first);
        assert_ne!(first, second);
        assert_eq!(second.len(), NUM_DUSTS);
    }

    #[test]
    fn test_dust_size_depth_cue() {
        let field = field(View::Front);
        assert!((field.dust_size(&Dust::new(0, 0, 0)) - MAX_DUST_SIZE).abs() < 1e-5);
        assert_eq!(field.dust_size(&Dust::new(0, 0, MAX_DUST_Z)), 0.0);
        assert!((field.dust_size(&Dust::new(0, 0, 250)) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_screen_points_offset_by_origin() {
        let field = DustField::with_seed(800, 600, 4, 11);
        for ((sx, sy), _) in field.screen_points() {
            assert!((1..800).contains(&sx));
            assert!((1..600).contains(&sy));
        }
    }

    #[test]
    fn test_view_parsing() {
        assert_eq!("front".parse::<View>(), Ok(View::Front));
        assert_eq!("RIGHT".parse::<View>(), Ok(View::Right));
        assert!("up".parse::<View>().is_err());
        assert_eq!(View::Rear.to_string(), "REAR");
    }

    #[test]
    fn test_tiny_viewport_spawns() {
        let field = DustField::with_seed(1, 1, 3, 0);
        assert_eq!(field.origin(), (1, 1));
        assert!(field.dusts().iter().all(|d| d.x == 0 && d.y == 0));
    }
}

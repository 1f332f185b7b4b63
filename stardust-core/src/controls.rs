/// Roll, pitch and speed integration from discrete control actions
use log::debug;

const FULL_ROLL_SECONDS: f32 = 6.0;
const FULL_PITCH_SECONDS: f32 = 12.0;
/// Taps needed to reach full roll or pitch rate
const SUBDIVISIONS: f32 = 16.0;

/// Speed limits for a control scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightCalibration {
    pub initial_speed: f32,
    pub max_speed: f32,
    pub speed_step: f32,
    pub min_speed: f32,
}

impl FlightCalibration {
    /// Coarse throttle that can come to a full stop
    pub fn standard() -> Self {
        Self {
            initial_speed: 10.0,
            max_speed: 28.0,
            speed_step: 2.0,
            min_speed: 0.0,
        }
    }

    /// Fine throttle that never drops below one step
    pub fn fine() -> Self {
        Self {
            initial_speed: 10.0,
            max_speed: 10.0,
            speed_step: 0.5,
            min_speed: 0.5,
        }
    }
}

impl Default for FlightCalibration {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-frame roll rate `alpha`, pitch rate `beta` and `speed`.
///
/// Rates are in radians per frame. Asking for the opposite direction of a
/// non-zero rate first brings it back to zero.
#[derive(Debug, Clone)]
pub struct FlightControls {
    pub alpha: f32,
    pub beta: f32,
    pub speed: f32,
    a_max: f32,
    b_max: f32,
    a_step: f32,
    b_step: f32,
    calibration: FlightCalibration,
}

impl FlightControls {
    pub fn new(fps: u32) -> Self {
        Self::with_calibration(fps, FlightCalibration::default())
    }

    pub fn with_calibration(fps: u32, calibration: FlightCalibration) -> Self {
        let fps = fps.max(1) as f32;
        let a_max = (360.0 / FULL_ROLL_SECONDS / fps).to_radians();
        let b_max = (360.0 / FULL_PITCH_SECONDS / fps).to_radians();
        let controls = Self {
            alpha: 0.0,
            beta: 0.0,
            speed: calibration.initial_speed,
            a_max,
            b_max,
            a_step: a_max / SUBDIVISIONS,
            b_step: b_max / SUBDIVISIONS,
            calibration,
        };
        debug!(
            "flight controls: roll step {:.5}, pitch step {:.5}",
            controls.a_step, controls.b_step
        );
        controls
    }

    pub fn roll_left(&mut self) {
        self.alpha = if self.alpha >= 0.0 {
            round_to(self.alpha + self.a_step, 5).min(self.a_max)
        } else {
            0.0
        };
    }

    pub fn roll_right(&mut self) {
        self.alpha = if self.alpha <= 0.0 {
            round_to(self.alpha - self.a_step, 5).max(-self.a_max)
        } else {
            0.0
        };
    }

    pub fn pitch_up(&mut self) {
        self.beta = if self.beta <= 0.0 {
            round_to(self.beta - self.b_step, 5).max(-self.b_max)
        } else {
            0.0
        };
    }

    pub fn pitch_down(&mut self) {
        self.beta = if self.beta >= 0.0 {
            round_to(self.beta + self.b_step, 5).min(self.b_max)
        } else {
            0.0
        };
    }

    pub fn faster(&mut self) {
        self.speed = round_to(self.speed + self.calibration.speed_step, 2).min(self.calibration.max_speed);
    }

    pub fn slower(&mut self) {
        self.speed = round_to(self.speed - self.calibration.speed_step, 2).max(self.calibration.min_speed);
    }

    pub fn max_alpha(&self) -> f32 {
        self.a_max
    }

    pub fn max_beta(&self) -> f32 {
        self.b_max
    }

    pub fn calibration(&self) -> &FlightCalibration {
        &self.calibration
    }
}

fn round_to(value: f32, places: i32) -> f32 {
    let scale = 10f32.powi(places);
    (value * scale).round() / scale
}

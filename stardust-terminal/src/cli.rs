// cli.rs - Command-line interface configuration
use clap::{Parser, ValueEnum};
use stardust_core::{FlightCalibration, View};

use crate::{AppConfig, Scene};

#[derive(Parser, Debug, Clone)]
#[command(name = "stardust-terminal")]
#[command(about = "Wireframe and dust-field renderer for the terminal", long_about = None)]
pub struct Cli {
    /// What to fly through
    #[arg(long, value_enum, default_value_t = Scene::Dust)]
    pub scene: Scene,

    /// Target frame rate
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Initial dust view: front, rear, left or right
    #[arg(long, default_value = "front")]
    pub view: View,

    /// Number of dust grains
    #[arg(long, default_value_t = stardust_core::dust::NUM_DUSTS)]
    pub dusts: usize,

    /// Seed for a repeatable dust field
    #[arg(long)]
    pub seed: Option<u64>,

    /// Throttle calibration
    #[arg(long, value_enum, default_value_t = Calibration::Standard)]
    pub calibration: Calibration,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibration {
    Standard,
    Fine,
}

impl From<Calibration> for FlightCalibration {
    fn from(calibration: Calibration) -> Self {
        match calibration {
            Calibration::Standard => FlightCalibration::standard(),
            Calibration::Fine => FlightCalibration::fine(),
        }
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            scene: cli.scene,
            fps: cli.fps.max(1),
            view: cli.view,
            dusts: cli.dusts,
            seed: cli.seed,
            calibration: cli.calibration.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["stardust-terminal"]);
        let config = AppConfig::from(cli);
        assert_eq!(config.scene, Scene::Dust);
        assert_eq!(config.fps, 30);
        assert_eq!(config.view, View::Front);
        assert_eq!(config.dusts, 15);
        assert_eq!(config.seed, None);
        assert_eq!(config.calibration, FlightCalibration::standard());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "stardust-terminal",
            "--scene",
            "cubes",
            "--fps",
            "0",
            "--view",
            "rear",
            "--seed",
            "4",
            "--calibration",
            "fine",
        ]);
        let config = AppConfig::from(cli);
        assert_eq!(config.scene, Scene::Cubes);
        assert_eq!(config.fps, 1);
        assert_eq!(config.view, View::Rear);
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.calibration, FlightCalibration::fine());
    }
}

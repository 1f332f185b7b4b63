/// Terminal frontend: frame loop, key mapping and HUD around the core pipeline
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use stardust_core::geometry::cube_grid;
use stardust_core::{
    Camera, CameraState, Delta, DustField, FlightCalibration, FlightControls, Frustum, Renderer,
    Rgb, UnitCube, View,
};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod cli;
pub mod renderer;

pub use renderer::{CharCanvas, CELL_ASPECT};

const HELP_LINES: &[&str] = &[
    "UP, DOWN, LEFT, RIGHT - Move",
    "SPACE / SLASH - Forward / Back",
    "s / x - Pitch",
    "< / > - Roll",
    "[ / ] - Yaw",
    "1-4 - Dust view",
    "h - Help toggle",
    "q - Quit",
];

/// Which scene the app flies through
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Dust field steered by flight controls
    Dust,
    /// Grid of spinning wireframe cubes seen through the camera
    Cubes,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scene: Scene,
    pub fps: u32,
    pub view: View,
    pub dusts: usize,
    pub seed: Option<u64>,
    pub calibration: FlightCalibration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scene: Scene::Dust,
            fps: 30,
            view: View::Front,
            dusts: stardust_core::dust::NUM_DUSTS,
            seed: None,
            calibration: FlightCalibration::standard(),
        }
    }
}

/// Live state of the running scene
enum SceneState {
    Dust {
        field: DustField,
        controls: FlightControls,
    },
    Cubes {
        renderer: Renderer,
        cubes: Vec<UnitCube>,
        delta: Delta,
        rng: StdRng,
        sample: bool,
    },
}

impl SceneState {
    fn new(config: &AppConfig, width: usize, height: usize) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        match config.scene {
            Scene::Dust => {
                let mut field = DustField::with_rng(width as u32, height as u32, config.dusts, rng);
                field.set_view(config.view);
                Ok(SceneState::Dust {
                    field,
                    controls: FlightControls::with_calibration(config.fps, config.calibration),
                })
            }
            Scene::Cubes => {
                let (origin_x, origin_y) = (width as f32 / 2.0, height as f32 / 2.0);
                let frustum = Frustum::with_aspect(origin_x / origin_y / CELL_ASPECT);
                let camera = Camera::new(CameraState::default())?;
                Ok(SceneState::Cubes {
                    renderer: Renderer::with_frustum(origin_x, origin_y, camera, frustum),
                    cubes: cube_grid(),
                    delta: Delta::new(),
                    rng,
                    sample: true,
                })
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match self {
            SceneState::Dust { field, controls } => match code {
                KeyCode::Char('1') => field.set_view(View::Front),
                KeyCode::Char('2') => field.set_view(View::Rear),
                KeyCode::Char('3') => field.set_view(View::Left),
                KeyCode::Char('4') => field.set_view(View::Right),
                KeyCode::Char(',') => controls.roll_left(),
                KeyCode::Char('.') => controls.roll_right(),
                KeyCode::Char('s') => controls.pitch_down(),
                KeyCode::Char('x') => controls.pitch_up(),
                KeyCode::Char(' ') => controls.faster(),
                KeyCode::Char('/') => controls.slower(),
                _ => {}
            },
            SceneState::Cubes { delta, .. } => match code {
                KeyCode::Up => delta.set(0.0, 0.0, 0.0, 0.0, 0.1, 0.0),
                KeyCode::Down => delta.set(0.0, 0.0, 0.0, 0.0, -0.1, 0.0),
                KeyCode::Right => delta.set(0.0, 0.0, 0.0, 0.1, 0.0, 0.0),
                KeyCode::Left => delta.set(0.0, 0.0, 0.0, -0.1, 0.0, 0.0),
                KeyCode::Char(' ') => delta.set(0.0, 0.0, 0.0, 0.0, 0.0, 0.1),
                KeyCode::Char('/') => delta.set(0.0, 0.0, 0.0, 0.0, 0.0, -0.1),
                KeyCode::Char(',') => delta.set(5.0, 0.0, 0.0, 0.0, 0.0, 0.0),
                KeyCode::Char('.') => delta.set(-5.0, 0.0, 0.0, 0.0, 0.0, 0.0),
                KeyCode::Char('s') => delta.set(0.0, 5.0, 0.0, 0.0, 0.0, 0.0),
                KeyCode::Char('x') => delta.set(0.0, -5.0, 0.0, 0.0, 0.0, 0.0),
                KeyCode::Char(']') => delta.set(0.0, 0.0, 5.0, 0.0, 0.0, 0.0),
                KeyCode::Char('[') => delta.set(0.0, 0.0, -5.0, 0.0, 0.0, 0.0),
                _ => {}
            },
        }
    }

    fn update(&mut self) -> Result<()> {
        match self {
            SceneState::Dust { field, controls } => {
                field.move_dusts(controls.alpha, controls.beta, controls.speed);
            }
            SceneState::Cubes {
                renderer,
                delta,
                sample,
                ..
            } => {
                // Camera input is taken every other frame
                if *sample {
                    renderer.camera_mut().consume(delta)?;
                }
                *sample = !*sample;
            }
        }
        Ok(())
    }

    fn draw(&mut self, canvas: &mut CharCanvas) -> Result<()> {
        match self {
            SceneState::Dust { field, .. } => field.draw(canvas, Rgb::WHITE),
            SceneState::Cubes {
                renderer,
                cubes,
                rng,
                ..
            } => {
                renderer.begin_draw()?;
                for cube in cubes.iter_mut() {
                    cube.update(rng);
                    cube.draw(renderer, canvas)?;
                }
                renderer.end_draw();
            }
        }
        Ok(())
    }

    fn status(&self, fps: f32) -> String {
        match self {
            SceneState::Dust { field, controls } => format!(
                "fps: {:.1}, view: {}, s: {}, a: {}, b: {} | h - HELP",
                fps,
                field.view(),
                controls.speed,
                controls.alpha,
                controls.beta
            ),
            SceneState::Cubes { .. } => format!("fps: {:.1}; h - HELP", fps),
        }
    }
}

/// Main application struct for the terminal renderer
pub struct TerminalApp {
    config: AppConfig,
    scene: SceneState,
    canvas: CharCanvas,
    running: bool,
    help: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: AppConfig) -> Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, width as usize, height as usize)
    }

    /// Build the app for a canvas of `width` x `height` cells
    pub fn with_size(config: AppConfig, width: usize, height: usize) -> Result<Self> {
        let scene = SceneState::new(&config, width, height)?;
        info!("{:?} scene on {}x{} cells at {} fps", config.scene, width, height, config.fps);

        Ok(Self {
            config,
            scene,
            canvas: CharCanvas::new(width, height),
            running: true,
            help: false,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_secs_f64(1.0 / self.config.fps as f64);

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                if let Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    ..
                }) = event::read()?
                {
                    self.handle_key(code);
                }
            }

            self.step()?;
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('h') => self.help = !self.help,
            _ if !self.help => self.scene.handle_key(code),
            _ => {}
        }
    }

    /// Advance the simulation and rasterize one frame into the canvas
    pub fn step(&mut self) -> Result<()> {
        self.canvas.clear();
        if self.help {
            return Ok(());
        }
        self.scene.update()?;
        self.scene.draw(&mut self.canvas)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn canvas(&self) -> &CharCanvas {
        &self.canvas
    }

    fn render(&mut self) -> Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.canvas.draw(&mut stdout)?;

        if self.help {
            let top = (self.canvas.height() / 2).saturating_sub(HELP_LINES.len() / 2);
            for (i, line) in HELP_LINES.iter().enumerate() {
                let left = (self.canvas.width() / 2).saturating_sub(line.len() / 2);
                queue!(
                    stdout,
                    cursor::MoveTo(left as u16, (top + i) as u16),
                    SetForegroundColor(Color::Yellow),
                    Print(line)
                )?;
            }
        }

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(self.scene.status(self.fps)),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

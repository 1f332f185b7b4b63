/// Stardust Web - canvas 2D frontend for the dust field and the cube scene
///
/// Both scenes draw through `CanvasRenderingContext2d`; the host page drives
/// them by calling `frame()` from `requestAnimationFrame` and forwarding keys.
use rand::rngs::StdRng;
use rand::SeedableRng;
use stardust_core::geometry::cube_grid;
use stardust_core::{
    Camera, CameraState, Delta, DustField, FlightControls, Renderer, Rgb, Surface, UnitCube, View,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const BACKGROUND: &str = "rgb(0,0,0)";

fn css_color(color: Rgb) -> String {
    let Rgb(r, g, b) = color;
    format!("rgb({},{},{})", r, g, b)
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Look up a canvas by element id and return it with its 2D context
fn canvas_context(canvas_id: &str) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", canvas_id)))?
        .dyn_into::<HtmlCanvasElement>()?;
    let context = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((canvas, context))
}

/// `Surface` over a 2D canvas context
struct CanvasSurface<'a> {
    context: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    fn clear(&self, width: f64, height: f64) {
        self.context.set_fill_style(&JsValue::from_str(BACKGROUND));
        self.context.fill_rect(0.0, 0.0, width, height);
    }
}

impl Surface for CanvasSurface<'_> {
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb) {
        self.context.set_stroke_style(&JsValue::from_str(&css_color(color)));
        self.context.begin_path();
        self.context.move_to(from.0 as f64, from.1 as f64);
        self.context.line_to(to.0 as f64, to.1 as f64);
        self.context.stroke();
    }

    fn draw_circle(&mut self, centre: (i32, i32), radius: f32, color: Rgb) {
        self.context.set_fill_style(&JsValue::from_str(&css_color(color)));
        self.context.begin_path();
        let arc = self.context.arc(
            centre.0 as f64,
            centre.1 as f64,
            radius.max(0.5) as f64,
            0.0,
            std::f64::consts::TAU,
        );
        if arc.is_ok() {
            self.context.fill();
        }
    }
}

#[wasm_bindgen]
pub struct WebDustField {
    context: CanvasRenderingContext2d,
    width: u32,
    height: u32,
    field: DustField,
    controls: FlightControls,
}

#[wasm_bindgen]
impl WebDustField {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, fps: u32) -> Result<WebDustField, JsValue> {
        let (canvas, context) = canvas_context(canvas_id)?;
        let (width, height) = (canvas.width(), canvas.height());
        Ok(WebDustField {
            context,
            width,
            height,
            field: DustField::new(width, height),
            controls: FlightControls::new(fps),
        })
    }

    /// Switch view by name: front, rear, left or right
    pub fn set_view(&mut self, view: &str) -> Result<(), JsValue> {
        let view: View = view.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.field.set_view(view);
        Ok(())
    }

    pub fn view(&self) -> String {
        self.field.view().to_string()
    }

    pub fn roll_left(&mut self) {
        self.controls.roll_left();
    }

    pub fn roll_right(&mut self) {
        self.controls.roll_right();
    }

    pub fn pitch_up(&mut self) {
        self.controls.pitch_up();
    }

    pub fn pitch_down(&mut self) {
        self.controls.pitch_down();
    }

    pub fn faster(&mut self) {
        self.controls.faster();
    }

    pub fn slower(&mut self) {
        self.controls.slower();
    }

    pub fn speed(&self) -> f32 {
        self.controls.speed
    }

    /// Move every grain one frame and repaint
    pub fn frame(&mut self) {
        self.field
            .move_dusts(self.controls.alpha, self.controls.beta, self.controls.speed);

        let mut surface = CanvasSurface {
            context: &self.context,
        };
        surface.clear(self.width as f64, self.height as f64);
        self.field.draw(&mut surface, Rgb::WHITE);
    }
}

#[wasm_bindgen]
pub struct WebCubes {
    context: CanvasRenderingContext2d,
    width: u32,
    height: u32,
    renderer: Renderer,
    cubes: Vec<UnitCube>,
    delta: Delta,
    rng: StdRng,
    sample: bool,
}

#[wasm_bindgen]
impl WebCubes {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebCubes, JsValue> {
        let (canvas, context) = canvas_context(canvas_id)?;
        let (width, height) = (canvas.width(), canvas.height());
        let camera = Camera::new(CameraState::default()).map_err(to_js)?;
        Ok(WebCubes {
            context,
            width,
            height,
            renderer: Renderer::new(width as f32 / 2.0, height as f32 / 2.0, camera),
            cubes: cube_grid(),
            delta: Delta::new(),
            rng: StdRng::from_entropy(),
            sample: true,
        })
    }

    /// Queue a camera move; zero components leave the pending value alone
    pub fn move_camera(
        &mut self,
        roll: f32,
        pitch: f32,
        yaw: f32,
        x_offset: f32,
        y_offset: f32,
        z_offset: f32,
    ) {
        self.delta.set(roll, pitch, yaw, x_offset, y_offset, z_offset);
    }

    /// Spin the cubes and repaint; camera input is applied every other frame
    pub fn frame(&mut self) -> Result<(), JsValue> {
        if self.sample {
            self.renderer
                .camera_mut()
                .consume(&mut self.delta)
                .map_err(to_js)?;
        }
        self.sample = !self.sample;

        let mut surface = CanvasSurface {
            context: &self.context,
        };
        surface.clear(self.width as f64, self.height as f64);

        self.renderer.begin_draw().map_err(to_js)?;
        for cube in self.cubes.iter_mut() {
            cube.update(&mut self.rng);
            cube.draw(&mut self.renderer, &mut surface).map_err(to_js)?;
        }
        self.renderer.end_draw();
        Ok(())
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    Ok(())
}

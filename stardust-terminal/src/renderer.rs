/// Character-cell raster surface for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use stardust_core::{Rgb, Surface};
use std::io::Write;

/// Glyphs for dust from far (small) to near (large)
const DUST_RAMP: &[char] = &['.', '·', '+', '*', 'o', '@'];

/// A terminal cell is about twice as tall as it is wide
pub const CELL_ASPECT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Rgb,
}

/// Grid of coloured glyphs; `(0, 0)` is the top-left cell
pub struct CharCanvas {
    width: usize,
    height: usize,
    cells: Vec<Option<Cell>>,
}

impl CharCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn glyph_at(&self, x: usize, y: usize) -> Option<char> {
        self.cells.get(y * self.width + x).copied().flatten().map(|c| c.glyph)
    }

    fn plot(&mut self, x: i32, y: i32, glyph: char, color: Rgb) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.cells[idx] = Some(Cell { glyph, color });
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            for x in 0..self.width {
                match self.cells[y * self.width + x] {
                    Some(cell) => {
                        if current != Some(cell.color) {
                            let Rgb(r, g, b) = cell.color;
                            writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                            current = Some(cell.color);
                        }
                        writer.queue(Print(cell.glyph))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Surface for CharCanvas {
    /// Bresenham line with a glyph picked from the overall slope
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb) {
        // Ends this far out come from points grazing the near plane
        let bound = 4 * (self.width + self.height) as u32;
        if [from.0, from.1, to.0, to.1].iter().any(|v| v.unsigned_abs() > bound) {
            return;
        }

        let glyph = line_glyph(from, to);
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, glyph, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Filled disc, squashed vertically to the cell aspect
    fn draw_circle(&mut self, centre: (i32, i32), radius: f32, color: Rgb) {
        let level = (radius.max(0.0) / 5.0 * (DUST_RAMP.len() - 1) as f32).round() as usize;
        let glyph = DUST_RAMP[level.min(DUST_RAMP.len() - 1)];

        let (cx, cy) = centre;
        let rx = (radius / 2.0).floor() as i32;
        let ry = (radius / 2.0 / CELL_ASPECT).floor() as i32;
        for y in -ry..=ry {
            for x in -rx..=rx {
                let (fx, fy) = (x as f32, y as f32 * CELL_ASPECT);
                if fx * fx + fy * fy <= (radius / 2.0).powi(2) || (x == 0 && y == 0) {
                    self.plot(cx + x, cy + y, glyph, color);
                }
            }
        }
    }
}

fn line_glyph(from: (i32, i32), to: (i32, i32)) -> char {
    let dx = (to.0 - from.0) as f32;
    let dy = (to.1 - from.1) as f32;
    if dy.abs() * CELL_ASPECT < dx.abs() * 0.5 {
        '-'
    } else if dx.abs() < dy.abs() * CELL_ASPECT * 0.25 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

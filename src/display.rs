/// Terminal back end for the game's `Surface`: all crossterm output lives here.
///
/// The playfield is kept as a pixel grid and shown with half-block
/// characters, two vertically stacked pixels per terminal cell.  Text is
/// an overlay on whole cells and is wiped by any fill that touches its
/// cell.  `present` only rewrites cells whose content changed since the
/// previous frame.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color as TermColor, Print},
    QueueableCommand,
};
use pocket_shooter::platform::{Color, Surface};

const UPPER_HALF: char = '▀';

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Black => TermColor::Black,
        Color::White => TermColor::White,
        Color::Blue => TermColor::Blue,
        Color::Red => TermColor::Red,
        Color::Magenta => TermColor::Magenta,
        Color::Yellow => TermColor::Yellow,
        Color::Cyan => TermColor::Cyan,
        Color::Green => TermColor::Green,
    }
}

/// What one terminal cell shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Pixels { top: Color, bottom: Color },
    Glyph { ch: char, color: Color },
}

pub struct TerminalSurface<W: Write> {
    out: W,
    width: i32,
    height: i32,
    pixels: Vec<Color>,
    glyphs: Vec<Option<(char, Color)>>,
    shown: Vec<Option<Cell>>,
}

impl<W: Write> TerminalSurface<W> {
    /// `width` x `height` pixels; the terminal needs `width` columns and
    /// half as many rows, rounded up.
    pub fn new(out: W, width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let cells = (width * Self::rows_for(height)) as usize;
        Self {
            out,
            width,
            height,
            pixels: vec![Color::Black; (width * height) as usize],
            glyphs: vec![None; cells],
            shown: vec![None; cells],
        }
    }

    fn rows_for(height: i32) -> i32 {
        (height + 1) / 2
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.pixels[(y * self.width + x) as usize] = color;
        self.glyphs[((y / 2) * self.width + x) as usize] = None;
    }

    fn pixel(&self, x: i32, y: i32) -> Color {
        if y >= self.height {
            return Color::Black;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    fn cell(&self, x: i32, row: i32) -> Cell {
        match self.glyphs[(row * self.width + x) as usize] {
            Some((ch, color)) => Cell::Glyph { ch, color },
            None => Cell::Pixels {
                top: self.pixel(x, row * 2),
                bottom: self.pixel(x, row * 2 + 1),
            },
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (x0, x1) = (x0.min(x1).max(0), x0.max(x1).min(self.width - 1));
        let (y0, y1) = (y0.min(y1).max(0), y0.max(y1).min(self.height - 1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.set_pixel(x, y, color);
    }

    fn draw_circle_outline(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        let (mut dx, mut dy) = (r, 0);
        let mut err = 1 - r;
        while dx >= dy {
            for (ox, oy) in [(dx, dy), (dy, dx)] {
                self.set_pixel(cx + ox, cy + oy, color);
                self.set_pixel(cx - ox, cy + oy, color);
                self.set_pixel(cx + ox, cy - oy, color);
                self.set_pixel(cx - ox, cy - oy, color);
            }
            dy += 1;
            if err < 0 {
                err += 2 * dy + 1;
            } else {
                dx -= 1;
                err += 2 * (dy - dx) + 1;
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color) {
        let row = y / 2;
        if y < 0 || row >= Self::rows_for(self.height) {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let col = x + i as i32;
            if col < 0 || col >= self.width {
                continue;
            }
            self.glyphs[(row * self.width + col) as usize] = Some((ch, color));
        }
    }

    fn clear(&mut self, color: Color) {
        self.pixels.iter_mut().for_each(|p| *p = color);
        self.glyphs.iter_mut().for_each(|g| *g = None);
    }

    fn present(&mut self) -> std::io::Result<()> {
        for row in 0..Self::rows_for(self.height) {
            for x in 0..self.width {
                let cell = self.cell(x, row);
                let index = (row * self.width + x) as usize;
                if self.shown[index] == Some(cell) {
                    continue;
                }
                self.out.queue(cursor::MoveTo(x as u16, row as u16))?;
                match cell {
                    Cell::Pixels { top, bottom } => {
                        self.out.queue(style::SetForegroundColor(term_color(top)))?;
                        self.out.queue(style::SetBackgroundColor(term_color(bottom)))?;
                        self.out.queue(Print(UPPER_HALF))?;
                    }
                    Cell::Glyph { ch, color } => {
                        self.out.queue(style::SetForegroundColor(term_color(color)))?;
                        self.out.queue(style::SetBackgroundColor(TermColor::Black))?;
                        self.out.queue(Print(ch))?;
                    }
                }
                self.shown[index] = Some(cell);
            }
        }
        self.out.queue(style::ResetColor)?;
        self.out.flush()
    }
}

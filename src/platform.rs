//! Collaborators the game core talks to: a pixel display, polled buttons and
//! a monotonic tick counter.  The core only ever sees these traits; the
//! terminal binary and the test harness provide the implementations.

use core::fmt::Write as _;

// ── Colours & geometry ───────────────────────────────────────────────────────

/// The small fixed palette the LCD build shipped with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    Black,
    White,
    Blue,
    Red,
    Magenta,
    Yellow,
    Cyan,
    Green,
}

/// Integer pixel rectangle (top-left corner plus width/height).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn square(x: i32, y: i32, size: i32) -> Self {
        Self::new(x, y, size, size)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// Intersection with `bounds`, or `None` when nothing is left.
    pub fn clip(&self, bounds: &Rect) -> Option<Rect> {
        let x0 = self.x.max(bounds.x);
        let y0 = self.y.max(bounds.y);
        let x1 = (self.x + self.w).min(bounds.x + bounds.w);
        let y1 = (self.y + self.h).min(bounds.y + bounds.h);
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
        }
    }
}

// ── Display ──────────────────────────────────────────────────────────────────

/// Drawing surface.  Coordinates are pixels; `fill_rect` corners are
/// inclusive, matching the LCD driver it stands in for.
pub trait Surface {
    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color);
    fn draw_pixel(&mut self, x: i32, y: i32, color: Color);
    fn draw_circle_outline(&mut self, cx: i32, cy: i32, r: i32, color: Color);
    fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Color);
    fn clear(&mut self, color: Color);

    /// Right-aligned number padded to `digits` columns.
    fn draw_number(&mut self, x: i32, y: i32, value: u32, digits: u8, color: Color) {
        let mut buf = heapless::String::<16>::new();
        // u32 plus padding always fits in 16 bytes for sane digit counts.
        let _ = write!(buf, "{:>width$}", value, width = digits as usize);
        self.draw_text(x, y, &buf, color);
    }

    /// Push the finished frame to the real device.  Surfaces that draw
    /// immediately keep the default.
    fn present(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ── Input ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    /// Three-bullet burst.
    Fire,
    /// Eight-way spread.
    Spread,
    /// Homing shot.
    Track,
}

impl Button {
    pub const ALL: [Button; 7] = [
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Fire,
        Button::Spread,
        Button::Track,
    ];
}

/// Polled button state.  `poll` is called once at the start of every frame,
/// then `button_pressed` any number of times.
pub trait InputSource {
    fn poll(&mut self) {}
    fn button_pressed(&mut self, button: Button) -> bool;
}

// ── Time ─────────────────────────────────────────────────────────────────────

/// Monotonic tick counter used for pacing and FPS measurement.
pub trait TickSource {
    fn now(&self) -> u64;
    fn ticks_per_second(&self) -> u64;
    /// Block until `now() >= deadline`.  A spin loop on bare metal, a sleep
    /// on a desktop.
    fn wait_until(&mut self, deadline: u64);
}

//! Stand-ins for the display, buttons and clock used across the test files.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;

use pocket_shooter::config::{GameConfig, Level};
use pocket_shooter::platform::{Button, Color, InputSource, Rect, Surface, TickSource};

// ── Surface ───────────────────────────────────────────────────────────────────

/// Pixel grid that also counts every drawing call.
pub struct RecordingSurface {
    pub width: i32,
    pub height: i32,
    pixels: Vec<Color>,
    pub fills: u32,
    pub pixel_writes: u32,
    pub circles: u32,
    pub texts: Vec<(i32, i32, String, Color)>,
    pub clears: u32,
    pub presents: u32,
}

impl RecordingSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::Black; (width * height) as usize],
            fills: 0,
            pixel_writes: 0,
            circles: 0,
            texts: Vec::new(),
            clears: 0,
            presents: 0,
        }
    }

    pub fn for_config(config: &GameConfig) -> Self {
        let (w, h) = config.screen_size();
        Self::new(w, h)
    }

    pub fn reset_counters(&mut self) {
        self.fills = 0;
        self.pixel_writes = 0;
        self.circles = 0;
        self.texts.clear();
        self.clears = 0;
    }

    pub fn pixel(&self, x: i32, y: i32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    fn put(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Pixels of `color` inside `rect` (clipped to the surface).
    pub fn count_in(&self, rect: Rect, color: Color) -> usize {
        let mut n = 0;
        for y in rect.y.max(0)..(rect.y + rect.h).min(self.height) {
            for x in rect.x.max(0)..(rect.x + rect.w).min(self.width) {
                if self.pixel(x, y) == color {
                    n += 1;
                }
            }
        }
        n
    }

    /// Non-background pixels inside `rect`.
    pub fn lit_in(&self, rect: Rect) -> usize {
        (rect.w * rect.h).max(0) as usize - self.count_in(rect, Color::Black)
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.fills += 1;
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.put(x, y, color);
            }
        }
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.pixel_writes += 1;
        self.put(x, y, color);
    }

    fn draw_circle_outline(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        self.circles += 1;
        let (mut dx, mut dy) = (r, 0);
        let mut err = 1 - r;
        while dx >= dy {
            for (ox, oy) in [(dx, dy), (dy, dx)] {
                self.put(cx + ox, cy + oy, color);
                self.put(cx - ox, cy + oy, color);
                self.put(cx + ox, cy - oy, color);
                self.put(cx - ox, cy - oy, color);
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
        self.texts.push((x, y, text.to_string(), color));
    }

    fn clear(&mut self, color: Color) {
        self.clears += 1;
        self.pixels.iter_mut().for_each(|p| *p = color);
    }

    fn present(&mut self) -> std::io::Result<()> {
        self.presents += 1;
        Ok(())
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Holds `held` until the script says otherwise; each `poll` takes the next
/// scripted frame, if any.
#[derive(Default)]
pub struct ScriptedInput {
    pub held: Vec<Button>,
    pub script: VecDeque<Vec<Button>>,
    pub polls: u64,
}

impl ScriptedInput {
    pub fn holding(buttons: &[Button]) -> Self {
        Self {
            held: buttons.to_vec(),
            ..Self::default()
        }
    }

    pub fn scripted(frames: Vec<Vec<Button>>) -> Self {
        Self {
            script: frames.into(),
            ..Self::default()
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) {
        self.polls += 1;
        if let Some(next) = self.script.pop_front() {
            self.held = next;
        }
    }

    fn button_pressed(&mut self, button: Button) -> bool {
        self.held.contains(&button)
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Time only moves when asked: every `now()` read costs `work` ticks and
/// `wait_until` jumps straight to the deadline.
pub struct ManualClock {
    now: Cell<u64>,
    pub tps: u64,
    pub work: u64,
    pub waits: u32,
}

impl ManualClock {
    pub fn new(tps: u64) -> Self {
        Self::with_work(tps, 0)
    }

    pub fn with_work(tps: u64, work: u64) -> Self {
        Self {
            now: Cell::new(0),
            tps,
            work,
            waits: 0,
        }
    }

    pub fn peek(&self) -> u64 {
        self.now.get()
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + self.work);
        t
    }

    fn ticks_per_second(&self) -> u64 {
        self.tps
    }

    fn wait_until(&mut self, deadline: u64) {
        self.waits += 1;
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

// ── Configs ───────────────────────────────────────────────────────────────────

/// Medium difficulty with every random spawn and enemy shot switched off,
/// so tests place entities by hand.
pub fn quiet_config() -> GameConfig {
    let mut config = Level::Medium.config();
    config.spawn.enemy_percent = 0;
    config.spawn.formation_percent = 0;
    config.spawn.fire_percent = 0;
    config.spawn.reward_respawn_percent = 0;
    config.spawn.initial_enemies = 0;
    config
}

//! Minimal redraw of the world onto a [`Surface`].
//!
//! `RenderSync` remembers, per pool slot, the sprite it last drew there.
//! Each frame it compares that record with the slot's current entity:
//!
//! 1. every remembered sprite that moved, changed or died contributes its
//!    old rectangle to a dirty list;
//! 2. the dirty list is cleared in one batch;
//! 3. each live entity is drawn once, if it is new, moved, or was touched by
//!    one of the cleared rectangles.
//!
//! Stationary entities nobody disturbed are not redrawn.  If a frame dirties
//! more rectangles than the fixed list holds, the whole playfield is cleared
//! and everything is redrawn.

use heapless::Vec as FixedVec;

use crate::compute::GameWorld;
use crate::config::{
    Playfield, MAX_ENEMIES, MAX_ENEMY_BULLETS, MAX_PLAYER_BULLETS, MAX_TRACKING_BULLETS,
};
use crate::entities::{Body, Shape};
use crate::platform::{Color, Rect, Surface};
use crate::pool::EntityPool;

pub const DIRTY_CAPACITY: usize = 128;
const BACKGROUND: Color = Color::Black;
const HUD_COLOR: Color = Color::White;

/// What was drawn for one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub rect: Rect,
    pub shape: Shape,
    pub color: Color,
}

impl Sprite {
    pub fn of(body: &Body) -> Self {
        Self {
            rect: body.rect(),
            shape: body.shape,
            color: body.color,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub cleared: u32,
    pub drawn: u32,
    pub full_redraw: bool,
}

// ── Drawing helpers ──────────────────────────────────────────────────────────

fn fill_clipped<S: Surface + ?Sized>(surface: &mut S, rect: Rect, bounds: &Rect, color: Color) {
    if let Some(r) = rect.clip(bounds) {
        surface.fill_rect(r.x, r.y, r.x + r.w - 1, r.y + r.h - 1, color);
    }
}

/// Draw `sprite`, clipped to `bounds`.  Every pixel touched lies inside
/// `sprite.rect`.
pub fn draw_sprite<S: Surface + ?Sized>(surface: &mut S, sprite: &Sprite, bounds: &Rect) {
    let Rect { x, y, w, h } = sprite.rect;
    match sprite.shape {
        Shape::SolidSquare => fill_clipped(surface, sprite.rect, bounds, sprite.color),
        Shape::HollowSquare => {
            fill_clipped(surface, Rect::new(x, y, w, 1), bounds, sprite.color);
            fill_clipped(surface, Rect::new(x, y + h - 1, w, 1), bounds, sprite.color);
            if h > 2 {
                fill_clipped(surface, Rect::new(x, y + 1, 1, h - 2), bounds, sprite.color);
                fill_clipped(surface, Rect::new(x + w - 1, y + 1, 1, h - 2), bounds, sprite.color);
            }
        }
        Shape::HollowCircle => {
            let r = (w.min(h) - 1) / 2;
            let (cx, cy) = (x + w / 2, y + h / 2);
            let circle_box = Rect::new(cx - r, cy - r, 2 * r + 1, 2 * r + 1);
            if circle_box.clip(bounds) == Some(circle_box) {
                surface.draw_circle_outline(cx, cy, r, sprite.color);
            } else {
                circle_clipped(surface, cx, cy, r, bounds, sprite.color);
            }
        }
    }
}

/// Midpoint circle plotted pixel by pixel, for outlines that cross the
/// playfield edge.
fn circle_clipped<S: Surface + ?Sized>(
    surface: &mut S,
    cx: i32,
    cy: i32,
    r: i32,
    bounds: &Rect,
    color: Color,
) {
    let mut plot = |px: i32, py: i32| {
        if bounds.contains_point(px, py) {
            surface.draw_pixel(px, py, color);
        }
    };
    let (mut dx, mut dy) = (r, 0);
    let mut err = 1 - r;
    while dx >= dy {
        for (ox, oy) in [(dx, dy), (dy, dx)] {
            plot(cx + ox, cy + oy);
            plot(cx - ox, cy + oy);
            plot(cx + ox, cy - oy);
            plot(cx - ox, cy - oy);
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

// ── Per-pool tracking ────────────────────────────────────────────────────────

struct Track<const N: usize> {
    drawn: [Option<Sprite>; N],
}

impl<const N: usize> Track<N> {
    fn new() -> Self {
        Self { drawn: [None; N] }
    }

    fn forget(&mut self) {
        self.drawn = [None; N];
    }

    /// Push the old rectangle of every slot whose sprite changed.  Returns
    /// `false` when the dirty list overflowed.
    fn collect_dirty<T, F>(
        &self,
        pool: &EntityPool<T, N>,
        body: F,
        dirty: &mut FixedVec<Rect, DIRTY_CAPACITY>,
    ) -> bool
    where
        F: Fn(&T) -> &Body,
    {
        let mut fits = true;
        for (index, prev) in self.drawn.iter().enumerate() {
            let Some(prev) = prev else { continue };
            let now = pool.slot(index).map(|e| Sprite::of(body(e)));
            if now != Some(*prev) && dirty.push(prev.rect).is_err() {
                fits = false;
            }
        }
        fits
    }

    fn draw<T, F, S>(
        &mut self,
        pool: &EntityPool<T, N>,
        body: F,
        dirty: &[Rect],
        redraw_all: bool,
        bounds: &Rect,
        surface: &mut S,
    ) -> u32
    where
        F: Fn(&T) -> &Body,
        S: Surface + ?Sized,
    {
        let mut drawn = 0;
        for index in 0..N {
            let now = pool.slot(index).map(|e| Sprite::of(body(e)));
            let prev = self.drawn[index];
            if let Some(sprite) = now {
                let needs = redraw_all
                    || prev != now
                    || dirty.iter().any(|d| d.intersects(&sprite.rect));
                if needs {
                    draw_sprite(surface, &sprite, bounds);
                    drawn += 1;
                }
            }
            self.drawn[index] = now;
        }
        drawn
    }
}

// ── HUD ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct HudCache {
    fps: Option<u32>,
    entities: Option<u32>,
}

// ── RenderSync ───────────────────────────────────────────────────────────────

pub struct RenderSync {
    player: Option<Sprite>,
    enemies: Track<MAX_ENEMIES>,
    enemy_bullets: Track<MAX_ENEMY_BULLETS>,
    tracking: Track<MAX_TRACKING_BULLETS>,
    player_bullets: Track<MAX_PLAYER_BULLETS>,
    dirty: FixedVec<Rect, DIRTY_CAPACITY>,
    epoch: Option<u32>,
    hud: HudCache,
    pub last: RenderStats,
}

impl Default for RenderSync {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSync {
    pub fn new() -> Self {
        Self {
            player: None,
            enemies: Track::new(),
            enemy_bullets: Track::new(),
            tracking: Track::new(),
            player_bullets: Track::new(),
            dirty: FixedVec::new(),
            epoch: None,
            hud: HudCache::default(),
            last: RenderStats::default(),
        }
    }

    /// Forget everything drawn so far and blank the screen.
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        surface.clear(BACKGROUND);
        self.player = None;
        self.enemies.forget();
        self.enemy_bullets.forget();
        self.tracking.forget();
        self.player_bullets.forget();
        self.dirty.clear();
        self.hud = HudCache::default();
    }

    /// Bring the screen in line with `world`.
    pub fn sync<S: Surface + ?Sized>(&mut self, world: &GameWorld, surface: &mut S) -> RenderStats {
        if self.epoch != Some(world.epoch) {
            self.reset(surface);
            self.epoch = Some(world.epoch);
        }

        let field = world.config.playfield;
        let bounds = playfield_rect(&field);

        // 1. collect
        self.dirty.clear();
        let player_now = Sprite::of(&world.player.body);
        let mut fits = true;
        if let Some(prev) = self.player {
            if prev != player_now && self.dirty.push(prev.rect).is_err() {
                fits = false;
            }
        }
        fits &= self
            .enemies
            .collect_dirty(&world.enemies, |e| &e.body, &mut self.dirty);
        fits &= self
            .enemy_bullets
            .collect_dirty(&world.enemy_bullets, |b| &b.body, &mut self.dirty);
        fits &= self
            .tracking
            .collect_dirty(&world.tracking_bullets, |t| &t.body, &mut self.dirty);
        fits &= self
            .player_bullets
            .collect_dirty(&world.player_bullets, |b| &b.body, &mut self.dirty);

        // 2. clear
        let mut stats = RenderStats {
            full_redraw: !fits,
            ..RenderStats::default()
        };
        if fits {
            for rect in self.dirty.iter() {
                fill_clipped(surface, *rect, &bounds, BACKGROUND);
                stats.cleared += 1;
            }
        } else {
            log::debug!("dirty list overflow, redrawing playfield");
            fill_clipped(surface, bounds, &bounds, BACKGROUND);
            stats.cleared = 1;
        }

        // 3. draw
        let dirty = self.dirty.as_slice();
        let all = !fits;
        stats.drawn += self
            .enemies
            .draw(&world.enemies, |e| &e.body, dirty, all, &bounds, surface);
        stats.drawn += self
            .enemy_bullets
            .draw(&world.enemy_bullets, |b| &b.body, dirty, all, &bounds, surface);
        stats.drawn += self
            .tracking
            .draw(&world.tracking_bullets, |t| &t.body, dirty, all, &bounds, surface);
        stats.drawn += self
            .player_bullets
            .draw(&world.player_bullets, |b| &b.body, dirty, all, &bounds, surface);

        let player_needs = all
            || self.player != Some(player_now)
            || dirty.iter().any(|d| d.intersects(&player_now.rect));
        if player_needs {
            draw_sprite(surface, &player_now, &bounds);
            stats.drawn += 1;
        }
        self.player = Some(player_now);

        self.last = stats;
        stats
    }

    /// Stats column to the right of the playfield; each value is redrawn
    /// only when it changes.
    pub fn draw_hud<S: Surface + ?Sized>(
        &mut self,
        field: &Playfield,
        fps: u32,
        entities: u32,
        surface: &mut S,
    ) {
        let x = field.width + 5;
        if self.hud.fps != Some(fps) {
            surface.fill_rect(x, 0, x + 34, 24, BACKGROUND);
            surface.draw_text(x, 5, "FPS", HUD_COLOR);
            surface.draw_number(x, 20, fps, 2, HUD_COLOR);
            self.hud.fps = Some(fps);
        }
        if self.hud.entities != Some(entities) {
            surface.fill_rect(x, 25, x + 34, 49, BACKGROUND);
            surface.draw_text(x, 35, "ENT", HUD_COLOR);
            surface.draw_number(x, 45, entities, 3, HUD_COLOR);
            self.hud.entities = Some(entities);
        }
    }
}

pub fn playfield_rect(field: &Playfield) -> Rect {
    Rect::new(0, 0, field.width, field.height)
}

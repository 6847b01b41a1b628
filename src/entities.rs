/// Game entity records: plain data, updated by `compute`, `motion` and
/// `spawn`, drawn by `render`.

use glam::Vec2;

use crate::config::{BULLET_SIZE, ENEMY_SIZE, PLAYER_SIZE, TRACKING_BULLET_SIZE};
use crate::motion::Motion;
use crate::platform::{Color, Rect};

// ── Visuals ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    HollowCircle,
    HollowSquare,
    #[default]
    SolidSquare,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::HollowCircle, Shape::HollowSquare, Shape::SolidSquare];
}

/// Position, collision size and look shared by every entity kind.
/// `pos` is the top-left corner; `size` is both the drawn square and the
/// collision box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub size: i32,
    pub shape: Shape,
    pub color: Color,
}

impl Body {
    pub fn new(pos: Vec2, size: i32, shape: Shape, color: Color) -> Self {
        Self { pos, size, shape, color }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size as f32 * 0.5)
    }

    /// Pixel footprint, snapped down to whole pixels.
    pub fn rect(&self) -> Rect {
        Rect::square(self.pos.x.floor() as i32, self.pos.y.floor() as i32, self.size)
    }

    /// Axis-aligned box overlap on the integer sizes.
    pub fn overlaps(&self, other: &Body) -> bool {
        let (s, o) = (self.size as f32, other.size as f32);
        self.pos.x < other.pos.x + o
            && self.pos.x + s > other.pos.x
            && self.pos.y < other.pos.y + o
            && self.pos.y + s > other.pos.y
    }
}

// ── Direction tables ─────────────────────────────────────────────────────────

pub const DIRS_4: [Vec2; 4] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(-1.0, 0.0),
];

/// Diagonals are not normalised; they travel √2 faster than the axes.
pub const DIRS_8: [Vec2; 8] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(-1.0, -1.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(-1.0, 1.0),
];

// cos/sin of k·22.5°
const C1: f32 = 0.923_879_5;
const C2: f32 = 0.707_106_77;
const C3: f32 = 0.382_683_43;

pub const DIRS_16: [Vec2; 16] = [
    Vec2::new(0.0, 1.0),
    Vec2::new(C3, C1),
    Vec2::new(C2, C2),
    Vec2::new(C1, C3),
    Vec2::new(1.0, 0.0),
    Vec2::new(C1, -C3),
    Vec2::new(C2, -C2),
    Vec2::new(C3, -C1),
    Vec2::new(0.0, -1.0),
    Vec2::new(-C3, -C1),
    Vec2::new(-C2, -C2),
    Vec2::new(-C1, -C3),
    Vec2::new(-1.0, 0.0),
    Vec2::new(-C1, C3),
    Vec2::new(-C2, C2),
    Vec2::new(-C3, C1),
];

/// Width of a radial volley.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ways {
    Four,
    Eight,
    Sixteen,
}

impl Ways {
    pub fn table(self) -> &'static [Vec2] {
        match self {
            Ways::Four => &DIRS_4,
            Ways::Eight => &DIRS_8,
            Ways::Sixteen => &DIRS_16,
        }
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Frames left before each fire action may trigger again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cooldowns {
    pub burst: u32,
    pub spread: u32,
    pub tracking: u32,
}

impl Cooldowns {
    pub const BURST: u32 = 5;
    pub const SPREAD: u32 = 20;
    pub const TRACKING: u32 = 30;

    pub fn tick(&mut self) {
        self.burst = self.burst.saturating_sub(1);
        self.spread = self.spread.saturating_sub(1);
        self.tracking = self.tracking.saturating_sub(1);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
    pub speed: f32,
    pub cooldowns: Cooldowns,
}

impl Player {
    pub const SPEED: f32 = 2.0;

    /// Centred horizontally, resting just above the bottom edge.
    pub fn spawn_point(width: i32, height: i32) -> Self {
        let pos = Vec2::new((width / 2) as f32, (height - PLAYER_SIZE - 2) as f32);
        Self {
            body: Body::new(pos, PLAYER_SIZE, Shape::SolidSquare, Color::Blue),
            speed: Self::SPEED,
            cooldowns: Cooldowns::default(),
        }
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Player and enemy bullets share this record; the pool they live in says
/// who fired them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bullet {
    pub body: Body,
    pub motion: Motion,
}

impl Bullet {
    pub fn new(pos: Vec2, shape: Shape, color: Color, motion: Motion) -> Self {
        Self {
            body: Body::new(pos, BULLET_SIZE, shape, color),
            motion,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackingBullet {
    pub body: Body,
    /// Always `Motion::Homing`; the target handle lives inside it.
    pub motion: Motion,
    pub lifetime: u32,
}

impl TrackingBullet {
    pub const LIFETIME: u32 = 300;
    pub const SPEED: f32 = 2.0;

    pub fn new(pos: Vec2, motion: Motion) -> Self {
        Self {
            body: Body::new(pos, TRACKING_BULLET_SIZE, Shape::SolidSquare, Color::Green),
            motion,
            lifetime: Self::LIFETIME,
        }
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Chosen once at spawn; fixes the enemy's colour, shot pattern and fire
/// interval for its whole life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Downward fan of three.
    #[default]
    Gunner,
    /// Single shot aimed at the player; weaves while descending.
    Sniper,
    /// Radial volley.
    Bloomer,
    /// Two lobbed shells that arc under gravity.
    Mortar,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Gunner,
        EnemyKind::Sniper,
        EnemyKind::Bloomer,
        EnemyKind::Mortar,
    ];

    pub fn fire_interval(self) -> u32 {
        match self {
            EnemyKind::Gunner => 40,
            EnemyKind::Sniper => 35,
            EnemyKind::Bloomer => 50,
            EnemyKind::Mortar => 60,
        }
    }

    pub fn color(self) -> Color {
        match self {
            EnemyKind::Gunner => Color::Red,
            EnemyKind::Sniper => Color::Magenta,
            EnemyKind::Bloomer => Color::Yellow,
            EnemyKind::Mortar => Color::Cyan,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub motion: Motion,
    pub shoot_timer: u32,
}

impl Enemy {
    pub fn new(pos: Vec2, kind: EnemyKind, shape: Shape, motion: Motion) -> Self {
        Self {
            body: Body::new(pos, ENEMY_SIZE, shape, kind.color()),
            kind,
            motion,
            shoot_timer: 0,
        }
    }
}

// ── World status ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Hit with `restart_on_death` set; the driver re-initialises next frame.
    PlayerDown,
}

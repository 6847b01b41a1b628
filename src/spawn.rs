//! Timers and dice that feed new enemies and enemy bullets into the pools.

use glam::Vec2;

use crate::config::{
    Playfield, SpawnConfig, BULLET_SIZE, ENEMY_SIZE, MAX_ENEMIES, MAX_ENEMY_BULLETS,
};
use crate::entities::{Bullet, Enemy, EnemyKind, Shape, Ways};
use crate::motion::Motion;
use crate::platform::Color;
use crate::pool::{EntityPool, Handle};
use crate::rng::GameRng;

pub const ENEMY_BULLET_SPEED: f32 = 2.0;
pub const ENEMY_BULLET_COLOR: Color = Color::Yellow;
const GUNNER_FAN: i32 = 3;
const MORTAR_VELOCITY: Vec2 = Vec2::new(0.75, -1.0);
const MORTAR_GRAVITY: f32 = 0.08;
const SNIPER_WEAVE_STEP: f32 = 0.1;
const SNIPER_WEAVE_AMPLITUDE: f32 = 6.0;
const FORMATION_SPACING: i32 = ENEMY_SIZE * 3;

// ── Timers ───────────────────────────────────────────────────────────────────

/// Counts frames up to `interval`, then resets and rolls `percent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnTimer {
    pub elapsed: u32,
    pub interval: u32,
    pub percent: u8,
}

impl SpawnTimer {
    pub fn new(interval: u32, percent: u8) -> Self {
        Self {
            elapsed: 0,
            interval,
            percent,
        }
    }

    /// Advance one frame.  `true` means "spawn now".
    pub fn tick(&mut self, rng: &mut GameRng) -> bool {
        self.elapsed += 1;
        if self.elapsed < self.interval {
            return false;
        }
        self.elapsed = 0;
        rng.roll(self.percent)
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}

// ── Aiming ───────────────────────────────────────────────────────────────────

/// Direction from `from` toward `to`, scaled by an alpha-max-plus-beta-min
/// length estimate (max + min/2) instead of a square root.  The result is
/// within about 12% of unit length.  Points straight down when the two
/// points coincide.
pub fn aim_axis_dominant(from: Vec2, to: Vec2) -> Vec2 {
    let d = to - from;
    let (ax, ay) = (d.x.abs(), d.y.abs());
    let approx = ax.max(ay) + ax.min(ay) * 0.5;
    if approx < f32::EPSILON {
        Vec2::Y
    } else {
        d / approx
    }
}

// ── Director ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SpawnDirector {
    pub enemy_timer: SpawnTimer,
    pub formation_timer: SpawnTimer,
    pub fire_percent: u8,
    pub radial: Ways,
    pub reward_respawn_percent: u8,
    pub speed_range: (f32, f32),
}

impl SpawnDirector {
    pub fn new(cfg: &SpawnConfig) -> Self {
        Self {
            enemy_timer: SpawnTimer::new(cfg.enemy_interval, cfg.enemy_percent),
            formation_timer: SpawnTimer::new(cfg.formation_interval, cfg.formation_percent),
            fire_percent: cfg.fire_percent,
            radial: cfg.radial,
            reward_respawn_percent: cfg.reward_respawn_percent,
            speed_range: (cfg.enemy_speed_min, cfg.enemy_speed_max),
        }
    }

    pub fn reset(&mut self) {
        self.enemy_timer.reset();
        self.formation_timer.reset();
    }

    /// One frame of spawning: global timers first, then every enemy's own
    /// shoot timer.
    pub fn update(
        &mut self,
        enemies: &mut EntityPool<Enemy, MAX_ENEMIES>,
        enemy_bullets: &mut EntityPool<Bullet, MAX_ENEMY_BULLETS>,
        player_center: Vec2,
        field: &Playfield,
        rng: &mut GameRng,
    ) {
        if self.enemy_timer.tick(rng) {
            self.spawn_random_enemy(enemies, field, rng);
        }
        if self.formation_timer.tick(rng) {
            self.spawn_formation(enemies, field, rng);
        }

        let fire_percent = self.fire_percent;
        let radial = self.radial;
        enemies.for_each_active(|_, enemy| {
            enemy.shoot_timer += 1;
            if enemy.shoot_timer < enemy.kind.fire_interval() {
                return;
            }
            enemy.shoot_timer = 0;
            if rng.roll(fire_percent) {
                fire_volley(enemy, radial, enemy_bullets, player_center);
            }
        });
    }

    fn enemy_motion(&self, kind: EnemyKind, start: Vec2, rng: &mut GameRng) -> Motion {
        let speed = rng.between(self.speed_range.0, self.speed_range.1);
        match kind {
            EnemyKind::Sniper => Motion::spiral(
                start,
                Vec2::Y,
                speed,
                SNIPER_WEAVE_STEP,
                SNIPER_WEAVE_AMPLITUDE,
            ),
            _ => Motion::linear(Vec2::Y, speed),
        }
    }

    fn make_enemy(&self, kind: EnemyKind, pos: Vec2, rng: &mut GameRng) -> Enemy {
        let shape = rng.pick(&Shape::ALL).unwrap_or_default();
        let motion = self.enemy_motion(kind, pos, rng);
        let mut enemy = Enemy::new(pos, kind, shape, motion);
        enemy.shoot_timer = rng.below(30) + 15;
        enemy
    }

    /// One enemy of a random kind at a random column, just above the screen.
    pub fn spawn_random_enemy(
        &self,
        enemies: &mut EntityPool<Enemy, MAX_ENEMIES>,
        field: &Playfield,
        rng: &mut GameRng,
    ) -> Option<Handle> {
        if enemies.is_full() {
            return None;
        }
        let kind = rng.pick(&EnemyKind::ALL).unwrap_or_default();
        let x = rng.below((field.width - ENEMY_SIZE).max(1) as u32) as f32;
        let pos = Vec2::new(x, -ENEMY_SIZE as f32);
        let enemy = self.make_enemy(kind, pos, rng);
        enemies.spawn(enemy)
    }

    /// A row of 3 to 5 enemies of one kind at fixed horizontal spacing,
    /// shortened on playfields too narrow to hold the whole row.
    /// Returns how many actually found a slot.
    pub fn spawn_formation(
        &self,
        enemies: &mut EntityPool<Enemy, MAX_ENEMIES>,
        field: &Playfield,
        rng: &mut GameRng,
    ) -> usize {
        let fits = (field.width - ENEMY_SIZE) / FORMATION_SPACING + 1;
        let count = (3 + rng.below(3) as i32).min(fits).max(1);
        let span = (count - 1) * FORMATION_SPACING + ENEMY_SIZE;
        let start = rng.below((field.width - span).max(1) as u32) as i32;
        let kind = rng.pick(&EnemyKind::ALL).unwrap_or_default();

        let mut placed = 0;
        for i in 0..count {
            let pos = Vec2::new((start + i * FORMATION_SPACING) as f32, -ENEMY_SIZE as f32);
            let enemy = self.make_enemy(kind, pos, rng);
            if enemies.spawn(enemy).is_some() {
                placed += 1;
            }
        }
        log::debug!("formation of {:?}: {}/{} placed", kind, placed, count);
        placed
    }

    /// Roll the reward re-spawn once per kill.
    pub fn on_kills(
        &self,
        kills: u32,
        enemies: &mut EntityPool<Enemy, MAX_ENEMIES>,
        field: &Playfield,
        rng: &mut GameRng,
    ) {
        for _ in 0..kills {
            if rng.roll(self.reward_respawn_percent) {
                self.spawn_random_enemy(enemies, field, rng);
            }
        }
    }
}

// ── Volleys ──────────────────────────────────────────────────────────────────

/// Spawn `enemy`'s shot pattern.  Returns the number of bullets placed;
/// bullets that find no free slot are dropped.
pub fn fire_volley(
    enemy: &Enemy,
    radial: Ways,
    bullets: &mut EntityPool<Bullet, MAX_ENEMY_BULLETS>,
    player_center: Vec2,
) -> usize {
    let size = enemy.body.size;
    let muzzle = enemy.body.pos + Vec2::splat((size / 2 - BULLET_SIZE / 2) as f32);
    let shape = enemy.body.shape;
    let shot = |pos: Vec2, motion: Motion| Bullet::new(pos, shape, ENEMY_BULLET_COLOR, motion);

    let mut placed = 0;
    let mut push = |b: Bullet| {
        if bullets.spawn(b).is_some() {
            placed += 1;
        }
    };

    match enemy.kind {
        EnemyKind::Gunner => {
            let y = enemy.body.pos.y + size as f32;
            for i in 0..GUNNER_FAN {
                let dx = ((i - GUNNER_FAN / 2) * (BULLET_SIZE + 1)) as f32;
                push(shot(
                    Vec2::new(muzzle.x + dx, y),
                    Motion::linear(Vec2::Y, ENEMY_BULLET_SPEED),
                ));
            }
        }
        EnemyKind::Sniper => {
            let dir = aim_axis_dominant(enemy.body.center(), player_center);
            push(shot(muzzle, Motion::linear(dir, ENEMY_BULLET_SPEED)));
        }
        EnemyKind::Bloomer => {
            for &dir in radial.table() {
                push(shot(muzzle, Motion::linear(dir, ENEMY_BULLET_SPEED)));
            }
        }
        EnemyKind::Mortar => {
            for sign in [-1.0, 1.0] {
                let vel = Vec2::new(MORTAR_VELOCITY.x * sign, MORTAR_VELOCITY.y);
                push(shot(muzzle, Motion::parabolic(vel, MORTAR_GRAVITY)));
            }
        }
    }
    placed
}

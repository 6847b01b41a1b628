/// The simulation world and its per-frame update.
///
/// `GameWorld` owns every pool, timer and the RNG; nothing is global.  All
/// randomness comes from the world's own seeded RNG, so two worlds built
/// from the same config and fed the same `Controls` stay identical.

use glam::Vec2;

use crate::collision::{CollisionEngine, CollisionReport};
use crate::config::{
    GameConfig, BULLET_SIZE, MAX_ENEMIES, MAX_ENEMY_BULLETS, MAX_PLAYER_BULLETS,
    MAX_TRACKING_BULLETS, PLAYER_SIZE, TRACKING_BULLET_SIZE,
};
use crate::entities::{
    Body, Bullet, Cooldowns, Enemy, GameStatus, Player, Shape, TrackingBullet, DIRS_8,
};
use crate::motion::{Motion, NoTargets, TargetSource};
use crate::platform::{Button, Color, InputSource};
use crate::pool::EntityPool;
use crate::rng::GameRng;
use crate::spawn::SpawnDirector;

const BURST_SHOTS: i32 = 3;
const BURST_SPEED: f32 = 4.0;
const SPREAD_SPEED: f32 = 3.0;

// ── Input snapshot ───────────────────────────────────────────────────────────

/// Buttons held during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    pub spread: bool,
    pub track: bool,
}

impl Controls {
    pub fn read(input: &mut impl InputSource) -> Self {
        Self {
            left: input.button_pressed(Button::Left),
            right: input.button_pressed(Button::Right),
            up: input.button_pressed(Button::Up),
            down: input.button_pressed(Button::Down),
            fire: input.button_pressed(Button::Fire),
            spread: input.button_pressed(Button::Spread),
            track: input.button_pressed(Button::Track),
        }
    }
}

// ── Per-frame summary ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub frame: u64,
    pub collisions: CollisionReport,
    /// Entities removed for leaving the playfield or running out of life.
    pub expired: u32,
}

// ── World ────────────────────────────────────────────────────────────────────

pub type PlayerBullets = EntityPool<Bullet, MAX_PLAYER_BULLETS>;
pub type EnemyBullets = EntityPool<Bullet, MAX_ENEMY_BULLETS>;
pub type Enemies = EntityPool<Enemy, MAX_ENEMIES>;
pub type TrackingBullets = EntityPool<TrackingBullet, MAX_TRACKING_BULLETS>;

#[derive(Clone, Debug)]
pub struct GameWorld {
    pub config: GameConfig,
    pub player: Player,
    pub player_bullets: PlayerBullets,
    pub enemy_bullets: EnemyBullets,
    pub enemies: Enemies,
    pub tracking_bullets: TrackingBullets,
    pub director: SpawnDirector,
    pub collisions: CollisionEngine,
    pub rng: GameRng,
    pub status: GameStatus,
    pub frame: u64,
    /// Bumped by every `init`; the renderer uses it to notice restarts.
    pub epoch: u32,
    /// Times the player went down; survives `init`.
    pub deaths: u32,
    pub kills: u32,
}

impl GameWorld {
    /// Build and initialise a world.
    pub fn new(config: GameConfig) -> Self {
        let mut world = Self {
            config,
            player: Player::spawn_point(config.playfield.width, config.playfield.height),
            player_bullets: EntityPool::new(),
            enemy_bullets: EntityPool::new(),
            enemies: EntityPool::new(),
            tracking_bullets: EntityPool::new(),
            director: SpawnDirector::new(&config.spawn),
            collisions: CollisionEngine::new(config.collision),
            rng: GameRng::seeded(config.seed),
            status: GameStatus::Playing,
            frame: 0,
            epoch: 0,
            deaths: 0,
            kills: 0,
        };
        world.init();
        world
    }

    /// Reset pools, timers, player and RNG, then place the opening wave.
    /// The RNG is reseeded with `seed + deaths`, so each life plays out
    /// differently but reproducibly.
    pub fn init(&mut self) {
        let field = self.config.playfield;
        self.player = Player::spawn_point(field.width, field.height);
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.enemies.clear();
        self.tracking_bullets.clear();
        self.director.reset();
        self.rng = GameRng::seeded(self.config.seed.wrapping_add(self.deaths as u64));
        self.status = GameStatus::Playing;
        self.frame = 0;
        self.kills = 0;

        for _ in 0..self.config.spawn.initial_enemies {
            self.director
                .spawn_random_enemy(&mut self.enemies, &field, &mut self.rng);
        }
        log::info!(
            "world init #{} ({:?}, seed {}, {} enemies)",
            self.epoch,
            self.config.level,
            self.config.seed,
            self.enemies.len()
        );
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Player plus everything alive in every pool.
    pub fn active_entities(&self) -> usize {
        1 + self.player_bullets.len()
            + self.enemy_bullets.len()
            + self.enemies.len()
            + self.tracking_bullets.len()
    }

    // ── Player ───────────────────────────────────────────────────────────────

    pub fn move_player(&mut self, controls: &Controls) {
        let field = self.config.playfield;
        let p = &mut self.player;
        let max_x = (field.width - PLAYER_SIZE) as f32;
        let max_y = (field.height - PLAYER_SIZE) as f32;
        if controls.left {
            p.body.pos.x -= p.speed;
        }
        if controls.right {
            p.body.pos.x += p.speed;
        }
        if controls.up {
            p.body.pos.y -= p.speed;
        }
        if controls.down {
            p.body.pos.y += p.speed;
        }
        p.body.pos.x = p.body.pos.x.clamp(0.0, max_x);
        p.body.pos.y = p.body.pos.y.clamp(0.0, max_y);
    }

    /// Three straight bullets, slightly staggered.  Returns bullets placed.
    pub fn fire_burst(&mut self) -> usize {
        let origin = self.player.body.pos;
        let mut placed = 0;
        for burst in 0..BURST_SHOTS {
            let x = origin.x + (PLAYER_SIZE / 2 - BULLET_SIZE / 2 + (burst - 1) * (BULLET_SIZE + 1)) as f32;
            let y = origin.y - (BULLET_SIZE + burst * 2) as f32;
            let bullet = Bullet::new(
                Vec2::new(x, y),
                Shape::SolidSquare,
                Color::White,
                Motion::linear(Vec2::NEG_Y, BURST_SPEED),
            );
            if self.player_bullets.spawn(bullet).is_some() {
                placed += 1;
            }
        }
        placed
    }

    /// One bullet along each of the eight compass directions.
    pub fn fire_spread(&mut self) -> usize {
        let origin = self.player.body.pos;
        let pos = Vec2::new(
            origin.x + (PLAYER_SIZE / 2 - BULLET_SIZE / 2) as f32,
            origin.y,
        );
        let mut placed = 0;
        // Start the table pointing up; the enemies' table starts pointing down.
        for &dir in DIRS_8.iter().cycle().skip(4).take(DIRS_8.len()) {
            let bullet = Bullet::new(
                pos,
                Shape::SolidSquare,
                Color::Cyan,
                Motion::linear(dir, SPREAD_SPEED),
            );
            if self.player_bullets.spawn(bullet).is_some() {
                placed += 1;
            }
        }
        placed
    }

    /// A homing bullet locked on the nearest enemy.  Nothing is fired when
    /// there is no enemy to lock on to.
    pub fn fire_tracking(&mut self) -> bool {
        let Some(target) = self.enemies.nearest(self.player.body.center()) else {
            return false;
        };
        let pos = self.player.body.pos
            + Vec2::new((PLAYER_SIZE / 2 - TRACKING_BULLET_SIZE / 2) as f32, 0.0);
        let motion = Motion::homing(Some(target), TrackingBullet::SPEED, self.config.homing);
        self.tracking_bullets
            .spawn(TrackingBullet::new(pos, motion))
            .is_some()
    }

    /// Move, then fire whichever actions are held and off cooldown.
    pub fn update_player(&mut self, controls: &Controls) {
        self.move_player(controls);

        if controls.fire && self.player.cooldowns.burst == 0 {
            self.player.cooldowns.burst = Cooldowns::BURST;
            self.fire_burst();
        }
        if controls.spread && self.player.cooldowns.spread == 0 {
            self.player.cooldowns.spread = Cooldowns::SPREAD;
            self.fire_spread();
        }
        if controls.track && self.player.cooldowns.tracking == 0 {
            self.player.cooldowns.tracking = Cooldowns::TRACKING;
            self.fire_tracking();
        }
        self.player.cooldowns.tick();
    }

    // ── Simulation phases ────────────────────────────────────────────────────

    pub fn run_spawns(&mut self) {
        let center = self.player.body.center();
        self.director.update(
            &mut self.enemies,
            &mut self.enemy_bullets,
            center,
            &self.config.playfield,
            &mut self.rng,
        );
    }

    pub fn run_collisions(&mut self) -> CollisionReport {
        let report = self.collisions.run(
            self.frame,
            &self.player.body,
            &mut self.player_bullets,
            &mut self.tracking_bullets,
            &mut self.enemies,
            &mut self.enemy_bullets,
        );
        if report.kills > 0 {
            self.kills += report.kills;
            self.director.on_kills(
                report.kills,
                &mut self.enemies,
                &self.config.playfield,
                &mut self.rng,
            );
        }
        report
    }

    /// Advance every pool one step and drop whatever leaves the inflated
    /// playfield or runs out of lifetime.  Returns how many were dropped.
    pub fn update_motion(&mut self) -> u32 {
        let field = self.config.playfield;
        let inside = |body: &Body| field.contains_inflated(body.pos.x, body.pos.y, body.size);
        let mut expired = 0;
        let mut keep = |alive: bool| {
            if !alive {
                expired += 1;
            }
            alive
        };

        self.player_bullets.retain(|_, b| {
            b.motion.advance(&mut b.body, &NoTargets);
            keep(inside(&b.body))
        });

        let enemies = &self.enemies;
        self.tracking_bullets.retain(|_, t| {
            t.lifetime = t.lifetime.saturating_sub(1);
            if t.lifetime == 0 {
                return keep(false);
            }
            t.motion.advance(&mut t.body, enemies);
            keep(inside(&t.body))
        });

        self.enemies.retain(|_, e| {
            e.motion.advance(&mut e.body, &NoTargets);
            keep(inside(&e.body))
        });

        self.enemy_bullets.retain(|_, b| {
            b.motion.advance(&mut b.body, &NoTargets);
            keep(inside(&b.body))
        });

        expired
    }

    /// One full simulation frame: player, spawns, collisions, motion.
    ///
    /// Collisions are tested on the positions entities hold at the start of
    /// the frame, before they move.
    pub fn tick(&mut self, controls: &Controls) -> TickReport {
        self.frame += 1;

        self.update_player(controls);
        self.run_spawns();
        let collisions = self.run_collisions();
        let expired = self.update_motion();

        if collisions.player_hit && self.config.restart_on_death {
            log::info!("player down on frame {}", self.frame);
            self.status = GameStatus::PlayerDown;
            self.deaths = self.deaths.wrapping_add(1);
        }

        TickReport {
            frame: self.frame,
            collisions,
            expired,
        }
    }
}

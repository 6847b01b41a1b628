//! Difficulty tables, playfield geometry and the compile-time limits of the
//! entity pools.

use thiserror::Error;

use crate::entities::Ways;
use crate::motion::HomingStyle;

// ── Compile-time limits ──────────────────────────────────────────────────────

pub const MAX_PLAYER_BULLETS: usize = 300;
pub const MAX_ENEMY_BULLETS: usize = 300;
pub const MAX_ENEMIES: usize = 30;
pub const MAX_TRACKING_BULLETS: usize = 50;

pub const PLAYER_SIZE: i32 = 6;
pub const ENEMY_SIZE: i32 = 4;
pub const BULLET_SIZE: i32 = 2;
pub const TRACKING_BULLET_SIZE: i32 = 3;

/// Width of the stats column drawn to the right of the playfield.
pub const HUD_WIDTH: i32 = 40;

const MIN_PLAYFIELD: i32 = 16;

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("playfield {width}x{height} is too small (minimum {min}x{min})", min = MIN_PLAYFIELD)]
    PlayfieldTooSmall { width: i32, height: i32 },

    #[error("target frame rate must be at least 1")]
    ZeroFrameRate,

    #[error("collision interval for {0} must be at least 1 frame")]
    ZeroCollisionInterval(&'static str),

    #[error("spawn timer interval for {0} must be at least 1 frame")]
    ZeroSpawnInterval(&'static str),

    #[error("{name} probability {value} is above 100")]
    PercentOutOfRange { name: &'static str, value: u8 },

    #[error("enemy speed range {min}..={max} is invalid")]
    BadSpeedRange { min: f32, max: f32 },
}

// ── Geometry ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playfield {
    pub width: i32,
    pub height: i32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self { width: 120, height: 80 }
    }
}

impl Playfield {
    /// `true` while an entity of `size` at top-left `(x, y)` is inside the
    /// screen inflated by one entity size on every side.
    pub fn contains_inflated(&self, x: f32, y: f32, size: i32) -> bool {
        let margin = size as f32;
        x >= -margin && x <= self.width as f32 && y >= -margin && y <= self.height as f32
    }
}

// ── Difficulty ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

fn enemy_spawn_interval(level: Level) -> u32 {
    match level {
        Level::Easy => 50,
        Level::Medium => 40,
        Level::Hard => 28,
    }
}

fn enemy_spawn_percent(level: Level) -> u8 {
    match level {
        Level::Easy => 20,
        Level::Medium => 25,
        Level::Hard => 40,
    }
}

fn enemy_fire_percent(level: Level) -> u8 {
    match level {
        Level::Easy => 70,
        Level::Medium => 85,
        Level::Hard => 100,
    }
}

fn radial_volley(level: Level) -> Ways {
    match level {
        Level::Easy => Ways::Four,
        Level::Medium => Ways::Eight,
        Level::Hard => Ways::Sixteen,
    }
}

/// Hard mode has the most bullets on screen, so the pairs whose attackers
/// are numerous get thinned out.
fn collision_intervals(level: Level) -> CollisionConfig {
    match level {
        Level::Easy | Level::Medium => CollisionConfig::default(),
        Level::Hard => CollisionConfig {
            player_bullets_vs_enemies: 1,
            tracking_vs_enemies: 2,
            enemy_bullets_vs_player: 2,
        },
    }
}

// ── Config records ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnConfig {
    /// Frames between rolls of the global enemy-spawn timer.
    pub enemy_interval: u32,
    pub enemy_percent: u8,
    pub formation_interval: u32,
    pub formation_percent: u8,
    /// Chance an enemy actually fires when its shoot timer elapses.
    pub fire_percent: u8,
    pub radial: Ways,
    /// Chance a kill is followed by a replacement enemy.
    pub reward_respawn_percent: u8,
    pub initial_enemies: usize,
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
}

/// Every pair is tested when `frame % interval == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionConfig {
    pub player_bullets_vs_enemies: u32,
    pub tracking_vs_enemies: u32,
    pub enemy_bullets_vs_player: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            player_bullets_vs_enemies: 1,
            tracking_vs_enemies: 1,
            enemy_bullets_vs_player: 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameConfig {
    pub level: Level,
    pub playfield: Playfield,
    pub seed: u64,
    pub target_fps: u32,
    pub spawn: SpawnConfig,
    pub collision: CollisionConfig,
    pub homing: HomingStyle,
    /// Re-enter `Init` when an enemy bullet reaches the player.  When off
    /// the player is invincible and the bullet is just consumed.
    pub restart_on_death: bool,
}

impl Level {
    pub fn config(self) -> GameConfig {
        GameConfig {
            level: self,
            playfield: Playfield::default(),
            seed: 12345,
            target_fps: 60,
            spawn: SpawnConfig {
                enemy_interval: enemy_spawn_interval(self),
                enemy_percent: enemy_spawn_percent(self),
                formation_interval: 600,
                formation_percent: 50,
                fire_percent: enemy_fire_percent(self),
                radial: radial_volley(self),
                reward_respawn_percent: 5,
                initial_enemies: 5,
                enemy_speed_min: 0.5,
                enemy_speed_max: 1.0,
            },
            collision: collision_intervals(self),
            homing: HomingStyle::Normalized,
            restart_on_death: false,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Level::Medium.config()
    }
}

fn check_percent(name: &'static str, value: u8) -> Result<(), ConfigError> {
    if value > 100 {
        return Err(ConfigError::PercentOutOfRange { name, value });
    }
    Ok(())
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Playfield { width, height } = self.playfield;
        if width < MIN_PLAYFIELD || height < MIN_PLAYFIELD {
            return Err(ConfigError::PlayfieldTooSmall { width, height });
        }
        if self.target_fps == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }

        let c = &self.collision;
        for (name, interval) in [
            ("player bullets vs enemies", c.player_bullets_vs_enemies),
            ("tracking bullets vs enemies", c.tracking_vs_enemies),
            ("enemy bullets vs player", c.enemy_bullets_vs_player),
        ] {
            if interval == 0 {
                return Err(ConfigError::ZeroCollisionInterval(name));
            }
        }

        let s = &self.spawn;
        if s.enemy_interval == 0 {
            return Err(ConfigError::ZeroSpawnInterval("enemies"));
        }
        if s.formation_interval == 0 {
            return Err(ConfigError::ZeroSpawnInterval("formations"));
        }
        check_percent("enemy spawn", s.enemy_percent)?;
        check_percent("formation spawn", s.formation_percent)?;
        check_percent("enemy fire", s.fire_percent)?;
        check_percent("reward respawn", s.reward_respawn_percent)?;
        if !(s.enemy_speed_min > 0.0 && s.enemy_speed_min <= s.enemy_speed_max) {
            return Err(ConfigError::BadSpeedRange {
                min: s.enemy_speed_min,
                max: s.enemy_speed_max,
            });
        }
        Ok(())
    }

    /// Full display size: playfield plus the stats column.
    pub fn screen_size(&self) -> (i32, i32) {
        (self.playfield.width + HUD_WIDTH, self.playfield.height)
    }
}

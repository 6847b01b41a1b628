//! Pairwise hit detection between pools.
//!
//! Each attacker is tested against the live defenders in active-list order.
//! A cheap centre-distance check rejects most pairs; the survivors get an
//! exact box overlap test.  The first defender hit consumes the attacker.

use glam::Vec2;

use crate::config::{
    CollisionConfig, BULLET_SIZE, ENEMY_SIZE, PLAYER_SIZE, TRACKING_BULLET_SIZE,
};
use crate::entities::{Body, Bullet, Enemy, TrackingBullet};
use crate::pool::EntityPool;

/// Anything with a collision body.
pub trait Collider {
    fn body(&self) -> &Body;
}

impl Collider for Bullet {
    fn body(&self) -> &Body {
        &self.body
    }
}

impl Collider for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }
}

impl Collider for TrackingBullet {
    fn body(&self) -> &Body {
        &self.body
    }
}

impl Collider for Body {
    fn body(&self) -> &Body {
        self
    }
}

// ── Coarse filter ────────────────────────────────────────────────────────────

/// Squared centre-distance threshold for one size pairing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoarseFilter {
    pub radius_sq: f32,
}

impl CoarseFilter {
    /// Two boxes can only overlap while their centres are closer than the
    /// half-diagonal of the combined box, so this threshold never rejects a
    /// real hit.
    pub fn for_sizes(a: i32, b: i32) -> Self {
        let half = (a + b) as f32 * 0.5;
        Self {
            radius_sq: 2.0 * half * half,
        }
    }

    /// Scale the radius; below 1.0 the filter starts dropping corner hits.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            radius_sq: self.radius_sq * factor * factor,
        }
    }

    pub fn admits(&self, a: Vec2, b: Vec2) -> bool {
        a.distance_squared(b) <= self.radius_sq
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Enemies destroyed this pass.
    pub kills: u32,
    /// An enemy bullet reached the player.
    pub player_hit: bool,
    pub coarse_tests: u32,
    pub exact_tests: u32,
}

/// Test every attacker against every defender.  On a hit both are despawned
/// and the attacker stops looking.
pub fn resolve_pool_vs_pool<A, D, const NA: usize, const ND: usize>(
    attackers: &mut EntityPool<A, NA>,
    defenders: &mut EntityPool<D, ND>,
    filter: &CoarseFilter,
    report: &mut CollisionReport,
) -> u32
where
    A: Collider,
    D: Collider,
{
    let mut hits = 0;
    let mut i = 0;
    while i < attackers.len() {
        let Some(a) = attackers.get_at(i).map(|a| *a.body()) else {
            break;
        };
        let a_center = a.center();

        let mut hit = None;
        for (j, (_, d)) in defenders.iter().enumerate() {
            let d = d.body();
            report.coarse_tests += 1;
            if !filter.admits(a_center, d.center()) {
                continue;
            }
            report.exact_tests += 1;
            if a.overlaps(d) {
                hit = Some(j);
                break;
            }
        }

        match hit {
            Some(j) => {
                log::trace!("hit at ({:.1}, {:.1})", a.pos.x, a.pos.y);
                defenders.despawn_at(j);
                // The last attacker moved into `i`; test it next.
                attackers.despawn_at(i);
                hits += 1;
            }
            None => i += 1,
        }
    }
    hits
}

/// Test every attacker against one target that is not pooled.  Attackers
/// that touch it are despawned; the target is left to the caller.
pub fn resolve_pool_vs_target<A: Collider, const NA: usize>(
    attackers: &mut EntityPool<A, NA>,
    target: &Body,
    filter: &CoarseFilter,
    report: &mut CollisionReport,
) -> u32 {
    let t_center = target.center();
    let mut hits = 0;
    attackers.retain(|_, a| {
        let a = a.body();
        report.coarse_tests += 1;
        if !filter.admits(a.center(), t_center) {
            return true;
        }
        report.exact_tests += 1;
        if a.overlaps(target) {
            hits += 1;
            return false;
        }
        true
    });
    hits
}

// ── Engine ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct CollisionEngine {
    pub intervals: CollisionConfig,
    pub bullets_vs_enemies: CoarseFilter,
    pub tracking_vs_enemies: CoarseFilter,
    pub enemy_bullets_vs_player: CoarseFilter,
}

impl CollisionEngine {
    pub fn new(intervals: CollisionConfig) -> Self {
        Self {
            intervals,
            bullets_vs_enemies: CoarseFilter::for_sizes(BULLET_SIZE, ENEMY_SIZE),
            tracking_vs_enemies: CoarseFilter::for_sizes(TRACKING_BULLET_SIZE, ENEMY_SIZE),
            enemy_bullets_vs_player: CoarseFilter::for_sizes(BULLET_SIZE, PLAYER_SIZE),
        }
    }

    fn due(frame: u64, interval: u32) -> bool {
        interval <= 1 || frame % interval as u64 == 0
    }

    /// Run every pair of pools that is due on `frame`.
    pub fn run<const NB: usize, const NT: usize, const NE: usize, const NEB: usize>(
        &self,
        frame: u64,
        player: &Body,
        player_bullets: &mut EntityPool<Bullet, NB>,
        tracking: &mut EntityPool<TrackingBullet, NT>,
        enemies: &mut EntityPool<Enemy, NE>,
        enemy_bullets: &mut EntityPool<Bullet, NEB>,
    ) -> CollisionReport {
        let mut report = CollisionReport::default();

        if Self::due(frame, self.intervals.player_bullets_vs_enemies) {
            let kills = resolve_pool_vs_pool(
                player_bullets,
                enemies,
                &self.bullets_vs_enemies,
                &mut report,
            );
            report.kills += kills;
        }
        if Self::due(frame, self.intervals.tracking_vs_enemies) {
            let kills =
                resolve_pool_vs_pool(tracking, enemies, &self.tracking_vs_enemies, &mut report);
            report.kills += kills;
        }
        if Self::due(frame, self.intervals.enemy_bullets_vs_player) {
            let hits = resolve_pool_vs_target(
                enemy_bullets,
                player,
                &self.enemy_bullets_vs_player,
                &mut report,
            );
            report.player_hit = hits > 0;
        }
        report
    }
}

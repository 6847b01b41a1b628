mod common;

use glam::Vec2;

use pocket_shooter::compute::{Enemies, EnemyBullets, GameWorld};
use pocket_shooter::config::{Playfield, ENEMY_SIZE};
use pocket_shooter::entities::*;
use pocket_shooter::motion::Motion;
use pocket_shooter::rng::GameRng;
use pocket_shooter::spawn::*;

fn enemy(kind: EnemyKind, x: f32, y: f32) -> Enemy {
    Enemy::new(Vec2::new(x, y), kind, Shape::HollowSquare, Motion::default())
}

fn director(fire_percent: u8, reward: u8) -> SpawnDirector {
    let mut cfg = common::quiet_config().spawn;
    cfg.fire_percent = fire_percent;
    cfg.reward_respawn_percent = reward;
    SpawnDirector::new(&cfg)
}

// ── SpawnTimer ────────────────────────────────────────────────────────────────

#[test]
fn timer_fires_every_interval_at_full_chance() {
    let mut rng = GameRng::seeded(1);
    let mut t = SpawnTimer::new(3, 100);
    let fired: Vec<bool> = (0..7).map(|_| t.tick(&mut rng)).collect();
    assert_eq!(fired, vec![false, false, true, false, false, true, false]);
}

#[test]
fn timer_never_fires_at_zero_chance() {
    let mut rng = GameRng::seeded(1);
    let mut t = SpawnTimer::new(1, 0);
    assert!((0..500).all(|_| !t.tick(&mut rng)));
}

#[test]
fn timer_reset_restarts_count() {
    let mut rng = GameRng::seeded(1);
    let mut t = SpawnTimer::new(2, 100);
    t.tick(&mut rng);
    t.reset();
    assert!(!t.tick(&mut rng));
    assert!(t.tick(&mut rng));
}

#[test]
fn timer_roll_rate_tracks_percent() {
    let mut rng = GameRng::seeded(7);
    let mut t = SpawnTimer::new(1, 25);
    let hits = (0..4000).filter(|_| t.tick(&mut rng)).count();
    assert!((800..1200).contains(&hits), "hits {}", hits);
}

// ── Aiming ────────────────────────────────────────────────────────────────────

#[test]
fn aim_along_axis_is_unit() {
    assert_eq!(aim_axis_dominant(Vec2::ZERO, Vec2::new(10.0, 0.0)), Vec2::X);
    assert_eq!(aim_axis_dominant(Vec2::ZERO, Vec2::new(0.0, -3.0)), Vec2::NEG_Y);
}

#[test]
fn aim_diagonal_uses_max_plus_half_min() {
    let d = aim_axis_dominant(Vec2::ZERO, Vec2::new(4.0, 4.0));
    assert!((d.x - 4.0 / 6.0).abs() < 1e-5);
    assert!((d.y - 4.0 / 6.0).abs() < 1e-5);
}

#[test]
fn aim_at_self_points_down() {
    let p = Vec2::new(5.0, 5.0);
    assert_eq!(aim_axis_dominant(p, p), Vec2::Y);
}

#[test]
fn aim_length_stays_near_unit() {
    for i in 0..64 {
        let a = i as f32 / 64.0 * core::f32::consts::TAU;
        let d = aim_axis_dominant(Vec2::ZERO, Vec2::new(a.cos(), a.sin()) * 37.0);
        let len = d.length();
        assert!((0.85..=1.01).contains(&len), "angle {} len {}", a, len);
    }
}

// ── Volleys ───────────────────────────────────────────────────────────────────

#[test]
fn gunner_fires_fan_of_three_downward() {
    let mut bullets = EnemyBullets::new();
    let placed = fire_volley(&enemy(EnemyKind::Gunner, 50.0, 10.0), Ways::Eight, &mut bullets, Vec2::ZERO);
    assert_eq!(placed, 3);
    let mut xs: Vec<f32> = bullets.iter().map(|(_, b)| b.body.pos.x).collect();
    xs.sort_by(f32::total_cmp);
    xs.dedup();
    assert_eq!(xs.len(), 3);
    for (_, b) in bullets.iter() {
        assert_eq!(b.motion, Motion::linear(Vec2::Y, ENEMY_BULLET_SPEED));
        assert_eq!(b.body.color, ENEMY_BULLET_COLOR);
        assert_eq!(b.body.shape, Shape::HollowSquare);
    }
}

#[test]
fn sniper_aims_at_player() {
    let mut bullets = EnemyBullets::new();
    let sniper = enemy(EnemyKind::Sniper, 50.0, 10.0); // centre (52, 12)
    fire_volley(&sniper, Ways::Four, &mut bullets, Vec2::new(52.0, 70.0));
    assert_eq!(bullets.len(), 1);
    let (_, b) = bullets.iter().next().unwrap();
    assert_eq!(b.motion, Motion::linear(Vec2::Y, ENEMY_BULLET_SPEED));
}

#[test]
fn bloomer_volley_width_follows_level() {
    for (ways, n) in [(Ways::Four, 4), (Ways::Eight, 8), (Ways::Sixteen, 16)] {
        let mut bullets = EnemyBullets::new();
        let placed = fire_volley(&enemy(EnemyKind::Bloomer, 50.0, 30.0), ways, &mut bullets, Vec2::ZERO);
        assert_eq!(placed, n);
        assert_eq!(bullets.len(), n);
    }
}

#[test]
fn mortar_lobs_two_shells() {
    let mut bullets = EnemyBullets::new();
    fire_volley(&enemy(EnemyKind::Mortar, 50.0, 30.0), Ways::Four, &mut bullets, Vec2::ZERO);
    assert_eq!(bullets.len(), 2);
    let vx: Vec<f32> = bullets
        .iter()
        .map(|(_, b)| match b.motion {
            Motion::Parabolic { vel, gravity } => {
                assert!(vel.y < 0.0 && gravity > 0.0);
                vel.x
            }
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(vx[0], -vx[1]);
}

#[test]
fn volley_into_full_pool_is_dropped() {
    let mut bullets = EnemyBullets::new();
    let bloomer = enemy(EnemyKind::Bloomer, 50.0, 30.0);
    let mut total = 0;
    while !bullets.is_full() {
        total += fire_volley(&bloomer, Ways::Sixteen, &mut bullets, Vec2::ZERO);
    }
    assert_eq!(total, bullets.capacity());
    assert_eq!(fire_volley(&bloomer, Ways::Sixteen, &mut bullets, Vec2::ZERO), 0);
}

// ── Director ──────────────────────────────────────────────────────────────────

#[test]
fn random_enemy_spawns_just_above_screen() {
    let d = director(0, 0);
    let field = Playfield::default();
    let mut rng = GameRng::seeded(3);
    let mut enemies = Enemies::new();
    for _ in 0..20 {
        let h = d.spawn_random_enemy(&mut enemies, &field, &mut rng).unwrap();
        let e = enemies.get(h).unwrap();
        assert_eq!(e.body.pos.y, -ENEMY_SIZE as f32);
        assert!(e.body.pos.x >= 0.0 && e.body.pos.x < (field.width - ENEMY_SIZE) as f32);
        assert_eq!(e.body.color, e.kind.color());
        match e.motion {
            Motion::Linear { speed, .. } | Motion::Spiral { speed, .. } => {
                assert!((0.5..=1.0).contains(&speed));
            }
            other => panic!("unexpected {:?}", other),
        }
        if e.kind == EnemyKind::Sniper {
            assert!(matches!(e.motion, Motion::Spiral { .. }));
        }
    }
}

#[test]
fn random_enemy_dropped_when_pool_full() {
    let d = director(0, 0);
    let field = Playfield::default();
    let mut rng = GameRng::seeded(3);
    let mut enemies = Enemies::new();
    while !enemies.is_full() {
        d.spawn_random_enemy(&mut enemies, &field, &mut rng);
    }
    assert_eq!(d.spawn_random_enemy(&mut enemies, &field, &mut rng), None);
}

#[test]
fn formation_is_one_kind_in_a_row() {
    let d = director(0, 0);
    let field = Playfield::default();
    for seed in 0..10 {
        let mut rng = GameRng::seeded(seed);
        let mut enemies = Enemies::new();
        let placed = d.spawn_formation(&mut enemies, &field, &mut rng);
        assert!((3..=5).contains(&placed));
        assert_eq!(enemies.len(), placed);

        let kind = enemies.get_at(0).unwrap().kind;
        let mut xs: Vec<f32> = enemies
            .iter()
            .map(|(_, e)| {
                assert_eq!(e.kind, kind);
                assert_eq!(e.body.pos.y, -ENEMY_SIZE as f32);
                e.body.pos.x
            })
            .collect();
        xs.sort_by(f32::total_cmp);
        for pair in xs.windows(2) {
            assert_eq!(pair[1] - pair[0], (ENEMY_SIZE * 3) as f32);
        }
    }
}

#[test]
fn formation_fits_a_narrow_playfield() {
    for width in [16, 30, 40] {
        for seed in 0..20 {
            let mut config = common::quiet_config();
            config.playfield = Playfield { width, height: 80 };
            let mut world = GameWorld::new(config);
            world.rng = GameRng::seeded(seed);

            let field = world.config.playfield;
            let placed = world
                .director
                .spawn_formation(&mut world.enemies, &field, &mut world.rng);
            assert!(placed >= 1);
            assert_eq!(world.enemies.len(), placed);
            for (_, e) in world.enemies.iter() {
                let x = e.body.pos.x;
                assert!(x >= 0.0 && x <= (width - ENEMY_SIZE) as f32, "width {} x {}", width, x);
            }

            assert_eq!(world.update_motion(), 0);
            assert_eq!(world.enemies.len(), placed);
        }
    }
}

#[test]
fn enemy_fires_when_its_timer_elapses() {
    let mut d = director(100, 0);
    let field = Playfield::default();
    let mut rng = GameRng::seeded(5);
    let mut enemies = Enemies::new();
    let mut bullets = EnemyBullets::new();

    let mut gunner = enemy(EnemyKind::Gunner, 50.0, 10.0);
    gunner.shoot_timer = EnemyKind::Gunner.fire_interval() - 2;
    let h = enemies.spawn(gunner).unwrap();

    d.update(&mut enemies, &mut bullets, Vec2::new(60.0, 70.0), &field, &mut rng);
    assert!(bullets.is_empty());
    d.update(&mut enemies, &mut bullets, Vec2::new(60.0, 70.0), &field, &mut rng);
    assert_eq!(bullets.len(), 3);
    assert_eq!(enemies.get(h).unwrap().shoot_timer, 0);
}

#[test]
fn enemy_holds_fire_at_zero_chance() {
    let mut d = director(0, 0);
    let field = Playfield::default();
    let mut rng = GameRng::seeded(5);
    let mut enemies = Enemies::new();
    let mut bullets = EnemyBullets::new();
    enemies.spawn(enemy(EnemyKind::Bloomer, 50.0, 10.0));
    for _ in 0..500 {
        d.update(&mut enemies, &mut bullets, Vec2::ZERO, &field, &mut rng);
    }
    assert!(bullets.is_empty());
}

#[test]
fn kills_roll_reward_respawns() {
    let field = Playfield::default();
    let mut rng = GameRng::seeded(9);
    let mut enemies = Enemies::new();

    director(0, 100).on_kills(4, &mut enemies, &field, &mut rng);
    assert_eq!(enemies.len(), 4);

    director(0, 0).on_kills(4, &mut enemies, &field, &mut rng);
    assert_eq!(enemies.len(), 4);
}

#[test]
fn same_seed_same_spawns() {
    let d = director(0, 0);
    let field = Playfield::default();
    let run = |seed| {
        let mut rng = GameRng::seeded(seed);
        let mut enemies = Enemies::new();
        for _ in 0..10 {
            d.spawn_random_enemy(&mut enemies, &field, &mut rng);
        }
        enemies.iter().map(|(_, e)| *e).collect::<Vec<_>>()
    };
    assert_eq!(run(77), run(77));
    assert_ne!(run(77), run(78));
}

mod common;

use glam::Vec2;

use common::RecordingSurface;
use pocket_shooter::compute::{Controls, GameWorld};
use pocket_shooter::config::{Level, Playfield};
use pocket_shooter::entities::*;
use pocket_shooter::motion::Motion;
use pocket_shooter::platform::{Color, Rect};
use pocket_shooter::render::*;

fn setup() -> (GameWorld, RenderSync, RecordingSurface) {
    let config = common::quiet_config();
    let surface = RecordingSurface::for_config(&config);
    (GameWorld::new(config), RenderSync::new(), surface)
}

fn bullet(x: f32, y: f32, dir: Vec2, speed: f32) -> Bullet {
    Bullet::new(Vec2::new(x, y), Shape::SolidSquare, Color::White, Motion::linear(dir, speed))
}

fn still_enemy(x: f32, y: f32, shape: Shape) -> Enemy {
    Enemy::new(Vec2::new(x, y), EnemyKind::Gunner, shape, Motion::default())
}

fn live_rects(world: &GameWorld) -> Vec<Rect> {
    let mut rects = vec![world.player.body.rect()];
    rects.extend(world.enemies.iter().map(|(_, e)| e.body.rect()));
    rects.extend(world.enemy_bullets.iter().map(|(_, b)| b.body.rect()));
    rects.extend(world.tracking_bullets.iter().map(|(_, t)| t.body.rect()));
    rects.extend(world.player_bullets.iter().map(|(_, b)| b.body.rect()));
    rects
}

/// Every lit playfield pixel belongs to something alive.
fn assert_no_ghosts(world: &GameWorld, surface: &RecordingSurface) {
    let rects = live_rects(world);
    let Playfield { width, height } = world.config.playfield;
    for y in 0..height {
        for x in 0..width {
            if surface.pixel(x, y) != Color::Black {
                assert!(
                    rects.iter().any(|r| r.contains_point(x, y)),
                    "ghost pixel at ({}, {}) on frame {}",
                    x,
                    y,
                    world.frame
                );
            }
        }
    }
}

// ── Basics ────────────────────────────────────────────────────────────────────

#[test]
fn first_sync_clears_and_draws_player() {
    let (world, mut render, mut surface) = setup();
    let stats = render.sync(&world, &mut surface);
    assert_eq!(surface.clears, 1);
    assert_eq!(stats.drawn, 1);
    assert_eq!(surface.count_in(world.player.body.rect(), Color::Blue), 36);
}

#[test]
fn unchanged_world_draws_nothing() {
    let (mut world, mut render, mut surface) = setup();
    world.enemies.spawn(still_enemy(20.0, 20.0, Shape::SolidSquare));
    render.sync(&world, &mut surface);
    surface.reset_counters();

    let stats = render.sync(&world, &mut surface);
    assert_eq!(stats, RenderStats::default());
    assert_eq!(surface.fills, 0);
    assert_eq!(surface.circles, 0);
    assert_eq!(render.last, stats);
}

#[test]
fn moving_bullet_leaves_no_trail() {
    let (mut world, mut render, mut surface) = setup();
    world.player_bullets.spawn(bullet(10.0, 10.0, Vec2::Y, 3.0));
    render.sync(&world, &mut surface);

    for _ in 0..5 {
        world.update_motion();
        let stats = render.sync(&world, &mut surface);
        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.cleared, 1);
        let field = playfield_rect(&world.config.playfield);
        assert_eq!(surface.count_in(field, Color::White), 4);
    }
    let (_, b) = world.player_bullets.iter().next().unwrap();
    assert_eq!(surface.count_in(b.body.rect(), Color::White), 4);
}

#[test]
fn neighbour_uncovered_by_a_clear_is_redrawn() {
    let (mut world, mut render, mut surface) = setup();
    let enemy = world.enemies.spawn(still_enemy(30.0, 30.0, Shape::SolidSquare)).unwrap();
    world.player_bullets.spawn(bullet(31.0, 28.0, Vec2::Y, 2.0));
    render.sync(&world, &mut surface);

    // Bullet moves onto the enemy and is drawn over it.
    world.update_motion();
    render.sync(&world, &mut surface);
    let enemy_rect = world.enemies.get(enemy).unwrap().body.rect();

    world.update_motion();
    let stats = render.sync(&world, &mut surface);
    assert_eq!(stats.drawn, 2);
    assert_eq!(surface.count_in(enemy_rect, Color::Red), 12);

    world.update_motion();
    render.sync(&world, &mut surface);
    assert_eq!(surface.count_in(enemy_rect, Color::Red), 16);
}

#[test]
fn despawned_entity_is_erased() {
    let (mut world, mut render, mut surface) = setup();
    let h = world.enemies.spawn(still_enemy(40.0, 40.0, Shape::HollowSquare)).unwrap();
    render.sync(&world, &mut surface);
    let rect = world.enemies.get(h).unwrap().body.rect();
    assert_eq!(surface.count_in(rect, Color::Red), 12);

    world.enemies.despawn(h);
    let stats = render.sync(&world, &mut surface);
    assert_eq!(stats.cleared, 1);
    assert_eq!(stats.drawn, 0);
    assert_eq!(surface.lit_in(rect), 0);
}

#[test]
fn slot_reuse_is_treated_as_a_change() {
    let (mut world, mut render, mut surface) = setup();
    let a = world.enemies.spawn(still_enemy(10.0, 10.0, Shape::SolidSquare)).unwrap();
    render.sync(&world, &mut surface);

    world.enemies.despawn(a);
    let b = world.enemies.spawn(still_enemy(50.0, 50.0, Shape::SolidSquare)).unwrap();
    assert_eq!(a.index(), b.index());
    render.sync(&world, &mut surface);

    assert_eq!(surface.lit_in(Rect::new(10, 10, 4, 4)), 0);
    assert_eq!(surface.count_in(Rect::new(50, 50, 4, 4), Color::Red), 16);
}

// ── Clipping ──────────────────────────────────────────────────────────────────

#[test]
fn shapes_at_the_edge_stay_inside_the_playfield() {
    let (mut world, mut render, mut surface) = setup();
    let width = world.config.playfield.width;
    world.enemies.spawn(still_enemy(-2.0, 10.0, Shape::HollowCircle));
    world.enemies.spawn(still_enemy(width as f32 - 2.0, 10.0, Shape::HollowCircle));
    world.enemies.spawn(still_enemy(width as f32 - 2.0, 30.0, Shape::SolidSquare));
    world.enemies.spawn(still_enemy(10.0, -3.0, Shape::HollowSquare));
    render.sync(&world, &mut surface);

    let hud = Rect::new(width, 0, surface.width - width, surface.height);
    assert_eq!(surface.lit_in(hud), 0);
    assert_eq!(surface.count_in(Rect::new(width - 2, 30, 2, 4), Color::Red), 8);
    assert!(surface.count_in(Rect::new(0, 10, 4, 4), Color::Red) > 0);
    assert_no_ghosts(&world, &surface);
}

#[test]
fn circle_inside_uses_outline_call() {
    let (mut world, mut render, mut surface) = setup();
    world.enemies.spawn(still_enemy(20.0, 20.0, Shape::HollowCircle));
    render.sync(&world, &mut surface);
    assert_eq!(surface.circles, 1);
    assert!(surface.count_in(Rect::new(20, 20, 4, 4), Color::Red) > 0);
}

// ── Overflow & restart ────────────────────────────────────────────────────────

#[test]
fn dirty_overflow_falls_back_to_full_redraw() {
    let (mut world, mut render, mut surface) = setup();
    for i in 0..200 {
        let x = (i % 50) as f32 * 2.0;
        let y = 10.0 + (i / 50) as f32 * 4.0;
        world.player_bullets.spawn(bullet(x, y, Vec2::NEG_Y, 1.0));
    }
    render.sync(&world, &mut surface);

    world.update_motion();
    let stats = render.sync(&world, &mut surface);
    assert!(stats.full_redraw);
    assert_eq!(stats.drawn, 201);

    let field = playfield_rect(&world.config.playfield);
    assert_eq!(surface.count_in(field, Color::White), 800);
    assert_no_ghosts(&world, &surface);

    // Back to incremental once things settle.
    let stats = render.sync(&world, &mut surface);
    assert!(!stats.full_redraw);
    assert_eq!(stats.drawn, 0);
}

#[test]
fn restart_clears_the_whole_screen() {
    let (mut world, mut render, mut surface) = setup();
    world.enemies.spawn(still_enemy(20.0, 20.0, Shape::SolidSquare));
    render.sync(&world, &mut surface);
    surface.reset_counters();

    world.init();
    let stats = render.sync(&world, &mut surface);
    assert_eq!(surface.clears, 1);
    assert_eq!(stats.drawn, 1);
    assert_eq!(surface.lit_in(Rect::new(20, 20, 4, 4)), 0);
}

// ── Whole game ────────────────────────────────────────────────────────────────

#[test]
fn long_game_never_leaves_ghosts_or_double_draws() {
    let mut config = Level::Hard.config();
    config.seed = 99;
    let mut world = GameWorld::new(config);
    let mut render = RenderSync::new();
    let mut surface = RecordingSurface::for_config(&config);

    for frame in 0..400u32 {
        let controls = Controls {
            fire: true,
            spread: frame % 60 == 0,
            track: frame % 40 == 0,
            left: (frame / 80) % 2 == 0,
            right: (frame / 80) % 2 == 1,
            ..Controls::default()
        };
        world.tick(&controls);
        let stats = render.sync(&world, &mut surface);
        assert!(stats.drawn as usize <= world.active_entities());
        assert_no_ghosts(&world, &surface);
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

#[test]
fn hud_redrawn_only_on_change() {
    let (world, mut render, mut surface) = setup();
    let field = world.config.playfield;
    let x = field.width + 5;

    render.draw_hud(&field, 60, 6, &mut surface);
    assert_eq!(surface.texts.len(), 4);
    assert!(surface.texts.contains(&(x, 5, "FPS".to_string(), Color::White)));
    assert!(surface.texts.contains(&(x, 20, "60".to_string(), Color::White)));
    assert!(surface.texts.contains(&(x, 45, "  6".to_string(), Color::White)));

    surface.reset_counters();
    render.draw_hud(&field, 60, 6, &mut surface);
    assert!(surface.texts.is_empty());

    render.draw_hud(&field, 59, 6, &mut surface);
    assert_eq!(surface.texts.len(), 2);
    assert!(surface.texts.contains(&(x, 20, "59".to_string(), Color::White)));
}

//! Game integration tests: scene setup from config, shooting, impact
//! resolution and the render timer.

use std::f64::consts::FRAC_PI_2;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tanki::components::drawable::Drawable;
use tanki::events::gameevent::GameEvent;
use tanki::game::Game;
use tanki::model::tank::MAX_HEALTH;
use tanki::resources::framebuffer::FrameSlot;
use tanki::resources::gameconfig::{GameConfig, MAX_SHOT_MS_LIMIT, MAX_TIME_SCALE};
use tempfile::TempDir;

fn write_png(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([200, 200, 200, 255]))
        .save(path)
        .unwrap();
}

fn make_config(dir: &TempDir) -> GameConfig {
    let mut config = GameConfig::with_path(dir.path().join("config.ini"));
    config.window_width = 400;
    config.window_height = 300;
    config.target_fps = 100;
    config.tank_image = dir.path().join("tank.png");
    config.bullet_image = dir.path().join("bullet.png");
    config.arrow_image = dir.path().join("arrow.png");
    config.tanks = 3;
    config.time_scale = 50.0;
    config.max_shot_ms = 2_000;
    write_png(&config.tank_image, 12, 8);
    write_png(&config.bullet_image, 2, 2);
    write_png(&config.arrow_image, 6, 6);
    config
}

fn make_game(config: GameConfig) -> (Game, Arc<FrameSlot>) {
    let slot = Arc::new(FrameSlot::new());
    let game = Game::new(config, slot.clone()).unwrap();
    (game, slot)
}

#[test]
fn setup_places_tanks_on_the_ground() {
    let dir = tempfile::tempdir().unwrap();
    let (game, _) = make_game(make_config(&dir));

    assert_eq!(game.tanks().len(), 3);
    // Tank sprite plus health bar for each tank.
    assert_eq!(game.canvas().drawables().len(), 6);
    for tank in game.tanks() {
        let s = tank.state();
        assert_eq!(s.y as i32, game.map().ground_at(s.x as i32));
    }
    assert_eq!(game.focused_tank().unwrap().id(), 0);
    assert!(game.canvas().aim_arrow().is_enabled());
    assert!(game.canvas().map().unwrap().is_pre_rendered());
}

#[test]
fn missing_asset_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let config = make_config(&dir);
    std::fs::remove_file(&config.bullet_image).unwrap();
    let result = Game::new(config, Arc::new(FrameSlot::new()));
    assert!(result.is_err());
}

#[test]
fn shot_animation_comes_and_goes() {
    let dir = tempfile::tempdir().unwrap();
    let (mut game, _) = make_game(make_config(&dir));

    assert!(game.handle(GameEvent::Shoot {
        tank: 1,
        angle: 1.2,
        power: 2.0,
    }));
    assert_eq!(game.shots_in_flight(), 1);
    assert_eq!(game.canvas().drawables().len(), 7);

    thread::sleep(Duration::from_millis(2_200));
    game.update();
    assert_eq!(game.shots_in_flight(), 0);
    assert_eq!(game.canvas().drawables().len(), 6);
}

#[test]
fn direct_hit_destroys_tank_and_moves_focus() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = make_config(&dir);
    config.shot_damage = MAX_HEALTH;
    let (mut game, _) = make_game(config);

    // Straight down onto its own position.
    game.handle(GameEvent::Shoot {
        tank: 0,
        angle: -FRAC_PI_2,
        power: 1.0,
    });
    thread::sleep(Duration::from_millis(100));
    let destroyed = game.update();

    assert_eq!(destroyed.len(), 1);
    assert_eq!(destroyed[0].id(), 0);
    assert!(!game.tanks()[0].is_alive());
    assert!(game.tanks()[1].is_alive());
    assert_eq!(game.canvas().drawables().len(), 4);
    assert_eq!(game.focused_tank().unwrap().id(), 1);

    // A destroyed tank can no longer shoot.
    game.handle(GameEvent::Shoot {
        tank: 0,
        angle: 1.0,
        power: 1.0,
    });
    assert_eq!(game.shots_in_flight(), 0);
}

#[test]
fn aim_power_and_focus_events() {
    let dir = tempfile::tempdir().unwrap();
    let (mut game, _) = make_game(make_config(&dir));
    let before = game.focused_tank().unwrap().state();

    game.events().push(GameEvent::Aim(0.1));
    game.events().push(GameEvent::Power(0.5));
    game.events().push(GameEvent::NextTank);
    assert!(game.process_events());

    let after = game.tanks()[0].state();
    assert!((after.angle - before.angle - 0.1).abs() < 1e-9);
    assert!((after.power - before.power - 0.5).abs() < 1e-9);
    assert_eq!(game.focused_tank().unwrap().id(), 1);

    game.handle(GameEvent::Fire);
    assert_eq!(game.shots_in_flight(), 1);

    game.events().push(GameEvent::Quit);
    assert!(!game.process_events());
}

#[test]
fn fire_shoots_focused_tank_with_its_current_aim() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = make_config(&dir);
    // Slow flight so the bullet is still on the canvas when inspected.
    config.time_scale = 0.05;
    let (mut game, _) = make_game(config);
    game.handle(GameEvent::NextTank);
    game.handle(GameEvent::Aim(0.2));
    let tank = Arc::clone(game.focused_tank().unwrap());
    let aim = tank.state();

    assert!(game.handle(GameEvent::Fire));
    let shots: Vec<_> = game
        .canvas()
        .drawables()
        .snapshot()
        .iter()
        .filter_map(|d| d.shot().cloned())
        .collect();
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].owner(), tank.id());
    assert!((shots[0].angle() - aim.angle).abs() < 1e-9);
    assert!((shots[0].power() - aim.power).abs() < 1e-9);
}

#[test]
fn oversized_shot_timing_is_clamped_before_firing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = make_config(&dir);
    config.max_shot_ms = u64::MAX;
    config.time_scale = 1e12;
    let (mut game, _) = make_game(config);
    assert_eq!(game.config().max_shot_ms, MAX_SHOT_MS_LIMIT);
    assert!((game.config().time_scale - MAX_TIME_SCALE).abs() < 1e-12);

    assert!(game.handle(GameEvent::Fire));
    assert_eq!(game.shots_in_flight(), 1);
}

#[test]
fn enable_canvas_renders_frames() {
    let dir = tempfile::tempdir().unwrap();
    let (mut game, slot) = make_game(make_config(&dir));
    game.enable_canvas().unwrap();
    thread::sleep(Duration::from_millis(300));

    assert!(game.canvas().frames_rendered() >= 2);
    let frame = slot.take().unwrap();
    assert_eq!((frame.width, frame.height), (400, 300));
    assert_eq!(frame.rgba.len(), 400 * 300 * 4);
}

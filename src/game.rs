//! Game setup and the thin logic layer around the canvas.
//!
//! [`Game`] plays the part of the view/controller pair: it builds the canvas,
//! terrain and tanks, turns [`GameEvent`]s into shots, and resolves shots when
//! their flight ends. All canvas calls here are "show/hide a visual for X";
//! painting happens on the render timer thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::components::dirtmap::DirtMap;
use crate::components::shotanimation::{ShotAnimation, flight_duration};
use crate::components::tanksprite::{HEALTH_BAR_HEIGHT, HealthBar, TankSprite};
use crate::events::gameevent::{EventQueue, GameEvent};
use crate::model::shot::Shot;
use crate::model::tank::Tank;
use crate::resources::framebuffer::Presenter;
use crate::resources::gameconfig::GameConfig;
use crate::resources::imagestore::ImageStore;
use crate::resources::pixmap::AssetError;
use crate::systems::canvas::GameCanvas;
use crate::systems::gametimer::GameTimer;

/// Step used when tracing a trajectory against the terrain, in game seconds.
const IMPACT_STEP: f64 = 1.0 / 240.0;
/// Gap between the arrow and the top of the tank image.
const ARROW_GAP: u32 = 10;

/// A shot whose animation is still on screen.
struct Flight {
    shot: Arc<Shot>,
    lands_at: Instant,
    impact: Option<(f64, f64)>,
}

/// First point where `shot` hits the terrain, with the game time it
/// happens. `None` if it leaves the map sideways or `max_t` runs out.
pub fn find_impact(shot: &Shot, map: &DirtMap, max_t: f64) -> Option<(f64, (f64, f64))> {
    let width = f64::from(map.width());
    let mut t = IMPACT_STEP;
    while t <= max_t {
        let (x, y) = shot.position_at(t);
        if !(0.0..width).contains(&x) {
            return None;
        }
        if map.is_solid(x, y) {
            return Some((t, (x, y)));
        }
        t += IMPACT_STEP;
    }
    None
}

pub struct Game {
    config: GameConfig,
    canvas: Arc<GameCanvas>,
    images: ImageStore,
    map: Arc<DirtMap>,
    tanks: Vec<Arc<Tank>>,
    focused: Option<usize>,
    flights: Vec<Flight>,
    events: EventQueue,
    timer: Option<GameTimer>,
}

impl Game {
    /// Build the scene. Fails if any image named in `config` cannot be loaded.
    pub fn new(mut config: GameConfig, presenter: Arc<dyn Presenter>) -> Result<Self, AssetError> {
        config.clamp_limits();
        let (width, height) = config.window_size();
        let canvas = Arc::new(GameCanvas::new(
            width,
            height,
            &config.arrow_image,
            presenter,
        )?);

        let images = ImageStore::new();
        let tank_image = images.load(&config.tank_image)?;
        // Fail now rather than on the first shot.
        images.load(&config.bullet_image)?;

        let map = Arc::new(DirtMap::generate(width, height, config.seed));
        canvas.set_map(Arc::clone(&map));

        let count = config.tanks.max(1);
        let mut tanks = Vec::with_capacity(count as usize);
        for i in 0..count {
            let x = i64::from(width) * i64::from(i + 1) / i64::from(count + 1);
            let y = map.ground_at(x as i32);
            let tank = Arc::new(Tank::new(i, format!("Tank {}", i + 1), x as f64, f64::from(y)));
            canvas.add_drawable(Arc::new(TankSprite::new(
                Arc::clone(&tank),
                Arc::clone(&tank_image),
            )));
            canvas.add_drawable(Arc::new(HealthBar::new(
                Arc::clone(&tank),
                tank_image.height() + HEALTH_BAR_HEIGHT,
            )));
            tanks.push(tank);
        }
        canvas
            .aim_arrow()
            .set_lift(tank_image.height() + HEALTH_BAR_HEIGHT * 2 + ARROW_GAP);

        let mut game = Self {
            config,
            canvas,
            images,
            map,
            tanks,
            focused: None,
            flights: Vec::new(),
            events: EventQueue::new(),
            timer: None,
        };
        game.focus(Some(0));
        info!("Game ready with {} tank(s)", game.tanks.len());
        Ok(game)
    }

    /// Start repainting the canvas at the configured frame rate.
    pub fn enable_canvas(&mut self) -> Result<(), String> {
        let mut timer = GameTimer::new(self.config.target_fps)?;
        timer.schedule_render_task(self.canvas.render_task());
        self.timer = Some(timer);
        Ok(())
    }

    pub fn canvas(&self) -> &Arc<GameCanvas> {
        &self.canvas
    }

    pub fn map(&self) -> &Arc<DirtMap> {
        &self.map
    }

    pub fn tanks(&self) -> &[Arc<Tank>] {
        &self.tanks
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn focused_tank(&self) -> Option<&Arc<Tank>> {
        self.focused.and_then(|i| self.tanks.get(i))
    }

    /// Shots currently in the air.
    pub fn shots_in_flight(&self) -> usize {
        self.flights.len()
    }

    fn focus(&mut self, index: Option<usize>) {
        self.focused = index;
        match self.focused_tank() {
            Some(tank) => {
                debug!("Focused {}", tank.name());
                self.canvas.set_focused_tank(Arc::clone(tank));
            }
            None => self.canvas.clear_focus(),
        }
    }

    /// Next living tank after the focused one, wrapping around.
    fn next_alive(&self) -> Option<usize> {
        let n = self.tanks.len();
        let start = self.focused.map_or(0, |i| i + 1);
        (0..n)
            .map(|k| (start + k) % n)
            .find(|&i| self.tanks[i].is_alive())
    }

    /// Handle queued events. Returns `false` once a quit was requested.
    pub fn process_events(&mut self) -> bool {
        let mut running = true;
        for event in self.events.drain() {
            running &= self.handle(event);
        }
        running
    }

    /// Apply one event. Returns `false` for [`GameEvent::Quit`].
    pub fn handle(&mut self, event: GameEvent) -> bool {
        match event {
            GameEvent::Fire => {
                if let Some(tank) = self.focused_tank().cloned() {
                    let s = tank.state();
                    self.fire(&tank, s.angle, s.power);
                }
            }
            GameEvent::Shoot { tank, angle, power } => {
                match self.tanks.iter().find(|t| t.id() == tank && t.is_alive()) {
                    Some(t) => {
                        let t = Arc::clone(t);
                        self.fire(&t, angle, power);
                    }
                    None => warn!("Shoot for unknown or destroyed tank {}", tank),
                }
            }
            GameEvent::Aim(delta) => {
                if let Some(tank) = self.focused_tank() {
                    tank.aim_by(delta);
                }
            }
            GameEvent::Power(delta) => {
                if let Some(tank) = self.focused_tank() {
                    tank.power_by(delta);
                }
            }
            GameEvent::NextTank => {
                let next = self.next_alive();
                self.focus(next);
            }
            GameEvent::Quit => return false,
        }
        true
    }

    fn fire(&mut self, tank: &Arc<Tank>, angle: f64, power: f64) {
        if let Err(e) = self.launch(tank, angle, power) {
            warn!("{} cannot fire: {}", tank.name(), e);
        }
    }

    /// Fire a shot from `tank` and put its animation on the canvas.
    pub fn launch(
        &mut self,
        tank: &Arc<Tank>,
        angle: f64,
        power: f64,
    ) -> Result<Arc<Shot>, AssetError> {
        let bullet = self.images.load(&self.config.bullet_image)?;
        let shot = Arc::new(tank.fire_with(angle, power, self.config.gravity));
        let time_scale = self.config.time_scale;
        let max = Duration::from_millis(self.config.max_shot_ms);

        let max_game_time = max.as_secs_f64() * time_scale.max(0.0);
        let impact = find_impact(&shot, &self.map, max_game_time);
        let duration = match impact {
            Some((t, _)) if time_scale > 0.0 => Duration::try_from_secs_f64(t / time_scale)
                .map_or(max, |d| d.min(max)),
            _ => {
                let (_, height) = self.canvas.size();
                flight_duration(&shot, f64::from(height), time_scale, max)
            }
        };

        let animation = ShotAnimation::new(Arc::clone(&shot), bullet, time_scale, duration);
        self.canvas.add_animation(Arc::new(animation));
        let now = Instant::now();
        let lands_at = now.checked_add(duration).unwrap_or_else(|| {
            warn!("Flight of {:?} out of clock range, landing now", duration);
            now
        });
        self.flights.push(Flight {
            shot: Arc::clone(&shot),
            lands_at,
            impact: impact.map(|(_, point)| point),
        });
        debug!(
            "{} fired at {:.2} rad, power {:.2}, lands in {:?}",
            tank.name(),
            angle,
            power,
            duration
        );
        Ok(shot)
    }

    /// Resolve every shot whose flight has ended. Returns the tanks
    /// destroyed by them.
    pub fn update(&mut self) -> Vec<Arc<Tank>> {
        let now = Instant::now();
        let (landed, flying): (Vec<Flight>, Vec<Flight>) = std::mem::take(&mut self.flights)
            .into_iter()
            .partition(|f| f.lands_at <= now);
        self.flights = flying;

        let mut destroyed = Vec::new();
        for flight in landed {
            // The disposal timer normally got there first.
            self.canvas.remove_bullet(&flight.shot);
            let Some((x, y)) = flight.impact else {
                continue;
            };
            for tank in self.tanks.iter().filter(|t| t.is_alive()) {
                let s = tank.state();
                if (s.x - x).hypot(s.y - y) > self.config.blast_radius {
                    continue;
                }
                let left = tank.damage(self.config.shot_damage);
                info!("{} hit at ({:.0}, {:.0}), health {}", tank.name(), x, y, left);
                if left == 0 {
                    self.canvas.remove_tank(tank);
                    destroyed.push(Arc::clone(tank));
                }
            }
        }

        if self.focused_tank().is_some_and(|t| !t.is_alive()) {
            let next = self.next_alive();
            self.focus(next);
        }
        destroyed
    }
}

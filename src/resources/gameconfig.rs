//! Game configuration resource.
//!
//! Manages game settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 1024
//! height = 768
//! fps = 60
//! title = Tanki 2
//!
//! [assets]
//! tank = media/img/tank.png
//! bullet = media/img/bullet.png
//! arrow = media/img/arrow.png
//!
//! [game]
//! time_scale = 0.3
//! gravity = 300
//! max_shot_ms = 15000
//! blast_radius = 28
//! shot_damage = 40
//! tanks = 2
//! seed = 31337
//! ```

use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 1024;
const DEFAULT_WINDOW_HEIGHT: u32 = 768;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_TITLE: &str = "Tanki 2";
const DEFAULT_TANK_IMAGE: &str = "media/img/tank.png";
const DEFAULT_BULLET_IMAGE: &str = "media/img/bullet.png";
const DEFAULT_ARROW_IMAGE: &str = "media/img/arrow.png";
const DEFAULT_TIME_SCALE: f64 = 0.3;
const DEFAULT_GRAVITY: f64 = 300.0;
const DEFAULT_MAX_SHOT_MS: u64 = 15_000;
const DEFAULT_BLAST_RADIUS: f64 = 28.0;
const DEFAULT_SHOT_DAMAGE: u32 = 40;
const DEFAULT_TANKS: u32 = 2;
const DEFAULT_SEED: u64 = 31337;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Longest shot flight accepted from configuration (two minutes).
pub const MAX_SHOT_MS_LIMIT: u64 = 120_000;
/// Largest accepted playback speed-up for shot animations.
pub const MAX_TIME_SCALE: f64 = 100.0;

/// Read an unsigned key that must fit in a `u32`. Out-of-range values are
/// reported and ignored.
fn get_u32(config: &Ini, section: &str, key: &str) -> Option<u32> {
    let value = config.getuint(section, key).ok().flatten()?;
    match u32::try_from(value) {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring [{}] {} = {}: out of range", section, key, value);
            None
        }
    }
}

/// Game configuration.
///
/// Stores window settings, asset paths and gameplay tuning values.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Window (and canvas) width in pixels.
    pub window_width: u32,
    /// Window (and canvas) height in pixels.
    pub window_height: u32,
    /// Frames composited per second by the render timer.
    pub target_fps: u32,
    pub title: String,
    pub tank_image: PathBuf,
    pub bullet_image: PathBuf,
    pub arrow_image: PathBuf,
    /// Multiplier applied to elapsed animation time before evaluating a
    /// shot trajectory. Values below 1 slow the flight down.
    pub time_scale: f64,
    /// Downward acceleration of shots in pixels per second squared.
    pub gravity: f64,
    /// Upper bound for the lifetime of a shot animation, in milliseconds.
    pub max_shot_ms: u64,
    /// Distance from the impact point within which tanks take damage.
    pub blast_radius: f64,
    pub shot_damage: u32,
    /// Number of tanks placed on the map.
    pub tanks: u32,
    /// Terrain generator seed.
    pub seed: u64,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            title: DEFAULT_TITLE.to_string(),
            tank_image: PathBuf::from(DEFAULT_TANK_IMAGE),
            bullet_image: PathBuf::from(DEFAULT_BULLET_IMAGE),
            arrow_image: PathBuf::from(DEFAULT_ARROW_IMAGE),
            time_scale: DEFAULT_TIME_SCALE,
            gravity: DEFAULT_GRAVITY,
            max_shot_ms: DEFAULT_MAX_SHOT_MS,
            blast_radius: DEFAULT_BLAST_RADIUS,
            shot_damage: DEFAULT_SHOT_DAMAGE,
            tanks: DEFAULT_TANKS,
            seed: DEFAULT_SEED,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [window] section
        if let Some(width) = get_u32(&config, "window", "width") {
            self.window_width = width;
        }
        if let Some(height) = get_u32(&config, "window", "height") {
            self.window_height = height;
        }
        if let Some(fps) = get_u32(&config, "window", "fps") {
            self.target_fps = fps;
        }
        if let Some(title) = config.get("window", "title") {
            self.title = title;
        }

        // [assets] section
        if let Some(path) = config.get("assets", "tank") {
            self.tank_image = PathBuf::from(path);
        }
        if let Some(path) = config.get("assets", "bullet") {
            self.bullet_image = PathBuf::from(path);
        }
        if let Some(path) = config.get("assets", "arrow") {
            self.arrow_image = PathBuf::from(path);
        }

        // [game] section
        if let Some(scale) = config.getfloat("game", "time_scale").ok().flatten() {
            self.time_scale = scale;
        }
        if let Some(gravity) = config.getfloat("game", "gravity").ok().flatten() {
            self.gravity = gravity;
        }
        if let Some(ms) = config.getuint("game", "max_shot_ms").ok().flatten() {
            self.max_shot_ms = ms;
        }
        if let Some(radius) = config.getfloat("game", "blast_radius").ok().flatten() {
            self.blast_radius = radius;
        }
        if let Some(damage) = get_u32(&config, "game", "shot_damage") {
            self.shot_damage = damage;
        }
        if let Some(tanks) = get_u32(&config, "game", "tanks") {
            self.tanks = tanks;
        }
        if let Some(seed) = config.getuint("game", "seed").ok().flatten() {
            self.seed = seed;
        }
        self.clamp_limits();

        info!(
            "Loaded config: {}x{} window, fps={}, time_scale={}, tanks={}",
            self.window_width, self.window_height, self.target_fps, self.time_scale, self.tanks
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "fps", Some(self.target_fps.to_string()));
        config.set("window", "title", Some(self.title.clone()));

        // [assets] section
        let path_value = |p: &PathBuf| Some(p.to_string_lossy().into_owned());
        config.set("assets", "tank", path_value(&self.tank_image));
        config.set("assets", "bullet", path_value(&self.bullet_image));
        config.set("assets", "arrow", path_value(&self.arrow_image));

        // [game] section
        config.set("game", "time_scale", Some(self.time_scale.to_string()));
        config.set("game", "gravity", Some(self.gravity.to_string()));
        config.set("game", "max_shot_ms", Some(self.max_shot_ms.to_string()));
        config.set("game", "blast_radius", Some(self.blast_radius.to_string()));
        config.set("game", "shot_damage", Some(self.shot_damage.to_string()));
        config.set("game", "tanks", Some(self.tanks.to_string()));
        config.set("game", "seed", Some(self.seed.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Pull shot timing values back into a range the game loop can handle.
    pub fn clamp_limits(&mut self) {
        if self.max_shot_ms > MAX_SHOT_MS_LIMIT {
            warn!(
                "max_shot_ms {} too large, using {}",
                self.max_shot_ms, MAX_SHOT_MS_LIMIT
            );
            self.max_shot_ms = MAX_SHOT_MS_LIMIT;
        }
        if !self.time_scale.is_finite() {
            warn!(
                "time_scale {} is not a number, using {}",
                self.time_scale, DEFAULT_TIME_SCALE
            );
            self.time_scale = DEFAULT_TIME_SCALE;
        } else if !(0.0..=MAX_TIME_SCALE).contains(&self.time_scale) {
            let clamped = self.time_scale.clamp(0.0, MAX_TIME_SCALE);
            warn!("time_scale {} out of range, using {}", self.time_scale, clamped);
            self.time_scale = clamped;
        }
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

//! Tanki main entry point.
//!
//! A small artillery game written in Rust using:
//! - **raylib** for the window, keyboard and final texture blit
//! - a software canvas composited on a fixed-rate timer thread
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults when missing) and open the window
//! 2. Build the game scene and start the render timer
//! 3. Each window frame:
//!    - Poll the keyboard into game events and handle them
//!    - Resolve shots that have landed
//!    - Forward window size changes to the canvas
//!    - Upload the newest composited frame and draw it
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --config config.ini
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use raylib::prelude::*;

use tanki::game::Game;
use tanki::resources::framebuffer::{FrameSlot, PresentedFrame};
use tanki::resources::gameconfig::GameConfig;
use tanki::systems::input::{KeyBindings, poll_input};

/// Tanki 2
#[derive(Parser)]
#[command(version, about = "Turn your tank, pick your power, fire.")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Override the render frame rate from the configuration.
    #[arg(long, value_name = "N")]
    fps: Option<u32>,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = GameConfig::with_path(&cli.config);

    // Early-exit: write defaults and quit (no window needed)
    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Default config written to {}", cli.config.display());
        return;
    }

    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }
    if let Some(fps) = cli.fps {
        config.target_fps = fps;
    }

    if let Err(e) = run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Frame texture plus the size it was created with.
struct FrameTexture {
    texture: Texture2D,
    width: u32,
    height: u32,
}

fn run(config: GameConfig) -> Result<(), String> {
    let (width, height) = config.window_size();
    let (mut rl, thread) = raylib::init()
        .size(width as i32, height as i32)
        .resizable()
        .title(&config.title)
        .build();
    rl.set_target_fps(config.target_fps);
    // Escape is a key binding, not an automatic exit.
    rl.set_exit_key(None);

    let slot = Arc::new(FrameSlot::new());
    let mut game = Game::new(config, slot.clone()).map_err(|e| e.to_string())?;
    game.enable_canvas()?;

    let keys = KeyBindings::default();
    let mut size = (width, height);
    let mut frame_texture: Option<FrameTexture> = None;

    log::info!("Hello, world! This is Tanki!");
    while !rl.window_should_close() {
        for event in poll_input(&rl, &keys) {
            game.events().push(event);
        }
        if !game.process_events() {
            break;
        }
        for tank in game.update() {
            log::info!("{} destroyed", tank.name());
        }

        let current = (
            rl.get_screen_width().max(1) as u32,
            rl.get_screen_height().max(1) as u32,
        );
        if current != size {
            size = current;
            game.canvas().resize(size.0, size.1);
        }

        if let Some(frame) = slot.take() {
            upload_frame(&mut rl, &thread, &mut frame_texture, &frame)?;
        }

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        if let Some(ft) = frame_texture.as_ref() {
            d.draw_texture(&ft.texture, 0, 0, Color::WHITE);
        }
    }
    log::info!("Window closed");
    Ok(())
}

/// Copy a presented frame into the window texture, recreating the texture
/// when the frame size changed.
fn upload_frame(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    frame_texture: &mut Option<FrameTexture>,
    frame: &PresentedFrame,
) -> Result<(), String> {
    let stale = frame_texture
        .as_ref()
        .is_none_or(|ft| ft.width != frame.width || ft.height != frame.height);
    if stale {
        let image = Image::gen_image_color(frame.width as i32, frame.height as i32, Color::BLACK);
        let texture = rl
            .load_texture_from_image(thread, &image)
            .map_err(|e| format!("Failed to create frame texture: {}", e))?;
        *frame_texture = Some(FrameTexture {
            texture,
            width: frame.width,
            height: frame.height,
        });
    }
    if let Some(ft) = frame_texture.as_mut() {
        ft.texture
            .update_texture(&frame.rgba)
            .map_err(|e| format!("Failed to upload frame: {}", e))?;
    }
    Ok(())
}

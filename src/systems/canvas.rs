//! The game canvas: scene ownership and per-frame compositing.
//!
//! # Frame production
//!
//! 1. Drop the previous off-screen buffer and allocate one at the current size
//! 2. Fill it with the sky color
//! 3. Paint the background map, if one is installed
//! 4. Paint every enabled drawable in insertion order
//! 5. Paint the aim arrow last, on top of everything
//! 6. Hand the finished buffer to the [`Presenter`] in one call
//!
//! # Threads
//!
//! The render task runs on a [`GameTimer`](crate::systems::gametimer::GameTimer)
//! thread, animation disposal runs on the canvas' own [`Delayer`] thread and
//! the game logic adds and removes visuals from the main thread. All of them
//! share the [`DrawableList`], whose snapshots keep painting consistent while
//! the list changes.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{debug, info, trace};
use raylib::prelude::Color;

use crate::components::aimarrow::AimArrow;
use crate::components::animation::Animation;
use crate::components::dirtmap::DirtMap;
use crate::components::drawable::Drawable;
use crate::components::sprite::Sprite;
use crate::model::shot::Shot;
use crate::model::tank::Tank;
use crate::resources::drawablelist::{DrawableList, DrawableRef};
use crate::resources::framebuffer::{FrameBuffer, Presenter};
use crate::resources::pixmap::{AssetError, Surface};
use crate::systems::delayer::Delayer;

pub const SKY_COLOR: Color = Color::new(0, 128, 255, 255);

/// Area the game is rendered on.
pub struct GameCanvas {
    size: Mutex<(u32, u32)>,
    drawables: DrawableList,
    map: RwLock<Option<Arc<DirtMap>>>,
    arrow: AimArrow,
    buffer: Mutex<Option<FrameBuffer>>,
    presenter: Arc<dyn Presenter>,
    delayer: Delayer,
    frames: AtomicU64,
}

impl GameCanvas {
    /// Create a canvas, loading the aim arrow image from `arrow_image`.
    pub fn new(
        width: u32,
        height: u32,
        arrow_image: impl AsRef<Path>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, AssetError> {
        let arrow = AimArrow::load(arrow_image)?;
        Ok(Self::with_arrow(width, height, arrow, presenter))
    }

    /// Create a canvas around an already loaded aim arrow. The arrow is
    /// disabled until a tank is focused.
    pub fn with_arrow(
        width: u32,
        height: u32,
        arrow: AimArrow,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        arrow.disable();
        info!("Canvas created: {}x{}", width, height);
        Self {
            size: Mutex::new((width, height)),
            drawables: DrawableList::new(),
            map: RwLock::new(None),
            arrow,
            buffer: Mutex::new(None),
            presenter,
            delayer: Delayer::new(),
            frames: AtomicU64::new(0),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        *self.size.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// New dimensions take effect on the next frame.
    pub fn resize(&self, width: u32, height: u32) {
        debug!("Canvas resized to {}x{}", width, height);
        *self.size.lock().unwrap_or_else(PoisonError::into_inner) = (width, height);
    }

    pub fn drawables(&self) -> &DrawableList {
        &self.drawables
    }

    pub fn aim_arrow(&self) -> &AimArrow {
        &self.arrow
    }

    /// Frames produced by [`GameCanvas::paint`] so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn add_sprite(&self, sprite: Arc<Sprite>) {
        self.drawables.push(sprite);
    }

    pub fn add_drawable(&self, drawable: DrawableRef) {
        self.drawables.push(drawable);
    }

    /// Show an animation and schedule its removal once its duration passes.
    pub fn add_animation<A>(&self, animation: Arc<A>)
    where
        A: Animation + 'static,
    {
        animation.start();
        let duration = animation.duration();
        let drawable: DrawableRef = animation;
        self.drawables.push(Arc::clone(&drawable));

        let drawables = self.drawables.clone();
        self.delayer.schedule(duration, move || {
            if drawables.remove(&drawable) {
                trace!("Animation disposed after {:?}", duration);
            }
        });
    }

    /// Remove a drawable by identity. Does nothing if it is not shown.
    pub fn remove_drawable<D: ?Sized>(&self, drawable: &Arc<D>) -> bool {
        self.drawables.remove(drawable)
    }

    /// Remove the visual of `shot`, if any. At most one drawable goes away.
    pub fn remove_bullet(&self, shot: &Arc<Shot>) -> bool {
        self.drawables
            .remove_first_where(|d| d.shot().is_some_and(|s| Arc::ptr_eq(s, shot)))
            .is_some()
    }

    /// Remove every visual tied to `tank`. Returns how many were removed.
    pub fn remove_tank(&self, tank: &Arc<Tank>) -> usize {
        let removed = self
            .drawables
            .remove_all_where(|d| d.tank().is_some_and(|t| Arc::ptr_eq(t, tank)));
        debug!("Removed {} drawable(s) of tank {}", removed, tank.id());
        removed
    }

    /// Install the background map and pre-render it.
    pub fn set_map(&self, map: Arc<DirtMap>) {
        map.pretty_paint();
        *self.map.write().unwrap_or_else(PoisonError::into_inner) = Some(map);
    }

    pub fn map(&self) -> Option<Arc<DirtMap>> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point the aim arrow at `tank` and show it.
    pub fn set_focused_tank(&self, tank: Arc<Tank>) {
        self.arrow.set_tank(Some(tank));
        self.arrow.enable();
    }

    /// Hide the aim arrow and unbind it.
    pub fn clear_focus(&self) {
        self.arrow.disable();
        self.arrow.set_tank(None);
    }

    /// Draw the whole scene onto `surface` (steps 2 to 5).
    pub fn compose(&self, surface: &mut dyn Surface) {
        let (width, height) = (surface.width(), surface.height());
        surface.fill_rect(0, 0, width, height, SKY_COLOR);

        if let Some(map) = self.map() {
            map.paint(surface);
        }

        for item in self.drawables.snapshot().iter() {
            if item.is_enabled() {
                item.paint(surface);
            }
        }

        self.arrow.paint(surface);
    }

    /// Produce one frame and present it.
    pub fn paint(&self) {
        let (width, height) = self.size();
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        drop(buffer.take());
        let frame = buffer.insert(FrameBuffer::new(width, height));
        self.compose(frame);
        self.presenter.present(frame);
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Unit of work that repaints this canvas, for a fixed-rate timer.
    pub fn render_task(self: &Arc<Self>) -> RenderTask {
        RenderTask {
            canvas: Arc::clone(self),
        }
    }
}

/// Repaints a canvas each time it runs.
#[derive(Clone)]
pub struct RenderTask {
    canvas: Arc<GameCanvas>,
}

impl RenderTask {
    pub fn run(&self) {
        self.canvas.paint();
    }
}

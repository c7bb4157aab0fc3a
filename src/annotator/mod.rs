//! The annotation widget: event handling over a map surface.
//!
//! An [`Annotator`] owns a [`MapSurface`] once it has been loaded, the
//! placed annotations, the current [`Mode`] and the in-progress gesture.
//! Hosts feed it pointer and keyboard events; every user-visible change to
//! the annotation set is reported through the update callback.

mod gesture;
mod mutations;

pub use gesture::Gesture;

use crate::annotation::{ActiveRef, Annotation, AnnotationId, Layers, Payload};
use crate::config::Config;
use crate::geo::{FitRule, ImageRef};
use crate::input::{InputEvent, Key, Mode};
use crate::surface::{LayerStyles, MapSurface, SurfaceError, SurfaceLoader, SurfaceOptions};
use log::{debug, info, warn};

/// Callback invoked after each user-visible mutation.
pub type UpdateCallback = Box<dyn FnMut(&ActiveRef, &Payload)>;

/// Interactive annotation layer over a map surface.
pub struct Annotator<S: MapSurface> {
    /// Loaded surface; `None` until [`Annotator::initialize`] completes
    surface: Option<S>,
    options: SurfaceOptions,
    fit: FitRule,
    styles: LayerStyles,
    zoom_key: Key,
    pan_key: Key,
    /// Images placed as overlays on initialization (first one sets the view)
    images: Vec<ImageRef>,
    overlays: Vec<S::Layer>,
    layers: Layers<S::Layer>,
    /// Annotations waiting for the surface to load
    pending: Vec<Annotation>,
    mode: Mode,
    gesture: Gesture<S::Layer>,
    active: Option<AnnotationId>,
    held_key: Option<Key>,
    attached: bool,
    update: UpdateCallback,
}

impl<S: MapSurface> Annotator<S> {
    /// Creates an annotator that will show `annotations` over `images` once
    /// initialized.
    ///
    /// When `images` is empty the configured base image is used.
    pub fn new(config: &Config, annotations: Vec<Annotation>, images: Vec<ImageRef>) -> Self {
        let images = if images.is_empty() {
            vec![config.base_image()]
        } else {
            images
        };

        Self {
            surface: None,
            options: SurfaceOptions::from_config(config),
            fit: config.fit_rule(),
            styles: LayerStyles::from_config(config),
            zoom_key: config.zoom_key(),
            pan_key: config.pan_key(),
            images,
            overlays: Vec::new(),
            layers: Layers::new(),
            pending: annotations,
            mode: Mode::default(),
            gesture: Gesture::Idle,
            active: None,
            held_key: None,
            attached: false,
            update: Box::new(|_, _| {}),
        }
    }

    /// Sets the callback invoked with the active reference and the full
    /// annotation snapshot after every user-visible mutation.
    pub fn on_update(mut self, update: impl FnMut(&ActiveRef, &Payload) + 'static) -> Self {
        self.update = Box::new(update);
        self
    }

    /// Loads the surface, places the image overlays and pending annotations,
    /// and starts listening for events.
    ///
    /// The surface starts with panning and wheel zoom disabled; the view is
    /// fitted to the first image. Calling this again after success is a no-op.
    pub async fn initialize<L>(&mut self, loader: &L) -> Result<(), SurfaceError>
    where
        L: SurfaceLoader<Surface = S>,
    {
        if self.surface.is_some() {
            warn!("Annotator already initialized; ignoring");
            return Ok(());
        }

        let mut surface = loader.load(&self.options).await?;
        surface.set_dragging(false);
        surface.set_scroll_zoom(false);

        if let Some(base) = self.images.first() {
            let view = self.fit.fit(base);
            surface.set_view(view.center, view.zoom);
        }
        self.overlays = self
            .images
            .iter()
            .map(|image| surface.add_image_overlay(image))
            .collect();

        self.surface = Some(surface);
        self.attached = true;

        for annotation in std::mem::take(&mut self.pending) {
            self.place_existing(annotation);
        }

        info!(
            "Map surface ready: {} overlay(s), {} annotation(s)",
            self.overlays.len(),
            self.layers.len()
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Resumes event handling after [`Annotator::detach`].
    ///
    /// Returns `false` when the surface is not loaded yet.
    pub fn attach(&mut self) -> bool {
        self.attached = self.surface.is_some();
        self.attached
    }

    /// Stops reacting to events.
    ///
    /// Any in-progress capture is dropped, held keys are forgotten and the
    /// surface's pan and zoom interactions are disabled again.
    pub fn detach(&mut self) {
        self.cancel_capture();
        self.held_key = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_dragging(false);
            surface.set_scroll_zoom(false);
        }
        self.attached = false;
        debug!("Annotator detached");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        debug!("Mode {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    /// The placed annotations with their layer handles.
    pub fn layers(&self) -> &Layers<S::Layer> {
        &self.layers
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.layers.annotations()
    }

    /// Current metadata snapshot, as handed to the update callback.
    pub fn snapshot(&self) -> Payload {
        self.layers.to_payload()
    }

    pub fn active(&self) -> Option<&AnnotationId> {
        self.active.as_ref()
    }

    pub fn held_key(&self) -> Option<Key> {
        self.held_key
    }

    /// Processes a key press. Returns `true` when the host should suppress
    /// the key's default action.
    ///
    /// Holding the zoom key enables wheel zoom, holding the pan key enables
    /// drag panning.
    pub fn on_key_press(&mut self, key: Key) -> bool {
        if !self.attached {
            return false;
        }
        self.held_key = Some(key);

        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        if key == self.zoom_key {
            surface.set_scroll_zoom(true);
            debug!("Wheel zoom enabled while {:?} is held", key);
            return true;
        }
        if key == self.pan_key {
            surface.set_dragging(true);
            debug!("Panning enabled while {:?} is held", key);
        }
        false
    }

    /// Processes a key release: any release turns panning and wheel zoom off.
    pub fn on_key_release(&mut self, _key: Key) {
        if !self.attached {
            return;
        }
        self.held_key = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.set_dragging(false);
            surface.set_scroll_zoom(false);
        }
    }

    /// Forwards a wheel zoom to the surface. Returns whether the view changed.
    pub fn on_wheel(&mut self, steps: f64) -> bool {
        if !self.attached {
            return false;
        }
        self.surface
            .as_mut()
            .is_some_and(|surface| surface.scroll_by(steps))
    }

    /// Forwards a drag pan to the surface. Returns whether the view changed.
    pub fn on_drag(&mut self, dx: f64, dy: f64) -> bool {
        if !self.attached {
            return false;
        }
        self.surface
            .as_mut()
            .is_some_and(|surface| surface.pan_by(dx, dy))
    }

    /// Marks the annotation owning `layer` as active.
    ///
    /// The active reference is reported with the next update.
    pub fn on_layer_click(&mut self, layer: &S::Layer) {
        if !self.attached {
            return;
        }
        if let Some(placed) = self.layers.find_layer(layer) {
            debug!("Annotation {} is now active", placed.key);
            self.active = Some(placed.key.clone());
        }
    }

    /// Routes a host event to the matching handler.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Mode { mode } => self.set_mode(*mode),
            InputEvent::PointerDown { at } => self.on_pointer_down(*at),
            InputEvent::PointerMove { at } => self.on_pointer_move(*at),
            InputEvent::PointerUp { at } => self.on_pointer_up(*at),
            InputEvent::Click { at } => self.on_click(*at),
            InputEvent::KeyDown { key } => {
                self.on_key_press(Key::parse(key));
            }
            InputEvent::KeyUp { key } => self.on_key_release(Key::parse(key)),
            InputEvent::Wheel { steps } => {
                self.on_wheel(*steps);
            }
            InputEvent::Drag { dx, dy } => {
                self.on_drag(*dx, *dy);
            }
            InputEvent::Clear => {
                self.remove_all_markers();
            }
        }
    }

    /// Reports the current snapshot through the update callback.
    fn notify(&mut self) {
        let active = ActiveRef {
            id: self.active.clone(),
        };
        let payload = self.layers.to_payload();
        (self.update)(&active, &payload);
    }
}

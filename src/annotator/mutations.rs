use crate::annotation::{Annotation, AnnotationId, Layers, Payload, Shape, Title};
use crate::geo::LatLng;
use crate::surface::MapSurface;
use log::{debug, info};

use super::Annotator;

/// Popup text of markers without a title.
const DEFAULT_POPUP: &str = "pin";

impl<S: MapSurface> Annotator<S> {
    /// Places a marker at `at`.
    ///
    /// With `existing`, the given metadata is kept (its geometry is set to
    /// `at`) and no update is reported. Without it, fresh metadata is created
    /// and the update callback runs. Returns `None` before initialization.
    pub fn add_marker(&mut self, at: LatLng, existing: Option<Annotation>) -> Option<AnnotationId> {
        let popup = existing
            .as_ref()
            .and_then(|annotation| annotation.title.as_ref())
            .map_or_else(|| DEFAULT_POPUP.to_string(), ToString::to_string);

        let Some(surface) = self.surface.as_mut() else {
            debug!("Ignoring marker at {at}: surface not loaded");
            return None;
        };
        let layer = surface.add_marker(at, &self.styles.marker, &popup);
        Some(self.commit(layer, Shape::Marker { at }, existing))
    }

    /// Places a circle centred on `center`. Same contract as
    /// [`Annotator::add_marker`].
    pub fn add_circle(
        &mut self,
        center: LatLng,
        existing: Option<Annotation>,
    ) -> Option<AnnotationId> {
        let Some(surface) = self.surface.as_mut() else {
            debug!("Ignoring circle at {center}: surface not loaded");
            return None;
        };
        let layer = surface.add_circle(center, &self.styles.circle);
        Some(self.commit(layer, Shape::Circle { center }, existing))
    }

    /// Places a polygon through `points`. Same contract as
    /// [`Annotator::add_marker`].
    ///
    /// Returns `None` as well when the surface rejects the point list
    /// (for example when it is empty); nothing is recorded then.
    pub fn add_line(
        &mut self,
        points: Vec<LatLng>,
        existing: Option<Annotation>,
    ) -> Option<AnnotationId> {
        let Some(surface) = self.surface.as_mut() else {
            debug!("Ignoring polygon: surface not loaded");
            return None;
        };
        let Some(layer) = surface.add_polyline(&points, &self.styles.path) else {
            debug!("Surface rejected polygon with {} point(s)", points.len());
            return None;
        };
        Some(self.commit(layer, Shape::Polygon { points }, existing))
    }

    /// Removes every annotation from the surface and the collection.
    ///
    /// The update callback is not invoked. Returns the (now empty) metadata
    /// list.
    pub fn remove_all_markers(&mut self) -> Vec<Annotation> {
        let removed = self.clear_layers();
        if removed > 0 {
            info!("Removed {removed} annotation(s)");
        }
        self.layers.annotations().cloned().collect()
    }

    /// Replaces the annotation set with `payload`.
    ///
    /// Before initialization the payload is held and placed once the surface
    /// loads. No update is reported either way.
    pub fn populate_markers(&mut self, payload: Payload) -> &Layers<S::Layer> {
        if self.surface.is_none() {
            debug!(
                "Surface not loaded; holding {} annotation(s)",
                payload.data.len()
            );
            self.pending = payload.data;
            return &self.layers;
        }

        self.clear_layers();
        for annotation in payload.data {
            self.place_existing(annotation);
        }
        debug!("Populated {} annotation(s)", self.layers.len());
        &self.layers
    }

    /// Removes a single annotation and reports the update.
    pub fn remove_annotation(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let placed = self.layers.remove(id)?;
        if let Some(surface) = self.surface.as_mut() {
            surface.remove_layer(&placed.layer);
        }
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        debug!("Removed annotation {id}");
        self.notify();
        Some(placed.annotation)
    }

    /// Places stored metadata according to its shape, without reporting.
    pub(super) fn place_existing(&mut self, annotation: Annotation) -> Option<AnnotationId> {
        match &annotation.shape {
            Shape::Marker { at } => {
                let at = *at;
                self.add_marker(at, Some(annotation))
            }
            Shape::Circle { center } => {
                let center = *center;
                self.add_circle(center, Some(annotation))
            }
            Shape::Polygon { points } => {
                let points = points.clone();
                self.add_line(points, Some(annotation))
            }
        }
    }

    /// Records a freshly added layer with its metadata.
    fn commit(&mut self, layer: S::Layer, shape: Shape, existing: Option<Annotation>) -> AnnotationId {
        match existing {
            Some(mut annotation) => {
                annotation.shape = shape;
                self.layers.push(layer, annotation)
            }
            None => {
                let id = AnnotationId::generate();
                let title = Title::Index(self.layers.len() as u64 + 1);
                let kind = shape.kind();
                let annotation = Annotation::new(shape).with_id(id).with_title(title);
                let key = self.layers.push(layer, annotation);
                debug!("Added {kind:?} annotation {key}");
                self.notify();
                key
            }
        }
    }

    fn clear_layers(&mut self) -> usize {
        let placed = self.layers.take_all();
        if let Some(surface) = self.surface.as_mut() {
            for entry in &placed {
                surface.remove_layer(&entry.layer);
            }
        }
        self.active = None;
        placed.len()
    }
}

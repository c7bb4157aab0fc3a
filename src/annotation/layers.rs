//! Paired collection of render layers and annotation metadata.

use super::{Annotation, AnnotationId, Payload};

/// One placed annotation: its live surface layer and its metadata.
#[derive(Debug, Clone)]
pub struct Placed<L> {
    /// Stable key of the record, unique within the collection
    pub key: AnnotationId,
    /// Handle of the layer on the rendering surface
    pub layer: L,
    pub annotation: Annotation,
}

/// Ordered collection of placed annotations (first = bottom layer).
///
/// Layers and metadata live in the same record, so the two views can never
/// drift apart.
#[derive(Debug, Clone)]
pub struct Layers<L> {
    entries: Vec<Placed<L>>,
}

impl<L> Default for Layers<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Layers<L> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placed<L>> {
        self.entries.iter()
    }

    /// Layer handles in insertion order.
    pub fn layers(&self) -> impl Iterator<Item = &L> {
        self.entries.iter().map(|entry| &entry.layer)
    }

    /// Annotation metadata in insertion order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.iter().map(|entry| &entry.annotation)
    }

    pub fn get(&self, key: &AnnotationId) -> Option<&Placed<L>> {
        self.entries.iter().find(|entry| &entry.key == key)
    }

    pub fn contains_key(&self, key: &AnnotationId) -> bool {
        self.get(key).is_some()
    }

    /// Appends a record and returns its key.
    ///
    /// The key is the annotation's own id when it has one that is not taken
    /// yet; otherwise a fresh one is generated.
    pub fn push(&mut self, layer: L, annotation: Annotation) -> AnnotationId {
        let key = match &annotation.id {
            Some(id) if !self.contains_key(id) => id.clone(),
            _ => AnnotationId::generate(),
        };
        self.entries.push(Placed {
            key: key.clone(),
            layer,
            annotation,
        });
        key
    }

    /// Removes a record by key.
    pub fn remove(&mut self, key: &AnnotationId) -> Option<Placed<L>> {
        let index = self.entries.iter().position(|entry| &entry.key == key)?;
        Some(self.entries.remove(index))
    }

    /// Removes every record, returning them in insertion order.
    pub fn take_all(&mut self) -> Vec<Placed<L>> {
        std::mem::take(&mut self.entries)
    }

    /// Metadata snapshot in insertion order.
    pub fn to_payload(&self) -> Payload {
        Payload::new(self.annotations().cloned().collect())
    }
}

impl<L: PartialEq> Layers<L> {
    /// Finds the record owning `layer`.
    pub fn find_layer(&self, layer: &L) -> Option<&Placed<L>> {
        self.entries.iter().find(|entry| &entry.layer == layer)
    }
}

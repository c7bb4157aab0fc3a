//! Annotation metadata and its wire format.
//!
//! An [`Annotation`] is the serializable record describing one placed shape.
//! The JSON form is the one exchanged with hosts:
//!
//! ```json
//! { "type": "marker", "coord": [10, 10], "title": 1, "data": "" }
//! ```
//!
//! `coord` is a single point for markers and circles and a point list for
//! polygons. Fields the crate does not know about are carried through
//! unchanged.

pub mod layers;

pub use layers::{Layers, Placed};

use crate::geo::LatLng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Identifier of a placed annotation.
///
/// Freshly placed annotations get a time-ordered random id; ids supplied by
/// a bulk-load are kept as given, including numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationId {
    Text(String),
    Number(serde_json::Number),
}

impl AnnotationId {
    /// Generates a new id from the current time and random bits.
    pub fn generate() -> Self {
        Self::Text(Uuid::now_v7().to_string())
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Display label of an annotation.
///
/// Hosts may store any JSON value as a title; values that are neither a
/// position nor a string are kept verbatim in [`Title::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Title {
    /// Insertion position (1-based), the default for fresh annotations
    Index(u64),
    Label(String),
    Other(Value),
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Label(label) => f.write_str(label),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Shape discriminator as it appears in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Marker,
    Circle,
    Polygon,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Marker => "marker",
            Self::Circle => "circle",
            Self::Polygon => "polygon",
        })
    }
}

/// Geometry of a placed annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Pin at a single point
    Marker { at: LatLng },
    /// Fixed-radius circle around a point
    Circle { center: LatLng },
    /// Freehand outline traced by a draw gesture
    Polygon { points: Vec<LatLng> },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Marker { .. } => ShapeKind::Marker,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Builds a shape of `kind` from its raw `coord` value.
    pub fn from_coord(kind: ShapeKind, coord: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ShapeKind::Marker => Self::Marker {
                at: serde_json::from_value(coord)?,
            },
            ShapeKind::Circle => Self::Circle {
                center: serde_json::from_value(coord)?,
            },
            ShapeKind::Polygon => Self::Polygon {
                points: serde_json::from_value(coord)?,
            },
        })
    }

    fn coord(&self) -> Value {
        let value = match self {
            Self::Marker { at } => serde_json::to_value(at),
            Self::Circle { center } => serde_json::to_value(center),
            Self::Polygon { points } => serde_json::to_value(points),
        };
        // LatLng serialization only produces finite numbers or null.
        value.unwrap_or(Value::Null)
    }
}

/// Metadata for one placed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnnotationRecord", into = "AnnotationRecord")]
pub struct Annotation {
    pub id: Option<AnnotationId>,
    pub shape: Shape,
    pub title: Option<Title>,
    /// Opaque user payload; `None` when the field was absent
    pub data: Option<Value>,
    /// Unrecognised fields, preserved for the host
    pub extra: Map<String, Value>,
}

impl Annotation {
    /// Creates metadata for a shape placed by the user.
    pub fn new(shape: Shape) -> Self {
        Self {
            id: None,
            shape,
            title: None,
            data: Some(Value::String(String::new())),
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: AnnotationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: Title) -> Self {
        self.title = Some(title);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

#[derive(Serialize, Deserialize)]
struct AnnotationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<AnnotationId>,
    #[serde(rename = "type")]
    kind: ShapeKind,
    coord: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<Title>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    data: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only a missing field is `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<AnnotationRecord> for Annotation {
    type Error = serde_json::Error;

    fn try_from(record: AnnotationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            shape: Shape::from_coord(record.kind, record.coord)?,
            title: record.title,
            data: record.data,
            extra: record.extra,
        })
    }
}

impl From<Annotation> for AnnotationRecord {
    fn from(annotation: Annotation) -> Self {
        Self {
            id: annotation.id,
            kind: annotation.shape.kind(),
            coord: annotation.shape.coord(),
            title: annotation.title,
            data: annotation.data,
            extra: annotation.extra,
        }
    }
}

/// Snapshot of all annotations, as handed to the update callback and
/// accepted by bulk-load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub data: Vec<Annotation>,
}

impl Payload {
    pub fn new(data: Vec<Annotation>) -> Self {
        Self { data }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Reference to the currently active annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveRef {
    pub id: Option<AnnotationId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marker_with_only_type_and_coord_keeps_optional_fields_absent() {
        let annotation: Annotation =
            serde_json::from_value(json!({"type": "marker", "coord": [10, 10]})).unwrap();

        assert_eq!(
            annotation.shape,
            Shape::Marker {
                at: LatLng::new(10.0, 10.0)
            }
        );
        assert!(annotation.id.is_none());
        assert!(annotation.title.is_none());
        assert!(annotation.data.is_none());
    }

    #[test]
    fn polygon_parses_point_list_in_either_form() {
        let annotation: Annotation = serde_json::from_value(json!({
            "type": "polygon",
            "coord": [[1, 2], {"lat": 3, "lng": 4}],
            "title": "fence",
        }))
        .unwrap();

        assert_eq!(
            annotation.shape,
            Shape::Polygon {
                points: vec![LatLng::new(1.0, 2.0), LatLng::new(3.0, 4.0)]
            }
        );
        assert_eq!(annotation.title, Some(Title::Label("fence".into())));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<Annotation, _> =
            serde_json::from_value(json!({"type": "hexagon", "coord": [0, 0]}));
        assert!(result.is_err());
    }

    #[test]
    fn coord_must_match_kind() {
        let result: Result<Annotation, _> =
            serde_json::from_value(json!({"type": "circle", "coord": [[0, 0], [1, 1]]}));
        assert!(result.is_err());
    }

    #[test]
    fn supplied_ids_titles_and_extra_fields_survive_serialization() {
        let input = json!({
            "id": 1697040000123.5,
            "type": "circle",
            "coord": {"lat": 5.0, "lng": 6.0},
            "title": 3,
            "data": {"note": "well"},
            "colour": "red",
        });
        let annotation: Annotation = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(annotation.extra.get("colour"), Some(&json!("red")));

        let output = serde_json::to_value(&annotation).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn fresh_annotation_has_empty_string_payload() {
        let annotation = Annotation::new(Shape::Circle {
            center: LatLng::new(0.0, 0.0),
        })
        .with_title(Title::Index(1));
        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["data"], json!(""));
        assert_eq!(json["title"], json!(1));
        assert_eq!(json["type"], json!("circle"));
    }

    #[test]
    fn titles_of_any_json_type_are_kept() {
        let payload = Payload::from_json(
            r#"{"data": [
                {"type": "marker", "coord": [1, 1], "title": 1.5},
                {"type": "marker", "coord": [2, 2], "title": -1},
                {"type": "marker", "coord": [3, 3], "title": true}
            ]}"#,
        )
        .unwrap();

        let titles: Vec<String> = payload
            .data
            .iter()
            .map(|a| a.title.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["1.5", "-1", "true"]);

        let output = serde_json::to_value(&payload).unwrap();
        assert_eq!(output["data"][0]["title"], json!(1.5));
        assert_eq!(output["data"][1]["title"], json!(-1));
        assert_eq!(output["data"][2]["title"], json!(true));
    }

    #[test]
    fn explicit_null_data_is_distinct_from_missing_data() {
        let with_null: Annotation =
            serde_json::from_value(json!({"type": "marker", "coord": [1, 1], "data": null}))
                .unwrap();
        assert_eq!(with_null.data, Some(Value::Null));
        let output = serde_json::to_value(&with_null).unwrap();
        assert_eq!(output.get("data"), Some(&Value::Null));

        let without: Annotation =
            serde_json::from_value(json!({"type": "marker", "coord": [1, 1]})).unwrap();
        let output = serde_json::to_value(&without).unwrap();
        assert!(output.get("data").is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(AnnotationId::generate(), AnnotationId::generate());
    }

    #[test]
    fn payload_defaults_to_empty_data() {
        let payload = Payload::from_json("{}").unwrap();
        assert!(payload.data.is_empty());
    }
}

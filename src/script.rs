//! Recorded event scripts and annotation files.
//!
//! A script is a JSON array of [`InputEvent`]s; replaying it drives an
//! [`Annotator`] exactly as a host would.

use crate::annotation::Payload;
use crate::annotator::Annotator;
use crate::input::InputEvent;
use crate::surface::MapSurface;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads an event script from `path`.
pub fn load_script(path: &Path) -> Result<Vec<InputEvent>, ScriptError> {
    let text = read(path)?;
    let events: Vec<InputEvent> =
        serde_json::from_str(&text).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded {} event(s) from {}", events.len(), path.display());
    Ok(events)
}

/// Reads an annotation payload (`{"data": [...]}`) from `path`.
pub fn load_payload(path: &Path) -> Result<Payload, ScriptError> {
    let text = read(path)?;
    Payload::from_json(&text).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Feeds `events` to `annotator` in order.
pub fn replay<S: MapSurface>(annotator: &mut Annotator<S>, events: &[InputEvent]) {
    for event in events {
        debug!("Replaying {:?}", event);
        annotator.handle_event(event);
    }
    info!(
        "Replayed {} event(s); {} annotation(s) placed",
        events.len(),
        annotator.layers().len()
    );
}

fn read(path: &Path) -> Result<String, ScriptError> {
    fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })
}

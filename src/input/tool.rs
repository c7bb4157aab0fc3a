//! Interaction mode selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Active annotation tool.
///
/// The mode decides what a pointer gesture produces:
/// `Draw` traces a freehand polygon while the button is held, `Pin` and
/// `Circle` place a shape on every click, `Idle` ignores gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Freehand polygon (initial mode; drops back to `Idle` after one shape)
    #[default]
    Draw,
    /// Pin marker on click
    Pin,
    /// Circle on click
    Circle,
    /// No active tool
    #[serde(alias = "")]
    Idle,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Draw => "draw",
            Mode::Pin => "pin",
            Mode::Circle => "circle",
            Mode::Idle => "idle",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_is_initial_mode() {
        assert_eq!(Mode::default(), Mode::Draw);
    }

    #[test]
    fn empty_name_means_idle() {
        let mode: Mode = serde_json::from_str(r#""""#).unwrap();
        assert_eq!(mode, Mode::Idle);
        let mode: Mode = serde_json::from_str(r#""pin""#).unwrap();
        assert_eq!(mode, Mode::Pin);
    }
}

//! Generic input event types delivered by the host.

use crate::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Generic key representation.
///
/// Hosts map their native key names to these values; [`Key::parse`] accepts
/// DOM-style names (`"z"`, `"Alt"`, `"Escape"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols), case-sensitive
    Char(char),
    /// Escape key
    Escape,
    /// Return/Enter key
    Return,
    /// Tab key
    Tab,
    /// Space bar
    Space,
    /// Shift modifier
    Shift,
    /// Ctrl modifier
    Ctrl,
    /// Alt modifier
    Alt,
    /// Meta/Super modifier
    Meta,
    /// Unmapped or unrecognized key
    Unknown,
}

impl Key {
    /// Parses a key name.
    pub fn parse(name: &str) -> Self {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return if c == ' ' { Key::Space } else { Key::Char(c) };
        }

        match name.to_ascii_lowercase().as_str() {
            "escape" | "esc" => Key::Escape,
            "enter" | "return" => Key::Return,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "shift" => Key::Shift,
            "control" | "ctrl" => Key::Ctrl,
            "alt" | "option" => Key::Alt,
            "meta" | "super" => Key::Meta,
            _ => Key::Unknown,
        }
    }
}

/// One host event, as recorded in replay scripts.
///
/// ```json
/// [
///   {"event": "pointer_down", "at": [100, 100]},
///   {"event": "pointer_move", "at": [120, 140]},
///   {"event": "pointer_up", "at": [120, 140]},
///   {"event": "mode", "mode": "pin"},
///   {"event": "click", "at": [300, 500]},
///   {"event": "key_down", "key": "z"},
///   {"event": "wheel", "steps": 1},
///   {"event": "key_up", "key": "z"}
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    /// Switch the active tool
    Mode { mode: super::Mode },
    PointerDown { at: LatLng },
    PointerMove { at: LatLng },
    PointerUp { at: LatLng },
    Click { at: LatLng },
    KeyDown { key: String },
    KeyUp { key: String },
    /// Wheel zoom in steps (positive zooms in)
    Wheel { steps: f64 },
    /// Drag pan by a pixel offset
    Drag { dx: f64, dy: f64 },
    /// Remove every annotation
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Mode;

    #[test]
    fn parses_dom_key_names() {
        assert_eq!(Key::parse("z"), Key::Char('z'));
        assert_eq!(Key::parse("Z"), Key::Char('Z'));
        assert_eq!(Key::parse("Alt"), Key::Alt);
        assert_eq!(Key::parse("Control"), Key::Ctrl);
        assert_eq!(Key::parse(" "), Key::Space);
        assert_eq!(Key::parse(""), Key::Unknown);
        assert_eq!(Key::parse("F13"), Key::Unknown);
    }

    #[test]
    fn events_deserialize_from_script_form() {
        let events: Vec<InputEvent> = serde_json::from_str(
            r#"[
                {"event": "mode", "mode": "circle"},
                {"event": "click", "at": {"lat": 1, "lng": 2}},
                {"event": "key_down", "key": "Alt"},
                {"event": "drag", "dx": 5, "dy": -3},
                {"event": "clear"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                InputEvent::Mode { mode: Mode::Circle },
                InputEvent::Click {
                    at: LatLng::new(1.0, 2.0)
                },
                InputEvent::KeyDown { key: "Alt".into() },
                InputEvent::Drag { dx: 5.0, dy: -3.0 },
                InputEvent::Clear,
            ]
        );
    }
}

//! Configuration enum types.

use crate::draw::{Color, color};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - a named color, a hex string, or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// color = "black"
///
/// # Hex color
/// fill_color = "#257ef4"
///
/// # Custom RGB color (0-255 per component)
/// color = [51, 136, 255]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (red, green, blue, white, black) or `#rrggbb`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    pub fn hex(hex: &str) -> Self {
        ColorSpec::Name(hex.to_string())
    }

    /// Resolves the specification, or `None` when a name is not recognised.
    pub fn try_to_color(&self) -> Option<Color> {
        match self {
            ColorSpec::Name(name) if name.trim_start().starts_with('#') => Color::from_hex(name),
            ColorSpec::Name(name) => color::name_to_color(name),
            ColorSpec::Rgb([r, g, b]) => Some(Color::from_rgb8(*r, *g, *b)),
        }
    }

    /// Converts the color specification to a [`Color`] struct.
    ///
    /// Unknown names resolve to black with a warning; [`crate::Config`]
    /// replaces them with defaults on load, so this only happens for
    /// hand-built configurations.
    pub fn to_color(&self) -> Color {
        self.try_to_color().unwrap_or_else(|| {
            warn!("Unknown color {:?}, using black", self);
            color::BLACK
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_hex_and_rgb() {
        assert_eq!(
            ColorSpec::Name("white".into()).try_to_color(),
            Some(color::WHITE)
        );
        assert_eq!(
            ColorSpec::hex("#000000").try_to_color(),
            Some(color::BLACK)
        );
        assert_eq!(
            ColorSpec::Rgb([255, 0, 0]).try_to_color(),
            Some(color::RED)
        );
        assert_eq!(ColorSpec::Name("mauve".into()).try_to_color(), None);
    }

    #[test]
    fn deserializes_from_string_or_array() {
        #[derive(Deserialize)]
        struct Wrapper {
            color: ColorSpec,
        }

        let named: Wrapper = toml::from_str(r##"color = "#257ef4""##).unwrap();
        assert_eq!(named.color, ColorSpec::hex("#257ef4"));

        let rgb: Wrapper = toml::from_str("color = [1, 2, 3]").unwrap();
        assert_eq!(rgb.color, ColorSpec::Rgb([1, 2, 3]));
    }
}

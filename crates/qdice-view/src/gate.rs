//! Gate kinds and glyph styling.
//!
//! Engine gate identifiers are free text. They are resolved once per step
//! into a closed [`GateKind`] so that color, label and the controlled-form
//! test all come from a single place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved gate identifier of the synthesized initial step.
pub const INIT_GATE_ID: &str = "init";

/// Prefix marking a controlled gate (`cx`, `cry`, `ccx`, ...).
pub const CONTROLLED_MARKER: &str = "c";

/// An sRGB color used for glyph fills and strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Parse a `#rrggbb` string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Color(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Palette shared by the layout engine.
pub mod palette {
    use super::Color;

    /// Fill of the highlighted (current) gate.
    pub const HIGHLIGHT: Color = Color(0xff, 0xea, 0xa7);
    /// Ink for gate outlines, labels, control dots and connectors.
    pub const INK: Color = Color(0x2d, 0x34, 0x36);
    /// Qubit wires.
    pub const WIRE: Color = Color(0xb2, 0xbe, 0xc3);
    /// Dashed step boundary markers.
    pub const MARKER: Color = Color(0x63, 0x6e, 0x72);

    pub const RY: Color = Color(0x6c, 0x5c, 0xe7);
    pub const MCRY: Color = Color(0x00, 0xb8, 0x94);
    pub const X: Color = Color(0xfd, 0x79, 0xa8);
    pub const MEASURE: Color = Color(0xfa, 0xb1, 0xa0);
    pub const DEFAULT: Color = Color(0xdf, 0xe6, 0xe9);
}

/// Known gate kinds, plus a catch-all for anything else the engine emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// No gate at this step (empty identifier).
    Empty,
    /// The synthesized all-zero initial state.
    Init,
    H,
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    Cx,
    Cz,
    Cry,
    /// Multi-controlled Y rotation.
    Mcry,
    Measure,
    /// Any other identifier, stored lowercased.
    Other(String),
}

impl GateKind {
    /// Resolve an engine gate identifier (case-insensitive).
    pub fn from_id(id: &str) -> Self {
        let id = id.trim().to_ascii_lowercase();
        match id.as_str() {
            "" => GateKind::Empty,
            INIT_GATE_ID => GateKind::Init,
            "h" => GateKind::H,
            "x" => GateKind::X,
            "y" => GateKind::Y,
            "z" => GateKind::Z,
            "rx" => GateKind::Rx,
            "ry" => GateKind::Ry,
            "rz" => GateKind::Rz,
            "cx" | "cnot" => GateKind::Cx,
            "cz" => GateKind::Cz,
            "cry" => GateKind::Cry,
            "mcry" => GateKind::Mcry,
            "measure" => GateKind::Measure,
            _ => GateKind::Other(id),
        }
    }

    /// Whether a glyph is drawn for this step.
    pub fn is_drawable(&self) -> bool {
        !matches!(self, GateKind::Empty | GateKind::Init)
    }

    /// Whether the identifier denotes a controlled form, i.e. begins with
    /// [`CONTROLLED_MARKER`]. Multi-controlled ids such as `mcry` do not.
    ///
    /// Qubit count is not considered here; see
    /// [`StepLayout::analyze`](crate::layout::StepLayout::analyze).
    pub fn is_controlled_form(&self) -> bool {
        match self {
            GateKind::Cx | GateKind::Cz | GateKind::Cry => true,
            GateKind::Other(id) => id.starts_with(CONTROLLED_MARKER),
            _ => false,
        }
    }

    /// Fill color of the gate glyph when not highlighted.
    pub fn color(&self) -> Color {
        match self {
            GateKind::Ry => palette::RY,
            GateKind::Mcry => palette::MCRY,
            GateKind::X => palette::X,
            GateKind::Measure => palette::MEASURE,
            _ => palette::DEFAULT,
        }
    }

    /// Canonical lowercase identifier.
    pub fn id(&self) -> &str {
        match self {
            GateKind::Empty => "",
            GateKind::Init => INIT_GATE_ID,
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::Cx => "cx",
            GateKind::Cz => "cz",
            GateKind::Cry => "cry",
            GateKind::Mcry => "mcry",
            GateKind::Measure => "measure",
            GateKind::Other(id) => id,
        }
    }

    /// Glyph label (uppercased identifier).
    pub fn label(&self) -> String {
        self.id().to_ascii_uppercase()
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_is_case_insensitive() {
        assert_eq!(GateKind::from_id("RY"), GateKind::Ry);
        assert_eq!(GateKind::from_id(" mcry "), GateKind::Mcry);
        assert_eq!(GateKind::from_id("CX"), GateKind::Cx);
    }

    #[test]
    fn test_empty_and_init_are_not_drawable() {
        assert!(!GateKind::from_id("").is_drawable());
        assert!(!GateKind::from_id(INIT_GATE_ID).is_drawable());
        assert!(GateKind::from_id("h").is_drawable());
    }

    #[test]
    fn test_controlled_forms() {
        assert!(GateKind::from_id("cx").is_controlled_form());
        assert!(GateKind::from_id("ccx").is_controlled_form());
        assert!(GateKind::from_id("cswap").is_controlled_form());
        assert!(!GateKind::from_id("mcry").is_controlled_form());
        assert!(!GateKind::from_id("mcx").is_controlled_form());
        assert!(!GateKind::from_id("ry").is_controlled_form());
        assert!(!GateKind::from_id("measure").is_controlled_form());
        assert!(!GateKind::from_id("").is_controlled_form());
    }

    #[test]
    fn test_colors_fall_back_to_default() {
        assert_eq!(GateKind::Ry.color(), palette::RY);
        assert_eq!(GateKind::X.color(), palette::X);
        assert_eq!(GateKind::from_id("u3").color(), palette::DEFAULT);
        assert_eq!(GateKind::H.color(), palette::DEFAULT);
    }

    #[test]
    fn test_label_uppercases() {
        assert_eq!(GateKind::Mcry.label(), "MCRY");
        assert_eq!(GateKind::from_id("sx").label(), "SX");
    }

    #[test]
    fn test_color_hex_roundtrip() {
        assert_eq!(palette::HIGHLIGHT.to_string(), "#ffeaa7");
        assert_eq!(Color::from_hex("#6c5ce7"), Some(palette::RY));
        assert_eq!(Color::from_hex("6c5ce7"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }
}

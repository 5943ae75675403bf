use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Rgb8 – renderer-neutral colour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const GRAY: Rgb8 = Rgb8(160, 160, 160);

    /// `#rrggbb`, as consumed by web chart renderers.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb8(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Rgb8
// ---------------------------------------------------------------------------

/// Maps a fixed set of category labels (sites, booster categories) to
/// distinct colours. Built once per dataset so colours stay put while the
/// filters change.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Rgb8>,
    default_color: Rgb8,
}

impl ColorMap {
    /// Assign palette colours to `labels` in the order given.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels
            .iter()
            .zip(palette)
            .map(|(label, c)| (label.as_ref().to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Rgb8::GRAY,
        }
    }

    /// Look up the colour for a label; unknown labels get grey.
    pub fn color_for(&self, label: &str) -> Rgb8 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Fixed series colours
// ---------------------------------------------------------------------------

pub const BATTERY_COLOR: Color32 = Color32::from_rgb(75, 192, 192);
pub const STRAIN_COLOR: Color32 = Color32::from_rgb(53, 162, 235);
pub const ANOMALY_COLOR: Color32 = Color32::from_rgb(220, 38, 38);
pub const PREDICTION_COLOR: Color32 = Color32::from_rgb(255, 159, 64);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Channel name → colour
// ---------------------------------------------------------------------------

/// Gives every strain channel a stable swatch for the selector.
#[derive(Debug, Clone)]
pub struct ChannelPalette {
    mapping: BTreeMap<String, Color32>,
}

impl ChannelPalette {
    pub fn new(channels: &[String]) -> Self {
        let mapping = channels
            .iter()
            .cloned()
            .zip(generate_palette(channels.len()))
            .collect();
        Self { mapping }
    }

    /// Channels outside the palette fall back to the strain colour.
    pub fn color_for(&self, channel: &str) -> Color32 {
        self.mapping.get(channel).copied().unwrap_or(STRAIN_COLOR)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(17);
        assert_eq!(colors.len(), 17);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_channel_uses_strain_colour() {
        let names = vec!["Strain(1)".to_string(), "Strain(2)".to_string()];
        let palette = ChannelPalette::new(&names);
        assert_eq!(palette.len(), 2);
        assert_ne!(palette.color_for("Strain(1)"), palette.color_for("Strain(2)"));
        assert_eq!(palette.color_for("Strain(9)"), STRAIN_COLOR);
    }
}

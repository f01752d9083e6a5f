use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging map for the correlation heatmap
// ---------------------------------------------------------------------------

/// Blue for -1, near-white for 0, red for +1. NaN renders grey.
pub fn coolwarm(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::GRAY;
    }
    let v = value.clamp(-1.0, 1.0) as f32;
    let hue = if v < 0.0 { 225.0 } else { 5.0 };
    hsl_to_color32(hue, 0.7, 0.95 - 0.4 * v.abs())
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(3);
        assert_eq!(p.len(), 3);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn coolwarm_diverges_around_zero() {
        let neg = coolwarm(-1.0);
        let pos = coolwarm(1.0);
        assert!(neg.b() > neg.r());
        assert!(pos.r() > pos.b());
        assert_eq!(coolwarm(f64::NAN), Color32::GRAY);
        assert_eq!(text_on(coolwarm(0.0)), Color32::BLACK);
    }
}

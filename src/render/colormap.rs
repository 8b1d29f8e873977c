//! Value-to-color mapping for matrix images

use super::figure::{ImageOptions, Rgb};

/// Maps a data value to a color
pub trait Colormap {
    fn rgb(&self, value: f64) -> Rgb;
}

/// Blue-white-red map with white pinned at zero
///
/// Negative values scale against `min`, positive against `max`, so an
/// asymmetric data range still puts zero at white.
#[derive(Debug, Clone, Copy)]
pub struct DivergingColormap {
    min: f64,
    max: f64,
}

impl DivergingColormap {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

fn blend(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

const WHITE: Rgb = (255, 255, 255);
const RED: Rgb = (178, 24, 43);
const BLUE: Rgb = (33, 102, 172);

impl Colormap for DivergingColormap {
    fn rgb(&self, value: f64) -> Rgb {
        if !value.is_finite() {
            return WHITE;
        }
        if value >= 0.0 {
            if self.max <= 0.0 {
                return WHITE;
            }
            blend(WHITE, RED, value / self.max)
        } else {
            if self.min >= 0.0 {
                return WHITE;
            }
            blend(WHITE, BLUE, value / self.min)
        }
    }
}

/// White (min) to black (max)
#[derive(Debug, Clone, Copy)]
pub struct GrayColormap {
    min: f64,
    max: f64,
}

impl GrayColormap {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Colormap for GrayColormap {
    fn rgb(&self, value: f64) -> Rgb {
        let span = self.max - self.min;
        if !value.is_finite() || span <= 0.0 {
            return WHITE;
        }
        blend(WHITE, (0, 0, 0), (value - self.min) / span)
    }
}

/// Colormap named by the `cmap` image option; diverging when absent or unknown
pub fn colormap_for(options: &ImageOptions, min: f64, max: f64) -> Box<dyn Colormap> {
    match options.get("cmap") {
        Some("gray") | Some("grey") | Some("Greys") => Box::new(GrayColormap::new(min, max)),
        Some("diverging") | Some("RdBu_r") | None => Box::new(DivergingColormap::new(min, max)),
        Some(other) => {
            log::debug!("Unknown cmap '{}', using diverging", other);
            Box::new(DivergingColormap::new(min, max))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diverging_centered_at_zero() {
        let cmap = DivergingColormap::new(-1.0, 4.0);
        assert_eq!(cmap.rgb(0.0), WHITE);
        assert_eq!(cmap.rgb(4.0), RED);
        assert_eq!(cmap.rgb(-1.0), BLUE);
        assert_eq!(cmap.rgb(100.0), RED);
        assert_eq!(cmap.rgb(f64::NAN), WHITE);
    }

    #[test]
    fn test_gray_range() {
        let cmap = GrayColormap::new(0.0, 2.0);
        assert_eq!(cmap.rgb(0.0), WHITE);
        assert_eq!(cmap.rgb(2.0), (0, 0, 0));
        assert_eq!(cmap.rgb(1.0), (128, 128, 128));
    }

    #[test]
    fn test_colormap_by_option() {
        let opts = ImageOptions::new().set("cmap", "gray");
        assert_eq!(colormap_for(&opts, 0.0, 1.0).rgb(1.0), (0, 0, 0));
        let opts = ImageOptions::new().set("cmap", "viridis");
        assert_eq!(colormap_for(&opts, -1.0, 1.0).rgb(1.0), RED);
    }
}

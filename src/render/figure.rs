//! Backend-agnostic figure description
//!
//! Components build a [`Figure`] value; a [`RenderBackend`](super::RenderBackend)
//! turns it into pixels. Panel rectangles are figure fractions with the origin
//! at the bottom left.

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::annotation::GeneModel;
use crate::stats::{finite_range, padded_range};

/// 8-bit RGB color
pub type Rgb = (u8, u8, u8);

/// Style of a line series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: u32,
    /// Legend entry; unlabeled series are left out of the legend
    pub label: Option<String>,
}

impl LineStyle {
    pub fn new(color: Rgb, width: u32) -> Self {
        Self {
            color,
            width,
            label: None,
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::new((31, 119, 180), 1)
    }
}

/// Style of discrete point markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: Rgb,
    pub size: u32,
    /// Pick tolerance in pixels for interactive backends
    pub pick_radius: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: (128, 128, 128),
            size: 3,
            pick_radius: 5,
        }
    }
}

/// Data-space rectangle an image is stretched over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Free-form options forwarded to the backend's image call
///
/// Keys are not validated: anything a backend does not understand is carried
/// along unchanged and ignored at draw time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    entries: BTreeMap<String, String>,
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Entries of `other` override entries of `self`
    pub fn merged(mut self, other: &ImageOptions) -> Self {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Something drawn inside a panel
#[derive(Debug, Clone, PartialEq)]
pub enum PlotItem {
    /// Matrix drawn as colored cells, row 0 at the top of `extent`
    Image {
        data: Array2<f64>,
        extent: Extent,
        options: ImageOptions,
    },
    /// Vertical color scale for values in `[min, max]`
    Colorbar {
        min: f64,
        max: f64,
        options: ImageOptions,
    },
    Line {
        x: Vec<f64>,
        y: Vec<f64>,
        style: LineStyle,
    },
    /// Discrete points; pickable points report selections by index
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        style: MarkerStyle,
        pickable: bool,
    },
    /// One lane per gene: body line, exon boxes, label
    GeneModels { genes: Vec<GeneModel> },
}

/// What a panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRole {
    Matrix,
    MeanSignal,
    Strip,
    Colorbar,
    Signal,
    GeneTrack,
}

/// Panel placement as figure fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelRect {
    pub const fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub role: PanelRole,
    pub rect: PanelRect,
    pub items: Vec<PlotItem>,
    /// Fixed data ranges; derived from the items when `None`
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_ticks: bool,
    pub y_ticks: bool,
    /// Format x tick labels as integers
    pub integer_x_ticks: bool,
    pub legend: bool,
}

impl Panel {
    pub fn new(role: PanelRole, rect: PanelRect) -> Self {
        Self {
            role,
            rect,
            items: Vec::new(),
            x_range: None,
            y_range: None,
            x_label: None,
            y_label: None,
            x_ticks: true,
            y_ticks: true,
            integer_x_ticks: false,
            legend: false,
        }
    }

    pub fn with_item(mut self, item: PlotItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_x_range(mut self, min: f64, max: f64) -> Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn with_y_range(mut self, min: f64, max: f64) -> Self {
        self.y_range = Some((min, max));
        self
    }

    pub fn with_x_label(mut self, label: &str) -> Self {
        self.x_label = Some(label.to_string());
        self
    }

    pub fn with_y_label(mut self, label: &str) -> Self {
        self.y_label = Some(label.to_string());
        self
    }

    pub fn hide_x_ticks(mut self) -> Self {
        self.x_ticks = false;
        self
    }

    pub fn hide_y_ticks(mut self) -> Self {
        self.y_ticks = false;
        self
    }

    pub fn with_integer_x_ticks(mut self) -> Self {
        self.integer_x_ticks = true;
        self
    }

    pub fn with_legend(mut self) -> Self {
        self.legend = true;
        self
    }
}

/// A complete multi-panel figure
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: Option<String>,
    /// Pixel size
    pub size: (u32, u32),
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            title: None,
            size,
            panels: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    /// First panel with the given role
    pub fn panel(&self, role: PanelRole) -> Option<&Panel> {
        self.panels.iter().find(|p| p.role == role)
    }

    /// Indices of pickable points within their `pick_radius` of a click
    ///
    /// `px`/`py` are figure pixels with the origin at the top left, the way
    /// interactive backends report pointer positions. Panel data ranges map
    /// onto the full panel rectangle.
    pub fn pick(&self, px: f64, py: f64) -> Vec<usize> {
        let (w, h) = (self.size.0 as f64, self.size.1 as f64);
        let mut hits = Vec::new();
        for panel in &self.panels {
            let r = panel.rect;
            let left = r.left * w;
            let bottom = h - r.bottom * h;
            let (pw, ph) = (r.width * w, r.height * h);
            for item in &panel.items {
                let (x, y, style) = match item {
                    PlotItem::Points {
                        x,
                        y,
                        style,
                        pickable: true,
                    } => (x, y, style),
                    _ => continue,
                };
                let (x0, x1) = panel.x_range.unwrap_or_else(|| padded_range(finite_range(x)));
                let (y0, y1) = panel.y_range.unwrap_or_else(|| padded_range(finite_range(y)));
                let radius = style.pick_radius as f64;
                for (i, (&xi, &yi)) in x.iter().zip(y).enumerate() {
                    let dx = left + (xi - x0) / (x1 - x0) * pw - px;
                    let dy = bottom - (yi - y0) / (y1 - y0) * ph - py;
                    if dx.hypot(dy) <= radius {
                        hits.push(i);
                    }
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_options_override_and_pass_through() {
        let defaults = ImageOptions::new()
            .set("aspect", "auto")
            .set("interpolation", "nearest");
        let user = ImageOptions::new()
            .set("interpolation", "bilinear")
            .set("no_such_option", "42");
        let merged = defaults.merged(&user);

        assert_eq!(merged.get("aspect"), Some("auto"));
        assert_eq!(merged.get("interpolation"), Some("bilinear"));
        assert_eq!(merged.get("no_such_option"), Some("42"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_panel_lookup_by_role() {
        let fig = Figure::new((100, 100))
            .with_panel(Panel::new(PanelRole::Signal, PanelRect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(fig.panel(PanelRole::Signal).is_some());
        assert!(fig.panel(PanelRole::GeneTrack).is_none());
    }

    #[test]
    fn test_pick_uses_marker_radius() {
        // 100x100 px panel covering the figure, data 0..10 on both axes
        let points = |pick_radius, pickable| PlotItem::Points {
            x: vec![2.0, 8.0],
            y: vec![2.0, 8.0],
            style: MarkerStyle {
                pick_radius,
                ..MarkerStyle::default()
            },
            pickable,
        };
        let fig = |item| {
            Figure::new((100, 100)).with_panel(
                Panel::new(PanelRole::Strip, PanelRect::new(0.0, 0.0, 1.0, 1.0))
                    .with_item(item)
                    .with_x_range(0.0, 10.0)
                    .with_y_range(0.0, 10.0),
            )
        };

        // (2, 2) sits at pixel (20, 80)
        assert_eq!(fig(points(5, true)).pick(23.0, 84.0), vec![0]);
        assert!(fig(points(4, true)).pick(23.0, 84.0).is_empty());
        assert_eq!(fig(points(5, true)).pick(80.0, 20.0), vec![1]);
        assert!(fig(points(5, false)).pick(20.0, 80.0).is_empty());
    }
}

//! Coordinated heatmap / mean-signal / strip layout

use ndarray::{ArrayView2, Axis};

use super::figure::{
    Extent, Figure, ImageOptions, LineStyle, MarkerStyle, Panel, PanelRect, PanelRole, PlotItem,
};
use crate::data::RowOrder;
use crate::error::{ChipseqError, Result};
use crate::stats::{finite_range, padded_range};

const STRIP_RECT: PanelRect = PanelRect::new(0.04, 0.32, 0.05, 0.62);
const MATRIX_RECT: PanelRect = PanelRect::new(0.10, 0.32, 0.72, 0.62);
const LINE_RECT: PanelRect = PanelRect::new(0.10, 0.05, 0.72, 0.24);
const COLORBAR_RECT: PanelRect = PanelRect::new(0.86, 0.05, 0.05, 0.24);

/// Lays out a matrix heatmap, its mean profile, a pickable strip of one
/// point per row, and a colorbar
///
/// All panels share the row order and the x-axis domain. Strip point `k`
/// sits at `y = k + 0.5`, level with the matrix row drawn at that height.
#[derive(Debug, Clone)]
pub struct HeatmapComposer {
    pub strip_style: MarkerStyle,
    pub mean_style: LineStyle,
    pub size: (u32, u32),
}

impl Default for HeatmapComposer {
    fn default() -> Self {
        Self {
            strip_style: MarkerStyle::default(),
            mean_style: LineStyle::default(),
            size: (800, 1000),
        }
    }
}

impl HeatmapComposer {
    pub fn new(strip_style: MarkerStyle, size: (u32, u32)) -> Self {
        Self {
            strip_style,
            size,
            ..Self::default()
        }
    }

    /// Default image options; `extent` is set from the data
    fn base_image_options(extent: &Extent) -> ImageOptions {
        ImageOptions::new()
            .set("aspect", "auto")
            .set("interpolation", "nearest")
            .set(
                "extent",
                &format!(
                    "{},{},{},{}",
                    extent.x_min, extent.x_max, extent.y_min, extent.y_max
                ),
            )
    }

    /// Build the figure
    ///
    /// # Arguments
    /// * `x` - x-axis value of each column (e.g. bin positions relative to a TSS)
    /// * `matrix` - values to display, rows in feature order
    /// * `row_order` - display order; identity when `None`
    /// * `image_options` - forwarded to the image call, overriding defaults
    pub fn compose(
        &self,
        x: &[f64],
        matrix: ArrayView2<f64>,
        row_order: Option<&RowOrder>,
        image_options: Option<&ImageOptions>,
    ) -> Result<Figure> {
        let (n_rows, n_cols) = matrix.dim();
        if x.len() != n_cols {
            return Err(ChipseqError::LengthMismatch {
                expected: format!("{} x values (one per column)", n_cols),
                got: format!("{}", x.len()),
            });
        }

        let identity;
        let order = match row_order {
            Some(order) => {
                if order.len() != n_rows {
                    return Err(ChipseqError::InvalidRowOrder {
                        reason: format!("{} indices for {} rows", order.len(), n_rows),
                    });
                }
                order
            }
            None => {
                identity = RowOrder::identity(n_rows);
                &identity
            }
        };

        let (x_min, x_max) = padded_range(finite_range(x));
        let extent = Extent {
            x_min,
            x_max,
            y_min: 0.0,
            y_max: n_rows as f64,
        };

        let mut options = Self::base_image_options(&extent);
        if let Some(user) = image_options {
            options = options.merged(user);
        }

        // Display copy; the source matrix keeps its row order
        let displayed = matrix.select(Axis(0), order.as_slice());
        let (v_min, v_max) = padded_range(finite_range(matrix.iter()));

        let mean_profile = match matrix.mean_axis(Axis(0)) {
            Some(m) => m.to_vec(),
            None => vec![f64::NAN; n_cols],
        };

        let y_max = (n_rows as f64).max(1.0);

        let matrix_panel = Panel::new(PanelRole::Matrix, MATRIX_RECT)
            .with_item(PlotItem::Image {
                data: displayed,
                extent,
                options: options.clone(),
            })
            .with_x_range(x_min, x_max)
            .with_y_range(0.0, y_max)
            .hide_x_ticks()
            .hide_y_ticks();

        let line_panel = Panel::new(PanelRole::MeanSignal, LINE_RECT)
            .with_item(PlotItem::Line {
                x: x.to_vec(),
                y: mean_profile,
                style: self.mean_style.clone(),
            })
            .with_x_range(x_min, x_max);

        let strip_panel = Panel::new(PanelRole::Strip, STRIP_RECT)
            .with_item(PlotItem::Points {
                x: vec![0.0; n_rows],
                y: (0..n_rows).map(|k| k as f64 + 0.5).collect(),
                style: self.strip_style.clone(),
                pickable: true,
            })
            .with_x_range(-1.0, 1.0)
            .with_y_range(0.0, y_max)
            .hide_x_ticks();

        let colorbar_panel = Panel::new(PanelRole::Colorbar, COLORBAR_RECT)
            .with_item(PlotItem::Colorbar {
                min: v_min,
                max: v_max,
                options,
            })
            .with_x_range(0.0, 1.0)
            .with_y_range(v_min, v_max)
            .hide_x_ticks();

        Ok(Figure::new(self.size)
            .with_panel(matrix_panel)
            .with_panel(line_panel)
            .with_panel(strip_panel)
            .with_panel(colorbar_panel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn image_of(fig: &Figure) -> (&ndarray::Array2<f64>, &Extent, &ImageOptions) {
        match &fig.panel(PanelRole::Matrix).unwrap().items[0] {
            PlotItem::Image {
                data,
                extent,
                options,
            } => (data, extent, options),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_panels_share_order_and_domain() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let order = RowOrder::new(vec![2, 0, 1], 3).unwrap();
        let x = [-10.0, 0.0, 10.0];
        let fig = HeatmapComposer::default()
            .compose(&x, m.view(), Some(&order), None)
            .unwrap();

        let (data, extent, _) = image_of(&fig);
        assert_eq!(data.row(0).to_vec(), vec![7.0, 8.0, 9.0]);
        assert_eq!(data.row(1).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!((extent.x_min, extent.x_max), (-10.0, 10.0));
        assert_eq!((extent.y_min, extent.y_max), (0.0, 3.0));

        let line = fig.panel(PanelRole::MeanSignal).unwrap();
        assert_eq!(line.x_range, Some((-10.0, 10.0)));
        match &line.items[0] {
            PlotItem::Line { y, .. } => assert_eq!(y, &vec![4.0, 5.0, 6.0]),
            other => panic!("unexpected item {:?}", other),
        }

        // Input matrix is untouched
        assert_eq!(m.row(0).to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_strip_points_one_per_row() {
        let m = array![[1.0], [2.0], [3.0], [4.0]];
        let fig = HeatmapComposer::default()
            .compose(&[0.0], m.view(), None, None)
            .unwrap();
        let strip = fig.panel(PanelRole::Strip).unwrap();
        assert_eq!(strip.y_range, Some((0.0, 4.0)));
        match &strip.items[0] {
            PlotItem::Points { x, y, pickable, .. } => {
                assert!(x.iter().all(|&v| v == 0.0));
                assert_eq!(y, &vec![0.5, 1.5, 2.5, 3.5]);
                assert!(*pickable);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_user_image_options_pass_through() {
        let m = array![[1.0, -1.0]];
        let user = ImageOptions::new()
            .set("cmap", "gray")
            .set("interpolation", "bicubic")
            .set("made_up", "yes");
        let fig = HeatmapComposer::default()
            .compose(&[0.0, 1.0], m.view(), None, Some(&user))
            .unwrap();
        let (_, _, options) = image_of(&fig);
        assert_eq!(options.get("aspect"), Some("auto"));
        assert_eq!(options.get("interpolation"), Some("bicubic"));
        assert_eq!(options.get("made_up"), Some("yes"));
        assert_eq!(options.get("cmap"), Some("gray"));
    }

    #[test]
    fn test_x_length_must_match_columns() {
        let m = array![[1.0, 2.0]];
        let err = HeatmapComposer::default()
            .compose(&[0.0], m.view(), None, None)
            .unwrap_err();
        assert!(matches!(err, ChipseqError::LengthMismatch { .. }));
    }

    #[test]
    fn test_row_order_length_checked() {
        let m = array![[1.0], [2.0]];
        let order = RowOrder::identity(3);
        assert!(HeatmapComposer::default()
            .compose(&[0.0], m.view(), Some(&order), None)
            .is_err());
    }
}

//! Figure model, heatmap layout and rendering backends
//!
//! Layout code only produces [`Figure`] values. A [`RenderBackend`] draws
//! them: [`SvgBackend`] writes files through plotters, [`MemoryBackend`]
//! keeps them for inspection and can simulate point selections.

mod backend;
mod colormap;
mod figure;
mod heatmap;
mod svg;

pub use backend::{MemoryBackend, RenderBackend};
pub use colormap::{colormap_for, Colormap, DivergingColormap, GrayColormap};
pub use figure::{
    Extent, Figure, ImageOptions, LineStyle, MarkerStyle, Panel, PanelRect, PanelRole, PlotItem,
    Rgb,
};
pub use heatmap::HeatmapComposer;
pub use svg::{render_svg, SvgBackend};

//! Per-feature detail views
//!
//! A [`DetailView`] re-queries both signal sources around one feature at the
//! local resolution and overlays the normalized IP and control profiles.
//! When an annotation lookup is configured a gene-model track is drawn below
//! the signal; otherwise the view is signal-only. The variant is fixed when
//! the view is built.

use std::sync::Arc;

use ndarray::Axis;

use crate::annotation::AnnotationLookup;
use crate::data::Feature;
use crate::dispatch::DetailRenderer;
use crate::error::Result;
use crate::normalization::normalize;
use crate::render::{Figure, LineStyle, Panel, PanelRect, PanelRole, PlotItem, RenderBackend};
use crate::signal::{CoverageParams, SignalSource};

const SIGNAL_RECT: PanelRect = PanelRect::new(0.10, 0.10, 0.85, 0.80);
const SIGNAL_ABOVE_GENES_RECT: PanelRect = PanelRect::new(0.10, 0.38, 0.85, 0.54);
const GENE_TRACK_RECT: PanelRect = PanelRect::new(0.10, 0.06, 0.85, 0.28);

/// Everything a detail view needs, fixed at construction
#[derive(Clone)]
pub struct DetailViewConfig {
    pub ip: Arc<dyn SignalSource>,
    pub control: Arc<dyn SignalSource>,
    /// Local coverage parameters (no worker-pool settings)
    pub params: CoverageParams,
    pub annotation_lookup: Option<Arc<dyn AnnotationLookup>>,
    /// IP style, then control style
    pub overlay_styles: [LineStyle; 2],
    pub size: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailVariant {
    GeneModel,
    SignalOnly,
}

enum Track {
    GeneModel(Arc<dyn AnnotationLookup>),
    SignalOnly,
}

pub struct DetailView {
    ip: Arc<dyn SignalSource>,
    control: Arc<dyn SignalSource>,
    params: CoverageParams,
    styles: [LineStyle; 2],
    size: (u32, u32),
    track: Track,
}

impl DetailView {
    pub fn new(config: DetailViewConfig) -> Self {
        let track = match config.annotation_lookup {
            Some(lookup) => Track::GeneModel(lookup),
            None => Track::SignalOnly,
        };
        Self {
            ip: config.ip,
            control: config.control,
            params: config.params,
            styles: config.overlay_styles,
            size: config.size,
            track,
        }
    }

    pub fn variant(&self) -> DetailVariant {
        match self.track {
            Track::GeneModel(_) => DetailVariant::GeneModel,
            Track::SignalOnly => DetailVariant::SignalOnly,
        }
    }

    pub fn params(&self) -> &CoverageParams {
        &self.params
    }

    /// Reads-per-million coverage of one source around `feature`
    fn normalized(&self, source: &dyn SignalSource, feature: &Feature) -> Result<(Vec<f64>, Vec<f64>)> {
        let (x, y) = source.local_coverage(feature, &self.params)?;
        let y = normalize(y.view().insert_axis(Axis(0)), source.mapped_reads())?;
        Ok((x.to_vec(), y.row(0).to_vec()))
    }

    /// Build the detail figure for one feature
    pub fn render(&self, feature: &Feature) -> Result<Figure> {
        let (ip_x, ip_y) = self.normalized(self.ip.as_ref(), feature)?;
        let (ctl_x, ctl_y) = self.normalized(self.control.as_ref(), feature)?;
        let (x0, x1) = (feature.start() as f64, feature.end() as f64);

        let title = match feature.name() {
            Some(name) => format!("{} {}:{}-{}", name, feature.chrom(), feature.start(), feature.end()),
            None => format!("{}:{}-{}", feature.chrom(), feature.start(), feature.end()),
        };
        let figure = Figure::new(self.size).with_title(&title);

        let signal = |rect: PanelRect| {
            Panel::new(PanelRole::Signal, rect)
                .with_item(PlotItem::Line {
                    x: ip_x.clone(),
                    y: ip_y.clone(),
                    style: self.styles[0].clone(),
                })
                .with_item(PlotItem::Line {
                    x: ctl_x.clone(),
                    y: ctl_y.clone(),
                    style: self.styles[1].clone(),
                })
                .with_x_range(x0, x1)
                .with_y_label("RPMMR")
                .with_legend()
        };

        match &self.track {
            Track::SignalOnly => Ok(figure.with_panel(signal(SIGNAL_RECT).with_x_label(feature.chrom()))),
            Track::GeneModel(lookup) => {
                let genes = lookup.genes_in_region(feature.chrom(), feature.start(), feature.end())?;
                log::debug!("{} gene models under {}", genes.len(), title);
                let lanes = genes.len().max(1) as f64;
                let gene_track = Panel::new(PanelRole::GeneTrack, GENE_TRACK_RECT)
                    .with_item(PlotItem::GeneModels { genes })
                    .with_x_range(x0, x1)
                    .with_y_range(0.0, lanes + 0.5)
                    .with_x_label(feature.chrom())
                    .with_integer_x_ticks()
                    .hide_y_ticks();
                Ok(figure
                    .with_panel(signal(SIGNAL_ABOVE_GENES_RECT).hide_x_ticks())
                    .with_panel(gene_track))
            }
        }
    }
}

/// Renders detail views and hands them to a backend
pub struct DetailPresenter<B: RenderBackend> {
    view: DetailView,
    backend: B,
}

impl<B: RenderBackend> DetailPresenter<B> {
    pub fn new(view: DetailView, backend: B) -> Self {
        Self { view, backend }
    }

    pub fn view(&self) -> &DetailView {
        &self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: RenderBackend> DetailRenderer for DetailPresenter<B> {
    fn render_detail(&mut self, feature: &Feature) -> Result<()> {
        let figure = self.view.render(feature)?;
        self.backend.present(&figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::GeneModel;
    use crate::data::Strand;
    use crate::error::ChipseqError;
    use crate::render::MemoryBackend;
    use crate::signal::{AlignedRead, ReadCoverageSignal};

    struct OneGene;

    impl AnnotationLookup for OneGene {
        fn genes_in_region(&self, chrom: &str, start: u64, end: u64) -> Result<Vec<GeneModel>> {
            if chrom != "chr1" {
                return Err(ChipseqError::Annotation {
                    reason: format!("no such chromosome {}", chrom),
                });
            }
            Ok(vec![GeneModel {
                gene_id: "G1".to_string(),
                gene_name: Some("alpha".to_string()),
                chrom: chrom.to_string(),
                start,
                end,
                strand: Strand::Plus,
                exons: vec![(start, start + 2)],
            }])
        }
    }

    fn source(n_reads: u64) -> Arc<dyn SignalSource> {
        let reads = (0..n_reads)
            .map(|_| AlignedRead {
                chrom: "chr1".to_string(),
                start: 0,
                end: 10,
                strand: Strand::Plus,
            })
            .collect();
        Arc::new(ReadCoverageSignal::new(reads))
    }

    fn config(lookup: Option<Arc<dyn AnnotationLookup>>) -> DetailViewConfig {
        DetailViewConfig {
            ip: source(4),
            control: source(1),
            params: CoverageParams {
                bins: 5,
                ..CoverageParams::default()
            },
            annotation_lookup: lookup,
            overlay_styles: [
                LineStyle::new((255, 0, 0), 2).labeled("IP"),
                LineStyle::new((0, 0, 0), 1).labeled("control"),
            ],
            size: (400, 300),
        }
    }

    fn lines(panel: &Panel) -> Vec<(&Vec<f64>, &LineStyle)> {
        panel
            .items
            .iter()
            .filter_map(|item| match item {
                PlotItem::Line { y, style, .. } => Some((y, style)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_signal_only_variant() {
        let view = DetailView::new(config(None));
        assert_eq!(view.variant(), DetailVariant::SignalOnly);

        let feature = Feature::new("chr1", 0, 10).unwrap();
        let fig = view.render(&feature).unwrap();
        assert_eq!(fig.panels.len(), 1);

        let panel = fig.panel(PanelRole::Signal).unwrap();
        assert_eq!(panel.x_label.as_deref(), Some("chr1"));
        assert_eq!(panel.y_label.as_deref(), Some("RPMMR"));
        assert!(panel.legend && panel.x_ticks);

        let overlays = lines(panel);
        assert_eq!(overlays.len(), 2);
        assert_eq!(overlays[0].1.label.as_deref(), Some("IP"));
        assert_eq!(overlays[0].0.len(), 5);
        // 4 reads deep over a library of 4 reads, and 1 over 1
        assert!(overlays[0].0.iter().all(|&v| (v - 1e6).abs() < 1e-6));
        assert!(overlays[1].0.iter().all(|&v| (v - 1e6).abs() < 1e-6));
    }

    #[test]
    fn test_gene_model_variant() {
        let view = DetailView::new(config(Some(Arc::new(OneGene))));
        assert_eq!(view.variant(), DetailVariant::GeneModel);

        let feature = Feature::new("chr1", 0, 10).unwrap();
        let fig = view.render(&feature).unwrap();
        assert_eq!(fig.panels.len(), 2);

        let signal = fig.panel(PanelRole::Signal).unwrap();
        assert!(!signal.x_ticks);
        assert!(signal.x_label.is_none());

        let track = fig.panel(PanelRole::GeneTrack).unwrap();
        assert_eq!(track.x_label.as_deref(), Some("chr1"));
        assert!(track.integer_x_ticks);
        assert_eq!(track.x_range, signal.x_range);
        match &track.items[0] {
            PlotItem::GeneModels { genes } => assert_eq!(genes[0].label(), "alpha"),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_presenter_creates_one_figure_per_call() {
        let view = DetailView::new(config(None));
        let mut presenter = DetailPresenter::new(view, MemoryBackend::new());
        let a = Feature::new("chr1", 0, 10).unwrap();
        let b = Feature::new("chr1", 2, 8).unwrap();
        presenter.render_detail(&a).unwrap();
        presenter.render_detail(&b).unwrap();
        assert_eq!(presenter.backend().figures.len(), 2);
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let view = DetailView::new(config(Some(Arc::new(OneGene))));
        let feature = Feature::new("chr2", 0, 10).unwrap();
        assert!(view.render(&feature).is_err());
    }
}

//! rust_chipseq: differential ChIP-seq signal visualization in Rust
//!
//! Builds reads-per-million-mapped IP and control matrices over a set of
//! genomic features, subtracts control from IP, orders rows by TIP z-score
//! and lays the result out as a heatmap with a pickable strip. Picking strip
//! points spawns per-feature detail views. A separate pipeline estimates the
//! plus/minus strand shift by windowed cross-correlation.
//!
//! # Example
//!
//! ```ignore
//! use rust_chipseq::prelude::*;
//!
//! let ip = ReadCoverageSignal::new(read_aligned_reads("ip.bed")?);
//! let control = ReadCoverageSignal::new(read_aligned_reads("input.bed")?);
//! let mut session = ChipseqSession::builder()
//!     .ip(Arc::new(ip))
//!     .control(Arc::new(control))
//!     .build()?;
//!
//! let features = read_features("peaks.bed")?;
//! let x = linspace(-1000.0, 1000.0, 100);
//! let plot = run_heatmap(&mut session, features, &ArrayParams::default(), &x)?;
//! SvgBackend::new("plots", "heatmap")?.present(&plot.figure)?;
//! ```

pub mod annotation;
pub mod browser;
pub mod cli;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod normalization;
pub mod render;
pub mod scoring;
pub mod session;
pub mod shift;
pub mod signal;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use std::sync::Arc;

    pub use crate::annotation::{AnnotationLookup, GeneModel, GtfAnnotationDb};
    pub use crate::browser::{DetailPresenter, DetailVariant, DetailView, DetailViewConfig};
    pub use crate::config::DisplayConfig;
    pub use crate::data::{Feature, RowOrder, Strand};
    pub use crate::dispatch::{
        selection_channel, DetailRenderer, SelectionDispatcher, SelectionEvent, SelectionOutcome,
        StripBinding,
    };
    pub use crate::error::{ChipseqError, Result};
    pub use crate::io::{read_aligned_reads, read_chrom_sizes, read_features};
    pub use crate::normalization::{diff, nice_log, normalize, DiffTransform};
    pub use crate::render::{
        render_svg, Figure, ImageOptions, LineStyle, MarkerStyle, MemoryBackend, Panel,
        PanelRect, PanelRole, PlotItem, RenderBackend, SvgBackend,
    };
    pub use crate::scoring::{tip_order, tip_zscores};
    pub use crate::session::{CachePolicy, ChipseqSession, HeatmapPlot};
    pub use crate::shift::{estimate_shift, xcorr, ShiftEstimate, ShiftParams};
    pub use crate::signal::{
        AlignedRead, ArrayParams, CoverageParams, Genome, ReadCoverageSignal, RegionSampler,
        SignalSource,
    };
    pub use crate::stats::{finite_range, linspace, padded_range};
}

use prelude::*;

/// Run the standard heatmap pipeline
///
/// Builds the nice_log differential array, orders rows by descending TIP
/// z-score and lays out the heatmap.
pub fn run_heatmap(
    session: &mut ChipseqSession,
    features: Vec<Feature>,
    params: &ArrayParams,
    x: &[f64],
) -> Result<HeatmapPlot> {
    let diffed = session.diff_array(features, params, DiffTransform::NiceLog, CachePolicy::Recompute)?;
    let order = tip_order(diffed.view());
    session.plot(x, Some(order), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    /// Every bin of every feature holds `value`
    struct Flat {
        value: f64,
        library: f64,
    }

    impl SignalSource for Flat {
        fn array(&self, features: &[Feature], params: &ArrayParams) -> Result<Array2<f64>> {
            Ok(Array2::from_elem((features.len(), params.coverage.bins), self.value))
        }

        fn local_coverage(
            &self,
            feature: &Feature,
            params: &CoverageParams,
        ) -> Result<(Array1<f64>, Array1<f64>)> {
            let x = Array1::linspace(feature.start() as f64, feature.end() as f64, params.bins);
            Ok((x, Array1::from_elem(params.bins, self.value)))
        }

        fn mapped_reads(&self) -> f64 {
            self.library
        }
    }

    fn session() -> ChipseqSession {
        ChipseqSession::builder()
            .ip(Arc::new(Flat { value: 10.0, library: 1e6 }))
            .control(Arc::new(Flat { value: 0.0, library: 1e6 }))
            .build()
            .unwrap()
    }

    fn features(n: usize) -> Vec<Feature> {
        (0..n)
            .map(|i| {
                Feature::new("chr1", i as u64 * 1000, i as u64 * 1000 + 400)
                    .unwrap()
                    .with_name(&format!("f{}", i))
            })
            .collect()
    }

    #[test]
    fn test_full_pipeline() {
        let mut session = session();
        let params = ArrayParams::default().with_bins(4);
        let x = linspace(-200.0, 200.0, 4);

        let plot = run_heatmap(&mut session, features(10), &params, &x).unwrap();

        let diffed = session.diffed_array().unwrap();
        assert_eq!(diffed.dim(), (10, 4));
        let expected = nice_log(10.0);
        assert!(diffed.iter().all(|&v| (v - expected).abs() < 1e-10));

        // Constant rows tie on TIP score; every row still appears once
        let mut rows = plot.dispatcher.binding().order().as_slice().to_vec();
        rows.sort_unstable();
        assert_eq!(rows, (0..10).collect::<Vec<_>>());
        assert!(plot.figure.panel(PanelRole::Strip).is_some());
    }

    #[test]
    fn test_selection_to_detail_views() {
        let mut session = session();
        let params = ArrayParams::default().with_bins(4);
        let plot = run_heatmap(&mut session, features(10), &params, &linspace(0.0, 3.0, 4)).unwrap();

        let mut backend = MemoryBackend::new();
        let (tx, rx) = selection_channel();
        backend.connect_selection(tx);

        assert!(backend.pick((0..6).collect()));
        assert!(backend.pick(vec![0, 4, 9]));
        backend.close_all();
        drop(backend);

        let mut dispatcher = plot.dispatcher;
        let mut presenter = DetailPresenter::new(plot.detail_view, MemoryBackend::new());
        let outcomes = dispatcher.run(&rx, &mut presenter);

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            outcomes[0],
            SelectionOutcome::Rejected { selected: 6, limit: 5 }
        ));
        match &outcomes[1] {
            SelectionOutcome::Dispatched { rendered, failed } => {
                assert_eq!(rendered.len(), 3);
                assert!(failed.is_empty());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(presenter.backend().figures.len(), 3);
        assert_eq!(dispatcher.notices().len(), 1);
    }
}

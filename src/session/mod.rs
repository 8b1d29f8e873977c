//! Analysis session
//!
//! A [`ChipseqSession`] groups everything one analysis owns: the two signal
//! sources, the optional annotation lookup, display settings, the feature
//! sequence, and the normalized and differential arrays computed for it.
//! Whether a call recomputes or reuses the cached arrays is an explicit
//! [`CachePolicy`].

mod builder;

pub use builder::ChipseqSessionBuilder;

use std::sync::Arc;

use ndarray::Array2;

use crate::annotation::AnnotationLookup;
use crate::browser::{DetailView, DetailViewConfig};
use crate::config::DisplayConfig;
use crate::data::{Feature, RowOrder};
use crate::dispatch::{SelectionDispatcher, StripBinding};
use crate::error::{ChipseqError, Result};
use crate::normalization::{diff_with, normalize, DiffTransform};
use crate::render::{Figure, HeatmapComposer, ImageOptions};
use crate::signal::{ArrayParams, CoverageParams, SignalSource};

/// What [`ChipseqSession::diff_array`] does with previously computed arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Always query the signal sources again
    #[default]
    Recompute,
    /// Reuse the normalized IP and control arrays if they were built for the
    /// same features with the same coverage parameters
    ReuseCached,
}

/// Normalized IP and control arrays and what they were built from
#[derive(Debug, Clone)]
struct CachedArrays {
    features: Arc<[Feature]>,
    coverage: CoverageParams,
    ip: Array2<f64>,
    control: Array2<f64>,
}

/// Output of [`ChipseqSession::plot`]
pub struct HeatmapPlot {
    pub figure: Figure,
    /// Bound to the plotted features and row order
    pub dispatcher: SelectionDispatcher,
    pub detail_view: DetailView,
}

pub struct ChipseqSession {
    ip: Arc<dyn SignalSource>,
    control: Arc<dyn SignalSource>,
    annotations: Option<Arc<dyn AnnotationLookup>>,
    config: DisplayConfig,
    cached: Option<CachedArrays>,
    diffed: Option<Array2<f64>>,
    local_params: CoverageParams,
}

impl ChipseqSession {
    pub fn builder() -> ChipseqSessionBuilder {
        ChipseqSessionBuilder::new()
    }

    pub(crate) fn new(
        ip: Arc<dyn SignalSource>,
        control: Arc<dyn SignalSource>,
        annotations: Option<Arc<dyn AnnotationLookup>>,
        config: DisplayConfig,
    ) -> Self {
        Self {
            ip,
            control,
            annotations,
            config,
            cached: None,
            diffed: None,
            local_params: CoverageParams::default(),
        }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn has_annotations(&self) -> bool {
        self.annotations.is_some()
    }

    /// Features of the last `diff_array` call
    pub fn features(&self) -> Option<&Arc<[Feature]>> {
        self.cached.as_ref().map(|c| &c.features)
    }

    /// IP coverage in reads per million mapped reads
    pub fn ip_array(&self) -> Option<&Array2<f64>> {
        self.cached.as_ref().map(|c| &c.ip)
    }

    /// Control coverage in reads per million mapped reads
    pub fn control_array(&self) -> Option<&Array2<f64>> {
        self.cached.as_ref().map(|c| &c.control)
    }

    pub fn diffed_array(&self) -> Option<&Array2<f64>> {
        self.diffed.as_ref()
    }

    /// Coverage parameters detail views re-query with
    pub fn local_params(&self) -> &CoverageParams {
        &self.local_params
    }

    /// Normalize IP and control over `features` and store `transform(ip - control)`
    pub fn diff_array(
        &mut self,
        features: Vec<Feature>,
        params: &ArrayParams,
        transform: DiffTransform,
        cache: CachePolicy,
    ) -> Result<&Array2<f64>> {
        self.diff_array_with(features, params, |x| transform.apply(x), cache)
    }

    /// Like [`diff_array`](Self::diff_array) with an arbitrary transform
    pub fn diff_array_with<F>(
        &mut self,
        features: Vec<Feature>,
        params: &ArrayParams,
        transform: F,
        cache: CachePolicy,
    ) -> Result<&Array2<f64>>
    where
        F: Fn(f64) -> f64,
    {
        if features.is_empty() {
            return Err(ChipseqError::EmptyData {
                reason: "no features to build arrays over".to_string(),
            });
        }

        let reusable = match (&self.cached, cache) {
            (Some(c), CachePolicy::ReuseCached) => {
                let same = c.features.as_ref() == features.as_slice() && c.coverage == params.coverage;
                if !same {
                    log::info!("Cached arrays were built for other features or parameters; recomputing");
                }
                same
            }
            (None, CachePolicy::ReuseCached) => {
                log::debug!("No cached arrays yet; computing");
                false
            }
            (_, CachePolicy::Recompute) => false,
        };

        if !reusable {
            let features: Arc<[Feature]> = features.into();
            log::info!("Building IP array over {} features", features.len());
            let ip = normalize(self.ip.array(&features, params)?.view(), self.ip.mapped_reads())?;
            log::info!("Building control array over {} features", features.len());
            let control = normalize(
                self.control.array(&features, params)?.view(),
                self.control.mapped_reads(),
            )?;
            self.cached = Some(CachedArrays {
                features,
                coverage: params.coverage.clone(),
                ip,
                control,
            });
            self.local_params = params.local();
        }

        let cached = self.cached.as_ref().ok_or_else(|| ChipseqError::EmptyData {
            reason: "no arrays computed".to_string(),
        })?;
        let diffed = diff_with(cached.ip.view(), cached.control.view(), transform)?;
        Ok(self.diffed.insert(diffed))
    }

    /// A detail view over the session's sources and local parameters
    pub fn detail_view(&self) -> DetailView {
        DetailView::new(DetailViewConfig {
            ip: Arc::clone(&self.ip),
            control: Arc::clone(&self.control),
            params: self.local_params.clone(),
            annotation_lookup: self.annotations.clone(),
            overlay_styles: self.config.browser_styles.clone(),
            size: self.config.detail_size,
        })
    }

    /// Lay out the differential array and bind a selection dispatcher to it
    ///
    /// # Arguments
    /// * `x` - x-axis value of each bin
    /// * `row_order` - display order; features in input order when `None`
    /// * `image_options` - forwarded to the image call
    pub fn plot(
        &self,
        x: &[f64],
        row_order: Option<RowOrder>,
        image_options: Option<&ImageOptions>,
    ) -> Result<HeatmapPlot> {
        let (diffed, features) = match (&self.diffed, self.features()) {
            (Some(d), Some(f)) => (d, f),
            _ => {
                return Err(ChipseqError::EmptyData {
                    reason: "call diff_array before plot".to_string(),
                })
            }
        };
        let order = row_order.unwrap_or_else(|| RowOrder::identity(diffed.nrows()));

        let composer = HeatmapComposer::new(self.config.strip.clone(), self.config.heatmap_size);
        let figure = composer.compose(x, diffed.view(), Some(&order), image_options)?;

        let binding = StripBinding::new(Arc::clone(features), order)?;
        let dispatcher = SelectionDispatcher::new(binding, self.config.selection_limit);

        Ok(HeatmapPlot {
            figure,
            dispatcher,
            detail_view: self.detail_view(),
        })
    }
}

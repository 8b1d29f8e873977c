//! Genomic signal sources
//!
//! A [`SignalSource`] turns a set of features into a features x bins matrix of
//! read coverage and reports the library size used for normalization. The
//! analysis core only talks to this trait; [`ReadCoverageSignal`] is an
//! in-memory implementation backed by aligned reads.

mod genome;
mod reads;

pub use genome::{Genome, RegionSampler};
pub use reads::{AlignedRead, ReadCoverageSignal};

use ndarray::{Array1, Array2};

use crate::data::{Feature, Strand};
use crate::error::Result;

/// Parameters that shape coverage for a single feature
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageParams {
    /// Number of equal-width bins each feature is divided into
    pub bins: usize,
    /// Extend each read to this length from its 5' end
    pub fragment_size: Option<u64>,
    /// Shift each read this many bases toward its 3' end
    pub shift_width: u64,
    /// Only count reads on this strand
    pub read_strand: Option<Strand>,
}

impl Default for CoverageParams {
    fn default() -> Self {
        Self {
            bins: 100,
            fragment_size: None,
            shift_width: 0,
            read_strand: None,
        }
    }
}

/// Parameters for building a full signal matrix
///
/// `processes` and `chunksize` only control the source's own parallelism and
/// never affect the values produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayParams {
    pub coverage: CoverageParams,
    /// Worker threads (None = rayon's global pool)
    pub processes: Option<usize>,
    /// Features per work unit
    pub chunksize: Option<usize>,
}

impl ArrayParams {
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.coverage.bins = bins;
        self
    }

    pub fn with_fragment_size(mut self, fragment_size: u64) -> Self {
        self.coverage.fragment_size = Some(fragment_size);
        self
    }

    pub fn with_read_strand(mut self, strand: Option<Strand>) -> Self {
        self.coverage.read_strand = strand;
        self
    }

    pub fn with_parallelism(mut self, processes: usize, chunksize: usize) -> Self {
        self.processes = Some(processes);
        self.chunksize = Some(chunksize);
        self
    }

    /// Per-feature parameters for detail views: everything except
    /// `processes` and `chunksize`
    pub fn local(&self) -> CoverageParams {
        self.coverage.clone()
    }
}

/// Source of binned read coverage for genomic features
pub trait SignalSource: Send + Sync {
    /// Coverage matrix with one row per feature, in feature order
    ///
    /// Rows of minus-strand features are reported 5' to 3', i.e. reversed
    /// relative to genomic coordinates.
    fn array(&self, features: &[Feature], params: &ArrayParams) -> Result<Array2<f64>>;

    /// Binned coverage over one feature in genomic orientation
    ///
    /// Returns the bin centers (genomic coordinates) and the raw coverage.
    fn local_coverage(
        &self,
        feature: &Feature,
        params: &CoverageParams,
    ) -> Result<(Array1<f64>, Array1<f64>)>;

    /// Total number of mapped reads in the library
    fn mapped_reads(&self) -> f64;

    fn million_mapped_reads(&self) -> f64 {
        self.mapped_reads() / 1e6
    }
}

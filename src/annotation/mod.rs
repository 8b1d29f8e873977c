//! Gene annotation lookup
//!
//! Detail views draw a gene-model track when an [`AnnotationLookup`] is
//! available. [`GtfAnnotationDb`] is an in-memory lookup loaded from GTF.

mod gtf;

pub use gtf::GtfAnnotationDb;

use crate::data::{Feature, Strand};
use crate::error::Result;

/// A gene with its exons, 0-based half-open coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct GeneModel {
    pub gene_id: String,
    pub gene_name: Option<String>,
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    /// Sorted, possibly overlapping exon intervals
    pub exons: Vec<(u64, u64)>,
}

impl GeneModel {
    /// Label shown next to the model: name if known, otherwise the ID
    pub fn label(&self) -> &str {
        self.gene_name.as_deref().unwrap_or(&self.gene_id)
    }

    /// The gene span as a feature
    pub fn to_feature(&self) -> Result<Feature> {
        Ok(Feature::new(&self.chrom, self.start, self.end)?
            .with_name(&self.gene_id)
            .with_strand(self.strand))
    }
}

/// Resolves genomic coordinates to annotated gene models
pub trait AnnotationLookup: Send + Sync {
    /// Genes overlapping `[start, end)` on `chrom`, ordered by start
    fn genes_in_region(&self, chrom: &str, start: u64, end: u64) -> Result<Vec<GeneModel>>;
}

//! Genome regions and random window sampling

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::Feature;
use crate::error::{ChipseqError, Result};

/// Something that can hand out a random, non-overlapping set of windows
pub trait RegionSampler {
    /// Up to `count` distinct windows of `window_size` bases in random order
    fn sample_windows(&self, window_size: u64, count: usize) -> Result<Vec<Feature>>;
}

/// A set of regions (whole chromosomes or a supplied region set) plus the
/// seed used to shuffle windows drawn from them
#[derive(Debug, Clone)]
pub struct Genome {
    regions: Vec<(String, u64, u64)>,
    seed: u32,
}

impl Genome {
    /// Whole chromosomes from (name, length) pairs
    pub fn from_chrom_sizes(sizes: Vec<(String, u64)>, seed: u32) -> Self {
        let regions = sizes
            .into_iter()
            .map(|(chrom, len)| (chrom, 0, len))
            .collect();
        Self { regions, seed }
    }

    /// Restrict sampling to the given features
    pub fn from_regions(regions: &[Feature], seed: u32) -> Self {
        let regions = regions
            .iter()
            .map(|f| (f.chrom().to_string(), f.start(), f.end()))
            .collect();
        Self { regions, seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// All full-length windows tiling every region, in region order
    ///
    /// A trailing remainder shorter than `window_size` is not a window.
    pub fn windows(&self, window_size: u64) -> Result<Vec<Feature>> {
        if window_size == 0 {
            return Err(ChipseqError::InvalidInput {
                reason: "window size must be positive".to_string(),
            });
        }
        let mut windows = Vec::new();
        for (chrom, start, end) in &self.regions {
            let mut pos = *start;
            while pos + window_size <= *end {
                windows.push(Feature::new(chrom, pos, pos + window_size)?);
                pos += window_size;
            }
        }
        Ok(windows)
    }
}

impl RegionSampler for Genome {
    fn sample_windows(&self, window_size: u64, count: usize) -> Result<Vec<Feature>> {
        let mut windows = self.windows(window_size)?;
        let mut rng = StdRng::seed_from_u64(self.seed as u64);
        windows.shuffle(&mut rng);
        if windows.len() < count {
            log::warn!(
                "Requested {} windows of {} bp but only {} fit in the genome",
                count,
                window_size,
                windows.len()
            );
        }
        windows.truncate(count);
        Ok(windows)
    }
}

//! In-memory read pileup signal source

use std::collections::HashMap;

use ndarray::{Array1, Array2};
use rayon::prelude::*;

use super::{ArrayParams, CoverageParams, SignalSource};
use crate::data::{Feature, Strand};
use crate::error::{ChipseqError, Result};

const DEFAULT_CHUNKSIZE: usize = 50;

/// A single aligned read
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRead {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl AlignedRead {
    /// Interval covered after fragment extension and strand-aware shifting
    fn effective_interval(&self, params: &CoverageParams) -> (u64, u64) {
        let shift = params.shift_width;
        match self.strand {
            Strand::Plus => {
                let start = self.start + shift;
                let end = match params.fragment_size {
                    Some(f) => start + f,
                    None => self.end + shift,
                };
                (start, end)
            }
            Strand::Minus => {
                let end = self.end.saturating_sub(shift);
                let start = match params.fragment_size {
                    Some(f) => end.saturating_sub(f),
                    None => self.start.saturating_sub(shift),
                };
                (start, end)
            }
            Strand::Unknown => (self.start, self.end),
        }
    }
}

#[derive(Debug, Default)]
struct ChromReads {
    /// Sorted by start
    reads: Vec<AlignedRead>,
    max_len: u64,
}

/// Coverage computed on the fly from a set of aligned reads
///
/// Reads are indexed per chromosome; each feature is piled up independently so
/// features can be processed on any number of worker threads.
#[derive(Debug)]
pub struct ReadCoverageSignal {
    chroms: HashMap<String, ChromReads>,
    total_reads: usize,
}

impl ReadCoverageSignal {
    pub fn new(reads: Vec<AlignedRead>) -> Self {
        let total_reads = reads.len();
        let mut chroms: HashMap<String, ChromReads> = HashMap::new();
        for read in reads {
            let entry = chroms.entry(read.chrom.clone()).or_default();
            entry.max_len = entry.max_len.max(read.end.saturating_sub(read.start));
            entry.reads.push(read);
        }
        for entry in chroms.values_mut() {
            entry.reads.sort_by_key(|r| (r.start, r.end));
        }
        log::debug!(
            "Indexed {} reads on {} chromosomes",
            total_reads,
            chroms.len()
        );
        Self { chroms, total_reads }
    }

    /// Per-base coverage over `feature`, genomic orientation
    fn pileup(&self, feature: &Feature, params: &CoverageParams) -> Vec<f64> {
        let len = feature.len() as usize;
        let mut delta = vec![0i64; len + 1];

        if let Some(chrom) = self.chroms.get(feature.chrom()) {
            let reach = chrom.max_len + params.fragment_size.unwrap_or(0) + params.shift_width;
            let lo = feature.start().saturating_sub(reach);
            let hi = feature.end() + reach;
            let first = chrom.reads.partition_point(|r| r.start < lo);

            for read in chrom.reads[first..].iter().take_while(|r| r.start < hi) {
                if let Some(wanted) = params.read_strand {
                    if read.strand != wanted {
                        continue;
                    }
                }
                let (s, e) = read.effective_interval(params);
                let s = s.max(feature.start());
                let e = e.min(feature.end());
                if s >= e {
                    continue;
                }
                delta[(s - feature.start()) as usize] += 1;
                delta[(e - feature.start()) as usize] -= 1;
            }
        }

        let mut depth = 0i64;
        delta[..len]
            .iter()
            .map(|&d| {
                depth += d;
                depth as f64
            })
            .collect()
    }

    /// Mean coverage per bin and the genomic center of each bin
    fn binned(&self, feature: &Feature, params: &CoverageParams) -> Result<(Vec<f64>, Vec<f64>)> {
        if params.bins == 0 {
            return Err(ChipseqError::InvalidInput {
                reason: "bins must be at least 1".to_string(),
            });
        }
        let depth = self.pileup(feature, params);
        let len = depth.len();
        let mut centers = Vec::with_capacity(params.bins);
        let mut values = Vec::with_capacity(params.bins);

        for b in 0..params.bins {
            let lo = (b * len / params.bins).min(len - 1);
            let hi = ((b + 1) * len / params.bins).clamp(lo + 1, len);
            let sum: f64 = depth[lo..hi].iter().sum();
            values.push(sum / (hi - lo) as f64);
            centers.push(feature.start() as f64 + (lo + hi) as f64 / 2.0);
        }

        Ok((centers, values))
    }

    fn feature_row(&self, feature: &Feature, params: &CoverageParams) -> Result<Vec<f64>> {
        let (_, mut values) = self.binned(feature, params)?;
        if feature.strand() == Strand::Minus {
            values.reverse();
        }
        Ok(values)
    }
}

impl SignalSource for ReadCoverageSignal {
    fn array(&self, features: &[Feature], params: &ArrayParams) -> Result<Array2<f64>> {
        let bins = params.coverage.bins;
        let chunksize = params.chunksize.unwrap_or(DEFAULT_CHUNKSIZE).max(1);

        // par_chunks + collect keeps chunks in input order regardless of
        // which worker finishes first
        let compute = || -> Result<Vec<Vec<Vec<f64>>>> {
            features
                .par_chunks(chunksize)
                .map(|chunk| {
                    chunk
                        .iter()
                        .map(|f| self.feature_row(f, &params.coverage))
                        .collect::<Result<Vec<_>>>()
                })
                .collect()
        };

        let chunks = match params.processes {
            Some(n) if n > 0 => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ChipseqError::InvalidInput {
                        reason: format!("Could not build worker pool: {}", e),
                    })?;
                pool.install(compute)?
            }
            _ => compute()?,
        };

        let mut matrix = Array2::zeros((features.len(), bins));
        for (i, row) in chunks.into_iter().flatten().enumerate() {
            for (j, v) in row.into_iter().enumerate() {
                matrix[[i, j]] = v;
            }
        }
        Ok(matrix)
    }

    fn local_coverage(
        &self,
        feature: &Feature,
        params: &CoverageParams,
    ) -> Result<(Array1<f64>, Array1<f64>)> {
        let (centers, values) = self.binned(feature, params)?;
        Ok((Array1::from(centers), Array1::from(values)))
    }

    fn mapped_reads(&self) -> f64 {
        self.total_reads as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(chrom: &str, start: u64, end: u64, strand: Strand) -> AlignedRead {
        AlignedRead {
            chrom: chrom.to_string(),
            start,
            end,
            strand,
        }
    }

    fn params(bins: usize) -> CoverageParams {
        CoverageParams {
            bins,
            ..CoverageParams::default()
        }
    }

    #[test]
    fn test_pileup_per_base() {
        let signal = ReadCoverageSignal::new(vec![
            read("chr1", 0, 4, Strand::Plus),
            read("chr1", 2, 6, Strand::Minus),
        ]);
        let feature = Feature::new("chr1", 0, 8).unwrap();
        let (_, y) = signal.local_coverage(&feature, &params(8)).unwrap();
        assert_eq!(y.to_vec(), vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_binning_averages() {
        let signal = ReadCoverageSignal::new(vec![read("chr1", 0, 4, Strand::Plus)]);
        let feature = Feature::new("chr1", 0, 8).unwrap();
        let (x, y) = signal.local_coverage(&feature, &params(2)).unwrap();
        assert_eq!(y.to_vec(), vec![1.0, 0.0]);
        assert_eq!(x.to_vec(), vec![2.0, 6.0]);
    }

    #[test]
    fn test_fragment_extension_and_strand_filter() {
        let signal = ReadCoverageSignal::new(vec![
            read("chr1", 10, 12, Strand::Plus),
            read("chr1", 18, 20, Strand::Minus),
        ]);
        let feature = Feature::new("chr1", 10, 20).unwrap();
        let mut p = params(10);
        p.fragment_size = Some(5);

        let (_, both) = signal.local_coverage(&feature, &p).unwrap();
        assert_eq!(
            both.to_vec(),
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        );

        p.read_strand = Some(Strand::Minus);
        let (_, minus) = signal.local_coverage(&feature, &p).unwrap();
        assert_eq!(
            minus.to_vec(),
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_shift_moves_reads_apart_from_center() {
        let signal = ReadCoverageSignal::new(vec![
            read("chr1", 4, 6, Strand::Plus),
            read("chr1", 4, 6, Strand::Minus),
        ]);
        let feature = Feature::new("chr1", 0, 10).unwrap();
        let mut p = params(10);
        p.shift_width = 2;
        let (_, y) = signal.local_coverage(&feature, &p).unwrap();
        assert_eq!(
            y.to_vec(),
            vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_array_rows_follow_feature_order() {
        let reads: Vec<AlignedRead> = (0..40u64)
            .flat_map(|i| (0..=i).map(move |_| read("chr1", i * 100, i * 100 + 10, Strand::Plus)))
            .collect();
        let signal = ReadCoverageSignal::new(reads);
        let features: Vec<Feature> = (0..40u64)
            .rev()
            .map(|i| Feature::new("chr1", i * 100, i * 100 + 10).unwrap())
            .collect();

        let array_params = ArrayParams::default().with_bins(1).with_parallelism(4, 3);
        let m = signal.array(&features, &array_params).unwrap();
        assert_eq!(m.dim(), (40, 1));
        for (row, i) in (0..40u64).rev().enumerate() {
            assert_eq!(m[[row, 0]], (i + 1) as f64);
        }
        assert_eq!(signal.mapped_reads(), (40 * 41 / 2) as f64);
    }

    #[test]
    fn test_minus_strand_rows_reversed() {
        let signal = ReadCoverageSignal::new(vec![read("chr1", 0, 2, Strand::Plus)]);
        let plus = Feature::new("chr1", 0, 4).unwrap().with_strand(Strand::Plus);
        let minus = Feature::new("chr1", 0, 4).unwrap().with_strand(Strand::Minus);
        let m = signal
            .array(&[plus, minus], &ArrayParams::default().with_bins(4))
            .unwrap();
        assert_eq!(m.row(0).to_vec(), vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(m.row(1).to_vec(), vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_zero_bins_rejected() {
        let signal = ReadCoverageSignal::new(Vec::new());
        let feature = Feature::new("chr1", 0, 4).unwrap();
        assert!(signal.local_coverage(&feature, &params(0)).is_err());
    }
}

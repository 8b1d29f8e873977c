//! Aligned reads from BED files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{coordinate, field, is_header_line, tsv_reader};
use crate::data::Strand;
use crate::error::{ChipseqError, Result};
use crate::signal::AlignedRead;

/// Read alignments from a BED6 file (e.g. `bedtools bamtobed` output)
pub fn read_aligned_reads<P: AsRef<Path>>(path: P) -> Result<Vec<AlignedRead>> {
    let reads = read_aligned_reads_from(File::open(path.as_ref())?)?;
    log::info!("Read {} alignments from {}", reads.len(), path.as_ref().display());
    Ok(reads)
}

/// Read alignments from any reader; reads without a strand column are unstranded
pub fn read_aligned_reads_from<R: Read>(reader: R) -> Result<Vec<AlignedRead>> {
    let mut rdr = tsv_reader(reader);
    let mut reads = Vec::new();

    for record in rdr.records() {
        let record = record?;
        if is_header_line(&record) {
            continue;
        }
        let chrom = field(&record, 0, "chrom")?;
        let start = coordinate(&record, 1, "start")?;
        let end = coordinate(&record, 2, "end")?;
        if end <= start {
            return Err(ChipseqError::Parse {
                line: super::line_of(&record),
                reason: format!("empty alignment {}:{}-{}", chrom, start, end),
            });
        }
        reads.push(AlignedRead {
            chrom: chrom.to_string(),
            start,
            end,
            strand: record.get(5).map_or(Strand::Unknown, Strand::from_symbol),
        });
    }

    Ok(reads)
}

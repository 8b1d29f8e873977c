//! Readers for tab-separated genomics files
//!
//! BED features, BED reads and chromosome sizes share one `csv` reader
//! configuration: tab delimited, no header, `#` comments, and a variable
//! number of columns per line. UCSC `track` and `browser` lines are skipped.

mod bed;
mod genome;
mod reads;

pub use bed::{read_features, read_features_from};
pub use genome::{read_chrom_sizes, read_chrom_sizes_from};
pub use reads::{read_aligned_reads, read_aligned_reads_from};

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{ChipseqError, Result};

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader)
}

/// 1-based line of a record, for error messages
fn line_of(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

fn is_header_line(record: &StringRecord) -> bool {
    let first = record.get(0).and_then(|f| f.split_whitespace().next());
    matches!(first, Some("track") | Some("browser"))
}

fn field<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ChipseqError::Parse {
            line: line_of(record),
            reason: format!("missing {} column", name),
        })
}

fn coordinate(record: &StringRecord, index: usize, name: &str) -> Result<u64> {
    let raw = field(record, index, name)?;
    raw.parse().map_err(|_| ChipseqError::Parse {
        line: line_of(record),
        reason: format!("invalid {} '{}'", name, raw),
    })
}

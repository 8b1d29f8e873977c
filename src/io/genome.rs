//! Chromosome sizes files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{coordinate, field, is_header_line, tsv_reader};
use crate::error::{ChipseqError, Result};

/// Read `chrom<TAB>length` lines (UCSC `chrom.sizes` format)
pub fn read_chrom_sizes<P: AsRef<Path>>(path: P) -> Result<Vec<(String, u64)>> {
    read_chrom_sizes_from(File::open(path)?)
}

pub fn read_chrom_sizes_from<R: Read>(reader: R) -> Result<Vec<(String, u64)>> {
    let mut rdr = tsv_reader(reader);
    let mut sizes = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if is_header_line(&record) {
            continue;
        }
        let chrom = field(&record, 0, "chrom")?;
        let len = coordinate(&record, 1, "length")?;
        sizes.push((chrom.to_string(), len));
    }
    if sizes.is_empty() {
        return Err(ChipseqError::EmptyData {
            reason: "no chromosome sizes found".to_string(),
        });
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_sizes() {
        let sizes = read_chrom_sizes_from(Cursor::new("chr1\t248956422\nchrM\t16569\n")).unwrap();
        assert_eq!(sizes, vec![("chr1".to_string(), 248956422), ("chrM".to_string(), 16569)]);
    }

    #[test]
    fn test_empty_sizes() {
        assert!(read_chrom_sizes_from(Cursor::new("# nothing\n")).is_err());
    }
}

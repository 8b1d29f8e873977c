//! BED feature files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{coordinate, field, is_header_line, tsv_reader};
use crate::data::{Feature, Strand};
use crate::error::Result;

/// Read features from a BED file (BED3 or wider)
pub fn read_features<P: AsRef<Path>>(path: P) -> Result<Vec<Feature>> {
    let features = read_features_from(File::open(path.as_ref())?)?;
    log::info!(
        "Read {} features from {}",
        features.len(),
        path.as_ref().display()
    );
    Ok(features)
}

/// Read BED features from any reader
///
/// Column 4 is the name and column 6 the strand; `.` means absent. The score
/// and every column past the strand are kept verbatim as extra fields.
pub fn read_features_from<R: Read>(reader: R) -> Result<Vec<Feature>> {
    let mut rdr = tsv_reader(reader);
    let mut features = Vec::new();

    for record in rdr.records() {
        let record = record?;
        if is_header_line(&record) {
            continue;
        }
        let chrom = field(&record, 0, "chrom")?;
        let start = coordinate(&record, 1, "start")?;
        let end = coordinate(&record, 2, "end")?;

        let mut feature = Feature::new(chrom, start, end)?;
        if let Some(name) = record.get(3).filter(|n| !n.is_empty() && *n != ".") {
            feature = feature.with_name(name);
        }
        if let Some(strand) = record.get(5) {
            feature = feature.with_strand(Strand::from_symbol(strand));
        }
        let extra: Vec<String> = record
            .iter()
            .enumerate()
            .filter(|(i, _)| *i == 4 || *i > 5)
            .map(|(_, v)| v.to_string())
            .collect();
        if !extra.is_empty() {
            feature = feature.with_fields(extra);
        }
        features.push(feature);
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_bed6() {
        let bed = "track name=tss\n# comment\nchr1\t100\t200\tg1\t0\t+\nchr2\t50\t80\t.\t.\t-\textra\nchr3\t5\t10\n";
        let features = read_features_from(Cursor::new(bed)).unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0].name(), Some("g1"));
        assert_eq!(features[0].strand(), Strand::Plus);
        assert_eq!(features[0].fields(), &["0".to_string()]);

        assert_eq!(features[1].name(), None);
        assert_eq!(features[1].strand(), Strand::Minus);
        assert_eq!(features[1].fields(), &[".".to_string(), "extra".to_string()]);

        assert_eq!(features[2].strand(), Strand::Unknown);
        assert_eq!((features[2].start(), features[2].end()), (5, 10));
    }

    #[test]
    fn test_bad_coordinate_reports_line() {
        let bed = "chr1\t1\t2\nchr1\tx\t5\n";
        let err = read_features_from(Cursor::new(bed)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chr1\t0\t1000\tpromoter").unwrap();
        let features = read_features(file.path()).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].len(), 1000);
    }
}

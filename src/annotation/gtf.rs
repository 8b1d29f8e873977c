//! GTF-backed annotation database

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{AnnotationLookup, GeneModel};
use crate::data::Strand;
use crate::error::{ChipseqError, Result};

/// Gene models parsed from a GTF file, kept in file order
#[derive(Debug, Clone, Default)]
pub struct GtfAnnotationDb {
    genes: Vec<GeneModel>,
    /// chrom -> indices into `genes`, sorted by start
    by_chrom: HashMap<String, Vec<usize>>,
}

/// Value of `key "value";` in a GTF attribute column
fn attribute<'a>(attributes: &'a str, key: &str) -> Option<&'a str> {
    attributes
        .split(';')
        .map(str::trim)
        .filter_map(|kv| kv.split_once(' '))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim().trim_matches('"'))
}

impl GtfAnnotationDb {
    /// Load `gene` and `exon` records from a GTF file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse GTF records from any buffered reader
    ///
    /// Genes without a `gene` line get their span from their exons.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut genes: Vec<GeneModel> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 9 {
                return Err(ChipseqError::Parse {
                    line: i + 1,
                    reason: format!("expected 9 GTF columns, got {}", fields.len()),
                });
            }

            let kind = fields[2];
            if kind != "gene" && kind != "exon" {
                continue;
            }

            let start: u64 = fields[3].parse().map_err(|_| ChipseqError::Parse {
                line: i + 1,
                reason: format!("invalid start '{}'", fields[3]),
            })?;
            let end: u64 = fields[4].parse().map_err(|_| ChipseqError::Parse {
                line: i + 1,
                reason: format!("invalid end '{}'", fields[4]),
            })?;
            if start == 0 || end < start {
                return Err(ChipseqError::Parse {
                    line: i + 1,
                    reason: format!("invalid interval {}-{}", start, end),
                });
            }
            // GTF is 1-based inclusive
            let (start, end) = (start - 1, end);

            let gene_id = attribute(fields[8], "gene_id").ok_or_else(|| ChipseqError::Parse {
                line: i + 1,
                reason: "missing gene_id attribute".to_string(),
            })?;

            let idx = *index.entry(gene_id.to_string()).or_insert_with(|| {
                genes.push(GeneModel {
                    gene_id: gene_id.to_string(),
                    gene_name: None,
                    chrom: fields[0].to_string(),
                    start,
                    end,
                    strand: Strand::from_symbol(fields[6]),
                    exons: Vec::new(),
                });
                genes.len() - 1
            });

            let gene = &mut genes[idx];
            if gene.gene_name.is_none() {
                gene.gene_name = attribute(fields[8], "gene_name").map(str::to_string);
            }
            if kind == "gene" {
                gene.start = start;
                gene.end = end;
            } else {
                gene.start = gene.start.min(start);
                gene.end = gene.end.max(end);
                gene.exons.push((start, end));
            }
        }

        let mut by_chrom: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, gene) in genes.iter_mut().enumerate() {
            gene.exons.sort_unstable();
            by_chrom.entry(gene.chrom.clone()).or_default().push(i);
        }
        for indices in by_chrom.values_mut() {
            indices.sort_by_key(|&i| genes[i].start);
        }

        log::info!("Loaded {} gene models", genes.len());
        Ok(Self { genes, by_chrom })
    }

    /// All genes in file order
    pub fn genes(&self) -> &[GeneModel] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl AnnotationLookup for GtfAnnotationDb {
    fn genes_in_region(&self, chrom: &str, start: u64, end: u64) -> Result<Vec<GeneModel>> {
        let Some(indices) = self.by_chrom.get(chrom) else {
            return Ok(Vec::new());
        };
        Ok(indices
            .iter()
            .map(|&i| &self.genes[i])
            .take_while(|g| g.start < end)
            .filter(|g| g.end > start)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GTF: &str = "\
#!genome-build test
chr1\tsrc\tgene\t101\t500\t.\t+\t.\tgene_id \"G1\"; gene_name \"alpha\";
chr1\tsrc\texon\t101\t200\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t301\t500\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\ttranscript\t101\t500\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t1001\t1100\t.\t-\t.\tgene_id \"G2\"; transcript_id \"T2\";
chr2\tsrc\tgene\t51\t80\t.\t-\t.\tgene_id \"G3\";
";

    #[test]
    fn test_parse_genes_and_exons() {
        let db = GtfAnnotationDb::from_reader(Cursor::new(GTF)).unwrap();
        assert_eq!(db.len(), 3);

        let g1 = &db.genes()[0];
        assert_eq!(g1.gene_id, "G1");
        assert_eq!(g1.label(), "alpha");
        assert_eq!((g1.start, g1.end), (100, 500));
        assert_eq!(g1.exons, vec![(100, 200), (300, 500)]);
        assert_eq!(g1.strand, Strand::Plus);

        // Span inferred from exons when there is no gene line
        let g2 = &db.genes()[1];
        assert_eq!((g2.start, g2.end), (1000, 1100));
        assert_eq!(g2.label(), "G2");
        assert_eq!(g2.strand, Strand::Minus);
    }

    #[test]
    fn test_region_query() {
        let db = GtfAnnotationDb::from_reader(Cursor::new(GTF)).unwrap();
        let hits = db.genes_in_region("chr1", 450, 1050).unwrap();
        let ids: Vec<&str> = hits.iter().map(|g| g.gene_id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "G2"]);

        assert!(db.genes_in_region("chr1", 500, 1000).unwrap().is_empty());
        assert!(db.genes_in_region("chrX", 0, 1_000_000).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_line() {
        let bad = "chr1\tsrc\tgene\t10\n";
        let err = GtfAnnotationDb::from_reader(Cursor::new(bad)).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_gene_to_feature() {
        let db = GtfAnnotationDb::from_reader(Cursor::new(GTF)).unwrap();
        let f = db.genes()[2].to_feature().unwrap();
        assert_eq!(f.chrom(), "chr2");
        assert_eq!((f.start(), f.end()), (50, 80));
        assert_eq!(f.strand(), Strand::Minus);
        assert_eq!(f.tss(), 79);
    }
}

//! Genomic features (intervals) used as rows of a signal matrix

use std::fmt;

use crate::error::{ChipseqError, Result};

/// Strand of a feature or read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
    /// Unstranded (`.` in BED)
    Unknown,
}

impl Strand {
    /// Parse a BED/GTF strand column
    pub fn from_symbol(s: &str) -> Self {
        match s.trim() {
            "+" => Strand::Plus,
            "-" => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Unknown => ".",
        }
    }
}

/// A half-open interval `[start, end)` on a reference sequence
///
/// Features are immutable once built; identity is positional, so two features
/// with the same coordinates, strand and fields compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    chrom: String,
    start: u64,
    end: u64,
    name: Option<String>,
    strand: Strand,
    /// Any additional columns (score, thickStart, ...) kept verbatim
    fields: Vec<String>,
}

impl Feature {
    /// Create a new unstranded, unnamed feature
    pub fn new(chrom: &str, start: u64, end: u64) -> Result<Self> {
        if chrom.is_empty() {
            return Err(ChipseqError::InvalidFeature {
                reason: "chromosome name is empty".to_string(),
            });
        }
        if end <= start {
            return Err(ChipseqError::InvalidFeature {
                reason: format!("{}:{}-{} has non-positive length", chrom, start, end),
            });
        }
        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
            name: None,
            strand: Strand::Unknown,
            fields: Vec::new(),
        })
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Features always span at least one base
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Transcription start site: `start` for plus/unstranded, `end - 1` for minus
    pub fn tss(&self) -> u64 {
        match self.strand {
            Strand::Minus => self.end - 1,
            _ => self.start,
        }
    }

    /// Window of `upstream` + `downstream` bases around the TSS, strand-aware
    ///
    /// The window is clipped at position 0 of the chromosome.
    pub fn tss_window(&self, upstream: u64, downstream: u64) -> Result<Self> {
        let tss = self.tss();
        let (start, end) = match self.strand {
            Strand::Minus => (tss.saturating_sub(downstream), tss + upstream + 1),
            _ => (tss.saturating_sub(upstream), tss + downstream + 1),
        };
        let mut window = Feature::new(&self.chrom, start, end)?.with_strand(self.strand);
        window.name = self.name.clone();
        Ok(window)
    }

    /// Whether this feature overlaps `[start, end)` on `chrom`
    pub fn overlaps(&self, chrom: &str, start: u64, end: u64) -> bool {
        self.chrom == chrom && self.start < end && start < self.end
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)?;
        if self.name.is_some() || self.strand != Strand::Unknown {
            write!(
                f,
                "\t{}\t.\t{}",
                self.name.as_deref().unwrap_or("."),
                self.strand.symbol()
            )?;
        }
        for field in &self.fields {
            write!(f, "\t{}", field)?;
        }
        Ok(())
    }
}

//! Command-line interface for rust_chipseq

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rust_chipseq")]
#[command(version)]
#[command(about = "Differential ChIP-seq heatmaps and strand cross-correlation in Rust")]
#[command(disable_help_flag = true)]
#[command(disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads for the global pool (0 = auto) [default: 0]
    #[arg(short = 't', long, global = true, default_value = "0")]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// IP-minus-control heatmap with detail views
    #[command(
        about = "IP-minus-control heatmap with detail views",
        long_about = "IP-minus-control heatmap with detail views\n\n\
            Builds reads-per-million IP and control matrices over a set of features,\n\
            subtracts control from IP, compresses the difference with a sign-preserving\n\
            log, orders rows by TIP z-score and writes the heatmap as SVG.\n\n\
            Strip selections given with --select are fed through the same selection\n\
            channel an interactive backend would use; each accepted selection writes one\n\
            detail view per feature. Selections of more than the configured limit\n\
            (default 5) are rejected.",
        after_long_help = "\
Examples:
  # TSS +/- 1 kb of the first 5000 genes in a GTF
  rust_chipseq chipseq --ip ip.bed --control input.bed --gtf genes.gtf

  # Own features, identity transform, three detail views
  rust_chipseq chipseq --ip ip.bed --control input.bed -f peaks.bed \\
    --transform identity --select 0,1,2

  # Grey colormap and custom styling
  rust_chipseq chipseq --ip ip.bed --control input.bed --gtf genes.gtf \\
    --cmap gray --config display.json -o plots"
    )]
    Chipseq {
        /// IP alignments (BED6)
        #[arg(long,
            long_help = "IP alignments as BED6 (chrom, start, end, name, score, strand),\n\
                e.g. the output of `bedtools bamtobed`.")]
        ip: String,

        /// Control alignments (BED6)
        #[arg(long)]
        control: String,

        /// Features to build rows over (BED)
        #[arg(short, long,
            long_help = "Features (BED3 or wider) to use as matrix rows.\n\
                Without this, TSS windows of the first --n-genes genes of --gtf are used.")]
        features: Option<String>,

        /// Gene annotation (GTF)
        #[arg(short, long,
            long_help = "GTF gene annotation. Enables gene-model tracks in detail views\n\
                and supplies TSS features when --features is not given.")]
        gtf: Option<String>,

        /// Genes to take TSS windows from [default: 5000]
        #[arg(long, default_value = "5000")]
        n_genes: usize,

        /// Bases upstream of the TSS [default: 1000]
        #[arg(long, default_value = "1000")]
        upstream: u64,

        /// Bases downstream of the TSS [default: 1000]
        #[arg(long, default_value = "1000")]
        downstream: u64,

        /// Bins per feature [default: 100]
        #[arg(short, long, default_value = "100")]
        bins: usize,

        /// Extend reads to this fragment size [default: 200]
        #[arg(long, default_value = "200")]
        fragment_size: u64,

        /// Shift reads toward their 3' end [default: 0]
        #[arg(long, default_value = "0")]
        shift_width: u64,

        /// Worker threads for array construction (0 = global pool) [default: 6]
        #[arg(long, default_value = "6")]
        processes: usize,

        /// Features per work unit [default: 50]
        #[arg(long, default_value = "50")]
        chunksize: usize,

        /// Transform of the difference [default: nice_log]
        #[arg(long, default_value = "nice_log",
            long_help = "Transform applied to IP - control.\n\
                nice_log: sign(x) * log2(1 + |x|)\n\
                identity: no transform\n\
                scale:    multiply by --scale-factor")]
        transform: String,

        /// Factor for --transform scale [default: 1e6]
        #[arg(long, default_value = "1e6")]
        scale_factor: f64,

        /// Row order [default: tip]
        #[arg(long, default_value = "tip",
            long_help = "Row order of the heatmap.\n\
                tip:   descending TIP z-score\n\
                input: feature order")]
        order: String,

        /// Heatmap colormap (diverging, gray)
        #[arg(long)]
        cmap: Option<String>,

        /// Display configuration (JSON)
        #[arg(long)]
        config: Option<String>,

        /// Simulated strip selection, comma-separated pick indices
        #[arg(long, value_name = "I,J,...",
            long_help = "Strip points to select, as comma-separated indices counted from the\n\
                bottom of the strip. Repeat the option for several selections.")]
        select: Vec<String>,

        /// Output directory [default: chipseq_plots]
        #[arg(short, long, default_value = "chipseq_plots")]
        output: String,
    },

    /// Estimate the strand shift by cross-correlation
    #[command(
        about = "Estimate the strand shift by cross-correlation",
        long_about = "Estimate the strand shift by cross-correlation\n\n\
            Samples random windows from the genome, builds plus- and minus-strand\n\
            coverage in each, keeps windows where both strands exceed the coverage\n\
            threshold, and averages their normalized cross-correlation. The lag with\n\
            the highest mean correlation is reported and marked in the SVG plot.",
        after_long_help = "\
Examples:
  rust_chipseq xcorr --reads ip.bed --genome hg19.chrom.sizes

  # Fewer, smaller windows with an explicit threshold
  rust_chipseq xcorr --reads ip.bed --genome hg19.chrom.sizes \\
    --window-size 2000 --n-windows 500 --threshold 0.01 -o shift.svg"
    )]
    Xcorr {
        /// Alignments (BED6)
        #[arg(long)]
        reads: String,

        /// Chromosome sizes (chrom<TAB>length)
        #[arg(short, long)]
        genome: String,

        /// Seed for window shuffling [default: 1]
        #[arg(long, default_value = "1")]
        seed: u32,

        /// Window size [default: 5000]
        #[arg(long, default_value = "5000")]
        window_size: u64,

        /// Number of windows [default: 5000]
        #[arg(long, default_value = "5000")]
        n_windows: usize,

        /// Largest lag in each direction [default: 500]
        #[arg(long, default_value = "500")]
        max_lag: usize,

        /// Fragment size reads are extended to [default: 1]
        #[arg(long, default_value = "1")]
        fragment_size: u64,

        /// Minimum mean coverage on each strand
        #[arg(long,
            long_help = "Minimum mean coverage on BOTH strands for a window to be used.\n\
                Default: fragment_size / window_size * 10")]
        threshold: Option<f64>,

        /// Worker threads for array construction [default: 8]
        #[arg(long, default_value = "8")]
        processes: usize,

        /// Windows per work unit [default: 100]
        #[arg(long, default_value = "100")]
        chunksize: usize,

        /// Output SVG [default: xcorr.svg]
        #[arg(short, long, default_value = "xcorr.svg")]
        output: String,
    },
}

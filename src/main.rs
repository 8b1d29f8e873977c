//! rust_chipseq command-line interface

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn, LevelFilter};

use rust_chipseq::cli::{Cli, Commands};
use rust_chipseq::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let first_positional = args.iter().skip(1).find(|a| !a.starts_with('-'));
    let subcommands = ["chipseq", "xcorr", "help"];
    let has_subcommand = first_positional.map_or(false, |a| subcommands.contains(&a.as_str()));

    if !has_subcommand {
        if args.iter().any(|a| a == "-h" || a == "--help") {
            print_help();
        } else if args.iter().any(|a| a == "-V" || a == "--version") {
            println!("rust_chipseq {}", VERSION);
        } else {
            print_no_args();
        }
        return;
    }

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    let result = match cli.command {
        Some(Commands::Chipseq {
            ip,
            control,
            features,
            gtf,
            n_genes,
            upstream,
            downstream,
            bins,
            fragment_size,
            shift_width,
            processes,
            chunksize,
            transform,
            scale_factor,
            order,
            cmap,
            config,
            select,
            output,
        }) => {
            let tss = TssWindows {
                n_genes,
                upstream,
                downstream,
            };
            let mut params = ArrayParams::default()
                .with_bins(bins)
                .with_fragment_size(fragment_size);
            params.coverage.shift_width = shift_width;
            params.chunksize = Some(chunksize);
            if processes > 0 {
                params.processes = Some(processes);
            }
            parse_transform(&transform, scale_factor).and_then(|transform| {
                run_chipseq(ChipseqRun {
                    ip: &ip,
                    control: &control,
                    features: features.as_deref(),
                    gtf: gtf.as_deref(),
                    tss,
                    params,
                    transform,
                    order: &order,
                    cmap: cmap.as_deref(),
                    config: config.as_deref(),
                    select: &select,
                    output: &output,
                })
            })
        }
        Some(Commands::Xcorr {
            reads,
            genome,
            seed,
            window_size,
            n_windows,
            max_lag,
            fragment_size,
            threshold,
            processes,
            chunksize,
            output,
        }) => {
            let params = ShiftParams {
                window_size,
                n_windows,
                threshold: threshold
                    .unwrap_or(fragment_size as f64 / window_size as f64 * 10.0),
                max_lag,
                fragment_size: Some(fragment_size),
                processes: (processes > 0).then_some(processes),
                chunksize: Some(chunksize),
                ..ShiftParams::default()
            };
            run_xcorr(&reads, &genome, seed, &params, &output)
        }
        None => {
            print_no_args();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Help output
// ---------------------------------------------------------------------------

fn print_no_args() {
    println!("rust_chipseq v{}", VERSION);
    println!("Run `rust_chipseq --help` for usage.");
}

fn print_help() {
    println!("rust_chipseq v{}", VERSION);
    println!("Differential ChIP-seq heatmaps and strand cross-correlation");
    println!();
    println!("Usage: rust_chipseq <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  chipseq  IP-minus-control heatmap ordered by TIP z-score, with detail views");
    println!("  xcorr    Estimate the plus/minus strand shift by cross-correlation");
    println!();
    println!("Global Options:");
    println!("  -v, --verbose        Enable verbose output");
    println!("  -t, --threads <N>    Threads for the global pool (0 = auto)");
    println!();
    println!("Run `rust_chipseq <COMMAND> --help` for command-specific options.");
}

// ---------------------------------------------------------------------------
// chipseq
// ---------------------------------------------------------------------------

struct TssWindows {
    n_genes: usize,
    upstream: u64,
    downstream: u64,
}

struct ChipseqRun<'a> {
    ip: &'a str,
    control: &'a str,
    features: Option<&'a str>,
    gtf: Option<&'a str>,
    tss: TssWindows,
    params: ArrayParams,
    transform: DiffTransform,
    order: &'a str,
    cmap: Option<&'a str>,
    config: Option<&'a str>,
    select: &'a [String],
    output: &'a str,
}

fn parse_transform(name: &str, scale_factor: f64) -> Result<DiffTransform> {
    match name {
        "nice_log" | "nicelog" => Ok(DiffTransform::NiceLog),
        "identity" => Ok(DiffTransform::Identity),
        "scale" => Ok(DiffTransform::Scale(scale_factor)),
        other => Err(ChipseqError::InvalidInput {
            reason: format!(
                "Unknown transform '{}'. Use 'nice_log', 'identity' or 'scale'.",
                other
            ),
        }),
    }
}

fn parse_selection(raw: &str) -> Result<SelectionEvent> {
    let indices = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>().map_err(|_| ChipseqError::InvalidInput {
                reason: format!("Invalid pick index '{}' in --select {}", s, raw),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SelectionEvent::new(indices))
}

/// TSS windows of the first `n_genes` genes in file order
fn tss_features(db: &GtfAnnotationDb, tss: &TssWindows) -> Result<Vec<Feature>> {
    db.genes()
        .iter()
        .take(tss.n_genes)
        .map(|g| g.to_feature()?.tss_window(tss.upstream, tss.downstream))
        .collect()
}

fn run_chipseq(run: ChipseqRun<'_>) -> Result<()> {
    let config = match run.config {
        Some(path) => DisplayConfig::from_json_file(path)?,
        None => DisplayConfig::default(),
    };
    let selections = run
        .select
        .iter()
        .map(|s| parse_selection(s))
        .collect::<Result<Vec<_>>>()?;

    info!("Loading IP alignments from: {}", run.ip);
    let ip = ReadCoverageSignal::new(read_aligned_reads(run.ip)?);
    info!("Loading control alignments from: {}", run.control);
    let control = ReadCoverageSignal::new(read_aligned_reads(run.control)?);

    let annotations = match run.gtf {
        Some(path) => {
            info!("Loading gene models from: {}", path);
            Some(Arc::new(GtfAnnotationDb::from_path(path)?))
        }
        None => None,
    };

    let (features, x) = match (run.features, &annotations) {
        (Some(path), _) => {
            let features = read_features(path)?;
            let bins = run.params.coverage.bins;
            (features, linspace(0.0, bins.saturating_sub(1) as f64, bins))
        }
        (None, Some(db)) => {
            let features = tss_features(db, &run.tss)?;
            info!(
                "Using TSS -{}/+{} bp of {} genes",
                run.tss.upstream,
                run.tss.downstream,
                features.len()
            );
            let x = linspace(
                -(run.tss.upstream as f64),
                run.tss.downstream as f64,
                run.params.coverage.bins,
            );
            (features, x)
        }
        (None, None) => {
            return Err(ChipseqError::InvalidInput {
                reason: "Either --features or --gtf is required".to_string(),
            })
        }
    };

    let mut builder = ChipseqSession::builder()
        .ip(Arc::new(ip))
        .control(Arc::new(control))
        .config(config);
    if let Some(db) = annotations {
        builder = builder.annotations(db);
    }
    let mut session = builder.build()?;

    let diffed = session.diff_array(features, &run.params, run.transform, CachePolicy::Recompute)?;
    info!("Differential array: {} x {}", diffed.nrows(), diffed.ncols());

    let row_order = match run.order {
        "tip" => Some(tip_order(diffed.view())),
        "input" => None,
        other => {
            return Err(ChipseqError::InvalidInput {
                reason: format!("Unknown row order '{}'. Use 'tip' or 'input'.", other),
            })
        }
    };

    let mut image_options = ImageOptions::new();
    if let Some(cmap) = run.cmap {
        image_options = image_options.set("cmap", cmap);
    }

    let plot = session.plot(&x, row_order, Some(&image_options))?;
    let mut heatmaps = SvgBackend::new(run.output, "heatmap")?;
    heatmaps.present(&plot.figure)?;

    if selections.is_empty() {
        return Ok(());
    }

    let (tx, rx) = selection_channel();
    for event in selections {
        // The receiver is alive until the dispatcher below drains it
        let _ = tx.send(event);
    }
    drop(tx);

    let mut dispatcher = plot.dispatcher;
    let mut presenter = DetailPresenter::new(plot.detail_view, SvgBackend::new(run.output, "detail")?);
    let outcomes = dispatcher.run(&rx, &mut presenter);

    for outcome in &outcomes {
        match outcome {
            SelectionOutcome::Dispatched { rendered, failed } => {
                info!("Rendered {} detail views, {} failed", rendered.len(), failed.len())
            }
            SelectionOutcome::Rejected { selected, limit } => {
                warn!("Selection of {} features rejected (limit {})", selected, limit)
            }
        }
    }
    info!(
        "Wrote {} detail views to {}",
        presenter.backend().written().len(),
        run.output
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// xcorr
// ---------------------------------------------------------------------------

fn run_xcorr(
    reads_path: &str,
    genome_path: &str,
    seed: u32,
    params: &ShiftParams,
    output: &str,
) -> Result<()> {
    info!("Loading alignments from: {}", reads_path);
    let signal = ReadCoverageSignal::new(read_aligned_reads(reads_path)?);
    let genome = Genome::from_chrom_sizes(read_chrom_sizes(genome_path)?, seed);

    info!(
        "Cross-correlating {} windows of {} bp (threshold {})",
        params.n_windows, params.window_size, params.threshold
    );
    let estimate = estimate_shift(&signal, &genome, params)?;

    let (mean, lag) = match (estimate.mean_correlation(), estimate.best_lag()) {
        (Some(mean), Some(lag)) => (mean, lag),
        _ => {
            warn!("No window passed the coverage threshold; nothing to plot");
            return Ok(());
        }
    };
    info!(
        "{} windows used; estimated shift: {} bp",
        estimate.n_windows(),
        lag
    );

    let lags: Vec<f64> = estimate.lags.iter().map(|&l| l as f64).collect();
    let (lo, hi) = padded_range(finite_range(mean.iter()));
    let panel = Panel::new(PanelRole::Signal, PanelRect::new(0.08, 0.1, 0.88, 0.82))
        .with_item(PlotItem::Line {
            x: lags,
            y: mean.to_vec(),
            style: LineStyle::default().labeled("mean cross-correlation"),
        })
        .with_item(PlotItem::Line {
            x: vec![lag as f64, lag as f64],
            y: vec![lo, hi],
            style: LineStyle::new((0, 0, 0), 1).labeled(&format!("shift = {} bp", lag)),
        })
        .with_y_range(lo, hi)
        .with_x_label("lag (bp)")
        .with_y_label("correlation")
        .with_integer_x_ticks()
        .with_legend();
    let figure = Figure::new((900, 600))
        .with_title(&format!("Strand cross-correlation ({} windows)", estimate.n_windows()))
        .with_panel(panel);

    render_svg(&figure, Path::new(output))?;
    info!("Wrote {}", output);
    Ok(())
}

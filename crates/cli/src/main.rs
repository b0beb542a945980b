//! geoclass CLI - statistical classification of multi-band rasters

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geoclass_algorithms::classification::{
    clusters_from_training, ClusterClassifier, MahalanobisClassifier, MaxLikelihoodClassifier,
    NoDataMatch,
};
use geoclass_algorithms::entropy::{entropy_map, EntropyByTiles, EntropyResult, DEFAULT_TILE_SIZE};
use geoclass_core::io::{read_band, read_signatures, read_tiff, write_signatures, write_tiff, TiffBand};
use geoclass_core::{DataType, PixelBuffer, Raster};
use geoclass_parallel::{num_cpus, ProcessingMode};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "geoclass")]
#[command(author, version, about = "Statistical pixel classification", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads (1 = sequential, default: all cores)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster band
    Info {
        /// Input TIFF file
        input: PathBuf,
    },
    /// Estimate cluster signatures from a label raster
    Train {
        /// Label raster (class id per pixel, 0 = unlabelled)
        #[arg(short, long)]
        labels: PathBuf,
        /// Band files, in band order
        #[arg(short, long, num_args = 1.., required = true)]
        bands: Vec<PathBuf>,
        /// Output signature file (JSON)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Supervised classification
    Classify {
        #[command(subcommand)]
        algorithm: ClassifyCommands,
    },
    /// Shannon entropy by tiles
    Entropy {
        /// Input TIFF file (single band)
        input: PathBuf,
        /// Tile edge length in pixels
        #[arg(short, long, default_value_t = DEFAULT_TILE_SIZE)]
        tile_size: usize,
        /// Write the tile list as JSON to this file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write an entropy map raster
        #[arg(short, long)]
        map: Option<PathBuf>,
    },
}

// ─── Classify subcommands ───────────────────────────────────────────────

#[derive(Subcommand)]
enum ClassifyCommands {
    /// Minimum Mahalanobis distance (pooled covariance)
    Mahalanobis {
        #[command(flatten)]
        common: ClassifyArgs,
        /// Maximum distance to a cluster mean
        #[arg(short, long, default_value = "3.0")]
        threshold: f64,
    },
    /// Gaussian maximum likelihood (per-class covariance)
    MaxLikelihood {
        #[command(flatten)]
        common: ClassifyArgs,
        /// Probability threshold in percent (0-100)
        #[arg(short, long, default_value = "0.0")]
        threshold: f64,
    },
}

#[derive(Args)]
struct ClassifyArgs {
    /// Signature file produced by `train`
    #[arg(short, long)]
    signatures: PathBuf,
    /// Band files, in band order; all bands must share one sample type
    #[arg(short, long, num_args = 1.., required = true)]
    bands: Vec<PathBuf>,
    /// Output class raster
    #[arg(short, long)]
    output: PathBuf,
    /// Value for pixels no cluster accepts
    #[arg(long, default_value = "0")]
    no_class: i32,
    /// Detect no-data pixels
    #[arg(long)]
    nodata: bool,
    /// Output value for no-data pixels
    #[arg(long, default_value = "0")]
    nodata_output: i32,
    /// Input value marking no-data
    #[arg(long, default_value = "0.0")]
    nodata_value: f64,
    /// How no-data pixels are recognised
    #[arg(long, value_enum, default_value = "sentinel")]
    nodata_match: NoDataMatchArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum NoDataMatchArg {
    /// All bands equal the fixed sentinel
    Sentinel,
    /// All bands equal --nodata-value
    Configured,
}

impl From<NoDataMatchArg> for NoDataMatch {
    fn from(arg: NoDataMatchArg) -> Self {
        match arg {
            NoDataMatchArg::Sentinel => NoDataMatch::Sentinel,
            NoDataMatchArg::Configured => NoDataMatch::Configured,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn processing_mode(threads: Option<usize>) -> ProcessingMode {
    match threads {
        None | Some(0) => ProcessingMode::Parallel,
        Some(1) => ProcessingMode::Sequential,
        Some(n) => ProcessingMode::ParallelWith(n),
    }
}

/// Read band files keeping their sample type; all must share shape and type
fn read_bands(paths: &[PathBuf]) -> Result<(usize, usize, DataType, Vec<PixelBuffer>)> {
    let pb = spinner("Reading bands...");
    let bands = paths
        .iter()
        .map(|p| read_band(p).with_context(|| format!("Failed to read band {}", p.display())))
        .collect::<Result<Vec<TiffBand>>>()?;
    pb.finish_and_clear();

    let Some(first) = bands.first() else {
        bail!("At least one band is required");
    };
    let (rows, cols, data_type) = (first.rows, first.cols, first.pixels.data_type());
    for (band, path) in bands.iter().zip(paths) {
        if (band.rows, band.cols) != (rows, cols) {
            bail!(
                "{}: {} x {} does not match the first band ({} x {})",
                path.display(),
                band.cols,
                band.rows,
                cols,
                rows
            );
        }
        if band.pixels.data_type() != data_type {
            bail!(
                "{}: sample type {} does not match the first band ({})",
                path.display(),
                band.pixels.data_type(),
                data_type
            );
        }
    }
    info!("Input: {} band(s), {} x {}, {}", bands.len(), cols, rows, data_type);
    Ok((rows, cols, data_type, bands.into_iter().map(|b| b.pixels).collect()))
}

fn write_result<T: geoclass_core::RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_tiff(raster, path).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn run_classifier<C: ClusterClassifier>(mut classifier: C, args: &ClassifyArgs, mode: ProcessingMode) -> Result<()> {
    classifier.set_no_class_pixel_value(args.no_class);
    classifier.set_nodata_available(args.nodata);
    classifier.set_nodata_pixel_value(args.nodata_output);
    classifier.set_nodata_value(args.nodata_value);
    classifier.set_nodata_match(args.nodata_match.into());
    classifier.set_processing_mode(mode);

    if !classifier.check() {
        bail!(
            "{}: invalid threshold {} or inconsistent signatures",
            C::NAME,
            classifier.threshold()
        );
    }

    let (rows, cols, data_type, buffers) = read_bands(&args.bands)?;
    let pixels = rows * cols;
    let mut classes = vec![0i32; pixels];

    let start = Instant::now();
    classifier
        .classify(&mut classes, &buffers, pixels, data_type)
        .with_context(|| format!("{} classification failed", C::NAME))?;
    let elapsed = start.elapsed();

    let mut output = Raster::from_vec(classes, rows, cols)?;
    if args.nodata {
        output.set_nodata(Some(args.nodata_output));
    }
    for cluster in classifier.clusters() {
        let count = output.data().iter().filter(|&&c| c == cluster.class_id).count();
        info!(
            "  class {}: {} pixels ({:.1}%)",
            cluster.class_id,
            count,
            100.0 * count as f64 / pixels.max(1) as f64
        );
    }
    write_result(&output, &args.output)?;
    done(C::NAME, &args.output, elapsed);
    Ok(())
}

fn load_signatures(path: &Path) -> Result<geoclass_core::Clusters> {
    let clusters = read_signatures(path)
        .with_context(|| format!("Failed to read signatures from {}", path.display()))?;
    info!("Signatures: {} cluster(s)", clusters.len());
    Ok(clusters)
}

fn summarize_entropy(results: &[EntropyResult]) {
    if results.is_empty() {
        return;
    }
    let (min, max, sum) = results.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(lo, hi, sum), r| (lo.min(r.entropy), hi.max(r.entropy), sum + r.entropy),
    );
    info!(
        "Entropy over {} tiles: min {:.4}, max {:.4}, mean {:.4}",
        results.len(),
        min,
        max,
        sum / results.len() as f64
    );
}

/// Pretty-printed JSON tile list followed by a newline
fn write_entropy_json<W: std::io::Write>(results: &[EntropyResult], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, results)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let mode = processing_mode(cli.threads);
    tracing::debug!(?mode, available_threads = num_cpus(), "processing mode");

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let band = read_band(&input).context("Failed to read raster")?;
            let data_type = band.pixels.data_type();
            let raster: Raster<f64> = read_tiff(&input).context("Failed to read raster")?;
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", band.cols, band.rows, raster.len());
            println!("Sample type: {} ({} bytes)", data_type, data_type.size_in_bytes());
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len().max(1) as f64
            );
        }

        // ── Train ────────────────────────────────────────────────────
        Commands::Train { labels, bands, output } => {
            let pb = spinner("Reading training data...");
            let labels: Raster<i32> = read_tiff(&labels).context("Failed to read label raster")?;
            let bands = bands
                .iter()
                .map(|p| read_tiff::<f64, _>(p).with_context(|| format!("Failed to read band {}", p.display())))
                .collect::<Result<Vec<_>>>()?;
            pb.finish_and_clear();

            let start = Instant::now();
            let refs: Vec<&Raster<f64>> = bands.iter().collect();
            let clusters = clusters_from_training(&labels, &refs).context("Failed to compute signatures")?;
            let elapsed = start.elapsed();
            if clusters.is_empty() {
                bail!("No class has at least two valid training pixels");
            }
            for cluster in &clusters {
                info!(
                    "  class {}: {} pixels, mean {:?}",
                    cluster.class_id,
                    cluster.statistics.pixel_count(),
                    cluster.statistics.mean()
                );
            }
            write_signatures(&clusters, &output).context("Failed to write signatures")?;
            done("Signatures", &output, elapsed);
        }

        // ── Classify ─────────────────────────────────────────────────
        Commands::Classify { algorithm } => match algorithm {
            ClassifyCommands::Mahalanobis { common, threshold } => {
                let clusters = load_signatures(&common.signatures)?;
                run_classifier(MahalanobisClassifier::new(clusters, threshold), &common, mode)?;
            }
            ClassifyCommands::MaxLikelihood { common, threshold } => {
                let clusters = load_signatures(&common.signatures)?;
                run_classifier(MaxLikelihoodClassifier::new(clusters, threshold), &common, mode)?;
            }
        },

        // ── Entropy ──────────────────────────────────────────────────
        Commands::Entropy {
            input,
            tile_size,
            output,
            map,
        } => {
            let pb = spinner("Reading raster...");
            let raster: Raster<f32> = read_tiff(&input).context("Failed to read raster")?;
            pb.finish_and_clear();
            info!("Input: {} x {}", raster.cols(), raster.rows());

            let start = Instant::now();
            let results = EntropyByTiles::new(&raster)
                .with_tile_size(tile_size)
                .with_processing_mode(mode)
                .calculate_entropy()
                .context("Failed to calculate entropy")?;
            let elapsed = start.elapsed();
            summarize_entropy(&results);

            if let Some(path) = &map {
                write_result(&entropy_map(&results, raster.rows(), raster.cols()), path)?;
                info!("Entropy map saved to: {}", path.display());
            }
            match &output {
                Some(path) => {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_entropy_json(&results, std::io::BufWriter::new(file))?;
                    done("Entropy tiles", path, elapsed);
                }
                // stdout carries only the tile list
                None => write_entropy_json(&results, std::io::stdout().lock())?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_json_is_the_whole_output() {
        let results = vec![
            EntropyResult {
                entropy: 0.5,
                upper_left_x: 0,
                upper_left_y: 0,
                lower_right_x: 4,
                lower_right_y: 3,
            },
            EntropyResult {
                entropy: 0.0,
                upper_left_x: 4,
                upper_left_y: 0,
                lower_right_x: 6,
                lower_right_y: 3,
            },
        ];
        let mut out = Vec::new();
        write_entropy_json(&results, &mut out).unwrap();

        let parsed: Vec<EntropyResult> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, results);
    }

    #[test]
    fn test_processing_mode_from_threads() {
        assert_eq!(processing_mode(None), ProcessingMode::Parallel);
        assert_eq!(processing_mode(Some(1)), ProcessingMode::Sequential);
        assert_eq!(processing_mode(Some(3)), ProcessingMode::ParallelWith(3));
    }
}

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ssm_bootstrap::{assemble, output, prefilter, ssm_reader};
use std::path::Path;

#[derive(Parser)]
#[command(name = "ssm-bootstrap")]
#[command(version)]
#[command(about = "Bootstrap resampling of SSM read counts for tumor phylogeny pipelines", long_about = None)]
struct Args {
    /// Input SSM file (tab-separated: id, gene, a, d, mu_r, mu_v)
    #[arg(short, long)]
    input: String,

    /// Output directory; replicate-<k> subdirectories are created here
    #[arg(short, long)]
    output_dir: String,

    /// Number of bootstrap replicates
    #[arg(short = 'n', long, default_value = "100")]
    num_bootstraps: usize,

    /// RNG seed for reproducible resampling (drawn from entropy when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of threads for parallel processing
    #[arg(long, default_value_t = num_cpus())]
    threads: usize,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

macro_rules! progress {
    ($quiet:expr) => {
        if !$quiet {
            eprintln!();
        }
    };
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

fn make_progress_bar(quiet: bool, len: u64) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("  [{elapsed_precise}/{eta_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configure rayon thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .unwrap();

    let input = Path::new(&args.input);
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", args.input);
    }
    if args.num_bootstraps == 0 {
        anyhow::bail!("--num-bootstraps must be at least 1");
    }

    let output_dir = Path::new(&args.output_dir);
    std::fs::create_dir_all(output_dir)?;

    let seed = args.seed.unwrap_or_else(rand::random);

    progress!(args.quiet, "SSM Bootstrap Resampler");
    progress!(args.quiet, "=========================================");
    progress!(args.quiet, "Input SSM: {}", args.input);
    progress!(args.quiet, "Output dir: {}", args.output_dir);
    progress!(args.quiet, "Replicates: {}", args.num_bootstraps);
    progress!(args.quiet, "Seed: {}", seed);
    progress!(args.quiet, "Threads: {}", args.threads);
    progress!(args.quiet);

    // Step 1: Read input table
    progress!(args.quiet, "Step 1: Reading SSM file...");
    let records = ssm_reader::read_ssm(input)?;
    progress!(args.quiet, "  {} mutations loaded", records.len());

    // Step 2: VAF prefilter + quality gate
    progress!(args.quiet);
    progress!(
        args.quiet,
        "Step 2: VAF pre-filtering (threshold >= {})...",
        prefilter::VAF_PREFILTER_THRESHOLD
    );
    let total = records.len();
    let outcome = prefilter::apply_vaf_prefilter(records, prefilter::VAF_PREFILTER_THRESHOLD);
    progress!(
        args.quiet,
        "  {} -> {} mutations ({} removed)",
        total,
        outcome.retained.len(),
        outcome.removed
    );
    prefilter::check_minimum_mutations(outcome.retained.len())?;

    // Step 3: Persist the filtered table before replicate generation so it
    // survives a later failure and feeds downstream marker selection.
    progress!(args.quiet);
    progress!(args.quiet, "Step 3: Writing filtered SSM table...");
    let filtered_path = output::filtered_ssm_path(output_dir);
    output::write_ssm_table(&outcome.retained, &filtered_path)?;
    progress!(args.quiet, "  Saved to: {}", filtered_path.display());

    // Step 4: Resample all mutations (parallel across mutations)
    progress!(args.quiet);
    progress!(args.quiet, "Step 4: Resampling mutations...");
    let pb = make_progress_bar(args.quiet, outcome.retained.len() as u64);
    let tables = assemble::assemble_replicates(
        &outcome.retained,
        args.num_bootstraps,
        seed,
        Some(&pb),
    );
    pb.finish_and_clear();

    // Step 5: Write one table + CNV placeholder per replicate
    progress!(args.quiet, "Step 5: Writing {} replicate tables...", tables.len());
    let pb = make_progress_bar(args.quiet, tables.len() as u64);
    for (k, table) in tables.iter().enumerate() {
        output::write_replicate(table, k + 1, output_dir)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    progress!(args.quiet);
    progress!(
        args.quiet,
        "Done: {} replicates written to {}",
        tables.len(),
        args.output_dir
    );
    Ok(())
}

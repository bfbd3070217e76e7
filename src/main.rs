use clap::{Parser, Subcommand};
use log::{info, warn};

use std::path::{Path, PathBuf};

mod catalog;
mod error;
mod functions;
mod parsers;
mod report;

use crate::catalog::ReferenceCatalog;
use crate::functions::*;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Predict lineages from one or more VCF files using SNP matching")]
    Predict(PredictArgs),
    #[command(about = "List the lineages and marker positions of the reference catalog")]
    Lineages {
        /// TSV catalog to use instead of the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct PredictArgs {
    /// Paths to one or more VCF files
    #[arg(required = true)]
    vcf_files: Vec<PathBuf>,

    /// Directory to save result files (created if missing)
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Single-sample files, or joint multi-sample files
    #[arg(short, long, value_enum, default_value = "single")]
    mode: Mode,

    /// Decision rule (default: best-match for single, threshold for joint)
    #[arg(short, long, value_enum)]
    policy: Option<Policy>,

    /// Threshold policy: minimum score (exclusive) for a lineage to count.
    /// Ignored by best-match.
    #[arg(long, default_value_t = 0.0)]
    min_score: f64,

    /// When a joint-mode GT token counts as a variant
    #[arg(short, long, value_enum, default_value = "literal")]
    genotype_rule: GenotypeRule,

    /// TSV catalog (lineage<TAB>pos,pos,...) to use instead of the built-in one
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Also write one <sample>_lineage_result.txt per sample
    #[arg(long)]
    sample_reports: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Predict(args) => predict(args),
        Commands::Lineages { catalog } => {
            init_logging(false);
            list_lineages(catalog.as_deref())
        }
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<ReferenceCatalog> {
    let catalog = match path {
        Some(path) => {
            info!("Loading catalog: {}", path.display());
            ReferenceCatalog::from_file(path)?
        }
        None => ReferenceCatalog::builtin(),
    };
    Ok(catalog)
}

fn predict(args: PredictArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);

    info!("snp-lineage v{}", env!("CARGO_PKG_VERSION"));
    let catalog = load_catalog(args.catalog.as_deref())?;
    info!("{} lineages in catalog", catalog.len());

    let mut config = PredictConfig::new(args.mode, args.output_dir);
    if let Some(policy) = args.policy {
        config.classifier = Classifier::new(policy);
    }
    config.classifier = config.classifier.with_min_score(args.min_score);
    if config.classifier.ignores_min_score() {
        warn!("--min-score {} has no effect with the best-match policy", args.min_score);
    }
    config.genotype_rule = args.genotype_rule;
    config.sample_reports = args.sample_reports;

    let (_, summary) = predict_lineages(&args.vcf_files, &catalog, &config)?;

    if summary.files_succeeded == 0 {
        anyhow::bail!("None of the {} input file(s) could be processed", summary.files_total);
    }
    Ok(())
}

fn list_lineages(path: Option<&Path>) -> anyhow::Result<()> {
    let catalog = load_catalog(path)?;
    for lineage in &catalog {
        let mut positions: Vec<u64> = lineage.markers.iter().copied().collect();
        positions.sort_unstable();
        let positions = positions
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",");
        println!("{}\t{}\t{}", lineage.id, lineage.markers.len(), positions);
    }
    Ok(())
}

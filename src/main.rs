use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use conflict_consolidate::ingest::load_snapshot;
use conflict_consolidate::output::{self, BASE_STEM, COMPLETE_STEM};
use conflict_consolidate::scanner::{scan_data_dir, snapshot_file_name, MAX_SCAN_DEPTH};
use conflict_consolidate::types::Language;
use conflict_consolidate::{
    Classifier, ConsolidateConfig, Consolidator, MasterRecord, RunSummary, SourceName, SourceRecord,
    TaxonomyConfig,
};

#[derive(Parser)]
#[command(
    name = "conflict_consolidate",
    about = "Socio-environmental conflict catalog consolidator",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Used when no subcommand is given
    #[command(flatten)]
    consolidate: ConsolidateArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Merge the catalog snapshots → output/conflictos_consolidados_*.{json,csv}
    Consolidate(ConsolidateArgs),
    /// Tag a piece of text with the four taxonomies
    Classify {
        /// Catalog whose language rules apply: indh, ejatlas or ocmal
        #[arg(long, value_parser = parse_source)]
        source: SourceName,
        /// Taxonomy configuration JSON replacing the built-in rules
        #[arg(long)]
        taxonomy: Option<PathBuf>,
        text: Vec<String>,
    },
    /// Print the built-in taxonomy configuration as JSON
    Taxonomy,
}

#[derive(Args)]
struct ConsolidateArgs {
    /// Directory searched for the snapshot files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
    /// Explicit INDH snapshot, skips discovery
    #[arg(long)]
    indh: Option<PathBuf>,
    /// Explicit EJAtlas snapshot, skips discovery
    #[arg(long)]
    ejatlas: Option<PathBuf>,
    /// Explicit OCMAL snapshot, skips discovery
    #[arg(long)]
    ocmal: Option<PathBuf>,
    /// Taxonomy configuration JSON replacing the built-in rules
    #[arg(long)]
    taxonomy: Option<PathBuf>,
    /// Leave empty taxonomies empty in the complete dataset too
    #[arg(long)]
    no_inference: bool,
}

impl ConsolidateArgs {
    fn explicit_path(&self, source: SourceName) -> Option<&Path> {
        match source {
            SourceName::Indh => self.indh.as_deref(),
            SourceName::EjAtlas => self.ejatlas.as_deref(),
            SourceName::Ocmal => self.ocmal.as_deref(),
        }
    }
}

fn parse_source(s: &str) -> std::result::Result<SourceName, String> {
    SourceName::from_slug(s).ok_or_else(|| format!("unknown source '{s}' (expected indh, ejatlas or ocmal)"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Consolidate(args)) => run_consolidate(&args),
        Some(Command::Classify {
            source,
            taxonomy,
            text,
        }) => run_classify(source, taxonomy.as_deref(), &text.join(" ")),
        Some(Command::Taxonomy) => run_taxonomy(),
        // Default: consolidate with the top-level flags
        None => run_consolidate(&cli.consolidate),
    }
}

fn load_taxonomy(path: Option<&Path>) -> Result<TaxonomyConfig> {
    let Some(path) = path else {
        return Ok(TaxonomyConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading taxonomy {}", path.display()))?;
    let config: TaxonomyConfig =
        serde_json::from_str(&json).with_context(|| format!("parsing taxonomy {}", path.display()))?;
    info!("Using taxonomy {} (version {})", path.display(), config.version);
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════
//  CONSOLIDATE MODE: snapshots → master records → dataset files
// ═══════════════════════════════════════════════════════════════════════

fn run_consolidate(args: &ConsolidateArgs) -> Result<()> {
    let taxonomy = load_taxonomy(args.taxonomy.as_deref())?;
    let classifier = Classifier::new(&taxonomy).context("compiling taxonomy rules")?;

    let found = scan_data_dir(&args.data_dir, MAX_SCAN_DEPTH);
    let load = |source: SourceName| -> Result<Vec<SourceRecord>> {
        let path = args
            .explicit_path(source)
            .or_else(|| found.get(source))
            .map(Path::to_path_buf)
            .unwrap_or_else(|| args.data_dir.join(snapshot_file_name(source)));
        load_snapshot(source, &path).with_context(|| format!("loading {} snapshot", source.label()))
    };
    let indh = load(SourceName::Indh)?;
    let ejatlas = load(SourceName::EjAtlas)?;
    let ocmal = load(SourceName::Ocmal)?;

    let config = ConsolidateConfig {
        infer_missing: !args.no_inference,
        ..Default::default()
    };
    let consolidator = Consolidator::new(&classifier, &taxonomy.fallback, config);
    let masters = consolidator.consolidate(&indh, &ejatlas, &ocmal);

    let summary = RunSummary::new(classifier.version(), [indh.len(), ejatlas.len(), ocmal.len()], &masters);
    summary.log();

    let complete = output::to_rows(&masters);
    let base: Vec<MasterRecord> = masters.iter().map(MasterRecord::without_inference).collect();
    let base = output::to_rows(&base);

    output::write_dataset(&args.output_dir, COMPLETE_STEM, &complete)
        .context("writing complete dataset")?;
    output::write_dataset(&args.output_dir, BASE_STEM, &base).context("writing base dataset")?;
    output::write_summary(&args.output_dir, &summary).context("writing run summary")?;

    info!("Done: {} master records", summary.total_masters);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  CLASSIFY MODE: tag ad-hoc text, print JSON to stdout
// ═══════════════════════════════════════════════════════════════════════

fn run_classify(source: SourceName, taxonomy: Option<&Path>, text: &str) -> Result<()> {
    let taxonomy = load_taxonomy(taxonomy)?;
    let classifier = Classifier::new(&taxonomy).context("compiling taxonomy rules")?;
    let language: Language = source.language();
    let categories = classifier.classify_all(text, language);

    #[derive(serde::Serialize)]
    struct ClassifyResult {
        source: &'static str,
        language: Language,
        impactos: Vec<String>,
        actores: Vec<String>,
        resistencias: Vec<String>,
        resultados: Vec<String>,
    }

    let result = ClassifyResult {
        source: source.label(),
        language,
        impactos: categories.impacts.labels(),
        actores: categories.actors.labels(),
        resistencias: categories.resistances.labels(),
        resultados: categories.outcomes.labels(),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_taxonomy() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&TaxonomyConfig::default())?);
    Ok(())
}

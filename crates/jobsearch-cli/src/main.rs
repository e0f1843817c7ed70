use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use jobsearch_core::config::{CliOverrides, JobSearchConfig};
use jobsearch_core::init_tracing;
use jobsearch_core::models::{IntentDocument, RankedResult, SearchMeta};
use jobsearch_index::{EmbeddingIndex, IndexBuilder};
use jobsearch_ranking::RankingEngine;
use jobsearch_records::JsonlSource;

#[derive(Parser)]
#[command(name = "jobsearch", version, about = "Build and query job-posting embedding indexes")]
struct Cli {
    /// Directory holding jobsearch.toml
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Index directory (overrides config)
    #[arg(long)]
    index_dir: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and publish an index from a newest-first JSONL file
    Build {
        #[arg(short, long)]
        input: PathBuf,
        /// Stop after this many input lines
        #[arg(long)]
        max_records: Option<u64>,
    },
    /// Print the published manifest
    Info {
        /// Verify artifact checksums while opening
        #[arg(long)]
        verify: bool,
    },
    /// Rank the index against an intent JSON file
    Search {
        #[arg(short, long)]
        intent: PathBuf,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Print the resolved configuration as TOML
    Config,
}

#[derive(Serialize)]
struct SearchHit<'a> {
    #[serde(flatten)]
    result: &'a RankedResult,
    id: Option<&'a str>,
    title: Option<&'a str>,
}

#[derive(Serialize)]
struct SearchReport<'a> {
    meta: SearchMeta,
    results: Vec<SearchHit<'a>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut overrides = CliOverrides {
        index_dir: cli.index_dir.clone(),
        json_logs: cli.json_logs.then_some(true),
        ..Default::default()
    };
    match &cli.command {
        Commands::Build { max_records, .. } => overrides.max_records = *max_records,
        Commands::Info { verify } => overrides.verify_checksums = verify.then_some(true),
        Commands::Search { top_k, .. } => overrides.top_k = *top_k,
        Commands::Config => {}
    }

    let config = JobSearchConfig::load(&cli.root, Some(&overrides))
        .with_context(|| format!("loading configuration from {}", cli.root.display()))?;
    init_tracing(&config.observability);

    match cli.command {
        Commands::Build { input, .. } => build(&config, &input),
        Commands::Info { .. } => show_info(&config),
        Commands::Search { intent, .. } => search(&config, &intent),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn build(config: &JobSearchConfig, input: &Path) -> Result<()> {
    let source = JsonlSource::new(input);
    let report = IndexBuilder::new(config.index.clone())
        .build(&source)
        .with_context(|| format!("building index from {}", input.display()))?;

    info!(
        build_id = %report.manifest.build_id,
        pruned = report.pruned.len(),
        "build finished"
    );
    println!("{}", serde_json::to_string_pretty(report.stats())?);
    Ok(())
}

fn open_index(config: &JobSearchConfig) -> Result<EmbeddingIndex> {
    EmbeddingIndex::open(&config.index.dir, &config.index)
        .with_context(|| format!("opening index at {}", config.index.dir))
}

fn show_info(config: &JobSearchConfig) -> Result<()> {
    let index = open_index(config)?;
    println!("{}", serde_json::to_string_pretty(index.manifest())?);
    Ok(())
}

fn search(config: &JobSearchConfig, intent_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(intent_path)
        .with_context(|| format!("reading intent file {}", intent_path.display()))?;
    let document: IntentDocument =
        serde_json::from_str(&raw).with_context(|| format!("parsing intent file {}", intent_path.display()))?;
    let intent = document.into_intent(config.ranking.default_weights);

    let index = Arc::new(open_index(config)?);
    let engine = RankingEngine::new(index.clone(), config.ranking.clone());
    let outcome = engine.search_with_meta(&intent, config.ranking.default_top_k)?;

    let table = index.table();
    let report = SearchReport {
        meta: outcome.meta,
        results: outcome
            .results
            .iter()
            .map(|result| SearchHit {
                result,
                id: table.id(result.row),
                title: table.title(result.row),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

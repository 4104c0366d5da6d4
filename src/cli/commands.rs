//! CLI command definitions for mail-forge.
//!
//! `generate` runs the full batch, `benchmark` compares sequential and
//! parallel dispatch of the same batch, and `evaluate` scores rewrites of
//! existing datasets with the LLM judge.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ForgeConfig;
use crate::error::{EvaluationError, ExportError};
use crate::evaluation::{
    render_summary, AggregateReport, Criterion, EvaluationAggregator, LlmJudge, LlmRewriter,
    RewriteAction, Rewriter, SourceRecord,
};
use crate::export::{read_jsonl, JsonlSink};
use crate::generator::{LlmRecordGenerator, RecordGenerator};
use crate::pipeline::{BatchPipeline, BatchSummary};
use crate::scheduler::WorkerPoolConfig;
use crate::tasks::{TaskAxes, TaskDescriptor, TaskSetBuilder, VariantAxes};

/// Output file for plain batch runs.
const DEFAULT_OUTPUT_FILE: &str = "synthetic_emails.jsonl";

/// Output file for runs with structure/ambiguity/noise variants.
const DEFAULT_VARIANT_OUTPUT_FILE: &str = "synthetic_emails_experimental.jsonl";

/// Datasets evaluated when no `--dataset` is given.
const DEFAULT_DATASETS: [&str; 3] = [
    "SHORTEN=datasets/shorten.jsonl:shorten",
    "LENGTHEN=datasets/lengthen.jsonl:lengthen",
    "TONE=datasets/tone.jsonl:tone",
];

/// Synthetic email dataset forge.
#[derive(Parser)]
#[command(name = "mail-forge")]
#[command(about = "Generate synthetic email datasets and evaluate rewrites with an LLM judge")]
#[command(version)]
#[command(
    long_about = "mail-forge batch-generates synthetic emails through an OpenAI-compatible endpoint and scores rewritten emails on faithfulness, completeness and robustness.\n\nExample usage:\n  mail-forge generate --concurrency 5\n  mail-forge evaluate --dataset SHORTEN=datasets/shorten.jsonl:shorten"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate the full synthetic email batch and write it as JSONL.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Run the same batch sequentially and in parallel and compare timings.
    #[command(alias = "bench")]
    Benchmark(GenerateArgs),

    /// Evaluate rewrites of existing datasets with the LLM judge.
    #[command(alias = "eval")]
    Evaluate(EvaluateArgs),
}

/// Settings shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// YAML configuration file layered over the defaults.
    #[arg(long, env = "FORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Generation model (or deployment) override.
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Judge model (or deployment) override.
    #[arg(long)]
    pub judge_model: Option<String>,

    /// Per-call timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Arguments for `generate` and `benchmark`.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Output directory (defaults to the configured output_dir).
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Output file name inside the output directory.
    #[arg(short = 'f', long)]
    pub file: Option<String>,

    /// Maximum generation calls in flight.
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Add structure, ambiguity and noise variants to every task.
    #[arg(long)]
    pub variants: bool,

    /// Seed for variant draws; identical seeds reproduce identical task sets.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the run summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `evaluate`.
#[derive(clap::Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Dataset to evaluate as NAME=PATH:ACTION (action: shorten, lengthen, tone).
    /// May be repeated.
    #[arg(short = 'd', long = "dataset")]
    pub datasets: Vec<String>,

    /// Maximum fully scored records per dataset.
    #[arg(short = 'n', long)]
    pub max_samples: Option<usize>,

    /// Tone applied by `tone` rewrites.
    #[arg(long, default_value = crate::evaluation::DEFAULT_TONE)]
    pub tone: String,

    /// Print reports as JSON instead of the text summary.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// A dataset named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub name: String,
    pub path: PathBuf,
    pub action: RewriteAction,
}

/// Parses `NAME=PATH:ACTION`.
///
/// The action is taken after the last `:` so that paths containing a
/// drive letter still parse.
pub fn parse_dataset_spec(raw: &str) -> anyhow::Result<DatasetSpec> {
    let (name, rest) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("dataset '{}' must look like NAME=PATH:ACTION", raw))?;
    let (path, action) = rest
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("dataset '{}' is missing an :ACTION suffix", raw))?;

    let name = name.trim();
    if name.is_empty() || path.trim().is_empty() {
        anyhow::bail!("dataset '{}' must have a non-empty name and path", raw);
    }

    Ok(DatasetSpec {
        name: name.to_string(),
        path: PathBuf::from(path.trim()),
        action: action.parse().map_err(|e: String| anyhow::anyhow!(e))?,
    })
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => {
            run_generate_command(args).await?;
        }
        Commands::Benchmark(args) => {
            run_benchmark_command(args).await?;
        }
        Commands::Evaluate(args) => {
            run_evaluate_command(args).await?;
        }
    }
    Ok(())
}

/// Defaults, then the config file, then the environment, then CLI flags.
fn load_config(args: &ConfigArgs) -> anyhow::Result<ForgeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration file");
            ForgeConfig::from_yaml_file(path)?
        }
        None => ForgeConfig::default(),
    };
    config.apply_env()?;

    if let Some(ref model) = args.model {
        config.generation_model = model.clone();
    }
    if let Some(ref model) = args.judge_model {
        config.judge_model = model.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.call_timeout_secs = secs;
    }

    Ok(config)
}

// ============================================================================
// Generate / Benchmark
// ============================================================================

/// Resolved inputs for one batch run.
struct BatchPlan {
    config: ForgeConfig,
    tasks: Vec<TaskDescriptor>,
    output_path: PathBuf,
}

fn plan_batch(args: &GenerateArgs) -> anyhow::Result<BatchPlan> {
    let mut config = load_config(&args.common)?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }
    config.validate()?;

    let mut builder = TaskSetBuilder::new(TaskAxes::default());
    if args.variants {
        builder = builder.with_variants(VariantAxes::default());
    }
    if let Some(seed) = args.seed {
        builder = builder.with_seed(seed);
    }

    let file = args.file.clone().unwrap_or_else(|| {
        if args.variants {
            DEFAULT_VARIANT_OUTPUT_FILE.to_string()
        } else {
            DEFAULT_OUTPUT_FILE.to_string()
        }
    });
    let output_path = config.output_dir.join(file);

    Ok(BatchPlan {
        tasks: builder.build(),
        config,
        output_path,
    })
}

fn build_generator(config: &ForgeConfig) -> anyhow::Result<Arc<dyn RecordGenerator>> {
    let client = config.llm_client()?;
    Ok(Arc::new(LlmRecordGenerator::new(
        client,
        config.generation_model.clone(),
        config.generation_temperature,
        &config.prompts,
    )))
}

async fn run_batch(
    config: &ForgeConfig,
    generator: Arc<dyn RecordGenerator>,
    tasks: Vec<TaskDescriptor>,
    concurrency: usize,
    output_path: &Path,
) -> anyhow::Result<BatchSummary> {
    let pool_config =
        WorkerPoolConfig::new(concurrency).with_call_timeout(config.call_timeout());
    let pipeline = BatchPipeline::new(pool_config, generator, JsonlSink::new(output_path))?;
    Ok(pipeline.run(tasks).await?)
}

fn print_batch_summary(label: &str, summary: &BatchSummary) {
    println!("{}", label);
    println!("{}", "-".repeat(40));
    println!("Records      : {}", summary.records);
    println!("Fallbacks    : {}", summary.fallbacks);
    println!("Elapsed      : {:.2}s", summary.elapsed.as_secs_f64());
    println!("Peak in flight: {}", summary.peak_in_flight);
    println!("Output       : {}", summary.output_path.display());
    println!("SHA-256      : {}", summary.sha256);
}

async fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let plan = plan_batch(&args)?;
    let generator = build_generator(&plan.config)?;

    println!(
        "Generating {} emails with {} (concurrency {})",
        plan.tasks.len(),
        plan.config.generation_model,
        plan.config.concurrency
    );

    let summary = run_batch(
        &plan.config,
        generator,
        plan.tasks,
        plan.config.concurrency,
        &plan.output_path,
    )
    .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.fallbacks > 0 {
        warn!(
            fallbacks = summary.fallbacks,
            "Some emails fell back to placeholder records"
        );
    }
    print_batch_summary("GENERATION SUMMARY", &summary);
    Ok(())
}

/// Sequential vs parallel timings for the same task set.
#[derive(Debug, Serialize)]
struct BenchmarkOutput {
    sequential: BatchSummary,
    parallel: BatchSummary,
    speedup: f64,
}

fn speedup(sequential: Duration, parallel: Duration) -> f64 {
    let parallel = parallel.as_secs_f64();
    if parallel == 0.0 {
        return 0.0;
    }
    sequential.as_secs_f64() / parallel
}

/// Inserts `suffix` before the file extension.
fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "synthetic_emails".to_string());
    let file = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(file)
}

async fn run_benchmark_command(args: GenerateArgs) -> anyhow::Result<()> {
    let plan = plan_batch(&args)?;
    let generator = build_generator(&plan.config)?;

    println!("Running sequential generation (concurrency 1)...");
    let sequential = run_batch(
        &plan.config,
        Arc::clone(&generator),
        plan.tasks.clone(),
        1,
        &suffixed_path(&plan.output_path, "sequential"),
    )
    .await?;

    println!(
        "Running parallel generation (concurrency {})...",
        plan.config.concurrency
    );
    let parallel = run_batch(
        &plan.config,
        generator,
        plan.tasks,
        plan.config.concurrency,
        &suffixed_path(&plan.output_path, "parallel"),
    )
    .await?;

    let output = BenchmarkOutput {
        speedup: speedup(sequential.elapsed, parallel.elapsed),
        sequential,
        parallel,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_batch_summary("SEQUENTIAL", &output.sequential);
    println!();
    print_batch_summary("PARALLEL", &output.parallel);
    println!();
    println!("Speedup: {:.2}x", output.speedup);
    Ok(())
}

// ============================================================================
// Evaluate
// ============================================================================

async fn run_evaluate_command(args: EvaluateArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.common)?;
    if let Some(max_samples) = args.max_samples {
        config.max_samples = max_samples;
    }
    config.validate()?;

    let raw_specs: Vec<String> = if args.datasets.is_empty() {
        DEFAULT_DATASETS.iter().map(|s| s.to_string()).collect()
    } else {
        args.datasets.clone()
    };
    let specs = raw_specs
        .iter()
        .map(|raw| parse_dataset_spec(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let client = config.llm_client()?;
    let judge = Arc::new(LlmJudge::new(
        Arc::clone(&client),
        config.judge_model.clone(),
        &config.prompts,
    ));
    let rewriter: Arc<dyn Rewriter> = Arc::new(LlmRewriter::new(
        client,
        config.generation_model.clone(),
        config.rewrite_temperature,
        &config.prompts.rewrite,
    ));
    let aggregator = EvaluationAggregator::new(judge);

    let mut reports: Vec<AggregateReport> = Vec::new();

    for spec in specs {
        let action = match spec.action {
            RewriteAction::Tone { .. } => RewriteAction::tone(args.tone.clone()),
            other => other,
        };

        let read = match read_jsonl::<SourceRecord>(&spec.path) {
            Ok(read) => read,
            Err(ExportError::FileNotFound(path)) => {
                warn!(dataset = %spec.name, path = %path, "Dataset file not found, skipping");
                if let Some(notice) = missing_dataset_notice(&path, args.json) {
                    println!("{}", notice);
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !args.json {
            println!("\n{} RESULTS", spec.name);
            println!("{}", "-".repeat(40));
        }
        if read.skipped > 0 {
            warn!(dataset = %spec.name, skipped = read.skipped, "Skipped corrupt dataset lines");
        }

        match aggregator
            .evaluate_rewrites(
                &spec.name,
                &read.records,
                Arc::clone(&rewriter),
                &action,
                config.max_samples,
            )
            .await
        {
            Ok(report) => {
                if !args.json {
                    print_report(&report);
                }
                reports.push(report);
            }
            Err(EvaluationError::NoSamplesUsed { dataset, examined }) => {
                warn!(dataset = %dataset, examined, "No valid samples evaluated");
                if !args.json {
                    println!("WARNING: no valid samples evaluated ({} records examined)", examined);
                }
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

/// Stdout line for a missing dataset. JSON output stays a single document,
/// so the notice is left to the log there.
fn missing_dataset_notice(path: &str, json: bool) -> Option<String> {
    (!json).then(|| format!("File not found: {}", path))
}

fn print_report(report: &AggregateReport) {
    for criterion in Criterion::ALL {
        if let Some(average) = report.average(criterion) {
            println!("{:<12} Avg : {:.2}", criterion.label(), average);
        }
    }
    println!("Samples Used : {}", report.samples_used);
    if report.partially_scored > 0 || report.generation_failures > 0 {
        println!(
            "Skipped      : {} partially scored, {} rewrite failures, {} empty",
            report.partially_scored, report.generation_failures, report.skipped_empty
        );
    }
    println!();
    print!("{}", render_summary(report));
}

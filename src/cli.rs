//! Batch command-line surface: `evaluate`, `generate`, `synthesize`, `check`

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::ai::CompletionClient;
use crate::config::Config;
use crate::constants::EVALUATION_DATASETS;
use crate::dataset::Dataset;
use crate::editor::{
    Action, BatchOptions, BatchReport, Criterion, Editor, FailurePolicy, Generator, RecordOutcome,
    Task, Tone, Verdict, batch, synthetic,
};
use crate::prompts::PromptLibrary;

#[derive(Parser, Debug)]
#[command(
    name = "redraft",
    version,
    about = "Rewrite emails with an LLM and grade the rewrites",
    long_about = "Rewrite emails with an LLM and grade the rewrites.\n\nWithout a command the interactive editor starts.",
    after_help = "Actions: lengthen, shorten, friendly, sympathetic, professional\n\n\
                  Environment: OPENAI_API_KEY, OPENAI_API_BASE (a .env file is read too)\n\
                  Configuration file: ~/.config/redraft/config.toml"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate and judge whole datasets
    Evaluate(EvaluateArgs),
    /// Rewrite and judge one record
    Generate(GenerateArgs),
    /// Create the *_synthetic datasets from persona seeds
    Synthesize(SynthesizeArgs),
    /// Validate prompt libraries and list datasets
    Check,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Dataset stem, repeatable (default: shorten, shorten_synthetic)
    #[arg(long = "dataset", value_name = "STEM")]
    pub datasets: Vec<String>,

    /// Generation model (default: [ai] default_model)
    #[arg(long)]
    pub model: Option<String>,

    /// Rewrite to run instead of the one implied by the datasets
    #[arg(long)]
    pub action: Option<Action>,

    /// Record failures and continue instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Records evaluated at once
    #[arg(long, value_name = "N")]
    pub concurrency: Option<NonZeroUsize>,

    /// Write the full report as JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Dataset stem, e.g. shorten or tone
    pub dataset: String,

    /// Record id
    pub id: String,

    #[arg(long)]
    pub action: Option<Action>,

    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Debug)]
pub struct SynthesizeArgs {
    #[arg(long)]
    pub model: Option<String>,
}

pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Evaluate(args) => evaluate(args, &config).await,
        Command::Generate(args) => generate(args, &config).await,
        Command::Synthesize(args) => synthesize(args.model, &config).await,
        Command::Check => check(&config),
    }
}

/// Action implied by a dataset stem; tone datasets use the default tone
fn action_for(stem: &str, explicit: Option<Action>) -> Result<Action> {
    if let Some(action) = explicit {
        return Ok(action);
    }
    let task = Task::from_str(stem)
        .with_context(|| format!("Cannot infer an action for '{}'; pass --action", stem))?;
    Ok(task.action(Tone::default()))
}

/// One action for a whole evaluation; datasets implying different rewrites
/// need an explicit `--action`
fn action_for_all(stems: &[String], explicit: Option<Action>) -> Result<Action> {
    if let Some(action) = explicit {
        return Ok(action);
    }
    let mut resolved: Option<(Action, &str)> = None;
    for stem in stems {
        let action = action_for(stem, None)?;
        match resolved {
            None => resolved = Some((action, stem.as_str())),
            Some((first, first_stem)) if first != action => bail!(
                "'{}' implies {} but '{}' implies {}; evaluate them separately or pass --action",
                first_stem,
                first.label(),
                stem,
                action.label()
            ),
            Some(_) => {}
        }
    }
    resolved
        .map(|(action, _)| action)
        .context("No datasets to evaluate")
}

async fn evaluate(args: EvaluateArgs, config: &Config) -> Result<()> {
    let stems: Vec<String> = if args.datasets.is_empty() {
        EVALUATION_DATASETS.iter().map(|s| s.to_string()).collect()
    } else {
        args.datasets
    };
    let action = action_for_all(&stems, args.action)?;

    let mut datasets = Vec::with_capacity(stems.len());
    for stem in &stems {
        datasets.push(Dataset::load(&config.data.dataset_path(stem))?);
    }
    let refs: Vec<&Dataset> = datasets.iter().collect();

    let editor = Editor::from_config(config)?;
    let mut options = BatchOptions::new(
        action,
        args.model.unwrap_or_else(|| config.ai.default_model.clone()),
    );
    options.failure_policy = if args.keep_going {
        FailurePolicy::Skip
    } else {
        config.batch.failure_policy
    };
    options.concurrency = args
        .concurrency
        .map_or(config.batch.concurrency, NonZeroUsize::get);

    println!(
        "Evaluating {} with {} (judge: {})",
        stems.join(", "),
        options.model,
        editor.judge.model()
    );
    let report = batch::evaluate_datasets(&editor, &refs, &options, print_outcome).await?;
    print_averages(&report);

    if let Some(path) = args.report {
        write_report(&report, &path)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_outcome(outcome: &RecordOutcome) {
    match &outcome.error {
        Some(error) => println!("[{}] FAILED: {}", outcome.id, error),
        None => {
            println!("[{}]", outcome.id);
            for verdict in &outcome.verdicts {
                print_verdict(verdict);
            }
        }
    }
}

fn print_verdict(verdict: &Verdict) {
    println!("  {}: {}", verdict.criterion.label(), verdict.raw);
}

fn print_averages(report: &BatchReport) {
    println!();
    for (criterion, average) in &report.averages {
        println!("Average {}: {}", criterion, batch::format_average(*average));
    }
    if report.failed > 0 {
        println!("{} record(s) failed", report.failed);
    }
}

fn write_report(report: &BatchReport, path: &std::path::Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))
}

async fn generate(args: GenerateArgs, config: &Config) -> Result<()> {
    let dataset = Dataset::load(&config.data.dataset_path(&args.dataset))?;
    let record = dataset
        .get(&args.id)
        .with_context(|| format!("No record '{}' in {}", args.id, args.dataset))?;
    let action = action_for(&args.dataset, args.action)?;
    let model = args
        .model
        .unwrap_or_else(|| config.ai.default_model.clone());

    let editor = Editor::from_config(config)?;
    let outcome = editor
        .edit_and_judge(action, record, &model, &Criterion::ALL)
        .await?;

    println!("{} ({})\n", action.label(), model);
    println!("{}\n", outcome.generated);
    for verdict in &outcome.verdicts {
        print_verdict(verdict);
    }
    Ok(())
}

async fn synthesize(model: Option<String>, config: &Config) -> Result<()> {
    let prompts = PromptLibrary::load(&config.data.synthetic_prompts)?;
    let client = CompletionClient::from_config(&config.ai)?;
    let generator = Generator::new(Arc::new(prompts), client);
    let model = model.unwrap_or_else(|| config.ai.default_model.clone());

    for (task, actions) in synthetic::plans() {
        let stem = task.dataset_stem();
        let dataset =
            synthetic::synthesize(&generator, stem, &config.synthetic.seeds, actions, &model)
                .await?;
        let path = config.data.dataset_path(stem);
        dataset.write(&path)?;
        println!("Wrote {} record(s) to {}", dataset.len(), path.display());
    }
    Ok(())
}

fn check(config: &Config) -> Result<()> {
    let libraries = [
        ("prompts", &config.data.prompts, true),
        ("judge prompts", &config.data.judge_prompts, true),
        ("synthetic prompts", &config.data.synthetic_prompts, false),
    ];
    for (what, path, required) in libraries {
        if !required && !path.exists() {
            println!("{}: {} not found (only needed by synthesize)", what, path.display());
            continue;
        }
        let library = PromptLibrary::load(path)?;
        println!("{}: {} template(s) in {}", what, library.len(), path.display());
        for key in library.keys() {
            let pair = library.get(key)?;
            let mut fields: Vec<&str> = pair.system.placeholders().into_iter().collect();
            fields.extend(pair.user.placeholders());
            fields.sort_unstable();
            fields.dedup();
            println!("  {:<14} {}", key, fields.join(", "));
        }
    }

    let editor = Editor::from_config(config)?;
    println!(
        "All actions and criteria have templates; judge model is {}",
        editor.judge.model()
    );

    for task in Task::ALL {
        let path = config.data.dataset_path(task.dataset_stem());
        if path.exists() {
            let dataset = Dataset::load(&path)?;
            println!("dataset {:<20} {} record(s)", task.dataset_stem(), dataset.len());
        } else {
            println!("dataset {:<20} missing", task.dataset_stem());
        }
    }
    Ok(())
}

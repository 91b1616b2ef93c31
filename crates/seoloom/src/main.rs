//! seoloom command line: generate, inspect and resume article jobs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use seoloom::config::{expand_home, resolve_config, Config};
use seoloom::db::{default_database_path, Database};
use seoloom::generator::build_generator;
use seoloom::jobs::{ArticleRequest, Job, JobStatus, ListFilter};
use seoloom::logging::{init_logging, LogFormat};
use seoloom::pipeline::{Orchestrator, ProgressEvent, ProgressReporter};
use seoloom::{export_article, JobError, MockSerpSource};

#[derive(Parser)]
#[command(name = "seoloom")]
#[command(about = "Generate SEO articles through a resumable, checkpointed pipeline")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.seoloom/config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Job database (default: ~/.seoloom/data/jobs.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log output format: text or json
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    /// Use the offline template generator even when an API key is configured
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new job and run it to completion
    Generate {
        topic: String,
        #[arg(long)]
        word_count: Option<u32>,
        #[arg(long)]
        language: Option<String>,
        /// Write the finished article here as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show a job's state
    Status {
        job_id: String,
        /// Print the full job, stage outputs included, as JSON
        #[arg(long)]
        json: bool,
    },

    /// Continue a failed or interrupted job from its last checkpoint
    Resume {
        job_id: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List jobs, newest first
    List {
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        status: Option<JobStatus>,
    },

    /// Delete a job and its checkpoints
    Delete { job_id: String },
}

/// Prints stage progress to stderr.
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StageStarted { stage } => eprintln!("-> {}", stage),
            ProgressEvent::StageCompleted { stage, elapsed } => {
                eprintln!("   {} done in {:.1}s", stage, elapsed.as_secs_f64())
            }
            ProgressEvent::RetryScheduled {
                stage,
                attempt,
                delay,
                error,
            } => eprintln!(
                "   {} attempt {} failed ({}), retrying in {:.1}s",
                stage,
                attempt,
                error,
                delay.as_secs_f64()
            ),
            ProgressEvent::Completed { job_id, word_count } => {
                eprintln!("Job {} completed ({} words)", job_id, word_count)
            }
            ProgressEvent::Failed { stage, error } => eprintln!("   {} failed: {}", stage, error),
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_format) {
        eprintln!("Warning: {}", e);
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let db_path = database_path(cli.database.as_deref(), &config)?;

    match cli.command {
        Commands::Generate {
            topic,
            word_count,
            language,
            output,
        } => {
            let orchestrator = orchestrator(&db_path, &config, cli.offline)?;
            let request = ArticleRequest::new(topic)
                .with_word_count(word_count.unwrap_or(config.generation.default_word_count))
                .with_language(language.unwrap_or_else(|| config.generation.language.clone()));

            let result = orchestrator.start(request, &ConsoleProgress);
            finish(result, output.as_deref())
        }
        Commands::Resume { job_id, output } => {
            let orchestrator = orchestrator(&db_path, &config, cli.offline)?;
            let result = orchestrator.resume(&job_id, &ConsoleProgress);
            finish(result, output.as_deref())
        }
        Commands::Status { job_id, json } => {
            let job = orchestrator(&db_path, &config, true)?.status(&job_id)?;
            if json {
                println!("{}", job_json(&job)?);
            } else {
                print_status(&job);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::List { limit, status } => {
            let jobs = orchestrator(&db_path, &config, true)?.list(&ListFilter { status, limit })?;
            if jobs.is_empty() {
                println!("No jobs found");
            }
            for job in jobs {
                println!(
                    "{}  {:<9}  {:<18}  {}",
                    job.id,
                    job.status.as_str(),
                    job.current_stage.as_str(),
                    job.topic
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Delete { job_id } => {
            orchestrator(&db_path, &config, true)?.delete(&job_id)?;
            println!("Deleted job {}", job_id);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn database_path(explicit: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = &config.database_path {
        return Ok(expand_home(path));
    }
    default_database_path().context("Could not determine home directory for the job database")
}

fn orchestrator(db_path: &Path, config: &Config, offline: bool) -> Result<Orchestrator> {
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open job database {}", db_path.display()))?;
    let generator = build_generator(&config.llm, offline).context("Failed to resolve API key")?;
    tracing::debug!(generator = generator.name(), "Generator selected");

    Ok(Orchestrator::from_config(
        db,
        config,
        Arc::new(MockSerpSource::new(config.serp.result_count)),
        Arc::from(generator),
    ))
}

/// Reports the outcome of a run; a stage failure exits non-zero with a resume hint.
fn finish(result: std::result::Result<Job, JobError>, output: Option<&Path>) -> Result<ExitCode> {
    match result {
        Ok(job) => {
            if let Some(article) = job.article() {
                println!("Job:      {}", job.id);
                println!("Title:    {}", article.title);
                println!("Words:    {}", article.word_count);
                println!(
                    "Density:  {:.2}% for \"{}\"",
                    article.keyword_analysis.keyword_density,
                    article.keyword_analysis.primary_keyword
                );
                println!(
                    "Links:    {} internal, {} external",
                    article.internal_links.len(),
                    article.external_references.len()
                );
            }
            if let Some(path) = output {
                export_article(&job, path)?;
                println!("Written:  {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ JobError::StageFailed { .. }) => {
            eprintln!("Error: {}", e);
            if let Some(job_id) = e.job_id() {
                eprintln!("Resume with: seoloom resume {}", job_id);
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_status(job: &Job) {
    println!("Job:      {}", job.id);
    println!("Topic:    {}", job.topic());
    println!("Status:   {}", job.status);
    println!("Stage:    {}", job.current_stage);
    let done: Vec<&str> = job
        .stage_outputs
        .completed_stages()
        .iter()
        .map(|s| s.as_str())
        .collect();
    println!("Done:     {}", if done.is_empty() { "-".to_string() } else { done.join(", ") });
    println!("Attempts: {}", job.attempts);
    println!("Created:  {}", job.created_at.to_rfc3339());
    println!("Updated:  {}", job.updated_at.to_rfc3339());
    if let Some(completed) = job.completed_at {
        println!("Finished: {}", completed.to_rfc3339());
    }
    if let Some(error) = &job.error {
        println!("Error:    {}", error);
    }
}

fn job_json(job: &Job) -> Result<String> {
    let value = serde_json::json!({
        "id": job.id,
        "request": job.request,
        "status": job.status,
        "current_stage": job.current_stage,
        "stage_outputs": job.stage_outputs,
        "error": job.error,
        "attempts": job.attempts,
        "created_at": job.created_at,
        "updated_at": job.updated_at,
        "completed_at": job.completed_at,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

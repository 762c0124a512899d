// src/cli.rs
//! Command-line interface for parsing resumes without the web UI.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use resume_api::common::AppConfig;
use resume_api::extract;
use resume_api::parser::batch::{self, BatchOptions};
use resume_api::parser::engine::{ParseOptions, ResumeParser, RetryPolicy};
use resume_api::parser::models::ResumeRecord;
use resume_api::services::{FileCache, GeminiService, GenerationParams, RecordCache};

#[derive(Parser)]
#[command(name = "resume-cli")]
#[command(about = "Extract structured data from resumes using the Gemini API")]
#[command(version)]
struct Cli {
    /// Path to a resume file (TXT, PDF, or DOCX)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Process every resume in a folder
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// Output file path for results (JSON format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable caching of results
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    if cli.file.is_none() && cli.batch.is_none() {
        let _ = Cli::command().print_help();
        eprintln!("\nError: specify either --file or --batch");
        process::exit(1);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let gemini = Arc::new(GeminiService::new(&config)?);

    let cache_enabled = config.use_cache && !cli.no_cache;
    let cache: Option<Arc<dyn RecordCache>> = if cache_enabled {
        Some(Arc::new(FileCache::new(config.cache_dir.clone())))
    } else {
        None
    };

    let parser = ResumeParser::new(
        gemini,
        cache,
        GenerationParams::from(&config),
        RetryPolicy::from(&config),
    );

    let options = ParseOptions {
        use_cache: cache_enabled,
        max_retries: config.max_retries,
    };

    if let Some(file) = &cli.file {
        parse_single_file(&parser, &config, file, cli.output.as_deref(), &options, cli.verbose)
            .await
    } else if let Some(dir) = &cli.batch {
        run_batch(&parser, &config, dir, cli.output, &options, cli.verbose).await
    } else {
        Ok(())
    }
}

async fn parse_single_file(
    parser: &ResumeParser,
    config: &AppConfig,
    file: &std::path::Path,
    output: Option<&std::path::Path>,
    options: &ParseOptions,
    verbose: bool,
) -> anyhow::Result<()> {
    if verbose {
        println!("Parsing: {}", file.display());
    }

    let text = extract::text_from_file(file, config.max_file_size)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let record = parser
        .parse_resume(&text, options)
        .await
        .with_context(|| format!("failed to parse {}", file.display()))?;

    display_result(&record)?;

    if let Some(output) = output {
        tokio::fs::write(output, serde_json::to_string_pretty(&record)?)
            .await
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("\nResults saved to: {}", output.display());
    }

    Ok(())
}

async fn run_batch(
    parser: &ResumeParser,
    config: &AppConfig,
    dir: &std::path::Path,
    output: Option<PathBuf>,
    options: &ParseOptions,
    verbose: bool,
) -> anyhow::Result<()> {
    let batch_options = BatchOptions {
        parse: *options,
        ..BatchOptions::from_config(config)
    };

    let outcomes = batch::process_directory(parser, dir, &batch_options, |index, total, name| {
        println!("Processing {}/{}: {}", index + 1, total, name);
    })
    .await?;

    let output_path = output.unwrap_or_else(|| PathBuf::from("batch_results.json"));
    batch::write_results(&output_path, &outcomes).await?;

    let total = outcomes.len();
    let success = outcomes.iter().filter(|o| o.success).count();

    println!("\nBatch processing complete!");
    println!(
        "   Total: {} | Success: {} | Failed: {}",
        total,
        success,
        total - success
    );
    println!("   Results saved to: {}", output_path.display());

    if verbose {
        let failed: Vec<_> = outcomes.iter().filter(|o| !o.success).collect();
        if !failed.is_empty() {
            println!("\nFailed files:");
            for outcome in failed {
                println!(
                    "   - {}: {}",
                    outcome.filename,
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    Ok(())
}

fn display_result(record: &ResumeRecord) -> anyhow::Result<()> {
    fn field(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or("N/A")
    }

    let line = "=".repeat(60);
    let rule = "-".repeat(60);

    println!("{}", line);
    println!("RESUME PARSING RESULTS");
    println!("{}", line);

    println!("\nPERSONAL INFORMATION");
    println!("{}", rule);
    println!("Name:        {}", field(&record.name));
    println!("Email:       {}", field(&record.email));
    println!("Phone:       {}", field(&record.phone));
    println!("Position:    {}", field(&record.position));
    println!("Experience:  {}", field(&record.experience));
    println!("Education:   {}", field(&record.education));

    if let Some(summary) = &record.summary {
        println!("\nPROFESSIONAL SUMMARY");
        println!("{}", rule);
        println!("{}", summary);
    }

    println!("\nSKILLS");
    println!("{}", rule);
    if !record.primary_skills.is_empty() {
        println!("Primary Skills (Core Competencies):");
        for skill in &record.primary_skills {
            println!("  - {}", skill);
        }
    }
    if !record.secondary_skills.is_empty() {
        println!("\nSecondary Skills (Supporting):");
        for skill in &record.secondary_skills {
            println!("  - {}", skill);
        }
    }

    if let Some(source) = &record.skills_source {
        println!("\nSKILLS DETERMINATION");
        println!("{}", rule);
        println!("{}", source);
    }

    println!("\n{}", line);
    println!("Complete JSON output:");
    println!("{}", line);
    println!("{}", serde_json::to_string_pretty(record)?);

    Ok(())
}

//! sourcing-cli — thin collaborator around the engine: reads a JobSpec from a
//! file or flags, runs one job in-process, prints the JobResult as JSON.
//!
//! Exit codes: 0 success, 2 validation error, 3 engine unavailable.

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use prospector_api::config::Config;
use prospector_api::errors::EngineError;
use prospector_api::models::job::JobSpec;
use prospector_api::pipeline::SourcingEngine;

const EXIT_OK: i32 = 0;
const EXIT_VALIDATION: i32 = 2;
const EXIT_UNAVAILABLE: i32 = 3;

#[derive(Parser)]
#[command(name = "sourcing-cli")]
#[command(about = "Run one candidate-sourcing job and print the result as JSON")]
struct Cli {
    /// Path to a JobSpec JSON file. Flags below are ignored when set.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Job description text (required unless --spec is given)
    #[arg(long)]
    description: Option<String>,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value = "")]
    company: String,

    /// Comma-separated required skills
    #[arg(long, value_delimiter = ',')]
    required_skills: Vec<String>,

    /// Comma-separated location preferences (city names or "remote")
    #[arg(long, value_delimiter = ',')]
    locations: Vec<String>,

    #[arg(long, default_value_t = 5)]
    max_candidates: usize,

    /// Generate an outreach message per ranked candidate
    #[arg(long)]
    outreach: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let spec = match build_spec(&cli) {
        Ok(spec) => spec,
        Err(message) => {
            eprintln!("invalid job spec: {message}");
            return EXIT_VALIDATION;
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return EXIT_UNAVAILABLE;
        }
    };
    let engine = match SourcingEngine::from_config(&config).await {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("engine startup failed: {e}");
            return EXIT_UNAVAILABLE;
        }
    };

    match engine.run_job(spec, CancellationToken::new()).await {
        Ok(result) => {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&result)
            } else {
                serde_json::to_string(&result)
            };
            match rendered {
                Ok(json) => {
                    println!("{json}");
                    EXIT_OK
                }
                Err(e) => {
                    eprintln!("failed to serialize result: {e}");
                    EXIT_UNAVAILABLE
                }
            }
        }
        Err(EngineError::Validation(message)) => {
            eprintln!("invalid job spec: {message}");
            EXIT_VALIDATION
        }
        Err(e) => {
            eprintln!("engine unavailable: {e}");
            EXIT_UNAVAILABLE
        }
    }
}

fn build_spec(cli: &Cli) -> Result<JobSpec, String> {
    if let Some(path) = &cli.spec {
        let raw = std::fs::read_to_string(path).map_err(|e| format!("reading spec file: {e}"))?;
        return serde_json::from_str(&raw).map_err(|e| format!("parsing spec file: {e}"));
    }

    let description = cli
        .description
        .clone()
        .ok_or_else(|| "either --spec or --description is required".to_string())?;

    Ok(JobSpec {
        id: String::new(),
        description,
        title: cli.title.clone(),
        company: cli.company.clone(),
        highlights: vec![],
        required_skills: cli.required_skills.iter().cloned().collect(),
        preferred_skills: Default::default(),
        location_preferences: cli.locations.clone(),
        seniority_hint: Default::default(),
        rubric_weights: Default::default(),
        max_candidates: cli.max_candidates,
        include_outreach: cli.outreach,
    })
}

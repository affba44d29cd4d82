//! Application configuration loaded from environment variables at startup.
//! Every option has a default so the binaries run without credentials
//! (source adapters fall back to demo mode).

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::limiter::BackoffStrategy;

/// Per-source adapter settings.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub enabled: bool,
    pub base_url: String,
    /// API key or bearer token. Never logged, never surfaced in errors.
    pub credential: Option<String>,
    pub requests_per_window: u32,
    pub window_seconds: u64,
    pub max_in_flight: usize,
    pub demo_mode: bool,
    pub max_retries: u32,
    pub backoff: BackoffStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiProvider {
    Anthropic,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub model: String,
    pub credential: Option<String>,
    pub timeout: Duration,
    pub max_output_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKind {
    Memory,
    External,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub kind: CacheKind,
    pub default_ttl: Duration,
    pub capacity: usize,
    pub redis_url: String,
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub elite_schools: HashSet<String>,
    pub strong_schools: HashSet<String>,
    pub top_tier_companies: HashSet<String>,
    pub mid_tier_companies: HashSet<String>,
    pub skill_vocabulary: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub job_timeout: Duration,
    pub source_timeout: Duration,
    pub global_max_in_flight: usize,
    pub outreach_concurrency: usize,
    pub max_concurrent_jobs: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub linkedin: SourceConfig,
    pub github: SourceConfig,
    pub twitter: SourceConfig,
    pub website: SourceConfig,
    pub ai: AiConfig,
    pub cache: CacheConfig,
    pub scoring: ScoringConfig,
    pub orchestrator: OrchestratorConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            linkedin: source_from_env("LINKEDIN", "https://api.linkedin.example.com", 10)?,
            github: source_from_env("GITHUB", "https://api.github.com", 30)?,
            twitter: source_from_env("TWITTER", "https://api.twitter.com", 20)?,
            website: source_from_env("WEBSITE", "https://search.example.com", 15)?,
            ai: AiConfig {
                provider: match env_or("AI_PROVIDER", "disabled").to_lowercase().as_str() {
                    "anthropic" => AiProvider::Anthropic,
                    _ => AiProvider::Disabled,
                },
                model: env_or("AI_MODEL", "claude-sonnet-4-5"),
                credential: std::env::var("ANTHROPIC_API_KEY").ok(),
                timeout: Duration::from_millis(env_parse("AI_TIMEOUT_MS", 15_000)?),
                max_output_chars: env_parse("AI_MAX_OUTPUT_CHARS", 1_200)?,
            },
            cache: CacheConfig {
                kind: match env_or("CACHE_KIND", "memory").to_lowercase().as_str() {
                    "external" => CacheKind::External,
                    _ => CacheKind::Memory,
                },
                default_ttl: Duration::from_secs(env_parse("CACHE_DEFAULT_TTL_S", 86_400)?),
                capacity: env_parse("CACHE_CAPACITY", 4_096)?,
                redis_url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            },
            scoring: ScoringConfig {
                elite_schools: env_set("ELITE_SCHOOLS", DEFAULT_ELITE_SCHOOLS),
                strong_schools: env_set("STRONG_SCHOOLS", DEFAULT_STRONG_SCHOOLS),
                top_tier_companies: env_set("TOP_TIER_COMPANIES", DEFAULT_TOP_TIER),
                mid_tier_companies: env_set("MID_TIER_COMPANIES", DEFAULT_MID_TIER),
                skill_vocabulary: env_list("SKILL_VOCABULARY", DEFAULT_SKILL_VOCABULARY),
            },
            orchestrator: OrchestratorConfig {
                job_timeout: Duration::from_secs(env_parse("JOB_TIMEOUT_S", 120)?),
                source_timeout: Duration::from_secs(env_parse("SOURCE_TIMEOUT_S", 30)?),
                global_max_in_flight: env_parse("GLOBAL_MAX_IN_FLIGHT", 20)?,
                outreach_concurrency: env_parse("OUTREACH_CONCURRENCY", 4)?,
                max_concurrent_jobs: env_parse("MAX_CONCURRENT_JOBS", 8)?,
            },
            port: env_parse("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn source_from_env(prefix: &str, default_base_url: &str, default_rpm: u32) -> Result<SourceConfig> {
    let credential = std::env::var(format!("{prefix}_API_KEY")).ok();
    Ok(SourceConfig {
        enabled: env_parse(&format!("{prefix}_ENABLED"), true)?,
        base_url: env_or(&format!("{prefix}_BASE_URL"), default_base_url),
        // Demo mode defaults on when no credential is configured, so the
        // service works out of the box.
        demo_mode: env_parse(&format!("{prefix}_DEMO_MODE"), credential.is_none())?,
        credential,
        requests_per_window: env_parse(&format!("{prefix}_REQUESTS_PER_WINDOW"), default_rpm)?,
        window_seconds: env_parse(&format!("{prefix}_WINDOW_SECONDS"), 60)?,
        max_in_flight: env_parse(&format!("{prefix}_MAX_IN_FLIGHT"), 4)?,
        max_retries: env_parse(&format!("{prefix}_MAX_RETRIES"), 3)?,
        backoff: BackoffStrategy::Exponential,
    })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}

fn env_set(key: &str, defaults: &[&str]) -> HashSet<String> {
    env_list(key, defaults).into_iter().collect()
}

fn env_list(key: &str, defaults: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => defaults.iter().map(|s| s.to_string()).collect(),
    }
}

const DEFAULT_ELITE_SCHOOLS: &[&str] = &[
    "mit",
    "massachusetts institute of technology",
    "stanford",
    "stanford university",
    "harvard",
    "caltech",
    "berkeley",
    "uc berkeley",
    "university of california berkeley",
    "cmu",
    "carnegie mellon",
    "cornell",
    "princeton",
    "yale",
    "columbia",
    "university of washington",
    "georgia tech",
];

const DEFAULT_STRONG_SCHOOLS: &[&str] = &[
    "ucla",
    "usc",
    "ucsd",
    "university of michigan",
    "university of illinois",
    "purdue",
    "rice university",
    "duke",
    "northwestern",
    "johns hopkins",
    "university of texas",
    "nyu",
    "university of pennsylvania",
    "brown",
    "dartmouth",
    "vanderbilt",
];

const DEFAULT_TOP_TIER: &[&str] = &[
    "google",
    "microsoft",
    "apple",
    "meta",
    "facebook",
    "amazon",
    "netflix",
    "nvidia",
    "openai",
    "anthropic",
    "deepmind",
    "stripe",
    "uber",
    "airbnb",
];

const DEFAULT_MID_TIER: &[&str] = &[
    "linkedin",
    "salesforce",
    "adobe",
    "intel",
    "oracle",
    "ibm",
    "cisco",
    "databricks",
    "snowflake",
    "palantir",
    "twilio",
    "dropbox",
    "shopify",
    "figma",
];

const DEFAULT_SKILL_VOCABULARY: &[&str] = &[
    "machine learning",
    "deep learning",
    "natural language processing",
    "computer vision",
    "reinforcement learning",
    "distributed systems",
    "system design",
    "data engineering",
    "pytorch",
    "tensorflow",
    "python",
    "rust",
    "go",
    "java",
    "c++",
    "typescript",
    "react",
    "kubernetes",
    "docker",
    "aws",
    "gcp",
    "postgresql",
    "redis",
    "graphql",
    "kafka",
];

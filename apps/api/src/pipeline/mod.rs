//! Orchestrator — drives one sourcing job end to end.
//!
//! Flow: validate → discover (concurrent fan-out, per-source timeout) →
//! normalize (streaming, as records arrive) → merge → score (cached) →
//! rank → generate outreach (bounded fan-out) → assemble JobResult.
//!
//! Per-source problems become `partial_failures` entries; the job itself
//! fails only on validation or when admission is refused. Cancellation is
//! cooperative: in-flight fetches are aborted, CPU-side stages finish on
//! whatever was collected, and no new external calls are issued.

pub mod merger;
pub mod normalizer;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ai_client::{AiBackend, AnthropicBackend};
use crate::cache::{self, Cache};
use crate::config::{AiProvider, CacheKind, Config, OrchestratorConfig};
use crate::errors::EngineError;
use crate::limiter::{BucketConfig, RateLimiter};
use crate::models::candidate::{Candidate, OutreachMessage, RawRecord, ScoredCandidate};
use crate::models::job::{JobResult, JobSpec, PartialFailure};
use crate::outreach::OutreachGenerator;
use crate::pipeline::merger::merge_candidates;
use crate::pipeline::normalizer::Normalizer;
use crate::scoring::{rank, FitScorer};
use crate::sources::{
    github::GithubSource, linkedin::LinkedInSource, twitter::TwitterSource,
    website::WebsiteSource, HealthRegistry, SourceAdapter, SourceContext, SourceError,
    SourceStatus, GITHUB, LINKEDIN, TWITTER, WEBSITE,
};

/// Job phases, logged per transition. Jobs always end `Completed`; partial
/// failures ride along in the result rather than a failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Pending,
    Discovering,
    Normalizing,
    Merging,
    Scoring,
    Ranking,
    Generating,
    Completed,
}

impl JobPhase {
    fn name(&self) -> &'static str {
        match self {
            JobPhase::Pending => "pending",
            JobPhase::Discovering => "discovering",
            JobPhase::Normalizing => "normalizing",
            JobPhase::Merging => "merging",
            JobPhase::Scoring => "scoring",
            JobPhase::Ranking => "ranking",
            JobPhase::Generating => "generating",
            JobPhase::Completed => "completed",
        }
    }
}

/// The sourcing pipeline engine. Shared process-wide behind an `Arc`; all
/// per-job state lives on the stack of `run_job`.
pub struct SourcingEngine {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    limiter: Arc<RateLimiter>,
    cache: Arc<Cache>,
    normalizer: Normalizer,
    scorer: FitScorer,
    outreach: OutreachGenerator,
    health: Arc<HealthRegistry>,
    admission: Arc<Semaphore>,
    config: OrchestratorConfig,
}

impl SourcingEngine {
    /// Builds the full engine from configuration: limiter buckets, cache
    /// backing, the four source adapters, and the AI backend when configured.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let limiter = Arc::new(RateLimiter::new(BucketConfig::default()));
        let cache = Arc::new(match config.cache.kind {
            CacheKind::Memory => Cache::memory(config.cache.capacity, config.cache.default_ttl),
            CacheKind::External => {
                Cache::external(&config.cache.redis_url, config.cache.default_ttl).await?
            }
        });
        let http = reqwest::Client::builder()
            .timeout(config.orchestrator.source_timeout)
            .build()?;
        let global_gate = Arc::new(Semaphore::new(config.orchestrator.global_max_in_flight));
        let health = Arc::new(HealthRegistry::default());

        let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
        let source_configs = [
            (LINKEDIN, &config.linkedin),
            (GITHUB, &config.github),
            (TWITTER, &config.twitter),
            (WEBSITE, &config.website),
        ];
        for (source_id, source_config) in source_configs {
            limiter.configure(
                source_id,
                BucketConfig {
                    max_requests: source_config.requests_per_window,
                    window: std::time::Duration::from_secs(source_config.window_seconds),
                    backoff: source_config.backoff,
                    ..BucketConfig::default()
                },
            );
            health.set(
                source_id,
                if source_config.enabled {
                    SourceStatus::Ok
                } else {
                    SourceStatus::Unavailable
                },
            );
            if !source_config.enabled {
                continue;
            }
            let ctx = SourceContext::new(
                source_id,
                source_config.clone(),
                limiter.clone(),
                cache.clone(),
                http.clone(),
                global_gate.clone(),
            );
            let adapter: Arc<dyn SourceAdapter> = match source_id {
                LINKEDIN => Arc::new(LinkedInSource::new(ctx)),
                GITHUB => Arc::new(GithubSource::new(ctx)),
                TWITTER => Arc::new(TwitterSource::new(ctx)),
                _ => Arc::new(WebsiteSource::new(ctx)),
            };
            adapters.push(adapter);
        }

        let ai: Option<Arc<dyn AiBackend>> = match (&config.ai.provider, &config.ai.credential) {
            (AiProvider::Anthropic, Some(credential)) => Some(Arc::new(AnthropicBackend::new(
                credential.clone(),
                config.ai.model.clone(),
            ))),
            _ => None,
        };
        let outreach = OutreachGenerator::new(
            ai,
            limiter.clone(),
            config.ai.timeout,
            config.ai.max_output_chars,
        );

        Ok(Self::from_parts(
            adapters,
            limiter,
            cache,
            Normalizer::new(config.scoring.skill_vocabulary.clone()),
            FitScorer::new(config.scoring.clone()),
            outreach,
            health,
            config.orchestrator.clone(),
        ))
    }

    /// Assembles an engine from explicit components. The construction seam
    /// used by tests and alternate wiring.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        limiter: Arc<RateLimiter>,
        cache: Arc<Cache>,
        normalizer: Normalizer,
        scorer: FitScorer,
        outreach: OutreachGenerator,
        health: Arc<HealthRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            adapters,
            limiter,
            cache,
            normalizer,
            scorer,
            outreach,
            health,
            admission: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
            config,
        }
    }

    /// Health view for the service endpoint.
    pub fn health_snapshot(
        &self,
    ) -> (&'static str, std::collections::BTreeMap<String, SourceStatus>) {
        let sources = self.health.snapshot(&self.limiter);
        let status = if self.health.degraded() { "degraded" } else { "ok" };
        (status, sources)
    }

    /// Runs one job to completion. Fails only on validation or admission;
    /// everything else lands in the result's `partial_failures`.
    pub async fn run_job(
        &self,
        mut job: JobSpec,
        cancel: CancellationToken,
    ) -> Result<JobResult, EngineError> {
        let _permit = self
            .admission
            .try_acquire()
            .map_err(|_| EngineError::Busy)?;
        job.validate().map_err(EngineError::Validation)?;

        // The job timeout cancels the same token the caller holds, so both
        // paths share the cooperative shutdown.
        let cancel = cancel.child_token();
        let watchdog = {
            let cancel = cancel.clone();
            let timeout = self.config.job_timeout;
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                cancel.cancel();
            })
        };
        let result = self.run_pipeline(&job, &cancel).await;
        watchdog.abort();
        Ok(result)
    }

    async fn run_pipeline(&self, job: &JobSpec, cancel: &CancellationToken) -> JobResult {
        let started = Instant::now();
        let mut phase = JobPhase::Pending;
        let mut failures: Vec<PartialFailure> = Vec::new();

        // ── Discover + normalize (streaming) ───────────────────────────────
        self.advance(&mut phase, JobPhase::Discovering, job);
        let (tx, mut rx) = mpsc::channel::<RawRecord>(64);
        let mut tasks: JoinSet<(&'static str, Result<(), SourceError>)> = JoinSet::new();
        let mut launched: Vec<&'static str> = Vec::new();

        for adapter in &self.adapters {
            if !adapter.enabled() {
                continue;
            }
            let adapter = adapter.clone();
            let tx = tx.clone();
            let job = job.clone();
            let source_timeout = self.config.source_timeout;
            launched.push(adapter.source_id());
            tasks.spawn(async move {
                let source_id = adapter.source_id();
                match tokio::time::timeout(source_timeout, adapter.discover(&job, &tx)).await {
                    Ok(result) => (source_id, result),
                    Err(_) => (source_id, Err(SourceError::Timeout)),
                }
            });
        }
        drop(tx);

        self.advance(&mut phase, JobPhase::Normalizing, job);
        let mut staged: Vec<Candidate> = Vec::new();
        let mut finished: HashSet<&'static str> = HashSet::new();
        let mut cancelled = false;
        let mut drained = false;

        while !drained {
            tokio::select! {
                biased;
                _ = cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    // Abort in-flight fetches; buffered records still drain.
                    tasks.abort_all();
                    warn!(job_id = %job.id, "job cancelled, aborting discovery");
                }
                joined = tasks.join_next(), if !tasks.is_empty() => {
                    if let Some(Ok((source_id, result))) = joined {
                        finished.insert(source_id);
                        match result {
                            Ok(()) => self.health.set(source_id, SourceStatus::Ok),
                            Err(e) => {
                                warn!(source = source_id, "source failed: {e}");
                                self.health.set(source_id, SourceStatus::Unavailable);
                                failures.push(PartialFailure {
                                    source_id: source_id.to_string(),
                                    reason: e.reason().to_string(),
                                });
                            }
                        }
                    }
                }
                maybe_record = rx.recv() => {
                    match maybe_record {
                        Some(record) => match self.normalizer.normalize(&record) {
                            Some(candidate) => staged.push(candidate),
                            None => failures.push(PartialFailure {
                                source_id: record.source_id,
                                reason: "unparseable".to_string(),
                            }),
                        },
                        None => drained = true,
                    }
                }
            }
        }
        // Adapter results that completed after the channel closed.
        while let Some(joined) = tasks.join_next().await {
            if let Ok((source_id, result)) = joined {
                finished.insert(source_id);
                if let Err(e) = result {
                    self.health.set(source_id, SourceStatus::Unavailable);
                    failures.push(PartialFailure {
                        source_id: source_id.to_string(),
                        reason: e.reason().to_string(),
                    });
                } else {
                    self.health.set(source_id, SourceStatus::Ok);
                }
            }
        }
        if cancelled {
            for source_id in &launched {
                if !finished.contains(source_id) {
                    failures.push(PartialFailure {
                        source_id: source_id.to_string(),
                        reason: "cancelled".to_string(),
                    });
                }
            }
        }

        // ── Merge ──────────────────────────────────────────────────────────
        self.advance(&mut phase, JobPhase::Merging, job);
        let merged = merge_candidates(staged);
        let candidates_found = merged.len();

        // ── Score ──────────────────────────────────────────────────────────
        self.advance(&mut phase, JobPhase::Scoring, job);
        let job_fingerprint = job_fingerprint(job);
        let mut scored: Vec<ScoredCandidate> = Vec::with_capacity(merged.len());
        for candidate in &merged {
            let key = cache::score_key(&candidate.identity_key, &job_fingerprint);
            if let Some(value) = self.cache.get(&key).await {
                if let Ok(hit) = serde_json::from_value::<ScoredCandidate>(value) {
                    scored.push(hit);
                    continue;
                }
            }
            let result = self.scorer.score(candidate, job);
            if let Ok(value) = serde_json::to_value(&result) {
                self.cache.put(&key, value, None).await;
            }
            scored.push(result);
        }

        // ── Rank ───────────────────────────────────────────────────────────
        self.advance(&mut phase, JobPhase::Ranking, job);
        rank(&mut scored);
        scored.truncate(job.max_candidates);

        // ── Generate outreach ──────────────────────────────────────────────
        self.advance(&mut phase, JobPhase::Generating, job);
        let messages = if job.include_outreach && !cancelled && !scored.is_empty() {
            Some(self.generate_messages(&scored, job).await)
        } else {
            None
        };

        self.advance(&mut phase, JobPhase::Completed, job);
        JobResult {
            job_id: job.id.clone(),
            candidates_found,
            top_candidates: scored,
            messages,
            processing_time_ms: started.elapsed().as_millis() as u64,
            partial_failures: failures,
        }
    }

    /// Bounded-concurrency message generation, output order matching the
    /// ranked candidate order.
    async fn generate_messages(
        &self,
        scored: &[ScoredCandidate],
        job: &JobSpec,
    ) -> Vec<OutreachMessage> {
        let gate = Arc::new(Semaphore::new(self.config.outreach_concurrency.max(1)));
        let mut tasks: JoinSet<(usize, OutreachMessage)> = JoinSet::new();
        for (index, candidate) in scored.iter().enumerate() {
            let permit = gate
                .clone()
                .acquire_owned()
                .await
                .expect("semaphore never closed");
            let generator = self.outreach.clone();
            let job = job.clone();
            let candidate = candidate.clone();
            tasks.spawn(async move {
                let message = generator.generate(&candidate, &job).await;
                drop(permit);
                (index, message)
            });
        }

        let mut indexed: Vec<(usize, OutreachMessage)> = Vec::with_capacity(scored.len());
        while let Some(joined) = tasks.join_next().await {
            if let Ok(entry) = joined {
                indexed.push(entry);
            }
        }
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, message)| message).collect()
    }

    fn advance(&self, phase: &mut JobPhase, next: JobPhase, job: &JobSpec) {
        *phase = next;
        info!(job_id = %job.id, phase = next.name(), "pipeline phase");
    }
}

/// Stable per-job fingerprint for score cache keys.
fn job_fingerprint(job: &JobSpec) -> String {
    let skills: Vec<&str> = job.required_skills.iter().map(String::as_str).collect();
    cache::fingerprint(&format!("{} {}", job.description, skills.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScoringConfig, SourceConfig};
    use crate::limiter::BackoffStrategy;
    use crate::models::candidate::OutreachMethod;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet as StdHashSet;
    use std::time::Duration;

    fn demo_source_config() -> SourceConfig {
        SourceConfig {
            enabled: true,
            base_url: "http://unused.invalid".to_string(),
            credential: None,
            requests_per_window: 1000,
            window_seconds: 1,
            max_in_flight: 4,
            demo_mode: true,
            max_retries: 3,
            backoff: BackoffStrategy::Exponential,
        }
    }

    fn scoring_config() -> ScoringConfig {
        let to_set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        ScoringConfig {
            elite_schools: to_set(&["stanford", "mit", "berkeley", "cornell"]),
            strong_schools: to_set(&["ucla", "waterloo"]),
            top_tier_companies: to_set(&["google", "meta", "openai", "stripe", "netflix"]),
            mid_tier_companies: to_set(&["databricks", "sap"]),
            skill_vocabulary: vec![
                "machine learning".to_string(),
                "pytorch".to_string(),
                "python".to_string(),
            ],
        }
    }

    fn orchestrator_config() -> OrchestratorConfig {
        OrchestratorConfig {
            job_timeout: Duration::from_secs(120),
            source_timeout: Duration::from_secs(30),
            global_max_in_flight: 20,
            outreach_concurrency: 4,
            max_concurrent_jobs: 8,
        }
    }

    struct EngineParts {
        limiter: Arc<RateLimiter>,
        cache: Arc<Cache>,
        health: Arc<HealthRegistry>,
    }

    fn parts() -> EngineParts {
        EngineParts {
            limiter: Arc::new(RateLimiter::new(BucketConfig {
                max_requests: 1000,
                window: Duration::from_secs(1),
                ..BucketConfig::default()
            })),
            cache: Arc::new(Cache::memory(256, Duration::from_secs(300))),
            health: Arc::new(HealthRegistry::default()),
        }
    }

    fn demo_engine(extra: Vec<Arc<dyn SourceAdapter>>) -> SourcingEngine {
        let p = parts();
        let http = reqwest::Client::new();
        let global = Arc::new(Semaphore::new(20));
        let mut adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(LinkedInSource::new(SourceContext::new(
                LINKEDIN,
                demo_source_config(),
                p.limiter.clone(),
                p.cache.clone(),
                http.clone(),
                global.clone(),
            ))),
            Arc::new(GithubSource::new(SourceContext::new(
                GITHUB,
                demo_source_config(),
                p.limiter.clone(),
                p.cache.clone(),
                http.clone(),
                global.clone(),
            ))),
            Arc::new(TwitterSource::new(SourceContext::new(
                TWITTER,
                demo_source_config(),
                p.limiter.clone(),
                p.cache.clone(),
                http.clone(),
                global.clone(),
            ))),
            Arc::new(WebsiteSource::new(SourceContext::new(
                WEBSITE,
                demo_source_config(),
                p.limiter.clone(),
                p.cache.clone(),
                http,
                global,
            ))),
        ];
        adapters.extend(extra);
        let scoring = scoring_config();
        SourcingEngine::from_parts(
            adapters,
            p.limiter.clone(),
            p.cache.clone(),
            Normalizer::new(scoring.skill_vocabulary.clone()),
            FitScorer::new(scoring),
            OutreachGenerator::new(
                None,
                p.limiter.clone(),
                Duration::from_secs(5),
                1_200,
            ),
            p.health,
            orchestrator_config(),
        )
    }

    fn ml_job(include_outreach: bool) -> JobSpec {
        serde_json::from_value(json!({
            "id": "job-test-1",
            "description": "Machine learning engineer with production PyTorch experience",
            "title": "ML Research Engineer",
            "company": "Acme AI",
            "required_skills": ["PyTorch", "Python"],
            "location_preferences": ["Mountain View", "remote"],
            "max_candidates": 5,
            "include_outreach": include_outreach
        }))
        .unwrap()
    }

    /// Adapter that fails every call with a transport error.
    struct BrokenSource;

    #[async_trait]
    impl SourceAdapter for BrokenSource {
        fn source_id(&self) -> &'static str {
            "broken"
        }
        fn enabled(&self) -> bool {
            true
        }
        async fn discover(
            &self,
            _job: &JobSpec,
            _records: &mpsc::Sender<RawRecord>,
        ) -> Result<(), SourceError> {
            Err(SourceError::Transport)
        }
    }

    #[tokio::test]
    async fn test_full_demo_pipeline_produces_ranked_candidates() {
        let engine = demo_engine(vec![]);
        let result = engine
            .run_job(ml_job(false), CancellationToken::new())
            .await
            .unwrap();

        assert!(result.candidates_found >= 2);
        assert!(!result.top_candidates.is_empty());
        assert!(result.top_candidates.len() <= 5);
        assert!(result.partial_failures.is_empty(), "{:?}", result.partial_failures);
        // Ranked descending with ties broken deterministically.
        for pair in result.top_candidates.windows(2) {
            assert!(pair[0].fit_score >= pair[1].fit_score);
        }
        // Multi-source merge happened: Sarah carries at least two sources.
        let sarah = result
            .top_candidates
            .iter()
            .find(|c| c.candidate.name == "Sarah Chen")
            .expect("Sarah matches an ML query");
        assert!(sarah.candidate.sources.len() >= 2, "{:?}", sarah.candidate.sources.keys());
    }

    #[tokio::test]
    async fn test_ranking_is_deterministic_across_runs() {
        let engine = demo_engine(vec![]);
        let first = engine
            .run_job(ml_job(false), CancellationToken::new())
            .await
            .unwrap();
        let second = engine
            .run_job(ml_job(false), CancellationToken::new())
            .await
            .unwrap();
        let keys = |r: &JobResult| -> Vec<String> {
            r.top_candidates
                .iter()
                .map(|c| c.candidate.identity_key.clone())
                .collect()
        };
        assert_eq!(keys(&first), keys(&second));
    }

    #[tokio::test]
    async fn test_one_broken_source_is_contained() {
        let engine = demo_engine(vec![Arc::new(BrokenSource)]);
        let result = engine
            .run_job(ml_job(false), CancellationToken::new())
            .await
            .unwrap();

        let broken: Vec<_> = result
            .partial_failures
            .iter()
            .filter(|f| f.source_id == "broken")
            .collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].reason, "transport");
        assert!(
            !result.top_candidates.is_empty(),
            "other sources still contribute"
        );
        let (_, sources) = engine.health_snapshot();
        assert_eq!(sources.get("broken"), Some(&SourceStatus::Unavailable));
    }

    #[tokio::test]
    async fn test_outreach_messages_align_with_ranked_order() {
        let engine = demo_engine(vec![]);
        let result = engine
            .run_job(ml_job(true), CancellationToken::new())
            .await
            .unwrap();
        let messages = result.messages.expect("outreach requested");
        assert_eq!(messages.len(), result.top_candidates.len());
        for (message, candidate) in messages.iter().zip(&result.top_candidates) {
            assert_eq!(message.candidate_ref, candidate.candidate.identity_key);
            assert_eq!(message.method, OutreachMethod::Template);
            assert_eq!(message.char_count, message.body.chars().count());
        }
    }

    #[tokio::test]
    async fn test_invalid_spec_rejected_before_discovery() {
        let engine = demo_engine(vec![]);
        let mut spec = ml_job(false);
        spec.max_candidates = 0;
        let err = engine
            .run_job(spec, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_admission_refused_when_caps_exhausted() {
        let p = parts();
        let scoring = scoring_config();
        let mut config = orchestrator_config();
        config.max_concurrent_jobs = 0;
        let engine = SourcingEngine::from_parts(
            vec![],
            p.limiter.clone(),
            p.cache,
            Normalizer::new(vec![]),
            FitScorer::new(scoring),
            OutreachGenerator::new(None, p.limiter, Duration::from_secs(5), 1_200),
            p.health,
            config,
        );
        let err = engine
            .run_job(ml_job(false), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Busy));
    }

    #[tokio::test]
    async fn test_cancellation_returns_promptly_with_partial_failures() {
        let engine = demo_engine(vec![]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let started = std::time::Instant::now();
        let result = engine.run_job(ml_job(true), cancel).await.unwrap();
        assert!(
            started.elapsed() < Duration::from_millis(500),
            "cancellation grace exceeded: {:?}",
            started.elapsed()
        );

        let cancelled_sources: StdHashSet<&str> = result
            .partial_failures
            .iter()
            .filter(|f| f.reason == "cancelled")
            .map(|f| f.source_id.as_str())
            .collect();
        assert!(
            !cancelled_sources.is_empty(),
            "unfinished sources recorded as cancelled: {:?}",
            result.partial_failures
        );
        assert!(result.messages.is_none(), "no outreach after cancel");
    }

    #[tokio::test]
    async fn test_zero_candidate_job_still_succeeds() {
        // Only the broken source is configured: the job completes with an
        // empty ranked list and a populated failure channel.
        let p = parts();
        let scoring = scoring_config();
        let engine = SourcingEngine::from_parts(
            vec![Arc::new(BrokenSource)],
            p.limiter.clone(),
            p.cache,
            Normalizer::new(vec![]),
            FitScorer::new(scoring),
            OutreachGenerator::new(None, p.limiter, Duration::from_secs(5), 1_200),
            p.health,
            orchestrator_config(),
        );
        let result = engine
            .run_job(ml_job(false), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.candidates_found, 0);
        assert!(result.top_candidates.is_empty());
        assert_eq!(result.partial_failures.len(), 1);
    }

    #[test]
    fn test_job_fingerprint_stable_and_query_sensitive() {
        let a = job_fingerprint(&ml_job(false));
        let b = job_fingerprint(&ml_job(true));
        assert_eq!(a, b, "outreach flag does not change the query fingerprint");
        let mut other = ml_job(false);
        other.description = "Staff platform engineer".to_string();
        assert_ne!(a, job_fingerprint(&other));
    }
}

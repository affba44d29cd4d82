//! Primary profile source — professional-network profile lookup.
//!
//! Builds up to three query variants per job (base, location-scoped,
//! seniority-scoped) and emits one RawRecord per profile hit, deduplicated by
//! profile URL across variants.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::models::candidate::RawRecord;
use crate::models::job::{JobSpec, Seniority};
use crate::sources::{demo, SourceAdapter, SourceContext, SourceError, LINKEDIN};

pub struct LinkedInSource {
    ctx: SourceContext,
}

impl LinkedInSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }
}

/// Query variants, most specific last. A job with no title, locations, or
/// seniority hint produces a single variant.
fn build_queries(job: &JobSpec) -> Vec<String> {
    let head = if job.title.trim().is_empty() {
        job.description
            .split_whitespace()
            .take(6)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        job.title.clone()
    };
    let skills = job
        .required_skills
        .iter()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");
    let base = format!("{head} {skills}").trim().to_string();

    let mut queries = vec![base.clone()];
    if let Some(location) = job.location_preferences.first() {
        queries.push(format!("{base} {location}"));
    }
    if job.seniority_hint != Seniority::Unknown {
        queries.push(format!("{:?} {base}", job.seniority_hint).to_lowercase());
    }
    queries
}

#[async_trait]
impl SourceAdapter for LinkedInSource {
    fn source_id(&self) -> &'static str {
        LINKEDIN
    }

    fn enabled(&self) -> bool {
        self.ctx.config.enabled
    }

    async fn discover(
        &self,
        job: &JobSpec,
        records: &mpsc::Sender<RawRecord>,
    ) -> Result<(), SourceError> {
        let queries = build_queries(job);
        let key = self.ctx.query_key(&queries.join(" | "));

        if let Some(cached) = self.ctx.cached_records(&key).await {
            for record in cached {
                let _ = records.send(record).await;
            }
            return Ok(());
        }

        let mut batch: Vec<RawRecord> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        if self.ctx.config.demo_mode {
            let profiles = demo::relevant_profiles(job);
            // Same pacing cost as live: one token per query variant.
            for _ in &queries {
                self.ctx.pace_demo_call().await;
            }
            for profile in profiles.into_iter().take(job.max_candidates) {
                let url = profile.linkedin["profile_url"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                if seen_urls.insert(url) {
                    batch.push(self.ctx.record(profile.linkedin.clone(), true));
                }
            }
        } else {
            for query in &queries {
                let value = self
                    .ctx
                    .paced_get_json(
                        "/search/profiles",
                        &[
                            ("q", query.clone()),
                            ("limit", job.max_candidates.to_string()),
                        ],
                    )
                    .await?;
                let profiles = value
                    .get("profiles")
                    .and_then(|v| v.as_array())
                    .ok_or(SourceError::Unparseable)?;
                for profile in profiles {
                    let url = profile
                        .get("profile_url")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    if seen_urls.insert(url) {
                        batch.push(self.ctx.record(profile.clone(), false));
                    }
                }
            }
        }

        info!(source = LINKEDIN, hits = batch.len(), "discovery complete");
        for record in &batch {
            let _ = records.send(record.clone()).await;
        }
        self.ctx.store_records(&key, &batch).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::config::SourceConfig;
    use crate::limiter::{BucketConfig, RateLimiter};
    use crate::sources::GLOBAL_TEST_PERMITS;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Json;
    use serde_json::json;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::sync::Semaphore;

    fn test_config(base_url: String, demo_mode: bool) -> SourceConfig {
        SourceConfig {
            enabled: true,
            base_url,
            credential: None,
            requests_per_window: 100,
            window_seconds: 1,
            max_in_flight: 4,
            demo_mode,
            max_retries: 3,
            backoff: crate::limiter::BackoffStrategy::Exponential,
        }
    }

    fn test_ctx(config: SourceConfig) -> SourceContext {
        SourceContext::new(
            LINKEDIN,
            config,
            Arc::new(RateLimiter::new(BucketConfig {
                max_requests: 100,
                window: Duration::from_secs(1),
                ..BucketConfig::default()
            })),
            Arc::new(Cache::memory(64, Duration::from_secs(60))),
            reqwest::Client::new(),
            Arc::new(Semaphore::new(GLOBAL_TEST_PERMITS)),
        )
    }

    fn job(description: &str) -> JobSpec {
        serde_json::from_value(json!({ "description": description })).unwrap()
    }

    #[test]
    fn test_build_queries_minimal_job_has_one_variant() {
        let queries = build_queries(&job("Senior ML engineer for recommendations"));
        assert_eq!(queries.len(), 1);
    }

    #[test]
    fn test_build_queries_adds_location_and_seniority_variants() {
        let spec: JobSpec = serde_json::from_value(json!({
            "description": "ML engineer",
            "title": "ML Research Engineer",
            "required_skills": ["pytorch", "python"],
            "location_preferences": ["Mountain View"],
            "seniority_hint": "senior"
        }))
        .unwrap();
        let queries = build_queries(&spec);
        assert_eq!(queries.len(), 3);
        assert!(queries[0].contains("ML Research Engineer"));
        assert!(queries[1].contains("Mountain View"));
        assert!(queries[2].starts_with("senior"));
    }

    #[tokio::test]
    async fn test_demo_discovery_emits_synthetic_tagged_records() {
        let ctx = test_ctx(test_config("http://unused.invalid".to_string(), true));
        let source = LinkedInSource::new(ctx);
        let (tx, mut rx) = mpsc::channel(32);
        source
            .discover(&job("machine learning engineer"), &tx)
            .await
            .unwrap();
        drop(tx);

        let mut count = 0;
        while let Some(record) = rx.recv().await {
            assert_eq!(record.source_id, LINKEDIN);
            assert!(record.synthetic);
            assert!(record.payload.get("profile_url").is_some());
            count += 1;
        }
        assert!(count >= 2, "expected multiple demo hits, got {count}");
    }

    #[tokio::test]
    async fn test_second_demo_discovery_served_from_cache() {
        let ctx = test_ctx(test_config("http://unused.invalid".to_string(), true));
        let source = LinkedInSource::new(ctx);
        let spec = job("machine learning engineer");

        let (tx, mut rx) = mpsc::channel(32);
        source.discover(&spec, &tx).await.unwrap();
        let mut first = Vec::new();
        while let Ok(r) = rx.try_recv() {
            first.push(r.payload);
        }

        let (tx, mut rx) = mpsc::channel(32);
        source.discover(&spec, &tx).await.unwrap();
        let mut second = Vec::new();
        while let Ok(r) = rx.try_recv() {
            second.push(r.payload);
        }
        assert_eq!(first, second);
    }

    async fn spawn_flaky_upstream() -> (SocketAddr, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let handler_hits = hits.clone();
        let app = axum::Router::new().route(
            "/search/profiles",
            get(move || {
                let hits = handler_hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        (
                            StatusCode::TOO_MANY_REQUESTS,
                            [(header::RETRY_AFTER, "1")],
                            Json(json!({"error": "slow down"})),
                        )
                            .into_response()
                    } else {
                        Json(json!({
                            "profiles": [{
                                "name": "Sarah Chen",
                                "headline": "Senior ML Engineer at Google",
                                "location": "Mountain View, CA",
                                "profile_url": "https://linkedin.com/in/sarah-chen-ml",
                                "skills": ["Python", "PyTorch"]
                            }]
                        }))
                        .into_response()
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, hits)
    }

    #[tokio::test]
    async fn test_upstream_429_waits_retry_after_then_succeeds() {
        let (addr, hits) = spawn_flaky_upstream().await;
        let ctx = test_ctx(test_config(format!("http://{addr}"), false));
        let source = LinkedInSource::new(ctx);

        let start = Instant::now();
        let (tx, mut rx) = mpsc::channel(32);
        source.discover(&job("ml engineer"), &tx).await.unwrap();
        drop(tx);

        assert!(
            start.elapsed() >= Duration::from_secs(1),
            "Retry-After was not honored"
        );
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        let record = rx.recv().await.expect("record after retry");
        assert!(!record.synthetic);
        assert_eq!(record.payload["name"], "Sarah Chen");
    }

    #[tokio::test]
    async fn test_unroutable_upstream_is_transport_error() {
        let mut config = test_config("http://127.0.0.1:1".to_string(), false);
        config.max_retries = 0;
        let source = LinkedInSource::new(test_ctx(config));
        let (tx, _rx) = mpsc::channel(32);
        let err = source.discover(&job("ml engineer"), &tx).await.unwrap_err();
        assert_eq!(err.reason(), "transport");
    }
}

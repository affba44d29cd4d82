//! Source adapters — one per provider, behind a uniform capability: given a
//! JobSpec, stream RawRecords into the orchestrator's channel.
//!
//! No adapter error escapes this boundary as a panic or fatal failure; the
//! orchestrator turns the returned `SourceError` into a `partial_failures`
//! entry and the job continues. Failure messages carry no URLs and no
//! credentials.

pub mod demo;
pub mod github;
pub mod linkedin;
pub mod twitter;
pub mod website;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::cache::{self, Cache};
use crate::config::SourceConfig;
use crate::limiter::RateLimiter;
use crate::models::candidate::RawRecord;
use crate::models::job::JobSpec;

pub const LINKEDIN: &str = "linkedin";
pub const GITHUB: &str = "github";
pub const TWITTER: &str = "twitter";
pub const WEBSITE: &str = "website";
pub const AI: &str = "ai";

#[cfg(test)]
pub(crate) const GLOBAL_TEST_PERMITS: usize = 20;

/// Terminal, per-source failure. The `reason()` string is what lands in
/// `partial_failures`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error")]
    Transport,

    #[error("still throttled after {retries} retries")]
    Throttled { retries: u32 },

    #[error("upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("credential rejected")]
    Credential,

    #[error("response body was not parseable")]
    Unparseable,

    #[error("source timed out")]
    Timeout,
}

impl SourceError {
    pub fn reason(&self) -> &'static str {
        match self {
            SourceError::Transport => "transport",
            SourceError::Throttled { .. } => "throttled",
            SourceError::Upstream { .. } => "upstream_5xx",
            SourceError::Credential => "credential",
            SourceError::Unparseable => "unparseable",
            SourceError::Timeout => "timeout",
        }
    }
}

/// Uniform adapter capability. Implementations stream each RawRecord as soon
/// as it is available so the orchestrator can normalize while other sources
/// are still fetching.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_id(&self) -> &'static str;
    fn enabled(&self) -> bool;
    async fn discover(
        &self,
        job: &JobSpec,
        records: &mpsc::Sender<RawRecord>,
    ) -> Result<(), SourceError>;
}

/// Everything an adapter needs to make a well-behaved external call:
/// cache consult, in-flight gating, rate-limit pacing, throttle retries.
pub struct SourceContext {
    pub source_id: &'static str,
    pub config: SourceConfig,
    pub limiter: Arc<RateLimiter>,
    pub cache: Arc<Cache>,
    pub http: reqwest::Client,
    in_flight: Arc<Semaphore>,
    global_in_flight: Arc<Semaphore>,
}

impl SourceContext {
    pub fn new(
        source_id: &'static str,
        config: SourceConfig,
        limiter: Arc<RateLimiter>,
        cache: Arc<Cache>,
        http: reqwest::Client,
        global_in_flight: Arc<Semaphore>,
    ) -> Self {
        Self {
            source_id,
            in_flight: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            config,
            limiter,
            cache,
            http,
            global_in_flight,
        }
    }

    /// Cache key for this source and a normalized query string.
    pub fn query_key(&self, query: &str) -> String {
        cache::source_query_key(self.source_id, &cache::fingerprint(query))
    }

    /// Returns previously cached records for `key`, original timestamps intact.
    pub async fn cached_records(&self, key: &str) -> Option<Vec<RawRecord>> {
        let value = self.cache.get(key).await?;
        match serde_json::from_value::<Vec<RawRecord>>(value) {
            Ok(records) => {
                debug!(source = self.source_id, key, "query served from cache");
                Some(records)
            }
            Err(_) => None,
        }
    }

    pub async fn store_records(&self, key: &str, records: &[RawRecord]) {
        if records.is_empty() {
            return;
        }
        if let Ok(value) = serde_json::to_value(records) {
            self.cache.put(key, value, None).await;
        }
    }

    /// One paced upstream GET with throttle handling. Retries 429s (honoring
    /// Retry-After via the limiter) and 5xx/transport hiccups up to
    /// `max_retries`; auth failures are terminal.
    pub async fn paced_get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, SourceError> {
        let mut attempt = 0u32;
        loop {
            let _global = self
                .global_in_flight
                .acquire()
                .await
                .map_err(|_| SourceError::Transport)?;
            let _slot = self
                .in_flight
                .acquire()
                .await
                .map_err(|_| SourceError::Transport)?;
            self.limiter.acquire(self.source_id).await;

            let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
            let mut request = self.http.get(&url).query(query);
            if let Some(credential) = &self.config.credential {
                request = request.bearer_auth(credential);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!(source = self.source_id, "transport failure: {}", redact(&e));
                    if attempt >= self.config.max_retries {
                        return Err(SourceError::Transport);
                    }
                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(250 * attempt as u64)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 {
                if attempt >= self.config.max_retries {
                    return Err(SourceError::Throttled { retries: attempt });
                }
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);
                attempt += 1;
                let delay = self
                    .limiter
                    .report_throttle(self.source_id, retry_after)
                    .await;
                warn!(
                    source = self.source_id,
                    attempt, "upstream throttled, retrying after {delay:?}"
                );
                // The suspension is honored inside the next acquire.
                continue;
            }
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(SourceError::Credential);
            }
            if status.is_server_error() {
                if attempt >= self.config.max_retries {
                    return Err(SourceError::Upstream {
                        status: status.as_u16(),
                    });
                }
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                continue;
            }
            if !status.is_success() {
                return Err(SourceError::Upstream {
                    status: status.as_u16(),
                });
            }

            return response
                .json::<serde_json::Value>()
                .await
                .map_err(|_| SourceError::Unparseable);
        }
    }

    /// Pacing for a simulated call in demo mode: same token cost as a live
    /// call, no network.
    pub async fn pace_demo_call(&self) {
        self.limiter.acquire(self.source_id).await;
    }

    /// Wraps a payload in a tagged RawRecord for this source.
    pub fn record(&self, payload: serde_json::Value, synthetic: bool) -> RawRecord {
        RawRecord {
            source_id: self.source_id.to_string(),
            fetched_at: Utc::now(),
            synthetic,
            payload,
        }
    }
}

/// Strips anything URL- or credential-shaped from transport errors before
/// they reach logs.
fn redact(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timeout".to_string()
    } else if e.is_connect() {
        "connect failed".to_string()
    } else {
        "request failed".to_string()
    }
}

/// Health status per source, surfaced by GET /health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Throttled,
    Unavailable,
}

/// Shared registry the orchestrator updates after each discovery pass.
#[derive(Default)]
pub struct HealthRegistry {
    statuses: DashMap<String, SourceStatus>,
}

impl HealthRegistry {
    pub fn set(&self, source_id: &str, status: SourceStatus) {
        self.statuses.insert(source_id.to_string(), status);
    }

    /// Current view across sources; a live throttle suspension overrides the
    /// last recorded fetch outcome.
    pub fn snapshot(&self, limiter: &RateLimiter) -> BTreeMap<String, SourceStatus> {
        let mut out = BTreeMap::new();
        for entry in self.statuses.iter() {
            let status = if limiter.throttled(entry.key()) {
                SourceStatus::Throttled
            } else {
                *entry.value()
            };
            out.insert(entry.key().clone(), status);
        }
        out
    }

    pub fn degraded(&self) -> bool {
        self.statuses
            .iter()
            .any(|e| *e.value() == SourceStatus::Unavailable)
    }
}

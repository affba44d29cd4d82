//! Advisory TTL cache shared by the fetchers and the scorer.
//!
//! Two backings: an in-process `DashMap` (default) and redis for deployments
//! that share a cache across replicas. Values are opaque JSON envelopes with
//! an embedded expiry timestamp; a miss is a silent event and callers fetch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Key for a cached source query: `src:<source_id>:q:<hash>`.
pub fn source_query_key(source_id: &str, fingerprint: &str) -> String {
    format!("src:{source_id}:q:{fingerprint}")
}

/// Key for a cached score: `score:<identity_key>:job:<hash>`.
pub fn score_key(identity_key: &str, job_fingerprint: &str) -> String {
    format!("score:{identity_key}:job:{job_fingerprint}")
}

/// Stable hex fingerprint over normalized query text.
pub fn fingerprint(input: &str) -> String {
    let normalized = input.to_lowercase();
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    let digest = Sha256::digest(normalized.as_bytes());
    hex_prefix(&digest, 16)
}

pub(crate) fn hex_prefix(bytes: &[u8], len: usize) -> String {
    let mut out = String::with_capacity(len);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
        if out.len() >= len {
            break;
        }
    }
    out.truncate(len);
    out
}

/// Serialized cache value with its own expiry stamp, so externally-backed
/// entries stay self-describing.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    expires_at: DateTime<Utc>,
    value: serde_json::Value,
}

struct MemoryEntry {
    envelope: Envelope,
    seq: u64,
}

/// In-process backing: lazy expiry plus capacity eviction (expired entries
/// first, then oldest-inserted).
struct MemoryCache {
    entries: DashMap<String, MemoryEntry>,
    capacity: usize,
    seq: AtomicU64,
}

impl MemoryCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            seq: AtomicU64::new(0),
        }
    }

    fn get(&self, key: &str) -> Option<serde_json::Value> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.envelope.expires_at > Utc::now() => {
                return Some(entry.envelope.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn put(&self, key: String, envelope: Envelope) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_one();
        }
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(key, MemoryEntry { envelope, seq });
    }

    fn evict_one(&self) {
        let now = Utc::now();
        let mut victim: Option<(String, u64)> = None;
        let mut expired: Option<String> = None;
        for entry in self.entries.iter() {
            if entry.envelope.expires_at <= now {
                expired = Some(entry.key().clone());
                break;
            }
            match &victim {
                Some((_, seq)) if *seq <= entry.seq => {}
                _ => victim = Some((entry.key().clone(), entry.seq)),
            }
        }
        if let Some(key) = expired.or(victim.map(|(k, _)| k)) {
            self.entries.remove(&key);
        }
    }

    fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

enum Backend {
    Memory(MemoryCache),
    External(redis::aio::ConnectionManager),
}

/// Process-wide cache component. Safe under concurrent use; operations on the
/// memory backing never suspend beyond map shard locks.
pub struct Cache {
    backend: Backend,
    default_ttl: Duration,
}

impl Cache {
    pub fn memory(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            backend: Backend::Memory(MemoryCache::new(capacity)),
            default_ttl,
        }
    }

    pub async fn external(redis_url: &str, default_ttl: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = redis::aio::ConnectionManager::new(client).await?;
        Ok(Self {
            backend: Backend::External(manager),
            default_ttl,
        })
    }

    /// Returns the cached value, or None on miss/expiry. Misses are silent;
    /// callers fetch.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        match &self.backend {
            Backend::Memory(memory) => memory.get(key),
            Backend::External(manager) => {
                let mut conn = manager.clone();
                let raw: Option<String> = redis::cmd("GET")
                    .arg(key)
                    .query_async(&mut conn)
                    .await
                    .unwrap_or_else(|e| {
                        warn!("cache read failed for {key}: {e}");
                        None
                    });
                let envelope: Envelope = serde_json::from_str(&raw?).ok()?;
                if envelope.expires_at <= Utc::now() {
                    return None;
                }
                Some(envelope.value)
            }
        }
    }

    pub async fn put(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let envelope = Envelope {
            expires_at: Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default(),
            value,
        };
        debug!("cache put {key} (ttl {ttl:?})");
        match &self.backend {
            Backend::Memory(memory) => memory.put(key.to_string(), envelope),
            Backend::External(manager) => {
                let mut conn = manager.clone();
                let serialized = match serde_json::to_string(&envelope) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!("cache serialize failed for {key}: {e}");
                        return;
                    }
                };
                let result: Result<(), redis::RedisError> = redis::cmd("SET")
                    .arg(key)
                    .arg(serialized)
                    .arg("EX")
                    .arg(ttl.as_secs().max(1))
                    .query_async(&mut conn)
                    .await;
                if let Err(e) = result {
                    warn!("cache write failed for {key}: {e}");
                }
            }
        }
    }

    pub async fn invalidate(&self, key: &str) {
        match &self.backend {
            Backend::Memory(memory) => memory.invalidate(key),
            Backend::External(manager) => {
                let mut conn = manager.clone();
                let result: Result<(), redis::RedisError> = redis::cmd("DEL")
                    .arg(key)
                    .query_async(&mut conn)
                    .await;
                if let Err(e) = result {
                    warn!("cache invalidate failed for {key}: {e}");
                }
            }
        }
    }
}

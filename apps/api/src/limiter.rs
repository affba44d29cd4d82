//! Rate limiter — token buckets with per-source and global pacing, plus
//! backoff on explicit upstream throttle signals.
//!
//! `acquire` never fails; it suspends until a token is available. Per-source
//! FIFO ordering comes from holding the bucket's fair async mutex across the
//! suspension: a second caller queued behind a first cannot be released ahead
//! of it.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Bucket id used for process-wide pacing alongside the per-source buckets.
pub const GLOBAL_SOURCE: &str = "global";

/// Backoff strategy applied when a source reports throttling without a
/// Retry-After value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Fixed,
    Linear,
    #[default]
    Exponential,
    Fibonacci,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketConfig {
    /// `max_requests` tokens per `window`.
    pub max_requests: u32,
    pub window: Duration,
    pub backoff: BackoffStrategy,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
            backoff: BackoffStrategy::Exponential,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

struct Bucket {
    config: BucketConfig,
    tokens: f64,
    last_refill: Instant,
    suspended_until: Option<Instant>,
    consecutive_failures: u32,
}

impl Bucket {
    fn new(config: BucketConfig) -> Self {
        Self {
            tokens: config.max_requests as f64,
            config,
            last_refill: Instant::now(),
            suspended_until: None,
            consecutive_failures: 0,
        }
    }

    /// Accrues tokens continuously at max_requests / window, capped at capacity.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        let rate = self.config.max_requests as f64 / self.config.window.as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(self.config.max_requests as f64);
        self.last_refill = now;
    }

    /// Minimal wait until one full token has accrued.
    fn wait_for_token(&self) -> Duration {
        let deficit = 1.0 - self.tokens;
        let per_token =
            self.config.window.as_secs_f64() / self.config.max_requests as f64;
        Duration::from_secs_f64(deficit.max(0.0) * per_token)
    }

    /// Backoff delay from the configured strategy, with ±12% jitter, clamped.
    fn backoff_delay(&self) -> Duration {
        let n = self.consecutive_failures.max(1);
        let multiplier = match self.config.backoff {
            BackoffStrategy::Fixed => 1.0,
            BackoffStrategy::Linear => n as f64,
            BackoffStrategy::Exponential => 2f64.powi(n.saturating_sub(1) as i32),
            BackoffStrategy::Fibonacci => fibonacci(n) as f64,
        };
        let jitter = rand::thread_rng().gen_range(0.88..=1.12);
        let raw = self.config.initial_backoff.as_secs_f64() * multiplier * jitter;
        Duration::from_secs_f64(raw.min(self.config.max_backoff.as_secs_f64()))
    }
}

fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (1u64, 1u64);
    for _ in 1..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}

/// Process-wide rate limiter. Shared across jobs; all synchronization is
/// internal.
pub struct RateLimiter {
    buckets: DashMap<String, Arc<Mutex<Bucket>>>,
    default_config: BucketConfig,
}

impl RateLimiter {
    pub fn new(default_config: BucketConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            default_config,
        }
    }

    /// Registers a source with its own pacing parameters. Sources that were
    /// never configured fall back to the default config on first acquire.
    pub fn configure(&self, source: &str, config: BucketConfig) {
        self.buckets
            .insert(source.to_string(), Arc::new(Mutex::new(Bucket::new(config))));
    }

    fn bucket(&self, source: &str) -> Arc<Mutex<Bucket>> {
        self.buckets
            .entry(source.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(Bucket::new(self.default_config.clone())))
            })
            .clone()
    }

    /// Blocks cooperatively until a token is available for `source`, then for
    /// the global bucket. Never fails.
    pub async fn acquire(&self, source: &str) {
        self.acquire_one(source).await;
        if source != GLOBAL_SOURCE {
            self.acquire_one(GLOBAL_SOURCE).await;
        }
    }

    async fn acquire_one(&self, source: &str) {
        let bucket = self.bucket(source);
        // The mutex is held across the sleeps: waiters behind us stay queued,
        // which is what gives per-source FIFO release order.
        let mut guard = bucket.lock().await;

        if let Some(until) = guard.suspended_until {
            let now = Instant::now();
            if until > now {
                debug!(source, "source suspended, waiting {:?}", until - now);
                tokio::time::sleep_until(until).await;
            }
            guard.suspended_until = None;
        }

        guard.refill();
        while guard.tokens < 1.0 {
            let wait = guard.wait_for_token();
            debug!(source, "rate limit reached, waiting {wait:?}");
            tokio::time::sleep(wait).await;
            guard.refill();
        }
        guard.tokens -= 1.0;
        // A successful acquisition without an intervening throttle report
        // walks the failure count back down.
        guard.consecutive_failures = guard.consecutive_failures.saturating_sub(1);
    }

    /// Records an explicit backpressure signal (e.g. HTTP 429). Future
    /// acquisitions against `source` are suspended for `retry_after` when the
    /// upstream prescribed one, otherwise for the strategy's backoff delay.
    /// Returns the applied suspension so callers can log it.
    pub async fn report_throttle(
        &self,
        source: &str,
        retry_after: Option<Duration>,
    ) -> Duration {
        let bucket = self.bucket(source);
        let mut guard = bucket.lock().await;
        guard.consecutive_failures += 1;
        let delay = retry_after.unwrap_or_else(|| guard.backoff_delay());
        guard.suspended_until = Some(Instant::now() + delay);
        warn!(
            source,
            failures = guard.consecutive_failures,
            "throttled, suspending acquisitions for {delay:?}"
        );
        delay
    }

    /// Whether `source` is currently under a throttle suspension. Feeds the
    /// health endpoint.
    pub fn throttled(&self, source: &str) -> bool {
        match self.buckets.get(source) {
            Some(bucket) => match bucket.try_lock() {
                Ok(guard) => guard
                    .suspended_until
                    .is_some_and(|until| until > Instant::now()),
                // Lock held means someone is waiting inside acquire; if that
                // wait is a suspension we still want to report it, but we
                // cannot observe it without blocking. Report not-throttled.
                Err(_) => false,
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        let limiter = RateLimiter::new(BucketConfig {
            max_requests: 1000,
            window: Duration::from_secs(1),
            ..BucketConfig::default()
        });
        limiter.configure(
            "src",
            BucketConfig {
                max_requests,
                window: Duration::from_secs(window_secs),
                ..BucketConfig::default()
            },
        );
        limiter
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_up_to_capacity_is_immediate() {
        let limiter = limiter(3, 60);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire("src").await;
        }
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_enforces_configured_rate() {
        // 2 req / 60s, 5 acquisitions: the 3 beyond capacity wait 30s each,
        // so total elapsed is >= 90s under pure enforcement.
        let limiter = limiter(2, 60);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire("src").await;
        }
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_secs(89),
            "expected >= ~90s pacing, got {elapsed:?}"
        );
        assert!(elapsed < Duration::from_secs(100), "got {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_conformance_after_burst() {
        // Once the initial bucket capacity is spent, releases are paced at
        // W/N and no window of length W sees more than N of them.
        let limiter = limiter(4, 8);
        let mut release_times = Vec::new();
        for _ in 0..12 {
            limiter.acquire("src").await;
            release_times.push(Instant::now());
        }
        let paced = &release_times[4..];
        for pair in paced.windows(2) {
            assert!(
                pair[1].duration_since(pair[0]) >= Duration::from_millis(1990),
                "paced releases closer than W/N"
            );
        }
        let window = Duration::from_secs(8);
        for (i, t) in paced.iter().enumerate() {
            let in_window = paced[i..]
                .iter()
                .take_while(|u| u.duration_since(*t) < window)
                .count();
            assert!(in_window <= 4, "{in_window} releases inside one window");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_suspends_exactly() {
        let limiter = limiter(10, 1);
        limiter.acquire("src").await;
        limiter
            .report_throttle("src", Some(Duration::from_secs(2)))
            .await;
        assert!(limiter.throttled("src"));
        let start = Instant::now();
        limiter.acquire("src").await;
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_secs(2) && elapsed < Duration::from_millis(2200),
            "expected ~2s suspension, got {elapsed:?}"
        );
        assert!(!limiter.throttled("src"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_backoff_grows_with_failures() {
        let limiter = limiter(10, 1);
        let first = limiter.report_throttle("src", None).await;
        let second = limiter.report_throttle("src", None).await;
        let third = limiter.report_throttle("src", None).await;
        // 1s/2s/4s bases with ±12% jitter: each step clears the previous band.
        assert!(first >= Duration::from_millis(880) && first <= Duration::from_millis(1120));
        assert!(second > first, "{second:?} !> {first:?}");
        assert!(third > second, "{third:?} !> {second:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_clamped_to_max() {
        let limiter = RateLimiter::new(BucketConfig::default());
        limiter.configure(
            "src",
            BucketConfig {
                max_requests: 10,
                window: Duration::from_secs(1),
                backoff: BackoffStrategy::Exponential,
                initial_backoff: Duration::from_secs(1),
                max_backoff: Duration::from_secs(5),
            },
        );
        for _ in 0..8 {
            let delay = limiter.report_throttle("src", None).await;
            assert!(delay <= Duration::from_secs(5), "got {delay:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifo_order_per_source() {
        let limiter = Arc::new(limiter(1, 10));
        // Drain the initial token so both tasks must wait.
        limiter.acquire("src").await;

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..3 {
            let limiter = limiter.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire("src").await;
                order.lock().await.push(i);
            }));
            // Let the task reach the mutex queue before spawning the next.
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().await, vec![0, 1, 2]);
    }

    #[test]
    fn test_fibonacci_sequence() {
        let values: Vec<u64> = (1..=7).map(fibonacci).collect();
        assert_eq!(values, vec![1, 1, 2, 3, 5, 8, 13]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_count_decrements_on_success() {
        let limiter = limiter(10, 1);
        limiter.report_throttle("src", Some(Duration::ZERO)).await;
        limiter.report_throttle("src", Some(Duration::ZERO)).await;
        // Two clean acquisitions walk the counter back to zero; the next
        // backoff starts from the first band again.
        limiter.acquire("src").await;
        limiter.acquire("src").await;
        let delay = limiter.report_throttle("src", None).await;
        assert!(
            delay <= Duration::from_millis(1120),
            "expected first-band backoff, got {delay:?}"
        );
    }
}

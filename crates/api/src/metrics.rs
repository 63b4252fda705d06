use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// How a request ended, as far as the counters care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    /// 200, but the model output had to be passed through as raw text.
    Degraded,
    RateLimited,
    QuotaExhausted,
    Failed,
}

#[derive(Default)]
struct EndpointTiming {
    requests: AtomicUsize,
    total_time_us: AtomicU64,
}

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    degraded_responses: AtomicUsize,
    rate_limited: AtomicUsize,
    quota_exhausted: AtomicUsize,

    // Timing (in microseconds), per endpoint
    endpoints: RwLock<BTreeMap<&'static str, Arc<EndpointTiming>>>,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            degraded_responses: AtomicUsize::new(0),
            rate_limited: AtomicUsize::new(0),
            quota_exhausted: AtomicUsize::new(0),
            endpoints: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn record(&self, endpoint: &'static str, outcome: RequestOutcome, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        match outcome {
            RequestOutcome::Success => {
                self.successful_requests.fetch_add(1, Ordering::Relaxed);
            }
            RequestOutcome::Degraded => {
                self.successful_requests.fetch_add(1, Ordering::Relaxed);
                self.degraded_responses.fetch_add(1, Ordering::Relaxed);
            }
            RequestOutcome::RateLimited => {
                self.failed_requests.fetch_add(1, Ordering::Relaxed);
                self.rate_limited.fetch_add(1, Ordering::Relaxed);
            }
            RequestOutcome::QuotaExhausted => {
                self.failed_requests.fetch_add(1, Ordering::Relaxed);
                self.quota_exhausted.fetch_add(1, Ordering::Relaxed);
            }
            RequestOutcome::Failed => {
                self.failed_requests.fetch_add(1, Ordering::Relaxed);
            }
        }

        let timing = self.timing(endpoint);
        timing.requests.fetch_add(1, Ordering::Relaxed);
        timing.total_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    fn timing(&self, endpoint: &'static str) -> Arc<EndpointTiming> {
        if let Some(timing) = self.endpoints.read().ok().and_then(|m| m.get(endpoint).cloned()) {
            return timing;
        }
        match self.endpoints.write() {
            Ok(mut map) => map.entry(endpoint).or_default().clone(),
            // Poisoned: count nothing rather than panic on the request path.
            Err(_) => Arc::new(EndpointTiming::default()),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let avg_latency_ms = self
            .endpoints
            .read()
            .map(|map| {
                map.iter()
                    .map(|(name, t)| {
                        let avg = avg_time_ms(&t.total_time_us, &t.requests);
                        (name.to_string(), avg)
                    })
                    .collect()
            })
            .unwrap_or_default();

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            degraded_responses: self.degraded_responses.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            quota_exhausted: self.quota_exhausted.load(Ordering::Relaxed),
            avg_latency_ms,
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    let cnt = count.load(Ordering::Relaxed) as f64;
    if cnt > 0.0 {
        total / cnt / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub degraded_responses: usize,
    pub rate_limited: usize,
    pub quota_exhausted: usize,
    pub avg_latency_ms: BTreeMap<String, f64>,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.record("recommend", RequestOutcome::Success, Duration::from_millis(10));
        metrics.record("recommend", RequestOutcome::Degraded, Duration::from_millis(30));
        metrics.record("channel-finder", RequestOutcome::RateLimited, Duration::from_millis(5));
        metrics.record("funding-scout", RequestOutcome::QuotaExhausted, Duration::from_millis(5));

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 4);
        assert_eq!(snap.successful_requests, 2);
        assert_eq!(snap.failed_requests, 2);
        assert_eq!(snap.degraded_responses, 1);
        assert_eq!(snap.rate_limited, 1);
        assert_eq!(snap.quota_exhausted, 1);
        assert!((snap.avg_latency_ms["recommend"] - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = Metrics::new().snapshot();
        assert_eq!(snap.total_requests, 0);
        assert!(snap.avg_latency_ms.is_empty());
    }
}

//! Decompression statistics tracking.
//!
//! Tracks request outcomes, decode latencies, byte volumes, and a per-token
//! request breakdown.
//!
//! Counters live in a snapshot that [`DecompressionStats::reset`] replaces
//! wholesale. A request is counted and resolved against the snapshot it
//! started in, so `successful + failed == total` holds for every snapshot
//! once its requests have completed.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Number of recent decode latencies kept for percentile calculation
const LATENCY_WINDOW: usize = 1000;

/// One generation of counters
#[derive(Debug)]
struct Counters {
    /// Requests that carried a Content-Encoding header
    requests: AtomicU64,
    /// Requests decoded and forwarded
    successes: AtomicU64,
    /// Requests rejected
    failures: AtomicU64,
    /// Total compressed bytes read from successful requests
    bytes_in: AtomicU64,
    /// Total decoded bytes forwarded
    bytes_out: AtomicU64,
    /// Cumulative decode time in nanoseconds
    decode_nanos: AtomicU64,
    /// Requests seen per lower-cased encoding token
    by_encoding: RwLock<HashMap<String, AtomicU64>>,
    /// Recent decode latencies
    latencies: RwLock<Vec<Duration>>,
    /// Start of this generation
    started_at: Instant,
}

impl Counters {
    fn new(by_encoding: HashMap<String, AtomicU64>) -> Self {
        Self {
            requests: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            bytes_in: AtomicU64::new(0),
            bytes_out: AtomicU64::new(0),
            decode_nanos: AtomicU64::new(0),
            by_encoding: RwLock::new(by_encoding),
            latencies: RwLock::new(Vec::new()),
            started_at: Instant::now(),
        }
    }

    fn total_decode_time(&self) -> Duration {
        Duration::from_nanos(self.decode_nanos.load(Ordering::Relaxed))
    }

    fn mean_decode_latency(&self) -> Option<Duration> {
        let successes = self.successes.load(Ordering::Relaxed);
        if successes == 0 {
            return None;
        }
        Some(Duration::from_nanos(
            self.decode_nanos.load(Ordering::Relaxed) / successes,
        ))
    }

    fn expansion_ratio(&self) -> f64 {
        let bytes_in = self.bytes_in.load(Ordering::Relaxed);
        if bytes_in == 0 {
            1.0
        } else {
            self.bytes_out.load(Ordering::Relaxed) as f64 / bytes_in as f64
        }
    }

    fn percentile_latency(&self, percentile: usize) -> Option<Duration> {
        let mut sorted = self.latencies.read().ok()?.clone();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort();

        let idx = (sorted.len() * percentile / 100).min(sorted.len() - 1);
        Some(sorted[idx])
    }

    fn requests_by_encoding(&self) -> BTreeMap<String, u64> {
        self.by_encoding
            .read()
            .map(|by_encoding| {
                by_encoding
                    .iter()
                    .map(|(token, count)| (token.clone(), count.load(Ordering::Relaxed)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Zeroed successor that keeps every token seen so far
    fn successor(&self) -> Self {
        let tokens = self
            .by_encoding
            .read()
            .map(|by_encoding| {
                by_encoding
                    .keys()
                    .map(|token| (token.clone(), AtomicU64::new(0)))
                    .collect()
            })
            .unwrap_or_default();

        Self::new(tokens)
    }
}

/// Thread-safe decompression statistics
#[derive(Debug)]
pub struct DecompressionStats {
    current: RwLock<Arc<Counters>>,
}

impl Default for DecompressionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A counted request whose outcome is still pending.
///
/// Resolve it with [`RequestRecord::success`] or [`RequestRecord::failure`].
#[derive(Debug)]
#[must_use = "a counted request must record its outcome"]
pub struct RequestRecord {
    counters: Arc<Counters>,
}

impl RequestRecord {
    /// Record a successful decode
    pub fn success(self, bytes_in: usize, bytes_out: usize, latency: Duration) {
        let counters = &self.counters;
        counters.successes.fetch_add(1, Ordering::Relaxed);
        counters
            .bytes_in
            .fetch_add(bytes_in as u64, Ordering::Relaxed);
        counters
            .bytes_out
            .fetch_add(bytes_out as u64, Ordering::Relaxed);
        counters
            .decode_nanos
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);

        if let Ok(mut latencies) = counters.latencies.write() {
            latencies.push(latency);
            if latencies.len() > LATENCY_WINDOW {
                latencies.remove(0);
            }
        }
    }

    /// Record a rejected request
    pub fn failure(self) {
        self.counters.failures.fetch_add(1, Ordering::Relaxed);
    }
}

impl DecompressionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Counters::new(HashMap::new()))),
        }
    }

    fn snapshot(&self) -> Arc<Counters> {
        match self.current.read() {
            Ok(current) => Arc::clone(&current),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Record a request carrying `token` as its Content-Encoding.
    ///
    /// The token entry is created on first sight and never removed.
    pub fn record_request(&self, token: &str) -> RequestRecord {
        let counters = self.snapshot();
        counters.requests.fetch_add(1, Ordering::Relaxed);

        let counted = counters
            .by_encoding
            .read()
            .ok()
            .and_then(|by_encoding| {
                by_encoding
                    .get(token)
                    .map(|count| count.fetch_add(1, Ordering::Relaxed))
            })
            .is_some();

        if !counted {
            if let Ok(mut by_encoding) = counters.by_encoding.write() {
                by_encoding
                    .entry(token.to_string())
                    .or_default()
                    .fetch_add(1, Ordering::Relaxed);
            }
        }

        RequestRecord { counters }
    }

    /// Get total requests
    pub fn total_requests(&self) -> u64 {
        self.snapshot().requests.load(Ordering::Relaxed)
    }

    /// Get successful decodes
    pub fn successful_requests(&self) -> u64 {
        self.snapshot().successes.load(Ordering::Relaxed)
    }

    /// Get rejected requests
    pub fn failed_requests(&self) -> u64 {
        self.snapshot().failures.load(Ordering::Relaxed)
    }

    /// Get total compressed bytes in
    pub fn total_bytes_in(&self) -> u64 {
        self.snapshot().bytes_in.load(Ordering::Relaxed)
    }

    /// Get total decoded bytes out
    pub fn total_bytes_out(&self) -> u64 {
        self.snapshot().bytes_out.load(Ordering::Relaxed)
    }

    /// Get cumulative decode time
    pub fn total_decode_time(&self) -> Duration {
        self.snapshot().total_decode_time()
    }

    /// Get request count for one token
    pub fn requests_for(&self, token: &str) -> u64 {
        self.snapshot()
            .by_encoding
            .read()
            .ok()
            .and_then(|by_encoding| {
                by_encoding
                    .get(token)
                    .map(|count| count.load(Ordering::Relaxed))
            })
            .unwrap_or(0)
    }

    /// Get request counts for every token seen so far
    pub fn requests_by_encoding(&self) -> BTreeMap<String, u64> {
        self.snapshot().requests_by_encoding()
    }

    /// Get decoded/compressed size ratio (1.0 when nothing was decoded)
    pub fn expansion_ratio(&self) -> f64 {
        self.snapshot().expansion_ratio()
    }

    /// Get mean decode latency
    pub fn mean_decode_latency(&self) -> Option<Duration> {
        self.snapshot().mean_decode_latency()
    }

    /// Get p50 latency
    pub fn p50_latency(&self) -> Option<Duration> {
        self.snapshot().percentile_latency(50)
    }

    /// Get p95 latency
    pub fn p95_latency(&self) -> Option<Duration> {
        self.snapshot().percentile_latency(95)
    }

    /// Get p99 latency
    pub fn p99_latency(&self) -> Option<Duration> {
        self.snapshot().percentile_latency(99)
    }

    /// Get uptime
    pub fn uptime(&self) -> Duration {
        self.snapshot().started_at.elapsed()
    }

    /// Get summary as JSON-compatible struct.
    ///
    /// All fields come from the same generation.
    pub fn summary(&self) -> StatsSummary {
        let counters = self.snapshot();
        let as_ms = |d: Duration| d.as_secs_f64() * 1000.0;

        StatsSummary {
            total_requests: counters.requests.load(Ordering::Relaxed),
            successful_requests: counters.successes.load(Ordering::Relaxed),
            failed_requests: counters.failures.load(Ordering::Relaxed),
            requests_by_encoding: counters.requests_by_encoding(),
            bytes_in: counters.bytes_in.load(Ordering::Relaxed),
            bytes_out: counters.bytes_out.load(Ordering::Relaxed),
            expansion_ratio: counters.expansion_ratio(),
            total_decode_ms: as_ms(counters.total_decode_time()),
            mean_decode_ms: counters.mean_decode_latency().map(as_ms),
            p50_decode_ms: counters.percentile_latency(50).map(as_ms),
            p95_decode_ms: counters.percentile_latency(95).map(as_ms),
            p99_decode_ms: counters.percentile_latency(99).map(as_ms),
            uptime_secs: counters.started_at.elapsed().as_secs(),
        }
    }

    /// Start a fresh generation of statistics.
    ///
    /// Per-token entries carry over with a zero count. Requests counted
    /// before the reset record their outcome in the retired generation.
    pub fn reset(&self) {
        let mut current = match self.current.write() {
            Ok(current) => current,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = Arc::new(current.successor());
    }
}

/// Statistics summary for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    /// Requests that carried a Content-Encoding header.
    pub total_requests: u64,
    /// Requests decoded and forwarded.
    pub successful_requests: u64,
    /// Requests rejected with 400.
    pub failed_requests: u64,
    /// Requests per lower-cased encoding token.
    pub requests_by_encoding: BTreeMap<String, u64>,
    /// Compressed bytes read from successful requests.
    pub bytes_in: u64,
    /// Decoded bytes forwarded.
    pub bytes_out: u64,
    /// Decoded size over compressed size.
    pub expansion_ratio: f64,
    /// Cumulative decode time in milliseconds.
    pub total_decode_ms: f64,
    /// Mean decode time in milliseconds.
    pub mean_decode_ms: Option<f64>,
    /// 50th percentile decode time in milliseconds.
    pub p50_decode_ms: Option<f64>,
    /// 95th percentile decode time in milliseconds.
    pub p95_decode_ms: Option<f64>,
    /// 99th percentile decode time in milliseconds.
    pub p99_decode_ms: Option<f64>,
    /// Seconds since the tracker was created or reset.
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(stats: &DecompressionStats, bytes_in: usize, bytes_out: usize, latency: Duration) {
        stats
            .record_request("gzip")
            .success(bytes_in, bytes_out, latency);
    }

    #[test]
    fn test_stats_recording() {
        let stats = DecompressionStats::new();

        stats
            .record_request("gzip")
            .success(300, 1000, Duration::from_millis(2));
        stats.record_request("gzip").failure();
        stats.record_request("deflate").failure();

        assert_eq!(stats.total_requests(), 3);
        assert_eq!(stats.successful_requests(), 1);
        assert_eq!(stats.failed_requests(), 2);
        assert_eq!(stats.requests_for("gzip"), 2);
        assert_eq!(stats.requests_for("deflate"), 1);
        assert_eq!(stats.requests_for("zstd"), 0);
        assert_eq!(stats.total_bytes_in(), 300);
        assert_eq!(stats.total_bytes_out(), 1000);
    }

    #[test]
    fn test_expansion_ratio() {
        let stats = DecompressionStats::new();
        assert!((stats.expansion_ratio() - 1.0).abs() < f64::EPSILON);

        decoded(&stats, 250, 1000, Duration::from_millis(1));
        assert!((stats.expansion_ratio() - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_latency_percentiles() {
        let stats = DecompressionStats::new();

        for i in 1..=100 {
            decoded(&stats, 10, 20, Duration::from_millis(i));
        }

        let p50 = stats.p50_latency().unwrap();
        let p95 = stats.p95_latency().unwrap();
        let p99 = stats.p99_latency().unwrap();

        assert!(p50.as_millis() >= 49 && p50.as_millis() <= 51);
        assert!(p95.as_millis() >= 94 && p95.as_millis() <= 96);
        assert!(p99.as_millis() >= 98 && p99.as_millis() <= 100);
        assert_eq!(stats.total_decode_time(), Duration::from_millis(5050));
        assert_eq!(stats.mean_decode_latency(), Some(Duration::from_micros(50_500)));
    }

    #[test]
    fn test_mean_latency_with_large_success_count() {
        let stats = DecompressionStats::new();
        {
            let counters = stats.snapshot();
            counters.successes.store(1 << 32, Ordering::Relaxed);
            counters
                .decode_nanos
                .store(3 * (1 << 32), Ordering::Relaxed);
        }

        assert_eq!(stats.mean_decode_latency(), Some(Duration::from_nanos(3)));
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let stats = DecompressionStats::new();
        for _ in 0..(LATENCY_WINDOW + 10) {
            decoded(&stats, 1, 1, Duration::from_micros(5));
        }

        assert_eq!(
            stats.snapshot().latencies.read().unwrap().len(),
            LATENCY_WINDOW
        );
        assert_eq!(stats.successful_requests(), (LATENCY_WINDOW + 10) as u64);
    }

    #[test]
    fn test_concurrent_first_sight() {
        let stats = Arc::new(DecompressionStats::new());
        let tokens: Vec<String> = (0..8).map(|i| format!("enc-{i}")).collect();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let stats = Arc::clone(&stats);
                let tokens = tokens.clone();
                std::thread::spawn(move || {
                    for token in &tokens {
                        stats.record_request(token).failure();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let by_encoding = stats.requests_by_encoding();
        assert_eq!(by_encoding.len(), tokens.len());
        assert!(by_encoding.values().all(|&count| count == 16));
        assert_eq!(stats.total_requests(), 16 * 8);
    }

    #[test]
    fn test_reset() {
        let stats = DecompressionStats::new();
        decoded(&stats, 1, 2, Duration::from_millis(1));
        stats.record_request("zstd").failure();

        stats.reset();

        let summary = stats.summary();
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.successful_requests, 0);
        assert_eq!(summary.failed_requests, 0);
        assert_eq!(summary.requests_by_encoding.get("zstd"), Some(&0));
        assert!(summary.p50_decode_ms.is_none());
    }

    #[test]
    fn test_reset_while_request_in_flight() {
        let stats = DecompressionStats::new();

        let failing = stats.record_request("gzip");
        let succeeding = stats.record_request("zstd");
        stats.reset();
        failing.failure();
        succeeding.success(10, 20, Duration::from_millis(1));

        assert_eq!(stats.total_requests(), 0);
        assert_eq!(stats.successful_requests(), 0);
        assert_eq!(stats.failed_requests(), 0);
        assert_eq!(stats.total_bytes_out(), 0);

        stats.record_request("gzip").failure();
        assert_eq!(
            stats.successful_requests() + stats.failed_requests(),
            stats.total_requests()
        );
    }
}

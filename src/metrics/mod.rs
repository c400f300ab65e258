//! In-process metrics for the anchoring pipeline
//!
//! Counters, gauges and latency histograms, exported as JSON or the
//! Prometheus text format.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Metrics registry shared by the pipeline and the HTTP layer
pub struct MetricsRegistry {
    counters: RwLock<BTreeMap<String, Arc<AtomicU64>>>,
    gauges: RwLock<BTreeMap<String, Arc<AtomicU64>>>,
    histograms: RwLock<BTreeMap<String, Arc<Histogram>>>,
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            gauges: RwLock::new(BTreeMap::new()),
            histograms: RwLock::new(BTreeMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub async fn inc_counter(&self, name: &str) {
        self.add_counter(name, 1).await;
    }

    /// Add to a counter
    pub async fn add_counter(&self, name: &str, value: u64) {
        let counters = self.counters.read().await;
        if let Some(counter) = counters.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }
        drop(counters);

        let mut counters = self.counters.write().await;
        counters
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .fetch_add(value, Ordering::Relaxed);
    }

    /// Get a counter value
    pub async fn get_counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .await
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    async fn gauge(&self, name: &str) -> Arc<AtomicU64> {
        if let Some(gauge) = self.gauges.read().await.get(name) {
            return gauge.clone();
        }
        self.gauges
            .write()
            .await
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone()
    }

    /// Adjust a gauge up or down
    pub async fn adjust_gauge(&self, name: &str, delta: i64) {
        let gauge = self.gauge(name).await;
        if delta >= 0 {
            gauge.fetch_add(delta as u64, Ordering::Relaxed);
        } else {
            saturating_dec(&gauge, delta.unsigned_abs());
        }
    }

    /// Increment a gauge until the returned guard is dropped
    pub async fn track_gauge(&self, name: &str) -> GaugeGuard {
        let gauge = self.gauge(name).await;
        gauge.fetch_add(1, Ordering::Relaxed);
        GaugeGuard(gauge)
    }

    /// Get a gauge value
    pub async fn get_gauge(&self, name: &str) -> u64 {
        self.gauges
            .read()
            .await
            .get(name)
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Record a histogram observation (seconds)
    pub async fn observe_histogram(&self, name: &str, value: f64) {
        let histograms = self.histograms.read().await;
        if let Some(histogram) = histograms.get(name) {
            histogram.observe(value);
            return;
        }
        drop(histograms);

        let mut histograms = self.histograms.write().await;
        histograms
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::default()))
            .observe(value);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// All metrics as JSON
    pub async fn to_json(&self) -> serde_json::Value {
        let counters: BTreeMap<String, u64> = self
            .counters
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();
        let gauges: BTreeMap<String, u64> = self
            .gauges
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();
        let histograms: BTreeMap<String, serde_json::Value> = self
            .histograms
            .read()
            .await
            .iter()
            .map(|(k, h)| (k.clone(), h.to_json()))
            .collect();

        serde_json::json!({
            "uptime_seconds": self.uptime_seconds(),
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }

    /// Export metrics in Prometheus text format
    pub async fn to_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP panel_anchor_uptime_seconds Time since service start\n");
        output.push_str("# TYPE panel_anchor_uptime_seconds gauge\n");
        output.push_str(&format!(
            "panel_anchor_uptime_seconds {}\n\n",
            self.uptime_seconds()
        ));

        for (name, counter) in self.counters.read().await.iter() {
            let prom = prometheus_name(name);
            output.push_str(&format!("# TYPE {} counter\n", prom));
            output.push_str(&format!("{} {}\n", prom, counter.load(Ordering::Relaxed)));
        }

        for (name, gauge) in self.gauges.read().await.iter() {
            let prom = prometheus_name(name);
            output.push_str(&format!("# TYPE {} gauge\n", prom));
            output.push_str(&format!("{} {}\n", prom, gauge.load(Ordering::Relaxed)));
        }

        for (name, histogram) in self.histograms.read().await.iter() {
            output.push_str(&histogram.to_prometheus(name));
        }

        output
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements its gauge on drop, including when the owning future is cancelled
pub struct GaugeGuard(Arc<AtomicU64>);

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        saturating_dec(&self.0, 1);
    }
}

fn saturating_dec(gauge: &AtomicU64, by: u64) {
    let _ = gauge.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_sub(by))
    });
}

fn prometheus_name(name: &str) -> String {
    name.replace(['.', '-'], "_")
}

/// Fixed-bucket histogram
pub struct Histogram {
    buckets: Vec<f64>,
    counts: Vec<AtomicU64>,
    /// Sum of observations in milliseconds
    sum_ms: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new(buckets: Vec<f64>) -> Self {
        let counts = buckets.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            buckets,
            counts,
            sum_ms: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, value: f64) {
        self.sum_ms
            .fetch_add((value * 1000.0) as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        if let Some(i) = self.buckets.iter().position(|b| value <= *b) {
            self.counts[i].fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let counts: Vec<u64> = self
            .counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect();
        serde_json::json!({
            "buckets": self.buckets,
            "counts": counts,
            "sum": self.sum_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            "count": self.count(),
        })
    }

    pub fn to_prometheus(&self, name: &str) -> String {
        let prom = prometheus_name(name);
        let mut output = format!("# TYPE {} histogram\n", prom);

        let mut cumulative = 0u64;
        for (bucket, count) in self.buckets.iter().zip(&self.counts) {
            cumulative += count.load(Ordering::Relaxed);
            output.push_str(&format!(
                "{}_bucket{{le=\"{}\"}} {}\n",
                prom, bucket, cumulative
            ));
        }
        output.push_str(&format!("{}_bucket{{le=\"+Inf\"}} {}\n", prom, self.count()));
        output.push_str(&format!(
            "{}_sum {}\n",
            prom,
            self.sum_ms.load(Ordering::Relaxed) as f64 / 1000.0
        ));
        output.push_str(&format!("{}_count {}\n", prom, self.count()));
        output
    }
}

impl Default for Histogram {
    fn default() -> Self {
        // Anchoring latency is dominated by block time, so buckets reach minutes
        Self::new(vec![
            0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 180.0,
        ])
    }
}

/// Predefined metric names
pub mod metric_names {
    pub const ANCHOR_REQUESTS: &str = "anchor.requests";
    pub const VALIDATION_REJECTED: &str = "anchor.validation.rejected";
    pub const INPUT_REJECTED: &str = "anchor.input.rejected";
    pub const TX_SUBMITTED: &str = "anchor.tx.submitted";
    pub const TX_CONFIRMED: &str = "anchor.tx.confirmed";
    pub const TX_FAILED: &str = "anchor.tx.failed";
    pub const TX_TIMEOUT: &str = "anchor.tx.confirmation_timeout";

    pub const IN_FLIGHT: &str = "anchor.in_flight";

    pub const ANCHOR_LATENCY: &str = "anchor.latency_seconds";
    pub const CONFIRMATION_LATENCY: &str = "anchor.confirmation.latency_seconds";
}

/// Time an async operation into a histogram
pub async fn timed<F, T>(metrics: &MetricsRegistry, metric_name: &str, f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let result = f.await;
    metrics
        .observe_histogram(metric_name, start.elapsed().as_secs_f64())
        .await;
    result
}

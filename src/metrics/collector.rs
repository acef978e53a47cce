// src/metrics/collector.rs
use crate::health::{NormalizedStatus, StatusDetail};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Encode all metrics in the prometheus text format.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // API metrics
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,

    // Probe metrics
    pub probes_total: IntCounterVec,
    pub probe_duration_seconds: HistogramVec,
    pub probe_failures_total: IntCounterVec,

    pub registered_services: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("dashboard_requests_total", "Total number of API requests"),
            &["route", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dashboard_request_duration_seconds",
                "API request duration in seconds",
            ),
            &["route"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let probes_total = IntCounterVec::new(
            Opts::new("dashboard_probes_total", "Health probes by normalized status"),
            &["service", "status"],
        )?;
        registry.register(Box::new(probes_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "dashboard_probe_duration_seconds",
                "Health probe duration in seconds",
            ),
            &["service"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let probe_failures_total = IntCounterVec::new(
            Opts::new(
                "dashboard_probe_failures_total",
                "Probes that ended without an upstream reply",
            ),
            &["service", "kind"],
        )?;
        registry.register(Box::new(probe_failures_total.clone()))?;

        let registered_services =
            IntGauge::new("dashboard_registered_services", "Number of registered services")?;
        registry.register(Box::new(registered_services.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            probes_total,
            probe_duration_seconds,
            probe_failures_total,
            registered_services,
        })
    }

    pub fn record_request(&self, route: &str, status_code: u16, duration: Duration) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[route, &status])
            .inc();

        self.request_duration_seconds
            .with_label_values(&[route])
            .observe(duration.as_secs_f64());
    }

    pub fn record_probe(&self, service: &str, result: &NormalizedStatus, duration: Duration) {
        self.probes_total
            .with_label_values(&[service, result.status.as_str()])
            .inc();

        self.probe_duration_seconds
            .with_label_values(&[service])
            .observe(duration.as_secs_f64());

        let kind = match result.detail {
            StatusDetail::ConnectionError { .. } => "connection",
            StatusDetail::Timeout => "timeout",
            StatusDetail::Internal { .. } => "internal",
            _ => return,
        };
        self.probe_failures_total
            .with_label_values(&[service, kind])
            .inc();
    }

    pub fn set_registered_services(&self, count: usize) {
        self.registered_services.set(count as i64);
    }
}

// src/health/checker.rs
use super::normalizer::normalize;
use super::status::{NormalizedStatus, StatusDetail};
use crate::error::ApiError;
use crate::metrics::MetricsCollector;
use crate::probe::ProbeExecutor;
use crate::registry::ServiceRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Answers `GET /api/health/{key}`: one probe, one normalized record.
///
/// Holds no per-request state, so concurrent checks never interact.
pub struct HealthChecker {
    registry: Arc<ServiceRegistry>,
    executor: ProbeExecutor,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthChecker {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        executor: ProbeExecutor,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            registry,
            executor,
            metrics,
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub async fn check(&self, key: &str) -> Result<NormalizedStatus, ApiError> {
        let descriptor = self
            .registry
            .lookup(key)
            .ok_or_else(|| ApiError::ServiceNotFound(key.to_string()))?;

        if descriptor.always_up {
            debug!(service = %key, "Probe skipped, service is always reported UP");
            return Ok(NormalizedStatus::skipped());
        }

        let start = Instant::now();
        let result = match self.executor.probe(descriptor).await {
            Ok(outcome) => normalize(descriptor, &outcome),
            Err(e) => {
                error!(service = %key, error = %e, "Health check could not be performed");
                NormalizedStatus::internal(e.to_string())
            }
        };
        let elapsed = start.elapsed();

        match &result.detail {
            StatusDetail::ConnectionError { message } => {
                warn!(service = %key, error = %message, "Service unreachable");
            }
            StatusDetail::Timeout => {
                warn!(
                    service = %key,
                    timeout = ?self.executor.timeout(),
                    "Health check timed out"
                );
            }
            _ => {
                debug!(
                    service = %key,
                    status = result.status.as_str(),
                    elapsed = ?elapsed,
                    "Health check complete"
                );
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_probe(key, &result, elapsed);
        }

        Ok(result)
    }
}

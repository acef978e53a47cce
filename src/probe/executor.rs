// src/probe/executor.rs
use super::transport::{Transport, TransportError};
use crate::registry::ServiceDescriptor;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::debug;
use url::Url;

/// Terminal result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The upstream answered. 4xx/5xx land here too.
    Completed { status: u16, body: String },
    /// No status line was received.
    ConnectionError { message: String },
    Timeout,
}

/// Configuration problems found while preparing a probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
}

pub struct ProbeExecutor {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl ProbeExecutor {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one GET to the descriptor's URL, bounded by the configured timeout.
    ///
    /// On expiry the in-flight request future is dropped, which aborts the
    /// underlying connection.
    pub async fn probe(&self, descriptor: &ServiceDescriptor) -> Result<ProbeOutcome, ProbeError> {
        let url = Url::parse(&descriptor.url).map_err(|source| ProbeError::InvalidUrl {
            url: descriptor.url.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ProbeError::UnsupportedScheme(other.to_string())),
        }

        debug!(service = %descriptor.key, %url, "Probing service");

        let outcome = match timeout(self.timeout, self.transport.get(&url)).await {
            Ok(Ok(response)) => ProbeOutcome::Completed {
                status: response.status,
                body: response.body,
            },
            Ok(Err(TransportError::Connection(message))) => ProbeOutcome::ConnectionError { message },
            Ok(Err(TransportError::Timeout)) | Err(_) => ProbeOutcome::Timeout,
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::RawResponse;
    use crate::registry::CheckProtocol;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct InFlight(Arc<AtomicUsize>);

    impl InFlight {
        fn enter(counter: Arc<AtomicUsize>) -> Self {
            counter.fetch_add(1, Ordering::SeqCst);
            Self(counter)
        }
    }

    impl Drop for InFlight {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct StubTransport {
        calls: AtomicUsize,
        in_flight: Arc<AtomicUsize>,
        delay: Option<Duration>,
        reply: Option<Result<RawResponse, TransportError>>,
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get(&self, _url: &Url) -> Result<RawResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _guard = InFlight::enter(self.in_flight.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone().unwrap_or(Ok(RawResponse {
                status: 200,
                body: String::new(),
            }))
        }
    }

    fn descriptor(url: &str) -> ServiceDescriptor {
        ServiceDescriptor::new("svc", "Service", url, CheckProtocol::Http)
    }

    #[tokio::test]
    async fn error_status_is_still_a_completed_probe() {
        let transport = Arc::new(StubTransport {
            reply: Some(Ok(RawResponse {
                status: 503,
                body: "maintenance".into(),
            })),
            ..Default::default()
        });
        let executor = ProbeExecutor::new(transport.clone(), Duration::from_secs(5));

        let outcome = executor.probe(&descriptor("http://svc:80/health")).await.unwrap();

        assert_eq!(
            outcome,
            ProbeOutcome::Completed {
                status: 503,
                body: "maintenance".into()
            }
        );
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connection_failure_is_classified() {
        let transport = Arc::new(StubTransport {
            reply: Some(Err(TransportError::Connection("connection refused".into()))),
            ..Default::default()
        });
        let executor = ProbeExecutor::new(transport, Duration::from_secs(5));

        let outcome = executor.probe(&descriptor("http://svc:80")).await.unwrap();

        assert_eq!(
            outcome,
            ProbeOutcome::ConnectionError {
                message: "connection refused".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_upstream_times_out_and_is_aborted() {
        let transport = Arc::new(StubTransport {
            delay: Some(Duration::from_secs(60)),
            ..Default::default()
        });
        let executor = ProbeExecutor::new(transport.clone(), Duration::from_millis(5000));

        let outcome = executor.probe(&descriptor("http://svc:80")).await.unwrap();

        assert_eq!(outcome, ProbeOutcome::Timeout);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reply_just_inside_the_deadline_completes() {
        let transport = Arc::new(StubTransport {
            delay: Some(Duration::from_millis(4900)),
            ..Default::default()
        });
        let executor = ProbeExecutor::new(transport, Duration::from_millis(5000));

        let outcome = executor.probe(&descriptor("http://svc:80")).await.unwrap();

        assert!(matches!(outcome, ProbeOutcome::Completed { status: 200, .. }));
    }

    #[tokio::test]
    async fn malformed_url_fails_before_any_call() {
        let transport = Arc::new(StubTransport::default());
        let executor = ProbeExecutor::new(transport.clone(), Duration::from_secs(5));

        let result = executor.probe(&descriptor("not a url")).await;

        assert!(matches!(result, Err(ProbeError::InvalidUrl { .. })));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_http_scheme_is_rejected() {
        let transport = Arc::new(StubTransport::default());
        let executor = ProbeExecutor::new(transport.clone(), Duration::from_secs(5));

        let result = executor.probe(&descriptor("ftp://files.local/health")).await;

        assert!(matches!(result, Err(ProbeError::UnsupportedScheme(scheme)) if scheme == "ftp"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}

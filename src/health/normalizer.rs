// src/health/normalizer.rs
use super::status::{HealthState, NormalizedStatus, StatusDetail};
use crate::probe::ProbeOutcome;
use crate::registry::{CheckProtocol, ServiceDescriptor};
use serde_json::Value;

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Turn a raw probe outcome into the dashboard's uniform status record.
///
/// Pure: no I/O, same inputs always give the same record.
pub fn normalize(descriptor: &ServiceDescriptor, outcome: &ProbeOutcome) -> NormalizedStatus {
    let (status, body) = match outcome {
        ProbeOutcome::Completed { status, body } => (*status, body.as_str()),
        ProbeOutcome::ConnectionError { message } => {
            return NormalizedStatus::new(
                HealthState::Down,
                StatusDetail::ConnectionError {
                    message: message.clone(),
                },
            );
        }
        ProbeOutcome::Timeout => return NormalizedStatus::new(HealthState::Down, StatusDetail::Timeout),
    };

    match &descriptor.check {
        CheckProtocol::Http => normalize_http(status),
        CheckProtocol::Text { expected_text } => normalize_text(body, expected_text),
        CheckProtocol::Actuator { component } => normalize_actuator(status, body, component.as_deref()),
    }
}

fn normalize_http(status: u16) -> NormalizedStatus {
    NormalizedStatus::new(
        HealthState::from_success(is_success(status)),
        StatusDetail::Http { http_status: status },
    )
}

fn normalize_text(body: &str, expected: &str) -> NormalizedStatus {
    let trimmed = body.trim();
    NormalizedStatus::new(
        HealthState::from_success(trimmed == expected),
        StatusDetail::Text {
            response: trimmed.to_string(),
        },
    )
}

fn normalize_actuator(status: u16, body: &str, component: Option<&str>) -> NormalizedStatus {
    // Only a top-level `status` string is required; everything else is
    // passed through or looked up as found.
    let report = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            let state = value.get("status")?.as_str().map(HealthState::from_actuator)?;
            Some((value, state))
        });

    let Some((report, state)) = report else {
        return NormalizedStatus::new(
            HealthState::from_success(is_success(status)),
            StatusDetail::InvalidReport,
        );
    };

    let Some(name) = component else {
        return NormalizedStatus::new(state, StatusDetail::Report(report));
    };

    let found = report
        .get("components")
        .and_then(|components| components.get(name))
        .and_then(Value::as_object);

    match found {
        Some(found) => NormalizedStatus::new(
            found
                .get("status")
                .and_then(Value::as_str)
                .map(HealthState::from_actuator)
                .unwrap_or(HealthState::Unknown),
            StatusDetail::Component {
                component: name.to_string(),
                details: found.get("details").cloned().unwrap_or(Value::Null),
            },
        ),
        // Descriptor and live report disagree; not a service failure.
        None => NormalizedStatus::new(
            HealthState::Unknown,
            StatusDetail::Component {
                component: name.to_string(),
                details: Value::Null,
            },
        ),
    }
}

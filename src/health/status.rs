// src/health/status.rs
use hyper::StatusCode;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

pub const ALWAYS_UP_MESSAGE: &str = "Service always reported as UP";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON response";
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthState {
    Up,
    Down,
    Unknown,
}

impl HealthState {
    pub fn from_success(success: bool) -> Self {
        if success {
            HealthState::Up
        } else {
            HealthState::Down
        }
    }

    /// Map an actuator status string onto the dashboard's three states.
    pub fn from_actuator(status: &str) -> Self {
        match status {
            "UP" => HealthState::Up,
            "DOWN" | "OUT_OF_SERVICE" => HealthState::Down,
            _ => HealthState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Up => "UP",
            HealthState::Down => "DOWN",
            HealthState::Unknown => "UNKNOWN",
        }
    }
}

/// Protocol-specific payload that accompanies a [`HealthState`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatusDetail {
    Http { http_status: u16 },
    Text { response: String },
    /// Whole actuator report, passed through untouched.
    Report(Value),
    Component { component: String, details: Value },
    /// Actuator body did not parse; state came from the status code.
    InvalidReport,
    Skipped,
    ConnectionError { message: String },
    Timeout,
    Internal { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedStatus {
    pub status: HealthState,
    pub detail: StatusDetail,
}

impl NormalizedStatus {
    pub fn new(status: HealthState, detail: StatusDetail) -> Self {
        Self { status, detail }
    }

    pub fn skipped() -> Self {
        Self::new(HealthState::Up, StatusDetail::Skipped)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            HealthState::Down,
            StatusDetail::Internal {
                message: message.into(),
            },
        )
    }

    /// Status code for the API response carrying this record.
    pub fn http_status(&self) -> StatusCode {
        match self.detail {
            StatusDetail::ConnectionError { .. } => StatusCode::BAD_GATEWAY,
            StatusDetail::Timeout => StatusCode::GATEWAY_TIMEOUT,
            StatusDetail::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        }
    }
}

impl Serialize for NormalizedStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let StatusDetail::Report(report) = &self.detail {
            return report.serialize(serializer);
        }

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", &self.status)?;
        match &self.detail {
            StatusDetail::Http { http_status } => map.serialize_entry("httpStatus", http_status)?,
            StatusDetail::Text { response } => map.serialize_entry("response", response)?,
            StatusDetail::Component { component, details } => {
                map.serialize_entry("component", component)?;
                map.serialize_entry("details", details)?;
            }
            StatusDetail::InvalidReport => map.serialize_entry("error", INVALID_JSON_MESSAGE)?,
            StatusDetail::Skipped => map.serialize_entry("message", ALWAYS_UP_MESSAGE)?,
            StatusDetail::ConnectionError { message } | StatusDetail::Internal { message } => {
                map.serialize_entry("error", message)?
            }
            StatusDetail::Timeout => map.serialize_entry("error", TIMEOUT_MESSAGE)?,
            StatusDetail::Report(_) => {}
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(status: &NormalizedStatus) -> Value {
        serde_json::to_value(status).unwrap()
    }

    #[test]
    fn http_detail_shape() {
        let status = NormalizedStatus::new(HealthState::Up, StatusDetail::Http { http_status: 200 });
        assert_eq!(to_json(&status), json!({"status": "UP", "httpStatus": 200}));
        assert_eq!(status.http_status(), StatusCode::OK);
    }

    #[test]
    fn report_is_passed_through_verbatim() {
        let report = json!({"status": "OUT_OF_SERVICE", "groups": ["liveness"]});
        let status = NormalizedStatus::new(HealthState::Down, StatusDetail::Report(report.clone()));
        assert_eq!(to_json(&status), report);
    }

    #[test]
    fn component_without_details_serializes_null() {
        let status = NormalizedStatus::new(
            HealthState::Unknown,
            StatusDetail::Component {
                component: "cache".into(),
                details: Value::Null,
            },
        );
        assert_eq!(
            to_json(&status),
            json!({"status": "UNKNOWN", "component": "cache", "details": null})
        );
    }

    #[test]
    fn transport_failures_pick_gateway_codes() {
        let refused = NormalizedStatus::new(
            HealthState::Down,
            StatusDetail::ConnectionError {
                message: "connection refused".into(),
            },
        );
        assert_eq!(refused.http_status(), StatusCode::BAD_GATEWAY);
        assert_eq!(to_json(&refused), json!({"status": "DOWN", "error": "connection refused"}));

        let timeout = NormalizedStatus::new(HealthState::Down, StatusDetail::Timeout);
        assert_eq!(timeout.http_status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(to_json(&timeout), json!({"status": "DOWN", "error": "Request timeout"}));

        let internal = NormalizedStatus::internal("bad url");
        assert_eq!(internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn skipped_reports_up_with_message() {
        assert_eq!(
            to_json(&NormalizedStatus::skipped()),
            json!({"status": "UP", "message": "Service always reported as UP"})
        );
    }

    #[test]
    fn actuator_strings_map_to_states() {
        assert_eq!(HealthState::from_actuator("UP"), HealthState::Up);
        assert_eq!(HealthState::from_actuator("OUT_OF_SERVICE"), HealthState::Down);
        assert_eq!(HealthState::from_actuator("up"), HealthState::Unknown);
    }
}

// src/registry/descriptor.rs
use serde::Deserialize;

fn default_expected_text() -> String {
    "OK".to_string()
}

/// How a probe's raw response is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum CheckProtocol {
    /// 2xx status code means UP, body ignored.
    Http,
    /// Trimmed body must equal `expected_text`, status code ignored.
    Text {
        #[serde(default = "default_expected_text")]
        expected_text: String,
    },
    /// Spring Boot style actuator report, optionally narrowed to one component.
    Actuator {
        #[serde(default)]
        component: Option<String>,
    },
}

impl CheckProtocol {
    pub fn name(&self) -> &'static str {
        match self {
            CheckProtocol::Http => "http",
            CheckProtocol::Text { .. } => "text",
            CheckProtocol::Actuator { .. } => "actuator",
        }
    }

    pub fn component(&self) -> Option<&str> {
        match self {
            CheckProtocol::Actuator { component } => component.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDescriptor {
    pub key: String,
    pub name: String,
    /// Kept as written in configuration; parsed when probed.
    pub url: String,
    pub check: CheckProtocol,
    /// Skip probing and always report UP.
    #[serde(default)]
    pub always_up: bool,
}

impl ServiceDescriptor {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        check: CheckProtocol,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            url: url.into(),
            check,
            always_up: false,
        }
    }

    pub fn always_up(mut self) -> Self {
        self.always_up = true;
        self
    }
}

// src/health/mod.rs
mod checker;
mod normalizer;
mod status;

pub use checker::HealthChecker;
pub use normalizer::normalize;
pub use status::{HealthState, NormalizedStatus, StatusDetail};

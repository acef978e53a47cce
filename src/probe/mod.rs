// src/probe/mod.rs
mod executor;
mod transport;

pub use executor::{ProbeError, ProbeExecutor, ProbeOutcome};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};

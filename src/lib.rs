// src/lib.rs
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod probe;
pub mod registry;
pub mod server;

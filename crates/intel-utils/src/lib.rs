//! Shared utilities for market-intel
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and typed access to environment configuration.

pub mod config;
pub mod logging;

pub use config::{EnvError, EnvReader};
pub use logging::init_tracing;

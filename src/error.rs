//! # Gateway Error Handling
//!
//! This module defines the GatewayError enum, which represents the different
//! error types that can surface from the lora-gw crate's public API.

use thiserror::Error;

use crate::gateway::config::ConfigError;
use crate::radio::driver::DriverError;

/// Represents the different error types that can occur in the gateway crate.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Indicates an error reported by the radio driver or the HAL below it.
    #[error("Radio driver error: {0}")]
    Driver(#[from] DriverError),

    /// Indicates an invalid or unloadable gateway configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

//! # Hardware Abstraction Layer for the SX126x Radio
//!
//! This module defines the HAL trait the driver is generic over, plus the
//! platform implementations. The trait covers exactly what the receive
//! path needs: SPI command/register transfers and a view of the DIO1
//! interrupt line.
//!
//! Platform implementations:
//! - `raspberry_pi` - rppal-based SPI/GPIO (feature `raspberry-pi`)
//! - `mock` - scripted in-memory HAL for tests and host development

use thiserror::Error;

/// Errors that can occur during HAL operations
#[derive(Debug, Error)]
pub enum HalError {
    #[error("SPI communication error")]
    Spi,

    #[error("GPIO operation error")]
    Gpio,

    #[error("Register access error")]
    Register,

    #[error("Timeout waiting for operation")]
    Timeout,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Hardware Abstraction Layer trait for SX126x radio control
///
/// Implementations are responsible for chip-select framing and for
/// honouring the BUSY line between transfers; the driver never sees
/// either.
pub trait Hal {
    /// Write a command opcode with optional parameters to the radio
    fn write_command(&mut self, opcode: u8, data: &[u8]) -> Result<(), HalError>;

    /// Read a command response from the radio into `buf`
    ///
    /// `buf` receives every byte clocked out after the opcode. For most
    /// Get* commands that means the chip status byte arrives first; the
    /// driver accounts for it.
    fn read_command(&mut self, opcode: u8, buf: &mut [u8]) -> Result<(), HalError>;

    /// Write data to a radio register
    fn write_register(&mut self, addr: u16, data: &[u8]) -> Result<(), HalError>;

    /// Read data from a radio register
    fn read_register(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), HalError>;

    /// Read the state of the DIO1 interrupt line
    ///
    /// Returns `true` while the radio holds DIO1 high, i.e. at least one
    /// of the interrupt sources routed to DIO1 is pending.
    fn irq_asserted(&mut self) -> Result<bool, HalError>;
}

// Platform implementations
pub mod mock;

#[cfg(feature = "raspberry-pi")]
pub mod raspberry_pi;

// Re-export platform implementations for convenience
pub use mock::MockHal;

#[cfg(feature = "raspberry-pi")]
pub use raspberry_pi::{GpioPins, RaspberryPiHal};

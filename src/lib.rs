//! # lora-gw - A Single-Channel LoRa Receive Gateway for SX126x Radios
//!
//! The lora-gw crate implements a small point-to-point LoRa gateway for
//! embedded Linux hosts (Raspberry Pi and similar): it brings up an SX126x
//! radio over SPI, locks it to one frequency and one set of modulation
//! parameters, and then polls forever for addressed packets, reporting the
//! link diagnostics of each one (RSSI, SNR, payload CRC, sequence number)
//! on the console.
//!
//! ## Features
//!
//! - Synchronous SX126x command layer over a pluggable HAL (SPI + GPIO)
//! - Raspberry Pi HAL implementation via `rppal` (feature `raspberry-pi`)
//! - Addressed packet header decoding (destination / type / source / seqno)
//! - Regional configuration presets (EU868, US915, AS923) with JSON files
//! - Packet and error counters with per-packet diagnostic reporting
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lora_gw::gateway::{config::GatewayConfig, Gateway};
//! use lora_gw::radio::hal::mock::MockHal;
//!
//! let config = GatewayConfig::eu868();
//! let mut gateway = Gateway::new(MockHal::new(), config);
//! gateway.init()?;
//! gateway.run()?;
//! # Ok::<(), lora_gw::GatewayError>(())
//! ```
//!
//! On real hardware, replace `MockHal` with
//! `lora_gw::radio::hal::raspberry_pi::RaspberryPiHal`.

pub mod error;
pub mod gateway;
pub mod logging;
pub mod radio;

pub use crate::error::GatewayError;
pub use crate::logging::init_logger;

// Core gateway types
pub use gateway::config::GatewayConfig;
pub use gateway::packet::{crc_ccitt, PacketHeader};
pub use gateway::{Gateway, GatewayStats, RxOutcome, RX_BUFFER_SIZE};

// Radio layer types
pub use radio::driver::{DriverError, Sx126xDriver};
pub use radio::irq::{IrqMask, IrqMaskBit, IrqStatus};
pub use radio::modulation::{
    CodingRate, LoRaBandwidth, LoRaModParams, LoRaPacketParams, SpreadingFactor,
};

//! # Gateway Configuration
//!
//! Fixed-frequency, fixed-SF configuration for the receive gateway, with
//! regional presets and JSON file support. End-devices must be configured
//! with the same frequency, modulation parameters and sync word.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::radio::modulation::{
    requires_ldro, CodingRate, LoRaBandwidth, LoRaModParams, LoRaPacketParams, SpreadingFactor,
    SyncWords,
};

/// Errors from loading or validating a gateway configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// GPIO pin assignments for the radio connections (BCM numbering)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PinConfig {
    /// BUSY pin (input)
    pub busy: u8,
    /// DIO1 interrupt pin (input)
    pub dio1: u8,
    /// RESET pin (output, active low), if wired
    pub reset: Option<u8>,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            busy: 25,
            dio1: 24,
            reset: Some(22),
        }
    }
}

/// Single-channel gateway configuration
///
/// Locks the radio to a specific frequency and modulation parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Center frequency in Hz (e.g., 868_100_000 for EU868.1)
    pub frequency_hz: u32,

    /// Frequency correction applied on top of `frequency_hz`, in Hz
    #[serde(default)]
    pub frequency_offset_hz: i32,

    /// Spreading Factor (SF5-SF12)
    pub spreading_factor: SpreadingFactor,

    /// Bandwidth (typically 125kHz for EU868)
    pub bandwidth: LoRaBandwidth,

    /// Coding Rate (typically 4/5)
    pub coding_rate: CodingRate,

    /// Use the public LoRaWAN sync word instead of the private one
    #[serde(default)]
    pub public_network: bool,

    /// This gateway's node address; packets addressed to it are flagged
    /// in the report
    pub node_address: u8,

    /// Hardware RX timeout per receive attempt, in milliseconds
    pub rx_timeout_ms: u64,

    /// SPI bus number the radio is wired to
    #[serde(default)]
    pub spi_bus: u8,

    /// GPIO pin assignments
    #[serde(default)]
    pub pins: PinConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::eu868()
    }
}

impl GatewayConfig {
    /// EU868 configuration: 868.1 MHz, SF12/125kHz for maximum range
    pub fn eu868() -> Self {
        Self {
            frequency_hz: 868_100_000, // EU868 channel 1
            frequency_offset_hz: 0,
            spreading_factor: SpreadingFactor::SF12,
            bandwidth: LoRaBandwidth::BW125,
            coding_rate: CodingRate::CR4_5,
            public_network: false,
            node_address: 1,
            rx_timeout_ms: 10_000,
            spi_bus: 0,
            pins: PinConfig::default(),
        }
    }

    /// US915 configuration: wider bandwidth, no duty cycle restrictions
    pub fn us915() -> Self {
        Self {
            frequency_hz: 902_300_000, // US915 channel 0
            spreading_factor: SpreadingFactor::SF7,
            bandwidth: LoRaBandwidth::BW500,
            ..Self::eu868()
        }
    }

    /// AS923 configuration (Asia-Pacific)
    pub fn as923() -> Self {
        Self {
            frequency_hz: 923_200_000, // AS923 channel 1
            spreading_factor: SpreadingFactor::SF8,
            bandwidth: LoRaBandwidth::BW125,
            ..Self::eu868()
        }
    }

    /// Look up a regional preset by name
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.to_ascii_lowercase().as_str() {
            "eu868" => Ok(Self::eu868()),
            "us915" => Ok(Self::us915()),
            "as923" => Ok(Self::as923()),
            _ => Err(ConfigError::Invalid(format!(
                "unknown region preset '{name}' (expected eu868, us915 or as923)"
            ))),
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validate parameter compatibility
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(
            self.spreading_factor,
            SpreadingFactor::SF11 | SpreadingFactor::SF12
        ) && self.bandwidth == LoRaBandwidth::BW500
        {
            return Err(ConfigError::Invalid(
                "SF11/SF12 with BW500 not supported - excessive time on air".into(),
            ));
        }

        if self.rx_timeout_ms < 100 {
            return Err(ConfigError::Invalid(format!(
                "rx_timeout_ms {} too short, minimum is 100",
                self.rx_timeout_ms
            )));
        }

        if self.node_address == 0 {
            return Err(ConfigError::Invalid(
                "node_address 0 is reserved for broadcast".into(),
            ));
        }

        Ok(())
    }

    /// Operating frequency with the correction offset applied
    pub fn tuned_frequency_hz(&self) -> u32 {
        (self.frequency_hz as i64 + self.frequency_offset_hz as i64) as u32
    }

    /// Modulation parameters for the driver, with LDRO derived from SF/BW
    pub fn mod_params(&self) -> LoRaModParams {
        LoRaModParams {
            sf: self.spreading_factor,
            bw: self.bandwidth,
            cr: self.coding_rate,
            low_data_rate_optimize: requires_ldro(self.spreading_factor, self.bandwidth),
        }
    }

    /// Packet parameters for the driver
    pub fn packet_params(&self) -> LoRaPacketParams {
        LoRaPacketParams::default()
    }

    /// Sync word matching the configured network type
    pub fn sync_word(&self) -> u16 {
        if self.public_network {
            SyncWords::PUBLIC
        } else {
            SyncWords::PRIVATE
        }
    }

    /// RX timeout as a `Duration`
    pub fn rx_timeout(&self) -> Duration {
        Duration::from_millis(self.rx_timeout_ms)
    }

    /// Multi-line modem settings summary for the startup log
    pub fn summary(&self) -> String {
        let mod_params = self.mod_params();
        format!(
            "Frequency: {:.3} MHz (offset {} Hz)\n\
             Modem: {} / BW {} / CR {}{}\n\
             Sync word: 0x{:04X} ({})\n\
             Node address: {}\n\
             RX timeout: {} ms",
            self.tuned_frequency_hz() as f64 / 1_000_000.0,
            self.frequency_offset_hz,
            mod_params.sf,
            mod_params.bw,
            mod_params.cr,
            if mod_params.low_data_rate_optimize {
                " (LDRO)"
            } else {
                ""
            },
            self.sync_word(),
            if self.public_network { "public" } else { "private" },
            self.node_address,
            self.rx_timeout_ms
        )
    }
}

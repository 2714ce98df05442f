//! # LoRa Modulation and Packet Configuration
//!
//! Value types for the SX126x LoRa modem: spreading factor, bandwidth and
//! coding rate (with their register encodings from the datasheet tables),
//! plus the modulation and packet parameter sets the driver writes to the
//! chip.
//!
//! LoRa packets have this structure on air:
//! ```text
//! ┌───────────┐ ┌───────────┐ ┌────────────┐ ┌───────┐
//! │ Preamble  │ │ Header    │ │  Payload   │ │ CRC   │
//! │ (n syms)  │ │ (explicit)│ │ (0-255 B)  │ │ (2 B) │
//! └───────────┘ └───────────┘ └────────────┘ └───────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Spreading Factor (SF) for LoRa (Table 13-47)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpreadingFactor {
    SF5 = 0x05,
    SF6 = 0x06,
    SF7 = 0x07,
    SF8 = 0x08,
    SF9 = 0x09,
    SF10 = 0x0A,
    SF11 = 0x0B,
    SF12 = 0x0C,
}

impl SpreadingFactor {
    /// Register value written with SetModulationParams.
    pub fn register_value(self) -> u8 {
        self as u8
    }

    /// Chips-per-symbol exponent (the numeric "SF7".."SF12" value).
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SpreadingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}", self.value())
    }
}

impl FromStr for SpreadingFactor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("SF").trim_start_matches("sf");
        match digits {
            "5" => Ok(Self::SF5),
            "6" => Ok(Self::SF6),
            "7" => Ok(Self::SF7),
            "8" => Ok(Self::SF8),
            "9" => Ok(Self::SF9),
            "10" => Ok(Self::SF10),
            "11" => Ok(Self::SF11),
            "12" => Ok(Self::SF12),
            _ => Err(format!("unknown spreading factor '{s}' (expected SF5..SF12)")),
        }
    }
}

/// Bandwidth for LoRa (Table 13-48)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoRaBandwidth {
    BW7_8 = 0x00,  // 7.8 kHz
    BW10_4 = 0x08, // 10.4 kHz
    BW15_6 = 0x01, // 15.6 kHz
    BW20_8 = 0x09, // 20.8 kHz
    BW31_2 = 0x02, // 31.25 kHz
    BW41_7 = 0x0A, // 41.7 kHz
    BW62_5 = 0x03, // 62.5 kHz
    BW125 = 0x04,  // 125 kHz
    BW250 = 0x05,  // 250 kHz
    BW500 = 0x06,  // 500 kHz
}

impl LoRaBandwidth {
    /// Register value written with SetModulationParams.
    pub fn register_value(self) -> u8 {
        self as u8
    }

    /// Occupied bandwidth in Hz.
    pub fn hz(self) -> u32 {
        match self {
            Self::BW7_8 => 7_800,
            Self::BW10_4 => 10_400,
            Self::BW15_6 => 15_600,
            Self::BW20_8 => 20_800,
            Self::BW31_2 => 31_250,
            Self::BW41_7 => 41_700,
            Self::BW62_5 => 62_500,
            Self::BW125 => 125_000,
            Self::BW250 => 250_000,
            Self::BW500 => 500_000,
        }
    }

    /// True for the bandwidths at or below 125 kHz.
    pub fn is_narrow(self) -> bool {
        self.hz() <= 125_000
    }
}

impl fmt::Display for LoRaBandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.hz();
        if hz % 1000 == 0 {
            write!(f, "{}kHz", hz / 1000)
        } else {
            write!(f, "{:.2}kHz", hz as f64 / 1000.0)
        }
    }
}

impl FromStr for LoRaBandwidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s
            .trim()
            .trim_start_matches("BW")
            .trim_start_matches("bw")
            .trim_end_matches("kHz")
            .trim_end_matches("khz");
        match label {
            "7.8" | "7_8" => Ok(Self::BW7_8),
            "10.4" | "10_4" => Ok(Self::BW10_4),
            "15.6" | "15_6" => Ok(Self::BW15_6),
            "20.8" | "20_8" => Ok(Self::BW20_8),
            "31.25" | "31.2" | "31_2" => Ok(Self::BW31_2),
            "41.7" | "41_7" => Ok(Self::BW41_7),
            "62.5" | "62_5" => Ok(Self::BW62_5),
            "125" => Ok(Self::BW125),
            "250" => Ok(Self::BW250),
            "500" => Ok(Self::BW500),
            _ => Err(format!("unknown LoRa bandwidth '{s}' (expected e.g. 125, 250, 500)")),
        }
    }
}

/// Coding Rate (CR) for LoRa (Table 13-49)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodingRate {
    CR4_5 = 0x01,
    CR4_6 = 0x02,
    CR4_7 = 0x03,
    CR4_8 = 0x04,
}

impl CodingRate {
    /// Register value written with SetModulationParams.
    pub fn register_value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CodingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let denom = 4 + self.register_value();
        write!(f, "4/{denom}")
    }
}

impl FromStr for CodingRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches("CR").trim_start_matches("cr") {
            "4/5" | "4_5" | "5" => Ok(Self::CR4_5),
            "4/6" | "4_6" | "6" => Ok(Self::CR4_6),
            "4/7" | "4_7" | "7" => Ok(Self::CR4_7),
            "4/8" | "4_8" | "8" => Ok(Self::CR4_8),
            _ => Err(format!("unknown coding rate '{s}' (expected 4/5..4/8)")),
        }
    }
}

/// LoRa modulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoRaModParams {
    pub sf: SpreadingFactor,
    pub bw: LoRaBandwidth,
    pub cr: CodingRate,
    /// Enable Low Data Rate Optimization for SF11/SF12 on 125kHz or lower
    pub low_data_rate_optimize: bool,
}

/// LoRa packet parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoRaPacketParams {
    pub preamble_len: u16, // 8 to 65535 symbols
    pub implicit_header: bool,
    pub payload_len: u8, // maximum accepted length with explicit header
    pub crc_on: bool,
    pub iq_inverted: bool,
}

impl Default for LoRaPacketParams {
    /// Explicit header with hardware CRC, the configuration every node in
    /// a point-to-point network is expected to share.
    fn default() -> Self {
        Self {
            preamble_len: 8,
            implicit_header: false,
            payload_len: 255,
            crc_on: true,
            iq_inverted: false,
        }
    }
}

/// LoRa packet status (metadata from received LoRa packets)
#[derive(Debug, Clone, Copy, Default)]
pub struct LoRaPacketStatus {
    pub rssi_pkt_dbm: i16,
    pub snr_pkt_db: f32,
    pub signal_rssi_pkt_dbm: i16,
}

/// Determine if LDRO should be enabled based on SF and BW
///
/// Per AN1200.22: required for SF11/SF12 when BW <= 125kHz.
pub fn requires_ldro(sf: SpreadingFactor, bw: LoRaBandwidth) -> bool {
    matches!(sf, SpreadingFactor::SF11 | SpreadingFactor::SF12) && bw.is_narrow()
}

/// Sync word definitions for network types
pub struct SyncWords;

impl SyncWords {
    /// LoRaWAN public network sync word
    pub const PUBLIC: u16 = 0x3444;

    /// Private network sync word (non-LoRaWAN)
    pub const PRIVATE: u16 = 0x1424;
}

//! # SX126x Interrupt Status Handling
//!
//! The SX126x reports radio events through a 16-bit interrupt register.
//! Sources are routed to DIO pins with `SetDioIrqParams`; the gateway
//! routes its receive-path events to DIO1, polls the line, reads the
//! status register and clears it after classifying the event.
//!
//! Bit layout of the interrupt register:
//!
//! ```text
//! Bit 15-10: Reserved
//! Bit 9:  Timeout - RX/TX operation timed out
//! Bit 8:  CadDetected - channel activity detected
//! Bit 7:  CadDone - channel activity scan completed
//! Bit 6:  CrcErr - payload CRC validation failed
//! Bit 5:  HeaderError - LoRa header corrupt
//! Bit 4:  HeaderValid - valid LoRa header received
//! Bit 3:  SyncwordValid - sync word detected
//! Bit 2:  PreambleDetected - preamble detected
//! Bit 1:  RxDone - packet reception completed
//! Bit 0:  TxDone - packet transmission completed
//! ```

/// SX126x interrupt bit definitions
///
/// Combine with bitwise OR (or [`IrqMask::combine`]) to build masks.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IrqMaskBit {
    None = 0x0000,
    TxDone = 1 << 0,
    RxDone = 1 << 1,
    PreambleDetected = 1 << 2,
    SyncwordValid = 1 << 3,
    HeaderValid = 1 << 4,
    HeaderError = 1 << 5,
    CrcErr = 1 << 6,
    CadDone = 1 << 7,
    CadDetected = 1 << 8,
    Timeout = 1 << 9,
    All = 0xFFFF,
}

/// Interrupt mask for configuring which events generate interrupts
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct IrqMask {
    inner: u16,
}

impl IrqMask {
    /// Empty mask, no interrupt sources enabled.
    pub const fn none() -> Self {
        Self {
            inner: IrqMaskBit::None as u16,
        }
    }

    /// Mask with every interrupt source enabled.
    pub const fn all() -> Self {
        Self {
            inner: IrqMaskBit::All as u16,
        }
    }

    /// Add an interrupt source to the mask.
    pub fn combine(self, bit: IrqMaskBit) -> Self {
        let inner = self.inner | bit as u16;
        Self { inner }
    }
}

impl From<IrqMask> for u16 {
    fn from(val: IrqMask) -> Self {
        val.inner
    }
}

impl From<u16> for IrqMask {
    fn from(mask: u16) -> Self {
        Self { inner: mask }
    }
}

/// Snapshot of the SX126x interrupt status register
///
/// Read after DIO1 asserts, then cleared; each accessor tests one event
/// bit.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct IrqStatus {
    inner: u16,
}

impl From<u16> for IrqStatus {
    fn from(status: u16) -> Self {
        Self { inner: status }
    }
}

impl From<IrqStatus> for u16 {
    fn from(status: IrqStatus) -> Self {
        status.inner
    }
}

impl IrqStatus {
    pub fn tx_done(self) -> bool {
        (self.inner & (IrqMaskBit::TxDone as u16)) != 0
    }

    pub fn rx_done(self) -> bool {
        (self.inner & (IrqMaskBit::RxDone as u16)) != 0
    }

    pub fn preamble_detected(self) -> bool {
        (self.inner & (IrqMaskBit::PreambleDetected as u16)) != 0
    }

    pub fn syncword_valid(self) -> bool {
        (self.inner & (IrqMaskBit::SyncwordValid as u16)) != 0
    }

    pub fn header_valid(self) -> bool {
        (self.inner & (IrqMaskBit::HeaderValid as u16)) != 0
    }

    pub fn header_error(self) -> bool {
        (self.inner & (IrqMaskBit::HeaderError as u16)) != 0
    }

    pub fn crc_err(self) -> bool {
        (self.inner & (IrqMaskBit::CrcErr as u16)) != 0
    }

    pub fn cad_done(self) -> bool {
        (self.inner & (IrqMaskBit::CadDone as u16)) != 0
    }

    pub fn cad_detected(self) -> bool {
        (self.inner & (IrqMaskBit::CadDetected as u16)) != 0
    }

    pub fn timeout(self) -> bool {
        (self.inner & (IrqMaskBit::Timeout as u16)) != 0
    }

    /// Raw 16-bit register value.
    pub fn raw(self) -> u16 {
        self.inner
    }

    /// True when at least one interrupt bit is set.
    pub fn has_any(self) -> bool {
        self.inner != 0
    }

    /// Names of the set flags, LSB first, for diagnostic output.
    pub fn flag_names(self) -> Vec<&'static str> {
        const NAMES: [(u16, &str); 10] = [
            (IrqMaskBit::TxDone as u16, "TX_DONE"),
            (IrqMaskBit::RxDone as u16, "RX_DONE"),
            (IrqMaskBit::PreambleDetected as u16, "PREAMBLE_DETECTED"),
            (IrqMaskBit::SyncwordValid as u16, "SYNCWORD_VALID"),
            (IrqMaskBit::HeaderValid as u16, "HEADER_VALID"),
            (IrqMaskBit::HeaderError as u16, "HEADER_ERROR"),
            (IrqMaskBit::CrcErr as u16, "CRC_ERROR"),
            (IrqMaskBit::CadDone as u16, "CAD_DONE"),
            (IrqMaskBit::CadDetected as u16, "CAD_DETECTED"),
            (IrqMaskBit::Timeout as u16, "RX_TX_TIMEOUT"),
        ];

        NAMES
            .iter()
            .filter(|(bit, _)| self.inner & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

//! # SX126x Radio Support
//!
//! This module contains the radio side of the gateway: the hardware
//! abstraction layer trait with its platform implementations, the
//! synchronous SX126x command layer, and the register-level value types
//! for interrupts and LoRa modulation.

pub mod driver;
pub mod hal;
pub mod irq;
pub mod modulation;

pub use driver::{DriverError, RadioState, StandbyMode, Sx126xDriver};
pub use irq::{IrqMask, IrqMaskBit, IrqStatus};
pub use modulation::{
    CodingRate, LoRaBandwidth, LoRaModParams, LoRaPacketParams, LoRaPacketStatus, SpreadingFactor,
};

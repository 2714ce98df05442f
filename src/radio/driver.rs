//! # SX126x Radio Driver
//!
//! Synchronous command layer for the Semtech SX126x family (SX1261,
//! SX1262, SX1268), covering what a receive-only LoRa gateway needs:
//! bring-up and calibration, LoRa modem configuration, RX mode control,
//! interrupt status handling and packet readout.
//!
//! The driver is generic over a [`Hal`] implementation, so the same code
//! runs against the Raspberry Pi SPI bus and against the scripted mock in
//! the test suite.
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │        Gateway loop             │
//! ├─────────────────────────────────┤
//! │     Sx126xDriver (this file)    │
//! ├─────────────────────────────────┤
//! │      Hal trait (SPI + DIO1)     │
//! └─────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::radio::hal::{Hal, HalError};
use crate::radio::irq::{IrqMaskBit, IrqStatus};
use crate::radio::modulation::{LoRaModParams, LoRaPacketParams, LoRaPacketStatus};

/// Radio operating states based on SX126x chip modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    /// Device is in sleep mode (lowest power)
    Sleep = 0x0,
    /// Device is in standby mode using the RC oscillator
    StandbyRc = 0x2,
    /// Device is in standby mode using the crystal oscillator
    StandbyXosc = 0x3,
    /// Device is in frequency synthesis mode (transitional state)
    FreqSynth = 0x4,
    /// Device is in receive mode
    Rx = 0x5,
    /// Device is in transmit mode
    Tx = 0x6,
}

/// Standby mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandbyMode {
    /// 13MHz RC oscillator (faster wake-up)
    RC = 0x00,
    /// 32MHz crystal oscillator
    XOSC = 0x01,
}

/// Device error flags returned by the GetDeviceErrors command
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceErrors {
    pub rc64k_calib_error: bool,
    pub rc13m_calib_error: bool,
    pub pll_calib_error: bool,
    pub adc_calib_error: bool,
    pub img_calib_error: bool,
    pub xosc_start_error: bool,
    pub pll_lock_error: bool,
    pub pa_ramp_error: bool,
}

impl DeviceErrors {
    /// Create DeviceErrors from the raw error register value
    pub fn from_raw(raw: u16) -> Self {
        Self {
            rc64k_calib_error: (raw & 0x0001) != 0,
            rc13m_calib_error: (raw & 0x0002) != 0,
            pll_calib_error: (raw & 0x0004) != 0,
            adc_calib_error: (raw & 0x0008) != 0,
            img_calib_error: (raw & 0x0010) != 0,
            xosc_start_error: (raw & 0x0020) != 0,
            pll_lock_error: (raw & 0x0040) != 0,
            pa_ramp_error: (raw & 0x0080) != 0,
        }
    }

    /// Check if any errors are present
    pub fn has_errors(&self) -> bool {
        self.rc64k_calib_error
            || self.rc13m_calib_error
            || self.pll_calib_error
            || self.adc_calib_error
            || self.img_calib_error
            || self.xosc_start_error
            || self.pll_lock_error
            || self.pa_ramp_error
    }
}

/// Errors that can occur during radio driver operations
#[derive(Error, Debug)]
pub enum DriverError {
    /// Hardware abstraction layer error (SPI, GPIO, etc.)
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),
    /// Device probe failed - nothing answered on the SPI bus
    #[error("No device responding")]
    NoDevice,
    /// Invalid configuration parameters provided
    #[error("Invalid params: {0}")]
    InvalidParams(&'static str),
    /// Device hardware errors detected during calibration
    #[error("Device errors detected: {0:?}")]
    Device(DeviceErrors),
}

/// Main driver structure for SX126x radio transceivers
///
/// ## Type Parameters
///
/// * `H` - Hardware abstraction layer implementation
pub struct Sx126xDriver<H: Hal> {
    /// Hardware abstraction layer for SPI/GPIO operations
    hal: H,
    /// Crystal oscillator frequency in Hz (typically 32MHz)
    xtal_freq: u32,
}

impl<H: Hal> Sx126xDriver<H> {
    /// Create a new SX126x driver instance
    ///
    /// # Arguments
    ///
    /// * `hal` - Hardware abstraction layer implementation
    /// * `xtal_freq` - Crystal oscillator frequency in Hz (typically 32_000_000)
    pub fn new(hal: H, xtal_freq: u32) -> Self {
        Self { hal, xtal_freq }
    }

    /// Consume the driver and return the underlying HAL
    pub fn into_hal(self) -> H {
        self.hal
    }

    /// Probe for a responding radio
    ///
    /// Puts the chip in standby and reads the status register. An absent
    /// or unpowered chip leaves MISO stuck, which reads back as all-zero
    /// or all-one bytes.
    pub fn probe(&mut self) -> Result<(), DriverError> {
        self.set_standby(StandbyMode::RC)?;
        let status = self.get_status_raw()?;
        if status == 0x00 || status == 0xFF {
            return Err(DriverError::NoDevice);
        }
        log::debug!("Device probe OK, status 0x{status:02X}");
        Ok(())
    }

    /// Enter standby mode
    pub fn set_standby(&mut self, mode: StandbyMode) -> Result<(), DriverError> {
        self.hal.write_command(0x80, &[mode as u8])?; // SetStandby
        Ok(())
    }

    /// Select the DC-DC regulator (true) or the LDO (false)
    pub fn set_regulator_mode(&mut self, use_dcdc: bool) -> Result<(), DriverError> {
        let param = if use_dcdc { 0x01 } else { 0x00 };
        self.hal.write_command(0x96, &[param])?; // SetRegulatorMode
        Ok(())
    }

    /// Calibrate all RC oscillators, the PLL, the ADC and the image rejection
    pub fn calibrate_all(&mut self) -> Result<(), DriverError> {
        self.hal.write_command(0x89, &[0x7F])?; // Calibrate, all blocks
        Ok(())
    }

    /// Run image calibration for the band containing `frequency_hz`
    ///
    /// Band edge values from Table 9-2 of the datasheet.
    pub fn calibrate_image(&mut self, frequency_hz: u32) -> Result<(), DriverError> {
        let band = match frequency_hz {
            430_000_000..=440_000_000 => [0x6B, 0x6F],
            470_000_000..=510_000_000 => [0x75, 0x81],
            779_000_000..=787_000_000 => [0xC1, 0xC5],
            863_000_000..=870_000_000 => [0xD7, 0xDB],
            902_000_000..=928_000_000 => [0xE1, 0xE9],
            _ => {
                return Err(DriverError::InvalidParams(
                    "frequency outside supported image calibration bands",
                ))
            }
        };
        self.hal.write_command(0x98, &band)?; // CalibrateImage
        Ok(())
    }

    /// Switch the modem to LoRa packets
    pub fn set_packet_type_lora(&mut self) -> Result<(), DriverError> {
        self.hal.write_command(0x8A, &[0x01])?; // SetPacketType, LoRa
        Ok(())
    }

    /// Set the RF carrier frequency
    ///
    /// The frequency is converted to the SX126x internal format with a
    /// resolution of `xtal_freq / 2^25` Hz.
    pub fn set_rf_frequency(&mut self, frequency_hz: u32) -> Result<(), DriverError> {
        let rf_freq = (frequency_hz as u64 * (1u64 << 25) / self.xtal_freq as u64) as u32;

        let mut buf = [0u8; 4];
        buf[0] = (rf_freq >> 24) as u8;
        buf[1] = (rf_freq >> 16) as u8;
        buf[2] = (rf_freq >> 8) as u8;
        buf[3] = rf_freq as u8;

        self.hal.write_command(0x86, &buf)?; // SetRfFrequency
        Ok(())
    }

    /// Configure the LoRa modulation parameters
    pub fn set_modulation_params(&mut self, params: LoRaModParams) -> Result<(), DriverError> {
        let buf = [
            params.sf.register_value(),
            params.bw.register_value(),
            params.cr.register_value(),
            params.low_data_rate_optimize as u8,
        ];
        self.hal.write_command(0x8B, &buf)?; // SetModulationParams
        Ok(())
    }

    /// Configure the LoRa packet parameters
    pub fn set_packet_params(&mut self, params: LoRaPacketParams) -> Result<(), DriverError> {
        let buf = [
            (params.preamble_len >> 8) as u8,
            params.preamble_len as u8,
            params.implicit_header as u8,
            params.payload_len,
            params.crc_on as u8,
            params.iq_inverted as u8,
        ];
        self.hal.write_command(0x8C, &buf)?; // SetPacketParams
        Ok(())
    }

    /// Set the LoRa sync word for network identification
    ///
    /// See [`SyncWords`](crate::radio::modulation::SyncWords) for the
    /// private and public network values.
    pub fn set_sync_word(&mut self, sync_word: u16) -> Result<(), DriverError> {
        let buf = [(sync_word >> 8) as u8, sync_word as u8];
        self.hal.write_register(0x0740, &buf)?; // RegLoRaSyncWord MSB/LSB
        Ok(())
    }

    /// Set the buffer base addresses for TX and RX operations
    pub fn set_buffer_base_addresses(&mut self, tx: u8, rx: u8) -> Result<(), DriverError> {
        self.hal.write_command(0x8F, &[tx, rx])?; // SetBufferBaseAddress
        Ok(())
    }

    /// Route interrupt sources to the DIO pins
    pub fn set_dio_irq_params(
        &mut self,
        irq_mask: u16,
        dio1_mask: u16,
        dio2_mask: u16,
        dio3_mask: u16,
    ) -> Result<(), DriverError> {
        let mut buf = [0u8; 8];
        buf[0] = (irq_mask >> 8) as u8;
        buf[1] = irq_mask as u8;
        buf[2] = (dio1_mask >> 8) as u8;
        buf[3] = dio1_mask as u8;
        buf[4] = (dio2_mask >> 8) as u8;
        buf[5] = dio2_mask as u8;
        buf[6] = (dio3_mask >> 8) as u8;
        buf[7] = dio3_mask as u8;
        self.hal.write_command(0x08, &buf)?; // SetDioIrqParams
        Ok(())
    }

    /// Enter RX mode with a hardware timeout
    ///
    /// The timeout is expressed to the chip in 15.625µs steps (64 steps
    /// per millisecond) and capped at the 24-bit register range. When it
    /// elapses without a packet, the radio raises the Timeout interrupt
    /// and returns to standby.
    pub fn set_rx(&mut self, timeout: Duration) -> Result<(), DriverError> {
        let steps = (timeout.as_millis() as u64).saturating_mul(64);
        // 0xFFFFFF means continuous RX, keep finite timeouts below it
        let tout = steps.min(0x00FF_FFFE) as u32;
        let buf = [(tout >> 16) as u8, (tout >> 8) as u8, tout as u8];
        self.hal.write_command(0x82, &buf)?; // SetRx
        Ok(())
    }

    /// Enter continuous RX mode (no hardware timeout)
    pub fn set_rx_continuous(&mut self) -> Result<(), DriverError> {
        let buf = [0xFF, 0xFF, 0xFF];
        self.hal.write_command(0x82, &buf)?; // SetRx, continuous
        Ok(())
    }

    /// Set receiver gain mode
    ///
    /// Boosted gain buys about +6dB sensitivity for roughly five times
    /// the RX current. Worth it for a mains-powered gateway.
    pub fn set_rx_boosted_gain(&mut self, enabled: bool) -> Result<(), DriverError> {
        let gain_value = if enabled { 0x96 } else { 0x94 };
        self.hal.write_register(0x08AC, &[gain_value])?; // RegRxGain
        Ok(())
    }

    /// Read the raw status byte
    pub fn get_status_raw(&mut self) -> Result<u8, DriverError> {
        let mut status = [0u8; 1];
        self.hal.read_command(0xC0, &mut status)?; // GetStatus
        Ok(status[0])
    }

    /// Read the current chip mode from the status register
    pub fn get_state(&mut self) -> Result<RadioState, DriverError> {
        let status = self.get_status_raw()?;

        // Chip mode lives in bits [6:4]
        let chip_mode = (status >> 4) & 0x07;
        let state = match chip_mode {
            0x2 => RadioState::StandbyRc,
            0x3 => RadioState::StandbyXosc,
            0x4 => RadioState::FreqSynth,
            0x5 => RadioState::Rx,
            0x6 => RadioState::Tx,
            _ => RadioState::Sleep,
        };
        Ok(state)
    }

    /// Read the interrupt status register
    pub fn get_irq_status(&mut self) -> Result<IrqStatus, DriverError> {
        // Response: status byte, then the 16-bit register MSB first
        let mut buf = [0u8; 3];
        self.hal.read_command(0x12, &mut buf)?; // GetIrqStatus
        Ok(IrqStatus::from(((buf[1] as u16) << 8) | (buf[2] as u16)))
    }

    /// Clear the given interrupt status bits
    pub fn clear_irq_status(&mut self, irq: u16) -> Result<(), DriverError> {
        let buf = [(irq >> 8) as u8, irq as u8];
        self.hal.write_command(0x02, &buf)?; // ClearIrqStatus
        Ok(())
    }

    /// True while the radio holds the DIO1 interrupt line high
    pub fn irq_line_asserted(&mut self) -> Result<bool, DriverError> {
        Ok(self.hal.irq_asserted()?)
    }

    /// Read the RX buffer status: (payload length, buffer start offset)
    pub fn get_rx_buffer_status(&mut self) -> Result<(u8, u8), DriverError> {
        // Response: status byte, PayloadLengthRx, RxStartBufferPointer
        let mut buf = [0u8; 3];
        self.hal.read_command(0x13, &mut buf)?; // GetRxBufferStatus
        Ok((buf[1], buf[2]))
    }

    /// Read `buf.len()` received bytes starting at `offset`
    pub fn read_buffer(&mut self, offset: u8, buf: &mut [u8]) -> Result<(), DriverError> {
        self.hal.write_command(0x1E, &[offset, 0x00])?; // ReadBuffer
        // Response: status byte, then the payload
        let mut raw = vec![0u8; buf.len() + 1];
        self.hal.read_command(0x1E, &mut raw)?;
        buf.copy_from_slice(&raw[1..]);
        Ok(())
    }

    /// Read the signal metadata of the most recently received LoRa packet
    ///
    /// Scaling per Table 13-80: RSSI in -dBm/2 steps, SNR in dB/4 steps
    /// (signed).
    pub fn get_lora_packet_status(&mut self) -> Result<LoRaPacketStatus, DriverError> {
        // Response: status byte, RssiPkt, SnrPkt, SignalRssiPkt
        let mut status = [0u8; 4];
        self.hal.read_command(0x14, &mut status)?; // GetPacketStatus

        Ok(LoRaPacketStatus {
            rssi_pkt_dbm: -((status[1] as i16) / 2),
            snr_pkt_db: (status[2] as i8) as f32 / 4.0,
            signal_rssi_pkt_dbm: -((status[3] as i16) / 2),
        })
    }

    /// Read the device error register
    pub fn get_device_errors(&mut self) -> Result<DeviceErrors, DriverError> {
        // Response: status byte, then the 16-bit error word MSB first
        let mut errors = [0u8; 3];
        self.hal.read_command(0x17, &mut errors)?; // GetDeviceErrors

        let error_word = ((errors[1] as u16) << 8) | (errors[2] as u16);
        let device_errors = DeviceErrors::from_raw(error_word);

        if device_errors.has_errors() {
            log::warn!("Device errors detected: {device_errors:?}");
        }

        Ok(device_errors)
    }

    /// Clear all device error flags
    pub fn clear_device_errors(&mut self) -> Result<(), DriverError> {
        self.hal.write_command(0x07, &[0x00, 0x00])?; // ClearDeviceErrors
        Ok(())
    }

    /// Log a hex dump of a register range at debug level
    ///
    /// Startup diagnostic; reads nothing unless debug logging is enabled.
    pub fn dump_registers(&mut self, start: u16, end: u16) -> Result<(), DriverError> {
        if !log::log_enabled!(log::Level::Debug) {
            return Ok(());
        }
        let mut addr = start;
        while addr <= end {
            let chunk = ((end - addr) as usize + 1).min(16);
            let mut buf = vec![0u8; chunk];
            self.hal.read_register(addr, &mut buf)?;
            log::debug!("Reg 0x{addr:04X}: {}", hex::encode(&buf));
            let Some(next) = addr.checked_add(chunk as u16) else {
                break;
            };
            addr = next;
        }
        Ok(())
    }

    /// Configure the radio as a fixed-parameter LoRa receiver
    ///
    /// Complete bring-up sequence for gateway operation: standby, DC-DC
    /// regulator, full calibration, image calibration for the operating
    /// band, LoRa modem and packet parameters, sync word, boosted RX
    /// gain, and interrupt routing of all receive-path events to DIO1.
    pub fn configure_lora_rx(
        &mut self,
        frequency_hz: u32,
        mod_params: LoRaModParams,
        packet_params: LoRaPacketParams,
        sync_word: u16,
    ) -> Result<(), DriverError> {
        self.set_standby(StandbyMode::RC)?;
        self.set_regulator_mode(true)?;
        self.calibrate_all()?;
        self.calibrate_image(frequency_hz)?;

        let errors = self.get_device_errors()?;
        if errors.has_errors() {
            return Err(DriverError::Device(errors));
        }

        self.set_packet_type_lora()?;
        self.set_rf_frequency(frequency_hz)?;
        self.set_modulation_params(mod_params)?;
        self.set_packet_params(packet_params)?;
        self.set_sync_word(sync_word)?;
        self.set_buffer_base_addresses(0x00, 0x00)?;
        self.set_rx_boosted_gain(true)?;

        self.set_dio_irq_params(
            IrqMaskBit::RxDone as u16
                | IrqMaskBit::Timeout as u16
                | IrqMaskBit::CrcErr as u16
                | IrqMaskBit::HeaderError as u16,
            IrqMaskBit::RxDone as u16
                | IrqMaskBit::Timeout as u16
                | IrqMaskBit::CrcErr as u16
                | IrqMaskBit::HeaderError as u16, // DIO1: all receive events
            0, // DIO2: unused
            0, // DIO3: unused
        )?;

        log::info!(
            "LoRa receiver configured: {:.3} MHz, {}, BW {}, CR {}",
            frequency_hz as f64 / 1_000_000.0,
            mod_params.sf,
            mod_params.bw,
            mod_params.cr
        );
        Ok(())
    }
}

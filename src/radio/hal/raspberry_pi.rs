//! # Raspberry Pi HAL Implementation
//!
//! Hardware abstraction layer implementation for Raspberry Pi 4 and 5,
//! providing SPI communication and GPIO control for SX126x radio modules.
//!
//! ## Hardware Setup
//!
//! The gateway uses SPI0 by default (`/dev/spidev0.0`); SPI must be
//! enabled in `/boot/config.txt` (`dtparam=spi=on`).
//!
//! ```text
//! Pi Pin │ BCM GPIO │ SX126x Pin │ Function
//! ───────┼──────────┼────────────┼─────────────
//! 19     │ GPIO 10  │ MOSI       │ SPI data out
//! 21     │ GPIO 9   │ MISO       │ SPI data in
//! 23     │ GPIO 11  │ SCLK       │ SPI clock
//! 24     │ GPIO 8   │ NSS        │ Chip select
//! 22     │ GPIO 25  │ BUSY       │ Status (input)
//! 18     │ GPIO 24  │ DIO1       │ Interrupt (input)
//! 15     │ GPIO 22  │ NRESET     │ Reset (output, optional)
//! ```
//!
//! All pin numbers use BCM GPIO numbering, not physical pin numbers.

use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use rppal::spi::{BitOrder, Bus, Error as SpiError, Mode, SlaveSelect, Spi};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::radio::hal::{Hal, HalError};

/// Errors specific to the Raspberry Pi HAL implementation
#[derive(Error, Debug)]
pub enum RpiHalError {
    /// SPI bus initialization failed
    #[error("SPI initialization failed: {0}")]
    SpiInit(#[from] SpiError),
    /// GPIO initialization failed
    #[error("GPIO initialization failed: {0}")]
    GpioInit(#[from] rppal::gpio::Error),
    /// BUSY pin timeout - radio did not respond
    #[error("BUSY pin timeout - radio not responding")]
    BusyTimeout,
    /// Invalid configuration parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// GPIO pin configuration for the SX126x connections
///
/// # Examples
///
/// ```rust,no_run
/// use lora_gw::radio::hal::raspberry_pi::GpioPins;
///
/// // Minimal configuration (required pins only)
/// let pins = GpioPins {
///     busy: 25,
///     dio1: 24,
///     reset: None,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GpioPins {
    /// BUSY pin (input) - radio is processing a command while high
    pub busy: u8,
    /// DIO1 pin (input) - interrupt line from the radio
    pub dio1: u8,
    /// RESET pin (output, optional) - radio reset control (active low)
    pub reset: Option<u8>,
}

impl Default for GpioPins {
    /// Default GPIO pin configuration for typical SX126x wiring
    fn default() -> Self {
        Self {
            busy: 25,        // GPIO 25 (Pin 22)
            dio1: 24,        // GPIO 24 (Pin 18)
            reset: Some(22), // GPIO 22 (Pin 15)
        }
    }
}

/// Raspberry Pi HAL for the SX126x radio
///
/// SPI is configured for SX126x-compatible settings: 8 MHz, mode 0
/// (CPOL=0, CPHA=0), MSB first. Every command transfer waits for the
/// BUSY line to drop before returning, so the driver above never has to
/// care about command processing time.
pub struct RaspberryPiHal {
    spi: Spi,
    busy_pin: InputPin,
    dio1_pin: InputPin,
    reset_pin: Option<OutputPin>,
}

impl RaspberryPiHal {
    /// Create a new Raspberry Pi HAL instance
    ///
    /// # Arguments
    ///
    /// * `spi_bus` - SPI bus number (0 for primary SPI, 1 for auxiliary SPI)
    /// * `gpio_pins` - GPIO pin configuration for radio connections
    pub fn new(spi_bus: u8, gpio_pins: &GpioPins) -> Result<Self, RpiHalError> {
        let (bus, slave_select) = match spi_bus {
            0 => (Bus::Spi0, SlaveSelect::Ss0),
            1 => (Bus::Spi1, SlaveSelect::Ss0),
            _ => {
                return Err(RpiHalError::InvalidConfig(format!(
                    "Invalid SPI bus {spi_bus}, only 0 and 1 are supported"
                )))
            }
        };

        let mut spi = Spi::new(bus, slave_select, 8_000_000, Mode::Mode0)?;
        spi.set_bit_order(BitOrder::MsbFirst)?;

        let gpio = Gpio::new()?;
        let busy_pin = gpio.get(gpio_pins.busy)?.into_input();
        let dio1_pin = gpio.get(gpio_pins.dio1)?.into_input();

        let reset_pin = if let Some(reset) = gpio_pins.reset {
            let mut pin = gpio.get(reset)?.into_output();
            pin.set_high(); // SX126x reset is active low, so start high
            Some(pin)
        } else {
            None
        };

        log::info!("Raspberry Pi HAL initialized:");
        log::info!("  SPI: SPI{spi_bus}");
        log::info!("  BUSY: GPIO {}", gpio_pins.busy);
        log::info!("  DIO1: GPIO {}", gpio_pins.dio1);
        if let Some(reset) = gpio_pins.reset {
            log::info!("  RESET: GPIO {reset}");
        }

        Ok(Self {
            spi,
            busy_pin,
            dio1_pin,
            reset_pin,
        })
    }

    /// Reset the SX126x radio using the RESET pin
    ///
    /// Performs a hardware reset if a reset pin is configured, leaving the
    /// radio in a clean startup state. Timing per the datasheet: hold
    /// reset low for at least 100µs, then allow 1ms for startup.
    pub fn reset_radio(&mut self) -> Result<(), RpiHalError> {
        if let Some(ref mut reset_pin) = self.reset_pin {
            log::debug!("Performing hardware reset of SX126x");

            reset_pin.set_low();
            thread::sleep(Duration::from_micros(100));

            reset_pin.set_high();
            thread::sleep(Duration::from_millis(1));

            Ok(())
        } else {
            Err(RpiHalError::InvalidConfig(
                "No reset pin configured".to_string(),
            ))
        }
    }

    /// Wait for the BUSY pin to go low (command processing complete)
    fn wait_for_busy_low(&self, timeout_ms: u32) -> Result<(), RpiHalError> {
        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms as u64);

        while start.elapsed() < timeout {
            match self.busy_pin.read() {
                Level::Low => return Ok(()),
                Level::High => {
                    thread::sleep(Duration::from_micros(10));
                    continue;
                }
            }
        }

        log::warn!("BUSY pin timeout after {timeout_ms}ms");
        Err(RpiHalError::BusyTimeout)
    }
}

impl Hal for RaspberryPiHal {
    fn write_command(&mut self, opcode: u8, data: &[u8]) -> Result<(), HalError> {
        let mut cmd_buf = Vec::with_capacity(1 + data.len());
        cmd_buf.push(opcode);
        cmd_buf.extend_from_slice(data);

        match self.spi.write(&cmd_buf) {
            Ok(_) => {
                log::trace!("SPI write command 0x{:02X}, {} bytes", opcode, data.len());

                // 100ms covers the slowest documented command processing time
                self.wait_for_busy_low(100).map_err(|_| HalError::Timeout)?;

                Ok(())
            }
            Err(e) => {
                log::error!("SPI write command failed: {e}");
                Err(HalError::Spi)
            }
        }
    }

    fn read_command(&mut self, opcode: u8, buf: &mut [u8]) -> Result<(), HalError> {
        // Opcode plus NOP padding clocks the response out of the radio
        let cmd_len = 1 + buf.len();
        let mut tx_buf = vec![0x00u8; cmd_len];
        tx_buf[0] = opcode;
        let mut rx_buf = vec![0x00u8; cmd_len];

        match self.spi.transfer(&mut rx_buf, &tx_buf) {
            Ok(_) => {
                buf.copy_from_slice(&rx_buf[1..]);
                log::trace!("SPI read command 0x{:02X}, {} bytes", opcode, buf.len());
                Ok(())
            }
            Err(e) => {
                log::error!("SPI read command failed: {e}");
                Err(HalError::Spi)
            }
        }
    }

    fn write_register(&mut self, addr: u16, data: &[u8]) -> Result<(), HalError> {
        // WriteRegister command format: 0x0D, addr_msb, addr_lsb, data...
        let mut cmd_buf = Vec::with_capacity(3 + data.len());
        cmd_buf.push(0x0D);
        cmd_buf.push((addr >> 8) as u8);
        cmd_buf.push(addr as u8);
        cmd_buf.extend_from_slice(data);

        match self.spi.write(&cmd_buf) {
            Ok(_) => {
                log::trace!("Register write 0x{:04X}, {} bytes", addr, data.len());

                self.wait_for_busy_low(50).map_err(|_| HalError::Register)?;

                Ok(())
            }
            Err(e) => {
                log::error!("Register write failed: {e}");
                Err(HalError::Register)
            }
        }
    }

    fn read_register(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), HalError> {
        // ReadRegister command format: 0x1D, addr_msb, addr_lsb, NOP, data...
        let cmd_len = 4 + buf.len();
        let mut tx_buf = vec![0x00u8; cmd_len];
        tx_buf[0] = 0x1D;
        tx_buf[1] = (addr >> 8) as u8;
        tx_buf[2] = addr as u8;
        let mut rx_buf = vec![0x00u8; cmd_len];

        match self.spi.transfer(&mut rx_buf, &tx_buf) {
            Ok(_) => {
                buf.copy_from_slice(&rx_buf[4..]);
                log::trace!("Register read 0x{:04X}, {} bytes", addr, buf.len());
                Ok(())
            }
            Err(e) => {
                log::error!("Register read failed: {e}");
                Err(HalError::Register)
            }
        }
    }

    fn irq_asserted(&mut self) -> Result<bool, HalError> {
        Ok(self.dio1_pin.read() == Level::High)
    }
}

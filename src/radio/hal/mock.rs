//! # Mock HAL Implementation
//!
//! In-memory HAL used by the test suite and for host-side development
//! without radio hardware. Command writes are recorded for inspection,
//! command reads are served from scripted response queues, and the DIO1
//! line is driven from a scripted sequence of levels.
//!
//! A read with no scripted response returns all-zero bytes, which is what
//! an absent or unpowered chip looks like on the SPI bus. Tests exercising
//! the "no device responding" path rely on that default.

use std::collections::{HashMap, VecDeque};

use crate::radio::hal::{Hal, HalError};

/// Scripted in-memory HAL.
#[derive(Debug, Default)]
pub struct MockHal {
    /// Every command write, in order: (opcode, parameter bytes).
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Every register write, in order: (address, data bytes).
    pub register_writes: Vec<(u16, Vec<u8>)>,
    /// Queued responses per command opcode.
    read_queues: HashMap<u8, VecDeque<Vec<u8>>>,
    /// Register contents served to `read_register`.
    registers: HashMap<u16, Vec<u8>>,
    /// Scripted DIO1 levels, consumed one per `irq_asserted` call.
    irq_levels: VecDeque<bool>,
    /// Fail every SPI access, for error-path tests.
    fail_spi: bool,
}

impl MockHal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `read_command` with `opcode`.
    ///
    /// Responses queue per opcode and are consumed in FIFO order. The
    /// response is truncated or zero-padded to the caller's buffer size.
    pub fn queue_read(&mut self, opcode: u8, response: &[u8]) {
        self.read_queues
            .entry(opcode)
            .or_default()
            .push_back(response.to_vec());
    }

    /// Set the backing content of a register for `read_register`.
    pub fn set_register(&mut self, addr: u16, data: &[u8]) {
        self.registers.insert(addr, data.to_vec());
    }

    /// Push one DIO1 level onto the script. When the script runs out,
    /// `irq_asserted` reports the line as idle (low).
    pub fn push_irq_level(&mut self, asserted: bool) {
        self.irq_levels.push_back(asserted);
    }

    /// Make every subsequent SPI access fail with `HalError::Spi`.
    pub fn fail_spi(&mut self) {
        self.fail_spi = true;
    }

    /// All parameter buffers written for `opcode`, in order.
    pub fn writes_for(&self, opcode: u8) -> Vec<&[u8]> {
        self.writes
            .iter()
            .filter(|(op, _)| *op == opcode)
            .map(|(_, data)| data.as_slice())
            .collect()
    }

    /// All data buffers written to register `addr`, in order.
    pub fn register_writes_for(&self, addr: u16) -> Vec<&[u8]> {
        self.register_writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, data)| data.as_slice())
            .collect()
    }
}

impl Hal for MockHal {
    fn write_command(&mut self, opcode: u8, data: &[u8]) -> Result<(), HalError> {
        if self.fail_spi {
            return Err(HalError::Spi);
        }
        self.writes.push((opcode, data.to_vec()));
        Ok(())
    }

    fn read_command(&mut self, opcode: u8, buf: &mut [u8]) -> Result<(), HalError> {
        if self.fail_spi {
            return Err(HalError::Spi);
        }
        buf.fill(0x00);
        if let Some(queue) = self.read_queues.get_mut(&opcode) {
            if let Some(response) = queue.pop_front() {
                let n = response.len().min(buf.len());
                buf[..n].copy_from_slice(&response[..n]);
            }
        }
        Ok(())
    }

    fn write_register(&mut self, addr: u16, data: &[u8]) -> Result<(), HalError> {
        if self.fail_spi {
            return Err(HalError::Register);
        }
        self.register_writes.push((addr, data.to_vec()));
        self.registers.insert(addr, data.to_vec());
        Ok(())
    }

    fn read_register(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), HalError> {
        if self.fail_spi {
            return Err(HalError::Register);
        }
        buf.fill(0x00);
        if let Some(data) = self.registers.get(&addr) {
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
        }
        Ok(())
    }

    fn irq_asserted(&mut self) -> Result<bool, HalError> {
        if self.fail_spi {
            return Err(HalError::Gpio);
        }
        Ok(self.irq_levels.pop_front().unwrap_or(false))
    }
}

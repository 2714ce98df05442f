//! # Polling Receive Loop
//!
//! The gateway proper: one synchronous loop that arms the radio, waits
//! for the DIO1 line, classifies the outcome and reports it. Every
//! iteration is independent; the only state carried across iterations is
//! the pair of packet/error counters and the reusable receive buffer.

pub mod config;
pub mod packet;
pub mod report;

use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::error::GatewayError;
use crate::gateway::config::GatewayConfig;
use crate::gateway::packet::{crc_ccitt, PacketHeader, CRC_CCITT_INIT, HEADER_LEN};
use crate::radio::driver::{StandbyMode, Sx126xDriver};
use crate::radio::hal::Hal;
use crate::radio::irq::{IrqMaskBit, IrqStatus};

/// Capacity of the receive buffer; the SX126x cannot deliver more than
/// 255 bytes per packet.
pub const RX_BUFFER_SIZE: usize = 255;

/// Crystal frequency of the usual SX126x modules
const XTAL_FREQ_HZ: u32 = 32_000_000;

/// Interval between DIO1 polls while waiting for a packet
const IRQ_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Pause after a reception error before re-arming the radio
const ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// Running packet and error counters
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayStats {
    /// Packets received and decoded
    pub packets: u32,
    /// Non-timeout reception failures
    pub errors: u32,
}

/// Diagnostics of one received packet
#[derive(Debug, Clone, Copy)]
pub struct PacketReport {
    /// Decoded addressing header
    pub header: PacketHeader,
    /// Payload length in bytes (header excluded)
    pub payload_len: usize,
    /// RSSI of the packet in dBm
    pub rssi_dbm: i16,
    /// SNR of the packet in dB
    pub snr_db: f32,
    /// CRC-16/CCITT over the payload, computed host-side
    pub payload_crc: u16,
    /// Interrupt status that completed the reception
    pub irq: IrqStatus,
    /// Milliseconds since gateway start when DIO1 asserted
    pub rx_timestamp_ms: u64,
    /// Milliseconds since gateway start when readout finished
    pub rx_done_timestamp_ms: u64,
}

/// Diagnostics of one failed reception
#[derive(Debug, Clone, Copy)]
pub struct ErrorReport {
    /// Interrupt status reported by the radio
    pub irq: IrqStatus,
    /// RSSI in dBm at the time of the failure
    pub rssi_dbm: i16,
    /// SNR in dB at the time of the failure
    pub snr_db: f32,
    /// Length the radio reports for the aborted packet
    pub length: u8,
}

/// Outcome of one receive attempt
#[derive(Debug, Clone, Copy)]
pub enum RxOutcome {
    /// A packet was received and its header decoded
    Packet(PacketReport),
    /// The receive window elapsed without a packet; not an error
    Timeout,
    /// The radio flagged a reception failure (CRC, header, ...)
    Error(ErrorReport),
}

/// Single-channel receive gateway over an SX126x radio
pub struct Gateway<H: Hal> {
    driver: Sx126xDriver<H>,
    config: GatewayConfig,
    stats: GatewayStats,
    rx_buffer: [u8; RX_BUFFER_SIZE],
    started: Instant,
}

impl<H: Hal> Gateway<H> {
    /// Create a gateway over the given HAL. Call [`init`](Self::init)
    /// before receiving.
    pub fn new(hal: H, config: GatewayConfig) -> Self {
        Self {
            driver: Sx126xDriver::new(hal, XTAL_FREQ_HZ),
            config,
            stats: GatewayStats::default(),
            rx_buffer: [0u8; RX_BUFFER_SIZE],
            started: Instant::now(),
        }
    }

    /// Validate the configuration, probe the radio and configure it for
    /// fixed-parameter LoRa reception.
    pub fn init(&mut self) -> Result<(), GatewayError> {
        self.config.validate()?;

        self.driver.probe()?;
        info!("LoRa device found");

        self.driver.configure_lora_rx(
            self.config.tuned_frequency_hz(),
            self.config.mod_params(),
            self.config.packet_params(),
            self.config.sync_word(),
        )?;

        // Configuration register block, visible with RUST_LOG=debug
        self.driver.dump_registers(0x0700, 0x077F)?;

        for line in self.config.summary().lines() {
            info!("{line}");
        }
        info!("Receiver ready - RXBUFFER_SIZE {RX_BUFFER_SIZE}");
        Ok(())
    }

    /// Current counter values
    pub fn stats(&self) -> GatewayStats {
        self.stats
    }

    /// Payload bytes of the most recently reported packet
    pub fn payload(&self, report: &PacketReport) -> &[u8] {
        &self.rx_buffer[HEADER_LEN..HEADER_LEN + report.payload_len]
    }

    /// Run one receive attempt and classify its outcome.
    ///
    /// The packet counter increments exactly once per decoded packet and
    /// the error counter exactly once per non-timeout failure; a timeout
    /// changes neither.
    pub fn receive_one(&mut self) -> Result<RxOutcome, GatewayError> {
        self.driver.set_rx(self.config.rx_timeout())?;

        let Some(irq) = self.wait_for_irq()? else {
            // DIO1 never asserted; bring the radio back to a known state
            self.driver.set_standby(StandbyMode::RC)?;
            warn!("RX window expired without a radio interrupt");
            return Ok(RxOutcome::Timeout);
        };
        let rx_timestamp_ms = self.elapsed_ms();

        self.driver.clear_irq_status(IrqMaskBit::All as u16)?;

        if irq.timeout() {
            return Ok(RxOutcome::Timeout);
        }

        if irq.rx_done() && !irq.crc_err() && !irq.header_error() {
            let (len, offset) = self.driver.get_rx_buffer_status()?;
            let len = (len as usize).min(RX_BUFFER_SIZE);
            self.driver
                .read_buffer(offset, &mut self.rx_buffer[..len])?;
            let status = self.driver.get_lora_packet_status()?;
            let rx_done_timestamp_ms = self.elapsed_ms();

            return match PacketHeader::decode(&self.rx_buffer[..len]) {
                Ok((header, payload)) => {
                    self.stats.packets += 1;
                    Ok(RxOutcome::Packet(PacketReport {
                        header,
                        payload_len: payload.len(),
                        rssi_dbm: status.rssi_pkt_dbm,
                        snr_db: status.snr_pkt_db,
                        payload_crc: crc_ccitt(payload, CRC_CCITT_INIT),
                        irq,
                        rx_timestamp_ms,
                        rx_done_timestamp_ms,
                    }))
                }
                Err(e) => {
                    self.stats.errors += 1;
                    warn!("Received frame with undecodable header: {e}");
                    Ok(RxOutcome::Error(ErrorReport {
                        irq,
                        rssi_dbm: status.rssi_pkt_dbm,
                        snr_db: status.snr_pkt_db,
                        length: len as u8,
                    }))
                }
            };
        }

        // CRC error, header error, or an interrupt combination the
        // receive path does not expect
        self.stats.errors += 1;
        let status = self.driver.get_lora_packet_status()?;
        let (len, _) = self.driver.get_rx_buffer_status()?;
        Ok(RxOutcome::Error(ErrorReport {
            irq,
            rssi_dbm: status.rssi_pkt_dbm,
            snr_db: status.snr_pkt_db,
            length: len,
        }))
    }

    /// Receive forever, printing a report per packet and per error.
    ///
    /// Timeouts are silent. Returns only if the radio or the bus below it
    /// fails.
    pub fn run(&mut self) -> Result<(), GatewayError> {
        loop {
            match self.receive_one()? {
                RxOutcome::Packet(r) => {
                    let payload = &self.rx_buffer[HEADER_LEN..HEADER_LEN + r.payload_len];
                    report::print_packet(&r, payload, &self.stats, self.config.node_address);
                }
                RxOutcome::Timeout => {}
                RxOutcome::Error(r) => {
                    report::print_error(&r, &self.stats);
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
    }

    /// Poll DIO1 until it asserts, then read the interrupt status.
    ///
    /// The hardware RX timeout is routed to DIO1, so this normally ends
    /// through the radio. The software deadline (window plus one second)
    /// only triggers if the radio stops signalling altogether.
    fn wait_for_irq(&mut self) -> Result<Option<IrqStatus>, GatewayError> {
        let deadline = Instant::now() + self.config.rx_timeout() + Duration::from_secs(1);
        loop {
            if self.driver.irq_line_asserted()? {
                return Ok(Some(self.driver.get_irq_status()?));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(IRQ_POLL_INTERVAL);
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

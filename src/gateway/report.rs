//! # Console Diagnostics Report
//!
//! Plain-text packet and error reports on stdout. The summary lines use a
//! stable comma-separated layout so a serial log can be grepped or fed to
//! a spreadsheet, everything else is for humans watching the console.

use crate::gateway::{ErrorReport, GatewayStats, PacketReport};

/// Render a payload as printable ASCII, hex-escaping everything else.
pub fn ascii_render(payload: &[u8]) -> String {
    let mut out = String::with_capacity(payload.len());
    for &byte in payload {
        if (0x20..0x7F).contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str("\\x");
            out.push_str(&hex::encode([byte]));
        }
    }
    out
}

/// Comma-separated diagnostics summary for a received packet.
pub fn format_summary_line(report: &PacketReport, stats: &GatewayStats) -> String {
    format!(
        "CRC,{:X},RSSI,{}dBm,SNR,{}dB,Length,{},Packets,{},Errors,{},IRQreg,{:X}",
        report.payload_crc,
        report.rssi_dbm,
        report.snr_db,
        report.payload_len,
        stats.packets,
        stats.errors,
        report.irq.raw()
    )
}

/// Comma-separated diagnostics line for a failed reception.
pub fn format_error_line(report: &ErrorReport, stats: &GatewayStats) -> String {
    format!(
        "PacketError,RSSI,{}dBm,SNR,{}dB,Length,{},Packets,{},Errors,{},IRQreg,{:X}",
        report.rssi_dbm,
        report.snr_db,
        report.length,
        stats.packets,
        stats.errors,
        report.irq.raw()
    )
}

/// Print the full report block for a received packet.
pub fn print_packet(report: &PacketReport, payload: &[u8], stats: &GatewayStats, gateway_addr: u8) {
    println!();
    println!("-------------------------------------");
    println!("Packet length: {}", report.payload_len);
    println!("Destination: {}", report.header.destination);
    println!("Packet Type: {}", report.header.packet_type);
    println!("Source: {}", report.header.source);
    println!("SeqNo: {}", report.header.seq_number);
    println!("RXTimestamp: {}", report.rx_timestamp_ms);
    println!("RXDoneTimestamp: {}", report.rx_done_timestamp_ms);
    println!();
    println!("{}", ascii_render(payload));
    println!("{}", format_summary_line(report, stats));
    if report.header.destination == gateway_addr {
        println!("--> Packet is for gateway");
    }
    println!("-------------------------------------");
}

/// Print the report for a failed reception, including the IRQ flag names.
pub fn print_error(report: &ErrorReport, stats: &GatewayStats) {
    println!("{}", format_error_line(report, stats));
    println!("IRQ flags: {}", report.irq.flag_names().join(","));
}

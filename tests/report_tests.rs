//! Console report formatting tests.

use lora_gw::gateway::packet::{packet_type, PacketHeader};
use lora_gw::gateway::report::{ascii_render, format_error_line, format_summary_line};
use lora_gw::gateway::{ErrorReport, GatewayStats, PacketReport};
use lora_gw::radio::irq::IrqStatus;

fn sample_report() -> PacketReport {
    PacketReport {
        header: PacketHeader {
            destination: 1,
            packet_type: packet_type::DATA,
            source: 8,
            seq_number: 13,
        },
        payload_len: 10,
        rssi_dbm: -42,
        snr_db: 8.0,
        payload_crc: 0x4560,
        irq: IrqStatus::from(0x50),
        rx_timestamp_ms: 120_000,
        rx_done_timestamp_ms: 120_002,
    }
}

#[test]
fn test_summary_line_layout() {
    let stats = GatewayStats {
        packets: 1,
        errors: 0,
    };
    assert_eq!(
        format_summary_line(&sample_report(), &stats),
        "CRC,4560,RSSI,-42dBm,SNR,8dB,Length,10,Packets,1,Errors,0,IRQreg,50"
    );
}

#[test]
fn test_error_line_layout() {
    let report = ErrorReport {
        irq: IrqStatus::from(0x0242),
        rssi_dbm: -97,
        snr_db: -6.5,
        length: 23,
    };
    let stats = GatewayStats {
        packets: 4,
        errors: 2,
    };
    assert_eq!(
        format_error_line(&report, &stats),
        "PacketError,RSSI,-97dBm,SNR,-6.5dB,Length,23,Packets,4,Errors,2,IRQreg,242"
    );
}

#[test]
fn test_ascii_render_passes_printable_text() {
    assert_eq!(ascii_render(b"\\!TC/22.50"), "\\!TC/22.50");
}

#[test]
fn test_ascii_render_escapes_binary() {
    assert_eq!(ascii_render(&[0x00, b'A', 0xFF]), "\\x00A\\xff");
}

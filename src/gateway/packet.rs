//! # Addressed Packet Codec
//!
//! Every packet in the point-to-point network carries a 4-byte header in
//! front of the payload:
//!
//! ```text
//! ┌──────┐ ┌──────┐ ┌──────┐ ┌──────┐ ┌─────────────┐
//! │ Dest │ │ Type │ │ Src  │ │ Seq  │ │   Payload   │
//! │ (1B) │ │ (1B) │ │ (1B) │ │ (1B) │ │ (0-251 B)   │
//! └──────┘ └──────┘ └──────┘ └──────┘ └─────────────┘
//! ```
//!
//! The reported packet length is the payload length; the header is
//! stripped during decoding. The CRC printed in the diagnostics is a
//! CRC-16/CCITT over the payload bytes, computed host-side so the console
//! output can be compared end to end against the transmitting node.

use thiserror::Error;

/// Length of the addressing header in bytes
pub const HEADER_LEN: usize = 4;

/// CRC-16/CCITT polynomial
const CRC_CCITT_POLY: u16 = 0x1021;

/// Initial value for the payload CRC
pub const CRC_CCITT_INIT: u16 = 0xFFFF;

/// Packet type values shared across the network
pub mod packet_type {
    /// Application data
    pub const DATA: u8 = 0x10;
    /// Acknowledgement
    pub const ACK: u8 = 0x20;
}

/// Errors from decoding a received frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacketDecodeError {
    #[error("Frame too short for addressing header: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

/// Addressing header of a received packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Destination node address
    pub destination: u8,
    /// Packet type (see [`packet_type`])
    pub packet_type: u8,
    /// Source node address
    pub source: u8,
    /// Per-source sequence number
    pub seq_number: u8,
}

impl PacketHeader {
    /// Split a raw frame into its header and payload.
    pub fn decode(frame: &[u8]) -> Result<(Self, &[u8]), PacketDecodeError> {
        if frame.len() < HEADER_LEN {
            return Err(PacketDecodeError::TooShort {
                needed: HEADER_LEN,
                actual: frame.len(),
            });
        }

        let header = Self {
            destination: frame[0],
            packet_type: frame[1],
            source: frame[2],
            seq_number: frame[3],
        };
        Ok((header, &frame[HEADER_LEN..]))
    }
}

/// Calculate CRC-16/CCITT over `data`
///
/// Polynomial 0x1021, MSB-first, no reflection; `init` is 0xFFFF for the
/// payload CRC reported on the console.
pub fn crc_ccitt(data: &[u8], init: u16) -> u16 {
    let mut crc = init;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC_CCITT_POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_ccitt_check_value() {
        // CRC-16/CCITT-FALSE check value from the CRC catalogue
        assert_eq!(crc_ccitt(b"123456789", CRC_CCITT_INIT), 0x29B1);
    }

    #[test]
    fn test_crc_ccitt_empty_is_init() {
        assert_eq!(crc_ccitt(&[], CRC_CCITT_INIT), CRC_CCITT_INIT);
    }

    #[test]
    fn test_header_decode_splits_payload() {
        let frame = [1, packet_type::DATA, 8, 13, b'h', b'i'];
        let (header, payload) = PacketHeader::decode(&frame).unwrap();
        assert_eq!(header.destination, 1);
        assert_eq!(header.packet_type, packet_type::DATA);
        assert_eq!(header.source, 8);
        assert_eq!(header.seq_number, 13);
        assert_eq!(payload, b"hi");
    }

    #[test]
    fn test_header_decode_empty_payload() {
        let frame = [5, packet_type::ACK, 2, 0];
        let (header, payload) = PacketHeader::decode(&frame).unwrap();
        assert_eq!(header.packet_type, packet_type::ACK);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_header_decode_rejects_short_frame() {
        let err = PacketHeader::decode(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            PacketDecodeError::TooShort {
                needed: HEADER_LEN,
                actual: 3
            }
        );
    }
}

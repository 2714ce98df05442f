//! Interrupt mask and status register tests.

use lora_gw::radio::irq::{IrqMask, IrqMaskBit, IrqStatus};

#[test]
fn test_mask_combines_sources() {
    let mask = IrqMask::none()
        .combine(IrqMaskBit::RxDone)
        .combine(IrqMaskBit::Timeout);
    assert_eq!(u16::from(mask), 0x0202);
}

#[test]
fn test_mask_all_and_none() {
    assert_eq!(u16::from(IrqMask::all()), 0xFFFF);
    assert_eq!(u16::from(IrqMask::none()), 0x0000);
}

#[test]
fn test_status_bit_accessors() {
    let status = IrqStatus::from(0x0262);
    assert!(status.rx_done());
    assert!(status.crc_err());
    assert!(status.header_error());
    assert!(status.timeout());
    assert!(!status.tx_done());
    assert!(!status.header_valid());
    assert!(status.has_any());

    assert!(!IrqStatus::from(0x0000).has_any());
}

#[test]
fn test_flag_names_lsb_first() {
    let status = IrqStatus::from(0x0242);
    assert_eq!(
        status.flag_names(),
        vec!["RX_DONE", "CRC_ERROR", "RX_TX_TIMEOUT"]
    );
    assert!(IrqStatus::from(0).flag_names().is_empty());
}

#[test]
fn test_raw_round_trip() {
    let status = IrqStatus::from(0x1234);
    assert_eq!(status.raw(), 0x1234);
    assert_eq!(u16::from(status), 0x1234);
}

//! Gateway configuration tests: presets, validation and file loading.

use std::io::Write;

use lora_gw::gateway::config::{ConfigError, GatewayConfig};
use lora_gw::radio::modulation::{CodingRate, LoRaBandwidth, SpreadingFactor, SyncWords};

#[test]
fn test_eu868_preset() {
    let config = GatewayConfig::eu868();
    assert_eq!(config.frequency_hz, 868_100_000);
    assert_eq!(config.spreading_factor, SpreadingFactor::SF12);
    assert_eq!(config.bandwidth, LoRaBandwidth::BW125);
    assert_eq!(config.coding_rate, CodingRate::CR4_5);
    assert_eq!(config.node_address, 1);
    config.validate().unwrap();
}

#[test]
fn test_us915_preset() {
    let config = GatewayConfig::us915();
    assert_eq!(config.frequency_hz, 902_300_000);
    assert_eq!(config.spreading_factor, SpreadingFactor::SF7);
    assert_eq!(config.bandwidth, LoRaBandwidth::BW500);
    config.validate().unwrap();
}

#[test]
fn test_preset_lookup_is_case_insensitive() {
    assert_eq!(
        GatewayConfig::preset("EU868").unwrap().frequency_hz,
        868_100_000
    );
    assert!(matches!(
        GatewayConfig::preset("eu433"),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_validation_rejects_sf12_with_bw500() {
    let mut config = GatewayConfig::eu868();
    config.bandwidth = LoRaBandwidth::BW500;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validation_rejects_short_rx_timeout() {
    let mut config = GatewayConfig::eu868();
    config.rx_timeout_ms = 50;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validation_rejects_broadcast_node_address() {
    let mut config = GatewayConfig::eu868();
    config.node_address = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_tuned_frequency_applies_offset() {
    let mut config = GatewayConfig::eu868();
    config.frequency_offset_hz = -5_000;
    assert_eq!(config.tuned_frequency_hz(), 868_095_000);
}

#[test]
fn test_mod_params_derive_ldro() {
    // SF12 on 125kHz needs low data rate optimization, SF7 does not
    let eu = GatewayConfig::eu868();
    assert!(eu.mod_params().low_data_rate_optimize);

    let us = GatewayConfig::us915();
    assert!(!us.mod_params().low_data_rate_optimize);
}

#[test]
fn test_sync_word_follows_network_type() {
    let mut config = GatewayConfig::eu868();
    assert_eq!(config.sync_word(), SyncWords::PRIVATE);
    config.public_network = true;
    assert_eq!(config.sync_word(), SyncWords::PUBLIC);
}

#[test]
fn test_from_file_with_minimal_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "frequency_hz": 869525000,
            "spreading_factor": "SF10",
            "bandwidth": "BW125",
            "coding_rate": "CR4_6",
            "node_address": 1,
            "rx_timeout_ms": 10000
        }}"#
    )
    .unwrap();

    let config = GatewayConfig::from_file(file.path()).unwrap();
    assert_eq!(config.frequency_hz, 869_525_000);
    assert_eq!(config.spreading_factor, SpreadingFactor::SF10);
    assert_eq!(config.coding_rate, CodingRate::CR4_6);
    // Omitted fields take their defaults
    assert_eq!(config.frequency_offset_hz, 0);
    assert_eq!(config.spi_bus, 0);
    assert!(!config.public_network);
    assert_eq!(config.pins.busy, 25);
    config.validate().unwrap();
}

#[test]
fn test_from_file_rejects_malformed_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    assert!(matches!(
        GatewayConfig::from_file(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = GatewayConfig::as923();
    let json = serde_json::to_string(&config).unwrap();
    let loaded: GatewayConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.frequency_hz, config.frequency_hz);
    assert_eq!(loaded.spreading_factor, config.spreading_factor);
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use lora_gw::gateway::config::GatewayConfig;
use lora_gw::init_logger;
use lora_gw::radio::modulation::{CodingRate, LoRaBandwidth, SpreadingFactor};

#[derive(Parser)]
#[command(name = "lora-gw")]
#[command(about = "Single-channel LoRa receive gateway for SX126x radios")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Regional preset used when no config file is given (eu868, us915, as923)
    #[arg(long, default_value = "eu868")]
    region: String,

    /// Operating frequency in Hz
    #[arg(long)]
    frequency: Option<u32>,

    /// Spreading factor (SF5..SF12)
    #[arg(long)]
    spreading_factor: Option<SpreadingFactor>,

    /// Bandwidth in kHz (e.g. 125, 250, 500)
    #[arg(long)]
    bandwidth: Option<LoRaBandwidth>,

    /// Coding rate (4/5..4/8)
    #[arg(long)]
    coding_rate: Option<CodingRate>,

    /// This gateway's node address
    #[arg(long)]
    node_address: Option<u8>,

    /// RX timeout per receive attempt in milliseconds
    #[arg(long)]
    rx_timeout_ms: Option<u64>,

    /// SPI bus the radio is wired to
    #[arg(long)]
    spi_bus: Option<u8>,
}

fn resolve_config(cli: &Cli) -> anyhow::Result<GatewayConfig> {
    let mut config = match &cli.config {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("loading config file {}", path.display()))?,
        None => GatewayConfig::preset(&cli.region)?,
    };

    if let Some(frequency) = cli.frequency {
        config.frequency_hz = frequency;
    }
    if let Some(sf) = cli.spreading_factor {
        config.spreading_factor = sf;
    }
    if let Some(bw) = cli.bandwidth {
        config.bandwidth = bw;
    }
    if let Some(cr) = cli.coding_rate {
        config.coding_rate = cr;
    }
    if let Some(addr) = cli.node_address {
        config.node_address = addr;
    }
    if let Some(timeout) = cli.rx_timeout_ms {
        config.rx_timeout_ms = timeout;
    }
    if let Some(bus) = cli.spi_bus {
        config.spi_bus = bus;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(feature = "raspberry-pi")]
fn run(config: GatewayConfig) -> anyhow::Result<()> {
    use std::thread;
    use std::time::Duration;

    use log::error;

    use lora_gw::gateway::Gateway;
    use lora_gw::radio::driver::DriverError;
    use lora_gw::radio::hal::raspberry_pi::{GpioPins, RaspberryPiHal};
    use lora_gw::GatewayError;

    let pins = GpioPins {
        busy: config.pins.busy,
        dio1: config.pins.dio1,
        reset: config.pins.reset,
    };
    let mut hal = RaspberryPiHal::new(config.spi_bus, &pins)
        .context("initializing the Raspberry Pi HAL")?;
    if pins.reset.is_some() {
        hal.reset_radio().context("resetting the radio")?;
    }

    let mut gateway = Gateway::new(hal, config);
    match gateway.init() {
        Ok(()) => {}
        Err(GatewayError::Driver(DriverError::NoDevice)) => {
            error!("No device responding");
            // Hold here instead of exiting so a supervisor does not
            // restart-loop the process against missing hardware.
            loop {
                thread::sleep(Duration::from_secs(60));
            }
        }
        Err(e) => return Err(e.into()),
    }

    gateway.run()?;
    Ok(())
}

#[cfg(not(feature = "raspberry-pi"))]
fn run(_config: GatewayConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "this build has no hardware support; rebuild with --features raspberry-pi"
    );
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    run(config)
}

//! Configuration loading
//!
//! The configuration is compiled in from `sink.toml` (validated on the host
//! by `build.rs`) and parsed at startup by the no_std parser in
//! `pixelwire-core`.

use defmt::*;
use pixelwire_core::config::{parse_config, SinkConfig};
use pixelwire_hal_rp2040::GpioAllocator;

/// Embedded configuration (compiled into firmware)
/// Edit sink.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../sink.toml");

/// Parse and check the embedded configuration
///
/// Falls back to [`SinkConfig::default`] if the text does not parse, does
/// not validate, or assigns one pin twice.
pub fn load_config() -> SinkConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse sink.toml: {:?}, using defaults", e);
            return SinkConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        error!("Invalid sink.toml: {:?}, using defaults", e);
        return SinkConfig::default();
    }

    let mut allocator = GpioAllocator::new();
    if let Err(e) = allocator.allocate_config(&config) {
        error!("Pin conflict in sink.toml: {:?}, using defaults", e);
        return SinkConfig::default();
    }

    config
}

/// Log the effective configuration
pub fn log_config_summary(config: &SinkConfig) {
    info!(
        "Config: {} outputs, {} LEDs, brightness {}",
        config.outputs.len(),
        config.total_leds(),
        config.brightness
    );
    debug!(
        "Serial: {} baud, tx=gpio{} rx=gpio{}",
        config.serial.baud_rate, config.serial.tx_pin.pin, config.serial.rx_pin.pin
    );
    debug!(
        "Status LED gpio{}, heartbeat {}/{} ms, idle timeout {} ms",
        config.status_led.pin,
        config.heartbeat.on_ms,
        config.heartbeat.period_ms,
        config.idle_timeout_ms
    );
    if let Some(matrix) = &config.matrix {
        debug!(
            "Matrix {}x{} {:?}, start offset {}",
            matrix.width, matrix.height, matrix.layout, config.start_offset
        );
    }
    for output in &config.outputs {
        debug!(
            "Output {}: gpio{}, {} LEDs, settle {} us",
            output.name.as_str(),
            output.pin.pin,
            output.leds,
            output.settle_us
        );
    }
}

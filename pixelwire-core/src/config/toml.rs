//! Simple TOML parser for sink configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the sink configuration. It does NOT support full TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - [output.NAME] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys outside section headers

use heapless::String as HString;

use super::types::{Layout, MatrixConfig, OutputConfig, PinConfig, SinkConfig, MAX_NAME_LEN};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// Invalid pin string
    InvalidPin,
}

/// Current parsing context
#[derive(Debug, Clone)]
enum Section {
    Root,
    Serial,
    StatusLed,
    Heartbeat,
    Matrix,
    Output,
}

/// Parse TOML text into a SinkConfig
///
/// Anything not mentioned keeps its default. Outputs are the exception: if
/// the text declares any `[output.NAME]` section, only the declared outputs
/// are used, in the order they appear, and the default matrix is dropped
/// unless a `[matrix]` section describes the new layout.
pub fn parse_config(input: &str) -> Result<SinkConfig, ParseError> {
    let mut config = SinkConfig::new();
    let mut section = Section::Root;
    let mut current_output: Option<OutputConfig> = None;
    let mut outputs_declared = false;
    let mut matrix_declared = false;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            save_output(&mut config, &mut current_output)?;

            section = parse_section_header(&line[1..line.len() - 1])?;
            match &section {
                Section::Output => {
                    if !outputs_declared {
                        config.outputs.clear();
                        outputs_declared = true;
                    }
                    let name = output_name(&line[1..line.len() - 1])?;
                    current_output = Some(OutputConfig {
                        name,
                        ..OutputConfig::default()
                    });
                }
                Section::Matrix => {
                    config.matrix.get_or_insert_with(MatrixConfig::default);
                    matrix_declared = true;
                }
                _ => {}
            }
            continue;
        }

        // Parse key = value
        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&section, key, value, &mut config, &mut current_output)?;
        }
    }

    save_output(&mut config, &mut current_output)?;

    if outputs_declared && !matrix_declared {
        config.matrix = None;
    }

    Ok(config)
}

/// Parse section header like "serial" or "output.top"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();

    if let Some((kind, name)) = header.split_once('.') {
        return match kind.trim() {
            "output" if !name.trim().is_empty() && !name.contains('.') => Ok(Section::Output),
            _ => Err(ParseError::InvalidSection),
        };
    }

    match header {
        "serial" => Ok(Section::Serial),
        "status_led" => Ok(Section::StatusLed),
        "heartbeat" => Ok(Section::Heartbeat),
        "matrix" => Ok(Section::Matrix),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Name part of an "output.NAME" header
fn output_name(header: &str) -> Result<HString<MAX_NAME_LEN>, ParseError> {
    let (_, name) = header
        .trim()
        .split_once('.')
        .ok_or(ParseError::InvalidSection)?;
    let name = parse_string(name.trim())?;
    HString::try_from(name).map_err(|_| ParseError::InvalidSection)
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value, allowing `_` separators
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a pin string like "gpio11" or "!gpio12"
///
/// `!` marks an active-low pin. Only the status LED can be inverted.
fn parse_pin(value: &str) -> Result<PinConfig, ParseError> {
    let value = parse_string(value)?;
    let (inverted, s) = match value.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    // Parse "gpioNN"
    let num = s.strip_prefix("gpio").ok_or(ParseError::InvalidPin)?;
    let pin: u8 = num.parse().map_err(|_| ParseError::InvalidPin)?;

    Ok(PinConfig { pin, inverted })
}

/// Parse a data or serial pin, which has no active-low form
fn parse_plain_pin(value: &str) -> Result<PinConfig, ParseError> {
    let pin = parse_pin(value)?;
    if pin.inverted {
        return Err(ParseError::InvalidPin);
    }
    Ok(pin)
}

/// Parse matrix layout
fn parse_layout(value: &str) -> Result<Layout, ParseError> {
    match parse_string(value)? {
        "row_major" | "RowMajor" => Ok(Layout::RowMajor),
        "serpentine" | "Serpentine" | "zigzag" => Ok(Layout::Serpentine),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Apply a key-value pair to the current section
fn apply_value(
    section: &Section,
    key: &str,
    value: &str,
    config: &mut SinkConfig,
    current_output: &mut Option<OutputConfig>,
) -> Result<(), ParseError> {
    match section {
        Section::Root => match key {
            "version" => config.version = parse_int(value)?,
            "brightness" => config.brightness = parse_int(value)?,
            "idle_timeout_ms" => config.idle_timeout_ms = parse_int(value)?,
            "start_offset" => config.start_offset = parse_int(value)?,
            _ => {}
        },
        Section::Serial => match key {
            "baud" | "baud_rate" => config.serial.baud_rate = parse_int(value)?,
            "rx_pin" => config.serial.rx_pin = parse_plain_pin(value)?,
            "tx_pin" => config.serial.tx_pin = parse_plain_pin(value)?,
            _ => {}
        },
        Section::StatusLed => {
            if key == "pin" {
                config.status_led = parse_pin(value)?;
            }
        }
        Section::Heartbeat => match key {
            "period_ms" => config.heartbeat.period_ms = parse_int(value)?,
            "on_ms" => config.heartbeat.on_ms = parse_int(value)?,
            _ => {}
        },
        Section::Matrix => {
            let matrix = config.matrix.get_or_insert_with(MatrixConfig::default);
            match key {
                "width" => matrix.width = parse_int(value)?,
                "height" => matrix.height = parse_int(value)?,
                "layout" => matrix.layout = parse_layout(value)?,
                _ => {}
            }
        }
        Section::Output => {
            if let Some(output) = current_output {
                match key {
                    "pin" => output.pin = parse_plain_pin(value)?,
                    "leds" => output.leds = parse_int(value)?,
                    "settle_us" => output.settle_us = parse_int(value)?,
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

/// Push the output being built, if any
fn save_output(
    config: &mut SinkConfig,
    current_output: &mut Option<OutputConfig>,
) -> Result<(), ParseError> {
    if let Some(output) = current_output.take() {
        config
            .outputs
            .push(output)
            .map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(())
}

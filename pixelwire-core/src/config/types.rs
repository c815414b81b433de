//! Configuration type definitions
//!
//! These types describe one sink: serial link, status LED, LED outputs and
//! the optional matrix geometry they form.

use heapless::{String, Vec};
use pixelwire_protocol::MAX_PIXELS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use crate::pixels::MAX_OUTPUTS;

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum output name length
pub const MAX_NAME_LEN: usize = 16;

/// Default status LED pin on the sink board
pub const DEFAULT_STATUS_LED_PIN: u8 = 17;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted), status LED only
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
        }
    }
}

/// Serial link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// UART RX pin (data from the host)
    pub rx_pin: PinConfig,
    /// UART TX pin
    pub tx_pin: PinConfig,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            rx_pin: PinConfig::new(1),
            tx_pin: PinConfig::new(0),
        }
    }
}

/// Status LED duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeartbeatConfig {
    /// Full cycle length; 0 disables the heartbeat
    pub period_ms: u32,
    /// On time at the start of each cycle
    pub on_ms: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            on_ms: 100,
        }
    }
}

/// How matrix coordinates map onto the LED chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Layout {
    /// Every row runs left to right
    #[default]
    RowMajor,
    /// Odd rows run right to left
    Serpentine,
}

/// Matrix geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatrixConfig {
    pub width: u16,
    pub height: u16,
    pub layout: Layout,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            width: 49,
            height: 39,
            layout: Layout::RowMajor,
        }
    }
}

impl MatrixConfig {
    /// Number of LEDs in the matrix
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// One LED data line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputConfig {
    /// Output name (e.g., "top", "middle")
    pub name: String<MAX_NAME_LEN>,
    /// Data pin
    pub pin: PinConfig,
    /// LEDs on this line
    pub leds: u16,
    /// Pause after transmitting this output, in microseconds
    pub settle_us: u32,
}

impl OutputConfig {
    /// Create an output with no settle delay
    pub fn new(name: &str, pin: u8, leds: u16) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            pin: PinConfig::new(pin),
            leds,
            settle_us: 0,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No outputs configured
    NoOutputs,
    /// An output has no LEDs
    EmptyOutput { index: usize },
    /// Total LEDs exceed [`MAX_PIXELS`]
    TooManyPixels { total: usize },
    /// Start offset is not inside the buffer
    StartOffsetOutOfRange { offset: u16, capacity: usize },
    /// Matrix area differs from the LED total
    MatrixMismatch { area: usize, total: usize },
    /// Heartbeat on time is longer than its period
    HeartbeatTooLong,
    /// Unsupported configuration version
    VersionMismatch(u8),
}

/// Complete sink configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SinkConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Serial link
    pub serial: SerialConfig,
    /// Status LED pin
    pub status_led: PinConfig,
    /// Global LED brightness (255 = full)
    pub brightness: u8,
    /// Status LED duty cycle
    pub heartbeat: HeartbeatConfig,
    /// Reset a stalled partial frame after this long; 0 disables
    pub idle_timeout_ms: u32,
    /// First pixel written by a payload
    pub start_offset: u16,
    /// Matrix geometry, if the outputs form one
    pub matrix: Option<MatrixConfig>,
    /// LED outputs, in buffer order
    pub outputs: Vec<OutputConfig, MAX_OUTPUTS>,
}

impl Default for SinkConfig {
    /// 49x39 matrix split across three outputs of 13 rows each
    fn default() -> Self {
        let mut outputs = Vec::new();
        for (name, pin) in [("top", 2), ("middle", 3), ("bottom", 4)] {
            // Cannot fail: three outputs
            let _ = outputs.push(OutputConfig::new(name, pin, 13 * 49));
        }

        Self {
            version: CONFIG_VERSION,
            serial: SerialConfig::default(),
            status_led: PinConfig::new(DEFAULT_STATUS_LED_PIN),
            brightness: 255,
            heartbeat: HeartbeatConfig::default(),
            idle_timeout_ms: 500,
            start_offset: 0,
            matrix: Some(MatrixConfig::default()),
            outputs,
        }
    }
}

impl SinkConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Total LEDs across all outputs
    pub fn total_leds(&self) -> usize {
        self.outputs.iter().map(|o| o.leds as usize).sum()
    }

    /// Per-output LED counts, in buffer order
    pub fn led_counts(&self) -> Vec<u16, MAX_OUTPUTS> {
        self.outputs.iter().map(|o| o.leds).collect()
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch(self.version));
        }
        if self.outputs.is_empty() {
            return Err(ConfigError::NoOutputs);
        }
        if let Some(index) = self.outputs.iter().position(|o| o.leds == 0) {
            return Err(ConfigError::EmptyOutput { index });
        }

        let total = self.total_leds();
        if total > MAX_PIXELS {
            return Err(ConfigError::TooManyPixels { total });
        }
        if self.start_offset as usize >= total {
            return Err(ConfigError::StartOffsetOutOfRange {
                offset: self.start_offset,
                capacity: total,
            });
        }
        if let Some(matrix) = &self.matrix {
            if matrix.area() != total {
                return Err(ConfigError::MatrixMismatch {
                    area: matrix.area(),
                    total,
                });
            }
        }
        if self.heartbeat.on_ms > self.heartbeat.period_ms {
            return Err(ConfigError::HeartbeatTooLong);
        }
        Ok(())
    }
}

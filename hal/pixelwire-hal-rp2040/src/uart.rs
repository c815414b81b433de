//! UART pin mapping
//!
//! RP2040 has two UART peripherals (UART0 and UART1), each routable to a
//! fixed set of GPIO pairs.

use embassy_rp::uart::{
    Config as RpUartConfig, DataBits as RpDataBits, Parity as RpParity, StopBits as RpStopBits,
};
use pixelwire_hal::{DataBits, Parity, StopBits, UartConfig};

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart0,
    Uart1,
}

/// Role of a pin within a UART
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartRole {
    Tx,
    Rx,
}

/// Determine which UART, and in which role, can use a given GPIO pin
pub fn gpio_to_uart(gpio: u8) -> Option<(UartId, UartRole)> {
    // UART0: GPIO 0/1, 12/13, 16/17, 28/29
    // UART1: GPIO 4/5, 8/9, 20/21, 24/25
    let id = match gpio {
        0 | 1 | 12 | 13 | 16 | 17 | 28 | 29 => UartId::Uart0,
        4 | 5 | 8 | 9 | 20 | 21 | 24 | 25 => UartId::Uart1,
        _ => return None,
    };
    let role = if gpio % 2 == 0 {
        UartRole::Tx
    } else {
        UartRole::Rx
    };
    Some((id, role))
}

/// Find the UART that can drive this TX/RX pin pair
pub fn uart_for_pins(tx: u8, rx: u8) -> Option<UartId> {
    match (gpio_to_uart(tx)?, gpio_to_uart(rx)?) {
        ((tx_id, UartRole::Tx), (rx_id, UartRole::Rx)) if tx_id == rx_id => Some(tx_id),
        _ => None,
    }
}

/// Convert the shared UART settings to embassy's
pub fn to_rp_config(config: &UartConfig) -> RpUartConfig {
    let mut rp = RpUartConfig::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => RpDataBits::DataBits7,
        DataBits::Eight => RpDataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => RpParity::ParityNone,
        Parity::Even => RpParity::ParityEven,
        Parity::Odd => RpParity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => RpStopBits::STOP1,
        StopBits::Two => RpStopBits::STOP2,
    };
    rp
}

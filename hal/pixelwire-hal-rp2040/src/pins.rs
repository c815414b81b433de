//! Config-driven pin lookup
//!
//! Pin numbers come from `sink.toml`, but embassy hands out every GPIO as
//! its own type. `PinBank` keeps the typed pins and converts them on
//! request: to a type-erased output, to a PIO pin, or into a UART.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{PIO0, PIO1, UART0, UART1};
use embassy_rp::pio::{Common, Instance, Pin as PioPin};
use embassy_rp::uart::{Blocking, Config as RpUartConfig, Uart};
use embassy_rp::{Peri, Peripherals};

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: u8 = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pins cannot be routed to the requested peripheral
    WrongFunction,
}

/// Peripherals left over after the GPIOs move into the bank
pub struct RemainingPeripherals {
    pub pio0: Peri<'static, PIO0>,
    pub pio1: Peri<'static, PIO1>,
    pub uart0: Peri<'static, UART0>,
    pub uart1: Peri<'static, UART1>,
}

macro_rules! pin_bank {
    ($($n:literal => $field:ident: $pin:ident),* $(,)?) => {
        /// Every GPIO, taken by number
        pub struct PinBank {
            $($field: Option<Peri<'static, embassy_rp::peripherals::$pin>>,)*
        }

        impl PinBank {
            /// Move all GPIOs out of the peripherals
            pub fn from_peripherals(p: Peripherals) -> (Self, RemainingPeripherals) {
                let bank = Self {
                    $($field: Some(p.$pin),)*
                };
                let remaining = RemainingPeripherals {
                    pio0: p.PIO0,
                    pio1: p.PIO1,
                    uart0: p.UART0,
                    uart1: p.UART1,
                };
                (bank, remaining)
            }

            /// Take a pin as a plain GPIO
            pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
                match pin_num {
                    $($n => self.$field.take().map(Into::into).ok_or(PinError::AlreadyTaken),)*
                    _ => Err(PinError::InvalidPin),
                }
            }

            /// Take a pin and hand it to a PIO block
            pub fn take_pio<'d, PIO: Instance>(
                &mut self,
                common: &mut Common<'d, PIO>,
                pin_num: u8,
            ) -> Result<PioPin<'d, PIO>, PinError> {
                match pin_num {
                    $($n => self
                        .$field
                        .take()
                        .map(|pin| common.make_pio_pin(pin))
                        .ok_or(PinError::AlreadyTaken),)*
                    _ => Err(PinError::InvalidPin),
                }
            }

            /// Check if a pin is still in the bank
            pub fn is_available(&self, pin_num: u8) -> bool {
                match pin_num {
                    $($n => self.$field.is_some(),)*
                    _ => false,
                }
            }
        }
    };
}

pin_bank! {
    0 => pin0: PIN_0,
    1 => pin1: PIN_1,
    2 => pin2: PIN_2,
    3 => pin3: PIN_3,
    4 => pin4: PIN_4,
    5 => pin5: PIN_5,
    6 => pin6: PIN_6,
    7 => pin7: PIN_7,
    8 => pin8: PIN_8,
    9 => pin9: PIN_9,
    10 => pin10: PIN_10,
    11 => pin11: PIN_11,
    12 => pin12: PIN_12,
    13 => pin13: PIN_13,
    14 => pin14: PIN_14,
    15 => pin15: PIN_15,
    16 => pin16: PIN_16,
    17 => pin17: PIN_17,
    18 => pin18: PIN_18,
    19 => pin19: PIN_19,
    20 => pin20: PIN_20,
    21 => pin21: PIN_21,
    22 => pin22: PIN_22,
    23 => pin23: PIN_23,
    24 => pin24: PIN_24,
    25 => pin25: PIN_25,
    26 => pin26: PIN_26,
    27 => pin27: PIN_27,
    28 => pin28: PIN_28,
    29 => pin29: PIN_29,
}

/// Take a TX/RX pair, giving TX back if RX is gone
macro_rules! take_pair {
    ($bank:expr, $tx:ident, $rx:ident) => {{
        let tx = $bank.$tx.take().ok_or(PinError::AlreadyTaken)?;
        match $bank.$rx.take() {
            Some(rx) => Ok((tx, rx)),
            None => {
                $bank.$tx = Some(tx);
                Err(PinError::AlreadyTaken)
            }
        }
    }};
}

impl PinBank {
    /// Build a blocking UART0 on a TX/RX pair
    pub fn take_uart0(
        &mut self,
        uart: Peri<'static, UART0>,
        tx: u8,
        rx: u8,
        config: RpUartConfig,
    ) -> Result<Uart<'static, Blocking>, PinError> {
        match (tx, rx) {
            (0, 1) => take_pair!(self, pin0, pin1)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            (12, 13) => take_pair!(self, pin12, pin13)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            (16, 17) => take_pair!(self, pin16, pin17)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            (28, 29) => take_pair!(self, pin28, pin29)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            _ => Err(PinError::WrongFunction),
        }
    }

    /// Build a blocking UART1 on a TX/RX pair
    pub fn take_uart1(
        &mut self,
        uart: Peri<'static, UART1>,
        tx: u8,
        rx: u8,
        config: RpUartConfig,
    ) -> Result<Uart<'static, Blocking>, PinError> {
        match (tx, rx) {
            (4, 5) => take_pair!(self, pin4, pin5)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            (8, 9) => take_pair!(self, pin8, pin9)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            (20, 21) => take_pair!(self, pin20, pin21)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            (24, 25) => take_pair!(self, pin24, pin25)
                .map(|(tx, rx)| Uart::new_blocking(uart, tx, rx, config)),
            _ => Err(PinError::WrongFunction),
        }
    }
}

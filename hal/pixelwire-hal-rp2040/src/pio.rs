//! WS2812 PIO timing
//!
//! Each data bit is 10 PIO cycles long: high for `T1`, then high or low
//! for `T2` depending on the bit, then low for `T3`. Running the state
//! machine at `BIT_RATE_HZ * CYCLES_PER_BIT` gives the 1.25µs bit period
//! the LEDs expect.

use smart_leds::RGB8;

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// WS2812 data rate
pub const BIT_RATE_HZ: u32 = 800_000;

/// Cycles the line is high at the start of every bit
pub const T1: u8 = 2;
/// Cycles that carry the bit value
pub const T2: u8 = 5;
/// Cycles the line is low at the end of every bit
pub const T3: u8 = 3;

/// PIO cycles per transmitted bit
pub const CYCLES_PER_BIT: u32 = (T1 + T2 + T3) as u32;

/// Low time that latches the shifted data into the LEDs
///
/// Older WS2812 parts latch after 50µs; WS2812B-V5 needs 280µs.
pub const RESET_US: u32 = 300;

/// Calculate the 16.8 fixed-point clock divider for a bit rate
///
/// The state machine must run at `bit_rate_hz * CYCLES_PER_BIT`, so:
/// divider = SYS_CLK / (bit_rate * CYCLES_PER_BIT)
///
/// Returns (integer_part, fractional_part).
pub fn calc_clock_divider(bit_rate_hz: u32) -> (u16, u8) {
    if bit_rate_hz == 0 {
        return (0xFFFF, 0xFF);
    }

    let divisor = bit_rate_hz as u64 * CYCLES_PER_BIT as u64;
    let divider_x256 = (SYS_CLK_HZ as u64 * 256) / divisor;

    let int_part = (divider_x256 / 256).min(0xFFFF) as u16;
    let frac_part = (divider_x256 % 256) as u8;

    (int_part, frac_part)
}

/// Pack a pixel into the word pushed to the TX FIFO
///
/// The LEDs take green first. The state machine shifts out the top 24
/// bits, most significant first.
pub fn grb_word(pixel: RGB8) -> u32 {
    ((pixel.g as u32) << 24) | ((pixel.r as u32) << 16) | ((pixel.b as u32) << 8)
}

/// Time needed to clock out `pixels` LEDs, in microseconds
pub fn transmit_time_us(pixels: usize) -> u32 {
    let bits = pixels as u64 * 24;
    ((bits * 1_000_000).div_ceil(BIT_RATE_HZ as u64)).min(u32::MAX as u64) as u32
}

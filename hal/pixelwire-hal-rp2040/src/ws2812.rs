//! PIO-based WS2812 driver
//!
//! One state machine drives every LED output. Before an output is written
//! the state machine is pointed at that output's pin; the other data lines
//! stay low. Outputs are therefore written one after another, never
//! concurrently.

use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, Pin as PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_time::{block_for, Duration};
use fixed::types::U24F8;
use heapless::Vec;
use pixelwire_core::pixels::{Segment, MAX_OUTPUTS};
use pixelwire_core::traits::{DisplayDriver, DisplayError};
use smart_leds::{brightness, RGB8};

use crate::pio::{calc_clock_divider, grb_word, transmit_time_us, BIT_RATE_HZ, RESET_US};

/// One data line
struct Channel<'d, PIO: Instance> {
    /// Held so the pin stays routed to the PIO block
    _pin: PioPin<'d, PIO>,
    config: Config<'d, PIO>,
    settle_us: u32,
}

/// WS2812 outputs sharing one PIO state machine
pub struct Ws2812Bank<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    channels: Vec<Channel<'d, PIO>, MAX_OUTPUTS>,
    /// Channel the state machine currently drives
    active: Option<usize>,
    brightness: u8,
}

impl<'d, PIO: Instance, const SM: usize> Ws2812Bank<'d, PIO, SM> {
    /// Load the WS2812 program and prepare one channel per output
    ///
    /// `outputs` yields each data pin with its settle delay in
    /// microseconds, in output order. Outputs past [`MAX_OUTPUTS`] are
    /// ignored.
    pub fn new<I>(common: &mut Common<'d, PIO>, mut sm: StateMachine<'d, PIO, SM>, outputs: I) -> Self
    where
        I: IntoIterator<Item = (PioPin<'d, PIO>, u32)>,
    {
        // Each bit: T3 low, T1 high, then T2 high for a one or low for a zero
        let prg = pio::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "out x, 1 side 0 [2]",
            "jmp !x do_zero side 1 [1]",
            "jmp bitloop side 1 [4]",
            "do_zero:",
            "nop side 0 [4]",
            ".wrap"
        );
        let installed = common.load_program(&prg.program);

        let (int_part, frac_part) = calc_clock_divider(BIT_RATE_HZ);
        let divider = U24F8::from_bits(((int_part as u32) << 8) | frac_part as u32);

        let mut channels = Vec::new();
        for (pin, settle_us) in outputs.into_iter().take(MAX_OUTPUTS) {
            let mut cfg = Config::default();
            cfg.use_program(&installed, &[&pin]);
            cfg.clock_divider = divider;
            cfg.fifo_join = FifoJoin::TxOnly;
            cfg.shift_out = ShiftConfig {
                auto_fill: true,
                threshold: 24,
                direction: ShiftDirection::Left,
            };

            sm.set_pin_dirs(PioDirection::Out, &[&pin]);

            // Cannot fail: bounded by take() above
            let _ = channels.push(Channel {
                _pin: pin,
                config: cfg,
                settle_us,
            });
        }

        Self {
            sm,
            channels,
            active: None,
            brightness: 255,
        }
    }

    /// Number of outputs
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Current brightness scale
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Point the state machine at an output
    fn select(&mut self, index: usize) {
        if self.active == Some(index) {
            return;
        }
        self.sm.set_enable(false);
        self.sm.set_config(&self.channels[index].config);
        self.sm.set_enable(true);
        self.active = Some(index);
    }

    /// Wait until the last pixel is out and the LEDs have latched
    fn latch(&mut self, index: usize) {
        while !self.sm.tx().empty() {}
        // The final word may still be shifting out
        let tail_us = transmit_time_us(1) + RESET_US + self.channels[index].settle_us;
        block_for(Duration::from_micros(tail_us as u64));
    }
}

impl<PIO: Instance, const SM: usize> DisplayDriver for Ws2812Bank<'_, PIO, SM> {
    fn push_segment(&mut self, segment: &Segment, pixels: &[RGB8]) -> Result<(), DisplayError> {
        let index = segment.output as usize;
        if index >= self.channels.len() {
            return Err(DisplayError::InvalidOutput(segment.output));
        }

        self.select(index);
        for pixel in brightness(pixels.iter().copied(), self.brightness) {
            let word = grb_word(pixel);
            while !self.sm.tx().try_push(word) {}
        }
        self.latch(index);
        Ok(())
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }
}

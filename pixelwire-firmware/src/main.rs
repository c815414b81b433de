//! Pixelwire - Serial-to-LED Matrix Sink
//!
//! Firmware for RP2040 boards that receive RGB frames over a UART and show
//! them on several WS2812 chains. All wiring comes from `sink.toml`.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{PIO0, UART0, UART1};
use embassy_rp::pio::{Pin as PioPin, Pio};
use embassy_rp::uart::BufferedInterruptHandler;
use embassy_time::{Instant, Timer};
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pixelwire_core::config::MAX_OUTPUTS;
use pixelwire_core::liveness::STARTUP_BLINK;
use pixelwire_core::sink::Sink;
use pixelwire_core::traits::{DisplayDriver, LivenessSignal};
use pixelwire_drivers::liveness::GpioLiveness;
use pixelwire_hal::UartConfig;
use pixelwire_hal_rp2040::uart::{to_rp_config, uart_for_pins, UartId};
use pixelwire_hal_rp2040::{LedPin, PinBank, PinError, Ws2812Bank};

mod config;
mod tasks;

bind_interrupts!(struct Uart0Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

bind_interrupts!(struct Uart1Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

bind_interrupts!(struct PioIrqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

/// UART receive buffer
///
/// Must hold what arrives while the outputs are being written: about
/// 60 ms at 115200 baud for the default 1911 LEDs.
const RX_BUF_SIZE: usize = 2048;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; RX_BUF_SIZE]> = StaticCell::new();

static SINK: StaticCell<Sink> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pixelwire sink starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();
    config::log_config_summary(&config);

    let (mut pins, rest) = PinBank::from_peripherals(p);

    // Status LED
    let led = match pins.take(config.status_led.pin) {
        Ok(pin) => LedPin::from_pin(pin),
        Err(e) => panic!("Status LED gpio{} unavailable: {:?}", config.status_led.pin, e),
    };
    let mut status = GpioLiveness::new(led, config.status_led.inverted);

    // Startup indication: five short blinks
    let start = Instant::now();
    loop {
        let elapsed = start.elapsed().as_millis();
        if STARTUP_BLINK.is_finished(elapsed) {
            break;
        }
        status.set(STARTUP_BLINK.level_at(elapsed));
        Timer::after_millis(STARTUP_BLINK.step_ms(elapsed) as u64).await;
    }
    status.set(false);

    // Serial link
    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; RX_BUF_SIZE]);

    let uart_config = to_rp_config(&UartConfig::new(config.serial.baud_rate));
    let (tx_pin, rx_pin) = (config.serial.tx_pin.pin, config.serial.rx_pin.pin);
    let uart = match uart_for_pins(tx_pin, rx_pin) {
        Some(UartId::Uart0) => pins
            .take_uart0(rest.uart0, tx_pin, rx_pin, uart_config)
            .map(move |uart| uart.into_buffered(Uart0Irqs, tx_buf, rx_buf)),
        Some(UartId::Uart1) => pins
            .take_uart1(rest.uart1, tx_pin, rx_pin, uart_config)
            .map(move |uart| uart.into_buffered(Uart1Irqs, tx_buf, rx_buf)),
        None => Err(PinError::WrongFunction),
    };
    let uart = match uart {
        Ok(uart) => uart,
        Err(e) => panic!("Serial gpio{}/gpio{} unusable: {:?}", tx_pin, rx_pin, e),
    };
    let (_tx, rx) = uart.split();
    info!("UART initialized at {} baud", config.serial.baud_rate);

    // LED outputs, all driven by PIO0 state machine 0
    let Pio {
        mut common, sm0, ..
    } = Pio::new(rest.pio0, PioIrqs);

    let mut data_pins: Vec<(PioPin<'static, PIO0>, u32), MAX_OUTPUTS> = Vec::new();
    for output in &config.outputs {
        let pin = match pins.take_pio(&mut common, output.pin.pin) {
            Ok(pin) => pin,
            Err(e) => panic!(
                "Output {} gpio{} unavailable: {:?}",
                output.name.as_str(),
                output.pin.pin,
                e
            ),
        };
        // Cannot fail: config holds at most MAX_OUTPUTS outputs
        let _ = data_pins.push((pin, output.settle_us));
    }

    let mut display = Ws2812Bank::new(&mut common, sm0, data_pins);
    display.set_brightness(config.brightness);
    info!("{} WS2812 outputs ready", display.len());

    let sink = match Sink::from_config(&config) {
        Ok(sink) => sink,
        Err(e) => panic!("Cannot build sink: {:?}", e),
    };
    let sink = SINK.init(sink);

    spawner
        .spawn(tasks::sink_task(rx, sink, display, status))
        .unwrap();

    info!("Sink running");

    // Main task has nothing else to do - all work happens in the sink task.
    // It stays alive so the PIO block and the UART TX half are never dropped.
    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

//! Sink task
//!
//! Reads the serial link, feeds the bytes to the sink and pushes every
//! accepted frame out to the LEDs.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::PIO0;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{Instant, Timer};
use embedded_io_async::Read;

use pixelwire_core::sink::{Sink, SinkEvent};
use pixelwire_core::traits::{Clock, SliceSource};
use pixelwire_drivers::liveness::GpioLiveness;
use pixelwire_hal_rp2040::{LedPin, Ws2812Bank};
use pixelwire_protocol::FrameError;

/// Bytes taken from the UART per read
const RX_CHUNK: usize = 64;

/// Longest wait for input before the sink is ticked anyway
///
/// Bounds heartbeat jitter and idle timeout resolution.
const POLL_MS: u64 = 10;

/// Data lines driven by PIO0, state machine 0
pub type Display = Ws2812Bank<'static, PIO0, 0>;

/// Status LED
pub type StatusLed = GpioLiveness<LedPin<'static>>;

/// Milliseconds since boot
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Sink task - the whole receive, decode and display loop
#[embassy_executor::task]
pub async fn sink_task(
    mut rx: BufferedUartRx,
    sink: &'static mut Sink,
    mut display: Display,
    mut status: StatusLed,
) {
    info!(
        "Sink task started: {} byte payloads, {} outputs",
        sink.payload_capacity(),
        sink.segments().len()
    );

    let clock = UptimeClock;
    let mut buf = [0u8; RX_CHUNK];

    loop {
        let n = match select(rx.read(&mut buf), Timer::after_millis(POLL_MS)).await {
            Either::First(Ok(n)) => n,
            Either::First(Err(e)) => {
                warn!("UART read error: {:?}", e);
                0
            }
            Either::Second(()) => 0,
        };

        // Tick at least once so the heartbeat and idle timeout run
        let mut source = SliceSource::new(&buf[..n]);
        loop {
            let outcome = sink.tick(&mut source, &clock, &mut status);
            if let Some(event) = outcome.event {
                handle_event(sink, &mut display, event);
            }
            if source.is_empty() {
                break;
            }
        }
    }
}

/// Publish accepted frames and log everything else
fn handle_event(sink: &Sink, display: &mut Display, event: SinkEvent) {
    match event {
        SinkEvent::Accepted { length, frame } => {
            if let Err(e) = sink.publish(display) {
                warn!("Frame {} publish failed: {:?}", frame, e);
            }
            let summary = sink.summary();
            debug!(
                "Frame {}: {} bytes, first={} middle={} last={}",
                frame, length, summary.first, summary.middle, summary.last
            );
        }
        SinkEvent::Rejected(FrameError::Resync) => {
            trace!("Resync: second magic byte missing");
        }
        SinkEvent::Rejected(e) => {
            warn!("Frame rejected: {:?}", e);
        }
        SinkEvent::OutOfRange(e) => {
            warn!("Payload does not fit after start offset: {:?}", e);
        }
        SinkEvent::IdleTimeout => {
            warn!("Partial frame timed out, decoder reset");
        }
    }
}

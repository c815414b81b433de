//! Build script for pixelwire-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sink.toml at compile time

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest LED total the firmware buffer holds
const MAX_PIXELS: i64 = 2048;

/// Largest number of LED outputs
const MAX_OUTPUTS: usize = 8;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate sink.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=sink.toml");

    let config_path = Path::new("sink.toml");
    if !config_path.exists() {
        fail(
            "sink.toml not found",
            &["The firmware embeds sink.toml; create one next to Cargo.toml".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => fail("Cannot read sink.toml", &[e.to_string()]),
    };

    let config: toml::Value = match content.parse() {
        Ok(v) => v,
        Err(e) => fail("sink.toml is not valid TOML", &[e.to_string()]),
    };

    let mut errors = Vec::new();
    let mut pins = HashSet::new();

    validate_root(&config, &mut errors);
    validate_serial(&config, &mut pins, &mut errors);
    validate_status_led(&config, &mut pins, &mut errors);
    validate_heartbeat(&config, &mut errors);
    let total = validate_outputs(&config, &mut pins, &mut errors);
    validate_layout(&config, total, &mut errors);

    if !errors.is_empty() {
        fail("Invalid sink configuration", &errors);
    }
}

/// Abort the build with a boxed error list
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn validate_root(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("version") {
        Some(toml::Value::Integer(1)) | None => {}
        Some(v) => errors.push(format!("unsupported version {}", v)),
    }

    if let Some(v) = config.get("brightness") {
        if !matches!(v.as_integer(), Some(0..=255)) {
            errors.push("brightness must be 0-255".to_string());
        }
    }

    if let Some(v) = config.get("idle_timeout_ms") {
        if !matches!(v.as_integer(), Some(0..)) {
            errors.push("idle_timeout_ms must be a non-negative integer".to_string());
        }
    }
}

/// Parse "gpioNN", or "!gpioNN" when the pin may be active-low
fn parse_pin(value: &toml::Value, invertible: bool) -> Option<i64> {
    let mut s = value.as_str()?;
    if invertible {
        s = s.strip_prefix('!').unwrap_or(s);
    }
    let pin: i64 = s.strip_prefix("gpio")?.parse().ok()?;
    (0..30).contains(&pin).then_some(pin)
}

/// Record a pin, reporting bad or duplicate pins
fn claim_pin(
    value: Option<&toml::Value>,
    what: &str,
    invertible: bool,
    pins: &mut HashSet<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    let value = value?;
    match parse_pin(value, invertible) {
        Some(pin) => {
            if !pins.insert(pin) {
                errors.push(format!("{} reuses gpio{}", what, pin));
            }
            Some(pin)
        }
        None if invertible => {
            errors.push(format!("{} must be \"gpio0\"-\"gpio29\"", what));
            None
        }
        None => {
            errors.push(format!("{} must be \"gpio0\"-\"gpio29\" without '!'", what));
            None
        }
    }
}

fn validate_serial(config: &toml::Value, pins: &mut HashSet<i64>, errors: &mut Vec<String>) {
    let serial = config.get("serial");
    let tx = claim_pin(
        serial.and_then(|s| s.get("tx_pin")),
        "[serial] tx_pin",
        false,
        pins,
        errors,
    )
    .unwrap_or(0);
    let rx = claim_pin(
        serial.and_then(|s| s.get("rx_pin")),
        "[serial] rx_pin",
        false,
        pins,
        errors,
    )
    .unwrap_or(1);

    // TX/RX pairs each UART can be routed to
    const PAIRS: [(i64, i64); 8] = [
        (0, 1),
        (12, 13),
        (16, 17),
        (28, 29),
        (4, 5),
        (8, 9),
        (20, 21),
        (24, 25),
    ];
    if !PAIRS.contains(&(tx, rx)) {
        errors.push(format!("[serial] gpio{}/gpio{} is not a UART pair", tx, rx));
    }

    if let Some(baud) = serial.and_then(|s| s.get("baud").or_else(|| s.get("baud_rate"))) {
        if !matches!(baud.as_integer(), Some(1..)) {
            errors.push("[serial] baud must be positive".to_string());
        }
    }
}

fn validate_status_led(config: &toml::Value, pins: &mut HashSet<i64>, errors: &mut Vec<String>) {
    let pin = config.get("status_led").and_then(|s| s.get("pin"));
    if pin.is_none() {
        pins.insert(17);
    }
    claim_pin(pin, "[status_led] pin", true, pins, errors);
}

fn validate_heartbeat(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(heartbeat) = config.get("heartbeat") else {
        return;
    };
    let period = heartbeat
        .get("period_ms")
        .and_then(|v| v.as_integer())
        .unwrap_or(1000);
    let on = heartbeat
        .get("on_ms")
        .and_then(|v| v.as_integer())
        .unwrap_or(100);
    if on > period {
        errors.push("[heartbeat] on_ms must not exceed period_ms".to_string());
    }
}

/// Validate `[output.*]` tables, returning the LED total
fn validate_outputs(config: &toml::Value, pins: &mut HashSet<i64>, errors: &mut Vec<String>) -> i64 {
    let outputs = match config.get("output") {
        Some(toml::Value::Table(t)) => t,
        // Defaults: three outputs of 637 LEDs
        None => return 3 * 637,
        Some(_) => {
            errors.push("[output] must contain named tables".to_string());
            return 0;
        }
    };

    if outputs.is_empty() {
        errors.push("at least one [output.NAME] is required".to_string());
    }
    if outputs.len() > MAX_OUTPUTS {
        errors.push(format!("at most {} outputs are supported", MAX_OUTPUTS));
    }

    let mut total = 0;
    for (name, output) in outputs {
        if name.len() > 16 {
            errors.push(format!("[output.{}] name is longer than 16", name));
        }
        claim_pin(
            output.get("pin"),
            &format!("[output.{}] pin", name),
            false,
            pins,
            errors,
        );
        if output.get("pin").is_none() {
            errors.push(format!("[output.{}] missing 'pin'", name));
        }

        match output.get("leds").and_then(|v| v.as_integer()) {
            Some(leds) if leds > 0 => total += leds,
            Some(_) => errors.push(format!("[output.{}] leds must be positive", name)),
            None => errors.push(format!("[output.{}] missing 'leds'", name)),
        }
    }

    if total > MAX_PIXELS {
        errors.push(format!("{} LEDs exceed the {} pixel buffer", total, MAX_PIXELS));
    }
    total
}

fn validate_layout(config: &toml::Value, total: i64, errors: &mut Vec<String>) {
    if let Some(offset) = config.get("start_offset").and_then(|v| v.as_integer()) {
        if offset < 0 || offset >= total {
            errors.push(format!("start_offset {} is outside 0..{}", offset, total));
        }
    }

    let Some(matrix) = config.get("matrix") else {
        return;
    };
    let width = matrix.get("width").and_then(|v| v.as_integer()).unwrap_or(49);
    let height = matrix.get("height").and_then(|v| v.as_integer()).unwrap_or(39);
    if width * height != total {
        errors.push(format!(
            "[matrix] {}x{} does not match {} LEDs",
            width, height, total
        ));
    }

    if let Some(layout) = matrix.get("layout") {
        if !matches!(
            layout.as_str(),
            Some("row_major" | "RowMajor" | "serpentine" | "Serpentine" | "zigzag")
        ) {
            errors.push("[matrix] layout must be row_major or serpentine".to_string());
        }
    }
}

//! Loopback self-test against a serial device.
//!
//! Opens the given serial port, applies the line settings, seeds the counter
//! pattern, and verifies the echo for a number of seconds.
//!
//! Usage: cargo run --example loopback --features serialport -- /dev/ttyUSB0 [baud] [seconds]

use std::time::Duration;

use ftloop::serial::SerialPortTransport;
use ftloop::{worker, LineConfig, LogSink, VerifierConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "/dev/ttyUSB0".into());
    let baudrate: u32 = match args.next() {
        Some(s) => s.parse()?,
        None => 115_200,
    };
    let seconds: u64 = match args.next() {
        Some(s) => s.parse()?,
        None => 10,
    };

    println!("Opening {path}...");
    let transport = SerialPortTransport::open(&path)?;

    let config = VerifierConfig::default().with_line(LineConfig::new(baudrate));
    let handle = worker::spawn(transport, LogSink, config)?;
    println!("Running loopback test at {baudrate} 8N1 for {seconds} s (RUST_LOG=debug for per-loop output)");

    std::thread::sleep(Duration::from_secs(seconds));
    handle.stop();

    // Reads time out after 100 ms, so the worker notices the stop promptly.
    let summary = handle.join()?;
    println!(
        "{} loops, {} failed, {} bytes verified",
        summary.cycles, summary.failed_cycles, summary.bytes_verified
    );
    println!("Average loop: {:.3} us", summary.average.as_secs_f64() * 1e6);

    Ok(())
}

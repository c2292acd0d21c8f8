//! Loopback self-test for USB-to-serial links.
//!
//! This crate writes a repeating `0x00..=0xFF` counter pattern to a serial
//! transport, reads back what the remote end echoes, and checks the byte
//! sequence. It reports every completed cycle with its round-trip time, a
//! running average, and whether the cycle arrived intact.
//!
//! Device discovery and permissions are left to the host:
//! it supplies a [`Transport`] and a [`ReportSink`], and decides when to
//! start and stop.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::net::TcpStream;
//! use std::time::Duration;
//! use ftloop::{worker, IoTransport, LogSink, VerifierConfig};
//!
//! // A serial-over-TCP bridge (e.g. ser2net) in front of the adapter.
//! let port = TcpStream::connect("192.168.1.20:3001")?;
//! let handle = worker::spawn(IoTransport::new(port), LogSink, VerifierConfig::default())?;
//!
//! std::thread::sleep(Duration::from_secs(10));
//! handle.stop();
//! let summary = handle.join()?;
//! println!("{} loops, average {:?}", summary.cycles, summary.average);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//!
//! - **Verification**: byte-exact checking of the counter pattern, with
//!   mismatches reported but never fatal ([`verifier`]).
//! - **Timing**: per-cycle elapsed time and running average.
//! - **Worker thread**: run the loop in the background and stop it from
//!   anywhere ([`worker`]).
//! - **Transports**: OS serial ports with baud rate and framing applied via
//!   `SerialPortTransport` (feature `serialport`); any `std::io::Read + Write`
//!   stream via [`IoTransport`]; `embedded-io` streams with the
//!   `embedded-io` feature.
//! - **Sinks**: `log` output, channels, closures, or plain collection
//!   ([`report`]).
//! - **Logging**: diagnostics go through the `log` facade (`debug!` for
//!   start/stop and per-cycle results, `trace!` for read lengths, `warn!`
//!   for failed cycles and aborts). Install any logger, e.g. `env_logger`.

pub mod config;
pub mod constants;
pub mod error;
#[cfg(feature = "embedded-io")]
pub mod hal;
pub mod pattern;
pub mod report;
#[cfg(feature = "serialport")]
pub mod serial;
pub mod transport;
pub mod types;
pub mod verifier;
pub mod worker;

// ---- Convenience re-exports ----

pub use config::VerifierConfig;
pub use error::{Error, Result, TransportError};
#[cfg(feature = "embedded-io")]
pub use hal::EmbeddedIoTransport;
pub use pattern::TestPattern;
pub use report::{CycleReport, Event, LogSink, Mismatch, ReportSink};
#[cfg(feature = "serialport")]
pub use serial::SerialPortTransport;
pub use transport::{IoTransport, Transport};
pub use types::*;
pub use verifier::{LoopbackVerifier, RunSummary, StopHandle, VerificationState};
pub use worker::VerifierHandle;

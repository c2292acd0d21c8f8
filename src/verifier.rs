//! The loopback verification loop.
//!
//! [`LoopbackVerifier::start`] seeds the remote loop with the counter
//! pattern, then each [`step`](LoopbackVerifier::step) reads whatever came
//! back and checks it byte by byte:
//!
//! - a byte that differs from the expected counter value marks the current
//!   cycle as failed and is reported as a [`Mismatch`]. The run continues.
//! - the marker byte `0xFF` closes the cycle. Its elapsed time is added to
//!   the running total, a [`CycleReport`] is emitted, and the counter
//!   restarts at `0x01`.
//! - any other byte advances the counter by one.
//!
//! A transport error ends the run with [`Error::VerificationAborted`].
//!
//! # Example
//!
//! ```no_run
//! use std::net::TcpStream;
//! use ftloop::{IoTransport, LogSink, LoopbackVerifier, VerifierConfig};
//!
//! // A serial-over-TCP bridge (e.g. ser2net) in front of the adapter.
//! let port = TcpStream::connect("192.168.1.20:3001")?;
//! let mut verifier =
//!     LoopbackVerifier::start(IoTransport::new(port), LogSink, VerifierConfig::default())?;
//! let summary = verifier.run()?;
//! println!("{} cycles, {} failed", summary.cycles, summary.failed_cycles);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::pattern::TestPattern;
use crate::report::{CycleReport, Mismatch, ReportSink};
use crate::transport::{write_all, Transport};

/// Run-scoped counters, owned by whichever thread drives the verifier.
#[derive(Debug, Clone)]
pub struct VerificationState {
    expected_next_byte: u8,
    cycle_count: u64,
    cycle_failed: bool,
    cycle_mismatches: u32,
    cycle_start: Instant,
    total_elapsed: Duration,
    failed_cycles: u64,
    bytes_verified: u64,
    marker: u8,
    restart: u8,
}

impl VerificationState {
    /// Fresh state for `pattern`, with the cycle clock starting now.
    pub fn new(pattern: &TestPattern) -> Self {
        Self {
            expected_next_byte: pattern.first(),
            cycle_count: 0,
            cycle_failed: false,
            cycle_mismatches: 0,
            cycle_start: Instant::now(),
            total_elapsed: Duration::ZERO,
            failed_cycles: 0,
            bytes_verified: 0,
            marker: pattern.marker(),
            restart: pattern.restart(),
        }
    }

    /// Check one received byte and advance the counter.
    ///
    /// Reports go to `sink`. Returns the report if `byte` closed a cycle.
    pub fn observe<S: ReportSink + ?Sized>(&mut self, byte: u8, sink: &mut S) -> Option<CycleReport> {
        self.bytes_verified += 1;

        if byte != self.expected_next_byte {
            self.cycle_failed = true;
            self.cycle_mismatches = self.cycle_mismatches.saturating_add(1);
            sink.mismatch(&Mismatch {
                cycle_index: self.cycle_count + 1,
                observed: byte,
                expected: self.expected_next_byte,
            });
        }

        if byte != self.marker {
            self.expected_next_byte = self.expected_next_byte.wrapping_add(1);
            return None;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.cycle_start);
        self.total_elapsed += elapsed;
        self.cycle_count += 1;
        if self.cycle_failed {
            self.failed_cycles += 1;
        }

        let report = CycleReport {
            cycle_index: self.cycle_count,
            elapsed,
            running_average: self.average(),
            passed: !self.cycle_failed,
            mismatches: self.cycle_mismatches,
        };
        sink.cycle_complete(&report);

        self.cycle_failed = false;
        self.cycle_mismatches = 0;
        self.expected_next_byte = self.restart;
        self.cycle_start = now;
        Some(report)
    }

    /// Next byte value expected from the transport.
    pub fn expected_next_byte(&self) -> u8 {
        self.expected_next_byte
    }

    /// Number of completed cycles.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Whether the cycle in progress has seen a mismatch.
    pub fn cycle_failed(&self) -> bool {
        self.cycle_failed
    }

    /// When the cycle in progress started.
    pub fn cycle_start(&self) -> Instant {
        self.cycle_start
    }

    /// Sum of all completed cycle times.
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Mean completed cycle time, or zero before the first cycle.
    pub fn average(&self) -> Duration {
        if self.cycle_count == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total_elapsed.as_nanos() / u128::from(self.cycle_count);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        }
    }

    /// Snapshot of the run totals.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles: self.cycle_count,
            failed_cycles: self.failed_cycles,
            bytes_verified: self.bytes_verified,
            total_elapsed: self.total_elapsed,
            average: self.average(),
        }
    }
}

/// Totals for a run, returned when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Completed cycles.
    pub cycles: u64,
    /// Completed cycles that contained at least one mismatch.
    pub failed_cycles: u64,
    /// Bytes read and checked, including those of an unfinished cycle.
    pub bytes_verified: u64,
    /// Sum of completed cycle times.
    pub total_elapsed: Duration,
    /// Mean completed cycle time.
    pub average: Duration,
}

/// Shared stop flag for a running verifier.
///
/// Cloning the handle shares the flag. The verifier checks it after every
/// step; it does not interrupt a read that is blocked in the transport.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Request a stop. Returns `true` only for the call that set the flag.
    pub fn stop(&self) -> bool {
        let first = !self.0.swap(true, Ordering::AcqRel);
        if first {
            log::debug!("loopback stop requested");
        }
        first
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives the write-then-read self-test over a [`Transport`].
pub struct LoopbackVerifier<T, S> {
    transport: T,
    sink: S,
    state: VerificationState,
    buf: Vec<u8>,
    idle_backoff: Duration,
    stop: StopHandle,
    terminated: bool,
}

impl<T: Transport, S: ReportSink> LoopbackVerifier<T, S> {
    /// Configure the transport, write the seed pattern and start the clock.
    ///
    /// Fails with [`Error::TransportUnavailable`] if the transport rejects
    /// the line settings or the seed, and with [`Error::InvalidArgument`] if
    /// `config` is invalid.
    pub fn start(mut transport: T, sink: S, config: VerifierConfig) -> Result<Self> {
        config.validate()?;

        log::debug!("configuring line: {:?}", config.line());
        transport
            .configure(config.line())
            .map_err(Error::TransportUnavailable)?;

        let seed = config.pattern().seed();
        log::debug!("start write loop: {} byte seed", seed.len());
        write_all(&mut transport, &seed).map_err(Error::TransportUnavailable)?;
        transport.flush().map_err(Error::TransportUnavailable)?;

        log::debug!("start read loop");
        Ok(Self {
            transport,
            sink,
            state: VerificationState::new(config.pattern()),
            buf: vec![0; config.read_buffer_size()],
            idle_backoff: config.idle_backoff(),
            stop: StopHandle::default(),
            terminated: false,
        })
    }

    /// Read once and verify every byte returned.
    ///
    /// Returns the number of bytes processed; zero means the read was empty
    /// and nothing changed. After a transport error the verifier is
    /// terminated and every later call returns [`Error::Terminated`].
    pub fn step(&mut self) -> Result<usize> {
        if self.terminated {
            return Err(Error::Terminated);
        }

        let len = match self.transport.read(&mut self.buf) {
            Ok(len) => len.min(self.buf.len()),
            Err(e) => {
                self.terminated = true;
                log::warn!("transport failed after {} loops: {e}", self.state.cycle_count());
                return Err(Error::VerificationAborted(e));
            }
        };
        if len == 0 {
            return Ok(0);
        }

        log::trace!("read length : {len}");
        for &byte in &self.buf[..len] {
            self.state.observe(byte, &mut self.sink);
        }
        Ok(len)
    }

    /// Step until a stop is requested or the transport fails.
    ///
    /// Sleeps for the configured idle backoff after each empty read.
    pub fn run(&mut self) -> Result<RunSummary> {
        while !self.stop.is_stopped() {
            if self.step()? == 0 {
                idle(self.idle_backoff);
            }
        }
        let summary = self.summary();
        log::debug!(
            "loopback stopped: {} loops, {} failed",
            summary.cycles,
            summary.failed_cycles
        );
        Ok(summary)
    }
}

impl<T, S> LoopbackVerifier<T, S> {
    /// Ask [`run`](Self::run) to return after the current step.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// A handle that can stop the run from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether a transport error has ended the run.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Current counters.
    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    /// Next byte value expected from the transport.
    pub fn expected_next_byte(&self) -> u8 {
        self.state.expected_next_byte()
    }

    /// Number of completed cycles.
    pub fn cycle_count(&self) -> u64 {
        self.state.cycle_count()
    }

    /// Totals so far.
    pub fn summary(&self) -> RunSummary {
        self.state.summary()
    }

    /// Give back the transport and sink.
    pub fn into_parts(self) -> (T, S) {
        (self.transport, self.sink)
    }
}

impl<T, S> std::fmt::Debug for LoopbackVerifier<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackVerifier")
            .field("state", &self.state)
            .field("read_buffer_size", &self.buf.len())
            .field("stopped", &self.stop.is_stopped())
            .field("terminated", &self.terminated)
            .finish()
    }
}

fn idle(backoff: Duration) {
    if backoff.is_zero() {
        thread::yield_now();
    } else {
        thread::sleep(backoff);
    }
}

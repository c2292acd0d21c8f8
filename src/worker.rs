//! Running a verifier on its own thread.
//!
//! [`spawn`] seeds the transport on the calling thread, so a transport that
//! cannot be opened is reported right away, then moves the verifier onto a
//! dedicated worker. The returned [`VerifierHandle`] stops and joins it.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use std::sync::mpsc;
//! use ftloop::{worker, Event, IoTransport, VerifierConfig};
//!
//! // A serial-over-TCP bridge (e.g. ser2net) in front of the adapter.
//! let port = TcpStream::connect("192.168.1.20:3001")?;
//! let (tx, rx) = mpsc::channel();
//! let handle = worker::spawn(IoTransport::new(port), tx, VerifierConfig::default())?;
//!
//! for event in rx.iter().take(10) {
//!     if let Event::Cycle(report) = event {
//!         println!("loop {}: {:?}", report.cycle_index, report.elapsed);
//!     }
//! }
//!
//! handle.stop();
//! let summary = handle.join()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::thread::{self, JoinHandle};

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::report::ReportSink;
use crate::transport::Transport;
use crate::verifier::{LoopbackVerifier, RunSummary, StopHandle};

/// Name given to worker threads.
pub const WORKER_THREAD_NAME: &str = "ftloop-verifier";

/// Handle for a verifier running on a worker thread.
///
/// Call [`stop`](Self::stop) to request termination and [`join`](Self::join)
/// to wait for the summary. Dropping the handle detaches the worker; it keeps
/// running until the transport fails.
#[derive(Debug)]
pub struct VerifierHandle {
    stop: StopHandle,
    thread: JoinHandle<Result<RunSummary>>,
}

impl VerifierHandle {
    /// Request a stop. Safe to call any number of times.
    ///
    /// A read blocked in the transport is not interrupted; close or detach
    /// the device to unblock it.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// A clonable stop flag, e.g. for a device-detach callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Whether the worker has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker and return its result.
    pub fn join(self) -> Result<RunSummary> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)?
    }
}

/// Start a verifier and run it on a new thread.
///
/// Start-up errors ([`Error::TransportUnavailable`],
/// [`Error::InvalidArgument`]) are returned here. Errors during the run
/// come back from [`VerifierHandle::join`].
pub fn spawn<T, S>(transport: T, sink: S, config: VerifierConfig) -> Result<VerifierHandle>
where
    T: Transport + Send + 'static,
    S: ReportSink + Send + 'static,
{
    let mut verifier = LoopbackVerifier::start(transport, sink, config)?;
    let stop = verifier.stop_handle();

    let thread = thread::Builder::new()
        .name(WORKER_THREAD_NAME.into())
        .spawn(move || verifier.run())
        .map_err(Error::Spawn)?;

    Ok(VerifierHandle { stop, thread })
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::error::TransportError;
    use crate::report::Event;

    /// Echoes back whatever was written, once.
    #[derive(Default)]
    struct Echo {
        pending: Vec<u8>,
    }

    impl Transport for Echo {
        fn write(&mut self, buf: &[u8]) -> std::result::Result<usize, TransportError> {
            self.pending.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, TransportError> {
            let n = self.pending.len().min(buf.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    #[test]
    fn worker_reports_and_stops() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn(Echo::default(), tx, VerifierConfig::default()).unwrap();

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, Event::Cycle(r) if r.cycle_index == 1 && r.passed));

        handle.stop();
        handle.stop();
        let summary = handle.join().unwrap();
        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.failed_cycles, 0);
        assert_eq!(summary.bytes_verified, 256);
    }
}

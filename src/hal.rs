//! `embedded-io` 0.7 integration.
//!
//! Enable the `embedded-io` feature to run the loopback test over any
//! `embedded_io::Read + embedded_io::Write` serial implementation:
//!
//! ```toml
//! [dependencies]
//! ftloop = { version = "0.1", features = ["embedded-io"] }
//! ```
//!
//! | Item | Notes |
//! |------|-------|
//! | [`EmbeddedIoTransport`] | Wraps an `embedded-io` stream as a [`Transport`] |
//! | `embedded_io::Error` for [`TransportError`] | Lets transport errors travel through `embedded-io` code |

use embedded_io::{Error as _, ErrorKind};

use crate::error::TransportError;
use crate::transport::Transport;

// ---- Error conversion ----

impl embedded_io::Error for TransportError {
    fn kind(&self) -> ErrorKind {
        match self {
            TransportError::Detached => ErrorKind::NotConnected,
            TransportError::WriteZero => ErrorKind::WriteZero,
            TransportError::Io(e) => match e.kind() {
                std::io::ErrorKind::TimedOut => ErrorKind::TimedOut,
                std::io::ErrorKind::Interrupted => ErrorKind::Interrupted,
                std::io::ErrorKind::BrokenPipe => ErrorKind::BrokenPipe,
                _ => ErrorKind::Other,
            },
            _ => ErrorKind::Other,
        }
    }
}

fn map_embedded_error<E: embedded_io::Error>(err: E) -> TransportError {
    match err.kind() {
        ErrorKind::NotConnected | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
            TransportError::Detached
        }
        ErrorKind::WriteZero => TransportError::WriteZero,
        kind => TransportError::Device(format!("{kind:?}: {err:?}")),
    }
}

// ---- Transport adapter ----

/// Adapter for `embedded_io::Read + embedded_io::Write` streams.
///
/// Reads that time out or are interrupted count as empty reads.
#[derive(Debug)]
pub struct EmbeddedIoTransport<T> {
    inner: T,
}

impl<T> EmbeddedIoTransport<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Mutably borrow the wrapped stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: embedded_io::Read + embedded_io::Write> Transport for EmbeddedIoTransport<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        self.inner.write(buf).map_err(map_embedded_error)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => Ok(0),
            Err(e) => Err(map_embedded_error(e)),
        }
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.inner.flush().map_err(map_embedded_error)
    }
}

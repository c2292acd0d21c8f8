//! Error types for the ftloop crate.

use std::io;

/// A failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An error from an underlying `std::io` stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The device was removed or the transport was closed from outside.
    #[error("transport detached")]
    Detached,

    /// A write operation completed with zero bytes transferred.
    #[error("write returned zero bytes")]
    WriteZero,

    /// A backend-specific failure that has no `std::io` equivalent.
    #[error("device error: {0}")]
    Device(String),

    /// The transport cannot apply a requested setting.
    #[error("unsupported setting: {0}")]
    Unsupported(&'static str),

    /// An error from the `serialport` crate.
    #[cfg(feature = "serialport")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// The error type for loopback verification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not be configured or seeded, so no run began.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(#[source] TransportError),

    /// The transport failed in the middle of a run. The run is over.
    #[error("verification aborted: {0}")]
    VerificationAborted(#[source] TransportError),

    /// Invalid argument(s) were provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The verifier already aborted and will not touch the transport again.
    #[error("verifier has terminated")]
    Terminated,

    /// The worker thread could not be spawned.
    #[error("unable to spawn verifier thread: {0}")]
    Spawn(#[source] io::Error),

    /// The worker thread panicked before returning a summary.
    #[error("verifier thread panicked")]
    WorkerPanicked,
}

/// A specialized `Result` type for loopback verification.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn aborted_keeps_transport_source() {
        let err = Error::VerificationAborted(TransportError::Detached);
        assert_eq!(err.to_string(), "verification aborted: transport detached");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "transport detached");
    }

    #[test]
    fn io_error_converts() {
        let err: TransportError = io::Error::other("boom").into();
        assert!(matches!(err, TransportError::Io(_)));
    }
}

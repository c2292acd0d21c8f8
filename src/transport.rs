//! The byte-stream capability the verifier runs over.
//!
//! A [`Transport`] is anything that can write and read raw bytes: a USB
//! serial adapter, a pseudo-terminal, or an in-memory mock. The host opens
//! it, hands it to the verifier for the duration of one run, and is
//! responsible for closing it again.
//!
//! # Cancellation
//!
//! [`Transport::read`] may block. The verifier's stop flag is only checked
//! between reads, so a read that never returns keeps the worker alive. To
//! stop promptly, close or detach the underlying device so the pending read
//! fails or returns.

use std::io;

use crate::error::TransportError;
use crate::types::LineConfig;

/// A bidirectional byte stream.
pub trait Transport {
    /// Write some bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError>;

    /// Read available bytes into `buf`.
    ///
    /// Returns `Ok(0)` if nothing is available right now.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Push buffered output to the device.
    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Apply line settings. Called once per run, before anything is written.
    fn configure(&mut self, _line: &LineConfig) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        (**self).write(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(buf)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }

    fn configure(&mut self, line: &LineConfig) -> Result<(), TransportError> {
        (**self).configure(line)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        (**self).write(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(buf)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }

    fn configure(&mut self, line: &LineConfig) -> Result<(), TransportError> {
        (**self).configure(line)
    }
}

/// Write the whole buffer, looping on short writes.
pub(crate) fn write_all<T: Transport + ?Sized>(
    transport: &mut T,
    mut buf: &[u8],
) -> Result<(), TransportError> {
    while !buf.is_empty() {
        match transport.write(buf)? {
            0 => return Err(TransportError::WriteZero),
            n => buf = &buf[n..],
        }
    }
    Ok(())
}

/// Adapter for anything implementing [`std::io::Read`] and [`std::io::Write`].
///
/// Driver handles that expose `std::io` (such as an FTDI device with a read
/// timeout) plug in here. Reads that time out or would block count as empty
/// reads. A read that returns `Ok(0)` is end of stream, meaning the device
/// hung up, and is reported as [`TransportError::Detached`]; use
/// [`eof_as_empty`](Self::eof_as_empty) for streams that return `Ok(0)` on
/// timeout instead.
///
/// A plain stream has no way to change baud rate or framing, so
/// [`configure`](Transport::configure) checks the settings and logs that they
/// were not applied. Use `SerialPortTransport` (feature `serialport`) to
/// configure a real port.
///
/// ```no_run
/// use std::net::TcpStream;
/// use ftloop::IoTransport;
///
/// let stream = TcpStream::connect("127.0.0.1:7")?;
/// let transport = IoTransport::new(stream);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct IoTransport<T> {
    inner: T,
    eof_as_empty: bool,
}

impl<T> IoTransport<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            eof_as_empty: false,
        }
    }

    /// Treat `Ok(0)` from the stream as "no data yet" rather than a hang-up.
    ///
    /// The run then only ends through [`stop`](crate::LoopbackVerifier::stop)
    /// or a read error.
    pub fn eof_as_empty(mut self, enabled: bool) -> Self {
        self.eof_as_empty = enabled;
        self
    }

    /// Borrow the wrapped stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
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

pub(crate) fn map_io_error(err: io::Error) -> TransportError {
    match err.kind() {
        io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected => TransportError::Detached,
        io::ErrorKind::WriteZero => TransportError::WriteZero,
        _ => TransportError::Io(err),
    }
}

/// Turn the result of a `std::io` read into a transport read.
///
/// Timeouts become empty reads. `Ok(0)` for a non-empty buffer is end of
/// stream unless `eof_as_empty` is set.
pub(crate) fn map_read(
    result: io::Result<usize>,
    requested: usize,
    eof_as_empty: bool,
) -> Result<usize, TransportError> {
    match result {
        Ok(0) if requested > 0 && !eof_as_empty => Err(TransportError::Detached),
        Ok(n) => Ok(n),
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
            ) =>
        {
            Ok(0)
        }
        Err(e) => Err(map_io_error(e)),
    }
}

pub(crate) fn write_io<W: io::Write + ?Sized>(
    inner: &mut W,
    buf: &[u8],
) -> Result<usize, TransportError> {
    loop {
        match inner.write(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_io_error(e)),
        }
    }
}

impl<T: io::Read + io::Write> Transport for IoTransport<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        write_io(&mut self.inner, buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let result = self.inner.read(buf);
        map_read(result, buf.len(), self.eof_as_empty)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.inner.flush().map_err(map_io_error)
    }

    fn configure(&mut self, line: &LineConfig) -> Result<(), TransportError> {
        line.validate()
            .map_err(|_| TransportError::Unsupported("line settings rejected by validation"))?;
        log::warn!(
            "std::io stream cannot apply line settings; {} baud must already be set",
            line.baudrate
        );
        Ok(())
    }
}

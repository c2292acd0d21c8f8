//! `serialport` 4 integration.
//!
//! Enable the `serialport` feature to open and configure OS serial ports
//! (`/dev/ttyUSB0`, `COM3`, ...) directly:
//!
//! ```toml
//! [dependencies]
//! ftloop = { version = "0.1", features = ["serialport"] }
//! ```
//!
//! [`SerialPortTransport::configure`](crate::Transport::configure) applies
//! every field of a [`LineConfig`] to the port. The port's read timeout
//! bounds each read; a timed-out read is an empty read, so the stop flag is
//! checked at least once per timeout.
//!
//! ```no_run
//! use ftloop::serial::SerialPortTransport;
//! use ftloop::{worker, LineConfig, LogSink, VerifierConfig};
//!
//! let transport = SerialPortTransport::open("/dev/ttyUSB0")?;
//! let config = VerifierConfig::default().with_line(LineConfig::new(921_600));
//! let handle = worker::spawn(transport, LogSink, config)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{Read as _, Write as _};
use std::time::Duration;

use serialport::SerialPort;

use crate::constants::DEFAULT_BAUDRATE;
use crate::error::TransportError;
use crate::transport::{map_io_error, map_read, write_io, Transport};
use crate::types::{DataBits, FlowControl, LineConfig, Parity, StopBits};

/// Read timeout used by [`SerialPortTransport::open`].
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

// ---- Setting conversion ----

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::Disabled => serialport::FlowControl::None,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
            FlowControl::Software => serialport::FlowControl::Software,
        }
    }
}

fn map_serial_error(err: serialport::Error) -> TransportError {
    match err.kind() {
        serialport::ErrorKind::NoDevice => TransportError::Detached,
        _ => TransportError::Serial(err),
    }
}

// ---- Transport ----

/// A [`Transport`] over an OS serial port.
///
/// A read that returns no bytes without timing out means the port hung up
/// and is reported as [`TransportError::Detached`].
pub struct SerialPortTransport {
    port: Box<dyn SerialPort>,
}

impl SerialPortTransport {
    /// Open `path` at the default baud rate with a
    /// [`DEFAULT_READ_TIMEOUT`] read timeout.
    ///
    /// The line settings of the run are applied later, by
    /// [`LoopbackVerifier::start`](crate::LoopbackVerifier::start).
    pub fn open(path: &str) -> Result<Self, TransportError> {
        Self::open_with_timeout(path, DEFAULT_READ_TIMEOUT)
    }

    /// Open `path` with a custom read timeout.
    pub fn open_with_timeout(path: &str, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, DEFAULT_BAUDRATE)
            .timeout(timeout)
            .open()
            .map_err(map_serial_error)?;
        log::debug!("opened serial port {path}");
        Ok(Self { port })
    }

    /// Wrap a port that is already open.
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Mutably borrow the port.
    pub fn port_mut(&mut self) -> &mut dyn SerialPort {
        self.port.as_mut()
    }

    /// Unwrap the port.
    pub fn into_inner(self) -> Box<dyn SerialPort> {
        self.port
    }
}

impl std::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("name", &self.port.name())
            .finish()
    }
}

impl Transport for SerialPortTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        write_io(self.port.as_mut(), buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let result = self.port.read(buf);
        map_read(result, buf.len(), false)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.port.flush().map_err(map_io_error)
    }

    fn configure(&mut self, line: &LineConfig) -> Result<(), TransportError> {
        line.validate()
            .map_err(|_| TransportError::Unsupported("line settings rejected by validation"))?;

        self.port
            .set_baud_rate(line.baudrate)
            .map_err(map_serial_error)?;
        self.port
            .set_data_bits(line.data_bits.into())
            .map_err(map_serial_error)?;
        self.port
            .set_parity(line.parity.into())
            .map_err(map_serial_error)?;
        self.port
            .set_stop_bits(line.stop_bits.into())
            .map_err(map_serial_error)?;
        self.port
            .set_flow_control(line.flow_control.into())
            .map_err(map_serial_error)?;

        log::debug!("serial line set to {line:?}");
        Ok(())
    }
}
